//! This module is in charge of reporting the final analysis results

use crate::{
    alloc::names::{DIJET_AJ, UNMATCHED_LEADING_PT},
    config::Configuration,
    grid::{GridCell, ThresholdGrid},
    numeric::Float,
    registry::{HistKey, HistRegistry},
    task::DijetImbalanceTask,
    Result,
};

use log::info;
use std::time::Duration;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

/// Dijet yield of one threshold grid cell, summed over centrality bins
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellDigest {
    /// Grid cell
    pub cell: GridCell,

    /// Number of matched dijets
    pub num_dijets: u64,

    /// Number of triggers without an associated jet
    pub num_unmatched: u64,

    /// Mean momentum imbalance of the matched dijets
    pub mean_a_j: Option<Float>,
}

/// Summarize the dijet histograms of one jet container
pub fn dijet_digest(
    registry: &HistRegistry,
    group: &str,
    num_cent_bins: usize,
    grid: &ThresholdGrid,
) -> Vec<CellDigest> {
    grid.iter()
        .map(|cell| {
            let hists = move |metric| {
                (0..num_cent_bins).filter_map(move |cent| {
                    registry
                        .get(&HistKey::dijet(group, metric, cent, cell))
                        .and_then(|hist| hist.as_1d())
                })
            };
            let num_dijets = hists(DIJET_AJ).map(|h| h.entries()).sum();
            let num_unmatched = hists(UNMATCHED_LEADING_PT).map(|h| h.entries()).sum();
            let (sum_a_j, num_a_j) = hists(DIJET_AJ)
                .filter_map(|h| h.mean().map(|mean| (mean * h.integral(), h.integral())))
                .fold((0., 0.), |(s, n), (ds, dn)| (s + ds, n + dn));
            CellDigest {
                cell,
                num_dijets,
                num_unmatched,
                mean_a_j: (num_a_j > 0.).then(|| sum_a_j / num_a_j),
            }
        })
        .collect()
}

/// Output the analysis results to the console
pub fn dump_results(
    cfg: &Configuration,
    task: &DijetImbalanceTask,
    elapsed_time: Duration,
) -> Result<()> {
    // Compute a timestamp of when the run ended
    let timestamp = OffsetDateTime::now_utc().format(&Rfc3339)?;

    // Run statistics
    let registry = task.registry();
    let elapsed_secs = elapsed_time.as_secs_f64();
    let num_events = task.num_events();
    println!();
    println!("Run finished at {}", timestamp);
    println!("---------------------------------------------");
    println!("Events analyzed        : {}", num_events);
    println!("Elapsed time (s)       : {:.3}", elapsed_secs);
    println!(
        "Time per event (us)    : {:.3}",
        1e6 * elapsed_secs / (num_events.max(1) as f64)
    );
    println!("Histograms             : {}", registry.len());
    println!("Histogram entries      : {}", registry.total_entries());

    // Fills per container
    println!("---------------------------------------------");
    for group in registry.groups() {
        println!("{:<22} : {}", group, registry.group_entries(group));
    }

    // Dijet yields per threshold set
    let grid = ThresholdGrid::new();
    for spec in &cfg.layout.jets {
        println!("---------------------------------------------");
        println!("Dijets of {}", spec.name);
        println!("{:<24} {:>10} {:>10} {:>8}", "thresholds", "dijets", "unmatched", "<A_J>");
        for digest in dijet_digest(registry, &spec.name, cfg.num_cent_bins, &grid) {
            let mean_a_j = digest
                .mean_a_j
                .map_or_else(|| "-".to_owned(), |a_j| format!("{:.3}", a_j));
            println!(
                "{:<24} {:>10} {:>10} {:>8}",
                digest.cell.to_string(),
                digest.num_dijets,
                digest.num_unmatched,
                mean_a_j
            );
        }
    }

    info!(
        "Analyzed {} events in {:.3}s, {} histogram entries",
        num_events,
        elapsed_secs,
        registry.total_entries()
    );
    Ok(())
}
