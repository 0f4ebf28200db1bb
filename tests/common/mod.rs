//! Helpers shared by the integration tests

#![allow(dead_code)]

use dijet_imbalance::{
    alloc::DIJET_METRICS,
    config::Configuration,
    container::{ContainerLayout, JetContainerSpec},
    event::{Event, Jet, JetCollection},
    grid::GridCell,
    histogram::Histogram1D,
    numeric::Float,
    registry::{HistKey, HistRegistry},
};

/// Relative tolerance of float comparisons, at the working precision
pub const TOLERANCE: Float = 8. * Float::EPSILON;

/// Name of the jet container used by most tests
pub const JETS: &str = "Jet_AKTChargedR040";

/// Configuration with a single centrality bin and the given jet containers
pub fn jet_config(jets: Vec<JetContainerSpec>) -> Configuration {
    Configuration {
        num_cent_bins: 1,
        layout: ContainerLayout {
            jets,
            ..ContainerLayout::default()
        },
        ..Configuration::default()
    }
}

/// Accepted jet at the origin in eta, with a 10 GeV leading hadron
pub fn jet(pt: Float, phi: Float) -> Jet {
    Jet::new(pt, 0., phi, 0.2).with_max_charged_pt(10.)
}

/// Event in centrality bin 0 holding one jet collection
pub fn jet_event(name: &str, jets: Vec<Jet>, rho: Option<Float>) -> Event {
    let mut event = Event::new(0);
    event
        .jets
        .insert(name.to_owned(), JetCollection { jets, rho });
    event
}

/// Grid cell from its indices, which must be valid
pub fn cell(k: usize, i: usize, j: usize) -> GridCell {
    GridCell::new(k, i, j).expect("Test grid cells should be valid")
}

/// 1D histogram of a jet container in centrality bin 0 and a grid cell
pub fn dijet_hist<'r>(
    registry: &'r HistRegistry,
    group: &str,
    metric: &'static str,
    cell: GridCell,
) -> &'r Histogram1D {
    registry
        .get(&HistKey::dijet(group, metric, 0, cell))
        .and_then(|hist| hist.as_1d())
        .expect("Dijet histograms should be allocated as 1D")
}

/// 1D QA histogram of a container in centrality bin 0
pub fn qa_hist<'r>(registry: &'r HistRegistry, group: &str, metric: &'static str) -> &'r Histogram1D {
    registry
        .get(&HistKey::qa(group, metric, 0))
        .and_then(|hist| hist.as_1d())
        .expect("This QA histogram should be allocated as 1D")
}

/// Total number of dijet fills of a container in one grid cell
pub fn cell_entries(registry: &HistRegistry, group: &str, cell: GridCell) -> u64 {
    DIJET_METRICS
        .into_iter()
        .map(|(metric, _title, _axis)| dijet_hist(registry, group, metric, cell).entries())
        .sum()
}

/// Total number of dijet fills of a container
pub fn dijet_entries(registry: &HistRegistry, group: &str) -> u64 {
    registry
        .iter()
        .filter(|(key, _)| key.group == group && key.cell.is_some())
        .map(|(_, hist)| hist.entries())
        .sum()
}
