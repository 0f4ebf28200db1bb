//! The dijet imbalance analysis task
//!
//! The task owns a histogram registry, which it fills from a stream of
//! events. Its lifecycle mirrors the one of the host framework: histograms
//! are all created at setup time, then each event goes through a processing
//! hook (the dijet search) and a fill hook (QA histograms).

use crate::{
    alloc::{names::*, HistogramAllocator},
    config::Configuration,
    container::JetContainer,
    dijet::{DijetOutcome, DijetSelector},
    event::Event,
    grid::{GridCell, ThresholdGrid},
    qa,
    registry::{HistKey, HistRegistry, RegistryError},
    Result,
};

use eyre::{ensure, WrapErr};

/// Dijet imbalance analysis task
pub struct DijetImbalanceTask<'cfg> {
    /// Analysis configuration
    cfg: &'cfg Configuration,

    /// Threshold grid of the dijet search
    grid: ThresholdGrid,

    /// Output histograms
    registry: HistRegistry,

    /// Number of events that went through the task
    num_events: usize,
}
//
impl<'cfg> DijetImbalanceTask<'cfg> {
    /// Set up the task, creating every histogram that it may fill
    pub fn new(cfg: &'cfg Configuration) -> Result<Self> {
        cfg.check_analysis().wrap_err("Invalid analysis configuration")?;
        let grid = ThresholdGrid::new();
        let mut registry = HistRegistry::new();
        HistogramAllocator::new(cfg, &grid)
            .allocate(&mut registry)
            .wrap_err("Failed to allocate the analysis histograms")?;
        Ok(Self {
            cfg,
            grid,
            registry,
            num_events: 0,
        })
    }

    /// Run the dijet search on every jet container of an event
    ///
    /// Returns whether the fill hook should be called for this event, which
    /// is always the case.
    ///
    pub fn run(&mut self, event: &Event) -> Result<bool> {
        ensure!(
            event.cent_bin < self.cfg.num_cent_bins,
            "Event centrality bin {} is out of range (expected less than {})",
            event.cent_bin,
            self.cfg.num_cent_bins
        );
        let selector = DijetSelector::new(&self.grid, self.cfg.delta_phi_min);
        for spec in &self.cfg.layout.jets {
            let Some(collection) = event.jets.get(&spec.name) else {
                continue;
            };
            let container = JetContainer::new(spec, collection);
            for (cell, outcome) in selector.select(&container) {
                fill_dijet_outcome(
                    &mut self.registry,
                    container.name(),
                    event.cent_bin,
                    cell,
                    &outcome,
                )
                .wrap_err("Failed to record a dijet")?;
            }
        }
        Ok(true)
    }

    /// Fill the QA histograms of an event
    pub fn fill_histograms(&mut self, event: &Event) -> Result<()> {
        qa::fill_all(&self.cfg.layout, event, &mut self.registry)
            .wrap_err("Failed to fill QA histograms")
    }

    /// Process one event through both hooks
    pub fn process_event(&mut self, event: &Event) -> Result<()> {
        if self.run(event)? {
            self.fill_histograms(event)?;
        }
        self.num_events += 1;
        Ok(())
    }

    /// Integrate the histograms of another task with the same configuration
    pub fn merge(&mut self, other: &Self) -> Result<()> {
        self.registry
            .merge(&other.registry)
            .wrap_err("Failed to merge analysis results")?;
        self.num_events += other.num_events;
        Ok(())
    }

    /// Number of events processed so far
    pub fn num_events(&self) -> usize {
        self.num_events
    }

    /// Analysis configuration
    pub fn config(&self) -> &'cfg Configuration {
        self.cfg
    }

    /// Output histograms
    pub fn registry(&self) -> &HistRegistry {
        &self.registry
    }

    /// Extract the output histograms
    pub fn into_registry(self) -> HistRegistry {
        self.registry
    }
}

/// Record the outcome of the dijet search in one grid cell
fn fill_dijet_outcome(
    registry: &mut HistRegistry,
    group: &str,
    cent_bin: usize,
    cell: GridCell,
    outcome: &DijetOutcome,
) -> Result<(), RegistryError> {
    let key = |metric| HistKey::dijet(group, metric, cent_bin, cell);
    match outcome {
        DijetOutcome::Matched(pair) => {
            let (trigger, associated) = (&pair.trigger, &pair.associated);
            registry.fill_th1(&key(DIJET_LEADING_PT), trigger.corrected_pt)?;
            registry.fill_th1(&key(DIJET_LEADING_PT_UNCORR), trigger.jet.pt)?;
            registry.fill_th1(&key(DIJET_LEADING_PHI), trigger.jet.phi)?;
            registry.fill_th1(&key(DIJET_SUBLEADING_PT), associated.corrected_pt)?;
            registry.fill_th1(&key(DIJET_SUBLEADING_PHI), associated.jet.phi)?;
            registry.fill_th1(&key(DIJET_AJ), pair.a_j())?;
            registry.fill_th1(&key(DIJET_XJ), pair.x_j())?;
            registry.fill_th1(&key(DIJET_DELTA_PHI), pair.delta_phi())?;
        }
        DijetOutcome::Unmatched {
            trigger,
            subleading,
        } => {
            registry.fill_th1(&key(UNMATCHED_LEADING_PT), trigger.corrected_pt)?;
            if let Some(subleading) = subleading {
                registry.fill_th1(&key(UNMATCHED_SUBLEADING_PT), subleading.corrected_pt)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        container::{ContainerLayout, JetContainerSpec},
        event::{Jet, JetCollection},
    };

    #[test]
    fn out_of_range_centrality_is_rejected() {
        let cfg = Configuration {
            num_cent_bins: 2,
            layout: ContainerLayout {
                jets: vec![JetContainerSpec::new("jets")],
                ..ContainerLayout::default()
            },
            ..Configuration::default()
        };
        let mut task = DijetImbalanceTask::new(&cfg).unwrap();
        assert!(task.process_event(&Event::new(2)).is_err());
        assert!(task.process_event(&Event::new(1)).is_ok());
        assert_eq!(task.num_events(), 1);
    }

    #[test]
    fn missing_container_is_skipped() {
        let cfg = Configuration {
            layout: ContainerLayout {
                jets: vec![JetContainerSpec::new("jets")],
                ..ContainerLayout::default()
            },
            ..Configuration::default()
        };
        let mut task = DijetImbalanceTask::new(&cfg).unwrap();
        let mut event = Event::new(0);
        event.jets.insert(
            "other".to_owned(),
            JetCollection {
                jets: vec![Jet::new(50., 0., 1., 0.2)],
                rho: None,
            },
        );
        task.process_event(&event).unwrap();
        assert_eq!(task.registry().total_entries(), 0);
    }

    #[test]
    fn invalid_binning_is_an_error() {
        let jets = ContainerLayout {
            jets: vec![JetContainerSpec::new("jets")],
            ..ContainerLayout::default()
        };
        let too_few_bins = Configuration {
            n_bins: 5,
            layout: jets.clone(),
            ..Configuration::default()
        };
        assert!(DijetImbalanceTask::new(&too_few_bins).is_err());

        let narrow_range = Configuration {
            min_bin_pt: 125.,
            max_bin_pt: 250.,
            layout: jets,
            ..Configuration::default()
        };
        assert!(DijetImbalanceTask::new(&narrow_range).is_err());

        // The event count only matters to the driver
        let no_events = Configuration {
            num_events: 0,
            ..Configuration::default()
        };
        assert!(DijetImbalanceTask::new(&no_events).is_ok());
    }
}
