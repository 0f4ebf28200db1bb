//! Dijet pairing: trigger selection, associated jet search and outcome
//! classification
//!
//! For each jet container, the leading jet of the event is taken as the
//! trigger. Then, for every cell of the threshold grid that the trigger
//! passes, the hardest accepted jet which is far enough in azimuth is looked
//! up as the associated jet. Cells where no such jet exists yield an
//! "unmatched" outcome, which records the trigger and the hardest jet that
//! is softer than it.
//!
//! All candidate scans walk the accepted jets in container order and only
//! replace the current best on a strictly larger corrected pt, so the first
//! jet wins ties. This ordering is part of the analysis definition.

use crate::{
    container::JetContainer,
    event::Jet,
    grid::{GridCell, ThresholdGrid},
    numeric::Float,
};

use log::trace;
use prefix_num_ops::real::*;

/// Margin below the trigger pt which a jet must reach to be considered the
/// subleading jet of an unmatched trigger
///
/// This keeps the trigger itself (and numerically identical copies of it) out
/// of the subleading jet search.
///
pub const UNMATCHED_PT_MARGIN: Float = 0.01;

/// Trigger jet of a container, with its derived quantities
#[derive(Clone, Copy, Debug)]
pub struct TriggerJet<'a> {
    /// The leading jet
    pub jet: &'a Jet,

    /// Its background-corrected pt
    pub corrected_pt: Float,

    /// Its leading hadron pt
    pub leading_hadron_pt: Float,
}
//
impl<'a> TriggerJet<'a> {
    /// Pick the trigger jet of a container, if it has any accepted jet
    pub fn find(container: &JetContainer<'a>) -> Option<Self> {
        container.leading_jet().map(|jet| Self {
            jet,
            corrected_pt: container.corrected_pt(jet),
            leading_hadron_pt: container.leading_hadron_pt(jet),
        })
    }
}

/// A jet picked by a candidate scan, with its corrected pt
#[derive(Clone, Copy, Debug)]
pub struct Candidate<'a> {
    /// The jet
    pub jet: &'a Jet,

    /// Its background-corrected pt
    pub corrected_pt: Float,
}

/// Hardest accepted jet that satisfies a predicate on (jet, corrected pt)
///
/// Jets are scanned in container order, and a jet only replaces the current
/// best one if its corrected pt is strictly larger.
///
fn hardest_accepted<'a>(
    container: &JetContainer<'a>,
    mut predicate: impl FnMut(&Jet, Float) -> bool,
) -> Option<Candidate<'a>> {
    let mut best: Option<Candidate<'a>> = None;
    for jet in container.accepted() {
        let corrected_pt = container.corrected_pt(jet);
        if !predicate(jet, corrected_pt) {
            continue;
        }
        if let Some(b) = best {
            if corrected_pt <= b.corrected_pt {
                continue;
            }
        }
        best = Some(Candidate { jet, corrected_pt });
    }
    best
}

/// Look for the associated jet of a trigger
///
/// The candidate must have a corrected pt of at least `min_pt`, and an
/// azimuthal distance to the trigger of at least `delta_phi_min`. The
/// distance is not wrapped around 2𝜋. The trigger itself is not excluded
/// from the candidates.
///
pub fn find_associated<'a>(
    container: &JetContainer<'a>,
    trigger: &TriggerJet<'a>,
    min_pt: Float,
    delta_phi_min: Float,
) -> Option<Candidate<'a>> {
    let trig_phi = trigger.jet.phi;
    hardest_accepted(container, |jet, corrected_pt| {
        corrected_pt >= min_pt && abs(trig_phi - jet.phi) >= delta_phi_min
    })
}

/// Look for the subleading jet of an unmatched trigger
///
/// This is the hardest jet whose corrected pt lies below the trigger's by
/// more than [`UNMATCHED_PT_MARGIN`], irrespective of its azimuth.
///
pub fn find_unmatched_subleading<'a>(
    container: &JetContainer<'a>,
    trigger_pt: Float,
) -> Option<Candidate<'a>> {
    hardest_accepted(container, |_jet, corrected_pt| {
        corrected_pt < trigger_pt - UNMATCHED_PT_MARGIN
    })
}

/// Trigger and associated jet forming a dijet
#[derive(Clone, Copy, Debug)]
pub struct DijetPair<'a> {
    /// Trigger (leading) jet
    pub trigger: TriggerJet<'a>,

    /// Associated (subleading) jet
    pub associated: Candidate<'a>,
}
//
impl DijetPair<'_> {
    /// Momentum imbalance A_J = (pt1 - pt2) / (pt1 + pt2)
    pub fn a_j(&self) -> Float {
        let (trig_pt, ass_pt) = (self.trigger.corrected_pt, self.associated.corrected_pt);
        (trig_pt - ass_pt) / (trig_pt + ass_pt)
    }

    /// Momentum balance x_J = pt2 / pt1
    pub fn x_j(&self) -> Float {
        self.associated.corrected_pt / self.trigger.corrected_pt
    }

    /// Absolute azimuthal difference, not wrapped into [0, 𝜋]
    pub fn delta_phi(&self) -> Float {
        abs(self.trigger.jet.phi - self.associated.jet.phi)
    }
}

/// What became of a trigger jet under one set of thresholds
#[derive(Clone, Copy, Debug)]
pub enum DijetOutcome<'a> {
    /// An associated jet was found
    Matched(DijetPair<'a>),

    /// No associated jet was found
    Unmatched {
        /// The trigger jet
        trigger: TriggerJet<'a>,

        /// Hardest jet softer than the trigger, if any
        subleading: Option<Candidate<'a>>,
    },
}

/// Runs the dijet search of a jet container over the threshold grid
#[derive(Clone, Copy, Debug)]
pub struct DijetSelector<'grid> {
    /// Threshold grid
    grid: &'grid ThresholdGrid,

    /// Minimal azimuthal separation of trigger and associated jets
    delta_phi_min: Float,
}
//
impl<'grid> DijetSelector<'grid> {
    /// Set up a selector
    pub fn new(grid: &'grid ThresholdGrid, delta_phi_min: Float) -> Self {
        Self {
            grid,
            delta_phi_min,
        }
    }

    /// Classify a trigger under one grid cell
    ///
    /// Returns None when the trigger fails the cell's leading-hadron or
    /// trigger pt cut, in which case nothing should be recorded.
    ///
    pub fn evaluate_cell<'a>(
        &self,
        container: &JetContainer<'a>,
        trigger: &TriggerJet<'a>,
        cell: GridCell,
    ) -> Option<DijetOutcome<'a>> {
        if trigger.leading_hadron_pt < cell.hadron_cut() {
            return None;
        }
        if trigger.corrected_pt < cell.trigger_min_pt() {
            return None;
        }
        let outcome = match find_associated(
            container,
            trigger,
            cell.associated_min_pt(),
            self.delta_phi_min,
        ) {
            Some(associated) => DijetOutcome::Matched(DijetPair {
                trigger: *trigger,
                associated,
            }),
            None => DijetOutcome::Unmatched {
                trigger: *trigger,
                subleading: find_unmatched_subleading(container, trigger.corrected_pt),
            },
        };
        Some(outcome)
    }

    /// Run the dijet search of one container over the whole grid
    ///
    /// Outcomes are produced in grid order. A container without accepted
    /// jets produces no outcome.
    ///
    pub fn select<'a>(&self, container: &JetContainer<'a>) -> Vec<(GridCell, DijetOutcome<'a>)> {
        let Some(trigger) = TriggerJet::find(container) else {
            trace!("{}: no trigger jet in this event", container.name());
            return Vec::new();
        };
        trace!(
            "{}: trigger jet with pt={} (corrected {}), phi={}, leading hadron pt={}",
            container.name(),
            trigger.jet.pt,
            trigger.corrected_pt,
            trigger.jet.phi,
            trigger.leading_hadron_pt
        );
        self.grid
            .iter()
            .filter_map(|cell| {
                self.evaluate_cell(container, &trigger, cell)
                    .map(|outcome| (cell, outcome))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{container::JetContainerSpec, event::JetCollection};

    fn jet(pt: Float, phi: Float) -> Jet {
        Jet::new(pt, 0., phi, 0.2).with_max_charged_pt(10.)
    }

    #[test]
    fn trigger_uses_corrected_pt() {
        let spec = JetContainerSpec::new("jets").with_rho("Rho");
        let jets = JetCollection {
            jets: vec![jet(60., 1.)],
            rho: Some(50.),
        };
        let container = JetContainer::new(&spec, &jets);
        let trigger = TriggerJet::find(&container).unwrap();
        assert_eq!(trigger.corrected_pt, 50.);
        assert_eq!(trigger.leading_hadron_pt, 10.);
    }

    #[test]
    fn unmatched_margin() {
        let spec = JetContainerSpec::new("jets");
        let jets = JetCollection {
            jets: vec![jet(40., 1.), jet(39.995, 1.1), jet(30., 1.2)],
            rho: None,
        };
        let container = JetContainer::new(&spec, &jets);
        let sub = find_unmatched_subleading(&container, 40.).unwrap();
        assert_eq!(sub.corrected_pt, 30.);
        assert!(find_unmatched_subleading(&container, 30.).is_none());
    }

    #[test]
    fn cells_are_skipped_below_thresholds() {
        let spec = JetContainerSpec::new("jets");
        let jets = JetCollection {
            jets: vec![jet(42., 0.1), jet(20., 3.5)],
            rho: None,
        };
        let container = JetContainer::new(&spec, &jets);
        let grid = ThresholdGrid::new();
        let outcomes = DijetSelector::new(&grid, 2.).select(&container);
        // Trigger thresholds 35 and 40 pass, for both hadron cuts
        assert_eq!(outcomes.len(), 2 * 2 * 4);
        assert!(outcomes
            .iter()
            .all(|(cell, _)| cell.trigger_index() < 2));
    }
}
