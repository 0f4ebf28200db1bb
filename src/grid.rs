//! The grid of dijet selection thresholds
//!
//! Every event is analyzed under a set of parallel selections, each of which
//! is defined by a leading-hadron cut, a minimal trigger jet pt and a minimal
//! associated jet pt (expressed as a fraction of the trigger threshold). The
//! grid is the cartesian product of these, enumerated once in a fixed order.

use crate::numeric::Float;

use std::fmt::{self, Display};

/// Minimal leading-hadron pt of the trigger jet (GeV), indexed by `k`
pub const LEADING_HADRON_CUTS: [Float; 2] = [0., 5.];

/// Minimal corrected pt of the trigger jet (GeV), indexed by `i`
pub const TRIGGER_MIN_PTS: [Float; 4] = [35., 40., 45., 50.];

/// Minimal associated jet pt, as a fraction of the trigger threshold,
/// indexed by `j`
pub const ASSOCIATED_PT_FRACTIONS: [Float; 4] = [0., 0.4, 0.5, 0.6];

/// Number of cells in the threshold grid
pub const NUM_GRID_CELLS: usize =
    LEADING_HADRON_CUTS.len() * TRIGGER_MIN_PTS.len() * ASSOCIATED_PT_FRACTIONS.len();

/// One set of dijet selection thresholds
///
/// Only the indices are stored, so that cells can be hashed and ordered
/// structurally. Thresholds are derived from the tables above.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GridCell {
    /// Leading-hadron cut index
    hadron: u8,

    /// Trigger threshold index
    trigger: u8,

    /// Associated threshold index
    associated: u8,
}
//
impl GridCell {
    /// Build a cell from its (k, i, j) indices, if they are in range
    pub fn new(hadron: usize, trigger: usize, associated: usize) -> Option<Self> {
        if hadron < LEADING_HADRON_CUTS.len()
            && trigger < TRIGGER_MIN_PTS.len()
            && associated < ASSOCIATED_PT_FRACTIONS.len()
        {
            Some(Self {
                hadron: hadron as u8,
                trigger: trigger as u8,
                associated: associated as u8,
            })
        } else {
            None
        }
    }

    /// Leading-hadron cut index (k)
    pub fn hadron_index(&self) -> usize {
        self.hadron as usize
    }

    /// Trigger threshold index (i)
    pub fn trigger_index(&self) -> usize {
        self.trigger as usize
    }

    /// Associated threshold index (j)
    pub fn associated_index(&self) -> usize {
        self.associated as usize
    }

    /// Minimal leading-hadron pt of the trigger jet
    pub fn hadron_cut(&self) -> Float {
        LEADING_HADRON_CUTS[self.hadron_index()]
    }

    /// Minimal corrected pt of the trigger jet
    pub fn trigger_min_pt(&self) -> Float {
        TRIGGER_MIN_PTS[self.trigger_index()]
    }

    /// Minimal corrected pt of the associated jet
    pub fn associated_min_pt(&self) -> Float {
        self.trigger_min_pt() * ASSOCIATED_PT_FRACTIONS[self.associated_index()]
    }
}

impl Display for GridCell {
    /// Histogram name suffix of this cell, e.g. `had1_trig0_ass3`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "had{}_trig{}_ass{}",
            self.hadron, self.trigger, self.associated
        )
    }
}

/// Ordered table of all threshold cells
#[derive(Clone, Debug)]
pub struct ThresholdGrid {
    cells: Vec<GridCell>,
}
//
impl ThresholdGrid {
    /// Enumerate the full grid, hadron cut outermost and associated
    /// threshold innermost
    pub fn new() -> Self {
        let mut cells = Vec::with_capacity(NUM_GRID_CELLS);
        for k in 0..LEADING_HADRON_CUTS.len() {
            for i in 0..TRIGGER_MIN_PTS.len() {
                for j in 0..ASSOCIATED_PT_FRACTIONS.len() {
                    cells.extend(GridCell::new(k, i, j));
                }
            }
        }
        debug_assert_eq!(cells.len(), NUM_GRID_CELLS);
        Self { cells }
    }

    /// Iterate over the cells in grid order
    pub fn iter(&self) -> impl Iterator<Item = GridCell> + '_ {
        self.cells.iter().copied()
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Truth that the grid has no cell (never the case for the full grid)
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Default for ThresholdGrid {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn grid_order_and_size() {
        let grid = ThresholdGrid::new();
        assert_eq!(grid.len(), 32);
        let cells = grid.iter().collect::<Vec<_>>();
        assert_eq!(cells[0], GridCell::new(0, 0, 0).unwrap());
        assert_eq!(cells[1], GridCell::new(0, 0, 1).unwrap());
        assert_eq!(cells[4], GridCell::new(0, 1, 0).unwrap());
        assert_eq!(cells[16], GridCell::new(1, 0, 0).unwrap());
        assert_eq!(cells[31], GridCell::new(1, 3, 3).unwrap());
        assert!(cells.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn derived_thresholds() {
        let cell = GridCell::new(1, 2, 3).unwrap();
        assert_eq!(cell.hadron_cut(), 5.);
        assert_eq!(cell.trigger_min_pt(), 45.);
        assert_relative_eq!(
            cell.associated_min_pt(),
            27.,
            max_relative = 4. * Float::EPSILON
        );
        assert_eq!(GridCell::new(0, 3, 0).unwrap().associated_min_pt(), 0.);
        assert_eq!(cell.to_string(), "had1_trig2_ass3");
    }

    #[test]
    fn out_of_range_cells() {
        assert!(GridCell::new(2, 0, 0).is_none());
        assert!(GridCell::new(0, 4, 0).is_none());
        assert!(GridCell::new(0, 0, 4).is_none());
    }
}
