//! Fixed-width 1D and 2D histograms with underflow and overflow bins
//!
//! Bin storage uses nalgebra's dynamically sized vectors and matrices, so that
//! merging two histograms boils down to a vectorized addition. Bin 0 is the
//! underflow bin and bin `n_bins + 1` the overflow bin on every axis.

use crate::numeric::Float;

use nalgebra::{DMatrix, DVector};

/// Regularly binned histogram axis
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Axis {
    /// Number of in-range bins
    n_bins: usize,

    /// Lower edge of the first bin (inclusive)
    min: Float,

    /// Upper edge of the last bin (exclusive)
    max: Float,
}
//
impl Axis {
    /// Define an axis with `n_bins` equal-width bins spanning [min, max)
    ///
    /// Degenerate binnings are a programming error in the histogram
    /// taxonomy, not something that can be recovered from at fill time.
    ///
    pub fn new(n_bins: usize, min: Float, max: Float) -> Self {
        assert!(n_bins > 0, "An axis needs at least one bin");
        assert!(min < max, "Axis range must be increasing");
        Self { n_bins, min, max }
    }

    /// Number of in-range bins
    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    /// Lower edge of the axis
    pub fn min(&self) -> Float {
        self.min
    }

    /// Upper edge of the axis
    pub fn max(&self) -> Float {
        self.max
    }

    /// Bin storage slot of a value, including underflow and overflow slots
    ///
    /// NaN has no meaningful bin, so it yields None.
    ///
    pub fn slot(&self, value: Float) -> Option<usize> {
        if value.is_nan() {
            None
        } else if value < self.min {
            Some(0)
        } else if value >= self.max {
            Some(self.n_bins + 1)
        } else {
            let width = (self.max - self.min) / (self.n_bins as Float);
            // Rounding can push values right below max into the overflow slot
            let bin = ((value - self.min) / width) as usize;
            Some(bin.min(self.n_bins - 1) + 1)
        }
    }

    /// Center of the in-range bin with index `bin` (0-based)
    pub fn bin_center(&self, bin: usize) -> Float {
        let width = (self.max - self.min) / (self.n_bins as Float);
        self.min + ((bin as Float) + 0.5) * width
    }

    /// Number of storage slots (in-range bins plus underflow and overflow)
    fn num_slots(&self) -> usize {
        self.n_bins + 2
    }
}

/// Unit-weight 1D histogram
#[derive(Clone, Debug)]
pub struct Histogram1D {
    /// Binning
    axis: Axis,

    /// Per-slot counts (underflow, bins..., overflow)
    counts: DVector<Float>,

    /// Number of fill calls that landed in a slot
    entries: u64,

    /// Sum of in-range fill values, for mean computation
    sum_x: Float,
}
//
impl Histogram1D {
    /// Create an empty histogram
    pub fn new(axis: Axis) -> Self {
        Self {
            axis,
            counts: DVector::zeros(axis.num_slots()),
            entries: 0,
            sum_x: 0.,
        }
    }

    /// Record one value
    pub fn fill(&mut self, x: Float) {
        if let Some(slot) = self.axis.slot(x) {
            self.counts[slot] += 1.;
            self.entries += 1;
            if slot != 0 && slot != self.axis.n_bins + 1 {
                self.sum_x += x;
            }
        }
    }

    /// Binning of this histogram
    pub fn axis(&self) -> &Axis {
        &self.axis
    }

    /// Number of recorded values (including under/overflow)
    pub fn entries(&self) -> u64 {
        self.entries
    }

    /// Count in the in-range bin `bin` (0-based)
    pub fn bin_content(&self, bin: usize) -> Float {
        self.counts[bin + 1]
    }

    /// Count of values below the axis range
    pub fn underflow(&self) -> Float {
        self.counts[0]
    }

    /// Count of values at or above the axis upper edge
    pub fn overflow(&self) -> Float {
        self.counts[self.axis.n_bins + 1]
    }

    /// Sum of in-range counts
    pub fn integral(&self) -> Float {
        self.counts.rows(1, self.axis.n_bins).sum()
    }

    /// Mean of in-range values, if there are any
    pub fn mean(&self) -> Option<Float> {
        let integral = self.integral();
        (integral > 0.).then(|| self.sum_x / integral)
    }

    /// Add the contents of another histogram with the same binning
    pub fn merge(&mut self, other: &Self) -> bool {
        if self.axis != other.axis {
            return false;
        }
        self.counts += &other.counts;
        self.entries += other.entries;
        self.sum_x += other.sum_x;
        true
    }
}

/// Unit-weight 2D histogram
#[derive(Clone, Debug)]
pub struct Histogram2D {
    /// Horizontal binning
    x_axis: Axis,

    /// Vertical binning
    y_axis: Axis,

    /// Per-slot counts, rows follow the x axis and columns the y axis
    counts: DMatrix<Float>,

    /// Number of fill calls that landed in a slot
    entries: u64,
}
//
impl Histogram2D {
    /// Create an empty histogram
    pub fn new(x_axis: Axis, y_axis: Axis) -> Self {
        Self {
            x_axis,
            y_axis,
            counts: DMatrix::zeros(x_axis.num_slots(), y_axis.num_slots()),
            entries: 0,
        }
    }

    /// Record one (x, y) pair
    pub fn fill(&mut self, x: Float, y: Float) {
        if let (Some(sx), Some(sy)) = (self.x_axis.slot(x), self.y_axis.slot(y)) {
            self.counts[(sx, sy)] += 1.;
            self.entries += 1;
        }
    }

    /// Horizontal binning
    pub fn x_axis(&self) -> &Axis {
        &self.x_axis
    }

    /// Vertical binning
    pub fn y_axis(&self) -> &Axis {
        &self.y_axis
    }

    /// Number of recorded pairs (including under/overflow)
    pub fn entries(&self) -> u64 {
        self.entries
    }

    /// Count in the in-range bin (bin_x, bin_y) (0-based)
    pub fn bin_content(&self, bin_x: usize, bin_y: usize) -> Float {
        self.counts[(bin_x + 1, bin_y + 1)]
    }

    /// Sum of counts that are in range on both axes
    pub fn integral(&self) -> Float {
        self.counts
            .view((1, 1), (self.x_axis.n_bins, self.y_axis.n_bins))
            .sum()
    }

    /// Add the contents of another histogram with the same binning
    pub fn merge(&mut self, other: &Self) -> bool {
        if self.x_axis != other.x_axis || self.y_axis != other.y_axis {
            return false;
        }
        self.counts += &other.counts;
        self.entries += other.entries;
        true
    }
}

/// Either kind of histogram, as stored in the registry
#[derive(Clone, Debug)]
pub enum Histogram {
    /// One-dimensional histogram
    OneD(Histogram1D),

    /// Two-dimensional histogram
    TwoD(Histogram2D),
}
//
impl Histogram {
    /// Number of recorded fills
    pub fn entries(&self) -> u64 {
        match self {
            Self::OneD(h) => h.entries(),
            Self::TwoD(h) => h.entries(),
        }
    }

    /// Dimensionality of the histogram
    pub fn dimension(&self) -> usize {
        match self {
            Self::OneD(_) => 1,
            Self::TwoD(_) => 2,
        }
    }

    /// Access the 1D histogram, if this is one
    pub fn as_1d(&self) -> Option<&Histogram1D> {
        match self {
            Self::OneD(h) => Some(h),
            Self::TwoD(_) => None,
        }
    }

    /// Access the 2D histogram, if this is one
    pub fn as_2d(&self) -> Option<&Histogram2D> {
        match self {
            Self::OneD(_) => None,
            Self::TwoD(h) => Some(h),
        }
    }

    /// Add the contents of another histogram of the same shape
    ///
    /// Returns false (leaving self untouched) if the shapes differ.
    ///
    pub fn merge(&mut self, other: &Self) -> bool {
        match (self, other) {
            (Self::OneD(h1), Self::OneD(h2)) => h1.merge(h2),
            (Self::TwoD(h1), Self::TwoD(h2)) => h1.merge(h2),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_slots() {
        let axis = Axis::new(10, 0., 10.);
        assert_eq!(axis.slot(-0.1), Some(0));
        assert_eq!(axis.slot(0.), Some(1));
        assert_eq!(axis.slot(9.99), Some(10));
        // The upper edge belongs to the overflow bin
        assert_eq!(axis.slot(10.), Some(11));
        assert_eq!(axis.slot(Float::NAN), None);
        assert_eq!(axis.bin_center(0), 0.5);
    }

    #[test]
    fn fill_1d() {
        let mut h = Histogram1D::new(Axis::new(4, 0., 4.));
        h.fill(0.5);
        h.fill(2.5);
        h.fill(2.7);
        h.fill(7.);
        h.fill(Float::NAN);
        assert_eq!(h.entries(), 4);
        assert_eq!(h.bin_content(2), 2.);
        assert_eq!(h.overflow(), 1.);
        assert_eq!(h.integral(), 3.);
        assert!((h.mean().unwrap() - 5.7 / 3.).abs() < 1e-6);
    }

    #[test]
    fn fill_2d() {
        let mut h = Histogram2D::new(Axis::new(2, 0., 2.), Axis::new(3, 0., 3.));
        h.fill(1.5, 0.5);
        h.fill(1.5, 5.);
        assert_eq!(h.entries(), 2);
        assert_eq!(h.bin_content(1, 0), 1.);
        assert_eq!(h.integral(), 1.);
    }

    #[test]
    fn merge_requires_same_binning() {
        let mut h1 = Histogram::OneD(Histogram1D::new(Axis::new(4, 0., 4.)));
        let mut h2 = Histogram1D::new(Axis::new(4, 0., 4.));
        h2.fill(1.);
        assert!(h1.merge(&Histogram::OneD(h2)));
        assert_eq!(h1.entries(), 1);

        let h3 = Histogram::OneD(Histogram1D::new(Axis::new(5, 0., 4.)));
        assert!(!h1.merge(&h3));
        let h4 = Histogram::TwoD(Histogram2D::new(Axis::new(4, 0., 4.), Axis::new(1, 0., 1.)));
        assert!(!h1.merge(&h4));
        assert_eq!(h1.entries(), 1);
    }
}
