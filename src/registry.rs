//! Named histogram registry shared by the allocation and fill phases
//!
//! Histograms are identified by a structured [`HistKey`]. The registry is
//! strict: creating a key twice or filling a key that was never created are
//! both reported as errors, since either means that the allocation and fill
//! phases disagree on the histogram taxonomy.

use crate::{
    grid::GridCell,
    histogram::{Axis, Histogram, Histogram1D, Histogram2D},
    numeric::Float,
};

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::{self, Display},
};
use thiserror::Error;

/// Structured histogram identifier
///
/// Its string form, produced by `Display`, is `<group>/<metric>_<cent>` for
/// QA histograms and `<group>/<metric>_<cent>_had<k>_trig<i>_ass<j>` for
/// histograms that belong to a threshold grid cell.
///
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HistKey {
    /// Histogram group, which is the name of the source container
    pub group: String,

    /// Observable name
    pub metric: &'static str,

    /// Centrality bin
    pub cent_bin: usize,

    /// Threshold grid cell, for dijet histograms
    pub cell: Option<GridCell>,
}
//
impl HistKey {
    /// Key of a per-container QA histogram
    pub fn qa(group: &str, metric: &'static str, cent_bin: usize) -> Self {
        Self {
            group: group.to_owned(),
            metric,
            cent_bin,
            cell: None,
        }
    }

    /// Key of a dijet histogram
    pub fn dijet(group: &str, metric: &'static str, cent_bin: usize, cell: GridCell) -> Self {
        Self {
            group: group.to_owned(),
            metric,
            cent_bin,
            cell: Some(cell),
        }
    }
}

impl Display for HistKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}_{}", self.group, self.metric, self.cent_bin)?;
        if let Some(cell) = self.cell {
            write!(f, "_{}", cell)?;
        }
        Ok(())
    }
}

/// Things that can go wrong when manipulating the registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A histogram was created twice
    #[error("histogram {0} was already created")]
    Duplicate(String),

    /// A histogram was filled without having been created
    #[error("histogram {0} was never created (allocation and fill disagree)")]
    Unknown(String),

    /// A histogram was filled with the wrong number of coordinates
    #[error("histogram {key} is {actual}D but was filled as {requested}D")]
    Dimension {
        /// Offending histogram
        key: String,
        /// Dimension of the stored histogram
        actual: usize,
        /// Dimension implied by the fill call
        requested: usize,
    },

    /// Two registries could not be merged
    #[error("cannot merge histogram {0}: binning or key set differ")]
    Incompatible(String),
}

/// Histogram storage of one analysis task
#[derive(Clone, Debug, Default)]
pub struct HistRegistry {
    /// Registered groups
    groups: BTreeSet<String>,

    /// Histograms and titles, ordered by key
    hists: BTreeMap<HistKey, (String, Histogram)>,
}
//
impl HistRegistry {
    /// Set up an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a histogram group (registering it again is harmless)
    pub fn create_group(&mut self, group: &str) {
        if !self.groups.contains(group) {
            self.groups.insert(group.to_owned());
        }
    }

    /// Create a 1D histogram
    pub fn create_th1(
        &mut self,
        key: HistKey,
        title: &str,
        axis: Axis,
    ) -> Result<(), RegistryError> {
        self.insert(key, title, Histogram::OneD(Histogram1D::new(axis)))
    }

    /// Create a 2D histogram
    pub fn create_th2(
        &mut self,
        key: HistKey,
        title: &str,
        x_axis: Axis,
        y_axis: Axis,
    ) -> Result<(), RegistryError> {
        self.insert(
            key,
            title,
            Histogram::TwoD(Histogram2D::new(x_axis, y_axis)),
        )
    }

    /// Shared histogram insertion logic
    fn insert(&mut self, key: HistKey, title: &str, hist: Histogram) -> Result<(), RegistryError> {
        if self.hists.contains_key(&key) {
            return Err(RegistryError::Duplicate(key.to_string()));
        }
        self.create_group(&key.group);
        // ROOT-style title: the histogram name, followed by axis labels
        let title = format!("{};{}", key, title);
        self.hists.insert(key, (title, hist));
        Ok(())
    }

    /// Record a value into a 1D histogram
    pub fn fill_th1(&mut self, key: &HistKey, x: Float) -> Result<(), RegistryError> {
        match self.lookup_mut(key)? {
            Histogram::OneD(h) => {
                h.fill(x);
                Ok(())
            }
            Histogram::TwoD(_) => Err(RegistryError::Dimension {
                key: key.to_string(),
                actual: 2,
                requested: 1,
            }),
        }
    }

    /// Record a pair of values into a 2D histogram
    pub fn fill_th2(&mut self, key: &HistKey, x: Float, y: Float) -> Result<(), RegistryError> {
        match self.lookup_mut(key)? {
            Histogram::TwoD(h) => {
                h.fill(x, y);
                Ok(())
            }
            Histogram::OneD(_) => Err(RegistryError::Dimension {
                key: key.to_string(),
                actual: 1,
                requested: 2,
            }),
        }
    }

    /// Find a histogram for filling, or report the taxonomy mismatch
    fn lookup_mut(&mut self, key: &HistKey) -> Result<&mut Histogram, RegistryError> {
        self.hists
            .get_mut(key)
            .map(|(_title, hist)| hist)
            .ok_or_else(|| RegistryError::Unknown(key.to_string()))
    }

    /// Access a histogram by key
    pub fn get(&self, key: &HistKey) -> Option<&Histogram> {
        self.hists.get(key).map(|(_title, hist)| hist)
    }

    /// Title of a histogram
    pub fn title(&self, key: &HistKey) -> Option<&str> {
        self.hists.get(key).map(|(title, _hist)| title.as_str())
    }

    /// Truth that a key was created
    pub fn contains(&self, key: &HistKey) -> bool {
        self.hists.contains_key(key)
    }

    /// Registered groups, in lexicographic order
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(String::as_str)
    }

    /// All histograms, in key order
    pub fn iter(&self) -> impl Iterator<Item = (&HistKey, &Histogram)> {
        self.hists.iter().map(|(key, (_title, hist))| (key, hist))
    }

    /// Number of histograms
    pub fn len(&self) -> usize {
        self.hists.len()
    }

    /// Truth that no histogram was created
    pub fn is_empty(&self) -> bool {
        self.hists.is_empty()
    }

    /// Total number of fills recorded across all histograms
    pub fn total_entries(&self) -> u64 {
        self.hists.values().map(|(_title, hist)| hist.entries()).sum()
    }

    /// Total number of fills recorded in the histograms of one group
    pub fn group_entries(&self, group: &str) -> u64 {
        self.iter()
            .filter(|(key, _)| key.group == group)
            .map(|(_, hist)| hist.entries())
            .sum()
    }

    /// Integrate the histograms of another registry into this one
    ///
    /// Both registries must have been allocated from the same layout. The
    /// check happens before any histogram is touched, so a failed merge
    /// leaves self unchanged.
    ///
    pub fn merge(&mut self, other: &Self) -> Result<(), RegistryError> {
        if self.hists.len() != other.hists.len() {
            return Err(RegistryError::Incompatible(format!(
                "<{} vs {} histograms>",
                self.hists.len(),
                other.hists.len()
            )));
        }
        for ((key1, (_, h1)), (key2, (_, h2))) in self.hists.iter().zip(other.hists.iter()) {
            let compatible = key1 == key2
                && match (h1, h2) {
                    (Histogram::OneD(a), Histogram::OneD(b)) => a.axis() == b.axis(),
                    (Histogram::TwoD(a), Histogram::TwoD(b)) => {
                        a.x_axis() == b.x_axis() && a.y_axis() == b.y_axis()
                    }
                    _ => false,
                };
            if !compatible {
                return Err(RegistryError::Incompatible(key2.to_string()));
            }
        }
        for ((_, (_, h1)), (_, (_, h2))) in self.hists.iter_mut().zip(other.hists.iter()) {
            let merged = h1.merge(h2);
            debug_assert!(merged, "Compatibility was checked above");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell() -> GridCell {
        GridCell::new(1, 2, 3).unwrap()
    }

    #[test]
    fn key_strings() {
        let qa = HistKey::qa("Jet_AKTChargedR020", "histJetPt", 3);
        assert_eq!(qa.to_string(), "Jet_AKTChargedR020/histJetPt_3");
        let dijet = HistKey::dijet("Jet_AKTChargedR020", "histDijetAJ", 0, cell());
        assert_eq!(
            dijet.to_string(),
            "Jet_AKTChargedR020/histDijetAJ_0_had1_trig2_ass3"
        );
    }

    #[test]
    fn duplicate_creation_is_rejected() {
        let mut reg = HistRegistry::new();
        let key = HistKey::qa("jets", "histJetPt", 0);
        reg.create_th1(key.clone(), "p_T;counts", Axis::new(10, 0., 10.))
            .unwrap();
        assert_eq!(
            reg.create_th1(key.clone(), "p_T;counts", Axis::new(10, 0., 10.)),
            Err(RegistryError::Duplicate("jets/histJetPt_0".to_owned()))
        );
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.title(&key), Some("jets/histJetPt_0;p_T;counts"));
        assert_eq!(reg.groups().collect::<Vec<_>>(), vec!["jets"]);
    }

    #[test]
    fn unknown_and_mismatched_fills_fail() {
        let mut reg = HistRegistry::new();
        let key1 = HistKey::qa("jets", "histJetPt", 0);
        let key2 = HistKey::qa("jets", "histJetEtaPhi", 0);
        reg.create_th1(key1.clone(), "", Axis::new(10, 0., 10.)).unwrap();
        reg.create_th2(key2.clone(), "", Axis::new(2, -1., 1.), Axis::new(2, 0., 6.3))
            .unwrap();

        assert!(matches!(
            reg.fill_th1(&HistKey::qa("jets", "histJetPt", 1), 1.),
            Err(RegistryError::Unknown(name)) if name == "jets/histJetPt_1"
        ));
        assert!(matches!(
            reg.fill_th2(&key1, 1., 1.),
            Err(RegistryError::Dimension { actual: 1, requested: 2, .. })
        ));
        assert!(matches!(
            reg.fill_th1(&key2, 1.),
            Err(RegistryError::Dimension { actual: 2, requested: 1, .. })
        ));

        reg.fill_th1(&key1, 1.).unwrap();
        reg.fill_th2(&key2, 0.5, 1.).unwrap();
        assert_eq!(reg.total_entries(), 2);
        assert_eq!(key1.to_string(), "jets/histJetPt_0");
        assert_eq!(reg.get(&key1).unwrap().entries(), 1);
    }

    #[test]
    fn merge_registries() {
        let build = || {
            let mut reg = HistRegistry::new();
            reg.create_th1(HistKey::dijet("jets", "histDijetAJ", 0, cell()), "", Axis::new(100, 0., 1.))
                .unwrap();
            reg
        };
        let key = HistKey::dijet("jets", "histDijetAJ", 0, cell());
        let mut reg1 = build();
        let mut reg2 = build();
        reg1.fill_th1(&key, 0.25).unwrap();
        reg2.fill_th1(&key, 0.25).unwrap();
        reg1.merge(&reg2).unwrap();
        assert_eq!(reg1.get(&key).unwrap().entries(), 2);

        let other = HistRegistry::new();
        assert!(reg1.merge(&other).is_err());
        assert_eq!(reg1.total_entries(), 2);
    }
}
