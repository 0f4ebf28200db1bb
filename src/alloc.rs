//! Up-front creation of every histogram that the fill phase may reference
//!
//! One set of QA histograms is created per (container, centrality bin), and
//! one set of dijet histograms per (jet container, centrality bin, threshold
//! grid cell). Histogram names live in the [`names`] module, which both this
//! allocator and the fill code use, so that the two phases cannot disagree on
//! spelling.

use crate::{
    config::Configuration,
    grid::ThresholdGrid,
    histogram::Axis,
    numeric::{floats::consts::TAU, Float},
    registry::{HistKey, HistRegistry, RegistryError},
};

use log::debug;

/// Histogram (metric) names
#[allow(missing_docs)]
pub mod names {
    // Jet QA
    pub const JET_PT: &str = "histJetPt";
    pub const JET_AREA: &str = "histJetArea";
    pub const JET_PHI: &str = "histJetPhi";
    pub const JET_ETA: &str = "histJetEta";
    pub const JET_ETA_PHI: &str = "histJetEtaPhi";
    pub const N_JETS: &str = "histNJets";
    pub const JET_CORR_PT: &str = "histJetCorrPt";
    pub const JET_RHO: &str = "histJetRho";

    // Dijets, matched
    pub const DIJET_LEADING_PT: &str = "histDijetLeadingJetPt";
    pub const DIJET_LEADING_PT_UNCORR: &str = "histDijetLeadingJetPtuncorr";
    pub const DIJET_SUBLEADING_PT: &str = "histDijetSubleadingJetPt";
    pub const DIJET_LEADING_PHI: &str = "histDijetLeadingJetPhi";
    pub const DIJET_SUBLEADING_PHI: &str = "histDijetSubleadingJetPhi";
    pub const DIJET_AJ: &str = "histDijetAJ";
    pub const DIJET_XJ: &str = "histDijetxJ";
    pub const DIJET_DELTA_PHI: &str = "histDijetDeltaPhi";

    // Dijets, unmatched
    pub const UNMATCHED_LEADING_PT: &str = "histUnmatchedLeadingJetPt";
    pub const UNMATCHED_SUBLEADING_PT: &str = "histUnmatchedSubleadingJetPt";

    // Track QA
    pub const TRACK_PT: &str = "histTrackPt";
    pub const TRACK_PHI: &str = "histTrackPhi";
    pub const TRACK_ETA: &str = "histTrackEta";
    pub const TRACK_DELTA_ETA_PT: &str = "fHistDeltaEtaPt";
    pub const TRACK_DELTA_PHI_PT: &str = "fHistDeltaPhiPt";
    pub const TRACK_DELTA_PT_VS_PT: &str = "fHistDeltaPtvsPt";
    pub const TRACK_E_OVER_P_VS_P: &str = "fHistEoverPvsP";
    pub const N_TRACKS: &str = "histNTracks";

    // Cluster QA, all calorimeters
    pub const CLUSTER_ENERGY: &str = "histClusterEnergy";
    pub const CLUSTER_ETA_PHI: &str = "histClusterEtaPhi";
    pub const N_CLUSTERS: &str = "histNClusters";

    // Cluster QA, EMCal
    pub const EMCAL_ENERGY: &str = "histEMCalClusterEnergy";
    pub const EMCAL_ENERGY_EXOTIC: &str = "histEMCalClusterEnergyExotic";
    pub const EMCAL_NONLIN_CORR_ENERGY: &str = "histEMCalClusterNonLinCorrEnergy";
    pub const EMCAL_HAD_CORR_ENERGY: &str = "histEMCalClusterHadCorrEnergy";
    pub const EMCAL_PHI: &str = "histEMCalClusterPhi";
    pub const EMCAL_ETA: &str = "histEMCalClusterEta";
    pub const N_EMCAL_CLUSTERS: &str = "histEMCalNClusters";

    // Cluster QA, PHOS
    pub const PHOS_ENERGY: &str = "histPHOSClusterEnergy";
    pub const PHOS_PHI: &str = "histPHOSClusterPhi";
    pub const PHOS_ETA: &str = "histPHOSClusterEta";
    pub const N_PHOS_CLUSTERS: &str = "histPHOSNClusters";

    // Cell QA
    pub const CELL_ENERGY_VS_ABS_ID: &str = "histCellEnergyvsAbsId";
    pub const N_CELLS: &str = "histNCells";
}

use self::names::*;

/// Binning of a dijet histogram
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DijetAxis {
    /// Main pt axis of the configuration
    Pt,
    /// 100 bins over [0, 2𝜋)
    Phi,
    /// 100 bins over [0, 1)
    Fraction,
    /// 100 bins over [0, 4)
    DeltaPhi,
}

/// Dijet histograms created for every threshold grid cell, as (name, title,
/// binning)
pub const DIJET_METRICS: [(&str, &str, DijetAxis); 10] = [
    (DIJET_LEADING_PT, "Leading Jet p_{T} (GeV);counts", DijetAxis::Pt),
    (
        DIJET_LEADING_PT_UNCORR,
        "Uncorrected Leading Jet p_{T} (GeV);counts",
        DijetAxis::Pt,
    ),
    (DIJET_SUBLEADING_PT, "Subleading Jet p_{T} (GeV);counts", DijetAxis::Pt),
    (DIJET_LEADING_PHI, "Leading Jet #phi;counts", DijetAxis::Phi),
    (DIJET_SUBLEADING_PHI, "Subleading Jet #phi;counts", DijetAxis::Phi),
    (DIJET_AJ, "A_{J};counts", DijetAxis::Fraction),
    (DIJET_XJ, "x_{J};counts", DijetAxis::Fraction),
    (DIJET_DELTA_PHI, "#Delta#phi;counts", DijetAxis::DeltaPhi),
    (UNMATCHED_LEADING_PT, "Leading Jet p_{T} (GeV);counts", DijetAxis::Pt),
    (
        UNMATCHED_SUBLEADING_PT,
        "Subleading Jet p_{T} (GeV);counts",
        DijetAxis::Pt,
    ),
];

/// Number of bins of the absolute cell ID axis
const NUM_CELL_IDS: usize = 20_000;

/// Creates the histogram taxonomy of the analysis
pub struct HistogramAllocator<'a> {
    /// Analysis configuration
    cfg: &'a Configuration,

    /// Threshold grid of the dijet block
    grid: &'a ThresholdGrid,
}
//
impl<'a> HistogramAllocator<'a> {
    /// Prepare to allocate histograms for a given configuration
    pub fn new(cfg: &'a Configuration, grid: &'a ThresholdGrid) -> Self {
        Self { cfg, grid }
    }

    /// Create every histogram of the analysis
    pub fn allocate(&self, registry: &mut HistRegistry) -> Result<(), RegistryError> {
        self.allocate_cluster_histograms(registry)?;
        self.allocate_track_histograms(registry)?;
        self.allocate_jet_histograms(registry)?;
        self.allocate_cell_histograms(registry)?;
        self.allocate_dijet_histograms(registry)?;
        debug!(
            "Allocated {} histograms in {} groups",
            registry.len(),
            registry.groups().count()
        );
        Ok(())
    }

    // ### AXES ###

    /// Main pt axis
    fn pt_axis(&self) -> Axis {
        Axis::new(self.cfg.n_bins, self.cfg.min_bin_pt, self.cfg.max_bin_pt)
    }

    /// Coarser pt axis with the main bin width, for particles and clusters
    fn half_pt_axis(&self) -> Axis {
        Axis::new(
            self.cfg.n_bins / 2,
            self.cfg.min_bin_pt,
            self.cfg.max_bin_pt / 2.,
        )
    }

    /// Half as many bins over the main pt range
    fn coarse_pt_axis(&self) -> Axis {
        Axis::new(self.cfg.n_bins / 2, self.cfg.min_bin_pt, self.cfg.max_bin_pt)
    }

    /// Azimuth axis
    fn phi_axis(&self) -> Axis {
        Axis::new(self.cfg.n_bins / 2, 0., TAU)
    }

    /// Pseudorapidity axis
    fn eta_axis(&self) -> Axis {
        Axis::new(self.cfg.n_bins / 6, -1., 1.)
    }

    /// Object multiplicity axis, which depends on the collision system
    fn multiplicity_axis(&self, nucleus: (usize, Float), pp: (usize, Float)) -> Axis {
        let (n_bins, max) = if self.cfg.beam_type.is_pp() { pp } else { nucleus };
        Axis::new(n_bins, 0., max)
    }

    // ### QA HISTOGRAMS ###

    /// Cluster energy, direction and multiplicity, for all calorimeters and
    /// then separately for EMCal and PHOS
    fn allocate_cluster_histograms(&self, registry: &mut HistRegistry) -> Result<(), RegistryError> {
        let n_clusters = || self.multiplicity_axis((500, 3000.), (200, 200.));
        for cont in &self.cfg.layout.clusters {
            let group = cont.name.as_str();
            registry.create_group(group);
            for cent in 0..self.cfg.num_cent_bins {
                let key = |metric| HistKey::qa(group, metric, cent);

                registry.create_th1(key(CLUSTER_ENERGY), "#it{E}_{cluster} (GeV);counts", self.half_pt_axis())?;
                registry.create_th2(
                    key(CLUSTER_ETA_PHI),
                    "#it{#eta}_{cluster};#it{#phi}_{cluster};counts",
                    self.eta_axis(),
                    self.phi_axis(),
                )?;
                registry.create_th1(key(N_CLUSTERS), "number of clusters;events", n_clusters())?;

                registry.create_th1(key(EMCAL_ENERGY), "#it{E}_{cluster} (GeV);counts", self.half_pt_axis())?;
                registry.create_th1(
                    key(EMCAL_ENERGY_EXOTIC),
                    "#it{E}_{cluster}^{exotic} (GeV);counts",
                    self.half_pt_axis(),
                )?;
                registry.create_th1(
                    key(EMCAL_NONLIN_CORR_ENERGY),
                    "#it{E}_{cluster}^{non-lin.corr.} (GeV);counts",
                    self.half_pt_axis(),
                )?;
                registry.create_th1(
                    key(EMCAL_HAD_CORR_ENERGY),
                    "#it{E}_{cluster}^{had.corr.} (GeV);counts",
                    self.half_pt_axis(),
                )?;
                registry.create_th1(key(EMCAL_PHI), "#it{#phi}_{cluster};counts", self.phi_axis())?;
                registry.create_th1(key(EMCAL_ETA), "#it{#eta}_{cluster};counts", self.eta_axis())?;
                registry.create_th1(key(N_EMCAL_CLUSTERS), "number of clusters;events", n_clusters())?;

                registry.create_th1(key(PHOS_ENERGY), "#it{E}_{cluster} (GeV);counts", self.half_pt_axis())?;
                registry.create_th1(key(PHOS_PHI), "#it{#phi}_{cluster};counts", self.phi_axis())?;
                registry.create_th1(key(PHOS_ETA), "#it{#eta}_{cluster};counts", self.eta_axis())?;
                registry.create_th1(key(N_PHOS_CLUSTERS), "number of clusters;events", n_clusters())?;
            }
        }
        Ok(())
    }

    /// Cell energy versus cell ID, and cell multiplicity
    fn allocate_cell_histograms(&self, registry: &mut HistRegistry) -> Result<(), RegistryError> {
        let Some(group) = self.cfg.layout.cells.as_deref() else {
            return Ok(());
        };
        registry.create_group(group);
        for cent in 0..self.cfg.num_cent_bins {
            registry.create_th2(
                HistKey::qa(group, CELL_ENERGY_VS_ABS_ID, cent),
                "cell abs. ID;#it{E}_{cell} (GeV);counts",
                Axis::new(NUM_CELL_IDS, 0., NUM_CELL_IDS as Float),
                self.half_pt_axis(),
            )?;
            registry.create_th1(
                HistKey::qa(group, N_CELLS, cent),
                "number of cells;events",
                self.multiplicity_axis((500, 6000.), (200, 200.)),
            )?;
        }
        Ok(())
    }

    /// Track kinematics and multiplicity, plus vertex-to-calorimeter
    /// differences for propagated tracks
    fn allocate_track_histograms(&self, registry: &mut HistRegistry) -> Result<(), RegistryError> {
        for cont in &self.cfg.layout.particles {
            let group = cont.name.as_str();
            registry.create_group(group);
            for cent in 0..self.cfg.num_cent_bins {
                let key = |metric| HistKey::qa(group, metric, cent);

                registry.create_th1(key(TRACK_PT), "#it{p}_{T,track} (GeV/#it{c});counts", self.half_pt_axis())?;
                registry.create_th1(key(TRACK_PHI), "#it{#phi}_{track};counts", self.phi_axis())?;
                registry.create_th1(key(TRACK_ETA), "#it{#eta}_{track};counts", self.eta_axis())?;

                if cont.propagated {
                    let half_max = self.cfg.max_bin_pt / 2.;
                    registry.create_th2(
                        key(TRACK_DELTA_ETA_PT),
                        "#it{p}_{T,track}^{vertex} (GeV/#it{c});#it{#eta}_{track}^{vertex} - #it{#eta}_{track}^{EMCal};counts",
                        self.coarse_pt_axis(),
                        Axis::new(50, -0.5, 0.5),
                    )?;
                    registry.create_th2(
                        key(TRACK_DELTA_PHI_PT),
                        "#it{p}_{T,track}^{vertex} (GeV/#it{c});#it{#phi}_{track}^{vertex} - #it{#phi}_{track}^{EMCal};counts",
                        self.coarse_pt_axis(),
                        Axis::new(200, -2., 2.),
                    )?;
                    registry.create_th2(
                        key(TRACK_DELTA_PT_VS_PT),
                        "#it{p}_{T,track}^{vertex} (GeV/#it{c});#it{p}_{T,track}^{vertex} - #it{p}_{T,track}^{EMCal} (GeV/#it{c});counts",
                        self.coarse_pt_axis(),
                        Axis::new(self.cfg.n_bins / 2, -half_max, half_max),
                    )?;
                    registry.create_th2(
                        key(TRACK_E_OVER_P_VS_P),
                        "#it{P}_{track} (GeV/#it{c});#it{E}_{cluster} / #it{P}_{track} #it{c};counts",
                        self.coarse_pt_axis(),
                        Axis::new(self.cfg.n_bins / 2, 0., 4.),
                    )?;
                }

                registry.create_th1(
                    key(N_TRACKS),
                    "number of tracks;events",
                    self.multiplicity_axis((500, 5000.), (200, 200.)),
                )?;
            }
        }
        Ok(())
    }

    /// Jet kinematics, area and multiplicity, plus background-corrected pt
    /// and background density when a density is configured
    fn allocate_jet_histograms(&self, registry: &mut HistRegistry) -> Result<(), RegistryError> {
        let n_bins = self.cfg.n_bins;
        for cont in &self.cfg.layout.jets {
            let group = cont.name.as_str();
            registry.create_group(group);
            for cent in 0..self.cfg.num_cent_bins {
                let key = |metric| HistKey::qa(group, metric, cent);

                registry.create_th1(key(JET_PT), "#it{p}_{T,jet} (GeV/#it{c});counts", self.pt_axis())?;
                registry.create_th1(key(JET_AREA), "#it{A}_{jet};counts", Axis::new(n_bins / 2, 0., 1.5))?;
                registry.create_th1(key(JET_PHI), "#it{#phi}_{jet};counts", self.phi_axis())?;
                registry.create_th1(key(JET_ETA), "#it{#eta}_{jet};counts", self.eta_axis())?;
                registry.create_th2(
                    key(JET_ETA_PHI),
                    "#it{#eta}_{jet};#it{#phi}_{jet};counts",
                    self.eta_axis(),
                    self.phi_axis(),
                )?;
                registry.create_th1(
                    key(N_JETS),
                    "number of jets;events",
                    self.multiplicity_axis((500, 500.), (100, 100.)),
                )?;

                if cont.has_rho() {
                    let half_max = self.cfg.max_bin_pt / 2.;
                    registry.create_th1(
                        key(JET_CORR_PT),
                        "#it{p}_{T,jet}^{corr} (GeV/#it{c});counts",
                        Axis::new(n_bins, -half_max, half_max),
                    )?;
                    registry.create_th1(key(JET_RHO), "{#rho} (GeV);counts", Axis::new(n_bins, 0., 500.))?;
                }
            }
        }
        Ok(())
    }

    // ### DIJET HISTOGRAMS ###

    /// Dijet observables and unmatched trigger spectra, for every jet
    /// container, centrality bin and threshold grid cell
    fn allocate_dijet_histograms(&self, registry: &mut HistRegistry) -> Result<(), RegistryError> {
        for cont in &self.cfg.layout.jets {
            let group = cont.name.as_str();
            for cent in 0..self.cfg.num_cent_bins {
                for cell in self.grid.iter() {
                    for (metric, title, axis) in DIJET_METRICS {
                        registry.create_th1(
                            HistKey::dijet(group, metric, cent, cell),
                            title,
                            self.dijet_axis(axis),
                        )?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Binning of a dijet histogram
    fn dijet_axis(&self, axis: DijetAxis) -> Axis {
        match axis {
            DijetAxis::Pt => self.pt_axis(),
            DijetAxis::Phi => Axis::new(100, 0., TAU),
            DijetAxis::Fraction => Axis::new(100, 0., 1.),
            DijetAxis::DeltaPhi => Axis::new(100, 0., 4.),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::BeamType,
        container::{ContainerLayout, JetContainerSpec, ParticleContainerSpec},
    };

    fn allocate(cfg: &Configuration) -> HistRegistry {
        let grid = ThresholdGrid::new();
        let mut registry = HistRegistry::new();
        HistogramAllocator::new(cfg, &grid)
            .allocate(&mut registry)
            .unwrap();
        registry
    }

    #[test]
    fn jet_histogram_counts() {
        let cfg = Configuration {
            num_cent_bins: 2,
            layout: ContainerLayout {
                jets: vec![
                    JetContainerSpec::new("plain"),
                    JetContainerSpec::new("subtracted").with_rho("Rho"),
                ],
                ..ContainerLayout::default()
            },
            ..Configuration::default()
        };
        let registry = allocate(&cfg);
        let count = |group: &str, dijet: bool| {
            registry
                .iter()
                .filter(|(key, _)| key.group == group && key.cell.is_some() == dijet)
                .count()
        };
        assert_eq!(count("plain", false), 2 * 6);
        assert_eq!(count("subtracted", false), 2 * 8);
        assert_eq!(count("plain", true), 2 * 32 * 10);
        assert_eq!(count("subtracted", true), 2 * 32 * 10);
    }

    #[test]
    fn multiplicity_range_follows_beam_type() {
        let layout = ContainerLayout {
            particles: vec![ParticleContainerSpec::new("tracks")],
            ..ContainerLayout::default()
        };
        let range = |beam_type| {
            let cfg = Configuration {
                beam_type,
                layout: layout.clone(),
                ..Configuration::default()
            };
            let registry = allocate(&cfg);
            let hist = registry.get(&HistKey::qa("tracks", N_TRACKS, 0)).unwrap();
            let axis = *hist.as_1d().unwrap().axis();
            (axis.n_bins(), axis.max())
        };
        assert_eq!(range(BeamType::AA), (500, 5000.));
        assert_eq!(range(BeamType::PA), (500, 5000.));
        assert_eq!(range(BeamType::PP), (200, 200.));
    }

    #[test]
    fn propagated_tracks_get_extra_histograms() {
        let cfg = Configuration {
            num_cent_bins: 1,
            layout: ContainerLayout {
                particles: vec![
                    ParticleContainerSpec::new("plain"),
                    ParticleContainerSpec::new("tracks").propagated(),
                ],
                ..ContainerLayout::default()
            },
            ..Configuration::default()
        };
        let registry = allocate(&cfg);
        assert_eq!(registry.len(), 4 + 8);
        assert!(registry.contains(&HistKey::qa("tracks", TRACK_E_OVER_P_VS_P, 0)));
        assert!(!registry.contains(&HistKey::qa("plain", TRACK_E_OVER_P_VS_P, 0)));
    }

    #[test]
    fn dijet_binning() {
        let cfg = Configuration {
            num_cent_bins: 1,
            layout: ContainerLayout {
                jets: vec![JetContainerSpec::new("jets")],
                ..ContainerLayout::default()
            },
            ..Configuration::default()
        };
        let registry = allocate(&cfg);
        let cell = ThresholdGrid::new().iter().next().unwrap();
        let axis = |metric| {
            let key = HistKey::dijet("jets", metric, 0, cell);
            *registry.get(&key).unwrap().as_1d().unwrap().axis()
        };
        assert_eq!(axis(DIJET_DELTA_PHI), Axis::new(100, 0., 4.));
        assert_eq!(axis(DIJET_XJ), Axis::new(100, 0., 1.));
        assert_eq!(axis(DIJET_LEADING_PHI), Axis::new(100, 0., TAU));
        assert_eq!(axis(UNMATCHED_SUBLEADING_PT).n_bins(), cfg.n_bins);
        assert_eq!(
            registry.title(&HistKey::dijet("jets", DIJET_AJ, 0, cell)),
            Some("A_{J};counts")
        );
    }
}
