//! This module defines the reconstructed objects of one collision event
//!
//! Events are filled by the host (here, the toy event generator) and handed
//! to the analysis task read-only. Collections are keyed by container name,
//! and a configured container that is absent from an event is simply skipped.

use crate::numeric::{functions::phi_0_2pi, Float};

use nalgebra::Vector3;
use std::collections::HashMap;

/// Reconstructed jet
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Jet {
    /// Transverse momentum (GeV/c)
    pub pt: Float,

    /// Pseudorapidity
    pub eta: Float,

    /// Azimuth (rad)
    pub phi: Float,

    /// Jet area
    pub area: Float,

    /// Transverse momentum of the hardest charged constituent
    pub max_charged_pt: Float,

    /// Transverse momentum of the hardest neutral constituent
    pub max_neutral_pt: Float,
}
//
impl Jet {
    /// Jet with the given kinematics and no constituent information
    pub fn new(pt: Float, eta: Float, phi: Float, area: Float) -> Self {
        Self {
            pt,
            eta,
            phi,
            area,
            ..Self::default()
        }
    }

    /// Attach the pt of the hardest charged constituent
    pub fn with_max_charged_pt(mut self, max_charged_pt: Float) -> Self {
        self.max_charged_pt = max_charged_pt;
        self
    }

    /// Attach the pt of the hardest neutral constituent
    pub fn with_max_neutral_pt(mut self, max_neutral_pt: Float) -> Self {
        self.max_neutral_pt = max_neutral_pt;
        self
    }

    /// Background-subtracted transverse momentum
    pub fn corrected_pt(&self, rho: Float) -> Float {
        self.pt - rho * self.area
    }
}

/// Per-event contents of a jet container
#[derive(Clone, Debug, Default)]
pub struct JetCollection {
    /// Jets, in reconstruction order
    pub jets: Vec<Jet>,

    /// Background density estimate of this event, if one was computed
    pub rho: Option<Float>,
}

/// Kinematics of a track extrapolated to the calorimeter surface
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CaloSurfaceKinematics {
    /// Pseudorapidity at the calorimeter surface
    pub eta: Float,

    /// Azimuth at the calorimeter surface
    pub phi: Float,

    /// Transverse momentum at the calorimeter surface
    pub pt: Float,
}

/// Reconstructed charged particle
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Particle {
    /// Transverse momentum at the vertex (GeV/c)
    pub pt: Float,

    /// Pseudorapidity at the vertex
    pub eta: Float,

    /// Azimuth at the vertex
    pub phi: Float,

    /// Kinematics at the calorimeter surface, for propagated tracks
    pub calo_surface: Option<CaloSurfaceKinematics>,

    /// Index of the matched cluster in the first cluster container
    pub matched_cluster: Option<usize>,
}
//
impl Particle {
    /// Particle at the vertex, not propagated to the calorimeter
    pub fn new(pt: Float, eta: Float, phi: Float) -> Self {
        Self {
            pt,
            eta,
            phi,
            ..Self::default()
        }
    }

    /// Total momentum magnitude
    pub fn p(&self) -> Float {
        self.pt * self.eta.cosh()
    }
}

/// Calorimeter subsystem which measured a cluster
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Calorimeter {
    /// Electromagnetic calorimeter
    Emcal,

    /// Photon spectrometer
    Phos,
}

/// Calorimeter cluster
#[derive(Clone, Debug, PartialEq)]
pub struct Cluster {
    /// Reconstructed energy (GeV)
    pub energy: Float,

    /// Energy after non-linearity correction
    pub nonlin_corr_energy: Float,

    /// Energy after hadronic correction
    pub had_corr_energy: Float,

    /// Cluster position in the global frame (cm)
    pub position: Vector3<Float>,

    /// Truth that the cluster is flagged as exotic
    pub exotic: bool,

    /// Measuring subsystem
    pub calorimeter: Calorimeter,
}
//
impl Cluster {
    /// Pseudorapidity and azimuth (in [0, 2𝜋)) of the cluster as seen from
    /// the primary vertex
    pub fn direction(&self, vertex: &Vector3<Float>) -> (Float, Float) {
        let d = self.position - vertex;
        let r = d.norm();
        let cos_theta = if r > 0. { d.z / r } else { 1. };
        // 𝜂 = atanh(cos 𝜃), clamped away from the poles
        let cos_theta = cos_theta.clamp(-1. + 1e-7, 1. - 1e-7);
        let eta = cos_theta.atanh();
        let phi = phi_0_2pi(d.y.atan2(d.x));
        (eta, phi)
    }
}

/// Calorimeter cell
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    /// Absolute cell identifier
    pub abs_id: u16,

    /// Deposited energy (GeV)
    pub amplitude: Float,
}

/// Reconstructed contents of one collision event
#[derive(Clone, Debug)]
pub struct Event {
    /// Centrality bin of the event
    pub cent_bin: usize,

    /// Primary vertex position (cm)
    pub vertex: Vector3<Float>,

    /// Jet collections, by container name
    pub jets: HashMap<String, JetCollection>,

    /// Particle collections, by container name
    pub particles: HashMap<String, Vec<Particle>>,

    /// Cluster collections, by container name
    pub clusters: HashMap<String, Vec<Cluster>>,

    /// Calorimeter cells, if they were read out
    pub cells: Option<Vec<Cell>>,
}
//
impl Event {
    /// Empty event in a given centrality bin, with the vertex at the origin
    pub fn new(cent_bin: usize) -> Self {
        Self {
            cent_bin,
            vertex: Vector3::zeros(),
            jets: HashMap::new(),
            particles: HashMap::new(),
            clusters: HashMap::new(),
            cells: None,
        }
    }
}
