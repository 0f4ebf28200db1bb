//! Container definitions and per-event container views
//!
//! A container spec is fixed for the whole run: it names a collection,
//! carries its acceptance cuts and says whether a background density is
//! attached to it. A container view pairs a spec with the contents of that
//! collection in the current event, and is what the analysis code iterates.

use crate::{
    event::{Cluster, Jet, JetCollection, Particle},
    numeric::Float,
};

use log::trace;
use prefix_num_ops::real::*;

/// Which constituents define the leading hadron of a jet
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LeadingHadronType {
    /// Hardest charged constituent
    #[default]
    Charged,

    /// Hardest neutral constituent
    Neutral,

    /// Hardest constituent of either kind
    Both,
}

/// Quality and acceptance cuts on jets
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JetCuts {
    /// Minimal raw transverse momentum
    pub min_pt: Float,

    /// Maximal absolute pseudorapidity
    pub max_abs_eta: Float,

    /// Minimal jet area
    pub min_area: Float,
}
//
impl JetCuts {
    /// Truth that a jet passes the cuts
    pub fn accept(&self, jet: &Jet) -> bool {
        jet.pt >= self.min_pt && abs(jet.eta) <= self.max_abs_eta && jet.area >= self.min_area
    }
}
//
impl Default for JetCuts {
    fn default() -> Self {
        Self {
            min_pt: 1.,
            max_abs_eta: 0.5,
            min_area: 0.,
        }
    }
}

/// Run-wide definition of a jet container
#[derive(Clone, Debug, PartialEq)]
pub struct JetContainerSpec {
    /// Container name, also used as histogram group name
    pub name: String,

    /// Name of the attached background density, if any
    pub rho_name: Option<String>,

    /// Acceptance cuts
    pub cuts: JetCuts,

    /// Leading hadron definition
    pub leading_hadron: LeadingHadronType,
}
//
impl JetContainerSpec {
    /// Container with default cuts and no background density
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rho_name: None,
            cuts: JetCuts::default(),
            leading_hadron: LeadingHadronType::default(),
        }
    }

    /// Attach a background density
    pub fn with_rho(mut self, rho_name: impl Into<String>) -> Self {
        self.rho_name = Some(rho_name.into());
        self
    }

    /// Replace the acceptance cuts
    pub fn with_cuts(mut self, cuts: JetCuts) -> Self {
        self.cuts = cuts;
        self
    }

    /// Replace the leading hadron definition
    pub fn with_leading_hadron(mut self, leading_hadron: LeadingHadronType) -> Self {
        self.leading_hadron = leading_hadron;
        self
    }

    /// Truth that a background density is configured for this container
    pub fn has_rho(&self) -> bool {
        self.rho_name.is_some()
    }
}

/// Jet container, as seen during one event
#[derive(Clone, Copy, Debug)]
pub struct JetContainer<'a> {
    /// Run-wide definition
    spec: &'a JetContainerSpec,

    /// Jets of the current event
    jets: &'a [Jet],

    /// Background density of the current event, if configured and available
    rho: Option<Float>,
}
//
impl<'a> JetContainer<'a> {
    /// Bind a container spec to the collection of the current event
    pub fn new(spec: &'a JetContainerSpec, collection: &'a JetCollection) -> Self {
        if let (Some(rho_name), None) = (&spec.rho_name, collection.rho) {
            trace!(
                "{}: no {} background density in this event, using raw jet pt",
                spec.name,
                rho_name
            );
        }
        Self {
            spec,
            jets: &collection.jets,
            rho: collection.rho.filter(|_| spec.has_rho()),
        }
    }

    /// Container name
    pub fn name(&self) -> &'a str {
        &self.spec.name
    }

    /// Background density, if one is configured and was provided
    pub fn rho_parameter(&self) -> Option<Float> {
        self.rho
    }

    /// Background density value, zero when there is none
    pub fn rho_val(&self) -> Float {
        self.rho.unwrap_or(0.)
    }

    /// All jets, in container order
    pub fn all(&self) -> impl Iterator<Item = &'a Jet> + 'a {
        self.jets.iter()
    }

    /// Jets passing the container cuts, in container order
    pub fn accepted(&self) -> impl Iterator<Item = &'a Jet> + 'a {
        let cuts = self.spec.cuts;
        self.jets.iter().filter(move |jet| cuts.accept(jet))
    }

    /// Background-subtracted pt of a jet
    pub fn corrected_pt(&self, jet: &Jet) -> Float {
        jet.corrected_pt(self.rho_val())
    }

    /// Leading accepted jet
    ///
    /// Jets are ranked by corrected pt when a background density is present,
    /// by raw pt otherwise. The first jet in container order wins ties.
    ///
    pub fn leading_jet(&self) -> Option<&'a Jet> {
        let rho = self.rho;
        let rank = move |jet: &Jet| match rho {
            Some(rho) => jet.corrected_pt(rho),
            None => jet.pt,
        };
        self.accepted().fold(None, |best: Option<&'a Jet>, jet| match best {
            Some(b) if rank(jet) <= rank(b) => Some(b),
            _ => Some(jet),
        })
    }

    /// Leading hadron pt of a jet, per the container's definition
    pub fn leading_hadron_pt(&self, jet: &Jet) -> Float {
        match self.spec.leading_hadron {
            LeadingHadronType::Charged => jet.max_charged_pt,
            LeadingHadronType::Neutral => jet.max_neutral_pt,
            LeadingHadronType::Both => jet.max_charged_pt.max(jet.max_neutral_pt),
        }
    }
}

/// Quality and acceptance cuts on particles
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleCuts {
    /// Minimal transverse momentum
    pub min_pt: Float,

    /// Maximal absolute pseudorapidity
    pub max_abs_eta: Float,
}
//
impl ParticleCuts {
    /// Truth that a particle passes the cuts
    pub fn accept(&self, particle: &Particle) -> bool {
        particle.pt >= self.min_pt && abs(particle.eta) <= self.max_abs_eta
    }
}
//
impl Default for ParticleCuts {
    fn default() -> Self {
        Self {
            min_pt: 0.15,
            max_abs_eta: 0.9,
        }
    }
}

/// Run-wide definition of a particle container
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleContainerSpec {
    /// Container name, also used as histogram group name
    pub name: String,

    /// Truth that entries are tracks propagated to the calorimeter surface
    pub propagated: bool,

    /// Acceptance cuts
    pub cuts: ParticleCuts,
}
//
impl ParticleContainerSpec {
    /// Container of plain particles with default cuts
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            propagated: false,
            cuts: ParticleCuts::default(),
        }
    }

    /// Mark the entries as tracks with calorimeter-surface kinematics
    pub fn propagated(mut self) -> Self {
        self.propagated = true;
        self
    }

    /// Replace the acceptance cuts
    pub fn with_cuts(mut self, cuts: ParticleCuts) -> Self {
        self.cuts = cuts;
        self
    }

    /// Particles passing the cuts, in container order
    pub fn accepted<'a>(&self, particles: &'a [Particle]) -> impl Iterator<Item = &'a Particle> {
        let cuts = self.cuts;
        particles.iter().filter(move |p| cuts.accept(p))
    }
}

/// Quality cuts on calorimeter clusters
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClusterCuts {
    /// Minimal cluster energy
    pub min_energy: Float,

    /// Truth that exotic clusters are rejected
    pub reject_exotic: bool,
}
//
impl ClusterCuts {
    /// Truth that a cluster passes the cuts
    pub fn accept(&self, cluster: &Cluster) -> bool {
        cluster.energy >= self.min_energy && !(self.reject_exotic && cluster.exotic)
    }
}
//
impl Default for ClusterCuts {
    fn default() -> Self {
        Self {
            min_energy: 0.3,
            reject_exotic: true,
        }
    }
}

/// Run-wide definition of a cluster container
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterContainerSpec {
    /// Container name, also used as histogram group name
    pub name: String,

    /// Acceptance cuts
    pub cuts: ClusterCuts,
}
//
impl ClusterContainerSpec {
    /// Container with default cuts
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cuts: ClusterCuts::default(),
        }
    }

    /// Replace the acceptance cuts
    pub fn with_cuts(mut self, cuts: ClusterCuts) -> Self {
        self.cuts = cuts;
        self
    }

    /// Clusters passing the cuts, in container order
    pub fn accepted<'a>(&self, clusters: &'a [Cluster]) -> impl Iterator<Item = &'a Cluster> {
        let cuts = self.cuts;
        clusters.iter().filter(move |c| cuts.accept(c))
    }

    /// Cluster at a given index, if it exists and passes the cuts
    pub fn accepted_at<'a>(&self, clusters: &'a [Cluster], index: usize) -> Option<&'a Cluster> {
        clusters.get(index).filter(|c| self.cuts.accept(c))
    }
}

/// Every container that the task analyzes
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContainerLayout {
    /// Jet containers
    pub jets: Vec<JetContainerSpec>,

    /// Particle containers
    pub particles: Vec<ParticleContainerSpec>,

    /// Cluster containers
    pub clusters: Vec<ClusterContainerSpec>,

    /// Name of the calorimeter cell collection, if cells are analyzed
    pub cells: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection(jets: Vec<Jet>, rho: Option<Float>) -> JetCollection {
        JetCollection { jets, rho }
    }

    #[test]
    fn acceptance() {
        let spec = JetContainerSpec::new("jets");
        let jets = collection(
            vec![
                Jet::new(0.5, 0., 1., 0.1),
                Jet::new(10., 0.7, 1., 0.1),
                Jet::new(10., -0.4, 1., 0.1),
            ],
            None,
        );
        let cont = JetContainer::new(&spec, &jets);
        assert_eq!(cont.all().count(), 3);
        assert_eq!(cont.accepted().count(), 1);
    }

    #[test]
    fn rho_requires_configuration() {
        let jets = collection(vec![Jet::new(10., 0., 1., 0.5)], Some(4.));
        let plain = JetContainerSpec::new("jets");
        assert_eq!(JetContainer::new(&plain, &jets).rho_parameter(), None);
        assert_eq!(JetContainer::new(&plain, &jets).rho_val(), 0.);
        let with_rho = JetContainerSpec::new("jets").with_rho("Rho");
        let cont = JetContainer::new(&with_rho, &jets);
        assert_eq!(cont.rho_val(), 4.);
        assert_eq!(cont.corrected_pt(&jets.jets[0]), 8.);

        // A configured density that the event lacks falls back to raw pt
        let no_rho = collection(jets.jets.clone(), None);
        let cont = JetContainer::new(&with_rho, &no_rho);
        assert_eq!(cont.rho_parameter(), None);
        assert_eq!(cont.corrected_pt(&no_rho.jets[0]), 10.);
    }

    #[test]
    fn leading_jet_ranking() {
        // Raw pt favours the first jet, corrected pt the second one
        let jets = collection(
            vec![
                Jet::new(30., 0., 1., 0.5),
                Jet::new(28., 0., 1., 0.1),
                Jet::new(28., 0., 1., 0.1),
            ],
            Some(10.),
        );
        let plain = JetContainerSpec::new("jets");
        let lead = JetContainer::new(&plain, &jets).leading_jet().unwrap();
        assert!(std::ptr::eq(lead, &jets.jets[0]));
        let with_rho = plain.clone().with_rho("Rho");
        let lead = JetContainer::new(&with_rho, &jets).leading_jet().unwrap();
        assert!(std::ptr::eq(lead, &jets.jets[1]));

        let empty = collection(Vec::new(), None);
        assert!(JetContainer::new(&plain, &empty).leading_jet().is_none());
    }

    #[test]
    fn leading_hadron_definitions() {
        let jet = Jet::new(30., 0., 1., 0.5)
            .with_max_charged_pt(4.)
            .with_max_neutral_pt(6.);
        let jets = collection(vec![], None);
        let pt = |kind| {
            let spec = JetContainerSpec::new("jets").with_leading_hadron(kind);
            JetContainer::new(&spec, &jets).leading_hadron_pt(&jet)
        };
        assert_eq!(pt(LeadingHadronType::Charged), 4.);
        assert_eq!(pt(LeadingHadronType::Neutral), 6.);
        assert_eq!(pt(LeadingHadronType::Both), 6.);
    }

    #[test]
    fn cluster_lookup() {
        let spec = ClusterContainerSpec::new("caloClusters");
        let cluster = |energy, exotic| Cluster {
            energy,
            nonlin_corr_energy: energy,
            had_corr_energy: energy,
            position: nalgebra::Vector3::new(440., 0., 0.),
            exotic,
            calorimeter: crate::event::Calorimeter::Emcal,
        };
        let clusters = vec![cluster(2., false), cluster(2., true), cluster(0.1, false)];
        assert_eq!(spec.accepted(&clusters).count(), 1);
        assert!(spec.accepted_at(&clusters, 0).is_some());
        assert!(spec.accepted_at(&clusters, 1).is_none());
        assert!(spec.accepted_at(&clusters, 3).is_none());
    }
}
