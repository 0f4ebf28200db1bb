//! This module provides toy event generation facilities
//!
//! Events are not meant to be physically accurate. They only need to populate
//! every histogram of the analysis with plausible shapes: each jet container
//! gets a dijet with a random momentum balance on top of a few soft jets, and
//! the background density grows with centrality.

use crate::{
    config::Configuration,
    container::ContainerLayout,
    event::{
        CaloSurfaceKinematics, Calorimeter, Cell, Cluster, Event, Jet, JetCollection, Particle,
    },
    numeric::{
        floats::consts::{PI, TAU},
        functions::phi_0_2pi,
        Float,
    },
    random::RandomGenerator,
};

use nalgebra::Vector3;

/// Number of calorimeter cells which can fire
const NUM_CELLS: usize = 17_664;

/// Radial position of the EMCal and PHOS surfaces (cm)
const EMCAL_RADIUS: Float = 440.;
const PHOS_RADIUS: Float = 460.;

/// Generator of toy heavy-ion events
pub struct EventGenerator<'cfg> {
    /// Containers to be filled
    layout: &'cfg ContainerLayout,

    /// Number of centrality bins
    num_cent_bins: usize,

    /// Mean background density of the most central events
    background_rho: Float,
}
//
impl<'cfg> EventGenerator<'cfg> {
    /// Prepare to generate events for a given configuration
    pub fn new(cfg: &'cfg Configuration) -> Self {
        Self {
            layout: &cfg.layout,
            num_cent_bins: cfg.num_cent_bins,
            background_rho: cfg.background_rho,
        }
    }

    /// Generate one event
    pub fn generate(&self, rng: &mut RandomGenerator) -> Event {
        let mut event = Event::new(rng.index(self.num_cent_bins));
        event.vertex = Vector3::new(0., 0., rng.range(-10., 10.));

        // Centrality bin 0 is the most central one
        let centrality = 1. - (event.cent_bin as Float) / (self.num_cent_bins as Float);
        let rho = self.background_rho * centrality * rng.range(0.8, 1.2);

        for spec in &self.layout.jets {
            let collection = JetCollection {
                jets: self.generate_jets(rng, if spec.has_rho() { rho } else { 0. }),
                rho: spec.has_rho().then_some(rho),
            };
            event.jets.insert(spec.name.clone(), collection);
        }

        // Clusters come first so that tracks can be matched to them
        for spec in &self.layout.clusters {
            let clusters = (0..rng.index(60))
                .map(|_| Self::generate_cluster(rng))
                .collect();
            event.clusters.insert(spec.name.clone(), clusters);
        }
        let num_matchable = self
            .layout
            .clusters
            .first()
            .and_then(|spec| event.clusters.get(&spec.name))
            .map_or(0, Vec::len);

        for spec in &self.layout.particles {
            let num_particles = 20 + rng.index(200);
            let particles = (0..num_particles)
                .map(|_| Self::generate_particle(rng, spec.propagated, num_matchable))
                .collect();
            event.particles.insert(spec.name.clone(), particles);
        }

        if self.layout.cells.is_some() {
            let cells = (0..rng.index(300))
                .map(|_| Cell {
                    abs_id: rng.index(NUM_CELLS) as u16,
                    amplitude: rng.exponential(0.5),
                })
                .collect();
            event.cells = Some(cells);
        }

        event
    }

    /// Generate a dijet and some soft jets, with background pt added on top
    fn generate_jets(&self, rng: &mut RandomGenerator, rho: Float) -> Vec<Jet> {
        let random_jet = |rng: &mut RandomGenerator, pt: Float, phi: Float| {
            let area = rng.range(0.15, 0.25);
            let pt = pt + rho * area;
            Jet::new(pt, rng.range(-0.6, 0.6), phi_0_2pi(phi), area)
                .with_max_charged_pt(pt * rng.range(0.05, 0.5))
                .with_max_neutral_pt(pt * rng.range(0., 0.3))
        };

        let mut jets = Vec::new();
        let num_soft = rng.index(6);
        let leading_pt = 20. + rng.exponential(15.);
        let leading_phi = rng.range(0., TAU);
        let x_j = rng.range(0.3, 1.);
        let acoplanarity = rng.range(-0.4, 0.4);
        jets.push(random_jet(rng, leading_pt, leading_phi));
        jets.push(random_jet(rng, leading_pt * x_j, leading_phi + PI + acoplanarity));
        for _ in 0..num_soft {
            let pt = 1. + rng.exponential(4.);
            let phi = rng.range(0., TAU);
            jets.push(random_jet(rng, pt, phi));
        }

        // Container order should not carry information about pt
        for i in (1..jets.len()).rev() {
            jets.swap(i, rng.index(i + 1));
        }
        jets
    }

    /// Generate a track, possibly propagated and matched to a cluster
    fn generate_particle(
        rng: &mut RandomGenerator,
        propagated: bool,
        num_matchable: usize,
    ) -> Particle {
        let mut particle = Particle::new(
            0.1 + rng.exponential(1.),
            rng.range(-1., 1.),
            rng.range(0., TAU),
        );
        if propagated {
            particle.calo_surface = Some(CaloSurfaceKinematics {
                eta: particle.eta + rng.range(-0.02, 0.02),
                phi: particle.phi + rng.range(-0.2, 0.2) / particle.pt,
                pt: particle.pt * rng.range(0.9, 1.),
            });
            if num_matchable > 0 && rng.chance(0.2) {
                particle.matched_cluster = Some(rng.index(num_matchable));
            }
        }
        particle
    }

    /// Generate an EMCal or PHOS cluster
    fn generate_cluster(rng: &mut RandomGenerator) -> Cluster {
        let (calorimeter, radius, phi) = if rng.chance(0.8) {
            (Calorimeter::Emcal, EMCAL_RADIUS, rng.range(1.4, 3.3))
        } else {
            (Calorimeter::Phos, PHOS_RADIUS, rng.range(4.4, 5.6))
        };
        let eta: Float = rng.range(-0.7, 0.7);
        let energy = 0.1 + rng.exponential(1.5);
        Cluster {
            energy,
            nonlin_corr_energy: energy * rng.range(0.95, 1.05),
            had_corr_energy: energy * rng.range(0.7, 1.),
            position: Vector3::new(radius * phi.cos(), radius * phi.sin(), radius * eta.sinh()),
            exotic: rng.chance(0.01),
            calorimeter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{ClusterContainerSpec, JetContainerSpec, ParticleContainerSpec};

    fn config() -> Configuration {
        Configuration {
            background_rho: 100.,
            layout: ContainerLayout {
                jets: vec![
                    JetContainerSpec::new("plain"),
                    JetContainerSpec::new("subtracted").with_rho("Rho"),
                ],
                particles: vec![ParticleContainerSpec::new("tracks").propagated()],
                clusters: vec![ClusterContainerSpec::new("caloClusters")],
                cells: Some("emcalCells".to_owned()),
            },
            ..Configuration::default()
        }
    }

    #[test]
    fn events_fill_every_container() {
        let cfg = config();
        let evgen = EventGenerator::new(&cfg);
        let mut rng = RandomGenerator::for_batch(0);
        for _ in 0..100 {
            let event = evgen.generate(&mut rng);
            assert!(event.cent_bin < cfg.num_cent_bins);
            assert!(event.jets["plain"].rho.is_none());
            assert!(event.jets["subtracted"].rho.is_some());
            assert!(event.jets["plain"].jets.len() >= 2);
            assert!(event.cells.is_some());
            let num_clusters = event.clusters["caloClusters"].len();
            for particle in &event.particles["tracks"] {
                assert!(particle.calo_surface.is_some());
                if let Some(index) = particle.matched_cluster {
                    assert!(index < num_clusters);
                }
            }
        }
    }

    #[test]
    fn generation_is_reproducible() {
        let cfg = config();
        let evgen = EventGenerator::new(&cfg);
        let first_jets = |batch_id| {
            let mut rng = RandomGenerator::for_batch(batch_id);
            evgen.generate(&mut rng).jets["plain"].jets.clone()
        };
        assert_eq!(first_jets(7), first_jets(7));
    }
}
