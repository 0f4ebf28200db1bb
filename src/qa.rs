//! Quality assurance histograms of jets, tracks, clusters and cells

use crate::{
    alloc::names::*,
    container::{ContainerLayout, JetContainer},
    event::{Calorimeter, Event},
    numeric::Float,
    registry::{HistKey, HistRegistry, RegistryError},
};

/// Fill every QA histogram for one event
///
/// Containers that are configured but absent from the event are skipped.
///
pub fn fill_all(
    layout: &ContainerLayout,
    event: &Event,
    registry: &mut HistRegistry,
) -> Result<(), RegistryError> {
    fill_jets(layout, event, registry)?;
    fill_tracks(layout, event, registry)?;
    fill_clusters(layout, event, registry)?;
    fill_cells(layout, event, registry)
}

/// Jet kinematics, plus background-corrected pt and density when available
pub fn fill_jets(
    layout: &ContainerLayout,
    event: &Event,
    registry: &mut HistRegistry,
) -> Result<(), RegistryError> {
    let cent = event.cent_bin;
    for spec in &layout.jets {
        let Some(collection) = event.jets.get(&spec.name) else {
            continue;
        };
        let container = JetContainer::new(spec, collection);
        let key = |metric| HistKey::qa(&spec.name, metric, cent);

        let mut count = 0usize;
        for jet in container.accepted() {
            count += 1;
            registry.fill_th1(&key(JET_PT), jet.pt)?;
            registry.fill_th1(&key(JET_AREA), jet.area)?;
            registry.fill_th1(&key(JET_PHI), jet.phi)?;
            registry.fill_th1(&key(JET_ETA), jet.eta)?;
            registry.fill_th2(&key(JET_ETA_PHI), jet.eta, jet.phi)?;
            if container.rho_parameter().is_some() {
                registry.fill_th1(&key(JET_CORR_PT), container.corrected_pt(jet))?;
            }
        }
        registry.fill_th1(&key(N_JETS), count as Float)?;

        if let Some(rho) = container.rho_parameter() {
            registry.fill_th1(&key(JET_RHO), rho)?;
        }
    }
    Ok(())
}

/// Track kinematics, and for propagated tracks the shift between vertex and
/// calorimeter surface plus E/p of the matched cluster
pub fn fill_tracks(
    layout: &ContainerLayout,
    event: &Event,
    registry: &mut HistRegistry,
) -> Result<(), RegistryError> {
    let cent = event.cent_bin;

    // Cluster matches refer to the first cluster container
    let matched_clusters = layout
        .clusters
        .first()
        .and_then(|spec| event.clusters.get(&spec.name).map(|clusters| (spec, clusters)));

    for spec in &layout.particles {
        let Some(particles) = event.particles.get(&spec.name) else {
            continue;
        };
        let key = |metric| HistKey::qa(&spec.name, metric, cent);

        let mut count = 0usize;
        for particle in spec.accepted(particles) {
            count += 1;
            registry.fill_th1(&key(TRACK_PT), particle.pt)?;
            registry.fill_th1(&key(TRACK_PHI), particle.phi)?;
            registry.fill_th1(&key(TRACK_ETA), particle.eta)?;

            if !spec.propagated {
                continue;
            }
            let Some(surface) = particle.calo_surface else {
                continue;
            };
            registry.fill_th2(&key(TRACK_DELTA_ETA_PT), particle.pt, particle.eta - surface.eta)?;
            registry.fill_th2(&key(TRACK_DELTA_PHI_PT), particle.pt, particle.phi - surface.phi)?;
            registry.fill_th2(&key(TRACK_DELTA_PT_VS_PT), particle.pt, particle.pt - surface.pt)?;

            let cluster = matched_clusters.and_then(|(cluster_spec, clusters)| {
                particle
                    .matched_cluster
                    .and_then(|index| cluster_spec.accepted_at(clusters, index))
            });
            if let Some(cluster) = cluster {
                let p = particle.p();
                registry.fill_th2(&key(TRACK_E_OVER_P_VS_P), p, cluster.nonlin_corr_energy / p)?;
            }
        }
        registry.fill_th1(&key(N_TRACKS), count as Float)?;
    }
    Ok(())
}

/// Cluster energies and directions, split by calorimeter
pub fn fill_clusters(
    layout: &ContainerLayout,
    event: &Event,
    registry: &mut HistRegistry,
) -> Result<(), RegistryError> {
    let cent = event.cent_bin;
    for spec in &layout.clusters {
        let Some(clusters) = event.clusters.get(&spec.name) else {
            continue;
        };
        let key = |metric| HistKey::qa(&spec.name, metric, cent);

        // Exotic clusters are looked at before any cut
        for cluster in clusters.iter().filter(|c| c.exotic) {
            registry.fill_th1(&key(EMCAL_ENERGY_EXOTIC), cluster.energy)?;
        }

        let (mut count, mut count_emcal, mut count_phos) = (0usize, 0usize, 0usize);
        for cluster in spec.accepted(clusters) {
            count += 1;
            let (eta, phi) = cluster.direction(&event.vertex);
            registry.fill_th1(&key(CLUSTER_ENERGY), cluster.energy)?;
            registry.fill_th2(&key(CLUSTER_ETA_PHI), eta, phi)?;

            match cluster.calorimeter {
                Calorimeter::Emcal => {
                    count_emcal += 1;
                    registry.fill_th1(&key(EMCAL_ENERGY), cluster.energy)?;
                    registry.fill_th1(&key(EMCAL_NONLIN_CORR_ENERGY), cluster.nonlin_corr_energy)?;
                    registry.fill_th1(&key(EMCAL_HAD_CORR_ENERGY), cluster.had_corr_energy)?;
                    registry.fill_th1(&key(EMCAL_PHI), phi)?;
                    registry.fill_th1(&key(EMCAL_ETA), eta)?;
                }
                Calorimeter::Phos => {
                    count_phos += 1;
                    registry.fill_th1(&key(PHOS_ENERGY), cluster.energy)?;
                    registry.fill_th1(&key(PHOS_PHI), phi)?;
                    registry.fill_th1(&key(PHOS_ETA), eta)?;
                }
            }
        }

        registry.fill_th1(&key(N_CLUSTERS), count as Float)?;
        registry.fill_th1(&key(N_EMCAL_CLUSTERS), count_emcal as Float)?;
        registry.fill_th1(&key(N_PHOS_CLUSTERS), count_phos as Float)?;
    }
    Ok(())
}

/// Cell multiplicity and cell energy versus cell ID
pub fn fill_cells(
    layout: &ContainerLayout,
    event: &Event,
    registry: &mut HistRegistry,
) -> Result<(), RegistryError> {
    let (Some(group), Some(cells)) = (layout.cells.as_deref(), event.cells.as_ref()) else {
        return Ok(());
    };
    let cent = event.cent_bin;
    registry.fill_th1(&HistKey::qa(group, N_CELLS, cent), cells.len() as Float)?;
    let key = HistKey::qa(group, CELL_ENERGY_VS_ABS_ID, cent);
    for cell in cells {
        registry.fill_th2(&key, Float::from(cell.abs_id), cell.amplitude)?;
    }
    Ok(())
}
