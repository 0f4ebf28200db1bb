//! Mechanism for loading and sharing the analysis configuration

use crate::{
    container::{ClusterContainerSpec, ContainerLayout, JetContainerSpec, ParticleContainerSpec},
    numeric::Float,
    Result,
};

use eyre::{ensure, eyre, Report, WrapErr};
use std::{collections::HashSet, fs, path::Path, str::FromStr};

/// Collision system, which sets the range of multiplicity histograms
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BeamType {
    /// Proton-proton
    PP,

    /// Proton-nucleus
    PA,

    /// Nucleus-nucleus
    AA,
}
//
impl BeamType {
    /// Truth that this is a proton-proton run (narrow multiplicity axes)
    pub fn is_pp(self) -> bool {
        self == BeamType::PP
    }
}
//
impl FromStr for BeamType {
    type Err = Report;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pp" => Ok(BeamType::PP),
            "pA" | "pPb" => Ok(BeamType::PA),
            "AA" | "PbPb" => Ok(BeamType::AA),
            other => Err(eyre!("Unknown beam type {:?} (expected pp, pA or AA)", other)),
        }
    }
}

/// Analysis configuration
#[derive(Clone, Debug, PartialEq)]
pub struct Configuration {
    /// Number of events to be generated by the driver
    pub num_events: usize,

    /// Number of centrality bins
    pub num_cent_bins: usize,

    /// Collision system
    pub beam_type: BeamType,

    /// Number of bins of the main pt axes
    pub n_bins: usize,

    /// Lower edge of the main pt axes (GeV/c)
    pub min_bin_pt: Float,

    /// Upper edge of the main pt axes (GeV/c)
    pub max_bin_pt: Float,

    /// Minimal azimuthal separation between trigger and associated jets
    pub delta_phi_min: Float,

    /// Analyzed containers
    pub layout: ContainerLayout,

    /// Mean background density of the most central toy events (GeV/c)
    pub background_rho: Float,
}
//
impl Default for Configuration {
    fn default() -> Self {
        Self {
            num_events: 1,
            num_cent_bins: 4,
            beam_type: BeamType::AA,
            n_bins: 250,
            min_bin_pt: 0.,
            max_bin_pt: 250.,
            delta_phi_min: 2.,
            layout: ContainerLayout::default(),
            background_rho: 0.,
        }
    }
}
//
impl Configuration {
    /// Load the configuration from a file, check it, and print it out
    pub fn load(file_name: impl AsRef<Path>) -> Result<Self> {
        let file_name = file_name.as_ref();
        let config_str = fs::read_to_string(file_name)
            .wrap_err_with(|| format!("Could not read {}", file_name.display()))?;
        let config = Self::parse(&config_str)?;
        config.print();
        Ok(config)
    }

    /// Decode and check a configuration from the contents of a file
    pub fn parse(config_str: &str) -> Result<Self> {
        // We will iterate over the configuration items. These are the first
        // non-whitespace chunk of text on each line, blank lines are ignored,
        // and anything after the first chunk acts as a comment.
        let mut config_iter = config_str
            .lines()
            .filter_map(|line| line.split_whitespace().next());

        // This closure fetches the next configuration item, tagging it with
        // the name of the configuration field which it is supposed to fill to
        // ease error reporting, and handling unexpected end-of-file too.
        let mut next_item = |name: &'static str| -> Result<ConfigItem> {
            config_iter
                .next()
                .map(|data| ConfigItem::new(name, data))
                .ok_or_else(|| eyre!("Missing configuration of {}", name))
        };

        // Decode the configuration items into concrete values
        let config = Configuration {
            num_events: next_item("num_events")?.parse::<usize>()?,
            num_cent_bins: next_item("num_cent_bins")?.parse::<usize>()?,
            beam_type: next_item("beam_type")?.parse::<BeamType>()?,
            n_bins: next_item("n_bins")?.parse::<usize>()?,
            min_bin_pt: next_item("min_bin_pt")?.parse::<Float>()?,
            max_bin_pt: next_item("max_bin_pt")?.parse::<Float>()?,
            delta_phi_min: next_item("delta_phi_min")?.parse::<Float>()?,
            layout: ContainerLayout {
                jets: next_item("jet_containers")?.parse_jet_containers()?,
                particles: next_item("particle_containers")?.parse_particle_containers()?,
                clusters: next_item("cluster_containers")?.parse_cluster_containers()?,
                cells: next_item("calo_cells")?.parse_optional_name(),
            },
            background_rho: next_item("background_rho")?.parse::<Float>()?,
        };

        config.check()?;
        Ok(config)
    }

    /// Check the consistency of the configuration
    pub fn check(&self) -> Result<()> {
        ensure!(self.num_events > 0, "Please analyze at least one event");
        self.check_analysis()
    }

    /// Check the settings that the analysis task depends on
    ///
    /// This covers everything but the event count, which only matters to the
    /// driver.
    ///
    pub fn check_analysis(&self) -> Result<()> {
        ensure!(self.num_cent_bins > 0, "At least one centrality bin is needed");

        // Some axes use a sixth of the main bin count
        ensure!(
            self.n_bins >= 6,
            "The bin count must be at least 6, got {}",
            self.n_bins
        );
        ensure!(
            self.max_bin_pt > 0. && self.min_bin_pt < self.max_bin_pt / 2.,
            "The pt range [{}, {}] is too narrow",
            self.min_bin_pt,
            self.max_bin_pt
        );
        ensure!(
            self.delta_phi_min >= 0.,
            "The minimal azimuthal separation cannot be negative"
        );
        ensure!(
            self.background_rho >= 0.,
            "The background density cannot be negative"
        );

        // Container names double as histogram group names
        let mut names = HashSet::new();
        let layout = &self.layout;
        let all_names = (layout.jets.iter().map(|c| &c.name))
            .chain(layout.particles.iter().map(|c| &c.name))
            .chain(layout.clusters.iter().map(|c| &c.name))
            .chain(layout.cells.iter());
        for name in all_names {
            ensure!(!name.is_empty(), "Container names cannot be empty");
            ensure!(names.insert(name), "Container {} is configured twice", name);
        }
        Ok(())
    }

    /// Display the configuration
    pub fn print(&self) {
        let join = |names: Vec<String>| {
            if names.is_empty() {
                "none".to_owned()
            } else {
                names.join(",")
            }
        };
        let layout = &self.layout;
        let jets = join(
            layout
                .jets
                .iter()
                .map(|c| match &c.rho_name {
                    Some(rho) => format!("{}:{}", c.name, rho),
                    None => c.name.clone(),
                })
                .collect(),
        );
        let particles = join(
            layout
                .particles
                .iter()
                .map(|c| {
                    if c.propagated {
                        format!("{}:propagated", c.name)
                    } else {
                        c.name.clone()
                    }
                })
                .collect(),
        );
        let clusters = join(layout.clusters.iter().map(|c| c.name.clone()).collect());

        println!("NEVENTS        : {}", self.num_events);
        println!("NCENTBINS      : {}", self.num_cent_bins);
        println!("BEAMTYPE       : {:?}", self.beam_type);
        println!("NBINS          : {}", self.n_bins);
        println!("MINBINPT       : {}", self.min_bin_pt);
        println!("MAXBINPT       : {}", self.max_bin_pt);
        println!("DELTAPHIMIN    : {}", self.delta_phi_min);
        println!("JETS           : {}", jets);
        println!("PARTICLES      : {}", particles);
        println!("CLUSTERS       : {}", clusters);
        println!(
            "CELLS          : {}",
            layout.cells.as_deref().unwrap_or("none")
        );
        println!("RHO            : {}", self.background_rho);
    }
}

/// A value from the configuration file, tagged with the struct field which it
/// is supposed to map for error reporting purposes.
struct ConfigItem<'data> {
    name: &'static str,
    data: &'data str,
}
//
impl<'data> ConfigItem<'data> {
    /// Build a config item from a struct field tag and raw iterator data
    fn new(name: &'static str, data: &'data str) -> Self {
        Self { name, data }
    }

    /// Parse this data using Rust's standard parsing logic
    fn parse<T: FromStr>(self) -> Result<T>
    where
        <T as FromStr>::Err: Into<Report>,
    {
        self.data
            .parse::<T>()
            .map_err(Into::<Report>::into)
            .wrap_err_with(|| format!("Could not parse configuration of {}", self.name))
    }

    /// Optional name, where "none" stands for absence
    fn parse_optional_name(self) -> Option<String> {
        (self.data != "none").then(|| self.data.to_owned())
    }

    /// Comma-separated list of "name" or "name:option" entries
    fn entries(&self) -> Vec<(&'data str, Option<&'data str>)> {
        if self.data == "none" {
            return Vec::new();
        }
        self.data
            .split(',')
            .map(|entry| match entry.split_once(':') {
                Some((name, option)) => (name, Some(option)),
                None => (entry, None),
            })
            .collect()
    }

    /// Jet containers, with an optional background density name
    fn parse_jet_containers(self) -> Result<Vec<JetContainerSpec>> {
        self.entries()
            .into_iter()
            .map(|(name, rho)| {
                let spec = JetContainerSpec::new(name);
                match rho {
                    Some("") => Err(eyre!("Empty background density name for {}", name)),
                    Some(rho) => Ok(spec.with_rho(rho)),
                    None => Ok(spec),
                }
            })
            .collect::<Result<Vec<_>>>()
            .wrap_err_with(|| format!("Could not parse configuration of {}", self.name))
    }

    /// Particle containers, optionally flagged as propagated tracks
    fn parse_particle_containers(self) -> Result<Vec<ParticleContainerSpec>> {
        self.entries()
            .into_iter()
            .map(|(name, option)| {
                let spec = ParticleContainerSpec::new(name);
                match option {
                    Some("propagated") => Ok(spec.propagated()),
                    Some(other) => Err(eyre!("Unknown particle container option {:?}", other)),
                    None => Ok(spec),
                }
            })
            .collect::<Result<Vec<_>>>()
            .wrap_err_with(|| format!("Could not parse configuration of {}", self.name))
    }

    /// Cluster containers (no options)
    fn parse_cluster_containers(self) -> Result<Vec<ClusterContainerSpec>> {
        self.entries()
            .into_iter()
            .map(|(name, option)| match option {
                Some(other) => Err(eyre!("Unknown cluster container option {:?}", other)),
                None => Ok(ClusterContainerSpec::new(name)),
            })
            .collect::<Result<Vec<_>>>()
            .wrap_err_with(|| format!("Could not parse configuration of {}", self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "
        1000            num_events
        4               num_cent_bins
        AA              beam_type

        300             n_bins
        0.              min_bin_pt
        250.            max_bin_pt
        2.              delta_phi_min
        Jet_AKTFullR020:Rho,Jet_AKTChargedR040   jet_containers
        tracks:propagated                        particle_containers
        caloClusters                             cluster_containers
        emcalCells                               calo_cells
        40.             background_rho
    ";

    #[test]
    fn parse_sample() {
        let cfg = Configuration::parse(SAMPLE).unwrap();
        assert_eq!(cfg.num_events, 1000);
        assert_eq!(cfg.beam_type, BeamType::AA);
        assert_eq!(cfg.n_bins, 300);
        assert_eq!(cfg.layout.jets.len(), 2);
        assert_eq!(cfg.layout.jets[0].rho_name.as_deref(), Some("Rho"));
        assert!(!cfg.layout.jets[1].has_rho());
        assert!(cfg.layout.particles[0].propagated);
        assert_eq!(cfg.layout.clusters[0].name, "caloClusters");
        assert_eq!(cfg.layout.cells.as_deref(), Some("emcalCells"));
    }

    #[test]
    fn missing_items_are_reported() {
        let err = Configuration::parse("1000\n4\npp\n").unwrap_err();
        assert!(err.to_string().contains("n_bins"));
    }

    #[test]
    fn bad_values_are_reported() {
        let bad_beam = SAMPLE.replace("AA ", "XeXe ");
        let err = Configuration::parse(&bad_beam).unwrap_err();
        assert!(err.to_string().contains("beam_type"));

        let bad_bins = SAMPLE.replace("300 ", "4 ");
        assert!(Configuration::parse(&bad_bins).is_err());

        let duplicate = SAMPLE.replace("Jet_AKTChargedR040", "Jet_AKTFullR020");
        assert!(Configuration::parse(&duplicate).is_err());

        let bad_option = SAMPLE.replace("tracks:propagated", "tracks:sideways");
        assert!(Configuration::parse(&bad_option).is_err());
    }

    #[test]
    fn empty_layout() {
        let cfg = SAMPLE
            .replace("Jet_AKTFullR020:Rho,Jet_AKTChargedR040", "none")
            .replace("tracks:propagated", "none")
            .replace("caloClusters", "none")
            .replace("emcalCells", "none");
        let cfg = Configuration::parse(&cfg).unwrap();
        assert_eq!(cfg.layout, ContainerLayout::default());
    }

    #[test]
    fn defaults_are_consistent() {
        Configuration::default().check().unwrap();
    }
}
