//! Handles the configuration files for road architect.

use std::path::PathBuf;

use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use figment::{
    providers::{Format, Yaml},
    Figment,
};

use road_gen::{CurbSettings, EdgeStripSettings, MarkingSettings, SidewalkSettings};
use roads_api::ComputeSettings;

/// Returns the directory of the user config:
///
/// Linux: /home/Alice/.config/road_architect
/// Windows: C:\Users\Alice\AppData\Roaming\simaflux\road_architect\config
/// Mac: /Users/Alice/Library/Application Support/com.simaflux.road_architect
pub fn get_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "simaflux", "road_architect").map(|dir| dir.config_dir().to_path_buf())
}

/// Configuration of road architect.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ArchitectConfig {
    pub compute: ComputeSettings,
    pub curb: CurbSettings,
    pub sidewalk: SidewalkSettings,
    pub edge_strips: EdgeStripSettings,
    pub markings: MarkingSettings,
    /// The tile map to build, relative paths are resolved against the res directory.
    pub map: PathBuf,
}

impl Default for ArchitectConfig {
    fn default() -> Self {
        Self {
            compute: ComputeSettings::default(),
            curb: CurbSettings::default(),
            sidewalk: SidewalkSettings::default(),
            edge_strips: EdgeStripSettings::default(),
            markings: MarkingSettings::default(),
            map: PathBuf::from("maps/crossing.txt"),
        }
    }
}

/// Loads the configuration for road architect. Later sources override earlier ones: the base
/// config, the user config and in debug builds `config.yml` in the working directory.
pub fn load_config() -> anyhow::Result<ArchitectConfig> {
    let figment = Figment::from(Yaml::file("res/config/base_config.yml"));
    let figment = match get_config_dir() {
        Some(mut user_conf) => {
            user_conf.push("config.yml");
            figment.merge(Yaml::file(user_conf))
        }
        None => {
            log::warn!("no valid home directory found, skipping the user config");
            figment
        }
    };
    #[cfg(debug_assertions)]
    let figment = figment.merge(Yaml::file("config.yml"));

    let config = figment
        .extract()
        .context("failed to load the road architect configuration")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::*;
    use std::io::prelude::*;

    // Run with cargo test write_baseconfig -- --ignored --nocapture in this crate
    #[test]
    #[ignore]
    fn write_baseconfig() {
        let baseconfig = ArchitectConfig::default();
        let baseconfigyaml = serde_yaml::to_string(&baseconfig).unwrap();
        println!("{}", baseconfigyaml);

        let mut file = File::create("../res/config/base_config.yml").unwrap();
        file.write_all(baseconfigyaml.as_bytes()).unwrap();
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let yaml = "
compute:
  lane_width: 3.5
  trim:
    mode:
      fixed: 2.0
curb:
  thickness: 0.5
map: maps/ring.txt
";
        let config: ArchitectConfig = Figment::from(Yaml::string(yaml)).extract().unwrap();
        assert_eq!(config.compute.lane_width, 3.5);
        assert_eq!(config.compute.trim.mode, roads_api::TrimMode::Fixed(2.0));
        assert_eq!(config.compute.tile_size, ComputeSettings::default().tile_size);
        assert_eq!(config.curb.thickness, 0.5);
        assert_eq!(config.curb.height, CurbSettings::default().height);
        assert_eq!(config.sidewalk, SidewalkSettings::default());
        assert_eq!(config.map, PathBuf::from("maps/ring.txt"));
    }

    #[test]
    fn default_config_survives_yaml() {
        let yaml = serde_yaml::to_string(&ArchitectConfig::default()).unwrap();
        let config: ArchitectConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config, ArchitectConfig::default());
    }
}
