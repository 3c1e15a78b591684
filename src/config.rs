//! Runtime configuration, read from a TOML file.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::calculators::alchemy::{ALCHS_PER_HOUR, HIGH_ALCH_XP};
use crate::calculators::AlchemySettings;
use crate::error::DataError;

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "HISCORE_PROGRESS_CONFIG";

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_snapshot_dir() -> PathBuf {
    PathBuf::from("data/hiscores")
}

fn default_alchs_per_hour() -> i64 {
    ALCHS_PER_HOUR
}

fn default_high_alch_xp() -> i64 {
    HIGH_ALCH_XP
}

fn default_nature_rune_price() -> i64 {
    180
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Directory holding `tiers/*.toml`
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Directory of `<player>.csv` hiscore files
    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: PathBuf,
    #[serde(default = "default_alchs_per_hour")]
    pub alchs_per_hour: i64,
    #[serde(default = "default_high_alch_xp")]
    pub high_alch_xp: i64,
    #[serde(default = "default_nature_rune_price")]
    pub nature_rune_price: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            snapshot_dir: default_snapshot_dir(),
            alchs_per_hour: default_alchs_per_hour(),
            high_alch_xp: default_high_alch_xp(),
            nature_rune_price: default_nature_rune_price(),
        }
    }
}

impl Config {
    /// Load from `path`; a missing file gives the defaults.
    pub fn load(path: &Path) -> Result<Self, DataError> {
        if !path.exists() {
            warn!("Config file {:?} not found, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| DataError::io(path, e))?;
        let config: Config = toml::from_str(&content).map_err(|e| DataError::toml(path, e))?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Load from the path in `HISCORE_PROGRESS_CONFIG`, or `config.toml`.
    pub fn from_env() -> Result<Self, DataError> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load(Path::new(&path))
    }

    pub fn alchemy_settings(&self) -> AlchemySettings {
        AlchemySettings {
            cast_xp: self.high_alch_xp,
            casts_per_hour: self.alchs_per_hour,
        }
    }
}
