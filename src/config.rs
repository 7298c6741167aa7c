//! Configuration loading and management
//!
//! Handles parsing of `.dayplan.toml` in the data directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the configuration inside the data directory
pub const CONFIG_FILENAME: &str = ".dayplan.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Storage layout for day records
    #[serde(default)]
    pub layout: Layout,

    /// Block task configuration
    #[serde(default)]
    pub blocks: BlocksConfig,

    /// Statistics configuration
    #[serde(default)]
    pub stats: StatsConfig,
}

/// How day records are partitioned on disk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// One `data_<id>_<password>.json` per identity, keyed by date
    #[default]
    PerUser,
    /// One `<YYYY-MM-DD>.json` per calendar date, no identity
    PerDay,
}

/// Block-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlocksConfig {
    /// Color used when `block add` gets no `--color`
    #[serde(default = "default_color")]
    pub default_color: String,

    /// Text written into interior block slots
    #[serde(default = "default_middle_marker")]
    pub middle_marker: String,

    /// Text written into the final block slot
    #[serde(default = "default_end_marker")]
    pub end_marker: String,
}

fn default_color() -> String {
    "#FF6B6B".to_string()
}

fn default_middle_marker() -> String {
    "→".to_string()
}

fn default_end_marker() -> String {
    "끝".to_string()
}

impl Default for BlocksConfig {
    fn default() -> Self {
        Self {
            default_color: default_color(),
            middle_marker: default_middle_marker(),
            end_marker: default_end_marker(),
        }
    }
}

/// Statistics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Count stored slots with blank text toward the total
    #[serde(default = "default_true")]
    pub count_empty_slots: bool,

    /// Window for `stats recent`
    #[serde(default = "default_recent_days")]
    pub recent_days: u32,
}

fn default_true() -> bool {
    true
}

fn default_recent_days() -> u32 {
    7
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            count_empty_slots: true,
            recent_days: default_recent_days(),
        }
    }
}

impl BlocksConfig {
    fn validate(&self) -> crate::error::Result<()> {
        crate::block::validate_color(&self.default_color).map_err(|_| {
            crate::error::Error::InvalidConfig(format!(
                "blocks.default_color '{}' must be a #RRGGBB hex value",
                self.default_color
            ))
        })?;
        if self.middle_marker.trim().is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "blocks.middle_marker cannot be empty".to_string(),
            ));
        }
        if self.end_marker.trim().is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "blocks.end_marker cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl StatsConfig {
    fn validate(&self) -> crate::error::Result<()> {
        if !(1..=crate::stats::MAX_RECENT_DAYS).contains(&self.recent_days) {
            return Err(crate::error::Error::InvalidConfig(format!(
                "stats.recent_days must be between 1 and {}",
                crate::stats::MAX_RECENT_DAYS
            )));
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from a `.dayplan.toml` file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the data directory, or return defaults
    pub fn load_from_dir(dir: &Path) -> Self {
        let config_path = Self::path_in(dir);
        if !config_path.exists() {
            return Self::default();
        }
        match Self::load(&config_path) {
            Ok(config) => config,
            Err(err) => {
                tracing::debug!(path = %config_path.display(), error = %err, "ignoring invalid config");
                Self::default()
            }
        }
    }

    /// Path of the configuration file inside `dir`
    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(CONFIG_FILENAME)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> crate::error::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> crate::error::Result<()> {
        self.blocks.validate()?;
        self.stats.validate()?;
        Ok(())
    }
}
