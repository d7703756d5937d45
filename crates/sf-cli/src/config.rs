//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use sf_core::{DayClock, EngineConfig};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,
    /// Follow the schedule into work and break automatically.
    pub auto_switch: bool,
    /// Offset east of UTC used to decide calendar days; the machine's local
    /// offset when unset.
    pub utc_offset_minutes: Option<i32>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("auto_switch", &self.auto_switch)
            .field("utc_offset_minutes", &self.utc_offset_minutes)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("sf.db"),
            auto_switch: false,
            utc_offset_minutes: None,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // SF_DATABASE_PATH, SF_AUTO_SWITCH, SF_UTC_OFFSET_MINUTES
        figment = figment.merge(Env::prefixed("SF_"));

        figment.extract()
    }

    /// The calendar-day clock, or `None` if the configured offset is out of range.
    pub fn clock(&self) -> Option<DayClock> {
        match self.utc_offset_minutes {
            Some(minutes) => DayClock::from_offset_minutes(minutes),
            None => Some(DayClock::local()),
        }
    }

    pub fn engine_config(&self) -> anyhow::Result<EngineConfig> {
        let Some(clock) = self.clock() else {
            anyhow::bail!(
                "utc_offset_minutes out of range: {:?} (expected -1439..=1439)",
                self.utc_offset_minutes
            );
        };
        Ok(EngineConfig {
            auto_switch: self.auto_switch,
            clock,
        })
    }
}

/// Returns the platform-specific config directory for sf.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("sf"))
}

/// Returns the platform-specific data directory for sf.
///
/// On Linux: `~/.local/share/sf`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("sf"))
}
