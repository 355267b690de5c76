// crates/scribe-server/src/config/file.rs
// File-based configuration from ~/.scribe/config.toml

use serde::Deserialize;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Top-level config structure
#[derive(Debug, Deserialize, Default)]
pub struct ScribeConfig {
    #[serde(default)]
    pub proactive: ProactiveSection,
}

/// Proactive engine configuration section
#[derive(Debug, Deserialize, Default)]
pub struct ProactiveSection {
    /// Master switch for proactive suggestions
    pub enabled: Option<bool>,
    /// Base cooldown between suggestions, in minutes
    pub cooldown_minutes: Option<i64>,
    /// Day of week for the weekly digest ("friday", "mon", ...)
    pub digest_weekday: Option<String>,
}

impl ScribeConfig {
    /// Load config from ~/.scribe/config.toml
    pub fn load() -> Self {
        let path = Self::config_path();

        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    debug!(path = %path.display(), "Loaded config from file");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to parse config file");
                    Self::default()
                }
            },
            Err(_) => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                Self::default()
            }
        }
    }

    /// Get the config file path
    fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".scribe")
            .join("config.toml")
    }
}
