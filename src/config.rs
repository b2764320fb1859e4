//! Configuration for soar-wm hosts.
//!
//! Persisted as TOML. Every field has a default, so an empty file (or no file
//! at all) is a valid configuration:
//!
//! ```toml
//! extract_depth = 6
//!
//! [clock]
//! sim_clock = false
//! start_hour = 8
//! step_ms = 5000
//! include_ms = true
//!
//! [language]
//! attribute = "language"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WmConfig {
    /// Depth bound for graph extraction; unbounded when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extract_depth: Option<usize>,
    pub clock: ClockConfig,
    pub language: LanguageConfig,
}

/// Clock settings for [`TimeInfo`](crate::time_info::TimeInfo).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Simulate the clock instead of following local wall time.
    pub sim_clock: bool,
    /// Hour a simulated clock shows after a reset.
    pub start_hour: u32,
    /// Simulated milliseconds added per tick.
    pub step_ms: u64,
    /// Put `^milliseconds` and `^millisecond` on the input link.
    pub include_ms: bool,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            sim_clock: false,
            start_hour: 8,
            step_ms: 5000,
            include_ms: true,
        }
    }
}

/// Natural-language input settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageConfig {
    /// Attribute on the input link under which sentences are placed.
    pub attribute: String,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            attribute: "language".into(),
        }
    }
}

impl WmConfig {
    /// Parse from TOML text. `origin` names the source in error messages.
    pub fn from_toml_str(content: &str, origin: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let config = Self::from_toml_str(&content, &path.display().to_string())?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Save to a TOML file, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }
}
