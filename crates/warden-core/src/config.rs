//! TOML configuration with per-field defaults.

use crate::error::WardenError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level Warden configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub warden: WardenConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WardenConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for WardenConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Analysis pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Block threshold in [0, 100]. A prompt is blocked when it carries a
    /// high-severity risk and scores at or above this value.
    #[serde(default = "default_risk_threshold")]
    pub risk_threshold: u8,
    /// Maximum accepted prompt length, in characters.
    #[serde(default = "default_max_prompt_chars")]
    pub max_prompt_chars: usize,
    /// Deadline for an external scorer call before failing closed.
    #[serde(default = "default_scorer_timeout")]
    pub scorer_timeout_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            risk_threshold: default_risk_threshold(),
            max_prompt_chars: default_max_prompt_chars(),
            scorer_timeout_secs: default_scorer_timeout(),
        }
    }
}

/// Flagged-prompt store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
    /// Oldest entries beyond this count are pruned on record.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            max_entries: default_max_entries(),
        }
    }
}

fn default_name() -> String {
    "warden".to_string()
}

fn default_data_dir() -> String {
    "~/.warden".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_risk_threshold() -> u8 {
    70
}

fn default_max_prompt_chars() -> usize {
    8000
}

fn default_scorer_timeout() -> u64 {
    20
}

fn default_db_path() -> String {
    "~/.warden/data/flagged.db".to_string()
}

fn default_max_entries() -> usize {
    100
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, WardenError> {
    let path = Path::new(path);
    if !path.exists() {
        tracing::info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| WardenError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| WardenError::Config(format!("failed to parse config: {}", e)))?;

    if config.analysis.risk_threshold > 100 {
        return Err(WardenError::Config(
            "analysis.risk_threshold must be in [0, 100]".to_string(),
        ));
    }

    Ok(config)
}
