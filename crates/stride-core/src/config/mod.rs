mod defaults;


use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::StrideError;
use defaults::*;

/// Top-level Stride configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub stride: StrideConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub links: LinksConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrideConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Also write a daily rolling log under `<data_dir>/logs`.
    #[serde(default)]
    pub log_to_file: bool,
}

impl Default for StrideConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            log_to_file: false,
        }
    }
}

/// Remote store backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// `"http"` for the REST API, `"memory"` for the offline in-process store.
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Which catalog search suggestions are drawn from.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchScope {
    /// Exercises followed by foods.
    #[default]
    All,
    Exercise,
    Food,
}

impl SearchScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Exercise => "exercise",
            Self::Food => "food",
        }
    }
}

/// Search-as-you-type settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Quiet period before a query is dispatched.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default)]
    pub scope: SearchScope,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            scope: SearchScope::default(),
        }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Tutorial link settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinksConfig {
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
    #[serde(default = "default_search_url")]
    pub search_url: String,
    #[serde(default = "default_suffix")]
    pub suffix: String,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
            search_url: default_search_url(),
            suffix: default_suffix(),
        }
    }
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
pub fn load(path: &str) -> Result<Config, StrideError> {
    let path = Path::new(path);
    if !path.exists() {
        tracing::info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| StrideError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    parse(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse(content: &str) -> Result<Config, StrideError> {
    let config: Config = toml::from_str(content)
        .map_err(|e| StrideError::Config(format!("failed to parse config: {}", e)))?;

    match config.remote.backend.as_str() {
        "http" | "memory" => {}
        other => {
            return Err(StrideError::Config(format!(
                "unsupported remote backend: {other}"
            )))
        }
    }
    if config.remote.timeout_secs == 0 {
        return Err(StrideError::Config(
            "remote.timeout_secs must be greater than zero".to_string(),
        ));
    }

    Ok(config)
}
