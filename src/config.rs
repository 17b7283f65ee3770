use serde::Deserialize;

use crate::error::{AppError, Result};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub update_check: UpdateCheckConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SyncConfig {
    /// Remote the fork was copied from.
    #[serde(default = "default_upstream")]
    pub upstream: String,
    /// Remote the synced branch is pushed to.
    #[serde(default = "default_origin")]
    pub origin: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default)]
    pub log_after_sync: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct OutputConfig {
    /// Print command, stdout and stderr of every step instead of a progress line.
    #[serde(default)]
    pub diagnostics: bool,
    /// Emit tracing logs as JSON lines.
    #[serde(default)]
    pub log_json: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpdateCheckConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_interval_hours")]
    pub interval_hours: u64,
    #[serde(default = "default_registry_url")]
    pub registry_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            upstream: default_upstream(),
            origin: default_origin(),
            branch: default_branch(),
            log_after_sync: false,
        }
    }
}

impl Default for UpdateCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_hours: default_interval_hours(),
            registry_url: default_registry_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_upstream() -> String {
    "upstream".to_string()
}

fn default_origin() -> String {
    "origin".to_string()
}

fn default_branch() -> String {
    "master".to_string()
}

fn default_true() -> bool {
    true
}

fn default_interval_hours() -> u64 {
    24
}

fn default_registry_url() -> String {
    "https://crates.io/api/v1/crates".to_string()
}

fn default_timeout_secs() -> u64 {
    3
}

impl AppConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        } else {
            builder = builder.add_source(config::File::with_name("forksync").required(false));
        }

        // Environment variable overrides with FORKSYNC_ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("FORKSYNC")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::Config(e.to_string()))
    }
}
