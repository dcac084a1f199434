//! Configuration for the batch inference pipeline.
//!
//! Uses `figment` for layered configuration: defaults -> user config file ->
//! workspace config file -> environment -> explicit overrides. Configuration
//! is loaded from `~/.config/demandcast/config.toml` and/or
//! `.demandcast/config.toml` in the workspace directory.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ForecastError;

/// Top-level configuration for a batch inference run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Which registered model to score with.
    #[serde(default)]
    pub model: ModelSelector,
    /// Forecast window parameters.
    #[serde(default)]
    pub forecast: ForecastWindowConfig,
    /// Model registry location.
    #[serde(default)]
    pub registry: RegistryConfig,
    /// Output destination for scored results.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Selects a registered model by name and alias.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSelector {
    /// Registered model name.
    #[serde(default = "default_model_name")]
    pub name: String,
    /// Alias resolved at run time to a concrete version.
    #[serde(default = "default_alias")]
    pub alias: String,
}

impl Default for ModelSelector {
    fn default() -> Self {
        Self {
            name: default_model_name(),
            alias: default_alias(),
        }
    }
}

fn default_model_name() -> String {
    "xgboost-model".to_string()
}

fn default_alias() -> String {
    "latest_model".to_string()
}

/// Forecast window parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastWindowConfig {
    /// Number of consecutive future days to forecast.
    #[serde(default = "default_horizon_days")]
    pub horizon_days: i64,
}

impl Default for ForecastWindowConfig {
    fn default() -> Self {
        Self {
            horizon_days: default_horizon_days(),
        }
    }
}

fn default_horizon_days() -> i64 {
    30
}

/// Model registry location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Root directory of the filesystem-backed registry.
    #[serde(default = "default_registry_dir")]
    pub root_dir: PathBuf,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            root_dir: default_registry_dir(),
        }
    }
}

fn default_registry_dir() -> PathBuf {
    PathBuf::from(".demandcast/registry")
}

/// Output destination for scored results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory where result files are written.
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    /// Filename prefix for result files.
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            file_prefix: default_file_prefix(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".demandcast/output")
}

fn default_file_prefix() -> String {
    "sales_forecast".to_string()
}

/// Load configuration with layered precedence (lowest to highest):
///
/// 1. Built-in defaults
/// 2. User config (`~/.config/demandcast/config.toml`)
/// 3. Workspace config (`<workspace>/.demandcast/config.toml`)
/// 4. Environment variables (`DEMANDCAST_MODEL__NAME`, `DEMANDCAST_OUTPUT__DIR`, ...)
/// 5. Explicit overrides
pub fn load_config(
    workspace: Option<&Path>,
    overrides: Option<&ForecastConfig>,
) -> Result<ForecastConfig, ForecastError> {
    let mut figment = Figment::from(Serialized::defaults(ForecastConfig::default()));

    if let Some(config_dir) = directories::ProjectDirs::from("dev", "demandcast", "demandcast") {
        let user_config = config_dir.config_dir().join("config.toml");
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    if let Some(ws) = workspace {
        let ws_config = ws.join(".demandcast").join("config.toml");
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    figment = figment.merge(Env::prefixed("DEMANDCAST_").split("__"));

    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    figment
        .extract()
        .map_err(|e| ForecastError::config(e.to_string()))
}
