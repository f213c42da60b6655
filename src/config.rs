//! Configuration System
//!
//! TOML-backed configuration for the rotation pattern, file paths, webhook,
//! and logging, with environment variable overrides and runtime validation.

use crate::error::ConfigError;
use crate::filter::Filter;
use crate::generate::DEFAULT_MAX_ATTEMPTS;
use crate::logging::LoggingConfig;
use crate::policy::DEFAULT_MIN_DISTANCE;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "rotation.toml";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RotorConfig {
    /// Rotation pattern and search parameters
    #[serde(default)]
    pub rotation: RotationConfig,

    /// Input and output file paths
    #[serde(default)]
    pub paths: PathsConfig,

    /// Webhook notification settings
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Rotation pattern section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationConfig {
    /// Filters for the opening slots, applied once in order. An empty table
    /// matches any layer.
    #[serde(default)]
    pub starting: Vec<Filter>,

    /// Filters for the repeating block, applied `repeats` times in order.
    #[serde(default)]
    pub regular: Vec<Filter>,

    /// How many times the regular block repeats.
    #[serde(default = "default_repeats")]
    pub repeats: u32,

    /// Minimum positions between two layers of the same map.
    #[serde(default = "default_min_distance")]
    pub min_distance: usize,

    /// Bound on total candidate placements before the search gives up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_repeats() -> u32 {
    1
}

fn default_min_distance() -> usize {
    DEFAULT_MIN_DISTANCE
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            starting: Vec::new(),
            regular: Vec::new(),
            repeats: default_repeats(),
            min_distance: default_min_distance(),
            max_attempts: default_max_attempts(),
        }
    }
}

/// Input and output file paths
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Catalog JSON file holding all candidate layers.
    #[serde(default = "default_catalog_path")]
    pub catalog: PathBuf,

    /// File the finished rotation is written to.
    #[serde(default = "default_output_path")]
    pub output: PathBuf,
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("layers.json")
}

fn default_output_path() -> PathBuf {
    PathBuf::from("MapRotation.cfg")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            catalog: default_catalog_path(),
            output: default_output_path(),
        }
    }
}

/// Webhook notification settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Webhook URL the finished rotation is posted to, if set.
    #[serde(default)]
    pub webhook_url: Option<String>,
}

impl RotorConfig {
    /// Load from an explicit TOML file, with `ROTOR_*` environment overrides
    /// (e.g. `ROTOR_ROTATION__MIN_DISTANCE=2`).
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let loaded = Config::builder()
            .add_source(File::from(path))
            .add_source(Environment::with_prefix("ROTOR").separator("__"))
            .build()?;
        let parsed: RotorConfig = loaded.try_deserialize()?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Load `rotation.toml` from the given directory if present, falling back
    /// to defaults plus environment overrides otherwise.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let loaded = Config::builder()
            .add_source(File::from(dir.join(DEFAULT_CONFIG_FILE)).required(false))
            .add_source(Environment::with_prefix("ROTOR").separator("__"))
            .build()?;
        let parsed: RotorConfig = loaded.try_deserialize()?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Validate the configuration before any generation is attempted.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rotation.regular.is_empty() {
            return Err(ConfigError::Invalid(
                "rotation.regular must list at least one slot filter".to_string(),
            ));
        }
        if self.rotation.repeats < 1 {
            return Err(ConfigError::Invalid(
                "rotation.repeats must be positive".to_string(),
            ));
        }
        if self.rotation.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "rotation.max_attempts must be positive".to_string(),
            ));
        }
        if self.paths.catalog.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "paths.catalog cannot be empty".to_string(),
            ));
        }
        if self.paths.output.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "paths.output cannot be empty".to_string(),
            ));
        }
        if let Some(url) = &self.notify.webhook_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::Invalid(format!(
                    "notify.webhook_url must be an http(s) URL, got '{}'",
                    url
                )));
            }
        }
        Ok(())
    }
}
