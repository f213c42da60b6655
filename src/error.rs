//! Error types for the rotation generator and its adapters.

use std::path::PathBuf;
use thiserror::Error;

/// Catalog loading errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("catalog contains no layers")]
    Empty,

    #[error("catalog contains duplicate layer name '{0}'")]
    DuplicateLayer(String),
}

/// Core generation errors. Both kinds are terminal for a generation
/// attempt; no partial rotation is ever returned alongside them.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid rotation configuration: {0}")]
    InvalidConfiguration(String),

    #[error("no valid rotation exists: slot {position} could not be filled after {attempts} attempts")]
    Unsatisfiable { position: usize, attempts: u32 },
}

/// Configuration file errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Webhook notification errors
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("failed to build webhook client: {0}")]
    Client(String),

    #[error("webhook request failed: {0}")]
    Request(String),

    #[error("webhook rejected the notification with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Rotation output errors
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to write rotation to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level error surfaced by the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),
}
