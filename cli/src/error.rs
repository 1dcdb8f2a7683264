//! Error types for the command-line front end.
//!
//! Covers file access, model and script parsing, and configuration
//! problems. Command handlers turn these into `error: ...` lines.

use thiserror::Error;

/// Errors raised while loading or saving files for a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Configured schema name is not usable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] schema_builder_core::SchemaNameError),

    /// The model file extension is not one we read.
    #[error("unsupported model format '{0}': expected .json, .yaml or .yml")]
    UnsupportedFormat(String),
}

/// Convenience alias for results with [`CliError`].
pub type Result<T> = std::result::Result<T, CliError>;
