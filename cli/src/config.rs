//! Builder configuration.
//!
//! Defines the YAML-serializable defaults applied to every command: the
//! top-level schema name, strict mode, and an optional override for the
//! root object's `additionalProperties`. Command-line flags win over the
//! file.
//!
//! # Example YAML
//!
//! ```yaml
//! schema_name: weather_report
//! strict: true
//! additional_properties: false
//! ```

use std::io::BufReader;
use std::path::Path;

use schema_builder_core::{DEFAULT_SCHEMA_NAME, validate_schema_name};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// File picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = ".schema-builder.yml";

/// Defaults applied when building a session from a model file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuilderConfig {
    /// Top-level `name` of the compiled document.
    pub schema_name: String,
    /// Strict flag of the compiled document.
    pub strict: bool,
    /// Replaces the model's root `additionalProperties` when set.
    pub additional_properties: Option<bool>,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            schema_name: DEFAULT_SCHEMA_NAME.to_string(),
            strict: true,
            additional_properties: None,
        }
    }
}

impl BuilderConfig {
    /// Loads configuration from a YAML file and checks the schema name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::error::CliError::IoError) if the file
    /// cannot be read, [`YamlError`](crate::error::CliError::YamlError) if
    /// parsing fails, or
    /// [`InvalidConfig`](crate::error::CliError::InvalidConfig) if the schema
    /// name is not usable.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let config: Self = serde_yaml::from_reader(BufReader::new(file))?;
        validate_schema_name(&config.schema_name)?;
        Ok(config)
    }

    /// Loads `explicit` when given, otherwise [`DEFAULT_CONFIG_FILE`] when it
    /// exists, otherwise the built-in defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            debug!(path = %path.display(), "Loading configuration");
            return Self::load(path);
        }
        let fallback = Path::new(DEFAULT_CONFIG_FILE);
        if fallback.is_file() {
            debug!(path = DEFAULT_CONFIG_FILE, "Loading configuration");
            return Self::load(fallback);
        }
        Ok(Self::default())
    }
}
