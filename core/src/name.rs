//! Schema name validation.
//!
//! The compiler accepts any string as the top-level `name`; structured-output
//! endpoints only accept names matching [`SCHEMA_NAME_PATTERN`], so callers
//! check the name before exporting.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Pattern a schema name must match.
pub const SCHEMA_NAME_PATTERN: &str = r"^[a-zA-Z0-9_-]+$";

static SCHEMA_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SCHEMA_NAME_PATTERN).expect("static regex must compile"));

/// Why a schema name was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaNameError {
    #[error("schema name cannot be empty")]
    Empty,
    #[error(
        "invalid schema name '{0}': only letters, digits, underscores and hyphens are allowed"
    )]
    InvalidCharacters(String),
}

/// Checks `name` against [`SCHEMA_NAME_PATTERN`].
///
/// # Examples
///
/// ```
/// use schema_builder_core::{SchemaNameError, validate_schema_name};
///
/// assert!(validate_schema_name("weather_report-v2").is_ok());
/// assert_eq!(validate_schema_name(""), Err(SchemaNameError::Empty));
/// assert!(validate_schema_name("has space").is_err());
/// ```
pub fn validate_schema_name(name: &str) -> Result<(), SchemaNameError> {
    if name.is_empty() {
        return Err(SchemaNameError::Empty);
    }
    if !SCHEMA_NAME_RE.is_match(name) {
        return Err(SchemaNameError::InvalidCharacters(name.to_string()));
    }
    Ok(())
}
