//! Schema model validation.
//!
//! Walks the property tree depth-first and reports advisory diagnostics
//! such as empty names, duplicate names, and enums that are switched on
//! without values. Validation never fails: every model yields a (possibly
//! empty) list.
//!
//! Property names share one namespace across the whole tree, so a nested
//! child named like a property under a different parent is reported as a
//! duplicate too.
//!
//! # Examples
//!
//! ```
//! use schema_builder_core::*;
//!
//! let schema = SchemaDefinition::new()
//!     .with_property(SchemaProperty::new("a", PropertyType::String))
//!     .with_property(SchemaProperty::new("b", PropertyType::String))
//!     .with_property(SchemaProperty::new("a", PropertyType::String));
//!
//! let diagnostics = validate_schema(&schema);
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].path, "root[2]");
//! assert_eq!(diagnostics[0].message(), "Duplicate property name: a");
//! ```

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

use crate::{PropertyType, SchemaDefinition, SchemaProperty};

/// Problems the validator reports for a single property.
///
/// The `Display` impl is the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    /// Name is empty or whitespace-only.
    #[error("Property name cannot be empty")]
    EmptyName,
    /// Name was already used earlier in the walk, anywhere in the tree.
    #[error("Duplicate property name: {0}")]
    DuplicateName(String),
    /// `hasEnum` is on but no enum values exist.
    #[error("Enum is enabled but no values are defined")]
    EmptyEnum,
}

/// A validation finding attached to a property.
///
/// `path` is `root[i]` for root properties and `<parent path>.<parent
/// name>[i]` for nested ones. Serializes as `{path, message}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub path: String,
    pub issue: ValidationIssue,
}

impl Diagnostic {
    pub fn new(path: impl Into<String>, issue: ValidationIssue) -> Self {
        Self {
            path: path.into(),
            issue,
        }
    }

    /// Human-readable message for this finding.
    pub fn message(&self) -> String {
        self.issue.to_string()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.issue)
    }
}

impl Serialize for Diagnostic {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Diagnostic", 2)?;
        state.serialize_field("path", &self.path)?;
        state.serialize_field("message", &self.message())?;
        state.end()
    }
}

/// Validates a schema model.
///
/// Root properties are visited in order; an object's children are visited
/// before its next sibling. Each property contributes, in order, an
/// empty-name finding, a duplicate-name finding, and an empty-enum finding.
///
/// # Examples
///
/// ```
/// use schema_builder_core::*;
///
/// let schema = SchemaDefinition::new().with_property(
///     SchemaProperty::new("color", PropertyType::String).with_enum(Vec::<EnumValue>::new()),
/// );
/// let diagnostics = validate_schema(&schema);
/// assert_eq!(diagnostics, vec![Diagnostic::new("root[0]", ValidationIssue::EmptyEnum)]);
/// ```
pub fn validate_schema(schema: &SchemaDefinition) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for (index, property) in schema.properties.iter().enumerate() {
        validate_property(property, format!("root[{index}]"), &mut seen, &mut diagnostics);
    }

    diagnostics
}

fn validate_property<'a>(
    property: &'a SchemaProperty,
    path: String,
    seen: &mut HashSet<&'a str>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if property.name.trim().is_empty() {
        diagnostics.push(Diagnostic::new(path.clone(), ValidationIssue::EmptyName));
    }

    if !seen.insert(property.name.as_str()) {
        diagnostics.push(Diagnostic::new(
            path.clone(),
            ValidationIssue::DuplicateName(property.name.clone()),
        ));
    }

    if property.has_enum && property.enum_values().is_empty() {
        diagnostics.push(Diagnostic::new(path.clone(), ValidationIssue::EmptyEnum));
    }

    if property.property_type == PropertyType::Object {
        if let Some(children) = &property.properties {
            for (index, child) in children.iter().enumerate() {
                let child_path = format!("{path}.{}[{index}]", property.name);
                validate_property(child, child_path, seen, diagnostics);
            }
        }
    }
}

/// Selects the diagnostics shown next to the root property at `index`.
///
/// Matches the property's own path and every path nested under it.
///
/// # Examples
///
/// ```
/// use schema_builder_core::*;
///
/// let schema = SchemaDefinition::new()
///     .with_property(SchemaProperty::new("", PropertyType::String))
///     .with_property(
///         SchemaProperty::new("meta", PropertyType::Object)
///             .with_property(SchemaProperty::new("", PropertyType::String)),
///     );
/// let diagnostics = validate_schema(&schema);
///
/// let for_meta = diagnostics_for_property(&diagnostics, 1, "meta");
/// assert_eq!(for_meta.len(), 2);
/// assert!(for_meta.iter().all(|d| d.path == "root[1].meta[0]"));
/// ```
pub fn diagnostics_for_property<'a>(
    diagnostics: &'a [Diagnostic],
    index: usize,
    name: &str,
) -> Vec<&'a Diagnostic> {
    let own = format!("root[{index}]");
    let nested = format!("root[{index}].{name}");
    diagnostics
        .iter()
        .filter(|d| d.path == own || d.path.starts_with(&nested))
        .collect()
}
