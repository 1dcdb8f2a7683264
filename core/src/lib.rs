//! Schema model, compiler, and validator for structured-output JSON Schemas.
//!
//! This crate holds the semantics behind an interactive schema editor:
//!
//! - [`SchemaDefinition`] / [`SchemaProperty`]: the recursive tree of
//!   property definitions plus root flags.
//! - [`compile_schema`]: turns the tree into a `{name, strict, schema}`
//!   document with deterministic key order.
//! - [`validate_schema`]: walks the tree and reports [`Diagnostic`]s such
//!   as empty or duplicate names.
//! - [`SchemaState`]: owns the tree for one editing session and applies
//!   structural edits addressed by [`PropertyPath`].
//!
//! # Example
//!
//! ```
//! use schema_builder_core::*;
//!
//! let mut state = SchemaState::default().with_schema_name("weather");
//! let index = state.add_property();
//! state.update_property(index, PropertyUpdate::new().name("city"));
//!
//! let meta = state.add_property();
//! state.update_property(
//!     meta,
//!     PropertyUpdate::new().name("meta").property_type(PropertyType::Object),
//! );
//! let child = state.add_nested_property(&PropertyPath::root(meta)).unwrap();
//! state.update_property_at(&child, PropertyUpdate::new().name("source"));
//!
//! assert!(state.diagnostics().is_empty());
//! let doc: serde_json::Value = serde_json::from_str(&state.export_json().unwrap()).unwrap();
//! assert_eq!(doc["schema"]["required"], serde_json::json!(["city", "meta"]));
//! assert_eq!(doc["schema"]["properties"]["meta"]["required"], serde_json::json!(["source"]));
//! ```

mod compile;
mod name;
mod path;
mod state;
mod types;
mod update;
mod validate;

pub use compile::{
    DEFAULT_SCHEMA_NAME, coerce_number, compile_property, compile_schema, compile_schema_value,
};
pub use name::{SCHEMA_NAME_PATTERN, SchemaNameError, validate_schema_name};
pub use path::PropertyPath;
pub use state::{ExportError, RenderedSchema, SchemaState};
pub use types::*;
pub use update::PropertyUpdate;
pub use validate::{Diagnostic, ValidationIssue, diagnostics_for_property, validate_schema};
