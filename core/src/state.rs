//! Editing session state.
//!
//! [`SchemaState`] owns the live schema model for one editing session and
//! exposes the structural edits a presentation layer issues: add, remove,
//! update, and reorder properties at any depth, toggle strict mode, and
//! manage enum values. Compiled JSON and diagnostics are derived on demand
//! from the current tree.
//!
//! The tree is held behind an [`Arc`] and edited with [`Arc::make_mut`]:
//! a [`snapshot`](SchemaState::snapshot) taken before an edit keeps seeing
//! the tree as it was.
//!
//! Invalid indices and paths are ignored. Every mutating operation reports
//! whether it changed anything.
//!
//! # Example
//!
//! ```
//! use schema_builder_core::*;
//!
//! let mut state = SchemaState::default();
//! let index = state.add_property();
//! state.update_property(index, PropertyUpdate::new().name("city"));
//!
//! let before = state.snapshot();
//! state.update_property(index, PropertyUpdate::new().property_type(PropertyType::Array));
//!
//! assert_eq!(before.properties[0].property_type, PropertyType::String);
//! assert_eq!(state.schema().properties[0].property_type, PropertyType::Array);
//! assert!(!state.has_errors());
//! ```

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::{
    DEFAULT_SCHEMA_NAME, Diagnostic, EnumValue, PropertyPath, PropertyType, PropertyUpdate,
    SchemaDefinition, SchemaNameError, SchemaProperty, coerce_number, compile_schema,
    validate_schema, validate_schema_name,
};

/// Why [`SchemaState::export_json`] refused to produce output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    /// The model has validation findings.
    #[error("schema has {count} validation error(s)")]
    HasDiagnostics { count: usize },
    /// The schema name cannot be used as a structured-output name.
    #[error(transparent)]
    InvalidName(#[from] SchemaNameError),
}

/// Compiled output and diagnostics for one state of the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedSchema {
    pub json: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl RenderedSchema {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// The schema model of one editing session.
///
/// Strict mode starts on and the schema name starts as
/// [`DEFAULT_SCHEMA_NAME`].
#[derive(Debug, Clone)]
pub struct SchemaState {
    schema: Arc<SchemaDefinition>,
    strict: bool,
    schema_name: String,
}

impl Default for SchemaState {
    fn default() -> Self {
        Self::new(SchemaDefinition::default(), true)
    }
}

impl SchemaState {
    /// Creates a session over `schema`.
    pub fn new(schema: SchemaDefinition, strict: bool) -> Self {
        Self {
            schema: Arc::new(schema),
            strict,
            schema_name: DEFAULT_SCHEMA_NAME.to_string(),
        }
    }

    /// Sets the initial schema name.
    pub fn with_schema_name(mut self, name: impl Into<String>) -> Self {
        self.schema_name = name.into();
        self
    }

    pub fn schema(&self) -> &SchemaDefinition {
        &self.schema
    }

    /// Returns a handle to the current tree that later edits do not affect.
    pub fn snapshot(&self) -> Arc<SchemaDefinition> {
        Arc::clone(&self.schema)
    }

    /// Consumes the session and returns the model.
    pub fn into_schema(self) -> SchemaDefinition {
        Arc::unwrap_or_clone(self.schema)
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    /// Appends a blank root property and returns its index.
    ///
    /// The new property is required when strict mode is on.
    pub fn add_property(&mut self) -> usize {
        let required = self.strict;
        let properties = &mut Arc::make_mut(&mut self.schema).properties;
        properties.push(SchemaProperty::empty(required));
        debug!(index = properties.len() - 1, "Added root property");
        properties.len() - 1
    }

    /// Removes the root property at `index`.
    pub fn remove_property(&mut self, index: usize) -> bool {
        self.remove_property_at(&PropertyPath::root(index))
    }

    /// Merges `update` into the root property at `index`.
    ///
    /// See [`PropertyUpdate::apply_to`] for the type-change rules.
    pub fn update_property(&mut self, index: usize, update: PropertyUpdate) -> bool {
        self.update_property_at(&PropertyPath::root(index), update)
    }

    /// Moves the root property at `old_index` to `new_index`.
    pub fn reorder_property(&mut self, old_index: usize, new_index: usize) -> bool {
        self.reorder_property_at(&PropertyPath::default(), old_index, new_index)
    }

    /// Sets strict mode.
    ///
    /// Turning it on marks every root property as required. Nested
    /// properties and the off transition leave `required` flags alone.
    pub fn set_strict_mode(&mut self, checked: bool) {
        self.strict = checked;
        if checked && self.schema.properties.iter().any(|p| !p.required) {
            for property in &mut Arc::make_mut(&mut self.schema).properties {
                property.required = true;
            }
        }
        debug!(strict = checked, "Set strict mode");
    }

    /// Sets whether the root object admits extra keys.
    pub fn set_additional_properties(&mut self, allowed: bool) {
        if self.schema.additional_properties != allowed {
            Arc::make_mut(&mut self.schema).additional_properties = allowed;
        }
    }

    pub fn set_schema_name(&mut self, name: impl Into<String>) {
        self.schema_name = name.into();
    }

    /// Appends a blank child to the object at `parent` and returns its path.
    ///
    /// The empty path appends to the root. Returns `None` when `parent` does
    /// not exist or is not an object.
    ///
    /// # Examples
    ///
    /// ```
    /// use schema_builder_core::*;
    ///
    /// let schema = SchemaDefinition::new()
    ///     .with_property(SchemaProperty::new("meta", PropertyType::Object));
    /// let mut state = SchemaState::new(schema, false);
    /// let child = state.add_nested_property(&PropertyPath::root(0)).unwrap();
    /// assert_eq!(child.indices(), &[0, 0]);
    /// assert!(!state.schema().property(&child).unwrap().required);
    /// ```
    pub fn add_nested_property(&mut self, parent: &PropertyPath) -> Option<PropertyPath> {
        if parent.is_root() {
            return Some(PropertyPath::root(self.add_property()));
        }
        let target = self.schema.property(parent)?;
        if target.property_type != PropertyType::Object {
            debug!(path = %parent, "Ignoring nested add on non-object property");
            return None;
        }

        let required = self.strict;
        let node = Arc::make_mut(&mut self.schema).property_mut(parent)?;
        let children = node.properties.get_or_insert_with(Vec::new);
        children.push(SchemaProperty::empty(required));
        let path = parent.child(children.len() - 1);
        debug!(path = %path, "Added nested property");
        Some(path)
    }

    /// Removes the property at `path`.
    pub fn remove_property_at(&mut self, path: &PropertyPath) -> bool {
        let (Some(parent), Some(index)) = (path.parent(), path.last()) else {
            return false;
        };
        if self.schema.children(&parent).is_none_or(|c| index >= c.len()) {
            debug!(path = %path, "Ignoring remove of unknown property");
            return false;
        }

        if let Some(children) = Arc::make_mut(&mut self.schema).children_mut(&parent) {
            children.remove(index);
        }
        debug!(path = %path, "Removed property");
        true
    }

    /// Merges `update` into the property at `path`.
    pub fn update_property_at(&mut self, path: &PropertyPath, update: PropertyUpdate) -> bool {
        if self.schema.property(path).is_none() {
            debug!(path = %path, "Ignoring update of unknown property");
            return false;
        }

        if let Some(property) = Arc::make_mut(&mut self.schema).property_mut(path) {
            update.apply_to(property);
        }
        debug!(path = %path, "Updated property");
        true
    }

    /// Moves the child of `parent` at `old_index` to `new_index`.
    ///
    /// The moved element is removed and re-inserted; all others keep their
    /// relative order. Out-of-range indices leave the tree unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use schema_builder_core::*;
    ///
    /// let schema = SchemaDefinition::new()
    ///     .with_property(SchemaProperty::new("x", PropertyType::String))
    ///     .with_property(SchemaProperty::new("y", PropertyType::String))
    ///     .with_property(SchemaProperty::new("z", PropertyType::String));
    /// let mut state = SchemaState::new(schema, true);
    ///
    /// assert!(state.reorder_property(0, 2));
    /// let names: Vec<_> = state.schema().properties.iter().map(|p| p.name.as_str()).collect();
    /// assert_eq!(names, ["y", "z", "x"]);
    ///
    /// assert!(!state.reorder_property(0, 3));
    /// ```
    pub fn reorder_property_at(
        &mut self,
        parent: &PropertyPath,
        old_index: usize,
        new_index: usize,
    ) -> bool {
        let len = match self.schema.children(parent) {
            Some(children) => children.len(),
            None => return false,
        };
        if old_index >= len || new_index >= len {
            debug!(parent = %parent, old_index, new_index, len, "Ignoring out-of-range reorder");
            return false;
        }
        if old_index == new_index {
            return true;
        }

        if let Some(children) = Arc::make_mut(&mut self.schema).children_mut(parent) {
            let moved = children.remove(old_index);
            children.insert(new_index, moved);
        }
        debug!(parent = %parent, old_index, new_index, "Reordered property");
        true
    }

    /// Switches the enum on (with no values) or off (values cleared).
    pub fn set_enum_enabled(&mut self, path: &PropertyPath, enabled: bool) -> bool {
        let update = PropertyUpdate::new().has_enum(enabled);
        let update = if enabled {
            update.enum_values(Vec::new())
        } else {
            update.clear_enum_values()
        };
        self.update_property_at(path, update)
    }

    /// Appends an enum value typed by the user.
    ///
    /// The input is trimmed and ignored when empty. Number properties store
    /// the parsed number and reject input that is not a finite number; string
    /// properties store the text. Other types do not take enum values.
    ///
    /// # Examples
    ///
    /// ```
    /// use schema_builder_core::*;
    ///
    /// let schema = SchemaDefinition::new()
    ///     .with_property(SchemaProperty::new("level", PropertyType::Number));
    /// let mut state = SchemaState::new(schema, true);
    /// let path = PropertyPath::root(0);
    /// state.set_enum_enabled(&path, true);
    ///
    /// assert!(state.add_enum_value(&path, " 3 "));
    /// assert!(!state.add_enum_value(&path, "high"));
    /// assert!(!state.add_enum_value(&path, "   "));
    /// assert_eq!(state.schema().properties[0].enum_values(), &[EnumValue::Number(3.0)]);
    /// ```
    pub fn add_enum_value(&mut self, path: &PropertyPath, raw: &str) -> bool {
        let input = raw.trim();
        if input.is_empty() {
            return false;
        }
        let Some(property) = self.schema.property(path) else {
            return false;
        };

        let value = match property.property_type {
            PropertyType::Number => {
                let number = coerce_number(input);
                if !number.is_finite() {
                    debug!(path = %path, input, "Rejected non-finite enum value");
                    return false;
                }
                EnumValue::Number(number)
            }
            PropertyType::String => EnumValue::Text(input.to_string()),
            _ => return false,
        };

        let mut values = property.enum_values().to_vec();
        values.push(value);
        self.update_property_at(path, PropertyUpdate::new().enum_values(values))
    }

    /// Removes the enum value at `enum_index`.
    pub fn remove_enum_value(&mut self, path: &PropertyPath, enum_index: usize) -> bool {
        let Some(property) = self.schema.property(path) else {
            return false;
        };
        let Some(existing) = &property.enum_values else {
            return false;
        };
        if enum_index >= existing.len() {
            return false;
        }

        let mut values = existing.clone();
        values.remove(enum_index);
        self.update_property_at(path, PropertyUpdate::new().enum_values(values))
    }

    /// Compiles the current model with the session's strict flag and name.
    pub fn compiled_json(&self) -> String {
        compile_schema(&self.schema, self.strict, &self.schema_name)
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        validate_schema(&self.schema)
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics().is_empty()
    }

    /// Recomputes both derived outputs.
    pub fn render(&self) -> RenderedSchema {
        RenderedSchema {
            json: self.compiled_json(),
            diagnostics: self.diagnostics(),
        }
    }

    /// Returns the compiled JSON for copying out of the editor.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::InvalidName`] when the schema name does not
    /// match [`SCHEMA_NAME_PATTERN`](crate::SCHEMA_NAME_PATTERN), or
    /// [`ExportError::HasDiagnostics`] when validation reports findings.
    pub fn export_json(&self) -> Result<String, ExportError> {
        validate_schema_name(&self.schema_name)?;
        let diagnostics = self.diagnostics();
        if !diagnostics.is_empty() {
            return Err(ExportError::HasDiagnostics {
                count: diagnostics.len(),
            });
        }
        Ok(self.compiled_json())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ItemType, ItemsSchema};

    fn named(names: &[&str]) -> SchemaState {
        let schema = names.iter().fold(SchemaDefinition::new(), |schema, name| {
            schema.with_property(SchemaProperty::new(name, PropertyType::String))
        });
        SchemaState::new(schema, true)
    }

    fn root_names(state: &SchemaState) -> Vec<&str> {
        state
            .schema()
            .properties
            .iter()
            .map(|p| p.name.as_str())
            .collect()
    }

    #[test]
    fn test_add_property_uses_strict_flag() {
        let mut state = SchemaState::new(SchemaDefinition::new(), false);
        let index = state.add_property();

        let added = &state.schema().properties[index];
        assert_eq!(added, &SchemaProperty::empty(false));
    }

    #[test]
    fn test_remove_property_out_of_range_is_noop() {
        let mut state = named(&["a", "b"]);
        assert!(!state.remove_property(2));
        assert_eq!(root_names(&state), ["a", "b"]);

        assert!(state.remove_property(0));
        assert_eq!(root_names(&state), ["b"]);
    }

    #[test]
    fn test_update_out_of_range_is_noop() {
        let mut state = named(&["a"]);
        assert!(!state.update_property(1, PropertyUpdate::new().name("b")));
        assert_eq!(root_names(&state), ["a"]);
    }

    #[test]
    fn test_type_switch_clears_object_fields() {
        let schema = SchemaDefinition::new().with_property(
            SchemaProperty::new("meta", PropertyType::Object)
                .with_property(SchemaProperty::new("child", PropertyType::String)),
        );
        let mut state = SchemaState::new(schema, true);

        state.update_property(0, PropertyUpdate::new().property_type(PropertyType::Array));

        let property = &state.schema().properties[0];
        assert_eq!(property.properties, None);
        assert_eq!(property.additional_object_properties, None);
        assert!(!property.has_enum);
        assert_eq!(property.enum_values, Some(vec![]));
        assert_eq!(property.items, Some(ItemsSchema::new(ItemType::String)));
    }

    #[test]
    fn test_reorder_moves_and_recompiles() {
        let mut state = named(&["x", "y", "z"]);
        assert!(state.reorder_property(0, 2));
        assert_eq!(root_names(&state), ["y", "z", "x"]);

        let doc: serde_json::Value = serde_json::from_str(&state.compiled_json()).unwrap();
        let keys: Vec<&str> = doc["schema"]["properties"]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, ["y", "z", "x"]);
        assert_eq!(doc["schema"]["required"], serde_json::json!(["y", "z", "x"]));
    }

    #[test]
    fn test_reorder_backwards() {
        let mut state = named(&["a", "b", "c", "d"]);
        assert!(state.reorder_property(3, 1));
        assert_eq!(root_names(&state), ["a", "d", "b", "c"]);
    }

    #[test]
    fn test_strict_mode_only_forces_root_required() {
        let schema = SchemaDefinition::new()
            .with_property(SchemaProperty::new("a", PropertyType::String).with_required(false))
            .with_property(
                SchemaProperty::new("meta", PropertyType::Object)
                    .with_required(false)
                    .with_property(
                        SchemaProperty::new("child", PropertyType::String).with_required(false),
                    ),
            );
        let mut state = SchemaState::new(schema, false);

        state.set_strict_mode(true);
        assert!(state.is_strict());
        assert!(state.schema().properties.iter().all(|p| p.required));
        assert!(!state.schema().properties[1].children()[0].required);
    }

    #[test]
    fn test_strict_mode_off_keeps_required_flags() {
        let schema = SchemaDefinition::new()
            .with_property(SchemaProperty::new("a", PropertyType::String))
            .with_property(SchemaProperty::new("b", PropertyType::String).with_required(false));
        let mut state = SchemaState::new(schema, true);

        state.set_strict_mode(false);
        let required: Vec<bool> = state.schema().properties.iter().map(|p| p.required).collect();
        assert_eq!(required, [true, false]);
    }

    #[test]
    fn test_nested_edits_follow_root_rules() {
        let schema = SchemaDefinition::new()
            .with_property(SchemaProperty::new("meta", PropertyType::Object));
        let mut state = SchemaState::new(schema, true);
        let parent = PropertyPath::root(0);

        let first = state.add_nested_property(&parent).unwrap();
        let second = state.add_nested_property(&parent).unwrap();
        state.update_property_at(&first, PropertyUpdate::new().name("one"));
        state.update_property_at(&second, PropertyUpdate::new().name("two"));
        state.set_enum_enabled(&second, true);
        state.update_property_at(
            &second,
            PropertyUpdate::new().property_type(PropertyType::Object),
        );

        let two = state.schema().property(&second).unwrap();
        assert!(!two.has_enum);
        assert_eq!(two.properties, Some(vec![]));

        assert!(state.reorder_property_at(&parent, 1, 0));
        let names: Vec<&str> = state.schema().properties[0]
            .children()
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, ["two", "one"]);

        assert!(state.remove_property_at(&parent.child(0)));
        assert!(!state.remove_property_at(&parent.child(5)));
        assert_eq!(state.schema().properties[0].children().len(), 1);
    }

    #[test]
    fn test_nested_add_on_leaf_is_rejected() {
        let mut state = named(&["leaf"]);
        assert_eq!(state.add_nested_property(&PropertyPath::root(0)), None);
        assert_eq!(state.add_nested_property(&PropertyPath::root(4)), None);
    }

    #[test]
    fn test_snapshot_survives_later_edits() {
        let mut state = named(&["a"]);
        let before = state.snapshot();

        state.remove_property(0);
        state.add_property();

        assert_eq!(before.properties[0].name, "a");
        assert_eq!(state.schema().properties[0].name, "");
    }

    #[test]
    fn test_enum_editing() {
        let mut state = named(&["color"]);
        let path = PropertyPath::root(0);

        assert!(state.set_enum_enabled(&path, true));
        assert!(state.has_errors());

        state.add_enum_value(&path, "red");
        state.add_enum_value(&path, "green");
        assert!(!state.has_errors());

        assert!(state.remove_enum_value(&path, 0));
        assert!(!state.remove_enum_value(&path, 3));
        assert_eq!(
            state.schema().properties[0].enum_values(),
            &[EnumValue::from("green")]
        );

        assert!(state.set_enum_enabled(&path, false));
        let property = &state.schema().properties[0];
        assert!(!property.has_enum);
        assert_eq!(property.enum_values, None);
    }

    #[test]
    fn test_numeric_enum_rejects_non_finite_input() {
        let schema = SchemaDefinition::new()
            .with_property(SchemaProperty::new("level", PropertyType::Number));
        let mut state = SchemaState::new(schema, true);
        let path = PropertyPath::root(0);
        state.set_enum_enabled(&path, true);

        assert!(!state.add_enum_value(&path, "Infinity"));
        assert!(!state.add_enum_value(&path, "-Infinity"));
        assert!(!state.add_enum_value(&path, "1e400"));
        assert!(!state.add_enum_value(&path, "high"));
        assert!(state.add_enum_value(&path, "3"));
        assert_eq!(
            state.schema().properties[0].enum_values(),
            &[EnumValue::Number(3.0)]
        );
    }

    #[test]
    fn test_enum_values_rejected_for_boolean() {
        let schema =
            SchemaDefinition::new().with_property(SchemaProperty::new("ok", PropertyType::Boolean));
        let mut state = SchemaState::new(schema, true);
        assert!(!state.add_enum_value(&PropertyPath::root(0), "true"));
    }

    #[test]
    fn test_export_requires_clean_schema_and_valid_name() {
        let mut state = SchemaState::default();
        state.add_property();
        assert_eq!(
            state.export_json(),
            Err(ExportError::HasDiagnostics { count: 1 })
        );

        state.update_property(0, PropertyUpdate::new().name("title"));
        state.set_schema_name("bad name");
        assert!(matches!(
            state.export_json(),
            Err(ExportError::InvalidName(_))
        ));

        state.set_schema_name("good_name");
        let json = state.export_json().unwrap();
        assert_eq!(json, state.compiled_json());
        assert!(json.contains("\"name\": \"good_name\""));
    }

    #[test]
    fn test_render_bundles_outputs() {
        let mut state = SchemaState::default();
        state.add_property();

        let rendered = state.render();
        assert!(rendered.has_errors());
        assert_eq!(rendered.json, state.compiled_json());
        assert_eq!(rendered.diagnostics[0].path, "root[0]");
    }
}
