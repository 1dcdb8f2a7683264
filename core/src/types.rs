//! Schema model for structured-output property trees.
//!
//! This module defines the in-memory data model edited by
//! [`SchemaState`](crate::SchemaState) and consumed by the compiler and the
//! validator. The types serialize with [`serde`] using the editor's
//! camelCase field names, so a model can round-trip through JSON or YAML
//! model files.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use crate::PropertyPath;
use crate::compile::{js_number_text, number_value};

/// Type tag of a property.
///
/// The tag decides which optional fields of a [`SchemaProperty`] are
/// meaningful: `items` for arrays, `properties` and
/// `additionalObjectProperties` for objects, `enum` for strings and numbers.
///
/// # Examples
///
/// ```
/// use schema_builder_core::PropertyType;
///
/// assert_eq!(PropertyType::default(), PropertyType::String);
/// assert_eq!(PropertyType::Array.as_str(), "array");
/// assert!(PropertyType::Number.supports_enum());
/// assert!(!PropertyType::Object.supports_enum());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    /// Free text (the default for new properties).
    #[default]
    String,
    /// Numeric value.
    Number,
    /// `true` / `false`.
    Boolean,
    /// Nested object with its own properties.
    Object,
    /// List of values of a single [`ItemType`].
    Array,
}

impl PropertyType {
    /// Returns the JSON Schema type keyword.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
        }
    }

    /// Returns `true` for types whose values can be restricted by an enum.
    pub fn supports_enum(self) -> bool {
        matches!(self, Self::String | Self::Number)
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Element type of an array property.
///
/// Nested arrays are not supported, so there is no `Array` variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    #[default]
    String,
    Number,
    Boolean,
    Object,
}

impl ItemType {
    /// Returns the JSON Schema type keyword.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `items` block of an array property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ItemsSchema {
    /// Type of every array element.
    #[serde(rename = "type")]
    pub item_type: ItemType,
}

impl ItemsSchema {
    pub fn new(item_type: ItemType) -> Self {
        Self { item_type }
    }
}

/// A single enum entry.
///
/// Serialized untagged, so `"red"` and `3` are both valid in a model file.
/// Integral numbers are written without a fraction; non-finite numbers are
/// written as their JavaScript text (`"Infinity"`), which reads back as text.
///
/// # Examples
///
/// ```
/// use schema_builder_core::EnumValue;
///
/// let values: Vec<EnumValue> = serde_json::from_str(r#"["red", 3]"#).unwrap();
/// assert_eq!(values, vec![EnumValue::from("red"), EnumValue::from(3)]);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EnumValue {
    Number(f64),
    Text(String),
}

impl Serialize for EnumValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(n) if n.is_finite() => number_value(*n).serialize(serializer),
            Self::Number(n) => serializer.serialize_str(&js_number_text(*n)),
            Self::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl From<&str> for EnumValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for EnumValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for EnumValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for EnumValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// One field definition in the schema tree.
///
/// Optional fields are only meaningful for the matching
/// [`property_type`](Self::property_type); a type change through
/// [`PropertyUpdate`](crate::PropertyUpdate) clears the ones that no longer
/// apply. Children in [`properties`](Self::properties) are owned exclusively,
/// so the tree can never contain cycles.
///
/// # Examples
///
/// ```
/// use schema_builder_core::{ItemType, PropertyType, SchemaProperty};
///
/// let tags = SchemaProperty::new("tags", PropertyType::Array)
///     .with_items(ItemType::String)
///     .with_description("Free-form labels");
/// assert!(tags.required);
/// assert_eq!(tags.items.unwrap().item_type, ItemType::String);
///
/// let address = SchemaProperty::new("address", PropertyType::Object)
///     .with_property(SchemaProperty::new("city", PropertyType::String));
/// assert_eq!(address.children().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaProperty {
    /// Key of the field in the compiled `properties` map.
    pub name: String,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the name is listed in the parent's `required` array.
    #[serde(default)]
    pub required: bool,
    /// Enum toggle; independent of whether `enum_values` is populated.
    #[serde(default)]
    pub has_enum: bool,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<EnumValue>>,
    /// Present only for `array` properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<ItemsSchema>,
    /// Present only for `object` properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<SchemaProperty>>,
    /// Present only for `object` properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_object_properties: Option<bool>,
}

impl SchemaProperty {
    /// Creates the blank property the editor appends on "add property".
    ///
    /// # Examples
    ///
    /// ```
    /// use schema_builder_core::{PropertyType, SchemaProperty};
    ///
    /// let blank = SchemaProperty::empty(true);
    /// assert_eq!(blank.name, "");
    /// assert_eq!(blank.property_type, PropertyType::String);
    /// assert!(blank.required);
    /// assert!(!blank.has_enum);
    /// assert_eq!(blank.enum_values, Some(vec![]));
    /// ```
    pub fn empty(required: bool) -> Self {
        Self {
            name: String::new(),
            property_type: PropertyType::String,
            description: None,
            required,
            has_enum: false,
            enum_values: Some(Vec::new()),
            items: None,
            properties: None,
            additional_object_properties: None,
        }
    }

    /// Creates a required property with the type-specific fields populated
    /// the way a type switch would populate them.
    pub fn new(name: &str, property_type: PropertyType) -> Self {
        let mut property = Self::empty(true);
        property.name = name.to_string();
        property.property_type = property_type;
        property.reset_type_fields();
        property
    }

    /// Adds a description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Sets the required flag.
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Enables the enum and replaces its values.
    pub fn with_enum<V: Into<EnumValue>>(mut self, values: impl IntoIterator<Item = V>) -> Self {
        self.has_enum = true;
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the array element type.
    pub fn with_items(mut self, item_type: ItemType) -> Self {
        self.items = Some(ItemsSchema::new(item_type));
        self
    }

    /// Appends a nested property.
    pub fn with_property(mut self, child: SchemaProperty) -> Self {
        self.properties.get_or_insert_with(Vec::new).push(child);
        self
    }

    /// Sets whether the nested object schema admits extra keys.
    pub fn with_additional_properties(mut self, allowed: bool) -> Self {
        self.additional_object_properties = Some(allowed);
        self
    }

    /// Returns the nested properties, or an empty slice when there are none.
    pub fn children(&self) -> &[SchemaProperty] {
        self.properties.as_deref().unwrap_or_default()
    }

    /// Returns the enum values, or an empty slice when there are none.
    pub fn enum_values(&self) -> &[EnumValue] {
        self.enum_values.as_deref().unwrap_or_default()
    }

    /// Replaces the type-specific fields with the defaults for the current
    /// type: `items = string` for arrays, an empty closed object for objects,
    /// nothing otherwise.
    fn reset_type_fields(&mut self) {
        let is_object = self.property_type == PropertyType::Object;
        self.items = (self.property_type == PropertyType::Array).then(ItemsSchema::default);
        self.properties = is_object.then(Vec::new);
        self.additional_object_properties = is_object.then_some(false);
    }
}

/// Root container of the schema model.
///
/// # Examples
///
/// ```
/// use schema_builder_core::*;
///
/// let schema = SchemaDefinition::new()
///     .with_property(SchemaProperty::new("title", PropertyType::String))
///     .with_property(
///         SchemaProperty::new("meta", PropertyType::Object)
///             .with_property(SchemaProperty::new("author", PropertyType::String)),
///     );
///
/// let author = schema.property(&PropertyPath::from(vec![1, 0])).unwrap();
/// assert_eq!(author.name, "author");
/// assert!(schema.property(&PropertyPath::root(5)).is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDefinition {
    /// Top-level fields, in schema order.
    #[serde(default)]
    pub properties: Vec<SchemaProperty>,
    /// Whether the root object schema admits extra keys.
    #[serde(default)]
    pub additional_properties: bool,
}

impl SchemaDefinition {
    /// Creates an empty, closed schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a top-level property.
    pub fn with_property(mut self, property: SchemaProperty) -> Self {
        self.properties.push(property);
        self
    }

    /// Looks up the property at `path`.
    pub fn property(&self, path: &PropertyPath) -> Option<&SchemaProperty> {
        let (first, rest) = path.indices().split_first()?;
        let mut node = self.properties.get(*first)?;
        for &index in rest {
            node = node.properties.as_ref()?.get(index)?;
        }
        Some(node)
    }

    /// Mutable counterpart of [`property`](Self::property).
    pub fn property_mut(&mut self, path: &PropertyPath) -> Option<&mut SchemaProperty> {
        let (first, rest) = path.indices().split_first()?;
        let mut node = self.properties.get_mut(*first)?;
        for &index in rest {
            node = node.properties.as_mut()?.get_mut(index)?;
        }
        Some(node)
    }

    /// Returns the sibling list that `parent` owns.
    ///
    /// The empty path addresses the root list. Returns `None` when the
    /// parent does not exist or has no `properties` sequence.
    pub fn children(&self, parent: &PropertyPath) -> Option<&Vec<SchemaProperty>> {
        if parent.is_root() {
            return Some(&self.properties);
        }
        self.property(parent)?.properties.as_ref()
    }

    /// Mutable counterpart of [`children`](Self::children).
    pub fn children_mut(&mut self, parent: &PropertyPath) -> Option<&mut Vec<SchemaProperty>> {
        if parent.is_root() {
            return Some(&mut self.properties);
        }
        self.property_mut(parent)?.properties.as_mut()
    }
}
