//! Partial property updates and the type-switch reset rule.
//!
//! A [`PropertyUpdate`] is the editor's "spread-merge" of a partial property
//! onto an existing one. Every optional model field can be left untouched,
//! set, or explicitly cleared. Changing the type always resets the enum
//! state and replaces the type-specific fields with the new type's defaults,
//! unless the update itself provides them.
//!
//! # Examples
//!
//! ```
//! use schema_builder_core::*;
//!
//! let mut property = SchemaProperty::new("meta", PropertyType::Object)
//!     .with_property(SchemaProperty::new("child", PropertyType::String));
//!
//! PropertyUpdate::new()
//!     .property_type(PropertyType::Array)
//!     .apply_to(&mut property);
//!
//! assert_eq!(property.items, Some(ItemsSchema::new(ItemType::String)));
//! assert!(property.properties.is_none());
//! assert!(property.additional_object_properties.is_none());
//! assert!(!property.has_enum);
//! ```

use serde::{Deserialize, Deserializer};

use crate::{EnumValue, ItemType, ItemsSchema, PropertyType, SchemaProperty};

/// Partial update merged onto a [`SchemaProperty`].
///
/// Fields set to `None` are left untouched. For the optional model fields,
/// `Some(None)` clears the field and `Some(Some(v))` sets it. In serialized
/// form a missing key means "untouched" and an explicit `null` means
/// "clear".
///
/// # Examples
///
/// ```
/// use schema_builder_core::{PropertyUpdate, SchemaProperty};
///
/// let update: PropertyUpdate =
///     serde_json::from_str(r#"{"name": "title", "description": null}"#).unwrap();
///
/// let mut property = SchemaProperty::empty(false).with_description("old");
/// update.apply_to(&mut property);
/// assert_eq!(property.name, "title");
/// assert_eq!(property.description, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PropertyUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub property_type: Option<PropertyType>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub has_enum: Option<bool>,
    #[serde(rename = "enum", default, deserialize_with = "double_option")]
    pub enum_values: Option<Option<Vec<EnumValue>>>,
    #[serde(default, deserialize_with = "double_option")]
    pub items: Option<Option<ItemsSchema>>,
    #[serde(default, deserialize_with = "double_option")]
    pub properties: Option<Option<Vec<SchemaProperty>>>,
    #[serde(default, deserialize_with = "double_option")]
    pub additional_object_properties: Option<Option<bool>>,
}

/// Distinguishes a missing key (outer `None`, via `default`) from `null`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl PropertyUpdate {
    /// Creates an update that changes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn property_type(mut self, property_type: PropertyType) -> Self {
        self.property_type = Some(property_type);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(Some(description.into()));
        self
    }

    pub fn clear_description(mut self) -> Self {
        self.description = Some(None);
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn has_enum(mut self, has_enum: bool) -> Self {
        self.has_enum = Some(has_enum);
        self
    }

    pub fn enum_values(mut self, values: Vec<EnumValue>) -> Self {
        self.enum_values = Some(Some(values));
        self
    }

    pub fn clear_enum_values(mut self) -> Self {
        self.enum_values = Some(None);
        self
    }

    pub fn items(mut self, item_type: ItemType) -> Self {
        self.items = Some(Some(ItemsSchema::new(item_type)));
        self
    }

    pub fn properties(mut self, properties: Vec<SchemaProperty>) -> Self {
        self.properties = Some(Some(properties));
        self
    }

    pub fn additional_object_properties(mut self, allowed: bool) -> Self {
        self.additional_object_properties = Some(Some(allowed));
        self
    }

    /// Returns `true` when applying this update would change nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merges this update into `property`.
    ///
    /// When the update carries a type that differs from the current one,
    /// `has_enum` becomes `false` and the enum becomes empty regardless of
    /// what the update says about them, and any of `items`, `properties`,
    /// and `additional_object_properties` that the update leaves untouched
    /// are reset to the new type's defaults.
    pub fn apply_to(self, property: &mut SchemaProperty) {
        let retyped = self
            .property_type
            .is_some_and(|new_type| new_type != property.property_type);
        let sets_items = self.items.is_some();
        let sets_properties = self.properties.is_some();
        let sets_additional = self.additional_object_properties.is_some();

        if let Some(name) = self.name {
            property.name = name;
        }
        if let Some(property_type) = self.property_type {
            property.property_type = property_type;
        }
        if let Some(description) = self.description {
            property.description = description;
        }
        if let Some(required) = self.required {
            property.required = required;
        }
        if let Some(has_enum) = self.has_enum {
            property.has_enum = has_enum;
        }
        if let Some(enum_values) = self.enum_values {
            property.enum_values = enum_values;
        }
        if let Some(items) = self.items {
            property.items = items;
        }
        if let Some(properties) = self.properties {
            property.properties = properties;
        }
        if let Some(additional) = self.additional_object_properties {
            property.additional_object_properties = additional;
        }

        if retyped {
            property.has_enum = false;
            property.enum_values = Some(Vec::new());

            let is_object = property.property_type == PropertyType::Object;
            if !sets_items {
                property.items =
                    (property.property_type == PropertyType::Array).then(ItemsSchema::default);
            }
            if !sets_properties {
                property.properties = is_object.then(Vec::new);
            }
            if !sets_additional {
                property.additional_object_properties = is_object.then_some(false);
            }
        }
    }
}
