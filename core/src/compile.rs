//! Compilation of the schema model into a structured-output JSON Schema.
//!
//! The compiled document has the shape `{name, strict, schema}` where
//! `schema` is a closed-or-open object schema built from the root
//! properties. Key order inside every emitted object follows declaration
//! order (`type`, `description`, `enum`, `items`, `properties`, `required`,
//! `additionalProperties`), and `properties`/`required` follow sibling order,
//! so the output text is deterministic and diffable.
//!
//! # Examples
//!
//! ```
//! use schema_builder_core::*;
//!
//! let schema = SchemaDefinition::new()
//!     .with_property(SchemaProperty::new("city", PropertyType::String));
//!
//! let json = compile_schema(&schema, true, DEFAULT_SCHEMA_NAME);
//! assert!(json.starts_with("{\n  \"name\": \"schema_definition\",\n  \"strict\": true,"));
//!
//! let doc = compile_schema_value(&schema, true, "weather");
//! assert_eq!(doc["schema"]["required"], serde_json::json!(["city"]));
//! ```

use std::io;

use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter};
use serde_json::{Map, Number, Value};

use crate::{EnumValue, PropertyType, SchemaDefinition, SchemaProperty};

/// Top-level `name` used when the caller has not chosen one.
pub const DEFAULT_SCHEMA_NAME: &str = "schema_definition";

/// Largest integer an IEEE double represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Compiles `schema` into pretty-printed JSON text (two-space indent).
///
/// Total over every model: malformed nodes simply omit the fields they
/// cannot produce. Numbers are written the way JavaScript prints them.
pub fn compile_schema(schema: &SchemaDefinition, strict: bool, name: &str) -> String {
    let value = compile_schema_value(schema, strict, name);
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, JsFormatter::default());
    value
        .serialize(&mut serializer)
        .expect("in-memory JSON value must serialize");
    String::from_utf8(out).expect("serde_json emits UTF-8")
}

/// Compiles `schema` into a JSON value with insertion-ordered keys.
pub fn compile_schema_value(schema: &SchemaDefinition, strict: bool, name: &str) -> Value {
    let mut root = Map::new();
    root.insert("type".into(), Value::from("object"));
    write_object_fields(&mut root, &schema.properties, schema.additional_properties);

    let mut document = Map::new();
    document.insert("name".into(), Value::from(name));
    document.insert("strict".into(), Value::Bool(strict));
    document.insert("schema".into(), Value::Object(root));
    Value::Object(document)
}

/// Compiles a single property into its JSON Schema fragment.
///
/// # Examples
///
/// ```
/// use schema_builder_core::*;
///
/// let size = SchemaProperty::new("size", PropertyType::Number).with_enum(["1", "2.5"]);
/// assert_eq!(
///     compile_property(&size),
///     serde_json::json!({"type": "number", "enum": [1, 2.5]})
/// );
///
/// // A disabled enum never contributes an `enum` key.
/// let mut plain = size.clone();
/// plain.has_enum = false;
/// assert_eq!(compile_property(&plain), serde_json::json!({"type": "number"}));
/// ```
pub fn compile_property(property: &SchemaProperty) -> Value {
    let mut out = Map::new();
    out.insert("type".into(), Value::from(property.property_type.as_str()));

    if let Some(description) = property.description.as_deref().filter(|d| !d.is_empty()) {
        out.insert("description".into(), Value::from(description));
    }

    if property.has_enum && !property.enum_values().is_empty() {
        let values = property
            .enum_values()
            .iter()
            .map(|value| match property.property_type {
                PropertyType::Number => number_value(value.as_number()),
                _ => value.to_json(),
            })
            .collect();
        out.insert("enum".into(), Value::Array(values));
    }

    if property.property_type == PropertyType::Array {
        if let Some(items) = property.items {
            let mut items_schema = Map::new();
            items_schema.insert("type".into(), Value::from(items.item_type.as_str()));
            out.insert("items".into(), Value::Object(items_schema));
        }
    }

    if property.property_type == PropertyType::Object {
        if let Some(children) = &property.properties {
            let additional = property.additional_object_properties.unwrap_or(false);
            write_object_fields(&mut out, children, additional);
        }
    }

    Value::Object(out)
}

/// Appends `properties`, `required`, and `additionalProperties`.
///
/// Repeated sibling names collapse into a single key that keeps its first
/// position and its last definition; `required` lists every occurrence.
fn write_object_fields(
    out: &mut Map<String, Value>,
    properties: &[SchemaProperty],
    additional: bool,
) {
    let mut compiled = Map::new();
    for property in properties {
        compiled.insert(property.name.clone(), compile_property(property));
    }

    let required = properties
        .iter()
        .filter(|p| p.required)
        .map(|p| Value::from(p.name.as_str()))
        .collect();

    out.insert("properties".into(), Value::Object(compiled));
    out.insert("required".into(), Value::Array(required));
    out.insert("additionalProperties".into(), Value::Bool(additional));
}

impl EnumValue {
    /// Numeric reading of this value.
    ///
    /// Text is converted with [`coerce_number`]; the result is `NaN` when
    /// the text is not numeric.
    pub fn as_number(&self) -> f64 {
        match self {
            Self::Number(n) => *n,
            Self::Text(s) => coerce_number(s),
        }
    }

    /// The value as it appears in a compiled `enum` list, unconverted.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Number(n) => number_value(*n),
            Self::Text(s) => Value::from(s.as_str()),
        }
    }
}

/// Converts text to a number the way a JavaScript `Number(text)` call does.
///
/// Surrounding whitespace is ignored, the empty string is `0`, `0x`/`0o`/`0b`
/// prefixes select a radix, and `Infinity` is accepted. Anything else that
/// is not a decimal literal yields `NaN`.
///
/// # Examples
///
/// ```
/// use schema_builder_core::coerce_number;
///
/// assert_eq!(coerce_number(" 42 "), 42.0);
/// assert_eq!(coerce_number(""), 0.0);
/// assert_eq!(coerce_number("0x1f"), 31.0);
/// assert_eq!(coerce_number("-2.5e1"), -25.0);
/// assert!(coerce_number("abc").is_nan());
/// assert!(coerce_number("inf").is_nan());
/// ```
pub fn coerce_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = trimmed.strip_prefix(prefix) {
            if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
                return f64::NAN;
            }
            return radix_value(digits, radix);
        }
    }

    let is_decimal = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if !is_decimal {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Value of a validated radix literal. Literals wider than 128 bits are
/// accumulated digit by digit and may lose the last bit of precision.
fn radix_value(digits: &str, radix: u32) -> f64 {
    if let Ok(exact) = u128::from_str_radix(digits, radix) {
        return exact as f64;
    }
    digits
        .chars()
        .filter_map(|c| c.to_digit(radix))
        .fold(0.0, |acc, digit| acc * f64::from(radix) + f64::from(digit))
}

/// Renders a number as JSON: integral values without a fraction, non-finite
/// values as `null`.
pub(crate) fn number_value(n: f64) -> Value {
    if !n.is_finite() {
        return Value::Null;
    }
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return Value::from(n as i64);
    }
    Number::from_f64(n).map_or(Value::Null, Value::Number)
}

/// Formats `n` like JavaScript's `Number.prototype.toString()`.
///
/// Plain decimal is used while the decimal exponent lies in `-7 < e < 21`;
/// outside that range the shortest digits are written as `d.ddde+x`.
pub(crate) fn js_number_text(n: f64) -> String {
    if n.is_nan() {
        return "NaN".into();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.into();
    }
    if n == 0.0 {
        return "0".into();
    }

    // Rust's `{:e}` yields the shortest round-tripping digits.
    let scientific = format!("{:e}", n.abs());
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let k = digits.len() as i32;
    let point = exponent + 1;

    let body = if k <= point && point <= 21 {
        format!("{digits}{}", "0".repeat((point - k) as usize))
    } else if 0 < point && point <= 21 {
        let (whole, fraction) = digits.split_at(point as usize);
        format!("{whole}.{fraction}")
    } else if -6 < point && point <= 0 {
        format!("0.{}{digits}", "0".repeat(-point as usize))
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        let (lead, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{lead}e{sign}{}", exponent.abs())
        } else {
            format!("{lead}.{rest}e{sign}{}", exponent.abs())
        }
    };

    if n < 0.0 { format!("-{body}") } else { body }
}

/// Pretty printer that writes floats in JavaScript notation.
struct JsFormatter(PrettyFormatter<'static>);

impl Default for JsFormatter {
    fn default() -> Self {
        Self(PrettyFormatter::with_indent(b"  "))
    }
}

impl Formatter for JsFormatter {
    fn write_f64<W: ?Sized + io::Write>(&mut self, writer: &mut W, value: f64) -> io::Result<()> {
        writer.write_all(js_number_text(value).as_bytes())
    }

    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.0.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.0.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object_value(writer)
    }
}
