#![deny(missing_docs)]

//! # Schema Model
//!
//! Closed, tagged representation of the schemas an operation can point at.
//!
//! Raw JSON/YAML schema objects are turned into [`SchemaRef`] (a use site) or
//! [`Definition`] (a named registry entry) in one pass at load time, so the
//! adapter never probes raw documents.

use crate::oas::refs::schema_name_from_ref;
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::fmt;
use url::Url;

/// Integer width derived from `format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntWidth {
    /// `int32` or no format.
    I32,
    /// `int64`.
    I64,
}

/// Floating point width derived from `format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatWidth {
    /// `float`.
    F32,
    /// `double` or no format.
    F64,
}

/// String flavours that map to distinct Rust types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringFormat {
    /// Any other string.
    Plain,
    /// `format: uuid`.
    Uuid,
    /// `format: date-time`.
    DateTime,
    /// `format: date`.
    Date,
    /// `format: binary`, `format: byte` or a base64 `contentEncoding`.
    Binary,
}

/// A structural (unnamed) type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// `type: integer`.
    Integer(IntWidth),
    /// `type: number`.
    Number(FloatWidth),
    /// `type: boolean`.
    Boolean,
    /// `type: string`.
    String(StringFormat),
    /// Free-form value: untyped schemas, inline objects, unnamed compositions.
    Any,
}

impl PrimitiveKind {
    /// The Rust rendering of this primitive.
    pub fn rust_type(&self) -> &'static str {
        match self {
            Self::Integer(IntWidth::I32) => "i32",
            Self::Integer(IntWidth::I64) => "i64",
            Self::Number(FloatWidth::F32) => "f32",
            Self::Number(FloatWidth::F64) => "f64",
            Self::Boolean => "bool",
            Self::String(StringFormat::Plain) => "String",
            Self::String(StringFormat::Uuid) => "Uuid",
            Self::String(StringFormat::DateTime) => "DateTime",
            Self::String(StringFormat::Date) => "NaiveDate",
            Self::String(StringFormat::Binary) => "Vec<u8>",
            Self::Any => "serde_json::Value",
        }
    }
}

/// A schema use site: what a body, response or parameter points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SchemaRef {
    /// A primitive or anonymous shape.
    Primitive(PrimitiveKind),
    /// A named definition in the registry.
    ObjectRef(String),
    /// An array of another schema.
    ArrayOf(Box<SchemaRef>),
    /// A `$ref` that does not address a schema definition (raw pointer kept).
    Unresolved(String),
}

impl SchemaRef {
    /// Shorthand for `ObjectRef`.
    pub fn named(name: impl Into<String>) -> Self {
        Self::ObjectRef(name.into())
    }
}

impl fmt::Display for SchemaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(kind) => write!(f, "{}", kind.rust_type()),
            Self::ObjectRef(name) => write!(f, "{}", name),
            Self::ArrayOf(inner) => write!(f, "[{}]", inner),
            Self::Unresolved(pointer) => write!(f, "{}", pointer),
        }
    }
}

/// A field of a named object definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field schema.
    pub schema: SchemaRef,
    /// Listed in `required`.
    pub required: bool,
}

/// Composition keyword of a [`Definition::Composite`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeKind {
    /// `allOf`
    AllOf,
    /// `oneOf`
    OneOf,
    /// `anyOf`
    AnyOf,
}

/// A named entry of the schema registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Definition {
    /// An object with named fields (possibly none).
    Object {
        /// Fields in declaration order.
        fields: IndexMap<String, Field>,
    },
    /// An enumeration of literal values.
    Enum {
        /// Values rendered as strings.
        values: Vec<String>,
    },
    /// A composition of other schemas.
    Composite {
        /// Which keyword composed it.
        kind: CompositeKind,
        /// Member schemas.
        parts: Vec<SchemaRef>,
    },
    /// A definition that is only another reference, a primitive or an array.
    Alias(SchemaRef),
}

/// Parses a schema use site.
///
/// `base` is the URI of the document the schema appears in; it is needed to
/// name references to whole sibling documents.
pub fn parse_schema(value: &JsonValue, base: &Url) -> SchemaRef {
    let obj = match value {
        JsonValue::Object(obj) => obj,
        // Boolean schemas (`true`) and anything malformed accept any value.
        _ => return SchemaRef::Primitive(PrimitiveKind::Any),
    };

    if let Some(ref_str) = obj.get("$ref").and_then(JsonValue::as_str) {
        return match schema_name_from_ref(ref_str, base) {
            Some(name) => SchemaRef::ObjectRef(name),
            None => SchemaRef::Unresolved(ref_str.to_string()),
        };
    }

    if let Some(single) = single_ref_composition(obj) {
        return parse_schema(single, base);
    }

    match schema_type(obj) {
        Some("integer") => {
            let width = match format(obj) {
                Some("int64") => IntWidth::I64,
                _ => IntWidth::I32,
            };
            SchemaRef::Primitive(PrimitiveKind::Integer(width))
        }
        Some("number") => {
            let width = match format(obj) {
                Some("float") => FloatWidth::F32,
                _ => FloatWidth::F64,
            };
            SchemaRef::Primitive(PrimitiveKind::Number(width))
        }
        Some("boolean") => SchemaRef::Primitive(PrimitiveKind::Boolean),
        Some("string") => SchemaRef::Primitive(PrimitiveKind::String(string_format(obj))),
        Some("array") => {
            let items = obj
                .get("items")
                .map(|items| parse_schema(items, base))
                .unwrap_or(SchemaRef::Primitive(PrimitiveKind::Any));
            SchemaRef::ArrayOf(Box::new(items))
        }
        _ => SchemaRef::Primitive(PrimitiveKind::Any),
    }
}

/// Parses a named definition from `components.schemas` (or equivalent).
pub fn parse_definition(value: &JsonValue, base: &Url) -> Definition {
    let obj = match value {
        JsonValue::Object(obj) => obj,
        _ => return Definition::Alias(SchemaRef::Primitive(PrimitiveKind::Any)),
    };

    if obj.contains_key("$ref") || single_ref_composition(obj).is_some() {
        return Definition::Alias(parse_schema(value, base));
    }

    if let Some(values) = obj.get("enum").and_then(JsonValue::as_array) {
        let values = values
            .iter()
            .map(|v| match v {
                JsonValue::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();
        return Definition::Enum { values };
    }

    for (keyword, kind) in [
        ("allOf", CompositeKind::AllOf),
        ("oneOf", CompositeKind::OneOf),
        ("anyOf", CompositeKind::AnyOf),
    ] {
        if let Some(members) = obj.get(keyword).and_then(JsonValue::as_array) {
            let parts = members.iter().map(|m| parse_schema(m, base)).collect();
            return Definition::Composite { kind, parts };
        }
    }

    let is_object = schema_type(obj) == Some("object") || obj.contains_key("properties");
    if !is_object {
        return Definition::Alias(parse_schema(value, base));
    }

    let required: Vec<&str> = obj
        .get("required")
        .and_then(JsonValue::as_array)
        .map(|r| r.iter().filter_map(JsonValue::as_str).collect())
        .unwrap_or_default();

    let fields = obj
        .get("properties")
        .and_then(JsonValue::as_object)
        .map(|props| {
            props
                .iter()
                .map(|(name, schema)| {
                    let field = Field {
                        schema: parse_schema(schema, base),
                        required: required.contains(&name.as_str()),
                    };
                    (name.clone(), field)
                })
                .collect()
        })
        .unwrap_or_default();

    Definition::Object { fields }
}

/// `allOf: [{$ref: X}]` with no sibling keywords is just `X`.
fn single_ref_composition(obj: &serde_json::Map<String, JsonValue>) -> Option<&JsonValue> {
    let members = obj.get("allOf")?.as_array()?;
    let has_siblings = obj
        .keys()
        .any(|k| !matches!(k.as_str(), "allOf" | "description" | "nullable" | "title"));
    match members.as_slice() {
        [only] if !has_siblings && only.get("$ref").is_some() => Some(only),
        _ => None,
    }
}

/// `type` may be a string or (OAS 3.1) a list that includes `"null"`.
fn schema_type(obj: &serde_json::Map<String, JsonValue>) -> Option<&str> {
    match obj.get("type")? {
        JsonValue::String(s) => Some(s.as_str()),
        JsonValue::Array(types) => types
            .iter()
            .filter_map(JsonValue::as_str)
            .find(|t| *t != "null"),
        _ => None,
    }
}

fn format(obj: &serde_json::Map<String, JsonValue>) -> Option<&str> {
    obj.get("format").and_then(JsonValue::as_str)
}

fn string_format(obj: &serde_json::Map<String, JsonValue>) -> StringFormat {
    let encoding = obj.get("contentEncoding").and_then(JsonValue::as_str);
    if matches!(encoding, Some("base64" | "base64url")) {
        return StringFormat::Binary;
    }
    match format(obj) {
        Some("uuid") => StringFormat::Uuid,
        Some("date-time") => StringFormat::DateTime,
        Some("date") => StringFormat::Date,
        Some("binary" | "byte") => StringFormat::Binary,
        _ => StringFormat::Plain,
    }
}
