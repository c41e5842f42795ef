#![deny(missing_docs)]

//! # Document Shims
//!
//! Generic structures acting as an Intermediate Deserialization Layer between
//! raw YAML/JSON and the bundle model. Anything that may be a `$ref` stays a
//! raw `serde_json::Value` here; the loader resolves it before typing it.

use crate::error::{AppError, AppResult};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Number, Value as JsonValue};

/// Root document fields the loader needs.
#[derive(Debug, Deserialize)]
pub struct ShimDocument {
    /// OpenAPI version (e.g. "3.1.0"). Kept raw: unquoted `3.0` is a YAML number.
    pub openapi: Option<JsonValue>,
    /// Swagger version (e.g. "2.0") for legacy support.
    pub swagger: Option<JsonValue>,
    /// Metadata about the API.
    pub info: Option<ShimInfo>,
    /// The Paths Object, kept raw so `x-` keys can be skipped.
    pub paths: Option<IndexMap<String, JsonValue>>,
}

impl ShimDocument {
    /// The `openapi` field as text.
    pub fn openapi_version(&self) -> Option<String> {
        self.openapi.as_ref().map(version_text)
    }

    /// The `swagger` field as text.
    pub fn swagger_version(&self) -> Option<String> {
        self.swagger.as_ref().map(version_text)
    }
}

fn version_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The `info` object.
#[derive(Debug, Deserialize)]
pub struct ShimInfo {
    /// API title.
    pub title: Option<String>,
}

/// A Path Item. Only lower-case method keys bind operations.
#[derive(Debug, Default, Deserialize)]
pub struct ShimPathItem {
    /// Parameters shared by every operation of the path.
    #[serde(default)]
    pub parameters: Vec<JsonValue>,
    /// `get` operation.
    pub get: Option<ShimOperation>,
    /// `put` operation.
    pub put: Option<ShimOperation>,
    /// `post` operation.
    pub post: Option<ShimOperation>,
    /// `delete` operation.
    pub delete: Option<ShimOperation>,
    /// `options` operation.
    pub options: Option<ShimOperation>,
    /// `head` operation.
    pub head: Option<ShimOperation>,
    /// `patch` operation.
    pub patch: Option<ShimOperation>,
    /// `trace` operation.
    pub trace: Option<ShimOperation>,
}

/// An Operation Object.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShimOperation {
    /// Unique operation identifier.
    pub operation_id: Option<String>,
    /// Short summary.
    pub summary: Option<String>,
    /// Grouping tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Deprecation flag.
    #[serde(default)]
    pub deprecated: bool,
    /// Parameters (or `$ref`s to them).
    #[serde(default)]
    pub parameters: Vec<JsonValue>,
    /// Request body (or a `$ref` to one).
    pub request_body: Option<JsonValue>,
    /// Responses keyed by status.
    #[serde(default)]
    pub responses: IndexMap<String, JsonValue>,
}

/// A Parameter Object (OAS 3 or Swagger 2).
#[derive(Debug, Deserialize)]
pub struct ShimParameter {
    /// Parameter name.
    pub name: String,
    /// Location keyword (`path`, `query`, `body`, ...).
    #[serde(rename = "in")]
    pub location: String,
    /// Required flag.
    #[serde(default)]
    pub required: bool,
    /// Value schema (OAS 3, Swagger 2 body parameters).
    pub schema: Option<JsonValue>,
}

/// A Request Body Object.
#[derive(Debug, Default, Deserialize)]
pub struct ShimRequestBody {
    /// Media types.
    #[serde(default)]
    pub content: IndexMap<String, ShimMediaType>,
}

/// A Response Object (OAS 3 `content` or Swagger 2 `schema`).
#[derive(Debug, Default, Deserialize)]
pub struct ShimResponse {
    /// Media types.
    #[serde(default)]
    pub content: IndexMap<String, ShimMediaType>,
    /// Swagger 2 response schema.
    pub schema: Option<JsonValue>,
}

/// A Media Type Object.
#[derive(Debug, Default, Deserialize)]
pub struct ShimMediaType {
    /// Payload schema.
    pub schema: Option<JsonValue>,
}

/// Selects the most appropriate media type for JSON-like payloads.
///
/// Preference order:
/// 1. `application/json`
/// 2. Any `+json` media type (e.g. `application/vnd.api+json`)
/// 3. `application/*`
/// 4. `*/*`
/// 5. First available entry
pub fn select_media(content: &IndexMap<String, ShimMediaType>) -> Option<&ShimMediaType> {
    if let Some(media) = content.get("application/json") {
        return Some(media);
    }
    if let Some((_, media)) = content.iter().find(|(k, _)| k.ends_with("+json")) {
        return Some(media);
    }
    if let Some(media) = content.get("application/*") {
        return Some(media);
    }
    if let Some(media) = content.get("*/*") {
        return Some(media);
    }
    content.values().next()
}

/// Parses YAML or JSON text into a JSON value.
///
/// YAML allows non-string keys (`200:` is an integer); they are stringified so
/// status codes survive either way.
pub fn parse_document_text(uri: &str, text: &str) -> AppResult<JsonValue> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(text)
        .map_err(|e| AppError::load(uri, format!("not valid YAML or JSON: {}", e)))?;
    let json = yaml_to_json(yaml);
    if !json.is_object() {
        return Err(AppError::load(uri, "document root is not an object"));
    }
    Ok(json)
}

fn yaml_to_json(value: serde_yaml::Value) -> JsonValue {
    use serde_yaml::Value as Yaml;
    match value {
        Yaml::Null => JsonValue::Null,
        Yaml::Bool(b) => JsonValue::Bool(b),
        Yaml::Number(n) => yaml_number(&n),
        Yaml::String(s) => JsonValue::String(s),
        Yaml::Sequence(items) => JsonValue::Array(items.into_iter().map(yaml_to_json).collect()),
        Yaml::Mapping(mapping) => {
            let mut map = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                map.insert(yaml_key(key), yaml_to_json(value));
            }
            JsonValue::Object(map)
        }
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn yaml_number(n: &serde_yaml::Number) -> JsonValue {
    if let Some(i) = n.as_i64() {
        JsonValue::Number(i.into())
    } else if let Some(u) = n.as_u64() {
        JsonValue::Number(u.into())
    } else {
        n.as_f64()
            .and_then(Number::from_f64)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null)
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    use serde_yaml::Value as Yaml;
    match key {
        Yaml::String(s) => s,
        Yaml::Number(n) => n.to_string(),
        Yaml::Bool(b) => b.to_string(),
        Yaml::Null => "null".to_string(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}
