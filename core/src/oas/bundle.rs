#![deny(missing_docs)]

//! # Bundle Model
//!
//! The flattened, immutable result of loading an API description: paths in
//! declaration order, each holding a set of operations keyed by method, plus
//! the merged schema registry.

use crate::error::AppError;
use crate::oas::paths::common_prefix;
use crate::oas::registry::SchemaRegistry;
use crate::oas::schema::SchemaRef;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// HTTP verbs an OpenAPI path item can bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    /// `get`
    Get,
    /// `put`
    Put,
    /// `post`
    Post,
    /// `delete`
    Delete,
    /// `options`
    Options,
    /// `head`
    Head,
    /// `patch`
    Patch,
    /// `trace`
    Trace,
}

impl HttpMethod {
    /// Every method, in the order path items list them.
    pub const ALL: [HttpMethod; 8] = [
        Self::Get,
        Self::Put,
        Self::Post,
        Self::Delete,
        Self::Options,
        Self::Head,
        Self::Patch,
        Self::Trace,
    ];

    /// Lower-case key as used in path items.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Post => "post",
            Self::Delete => "delete",
            Self::Options => "options",
            Self::Head => "head",
            Self::Patch => "patch",
            Self::Trace => "trace",
        }
    }

    /// Case-insensitive parse.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| AppError::General(format!("Unknown HTTP method '{}'", s)))
    }
}

/// Location of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    /// Path template variable.
    Path,
    /// Query string.
    Query,
    /// Request header.
    Header,
    /// Cookie.
    Cookie,
}

impl ParamLocation {
    /// Parses the `in` keyword. `body` and `formData` are not parameters here.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "path" => Some(Self::Path),
            "query" => Some(Self::Query),
            "header" => Some(Self::Header),
            "cookie" => Some(Self::Cookie),
            _ => None,
        }
    }
}

/// A path, query, header or cookie parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Name as declared.
    pub name: String,
    /// Where it travels.
    pub location: ParamLocation,
    /// Path parameters are always required.
    pub required: bool,
    /// Value schema.
    pub schema: SchemaRef,
}

/// One endpoint + method binding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Operation {
    /// `operationId`, if declared.
    pub operation_id: Option<String>,
    /// `summary`, if declared.
    pub summary: Option<String>,
    /// Tags in declaration order.
    pub tags: Vec<String>,
    /// `deprecated: true`.
    pub deprecated: bool,
    /// Path-level and operation-level parameters, merged.
    pub parameters: Vec<Parameter>,
    /// Request body schema; `None` when the operation takes no body.
    pub request_body: Option<SchemaRef>,
    /// Response schemas keyed by status (`200`, `2XX`, `default`, ...).
    /// `None` marks a response without a body.
    pub responses: IndexMap<String, Option<SchemaRef>>,
}

impl Operation {
    /// Picks the success response: the lowest concrete `2NN` status, else a
    /// `2XX` range entry. Returns the status key and its schema, if any.
    pub fn success_response(&self) -> Option<(&str, Option<&SchemaRef>)> {
        let concrete = self
            .responses
            .iter()
            .filter_map(|(status, schema)| {
                let code: u16 = status.parse().ok()?;
                (200..300).contains(&code).then_some((code, status, schema))
            })
            .min_by_key(|(code, _, _)| *code)
            .map(|(_, status, schema)| (status.as_str(), schema.as_ref()));

        concrete.or_else(|| {
            self.responses
                .iter()
                .find(|(status, _)| status.eq_ignore_ascii_case("2XX"))
                .map(|(status, schema)| (status.as_str(), schema.as_ref()))
        })
    }
}

/// Operations of one path, keyed by method.
pub type PathOperations = HashMap<HttpMethod, Operation>;

/// The immutable, fully loaded API description.
#[derive(Debug, Clone, Default)]
pub struct Bundle {
    title: Option<String>,
    paths: IndexMap<String, PathOperations>,
    registry: SchemaRegistry,
    documents: Vec<String>,
    common_prefix: Vec<String>,
}

impl Bundle {
    /// Freezes loaded parts into a bundle.
    pub fn new(
        title: Option<String>,
        paths: IndexMap<String, PathOperations>,
        registry: SchemaRegistry,
        documents: Vec<String>,
    ) -> Self {
        let common_prefix = common_prefix(paths.keys().map(String::as_str));
        Self {
            title,
            paths,
            registry,
            documents,
            common_prefix,
        }
    }

    /// `info.title` of the root document.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Path templates in declaration order.
    pub fn path_templates(&self) -> impl Iterator<Item = &str> {
        self.paths.keys().map(String::as_str)
    }

    /// Operations of one path.
    pub fn path(&self, path: &str) -> Option<&PathOperations> {
        self.paths.get(path)
    }

    /// One operation.
    pub fn operation(&self, path: &str, method: HttpMethod) -> Option<&Operation> {
        self.paths.get(path)?.get(&method)
    }

    /// Every operation: paths in declaration order, methods in
    /// [`HttpMethod::ALL`] order.
    pub fn operations(&self) -> impl Iterator<Item = (&str, HttpMethod, &Operation)> {
        self.paths.iter().flat_map(|(path, ops)| {
            HttpMethod::ALL
                .into_iter()
                .filter_map(move |m| ops.get(&m).map(|op| (path.as_str(), m, op)))
        })
    }

    /// Total number of operations.
    pub fn operation_count(&self) -> usize {
        self.paths.values().map(HashMap::len).sum()
    }

    /// The merged schema registry.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// URIs of every document that contributed, root first.
    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    /// `api` / version segments shared by every path.
    pub fn common_prefix(&self) -> &[String] {
        &self.common_prefix
    }
}
