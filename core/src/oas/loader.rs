#![deny(missing_docs)]

//! # Bundle Loader
//!
//! Loads a root API description plus every sibling document it references,
//! merges their schema definitions into one registry and flattens the path
//! tree into a [`Bundle`].
//!
//! Loading is the only suspension point of a generation run. Dropping the
//! `load` future abandons the run; a partially merged bundle is never exposed.

use crate::error::{AppError, AppResult};
use crate::oas::bundle::{Bundle, HttpMethod, Operation, ParamLocation, Parameter, PathOperations};
use crate::oas::fetch::DocumentFetcher;
use crate::oas::refs::{
    collect_document_refs, document_stem_name, parse_reference, resolve_document,
    schema_name_from_ref, DocumentRef,
};
use crate::oas::registry::SchemaRegistry;
use crate::oas::schema::{parse_definition, parse_schema, PrimitiveKind, SchemaRef};
use crate::oas::shims::{
    parse_document_text, select_media, ShimDocument, ShimOperation, ShimParameter, ShimPathItem,
    ShimRequestBody, ShimResponse,
};
use indexmap::IndexMap;
use percent_encoding::percent_decode_str;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::{HashSet, VecDeque};
use tracing::{debug, info, warn};
use url::Url;

/// Bounds `$ref` chains between response, body and parameter components.
const MAX_REF_DEPTH: usize = 16;

/// Registry sections a document may declare schemas in.
const SCHEMA_SECTIONS: [&str; 3] = ["/components/schemas", "/definitions", "/schemas"];

/// Loads a [`Bundle`] through a [`DocumentFetcher`].
#[derive(Debug, Clone)]
pub struct BundleLoader<F> {
    fetcher: F,
    root: Url,
}

impl<F: DocumentFetcher> BundleLoader<F> {
    /// Creates a loader for a file path or URL.
    pub fn new(fetcher: F, location: &str) -> AppResult<Self> {
        Ok(Self::from_url(fetcher, location_to_url(location)?))
    }

    /// Creates a loader for an already parsed URL.
    pub fn from_url(fetcher: F, mut root: Url) -> Self {
        root.set_fragment(None);
        Self { fetcher, root }
    }

    /// URI of the root document.
    pub fn root(&self) -> &Url {
        &self.root
    }

    /// Fetches, validates and flattens the whole document set.
    pub async fn load(&self) -> AppResult<Bundle> {
        let root_uri = self.root.as_str();
        debug!(document = %root_uri, "Loading root API description");
        let root_raw = self.fetch_document(&self.root).await?;

        let shim = ShimDocument::deserialize(&root_raw)
            .map_err(|e| AppError::load(root_uri, format!("invalid document structure: {}", e)))?;
        check_version(&shim, root_uri)?;
        let Some(raw_paths) = shim.paths else {
            return Err(AppError::load(root_uri, "missing top-level 'paths' object"));
        };

        let documents = self.fetch_siblings(root_raw).await?;

        let mut registry = SchemaRegistry::new();
        for (index, (uri, raw)) in documents.docs.iter().enumerate() {
            if index == 0 {
                register_sections(&mut registry, raw, uri)?;
            } else {
                let as_schema = documents.schema_docs.contains(uri);
                register_sibling(&mut registry, raw, uri, as_schema)?;
            }
        }

        let paths = build_paths(raw_paths, &documents, &self.root)?;
        let title = shim.info.and_then(|info| info.title);
        let uris = documents.docs.keys().map(Url::to_string).collect();
        let bundle = Bundle::new(title, paths, registry, uris);

        info!(
            documents = bundle.documents().len(),
            paths = bundle.path_templates().count(),
            operations = bundle.operation_count(),
            definitions = bundle.registry().len(),
            "Loaded API bundle"
        );
        Ok(bundle)
    }

    /// Fetches every document reachable from the root, breadth-first, each
    /// one once.
    async fn fetch_siblings(&self, root_raw: JsonValue) -> AppResult<DocumentSet> {
        let mut queue: VecDeque<DocumentRef> =
            collect_document_refs(&root_raw, &self.root, false).into();
        let mut set = DocumentSet::default();
        set.docs.insert(self.root.clone(), root_raw);

        while let Some(next) = queue.pop_front() {
            if next.as_schema {
                set.schema_docs.insert(next.document.clone());
            }
            if set.docs.contains_key(&next.document) {
                continue;
            }
            debug!(document = %next.document, "Loading referenced document");
            let raw = self.fetch_document(&next.document).await?;
            queue.extend(collect_document_refs(&raw, &next.document, next.as_schema));
            set.docs.insert(next.document, raw);
        }
        Ok(set)
    }

    async fn fetch_document(&self, uri: &Url) -> AppResult<JsonValue> {
        let text = self.fetcher.fetch(uri).await?;
        parse_document_text(uri.as_str(), &text)
    }
}

/// Turns a CLI-style location (path or URL) into an absolute URL.
pub fn location_to_url(location: &str) -> AppResult<Url> {
    if let Ok(url) = Url::parse(location) {
        // Single letters are Windows drive prefixes, not schemes.
        if url.scheme().len() > 1 {
            return Ok(url);
        }
    }
    let path = std::path::absolute(location).map_err(|e| AppError::load(location, e.to_string()))?;
    Url::from_file_path(&path)
        .map_err(|_| AppError::load(location, "cannot convert path to a file URI"))
}

fn check_version(shim: &ShimDocument, uri: &str) -> AppResult<()> {
    match (shim.openapi_version(), shim.swagger_version()) {
        (Some(v), _) if v.starts_with("3.") => Ok(()),
        (None, Some(v)) if v.starts_with("2.") => Ok(()),
        (Some(v), _) | (None, Some(v)) => Err(AppError::load(
            uri,
            format!("unsupported API description version '{}'", v),
        )),
        (None, None) => Err(AppError::load(
            uri,
            "missing 'openapi' or 'swagger' version field",
        )),
    }
}

/// Every fetched document, root first.
#[derive(Debug, Default)]
struct DocumentSet {
    docs: IndexMap<Url, JsonValue>,
    /// Documents referenced as a whole from a schema position.
    schema_docs: HashSet<Url>,
}

enum Lookup<'a> {
    Found(&'a JsonValue, Url),
    Dangling(String),
}

impl DocumentSet {
    /// Follows `$ref`s, within one document or into any fetched sibling,
    /// until a node without one is reached. The node comes back with the URI
    /// of the document it lives in.
    fn follow<'a>(&'a self, mut value: &'a JsonValue, base: &Url) -> Lookup<'a> {
        let mut base = base.clone();
        for _ in 0..MAX_REF_DEPTH {
            let Some(reference) = value.get("$ref").and_then(JsonValue::as_str) else {
                return Lookup::Found(value, base);
            };
            let parsed = parse_reference(reference);
            let target = if parsed.is_local() {
                Some(base.clone())
            } else {
                resolve_document(parsed.document, &base)
            };
            let fragment = match parsed.fragment {
                None | Some("/") => "",
                Some(fragment) => fragment,
            };
            let pointer = percent_decode_str(fragment).decode_utf8_lossy();
            let found = target.and_then(|uri| {
                let node = self.docs.get(&uri)?.pointer(&pointer)?;
                Some((node, uri))
            });
            match found {
                Some((node, uri)) => {
                    value = node;
                    base = uri;
                }
                None => return Lookup::Dangling(reference.to_string()),
            }
        }
        Lookup::Dangling(
            value
                .get("$ref")
                .and_then(JsonValue::as_str)
                .unwrap_or_default()
                .to_string(),
        )
    }
}

/// `Team: {$ref: 'common.yaml#/components/schemas/Team'}` only points at
/// another document's `Team`; it is not a definition of its own.
fn is_reexport(name: &str, value: &JsonValue, uri: &Url) -> bool {
    let Some(reference) = value.get("$ref").and_then(JsonValue::as_str) else {
        return false;
    };
    !parse_reference(reference).is_local()
        && schema_name_from_ref(reference, uri).as_deref() == Some(name)
}

/// Registers every schema section present in `raw`. Returns how many
/// sections were found.
fn register_sections(registry: &mut SchemaRegistry, raw: &JsonValue, uri: &Url) -> AppResult<usize> {
    let mut found = 0;
    for section in SCHEMA_SECTIONS {
        let Some(schemas) = raw.pointer(section).and_then(JsonValue::as_object) else {
            continue;
        };
        found += 1;
        for (name, value) in schemas {
            if is_reexport(name, value, uri) {
                debug!(name = %name, document = %uri, "Skipping re-exported schema");
                continue;
            }
            registry.insert(name.clone(), parse_definition(value, uri), uri.as_str())?;
        }
    }
    Ok(found)
}

/// A sibling either declares schema sections, is one schema itself (when
/// referenced as a whole from a schema position), or only holds other
/// components such as responses and parameters.
fn register_sibling(
    registry: &mut SchemaRegistry,
    raw: &JsonValue,
    uri: &Url,
    as_schema: bool,
) -> AppResult<()> {
    if register_sections(registry, raw, uri)? > 0 || !as_schema {
        return Ok(());
    }
    let is_api_document = ["openapi", "swagger", "paths", "components"]
        .iter()
        .any(|key| raw.get(key).is_some());
    if is_api_document {
        return Ok(());
    }
    let name = document_stem_name(uri)
        .ok_or_else(|| AppError::load(uri.as_str(), "cannot derive a schema name from the URI"))?;
    registry.insert(name, parse_definition(raw, uri), uri.as_str())
}

fn build_paths(
    raw_paths: IndexMap<String, JsonValue>,
    docs: &DocumentSet,
    base: &Url,
) -> AppResult<IndexMap<String, PathOperations>> {
    let mut paths = IndexMap::with_capacity(raw_paths.len());
    for (path, value) in raw_paths {
        if path.starts_with("x-") {
            continue;
        }
        let item = ShimPathItem::deserialize(&value).map_err(|e| {
            AppError::load(base.as_str(), format!("invalid path item '{}': {}", path, e))
        })?;

        let common = collect_parameters(&item.parameters, docs, base);
        let mut ops = PathOperations::new();
        let declared = [
            (HttpMethod::Get, item.get),
            (HttpMethod::Put, item.put),
            (HttpMethod::Post, item.post),
            (HttpMethod::Delete, item.delete),
            (HttpMethod::Options, item.options),
            (HttpMethod::Head, item.head),
            (HttpMethod::Patch, item.patch),
            (HttpMethod::Trace, item.trace),
        ];
        for (method, op) in declared {
            if let Some(op) = op {
                ops.insert(method, build_operation(op, &common, docs, base));
            }
        }
        paths.insert(path, ops);
    }
    Ok(paths)
}

/// Parameters before the body/non-body split.
struct CollectedParameters {
    params: Vec<Parameter>,
    body: Option<SchemaRef>,
}

fn build_operation(
    op: ShimOperation,
    common: &CollectedParameters,
    docs: &DocumentSet,
    base: &Url,
) -> Operation {
    let own = collect_parameters(&op.parameters, docs, base);

    let mut parameters = own.params;
    for shared in &common.params {
        let overridden = parameters
            .iter()
            .any(|p| p.name == shared.name && p.location == shared.location);
        if !overridden {
            parameters.push(shared.clone());
        }
    }

    let request_body = match &op.request_body {
        Some(body) => request_body_schema(body, docs, base),
        None => own.body.or_else(|| common.body.clone()),
    };

    let responses = op
        .responses
        .iter()
        .filter(|(status, _)| !status.starts_with("x-"))
        .map(|(status, value)| (status.clone(), response_schema(value, docs, base)))
        .collect();

    Operation {
        operation_id: op.operation_id,
        summary: op.summary,
        tags: op.tags,
        deprecated: op.deprecated,
        parameters,
        request_body,
        responses,
    }
}

fn collect_parameters(raw: &[JsonValue], docs: &DocumentSet, base: &Url) -> CollectedParameters {
    let mut collected = CollectedParameters {
        params: Vec::new(),
        body: None,
    };
    for value in raw {
        let (value, origin) = match docs.follow(value, base) {
            Lookup::Found(v, origin) => (v, origin),
            Lookup::Dangling(reference) => {
                warn!(reference = %reference, "Skipping unresolvable parameter reference");
                continue;
            }
        };
        let param = match ShimParameter::deserialize(value) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "Skipping malformed parameter");
                continue;
            }
        };
        if param.location == "body" {
            collected.body = Some(
                param
                    .schema
                    .as_ref()
                    .map(|s| parse_schema(s, &origin))
                    .unwrap_or(SchemaRef::Primitive(PrimitiveKind::Any)),
            );
            continue;
        }
        let Some(location) = ParamLocation::parse(&param.location) else {
            debug!(name = %param.name, location = %param.location, "Ignoring parameter location");
            continue;
        };
        // Swagger 2 puts `type`/`format` on the parameter itself.
        let schema = param.schema.as_ref().unwrap_or(value);
        collected.params.push(Parameter {
            name: param.name,
            location,
            required: param.required || location == ParamLocation::Path,
            schema: parse_schema(schema, &origin),
        });
    }
    collected
}

fn request_body_schema(value: &JsonValue, docs: &DocumentSet, base: &Url) -> Option<SchemaRef> {
    let (value, origin) = match docs.follow(value, base) {
        Lookup::Found(v, origin) => (v, origin),
        Lookup::Dangling(reference) => return Some(SchemaRef::Unresolved(reference)),
    };
    let body = match ShimRequestBody::deserialize(value) {
        Ok(body) => body,
        Err(e) => {
            warn!(error = %e, "Ignoring malformed request body");
            return None;
        }
    };
    let media = select_media(&body.content)?;
    Some(
        media
            .schema
            .as_ref()
            .map(|s| parse_schema(s, &origin))
            .unwrap_or(SchemaRef::Primitive(PrimitiveKind::Any)),
    )
}

fn response_schema(value: &JsonValue, docs: &DocumentSet, base: &Url) -> Option<SchemaRef> {
    let (value, origin) = match docs.follow(value, base) {
        Lookup::Found(v, origin) => (v, origin),
        Lookup::Dangling(reference) => return Some(SchemaRef::Unresolved(reference)),
    };
    let response = match ShimResponse::deserialize(value) {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "Ignoring malformed response");
            return None;
        }
    };
    if let Some(media) = select_media(&response.content) {
        return Some(
            media
                .schema
                .as_ref()
                .map(|s| parse_schema(s, &origin))
                .unwrap_or(SchemaRef::Primitive(PrimitiveKind::Any)),
        );
    }
    response.schema.as_ref().map(|s| parse_schema(s, &origin))
}
