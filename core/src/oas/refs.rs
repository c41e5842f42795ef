#![deny(missing_docs)]

//! # Reference Utilities
//!
//! Helpers for splitting `$ref` strings, mapping them onto the merged schema
//! namespace and discovering sibling documents.
//!
//! These never fetch anything; the loader decides what to do with the
//! document URIs collected here.

use heck::ToUpperCamelCase;
use percent_encoding::percent_decode_str;
use serde_json::Value as JsonValue;
use url::Url;

/// A `$ref` split into its document and fragment parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedReference<'a> {
    /// Document part (empty for same-document references).
    pub document: &'a str,
    /// Fragment after `#`, if present.
    pub fragment: Option<&'a str>,
}

impl ParsedReference<'_> {
    /// True when the reference targets the document it appears in.
    pub fn is_local(&self) -> bool {
        self.document.is_empty()
    }
}

/// Splits a reference at the first `#`.
pub fn parse_reference(ref_str: &str) -> ParsedReference<'_> {
    match ref_str.split_once('#') {
        Some((document, fragment)) => ParsedReference {
            document,
            fragment: Some(fragment),
        },
        None => ParsedReference {
            document: ref_str,
            fragment: None,
        },
    }
}

/// Decodes a JSON Pointer segment (handles `~1` and `~0`).
pub fn decode_pointer_segment(segment: &str) -> String {
    let decoded = segment.replace("~1", "/").replace("~0", "~");
    percent_decode_str(&decoded)
        .decode_utf8_lossy()
        .into_owned()
}

/// Resolves the document part of a reference against the referring document.
///
/// The returned URL never carries a fragment.
pub fn resolve_document(document: &str, base: &Url) -> Option<Url> {
    let mut url = match Url::parse(document) {
        Ok(url) => url,
        Err(_) => base.join(document).ok()?,
    };
    url.set_fragment(None);
    Some(url)
}

/// Maps a schema `$ref` onto a name in the merged registry.
///
/// Recognised pointers: `/components/schemas/{name}`, `/definitions/{name}`
/// and `/schemas/{name}`. A reference to a whole sibling document is named
/// after the document's file stem. Returns `None` for anything else.
pub fn schema_name_from_ref(ref_str: &str, base: &Url) -> Option<String> {
    let parsed = parse_reference(ref_str);
    match parsed.fragment {
        Some(frag) if !frag.is_empty() && frag != "/" => schema_name_from_pointer(frag),
        _ if !parsed.document.is_empty() => {
            let doc = resolve_document(parsed.document, base)?;
            document_stem_name(&doc)
        }
        _ => None,
    }
}

fn schema_name_from_pointer(pointer: &str) -> Option<String> {
    let segments: Vec<&str> = pointer.strip_prefix('/')?.split('/').collect();
    let name_seg = match segments.as_slice() {
        ["components", "schemas", name] => name,
        ["definitions", name] => name,
        ["schemas", name] => name,
        _ => return None,
    };
    let name = decode_pointer_segment(name_seg);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Definition name used for a sibling document that is itself one schema.
///
/// e.g. `file:///specs/schemas/team-member.yaml` -> `TeamMember`
pub fn document_stem_name(doc: &Url) -> Option<String> {
    let file = doc.path_segments()?.next_back()?;
    let file = decode_pointer_segment(file);
    let stem = file.split('.').next().unwrap_or_default();
    let name = stem.to_upper_camel_case();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Object keys whose values are schemas (or maps/lists of schemas).
const SCHEMA_KEYS: [&str; 10] = [
    "schema",
    "schemas",
    "definitions",
    "items",
    "properties",
    "additionalProperties",
    "allOf",
    "oneOf",
    "anyOf",
    "not",
];

/// A sibling document found while scanning `$ref`s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    /// Absolute document URI, without fragment.
    pub document: Url,
    /// True when some schema position references the whole document, which
    /// makes the document itself a schema definition.
    pub as_schema: bool,
}

/// True when the reference addresses a whole document rather than a node in it.
pub fn is_whole_document(parsed: &ParsedReference<'_>) -> bool {
    !parsed.is_local() && matches!(parsed.fragment, None | Some("") | Some("/"))
}

/// Collects every sibling document referenced anywhere under `value`.
///
/// `in_schema` says whether `value` itself sits in a schema position. Order
/// follows first appearance; duplicates and `base` itself are skipped.
pub fn collect_document_refs(value: &JsonValue, base: &Url, in_schema: bool) -> Vec<DocumentRef> {
    let mut own = base.clone();
    own.set_fragment(None);
    let mut found: Vec<DocumentRef> = Vec::new();
    walk_refs(value, in_schema, &mut |ref_str, in_schema| {
        let parsed = parse_reference(ref_str);
        if parsed.is_local() {
            return;
        }
        let Some(document) = resolve_document(parsed.document, base) else {
            return;
        };
        if document == own {
            return;
        }
        let as_schema = in_schema && is_whole_document(&parsed);
        match found.iter_mut().find(|r| r.document == document) {
            Some(existing) => existing.as_schema |= as_schema,
            None => found.push(DocumentRef {
                document,
                as_schema,
            }),
        }
    });
    found
}

fn walk_refs(value: &JsonValue, in_schema: bool, visit: &mut impl FnMut(&str, bool)) {
    match value {
        JsonValue::Object(map) => {
            for (key, child) in map {
                match (key.as_str(), child) {
                    ("$ref", JsonValue::String(s)) => visit(s, in_schema),
                    _ => walk_refs(
                        child,
                        in_schema || SCHEMA_KEYS.contains(&key.as_str()),
                        visit,
                    ),
                }
            }
        }
        JsonValue::Array(items) => {
            for item in items {
                walk_refs(item, in_schema, visit);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base() -> Url {
        Url::parse("file:///specs/openapi.yaml").unwrap()
    }

    #[test]
    fn test_parse_reference_parts() {
        let local = parse_reference("#/components/schemas/Team");
        assert!(local.is_local());
        assert_eq!(local.fragment, Some("/components/schemas/Team"));

        let remote = parse_reference("schemas.yaml#/schemas/Team");
        assert_eq!(remote.document, "schemas.yaml");
        assert_eq!(remote.fragment, Some("/schemas/Team"));

        let whole = parse_reference("team.yaml");
        assert_eq!(whole.fragment, None);
    }

    #[test]
    fn test_schema_name_from_ref_variants() {
        let b = base();
        assert_eq!(
            schema_name_from_ref("#/components/schemas/Team", &b).as_deref(),
            Some("Team")
        );
        assert_eq!(
            schema_name_from_ref("#/definitions/Team", &b).as_deref(),
            Some("Team")
        );
        assert_eq!(
            schema_name_from_ref("common.yaml#/components/schemas/Token", &b).as_deref(),
            Some("Token")
        );
        assert_eq!(
            schema_name_from_ref("./schemas/team-member.yaml", &b).as_deref(),
            Some("TeamMember")
        );
        assert_eq!(schema_name_from_ref("#/paths/~1team", &b), None);
        assert_eq!(schema_name_from_ref("#/components/schemas/", &b), None);
    }

    #[test]
    fn test_decode_pointer_segment_percent_encoding() {
        let encoded = "User%20Profile~1details";
        let decoded = decode_pointer_segment(encoded);
        assert_eq!(decoded, "User Profile/details");
    }

    #[test]
    fn test_collect_document_refs_dedupes_and_resolves() {
        let doc = json!({
            "paths": {
                "/team": {
                    "get": {
                        "responses": {
                            "200": {"content": {"application/json": {"schema": {"$ref": "schemas/team.yaml#/Team"}}}}
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "A": {"$ref": "#/components/schemas/B"},
                    "B": {"$ref": "./schemas/team.yaml"},
                    "C": {"items": [{"$ref": "http://example.com/shared.json#/definitions/X"}]},
                    "D": {"$ref": "openapi.yaml#/components/schemas/A"}
                }
            }
        });
        let refs = collect_document_refs(&doc, &base(), false);
        assert_eq!(
            refs,
            vec![
                DocumentRef {
                    document: Url::parse("file:///specs/schemas/team.yaml").unwrap(),
                    as_schema: true,
                },
                DocumentRef {
                    document: Url::parse("http://example.com/shared.json").unwrap(),
                    as_schema: false,
                },
            ]
        );
    }

    #[test]
    fn test_whole_document_refs_outside_schemas_are_not_schemas() {
        let doc = json!({
            "paths": {
                "/team": {
                    "get": {
                        "responses": {
                            "200": {"$ref": "responses/team.yaml"},
                            "404": {"$ref": "responses.yaml#/NotFound"}
                        }
                    }
                }
            }
        });
        let refs = collect_document_refs(&doc, &base(), false);
        assert!(refs.iter().all(|r| !r.as_schema));
        assert_eq!(refs.len(), 2);

        let alias_doc = json!({"$ref": "team.yaml"});
        let refs = collect_document_refs(&alias_doc, &base(), true);
        assert!(refs[0].as_schema);
    }
}
