#![deny(missing_docs)]

//! # Naming Utilities
//!
//! Helper functions for deriving handler identifiers from operation IDs and
//! paths, and for qualifying schema names under the entities namespace.

use crate::oas::paths::{is_placeholder, strip_placeholders, strip_prefix};
use crate::oas::HttpMethod;
use heck::{ToSnakeCase, ToUpperCamelCase};

/// Words that cannot be used as plain Rust identifiers.
const RESERVED: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub",
    "ref", "return", "self", "static", "struct", "super", "trait", "true", "type", "unsafe",
    "use", "where", "while", "abstract", "become", "box", "do", "final", "macro", "override",
    "priv", "try", "typeof", "unsized", "virtual", "yield",
];

/// Converts camelCase, PascalCase, kebab or dotted text to lower snake form.
///
/// Anything that is not alphanumeric acts as a word break.
pub fn to_snake_case(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    cleaned.to_snake_case()
}

/// Normalizes an `operationId` into a usable function identifier.
///
/// e.g. `fetchTeamById` -> `fetch_team_by_id`, `2fa-verify` -> `op_2fa_verify`,
/// `type` -> `type_`.
pub fn to_handler_ident(operation_id: &str) -> String {
    let snake = to_snake_case(operation_id);
    if snake.is_empty() {
        return "op".to_string();
    }
    if snake.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("op_{}", snake);
    }
    if RESERVED.contains(&snake.as_str()) {
        return format!("{}_", snake);
    }
    snake
}

/// Derives a handler name from method, resource and path when `operationId`
/// is missing.
///
/// The bundle's common prefix is removed, placeholder segments are dropped,
/// and a leading segment that merely repeats the resource is skipped.
///
/// e.g. `GET /api/v1/team/{teamId}/summary` for resource `team` -> `get_team_summary`
pub fn derive_handler_name(
    method: HttpMethod,
    resource: &str,
    path: &str,
    common_prefix: &[String],
) -> String {
    let resource = to_snake_case(resource);

    let mut literals: Vec<String> = strip_prefix(path, common_prefix)
        .into_iter()
        .filter(|seg| !is_placeholder(seg))
        .map(|seg| to_snake_case(&strip_placeholders(seg)))
        .filter(|seg| !seg.is_empty())
        .collect();

    if literals
        .first()
        .is_some_and(|first| same_resource(first, &resource))
    {
        literals.remove(0);
    }

    let mut parts = vec![method.as_str().to_string()];
    if !resource.is_empty() {
        parts.push(resource);
    }
    parts.extend(literals);
    parts.join("_")
}

/// Singular/plural-insensitive comparison of snake-cased words.
fn same_resource(segment: &str, resource: &str) -> bool {
    if resource.is_empty() {
        return false;
    }
    let plural = |word: &str, other: &str| {
        other
            .strip_prefix(word)
            .is_some_and(|suffix| suffix == "s" || suffix == "es")
    };
    segment == resource || plural(resource, segment) || plural(segment, resource)
}

/// Breaks words at non-alphanumerics and where a capital follows a digit,
/// e.g. `404Error` -> `404 Error`. heck keeps the latter as one word.
fn split_type_words(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut after_digit = false;
    for c in name.chars() {
        if !c.is_alphanumeric() {
            out.push(' ');
            after_digit = false;
            continue;
        }
        if after_digit && c.is_uppercase() {
            out.push(' ');
        }
        out.push(c);
        after_digit = c.is_numeric();
    }
    out
}

/// Keeps a schema name that is already a valid identifier, otherwise
/// converts it to UpperCamelCase.
pub fn to_type_ident(name: &str) -> String {
    let valid = name
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_alphanumeric() || c == '_');
    if valid && !RESERVED.contains(&name) {
        return name.to_string();
    }
    let camel = split_type_words(name).to_upper_camel_case();
    if camel.starts_with(|c: char| c.is_ascii_digit()) || camel.is_empty() {
        format!("Schema{}", camel)
    } else {
        camel
    }
}

/// The logical module path schema types are qualified with:
/// `<root>::<entities>::<Name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeNamespace {
    root: String,
    entities: String,
}

impl TypeNamespace {
    /// Builds a namespace from its two parts.
    pub fn new(root: impl Into<String>, entities: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            entities: entities.into(),
        }
    }

    /// The root module path.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// `<root>::<entities>`.
    pub fn entities_path(&self) -> String {
        format!("{}::{}", self.root, self.entities)
    }

    /// `<root>::<entities>::<Name>`.
    pub fn qualify(&self, schema_name: &str) -> String {
        format!("{}::{}", self.entities_path(), to_type_ident(schema_name))
    }
}
