#![deny(missing_docs)]

//! # Client Contract
//!
//! The request shape the dashboard issues against generated bindings:
//! `<base>/v1/<path>` with `children=true` by default, a JSON content type and
//! the caller's token in `Authorization`.

use crate::error::{AppError, AppResult};
use crate::oas::paths::{is_placeholder, path_segments, strip_prefix};
use crate::oas::HttpMethod;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::Serialize;
use url::Url;

/// Path segment characters that must be escaped in substituted values.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Version segment every client URL carries.
pub const CLIENT_VERSION_SEGMENT: &str = "v1";

/// A request as the client would send it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Full URL including the query string.
    pub url: Url,
    /// Request headers in send order.
    pub headers: Vec<(String, String)>,
}

/// The binding path as the client addresses it: the bundle's common prefix
/// removed, always starting with `/`.
pub fn client_path(path: &str, common_prefix: &[String]) -> String {
    format!("/{}", strip_prefix(path, common_prefix).join("/"))
}

/// Substitutes `{name}` placeholder segments with percent-encoded values.
/// Placeholders without a value are left as written.
pub fn fill_placeholders(path: &str, values: &[(&str, &str)]) -> String {
    let segments: Vec<String> = path_segments(path)
        .map(|segment| {
            if !is_placeholder(segment) {
                return segment.to_string();
            }
            let name = &segment[1..segment.len() - 1];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| utf8_percent_encode(value, SEGMENT).to_string())
                .unwrap_or_else(|| segment.to_string())
        })
        .collect();
    format!("/{}", segments.join("/"))
}

/// Collapses runs of `/` outside the scheme separator.
fn collapse_slashes(raw: &str) -> String {
    let (scheme, rest) = match raw.split_once("://") {
        Some((scheme, rest)) => (Some(scheme), rest),
        None => (None, raw),
    };
    let mut collapsed = String::with_capacity(rest.len());
    for c in rest.chars() {
        if c == '/' && collapsed.ends_with('/') {
            continue;
        }
        collapsed.push(c);
    }
    match scheme {
        Some(scheme) => format!("{}://{}", scheme, collapsed),
        None => collapsed,
    }
}

/// `<base>/v1/<client_path>`, plus `children=true` when requested.
pub fn client_url(base: &str, client_path: &str, children: bool) -> AppResult<Url> {
    let raw = collapse_slashes(&format!(
        "{}/{}/{}",
        base, CLIENT_VERSION_SEGMENT, client_path
    ));
    let mut url = Url::parse(&raw)
        .map_err(|e| AppError::Config(format!("Invalid client URL '{}': {}", raw, e)))?;
    if children {
        url.query_pairs_mut().append_pair("children", "true");
    }
    Ok(url)
}

/// Builds the request the dashboard sends for a binding.
///
/// * `base` - API base URL, e.g. `https://harbor.example.com/api`.
/// * `binding_path` - Path as declared in the bundle, placeholders filled or not.
/// * `common_prefix` - The bundle's shared prefix, removed before joining.
/// * `token` - Sent verbatim as the `Authorization` header.
/// * `children` - Appends `children=true`; the dashboard default is `true`.
pub fn client_request(
    base: &str,
    binding_path: &str,
    common_prefix: &[String],
    method: HttpMethod,
    token: &str,
    children: bool,
) -> AppResult<ClientRequest> {
    let url = client_url(base, &client_path(binding_path, common_prefix), children)?;
    Ok(ClientRequest {
        method,
        url,
        headers: vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Authorization".to_string(), token.to_string()),
        ],
    })
}
