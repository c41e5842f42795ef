#![deny(missing_docs)]

//! # Path Templates
//!
//! Segment-level helpers for `{param}`-style path templates.

use regex::Regex;
use std::sync::OnceLock;

/// Non-empty segments of a path template, in order.
pub fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// True for a segment that is entirely one `{param}` placeholder.
pub fn is_placeholder(segment: &str) -> bool {
    segment.len() > 2 && segment.starts_with('{') && segment.ends_with('}')
}

/// Removes embedded placeholders, e.g. `report.{format}` -> `report.`.
pub fn strip_placeholders(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut depth = 0usize;
    for c in segment.chars() {
        match c {
            '{' => depth += 1,
            '}' if depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

/// `v1`, `V2`, `v2.1`, `v3_0` ...
pub fn is_version_marker(segment: &str) -> bool {
    static VERSION_RE: OnceLock<Regex> = OnceLock::new();
    let version_re =
        VERSION_RE.get_or_init(|| Regex::new(r"(?i)^v\d+([._-]\d+)*$").expect("Invalid regex"));
    version_re.is_match(segment)
}

/// Segments eligible for prefix stripping: `api` and version markers.
pub fn is_prefix_segment(segment: &str) -> bool {
    segment.eq_ignore_ascii_case("api") || is_version_marker(segment)
}

/// The leading prefix segments shared by every path.
///
/// Only `api` / version segments count, and the prefix stops at the first
/// segment that is not shared or not eligible. No paths means no prefix.
pub fn common_prefix<'a>(paths: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut paths = paths.into_iter();
    let Some(first) = paths.next() else {
        return Vec::new();
    };
    let mut prefix: Vec<&str> = path_segments(first)
        .take_while(|s| is_prefix_segment(s))
        .collect();

    for path in paths {
        let shared = path_segments(path)
            .zip(prefix.iter())
            .take_while(|(seg, pre)| seg == *pre)
            .count();
        prefix.truncate(shared);
        if prefix.is_empty() {
            break;
        }
    }

    prefix.into_iter().map(str::to_string).collect()
}

/// Removes `prefix` from the start of `path`, returning the remaining
/// segments. Paths that do not start with the prefix are returned whole.
pub fn strip_prefix<'a>(path: &'a str, prefix: &[String]) -> Vec<&'a str> {
    let segments: Vec<&str> = path_segments(path).collect();
    let matches = segments.len() >= prefix.len()
        && segments.iter().zip(prefix).all(|(s, p)| *s == p.as_str());
    if matches {
        segments[prefix.len()..].to_vec()
    } else {
        segments
    }
}
