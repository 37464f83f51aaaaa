// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Path helpers for building request URLs.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Characters escaped inside a single path segment.
///
/// Unreserved characters and the sub-delimiters that are legal in a segment
/// are kept; everything else, including `/`, `;`, `,` and `?`, is encoded.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b':')
    .remove(b'=')
    .remove(b'@');

/// Escapes every `/`-separated segment of `path` independently.
#[must_use]
pub fn escape(path: &str) -> String {
    path.split('/')
        .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Decodes percent escapes. Returns `None` if the result is not UTF-8.
pub fn unescape(path: &str) -> Option<String> {
    percent_decode_str(path)
        .decode_utf8()
        .ok()
        .map(std::borrow::Cow::into_owned)
}

/// Strips one trailing `/`.
pub fn without_trailing_slash(s: &str) -> &str {
    s.strip_suffix('/').unwrap_or(s)
}

/// Appends `/` unless present.
pub fn with_trailing_slash(s: &str) -> String {
    if s.ends_with('/') {
        s.to_string()
    } else {
        format!("{s}/")
    }
}

/// Prepends `/` unless present.
pub fn with_leading_slash(s: &str) -> String {
    if s.starts_with('/') {
        s.to_string()
    } else {
        format!("/{s}")
    }
}

/// Makes `s` start and end with `/`.
pub fn with_surrounding_slashes(s: &str) -> String {
    with_trailing_slash(&with_leading_slash(s))
}

/// Lexically cleans a slash-separated path.
///
/// Repeated slashes and `.` segments are dropped and `..` removes the previous
/// segment. `..` cannot climb above the root of a rooted path. An empty
/// result is `.`, or `/` for rooted paths.
pub fn clean(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|p| *p != "..") {
                    parts.pop();
                } else if !rooted {
                    parts.push("..");
                }
            }
            s => parts.push(s),
        }
    }

    let joined = parts.join("/");
    if rooted {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Returns the last element of `path`, ignoring trailing slashes.
pub fn base_name(path: &str) -> &str {
    if path.is_empty() {
        return ".";
    }
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/";
    }
    match trimmed.rfind('/') {
        Some(i) => &trimmed[i + 1..],
        None => trimmed,
    }
}

/// Returns every element of `path` except the last, cleaned.
pub fn parent(path: &str) -> String {
    match path.rfind('/') {
        Some(i) => clean(path.split_at(i + 1).0),
        None => ".".to_string(),
    }
}
