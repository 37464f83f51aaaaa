// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Parsing of `WWW-Authenticate` challenges (RFC 7235).

/// One authentication challenge: a scheme and its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    /// Authentication scheme as sent by the server, e.g. `Digest`.
    pub scheme: String,
    /// Parameters in header order. Names are lowercased, values unquoted.
    pub params: Vec<(String, String)>,
}

impl Challenge {
    /// Returns `true` if this challenge uses `scheme`, ignoring case.
    #[must_use]
    pub fn is(&self, scheme: &str) -> bool {
        self.scheme.eq_ignore_ascii_case(scheme)
    }

    /// Looks up a parameter by name, ignoring case.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Parses a `WWW-Authenticate` header value, which may hold several challenges.
#[must_use]
pub fn parse(header: &str) -> Vec<Challenge> {
    let mut challenges: Vec<Challenge> = Vec::new();

    for item in split_items(header) {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }

        // A new challenge starts with a scheme token: either a bare token, or a
        // token separated by whitespace from its first parameter.
        let starts_challenge = match item.split_once('=') {
            None => true,
            Some((name, _)) => name.trim_end().contains(char::is_whitespace),
        };

        if starts_challenge {
            let (scheme, rest) = match item.split_once(char::is_whitespace) {
                Some((scheme, rest)) => (scheme, rest.trim()),
                None => (item, ""),
            };
            let mut challenge = Challenge {
                scheme: scheme.to_string(),
                params: Vec::new(),
            };
            if let Some(param) = parse_param(rest) {
                challenge.params.push(param);
            }
            challenges.push(challenge);
        } else if let Some(challenge) = challenges.last_mut()
            && let Some(param) = parse_param(item)
        {
            challenge.params.push(param);
        }
    }

    challenges
}

fn parse_param(s: &str) -> Option<(String, String)> {
    let (key, value) = s.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_ascii_lowercase(), unquote(value.trim())))
}

fn unquote(value: &str) -> String {
    let Some(inner) = value.strip_prefix('"') else {
        return value.to_string();
    };
    let inner = inner.strip_suffix('"').unwrap_or(inner);

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Splits on commas that are not inside a quoted string.
fn split_items(header: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, c) in header.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                items.extend(header.get(start..i));
                start = i + 1;
            }
            _ => {}
        }
    }
    items.extend(header.get(start..));
    items
}
