// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Minimal `.netrc` support: `machine`, `default`, `login` and `password`.
//!
//! `account` values are skipped and `macdef` bodies are ignored up to the next
//! blank line.

use std::{error::Error, str::FromStr};

/// Credentials of one `machine` or `default` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetrcEntry {
    pub login: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Netrc {
    machines: Vec<(String, NetrcEntry)>,
    default: Option<NetrcEntry>,
}

impl Netrc {
    /// Finds the first entry for `host`, falling back to `default`.
    pub fn find(&self, host: &str) -> Option<&NetrcEntry> {
        self.machines
            .iter()
            .find(|(machine, _)| machine.eq_ignore_ascii_case(host))
            .map(|(_, entry)| entry)
            .or(self.default.as_ref())
    }
}

#[derive(Debug, Clone, Copy)]
enum Current {
    Nothing,
    Machine(usize),
    Default,
}

impl FromStr for Netrc {
    type Err = Box<dyn Error>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut netrc = Self::default();
        let mut current = Current::Nothing;

        let mut tokens = tokenize(s).into_iter();
        while let Some(token) = tokens.next() {
            match token {
                "machine" => {
                    let name = next_value(&mut tokens, token)?;
                    netrc.machines.push((name.to_string(), NetrcEntry::default()));
                    current = Current::Machine(netrc.machines.len() - 1);
                }
                "default" => {
                    netrc.default = Some(NetrcEntry::default());
                    current = Current::Default;
                }
                "login" | "password" | "account" => {
                    let value = next_value(&mut tokens, token)?.to_string();
                    let entry = match current {
                        Current::Machine(i) => netrc.machines.get_mut(i).map(|(_, e)| e),
                        Current::Default => netrc.default.as_mut(),
                        Current::Nothing => None,
                    };
                    match (entry, token) {
                        (Some(entry), "login") => entry.login = Some(value),
                        (Some(entry), "password") => entry.password = Some(value),
                        _ => {}
                    }
                }
                other => tracing::debug!(token = other, "ignoring unknown netrc token"),
            }
        }

        Ok(netrc)
    }
}

fn next_value<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    keyword: &str,
) -> Result<&'a str, Box<dyn Error>> {
    tokens
        .next()
        .ok_or_else(|| format!("netrc: missing value after `{keyword}`").into())
}

fn tokenize(s: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut in_macro = false;
    for line in s.lines() {
        if in_macro {
            in_macro = !line.trim().is_empty();
            continue;
        }
        if line.trim_start().starts_with('#') {
            continue;
        }

        let mut words = line.split_whitespace();
        while let Some(word) = words.next() {
            if word == "macdef" {
                words.next(); // macro name
                in_macro = true;
                break;
            }
            tokens.push(word);
        }
    }
    tokens
}
