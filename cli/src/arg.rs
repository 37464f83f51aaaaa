// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use clap::{Arg, ArgMatches, ValueEnum, ValueHint, arg, value_parser};

#[derive(Debug, Clone, Copy)]
pub struct CommonArgs;

impl CommonArgs {
    pub fn verbose() -> Arg {
        arg!(-v --verbose "Log requests and authentication to stderr")
    }

    pub fn get_verbose(matches: &ArgMatches) -> bool {
        matches.get_flag("verbose")
    }

    pub fn path(help: &'static str) -> Arg {
        arg!(path: <PATH>).help(help)
    }

    pub fn get_path(matches: &ArgMatches) -> String {
        Self::get_string(matches, "path")
    }

    /// Old and new path of a copy or move.
    pub fn transfer() -> [Arg; 2] {
        [
            arg!(old: <OLD> "Source path on the server"),
            arg!(new: <NEW> "Destination path on the server"),
        ]
    }

    pub fn get_transfer(matches: &ArgMatches) -> (String, String) {
        (
            Self::get_string(matches, "old"),
            Self::get_string(matches, "new"),
        )
    }

    /// Local file, where `-` or an omitted value means a standard stream.
    pub fn local_file(help: &'static str) -> Arg {
        arg!(file: [FILE])
            .help(help)
            .value_parser(value_parser!(PathBuf))
            .value_hint(ValueHint::FilePath)
    }

    pub fn get_local_file(matches: &ArgMatches) -> Option<PathBuf> {
        matches
            .get_one::<PathBuf>("file")
            .filter(|p| p.to_str() != Some("-"))
            .cloned()
    }

    fn get_string(matches: &ArgMatches, id: &str) -> String {
        matches
            .get_one::<String>(id)
            .cloned()
            .unwrap_or_default()
    }
}

/// Authentication scheme forced from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ArgAuth {
    Basic,
    Digest,
}

/// Server and credential options shared by every command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionArgs {
    pub root: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub netrc: Option<PathBuf>,
    pub auth: Option<ArgAuth>,
    pub timeout: Option<u64>,
}

impl ConnectionArgs {
    pub fn args() -> [Arg; 6] {
        [
            arg!(--root <URL> "Root URL of the WebDAV server")
                .env("DAVKIT_ROOT")
                .required(true)
                .value_hint(ValueHint::Url),
            arg!(-u --user <USER> "Username").env("DAVKIT_USER"),
            arg!(-p --password <PASSWORD> "Password")
                .env("DAVKIT_PASSWORD")
                .hide_env_values(true),
            arg!(--netrc <FILE> "netrc file consulted when no password is given")
                .long_help(
                    "\
netrc file consulted for the root URL's host when no password is given. Defaults to ~/.netrc.",
                )
                .value_parser(value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
            arg!(--auth <SCHEME> "Send credentials with this scheme instead of negotiating")
                .value_parser(value_parser!(ArgAuth)),
            arg!(--timeout <SECS> "Request timeout in seconds").value_parser(value_parser!(u64)),
        ]
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            root: matches
                .get_one::<String>("root")
                .cloned()
                .unwrap_or_default(),
            user: matches.get_one("user").cloned(),
            password: matches.get_one("password").cloned(),
            netrc: matches.get_one("netrc").cloned(),
            auth: matches.get_one("auth").copied(),
            timeout: matches.get_one("timeout").copied(),
        }
    }
}
