// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;

use clap::{ArgMatches, Command};
use colored::Colorize;
use davkit_webdav::WebDavClient;

use crate::arg::CommonArgs;
use crate::file_formatter::{FileColumn, FileFormatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdList {
    pub path: String,
}

impl CmdList {
    pub const NAME: &str = "ls";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .alias("list")
            .about("List the members of a collection")
            .arg(
                CommonArgs::path("Collection to list")
                    .required(false)
                    .default_value("/"),
            )
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            path: CommonArgs::get_path(matches),
        }
    }

    pub async fn run(self, client: &WebDavClient) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "listing collection...");
        let files = client.read_dir(&self.path).await?;
        if files.is_empty() {
            println!("{}", "Empty collection".italic());
            return Ok(());
        }

        let formatter = FileFormatter::new(FileColumn::LISTING.to_vec());
        print!("{}", formatter.format(&files));
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdStat {
    pub path: String,
}

impl CmdStat {
    pub const NAME: &str = "stat";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Show the properties of a file or collection")
            .arg(CommonArgs::path("Remote path"))
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            path: CommonArgs::get_path(matches),
        }
    }

    pub async fn run(self, client: &WebDavClient) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "reading properties...");
        let info = client.stat(&self.path).await?;
        println!("{info}");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdMkdir {
    pub path: String,
}

impl CmdMkdir {
    pub const NAME: &str = "mkdir";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Create a collection; the parent must exist")
            .arg(CommonArgs::path("Collection to create"))
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            path: CommonArgs::get_path(matches),
        }
    }

    pub async fn run(self, client: &WebDavClient) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "creating collection...");
        client.mkdir(&self.path).await?;
        println!("{} {}", "Created".green(), self.path);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdMkdirAll {
    pub path: String,
}

impl CmdMkdirAll {
    pub const NAME: &str = "mkdirall";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Create a collection and any missing parents")
            .arg(CommonArgs::path("Collection to create"))
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            path: CommonArgs::get_path(matches),
        }
    }

    pub async fn run(self, client: &WebDavClient) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "creating collection tree...");
        client.mkdir_all(&self.path).await?;
        println!("{} {}", "Created".green(), self.path);
        Ok(())
    }
}
