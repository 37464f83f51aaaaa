// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;

use clap::{ArgMatches, Command};
use colored::Colorize;
use davkit_webdav::WebDavClient;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CmdPing;

impl CmdPing {
    pub const NAME: &str = "ping";

    pub fn command() -> Command {
        Command::new(Self::NAME).about("Check that the server answers at the root URL")
    }

    pub fn from(_matches: &ArgMatches) -> Self {
        Self
    }

    pub async fn run(self, client: &WebDavClient) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "pinging server...");
        client.ping().await?;
        println!("{} {}", "OK".green(), client.name());
        Ok(())
    }
}
