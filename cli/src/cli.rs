// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, ffi::OsString, io, process::ExitCode};

use clap::{ArgMatches, Command, builder::styling, crate_version};
use colored::Colorize;
use davkit_webdav::WebDavClient;
use futures::{FutureExt, future::BoxFuture};
use tracing_subscriber::EnvFilter;

use crate::arg::{CommonArgs, ConnectionArgs};
use crate::cmd_dir::{CmdList, CmdMkdir, CmdMkdirAll, CmdStat};
use crate::cmd_file::{CmdCopy, CmdGet, CmdMove, CmdPut, CmdRemove};
use crate::cmd_toplevel::CmdPing;
use crate::config::parse_config;

/// Run the davkit command-line interface.
pub async fn run() -> ExitCode {
    let cli = match Cli::parse() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(cli.verbose);
    match cli.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` decides the filter unless `-v` asks for debug output.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Command-line interface
#[derive(Debug)]
pub struct Cli {
    /// Server and credentials
    pub connection: ConnectionArgs,

    /// Whether to log requests
    pub verbose: bool,

    /// The command to execute
    pub command: Commands,
}

impl Cli {
    /// Create the command-line interface
    pub fn command() -> Command {
        const STYLES: styling::Styles = styling::Styles::styled()
            .header(styling::AnsiColor::Green.on_default().bold())
            .usage(styling::AnsiColor::Green.on_default().bold())
            .literal(styling::AnsiColor::Blue.on_default().bold())
            .placeholder(styling::AnsiColor::Cyan.on_default());

        Command::new("davkit")
            .about("Browse and transfer files on a WebDAV server.")
            .author("Zexin Yuan <aim@yzx9.xyz>")
            .version(crate_version!())
            .styles(STYLES)
            .subcommand_required(true)
            .arg_required_else_help(true)
            .args(ConnectionArgs::args())
            .arg(CommonArgs::verbose())
            .subcommand(CmdList::command())
            .subcommand(CmdStat::command())
            .subcommand(CmdMkdir::command())
            .subcommand(CmdMkdirAll::command())
            .subcommand(CmdGet::command())
            .subcommand(CmdPut::command())
            .subcommand(CmdMove::command())
            .subcommand(CmdCopy::command())
            .subcommand(CmdRemove::command())
            .subcommand(CmdPing::command())
    }

    /// Parse the command-line arguments
    pub fn parse() -> Result<Self, Box<dyn Error>> {
        let commands = Self::command();
        let matches = commands.get_matches();
        Self::from(&matches)
    }

    /// Parse the specified arguments
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, Box<dyn Error>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let commands = Self::command();
        let matches = commands.try_get_matches_from(args)?;
        Self::from(&matches)
    }

    /// Create a CLI instance from the `ArgMatches`
    pub fn from(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        use Commands::*;
        let command = match matches.subcommand() {
            Some((CmdList::NAME, matches)) => List(CmdList::from(matches)),
            Some((CmdStat::NAME, matches)) => Stat(CmdStat::from(matches)),
            Some((CmdMkdir::NAME, matches)) => Mkdir(CmdMkdir::from(matches)),
            Some((CmdMkdirAll::NAME, matches)) => MkdirAll(CmdMkdirAll::from(matches)),
            Some((CmdGet::NAME, matches)) => Get(CmdGet::from(matches)),
            Some((CmdPut::NAME, matches)) => Put(CmdPut::from(matches)),
            Some((CmdMove::NAME, matches)) => Move(CmdMove::from(matches)),
            Some((CmdCopy::NAME, matches)) => Copy(CmdCopy::from(matches)),
            Some((CmdRemove::NAME, matches)) => Remove(CmdRemove::from(matches)),
            Some((CmdPing::NAME, matches)) => Ping(CmdPing::from(matches)),
            Some((name, _)) => return Err(format!("Unknown command: {name}").into()),
            None => return Err("No command given".into()),
        };

        Ok(Cli {
            connection: ConnectionArgs::from(matches),
            verbose: CommonArgs::get_verbose(matches),
            command,
        })
    }

    /// Run the command
    pub async fn run(self) -> Result<(), Box<dyn Error>> {
        self.command.run(self.connection).await
    }
}

/// The commands available in the CLI
#[derive(Debug, Clone)]
pub enum Commands {
    /// List a collection
    List(CmdList),

    /// Show file properties
    Stat(CmdStat),

    /// Create a collection
    Mkdir(CmdMkdir),

    /// Create a collection and its parents
    MkdirAll(CmdMkdirAll),

    /// Download a file
    Get(CmdGet),

    /// Upload a file
    Put(CmdPut),

    /// Move a file or collection
    Move(CmdMove),

    /// Copy a file or collection
    Copy(CmdCopy),

    /// Delete a file or collection
    Remove(CmdRemove),

    /// Check the server
    Ping(CmdPing),
}

impl Commands {
    /// Run the command against the server described by `connection`
    #[rustfmt::skip]
    pub async fn run(self, connection: ConnectionArgs) -> Result<(), Box<dyn Error>> {
        use Commands::*;
        match self {
            List(a)     => Self::run_with(connection, |x| a.run(x).boxed()).await,
            Stat(a)     => Self::run_with(connection, |x| a.run(x).boxed()).await,
            Mkdir(a)    => Self::run_with(connection, |x| a.run(x).boxed()).await,
            MkdirAll(a) => Self::run_with(connection, |x| a.run(x).boxed()).await,
            Get(a)      => Self::run_with(connection, |x| a.run(x).boxed()).await,
            Put(a)      => Self::run_with(connection, |x| a.run(x).boxed()).await,
            Move(a)     => Self::run_with(connection, |x| a.run(x).boxed()).await,
            Copy(a)     => Self::run_with(connection, |x| a.run(x).boxed()).await,
            Remove(a)   => Self::run_with(connection, |x| a.run(x).boxed()).await,
            Ping(a)     => Self::run_with(connection, |x| a.run(x).boxed()).await,
        }
    }

    async fn run_with<F>(connection: ConnectionArgs, f: F) -> Result<(), Box<dyn Error>>
    where
        F: for<'a> FnOnce(&'a WebDavClient) -> BoxFuture<'a, Result<(), Box<dyn Error>>>,
    {
        tracing::debug!("building client configuration...");
        let config = parse_config(connection).await?;
        let client = WebDavClient::new(config)?;

        f(&client).await
    }
}
