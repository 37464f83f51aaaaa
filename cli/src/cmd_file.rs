// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, path::PathBuf};

use clap::{Arg, ArgMatches, Command, arg};
use colored::Colorize;
use davkit_webdav::{RequestBody, WebDavClient};
use futures::TryStreamExt;
use tokio::fs;
use tokio::io::{self, AsyncWriteExt};
use tokio_util::io::StreamReader;

use crate::arg::CommonArgs;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdGet {
    pub path: String,
    /// Local destination, standard output when `None`.
    pub file: Option<PathBuf>,
}

impl CmdGet {
    pub const NAME: &str = "get";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Download a file")
            .arg(CommonArgs::path("Remote file"))
            .arg(CommonArgs::local_file(
                "Local destination; standard output when omitted or `-`",
            ))
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            path: CommonArgs::get_path(matches),
            file: CommonArgs::get_local_file(matches),
        }
    }

    pub async fn run(self, client: &WebDavClient) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "downloading file...");
        let stream = client.read_stream(&self.path).await?;
        let mut reader = StreamReader::new(stream.map_err(io::Error::other));

        match &self.file {
            Some(file) => {
                let mut out = fs::File::create(file)
                    .await
                    .map_err(|e| format!("Failed to create {}: {e}", file.display()))?;
                let size = io::copy(&mut reader, &mut out).await?;
                out.flush().await?;
                println!(
                    "{} {} ({size} bytes)",
                    "Downloaded".green(),
                    file.display()
                );
            }
            None => {
                let mut out = io::stdout();
                io::copy(&mut reader, &mut out).await?;
                out.flush().await?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdPut {
    pub path: String,
    /// Local source, standard input when `None`.
    pub file: Option<PathBuf>,
    pub content_type: Option<String>,
}

impl CmdPut {
    pub const NAME: &str = "put";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Upload a file, streaming its content")
            .arg(CommonArgs::path("Remote destination"))
            .arg(CommonArgs::local_file(
                "Local source; standard input when omitted or `-`",
            ))
            .arg(arg!(-t --"content-type" <TYPE> "Content type sent with the file"))
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            path: CommonArgs::get_path(matches),
            file: CommonArgs::get_local_file(matches),
            content_type: matches.get_one("content-type").cloned(),
        }
    }

    pub async fn run(self, client: &WebDavClient) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "uploading file...");
        let body = match &self.file {
            Some(file) => {
                let source = fs::File::open(file)
                    .await
                    .map_err(|e| format!("Failed to open {}: {e}", file.display()))?;
                RequestBody::from_reader(source)
            }
            None => RequestBody::from_reader(io::stdin()),
        };

        client
            .write_stream(&self.path, body, self.content_type.as_deref())
            .await?;
        println!("{} {}", "Uploaded".green(), self.path);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdMove {
    pub old: String,
    pub new: String,
    pub no_overwrite: bool,
}

impl CmdMove {
    pub const NAME: &str = "mv";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .alias("move")
            .about("Move or rename a file or collection")
            .args(CommonArgs::transfer())
            .arg(arg_no_overwrite())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        let (old, new) = CommonArgs::get_transfer(matches);
        Self {
            old,
            new,
            no_overwrite: matches.get_flag("no-overwrite"),
        }
    }

    pub async fn run(self, client: &WebDavClient) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "moving...");
        if self.no_overwrite {
            client.rename_without_overwriting(&self.old, &self.new).await?;
        } else {
            client.rename(&self.old, &self.new).await?;
        }
        println!("{} {} -> {}", "Moved".green(), self.old, self.new);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdCopy {
    pub old: String,
    pub new: String,
    pub no_overwrite: bool,
}

impl CmdCopy {
    pub const NAME: &str = "cp";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .alias("copy")
            .about("Copy a file or collection")
            .args(CommonArgs::transfer())
            .arg(arg_no_overwrite())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        let (old, new) = CommonArgs::get_transfer(matches);
        Self {
            old,
            new,
            no_overwrite: matches.get_flag("no-overwrite"),
        }
    }

    pub async fn run(self, client: &WebDavClient) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "copying...");
        if self.no_overwrite {
            client.copy_without_overwriting(&self.old, &self.new).await?;
        } else {
            client.copy(&self.old, &self.new).await?;
        }
        println!("{} {} -> {}", "Copied".green(), self.old, self.new);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdRemove {
    pub path: String,
}

impl CmdRemove {
    pub const NAME: &str = "rm";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .alias("remove")
            .about("Delete a file or collection; missing paths are not an error")
            .arg(CommonArgs::path("Remote path"))
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            path: CommonArgs::get_path(matches),
        }
    }

    pub async fn run(self, client: &WebDavClient) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "removing...");
        client.remove_all(&self.path).await?;
        println!("{} {}", "Removed".green(), self.path);
        Ok(())
    }
}

fn arg_no_overwrite() -> Arg {
    arg!(-n --"no-overwrite" "Fail instead of replacing an existing destination")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(cmd: Command, args: &[&str]) -> ArgMatches {
        let name = cmd.get_name().to_string();
        let matches = Command::new("test")
            .subcommand(cmd)
            .try_get_matches_from(args)
            .unwrap();
        matches.subcommand_matches(&name).unwrap().clone()
    }

    #[test]
    fn test_parse_get_to_stdout() {
        let matches = parse(CmdGet::command(), &["test", "get", "/a.txt"]);
        assert_eq!(
            CmdGet::from(&matches),
            CmdGet {
                path: "/a.txt".to_string(),
                file: None,
            }
        );

        let matches = parse(CmdGet::command(), &["test", "get", "/a.txt", "-"]);
        assert_eq!(CmdGet::from(&matches).file, None);
    }

    #[test]
    fn test_parse_get_to_file() {
        let matches = parse(CmdGet::command(), &["test", "get", "/a.txt", "local.txt"]);
        assert_eq!(
            CmdGet::from(&matches).file,
            Some(PathBuf::from("local.txt"))
        );
    }

    #[test]
    fn test_parse_put() {
        let args = ["test", "put", "/b.bin", "b.bin", "-t", "application/octet-stream"];
        let cmd = CmdPut::from(&parse(CmdPut::command(), &args));
        assert_eq!(cmd.path, "/b.bin");
        assert_eq!(cmd.file, Some(PathBuf::from("b.bin")));
        assert_eq!(cmd.content_type.as_deref(), Some("application/octet-stream"));

        let cmd = CmdPut::from(&parse(CmdPut::command(), &["test", "put", "/c"]));
        assert_eq!(cmd.file, None);
        assert_eq!(cmd.content_type, None);
    }

    #[test]
    fn test_parse_move_and_copy() {
        let cmd = CmdMove::from(&parse(CmdMove::command(), &["test", "mv", "/a", "/b"]));
        assert_eq!(
            cmd,
            CmdMove {
                old: "/a".to_string(),
                new: "/b".to_string(),
                no_overwrite: false,
            }
        );

        let args = ["test", "copy", "-n", "/a", "/b"];
        let cmd = CmdCopy::from(&parse(CmdCopy::command(), &args));
        assert!(cmd.no_overwrite);
        assert_eq!((cmd.old.as_str(), cmd.new.as_str()), ("/a", "/b"));
    }

    #[test]
    fn test_parse_move_requires_destination() {
        let cmd = Command::new("test").subcommand(CmdMove::command());
        assert!(cmd.try_get_matches_from(["test", "mv", "/a"]).is_err());
    }
}
