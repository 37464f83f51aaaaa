// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

mod arg;
mod cli;
mod cmd_dir;
mod cmd_file;
mod cmd_toplevel;
mod config;
mod file_formatter;
mod netrc;
mod table;

pub use crate::cli::{Cli, Commands, run};
