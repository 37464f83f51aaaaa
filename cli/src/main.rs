// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    davkit_cli::run().await
}
