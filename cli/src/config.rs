// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;
use std::path::{Path, PathBuf};

use davkit_webdav::{AuthMethod, WebDavConfig};
use tokio::fs;

use crate::arg::{ArgAuth, ConnectionArgs};
use crate::netrc::Netrc;

/// Builds the client configuration, reading the netrc file when the password
/// is missing.
#[tracing::instrument(skip_all, fields(root = %args.root))]
pub async fn parse_config(args: ConnectionArgs) -> Result<WebDavConfig, Box<dyn Error>> {
    let ConnectionArgs {
        root,
        mut user,
        mut password,
        netrc,
        auth,
        timeout,
    } = args;

    if password.is_none() {
        let host = url::Url::parse(&root)
            .map_err(|e| format!("Invalid root URL {root}: {e}"))?
            .host_str()
            .map(str::to_string);

        if let (Some(host), Some(path)) = (host, netrc.or_else(default_netrc))
            && let Some(netrc) = read_netrc(&path).await?
            && let Some(entry) = netrc.find(&host)
        {
            tracing::debug!(%host, path = %path.display(), "using netrc credentials");
            user = user.or_else(|| entry.login.clone());
            password.clone_from(&entry.password);
        }
    }

    let auth = match user {
        None => AuthMethod::None,
        Some(username) => {
            let password = password.unwrap_or_default();
            match auth {
                Some(ArgAuth::Basic) => AuthMethod::Basic { username, password },
                Some(ArgAuth::Digest) => AuthMethod::Digest { username, password },
                None => AuthMethod::Deferred { username, password },
            }
        }
    };

    let mut config = WebDavConfig::new(root).with_auth(auth);
    if let Some(timeout) = timeout {
        config.timeout_secs = timeout;
    }
    Ok(config)
}

fn default_netrc() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".netrc"))
}

async fn read_netrc(path: &Path) -> Result<Option<Netrc>, Box<dyn Error>> {
    match fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content.parse()?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(format!("Failed to read netrc file at {}: {e}", path.display()).into()),
    }
}
