// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

/// `WebDAV` authentication method.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(tag = "type")]
pub enum AuthMethod {
    /// No authentication.
    #[serde(rename = "none")]
    #[default]
    None,
    /// Basic authentication, sent with every request.
    #[serde(rename = "basic")]
    Basic {
        /// Username for authentication.
        username: String,
        /// Password for authentication.
        password: String,
    },
    /// Digest authentication.
    ///
    /// A digest response needs a server challenge, so the credentials are held
    /// back until the first `401` arrives.
    #[serde(rename = "digest")]
    Digest {
        /// Username for authentication.
        username: String,
        /// Password for authentication.
        password: String,
    },
    /// Credentials whose scheme is negotiated from the first server challenge.
    #[serde(rename = "deferred")]
    Deferred {
        /// Username for authentication.
        username: String,
        /// Password for authentication.
        password: String,
    },
}

/// `WebDAV` server configuration.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct WebDavConfig {
    /// Root URL of the `WebDAV` endpoint. Request paths are appended to it.
    pub base_url: String,
    /// Authentication method.
    #[serde(default)]
    pub auth: AuthMethod,
    /// Headers added to every request.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

const fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("davkit-webdav/", env!("CARGO_PKG_VERSION")).to_string()
}

impl WebDavConfig {
    /// Creates a configuration for the given root URL with default settings.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Sets the authentication method.
    #[must_use]
    pub fn with_auth(mut self, auth: AuthMethod) -> Self {
        self.auth = auth;
        self
    }

    /// Adds a header sent with every request.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

impl Default for WebDavConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            auth: AuthMethod::default(),
            headers: BTreeMap::new(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_with_defaults() {
        let config: WebDavConfig =
            serde_json::from_str(r#"{"base_url": "https://dav.example.org/files/"}"#).unwrap();

        assert_eq!(config.base_url, "https://dav.example.org/files/");
        assert!(matches!(config.auth, AuthMethod::None));
        assert!(config.headers.is_empty());
        assert_eq!(config.timeout_secs, 30);
        assert!(config.user_agent.starts_with("davkit-webdav/"));
    }

    #[test]
    fn deserializes_tagged_auth() {
        let config: WebDavConfig = serde_json::from_str(
            r#"{
                "base_url": "https://dav.example.org/",
                "auth": {"type": "deferred", "username": "alice", "password": "s3cret"},
                "headers": {"X-Request-Source": "sync"},
                "timeout_secs": 5
            }"#,
        )
        .unwrap();

        match config.auth {
            AuthMethod::Deferred { username, password } => {
                assert_eq!(username, "alice");
                assert_eq!(password, "s3cret");
            }
            other => panic!("unexpected auth: {other:?}"),
        }
        assert_eq!(config.headers["X-Request-Source"], "sync");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn builder_sets_fields() {
        let config = WebDavConfig::new("http://localhost/dav")
            .with_auth(AuthMethod::Basic {
                username: "u".to_string(),
                password: "p".to_string(),
            })
            .with_header("X-One", "1");

        assert!(matches!(config.auth, AuthMethod::Basic { .. }));
        assert_eq!(config.headers.get("X-One").map(String::as_str), Some("1"));
    }
}
