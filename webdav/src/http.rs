// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Authenticated request pipeline.

use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue, WWW_AUTHENTICATE};
use reqwest::{Client, Method, Response, StatusCode};

use crate::auth::Authenticator;
use crate::body::RequestBody;
use crate::config::WebDavConfig;
use crate::error::WebDavError;
use crate::path;

/// One logical request: sent once, and once more after an auth upgrade.
#[derive(Debug)]
pub struct DavRequest<'a> {
    method: Method,
    path: &'a str,
    body: Option<RequestBody>,
    headers: HeaderMap,
}

impl<'a> DavRequest<'a> {
    pub fn new(method: Method, path: &'a str) -> Self {
        Self {
            method,
            path,
            body: None,
            headers: HeaderMap::new(),
        }
    }

    pub fn body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets a header, replacing defaults and earlier values with that name.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// HTTP client for `WebDAV` operations.
#[derive(Debug)]
pub struct HttpClient {
    client: Client,
    root: String,
    headers: HeaderMap,
    auth: Mutex<Arc<Authenticator>>,
}

impl HttpClient {
    /// Creates a pipeline on top of an existing transport.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured header is not a valid HTTP header.
    pub fn new(client: Client, config: &WebDavConfig) -> Result<Self, WebDavError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| WebDavError::Config(format!("invalid header name {name:?}: {e}")))?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                WebDavError::Config(format!("invalid value for header {name}: {e}"))
            })?;
            headers.append(name, value);
        }

        Ok(Self {
            client,
            root: path::without_trailing_slash(&config.base_url).to_string(),
            headers,
            auth: Mutex::new(Arc::new(Authenticator::from(&config.auth))),
        })
    }

    /// Root URL without trailing slash.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Absolute URL of a path below the root.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.root, path::escape(path))
    }

    /// Snapshot of the current authenticator.
    pub fn authenticator(&self) -> Arc<Authenticator> {
        Arc::clone(&self.auth.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Replaces the current authenticator.
    pub fn set_authenticator(&self, auth: Arc<Authenticator>) {
        *self.auth.lock().unwrap_or_else(PoisonError::into_inner) = auth;
    }

    /// Sends a request, answering one authentication challenge if the current
    /// authenticator may still be upgraded.
    ///
    /// The response is returned whatever its status, except for `401`.
    ///
    /// # Errors
    ///
    /// Returns transport errors unchanged and [`WebDavError::Unauthorized`]
    /// when the server keeps rejecting the request.
    pub async fn send(&self, request: DavRequest<'_>) -> Result<Response, WebDavError> {
        let DavRequest {
            method,
            path,
            body,
            headers,
        } = request;
        let url = self.url(path);

        let auth = self.authenticator();
        let entity = body.as_ref().and_then(RequestBody::as_bytes).cloned();
        // A replay is only possible while the authenticator may be upgraded.
        let (first_body, replay) = match body {
            Some(body) => {
                let (first, replay) = body.tee(auth.can_upgrade());
                (Some(first), replay)
            }
            None => (None, None),
        };
        let response = self
            .execute(&method, &url, first_body, entity.as_ref(), &auth, &headers)
            .await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        if !auth.can_upgrade() {
            return Err(WebDavError::Unauthorized {
                path: path.to_string(),
                reason: format!("{:?} credentials rejected", auth.kind()),
            });
        }

        let upgraded = auth
            .negotiate(
                response
                    .headers()
                    .get_all(WWW_AUTHENTICATE)
                    .iter()
                    .filter_map(|v| v.to_str().ok()),
            )
            .map_err(|e| WebDavError::Unauthorized {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        drop(response);

        tracing::debug!(path, from = ?auth.kind(), to = ?upgraded.kind(), "upgrading authentication");
        let upgraded = Arc::new(upgraded);
        self.set_authenticator(Arc::clone(&upgraded));

        // Second and last attempt.
        let response = self
            .execute(
                &method,
                &url,
                replay.map(|r| r.into_body()),
                entity.as_ref(),
                &upgraded,
                &headers,
            )
            .await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(WebDavError::Unauthorized {
                path: path.to_string(),
                reason: format!("{:?} credentials rejected", upgraded.kind()),
            });
        }
        Ok(response)
    }

    async fn execute(
        &self,
        method: &Method,
        url: &str,
        body: Option<reqwest::Body>,
        entity: Option<&Bytes>,
        auth: &Authenticator,
        overrides: &HeaderMap,
    ) -> Result<Response, WebDavError> {
        let mut request = self.client.request(method.clone(), url).build()?;
        let target = request.url().path().to_string();

        let headers = request.headers_mut();
        for (name, value) in &self.headers {
            headers.append(name, value.clone());
        }
        let entity = entity.map(|b| b.as_ref());
        if let Some(value) = auth.authorization(method.as_str(), &target, entity) {
            let value = HeaderValue::from_str(&value)
                .map_err(|e| WebDavError::Config(format!("invalid authorization header: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }
        for name in overrides.keys() {
            headers.remove(name);
        }
        for (name, value) in overrides {
            headers.append(name, value.clone());
        }

        if let Some(body) = body {
            *request.body_mut() = Some(body);
        }

        tracing::debug!(%method, url, auth = ?auth.kind(), "sending request");
        let response = self.client.execute(request).await?;
        tracing::debug!(%method, url, status = %response.status(), "received response");
        Ok(response)
    }
}
