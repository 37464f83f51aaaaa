// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! `WebDAV` client implementation.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use reqwest::header::{ACCEPT, ACCEPT_CHARSET, CONTENT_TYPE, HeaderName, HeaderValue};
use reqwest::{Client, Method, Response, StatusCode};
use tokio::io::AsyncBufRead;
use tokio_util::io::StreamReader;

use crate::auth::Authenticator;
use crate::body::RequestBody;
use crate::config::WebDavConfig;
use crate::error::{EntryFailure, WebDavError};
use crate::http::{DavRequest, HttpClient};
use crate::path;
use crate::request::{Depth, PropFindRequest};
use crate::response::{Properties, ResponseItem, parse_multistatus};
use crate::types::{ETag, FileInfo};

const DEPTH: HeaderName = HeaderName::from_static("depth");
const DESTINATION: HeaderName = HeaderName::from_static("destination");
const OVERWRITE: HeaderName = HeaderName::from_static("overwrite");

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// `WebDAV` client for remote file operations.
///
/// Cloning is cheap; clones share the transport and the negotiated
/// authentication.
///
/// # Example
///
/// ```ignore
/// use davkit_webdav::{AuthMethod, WebDavClient, WebDavConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = WebDavConfig::new("https://dav.example.com/remote.php/webdav")
///     .with_auth(AuthMethod::Deferred {
///         username: "user".to_string(),
///         password: "pass".to_string(),
///     });
///
/// let client = WebDavClient::new(config)?;
/// for file in client.read_dir("/photos").await? {
///     println!("{file}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct WebDavClient {
    http: Arc<HttpClient>,
}

impl WebDavClient {
    /// Creates a new `WebDAV` client with a transport built from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if HTTP client initialization fails or a configured
    /// header is invalid.
    pub fn new(config: WebDavConfig) -> Result<Self, WebDavError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .build()?;
        Self::with_http_client(config, client)
    }

    /// Creates a new `WebDAV` client on top of a caller-configured transport.
    ///
    /// `timeout_secs` and `user_agent` of `config` are not applied.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured header is invalid.
    pub fn with_http_client(config: WebDavConfig, client: Client) -> Result<Self, WebDavError> {
        let http = HttpClient::new(client, &config)?;
        Ok(Self {
            http: Arc::new(http),
        })
    }

    /// Name of this file system, `webdav:` followed by the root URL.
    #[must_use]
    pub fn name(&self) -> String {
        format!("webdav:{}", self.http.root())
    }

    /// Root URL, without trailing slash.
    #[must_use]
    pub fn root(&self) -> &str {
        self.http.root()
    }

    /// The authenticator currently used for new requests.
    #[must_use]
    pub fn authenticator(&self) -> Arc<Authenticator> {
        self.http.authenticator()
    }

    /// Checks that the server answers `OPTIONS` on the root.
    ///
    /// # Errors
    ///
    /// Returns an error unless the server responds with `200 OK`.
    pub async fn ping(&self) -> Result<(), WebDavError> {
        let request = DavRequest::new(Method::OPTIONS, "/").header(DEPTH, Depth::Zero.into());
        let status = self.http.send(request).await?.status();
        if status == StatusCode::OK {
            Ok(())
        } else {
            Err(WebDavError::status("ping", self.http.root(), status))
        }
    }

    /// Lists the members of a collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, or with status `405` if `path`
    /// is not a collection.
    pub async fn read_dir(&self, path: &str) -> Result<Vec<FileInfo>, WebDavError> {
        let dir = path::with_surrounding_slashes(path);
        let response = self.propfind("list", &dir, Depth::One).await?;

        let mut files = Vec::new();
        let mut is_self = true;
        let mut item = ResponseItem::default();
        parse_multistatus(body_reader(response), &mut item, |item| {
            if is_self {
                is_self = false;
                return match item.ok_props() {
                    Some(props) if props.is_collection => Ok(()),
                    _ => Err(WebDavError::status(
                        "list",
                        dir.as_str(),
                        StatusCode::METHOD_NOT_ALLOWED,
                    )),
                };
            }

            if let Some(props) = item.ok_props() {
                let name = path::unescape(&item.href)
                    .map(|href| path::base_name(&href).to_string())
                    .unwrap_or_else(|| props.display_name.clone().unwrap_or_default());
                files.push(member_info(&dir, name, props));
            }
            Ok(())
        })
        .await?;

        Ok(files)
    }

    /// Returns the metadata of a single resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, or with status `404` if the
    /// server reports no properties for `path`.
    pub async fn stat(&self, path: &str) -> Result<FileInfo, WebDavError> {
        let path = path::with_leading_slash(path);
        let response = self.propfind("stat", &path, Depth::Zero).await?;

        let mut info = None;
        let mut item = ResponseItem::default();
        parse_multistatus(body_reader(response), &mut item, |item| {
            if info.is_none()
                && let Some(props) = item.ok_props()
            {
                info = Some(self_info(&path, props));
            }
            Ok(())
        })
        .await?;

        info.ok_or_else(|| WebDavError::status("stat", path, StatusCode::NOT_FOUND))
    }

    /// Creates a collection. An existing collection counts as success.
    ///
    /// # Errors
    ///
    /// Returns an error if the server does not create the collection.
    pub async fn mkdir(&self, path: &str) -> Result<(), WebDavError> {
        let path = path::with_surrounding_slashes(&path::clean(path));
        match self.mkcol(&path).await? {
            StatusCode::CREATED => Ok(()),
            status => Err(WebDavError::status("mkdir", path, status)),
        }
    }

    /// Creates a collection and every missing parent, like `mkdir -p`.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first prefix that could not be created.
    pub async fn mkdir_all(&self, path: &str) -> Result<(), WebDavError> {
        let path = path::with_surrounding_slashes(&path::clean(path));
        match self.mkcol(&path).await? {
            StatusCode::CREATED => Ok(()),
            StatusCode::CONFLICT => {
                tracing::debug!(path = path.as_str(), "missing parents, creating collections one by one");
                let mut prefix = String::from("/");
                for segment in path.split('/').filter(|s| !s.is_empty()) {
                    prefix.push_str(segment);
                    prefix.push('/');
                    let status = self.mkcol(&prefix).await?;
                    if status != StatusCode::CREATED {
                        return Err(WebDavError::status("mkdir_all", prefix, status));
                    }
                }
                Ok(())
            }
            status => Err(WebDavError::status("mkdir_all", path, status)),
        }
    }

    /// Copies a resource, replacing an existing destination.
    ///
    /// Missing parents of the destination are created.
    ///
    /// # Errors
    ///
    /// Returns an error if the copy fails, or [`WebDavError::PartialFailure`]
    /// if only some members of a collection were copied.
    pub async fn copy(&self, old_path: &str, new_path: &str) -> Result<(), WebDavError> {
        self.copy_move("copy", b"COPY", old_path, new_path, true)
            .await
    }

    /// Copies a resource, failing if the destination exists.
    ///
    /// # Errors
    ///
    /// See [`WebDavClient::copy`]; an existing destination is reported with
    /// status `412`.
    pub async fn copy_without_overwriting(
        &self,
        old_path: &str,
        new_path: &str,
    ) -> Result<(), WebDavError> {
        self.copy_move("copy", b"COPY", old_path, new_path, false)
            .await
    }

    /// Moves a resource, replacing an existing destination.
    ///
    /// # Errors
    ///
    /// See [`WebDavClient::copy`].
    pub async fn rename(&self, old_path: &str, new_path: &str) -> Result<(), WebDavError> {
        self.copy_move("move", b"MOVE", old_path, new_path, true)
            .await
    }

    /// Moves a resource, failing if the destination exists.
    ///
    /// # Errors
    ///
    /// See [`WebDavClient::copy_without_overwriting`].
    pub async fn rename_without_overwriting(
        &self,
        old_path: &str,
        new_path: &str,
    ) -> Result<(), WebDavError> {
        self.copy_move("move", b"MOVE", old_path, new_path, false)
            .await
    }

    /// Opens a resource for reading and returns its body as a stream.
    ///
    /// # Errors
    ///
    /// Returns an error unless the server responds with `200 OK`.
    pub async fn read_stream(
        &self,
        path: &str,
    ) -> Result<BoxStream<'static, Result<Bytes, WebDavError>>, WebDavError> {
        let response = self.get(path).await?;
        Ok(response.bytes_stream().map_err(WebDavError::from).boxed())
    }

    /// Reads a whole resource into memory.
    ///
    /// # Errors
    ///
    /// Returns an error unless the server responds with `200 OK`, or if the
    /// body cannot be read.
    pub async fn read_file(&self, path: &str) -> Result<Bytes, WebDavError> {
        Ok(self.get(path).await?.bytes().await?)
    }

    /// Uploads a body to `path`.
    ///
    /// `content_type` defaults to `application/octet-stream`. Streamed bodies
    /// are sent without being buffered.
    ///
    /// # Errors
    ///
    /// Returns an error if the server responds with a status of 400 or above.
    pub async fn write_stream(
        &self,
        path: &str,
        body: impl Into<RequestBody>,
        content_type: Option<&str>,
    ) -> Result<(), WebDavError> {
        let path = path::with_leading_slash(path);
        let content_type = content_type
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE);
        let content_type = HeaderValue::from_str(content_type)
            .map_err(|e| WebDavError::Config(format!("invalid content type: {e}")))?;

        let request = DavRequest::new(Method::PUT, &path)
            .body(body)
            .header(CONTENT_TYPE, content_type);
        let status = self.http.send(request).await?.status();
        if status.as_u16() >= 400 {
            return Err(WebDavError::status("write", path, status));
        }
        Ok(())
    }

    /// Uploads in-memory data to `path`.
    ///
    /// # Errors
    ///
    /// See [`WebDavClient::write_stream`].
    pub async fn write_file(
        &self,
        path: &str,
        data: impl Into<Bytes>,
        content_type: Option<&str>,
    ) -> Result<(), WebDavError> {
        self.write_stream(path, RequestBody::Bytes(data.into()), content_type)
            .await
    }

    /// Deletes a resource. A missing resource counts as success.
    ///
    /// # Errors
    ///
    /// Returns an error for any status other than `200`, `204` or `404`.
    pub async fn remove(&self, path: &str) -> Result<(), WebDavError> {
        self.remove_all(path).await
    }

    /// Deletes a resource and, for collections, everything below it.
    ///
    /// # Errors
    ///
    /// See [`WebDavClient::remove`].
    pub async fn remove_all(&self, path: &str) -> Result<(), WebDavError> {
        let path = path::with_leading_slash(path);
        let status = self
            .http
            .send(DavRequest::new(Method::DELETE, &path))
            .await?
            .status();
        match status {
            StatusCode::OK | StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => Ok(()),
            status => Err(WebDavError::status("remove", path, status)),
        }
    }

    async fn propfind(
        &self,
        op: &'static str,
        path: &str,
        depth: Depth,
    ) -> Result<Response, WebDavError> {
        let body = PropFindRequest::file_info().build()?;
        let request = DavRequest::new(dav_method(b"PROPFIND")?, path)
            .body(body)
            .header(DEPTH, depth.into())
            .header(
                CONTENT_TYPE,
                HeaderValue::from_static("application/xml;charset=UTF-8"),
            )
            .header(ACCEPT, HeaderValue::from_static("application/xml,text/xml"))
            .header(ACCEPT_CHARSET, HeaderValue::from_static("utf-8"));

        let response = self.http.send(request).await?;
        match response.status() {
            StatusCode::MULTI_STATUS => Ok(response),
            status => Err(WebDavError::status(op, path, status)),
        }
    }

    /// Sends `MKCOL`, reporting "already exists" as created.
    async fn mkcol(&self, path: &str) -> Result<StatusCode, WebDavError> {
        let request = DavRequest::new(dav_method(b"MKCOL")?, path);
        match self.http.send(request).await?.status() {
            StatusCode::METHOD_NOT_ALLOWED => Ok(StatusCode::CREATED),
            status => Ok(status),
        }
    }

    async fn get(&self, path: &str) -> Result<Response, WebDavError> {
        let path = path::with_leading_slash(path);
        let response = self.http.send(DavRequest::new(Method::GET, &path)).await?;
        match response.status() {
            StatusCode::OK => Ok(response),
            status => Err(WebDavError::status("read", path, status)),
        }
    }

    async fn copy_move(
        &self,
        op: &'static str,
        method: &'static [u8],
        old_path: &str,
        new_path: &str,
        overwrite: bool,
    ) -> Result<(), WebDavError> {
        let old_path = path::with_leading_slash(old_path);
        let new_path = path::with_leading_slash(new_path);
        let destination = HeaderValue::from_str(&self.http.url(&new_path))
            .map_err(|e| WebDavError::Config(format!("invalid destination: {e}")))?;
        let overwrite = HeaderValue::from_static(if overwrite { "T" } else { "F" });
        let method = dav_method(method)?;

        let mut retried = false;
        loop {
            let request = DavRequest::new(method.clone(), &old_path)
                .header(DESTINATION, destination.clone())
                .header(OVERWRITE, overwrite.clone());
            let response = self.http.send(request).await?;

            match response.status() {
                StatusCode::CREATED | StatusCode::NO_CONTENT => return Ok(()),
                StatusCode::MULTI_STATUS => {
                    return check_multistatus(op, &old_path, response).await;
                }
                StatusCode::CONFLICT if !retried => {
                    drop(response);
                    retried = true;
                    tracing::debug!(
                        op,
                        from = old_path.as_str(),
                        to = new_path.as_str(),
                        "conflict, creating destination parent"
                    );
                    self.create_parent_collection(&new_path).await?;
                }
                status => return Err(WebDavError::status(op, old_path, status)),
            }
        }
    }

    async fn create_parent_collection(&self, item_path: &str) -> Result<(), WebDavError> {
        // A collection destination keeps its own name out of the parent.
        let item_path = path::with_leading_slash(item_path);
        let parent = path::parent(path::without_trailing_slash(&item_path));
        if parent == "/" || parent == "." {
            return Ok(());
        }
        self.mkdir_all(&parent).await
    }
}

fn dav_method(name: &'static [u8]) -> Result<Method, WebDavError> {
    Method::from_bytes(name).map_err(|e| WebDavError::Config(format!("invalid method: {e}")))
}

/// Adapts a response body for the streaming XML reader.
fn body_reader(response: Response) -> impl AsyncBufRead + Unpin {
    StreamReader::new(Box::pin(response.bytes_stream().map_err(io::Error::other)))
}

/// Collects the failed members of a `207` answer to COPY or MOVE.
async fn check_multistatus(
    op: &'static str,
    path: &str,
    response: Response,
) -> Result<(), WebDavError> {
    let mut failures = Vec::new();
    let mut item = ResponseItem::default();
    parse_multistatus(body_reader(response), &mut item, |item| {
        if let Some(status) = item.status_code()
            && status.as_u16() >= 400
        {
            failures.push(EntryFailure {
                href: item.href.to_string(),
                status: item.status.take().unwrap_or_default(),
            });
        }
        Ok(())
    })
    .await?;

    if failures.is_empty() {
        return Ok(());
    }
    tracing::warn!(op, path, failed = failures.len(), "multistatus reported failed resources");
    Err(WebDavError::PartialFailure {
        op,
        path: path.to_string(),
        failures,
    })
}

fn member_info(dir: &str, name: String, props: &Properties) -> FileInfo {
    let mut info = FileInfo {
        path: format!("{dir}{name}"),
        name,
        content_type: props.content_type.clone().unwrap_or_default(),
        size: 0,
        modified: props.modified(),
        etag: props.get_etag.clone().unwrap_or_default(),
        is_dir: props.is_collection,
    };
    if info.is_dir {
        info.path.push('/');
    } else {
        info.size = props.size();
    }
    info
}

fn self_info(path: &str, props: &Properties) -> FileInfo {
    let name = props
        .display_name
        .clone()
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| path::base_name(path).to_string());
    let content_type = props.content_type.clone().unwrap_or_default();
    let etag = props.get_etag.clone().unwrap_or_else(ETag::default);

    if props.is_collection {
        FileInfo {
            path: path::with_trailing_slash(path),
            name,
            content_type,
            size: 0,
            // Servers rarely report a collection's own modification time.
            modified: jiff::Timestamp::UNIX_EPOCH,
            etag,
            is_dir: true,
        }
    } else {
        FileInfo {
            path: path.to_string(),
            name,
            content_type,
            size: props.size(),
            modified: props.modified(),
            etag,
            is_dir: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_paths() {
        let dir_props = Properties {
            is_collection: true,
            content_length: Some("4096".to_string()),
            ..Default::default()
        };
        let info = member_info("/root/", "sub".to_string(), &dir_props);
        assert_eq!(info.path, "/root/sub/");
        assert!(info.is_dir);
        assert_eq!(info.size, 0);

        let file_props = Properties {
            content_length: Some("42".to_string()),
            content_type: Some("text/plain".to_string()),
            ..Default::default()
        };
        let info = member_info("/root/", "a.txt".to_string(), &file_props);
        assert_eq!(info.path, "/root/a.txt");
        assert_eq!(info.size, 42);
        assert_eq!(info.content_type, "text/plain");
    }

    #[test]
    fn self_info_names() {
        let props = Properties {
            is_collection: true,
            last_modified: Some("Tue, 15 Nov 1994 08:12:31 GMT".to_string()),
            ..Default::default()
        };
        let info = self_info("/photos", &props);
        assert_eq!(info.path, "/photos/");
        assert_eq!(info.name, "photos");
        assert_eq!(info.modified, jiff::Timestamp::UNIX_EPOCH);

        let props = Properties {
            display_name: Some("Report".to_string()),
            ..Default::default()
        };
        let info = self_info("/r.pdf", &props);
        assert_eq!(info.name, "Report");
        assert_eq!(info.path, "/r.pdf");
    }
}
