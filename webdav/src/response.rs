// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Streaming parser for `WebDAV` multistatus responses.

use std::io;

use jiff::Timestamp;
use quick_xml::NsReader;
use quick_xml::events::Event;
use reqwest::StatusCode;
use tokio::io::AsyncBufRead;

use crate::error::WebDavError;
use crate::types::{ETag, Href, parse_http_date};
use crate::xml::{is_dav, push_text};

/// One `response` element of a multistatus body.
///
/// The parser reuses a single value for every entry and clears it before
/// decoding the next one.
#[derive(Debug, Clone, Default)]
pub struct ResponseItem {
    /// The href of the resource.
    pub href: Href,
    /// Response-level status line, sent instead of propstats by some
    /// operations.
    pub status: Option<String>,
    /// Property groups, one per status.
    pub prop_stats: Vec<PropStat>,
}

/// Property set sharing a status.
#[derive(Debug, Clone, Default)]
pub struct PropStat {
    /// Status line, e.g. `HTTP/1.1 200 OK`.
    pub status: String,
    /// Decoded properties.
    pub props: Properties,
}

/// The live properties requested by this client.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    /// `displayname`.
    pub display_name: Option<String>,
    /// Whether `resourcetype` contains `collection`.
    pub is_collection: bool,
    /// Raw `getcontentlength`.
    pub content_length: Option<String>,
    /// `getcontenttype`.
    pub content_type: Option<String>,
    /// `getetag`.
    pub get_etag: Option<ETag>,
    /// Raw `getlastmodified`.
    pub last_modified: Option<String>,
}

impl ResponseItem {
    fn clear(&mut self) {
        self.href = Href::default();
        self.status = None;
        self.prop_stats.clear();
    }

    /// Returns the response-level status, if one was sent and is valid.
    #[must_use]
    pub fn status_code(&self) -> Option<StatusCode> {
        self.status.as_deref().and_then(parse_status_line)
    }

    /// Returns the first property set reported with `200 OK`.
    #[must_use]
    pub fn ok_props(&self) -> Option<&Properties> {
        self.prop_stats
            .iter()
            .find(|p| p.status_code() == Some(StatusCode::OK))
            .map(|p| &p.props)
    }
}

impl PropStat {
    /// Returns the status of this property set, if valid.
    #[must_use]
    pub fn status_code(&self) -> Option<StatusCode> {
        parse_status_line(&self.status)
    }
}

impl Properties {
    /// Content length in bytes; missing or malformed values are `0`.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.content_length
            .as_deref()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Last modification time; missing or malformed values are the epoch.
    #[must_use]
    pub fn modified(&self) -> Timestamp {
        self.last_modified
            .as_deref()
            .map_or(Timestamp::UNIX_EPOCH, parse_http_date)
    }
}

/// Extracts the code from a status line such as `HTTP/1.1 404 Not Found`.
#[must_use]
pub fn parse_status_line(line: &str) -> Option<StatusCode> {
    let code = line.split_whitespace().nth(1)?.parse::<u16>().ok()?;
    StatusCode::from_u16(code).ok()
}

/// Walks a multistatus body and calls `handler` for every `DAV:response`.
///
/// `item` is cleared and refilled for each entry; the handler may modify it
/// freely. Entries that cannot be decoded are skipped. A malformed document
/// ends the walk successfully with the entries seen so far.
///
/// # Errors
///
/// Returns I/O errors raised while reading the body and any error returned by
/// `handler`, which also stops the walk.
pub async fn parse_multistatus<R, F>(
    reader: R,
    item: &mut ResponseItem,
    mut handler: F,
) -> Result<(), WebDavError>
where
    R: AsyncBufRead + Unpin,
    F: FnMut(&mut ResponseItem) -> Result<(), WebDavError>,
{
    let mut reader = NsReader::from_reader(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let starts_response = match reader.read_resolved_event_into_async(&mut buf).await {
            Ok((ns, Event::Start(e))) => is_dav(&ns) && e.local_name().as_ref() == b"response",
            Ok((_, Event::Eof)) => return Ok(()),
            Ok(_) => false,
            Err(e) => return stop(reader_error(e)),
        };
        if !starts_response {
            continue;
        }

        item.clear();
        match decode_response(&mut reader, &mut buf, item).await {
            Ok(None) => handler(item)?,
            Ok(Some(e)) => {
                tracing::warn!(href = %item.href, error = %e, "skipping undecodable multistatus entry");
            }
            Err(e) => return stop(e),
        }
    }
}

/// Ends a walk on a reader error: I/O errors propagate, syntax errors only
/// cut the document short.
fn stop(err: WebDavError) -> Result<(), WebDavError> {
    match err {
        WebDavError::Xml(reason) => {
            tracing::warn!(%reason, "malformed multistatus body, ignoring the rest");
            Ok(())
        }
        err => Err(err),
    }
}

fn reader_error(err: quick_xml::Error) -> WebDavError {
    match err {
        quick_xml::Error::Io(e) => WebDavError::Io(io::Error::new(e.kind(), e.to_string())),
        e => WebDavError::Xml(e.to_string()),
    }
}

/// Decodes one `response` subtree after its start tag.
///
/// Returns `Ok(Some(_))` when the subtree was read completely but a field
/// could not be decoded.
async fn decode_response<R>(
    reader: &mut NsReader<R>,
    buf: &mut Vec<u8>,
    item: &mut ResponseItem,
) -> Result<Option<WebDavError>, WebDavError>
where
    R: AsyncBufRead + Unpin,
{
    let mut stack: Vec<Node> = Vec::new();
    let mut text = String::new();
    let mut field_error = None;

    loop {
        buf.clear();
        let (ns, event) = reader
            .read_resolved_event_into_async(buf)
            .await
            .map_err(reader_error)?;

        match event {
            Event::Start(e) => {
                let node = Node::classify(stack.last().copied(), is_dav(&ns), e.local_name().as_ref());
                node.open(item);
                stack.push(node);
                text.clear();
            }
            Event::Empty(e) => {
                let node = Node::classify(stack.last().copied(), is_dav(&ns), e.local_name().as_ref());
                node.open(item);
                node.close(item, "");
            }
            Event::End(_) => match stack.pop() {
                Some(node) => {
                    node.close(item, text.trim());
                    text.clear();
                }
                None => break,
            },
            Event::Eof => {
                return Err(WebDavError::Xml(
                    "unexpected end of document inside response".to_string(),
                ));
            }
            event => {
                if stack.last().copied().is_some_and(Node::has_text)
                    && let Err(e) = push_text(&event, &mut text)
                {
                    field_error.get_or_insert(e);
                }
            }
        }
    }

    if field_error.is_none() && item.href.is_empty() {
        field_error = Some(WebDavError::Xml("response without href".to_string()));
    }
    Ok(field_error)
}

/// Position inside a `response` subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node {
    Href,
    Status,
    PropStat,
    PropStatStatus,
    Prop,
    DisplayName,
    ResourceType,
    Collection,
    ContentLength,
    ContentType,
    ETag,
    LastModified,
    Other,
}

impl Node {
    fn classify(parent: Option<Self>, dav: bool, name: &[u8]) -> Self {
        if !dav {
            return Self::Other;
        }
        match (parent, name) {
            (None, b"href") => Self::Href,
            (None, b"status") => Self::Status,
            (None, b"propstat") => Self::PropStat,
            (Some(Self::PropStat), b"status") => Self::PropStatStatus,
            (Some(Self::PropStat), b"prop") => Self::Prop,
            (Some(Self::Prop), b"displayname") => Self::DisplayName,
            (Some(Self::Prop), b"resourcetype") => Self::ResourceType,
            (Some(Self::Prop), b"getcontentlength") => Self::ContentLength,
            (Some(Self::Prop), b"getcontenttype") => Self::ContentType,
            (Some(Self::Prop), b"getetag") => Self::ETag,
            (Some(Self::Prop), b"getlastmodified") => Self::LastModified,
            (Some(Self::ResourceType), b"collection") => Self::Collection,
            _ => Self::Other,
        }
    }

    const fn has_text(self) -> bool {
        matches!(
            self,
            Self::Href
                | Self::Status
                | Self::PropStatStatus
                | Self::DisplayName
                | Self::ContentLength
                | Self::ContentType
                | Self::ETag
                | Self::LastModified
        )
    }

    fn open(self, item: &mut ResponseItem) {
        match self {
            Self::PropStat => item.prop_stats.push(PropStat::default()),
            Self::Collection => {
                if let Some(stat) = item.prop_stats.last_mut() {
                    stat.props.is_collection = true;
                }
            }
            _ => {}
        }
    }

    fn close(self, item: &mut ResponseItem, text: &str) {
        match self {
            Self::Href if item.href.is_empty() => item.href = Href::from(text),
            Self::Status => item.status = Some(text.to_string()),
            _ => {
                let Some(stat) = item.prop_stats.last_mut() else {
                    return;
                };
                let props = &mut stat.props;
                match self {
                    Self::PropStatStatus => stat.status = text.to_string(),
                    Self::DisplayName => props.display_name = Some(text.to_string()),
                    Self::ContentLength => props.content_length = Some(text.to_string()),
                    Self::ContentType => props.content_type = Some(text.to_string()),
                    Self::ETag => props.get_etag = Some(ETag::from(text)),
                    Self::LastModified => props.last_modified = Some(text.to_string()),
                    _ => {}
                }
            }
        }
    }
}
