// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Request builders for `WebDAV` operations.

use std::fmt;
use std::io::Cursor;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use reqwest::header::HeaderValue;

use crate::error::WebDavError;
use crate::xml::ns;

/// PROPFIND request builder.
#[derive(Debug)]
pub struct PropFindRequest {
    props: Vec<Prop>,
}

/// Properties to request in PROPFIND.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prop {
    /// Display name.
    DisplayName,
    /// Resource type.
    ResourceType,
    /// Content length.
    GetContentLength,
    /// Content type.
    GetContentType,
    /// `ETag`.
    GetETag,
    /// Last modification date.
    GetLastModified,
}

impl Prop {
    /// Every property read by listing and stat.
    pub const FILE_INFO: [Self; 6] = [
        Self::DisplayName,
        Self::ResourceType,
        Self::GetContentLength,
        Self::GetContentType,
        Self::GetETag,
        Self::GetLastModified,
    ];

    const fn name(self) -> &'static str {
        match self {
            Self::DisplayName => "displayname",
            Self::ResourceType => "resourcetype",
            Self::GetContentLength => "getcontentlength",
            Self::GetContentType => "getcontenttype",
            Self::GetETag => "getetag",
            Self::GetLastModified => "getlastmodified",
        }
    }
}

impl PropFindRequest {
    /// Creates a new PROPFIND request.
    #[must_use]
    pub fn new() -> Self {
        Self { props: Vec::new() }
    }

    /// Creates the request used by listing and stat.
    #[must_use]
    pub fn file_info() -> Self {
        Self {
            props: Prop::FILE_INFO.to_vec(),
        }
    }

    /// Adds a property to the request.
    pub fn add_property(&mut self, prop: Prop) -> &mut Self {
        if !self.props.contains(&prop) {
            self.props.push(prop);
        }
        self
    }

    /// Builds the XML body for the PROPFIND request.
    ///
    /// # Errors
    ///
    /// Returns an error if XML building fails.
    pub fn build(&self) -> Result<String, WebDavError> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        // <d:propfind xmlns:d="DAV:">
        let mut propfind = BytesStart::new("d:propfind");
        propfind.push_attribute(("xmlns:d", ns::DAV));
        writer.write_event(Event::Start(propfind))?;
        writer.write_event(Event::Start(BytesStart::new("d:prop")))?;

        for prop in &self.props {
            writer.write_event(Event::Empty(BytesStart::new(format!("d:{}", prop.name()))))?;
        }

        writer.write_event(Event::End(BytesEnd::new("d:prop")))?;
        writer.write_event(Event::End(BytesEnd::new("d:propfind")))?;

        let bytes = writer.into_inner().into_inner();
        String::from_utf8(bytes).map_err(|e| WebDavError::Xml(format!("UTF-8 error: {e}")))
    }
}

impl Default for PropFindRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// Value of the `Depth` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    /// The resource itself.
    Zero,
    /// The resource and its direct members.
    One,
}

impl Depth {
    /// Returns the header value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Zero => "0",
            Self::One => "1",
        }
    }
}

impl From<Depth> for HeaderValue {
    fn from(depth: Depth) -> Self {
        Self::from_static(depth.as_str())
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
