// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Request building tests.

use davkit_webdav::{Depth, Prop, PropFindRequest};
use reqwest::header::HeaderValue;

#[test]
fn request_propfind_file_info_lists_every_property() {
    let xml = PropFindRequest::file_info()
        .build()
        .expect("Failed to build PROPFIND XML");

    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(xml.contains("<d:propfind xmlns:d=\"DAV:\">"));
    assert!(xml.contains("<d:prop>"));
    for name in [
        "displayname",
        "resourcetype",
        "getcontentlength",
        "getcontenttype",
        "getetag",
        "getlastmodified",
    ] {
        assert!(xml.contains(&format!("<d:{name}/>")), "missing {name} in {xml}");
    }
    assert!(xml.ends_with("</d:prop></d:propfind>"));
}

#[test]
fn request_propfind_keeps_insertion_order() {
    let mut request = PropFindRequest::new();
    request
        .add_property(Prop::GetETag)
        .add_property(Prop::DisplayName);

    let xml = request.build().expect("Failed to build PROPFIND XML");

    let etag = xml.find("<d:getetag/>").unwrap();
    let name = xml.find("<d:displayname/>").unwrap();
    assert!(etag < name);
    assert!(!xml.contains("resourcetype"));
}

#[test]
fn request_propfind_ignores_duplicate_properties() {
    let mut request = PropFindRequest::new();
    request
        .add_property(Prop::ResourceType)
        .add_property(Prop::ResourceType);

    let xml = request.build().expect("Failed to build PROPFIND XML");
    assert_eq!(xml.matches("<d:resourcetype/>").count(), 1);
}

#[test]
fn request_propfind_without_properties_is_still_well_formed() {
    let xml = PropFindRequest::default().build().unwrap();
    assert!(xml.contains("<d:propfind xmlns:d=\"DAV:\"><d:prop></d:prop></d:propfind>"));
}

#[test]
fn request_depth_header_values() {
    assert_eq!(HeaderValue::from(Depth::Zero), "0");
    assert_eq!(HeaderValue::from(Depth::One), "1");
    assert_eq!(Depth::One.to_string(), "1");
}
