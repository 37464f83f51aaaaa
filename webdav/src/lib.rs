// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! `WebDAV` client for listing, reading, writing, copying and moving remote
//! files (RFC 4918).
//!
//! Authentication is negotiated from the server's challenges: a client
//! configured with deferred credentials answers the first `401` with Digest
//! or Basic and replays the request once.

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    clippy::dbg_macro,
    clippy::indexing_slicing,
    clippy::pedantic
)]
// Allow certain clippy lints that are too restrictive for this crate
#![allow(
    clippy::option_option,
    clippy::similar_names,
    clippy::single_match_else,
    clippy::match_bool
)]

mod auth;
mod body;
mod challenge;
mod client;
mod config;
mod digest;
mod error;
mod http;
pub mod path;
mod request;
mod response;
mod types;
mod xml;

pub use crate::auth::{AuthKind, Authenticator, DigestAuth, NegotiationError};
pub use crate::body::RequestBody;
pub use crate::challenge::{Challenge, parse as parse_challenges};
pub use crate::client::WebDavClient;
pub use crate::config::{AuthMethod, WebDavConfig};
pub use crate::digest::{Algorithm, DigestChallenge, DigestError, DigestRequest, Qop};
pub use crate::error::{EntryFailure, WebDavError};
pub use crate::request::{Depth, Prop, PropFindRequest};
pub use crate::response::{
    PropStat, Properties, ResponseItem, parse_multistatus, parse_status_line,
};
pub use crate::types::{ETag, FileInfo, Href, parse_http_date};
