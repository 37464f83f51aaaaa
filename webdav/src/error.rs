// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use reqwest::StatusCode;

/// `WebDAV` client errors.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum WebDavError {
    /// Transport error, passed through from the HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered an operation with an unexpected status.
    #[error("{op} {path}: {status}")]
    Status {
        /// Operation that failed.
        op: &'static str,
        /// Target path of the operation.
        path: String,
        /// Status code returned by the server.
        status: StatusCode,
    },

    /// Authentication failed or could not be negotiated.
    #[error("Authorization failed for {path}: {reason}")]
    Unauthorized {
        /// Request path that was rejected.
        path: String,
        /// Why the request could not be authorized.
        reason: String,
    },

    /// A COPY or MOVE succeeded only for some of the affected resources.
    #[error("{op} {path}: {} resource(s) failed", .failures.len())]
    PartialFailure {
        /// Operation that failed.
        op: &'static str,
        /// Source path of the operation.
        path: String,
        /// Failed resources reported by the server.
        failures: Vec<EntryFailure>,
    },

    /// XML parsing/writing error.
    #[error("XML error: {0}")]
    Xml(String),

    /// Local I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl WebDavError {
    /// Builds a status error for an operation on a path.
    pub(crate) fn status(op: &'static str, path: impl Into<String>, status: StatusCode) -> Self {
        Self::Status {
            op,
            path: path.into(),
            status,
        }
    }

    /// Returns the HTTP status associated with this error, if any.
    #[must_use]
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            Self::Http(e) => e.status(),
            Self::Status { status, .. } => Some(*status),
            Self::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            Self::PartialFailure { .. } => Some(StatusCode::MULTI_STATUS),
            _ => None,
        }
    }

    /// Returns `true` if the server reported that the resource does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(StatusCode::NOT_FOUND)
    }
}

impl From<quick_xml::Error> for WebDavError {
    fn from(e: quick_xml::Error) -> Self {
        Self::Xml(e.to_string())
    }
}

/// A resource that failed inside a multistatus COPY/MOVE response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFailure {
    /// The href of the failed resource.
    pub href: String,
    /// The status line reported for it.
    pub status: String,
}
