// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Request authenticators and scheme negotiation.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::challenge;
use crate::config::AuthMethod;
use crate::digest::{DigestChallenge, DigestError, DigestRequest, client_nonce};

/// Errors negotiating an authentication scheme from a `401` response.
#[derive(Debug, thiserror::Error)]
pub enum NegotiationError {
    /// None of the offered challenges uses Basic or Digest.
    #[error("no supported authentication scheme offered: {0:?}")]
    NoSupportedScheme(String),

    /// A digest challenge was offered but cannot be answered.
    #[error(transparent)]
    Digest(#[from] DigestError),
}

/// Discriminates authenticators without their credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthKind {
    /// No credentials.
    Anonymous,
    /// Credentials waiting for a server challenge.
    Deferred,
    /// HTTP Basic.
    Basic,
    /// HTTP Digest.
    Digest,
}

/// Computes the `Authorization` header for outgoing requests.
///
/// Values are never changed once installed in a client; negotiation produces
/// a new authenticator instead.
#[derive(Debug, Clone, Default)]
pub enum Authenticator {
    /// Sends no credentials.
    #[default]
    Anonymous,
    /// Sends no credentials until the server picks a scheme.
    Deferred {
        /// User name.
        username: String,
        /// Password.
        password: String,
    },
    /// HTTP Basic authentication.
    Basic {
        /// User name.
        username: String,
        /// Password.
        password: String,
    },
    /// HTTP Digest authentication, bound to one server challenge.
    Digest(DigestAuth),
}

impl Authenticator {
    /// Credentials that are sent once the server asks for them.
    #[must_use]
    pub fn deferred(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Deferred {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Basic credentials, sent with every request.
    #[must_use]
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the kind of this authenticator.
    #[must_use]
    pub const fn kind(&self) -> AuthKind {
        match self {
            Self::Anonymous => AuthKind::Anonymous,
            Self::Deferred { .. } => AuthKind::Deferred,
            Self::Basic { .. } => AuthKind::Basic,
            Self::Digest(_) => AuthKind::Digest,
        }
    }

    /// Whether a `401` may be answered by negotiating a new scheme.
    ///
    /// Basic and Digest are final: a rejection means the credentials are wrong.
    #[must_use]
    pub const fn can_upgrade(&self) -> bool {
        matches!(self, Self::Anonymous | Self::Deferred { .. })
    }

    /// Returns the user name, empty for anonymous access.
    #[must_use]
    pub fn username(&self) -> &str {
        match self {
            Self::Anonymous => "",
            Self::Deferred { username, .. } | Self::Basic { username, .. } => username,
            Self::Digest(d) => &d.username,
        }
    }

    /// Returns the password, empty for anonymous access.
    #[must_use]
    pub fn password(&self) -> &str {
        match self {
            Self::Anonymous => "",
            Self::Deferred { password, .. } | Self::Basic { password, .. } => password,
            Self::Digest(d) => &d.password,
        }
    }

    /// Computes the `Authorization` header value for one request, if any.
    ///
    /// `uri` is the request target and `body` the buffered request body; both
    /// only matter for Digest.
    #[must_use]
    pub fn authorization(&self, method: &str, uri: &str, body: Option<&[u8]>) -> Option<String> {
        match self {
            Self::Anonymous | Self::Deferred { .. } => None,
            Self::Basic { username, password } => Some(format!(
                "Basic {}",
                STANDARD.encode(format!("{username}:{password}"))
            )),
            Self::Digest(digest) => Some(digest.authorization(method, uri, body)),
        }
    }

    /// Builds the authenticator answering the given `WWW-Authenticate` values.
    ///
    /// Digest is preferred over Basic. The current credentials are carried
    /// over to the new authenticator.
    ///
    /// # Errors
    ///
    /// Returns an error if no Basic or usable Digest challenge is offered.
    pub fn negotiate<'a, I>(&self, headers: I) -> Result<Self, NegotiationError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut offered = Vec::new();
        let mut digest_error = None;
        let mut basic = false;

        for header in headers {
            offered.push(header.to_string());
            for challenge in challenge::parse(header) {
                if challenge.is("digest") {
                    match DigestChallenge::from_challenge(&challenge) {
                        Ok(parsed) => {
                            return Ok(Self::Digest(DigestAuth::new(
                                self.username(),
                                self.password(),
                                parsed,
                            )));
                        }
                        Err(e) => digest_error = Some(e),
                    }
                } else if challenge.is("basic") {
                    basic = true;
                }
            }
        }

        if basic {
            Ok(Self::basic(self.username(), self.password()))
        } else if let Some(e) = digest_error {
            Err(e.into())
        } else {
            Err(NegotiationError::NoSupportedScheme(offered.join(", ")))
        }
    }
}

impl From<&AuthMethod> for Authenticator {
    fn from(method: &AuthMethod) -> Self {
        match method {
            AuthMethod::None => Self::Anonymous,
            AuthMethod::Basic { username, password } => Self::basic(username, password),
            AuthMethod::Digest { username, password }
            | AuthMethod::Deferred { username, password } => Self::deferred(username, password),
        }
    }
}

/// Digest credentials bound to the parameters of one server challenge.
#[derive(Debug, Clone)]
pub struct DigestAuth {
    username: String,
    password: String,
    challenge: DigestChallenge,
}

impl DigestAuth {
    /// Creates a digest authenticator for an already parsed challenge.
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        challenge: DigestChallenge,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            challenge,
        }
    }

    /// Parses a `WWW-Authenticate` header and binds the credentials to its
    /// first digest challenge.
    ///
    /// # Errors
    ///
    /// Returns an error if the header holds no usable digest challenge.
    pub fn from_challenge(
        username: impl Into<String>,
        password: impl Into<String>,
        header: &str,
    ) -> Result<Self, NegotiationError> {
        let challenge = challenge::parse(header)
            .into_iter()
            .find(|c| c.is("digest"))
            .ok_or_else(|| NegotiationError::NoSupportedScheme(header.to_string()))?;
        let parsed = DigestChallenge::from_challenge(&challenge)?;
        Ok(Self::new(username, password, parsed))
    }

    /// The challenge parameters this authenticator answers.
    #[must_use]
    pub const fn challenge(&self) -> &DigestChallenge {
        &self.challenge
    }

    fn authorization(&self, method: &str, uri: &str, body: Option<&[u8]>) -> String {
        let request = DigestRequest {
            username: &self.username,
            password: &self.password,
            method,
            uri,
            entity_body: body,
        };
        self.challenge.authorization(&request, &client_nonce())
    }
}
