// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP Digest access authentication (RFC 7616).
//!
//! `MD5` and `MD5-sess` are implemented because the RFC keeps them for
//! backwards compatibility and many servers offer nothing else. This is a
//! protocol compatibility requirement, not an endorsement of MD5. Servers that
//! offer `SHA-256` or `SHA-256-sess` get SHA-256.

use std::fmt;
use std::fmt::Write as _;

use sha2::{Digest as _, Sha256};

use crate::challenge::Challenge;

/// Nonce count sent with every authorization. Each challenge is answered once.
pub const NONCE_COUNT: &str = "00000001";

/// Errors turning a server challenge into digest parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DigestError {
    /// The challenge carries no `nonce`.
    #[error("digest challenge without a nonce")]
    MissingNonce,

    /// The challenge names an algorithm this client cannot compute.
    #[error("unsupported digest algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

/// Digest hash algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    /// `MD5`, also used when the challenge names no algorithm.
    #[default]
    Md5,
    /// `MD5-sess`.
    Md5Sess,
    /// `SHA-256`.
    Sha256,
    /// `SHA-256-sess`.
    Sha256Sess,
}

impl Algorithm {
    /// Parses an algorithm token, ignoring case. An empty token means `MD5`.
    ///
    /// # Errors
    ///
    /// Returns an error for algorithms other than the four supported ones.
    pub fn parse(token: &str) -> Result<Self, DigestError> {
        let token = token.trim();
        if token.is_empty() || token.eq_ignore_ascii_case("MD5") {
            Ok(Self::Md5)
        } else if token.eq_ignore_ascii_case("MD5-sess") {
            Ok(Self::Md5Sess)
        } else if token.eq_ignore_ascii_case("SHA-256") {
            Ok(Self::Sha256)
        } else if token.eq_ignore_ascii_case("SHA-256-sess") {
            Ok(Self::Sha256Sess)
        } else {
            Err(DigestError::UnsupportedAlgorithm(token.to_string()))
        }
    }

    /// The token as written in headers.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Md5 => "MD5",
            Self::Md5Sess => "MD5-sess",
            Self::Sha256 => "SHA-256",
            Self::Sha256Sess => "SHA-256-sess",
        }
    }

    const fn is_session(self) -> bool {
        matches!(self, Self::Md5Sess | Self::Sha256Sess)
    }

    /// Hashes `data`, hex-encoded in lowercase.
    fn hash(self, data: impl AsRef<[u8]>) -> String {
        match self {
            Self::Md5 | Self::Md5Sess => format!("{:x}", md5::compute(data)),
            Self::Sha256 | Self::Sha256Sess => hex::encode(Sha256::digest(data)),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quality of protection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qop {
    /// Authentication only.
    Auth,
    /// Authentication with integrity protection of the request body.
    AuthInt,
}

impl Qop {
    /// Picks a qop from the comma-separated list a server offers, preferring
    /// `auth`. Returns `None` when the list is empty or offers neither.
    #[must_use]
    pub fn select(offered: &str) -> Option<Self> {
        let mut int = false;
        for option in offered.split(',').map(str::trim) {
            if option.eq_ignore_ascii_case("auth") {
                return Some(Self::Auth);
            }
            int |= option.eq_ignore_ascii_case("auth-int");
        }
        int.then_some(Self::AuthInt)
    }

    /// The token as written in headers.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::AuthInt => "auth-int",
        }
    }
}

/// Parameters captured from a digest challenge.
///
/// `domain`, `stale`, `charset` and `userhash` are not used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestChallenge {
    /// Protection space.
    pub realm: String,
    /// Server nonce.
    pub nonce: String,
    /// Opaque value echoed back unchanged.
    pub opaque: Option<String>,
    /// Hash algorithm.
    pub algorithm: Algorithm,
    /// Selected quality of protection, `None` for RFC 2069 servers.
    pub qop: Option<Qop>,
}

/// The request-specific inputs of a digest computation.
#[derive(Debug, Clone, Copy)]
pub struct DigestRequest<'a> {
    /// User name.
    pub username: &'a str,
    /// Password.
    pub password: &'a str,
    /// HTTP method.
    pub method: &'a str,
    /// Request target, as sent on the request line.
    pub uri: &'a str,
    /// Request body, only used with `auth-int`.
    pub entity_body: Option<&'a [u8]>,
}

impl DigestChallenge {
    /// Extracts digest parameters from a parsed challenge.
    ///
    /// # Errors
    ///
    /// Returns an error if the nonce is missing or the algorithm is unsupported.
    pub fn from_challenge(challenge: &Challenge) -> Result<Self, DigestError> {
        let nonce = challenge
            .param("nonce")
            .ok_or(DigestError::MissingNonce)?
            .to_string();
        let algorithm = Algorithm::parse(challenge.param("algorithm").unwrap_or_default())?;

        Ok(Self {
            realm: challenge.param("realm").unwrap_or_default().to_string(),
            nonce,
            opaque: challenge
                .param("opaque")
                .filter(|o| !o.is_empty())
                .map(str::to_string),
            algorithm,
            qop: challenge.param("qop").and_then(Qop::select),
        })
    }

    /// Computes the `response` value for a request.
    #[must_use]
    pub fn response(&self, request: &DigestRequest<'_>, cnonce: &str) -> String {
        let alg = self.algorithm;

        let mut ha1 = alg.hash(format!(
            "{}:{}:{}",
            request.username, self.realm, request.password
        ));
        if alg.is_session() {
            ha1 = alg.hash(format!("{ha1}:{}:{cnonce}", self.nonce));
        }

        let ha2 = match self.qop {
            Some(Qop::AuthInt) => {
                let body = alg.hash(request.entity_body.unwrap_or_default());
                alg.hash(format!("{}:{}:{body}", request.method, request.uri))
            }
            Some(Qop::Auth) | None => alg.hash(format!("{}:{}", request.method, request.uri)),
        };

        match self.qop {
            None => alg.hash(format!("{ha1}:{}:{ha2}", self.nonce)),
            Some(qop) => alg.hash(format!(
                "{ha1}:{}:{NONCE_COUNT}:{cnonce}:{}:{ha2}",
                self.nonce,
                qop.as_str()
            )),
        }
    }

    /// Builds the full `Authorization` header value for a request.
    #[must_use]
    pub fn authorization(&self, request: &DigestRequest<'_>, cnonce: &str) -> String {
        let response = self.response(request, cnonce);
        let mut header = format!(
            "Digest username={}, realm={}, nonce={}, uri={}, nc={NONCE_COUNT}, cnonce={}, response={}",
            quote(request.username),
            quote(&self.realm),
            quote(&self.nonce),
            quote(request.uri),
            quote(cnonce),
            quote(&response),
        );
        if let Some(qop) = self.qop {
            let _ = write!(header, ", qop={}", qop.as_str());
        }
        if let Some(opaque) = &self.opaque {
            let _ = write!(header, ", opaque={}", quote(opaque));
        }
        let _ = write!(header, ", algorithm={}", self.algorithm);
        header
    }
}

/// Generates a fresh client nonce: 8 random bytes, hex-encoded.
#[must_use]
pub fn client_nonce() -> String {
    hex::encode(rand::random::<[u8; 8]>())
}

fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge;

    const RFC7616_CHALLENGE: &str = r#"Digest realm="http-auth@example.org", qop="auth, auth-int", algorithm=MD5, nonce="7ypf/xlj9XXwfDPEoM4URrv/xwf94BcCAzFZH4GiTo0v", opaque="FQhe/qaU925kfnzjCev0ciny7QMkPqMAFRtzCUYo5tdS""#;
    const RFC7616_CNONCE: &str = "f2/wE4q74E6zIJEtWaHKaf5wv/H5QzzpXusqGemxURZJ";

    fn mufasa() -> DigestRequest<'static> {
        DigestRequest {
            username: "Mufasa",
            password: "Circle of Life",
            method: "GET",
            uri: "/dir/index.html",
            entity_body: None,
        }
    }

    fn parse(header: &str) -> DigestChallenge {
        let challenges = challenge::parse(header);
        DigestChallenge::from_challenge(&challenges[0]).unwrap()
    }

    #[test]
    fn rfc7616_md5_example() {
        let digest = parse(RFC7616_CHALLENGE);
        assert_eq!(digest.qop, Some(Qop::Auth));
        assert_eq!(digest.algorithm, Algorithm::Md5);

        assert_eq!(
            digest.response(&mufasa(), RFC7616_CNONCE),
            "8ca523f5e9506fed4657c9700eebdbec"
        );
    }

    #[test]
    fn rfc7616_sha256_example() {
        let digest = parse(&RFC7616_CHALLENGE.replace("algorithm=MD5", "algorithm=SHA-256"));
        assert_eq!(digest.algorithm, Algorithm::Sha256);

        assert_eq!(
            digest.response(&mufasa(), RFC7616_CNONCE),
            "753927fa0e85d155564e2e272a28d1802ca10daf4496794697cf8db5856cb6c1"
        );
    }

    #[test]
    fn rfc2617_example() {
        let digest = parse(
            r#"Digest realm="testrealm@host.com", qop="auth,auth-int", nonce="dcd98b7102dd2f0e8b11d0f600bfb0c093", opaque="5ccc069c403ebaf9f0171e9517f40e41""#,
        );
        let request = DigestRequest {
            password: "Circle Of Life",
            ..mufasa()
        };

        assert_eq!(
            digest.response(&request, "0a4f113b"),
            "6629fae49393a05397450978507c4ef1"
        );
    }

    #[test]
    fn response_without_qop() {
        let digest = parse(r#"Digest realm="r", nonce="abc""#);
        assert_eq!(digest.qop, None);

        let ha1 = format!("{:x}", md5::compute("Mufasa:r:Circle of Life"));
        let ha2 = format!("{:x}", md5::compute("GET:/dir/index.html"));
        let expected = format!("{:x}", md5::compute(format!("{ha1}:abc:{ha2}")));
        assert_eq!(digest.response(&mufasa(), "ignored"), expected);
    }

    #[test]
    fn auth_int_hashes_the_body() {
        let digest = parse(r#"Digest realm="r", nonce="n", qop="auth-int""#);
        assert_eq!(digest.qop, Some(Qop::AuthInt));

        let request = DigestRequest {
            method: "PUT",
            entity_body: Some(b"hello".as_slice()),
            ..mufasa()
        };
        let ha1 = format!("{:x}", md5::compute("Mufasa:r:Circle of Life"));
        let body = format!("{:x}", md5::compute("hello"));
        let ha2 = format!("{:x}", md5::compute(format!("PUT:/dir/index.html:{body}")));
        let expected = format!(
            "{:x}",
            md5::compute(format!("{ha1}:n:00000001:cn:auth-int:{ha2}"))
        );
        assert_eq!(digest.response(&request, "cn"), expected);
    }

    #[test]
    fn md5_sess_rehashes_ha1_with_nonces() {
        let digest = parse(r#"Digest realm="r", nonce="n", qop="auth", algorithm=MD5-sess"#);
        assert_eq!(digest.algorithm, Algorithm::Md5Sess);

        let inner = format!("{:x}", md5::compute("Mufasa:r:Circle of Life"));
        let ha1 = format!("{:x}", md5::compute(format!("{inner}:n:cn")));
        let ha2 = format!("{:x}", md5::compute("GET:/dir/index.html"));
        let expected = format!("{:x}", md5::compute(format!("{ha1}:n:00000001:cn:auth:{ha2}")));
        assert_eq!(digest.response(&mufasa(), "cn"), expected);
    }

    #[test]
    fn md5_sess_keys_on_server_nonce_not_count() {
        let digest = parse(r#"Digest realm="r", nonce="n", qop="auth", algorithm=MD5-sess"#);
        let inner = format!("{:x}", md5::compute("Mufasa:r:Circle of Life"));
        let ha2 = format!("{:x}", md5::compute("GET:/dir/index.html"));

        let keyed_on_count = format!("{:x}", md5::compute(format!("{inner}:00000001:cn")));
        let by_count = format!(
            "{:x}",
            md5::compute(format!("{keyed_on_count}:n:00000001:cn:auth:{ha2}"))
        );
        assert_ne!(digest.response(&mufasa(), "cn"), by_count);

        let renewed = parse(r#"Digest realm="r", nonce="m", qop="auth", algorithm=MD5-sess"#);
        let inner_key = format!("{:x}", md5::compute(format!("{inner}:m:cn")));
        let expected = format!("{:x}", md5::compute(format!("{inner_key}:m:00000001:cn:auth:{ha2}")));
        assert_eq!(renewed.response(&mufasa(), "cn"), expected);
    }

    #[test]
    fn authorization_header_layout() {
        let digest = parse(RFC7616_CHALLENGE);
        let header = digest.authorization(&mufasa(), RFC7616_CNONCE);

        assert_eq!(
            header,
            "Digest username=\"Mufasa\", realm=\"http-auth@example.org\", \
             nonce=\"7ypf/xlj9XXwfDPEoM4URrv/xwf94BcCAzFZH4GiTo0v\", uri=\"/dir/index.html\", \
             nc=00000001, cnonce=\"f2/wE4q74E6zIJEtWaHKaf5wv/H5QzzpXusqGemxURZJ\", \
             response=\"8ca523f5e9506fed4657c9700eebdbec\", qop=auth, \
             opaque=\"FQhe/qaU925kfnzjCev0ciny7QMkPqMAFRtzCUYo5tdS\", algorithm=MD5"
        );
    }

    #[test]
    fn header_omits_empty_qop_and_opaque() {
        let digest = parse(r#"Digest realm="r", nonce="n", opaque="""#);
        let header = digest.authorization(&mufasa(), "cn");

        assert!(!header.contains("qop="));
        assert!(!header.contains("opaque="));
    }

    #[test]
    fn rejects_bad_challenges() {
        let challenges = challenge::parse(r#"Digest realm="r""#);
        assert_eq!(
            DigestChallenge::from_challenge(&challenges[0]),
            Err(DigestError::MissingNonce)
        );

        let challenges = challenge::parse(r#"Digest realm="r", nonce="n", algorithm=SHA-512-256"#);
        assert_eq!(
            DigestChallenge::from_challenge(&challenges[0]),
            Err(DigestError::UnsupportedAlgorithm("SHA-512-256".to_string()))
        );
    }

    #[test]
    fn qop_selection_prefers_auth() {
        assert_eq!(Qop::select("auth-int, auth"), Some(Qop::Auth));
        assert_eq!(Qop::select("auth-int"), Some(Qop::AuthInt));
        assert_eq!(Qop::select(""), None);
        assert_eq!(Qop::select("token"), None);
    }

    #[test]
    fn client_nonce_is_16_hex_chars() {
        let a = client_nonce();
        let b = client_nonce();
        assert_eq!(a.len(), 16);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
