// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Authentication negotiation tests with wiremock.

use bytes::Bytes;
use davkit_webdav::{
    AuthKind, AuthMethod, DigestChallenge, DigestRequest, RequestBody, WebDavClient, WebDavConfig,
    WebDavError, parse_challenges,
};
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DIGEST_CHALLENGE: &str =
    r#"Digest realm="files@example.org", qop="auth", nonce="dcd98b7102dd2f0e8b11d0f600bfb0c093", opaque="5ccc069c403ebaf9f0171e9517f40e41""#;

async fn setup(auth: AuthMethod) -> (MockServer, WebDavClient) {
    let mock_server = MockServer::start().await;
    let config = WebDavConfig::new(mock_server.uri()).with_auth(auth);
    let client = WebDavClient::new(config).expect("Failed to create client");
    (mock_server, client)
}

fn deferred() -> AuthMethod {
    AuthMethod::Deferred {
        username: "user".to_string(),
        password: "pw".to_string(),
    }
}

/// Answers unauthenticated requests with `challenge` and authenticated ones
/// with `status`.
async fn mount_challenge(mock_server: &MockServer, verb: &str, challenge: &str, status: u16) {
    Mock::given(method(verb))
        .and(header_exists("Authorization"))
        .respond_with(ResponseTemplate::new(status))
        .with_priority(1)
        .mount(mock_server)
        .await;
    Mock::given(method(verb))
        .respond_with(ResponseTemplate::new(401).insert_header("WWW-Authenticate", challenge))
        .mount(mock_server)
        .await;
}

/// Checks a digest `Authorization` header against an independent computation.
fn assert_valid_digest(authorization: &str, verb: &str, uri: &str) {
    let sent = parse_challenges(authorization);
    assert_eq!(sent.len(), 1, "one credential in {authorization}");
    let sent = &sent[0];
    assert!(sent.is("digest"));
    assert_eq!(sent.param("username"), Some("user"));
    assert_eq!(sent.param("uri"), Some(uri));
    assert_eq!(sent.param("nc"), Some("00000001"));
    assert_eq!(sent.param("qop"), Some("auth"));
    assert_eq!(sent.param("algorithm"), Some("MD5"));
    assert_eq!(sent.param("opaque"), Some("5ccc069c403ebaf9f0171e9517f40e41"));

    let cnonce = sent.param("cnonce").expect("cnonce is sent");
    assert_eq!(cnonce.len(), 16);

    let challenge = DigestChallenge::from_challenge(&parse_challenges(DIGEST_CHALLENGE)[0])
        .expect("valid challenge");
    let expected = challenge.response(
        &DigestRequest {
            username: "user",
            password: "pw",
            method: verb,
            uri,
            entity_body: None,
        },
        cnonce,
    );
    assert_eq!(sent.param("response"), Some(expected.as_str()));
}

#[tokio::test]
async fn auth_digest_challenge_replays_buffered_body() {
    let (mock_server, client) = setup(deferred()).await;
    mount_challenge(&mock_server, "PUT", DIGEST_CHALLENGE, 201).await;

    let payload = Bytes::from_static(b"the same bytes, twice");
    client
        .write_file("/upload/a b.txt", payload.clone(), None)
        .await
        .expect("Failed to write after digest negotiation");

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].headers.get("authorization").is_none());
    assert_eq!(requests[0].body, payload);
    assert_eq!(requests[1].body, payload);

    let authorization = requests[1].headers.get("authorization").unwrap();
    assert_valid_digest(authorization.to_str().unwrap(), "PUT", "/upload/a%20b.txt");
    assert_eq!(client.authenticator().kind(), AuthKind::Digest);
}

#[tokio::test]
async fn auth_digest_challenge_replays_streamed_body() {
    let (mock_server, client) = setup(deferred()).await;
    mount_challenge(&mock_server, "PUT", DIGEST_CHALLENGE, 201).await;

    let chunks = (0..64).map(|i| Ok::<_, std::io::Error>(Bytes::from(format!("chunk-{i:02};"))));
    let expected: String = (0..64).map(|i| format!("chunk-{i:02};")).collect();

    client
        .write_stream(
            "/stream.log",
            RequestBody::from_stream(futures::stream::iter(chunks)),
            Some("text/plain"),
        )
        .await
        .expect("Failed to write stream after digest negotiation");

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].body, expected.as_bytes());
    assert_eq!(requests[1].body, requests[0].body);
    assert_eq!(
        requests[1].headers.get("content-type").unwrap(),
        "text/plain"
    );
}

#[tokio::test]
async fn auth_digest_is_reused_without_new_challenge() {
    let (mock_server, client) = setup(deferred()).await;
    mount_challenge(&mock_server, "DELETE", DIGEST_CHALLENGE, 204).await;

    client.remove("/one").await.unwrap();
    client.remove("/two").await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
    let authorization = requests[2].headers.get("authorization").unwrap();
    assert_valid_digest(authorization.to_str().unwrap(), "DELETE", "/two");
}

#[tokio::test]
async fn auth_prefers_digest_over_basic() {
    let (mock_server, client) = setup(deferred()).await;

    Mock::given(method("GET"))
        .and(header_exists("Authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_string("secret"))
        .with_priority(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(401)
                .append_header("WWW-Authenticate", r#"Basic realm="files@example.org""#)
                .append_header("WWW-Authenticate", DIGEST_CHALLENGE),
        )
        .mount(&mock_server)
        .await;

    let body = client.read_file("/secret.txt").await.unwrap();
    assert_eq!(body, "secret");
    assert_eq!(client.authenticator().kind(), AuthKind::Digest);
}

#[tokio::test]
async fn auth_basic_challenge_upgrades_deferred_credentials() {
    let (mock_server, client) = setup(deferred()).await;

    Mock::given(method("GET"))
        .and(path("/secret.txt"))
        .and(header("Authorization", "Basic dXNlcjpwdw=="))
        .respond_with(ResponseTemplate::new(200).set_body_string("secret"))
        .with_priority(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(401).insert_header("WWW-Authenticate", r#"basic realm="x""#),
        )
        .mount(&mock_server)
        .await;

    let body = client.read_file("/secret.txt").await.unwrap();
    assert_eq!(body, "secret");
    assert_eq!(client.authenticator().kind(), AuthKind::Basic);
}

#[tokio::test]
async fn auth_upgrade_is_monotonic() {
    let (mock_server, client) = setup(deferred()).await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(401).insert_header("WWW-Authenticate", r#"Basic realm="x""#),
        )
        .mount(&mock_server)
        .await;

    let err = client.read_file("/a").await.unwrap_err();
    assert!(matches!(err, WebDavError::Unauthorized { .. }));
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
    assert_eq!(client.authenticator().kind(), AuthKind::Basic);

    // Basic is final: the next 401 is not answered with another upgrade.
    let err = client.read_file("/a").await.unwrap_err();
    assert_eq!(err.status_code(), Some(reqwest::StatusCode::UNAUTHORIZED));
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);
    assert_eq!(client.authenticator().kind(), AuthKind::Basic);
}

#[tokio::test]
async fn auth_unknown_scheme_is_unauthorized() {
    let (mock_server, client) = setup(deferred()).await;

    Mock::given(method("DELETE"))
        .respond_with(
            ResponseTemplate::new(401).insert_header("WWW-Authenticate", r#"Bearer realm="api""#),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    match client.remove("/x").await.unwrap_err() {
        WebDavError::Unauthorized { path, reason } => {
            assert_eq!(path, "/x");
            assert!(reason.contains("Bearer"), "{reason}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(client.authenticator().kind(), AuthKind::Deferred);
}

#[tokio::test]
async fn auth_missing_challenge_is_unauthorized() {
    let (mock_server, client) = setup(AuthMethod::None).await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = client.read_file("/x").await.unwrap_err();
    assert!(matches!(err, WebDavError::Unauthorized { .. }));
    assert_eq!(client.authenticator().kind(), AuthKind::Anonymous);
}

#[tokio::test]
async fn auth_basic_config_sends_credentials_upfront() {
    let (mock_server, client) = setup(AuthMethod::Basic {
        username: "user".to_string(),
        password: "pw".to_string(),
    })
    .await;

    Mock::given(method("MKCOL"))
        .and(header("Authorization", "Basic dXNlcjpwdw=="))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    client.mkdir("/new").await.unwrap();
}

#[tokio::test]
async fn auth_digest_config_waits_for_challenge() {
    let (mock_server, client) = setup(AuthMethod::Digest {
        username: "user".to_string(),
        password: "pw".to_string(),
    })
    .await;
    assert_eq!(client.authenticator().kind(), AuthKind::Deferred);

    mount_challenge(&mock_server, "MKCOL", DIGEST_CHALLENGE, 201).await;
    client.mkdir("/new").await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    let authorization = requests[1].headers.get("authorization").unwrap();
    assert_valid_digest(authorization.to_str().unwrap(), "MKCOL", "/new/");
}

#[tokio::test]
async fn auth_basic_streamed_upload_is_sent_once() {
    let (mock_server, client) = setup(AuthMethod::Basic {
        username: "user".to_string(),
        password: "pw".to_string(),
    })
    .await;

    Mock::given(method("PUT"))
        .and(path("/big.bin"))
        .and(header("Authorization", "Basic dXNlcjpwdw=="))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&mock_server)
        .await;

    let chunks = (0..16).map(|i| Ok::<_, std::io::Error>(Bytes::from(vec![i; 1024])));
    let err = client
        .write_stream(
            "/big.bin",
            RequestBody::from_stream(futures::stream::iter(chunks)),
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, WebDavError::Unauthorized { .. }));

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].body.len(), 16 * 1024);
    assert_eq!(client.authenticator().kind(), AuthKind::Basic);
}
