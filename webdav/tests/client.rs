// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Client integration tests with wiremock.

use davsync_webdav::{AuthMode, DavConfig, Depth, LockScope, LockType, Scheme, WebDavClient};
use wiremock::matchers::{body_string, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DIGEST_CHALLENGE: &str =
    r#"Digest realm="dav", nonce="n0nce", qop="auth", opaque="op", algorithm="MD5""#;

fn client_for(server: &MockServer) -> WebDavClient {
    let config = DavConfig::new(Scheme::Http, server.address().to_string(), "u", "p");
    WebDavClient::new(config).expect("Failed to create client")
}

async fn authorization_headers(server: &MockServer) -> Vec<Option<String>> {
    server
        .received_requests()
        .await
        .expect("request recording is enabled")
        .iter()
        .map(|r| {
            r.headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        })
        .collect()
}

#[tokio::test]
async fn client_basic_challenge_is_retried_with_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("MKCOL"))
        .and(path("/remote/a"))
        .and(header("authorization", "Basic dTpw"))
        .respond_with(ResponseTemplate::new(201))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("MKCOL"))
        .respond_with(
            ResponseTemplate::new(401).insert_header("WWW-Authenticate", r#"Basic realm="dav""#),
        )
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let resp = client.mkcol("/remote/a").await.unwrap();
    assert_eq!(resp.status().as_u16(), 201);
    assert!(matches!(client.auth().mode(), AuthMode::Basic(_)));

    // the learned mode is reused without another challenge
    let resp = client.mkcol("/remote/a").await.unwrap();
    assert_eq!(resp.status().as_u16(), 201);

    let sent = authorization_headers(&server).await;
    assert_eq!(
        sent,
        vec![
            None,
            Some("Basic dTpw".to_string()),
            Some("Basic dTpw".to_string()),
        ]
    );
}

#[tokio::test]
async fn client_digest_challenge_counts_nonce_uses() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(201))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(
            ResponseTemplate::new(401).insert_header("WWW-Authenticate", DIGEST_CHALLENGE),
        )
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let resp = client.put("/remote/a.txt", "one", None).await.unwrap();
    assert_eq!(resp.status().as_u16(), 201);
    let resp = client.put("/remote/a.txt", "two", None).await.unwrap();
    assert_eq!(resp.status().as_u16(), 201);

    let sent = authorization_headers(&server).await;
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[0], None);

    let first = sent[1].as_deref().unwrap();
    assert!(first.starts_with(
        r#"Digest username="u", realm="dav", nonce="n0nce", uri="/remote/a.txt""#
    ));
    assert!(first.contains(r#"opaque="op""#));
    assert!(first.contains(r#"algorithm="MD5""#));
    assert!(first.contains("nc=00000001"));

    let second = sent[2].as_deref().unwrap();
    assert!(second.contains("nc=00000002"));
}

#[tokio::test]
async fn client_persistent_401_is_returned_after_one_retry() {
    let server = MockServer::start().await;

    Mock::given(method("PROPFIND"))
        .respond_with(
            ResponseTemplate::new(401).insert_header("WWW-Authenticate", DIGEST_CHALLENGE),
        )
        .expect(2)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let resp = client
        .propfind("/remote", Some(Depth::Zero), None)
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);
}

#[tokio::test]
async fn client_401_without_challenge_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).insert_header("WWW-Authenticate", "Negotiate"))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let resp = client.get("/secret").await.unwrap();
    assert_eq!(resp.status().as_u16(), 401);
    assert!(matches!(client.auth().mode(), AuthMode::None));
}

#[tokio::test]
async fn client_unanswerable_digest_sends_no_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).insert_header(
            "WWW-Authenticate",
            r#"Digest realm="dav", nonce="n", qop="auth-int""#,
        ))
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let resp = client.get("/file").await.unwrap();
    assert_eq!(resp.status().as_u16(), 401);
    assert_eq!(authorization_headers(&server).await, vec![None, None]);
}

#[tokio::test]
async fn client_propfind_sends_probe_body_and_depth() {
    let server = MockServer::start().await;
    let url = format!("http://{}/remote", server.address());
    let expected_body = format!(
        r#"<?xml version="1.0" encoding="utf-8" ?><D:propfind xmlns:D="DAV:"><D:prop xmlns:R="{url}"></D:prop></D:propfind>"#
    );

    Mock::given(method("PROPFIND"))
        .and(path("/remote"))
        .and(header("Depth", "0"))
        .and(header("Content-Type", r#"text/xml; charset="utf-8""#))
        .and(body_string(expected_body))
        .respond_with(ResponseTemplate::new(207))
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let resp = client.propfind(&url, Some(Depth::Zero), None).await.unwrap();
    assert_eq!(resp.status().as_u16(), 207);
}

#[tokio::test]
async fn client_put_guesses_content_type() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/remote/notes.txt.gz"))
        .and(header("Content-Type", "text/plain"))
        .and(header("Content-Encoding", "gzip"))
        .and(body_string("zipped"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/remote/page.html"))
        .and(header("Content-Type", "application/xhtml+xml"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let resp = client
        .put("/remote/notes.txt.gz", "zipped", None)
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 204);

    let resp = client
        .put("/remote/page.html", "<p/>", Some("application/xhtml+xml"))
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);
}

#[tokio::test]
async fn client_move_and_copy_send_absolute_destination() {
    let server = MockServer::start().await;
    let destination = format!("http://{}/remote/b.txt", server.address());

    Mock::given(method("MOVE"))
        .and(path("/remote/a.txt"))
        .and(header("Destination", destination.as_str()))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;
    Mock::given(method("COPY"))
        .and(path("/remote/b.txt"))
        .and(header("Destination", destination.as_str()))
        .and(header("Depth", "infinity"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let resp = client.r#move("/remote/a.txt", "/remote/b.txt").await.unwrap();
    assert_eq!(resp.status().as_u16(), 201);
    let resp = client
        .copy("/remote/b.txt", &destination, Some(Depth::Infinity))
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 204);
}

#[tokio::test]
async fn client_lock_and_unlock() {
    let server = MockServer::start().await;

    Mock::given(method("LOCK"))
        .and(path("/remote/a.txt"))
        .and(header("Timeout", "Second-60"))
        .and(header("Depth", "0"))
        .and(body_string(
            r#"<?xml version="1.0" encoding="utf-8"?><DAV:lockinfo xmlns:DAV="DAV:"><DAV:lockscope><DAV:exclusive/></DAV:lockscope><DAV:locktype><DAV:write/></DAV:locktype><DAV:owner>me</DAV:owner></DAV:lockinfo>"#,
        ))
        .respond_with(ResponseTemplate::new(200).insert_header("Lock-Token", "<opaquelocktoken:1>"))
        .mount(&server)
        .await;
    Mock::given(method("UNLOCK"))
        .and(path("/remote/a.txt"))
        .and(header("Lock-Token", "<opaquelocktoken:1>"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let resp = client
        .lock(
            "/remote/a.txt",
            "me",
            Some("Second-60"),
            Some(Depth::Zero),
            LockScope::Exclusive,
            LockType::Write,
        )
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let resp = client
        .unlock("/remote/a.txt", "opaquelocktoken:1")
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 204);
}

#[tokio::test]
async fn client_transport_error_propagates() {
    // nothing listens on the discard port of the loopback interface
    let config = DavConfig::new(Scheme::Http, "127.0.0.1:9", "u", "p");
    let mut client = WebDavClient::new(config).unwrap();
    assert!(client.get("/").await.is_err());
}
