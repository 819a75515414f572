//! Mock release host helpers for testing
//!
//! Wraps wiremock setup for the release metadata endpoint, platform
//! artifacts and checksum manifests.

use serde_json::Value;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::builders::{checksum_line, ReleaseBuilder};
use super::constants::*;

/// Serve `release` as the latest release
pub async fn mock_latest_release(server: &MockServer, release: &Value) {
    Mock::given(method("GET"))
        .and(path(LATEST_RELEASE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(release))
        .mount(server)
        .await;
}

/// Serve the latest release only when the bearer token matches
pub async fn mock_latest_release_with_token(server: &MockServer, release: &Value, token: &str) {
    Mock::given(method("GET"))
        .and(path(LATEST_RELEASE_PATH))
        .and(header("authorization", format!("Bearer {}", token).as_str()))
        .and(header("accept", "application/vnd.github+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(release))
        .expect(1)
        .mount(server)
        .await;
}

/// Respond to the release endpoint with a status and body
pub async fn mock_release_status(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(LATEST_RELEASE_PATH))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

/// Delay the release endpoint response
pub async fn mock_release_delayed(server: &MockServer, release: &Value, delay: Duration) {
    Mock::given(method("GET"))
        .and(path(LATEST_RELEASE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(release)
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

/// Serve binary content at `url_path`
pub async fn mock_artifact(server: &MockServer, url_path: &str, content: &[u8]) {
    Mock::given(method("GET"))
        .and(path(url_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
        .mount(server)
        .await;
}

/// Serve a checksum manifest at the standard path
pub async fn mock_checksums(server: &MockServer, manifest: &str) {
    Mock::given(method("GET"))
        .and(path(CHECKSUMS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(manifest))
        .mount(server)
        .await;
}

/// Serve a checksum manifest after `delay`
pub async fn mock_checksums_delayed(server: &MockServer, manifest: &str, delay: Duration) {
    Mock::given(method("GET"))
        .and(path(CHECKSUMS_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(manifest)
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

/// Respond to `url_path` with an error status
pub async fn mock_status(server: &MockServer, url_path: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(url_path))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Mount a complete v1.2.0 release whose manifest matches `content`
pub async fn mock_full_release(server: &MockServer, content: &[u8]) {
    let release = ReleaseBuilder::new()
        .body(RELEASE_NOTES)
        .with_standard_assets(&server.uri());

    mock_latest_release(server, &release.to_json()).await;
    mock_artifact(server, BINARY_PATH, content).await;
    mock_checksums(server, &checksum_line(content, ASSET_LINUX_AMD64)).await;
}

/// Serve `body` once without a `Content-Length`, delimited by connection close
///
/// Returns the artifact URL. wiremock always advertises the length, so this
/// talks HTTP/1.1 over a bare socket.
pub async fn serve_without_content_length(body: Vec<u8>) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let read = socket.read(&mut buf).await.unwrap();
            if read == 0 {
                return;
            }
            request.extend_from_slice(&buf[..read]);
        }

        socket
            .write_all(b"HTTP/1.1 200 OK\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        socket.write_all(&body).await.unwrap();
        socket.shutdown().await.unwrap();
    });

    format!("http://{}{}", addr, BINARY_PATH)
}
