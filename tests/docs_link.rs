//! Documentation link resolution on the crate page.
//!
//! Each test builds the full mock registry, overrides the docs.rs status
//! route through a hook and visits the page for `foo`.

use std::sync::Arc;
use std::time::Duration;

use crates_mock::mock_server::{make_server, Fixtures, Injection, MockResponse, MockServer, DOCS_RS_STATUS};
use crates_mock::{CratePage, DocsRsClient, HttpFetcher, ServerConfig};
use reqwest::{Method, StatusCode};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

/// Registry with `foo` 0.6.2 and 1.0.0, answering docs.rs with `status`.
async fn registry(documentation: Option<&str>, status: MockResponse) -> Arc<MockServer> {
    let server = make_server(
        ServerConfig::test(),
        Injection::none().with_hook(move |server: &mut MockServer| {
            server.respond(Method::GET, DOCS_RS_STATUS, status);
        }),
    );

    {
        let db = server.db();
        let mut db = db.write().await;
        let mut foo = Fixtures::krate("foo");
        foo.documentation = documentation.map(str::to_string);
        db.insert_crate(foo);
        db.insert_version(Fixtures::version("foo", "0.6.2"));
        db.insert_version(Fixtures::version("foo", "1.0.0"));
    }

    Arc::new(server)
}

async fn documentation_link(documentation: Option<&str>, status: MockResponse) -> Option<String> {
    let server = registry(documentation, status).await;
    let docs_rs = DocsRsClient::new(server.clone());

    let page = CratePage::visit(server.as_ref(), "foo", None, &docs_rs)
        .await
        .expect("crate page should load");
    assert_eq!(page.version.as_deref(), Some("1.0.0"));

    page.docs.settled().await
}

fn built(version: &str) -> MockResponse {
    MockResponse::ok(json!({ "doc_status": true, "version": version }))
}

fn not_found() -> MockResponse {
    MockResponse::text(StatusCode::NOT_FOUND, "not found")
}

#[tokio::test]
async fn test_static_link_when_docs_rs_has_nothing() {
    let link = documentation_link(Some("https://foo.io/docs"), not_found()).await;
    assert_eq!(link.as_deref(), Some("https://foo.io/docs"));
}

#[tokio::test]
async fn test_docs_rs_link_without_static_link() {
    let link = documentation_link(None, built("1.0.0")).await;
    assert_eq!(link.as_deref(), Some("https://docs.rs/foo/1.0.0"));
}

#[tokio::test]
async fn test_no_link_at_all() {
    let link = documentation_link(None, not_found()).await;
    assert_eq!(link, None);
}

#[tokio::test]
async fn test_static_docs_rs_link_kept_when_probe_fails() {
    let link = documentation_link(Some("https://docs.rs/foo/0.6.2"), not_found()).await;
    assert_eq!(link.as_deref(), Some("https://docs.rs/foo/0.6.2"));
}

#[tokio::test]
async fn test_docs_rs_build_beats_static_link() {
    let link = documentation_link(Some("https://docs.rs/foo/0.6.2"), built("1.0.0")).await;
    assert_eq!(link.as_deref(), Some("https://docs.rs/foo/1.0.0"));
}

#[tokio::test]
async fn test_server_error_keeps_static_link() {
    let link = documentation_link(
        Some("https://foo.io/docs"),
        MockResponse::status(StatusCode::INTERNAL_SERVER_ERROR),
    )
    .await;
    assert_eq!(link.as_deref(), Some("https://foo.io/docs"));
}

#[tokio::test]
async fn test_empty_payload_keeps_static_link() {
    let link = documentation_link(Some("https://foo.io/docs"), MockResponse::ok(json!({}))).await;
    assert_eq!(link.as_deref(), Some("https://foo.io/docs"));
}

#[tokio::test]
async fn test_explicit_version_is_probed() {
    let server = registry(None, built("0.6.2")).await;
    let docs_rs = DocsRsClient::new(server.clone());

    let page = CratePage::visit(server.as_ref(), "foo", Some("0.6.2"), &docs_rs)
        .await
        .unwrap();
    assert_eq!(page.version.as_deref(), Some("0.6.2"));
    assert_eq!(
        page.docs.settled().await.as_deref(),
        Some("https://docs.rs/foo/0.6.2")
    );
}

#[tokio::test]
async fn test_transport_error_keeps_static_link() {
    let server = registry(Some("https://foo.io/docs"), not_found()).await;
    // Nothing listens on port 1.
    let docs_rs = DocsRsClient::new(Arc::new(HttpFetcher::new().unwrap()))
        .with_origin("http://127.0.0.1:1");

    let page = CratePage::visit(server.as_ref(), "foo", None, &docs_rs)
        .await
        .unwrap();
    assert_eq!(page.docs.settled().await.as_deref(), Some("https://foo.io/docs"));
}

#[tokio::test]
async fn test_slow_docs_rs_times_out() {
    let docs_host = wiremock::MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/crate/foo/1.0.0/status.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "doc_status": true, "version": "1.0.0" }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&docs_host)
        .await;

    let server = registry(Some("https://foo.io/docs"), not_found()).await;
    let docs_rs = DocsRsClient::new(Arc::new(HttpFetcher::new().unwrap()))
        .with_origin(docs_host.uri())
        .with_timeout(Duration::from_millis(100));

    let page = CratePage::visit(server.as_ref(), "foo", None, &docs_rs)
        .await
        .unwrap();
    assert_eq!(page.docs.settled().await.as_deref(), Some("https://foo.io/docs"));
}

#[tokio::test]
async fn test_real_http_docs_rs_build() {
    let docs_host = wiremock::MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/crate/foo/1.0.0/status.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "doc_status": true, "version": "1.0.0" })),
        )
        .expect(1)
        .mount(&docs_host)
        .await;

    let server = registry(None, not_found()).await;
    let docs_rs = DocsRsClient::new(Arc::new(HttpFetcher::new().unwrap()))
        .with_origin(docs_host.uri());

    let page = CratePage::visit(server.as_ref(), "foo", None, &docs_rs)
        .await
        .unwrap();
    // The canonical link always points at docs.rs itself.
    assert_eq!(
        page.docs.settled().await.as_deref(),
        Some("https://docs.rs/foo/1.0.0")
    );
}

#[tokio::test]
async fn test_unknown_crate_fails_the_page() {
    let server = registry(None, not_found()).await;
    let docs_rs = DocsRsClient::new(server.clone());

    let result = CratePage::visit(server.as_ref(), "nope", None, &docs_rs).await;
    match result {
        Err(crates_mock::MockError::Status { status, .. }) => {
            assert_eq!(status, StatusCode::NOT_FOUND)
        }
        other => panic!("expected a status error, got {other:?}"),
    }
}
