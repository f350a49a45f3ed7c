//! Documentation link for the crate detail page.
//!
//! A crate page shows at most one documentation link. The static link is the
//! crate's declared `documentation` URL. The dynamic link comes from docs.rs:
//! if docs.rs reports a successful build for the displayed version, the page
//! links to `https://docs.rs/<crate>/<reported version>` instead.
//!
//! The docs.rs probe never blocks the page. [`DocsLink`] shows the static
//! link until the probe settles, and every probe failure (error status,
//! transport error, timeout, unexpected payload) leaves the static link in
//! place.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::{MockError, Result};
use crate::fetch::{Fetch, FetchRequest};
use crate::models::{Crate, Version};

/// Origin of the docs.rs host.
pub const DOCS_RS_ORIGIN: &str = "https://docs.rs";

/// How long to wait for a build status before giving up.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Build status reported by docs.rs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocsStatus {
    /// Documentation was built for `version`.
    Built { version: String },
    /// No usable answer.
    NoData,
}

#[derive(Debug, Deserialize)]
struct StatusPayload {
    #[serde(default)]
    doc_status: Value,
    #[serde(default)]
    version: Option<String>,
}

/// JavaScript truthiness, which is what docs.rs consumers check.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Client for the docs.rs build status endpoint.
#[derive(Clone)]
pub struct DocsRsClient {
    fetcher: Arc<dyn Fetch>,
    origin: String,
    timeout: Duration,
}

impl std::fmt::Debug for DocsRsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocsRsClient")
            .field("origin", &self.origin)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl DocsRsClient {
    /// Create a client talking to docs.rs through `fetcher`.
    pub fn new(fetcher: Arc<dyn Fetch>) -> Self {
        Self {
            fetcher,
            origin: DOCS_RS_ORIGIN.to_string(),
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// Use a different docs.rs origin.
    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into().trim_end_matches('/').to_string();
        self
    }

    /// Use a different probe timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The probe timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// URL of the build status for one crate version.
    pub fn status_url(&self, crate_name: &str, version: &str) -> String {
        format!(
            "{}/crate/{}/{}/status.json",
            self.origin,
            urlencoding::encode(crate_name),
            urlencoding::encode(version)
        )
    }

    /// Canonical documentation URL for one crate version.
    ///
    /// Always on docs.rs proper, whatever origin the status is fetched from.
    pub fn docs_url(crate_name: &str, version: &str) -> String {
        format!("{DOCS_RS_ORIGIN}/{crate_name}/{version}")
    }

    /// Ask docs.rs whether documentation was built for `version`.
    ///
    /// Never fails: anything other than a 2xx answer with a truthy
    /// `doc_status` and a non-empty `version` is [`DocsStatus::NoData`].
    #[tracing::instrument(skip(self))]
    pub async fn probe(&self, crate_name: &str, version: &str) -> DocsStatus {
        let request = FetchRequest::get(self.status_url(crate_name, version));

        let response = match tokio::time::timeout(self.timeout, self.fetcher.fetch(request)).await
        {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => {
                tracing::debug!(error = %err, "docs.rs status request failed");
                return DocsStatus::NoData;
            }
            Err(_) => {
                tracing::debug!(timeout = ?self.timeout, "docs.rs status request timed out");
                return DocsStatus::NoData;
            }
        };

        if !response.is_success() {
            tracing::debug!(status = %response.status, "no docs.rs build status");
            return DocsStatus::NoData;
        }

        match response.json::<StatusPayload>() {
            Ok(payload) if is_truthy(&payload.doc_status) => match payload.version {
                Some(version) if !version.is_empty() => DocsStatus::Built { version },
                _ => DocsStatus::NoData,
            },
            Ok(_) => DocsStatus::NoData,
            Err(err) => {
                tracing::debug!(error = %err, "malformed docs.rs build status");
                DocsStatus::NoData
            }
        }
    }

    /// Resolve the documentation link for a crate version, waiting for the
    /// probe.
    pub async fn resolve(
        &self,
        crate_name: &str,
        version: &str,
        documentation: Option<&str>,
    ) -> Option<String> {
        let status = self.probe(crate_name, version).await;
        choose_link(crate_name, &status, static_link(documentation))
    }
}

/// The declared documentation URL, if it is not blank.
fn static_link(documentation: Option<&str>) -> Option<String> {
    documentation
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}

/// A docs.rs build wins; otherwise the static link, if any.
pub fn choose_link(
    crate_name: &str,
    status: &DocsStatus,
    static_link: Option<String>,
) -> Option<String> {
    match status {
        DocsStatus::Built { version } => Some(DocsRsClient::docs_url(crate_name, version)),
        DocsStatus::NoData => static_link,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LinkState {
    Pending,
    Settled(Option<String>),
}

/// A documentation link whose docs.rs probe runs in the background.
///
/// Dropping the handle aborts the probe; a result arriving afterwards is
/// discarded.
#[derive(Debug)]
pub struct DocsLink {
    static_link: Option<String>,
    state: watch::Receiver<LinkState>,
    task: Option<JoinHandle<()>>,
}

impl DocsLink {
    /// Start probing docs.rs for `crate_name` at `version`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        client: DocsRsClient,
        crate_name: &str,
        version: &str,
        documentation: Option<&str>,
    ) -> Self {
        let static_link = static_link(documentation);
        let (tx, rx) = watch::channel(LinkState::Pending);

        let crate_name = crate_name.to_string();
        let version = version.to_string();
        let fallback = static_link.clone();
        let task = tokio::spawn(async move {
            let status = client.probe(&crate_name, &version).await;
            let link = choose_link(&crate_name, &status, fallback);
            // The page may already be gone.
            let _ = tx.send(LinkState::Settled(link));
        });

        Self {
            static_link,
            state: rx,
            task: Some(task),
        }
    }

    /// A link with no probe behind it.
    pub fn fixed(documentation: Option<&str>) -> Self {
        let link = static_link(documentation);
        let (_tx, rx) = watch::channel(LinkState::Settled(link.clone()));
        Self {
            static_link: link,
            state: rx,
            task: None,
        }
    }

    /// The link to show right now.
    pub fn current(&self) -> Option<String> {
        match &*self.state.borrow() {
            LinkState::Pending => self.static_link.clone(),
            LinkState::Settled(link) => link.clone(),
        }
    }

    /// Whether the probe has finished.
    pub fn is_settled(&self) -> bool {
        matches!(*self.state.borrow(), LinkState::Settled(_))
    }

    /// Wait for the probe and return the final link.
    pub async fn settled(&self) -> Option<String> {
        let mut state = self.state.clone();
        // The guard borrows `state`, so it must drop before `state` does.
        let link = match state
            .wait_for(|s| matches!(s, LinkState::Settled(_)))
            .await
        {
            Ok(settled) => match &*settled {
                LinkState::Settled(link) => link.clone(),
                LinkState::Pending => self.static_link.clone(),
            },
            // Probe task went away without reporting.
            Err(_) => self.static_link.clone(),
        };
        link
    }
}

impl Drop for DocsLink {
    fn drop(&mut self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }
}

#[derive(Debug, Deserialize)]
struct CrateResponse {
    #[serde(rename = "crate")]
    krate: Crate,
    #[serde(default)]
    versions: Vec<Version>,
}

/// The crate detail page.
#[derive(Debug)]
pub struct CratePage {
    pub krate: Crate,
    pub versions: Vec<Version>,
    /// The displayed version: the requested one, else the crate's
    /// `max_version`.
    pub version: Option<String>,
    pub docs: DocsLink,
}

impl CratePage {
    /// Load the page for `crate_name` and start the docs.rs probe.
    ///
    /// # Errors
    ///
    /// Returns an error if the crate itself cannot be loaded. docs.rs
    /// problems never fail the page.
    #[tracing::instrument(skip(fetcher, docs_rs))]
    pub async fn visit(
        fetcher: &dyn Fetch,
        crate_name: &str,
        version: Option<&str>,
        docs_rs: &DocsRsClient,
    ) -> Result<Self> {
        let url = format!("/api/v1/crates/{}", urlencoding::encode(crate_name));
        let response = fetcher.fetch(FetchRequest::get(url.clone())).await?;
        if !response.is_success() {
            return Err(MockError::Status {
                status: response.status,
                url,
            });
        }
        let CrateResponse { krate, versions } = response.json()?;

        let version = version
            .map(str::to_string)
            .or_else(|| krate.max_version.clone());
        let docs = match &version {
            Some(version) => DocsLink::spawn(
                docs_rs.clone(),
                &krate.name,
                version,
                krate.documentation.as_deref(),
            ),
            None => DocsLink::fixed(krate.documentation.as_deref()),
        };

        Ok(Self {
            krate,
            versions,
            version,
            docs,
        })
    }

    /// The documentation link to show right now.
    pub fn documentation_link(&self) -> Option<String> {
        self.docs.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::mock_server::{MockResponse, MockServer, DOCS_RS_STATUS};
    use reqwest::{Method, StatusCode};
    use serde_json::json;

    fn client_with(status: MockResponse) -> DocsRsClient {
        let mut server = MockServer::new(ServerConfig::test());
        server.respond(Method::GET, DOCS_RS_STATUS, status);
        DocsRsClient::new(Arc::new(server))
    }

    #[test]
    fn test_truthiness() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!("yes")));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&Value::Null));
    }

    #[test]
    fn test_urls() {
        let client = client_with(MockResponse::status(StatusCode::NOT_FOUND));
        assert_eq!(
            client.status_url("foo", "1.0.0"),
            "https://docs.rs/crate/foo/1.0.0/status.json"
        );
        assert_eq!(DocsRsClient::docs_url("foo", "1.0.0"), "https://docs.rs/foo/1.0.0");

        let local = client.with_origin("http://127.0.0.1:9000/");
        assert_eq!(
            local.status_url("foo", "1.0.0"),
            "http://127.0.0.1:9000/crate/foo/1.0.0/status.json"
        );
    }

    #[tokio::test]
    async fn test_probe_built() {
        let client = client_with(MockResponse::ok(json!({ "doc_status": true, "version": "1.0.0" })));
        assert_eq!(
            client.probe("foo", "1.0.0").await,
            DocsStatus::Built {
                version: "1.0.0".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_probe_failures_are_no_data() {
        for response in [
            MockResponse::text(StatusCode::NOT_FOUND, "not found"),
            MockResponse::status(StatusCode::INTERNAL_SERVER_ERROR),
            MockResponse::ok(json!({})),
            MockResponse::ok(json!({ "doc_status": false, "version": "1.0.0" })),
            MockResponse::ok(json!({ "doc_status": true, "version": "" })),
            MockResponse::text(StatusCode::OK, "<html>"),
        ] {
            let client = client_with(response.clone());
            assert_eq!(
                client.probe("foo", "1.0.0").await,
                DocsStatus::NoData,
                "{response:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_probe_without_route_is_no_data() {
        let client = DocsRsClient::new(Arc::new(MockServer::new(ServerConfig::test())));
        assert_eq!(client.probe("foo", "1.0.0").await, DocsStatus::NoData);
    }

    #[tokio::test]
    async fn test_probe_timeout_is_no_data() {
        let mut server = MockServer::new(ServerConfig {
            timing: 1_000,
            ..ServerConfig::default()
        });
        server.respond(
            Method::GET,
            DOCS_RS_STATUS,
            MockResponse::ok(json!({ "doc_status": true, "version": "1.0.0" })),
        );
        let client = DocsRsClient::new(Arc::new(server)).with_timeout(Duration::from_millis(20));

        assert_eq!(client.probe("foo", "1.0.0").await, DocsStatus::NoData);
    }

    #[test]
    fn test_choose_link() {
        let built = DocsStatus::Built {
            version: "1.0.0".to_string(),
        };
        let static_link = Some("https://foo.io/docs".to_string());

        assert_eq!(
            choose_link("foo", &built, static_link.clone()).as_deref(),
            Some("https://docs.rs/foo/1.0.0")
        );
        assert_eq!(
            choose_link("foo", &DocsStatus::NoData, static_link.clone()),
            static_link
        );
        assert_eq!(choose_link("foo", &DocsStatus::NoData, None), None);
    }

    #[test]
    fn test_fixed_link_is_settled() {
        let link = DocsLink::fixed(Some("https://foo.io/docs"));
        assert!(link.is_settled());
        assert_eq!(link.current().as_deref(), Some("https://foo.io/docs"));
    }

    #[test]
    fn test_blank_documentation_is_no_static_link() {
        assert_eq!(static_link(Some("  ")), None);
        assert_eq!(static_link(None), None);
    }

    #[tokio::test]
    async fn test_link_shows_static_link_while_pending() {
        let mut server = MockServer::new(ServerConfig {
            timing: 200,
            ..ServerConfig::default()
        });
        server.respond(
            Method::GET,
            DOCS_RS_STATUS,
            MockResponse::ok(json!({ "doc_status": true, "version": "1.0.0" })),
        );
        let client = DocsRsClient::new(Arc::new(server));

        let link = DocsLink::spawn(client, "foo", "1.0.0", Some("https://foo.io/docs"));
        assert!(!link.is_settled());
        assert_eq!(link.current().as_deref(), Some("https://foo.io/docs"));

        assert_eq!(link.settled().await.as_deref(), Some("https://docs.rs/foo/1.0.0"));
        assert_eq!(link.current().as_deref(), Some("https://docs.rs/foo/1.0.0"));
    }

    #[tokio::test]
    async fn test_dropping_link_aborts_probe() {
        let mut server = MockServer::new(ServerConfig {
            timing: 5_000,
            ..ServerConfig::default()
        });
        server.respond(
            Method::GET,
            DOCS_RS_STATUS,
            MockResponse::ok(json!({ "doc_status": true, "version": "1.0.0" })),
        );
        let client = DocsRsClient::new(Arc::new(server));

        let link = DocsLink::spawn(client, "foo", "1.0.0", None);
        let task = link.task.as_ref().unwrap().abort_handle();
        drop(link);
        tokio::time::timeout(Duration::from_secs(1), async {
            while !task.is_finished() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
    }
}
