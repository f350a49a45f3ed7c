//! Request transport.
//!
//! The docs.rs resolver and the crate page issue their requests through the
//! [`Fetch`] trait so the same code can run against the real network
//! ([`HttpFetcher`]) or be intercepted in-process by a
//! [`MockServer`](crate::mock_server::MockServer).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::error::{MockError, Result};

const USER_AGENT: &str = concat!("crates-mock/", env!("CARGO_PKG_VERSION"));

/// Default timeout for a single HTTP request.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// An outgoing request.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: Method,
    /// Absolute URL, or a path (`/api/v1/...`) for same-origin requests.
    pub url: String,
    pub body: Option<Value>,
}

impl FetchRequest {
    /// Create a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            body: None,
        }
    }

    /// Create a request with an arbitrary method.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
        }
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// A response, successful or not.
///
/// Non-2xx statuses are not errors at this layer; callers decide.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: StatusCode,
    pub body: String,
}

impl FetchResponse {
    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Parse the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Something that can answer requests.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Send the request and return the response.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or when nothing can answer the
    /// request. HTTP error statuses are returned as responses.
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse>;
}

/// [`Fetch`] implementation backed by the real network.
///
/// Relative request URLs are resolved against an optional base URL.
/// This struct is cheaply cloneable.
#[derive(Clone)]
pub struct HttpFetcher {
    http: Client,
    base_url: Option<Url>,
}

impl std::fmt::Debug for HttpFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFetcher")
            .field("base_url", &self.base_url.as_ref().map(Url::as_str))
            .finish_non_exhaustive()
    }
}

impl HttpFetcher {
    /// Create a fetcher with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_HTTP_TIMEOUT)
    }

    /// Create a fetcher with a custom per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(timeout)
            .build()
            .map_err(MockError::Http)?;

        Ok(Self {
            http,
            base_url: None,
        })
    }

    /// Resolve relative request URLs against `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        // Ensure base URL ends with /
        let base_url_str = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        self.base_url = Some(Url::parse(&base_url_str)?);
        Ok(self)
    }

    /// Get the base URL, if any.
    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    fn resolve(&self, target: &str) -> Result<Url> {
        match &self.base_url {
            Some(base) => Ok(base.join(target.trim_start_matches('/'))?),
            None => Ok(Url::parse(target)?),
        }
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    #[tracing::instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse> {
        let url = self.resolve(&request.url)?;

        let mut builder = self.http.request(request.method, url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(MockError::Http)?;
        let status = response.status();
        let body = response.text().await.map_err(MockError::Http)?;

        tracing::debug!(%status, "fetched");
        Ok(FetchResponse { status, body })
    }
}
