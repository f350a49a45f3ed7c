//! Mock registry server.
//!
//! Holds the route table and the shared database, and answers requests
//! in-process. With the `listener` feature the same server can also be
//! served over a local socket, see [`MockServer::listen`].

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use tokio::sync::RwLock;

use super::route::{
    Handler, Inserted, MockRequest, MockResponse, PathPattern, RouteAction, RouteRule, RouteTable,
};
use super::state::MockState;
use crate::config::ServerConfig;
use crate::error::{MockError, Result};
use crate::fetch::{Fetch, FetchRequest, FetchResponse, HttpFetcher};

/// Outcome of dispatching a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// A rule answered the request.
    Respond(MockResponse),
    /// A passthrough rule matched; the request should go to the network.
    Passthrough,
}

/// A mock registry server.
///
/// Cloning is cheap: clones share the database but each has its own copy of
/// the route table, so routes added to one clone are not seen by others.
#[derive(Clone)]
pub struct MockServer {
    config: ServerConfig,
    routes: RouteTable,
    db: Arc<RwLock<MockState>>,
    upstream: Option<HttpFetcher>,
}

impl std::fmt::Debug for MockServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockServer")
            .field("config", &self.config)
            .field("routes", &self.routes.len())
            .field("upstream", &self.upstream)
            .finish_non_exhaustive()
    }
}

impl MockServer {
    /// Create a server with no routes and an empty database.
    pub fn new(config: ServerConfig) -> Self {
        Self::with_state(config, MockState::new())
    }

    /// Create a server with no routes and the given database.
    pub fn with_state(config: ServerConfig, state: MockState) -> Self {
        Self {
            config,
            routes: RouteTable::new(),
            db: state.shared(),
            upstream: None,
        }
    }

    /// Forward passthrough requests through `upstream`.
    ///
    /// Same-origin passthrough paths resolve against the fetcher's base URL.
    #[must_use]
    pub fn with_upstream(mut self, upstream: HttpFetcher) -> Self {
        self.upstream = Some(upstream);
        self
    }

    /// The fetcher passthrough requests are forwarded through, if any.
    pub fn upstream(&self) -> Option<&HttpFetcher> {
        self.upstream.as_ref()
    }

    /// The configuration the server was built with.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The route table, in registration order.
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Get access to the server's shared database.
    ///
    /// This allows creating records during a test.
    pub fn db(&self) -> Arc<RwLock<MockState>> {
        self.db.clone()
    }

    fn insert(&mut self, method: Option<Method>, pattern: &str, action: RouteAction) -> &mut Self {
        let pattern = PathPattern::new(pattern);
        let inserted = self.routes.insert(RouteRule {
            method: method.clone(),
            pattern: pattern.clone(),
            action,
        });
        if inserted == Inserted::Replaced {
            tracing::debug!(?method, %pattern, "route overridden");
        }
        self
    }

    /// Register a handler for `method` and `pattern`.
    pub fn route<H>(&mut self, method: Method, pattern: &str, handler: H) -> &mut Self
    where
        H: Fn(&mut MockState, &MockRequest) -> MockResponse + Send + Sync + 'static,
    {
        let handler: Handler = Arc::new(handler);
        self.insert(Some(method), pattern, RouteAction::Respond(handler))
    }

    /// Register a GET handler.
    pub fn get<H>(&mut self, pattern: &str, handler: H) -> &mut Self
    where
        H: Fn(&mut MockState, &MockRequest) -> MockResponse + Send + Sync + 'static,
    {
        self.route(Method::GET, pattern, handler)
    }

    /// Register a PUT handler.
    pub fn put<H>(&mut self, pattern: &str, handler: H) -> &mut Self
    where
        H: Fn(&mut MockState, &MockRequest) -> MockResponse + Send + Sync + 'static,
    {
        self.route(Method::PUT, pattern, handler)
    }

    /// Register a DELETE handler.
    pub fn delete<H>(&mut self, pattern: &str, handler: H) -> &mut Self
    where
        H: Fn(&mut MockState, &MockRequest) -> MockResponse + Send + Sync + 'static,
    {
        self.route(Method::DELETE, pattern, handler)
    }

    /// Answer `method` and `pattern` with a fixed response.
    pub fn respond(&mut self, method: Method, pattern: &str, response: MockResponse) -> &mut Self {
        self.route(method, pattern, move |_, _| response.clone())
    }

    /// Let requests for `pattern` through to the network, for every method.
    pub fn passthrough(&mut self, pattern: &str) -> &mut Self {
        self.insert(None, pattern, RouteAction::Passthrough)
    }

    /// Dispatch a request to the first matching rule.
    ///
    /// # Errors
    ///
    /// Returns [`MockError::Unhandled`] if no rule matches.
    pub async fn handle(&self, mut request: MockRequest) -> Result<Dispatch> {
        let (rule, params) = self
            .routes
            .find(&request.method, request.origin.as_deref(), &request.path)
            .ok_or_else(|| MockError::Unhandled {
                method: request.method.clone(),
                url: request.url(),
            })?;
        request.params = params;

        let handler = match &rule.action {
            RouteAction::Passthrough => {
                tracing::debug!(method = %request.method, url = %request.url(), "passthrough");
                return Ok(Dispatch::Passthrough);
            }
            RouteAction::Respond(handler) => handler.clone(),
        };

        let latency = self.config.latency();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let response = {
            let mut db = self.db.write().await;
            handler(&mut db, &request)
        };

        if self.config.logging {
            tracing::info!(method = %request.method, url = %request.url(), status = %response.status, "handled");
        } else {
            tracing::debug!(method = %request.method, url = %request.url(), status = %response.status, "handled");
        }

        Ok(Dispatch::Respond(response))
    }

    /// Dispatch a request and return the response.
    ///
    /// # Errors
    ///
    /// Returns an error if no rule matches or the matching rule is a
    /// passthrough.
    pub async fn request(&self, request: MockRequest) -> Result<MockResponse> {
        let url = request.url();
        match self.handle(request).await? {
            Dispatch::Respond(response) => Ok(response),
            Dispatch::Passthrough => Err(MockError::Passthrough { url }),
        }
    }

    /// Send a request that matched a passthrough rule to the upstream.
    ///
    /// # Errors
    ///
    /// Returns [`MockError::Passthrough`] if no upstream is configured.
    pub async fn forward(&self, request: FetchRequest) -> Result<FetchResponse> {
        match &self.upstream {
            Some(upstream) => upstream.fetch(request).await,
            None => Err(MockError::Passthrough { url: request.url }),
        }
    }
}

#[async_trait]
impl Fetch for MockServer {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse> {
        let mut mock_request = MockRequest::new(request.method.clone(), &request.url)?;
        mock_request.body = request.body.clone();

        match self.handle(mock_request).await? {
            Dispatch::Respond(response) => Ok(FetchResponse {
                status: response.status,
                body: response.body_string(),
            }),
            Dispatch::Passthrough => self.forward(request).await,
        }
    }
}
