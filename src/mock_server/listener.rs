//! Serving a [`MockServer`] over a local socket.
//!
//! axum is only the transport here: every request goes to a single fallback
//! that hands it to the server's own route table.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use super::route::{MockRequest, MockResponse, ResponseBody};
use super::server::{Dispatch, MockServer};
use crate::error::Result;
use crate::fetch::FetchRequest;

/// A mock server bound to a local port.
///
/// The server runs in the background until [`ListeningServer::shutdown`] is
/// called or the handle is dropped.
#[derive(Debug)]
pub struct ListeningServer {
    url: String,
    handle: JoinHandle<()>,
}

impl ListeningServer {
    /// Base URL of the server, e.g. `http://127.0.0.1:41234`.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Shutdown the server.
    pub async fn shutdown(mut self) {
        self.handle.abort();
        let _ = (&mut self.handle).await;
    }
}

impl Drop for ListeningServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl MockServer {
    /// Serve on a random available port of 127.0.0.1.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket cannot be bound.
    pub async fn listen(self) -> Result<ListeningServer> {
        self.listen_on(SocketAddr::from(([127, 0, 0, 1], 0))).await
    }

    /// Serve on `addr`.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket cannot be bound.
    pub async fn listen_on(self, addr: SocketAddr) -> Result<ListeningServer> {
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        let app = self.router();

        let handle = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app).await {
                tracing::error!(error = %err, "mock server stopped");
            }
        });
        tracing::info!(%addr, "mock server listening");

        Ok(ListeningServer {
            url: format!("http://{addr}"),
            handle,
        })
    }

    /// An axum router that dispatches every request through this server.
    pub fn router(self) -> Router {
        Router::new()
            .fallback(dispatch)
            .with_state(Arc::new(self))
    }
}

async fn dispatch(
    State(server): State<Arc<MockServer>>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let target = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
    let mut request = match MockRequest::new(method.clone(), target) {
        Ok(request) => request,
        Err(err) => return (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
    };
    if !body.is_empty() {
        request.body = serde_json::from_slice(&body).ok();
    }
    let forwarded = FetchRequest {
        method,
        url: target.to_string(),
        body: request.body.clone(),
    };

    match server.handle(request).await {
        Ok(Dispatch::Respond(response)) => response.into_response(),
        Ok(Dispatch::Passthrough) => match server.forward(forwarded).await {
            Ok(response) => (response.status, response.body).into_response(),
            Err(err) => {
                tracing::warn!(error = %err, "passthrough failed");
                StatusCode::BAD_GATEWAY.into_response()
            }
        },
        Err(err) => {
            tracing::warn!(error = %err, "unhandled request");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

impl IntoResponse for MockResponse {
    fn into_response(self) -> Response {
        match self.body {
            ResponseBody::Empty => self.status.into_response(),
            ResponseBody::Json(value) => (self.status, Json(value)).into_response(),
            ResponseBody::Text(text) => (self.status, text).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::mock_server::{make_server, Injection};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn app() -> Router {
        make_server(ServerConfig::test(), Injection::none()).router()
    }

    #[tokio::test]
    async fn test_router_dispatches_to_route_table() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/site_metadata")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["read_only"], false);
    }

    #[tokio::test]
    async fn test_unhandled_request_is_500() {
        let response = app()
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_passthrough_without_upstream_is_502() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/write-coverage")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_passthrough_is_forwarded_to_upstream() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, ResponseTemplate};

        let upstream = wiremock::MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/write-coverage"))
            .respond_with(ResponseTemplate::new(201).set_body_string("stored"))
            .expect(1)
            .mount(&upstream)
            .await;

        let fetcher = crate::fetch::HttpFetcher::new()
            .unwrap()
            .with_base_url(&upstream.uri())
            .unwrap();
        let app = make_server(ServerConfig::test(), Injection::none())
            .with_upstream(fetcher)
            .router();

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/write-coverage")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"stored");
    }

    #[tokio::test]
    async fn test_listen_and_shutdown() {
        let server = make_server(ServerConfig::test(), Injection::none())
            .listen()
            .await
            .unwrap();
        let url = server.url().to_string();

        let response = reqwest::get(format!("{url}/api/v1/site_metadata"))
            .await
            .unwrap();
        assert!(response.status().is_success());

        server.shutdown().await;
        assert!(reqwest::get(format!("{url}/api/v1/site_metadata"))
            .await
            .is_err());
    }
}
