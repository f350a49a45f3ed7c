//! Error types for mock server and docs.rs operations.

use reqwest::{Method, StatusCode};
use thiserror::Error;

/// Errors that can occur while dispatching or fetching requests.
#[derive(Debug, Error)]
pub enum MockError {
    /// No registered rule claims the request.
    ///
    /// This usually means a test is missing a fixture or route.
    #[error("mock server has no route for {method} {url}")]
    Unhandled { method: Method, url: String },

    /// The matching rule passes the request through to the real network,
    /// which the caller cannot do.
    #[error("request to {url} is a passthrough and was not intercepted")]
    Passthrough { url: String },

    /// Required data came back with an error status.
    #[error("{url} answered {status}")]
    Status { status: StatusCode, url: String },

    /// Request target could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Socket error while binding or serving.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for mock server operations.
pub type Result<T> = core::result::Result<T, MockError>;
