//! docs.rs build status, served cross-origin.

use reqwest::{Method, StatusCode};

use crate::mock_server::compose::RouteModule;
use crate::mock_server::route::MockResponse;
use crate::mock_server::server::MockServer;

/// Pattern of the per-version build status endpoint on docs.rs.
pub const DOCS_RS_STATUS: &str = "https://docs.rs/crate/:crate/:version/status.json";

/// docs.rs routes.
///
/// By default no crate has a docs.rs build; tests that need one override
/// [`DOCS_RS_STATUS`] with a status payload.
pub struct DocsRs;

impl RouteModule for DocsRs {
    fn name(&self) -> &'static str {
        "docs-rs"
    }

    fn register(&self, server: &mut MockServer) {
        server.respond(
            Method::GET,
            DOCS_RS_STATUS,
            MockResponse::text(StatusCode::NOT_FOUND, "not found"),
        );
    }
}
