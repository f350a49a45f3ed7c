//! Deployment metadata.

use serde_json::json;

use crate::mock_server::compose::RouteModule;
use crate::mock_server::route::{MockRequest, MockResponse};
use crate::mock_server::server::MockServer;
use crate::mock_server::state::MockState;

/// Commit the mock claims to be deployed from.
pub const DEPLOYED_SHA: &str = "5048d31943118c6d67359bd207d307c854e82f45";

/// Site metadata route.
pub struct Metadata;

impl RouteModule for Metadata {
    fn name(&self) -> &'static str {
        "metadata"
    }

    fn register(&self, server: &mut MockServer) {
        server.get("/api/v1/site_metadata", site_metadata);
    }
}

/// GET /api/v1/site_metadata
pub fn site_metadata(_db: &mut MockState, _request: &MockRequest) -> MockResponse {
    MockResponse::ok(json!({
        "deployed_sha": DEPLOYED_SHA,
        "commit": DEPLOYED_SHA,
        "read_only": false,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_metadata() {
        let mut db = MockState::new();
        let request = MockRequest::get("/api/v1/site_metadata").unwrap();
        let response = site_metadata(&mut db, &request);
        let body = response.json_body().unwrap();

        assert_eq!(body["deployed_sha"], DEPLOYED_SHA);
        assert_eq!(body["read_only"], false);
    }
}
