//! Team endpoint handlers.

use serde_json::json;

use crate::mock_server::compose::RouteModule;
use crate::mock_server::route::{MockRequest, MockResponse};
use crate::mock_server::server::MockServer;
use crate::mock_server::state::MockState;

/// Team routes.
pub struct Teams;

impl RouteModule for Teams {
    fn name(&self) -> &'static str {
        "teams"
    }

    fn register(&self, server: &mut MockServer) {
        server.get("/api/v1/teams/:team_id", get_team);
    }
}

/// GET /api/v1/teams/{login}
pub fn get_team(db: &mut MockState, request: &MockRequest) -> MockResponse {
    match request
        .param("team_id")
        .and_then(|login| db.team_by_login(login))
    {
        Some(team) => MockResponse::ok(json!({ "team": team })),
        None => MockResponse::not_found(),
    }
}
