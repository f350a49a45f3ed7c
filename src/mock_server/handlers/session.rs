//! GitHub OAuth session endpoints.
//!
//! The OAuth dance is faked: `begin` hands out a fixed state secret and
//! `authorize` logs in whichever user's login is passed as `code`.

use reqwest::StatusCode;
use serde_json::json;

use super::me_payload;
use crate::mock_server::compose::RouteModule;
use crate::mock_server::route::{MockRequest, MockResponse};
use crate::mock_server::server::MockServer;
use crate::mock_server::state::MockState;

/// State secret handed out by `begin` and expected by `authorize`.
pub const STATE_SECRET: &str = "state-secret";

/// Session routes.
pub struct Session;

impl RouteModule for Session {
    fn name(&self) -> &'static str {
        "session"
    }

    fn register(&self, server: &mut MockServer) {
        server.get("/api/private/session/begin", begin);
        server.get("/api/private/session/authorize", authorize);
        server.delete("/api/private/session", logout);
    }
}

/// GET /api/private/session/begin
pub fn begin(_db: &mut MockState, _request: &MockRequest) -> MockResponse {
    MockResponse::ok(json!({
        "url": "url-to-github-including-state-secret",
        "state": STATE_SECRET,
    }))
}

/// GET /api/private/session/authorize?code={login}&state={secret}
pub fn authorize(db: &mut MockState, request: &MockRequest) -> MockResponse {
    if request.query_param("state") != Some(STATE_SECRET) {
        return MockResponse::error(StatusCode::BAD_REQUEST, "invalid state parameter");
    }

    let user = request
        .query_param("code")
        .and_then(|login| db.user_by_login(login));
    let Some(user) = user else {
        return MockResponse::error(StatusCode::FORBIDDEN, "Authentication failed");
    };

    let (user_id, payload) = (user.id, me_payload(db, user));
    db.session_user = Some(user_id);
    MockResponse::ok(payload)
}

/// DELETE /api/private/session
pub fn logout(db: &mut MockState, _request: &MockRequest) -> MockResponse {
    db.session_user = None;
    MockResponse::ok(json!({ "ok": true }))
}
