//! User endpoint handlers.

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

use super::require_session;
use crate::mock_server::compose::RouteModule;
use crate::mock_server::route::{MockRequest, MockResponse};
use crate::mock_server::server::MockServer;
use crate::mock_server::state::MockState;

/// User routes.
pub struct Users;

impl RouteModule for Users {
    fn name(&self) -> &'static str {
        "users"
    }

    fn register(&self, server: &mut MockServer) {
        server.get("/api/v1/users/:user_id", get_user);
        server.put("/api/v1/users/:user_id", update_user);
    }
}

#[derive(Debug, Deserialize)]
struct UserUpdateRequest {
    user: UserUpdate,
}

#[derive(Debug, Deserialize)]
struct UserUpdate {
    #[serde(default)]
    email: Option<String>,
}

/// GET /api/v1/users/{login}
pub fn get_user(db: &mut MockState, request: &MockRequest) -> MockResponse {
    match request
        .param("user_id")
        .and_then(|login| db.user_by_login(login))
    {
        Some(user) => MockResponse::ok(json!({ "user": user.public_view() })),
        None => MockResponse::not_found(),
    }
}

/// PUT /api/v1/users/{id}
///
/// Changes the e-mail address of the logged-in user. The new address starts
/// out unverified.
pub fn update_user(db: &mut MockState, request: &MockRequest) -> MockResponse {
    let user_id = match require_session(db) {
        Ok(id) => id,
        Err(response) => return response,
    };

    if request.param("user_id") != Some(user_id.to_string().as_str()) {
        return MockResponse::error(
            StatusCode::BAD_REQUEST,
            "current user does not match requested user",
        );
    }

    let email = request
        .json_body::<UserUpdateRequest>()
        .and_then(|body| body.user.email)
        .filter(|email| !email.is_empty());
    let Some(email) = email else {
        return MockResponse::error(StatusCode::BAD_REQUEST, "empty email rejected");
    };

    let token = format!("email-token-{}", db.next_id());
    if let Some(user) = db.users.get_mut(&user_id) {
        user.email = Some(email);
        user.email_verified = false;
        user.email_verification_sent = true;
        user.email_verification_token = Some(token);
    }
    MockResponse::ok(json!({ "ok": true }))
}
