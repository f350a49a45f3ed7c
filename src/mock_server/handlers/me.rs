//! Endpoints for the logged-in user.

use chrono::Utc;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

use super::{me_payload, pagination, require_session};
use crate::mock_server::compose::RouteModule;
use crate::mock_server::route::{MockRequest, MockResponse};
use crate::mock_server::server::MockServer;
use crate::mock_server::state::MockState;
use crate::models::{ApiToken, Version};

/// Current-user routes.
pub struct Me;

impl RouteModule for Me {
    fn name(&self) -> &'static str {
        "me"
    }

    fn register(&self, server: &mut MockServer) {
        server.get("/api/v1/me", get_me);
        server.get("/api/v1/me/updates", list_updates);
        server.get("/api/v1/me/tokens", list_tokens);
        server.put("/api/v1/me/tokens", create_token);
        server.delete("/api/v1/me/tokens/:token_id", revoke_token);
        server.put("/api/v1/confirm/:email_token", confirm_email);
    }
}

/// Body of a token creation request.
#[derive(Debug, Deserialize)]
struct NewTokenRequest {
    api_token: NewToken,
}

#[derive(Debug, Deserialize)]
struct NewToken {
    #[serde(default)]
    name: Option<String>,
}

/// GET /api/v1/me
pub fn get_me(db: &mut MockState, _request: &MockRequest) -> MockResponse {
    match db.current_user() {
        Some(user) => MockResponse::ok(me_payload(db, user)),
        None => MockResponse::forbidden(),
    }
}

/// GET /api/v1/me/updates
///
/// Versions of followed crates, newest first.
pub fn list_updates(db: &mut MockState, request: &MockRequest) -> MockResponse {
    let user_id = match require_session(db) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let mut versions: Vec<&Version> = db
        .versions
        .values()
        .filter(|v| db.is_following(user_id, &v.crate_name))
        .collect();
    versions.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

    let page = pagination(request).paginate(versions);
    MockResponse::ok(json!({ "versions": page.items, "meta": { "more": page.has_more() } }))
}

/// GET /api/v1/me/tokens
pub fn list_tokens(db: &mut MockState, _request: &MockRequest) -> MockResponse {
    let user_id = match require_session(db) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let tokens: Vec<&ApiToken> = db
        .api_tokens
        .values()
        .filter(|t| t.user_id == user_id)
        .collect();
    MockResponse::ok(json!({ "api_tokens": tokens }))
}

/// PUT /api/v1/me/tokens
///
/// The plaintext token is only part of this response.
pub fn create_token(db: &mut MockState, request: &MockRequest) -> MockResponse {
    let user_id = match require_session(db) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let name = request
        .json_body::<NewTokenRequest>()
        .and_then(|body| body.api_token.name)
        .filter(|name| !name.trim().is_empty());
    let Some(name) = name else {
        return MockResponse::error(StatusCode::BAD_REQUEST, "name must have a value");
    };

    let id = db.next_id();
    let token = ApiToken {
        id,
        user_id,
        name,
        created_at: Utc::now(),
        last_used_at: None,
        token: None,
    };
    db.api_tokens.insert(id, token.clone());

    let created = ApiToken {
        token: Some(format!("cio{id:032}")),
        ..token
    };
    MockResponse::ok(json!({ "api_token": created }))
}

/// DELETE /api/v1/me/tokens/{token_id}
pub fn revoke_token(db: &mut MockState, request: &MockRequest) -> MockResponse {
    let user_id = match require_session(db) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let token_id = request.param("token_id").and_then(|id| id.parse::<u64>().ok());
    if let Some(id) = token_id {
        if db.api_tokens.get(&id).is_some_and(|t| t.user_id == user_id) {
            db.api_tokens.remove(&id);
        }
    }
    MockResponse::ok(json!({}))
}

/// PUT /api/v1/confirm/{email_token}
pub fn confirm_email(db: &mut MockState, request: &MockRequest) -> MockResponse {
    let token = request.param("email_token").unwrap_or_default();
    let user = db
        .users
        .values_mut()
        .find(|u| u.email_verification_token.as_deref() == Some(token));

    match user {
        Some(user) => {
            user.email_verified = true;
            user.email_verification_token = None;
            MockResponse::ok(json!({ "ok": true }))
        }
        None => MockResponse::error(
            StatusCode::BAD_REQUEST,
            "Email belonging to token not found.",
        ),
    }
}
