//! Crate owner invitation endpoint handlers.

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

use super::{public_users, require_session};
use crate::mock_server::compose::RouteModule;
use crate::mock_server::route::{MockRequest, MockResponse};
use crate::mock_server::server::MockServer;
use crate::mock_server::state::{MockState, Owner};
use crate::models::CrateOwnerInvitation;

/// Invitation routes.
pub struct Invites;

impl RouteModule for Invites {
    fn name(&self) -> &'static str {
        "invites"
    }

    fn register(&self, server: &mut MockServer) {
        server.get("/api/v1/me/crate_owner_invitations", list_invitations);
        // Must precede `:crate_id`, which would also match it.
        server.put(
            "/api/v1/me/crate_owner_invitations/accept/:token",
            accept_by_token,
        );
        server.put("/api/v1/me/crate_owner_invitations/:crate_id", respond_to_invitation);
    }
}

/// Body of an invitation response.
#[derive(Debug, Deserialize)]
struct InvitationReply {
    crate_owner_invite: InvitationDecision,
}

#[derive(Debug, Deserialize)]
struct InvitationDecision {
    accepted: bool,
}

/// GET /api/v1/me/crate_owner_invitations
pub fn list_invitations(db: &mut MockState, _request: &MockRequest) -> MockResponse {
    let user_id = match require_session(db) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let invitations: Vec<&CrateOwnerInvitation> = db
        .invitations
        .iter()
        .filter(|i| i.invitee_id == user_id)
        .collect();
    let inviters = invitations
        .iter()
        .filter_map(|i| db.users.get(&i.inviter_id));

    MockResponse::ok(json!({
        "crate_owner_invitations": invitations,
        "users": public_users(inviters),
    }))
}

/// Remove the invitation at `index` and, if accepted, grant ownership.
fn resolve(db: &mut MockState, index: usize, accepted: bool) -> MockResponse {
    let invitation = db.invitations.remove(index);
    if accepted {
        db.ownerships
            .insert((invitation.crate_name.clone(), Owner::User(invitation.invitee_id)));
    }
    MockResponse::ok(json!({
        "crate_owner_invitation": { "crate_id": invitation.crate_id, "accepted": accepted }
    }))
}

/// PUT /api/v1/me/crate_owner_invitations/accept/{token}
///
/// Used by the e-mail link, so no session is needed.
pub fn accept_by_token(db: &mut MockState, request: &MockRequest) -> MockResponse {
    let token = request.param("token").unwrap_or_default();
    match db.invitations.iter().position(|i| i.token == token) {
        Some(index) => resolve(db, index, true),
        None => MockResponse::not_found(),
    }
}

/// PUT /api/v1/me/crate_owner_invitations/{crate_id}
pub fn respond_to_invitation(db: &mut MockState, request: &MockRequest) -> MockResponse {
    let user_id = match require_session(db) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let Some(reply) = request.json_body::<InvitationReply>() else {
        return MockResponse::error(StatusCode::BAD_REQUEST, "invalid json request");
    };

    let crate_id = request.param("crate_id").unwrap_or_default();
    match db
        .invitations
        .iter()
        .position(|i| i.crate_id == crate_id && i.invitee_id == user_id)
    {
        Some(index) => resolve(db, index, reply.crate_owner_invite.accepted),
        None => MockResponse::not_found(),
    }
}
