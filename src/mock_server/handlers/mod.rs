//! Route handler modules, one per resource domain.
//!
//! Each module is a unit struct implementing
//! [`RouteModule`](super::compose::RouteModule) and installs its own rules.

pub mod categories;
pub mod crates;
pub mod docs_rs;
pub mod invites;
pub mod keywords;
pub mod me;
pub mod metadata;
pub mod session;
pub mod summary;
pub mod teams;
pub mod users;

pub use categories::Categories;
pub use crates::Crates;
pub use docs_rs::DocsRs;
pub use invites::Invites;
pub use keywords::Keywords;
pub use me::Me;
pub use metadata::Metadata;
pub use session::Session;
pub use summary::Summary;
pub use teams::Teams;
pub use users::Users;

use serde_json::{json, Value};

use super::route::{MockRequest, MockResponse};
use super::state::MockState;
use crate::models::User;
use crate::pagination::PaginationParams;

/// Pagination requested by the query string.
fn pagination(request: &MockRequest) -> PaginationParams {
    PaginationParams::from_query(request.query_param("page"), request.query_param("per_page"))
}

/// The logged-in user's ID, or the 403 response to return.
fn require_session(db: &MockState) -> Result<u64, MockResponse> {
    db.current_user()
        .map(|user| user.id)
        .ok_or_else(MockResponse::forbidden)
}

/// Public views of the given users.
fn public_users<'a>(users: impl IntoIterator<Item = &'a User>) -> Vec<User> {
    users.into_iter().map(User::public_view).collect()
}

/// The `/me` payload for `user`.
fn me_payload(db: &MockState, user: &User) -> Value {
    let owned_crates: Vec<Value> = db
        .crates_owned_by(super::state::Owner::User(user.id))
        .into_iter()
        .map(|name| json!({ "id": name, "name": name, "email_notifications": true }))
        .collect();

    json!({ "user": user, "owned_crates": owned_crates })
}
