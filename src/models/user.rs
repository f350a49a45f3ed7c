//! Users, teams, tokens and ownership invitations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registry user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,

    /// GitHub login.
    pub login: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub avatar: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    /// Always "user".
    pub kind: String,

    /// Only served to the user themselves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default)]
    pub email_verified: bool,

    #[serde(default)]
    pub email_verification_sent: bool,

    /// Pending e-mail confirmation token.
    #[serde(skip)]
    pub email_verification_token: Option<String>,
}

impl User {
    /// The view of this user served to other users.
    pub fn public_view(&self) -> Self {
        Self {
            email: None,
            email_verified: false,
            email_verification_sent: false,
            ..self.clone()
        }
    }
}

/// A GitHub team that can own crates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: u64,

    /// Team login, e.g. "github:rust-lang:core".
    pub login: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub avatar: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    /// Always "team".
    pub kind: String,
}

/// An API token belonging to a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiToken {
    pub id: u64,

    #[serde(skip)]
    pub user_id: u64,

    pub name: String,

    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub last_used_at: Option<DateTime<Utc>>,

    /// Plaintext token; only served once, right after creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// A pending invitation to become a crate owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrateOwnerInvitation {
    /// Name of the crate.
    pub crate_name: String,

    /// The crate ID (the registry uses the name).
    pub crate_id: String,

    pub invitee_id: u64,

    pub inviter_id: u64,

    pub invited_by_username: String,

    pub created_at: DateTime<Utc>,

    /// Secret used by the e-mail acceptance link.
    #[serde(skip)]
    pub token: String,
}
