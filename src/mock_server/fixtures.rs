//! Test data fixtures for the mock server.
//!
//! Provides factory functions for creating realistic registry records.

use chrono::{DateTime, TimeZone, Utc};

use super::state::{MockState, Owner};
use crate::models::{ApiToken, Category, Crate, CrateOwnerInvitation, Keyword, Team, User, Version};

/// Collection of fixture factories for test data.
pub struct Fixtures;

impl Fixtures {
    /// Fixed timestamp every fixture is created at.
    pub fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2017, 2, 24, 12, 34, 56)
            .single()
            .unwrap_or_default()
    }

    // =========================================================================
    // Crate Fixtures
    // =========================================================================

    /// Create a crate with required fields only.
    pub fn krate(name: &str) -> Crate {
        Crate {
            id: name.to_string(),
            name: name.to_string(),
            description: None,
            documentation: None,
            homepage: None,
            repository: None,
            downloads: 0,
            recent_downloads: 0,
            created_at: Self::timestamp(),
            updated_at: Self::timestamp(),
            keywords: vec![],
            categories: vec![],
            max_version: None,
            newest_version: None,
        }
    }

    /// Create a crate with a documentation URL.
    pub fn documented_crate(name: &str, documentation: &str) -> Crate {
        Crate {
            documentation: Some(documentation.to_string()),
            ..Self::krate(name)
        }
    }

    /// Create a version. The ID is allocated when it is inserted.
    pub fn version(crate_name: &str, num: &str) -> Version {
        Version {
            id: 0,
            crate_name: crate_name.to_string(),
            num: num.to_string(),
            yanked: false,
            downloads: 0,
            license: Some("MIT/Apache-2.0".to_string()),
            crate_size: Some(162_963),
            created_at: Self::timestamp(),
            updated_at: Self::timestamp(),
        }
    }

    // =========================================================================
    // User Fixtures
    // =========================================================================

    /// Create a user.
    pub fn user(id: u64, login: &str) -> User {
        User {
            id,
            login: login.to_string(),
            name: Some(login.to_string()),
            avatar: Some(format!("https://avatars.githubusercontent.com/u/{id}?v=4")),
            url: Some(format!("https://github.com/{login}")),
            kind: "user".to_string(),
            email: Some(format!("{login}@crates.io")),
            email_verified: true,
            email_verification_sent: true,
            email_verification_token: None,
        }
    }

    /// Create a team. `login` looks like "github:org:team".
    pub fn team(id: u64, login: &str) -> Team {
        let org = login.split(':').nth(1).unwrap_or(login);
        Team {
            id,
            login: login.to_string(),
            name: login.rsplit(':').next().map(str::to_string),
            avatar: None,
            url: Some(format!("https://github.com/{org}")),
            kind: "team".to_string(),
        }
    }

    /// Create an API token.
    pub fn api_token(id: u64, user_id: u64, name: &str) -> ApiToken {
        ApiToken {
            id,
            user_id,
            name: name.to_string(),
            created_at: Self::timestamp(),
            last_used_at: None,
            token: None,
        }
    }

    /// Create an owner invitation.
    pub fn invitation(crate_name: &str, invitee: &User, inviter: &User, token: &str) -> CrateOwnerInvitation {
        CrateOwnerInvitation {
            crate_name: crate_name.to_string(),
            crate_id: crate_name.to_string(),
            invitee_id: invitee.id,
            inviter_id: inviter.id,
            invited_by_username: inviter.login.clone(),
            created_at: Self::timestamp(),
            token: token.to_string(),
        }
    }

    // =========================================================================
    // Taxonomy Fixtures
    // =========================================================================

    /// Create a category.
    pub fn category(slug: &str, name: &str) -> Category {
        Category {
            id: slug.to_string(),
            category: name.to_string(),
            slug: slug.to_string(),
            description: format!("Crates for {}", name.to_lowercase()),
            crates_cnt: 0,
            created_at: Self::timestamp(),
        }
    }

    /// Create a keyword.
    pub fn keyword(keyword: &str) -> Keyword {
        Keyword {
            id: keyword.to_string(),
            keyword: keyword.to_string(),
            crates_cnt: 0,
            created_at: Self::timestamp(),
        }
    }

    // =========================================================================
    // Scenario Builders
    // =========================================================================

    /// A small registry: two users, one team, a few crates and versions.
    pub fn default_scenario() -> MockState {
        let alice = Self::user(1, "alice");
        let bob = Self::user(2, "bob");

        let mut serde = Self::documented_crate("serde", "https://docs.rs/serde/1.0.0");
        serde.description = Some("A generic serialization/deserialization framework".to_string());
        serde.downloads = 200_000_000;
        serde.recent_downloads = 30_000_000;
        serde.keywords = vec!["serde".to_string(), "serialization".to_string()];
        serde.categories = vec!["encoding".to_string()];

        let mut clap = Self::krate("clap");
        clap.description = Some("A simple to use, efficient, and full-featured CLI parser".to_string());
        clap.downloads = 150_000_000;
        clap.recent_downloads = 25_000_000;
        clap.keywords = vec!["argument".to_string(), "cli".to_string()];
        clap.categories = vec!["command-line-interface".to_string()];

        let mut foo = Self::documented_crate("foo", "https://foo.io/docs");
        foo.description = Some("An example crate".to_string());
        foo.downloads = 42;

        let mut state = MockState::new()
            .with_crate(serde)
            .with_crate(clap)
            .with_crate(foo)
            .with_category(Self::category("encoding", "Encoding"))
            .with_category(Self::category(
                "command-line-interface",
                "Command-line interface",
            ))
            .with_keyword(Self::keyword("serde"))
            .with_keyword(Self::keyword("serialization"))
            .with_keyword(Self::keyword("argument"))
            .with_keyword(Self::keyword("cli"))
            .with_team(Self::team(3, "github:rust-lang:core"))
            .with_owner("serde", Owner::User(alice.id))
            .with_owner("clap", Owner::User(bob.id))
            .with_owner("clap", Owner::Team(3))
            .with_owner("foo", Owner::User(alice.id));

        state.invitations.push(Self::invitation("clap", &alice, &bob, "clap-invite"));
        state.insert_user(alice);
        state.insert_user(bob);

        for (name, num) in [
            ("serde", "0.9.0"),
            ("serde", "1.0.0"),
            ("clap", "3.2.0"),
            ("clap", "4.0.0"),
            ("foo", "0.6.2"),
            ("foo", "1.0.0"),
        ] {
            state.insert_version(Self::version(name, num));
        }

        state
    }
}
