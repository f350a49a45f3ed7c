//! Mock server state management.
//!
//! Provides the in-memory registry database route handlers read and write.
//! Collections are ordered so list endpoints answer deterministically.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::{
    max_version, newest_version, ApiToken, Category, Crate, CrateOwnerInvitation, Keyword, Team,
    User, Version,
};

/// A crate owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Owner {
    User(u64),
    Team(u64),
}

/// Shared state for the mock server.
///
/// Wrapped in `Arc<RwLock<_>>` by the server; handlers get `&mut MockState`.
#[derive(Debug, Default)]
pub struct MockState {
    /// Crates indexed by name.
    pub crates: BTreeMap<String, Crate>,

    /// Versions indexed by ID.
    pub versions: BTreeMap<u64, Version>,

    /// Users indexed by ID.
    pub users: BTreeMap<u64, User>,

    /// Teams indexed by ID.
    pub teams: BTreeMap<u64, Team>,

    /// Categories indexed by slug.
    pub categories: BTreeMap<String, Category>,

    /// Keywords indexed by keyword.
    pub keywords: BTreeMap<String, Keyword>,

    /// `(crate name, owner)` pairs.
    pub ownerships: BTreeSet<(String, Owner)>,

    /// Pending owner invitations.
    pub invitations: Vec<CrateOwnerInvitation>,

    /// API tokens indexed by ID.
    pub api_tokens: BTreeMap<u64, ApiToken>,

    /// `(user id, crate name)` pairs.
    pub follows: BTreeSet<(u64, String)>,

    /// The logged-in user, if any.
    pub session_user: Option<u64>,

    next_id: u64,
}

impl MockState {
    /// Create a new empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state wrapped in Arc<RwLock> for sharing.
    pub fn shared(self) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(self))
    }

    /// Allocate an ID for a new record.
    pub fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Add a crate to the state.
    pub fn with_crate(mut self, krate: Crate) -> Self {
        self.insert_crate(krate);
        self
    }

    /// Add a version to the state.
    pub fn with_version(mut self, version: Version) -> Self {
        self.insert_version(version);
        self
    }

    /// Add a user to the state.
    pub fn with_user(mut self, user: User) -> Self {
        self.insert_user(user);
        self
    }

    /// Add a team to the state.
    pub fn with_team(mut self, team: Team) -> Self {
        self.insert_team(team);
        self
    }

    /// Add a category to the state.
    pub fn with_category(mut self, category: Category) -> Self {
        self.categories.insert(category.slug.clone(), category);
        self
    }

    /// Add a keyword to the state.
    pub fn with_keyword(mut self, keyword: Keyword) -> Self {
        self.keywords.insert(keyword.keyword.clone(), keyword);
        self
    }

    /// Make `owner` an owner of `crate_name`.
    pub fn with_owner(mut self, crate_name: &str, owner: Owner) -> Self {
        self.ownerships.insert((crate_name.to_string(), owner));
        self
    }

    /// Log `user_id` in.
    pub fn with_session(mut self, user_id: u64) -> Self {
        self.session_user = Some(user_id);
        self
    }

    /// Insert or replace a crate.
    pub fn insert_crate(&mut self, krate: Crate) {
        self.crates.insert(krate.name.clone(), krate);
    }

    /// Insert or replace a version. A zero ID is replaced by a fresh one.
    pub fn insert_version(&mut self, mut version: Version) -> u64 {
        if version.id == 0 {
            version.id = self.next_id();
        }
        self.bump_next_id(version.id);
        let id = version.id;
        self.versions.insert(id, version);
        id
    }

    /// Insert or replace a user. A zero ID is replaced by a fresh one.
    pub fn insert_user(&mut self, mut user: User) -> u64 {
        if user.id == 0 {
            user.id = self.next_id();
        }
        self.bump_next_id(user.id);
        let id = user.id;
        self.users.insert(id, user);
        id
    }

    /// Insert or replace a team. A zero ID is replaced by a fresh one.
    pub fn insert_team(&mut self, mut team: Team) -> u64 {
        if team.id == 0 {
            team.id = self.next_id();
        }
        self.bump_next_id(team.id);
        let id = team.id;
        self.teams.insert(id, team);
        id
    }

    fn bump_next_id(&mut self, used: u64) {
        self.next_id = self.next_id.max(used);
    }

    /// The logged-in user.
    pub fn current_user(&self) -> Option<&User> {
        self.session_user.and_then(|id| self.users.get(&id))
    }

    /// Get a crate by name.
    pub fn get_crate(&self, name: &str) -> Option<&Crate> {
        self.crates.get(name)
    }

    /// Get a user by login.
    pub fn user_by_login(&self, login: &str) -> Option<&User> {
        self.users.values().find(|u| u.login == login)
    }

    /// Get a team by login.
    pub fn team_by_login(&self, login: &str) -> Option<&Team> {
        self.teams.values().find(|t| t.login == login)
    }

    /// Versions of a crate, newest first.
    pub fn versions_of(&self, crate_name: &str) -> Vec<&Version> {
        let mut versions: Vec<&Version> = self
            .versions
            .values()
            .filter(|v| v.crate_name == crate_name)
            .collect();
        versions.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        versions
    }

    /// Find a version of a crate by number.
    pub fn find_version_mut(&mut self, crate_name: &str, num: &str) -> Option<&mut Version> {
        self.versions
            .values_mut()
            .find(|v| v.crate_name == crate_name && v.num == num)
    }

    /// The crate as served: with `max_version` and `newest_version` filled in.
    pub fn crate_view(&self, krate: &Crate) -> Crate {
        let versions = self.versions_of(&krate.name);
        Crate {
            max_version: max_version(versions.iter().copied()).map(|v| v.num.clone()),
            newest_version: newest_version(versions.iter().copied()).map(|v| v.num.clone()),
            ..krate.clone()
        }
    }

    /// Owners of a crate.
    pub fn owners_of<'a>(&'a self, crate_name: &'a str) -> impl Iterator<Item = Owner> + 'a {
        self.ownerships
            .iter()
            .filter(move |(name, _)| name == crate_name)
            .map(|(_, owner)| *owner)
    }

    /// Names of crates `owner` owns.
    pub fn crates_owned_by(&self, owner: Owner) -> Vec<String> {
        self.ownerships
            .iter()
            .filter(|(_, o)| *o == owner)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Whether `user_id` follows `crate_name`.
    pub fn is_following(&self, user_id: u64, crate_name: &str) -> bool {
        self.follows.contains(&(user_id, crate_name.to_string()))
    }

    /// Category with `crates_cnt` filled in.
    pub fn category_view(&self, category: &Category) -> Category {
        let count = self
            .crates
            .values()
            .filter(|c| c.categories.contains(&category.slug))
            .count();
        Category {
            crates_cnt: count as u64,
            ..category.clone()
        }
    }

    /// Keyword with `crates_cnt` filled in.
    pub fn keyword_view(&self, keyword: &Keyword) -> Keyword {
        let count = self
            .crates
            .values()
            .filter(|c| c.keywords.contains(&keyword.keyword))
            .count();
        Keyword {
            crates_cnt: count as u64,
            ..keyword.clone()
        }
    }
}
