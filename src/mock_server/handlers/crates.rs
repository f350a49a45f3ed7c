//! Crate endpoint handlers.

use std::cmp::Reverse;

use serde_json::json;

use super::{pagination, public_users, require_session};
use crate::mock_server::compose::RouteModule;
use crate::mock_server::route::{MockRequest, MockResponse};
use crate::mock_server::server::MockServer;
use crate::mock_server::state::{MockState, Owner};
use crate::models::{Category, Crate, Keyword, Team, Version};

/// Crate and version routes.
pub struct Crates;

impl RouteModule for Crates {
    fn name(&self) -> &'static str {
        "crates"
    }

    fn register(&self, server: &mut MockServer) {
        server.get("/api/v1/crates", list_crates);
        server.get("/api/v1/crates/:name", get_crate);
        // These must precede `:name/:version`, which would also match them.
        server.get("/api/v1/crates/:name/versions", list_versions);
        server.get("/api/v1/crates/:name/owner_user", list_owner_users);
        server.get("/api/v1/crates/:name/owner_team", list_owner_teams);
        server.get("/api/v1/crates/:name/following", get_following);
        server.get("/api/v1/crates/:name/:version", get_version);
        server.put("/api/v1/crates/:name/follow", follow);
        server.delete("/api/v1/crates/:name/follow", unfollow);
        server.delete("/api/v1/crates/:name/:version/yank", yank);
        server.put("/api/v1/crates/:name/:version/unyank", unyank);
    }
}

/// GET /api/v1/crates
///
/// Supports `q`, `letter`, `keyword`, `category`, `user_id`, `team_id`,
/// `following`, `sort`, `page` and `per_page`.
pub fn list_crates(db: &mut MockState, request: &MockRequest) -> MockResponse {
    let following_user = match request.query_param("following") {
        Some("1") | Some("true") => match require_session(db) {
            Ok(user_id) => Some(user_id),
            Err(response) => return response,
        },
        _ => None,
    };

    let owner = request
        .query_param("user_id")
        .and_then(|id| id.parse().ok())
        .map(Owner::User)
        .or_else(|| {
            request
                .query_param("team_id")
                .and_then(|id| id.parse().ok())
                .map(Owner::Team)
        });
    let owned = owner.map(|owner| db.crates_owned_by(owner));

    let query = request.query_param("q").map(str::to_lowercase);
    let letter = request.query_param("letter").map(str::to_lowercase);

    let mut crates: Vec<Crate> = db
        .crates
        .values()
        .filter(|c| {
            query
                .as_deref()
                .map(|q| c.name.to_lowercase().contains(q))
                .unwrap_or(true)
        })
        .filter(|c| {
            letter
                .as_deref()
                .map(|l| c.name.to_lowercase().starts_with(l))
                .unwrap_or(true)
        })
        .filter(|c| {
            request
                .query_param("keyword")
                .map(|k| c.keywords.iter().any(|kw| kw == k))
                .unwrap_or(true)
        })
        .filter(|c| {
            request
                .query_param("category")
                .map(|cat| c.categories.iter().any(|slug| slug == cat))
                .unwrap_or(true)
        })
        .filter(|c| owned.as_ref().map(|o| o.contains(&c.name)).unwrap_or(true))
        .filter(|c| {
            following_user
                .map(|user_id| db.is_following(user_id, &c.name))
                .unwrap_or(true)
        })
        .map(|c| db.crate_view(c))
        .collect();

    match request.query_param("sort") {
        Some("downloads") => crates.sort_by_key(|c| Reverse(c.downloads)),
        Some("recent-downloads") => crates.sort_by_key(|c| Reverse(c.recent_downloads)),
        Some("new") => crates.sort_by_key(|c| Reverse(c.created_at)),
        Some("recent-updates") => crates.sort_by_key(|c| Reverse(c.updated_at)),
        // Already alphabetical.
        _ => {}
    }

    let page = pagination(request).paginate(crates);
    MockResponse::ok(json!({ "crates": page.items, "meta": page.meta() }))
}

fn find_crate<'a>(db: &'a MockState, request: &MockRequest) -> Option<&'a Crate> {
    request.param("name").and_then(|name| db.get_crate(name))
}

/// GET /api/v1/crates/{name}
pub fn get_crate(db: &mut MockState, request: &MockRequest) -> MockResponse {
    let Some(krate) = find_crate(db, request) else {
        return MockResponse::not_found();
    };

    let versions: Vec<&Version> = db.versions_of(&krate.name);
    let keywords: Vec<Keyword> = krate
        .keywords
        .iter()
        .filter_map(|k| db.keywords.get(k))
        .map(|k| db.keyword_view(k))
        .collect();
    let categories: Vec<Category> = krate
        .categories
        .iter()
        .filter_map(|slug| db.categories.get(slug))
        .map(|c| db.category_view(c))
        .collect();

    MockResponse::ok(json!({
        "crate": db.crate_view(krate),
        "versions": versions,
        "keywords": keywords,
        "categories": categories,
    }))
}

/// GET /api/v1/crates/{name}/versions
pub fn list_versions(db: &mut MockState, request: &MockRequest) -> MockResponse {
    let Some(krate) = find_crate(db, request) else {
        return MockResponse::not_found();
    };

    let versions = db.versions_of(&krate.name);
    MockResponse::ok(json!({ "versions": versions, "meta": { "total": versions.len() } }))
}

/// GET /api/v1/crates/{name}/{version}
pub fn get_version(db: &mut MockState, request: &MockRequest) -> MockResponse {
    let Some(krate) = find_crate(db, request) else {
        return MockResponse::not_found();
    };

    let num = request.param("version").unwrap_or_default();
    match db.versions_of(&krate.name).into_iter().find(|v| v.num == num) {
        Some(version) => MockResponse::ok(json!({ "version": version })),
        None => MockResponse::not_found(),
    }
}

/// GET /api/v1/crates/{name}/owner_user
pub fn list_owner_users(db: &mut MockState, request: &MockRequest) -> MockResponse {
    let Some(krate) = find_crate(db, request) else {
        return MockResponse::not_found();
    };

    let users = db.owners_of(&krate.name).filter_map(|owner| match owner {
        Owner::User(id) => db.users.get(&id),
        Owner::Team(_) => None,
    });
    MockResponse::ok(json!({ "users": public_users(users) }))
}

/// GET /api/v1/crates/{name}/owner_team
pub fn list_owner_teams(db: &mut MockState, request: &MockRequest) -> MockResponse {
    let Some(krate) = find_crate(db, request) else {
        return MockResponse::not_found();
    };

    let teams: Vec<&Team> = db
        .owners_of(&krate.name)
        .filter_map(|owner| match owner {
            Owner::Team(id) => db.teams.get(&id),
            Owner::User(_) => None,
        })
        .collect();
    MockResponse::ok(json!({ "teams": teams }))
}

/// GET /api/v1/crates/{name}/following
pub fn get_following(db: &mut MockState, request: &MockRequest) -> MockResponse {
    let user_id = match require_session(db) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let Some(krate) = find_crate(db, request) else {
        return MockResponse::not_found();
    };

    MockResponse::ok(json!({ "following": db.is_following(user_id, &krate.name) }))
}

/// PUT /api/v1/crates/{name}/follow
pub fn follow(db: &mut MockState, request: &MockRequest) -> MockResponse {
    set_following(db, request, true)
}

/// DELETE /api/v1/crates/{name}/follow
pub fn unfollow(db: &mut MockState, request: &MockRequest) -> MockResponse {
    set_following(db, request, false)
}

fn set_following(db: &mut MockState, request: &MockRequest, following: bool) -> MockResponse {
    let user_id = match require_session(db) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let Some(name) = find_crate(db, request).map(|c| c.name.clone()) else {
        return MockResponse::not_found();
    };

    if following {
        db.follows.insert((user_id, name));
    } else {
        db.follows.remove(&(user_id, name));
    }
    MockResponse::ok(json!({ "ok": true }))
}

/// DELETE /api/v1/crates/{name}/{version}/yank
pub fn yank(db: &mut MockState, request: &MockRequest) -> MockResponse {
    set_yanked(db, request, true)
}

/// PUT /api/v1/crates/{name}/{version}/unyank
pub fn unyank(db: &mut MockState, request: &MockRequest) -> MockResponse {
    set_yanked(db, request, false)
}

fn set_yanked(db: &mut MockState, request: &MockRequest, yanked: bool) -> MockResponse {
    if let Err(response) = require_session(db) {
        return response;
    }

    let name = request.param("name").unwrap_or_default();
    let num = request.param("version").unwrap_or_default();
    match db.find_version_mut(name, num) {
        Some(version) => {
            version.yanked = yanked;
            MockResponse::ok(json!({ "ok": true }))
        }
        None => MockResponse::not_found(),
    }
}
