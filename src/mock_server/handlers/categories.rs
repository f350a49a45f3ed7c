//! Category endpoint handlers.

use serde_json::json;

use super::pagination;
use crate::mock_server::compose::RouteModule;
use crate::mock_server::route::{MockRequest, MockResponse};
use crate::mock_server::server::MockServer;
use crate::mock_server::state::MockState;
use crate::models::Category;

/// Category routes.
pub struct Categories;

impl RouteModule for Categories {
    fn name(&self) -> &'static str {
        "categories"
    }

    fn register(&self, server: &mut MockServer) {
        server.get("/api/v1/categories", list_categories);
        server.get("/api/v1/categories/:category_id", get_category);
        server.get("/api/v1/category_slugs", list_category_slugs);
    }
}

/// GET /api/v1/categories
pub fn list_categories(db: &mut MockState, request: &MockRequest) -> MockResponse {
    let categories: Vec<Category> = db
        .categories
        .values()
        .map(|category| db.category_view(category))
        .collect();

    let page = pagination(request).paginate(categories);
    MockResponse::ok(json!({ "categories": page.items, "meta": page.meta() }))
}

/// GET /api/v1/categories/{category_id}
pub fn get_category(db: &mut MockState, request: &MockRequest) -> MockResponse {
    match request
        .param("category_id")
        .and_then(|slug| db.categories.get(slug))
    {
        Some(category) => MockResponse::ok(json!({ "category": db.category_view(category) })),
        None => MockResponse::not_found(),
    }
}

/// GET /api/v1/category_slugs
pub fn list_category_slugs(db: &mut MockState, _request: &MockRequest) -> MockResponse {
    let slugs: Vec<_> = db
        .categories
        .values()
        .map(|c| json!({ "id": c.id, "slug": c.slug, "description": c.description }))
        .collect();

    MockResponse::ok(json!({ "category_slugs": slugs }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_server::Fixtures;

    #[test]
    fn test_list_categories_paginates() {
        let mut db = MockState::new()
            .with_category(Fixtures::category("a", "A"))
            .with_category(Fixtures::category("b", "B"))
            .with_category(Fixtures::category("c", "C"));

        let request = MockRequest::get("/api/v1/categories?per_page=2").unwrap();
        let response = list_categories(&mut db, &request);
        let body = response.json_body().unwrap();

        assert_eq!(body["categories"].as_array().unwrap().len(), 2);
        assert_eq!(body["meta"]["total"], 3);
    }

    #[test]
    fn test_get_unknown_category() {
        let mut db = MockState::new();
        let mut request = MockRequest::get("/api/v1/categories/nope").unwrap();
        request.params.insert("category_id".to_string(), "nope".to_string());

        assert_eq!(get_category(&mut db, &request), MockResponse::not_found());
    }
}
