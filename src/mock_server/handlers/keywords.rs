//! Keyword endpoint handlers.

use serde_json::json;

use super::pagination;
use crate::mock_server::compose::RouteModule;
use crate::mock_server::route::{MockRequest, MockResponse};
use crate::mock_server::server::MockServer;
use crate::mock_server::state::MockState;
use crate::models::Keyword;

/// Keyword routes.
pub struct Keywords;

impl RouteModule for Keywords {
    fn name(&self) -> &'static str {
        "keywords"
    }

    fn register(&self, server: &mut MockServer) {
        server.get("/api/v1/keywords", list_keywords);
        server.get("/api/v1/keywords/:keyword_id", get_keyword);
    }
}

/// GET /api/v1/keywords
pub fn list_keywords(db: &mut MockState, request: &MockRequest) -> MockResponse {
    let keywords: Vec<Keyword> = db
        .keywords
        .values()
        .map(|keyword| db.keyword_view(keyword))
        .collect();

    let page = pagination(request).paginate(keywords);
    MockResponse::ok(json!({ "keywords": page.items, "meta": page.meta() }))
}

/// GET /api/v1/keywords/{keyword_id}
pub fn get_keyword(db: &mut MockState, request: &MockRequest) -> MockResponse {
    match request
        .param("keyword_id")
        .and_then(|keyword| db.keywords.get(keyword))
    {
        Some(keyword) => MockResponse::ok(json!({ "keyword": db.keyword_view(keyword) })),
        None => MockResponse::not_found(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_server::Fixtures;

    #[test]
    fn test_list_keywords_counts_crates() {
        let mut db = Fixtures::default_scenario();
        let request = MockRequest::get("/api/v1/keywords").unwrap();
        let body = list_keywords(&mut db, &request).json_body().cloned().unwrap();

        let keywords = body["keywords"].as_array().unwrap();
        assert_eq!(keywords.len(), 4);
        assert!(keywords.iter().all(|k| k["crates_cnt"] == 1));
        assert_eq!(body["meta"]["total"], 4);
    }

    #[test]
    fn test_get_keyword() {
        let mut db = Fixtures::default_scenario();
        let mut request = MockRequest::get("/api/v1/keywords/cli").unwrap();
        request.params.insert("keyword_id".to_string(), "cli".to_string());

        let response = get_keyword(&mut db, &request);
        assert_eq!(response.json_body().unwrap()["keyword"]["keyword"], "cli");
    }
}
