//! Front page summary.

use std::cmp::Reverse;

use serde_json::json;

use crate::mock_server::compose::RouteModule;
use crate::mock_server::route::{MockRequest, MockResponse};
use crate::mock_server::server::MockServer;
use crate::mock_server::state::MockState;
use crate::models::{Category, Crate, Keyword};

/// Length of each list in the summary.
const SUMMARY_LEN: usize = 10;

/// Summary route.
pub struct Summary;

impl RouteModule for Summary {
    fn name(&self) -> &'static str {
        "summary"
    }

    fn register(&self, server: &mut MockServer) {
        server.get("/api/v1/summary", summary);
    }
}

fn top_by<K: Ord>(crates: &[Crate], key: impl Fn(&Crate) -> K) -> Vec<Crate> {
    let mut sorted = crates.to_vec();
    sorted.sort_by_key(|c| Reverse(key(c)));
    sorted.truncate(SUMMARY_LEN);
    sorted
}

/// GET /api/v1/summary
pub fn summary(db: &mut MockState, _request: &MockRequest) -> MockResponse {
    let crates: Vec<Crate> = db.crates.values().map(|c| db.crate_view(c)).collect();
    let num_downloads: u64 = crates.iter().map(|c| c.downloads).sum();

    let mut keywords: Vec<Keyword> = db.keywords.values().map(|k| db.keyword_view(k)).collect();
    keywords.sort_by_key(|k| Reverse(k.crates_cnt));
    keywords.truncate(SUMMARY_LEN);

    let mut categories: Vec<Category> = db
        .categories
        .values()
        .map(|c| db.category_view(c))
        .collect();
    categories.sort_by_key(|c| Reverse(c.crates_cnt));
    categories.truncate(SUMMARY_LEN);

    MockResponse::ok(json!({
        "num_crates": crates.len(),
        "num_downloads": num_downloads,
        "new_crates": top_by(&crates, |c| c.created_at),
        "most_downloaded": top_by(&crates, |c| c.downloads),
        "most_recently_downloaded": top_by(&crates, |c| c.recent_downloads),
        "just_updated": top_by(&crates, |c| c.updated_at),
        "popular_keywords": keywords,
        "popular_categories": categories,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_server::Fixtures;

    #[test]
    fn test_summary_totals() {
        let mut db = Fixtures::default_scenario();
        let request = MockRequest::get("/api/v1/summary").unwrap();
        let response = summary(&mut db, &request);
        let body = response.json_body().unwrap();

        assert_eq!(body["num_crates"], 3);
        assert_eq!(body["num_downloads"], 350_000_042u64);
        assert_eq!(body["most_downloaded"][0]["name"], "serde");
        assert_eq!(body["most_downloaded"][0]["max_version"], "1.0.0");
    }

    #[test]
    fn test_summary_lists_are_capped() {
        let mut db = MockState::new();
        for i in 0..15 {
            db.insert_crate(Fixtures::krate(&format!("crate-{i:02}")));
        }
        let request = MockRequest::get("/api/v1/summary").unwrap();
        let response = summary(&mut db, &request);
        let body = response.json_body().unwrap();

        assert_eq!(body["num_crates"], 15);
        assert_eq!(body["new_crates"].as_array().unwrap().len(), SUMMARY_LEN);
    }
}
