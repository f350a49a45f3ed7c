//! Mock crates.io registry for frontend and client testing.
//!
//! The mock keeps an in-memory registry database and answers requests
//! through an ordered [`RouteTable`]. Route handler modules register their
//! rules in a fixed order, a passthrough for the coverage upload endpoint is
//! installed last, and then any test hooks run against the fully built
//! server.
//!
//! # Example
//!
//! ```ignore
//! use crates_mock::mock_server::{make_server, Injection, MockRequest, MockResponse, DOCS_RS_STATUS};
//! use crates_mock::ServerConfig;
//! use reqwest::Method;
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn test_docs_rs_override() {
//!     let server = make_server(
//!         ServerConfig::test(),
//!         Injection::none().with_hook(|server| {
//!             server.respond(
//!                 Method::GET,
//!                 DOCS_RS_STATUS,
//!                 MockResponse::ok(json!({ "doc_status": true, "version": "0.6.2" })),
//!             );
//!         }),
//!     );
//!
//!     let response = server
//!         .request(MockRequest::get("https://docs.rs/crate/foo/0.6.2/status.json").unwrap())
//!         .await
//!         .unwrap();
//!     assert!(response.status.is_success());
//! }
//! ```

mod compose;
mod fixtures;
pub mod handlers;
#[cfg(feature = "listener")]
mod listener;
mod route;
mod server;
mod state;

pub use compose::{make_server, route_modules, Hook, Injection, RouteModule, COVERAGE_PATH};
pub use fixtures::Fixtures;
pub use handlers::docs_rs::DOCS_RS_STATUS;
#[cfg(feature = "listener")]
pub use listener::ListeningServer;
pub use route::{
    Handler, MockRequest, MockResponse, PathPattern, ResponseBody, RouteAction, RouteRule,
    RouteTable,
};
pub use server::{Dispatch, MockServer};
pub use state::{MockState, Owner};
