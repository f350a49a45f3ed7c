//! Mock crates.io backend for end-to-end front-end tests.
//!
//! The crate provides an in-memory imitation of the crates.io API that a
//! test driver can configure and extend, plus the docs.rs link resolution
//! used by the crate detail page.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use crates_mock::mock_server::{make_server, Fixtures, Injection};
//! use crates_mock::{CratePage, DocsRsClient, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> crates_mock::Result<()> {
//!     let server = make_server(ServerConfig::test(), Injection::none());
//!     *server.db().write().await = Fixtures::default_scenario();
//!
//!     let server = Arc::new(server);
//!     let docs_rs = DocsRsClient::new(server.clone());
//!     let page = CratePage::visit(server.as_ref(), "foo", None, &docs_rs).await?;
//!
//!     println!("{:?}", page.docs.settled().await);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`mock_server`] - route table, handler modules, fixtures and the
//!   composition entry point [`mock_server::make_server`]
//! - [`docs`] - docs.rs status probe and the crate page's documentation link
//! - [`fetch`] - the [`Fetch`] transport shared by both
//!
//! # Configuration
//!
//! [`ServerConfig`] holds the construction options. A test driver can
//! overlay a JSON object through [`mock_server::Injection`]; the binary
//! reads the same object from `--config` or `CRATES_MOCK_CONFIG`.

pub mod cli;
mod config;
pub mod docs;
mod error;
pub mod fetch;
pub mod mock_server;
mod models;
pub mod output;
mod pagination;

// Re-export core types
pub use config::{Environment, ServerConfig, DEFAULT_TIMING_MS, URL_PREFIX_SETTING};
pub use error::{MockError, Result};
pub use pagination::{Page, PaginationParams, DEFAULT_PER_PAGE, MAX_PER_PAGE};

// Re-export transport and docs types
pub use docs::{CratePage, DocsLink, DocsRsClient, DocsStatus};
pub use fetch::{Fetch, FetchRequest, FetchResponse, HttpFetcher};

// Re-export models
pub use models::{
    max_version, newest_version, ApiToken, Category, Crate, CrateOwnerInvitation, Keyword, Team,
    User, Version,
};
