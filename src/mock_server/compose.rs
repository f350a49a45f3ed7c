//! Server composition and hook injection.
//!
//! [`make_server`] builds a [`MockServer`] from a base configuration, lets
//! every [`RouteModule`] register its rules, reserves the coverage endpoint,
//! and finally hands the server to the hooks an external test driver
//! supplied through an [`Injection`].

use serde_json::{Map, Value};

use super::handlers::{
    Categories, Crates, DocsRs, Invites, Keywords, Me, Metadata, Session, Summary, Teams, Users,
};
use super::server::MockServer;
use crate::config::ServerConfig;
use crate::fetch::HttpFetcher;

/// Path the coverage reporter posts to; always passed through.
pub const COVERAGE_PATH: &str = "/write-coverage";

/// A resource domain that installs its own route rules.
pub trait RouteModule: Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Install this module's rules on `server`.
    fn register(&self, server: &mut MockServer);
}

/// Every route module, in registration order.
pub fn route_modules() -> [&'static dyn RouteModule; 11] {
    [
        &Categories,
        &Crates,
        &DocsRs,
        &Invites,
        &Keywords,
        &Me,
        &Metadata,
        &Session,
        &Summary,
        &Teams,
        &Users,
    ]
}

/// A function applied to the fully constructed server.
pub type Hook = Box<dyn FnOnce(&mut MockServer) + Send>;

/// Customizations supplied by an external test driver.
///
/// Both parts are optional. Hook slots that are `None` are skipped.
#[derive(Default)]
pub struct Injection {
    config: Option<Map<String, Value>>,
    hooks: Vec<Option<Hook>>,
}

impl std::fmt::Debug for Injection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Injection")
            .field("config", &self.config)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

impl Injection {
    /// No customization.
    pub fn none() -> Self {
        Self::default()
    }

    /// Overlay `config` onto the base configuration.
    #[must_use]
    pub fn with_config(mut self, config: Map<String, Value>) -> Self {
        self.config = Some(config);
        self
    }

    /// Append a hook.
    #[must_use]
    pub fn with_hook<F>(self, hook: F) -> Self
    where
        F: FnOnce(&mut MockServer) + Send + 'static,
    {
        self.with_hook_slot(Some(Box::new(hook)))
    }

    /// Append a hook slot that may be empty.
    #[must_use]
    pub fn with_hook_slot(mut self, hook: Option<Hook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Whether anything would be customized.
    pub fn is_empty(&self) -> bool {
        self.config.is_none() && self.hooks.iter().all(Option::is_none)
    }
}

/// Build a mock server with every route module registered.
///
/// The injected configuration, if any, is overlaid onto `config` before the
/// server is constructed. Injected hooks run in order once all modules have
/// registered, so they can override any baseline route.
pub fn make_server(config: ServerConfig, injection: Injection) -> MockServer {
    let Injection {
        config: injected,
        hooks,
    } = injection;

    let config = match injected {
        Some(injected) => config.overlay(&injected),
        None => config,
    };

    let mut server = with_upstream(MockServer::new(config));
    for module in route_modules() {
        module.register(&mut server);
        tracing::debug!(module = module.name(), routes = server.routes().len(), "registered route module");
    }

    server.passthrough(COVERAGE_PATH);

    apply_hooks(server, hooks)
}

/// Attach an upstream for passthrough requests when `urlPrefix` is set.
fn with_upstream(server: MockServer) -> MockServer {
    let Some(prefix) = server.config().url_prefix().map(str::to_string) else {
        return server;
    };
    match HttpFetcher::new().and_then(|fetcher| fetcher.with_base_url(&prefix)) {
        Ok(upstream) => server.with_upstream(upstream),
        Err(err) => {
            tracing::warn!(error = %err, %prefix, "ignoring passthrough upstream");
            server
        }
    }
}

fn apply_hooks(mut server: MockServer, hooks: Vec<Option<Hook>>) -> MockServer {
    for (index, hook) in hooks.into_iter().enumerate() {
        match hook {
            Some(hook) => hook(&mut server),
            None => tracing::debug!(index, "skipping empty hook slot"),
        }
    }
    server
}
