//! Route rules and request matching.
//!
//! A [`RouteTable`] is an ordered list of [`RouteRule`]s. Requests are matched
//! against the rules in registration order and the first match wins.
//! Registering a rule with the same method and pattern as an existing rule
//! replaces that rule's action in place, so later registrations override
//! identical routes without changing their position.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use url::Url;

use super::state::MockState;
use crate::error::Result;

/// Base used to parse same-origin request targets such as `/api/v1/crates`.
const LOCAL_BASE: &str = "http://mock.localhost/";

/// A request as seen by route handlers.
#[derive(Debug, Clone)]
pub struct MockRequest {
    pub method: Method,
    /// `scheme://host[:port]` for cross-origin requests, `None` for
    /// same-origin requests.
    pub origin: Option<String>,
    pub path: String,
    pub query: HashMap<String, String>,
    pub body: Option<Value>,
    /// Named parameters captured by the matching pattern.
    pub params: HashMap<String, String>,
}

impl MockRequest {
    /// Build a request from a path (`/api/v1/crates?q=foo`) or absolute URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the target cannot be parsed as a URL.
    pub fn new(method: Method, target: &str) -> Result<Self> {
        let (url, origin) = if target.starts_with('/') {
            (Url::parse(LOCAL_BASE)?.join(target)?, None)
        } else {
            let url = Url::parse(target)?;
            let origin = url.origin().ascii_serialization();
            (url, Some(origin))
        };

        Ok(Self {
            method,
            origin,
            path: url.path().to_string(),
            query: url.query_pairs().into_owned().collect(),
            body: None,
            params: HashMap::new(),
        })
    }

    /// Build a GET request.
    ///
    /// # Errors
    ///
    /// Returns an error if the target cannot be parsed as a URL.
    pub fn get(target: &str) -> Result<Self> {
        Self::new(Method::GET, target)
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// A named path parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// A query string parameter.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Deserialize the JSON body, if there is one and it fits `T`.
    pub fn json_body<T: DeserializeOwned>(&self) -> Option<T> {
        self.body
            .as_ref()
            .and_then(|body| serde_json::from_value(body.clone()).ok())
    }

    /// The request URL, for logs and errors.
    pub fn url(&self) -> String {
        let mut url = format!("{}{}", self.origin.as_deref().unwrap_or(""), self.path);
        if !self.query.is_empty() {
            let mut pairs: Vec<_> = self.query.iter().collect();
            pairs.sort();
            let query: Vec<String> = pairs.iter().map(|(k, v)| format!("{k}={v}")).collect();
            url.push('?');
            url.push_str(&query.join("&"));
        }
        url
    }
}

/// Body of a canned response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Empty,
    Json(Value),
    Text(String),
}

/// A response produced by a route handler.
#[derive(Debug, Clone, PartialEq)]
pub struct MockResponse {
    pub status: StatusCode,
    pub body: ResponseBody,
}

impl MockResponse {
    /// 200 with a JSON body.
    pub fn ok(body: Value) -> Self {
        Self::json(StatusCode::OK, body)
    }

    /// JSON body with an explicit status.
    pub fn json(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body: ResponseBody::Json(body),
        }
    }

    /// Plain text body with an explicit status.
    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: ResponseBody::Text(body.into()),
        }
    }

    /// Status only.
    pub fn status(status: StatusCode) -> Self {
        Self {
            status,
            body: ResponseBody::Empty,
        }
    }

    /// Error in the registry's `{"errors": [{"detail": ...}]}` shape.
    pub fn error(status: StatusCode, detail: impl Into<String>) -> Self {
        Self::json(status, json!({ "errors": [{ "detail": detail.into() }] }))
    }

    /// 404 Not Found.
    pub fn not_found() -> Self {
        Self::error(StatusCode::NOT_FOUND, "Not Found")
    }

    /// 403 for actions that need a session.
    pub fn forbidden() -> Self {
        Self::error(
            StatusCode::FORBIDDEN,
            "must be logged in to perform that action",
        )
    }

    /// Serialize the body for the wire.
    pub fn body_string(&self) -> String {
        match &self.body {
            ResponseBody::Empty => String::new(),
            ResponseBody::Json(value) => value.to_string(),
            ResponseBody::Text(text) => text.clone(),
        }
    }

    /// The JSON body, if this is a JSON response.
    pub fn json_body(&self) -> Option<&Value> {
        match &self.body {
            ResponseBody::Json(value) => Some(value),
            _ => None,
        }
    }
}

/// A route handler.
pub type Handler = Arc<dyn Fn(&mut MockState, &MockRequest) -> MockResponse + Send + Sync>;

/// What a matched rule does with the request.
#[derive(Clone)]
pub enum RouteAction {
    /// Answer with the handler's response.
    Respond(Handler),
    /// Let the request through to the real network.
    Passthrough,
}

impl fmt::Debug for RouteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Respond(_) => f.write_str("Respond(..)"),
            Self::Passthrough => f.write_str("Passthrough"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
    /// Matches the rest of the path, possibly empty.
    Splat(String),
}

/// A path pattern such as `/api/v1/crates/:name` or
/// `https://docs.rs/crate/:crate/:version/status.json`.
///
/// Patterns with an origin only match requests to that origin; patterns
/// without one only match same-origin requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    origin: Option<String>,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parse a pattern. Parsing never fails: anything that is not a
    /// parameter is taken literally.
    pub fn new(pattern: &str) -> Self {
        let (origin, path) = match pattern.find("://").and_then(|_| Url::parse(pattern).ok()) {
            Some(url) => (
                Some(url.origin().ascii_serialization()),
                url.path().to_string(),
            ),
            None => (None, pattern.to_string()),
        };

        let segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| match (s.strip_prefix(':'), s.strip_prefix('*')) {
                (Some(name), _) if !name.is_empty() => Segment::Param(name.to_string()),
                (_, Some(name)) => Segment::Splat(name.to_string()),
                _ => Segment::Literal(s.to_string()),
            })
            .collect();

        Self { origin, segments }
    }

    /// The origin this pattern is restricted to, if any.
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// Whether both patterns match exactly the same requests, whatever their
    /// parameters are called.
    pub fn same_shape(&self, other: &PathPattern) -> bool {
        self.origin == other.origin
            && self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|pair| match pair {
                    (Segment::Literal(a), Segment::Literal(b)) => a == b,
                    (Segment::Param(_), Segment::Param(_)) => true,
                    (Segment::Splat(_), Segment::Splat(_)) => true,
                    _ => false,
                })
    }

    /// Match a request origin and path, returning captured parameters.
    pub fn matches(&self, origin: Option<&str>, path: &str) -> Option<HashMap<String, String>> {
        if self.origin.as_deref() != origin {
            return None;
        }

        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut params = HashMap::new();

        for (index, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Splat(name) => {
                    params.insert(name.clone(), parts.get(index..).unwrap_or(&[]).join("/"));
                    return Some(params);
                }
                Segment::Literal(literal) => {
                    if parts.get(index) != Some(&literal.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let raw = parts.get(index)?;
                    let value = urlencoding::decode(raw)
                        .map(|s| s.into_owned())
                        .unwrap_or_else(|_| (*raw).to_string());
                    params.insert(name.clone(), value);
                }
            }
        }

        (parts.len() == self.segments.len()).then_some(params)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(origin) = &self.origin {
            f.write_str(origin)?;
        }
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => write!(f, "/{s}")?,
                Segment::Param(s) => write!(f, "/:{s}")?,
                Segment::Splat(s) => write!(f, "/*{s}")?,
            }
        }
        Ok(())
    }
}

/// One entry of the route table.
#[derive(Debug, Clone)]
pub struct RouteRule {
    /// `None` matches every method.
    pub method: Option<Method>,
    pub pattern: PathPattern,
    pub action: RouteAction,
}

impl RouteRule {
    fn same_route(&self, other: &RouteRule) -> bool {
        self.method == other.method && self.pattern.same_shape(&other.pattern)
    }

    fn accepts(&self, method: &Method) -> bool {
        self.method.as_ref().map_or(true, |m| m == method)
    }

    /// Whether this rule lets requests through.
    pub fn is_passthrough(&self) -> bool {
        matches!(self.action, RouteAction::Passthrough)
    }
}

/// Whether [`RouteTable::insert`] added or replaced a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inserted {
    Appended,
    Replaced,
}

/// Ordered route rules with first-match semantics.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

impl RouteTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule, replacing an existing rule for the same method and pattern.
    pub fn insert(&mut self, rule: RouteRule) -> Inserted {
        match self.rules.iter_mut().find(|existing| existing.same_route(&rule)) {
            Some(existing) => {
                *existing = rule;
                Inserted::Replaced
            }
            None => {
                self.rules.push(rule);
                Inserted::Appended
            }
        }
    }

    /// Find the first rule matching the request, with its captured parameters.
    pub fn find(
        &self,
        method: &Method,
        origin: Option<&str>,
        path: &str,
    ) -> Option<(&RouteRule, HashMap<String, String>)> {
        self.rules
            .iter()
            .filter(|rule| rule.accepts(method))
            .find_map(|rule| rule.pattern.matches(origin, path).map(|params| (rule, params)))
    }

    /// Rules in registration order.
    pub fn iter(&self) -> std::slice::Iter<'_, RouteRule> {
        self.rules.iter()
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if the table has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// `(method, pattern)` pairs in order, for comparing tables.
    pub fn signature(&self) -> Vec<(String, String)> {
        self.rules
            .iter()
            .map(|rule| {
                let method = rule
                    .method
                    .as_ref()
                    .map_or_else(|| "*".to_string(), ToString::to_string);
                (method, rule.pattern.to_string())
            })
            .collect()
    }
}
