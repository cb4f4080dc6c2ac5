//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store route bindings in registration order
//! - Look up the first binding matching a request
//! - Return the matched handler or an explicit no-match
//!
//! # Design Decisions
//! - Immutable once the server is built (shared via `Arc`, no locks)
//! - O(n) scan; later overlapping bindings are unreachable by construction

use std::fmt;
use std::sync::Arc;

use super::matcher::{Matcher, MethodMatcher, PathPattern};
use crate::http::{Method, Request, Response, ResponseError};

/// Callback that fills in a response and completes it.
pub type Handler = Arc<dyn Fn(&Request, &mut Response) -> Result<(), ResponseError> + Send + Sync>;

/// One (method, pattern, handler) binding.
#[derive(Clone)]
pub struct Route {
    method: MethodMatcher,
    pattern: PathPattern,
    source: String,
    handler: Handler,
}

impl Route {
    /// Create a binding.
    pub fn new(method: Method, pattern: &str, handler: Handler) -> Self {
        Self {
            method: MethodMatcher::new(method),
            pattern: PathPattern::parse(pattern),
            source: pattern.to_string(),
            handler,
        }
    }

    /// The pattern as it was registered.
    pub fn pattern(&self) -> &str {
        &self.source
    }

    /// Callback invoked for matching requests.
    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    /// Whether both method and path match this binding.
    pub fn matches(&self, method: Method, path: &str) -> bool {
        self.method.matches(method, path) && self.pattern.matches(method, path)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.source)
            .finish_non_exhaustive()
    }
}

/// Ordered route bindings.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a binding. Earlier bindings take precedence.
    pub fn register<F>(&mut self, method: Method, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&Request, &mut Response) -> Result<(), ResponseError> + Send + Sync + 'static,
    {
        self.routes.push(Route::new(method, pattern, Arc::new(handler)));
        self
    }

    /// Append every binding of `other`, keeping its order, after ours.
    pub fn append(&mut self, other: RouteTable) -> &mut Self {
        self.routes.extend(other.routes);
        self
    }

    /// First binding matching `method` and `path`.
    pub fn find(&self, method: Method, path: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.matches(method, path))
    }

    /// Handler of the first matching binding.
    pub fn resolve(&self, method: Method, path: &str) -> Option<&Handler> {
        self.find(method, path).map(Route::handler)
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(tag: &'static str) -> impl Fn(&Request, &mut Response) -> Result<(), ResponseError> {
        move |_: &Request, response: &mut Response| {
            response.set_body(tag);
            response.complete()
        }
    }

    fn dispatch(table: &RouteTable, method: Method, path: &str) -> Option<String> {
        let handler = table.resolve(method, path)?;
        let request = Request::parse(format!("{method} {path} HTTP/1.1\n\n").as_bytes()).ok()?;
        let mut response = Response::new();
        handler(&request, &mut response).ok()?;
        response.body_text().map(str::to_string)
    }

    #[test]
    fn test_first_match_wins_over_more_specific() {
        let mut table = RouteTable::new();
        table.register(Method::Get, "/a*", reply("H1"));
        table.register(Method::Get, "/ab", reply("H2"));

        assert_eq!(dispatch(&table, Method::Get, "/ab").as_deref(), Some("H1"));
    }

    #[test]
    fn test_interleaved_registration_order_governs() {
        let mut table = RouteTable::new();
        table.register(Method::Get, "/y*", reply("wild-y"));
        table.register(Method::Get, "/x", reply("exact-x"));
        table.register(Method::Get, "/x*", reply("wild-x"));
        table.register(Method::Get, "/y", reply("exact-y"));

        assert_eq!(dispatch(&table, Method::Get, "/x").as_deref(), Some("exact-x"));
        assert_eq!(dispatch(&table, Method::Get, "/xz").as_deref(), Some("wild-x"));
        assert_eq!(dispatch(&table, Method::Get, "/y").as_deref(), Some("wild-y"));
    }

    #[test]
    fn test_method_must_match_unless_any() {
        let mut table = RouteTable::new();
        table.register(Method::Post, "/submit", reply("post"));
        table.register(Method::Any, "/submit", reply("any"));

        assert_eq!(dispatch(&table, Method::Post, "/submit").as_deref(), Some("post"));
        assert_eq!(dispatch(&table, Method::Delete, "/submit").as_deref(), Some("any"));
    }

    #[test]
    fn test_no_match() {
        let mut table = RouteTable::new();
        table.register(Method::Get, "/only", reply("only"));

        assert!(table.resolve(Method::Get, "/other").is_none());
        assert!(table.resolve(Method::Put, "/only").is_none());
        assert!(RouteTable::new().is_empty());
    }

    #[test]
    fn test_find_reports_registered_pattern() {
        let mut table = RouteTable::new();
        table
            .register(Method::Any, "*", reply("all"))
            .register(Method::Get, "/", reply("root"));

        assert_eq!(table.len(), 2);
        assert_eq!(table.find(Method::Get, "/").map(Route::pattern), Some("*"));
    }

    #[test]
    fn test_append_keeps_both_orders() {
        let mut first = RouteTable::new();
        first.register(Method::Get, "/x", reply("first"));
        let mut second = RouteTable::new();
        second
            .register(Method::Get, "/x", reply("second"))
            .register(Method::Get, "/y", reply("second-y"));

        first.append(second);
        assert_eq!(first.len(), 3);
        assert_eq!(dispatch(&first, Method::Get, "/x").as_deref(), Some("first"));
        assert_eq!(dispatch(&first, Method::Get, "/y").as_deref(), Some("second-y"));
    }
}
