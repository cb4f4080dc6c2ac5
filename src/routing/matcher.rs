//! Route matching logic.
//!
//! # Responsibilities
//! - Match the request method (exact, or any for `Method::Any`)
//! - Match the request path (exact, or prefix up to the first `*`)
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Only the first `*` is significant; anything after it is ignored
//! - No backtracking or regex, so a match is a single comparison

use crate::http::Method;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if a request with this method and path matches.
    fn matches(&self, method: Method, path: &str) -> bool;
}

/// Matches the request method.
#[derive(Debug, Clone, Copy)]
pub struct MethodMatcher {
    method: Method,
}

impl MethodMatcher {
    /// Match `method`, or anything when it is [`Method::Any`].
    pub fn new(method: Method) -> Self {
        Self { method }
    }
}

impl Matcher for MethodMatcher {
    fn matches(&self, method: Method, _path: &str) -> bool {
        self.method.accepts(method)
    }
}

/// The wildcard marker in URL patterns.
pub const WILDCARD: char = '*';

/// Matches the request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    /// Path must equal the pattern.
    Exact(String),
    /// Path must start with the text before the wildcard.
    Prefix(String),
}

impl PathPattern {
    /// Everything before the first `*` becomes a prefix; no `*` means exact.
    pub fn parse(pattern: &str) -> Self {
        match pattern.split_once(WILDCARD) {
            Some((prefix, _)) => PathPattern::Prefix(prefix.to_string()),
            None => PathPattern::Exact(pattern.to_string()),
        }
    }

    /// Whether `path` satisfies the pattern.
    pub fn is_match(&self, path: &str) -> bool {
        match self {
            PathPattern::Exact(expected) => path == expected,
            PathPattern::Prefix(prefix) => path.starts_with(prefix.as_str()),
        }
    }
}

impl Matcher for PathPattern {
    fn matches(&self, _method: Method, path: &str) -> bool {
        self.is_match(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_matcher() {
        let get = MethodMatcher::new(Method::Get);
        assert!(get.matches(Method::Get, "/"));
        assert!(!get.matches(Method::Post, "/"));

        let any = MethodMatcher::new(Method::Any);
        assert!(any.matches(Method::Delete, "/"));
    }

    #[test]
    fn test_exact_pattern() {
        let pattern = PathPattern::parse("/api");
        assert_eq!(pattern, PathPattern::Exact("/api".into()));
        assert!(pattern.is_match("/api"));
        assert!(!pattern.is_match("/api/"));
        assert!(!pattern.is_match("/API"));
    }

    #[test]
    fn test_prefix_pattern() {
        let pattern = PathPattern::parse("/static/*");
        assert!(pattern.is_match("/static/"));
        assert!(pattern.is_match("/static/app.css"));
        assert!(!pattern.is_match("/static"));
    }

    #[test]
    fn test_bare_wildcard_matches_everything() {
        let pattern = PathPattern::parse("*");
        assert_eq!(pattern, PathPattern::Prefix(String::new()));
        assert!(pattern.is_match("/"));
        assert!(pattern.is_match("/anything/at/all"));
    }

    #[test]
    fn test_only_first_wildcard_counts() {
        let pattern = PathPattern::parse("/a*/b*");
        assert_eq!(pattern, PathPattern::Prefix("/a".into()));
        assert!(pattern.is_match("/another"));
    }
}
