//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Request (method, path)
//!     → router.rs (ordered scan of bindings)
//!     → matcher.rs (method filter AND path pattern)
//!     → Return: first matching handler, or None (static-file fallback)
//! ```
//!
//! # Design Decisions
//! - Bindings are appended while the server is being built and frozen after
//! - Registration order is the only precedence rule: first match wins
//! - Patterns are exact strings or a prefix ending in `*`; no regex

pub mod matcher;
pub mod router;

pub use matcher::{Matcher, MethodMatcher, PathPattern};
pub use router::{Handler, Route, RouteTable};
