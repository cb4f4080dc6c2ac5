//! Minimal HTTP/1.1 server engine.
//!
//! Accepts TCP connections (optionally TLS), frames and parses request
//! bytes, routes each request through an ordered table of handlers with a
//! static-file fallback, and writes the completed responses back.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use config::ServerConfig;
pub use http::{HttpServer, HttpServerBuilder, Method, Request, Response, ResponseError, Status};
pub use lifecycle::Shutdown;
pub use net::TlsContext;
pub use routing::RouteTable;
