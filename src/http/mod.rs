//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Transport (one framed message: header block + declared body)
//!     → request.rs (request line, headers, body)
//!     → connection.rs (HEAD→GET rewrite, route lookup, static fallback)
//!     → response.rs (completion check, wire encoding)
//!     → Transport
//! ```
//!
//! # Design Decisions
//! - Only `HTTP/1.1` is spoken
//! - Carriage returns are dropped before any text decoding
//! - A message that fails to parse ends the connection without a response

pub mod connection;
mod error;
pub mod framing;
mod headers;
mod method;
mod parser;
pub mod redirect;
mod request;
mod response;
pub mod server;
pub mod static_files;
mod status;

pub use error::{ParseError, ResponseError};
pub use headers::Headers;
pub use method::Method;
pub use request::Request;
pub use response::Response;
pub use server::{HttpServer, HttpServerBuilder};
pub use status::{ContentType, Status};

/// The protocol version token on request and status lines.
pub const VERSION: &str = "HTTP/1.1";
