//! Sockets, TLS and byte framing.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (bounded accept)
//!     → tls.rs (handshake, encrypted listener only)
//!     → transport.rs (chunked reads, message framing, writes)
//!     → connection.rs (identity, state, lifetime tracking)
//!     → http::connection
//!
//! Connection States:
//!     Reading → Parsed → Routed → Responding → (Reading | Closed)
//! ```
//!
//! # Design Decisions
//! - At most `max_connections` connections are live per listener
//! - Live connections are counted so shutdown can drain them
//! - TLS is optional and handled transparently by the generic transport

pub mod connection;
pub mod listener;
pub mod tls;
pub mod transport;

pub use connection::{ConnectionId, ConnectionState, ConnectionTracker};
pub use listener::{Listener, ListenerError};
pub use tls::{TlsContext, TlsError, TlsStream};
pub use transport::{Frame, Transport, TransportError, TransportOptions};
