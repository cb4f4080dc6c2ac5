//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain connections → Exit
//!
//! Signals (signals.rs):
//!     SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Shutdown never cancels a connection mid-request; it only stops accepts
//! - Draining has a deadline (`limits.shutdown_grace_secs`)

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownSignal};
