//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! listener / connection / dispatch produce:
//!     → tracing events (structured fields: connection_id, method, path, status)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;
