//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) or ServerConfig::default()
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → shared via Arc with every listener
//! ```
//!
//! # Design Decisions
//! - Config is immutable once serving starts; there is no hot reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{LimitsConfig, ObservabilityConfig, ServerConfig, TlsConfig};
pub use validation::{validate_config, ValidationError};
