//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Value of the `Server` response header; empty disables it.
    pub server_name: String,

    /// Public host name, used as the target of HTTP→HTTPS redirects.
    pub server_address: Option<String>,

    /// Interface to bind (e.g., "0.0.0.0").
    pub bind_host: String,

    /// Plaintext port.
    pub http_port: u16,

    /// Encrypted port.
    pub https_port: u16,

    /// Directory searched by the static-file fallback.
    pub static_root: String,

    /// Fall back to `<static_root><path>/index.html` when no route matches.
    pub serve_static_files: bool,

    /// Run a second listener on `http_port` that redirects to HTTPS.
    pub redirect_http_to_https: bool,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,

    /// Connection and framing limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_name: "tinyhttpd".to_string(),
            server_address: None,
            bind_host: "0.0.0.0".to_string(),
            http_port: 80,
            https_port: 443,
            static_root: "./static".to_string(),
            serve_static_files: true,
            redirect_http_to_https: false,
            tls: None,
            limits: LimitsConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Bind address of the plaintext listener.
    pub fn http_bind_address(&self) -> String {
        format!("{}:{}", self.bind_host, self.http_port)
    }

    /// Bind address of the encrypted listener.
    pub fn https_bind_address(&self) -> String {
        format!("{}:{}", self.bind_host, self.https_port)
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Limits applied per listener and per connection.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,

    /// Bytes requested from the socket per read.
    pub read_chunk_size: usize,

    /// Largest header block accepted before the connection is dropped.
    pub max_head_bytes: usize,

    /// Largest declared body accepted before the connection is dropped.
    pub max_body_bytes: usize,

    /// Idle read timeout in seconds; 0 waits forever.
    pub read_timeout_secs: u64,

    /// How long shutdown waits for open connections to finish.
    pub shutdown_grace_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_connections: 10_000,
            read_chunk_size: 4096,
            max_head_bytes: 64 * 1024,
            max_body_bytes: 8 * 1024 * 1024,
            read_timeout_secs: 0,
            shutdown_grace_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
