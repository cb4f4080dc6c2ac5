//! TLS context and per-connection handshake.
//!
//! The context is created once, explicitly, and handed to whichever servers
//! need it; there is no process-wide TLS state.

use std::fmt;
use std::path::Path;

use axum_server::accept::Accept;
use axum_server::tls_rustls::{RustlsAcceptor, RustlsConfig};
use thiserror::Error;
use tokio::net::TcpStream;

/// Encrypted stream produced by a successful handshake.
pub type TlsStream = <RustlsAcceptor as Accept<TcpStream, ()>>::Stream;

/// Error type for TLS setup and handshakes.
#[derive(Debug, Error)]
pub enum TlsError {
    #[error("{kind} file not found: {path}")]
    MissingFile { kind: &'static str, path: String },
    #[error("invalid certificate or key: {0}")]
    Config(#[source] std::io::Error),
    #[error("TLS handshake failed: {0}")]
    Handshake(#[source] std::io::Error),
}

/// Server certificate and key, ready to accept TLS sessions.
#[derive(Clone)]
pub struct TlsContext {
    acceptor: RustlsAcceptor,
}

impl TlsContext {
    /// Load a PEM certificate chain and private key.
    pub async fn initialize(cert_path: &Path, key_path: &Path) -> Result<Self, TlsError> {
        for (kind, path) in [("Certificate", cert_path), ("Private key", key_path)] {
            if !path.exists() {
                return Err(TlsError::MissingFile {
                    kind,
                    path: path.display().to_string(),
                });
            }
        }

        let config = RustlsConfig::from_pem_file(cert_path, key_path)
            .await
            .map_err(TlsError::Config)?;
        tracing::info!(cert = %cert_path.display(), "TLS context initialized");
        Ok(Self::from_config(config))
    }

    /// Wrap an already built rustls configuration.
    pub fn from_config(config: RustlsConfig) -> Self {
        Self {
            acceptor: RustlsAcceptor::new(config),
        }
    }

    /// Run the server side of the handshake. On failure the stream is
    /// dropped, closing the connection before any request is read.
    pub async fn handshake(&self, stream: TcpStream) -> Result<TlsStream, TlsError> {
        let (stream, ()) = self
            .acceptor
            .accept(stream, ())
            .await
            .map_err(TlsError::Handshake)?;
        Ok(stream)
    }
}

impl fmt::Debug for TlsContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsContext").finish_non_exhaustive()
    }
}
