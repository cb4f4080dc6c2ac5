//! HTTP server setup and accept loop.
//!
//! # Responsibilities
//! - Collect route bindings and freeze them into an immutable table
//! - Validate configuration before anything is bound
//! - Bind the plaintext or encrypted listener, plus the optional redirect one
//! - Spawn one task per accepted connection
//! - Stop accepting on shutdown and wait for connections to drain

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpStream;

use super::connection::{serve_connection, Dispatcher};
use super::redirect::redirect_routes;
use super::static_files::StaticFiles;
use super::{Method, Request, Response, ResponseError};
use crate::config::{validate_config, ConfigError, ServerConfig};
use crate::lifecycle::{Shutdown, ShutdownSignal};
use crate::net::{
    ConnectionId, ConnectionTracker, Listener, ListenerError, TlsContext, TlsError, Transport,
    TransportOptions,
};
use crate::observability::metrics;

/// Pause after a failed accept so a persistent error (e.g. out of file
/// descriptors) does not spin the loop.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(50);

/// Error type for server startup and the accept loop.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("startup misconfiguration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Listener(#[from] ListenerError),
    #[error(transparent)]
    Tls(#[from] TlsError),
}

/// Collects everything an [`HttpServer`] needs before it starts serving.
#[derive(Debug)]
pub struct HttpServerBuilder {
    config: ServerConfig,
    routes: crate::routing::RouteTable,
    tls: Option<TlsContext>,
}

impl HttpServerBuilder {
    /// Append a route binding. Earlier bindings take precedence.
    pub fn route<F>(mut self, method: Method, pattern: &str, handler: F) -> Self
    where
        F: Fn(&Request, &mut Response) -> Result<(), ResponseError> + Send + Sync + 'static,
    {
        self.routes.register(method, pattern, handler);
        self
    }

    /// Append a prepared table after the bindings registered so far.
    pub fn routes(mut self, routes: crate::routing::RouteTable) -> Self {
        self.routes.append(routes);
        self
    }

    /// Serve over TLS on `https_port` instead of plaintext on `http_port`.
    pub fn tls(mut self, tls: TlsContext) -> Self {
        self.tls = Some(tls);
        self
    }

    /// Validate and freeze.
    pub fn build(self) -> Result<HttpServer, ServerError> {
        validate_config(&self.config, self.tls.is_some()).map_err(ConfigError::Validation)?;

        let static_files = self
            .config
            .serve_static_files
            .then(|| StaticFiles::new(&self.config.static_root));
        let dispatcher = Dispatcher::new(self.routes, static_files, Some(self.config.server_name.clone()));

        Ok(HttpServer {
            transport: TransportOptions::from(&self.config.limits),
            config: Arc::new(self.config),
            dispatcher: Arc::new(dispatcher),
            tls: self.tls,
            tracker: ConnectionTracker::new(),
        })
    }
}

/// A configured server. Routes and configuration are read-only from here on.
#[derive(Debug)]
pub struct HttpServer {
    config: Arc<ServerConfig>,
    dispatcher: Arc<Dispatcher>,
    tls: Option<TlsContext>,
    transport: TransportOptions,
    tracker: ConnectionTracker,
}

impl HttpServer {
    /// Start collecting routes for a server using `config`.
    pub fn builder(config: ServerConfig) -> HttpServerBuilder {
        HttpServerBuilder {
            config,
            routes: crate::routing::RouteTable::new(),
            tls: None,
        }
    }

    /// Configuration the server was built with.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Shared request dispatcher.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Live connection counter.
    pub fn tracker(&self) -> &ConnectionTracker {
        &self.tracker
    }

    /// Whether connections are encrypted.
    pub fn is_tls(&self) -> bool {
        self.tls.is_some()
    }

    /// Bind the configured ports and serve until `shutdown` fires, then wait
    /// up to `limits.shutdown_grace_secs` for open connections.
    pub async fn run(self, shutdown: &Shutdown) -> Result<(), ServerError> {
        let max_connections = self.config.limits.max_connections;
        let address = if self.is_tls() {
            self.config.https_bind_address()
        } else {
            self.config.http_bind_address()
        };
        let listener = Listener::bind(&address, max_connections).await?;

        let redirect = match self.redirect_server() {
            Some(server) => {
                let listener = Listener::bind(&self.config.http_bind_address(), max_connections).await?;
                let signal = shutdown.subscribe();
                Some(tokio::spawn(async move { server.serve(listener, signal).await }))
            }
            None => None,
        };

        self.serve(listener, shutdown.subscribe()).await;

        if let Some(task) = redirect {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Redirect server task failed");
            }
        }

        let grace = Duration::from_secs(self.config.limits.shutdown_grace_secs);
        if !self.tracker.wait_idle(grace).await {
            tracing::warn!(
                remaining = self.tracker.active_count(),
                "Shutdown grace period elapsed with connections still open"
            );
        }
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Accept loop on an already bound listener. Returns when `shutdown`
    /// fires; connections in flight keep running.
    pub async fn serve(&self, listener: Listener, mut shutdown: ShutdownSignal) {
        if let Ok(address) = listener.local_addr() {
            tracing::info!(address = %address, tls = self.is_tls(), "HTTP server starting");
        }

        loop {
            let accepted = tokio::select! {
                _ = shutdown.recv() => break,
                accepted = listener.accept() => accepted,
            };

            let (stream, peer_addr, permit) = match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    tracing::warn!(error = %e, "Accept failed");
                    tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    continue;
                }
            };

            let guard = self.tracker.track();
            let dispatcher = Arc::clone(&self.dispatcher);
            let tls = self.tls.clone();
            let options = self.transport;

            tokio::spawn(async move {
                let _permit = permit;
                let id = guard.id();
                tracing::trace!(connection_id = %id, peer_addr = %peer_addr, "Connection started");
                handle_stream(stream, tls, options, dispatcher, id).await;
                drop(guard);
            });
        }

        tracing::info!("No longer accepting connections");
    }

    /// Companion server answering every plaintext request with a redirect.
    fn redirect_server(&self) -> Option<HttpServer> {
        if !self.config.redirect_http_to_https {
            return None;
        }
        // Validation guarantees the address is present when redirecting.
        let address = self.config.server_address.clone()?;
        let routes = redirect_routes(address, self.config.https_port);
        Some(HttpServer {
            config: Arc::clone(&self.config),
            dispatcher: Arc::new(Dispatcher::new(routes, None, Some(self.config.server_name.clone()))),
            tls: None,
            transport: self.transport,
            tracker: self.tracker.clone(),
        })
    }
}

async fn handle_stream(
    stream: TcpStream,
    tls: Option<TlsContext>,
    options: TransportOptions,
    dispatcher: Arc<Dispatcher>,
    id: ConnectionId,
) {
    match tls {
        Some(tls) => match tls.handshake(stream).await {
            Ok(stream) => serve_connection(Transport::new(stream, options), dispatcher, id).await,
            Err(e) => {
                metrics::tls_handshake_failed();
                tracing::debug!(connection_id = %id, error = %e, "Closing connection");
            }
        },
        None => serve_connection(Transport::new(stream, options), dispatcher, id).await,
    }
}
