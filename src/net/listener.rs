//! Bounded accept loop primitive.
//!
//! # Responsibilities
//! - Own the listening socket for one port
//! - Hand out at most `max_connections` live connections at a time
//!
//! # Design Decisions
//! - A slot is reserved before `accept`, so a full server stops pulling
//!   connections off the backlog instead of accepting and dropping them

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("cannot listen on {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
    #[error("accept: {0}")]
    Accept(#[source] std::io::Error),
    #[error("connection slots were closed")]
    Closed,
}

/// Listening socket plus a fixed pool of connection slots.
#[derive(Debug)]
pub struct Listener {
    socket: TcpListener,
    slots: Arc<Semaphore>,
    max_connections: usize,
}

impl Listener {
    /// Listen on `address` (`host:port`, port 0 for an ephemeral one).
    pub async fn bind(address: &str, max_connections: usize) -> Result<Self, ListenerError> {
        let socket = TcpListener::bind(address)
            .await
            .map_err(|source| ListenerError::Bind {
                address: address.to_string(),
                source,
            })?;
        Ok(Self::from_tcp(socket, max_connections))
    }

    /// Wrap an already bound socket.
    pub fn from_tcp(socket: TcpListener, max_connections: usize) -> Self {
        if let Ok(address) = socket.local_addr() {
            tracing::info!(address = %address, max_connections, "Listening");
        }
        Self {
            socket,
            slots: Arc::new(Semaphore::new(max_connections)),
            max_connections,
        }
    }

    /// Wait for a free slot, then for the next peer.
    ///
    /// The slot stays taken until the returned [`ConnectionPermit`] drops.
    pub async fn accept(&self) -> Result<(TcpStream, SocketAddr, ConnectionPermit), ListenerError> {
        let slot = Arc::clone(&self.slots)
            .acquire_owned()
            .await
            .map_err(|_| ListenerError::Closed)?;

        let (stream, peer_addr) = self.socket.accept().await.map_err(ListenerError::Accept)?;
        tracing::debug!(
            peer_addr = %peer_addr,
            free_slots = self.slots.available_permits(),
            "Accepted"
        );

        Ok((stream, peer_addr, ConnectionPermit { _slot: slot }))
    }

    /// Address actually bound, useful after binding port 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Slots not currently held by a connection.
    pub fn available_permits(&self) -> usize {
        self.slots.available_permits()
    }

    /// Configured slot count.
    pub fn max_connections(&self) -> usize {
        self.max_connections
    }
}

/// One taken slot; given back on drop, including when the connection task
/// panics.
#[derive(Debug)]
pub struct ConnectionPermit {
    _slot: OwnedSemaphorePermit,
}
