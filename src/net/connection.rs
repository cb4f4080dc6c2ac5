//! Connection identity, state and lifetime tracking.
//!
//! # Responsibilities
//! - Generate unique connection IDs for tracing
//! - Name the states a connection moves through
//! - Count live connections so shutdown can wait for them to drain

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

/// Relaxed ordering is enough: IDs only need to be unique.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Allocate the next process-wide ID.
    pub fn next() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Where a connection is in its read → parse → route → respond loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Waiting for a complete message.
    Reading,
    /// A message was framed and parsed into a request.
    Parsed,
    /// A handler (or the static fallback) was chosen.
    Routed,
    /// The completed response is being written.
    Responding,
    /// The transport is closed; the task is ending.
    Closed,
}

/// Counts live connections.
#[derive(Debug, Clone, Default)]
pub struct ConnectionTracker {
    inner: Arc<TrackerInner>,
}

#[derive(Debug, Default)]
struct TrackerInner {
    active: AtomicU64,
    idle: Notify,
}

impl ConnectionTracker {
    /// Create a tracker with no live connections.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new connection. The returned guard releases it on drop.
    pub fn track(&self) -> ConnectionGuard {
        self.inner.active.fetch_add(1, Ordering::SeqCst);
        ConnectionGuard {
            inner: Arc::clone(&self.inner),
            id: ConnectionId::next(),
        }
    }

    /// Number of connections currently counted.
    pub fn active_count(&self) -> u64 {
        self.inner.active.load(Ordering::SeqCst)
    }

    /// Wait until no connection is live, or `grace` has passed.
    ///
    /// Returns `true` if every connection finished in time.
    pub async fn wait_idle(&self, grace: Duration) -> bool {
        let drained = async {
            loop {
                let notified = self.inner.idle.notified();
                if self.active_count() == 0 {
                    return;
                }
                notified.await;
            }
        };
        tokio::time::timeout(grace, drained).await.is_ok()
    }
}

/// Keeps a connection counted for as long as it lives.
#[derive(Debug)]
pub struct ConnectionGuard {
    inner: Arc<TrackerInner>,
    id: ConnectionId,
}

impl ConnectionGuard {
    /// ID assigned when the connection was tracked.
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        if self.inner.active.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.inner.idle.notify_waiters();
        }
        tracing::trace!(connection_id = %self.id, "Connection released");
    }
}
