//! Shutdown coordination.

use std::sync::Arc;

use tokio::sync::watch;

/// Coordinator for graceful shutdown.
///
/// Every long-running accept loop holds a [`ShutdownSignal`]; triggering the
/// coordinator makes all of them stop accepting. A signal obtained after the
/// trigger still observes it.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    /// Create a coordinator that has not fired.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// New receiver; sees a trigger that already happened.
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Tell every subscriber to stop.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    /// Whether shutdown has been triggered.
    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side of [`Shutdown`].
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Resolve once shutdown has been triggered.
    ///
    /// If the coordinator is dropped without triggering, this never resolves.
    pub async fn recv(&mut self) {
        let dropped = self.rx.wait_for(|&triggered| triggered).await.is_err();
        if dropped {
            std::future::pending::<()>().await;
        }
    }
}
