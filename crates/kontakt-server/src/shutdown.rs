//! Graceful shutdown.
//!
//! [`ShutdownSignal`] is a cloneable, one-shot flag that the accept loop and
//! every connection task wait on. [`ConnectionTracker`] counts open
//! connections so the server can drain them before returning.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, Notify};

/// A cloneable shutdown trigger.
///
/// ```rust
/// use kontakt_server::ShutdownSignal;
///
/// let shutdown = ShutdownSignal::new();
/// let other = shutdown.clone();
/// other.trigger();
/// assert!(shutdown.is_shutdown());
/// ```
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    state: Arc<watch::Sender<bool>>,
}

impl ShutdownSignal {
    /// Creates an untriggered signal.
    #[must_use]
    pub fn new() -> Self {
        let (state, _) = watch::channel(false);
        Self {
            state: Arc::new(state),
        }
    }

    /// Creates a signal that triggers on SIGINT or SIGTERM.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn with_os_signals() -> Self {
        let signal = Self::new();
        let trigger = signal.clone();
        tokio::spawn(async move {
            wait_for_os_signal().await;
            trigger.trigger();
        });
        signal
    }

    /// Triggers shutdown. Repeated calls have no further effect.
    pub fn trigger(&self) {
        self.state.send_replace(true);
    }

    /// Returns `true` once shutdown has been triggered.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        *self.state.borrow()
    }

    /// Completes when shutdown is triggered, immediately if it already was.
    pub async fn recv(&self) {
        let mut receiver = self.state.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = receiver.wait_for(|triggered| *triggered).await;
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
async fn wait_for_os_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("Received SIGTERM, shutting down"),
                _ = sigint.recv() => tracing::info!("Received SIGINT, shutting down"),
            }
        }
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "Signal handlers unavailable, falling back to Ctrl+C");
            wait_for_ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_os_signal() {
    wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C, shutting down"),
        Err(e) => {
            tracing::error!(error = %e, "Unable to listen for Ctrl+C; shutdown must be triggered programmatically");
            std::future::pending::<()>().await;
        }
    }
}

/// Counts open connections.
///
/// ```rust
/// use kontakt_server::ConnectionTracker;
///
/// let tracker = ConnectionTracker::new();
/// let token = tracker.acquire();
/// assert_eq!(tracker.active_connections(), 1);
/// drop(token);
/// assert_eq!(tracker.active_connections(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConnectionTracker {
    inner: Arc<TrackerState>,
}

#[derive(Debug, Default)]
struct TrackerState {
    active: AtomicUsize,
    idle: Notify,
}

impl ConnectionTracker {
    /// Creates a tracker with no connections.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection; it is released when the token drops.
    #[must_use]
    pub fn acquire(&self) -> ConnectionToken {
        self.inner.active.fetch_add(1, Ordering::SeqCst);
        ConnectionToken {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Number of open connections.
    #[must_use]
    pub fn active_connections(&self) -> usize {
        self.inner.active.load(Ordering::SeqCst)
    }

    /// Completes once no connections are open.
    pub async fn wait_idle(&self) {
        loop {
            let idle = self.inner.idle.notified();
            if self.active_connections() == 0 {
                return;
            }
            idle.await;
        }
    }
}

/// Keeps a connection counted while alive.
#[derive(Debug)]
pub struct ConnectionToken {
    inner: Arc<TrackerState>,
}

impl Drop for ConnectionToken {
    fn drop(&mut self) {
        if self.inner.active.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.inner.idle.notify_waiters();
        }
    }
}
