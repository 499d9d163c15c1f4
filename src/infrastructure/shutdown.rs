//! Poll Loop Shutdown
//!
//! Stop signal for the poll loop, in-flight fetch accounting and OS signal
//! handling for the binary.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Notify};

/// Stop signal and in-flight fetch counter shared by one poll loop.
///
/// Whether polling was already stopped is tracked by the telemetry state,
/// not here.
#[derive(Clone)]
pub struct PollShutdown {
    stop_tx: broadcast::Sender<()>,
    in_flight: Arc<AtomicUsize>,
    drained: Arc<Notify>,
}

impl PollShutdown {
    pub fn new() -> Self {
        let (stop_tx, _) = broadcast::channel(1);
        Self {
            stop_tx,
            in_flight: Arc::new(AtomicUsize::new(0)),
            drained: Arc::new(Notify::new()),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.stop_tx.subscribe()
    }

    /// Tell the poll loop to exit.
    pub fn signal(&self) {
        let _ = self.stop_tx.send(());
    }

    /// Number of fetches issued but not yet resolved.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Count a fetch as in flight until the guard is dropped.
    pub fn fetch_guard(&self) -> FetchGuard {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        FetchGuard {
            shutdown: self.clone(),
        }
    }

    /// Wait until no fetch is in flight, giving up after `timeout`.
    pub async fn wait_for_drain(&self, timeout: Duration) -> bool {
        // Register before checking so a drop in between is not missed.
        let notified = self.drained.notified();
        if self.in_flight() == 0 {
            return true;
        }

        tokio::select! {
            _ = notified => true,
            _ = tokio::time::sleep(timeout) => {
                tracing::warn!("drain timeout: {} fetches still in flight", self.in_flight());
                false
            }
        }
    }
}

impl Default for PollShutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Held by a fetch task; dropped when the task finishes or is aborted.
pub struct FetchGuard {
    shutdown: PollShutdown,
}

impl Drop for FetchGuard {
    fn drop(&mut self) {
        if self.shutdown.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.shutdown.drained.notify_waiters();
        }
    }
}

/// Completes when Ctrl+C or SIGTERM is received.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received Ctrl+C, stopping telemetry client");
        }
        _ = terminate => {
            tracing::info!("received SIGTERM, stopping telemetry client");
        }
    }
}
