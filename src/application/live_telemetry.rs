//! Live Telemetry Client
//!
//! Polls a `MetricsSource` at a fixed cadence and keeps the latest snapshot
//! and connection health. Polling runs until the returned `PollerHandle` is
//! stopped or dropped.

use crate::application::telemetry_state::{ApplyResult, TelemetryState, TelemetryView};
use crate::domain::ports::MetricsSource;
use crate::domain::value_objects::ConnectionHealth;
use crate::infrastructure::shutdown::PollShutdown;
use parking_lot::{RwLock, RwLockWriteGuard};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;

type HealthCallback = Arc<dyn Fn(ConnectionHealth) + Send + Sync>;
type UpdateCallback = Arc<dyn Fn(&TelemetryView) + Send + Sync>;

/// Poll loop configuration.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Time between two fetches
    pub interval: Duration,
    /// How long `stop` waits for in-flight fetches to wind down
    pub drain_timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2000),
            drain_timeout: Duration::from_millis(1000),
        }
    }
}

/// Everything a fetch task needs to apply its outcome.
struct Poller {
    source: Arc<dyn MetricsSource>,
    state: Arc<RwLock<TelemetryState>>,
    shutdown: PollShutdown,
    on_health_change: Option<HealthCallback>,
    on_update: Option<UpdateCallback>,
}

impl Poller {
    /// Run one fetch tagged with `seq` and apply its outcome.
    ///
    /// Callbacks run while a read guard is held, so `PollerHandle::cancel`
    /// (which takes the write lock) returns only after they have finished.
    async fn poll(&self, seq: u64) -> ApplyResult {
        let outcome = self.source.fetch().await;

        let mut state = self.state.write();
        let result = match outcome {
            Ok(snapshot) => {
                tracing::debug!(
                    "metrics poll #{} ok: total_rows={} samples={}",
                    seq,
                    snapshot.total_rows,
                    snapshot.recent_samples.len()
                );
                state.apply_success(seq, snapshot)
            }
            Err(e) => {
                tracing::warn!("metrics poll #{} failed: {}", seq, e);
                state.apply_failure(seq)
            }
        };
        // Atomic downgrade: no close can slip in between apply and notify.
        let state = RwLockWriteGuard::downgrade(state);

        match result {
            ApplyResult::Applied { changed } if !state.is_closed() => {
                if let Some(health) = changed {
                    match health {
                        ConnectionHealth::Online => tracing::info!("metrics engine is online"),
                        ConnectionHealth::Offline => tracing::warn!("metrics engine is offline"),
                    }
                    if let Some(callback) = &self.on_health_change {
                        callback(health);
                    }
                }
                if let Some(callback) = &self.on_update {
                    callback(&state.view());
                }
            }
            ApplyResult::Stale => {
                tracing::debug!("discarding stale outcome of poll #{}", seq);
            }
            _ => {
                tracing::debug!("ignoring outcome of poll #{} after stop", seq);
            }
        }

        result
    }

    /// Issue one fetch and apply its outcome.
    async fn poll_next(&self) -> ApplyResult {
        let seq = self.state.write().issue();
        self.poll(seq).await
    }

    async fn run(self: Arc<Self>, interval: Duration, mut shutdown_rx: broadcast::Receiver<()>) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut fetches = JoinSet::new();

        loop {
            tokio::select! {
                biased;

                _ = shutdown_rx.recv() => break,
                _ = ticker.tick() => {
                    let seq = self.state.write().issue();
                    let guard = self.shutdown.fetch_guard();
                    let poller = self.clone();
                    fetches.spawn(async move {
                        let _guard = guard;
                        poller.poll(seq).await;
                    });
                }
                Some(joined) = fetches.join_next(), if !fetches.is_empty() => {
                    if let Err(e) = joined {
                        if e.is_panic() {
                            tracing::error!("metrics poll task panicked: {}", e);
                        }
                    }
                }
            }
        }

        fetches.abort_all();
    }
}

/// Client that keeps a live view of the engine's metrics.
pub struct LiveTelemetryClient {
    config: PollConfig,
    inner: Poller,
}

impl LiveTelemetryClient {
    pub fn new(source: Arc<dyn MetricsSource>, config: PollConfig) -> Self {
        Self {
            config,
            inner: Poller {
                source,
                state: Arc::new(RwLock::new(TelemetryState::new())),
                shutdown: PollShutdown::new(),
                on_health_change: None,
                on_update: None,
            },
        }
    }

    /// Set callback invoked when the connection health changes.
    pub fn on_health_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(ConnectionHealth) + Send + Sync + 'static,
    {
        self.inner.on_health_change = Some(Arc::new(callback));
        self
    }

    /// Set callback invoked after every applied poll outcome.
    pub fn on_update<F>(mut self, callback: F) -> Self
    where
        F: Fn(&TelemetryView) + Send + Sync + 'static,
    {
        self.inner.on_update = Some(Arc::new(callback));
        self
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    pub fn view(&self) -> TelemetryView {
        self.inner.state.read().view()
    }

    pub fn health(&self) -> Option<ConnectionHealth> {
        self.inner.state.read().health()
    }

    /// Perform a single poll without starting the schedule.
    pub async fn poll_once(&self) -> ApplyResult {
        self.inner.poll_next().await
    }

    /// Start polling: one fetch right away, then one per interval.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(self) -> PollerHandle {
        let shutdown_rx = self.inner.shutdown.subscribe();
        let inner = Arc::new(self.inner);

        tracing::info!(
            "telemetry polling started (interval={}ms)",
            self.config.interval.as_millis()
        );

        let task = tokio::spawn(inner.clone().run(self.config.interval, shutdown_rx));

        PollerHandle {
            inner,
            task: Some(task),
            drain_timeout: self.config.drain_timeout,
        }
    }

    /// Poll until `until` completes, then stop.
    ///
    /// Polling is cancelled on every exit path, including when this future
    /// is dropped early.
    pub async fn run_until<F>(self, until: F) -> TelemetryView
    where
        F: Future<Output = ()>,
    {
        let handle = self.start();
        until.await;
        handle.stop().await
    }
}

/// Owned handle to a running poll loop.
///
/// Dropping the handle cancels polling; `stop` also waits for the loop to end.
pub struct PollerHandle {
    inner: Arc<Poller>,
    task: Option<JoinHandle<()>>,
    drain_timeout: Duration,
}

impl PollerHandle {
    pub fn view(&self) -> TelemetryView {
        self.inner.state.read().view()
    }

    pub fn health(&self) -> Option<ConnectionHealth> {
        self.inner.state.read().health()
    }

    pub fn is_running(&self) -> bool {
        !self.inner.state.read().is_closed()
    }

    /// Fetches issued but not yet resolved.
    pub fn in_flight(&self) -> usize {
        self.inner.shutdown.in_flight()
    }

    // Taking the write lock waits out any callback still running, and closing
    // first means no outcome lands after this returns.
    fn cancel(&self) {
        if self.inner.state.write().close() {
            self.inner.shutdown.signal();
            tracing::info!("telemetry polling stopped");
        }
    }

    /// Stop polling and return the final view.
    pub async fn stop(mut self) -> TelemetryView {
        self.cancel();

        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if e.is_panic() {
                    tracing::error!("telemetry poll loop panicked: {}", e);
                }
            }
        }

        self.inner
            .shutdown
            .wait_for_drain(self.drain_timeout)
            .await;

        self.view()
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
