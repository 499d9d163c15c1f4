//! Telemetry State
//!
//! Holds the latest snapshot, the error slot and the connection health.
//! Only the poll loop mutates it; everyone else reads a `TelemetryView`.

use crate::domain::entities::MetricsSnapshot;
use crate::domain::value_objects::ConnectionHealth;
use std::time::Instant;

/// Message shown when a poll fails, whatever the cause.
pub const CONNECTION_FAILED_MESSAGE: &str = "Failed to connect to UDO Engine API (is it running?)";

/// Read-only copy of the state handed to the view layer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TelemetryView {
    /// Latest successfully fetched snapshot
    pub snapshot: Option<MetricsSnapshot>,
    /// Set after a failed poll, cleared by the next successful one
    pub error: Option<String>,
    /// None until the first poll completes
    pub health: Option<ConnectionHealth>,
    pub polls_succeeded: u64,
    pub polls_failed: u64,
    /// Outcomes dropped because a newer one was already applied
    pub stale_discarded: u64,
}

/// What applying an outcome did to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyResult {
    /// Outcome applied. `changed` holds the new health if it differs from before.
    Applied { changed: Option<ConnectionHealth> },
    /// A newer outcome was already applied
    Stale,
    /// The client has been torn down
    Closed,
}

/// Mutable state owned by one telemetry client.
#[derive(Debug, Default)]
pub struct TelemetryState {
    view: TelemetryView,
    /// Sequence number handed to the most recently issued fetch
    last_issued: u64,
    /// Sequence number of the most recently applied outcome
    last_applied: u64,
    last_update: Option<Instant>,
    closed: bool,
}

impl TelemetryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next fetch sequence number. Starts at 1.
    pub(crate) fn issue(&mut self) -> u64 {
        self.last_issued += 1;
        self.last_issued
    }

    /// Apply a successful fetch: replace the snapshot, clear the error, go Online.
    pub(crate) fn apply_success(&mut self, seq: u64, snapshot: MetricsSnapshot) -> ApplyResult {
        if let Some(rejected) = self.admit(seq) {
            return rejected;
        }
        self.view.snapshot = Some(snapshot);
        self.view.error = None;
        self.view.polls_succeeded += 1;
        self.set_health(ConnectionHealth::Online)
    }

    /// Apply a failed fetch: keep the snapshot, set the error, go Offline.
    pub(crate) fn apply_failure(&mut self, seq: u64) -> ApplyResult {
        if let Some(rejected) = self.admit(seq) {
            return rejected;
        }
        self.view.error = Some(CONNECTION_FAILED_MESSAGE.to_string());
        self.view.polls_failed += 1;
        self.set_health(ConnectionHealth::Offline)
    }

    /// Refuse every later outcome. Returns `true` only on the first call.
    pub(crate) fn close(&mut self) -> bool {
        !std::mem::replace(&mut self.closed, true)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn view(&self) -> TelemetryView {
        self.view.clone()
    }

    pub fn snapshot(&self) -> Option<&MetricsSnapshot> {
        self.view.snapshot.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.view.error.as_deref()
    }

    pub fn health(&self) -> Option<ConnectionHealth> {
        self.view.health
    }

    pub fn last_update(&self) -> Option<Instant> {
        self.last_update
    }

    /// Gate an outcome on teardown and ordering.
    ///
    /// An outcome is dropped only if a newer one was already applied, not
    /// whenever a newer fetch has been issued. Otherwise fetches slower than
    /// the poll interval would never be applied.
    fn admit(&mut self, seq: u64) -> Option<ApplyResult> {
        if self.closed {
            return Some(ApplyResult::Closed);
        }
        if seq <= self.last_applied {
            self.view.stale_discarded += 1;
            return Some(ApplyResult::Stale);
        }
        self.last_applied = seq;
        self.last_update = Some(Instant::now());
        None
    }

    fn set_health(&mut self, health: ConnectionHealth) -> ApplyResult {
        let previous = self.view.health.replace(health);
        let changed = (previous != Some(health)).then_some(health);
        ApplyResult::Applied { changed }
    }
}
