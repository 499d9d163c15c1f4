//! Domain Entities - Telemetry data returned by the engine
//!
//! These mirror the JSON payload of the engine's `/metrics` endpoint.
//! Counts are unsigned so a negative value fails to decode.

use serde::{Deserialize, Serialize};

/// Number of samples the engine includes in `recent_metrics`.
pub const RECENT_SAMPLE_WINDOW: usize = 10;

/// One recorded processing operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    /// Server-assigned ordinal id, unique within a snapshot
    pub id: u64,
    /// When the operation completed, as sent by the server
    pub timestamp: String,
    /// Rows processed by the operation
    pub processed_rows: u64,
    /// Duration of the operation
    pub latency_ms: f64,
    /// Tokens saved by the operation
    pub tokens_saved: u64,
    /// Kind of operation (e.g. "prune")
    pub operation: String,
}

/// Aggregate metrics fetched on one poll.
///
/// A snapshot always replaces the previous one as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Cumulative processed rows
    pub total_rows: u64,
    /// Average operation latency
    #[serde(rename = "avg_latency")]
    pub avg_latency_ms: f64,
    /// Cumulative tokens saved
    pub total_tokens_saved: u64,
    /// Most recent samples, newest first
    #[serde(rename = "recent_metrics")]
    pub recent_samples: Vec<MetricSample>,
}

impl MetricsSnapshot {
    /// Newest sample, if any.
    pub fn latest_sample(&self) -> Option<&MetricSample> {
        self.recent_samples.first()
    }

    pub fn is_empty(&self) -> bool {
        self.recent_samples.is_empty()
    }
}
