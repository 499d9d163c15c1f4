//! Metrics Source Port
//!
//! Defines the interface for fetching a metrics snapshot from the engine.

use crate::domain::entities::MetricsSnapshot;
use async_trait::async_trait;

/// Why a single fetch failed.
///
/// The health tracker treats every variant the same way; the distinction
/// only shows up in logs.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unsuccessful status: {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed payload: {0}")]
    Decode(String),
}

/// Source of metrics snapshots.
///
/// This is an outbound port: one call performs one request/response cycle
/// and returns an outcome. Implementations must not touch shared state.
#[async_trait]
pub trait MetricsSource: Send + Sync {
    /// Fetch the current snapshot.
    async fn fetch(&self) -> Result<MetricsSnapshot, FetchError>;
}
