//! UDO Telemetry Library
//!
//! Live telemetry client for the UDO engine: polls the engine's metrics
//! endpoint, tracks connection health and renders a text dashboard.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use adapters::outbound::HttpMetricsSource;
pub use application::{LiveTelemetryClient, PollConfig, PollerHandle, TelemetryView};
pub use config::load_config;
pub use domain::entities::{MetricSample, MetricsSnapshot};
pub use domain::ports::{FetchError, MetricsSource};
pub use domain::value_objects::ConnectionHealth;
