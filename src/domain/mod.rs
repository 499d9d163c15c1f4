//! Domain Layer
//!
//! Telemetry types and the outbound port used to fetch them.

pub mod entities;
pub mod ports;
pub mod value_objects;

pub use entities::{MetricSample, MetricsSnapshot, RECENT_SAMPLE_WINDOW};
pub use value_objects::ConnectionHealth;
