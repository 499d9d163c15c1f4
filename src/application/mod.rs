//! Application Layer
//!
//! The polling scheduler and the state it maintains.

pub mod live_telemetry;
pub mod telemetry_state;

pub use live_telemetry::{LiveTelemetryClient, PollConfig, PollerHandle};
pub use telemetry_state::{ApplyResult, TelemetryState, TelemetryView, CONNECTION_FAILED_MESSAGE};
