mod metrics_source;

pub use metrics_source::{FetchError, MetricsSource};
