mod http_metrics_source;

pub use http_metrics_source::HttpMetricsSource;
