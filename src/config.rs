use crate::application::live_telemetry::PollConfig;
use std::fmt;
use std::time::Duration;

#[derive(Clone)]
pub struct Config {
    pub metrics_url: String,
    pub api_token: String,
    pub poll_interval_ms: u64,
    pub drain_timeout_ms: u64,
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            metrics_url: "http://localhost:8080/metrics".to_string(),
            api_token: "viewer-secret".to_string(),
            poll_interval_ms: 2000,
            drain_timeout_ms: 1000,
            debug: false,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("metrics_url", &self.metrics_url)
            .field("api_token", &"<redacted>")
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("drain_timeout_ms", &self.drain_timeout_ms)
            .field("debug", &self.debug)
            .finish()
    }
}

impl Config {
    /// Build a config from a variable lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let metrics_url = lookup("UDO_METRICS_URL").unwrap_or(defaults.metrics_url);
        if !metrics_url.starts_with("http://") && !metrics_url.starts_with("https://") {
            anyhow::bail!("UDO_METRICS_URL must be an http(s) URL, got {}", metrics_url);
        }

        let api_token = lookup("UDO_API_TOKEN")
            .or_else(|| lookup("UDO_VIEWER_KEY"))
            .unwrap_or(defaults.api_token);

        let poll_interval_ms = lookup("UDO_POLL_INTERVAL_MS")
            .and_then(|v| v.parse().ok())
            .filter(|ms: &u64| *ms > 0)
            .unwrap_or(defaults.poll_interval_ms);

        let drain_timeout_ms = lookup("UDO_DRAIN_TIMEOUT_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.drain_timeout_ms);

        let debug = lookup("DEBUG").is_some();

        Ok(Config {
            metrics_url,
            api_token,
            poll_interval_ms,
            drain_timeout_ms,
            debug,
        })
    }

    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            interval: Duration::from_millis(self.poll_interval_ms),
            drain_timeout: Duration::from_millis(self.drain_timeout_ms),
        }
    }
}

pub fn load_config() -> anyhow::Result<Config> {
    Config::from_lookup(|key| std::env::var(key).ok())
}
