//! udo-telemetry - terminal dashboard for the UDO engine
//!
//! Composition root: wires the HTTP metrics source into the live client and
//! redraws the dashboard after every poll.

use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;
use udo_telemetry::adapters::inbound::console_dashboard;
use udo_telemetry::infrastructure::shutdown_signal;
use udo_telemetry::{load_config, HttpMetricsSource, LiveTelemetryClient, MetricsSource};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let cfg = load_config()?;

    // Setup logging
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("starting udo-telemetry url={}", cfg.metrics_url);

    let source: Arc<dyn MetricsSource> =
        Arc::new(HttpMetricsSource::new(cfg.metrics_url.clone(), cfg.api_token.clone())?);

    let client = LiveTelemetryClient::new(source, cfg.poll_config()).on_update(|view| {
        // Clear screen and redraw
        print!("\x1b[2J\x1b[H{}", console_dashboard::render(view));
    });

    let last = client.run_until(shutdown_signal()).await;

    tracing::info!(
        "stopped after {} ok / {} failed polls",
        last.polls_succeeded,
        last.polls_failed
    );

    Ok(())
}
