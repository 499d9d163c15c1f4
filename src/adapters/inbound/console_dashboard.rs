//! Console Dashboard
//!
//! Renders a `TelemetryView` as plain text: status badge, error banner,
//! metric cards and the recent operations table.

use crate::application::telemetry_state::TelemetryView;
use crate::domain::entities::{MetricsSnapshot, RECENT_SAMPLE_WINDOW};
use crate::domain::value_objects::ConnectionHealth;
use std::fmt::Write;

const PLACEHOLDER: &str = "-";
const WAITING: &str = "Waiting for engine telemetry...";

/// Render the full dashboard.
pub fn render(view: &TelemetryView) -> String {
    let mut out = String::new();

    // No poll yet reads as active, like the web dashboard did
    let status = view.health.unwrap_or(ConnectionHealth::Online).label();
    let _ = writeln!(out, "Operational Overview [{}]", status);

    if let Some(error) = &view.error {
        let _ = writeln!(out, "! {}", error);
    }
    out.push('\n');

    let snapshot = view.snapshot.as_ref();
    let cards = [
        (
            "Total Tokens Saved",
            snapshot.map(|s| group_thousands(s.total_tokens_saved)),
        ),
        (
            "Avg Latency",
            snapshot.map(|s| format!("{:.2}ms", s.avg_latency_ms)),
        ),
        (
            "Processed Rows",
            snapshot.map(|s| group_thousands(s.total_rows)),
        ),
    ];
    for (title, value) in cards {
        let _ = writeln!(
            out,
            "{:<20} {}",
            title,
            value.as_deref().unwrap_or(PLACEHOLDER)
        );
    }
    out.push('\n');

    render_recent(&mut out, snapshot);
    out
}

fn render_recent(out: &mut String, snapshot: Option<&MetricsSnapshot>) {
    let _ = writeln!(out, "Recent Operations (last {} events)", RECENT_SAMPLE_WINDOW);
    let _ = writeln!(
        out,
        "{:<8} {:<16} {:>10} {:>12} {:>12}  {}",
        "ID", "Operation", "Rows", "Latency", "Tokens Saved", "Timestamp"
    );

    let samples = snapshot.map(|s| s.recent_samples.as_slice()).unwrap_or(&[]);
    if samples.is_empty() {
        let _ = writeln!(out, "{}", WAITING);
        return;
    }

    for sample in samples {
        let _ = writeln!(
            out,
            "{:<8} {:<16} {:>10} {:>12} {:>12}  {}",
            format!("#{}", sample.id),
            sample.operation,
            sample.processed_rows,
            format!("{:.2}ms", sample.latency_ms),
            format!("+{}", sample.tokens_saved),
            sample.timestamp
        );
    }
}

/// Format a count with `,` thousands separators.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
