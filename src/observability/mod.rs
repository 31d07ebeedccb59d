// src/observability/mod.rs
//! Tracing and metrics setup
//!
//! The binary installs a `fmt` layer filtered by `RUST_LOG` (default `info`),
//! plus the JSONL transform layer when it is configured. Metric counters are
//! described here and recorded through the `metrics` facade; installing an
//! exporter is left to the embedding process.

use crate::logging::JsonlLayer;
use anyhow::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Metric names
pub mod metrics {
    pub const EVENTS_RECORDED: &str = "recorder_events_recorded_total";
    pub const EVENTS_DROPPED: &str = "recorder_events_dropped_total";
    pub const EVENTS_FILTERED: &str = "recorder_events_filtered_total";
    pub const SESSIONS_STARTED: &str = "recorder_sessions_started_total";
    pub const TRANSFORM_RECORDS: &str = "transform_records_written_total";
    pub const TRANSFORM_ROTATIONS: &str = "transform_rotations_total";
}

/// Initialize the global tracing subscriber
pub fn init_tracing(jsonl: Option<JsonlLayer>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .with(jsonl)
        .try_init()?;

    Ok(())
}

/// Describe the counters this crate records
pub fn init_metrics() -> Result<()> {
    ::metrics::describe_counter!(metrics::EVENTS_RECORDED, "Events written to session files");
    ::metrics::describe_counter!(
        metrics::EVENTS_DROPPED,
        "Events dropped after the session ceiling was reached"
    );
    ::metrics::describe_counter!(
        metrics::EVENTS_FILTERED,
        "Events rejected by the session filter"
    );
    ::metrics::describe_counter!(metrics::SESSIONS_STARTED, "Recording sessions started");
    ::metrics::describe_counter!(
        metrics::TRANSFORM_RECORDS,
        "Structured log records written"
    );
    ::metrics::describe_counter!(metrics::TRANSFORM_ROTATIONS, "Structured log file rotations");

    Ok(())
}
