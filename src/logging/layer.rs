// src/logging/layer.rs
//! `tracing` integration for the JSONL appender
//!
//! The event target becomes the logger name, the `message` field the text and
//! a `param` field the template parameter. Other fields are appended to the
//! text as `key=value` so context extraction can see them.

use crate::logging::appender::{AppenderConfig, JsonlAppender};
use crate::logging::message::{LogLevel, LogMessage};
use crate::utils::config::TransformConfig;
use crate::utils::errors::Result;
use std::fmt::{self, Write as _};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Layer writing every event through a [`JsonlAppender`]
pub struct JsonlLayer {
    appender: Arc<JsonlAppender>,
    failed_writes: Arc<AtomicU64>,
}

impl JsonlLayer {
    pub fn new(appender: Arc<JsonlAppender>) -> Self {
        Self {
            appender,
            failed_writes: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Build the appender from the transform section of the configuration
    pub fn from_config(config: &TransformConfig) -> Result<Self> {
        let appender = JsonlAppender::new(AppenderConfig::from_transform(config))?;
        Ok(Self::new(Arc::new(appender)))
    }

    pub fn appender(&self) -> &Arc<JsonlAppender> {
        &self.appender
    }

    /// Writes that failed; they cannot be reported through `tracing`
    pub fn failed_writes(&self) -> u64 {
        self.failed_writes.load(Ordering::Relaxed)
    }
}

impl<S> Layer<S> for JsonlLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let metadata = event.metadata();
        let message = LogMessage::new(LogLevel::from(*metadata.level()), metadata.target(), visitor.text())
            .with_param(visitor.param.unwrap_or_default());

        if self.appender.write(&message).is_err() {
            self.failed_writes.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    extra: String,
    param: Option<String>,
}

impl MessageVisitor {
    fn text(&self) -> String {
        if self.extra.is_empty() {
            self.message.clone()
        } else if self.message.is_empty() {
            self.extra.trim_start().to_string()
        } else {
            format!("{}{}", self.message, self.extra)
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            "param" => self.param = Some(value.to_string()),
            name => {
                let _ = write!(self.extra, " {}={}", name, value);
            }
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "message" => self.message = format!("{:?}", value),
            "param" => self.param = Some(format!("{:?}", value)),
            name => {
                let _ = write!(self.extra, " {}={:?}", name, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::fs;
    use tempfile::tempdir;
    use tracing_subscriber::layer::SubscriberExt;

    #[test]
    fn test_events_reach_appender() {
        let dir = tempdir().unwrap();
        let appender = Arc::new(
            JsonlAppender::new(
                AppenderConfig::new("Jsonl", dir.path(), "Server.jsonl").with_min_level(LogLevel::Trace),
            )
            .unwrap(),
        );
        let subscriber = tracing_subscriber::registry().with(JsonlLayer::new(Arc::clone(&appender)));

        tracing::subscriber::with_default(subscriber, || {
            tracing::error!(target: "entities.unit", "Loading creature_template entry 1234 failed");
            tracing::info!(target: "maps.grid", map = 36, "Grid loaded");
            tracing::debug!(target: "module.test", "plain");
        });

        let lines: Vec<Value> = fs::read_to_string(dir.path().join("Server.jsonl"))
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["sev"], "error");
        assert_eq!(lines[0]["cat"], "creature");
        assert_eq!(lines[0]["ctx"]["entry"], 1234);

        assert_eq!(lines[1]["cat"], "map");
        assert_eq!(lines[1]["msg"], "Grid loaded map=36");
        assert_eq!(lines[1]["ctx"]["map"], 36);

        assert_eq!(lines[2]["sev"], "debug");
        assert_eq!(lines[2]["cat"], "module");
        assert!(lines[2].get("ctx").is_none());
    }

    #[test]
    fn test_param_field_selects_file() {
        let dir = tempdir().unwrap();
        let appender = Arc::new(JsonlAppender::new(AppenderConfig::new("Jsonl", dir.path(), "Player_%s.jsonl")).unwrap());
        let subscriber = tracing_subscriber::registry().with(JsonlLayer::new(appender));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "entities.player", param = "Jaina", "Player logged in");
        });

        let content = fs::read_to_string(dir.path().join("Player_Jaina.jsonl")).unwrap();
        let record: Value = serde_json::from_str(content.trim()).unwrap();
        assert_eq!(record["msg"], "Player logged in");
    }
}
