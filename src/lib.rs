// src/lib.rs
//! World Recorder Library
//!
//! Live capture of simulation events into per-session JSONL files, plus a
//! structured log transform that turns diagnostic messages into JSONL records.
//!
//! # Architecture
//!
//! - **recording**: Session manager, filter engine, event serializer, hooks
//! - **logging**: JSONL appender, category/context extraction, `tracing` layer
//! - **console**: Operator `record start|stop|status` commands
//! - **observability**: Tracing subscriber and metric setup
//! - **utils**: Configuration and errors

// Public module exports
pub mod console;
pub mod logging;
pub mod observability;
pub mod recording;
pub mod utils;

// Re-export commonly used types
pub use console::{RecordCommand, RecordConsole};
pub use logging::{JsonlAppender, JsonlLayer, LogLevel, LogMessage};
pub use recording::{ActorSnapshot, EventRecorder, RecorderHooks, SessionSummary, SpellInfo};
pub use utils::config::{AppConfig, RecorderConfig, TransformConfig};
pub use utils::errors::{RecorderError, Result};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
