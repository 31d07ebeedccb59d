// src/logging/mod.rs
//! Structured log transform
//!
//! Turns free-text diagnostic messages into typed JSON lines:
//!
//! ```text
//! LogMessage ──► classify(logger) ──► LogContext::extract(text) ──► JsonlAppender ──► file
//!                                                                   (rotate by size)
//! ```
//!
//! - **message**: Severity levels and the message envelope
//! - **category**: Logger name → short category
//! - **context**: Best-effort numeric field extraction
//! - **appender**: Line writer with size rotation and templated file names
//! - **layer**: `tracing_subscriber::Layer` feeding `tracing` events to an appender

pub mod appender;
pub mod category;
pub mod context;
pub mod layer;
pub mod message;

pub use appender::{format_record, AppenderConfig, DiagnosticRecord, JsonlAppender, OpenMode, OutputTarget};
pub use category::classify;
pub use context::LogContext;
pub use layer::JsonlLayer;
pub use message::{LogLevel, LogMessage};
