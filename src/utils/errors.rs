// src/utils/errors.rs
//! Error types for the recorder and the structured log transform

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type used across the crate
pub type Result<T> = std::result::Result<T, RecorderError>;

/// Errors surfaced to the operator.
///
/// Hitting the event ceiling or passing an absent actor to a record entry
/// point is never an error; those are handled inside the recorder.
#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("event recorder is disabled")]
    Disabled,

    #[error("a recording session is already active")]
    AlreadyActive,

    #[error("no active recording session")]
    NotActive,

    #[error("invalid session name: {0:?}")]
    InvalidSessionName(String),

    #[error("failed to create output directory '{}': {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to open output file '{}': {source}", path.display())]
    OpenFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write record: {0}")]
    Write(#[from] io::Error),

    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid appender arguments: {0}")]
    InvalidAppenderArgs(String),
}
