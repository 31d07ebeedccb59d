// src/logging/message.rs
//! Diagnostic message envelope

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Message severity, most severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Fatal,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Numeric rank used by appender arguments (1 = trace … 6 = fatal)
    pub fn rank(&self) -> u8 {
        match self {
            LogLevel::Trace => 1,
            LogLevel::Debug => 2,
            LogLevel::Info => 3,
            LogLevel::Warn => 4,
            LogLevel::Error => 5,
            LogLevel::Fatal => 6,
        }
    }

    pub fn from_rank(rank: u8) -> Option<Self> {
        match rank {
            1 => Some(LogLevel::Trace),
            2 => Some(LogLevel::Debug),
            3 => Some(LogLevel::Info),
            4 => Some(LogLevel::Warn),
            5 => Some(LogLevel::Error),
            6 => Some(LogLevel::Fatal),
            _ => None,
        }
    }

    /// Whether a message at this level clears the `min` threshold
    pub fn passes(&self, min: LogLevel) -> bool {
        self.rank() >= min.rank()
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(rank) = s.parse::<u8>() {
            return LogLevel::from_rank(rank).ok_or_else(|| format!("unknown log level {}", rank));
        }

        match s.to_ascii_lowercase().as_str() {
            "fatal" => Ok(LogLevel::Fatal),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

impl From<tracing::Level> for LogLevel {
    fn from(level: tracing::Level) -> Self {
        if level == tracing::Level::ERROR {
            LogLevel::Error
        } else if level == tracing::Level::WARN {
            LogLevel::Warn
        } else if level == tracing::Level::INFO {
            LogLevel::Info
        } else if level == tracing::Level::DEBUG {
            LogLevel::Debug
        } else {
            LogLevel::Trace
        }
    }
}

/// One diagnostic message
#[derive(Debug, Clone)]
pub struct LogMessage {
    pub level: LogLevel,

    /// Originating logger, e.g. `entities.unit` or `sql.sql`
    pub logger: String,

    pub text: String,

    /// Substituted into templated file names
    pub param: String,

    pub timestamp: DateTime<Local>,
}

impl LogMessage {
    pub fn new(level: LogLevel, logger: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            level,
            logger: logger.into(),
            text: text.into(),
            param: String::new(),
            timestamp: Local::now(),
        }
    }

    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.param = param.into();
        self
    }
}
