// src/console/mod.rs
//! Operator `record` commands
//!
//! ```text
//! .record start <session-name> [--map <mapId>] [--radius <float>]
//! .record stop
//! .record status
//! ```
//!
//! Every outcome is a list of reply lines; nothing here fails the caller.

use crate::recording::actor::ActorSnapshot;
use crate::recording::recorder::{EventRecorder, NO_ACTIVE_SESSION};
use std::sync::Arc;
use thiserror::Error;

pub const START_USAGE: &str = "Usage: .record start <session-name> [--map <mapId>] [--radius <float>]";
pub const USAGE: &str = "Usage: .record <start|stop|status>";

/// Parsed operator command
#[derive(Debug, Clone, PartialEq)]
pub enum RecordCommand {
    Start {
        name: String,
        map: Option<u32>,
        radius: Option<f32>,
    },
    Stop,
    Status,
}

/// Reasons a command line is rejected before reaching the recorder
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("{}", START_USAGE)]
    MissingSessionName,

    #[error("Invalid map ID: {0}")]
    InvalidMap(String),

    #[error("Invalid radius: {0}")]
    InvalidRadius(String),

    #[error("Unknown record command '{0}'. {}", USAGE)]
    Unknown(String),

    #[error("{}", USAGE)]
    Empty,
}

impl RecordCommand {
    /// Parse a command line; the `.record`/`record` prefix is optional
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut tokens = strip_prefix(line).split_whitespace();

        match tokens.next() {
            Some("start") => parse_start(tokens),
            Some("stop") => Ok(RecordCommand::Stop),
            Some("status") => Ok(RecordCommand::Status),
            Some(other) => Err(CommandError::Unknown(other.to_string())),
            None => Err(CommandError::Empty),
        }
    }
}

fn strip_prefix(line: &str) -> &str {
    let line = line.trim();
    let line = line.strip_prefix('.').unwrap_or(line);
    match line.strip_prefix("record") {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest,
        _ => line,
    }
}

fn parse_start<'a>(mut tokens: impl Iterator<Item = &'a str>) -> Result<RecordCommand, CommandError> {
    let name = tokens.next().ok_or(CommandError::MissingSessionName)?.to_string();
    let mut map = None;
    let mut radius = None;

    while let Some(token) = tokens.next() {
        match token {
            "--map" => {
                if let Some(value) = tokens.next() {
                    map = Some(
                        value
                            .parse::<u32>()
                            .map_err(|_| CommandError::InvalidMap(value.to_string()))?,
                    );
                }
            }
            "--radius" => {
                if let Some(value) = tokens.next() {
                    let parsed = value
                        .parse::<f32>()
                        .ok()
                        .filter(|r| r.is_finite())
                        .ok_or_else(|| CommandError::InvalidRadius(value.to_string()))?;
                    radius = Some(parsed);
                }
            }
            _ => {}
        }
    }

    Ok(RecordCommand::Start { name, map, radius })
}

/// Command handler bound to a shared recorder
#[derive(Clone)]
pub struct RecordConsole {
    recorder: Arc<EventRecorder>,
}

impl RecordConsole {
    pub fn new(recorder: Arc<EventRecorder>) -> Self {
        Self { recorder }
    }

    /// Handle one command line issued by `operator` (absent on the console)
    pub fn handle(&self, line: &str, operator: Option<&ActorSnapshot>) -> Vec<String> {
        let command = RecordCommand::parse(line);

        if let Ok(RecordCommand::Start { .. }) | Err(CommandError::MissingSessionName)
        | Err(CommandError::InvalidMap(_)) | Err(CommandError::InvalidRadius(_)) = &command
        {
            if let Some(refusal) = self.start_refusal() {
                return vec![refusal];
            }
        }

        match command {
            Ok(command) => self.execute(command, operator),
            Err(e) => vec![e.to_string()],
        }
    }

    /// Execute a parsed command
    pub fn execute(&self, command: RecordCommand, operator: Option<&ActorSnapshot>) -> Vec<String> {
        match command {
            RecordCommand::Start { name, map, radius } => {
                if let Some(refusal) = self.start_refusal() {
                    return vec![refusal];
                }

                match self.recorder.start_session(&name, operator, map, radius) {
                    Ok(_) => vec![
                        format!("Recording started: '{}'", name),
                        self.recorder.session_info(),
                    ],
                    Err(e) => vec![format!("Failed to start recording session: {}", e)],
                }
            }
            RecordCommand::Stop => {
                if !self.recorder.is_active() {
                    return vec![NO_ACTIVE_SESSION.to_string()];
                }

                let info = self.recorder.session_info();
                match self.recorder.stop_session() {
                    Ok(_) => vec!["Recording stopped.".to_string(), info],
                    Err(e) => vec![format!("Failed to stop recording session: {}", e)],
                }
            }
            RecordCommand::Status => {
                if !self.recorder.is_enabled() {
                    return vec!["Event Recorder is disabled.".to_string()];
                }
                vec![self.recorder.session_info()]
            }
        }
    }

    fn start_refusal(&self) -> Option<String> {
        if !self.recorder.is_enabled() {
            Some(
                "Event Recorder is disabled. Set event_recorder.enable = true in the configuration."
                    .to_string(),
            )
        } else if self.recorder.is_active() {
            Some("A recording session is already active. Stop it first with .record stop".to_string())
        } else {
            None
        }
    }
}
