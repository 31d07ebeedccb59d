// src/recording/session.rs
//! A single bounded recording interval
//!
//! Owns the output file, the monotonic clock and the event counter. Every
//! method is called with the recorder's lock held, so writes, offsets and
//! counts reach the file in one total order.

use crate::recording::filter::SessionFilter;
use crate::recording::serializer::{overflow_marker, start_marker, stop_marker, EventRecord};
use crate::utils::errors::{RecorderError, Result};
use chrono::Local;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info};

/// Extension of session files
pub const SESSION_FILE_EXT: &str = "jsonl";

/// Outcome of a capture attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    Written,

    /// Ceiling reached; `first` is set on the drop that emitted the notice
    Dropped { first: bool },
}

/// Final figures of a stopped session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub name: String,
    pub path: PathBuf,
    pub duration_secs: f64,
    pub events_captured: u32,
    pub events_dropped: u64,
}

/// Active recording session
pub struct RecordingSession {
    name: String,
    path: PathBuf,
    filter: SessionFilter,
    started_at: Instant,
    max_events: u32,
    event_count: u32,
    events_dropped: u64,
    overflowed: bool,
    writer: BufWriter<File>,
}

impl RecordingSession {
    /// Create the output file and write the `record_start` marker
    pub fn open(name: &str, output_dir: &Path, filter: SessionFilter, max_events: u32) -> Result<Self> {
        validate_session_name(name)?;

        fs::create_dir_all(output_dir).map_err(|source| RecorderError::CreateDir {
            path: output_dir.to_path_buf(),
            source,
        })?;

        let path = session_file_path(output_dir, name);
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|source| RecorderError::OpenFile {
                path: path.clone(),
                source,
            })?;

        let mut session = Self {
            name: name.to_string(),
            path,
            filter,
            started_at: Instant::now(),
            max_events,
            event_count: 0,
            events_dropped: 0,
            overflowed: false,
            writer: BufWriter::new(file),
        };

        let file_name = session.path.to_string_lossy();
        let marker = start_marker(&session.name, session.filter.map_id, &file_name);
        write_line(&mut session.writer, &marker)?;

        Ok(session)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn filter(&self) -> &SessionFilter {
        &self.filter
    }

    pub fn event_count(&self) -> u32 {
        self.event_count
    }

    pub fn max_events(&self) -> u32 {
        self.max_events
    }

    pub fn events_dropped(&self) -> u64 {
        self.events_dropped
    }

    /// Seconds since activation on the monotonic clock
    pub fn elapsed_secs(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }

    /// Write one event unless the ceiling is reached.
    ///
    /// The record is only built when it will be written.
    pub fn capture<'e, F>(&mut self, build: F) -> Result<CaptureOutcome>
    where
        F: FnOnce(f64) -> EventRecord<'e>,
    {
        if self.event_count >= self.max_events {
            self.events_dropped += 1;
            let first = !self.overflowed;

            if first {
                self.overflowed = true;
                error!(
                    "EventRecorder: Max event limit ({}) reached for session '{}'",
                    self.max_events, self.name
                );
                let marker = overflow_marker(self.elapsed_secs(), &self.name, self.max_events);
                write_line(&mut self.writer, &marker)?;
            }

            return Ok(CaptureOutcome::Dropped { first });
        }

        let record = build(self.elapsed_secs());
        write_line(&mut self.writer, &record)?;
        self.event_count += 1;

        Ok(CaptureOutcome::Written)
    }

    /// Operator-facing status line
    pub fn describe(&self) -> String {
        let map = self
            .filter
            .map_id
            .map_or_else(|| "all".to_string(), |m| m.to_string());

        format!(
            "Session: '{}' | Map: {} | Events: {} / {} | Elapsed: {:.1}s | Radius: {:.1}",
            self.name,
            map,
            self.event_count,
            self.max_events,
            self.elapsed_secs(),
            self.filter.radius
        )
    }

    /// Write the `record_stop` marker and close the file.
    ///
    /// Always completes; a failed marker write is logged.
    pub fn close(mut self) -> SessionSummary {
        let duration_secs = self.elapsed_secs();
        let marker = stop_marker(duration_secs, &self.name, self.event_count);

        if let Err(e) = write_line(&mut self.writer, &marker) {
            error!("EventRecorder: Failed to write stop marker for '{}': {}", self.name, e);
        }

        info!(
            "EventRecorder: Stopped session '{}' ({:.1}s, {} events)",
            self.name, duration_secs, self.event_count
        );

        SessionSummary {
            name: self.name,
            path: self.path,
            duration_secs,
            events_captured: self.event_count,
            events_dropped: self.events_dropped,
        }
    }
}

/// One record, one line, flushed before returning
fn write_line<W: Write, T: Serialize>(writer: &mut W, record: &T) -> Result<()> {
    serde_json::to_writer(&mut *writer, record)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// `<dir>/<name>_<YYYYMMDD_HHMMSS>.jsonl`
pub fn session_file_path(output_dir: &Path, name: &str) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    output_dir.join(format!("{}_{}.{}", name, stamp, SESSION_FILE_EXT))
}

/// Session names become file names: non-empty, no separators, no `..`
pub fn validate_session_name(name: &str) -> Result<()> {
    let invalid = name.trim().is_empty()
        || name.contains(['/', '\\'])
        || name.contains("..")
        || name.chars().any(char::is_control);

    if invalid {
        return Err(RecorderError::InvalidSessionName(name.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::actor::ActorSnapshot;
    use crate::recording::serializer::CapturedEvent;
    use serde_json::Value;
    use tempfile::tempdir;

    fn read_lines(path: &Path) -> Vec<Value> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    fn damage(session: &mut RecordingSession, actor: &ActorSnapshot) -> CaptureOutcome {
        session
            .capture(|t| {
                CapturedEvent::Damage {
                    attacker: Some(actor),
                    victim: Some(actor),
                    amount: 10,
                }
                .to_record(t)
            })
            .unwrap()
    }

    #[test]
    fn test_open_writes_start_marker() {
        let dir = tempdir().unwrap();
        let session = RecordingSession::open("t1", dir.path(), SessionFilter::default(), 10).unwrap();

        let file_name = session.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(file_name.starts_with("t1_"));
        assert!(file_name.ends_with(".jsonl"));
        // t1_YYYYMMDD_HHMMSS.jsonl
        assert_eq!(file_name.len(), "t1_".len() + 15 + ".jsonl".len());

        let lines = read_lines(session.path());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["event"], "record_start");
        assert_eq!(lines[0]["session"], "t1");
    }

    #[test]
    fn test_creates_nested_output_dir() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let session = RecordingSession::open("t1", &nested, SessionFilter::default(), 10).unwrap();
        assert!(session.path().starts_with(&nested));
    }

    #[test]
    fn test_ceiling_and_single_overflow_marker() {
        let dir = tempdir().unwrap();
        let actor = ActorSnapshot::player("A", "P-1");
        let mut session = RecordingSession::open("cap", dir.path(), SessionFilter::default(), 2).unwrap();

        assert_eq!(damage(&mut session, &actor), CaptureOutcome::Written);
        assert_eq!(damage(&mut session, &actor), CaptureOutcome::Written);
        assert_eq!(damage(&mut session, &actor), CaptureOutcome::Dropped { first: true });
        assert_eq!(damage(&mut session, &actor), CaptureOutcome::Dropped { first: false });

        assert_eq!(session.event_count(), 2);
        assert_eq!(session.events_dropped(), 2);

        let path = session.path().to_path_buf();
        let summary = session.close();
        assert_eq!(summary.events_captured, 2);

        let lines = read_lines(&path);
        let overflow = lines.iter().filter(|l| l["event"] == "record_overflow").count();
        assert_eq!(overflow, 1);
        assert_eq!(lines.last().unwrap()["event"], "record_stop");
        assert_eq!(lines.last().unwrap()["events_captured"], 2);
    }

    #[test]
    fn test_timestamps_non_decreasing() {
        let dir = tempdir().unwrap();
        let actor = ActorSnapshot::player("A", "P-1");
        let mut session = RecordingSession::open("mono", dir.path(), SessionFilter::default(), 100).unwrap();

        for _ in 0..20 {
            damage(&mut session, &actor);
        }
        let path = session.path().to_path_buf();
        session.close();

        let times: Vec<f64> = read_lines(&path).iter().map(|l| l["t"].as_f64().unwrap()).collect();
        assert!(times.iter().all(|t| *t >= 0.0));
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_describe() {
        let dir = tempdir().unwrap();
        let filter = SessionFilter {
            map_id: Some(36),
            radius: 25.0,
            ..Default::default()
        };
        let session = RecordingSession::open("deadmines", dir.path(), filter, 500).unwrap();

        let info = session.describe();
        assert!(info.starts_with("Session: 'deadmines' | Map: 36 | Events: 0 / 500 | Elapsed: "));
        assert!(info.ends_with("| Radius: 25.0"));
    }

    #[test]
    fn test_invalid_names() {
        assert!(validate_session_name("raid-night").is_ok());
        assert!(validate_session_name("").is_err());
        assert!(validate_session_name("   ").is_err());
        assert!(validate_session_name("../escape").is_err());
        assert!(validate_session_name("a/b").is_err());
        assert!(validate_session_name("a\\b").is_err());
    }
}
