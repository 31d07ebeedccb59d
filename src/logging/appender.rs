// src/logging/appender.rs
//! JSONL appender
//!
//! Writes one record per diagnostic message:
//!
//! ```text
//! {"ts":"2026-10-19T21:04:11","sev":"error","cat":"creature","msg":"...","ctx":{"entry":1234}}
//! ```
//!
//! The output target is fixed at construction. A fixed file stays open; a
//! templated name (`Player_%s.jsonl`) is resolved per message and opened for
//! append on every write. The handle and the size counter share one lock, so
//! a rotation decision and the write it accounts for cannot interleave.
//!
//! Nothing in this module emits `tracing` events: the appender can sit behind
//! a tracing layer and must not feed itself.

use crate::logging::category::classify;
use crate::logging::context::LogContext;
use crate::logging::message::{LogLevel, LogMessage};
use crate::observability::metrics as names;
use crate::utils::config::TransformConfig;
use crate::utils::errors::{RecorderError, Result};
use chrono::Local;
use metrics::counter;
use parking_lot::Mutex;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Placeholder replaced by [`LogMessage::param`]
pub const PARAM_PLACEHOLDER: &str = "%s";

/// Insert a start timestamp before the file extension
pub const FLAG_USE_TIMESTAMP: u8 = 0x08;

/// Move an existing file aside instead of truncating it
pub const FLAG_MAKE_FILE_BACKUP: u8 = 0x10;

/// How a fixed file is opened at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Append,
    Truncate,
}

impl OpenMode {
    fn parse(mode: &str) -> Option<Self> {
        match mode {
            "a" => Some(OpenMode::Append),
            "w" => Some(OpenMode::Truncate),
            _ => None,
        }
    }
}

/// Appender configuration
#[derive(Debug, Clone)]
pub struct AppenderConfig {
    pub name: String,
    pub log_dir: PathBuf,
    pub file_name: String,
    pub mode: OpenMode,

    /// Rotation threshold in bytes (0 = unbounded)
    pub max_file_size: u64,

    pub min_level: LogLevel,
    pub flags: u8,
}

impl AppenderConfig {
    pub fn new(name: impl Into<String>, log_dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            log_dir: log_dir.into(),
            file_name: file_name.into(),
            mode: OpenMode::Append,
            max_file_size: 0,
            min_level: LogLevel::Info,
            flags: 0,
        }
    }

    pub fn from_transform(config: &TransformConfig) -> Self {
        Self {
            max_file_size: config.max_file_size,
            min_level: config.min_level,
            ..Self::new("Jsonl", &config.log_dir, &config.file_name)
        }
    }

    /// Parse `type,level,flags,file[,mode[,max_size]]` appender arguments
    pub fn from_args(name: &str, log_dir: impl Into<PathBuf>, args: &[&str]) -> Result<Self> {
        if args.len() < 4 {
            return Err(RecorderError::InvalidAppenderArgs(format!(
                "missing file name for appender {}",
                name
            )));
        }

        let min_level = args[1].trim().parse::<LogLevel>().map_err(|e| {
            RecorderError::InvalidAppenderArgs(format!("appender {}: {}", name, e))
        })?;

        let flags = args[2].trim().parse::<u8>().map_err(|_| {
            RecorderError::InvalidAppenderArgs(format!("invalid flags '{}' for appender {}", args[2], name))
        })?;

        let mode = match args.get(4) {
            Some(mode) => OpenMode::parse(mode.trim()).ok_or_else(|| {
                RecorderError::InvalidAppenderArgs(format!("invalid mode '{}' for appender {}", mode, name))
            })?,
            None => OpenMode::Append,
        };

        let max_file_size = match args.get(5) {
            Some(size) => size.trim().parse::<u64>().map_err(|_| {
                RecorderError::InvalidAppenderArgs(format!("invalid size '{}' for appender {}", size, name))
            })?,
            None => 0,
        };

        Ok(Self {
            name: name.to_string(),
            log_dir: log_dir.into(),
            file_name: args[3].trim().to_string(),
            mode,
            max_file_size,
            min_level,
            flags,
        })
    }

    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    pub fn with_mode(mut self, mode: OpenMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_flags(mut self, flags: u8) -> Self {
        self.flags = flags;
        self
    }

    fn backup(&self) -> bool {
        self.flags & FLAG_MAKE_FILE_BACKUP != 0
    }
}

/// Where records go, resolved once at construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Fixed(PathBuf),

    /// Full path containing the `%s` placeholder
    Templated(String),
}

impl OutputTarget {
    fn resolve(log_dir: &Path, file_name: &str) -> Self {
        let full = log_dir.join(file_name);
        if file_name.contains(PARAM_PLACEHOLDER) {
            OutputTarget::Templated(full.to_string_lossy().into_owned())
        } else {
            OutputTarget::Fixed(full)
        }
    }

    /// Path for a message parameter
    pub fn path_for(&self, param: &str) -> PathBuf {
        match self {
            OutputTarget::Fixed(path) => path.clone(),
            OutputTarget::Templated(template) => {
                PathBuf::from(template.replacen(PARAM_PLACEHOLDER, &sanitize_param(param), 1))
            }
        }
    }
}

struct AppenderState {
    file: Option<File>,
    file_size: u64,
}

/// Structured log transform writer
pub struct JsonlAppender {
    name: String,
    target: OutputTarget,
    max_file_size: u64,
    min_level: LogLevel,
    state: Mutex<AppenderState>,
}

impl JsonlAppender {
    /// Create the log directory and, for a fixed target, open the file
    pub fn new(config: AppenderConfig) -> Result<Self> {
        fs::create_dir_all(&config.log_dir).map_err(|source| RecorderError::CreateDir {
            path: config.log_dir.clone(),
            source,
        })?;

        let file_name = if config.flags & FLAG_USE_TIMESTAMP != 0 {
            insert_timestamp(&config.file_name)
        } else {
            config.file_name.clone()
        };

        let target = OutputTarget::resolve(&config.log_dir, &file_name);

        let mut state = AppenderState {
            file: None,
            file_size: 0,
        };

        if let OutputTarget::Fixed(path) = &target {
            let file = if config.mode == OpenMode::Truncate && config.backup() {
                reopen_after_backup(path, move_to_backup(path))?
            } else {
                open_file(path, config.mode)?
            };
            state.file_size = current_len(&file);
            state.file = Some(file);
        }

        Ok(Self {
            name: config.name,
            target,
            max_file_size: config.max_file_size,
            min_level: config.min_level,
            state: Mutex::new(state),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &OutputTarget {
        &self.target
    }

    /// Bytes written to the current file
    pub fn file_size(&self) -> u64 {
        self.state.lock().file_size
    }

    /// Write one message. Messages below the level threshold are skipped.
    pub fn write(&self, message: &LogMessage) -> Result<()> {
        if !message.level.passes(self.min_level) {
            return Ok(());
        }

        let mut line = serde_json::to_vec(&format_record(message))?;
        line.push(b'\n');
        let len = line.len() as u64;

        let mut state = self.state.lock();

        match &self.target {
            OutputTarget::Fixed(path) => {
                if self.exceeds(state.file_size, len) {
                    state.file = None;
                    let moved = move_to_backup(path);
                    let file = reopen_after_backup(path, moved)?;
                    state.file_size = current_len(&file);
                    state.file = Some(file);
                    if moved {
                        counter!(names::TRANSFORM_ROTATIONS).increment(1);
                    }
                }

                if state.file.is_none() {
                    let file = open_file(path, OpenMode::Append)?;
                    state.file_size = current_len(&file);
                    state.file = Some(file);
                }

                if let Some(file) = state.file.as_mut() {
                    file.write_all(&line)?;
                    file.flush()?;
                }
                state.file_size += len;
            }
            OutputTarget::Templated(_) => {
                // Append always: truncating would discard the previous write
                let path = self.target.path_for(&message.param);
                let existing = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

                let existing = if self.exceeds(existing, len) && move_to_backup(&path) {
                    counter!(names::TRANSFORM_ROTATIONS).increment(1);
                    0
                } else {
                    existing
                };

                let mut file = open_file(&path, OpenMode::Append)?;
                file.write_all(&line)?;
                file.flush()?;
                state.file_size = existing + len;
            }
        }

        counter!(names::TRANSFORM_RECORDS).increment(1);
        Ok(())
    }

    /// Close the held file; the next write reopens it for append
    pub fn close(&self) {
        self.state.lock().file = None;
    }

    fn exceeds(&self, current: u64, incoming: u64) -> bool {
        self.max_file_size > 0 && current > 0 && current + incoming > self.max_file_size
    }
}

/// One line of the transform output
#[derive(Debug, Serialize)]
pub struct DiagnosticRecord<'a> {
    /// Local time, second precision
    pub ts: String,

    pub sev: LogLevel,
    pub cat: &'a str,
    pub msg: &'a str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ctx: Option<LogContext>,
}

/// Build the record for a message
pub fn format_record(message: &LogMessage) -> DiagnosticRecord<'_> {
    let ctx = LogContext::extract(&message.text);

    DiagnosticRecord {
        ts: message.timestamp.format("%Y-%m-%dT%H:%M:%S").to_string(),
        sev: message.level,
        cat: classify(&message.logger),
        msg: &message.text,
        ctx: (!ctx.is_empty()).then_some(ctx),
    }
}

fn open_file(path: &Path, mode: OpenMode) -> Result<File> {
    let mut options = OpenOptions::new();
    options.create(true);
    match mode {
        OpenMode::Append => options.append(true),
        OpenMode::Truncate => options.write(true).truncate(true),
    };

    options.open(path).map_err(|source| RecorderError::OpenFile {
        path: path.to_path_buf(),
        source,
    })
}

fn current_len(file: &File) -> u64 {
    file.metadata().map(|m| m.len()).unwrap_or(0)
}

/// Rename `path` to `<path>.<timestamp>`, adding a counter on collision.
///
/// Returns whether `path` is now free: moved aside, or never existed.
fn move_to_backup(path: &Path) -> bool {
    if !path.exists() {
        return true;
    }

    let stamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    let base = format!("{}.{}", path.display(), stamp);
    let mut candidate = PathBuf::from(&base);
    let mut n = 1;
    while candidate.exists() {
        candidate = PathBuf::from(format!("{}.{}", base, n));
        n += 1;
    }

    fs::rename(path, candidate).is_ok()
}

/// Truncate only what was backed up; a file that could not be moved keeps
/// its lines and is appended to.
fn reopen_after_backup(path: &Path, moved: bool) -> Result<File> {
    let mode = if moved { OpenMode::Truncate } else { OpenMode::Append };
    open_file(path, mode)
}

/// `Server.jsonl` → `Server_2026-10-19_21-04-11.jsonl`
fn insert_timestamp(file_name: &str) -> String {
    let stamp = Local::now().format("_%Y-%m-%d_%H-%M-%S").to_string();
    match file_name.rfind('.') {
        Some(dot) => format!("{}{}{}", &file_name[..dot], stamp, &file_name[dot..]),
        None => format!("{}{}", file_name, stamp),
    }
}

/// Keep a template parameter inside the log directory
fn sanitize_param(param: &str) -> String {
    param
        .chars()
        .map(|c| if matches!(c, '/' | '\\') || c.is_control() { '_' } else { c })
        .collect::<String>()
        .replace("..", "_")
}
