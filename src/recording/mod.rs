// src/recording/mod.rs
//! Live event capture
//!
//! This module records simulation events into line-delimited JSON files:
//!
//! - **Recorder**: Session manager, the single entry point for hooks
//! - **Session**: Output file, monotonic clock and bounded event counter
//! - **Filter**: Map, instance and radius predicate
//! - **Serializer**: Event kinds and their record layout
//! - **Actor**: Read-only actor snapshots handed over by the simulation
//! - **Hooks**: Call-site adapters that skip all work while inactive
//!
//! # Architecture
//!
//! ```text
//! Simulation hook → is_active()? → lock → filter → serialize → write + flush
//!                    (atomic)                              ↓
//!                                              <dir>/<name>_<stamp>.jsonl
//! ```
//!
//! # Bounds
//!
//! - **Sessions**: at most one active per recorder
//! - **Events**: `max_events` per session, one overflow marker, then drops
//! - **Durability**: every record is flushed before the lock is released

pub mod actor;
pub mod filter;
pub mod hooks;
pub mod recorder;
pub mod serializer;
pub mod session;

// Re-export commonly used types
pub use actor::{ActorKind, ActorSnapshot, AsActorSnapshot, Position, SpellInfo};
pub use filter::{Origin, SessionFilter};
pub use hooks::RecorderHooks;
pub use recorder::{EventRecorder, RecorderStats, NO_ACTIVE_SESSION};
pub use serializer::{ActorRecord, CapturedEvent, EventKind, EventRecord, FilterPolicy};
pub use session::{CaptureOutcome, RecordingSession, SessionSummary};
