// src/recording/recorder.rs
//! Process-wide event recorder
//!
//! Owns at most one [`RecordingSession`]. Start, stop, status and every record
//! call run under a single mutex, so the file sees a total order of events.
//! `is_active()` and `is_active_for_scope()` read atomics only, so hook call
//! sites can check them without contending for the session lock.

use crate::observability::metrics as names;
use crate::recording::actor::{ActorSnapshot, SpellInfo};
use crate::recording::filter::{Origin, SessionFilter};
use crate::recording::serializer::{CapturedEvent, FilterPolicy};
use crate::recording::session::{CaptureOutcome, RecordingSession, SessionSummary};
use crate::utils::config::RecorderConfig;
use crate::utils::errors::{RecorderError, Result};
use metrics::counter;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;
use tracing::{error, info, warn};

/// Status reply when nothing is recording
pub const NO_ACTIVE_SESSION: &str = "No active recording session.";

/// Recorder state machine
enum SessionState {
    Inactive,
    Active(RecordingSession),
}

struct RecorderState {
    config: RecorderConfig,
    session: SessionState,
    stats: RecorderStats,
}

/// Map and instance of the active session's filter, readable without the lock
struct ScopeMirror {
    map_id: AtomicU64,
    instance_id: AtomicU64,
}

impl ScopeMirror {
    const UNSET: u64 = u64::MAX;

    fn new() -> Self {
        Self {
            map_id: AtomicU64::new(Self::UNSET),
            instance_id: AtomicU64::new(Self::UNSET),
        }
    }

    fn set(&self, filter: &SessionFilter) {
        self.map_id.store(encode(filter.map_id), Ordering::Release);
        self.instance_id.store(encode(filter.instance_id), Ordering::Release);
    }

    fn clear(&self) {
        self.map_id.store(Self::UNSET, Ordering::Release);
        self.instance_id.store(Self::UNSET, Ordering::Release);
    }

    fn contains(&self, map_id: u32, instance_id: Option<u32>) -> bool {
        let scope = SessionFilter {
            map_id: decode(self.map_id.load(Ordering::Acquire)),
            instance_id: decode(self.instance_id.load(Ordering::Acquire)),
            ..Default::default()
        };
        scope.in_scope(map_id, instance_id)
    }
}

fn encode(id: Option<u32>) -> u64 {
    id.map_or(ScopeMirror::UNSET, u64::from)
}

fn decode(raw: u64) -> Option<u32> {
    u32::try_from(raw).ok()
}

/// Event recorder shared with the hook layer through an `Arc`
pub struct EventRecorder {
    state: Mutex<RecorderState>,
    enabled: AtomicBool,
    active: AtomicBool,
    scope: ScopeMirror,
}

impl EventRecorder {
    /// Create a new event recorder
    pub fn new(config: RecorderConfig) -> Self {
        let recorder = Self {
            state: Mutex::new(RecorderState {
                config: RecorderConfig::default(),
                session: SessionState::Inactive,
                stats: RecorderStats::default(),
            }),
            enabled: AtomicBool::new(false),
            active: AtomicBool::new(false),
            scope: ScopeMirror::new(),
        };
        recorder.load_config(config);
        recorder
    }

    /// Apply configuration; an active session keeps its own settings
    pub fn load_config(&self, config: RecorderConfig) {
        let mut state = self.state.lock();

        if config.enable {
            info!(
                "EventRecorder: Enabled (output: {}, max events: {})",
                config.output_dir.display(),
                config.max_events
            );
        }

        self.enabled.store(config.enable, Ordering::Release);
        state.config = config;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Whether events on this map/instance can be recorded at all
    pub fn is_active_for_scope(&self, map_id: u32, instance_id: Option<u32>) -> bool {
        self.is_active() && self.scope.contains(map_id, instance_id)
    }

    /// Start a session and return the path of its output file
    pub fn start_session(
        &self,
        name: &str,
        origin: Option<&ActorSnapshot>,
        map_override: Option<u32>,
        radius_override: Option<f32>,
    ) -> Result<PathBuf> {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        if matches!(state.session, SessionState::Active(_)) {
            return Err(RecorderError::AlreadyActive);
        }

        if !state.config.enable {
            return Err(RecorderError::Disabled);
        }

        let filter = resolve_filter(origin, map_override, radius_override, state.config.default_radius);
        let radius = filter.radius;

        let session = RecordingSession::open(name, &state.config.output_dir, filter, state.config.max_events)
            .map_err(|e| {
                error!("EventRecorder: Failed to start session '{}': {}", name, e);
                e
            })?;

        let path = session.path().to_path_buf();

        info!(
            "EventRecorder: Started session '{}' (map: {:?}, radius: {:.1}, file: {})",
            name,
            session.filter().map_id,
            radius,
            path.display()
        );

        self.scope.set(session.filter());
        state.session = SessionState::Active(session);
        state.stats.sessions_started += 1;
        self.active.store(true, Ordering::Release);
        counter!(names::SESSIONS_STARTED).increment(1);

        Ok(path)
    }

    /// Stop the active session, writing the `record_stop` marker
    pub fn stop_session(&self) -> Result<SessionSummary> {
        let mut state = self.state.lock();

        let session = match std::mem::replace(&mut state.session, SessionState::Inactive) {
            SessionState::Active(session) => session,
            SessionState::Inactive => return Err(RecorderError::NotActive),
        };

        self.active.store(false, Ordering::Release);
        self.scope.clear();

        Ok(session.close())
    }

    /// Human-readable snapshot of the active session
    pub fn session_info(&self) -> String {
        match &self.state.lock().session {
            SessionState::Active(session) => session.describe(),
            SessionState::Inactive => NO_ACTIVE_SESSION.to_string(),
        }
    }

    /// Recorder statistics
    pub fn stats(&self) -> RecorderStats {
        self.state.lock().stats.clone()
    }

    /// Stop any active session before the process exits
    pub fn shutdown(&self) {
        if !self.is_active() {
            return;
        }

        match self.stop_session() {
            Ok(summary) => info!(
                "EventRecorder: Closed session '{}' on shutdown ({} events)",
                summary.name, summary.events_captured
            ),
            Err(RecorderError::NotActive) => {}
            Err(e) => warn!("EventRecorder: Shutdown failed: {}", e),
        }
    }

    pub fn record_enter_combat(&self, unit: Option<&ActorSnapshot>, victim: Option<&ActorSnapshot>) {
        self.capture(CapturedEvent::EnterCombat { unit, victim });
    }

    pub fn record_leave_combat(&self, creature: Option<&ActorSnapshot>) {
        self.capture(CapturedEvent::LeaveCombat { creature });
    }

    pub fn record_evade(&self, unit: Option<&ActorSnapshot>, reason: u8) {
        self.capture(CapturedEvent::Evade { unit, reason });
    }

    pub fn record_unit_death(&self, unit: Option<&ActorSnapshot>, killer: Option<&ActorSnapshot>) {
        self.capture(CapturedEvent::Death { unit, killer });
    }

    pub fn record_damage(&self, attacker: Option<&ActorSnapshot>, victim: Option<&ActorSnapshot>, amount: u32) {
        self.capture(CapturedEvent::Damage {
            attacker,
            victim,
            amount,
        });
    }

    pub fn record_heal(&self, healer: Option<&ActorSnapshot>, target: Option<&ActorSnapshot>, amount: u32) {
        self.capture(CapturedEvent::Heal {
            healer,
            target,
            amount,
        });
    }

    pub fn record_aura_apply(&self, unit: Option<&ActorSnapshot>, spell: Option<&SpellInfo>) {
        if let Some(spell) = spell {
            self.capture(CapturedEvent::AuraApply { unit, spell });
        }
    }

    pub fn record_aura_remove(&self, unit: Option<&ActorSnapshot>, spell: Option<&SpellInfo>, remove_mode: u8) {
        if let Some(spell) = spell {
            self.capture(CapturedEvent::AuraRemove {
                unit,
                spell,
                remove_mode,
            });
        }
    }

    pub fn record_spell_cast(&self, caster: Option<&ActorSnapshot>, spell: Option<&SpellInfo>) {
        if let Some(spell) = spell {
            self.capture(CapturedEvent::SpellCast { caster, spell });
        }
    }

    /// Filter, serialize and write one event. Never fails the caller.
    fn capture(&self, event: CapturedEvent<'_>) {
        if !self.is_active() {
            return;
        }

        let start = Instant::now();
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let SessionState::Active(session) = &mut state.session else {
            return;
        };

        let (primary, other) = event.participants();
        let passes = match event.filter_policy() {
            FilterPolicy::Primary => session.filter().passes(primary),
            FilterPolicy::Either => session.filter().passes(primary) || session.filter().passes(other),
        };

        if !passes {
            state.stats.events_filtered += 1;
            counter!(names::EVENTS_FILTERED).increment(1);
            return;
        }

        match session.capture(|t| event.to_record(t)) {
            Ok(CaptureOutcome::Written) => {
                state.stats.events_recorded += 1;
                state.stats.total_record_time_ns += start.elapsed().as_nanos() as u64;
                counter!(names::EVENTS_RECORDED).increment(1);
            }
            Ok(CaptureOutcome::Dropped { .. }) => {
                state.stats.events_dropped += 1;
                counter!(names::EVENTS_DROPPED).increment(1);
            }
            Err(e) => {
                state.stats.write_errors += 1;
                error!(
                    "EventRecorder: Failed to write {} event for '{}': {}",
                    event.kind().as_str(),
                    session.name(),
                    e
                );
            }
        }
    }
}

impl Drop for EventRecorder {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Resolve map, instance, origin and radius for a new session
fn resolve_filter(
    origin: Option<&ActorSnapshot>,
    map_override: Option<u32>,
    radius_override: Option<f32>,
    default_radius: f32,
) -> SessionFilter {
    let radius = match radius_override {
        Some(r) if r > 0.0 => r,
        _ => default_radius.max(0.0),
    };

    SessionFilter {
        map_id: map_override.or(origin.map(|a| a.map_id)),
        instance_id: origin.and_then(|a| a.instance_id),
        origin: origin.map(|a| Origin {
            map_id: a.map_id,
            position: a.position,
        }),
        radius,
    }
}

/// Recorder statistics
#[derive(Debug, Clone, Default)]
pub struct RecorderStats {
    pub events_recorded: u64,
    pub events_filtered: u64,
    pub events_dropped: u64,
    pub write_errors: u64,
    pub sessions_started: u64,
    pub total_record_time_ns: u64,
}

impl RecorderStats {
    pub fn avg_record_time_ns(&self) -> u64 {
        if self.events_recorded == 0 {
            0
        } else {
            self.total_record_time_ns / self.events_recorded
        }
    }
}
