// src/recording/hooks.rs
//! Simulation hook dispatch
//!
//! Call sites hold a [`RecorderHooks`] and call it unconditionally. Each hook
//! checks the lock-free `is_active()` flag before snapshotting anything, so
//! with recording off a hook costs one atomic load.

use crate::recording::actor::{ActorSnapshot, AsActorSnapshot, SpellInfo};
use crate::recording::recorder::EventRecorder;
use crate::utils::config::RecorderConfig;
use std::sync::Arc;

/// Hook entry points bound to a shared recorder
#[derive(Clone)]
pub struct RecorderHooks {
    recorder: Arc<EventRecorder>,
}

impl RecorderHooks {
    pub fn new(recorder: Arc<EventRecorder>) -> Self {
        Self { recorder }
    }

    pub fn recorder(&self) -> &Arc<EventRecorder> {
        &self.recorder
    }

    /// World configuration (re)loaded
    pub fn on_config_loaded(&self, config: RecorderConfig) {
        self.recorder.load_config(config);
    }

    pub fn on_damage<A, V>(&self, attacker: Option<&A>, victim: Option<&V>, damage: u32)
    where
        A: AsActorSnapshot + ?Sized,
        V: AsActorSnapshot + ?Sized,
    {
        if !self.recorder.is_active() {
            return;
        }
        let (attacker, victim) = (snapshot(attacker), snapshot(victim));
        self.recorder.record_damage(attacker.as_ref(), victim.as_ref(), damage);
    }

    pub fn on_heal<H, T>(&self, healer: Option<&H>, target: Option<&T>, gain: u32)
    where
        H: AsActorSnapshot + ?Sized,
        T: AsActorSnapshot + ?Sized,
    {
        if !self.recorder.is_active() {
            return;
        }
        let (healer, target) = (snapshot(healer), snapshot(target));
        self.recorder.record_heal(healer.as_ref(), target.as_ref(), gain);
    }

    pub fn on_aura_apply<U>(&self, unit: Option<&U>, spell: Option<&SpellInfo>)
    where
        U: AsActorSnapshot + ?Sized,
    {
        if !self.recorder.is_active() {
            return;
        }
        self.recorder.record_aura_apply(snapshot(unit).as_ref(), spell);
    }

    pub fn on_aura_remove<U>(&self, unit: Option<&U>, spell: Option<&SpellInfo>, remove_mode: u8)
    where
        U: AsActorSnapshot + ?Sized,
    {
        if !self.recorder.is_active() {
            return;
        }
        self.recorder.record_aura_remove(snapshot(unit).as_ref(), spell, remove_mode);
    }

    pub fn on_enter_combat<U, V>(&self, unit: Option<&U>, victim: Option<&V>)
    where
        U: AsActorSnapshot + ?Sized,
        V: AsActorSnapshot + ?Sized,
    {
        if !self.recorder.is_active() {
            return;
        }
        let (unit, victim) = (snapshot(unit), snapshot(victim));
        self.recorder.record_enter_combat(unit.as_ref(), victim.as_ref());
    }

    pub fn on_leave_combat<C>(&self, creature: Option<&C>)
    where
        C: AsActorSnapshot + ?Sized,
    {
        if !self.recorder.is_active() {
            return;
        }
        self.recorder.record_leave_combat(snapshot(creature).as_ref());
    }

    pub fn on_evade<U>(&self, unit: Option<&U>, reason: u8)
    where
        U: AsActorSnapshot + ?Sized,
    {
        if !self.recorder.is_active() {
            return;
        }
        self.recorder.record_evade(snapshot(unit).as_ref(), reason);
    }

    pub fn on_unit_death<U, K>(&self, unit: Option<&U>, killer: Option<&K>)
    where
        U: AsActorSnapshot + ?Sized,
        K: AsActorSnapshot + ?Sized,
    {
        if !self.recorder.is_active() {
            return;
        }
        let (unit, killer) = (snapshot(unit), snapshot(killer));
        self.recorder.record_unit_death(unit.as_ref(), killer.as_ref());
    }

    pub fn on_spell_cast<P>(&self, player: Option<&P>, spell: Option<&SpellInfo>)
    where
        P: AsActorSnapshot + ?Sized,
    {
        if !self.recorder.is_active() || spell.is_none() {
            return;
        }
        self.recorder.record_spell_cast(snapshot(player).as_ref(), spell);
    }
}

fn snapshot<T: AsActorSnapshot + ?Sized>(actor: Option<&T>) -> Option<ActorSnapshot> {
    actor.map(AsActorSnapshot::as_actor_snapshot)
}
