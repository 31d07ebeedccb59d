// src/recording/serializer.rs
//! Captured events and their JSON line representation
//!
//! ```text
//! {"t":12.480,"event":"damage","source":{"type":"player","name":"Jaina","guid":"Player-1"},"target":{...},"amount":120}
//! ```

use crate::recording::actor::{ActorKind, ActorSnapshot, SpellInfo};
use serde::{Serialize, Serializer};
use serde_json::value::RawValue;

/// Event kinds written to a session file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    EnterCombat,
    LeaveCombat,
    Evade,
    Death,
    Damage,
    Heal,
    AuraApply,
    AuraRemove,
    SpellCast,
    RecordStart,
    RecordStop,
    RecordOverflow,
}

impl EventKind {
    /// Same tag as the serialized `event` field, for log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::EnterCombat => "enter_combat",
            EventKind::LeaveCombat => "leave_combat",
            EventKind::Evade => "evade",
            EventKind::Death => "death",
            EventKind::Damage => "damage",
            EventKind::Heal => "heal",
            EventKind::AuraApply => "aura_apply",
            EventKind::AuraRemove => "aura_remove",
            EventKind::SpellCast => "spell_cast",
            EventKind::RecordStart => "record_start",
            EventKind::RecordStop => "record_stop",
            EventKind::RecordOverflow => "record_overflow",
        }
    }
}

/// Which actors of an event the filter is applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterPolicy {
    /// The primary actor must pass
    Primary,

    /// Either participant passing is enough
    Either,
}

/// One occurrence reported by a simulation hook
#[derive(Debug, Clone, Copy)]
pub enum CapturedEvent<'a> {
    EnterCombat {
        unit: Option<&'a ActorSnapshot>,
        victim: Option<&'a ActorSnapshot>,
    },
    LeaveCombat {
        creature: Option<&'a ActorSnapshot>,
    },
    Evade {
        unit: Option<&'a ActorSnapshot>,
        reason: u8,
    },
    Death {
        unit: Option<&'a ActorSnapshot>,
        killer: Option<&'a ActorSnapshot>,
    },
    Damage {
        attacker: Option<&'a ActorSnapshot>,
        victim: Option<&'a ActorSnapshot>,
        amount: u32,
    },
    Heal {
        healer: Option<&'a ActorSnapshot>,
        target: Option<&'a ActorSnapshot>,
        amount: u32,
    },
    AuraApply {
        unit: Option<&'a ActorSnapshot>,
        spell: &'a SpellInfo,
    },
    AuraRemove {
        unit: Option<&'a ActorSnapshot>,
        spell: &'a SpellInfo,
        remove_mode: u8,
    },
    SpellCast {
        caster: Option<&'a ActorSnapshot>,
        spell: &'a SpellInfo,
    },
}

impl<'a> CapturedEvent<'a> {
    pub fn kind(&self) -> EventKind {
        match self {
            CapturedEvent::EnterCombat { .. } => EventKind::EnterCombat,
            CapturedEvent::LeaveCombat { .. } => EventKind::LeaveCombat,
            CapturedEvent::Evade { .. } => EventKind::Evade,
            CapturedEvent::Death { .. } => EventKind::Death,
            CapturedEvent::Damage { .. } => EventKind::Damage,
            CapturedEvent::Heal { .. } => EventKind::Heal,
            CapturedEvent::AuraApply { .. } => EventKind::AuraApply,
            CapturedEvent::AuraRemove { .. } => EventKind::AuraRemove,
            CapturedEvent::SpellCast { .. } => EventKind::SpellCast,
        }
    }

    pub fn filter_policy(&self) -> FilterPolicy {
        match self {
            CapturedEvent::Death { .. }
            | CapturedEvent::Damage { .. }
            | CapturedEvent::Heal { .. } => FilterPolicy::Either,
            _ => FilterPolicy::Primary,
        }
    }

    /// Primary actor and, for two-party events, the other participant
    pub fn participants(&self) -> (Option<&'a ActorSnapshot>, Option<&'a ActorSnapshot>) {
        match *self {
            CapturedEvent::EnterCombat { unit, victim } => (unit, victim),
            CapturedEvent::LeaveCombat { creature } => (creature, None),
            CapturedEvent::Evade { unit, .. } => (unit, None),
            CapturedEvent::Death { unit, killer } => (unit, killer),
            CapturedEvent::Damage { attacker, victim, .. } => (attacker, victim),
            CapturedEvent::Heal { healer, target, .. } => (healer, target),
            CapturedEvent::AuraApply { unit, .. } => (unit, None),
            CapturedEvent::AuraRemove { unit, .. } => (unit, None),
            CapturedEvent::SpellCast { caster, .. } => (caster, None),
        }
    }

    /// Build the record for this event at the given session offset
    pub fn to_record(&self, t: f64) -> EventRecord<'a> {
        let body = match *self {
            CapturedEvent::EnterCombat { unit, victim } => EventBody::Engage {
                source: unit.map(ActorRecord::from),
                target: victim.map(ActorRecord::from),
            },
            CapturedEvent::LeaveCombat { creature } => EventBody::Solo {
                source: creature.map(ActorRecord::from),
            },
            CapturedEvent::Evade { unit, reason } => EventBody::Evade {
                source: unit.map(ActorRecord::from),
                reason,
            },
            CapturedEvent::Death { unit, killer } => EventBody::Death {
                source: unit.map(ActorRecord::from),
                killer: killer.map(ActorRecord::from),
            },
            CapturedEvent::Damage {
                attacker,
                victim,
                amount,
            } => EventBody::Amount {
                source: attacker.map(ActorRecord::from),
                target: victim.map(ActorRecord::from),
                amount,
            },
            CapturedEvent::Heal {
                healer,
                target,
                amount,
            } => EventBody::Amount {
                source: healer.map(ActorRecord::from),
                target: target.map(ActorRecord::from),
                amount,
            },
            CapturedEvent::AuraApply { unit, spell } => EventBody::Aura {
                target: unit.map(ActorRecord::from),
                spell_id: spell.id,
                spell_name: spell.display_name(),
                remove_mode: None,
            },
            CapturedEvent::AuraRemove {
                unit,
                spell,
                remove_mode,
            } => EventBody::Aura {
                target: unit.map(ActorRecord::from),
                spell_id: spell.id,
                spell_name: spell.display_name(),
                remove_mode: Some(remove_mode),
            },
            CapturedEvent::SpellCast { caster, spell } => EventBody::Cast {
                source: caster.map(ActorRecord::from),
                spell_id: spell.id,
                spell_name: spell.display_name(),
            },
        };

        EventRecord {
            t,
            event: self.kind(),
            body,
        }
    }
}

/// One line of a session file
#[derive(Debug, Serialize)]
pub struct EventRecord<'a> {
    /// Seconds since session start
    #[serde(serialize_with = "three_decimals")]
    pub t: f64,

    pub event: EventKind,

    #[serde(flatten)]
    pub body: EventBody<'a>,
}

/// Event-specific fields; absent actors serialize as `null`
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum EventBody<'a> {
    Engage {
        source: Option<ActorRecord<'a>>,
        target: Option<ActorRecord<'a>>,
    },
    Solo {
        source: Option<ActorRecord<'a>>,
    },
    Evade {
        source: Option<ActorRecord<'a>>,
        reason: u8,
    },
    Death {
        source: Option<ActorRecord<'a>>,
        killer: Option<ActorRecord<'a>>,
    },
    Amount {
        source: Option<ActorRecord<'a>>,
        target: Option<ActorRecord<'a>>,
        amount: u32,
    },
    Aura {
        target: Option<ActorRecord<'a>>,
        spell_id: u32,
        spell_name: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        remove_mode: Option<u8>,
    },
    Cast {
        source: Option<ActorRecord<'a>>,
        spell_id: u32,
        spell_name: &'a str,
    },
    Start {
        session: &'a str,
        map: Option<u32>,
        file: &'a str,
    },
    Stop {
        session: &'a str,
        #[serde(serialize_with = "three_decimals")]
        duration: f64,
        events_captured: u32,
    },
    Overflow {
        session: &'a str,
        max_events: u32,
    },
}

/// `{type, entry?, name, guid}`; players carry no entry
#[derive(Debug, Serialize)]
pub struct ActorRecord<'a> {
    #[serde(rename = "type")]
    pub kind: ActorKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<u32>,

    pub name: &'a str,
    pub guid: &'a str,
}

impl<'a> From<&'a ActorSnapshot> for ActorRecord<'a> {
    fn from(actor: &'a ActorSnapshot) -> Self {
        Self {
            kind: actor.kind,
            entry: (!actor.is_player()).then_some(actor.entry),
            name: &actor.name,
            guid: &actor.guid,
        }
    }
}

/// Offsets are written with exactly three decimals (`12.480`)
fn three_decimals<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    let raw = RawValue::from_string(format!("{:.3}", value)).map_err(serde::ser::Error::custom)?;
    raw.serialize(serializer)
}

/// `record_start` marker
pub fn start_marker<'a>(session: &'a str, map_id: Option<u32>, file: &'a str) -> EventRecord<'a> {
    EventRecord {
        t: 0.0,
        event: EventKind::RecordStart,
        body: EventBody::Start {
            session,
            map: map_id,
            file,
        },
    }
}

/// `record_stop` marker
pub fn stop_marker(t: f64, session: &str, events_captured: u32) -> EventRecord<'_> {
    EventRecord {
        t,
        event: EventKind::RecordStop,
        body: EventBody::Stop {
            session,
            duration: t,
            events_captured,
        },
    }
}

/// `record_overflow` marker, written once when the ceiling is hit
pub fn overflow_marker(t: f64, session: &str, max_events: u32) -> EventRecord<'_> {
    EventRecord {
        t,
        event: EventKind::RecordOverflow,
        body: EventBody::Overflow { session, max_events },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::Value;

    fn line<T: Serialize>(record: &T) -> String {
        serde_json::to_string(record).unwrap()
    }

    fn parse<T: Serialize>(record: &T) -> Value {
        serde_json::from_str(&line(record)).unwrap()
    }

    #[test]
    fn test_creature_has_entry() {
        let hogger = ActorSnapshot::creature(448, "Hogger", "Creature-0-448");
        assert_eq!(
            line(&ActorRecord::from(&hogger)),
            r#"{"type":"creature","entry":448,"name":"Hogger","guid":"Creature-0-448"}"#
        );
    }

    #[test]
    fn test_player_has_no_entry() {
        let jaina = ActorSnapshot::player("Jaina", "Player-1");
        let v = parse(&ActorRecord::from(&jaina));
        assert_eq!(v["type"], "player");
        assert!(v.get("entry").is_none());
    }

    #[test]
    fn test_other_unit_tag() {
        let totem = ActorSnapshot::unit(3579, "Totem", "Pet-1");
        assert_eq!(parse(&ActorRecord::from(&totem))["type"], "unit");
    }

    #[test]
    fn test_damage_line() {
        let attacker = ActorSnapshot::player("Jaina", "Player-1");
        let victim = ActorSnapshot::creature(448, "Hogger", "Creature-0-448");
        let event = CapturedEvent::Damage {
            attacker: Some(&attacker),
            victim: Some(&victim),
            amount: 120,
        };

        let text = line(&event.to_record(12.48));
        assert!(text.starts_with(r#"{"t":12.480,"event":"damage","source":{"type":"player""#));
        assert!(text.ends_with(r#""amount":120}"#));

        let v: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["target"]["entry"], 448);
    }

    #[test]
    fn test_absent_actor_is_null() {
        let victim = ActorSnapshot::creature(448, "Hogger", "Creature-0-448");
        let event = CapturedEvent::Death {
            unit: Some(&victim),
            killer: None,
        };

        assert!(line(&event.to_record(1.0)).contains(r#""killer":null"#));
    }

    #[test]
    fn test_aura_fields() {
        let unit = ActorSnapshot::player("Thrall", "Player-2");
        let spell = SpellInfo::new(1459, "");

        let removed = parse(
            &CapturedEvent::AuraRemove {
                unit: Some(&unit),
                spell: &spell,
                remove_mode: 3,
            }
            .to_record(0.5),
        );
        assert_eq!(removed["event"], "aura_remove");
        assert_eq!(removed["spell_id"], 1459);
        assert_eq!(removed["spell_name"], "Unknown");
        assert_eq!(removed["remove_mode"], 3);

        let applied = parse(&CapturedEvent::AuraApply { unit: Some(&unit), spell: &spell }.to_record(0.5));
        assert_eq!(applied["event"], "aura_apply");
        assert!(applied.get("remove_mode").is_none());
    }

    #[test]
    fn test_event_tags_match_log_names() {
        let unit = ActorSnapshot::player("Thrall", "Player-2");
        let spell = SpellInfo::new(133, "Fireball");
        let events = [
            CapturedEvent::EnterCombat { unit: Some(&unit), victim: None },
            CapturedEvent::LeaveCombat { creature: Some(&unit) },
            CapturedEvent::Evade { unit: Some(&unit), reason: 1 },
            CapturedEvent::SpellCast { caster: Some(&unit), spell: &spell },
        ];

        for event in events {
            assert_eq!(parse(&event.to_record(0.0))["event"], event.kind().as_str());
        }
    }

    #[test]
    fn test_filter_policies() {
        let spell = SpellInfo::new(133, "Fireball");
        assert_eq!(
            CapturedEvent::Damage { attacker: None, victim: None, amount: 1 }.filter_policy(),
            FilterPolicy::Either
        );
        assert_eq!(
            CapturedEvent::Death { unit: None, killer: None }.filter_policy(),
            FilterPolicy::Either
        );
        assert_eq!(
            CapturedEvent::SpellCast { caster: None, spell: &spell }.filter_policy(),
            FilterPolicy::Primary
        );
        assert_eq!(
            CapturedEvent::Evade { unit: None, reason: 0 }.filter_policy(),
            FilterPolicy::Primary
        );
    }

    #[test]
    fn test_markers() {
        assert_eq!(
            line(&start_marker("t1", None, "recordings/t1.jsonl")),
            r#"{"t":0.000,"event":"record_start","session":"t1","map":null,"file":"recordings/t1.jsonl"}"#
        );

        let stop = line(&stop_marker(2.5, "t1", 3));
        assert!(stop.contains(r#""duration":2.500"#));
        assert!(stop.contains(r#""events_captured":3"#));

        let overflow = parse(&overflow_marker(1.0, "t1", 3));
        assert_eq!(overflow["event"], "record_overflow");
        assert_eq!(overflow["max_events"], 3);
    }

    #[test]
    fn test_hostile_name_round_trips() {
        let name = "Evil \"Quote\" \\ Name\n";
        let actor = ActorSnapshot::player(name, "Player-3");
        let text = line(&ActorRecord::from(&actor));
        assert!(!text.contains('\n'));
        assert_eq!(serde_json::from_str::<Value>(&text).unwrap()["name"], name);
    }

    proptest! {
        #[test]
        fn prop_any_name_stays_on_one_line(name in any::<String>()) {
            let actor = ActorSnapshot::creature(1, name.clone(), "Creature-0-1");
            let text = line(&CapturedEvent::LeaveCombat { creature: Some(&actor) }.to_record(0.25));
            prop_assert!(!text.contains('\n'));
            let v: Value = serde_json::from_str(&text).unwrap();
            prop_assert_eq!(v["source"]["name"].as_str().unwrap(), name.as_str());
        }
    }
}
