// src/recording/actor.rs
//! Read-only actor snapshots
//!
//! The recorder never touches the simulation's object model. Call sites hand
//! over a point-in-time [`ActorSnapshot`], usually through [`AsActorSnapshot`].

use serde::Serialize;

/// Closed set of actor kinds the recorder distinguishes.
///
/// Serialized as the `type` tag of actor records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    Creature,
    Player,
    #[serde(rename = "unit")]
    Other,
}

/// World-space position
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Squared Euclidean distance to another point
    pub fn distance_sq(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }
}

/// Point-in-time view of a simulated actor
#[derive(Debug, Clone, PartialEq)]
pub struct ActorSnapshot {
    pub kind: ActorKind,

    /// Template entry; not serialized for players
    pub entry: u32,

    pub name: String,

    /// Stable identifier rendered as text
    pub guid: String,

    pub map_id: u32,

    /// Instance the actor is in, `None` in the open world
    pub instance_id: Option<u32>,

    pub position: Position,
}

impl ActorSnapshot {
    pub fn creature(entry: u32, name: impl Into<String>, guid: impl Into<String>) -> Self {
        Self {
            kind: ActorKind::Creature,
            entry,
            name: name.into(),
            guid: guid.into(),
            map_id: 0,
            instance_id: None,
            position: Position::default(),
        }
    }

    pub fn player(name: impl Into<String>, guid: impl Into<String>) -> Self {
        Self {
            kind: ActorKind::Player,
            entry: 0,
            name: name.into(),
            guid: guid.into(),
            map_id: 0,
            instance_id: None,
            position: Position::default(),
        }
    }

    pub fn unit(entry: u32, name: impl Into<String>, guid: impl Into<String>) -> Self {
        Self {
            kind: ActorKind::Other,
            entry,
            name: name.into(),
            guid: guid.into(),
            map_id: 0,
            instance_id: None,
            position: Position::default(),
        }
    }

    pub fn on_map(mut self, map_id: u32) -> Self {
        self.map_id = map_id;
        self
    }

    pub fn in_instance(mut self, instance_id: u32) -> Self {
        self.instance_id = Some(instance_id);
        self
    }

    pub fn at(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = Position::new(x, y, z);
        self
    }

    pub fn is_player(&self) -> bool {
        self.kind == ActorKind::Player
    }
}

/// Narrow capability a simulation object implements to be recordable
pub trait AsActorSnapshot {
    fn as_actor_snapshot(&self) -> ActorSnapshot;
}

impl AsActorSnapshot for ActorSnapshot {
    fn as_actor_snapshot(&self) -> ActorSnapshot {
        self.clone()
    }
}

/// Spell or ability reference carried by aura and cast events
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpellInfo {
    pub id: u32,
    pub name: String,
}

impl SpellInfo {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Name written to records; empty names become `Unknown`
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "Unknown"
        } else {
            &self.name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags() {
        assert_eq!(serde_json::to_string(&ActorKind::Creature).unwrap(), r#""creature""#);
        assert_eq!(serde_json::to_string(&ActorKind::Player).unwrap(), r#""player""#);
        assert_eq!(serde_json::to_string(&ActorKind::Other).unwrap(), r#""unit""#);
    }

    #[test]
    fn test_distance_sq() {
        let a = Position::new(0.0, 0.0, 0.0);
        let b = Position::new(3.0, 4.0, 0.0);
        assert_eq!(a.distance_sq(&b), 25.0);
    }

    #[test]
    fn test_builder_helpers() {
        let actor = ActorSnapshot::creature(1234, "Hogger", "Creature-0-1")
            .on_map(0)
            .in_instance(7)
            .at(1.0, 2.0, 3.0);

        assert_eq!(actor.entry, 1234);
        assert_eq!(actor.instance_id, Some(7));
        assert_eq!(actor.position, Position::new(1.0, 2.0, 3.0));
        assert!(!actor.is_player());
    }

    #[test]
    fn test_spell_display_name() {
        assert_eq!(SpellInfo::new(133, "Fireball").display_name(), "Fireball");
        assert_eq!(SpellInfo::new(133, "").display_name(), "Unknown");
    }
}
