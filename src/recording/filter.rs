// src/recording/filter.rs
//! Spatial and identity filter evaluated on every captured event

use crate::recording::actor::{ActorSnapshot, Position};

/// Spatial origin captured from the actor that started the session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Origin {
    pub map_id: u32,
    pub position: Position,
}

/// Active filter parameters of a session.
///
/// Each unset dimension accepts everything. The radius only constrains actors
/// standing on the origin's map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionFilter {
    /// Exact map match
    pub map_id: Option<u32>,

    /// Exact instance match, applied by scope queries
    pub instance_id: Option<u32>,

    pub origin: Option<Origin>,

    /// Radius around the origin; `<= 0` disables the distance check
    pub radius: f32,
}

impl SessionFilter {
    /// Whether an actor passes the map and radius checks
    pub fn passes(&self, actor: Option<&ActorSnapshot>) -> bool {
        let Some(actor) = actor else {
            return false;
        };

        if let Some(map_id) = self.map_id {
            if actor.map_id != map_id {
                return false;
            }
        }

        if self.radius > 0.0 {
            if let Some(origin) = &self.origin {
                if actor.map_id == origin.map_id
                    && actor.position.distance_sq(&origin.position) > self.radius * self.radius
                {
                    return false;
                }
            }
        }

        true
    }

    /// Whether a map/instance pair is inside the filter's scope
    pub fn in_scope(&self, map_id: u32, instance_id: Option<u32>) -> bool {
        if self.map_id.is_some_and(|m| m != map_id) {
            return false;
        }

        match self.instance_id {
            Some(wanted) => instance_id == Some(wanted),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn filter_around_origin(radius: f32) -> SessionFilter {
        SessionFilter {
            map_id: None,
            instance_id: None,
            origin: Some(Origin {
                map_id: 1,
                position: Position::new(0.0, 0.0, 0.0),
            }),
            radius,
        }
    }

    #[test]
    fn test_absent_actor_rejected() {
        assert!(!SessionFilter::default().passes(None));
    }

    #[test]
    fn test_map_filter() {
        let filter = SessionFilter {
            map_id: Some(36),
            ..Default::default()
        };

        let inside = ActorSnapshot::player("A", "P-1").on_map(36);
        let outside = ActorSnapshot::player("B", "P-2").on_map(0);
        assert!(filter.passes(Some(&inside)));
        assert!(!filter.passes(Some(&outside)));
    }

    #[test]
    fn test_map_zero_is_a_real_map() {
        let filter = SessionFilter {
            map_id: Some(0),
            ..Default::default()
        };

        assert!(filter.passes(Some(&ActorSnapshot::player("A", "P-1").on_map(0))));
        assert!(!filter.passes(Some(&ActorSnapshot::player("A", "P-1").on_map(1))));
    }

    #[test]
    fn test_radius_scenario() {
        let filter = filter_around_origin(10.0);

        let near = ActorSnapshot::creature(1, "Near", "C-1").on_map(1).at(7.0, 7.0, 0.0);
        let far = ActorSnapshot::creature(2, "Far", "C-2").on_map(1).at(8.0, 8.0, 0.0);
        let other_map = ActorSnapshot::creature(3, "Elsewhere", "C-3").on_map(2).at(7.0, 7.0, 0.0);

        assert!(filter.passes(Some(&near)));
        assert!(!filter.passes(Some(&far)));
        assert!(filter.passes(Some(&other_map)));
    }

    #[test]
    fn test_radius_boundary_inclusive() {
        let filter = filter_around_origin(5.0);
        let edge = ActorSnapshot::player("Edge", "P-9").on_map(1).at(3.0, 4.0, 0.0);
        assert!(filter.passes(Some(&edge)));
    }

    #[test]
    fn test_radius_without_origin_is_ignored() {
        let filter = SessionFilter {
            radius: 10.0,
            ..Default::default()
        };
        let far = ActorSnapshot::player("Far", "P-1").on_map(1).at(500.0, 0.0, 0.0);
        assert!(filter.passes(Some(&far)));
    }

    #[test]
    fn test_in_scope() {
        let filter = SessionFilter {
            map_id: Some(533),
            instance_id: Some(4),
            ..Default::default()
        };

        assert!(filter.in_scope(533, Some(4)));
        assert!(!filter.in_scope(533, Some(5)));
        assert!(!filter.in_scope(533, None));
        assert!(!filter.in_scope(1, Some(4)));
        assert!(SessionFilter::default().in_scope(1, None));
    }

    fn arb_actor() -> impl Strategy<Value = ActorSnapshot> {
        (any::<u32>(), -1000.0f32..1000.0, -1000.0f32..1000.0, -1000.0f32..1000.0).prop_map(
            |(map, x, y, z)| ActorSnapshot::unit(1, "Unit", "U-1").on_map(map).at(x, y, z),
        )
    }

    proptest! {
        #[test]
        fn prop_unfiltered_passes_everything(actor in arb_actor()) {
            prop_assert!(SessionFilter::default().passes(Some(&actor)));
        }

        #[test]
        fn prop_passes_is_pure(actor in arb_actor(), radius in 0.0f32..500.0, map in 0u32..4) {
            let filter = SessionFilter {
                map_id: Some(map),
                origin: Some(Origin { map_id: map, position: Position::default() }),
                radius,
                ..Default::default()
            };
            prop_assert_eq!(filter.passes(Some(&actor)), filter.clone().passes(Some(&actor.clone())));
        }

        #[test]
        fn prop_radius_never_rejects_other_maps(actor in arb_actor(), radius in 0.1f32..50.0) {
            let mut filter = filter_around_origin(radius);
            if let Some(origin) = filter.origin.as_mut() {
                origin.map_id = actor.map_id.wrapping_add(1);
            }
            prop_assert!(filter.passes(Some(&actor)));
        }
    }
}
