use engine::{GameMap, Vec2, ZoneId};
use tracing::{debug, info};

use super::crawler::Crawler;
use super::entities::{EntityKind, Registry};
use super::turret::Turret;

pub(crate) const TURRET_SPAWN_TYPE: &str = "turret";
pub(crate) const CRAWLER_SPAWN_TYPE: &str = "ag";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ZoneChange {
    pub(crate) from: Option<ZoneId>,
    pub(crate) to: Option<ZoneId>,
}

/// Remembers which zone holds the player. Recomputed every tick; a change is
/// reported once, on the tick it happens.
#[derive(Debug, Clone, Default)]
pub(crate) struct ZoneTracker {
    current: Option<ZoneId>,
}

impl ZoneTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn current(&self) -> Option<ZoneId> {
        self.current
    }

    pub(crate) fn update(&mut self, map: &GameMap, player_position: Vec2) -> Option<ZoneChange> {
        let next = map.zone_containing(player_position).map(|zone| zone.id());
        if next == self.current {
            return None;
        }
        let change = ZoneChange {
            from: self.current,
            to: next,
        };
        self.current = next;
        debug!(from = ?change.from, to = ?change.to, "zone_changed");
        Some(change)
    }
}

/// Maps an event-layer spawn type onto a fresh entity.
pub(crate) fn kind_for_spawn_type(spawn_type: &str) -> Option<EntityKind> {
    match spawn_type {
        TURRET_SPAWN_TYPE => Some(EntityKind::Turret(Turret::new())),
        CRAWLER_SPAWN_TYPE => Some(EntityKind::Crawler(Crawler::new())),
        _ => None,
    }
}

/// Entering a zone destroys every live entity and spawns that zone's
/// spawners. Leaving all zones changes nothing. Returns the spawn count.
pub(crate) fn apply_zone_change(
    change: ZoneChange,
    map: &GameMap,
    registry: &mut Registry,
) -> usize {
    let Some(zone) = change.to else {
        return 0;
    };

    let destroyed = registry.clear();
    let mut spawned = 0;
    for spawner in map.spawners_in_zone(zone) {
        match kind_for_spawn_type(&spawner.spawn_type) {
            Some(kind) => {
                registry.add(spawner.position, kind);
                spawned += 1;
            }
            None => debug!(
                spawn_type = %spawner.spawn_type,
                x = spawner.position.x,
                y = spawner.position.y,
                "spawn_type_ignored"
            ),
        }
    }
    info!(zone = zone.0, destroyed, spawned, "zone_entered");
    spawned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::gameplay::test_maps::{add_column_zone, add_spawner, map_from_rows};

    fn two_zone_map() -> GameMap {
        let mut map = map_from_rows(&["........", "........", "########"]);
        add_column_zone(&mut map, 1, 0, 4);
        add_column_zone(&mut map, 2, 4, 4);
        add_spawner(&mut map, 16.0, 0.0, "turret");
        add_spawner(&mut map, 80.0, 8.0, "ag");
        add_spawner(&mut map, 96.0, 8.0, "ag");
        add_spawner(&mut map, 100.0, 8.0, "medkit");
        map
    }

    #[test]
    fn change_is_reported_only_on_the_transition_tick() {
        let map = two_zone_map();
        let mut tracker = ZoneTracker::new();

        let first = tracker.update(&map, Vec2::new(10.0, 20.0));
        assert_eq!(
            first,
            Some(ZoneChange {
                from: None,
                to: Some(ZoneId(1))
            })
        );
        assert_eq!(tracker.update(&map, Vec2::new(30.0, 20.0)), None);

        let second = tracker.update(&map, Vec2::new(70.0, 20.0));
        assert_eq!(second.map(|change| change.to), Some(Some(ZoneId(2))));
        assert_eq!(tracker.current(), Some(ZoneId(2)));
    }

    #[test]
    fn leaving_every_zone_reports_none_target() {
        let map = two_zone_map();
        let mut tracker = ZoneTracker::new();
        tracker.update(&map, Vec2::new(10.0, 20.0));

        let change = tracker.update(&map, Vec2::new(500.0, 20.0));

        assert_eq!(change.map(|change| change.to), Some(None));
    }

    #[test]
    fn entering_zone_replaces_registry_contents() {
        let map = two_zone_map();
        let mut registry = Registry::new();
        apply_zone_change(
            ZoneChange {
                from: None,
                to: Some(ZoneId(1)),
            },
            &map,
            &mut registry,
        );
        assert_eq!(registry.len(), 1);

        let spawned = apply_zone_change(
            ZoneChange {
                from: Some(ZoneId(1)),
                to: Some(ZoneId(2)),
            },
            &map,
            &mut registry,
        );

        assert_eq!(spawned, 2);
        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.count_where(|kind| matches!(kind, EntityKind::Crawler(_))),
            2
        );
    }

    #[test]
    fn exiting_to_no_zone_keeps_entities() {
        let map = two_zone_map();
        let mut registry = Registry::new();
        registry.add(Vec2::ZERO, EntityKind::Turret(Turret::new()));

        let spawned = apply_zone_change(
            ZoneChange {
                from: Some(ZoneId(1)),
                to: None,
            },
            &map,
            &mut registry,
        );

        assert_eq!(spawned, 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unknown_spawn_types_are_skipped() {
        assert!(kind_for_spawn_type("turret").is_some());
        assert!(kind_for_spawn_type("ag").is_some());
        assert!(kind_for_spawn_type("medkit").is_none());
    }
}
