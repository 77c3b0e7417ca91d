use engine::{GameMap, InputSnapshot, Vec2, ZoneId};
use tracing::warn;

use super::entities::{PassReport, Registry};
use super::player::Player;
use super::spawning::{apply_zone_change, ZoneTracker};

pub(crate) const PLAYER_START: Vec2 = Vec2::new(128.0, 64.0);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct TickReport {
    pub(crate) pass: PassReport,
    pub(crate) zone_entered: Option<ZoneId>,
    pub(crate) spawned_for_zone: usize,
}

/// Top-level per-frame simulation: the player, the entity registry and the
/// zone the player currently occupies. The map is borrowed each tick.
#[derive(Debug)]
pub(crate) struct Simulation {
    player: Player,
    registry: Registry,
    zone_tracker: ZoneTracker,
    elapsed_ms: f64,
}

impl Simulation {
    pub(crate) fn new(player_start: Vec2) -> Self {
        Self {
            player: Player::new(player_start),
            registry: Registry::new(),
            zone_tracker: ZoneTracker::new(),
            elapsed_ms: 0.0,
        }
    }

    pub(crate) fn player(&self) -> &Player {
        &self.player
    }

    #[cfg(test)]
    pub(crate) fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub(crate) fn registry(&self) -> &Registry {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub(crate) fn current_zone(&self) -> Option<ZoneId> {
        self.zone_tracker.current()
    }

    pub(crate) fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// Player first, then every registry entity in order, then the zone check.
    pub(crate) fn tick(&mut self, dt_ms: f32, input: &InputSnapshot, map: &GameMap) -> TickReport {
        let mut report = TickReport::default();
        if !dt_ms.is_finite() || dt_ms < 0.0 {
            warn!(dt_ms, "simulation_tick_skipped");
            return report;
        }
        self.elapsed_ms += f64::from(dt_ms);

        self.player.tick(dt_ms, input, map);
        report.pass = self.registry.tick_all(dt_ms, map, &mut self.player);

        if let Some(change) = self.zone_tracker.update(map, self.player.position()) {
            report.spawned_for_zone = apply_zone_change(change, map, &mut self.registry);
            report.zone_entered = change.to;
        }
        report
    }
}
