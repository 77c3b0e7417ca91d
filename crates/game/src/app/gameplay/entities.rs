use engine::{AabbHitbox, GameMap, Vec2};
use thiserror::Error;
use tracing::{debug, warn};

use super::crawler::{Crawler, CrawlerBump};
use super::player::Player;
use super::turret::{Turret, TurretBullet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct EntityId(pub(crate) u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum SpriteKind {
    Turret,
    TurretBullet,
    Crawler,
    CrawlerBump,
}

#[derive(Debug, Clone)]
pub(crate) enum EntityKind {
    Turret(Turret),
    TurretBullet(TurretBullet),
    Crawler(Crawler),
    CrawlerBump(CrawlerBump),
}

impl EntityKind {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            EntityKind::Turret(_) => "turret",
            EntityKind::TurretBullet(_) => "turret_bullet",
            EntityKind::Crawler(_) => "crawler",
            EntityKind::CrawlerBump(_) => "crawler_bump",
        }
    }

    pub(crate) fn sprite_kind(&self) -> SpriteKind {
        match self {
            EntityKind::Turret(_) => SpriteKind::Turret,
            EntityKind::TurretBullet(_) => SpriteKind::TurretBullet,
            EntityKind::Crawler(_) => SpriteKind::Crawler,
            EntityKind::CrawlerBump(_) => SpriteKind::CrawlerBump,
        }
    }

    /// Local-space hitbox, if this kind takes part in collisions.
    pub(crate) fn hitbox(&self) -> Option<AabbHitbox> {
        match self {
            EntityKind::Turret(_) | EntityKind::CrawlerBump(_) => None,
            EntityKind::TurretBullet(bullet) => Some(bullet.hitbox()),
            EntityKind::Crawler(crawler) => Some(crawler.hitbox()),
        }
    }

    /// Sprite sheet cell `(column, row)` for the current animation state.
    pub(crate) fn sprite_frame(&self) -> (u32, u32) {
        match self {
            EntityKind::Turret(turret) => (turret.animation_frame(), 0),
            EntityKind::TurretBullet(bullet) => (bullet.animation_frame(), 0),
            EntityKind::Crawler(crawler) => crawler.sprite_frame(),
            EntityKind::CrawlerBump(bump) => (bump.animation_frame(), 0),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Entity {
    pub(crate) id: EntityId,
    pub(crate) position: Vec2,
    pub(crate) kind: EntityKind,
}

impl Entity {
    fn tick(&mut self, dt_ms: f32, ctx: &mut TickContext<'_>) -> Result<TickOutcome, EntityFault> {
        let outcome = match &mut self.kind {
            EntityKind::Turret(turret) => turret.tick(self.position, dt_ms, ctx)?,
            EntityKind::TurretBullet(bullet) => bullet.tick(&mut self.position, dt_ms, ctx),
            EntityKind::Crawler(crawler) => crawler.tick(&mut self.position, dt_ms, ctx),
            EntityKind::CrawlerBump(bump) => bump.tick(dt_ms),
        };
        if !self.position.is_finite() {
            return Err(EntityFault::NonFinitePosition {
                x: self.position.x,
                y: self.position.y,
            });
        }
        Ok(outcome)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TickOutcome {
    Alive,
    Destroyed,
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub(crate) enum EntityFault {
    #[error("turret fired with no remembered target")]
    MissingTarget,
    #[error("entity position became non-finite ({x}, {y})")]
    NonFinitePosition { x: f32, y: f32 },
}

/// What an entity may touch during its tick: the static map, the player, and
/// a queue of entities to add once its tick returns.
pub(crate) struct TickContext<'a> {
    pub(crate) map: &'a GameMap,
    pub(crate) player: &'a mut Player,
    spawned: Vec<(Vec2, EntityKind)>,
}

impl<'a> TickContext<'a> {
    pub(crate) fn new(map: &'a GameMap, player: &'a mut Player) -> Self {
        Self {
            map,
            player,
            spawned: Vec::new(),
        }
    }

    pub(crate) fn spawn(&mut self, position: Vec2, kind: EntityKind) {
        self.spawned.push((position, kind));
    }

    #[cfg(test)]
    pub(crate) fn spawned_count(&self) -> usize {
        self.spawned.len()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct PassReport {
    pub(crate) ticked: usize,
    pub(crate) destroyed: usize,
    pub(crate) faulted: usize,
    pub(crate) spawned: usize,
}

/// Live simulation objects in insertion order. The player is not stored here.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    entities: Vec<Entity>,
    next_id: u64,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, position: Vec2, kind: EntityKind) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        debug!(entity = id.0, kind = kind.name(), "entity_added");
        self.entities.push(Entity { id, position, kind });
        id
    }

    #[cfg(test)]
    pub(crate) fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let index = self.index_of(id)?;
        Some(self.entities.remove(index))
    }

    /// Destroys every entity and returns how many there were.
    pub(crate) fn clear(&mut self) -> usize {
        let count = self.entities.len();
        self.entities.clear();
        count
    }

    #[cfg(test)]
    pub(crate) fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.entities.len()
    }

    #[cfg(test)]
    pub(crate) fn count_where(&self, predicate: impl Fn(&EntityKind) -> bool) -> usize {
        self.entities
            .iter()
            .filter(|entity| predicate(&entity.kind))
            .count()
    }

    #[cfg(test)]
    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities.iter().position(|entity| entity.id == id)
    }

    /// Ticks every entity present when the pass starts, in order. Entities
    /// spawned during the pass are appended past the bound and first tick on
    /// the next pass; removals shrink the bound in place. A faulted entity is
    /// logged and removed without stopping the pass.
    pub(crate) fn tick_all(
        &mut self,
        dt_ms: f32,
        map: &GameMap,
        player: &mut Player,
    ) -> PassReport {
        let mut report = PassReport::default();
        let mut bound = self.entities.len();
        let mut index = 0;
        while index < bound {
            let mut ctx = TickContext::new(map, player);
            let entity = &mut self.entities[index];
            let result = entity.tick(dt_ms, &mut ctx);
            let spawned = ctx.spawned;
            report.ticked += 1;

            let keep = match result {
                Ok(TickOutcome::Alive) => true,
                Ok(TickOutcome::Destroyed) => {
                    report.destroyed += 1;
                    false
                }
                Err(fault) => {
                    warn!(
                        entity = entity.id.0,
                        kind = entity.kind.name(),
                        error = %fault,
                        "entity_fault_removed"
                    );
                    report.faulted += 1;
                    false
                }
            };
            if keep {
                index += 1;
            } else {
                self.entities.remove(index);
                bound -= 1;
            }

            report.spawned += spawned.len();
            for (position, kind) in spawned {
                self.add(position, kind);
            }
        }
        report
    }
}
