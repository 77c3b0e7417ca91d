use engine::{AabbHitbox, Vec2};
use tracing::debug;

use super::entities::{EntityKind, TickContext, TickOutcome};

const WALK_SPEED: f32 = 0.1;
const WALK_FRAME_MS: f32 = 150.0;
const WALK_FRAMES: u32 = 2;
const BUMP_LIFETIME_MS: f32 = 700.0;
const BUMP_FRAME_MS: f32 = 100.0;

/// Ground crawler that paces back and forth, turning around at terrain.
#[derive(Debug, Clone)]
pub(crate) struct Crawler {
    velocity: Vec2,
    animation_ms: f32,
}

impl Crawler {
    pub(crate) fn new() -> Self {
        Self {
            velocity: Vec2::new(WALK_SPEED, 0.0),
            animation_ms: 0.0,
        }
    }

    #[cfg(test)]
    pub(crate) fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub(crate) fn hitbox(&self) -> AabbHitbox {
        AabbHitbox::new(Vec2::new(5.0, 5.0), Vec2::new(30.0, 20.0))
    }

    /// Walk cycle column; row 1 faces right.
    pub(crate) fn sprite_frame(&self) -> (u32, u32) {
        let column = (self.animation_ms / WALK_FRAME_MS) as u32 % WALK_FRAMES;
        let row = u32::from(self.velocity.x > 0.0);
        (column, row)
    }

    pub(crate) fn tick(
        &mut self,
        position: &mut Vec2,
        dt_ms: f32,
        ctx: &mut TickContext<'_>,
    ) -> TickOutcome {
        self.animation_ms += dt_ms;
        position.x += self.velocity.x * dt_ms;
        position.y += self.velocity.y;

        if ctx
            .map
            .collides_with_solid(&self.hitbox().with_offset(*position))
        {
            position.x -= self.velocity.x * dt_ms;
            self.velocity.x = -self.velocity.x;
            debug!(x = position.x, y = position.y, "crawler_turned");
        }

        let hitbox = self.hitbox().with_offset(*position);
        if !ctx.player.is_invincible() && hitbox.collides(ctx.player.hitbox()) {
            ctx.player.damage(1);
            ctx.spawn(*position, EntityKind::CrawlerBump(CrawlerBump::new()));
        }
        TickOutcome::Alive
    }
}

/// Short-lived impact effect left where a crawler hit the player.
#[derive(Debug, Clone, Default)]
pub(crate) struct CrawlerBump {
    age_ms: f32,
}

impl CrawlerBump {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn age_ms(&self) -> f32 {
        self.age_ms
    }

    pub(crate) fn animation_frame(&self) -> u32 {
        (self.age_ms / BUMP_FRAME_MS) as u32
    }

    pub(crate) fn tick(&mut self, dt_ms: f32) -> TickOutcome {
        self.age_ms += dt_ms;
        if self.age_ms > BUMP_LIFETIME_MS {
            TickOutcome::Destroyed
        } else {
            TickOutcome::Alive
        }
    }
}
