use engine::{AabbHitbox, Countdown, StateMachine, Vec2};
use tracing::debug;

use super::entities::{EntityFault, EntityKind, TickContext, TickOutcome};

const EMERGE_MS: f32 = 1200.0;
const AIM_MS: f32 = 600.0;
const BURST_COOLDOWN_MS: f32 = 400.0;
const COOLDOWN_MS: f32 = 3000.0;
const SHUTDOWN_MS: f32 = 4000.0;
const BURST_SIZE: u32 = 3;
const ANIMATION_FRAME_MS: f32 = 100.0;
const LAST_EMERGE_FRAME: u32 = 11;

const MUZZLE_OFFSET: Vec2 = Vec2::new(12.0, 12.0);
const BULLET_SPEED: f32 = 0.1;
const BULLET_LIFETIME_MS: f32 = 6000.0;
const BULLET_FRAMES: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum TurretState {
    Init,
    Emerging,
    Active,
    Aiming,
    Firing,
    BurstCooldown,
    Cooldown,
    Retracting,
}

/// Side effect attached to a turret transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum TurretEffect {
    StartCountdown { duration_ms: f32, then: TurretState },
    ResetBurst,
    ClearCountdown,
    Nothing,
}

pub(crate) fn turret_state_machine() -> StateMachine<TurretState, TurretEffect> {
    use TurretEffect::*;
    use TurretState::*;

    let countdown = |duration_ms, then| StartCountdown { duration_ms, then };
    let mut machine = StateMachine::new(Init);
    machine.add_transition(Init, Emerging, countdown(EMERGE_MS, Active));
    machine.add_transition(Emerging, Active, countdown(SHUTDOWN_MS, Retracting));
    machine.add_transition(Active, Aiming, countdown(AIM_MS, Firing));
    machine.add_transition(Aiming, Active, countdown(SHUTDOWN_MS, Retracting));
    machine.add_transition(Aiming, Firing, ResetBurst);
    machine.add_transition(Firing, BurstCooldown, countdown(BURST_COOLDOWN_MS, Firing));
    machine.add_transition(BurstCooldown, Firing, Nothing);
    machine.add_transition(Firing, Cooldown, countdown(COOLDOWN_MS, Active));
    machine.add_transition(Cooldown, Active, countdown(SHUTDOWN_MS, Retracting));
    machine.add_transition(Active, Retracting, countdown(EMERGE_MS, Init));
    machine.add_transition(Retracting, Init, ClearCountdown);
    machine
}

/// Ceiling turret. Wakes when the player passes below, aims for a moment,
/// fires a three-shot burst, then either re-aims or retracts.
#[derive(Debug, Clone)]
pub(crate) struct Turret {
    machine: StateMachine<TurretState, TurretEffect>,
    countdown: Countdown<TurretState>,
    burst_remaining: u32,
    target: Option<Vec2>,
    animation_frame: u32,
}

impl Turret {
    pub(crate) fn new() -> Self {
        Self {
            machine: turret_state_machine(),
            countdown: Countdown::default(),
            burst_remaining: BURST_SIZE,
            target: None,
            animation_frame: 0,
        }
    }

    pub(crate) fn state(&self) -> TurretState {
        self.machine.current_state()
    }

    #[cfg(test)]
    pub(crate) fn target(&self) -> Option<Vec2> {
        self.target
    }

    #[cfg(test)]
    pub(crate) fn burst_remaining(&self) -> u32 {
        self.burst_remaining
    }

    pub(crate) fn animation_frame(&self) -> u32 {
        self.animation_frame
    }

    pub(crate) fn tick(
        &mut self,
        position: Vec2,
        dt_ms: f32,
        ctx: &mut TickContext<'_>,
    ) -> Result<TickOutcome, EntityFault> {
        if let Some(next) = self.countdown.tick(dt_ms) {
            self.request(next);
        }

        match self.state() {
            TurretState::Init => {
                self.animation_frame = 0;
                if self.sense(position, ctx) {
                    self.request(TurretState::Emerging);
                }
            }
            TurretState::Emerging => {
                self.animation_frame = LAST_EMERGE_FRAME.saturating_sub(self.emerge_phase());
            }
            TurretState::Retracting => {
                self.animation_frame = self.emerge_phase();
            }
            TurretState::Active => {
                if self.sense(position, ctx) {
                    self.request(TurretState::Aiming);
                }
            }
            TurretState::Aiming => {
                if !self.sense(position, ctx) {
                    self.request(TurretState::Active);
                }
            }
            TurretState::Firing => {
                self.fire(position, ctx)?;
                if self.burst_remaining > 0 {
                    self.request(TurretState::BurstCooldown);
                } else {
                    self.request(TurretState::Cooldown);
                }
            }
            TurretState::BurstCooldown | TurretState::Cooldown => {}
        }
        Ok(TickOutcome::Alive)
    }

    /// Records the player's hitbox center when the player is below the turret.
    fn sense(&mut self, position: Vec2, ctx: &TickContext<'_>) -> bool {
        if ctx.player.position().y > position.y {
            self.target = Some(ctx.player.hitbox().center());
            return true;
        }
        false
    }

    fn fire(&mut self, position: Vec2, ctx: &mut TickContext<'_>) -> Result<(), EntityFault> {
        let target = self.target.ok_or(EntityFault::MissingTarget)?;
        self.burst_remaining = self.burst_remaining.saturating_sub(1);
        let origin = position + MUZZLE_OFFSET;
        let direction = (target - origin).normalize();
        debug!(
            burst_remaining = self.burst_remaining,
            origin_x = origin.x,
            origin_y = origin.y,
            "turret_fired"
        );
        ctx.spawn(
            origin,
            EntityKind::TurretBullet(TurretBullet::new(direction.scaled(BULLET_SPEED))),
        );
        Ok(())
    }

    /// Hundred-millisecond phase of the running emerge or retract countdown.
    fn emerge_phase(&self) -> u32 {
        let remaining = self.countdown.remaining().max(0.0) % EMERGE_MS;
        ((remaining / ANIMATION_FRAME_MS).floor() as u32).min(LAST_EMERGE_FRAME)
    }

    fn request(&mut self, to: TurretState) {
        let Ok(effect) = self.machine.transition(to) else {
            return;
        };
        match effect {
            TurretEffect::StartCountdown { duration_ms, then } => {
                self.countdown.start(duration_ms, then);
            }
            TurretEffect::ResetBurst => self.burst_remaining = BURST_SIZE,
            TurretEffect::ClearCountdown => self.countdown.clear(),
            TurretEffect::Nothing => {}
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct TurretBullet {
    velocity: Vec2,
    lifetime_ms: f32,
}

impl TurretBullet {
    pub(crate) fn new(velocity: Vec2) -> Self {
        Self {
            velocity,
            lifetime_ms: BULLET_LIFETIME_MS,
        }
    }

    pub(crate) fn hitbox(&self) -> AabbHitbox {
        AabbHitbox::new(Vec2::new(1.0, 1.0), Vec2::new(7.0, 7.0))
    }

    pub(crate) fn animation_frame(&self) -> u32 {
        ((self.lifetime_ms.max(0.0) / ANIMATION_FRAME_MS) as u32) % BULLET_FRAMES
    }

    pub(crate) fn tick(
        &mut self,
        position: &mut Vec2,
        dt_ms: f32,
        ctx: &mut TickContext<'_>,
    ) -> TickOutcome {
        self.lifetime_ms -= dt_ms;
        if self.lifetime_ms < 0.0 {
            return TickOutcome::Destroyed;
        }
        *position += self.velocity.scaled(dt_ms);
        let hitbox = self.hitbox().with_offset(*position);
        if ctx.map.collides_with_solid(&hitbox) {
            return TickOutcome::Destroyed;
        }
        if !ctx.player.is_invincible() && hitbox.collides(ctx.player.hitbox()) {
            ctx.player.damage(1);
            return TickOutcome::Destroyed;
        }
        TickOutcome::Alive
    }
}
