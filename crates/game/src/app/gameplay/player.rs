use engine::{AabbHitbox, GameMap, InputAction, InputSnapshot, Vec2};
use thiserror::Error;
use tracing::{info, warn};

pub(crate) const TILE_SIZE: f32 = 16.0;

/// Per-millisecond gravity; one 16 ms frame adds 0.003 px/ms.
const GRAVITY_PER_MS: f32 = 0.003 / 16.0;
const MAX_FALL_SPEED: f32 = 0.6;
const RUN_ACCELERATION: f32 = 0.004;
const RUN_DECELERATION: f32 = 0.008;
const MAX_RUN_SPEED: f32 = 1.5;
const RUN_INTEGRATION_SCALE: f32 = 0.1;
const JUMP_VELOCITY: f32 = -0.21;
const JUMP_HELD_GRAVITY_SCALE: f32 = 1.0;
const JUMP_RELEASED_GRAVITY_SCALE: f32 = 2.5;

const STANDING_OFFSET: Vec2 = Vec2::new(-8.0, -47.0);
const STANDING_SIZE: Vec2 = Vec2::new(16.0, 48.0);
const CROUCHING_OFFSET: Vec2 = Vec2::new(-8.0, -31.0);
const CROUCHING_SIZE: Vec2 = Vec2::new(16.0, 32.0);

/// Probe below the feet used to find ground one step down.
const GROUND_LOOKAHEAD: f32 = 8.0;
/// Probe above the feet used to escape a solid tile.
const EMBED_LOOKUP: f32 = -3.0;
/// Longest vertical move checked against the grid at once; shorter than a tile
/// so a fall cannot skip a one-tile floor.
const MAX_AIRBORNE_STEP: f32 = TILE_SIZE - 1.0;

const KNOCKBACK_MS: f32 = 300.0;
const INVINCIBILITY_MS: f32 = 1500.0;
const KNOCKBACK_SPEED_X: f32 = 0.6;
const KNOCKBACK_SPEED_Y: f32 = -0.12;
pub(crate) const MAX_HEALTH: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Facing {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlayerPose {
    Idle,
    Running,
    Jumping,
    Falling,
    Crouching,
    Hurt,
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub(crate) enum PlayerFault {
    #[error("player feet embedded in solid tile with solid tile above at ({x}, {y})")]
    EmbeddedInSolid { x: f32, y: f32 },
}

/// Player controller. `position` is the point between the feet; the hitbox
/// extends up from it.
#[derive(Debug, Clone)]
pub(crate) struct Player {
    position: Vec2,
    velocity: Vec2,
    hitbox: AabbHitbox,
    on_ground: bool,
    on_slope: bool,
    crouching: bool,
    flashing: bool,
    knockback_ms: f32,
    invincible_ms: f32,
    gravity_scale: f32,
    facing: Facing,
    health: u32,
    embedded_recoveries: u32,
    last_fault: Option<PlayerFault>,
}

impl Player {
    pub(crate) fn new(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            hitbox: standing_hitbox().with_offset(position),
            on_ground: false,
            on_slope: false,
            crouching: false,
            flashing: false,
            knockback_ms: 0.0,
            invincible_ms: 0.0,
            gravity_scale: JUMP_HELD_GRAVITY_SCALE,
            facing: Facing::Right,
            health: MAX_HEALTH,
            embedded_recoveries: 0,
            last_fault: None,
        }
    }

    #[cfg(test)]
    /// A player standing still on ground at `position`.
    pub(crate) fn grounded_at(position: Vec2) -> Self {
        Self {
            on_ground: true,
            ..Self::new(position)
        }
    }

    pub(crate) fn position(&self) -> Vec2 {
        self.position
    }

    pub(crate) fn velocity(&self) -> Vec2 {
        self.velocity
    }

    #[cfg(test)]
    pub(crate) fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    /// World-space hitbox for the current stance.
    pub(crate) fn hitbox(&self) -> &AabbHitbox {
        &self.hitbox
    }

    pub(crate) fn is_on_ground(&self) -> bool {
        self.on_ground
    }

    pub(crate) fn is_on_slope(&self) -> bool {
        self.on_slope
    }

    #[cfg(test)]
    pub(crate) fn is_crouching(&self) -> bool {
        self.crouching
    }

    pub(crate) fn is_knockback(&self) -> bool {
        self.knockback_ms > 0.0
    }

    pub(crate) fn is_invincible(&self) -> bool {
        self.invincible_ms > 0.0
    }

    pub(crate) fn is_flashing(&self) -> bool {
        self.flashing
    }

    pub(crate) fn facing(&self) -> Facing {
        self.facing
    }

    pub(crate) fn health(&self) -> u32 {
        self.health
    }

    pub(crate) fn embedded_recoveries(&self) -> u32 {
        self.embedded_recoveries
    }

    pub(crate) fn last_fault(&self) -> Option<PlayerFault> {
        self.last_fault
    }

    pub(crate) fn pose(&self) -> PlayerPose {
        if self.is_knockback() {
            PlayerPose::Hurt
        } else if self.crouching {
            PlayerPose::Crouching
        } else if !self.on_ground {
            if self.velocity.y < 0.0 {
                PlayerPose::Jumping
            } else {
                PlayerPose::Falling
            }
        } else if self.velocity.x != 0.0 {
            PlayerPose::Running
        } else {
            PlayerPose::Idle
        }
    }

    /// Applies a hit unless invincible. Returns whether damage was taken.
    pub(crate) fn damage(&mut self, amount: u32) -> bool {
        if self.is_invincible() {
            return false;
        }
        self.health = self.health.saturating_sub(amount);
        let away = match self.facing {
            Facing::Right => -KNOCKBACK_SPEED_X,
            Facing::Left => KNOCKBACK_SPEED_X,
        };
        self.velocity = Vec2::new(away, KNOCKBACK_SPEED_Y);
        self.on_ground = false;
        self.on_slope = false;
        self.set_crouching(false);
        self.knockback_ms = KNOCKBACK_MS;
        self.invincible_ms = INVINCIBILITY_MS;
        info!(health = self.health, amount, "player_damaged");
        true
    }

    pub(crate) fn tick(&mut self, dt_ms: f32, input: &InputSnapshot, map: &GameMap) {
        self.hitbox.set_offset(self.position);
        self.knockback_ms = (self.knockback_ms - dt_ms).max(0.0);
        self.invincible_ms = (self.invincible_ms - dt_ms).max(0.0);
        self.flashing = self.is_invincible() && !self.flashing;

        if !self.is_knockback() {
            self.apply_controls(dt_ms, input);
        }

        self.position.x += self.velocity.x * dt_ms * RUN_INTEGRATION_SCALE;
        self.velocity.y = (self.velocity.y + GRAVITY_PER_MS * self.gravity_scale * dt_ms)
            .min(MAX_FALL_SPEED);

        let fraction_x = self.position.x.rem_euclid(TILE_SIZE) / TILE_SIZE;
        self.resolve_lateral(map);

        if self.on_ground {
            self.resolve_grounded(map, fraction_x);
        } else {
            self.resolve_airborne(dt_ms, map, fraction_x);
        }
        self.hitbox.set_offset(self.position);
    }

    fn apply_controls(&mut self, dt_ms: f32, input: &InputSnapshot) {
        self.set_crouching(self.on_ground && input.is_down(InputAction::MoveDown));

        let right = input.is_down(InputAction::MoveRight);
        let left = !right && input.is_down(InputAction::MoveLeft);
        if right {
            self.facing = Facing::Right;
        } else if left {
            self.facing = Facing::Left;
        }

        let previous = self.velocity.x;
        let mut next = previous;
        if right && !self.crouching {
            next += RUN_ACCELERATION * dt_ms;
            if previous < 0.0 {
                next += RUN_DECELERATION * dt_ms;
            }
        } else if left && !self.crouching {
            next -= RUN_ACCELERATION * dt_ms;
            if previous > 0.0 {
                next -= RUN_DECELERATION * dt_ms;
            }
        } else if previous != 0.0 {
            next -= previous.signum() * RUN_DECELERATION * dt_ms;
            if next.signum() != previous.signum() {
                next = 0.0;
            }
        }
        self.velocity.x = next.clamp(-MAX_RUN_SPEED, MAX_RUN_SPEED);

        if input.is_down(InputAction::MoveUp) {
            if self.on_ground {
                self.on_ground = false;
                self.on_slope = false;
                self.set_crouching(false);
                self.velocity.y = JUMP_VELOCITY;
            }
        } else {
            self.gravity_scale = JUMP_RELEASED_GRAVITY_SCALE;
        }
    }

    fn set_crouching(&mut self, crouching: bool) {
        if self.crouching == crouching {
            return;
        }
        self.crouching = crouching;
        let stance = if crouching {
            crouching_hitbox()
        } else {
            standing_hitbox()
        };
        self.hitbox = stance.with_offset(self.position);
    }

    fn resolve_lateral(&mut self, map: &GameMap) {
        let left = self.hitbox.top_left_local().x;
        let right = left + self.hitbox.width();
        if !self.on_slope {
            self.push_out_of_walls(map, left, right, 0.0);
        }
        let top = self.hitbox.top_left_local().y;
        let height = self.hitbox.height();
        let mut step = 0.0;
        while step < height {
            self.push_out_of_walls(map, left, right, top + step);
            step += TILE_SIZE;
        }
    }

    fn push_out_of_walls(&mut self, map: &GameMap, left: f32, right: f32, dy: f32) {
        if map.is_solid_block(self.position, Vec2::new(right, dy)) {
            self.position.x -= (self.position.x + right).rem_euclid(TILE_SIZE);
            self.velocity.x = 0.0;
        }
        if map.is_solid_block(self.position, Vec2::new(left, dy)) {
            self.position.x += TILE_SIZE - (self.position.x + left).rem_euclid(TILE_SIZE);
            self.velocity.x = 0.0;
        }
    }

    fn resolve_grounded(&mut self, map: &GameMap, fraction_x: f32) {
        self.gravity_scale = JUMP_HELD_GRAVITY_SCALE;
        self.velocity.y = 0.0;
        self.on_slope = false;
        let into_tile_y = self.position.y.rem_euclid(TILE_SIZE);

        let Some(feet) = map.tile_at(self.position) else {
            let below = map.tile_at(self.position + Vec2::new(0.0, GROUND_LOOKAHEAD));
            match below.map(|tile| map.slope_properties(tile)) {
                None => self.on_ground = false,
                Some(Some(slope)) => {
                    self.position.y -= into_tile_y - slope.height_at(fraction_x) - TILE_SIZE;
                    self.on_slope = true;
                }
                Some(None) => self.position.y = self.position.y - into_tile_y + TILE_SIZE - 1.0,
            }
            return;
        };

        match map.slope_properties(feet) {
            Some(slope) => {
                self.position.y -= into_tile_y - slope.height_at(fraction_x);
                self.on_slope = true;
            }
            None => self.escape_solid(map, fraction_x, into_tile_y),
        }
    }

    fn escape_solid(&mut self, map: &GameMap, fraction_x: f32, into_tile_y: f32) {
        let above = map.tile_at(self.position + Vec2::new(0.0, EMBED_LOOKUP));
        match above.map(|tile| map.slope_properties(tile)) {
            None => self.position.y = self.position.y - into_tile_y - 1.0,
            Some(Some(slope)) => {
                self.position.y -= TILE_SIZE + into_tile_y - slope.height_at(fraction_x);
                self.on_slope = true;
            }
            Some(None) => {
                let fault = PlayerFault::EmbeddedInSolid {
                    x: self.position.x,
                    y: self.position.y,
                };
                warn!(error = %fault, "player_embedded_recovered");
                self.position.y = self.position.y - into_tile_y - 1.0;
                self.embedded_recoveries += 1;
                self.last_fault = Some(fault);
            }
        }
    }

    fn resolve_airborne(&mut self, dt_ms: f32, map: &GameMap, fraction_x: f32) {
        self.on_ground = false;
        self.on_slope = false;

        let travel = self.velocity.y * dt_ms;
        let steps = (travel.abs() / MAX_AIRBORNE_STEP).ceil().max(1.0) as u32;
        let step = travel / steps as f32;
        for _ in 0..steps {
            self.position.y += step;
            if self.bump_head(map) {
                self.land(map, fraction_x);
                return;
            }
            if self.land(map, fraction_x) {
                return;
            }
        }
    }

    /// Stops upward motion at the underside of a tile.
    fn bump_head(&mut self, map: &GameMap) -> bool {
        let head = Vec2::new(0.0, self.hitbox.top_left_local().y);
        if self.velocity.y >= 0.0 || map.terrain_at(self.position, head).is_none() {
            return false;
        }
        self.position.y += TILE_SIZE - self.position.y.rem_euclid(TILE_SIZE);
        self.velocity.y = 0.0;
        true
    }

    fn land(&mut self, map: &GameMap, fraction_x: f32) -> bool {
        let Some(feet) = map.tile_at(self.position) else {
            return false;
        };
        let into_tile_y = self.position.y.rem_euclid(TILE_SIZE);
        match map.slope_properties(feet) {
            Some(slope) => {
                let surface = slope.height_at(fraction_x);
                if surface > into_tile_y {
                    return false;
                }
                self.position.y -= into_tile_y - surface;
                self.on_slope = true;
            }
            None => self.position.y = self.position.y - into_tile_y - 1.0,
        }
        self.on_ground = true;
        true
    }
}

fn standing_hitbox() -> AabbHitbox {
    AabbHitbox::from_offset_and_size(STANDING_OFFSET, STANDING_SIZE)
}

fn crouching_hitbox() -> AabbHitbox {
    AabbHitbox::from_offset_and_size(CROUCHING_OFFSET, CROUCHING_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::gameplay::test_maps::map_from_rows;

    fn assert_close(actual: f32, expected: f32) {
        assert!((actual - expected).abs() < 1e-4, "{actual} vs {expected}");
    }

    fn open_floor() -> GameMap {
        map_from_rows(&[
            "..........",
            "..........",
            "..........",
            "..........",
            "##########",
        ])
    }

    #[test]
    fn standing_hitbox_spans_feet_to_head() {
        let player = Player::new(Vec2::new(100.0, 63.0));
        assert_eq!(player.hitbox().top_left(), Vec2::new(92.0, 16.0));
        assert_eq!(player.hitbox().bottom_right(), Vec2::new(108.0, 64.0));
    }

    #[test]
    fn crouching_shrinks_hitbox_and_blocks_acceleration() {
        let map = open_floor();
        let mut player = Player::grounded_at(Vec2::new(80.0, 63.0));
        let input = InputSnapshot::holding(&[InputAction::MoveDown, InputAction::MoveRight]);

        player.tick(16.0, &input, &map);

        assert!(player.is_crouching());
        assert_eq!(player.pose(), PlayerPose::Crouching);
        assert_eq!(player.hitbox().height(), 32.0);
        assert_eq!(player.velocity().x, 0.0);
        assert_eq!(player.facing(), Facing::Right);

        player.tick(16.0, &InputSnapshot::empty(), &map);
        assert!(!player.is_crouching());
        assert_eq!(player.hitbox().height(), 48.0);
    }

    #[test]
    fn acceleration_is_capped_at_max_run_speed() {
        let map = open_floor();
        let mut player = Player::grounded_at(Vec2::new(20.0, 63.0));
        let input = InputSnapshot::holding(&[InputAction::MoveRight]);

        player.tick(100.0, &input, &map);
        assert_close(player.velocity().x, 0.4);
        for _ in 0..5 {
            player.tick(100.0, &input, &map);
        }
        assert_eq!(player.velocity().x, MAX_RUN_SPEED);
        assert_eq!(player.pose(), PlayerPose::Running);
    }

    #[test]
    fn deceleration_stops_at_zero_instead_of_reversing() {
        let map = open_floor();
        let mut player = Player::grounded_at(Vec2::new(80.0, 63.0));
        player.set_velocity(Vec2::new(0.05, 0.0));

        player.tick(16.0, &InputSnapshot::empty(), &map);
        assert_eq!(player.velocity().x, 0.0);
        player.tick(16.0, &InputSnapshot::empty(), &map);
        assert_eq!(player.velocity().x, 0.0);
        assert_eq!(player.pose(), PlayerPose::Idle);
    }

    #[test]
    fn reversing_adds_extra_deceleration() {
        let map = open_floor();
        let mut player = Player::grounded_at(Vec2::new(80.0, 63.0));
        player.set_velocity(Vec2::new(1.0, 0.0));

        player.tick(10.0, &InputSnapshot::holding(&[InputAction::MoveLeft]), &map);

        assert_close(player.velocity().x, 1.0 - 0.04 - 0.08);
        assert_eq!(player.facing(), Facing::Left);
    }

    #[test]
    fn reversing_from_a_slow_drift_keeps_the_new_direction() {
        let map = open_floor();
        let mut player = Player::grounded_at(Vec2::new(80.0, 63.0));
        player.set_velocity(Vec2::new(0.05, 0.0));

        player.tick(16.0, &InputSnapshot::holding(&[InputAction::MoveLeft]), &map);

        assert_close(player.velocity().x, 0.05 - 0.064 - 0.128);
        assert_eq!(player.facing(), Facing::Left);
    }

    #[test]
    fn jump_leaves_ground_and_release_switches_to_short_hop_gravity() {
        let map = open_floor();
        let mut player = Player::grounded_at(Vec2::new(80.0, 63.0));

        player.tick(16.0, &InputSnapshot::holding(&[InputAction::MoveUp]), &map);
        assert!(!player.is_on_ground());
        assert_eq!(player.pose(), PlayerPose::Jumping);
        let held_velocity = player.velocity().y;
        assert_close(held_velocity, JUMP_VELOCITY + 0.003);

        player.tick(16.0, &InputSnapshot::empty(), &map);
        assert_close(player.velocity().y, held_velocity + 0.003 * 2.5);
    }

    #[test]
    fn fall_speed_is_capped() {
        let map = map_from_rows(&["....", "....", "....", "...."]);
        let mut player = Player::new(Vec2::new(32.0, -2000.0));
        for _ in 0..200 {
            player.tick(16.0, &InputSnapshot::empty(), &map);
        }
        assert_eq!(player.velocity().y, MAX_FALL_SPEED);
        assert_eq!(player.pose(), PlayerPose::Falling);
    }

    #[test]
    fn terminal_fall_during_a_frame_hitch_lands_on_a_thin_floor() {
        let mut rows = vec!["...."; 32];
        rows[30] = "####";
        let map = map_from_rows(&rows);

        for start in 0..16 {
            let mut player = Player::new(Vec2::new(32.0, 400.0 + start as f32));
            player.set_velocity(Vec2::new(0.0, MAX_FALL_SPEED));

            player.tick(100.0, &InputSnapshot::empty(), &map);
            player.tick(100.0, &InputSnapshot::empty(), &map);

            assert!(player.is_on_ground(), "start offset {start}");
            assert_eq!(player.position().y, 479.0, "start offset {start}");
        }
    }

    #[test]
    fn rising_into_a_ceiling_stops_at_the_tile_below_it() {
        let map = map_from_rows(&[
            "......",
            "######",
            "......",
            "......",
            "......",
            "......",
            "######",
        ]);
        let mut player = Player::new(Vec2::new(40.0, 80.0));
        player.set_velocity(Vec2::new(0.0, JUMP_VELOCITY));

        player.tick(16.0, &InputSnapshot::empty(), &map);

        assert_close(player.position().y, 80.0);
        assert_eq!(player.velocity().y, 0.0);
        assert!(!player.is_on_ground());
        assert!(!player.is_on_slope());
    }

    fn single_ramp() -> GameMap {
        map_from_rows(&[
            "......",
            "......",
            "......",
            "......",
            "../...",
            "######",
        ])
    }

    #[test]
    fn falling_above_a_ramp_surface_stays_airborne() {
        let map = single_ramp();
        let mut player = Player::new(Vec2::new(40.0, 66.0));

        player.tick(16.0, &InputSnapshot::empty(), &map);

        assert_close(player.position().y, 66.12);
        assert!(!player.is_on_ground());
        assert!(!player.is_on_slope());
    }

    #[test]
    fn falling_past_a_ramp_surface_snaps_onto_it() {
        let map = single_ramp();
        let mut player = Player::new(Vec2::new(40.0, 75.0));

        player.tick(16.0, &InputSnapshot::empty(), &map);

        assert_close(player.position().y, 72.0);
        assert!(player.is_on_ground());
        assert!(player.is_on_slope());
    }

    #[test]
    fn grounded_over_a_descending_ramp_steps_down_onto_it() {
        let map = map_from_rows(&[
            "......",
            "......",
            "......",
            "......",
            "..\\###",
            "######",
        ]);
        let mut player = Player::grounded_at(Vec2::new(36.0, 63.0));

        player.tick(16.0, &InputSnapshot::empty(), &map);

        assert_close(player.position().y, 68.0);
        assert!(player.is_on_ground());
        assert!(player.is_on_slope());

        player.tick(16.0, &InputSnapshot::empty(), &map);
        assert_close(player.position().y, 68.0);
        assert!(player.is_on_slope());
    }

    #[test]
    fn climbing_past_a_ramp_top_enters_the_ramp_above() {
        let map = map_from_rows(&[
            "........",
            "........",
            "........",
            "...../##",
            "..../###",
            "########",
        ]);
        let mut player = Player::new(Vec2::new(70.0, 75.0));
        player.tick(16.0, &InputSnapshot::empty(), &map);
        assert_close(player.position().y, 74.0);
        assert!(player.is_on_slope());

        let right = InputSnapshot::holding(&[InputAction::MoveRight]);
        player.set_velocity(Vec2::new(MAX_RUN_SPEED, 0.0));
        player.tick(60.0, &right, &map);
        assert_close(player.position().x, 79.0);
        assert_close(player.position().y, 65.0);

        player.tick(16.0, &right, &map);

        assert_close(player.position().x, 81.4);
        assert_close(player.position().y, 62.6);
        assert!(player.is_on_ground());
        assert!(player.is_on_slope());
        assert_eq!(player.embedded_recoveries(), 0);
    }

    #[test]
    fn walking_off_a_ledge_becomes_airborne() {
        let map = map_from_rows(&[
            "......",
            "......",
            "......",
            "......",
            "##....",
        ]);
        let mut player = Player::grounded_at(Vec2::new(40.0, 63.0));

        player.tick(16.0, &InputSnapshot::empty(), &map);

        assert!(!player.is_on_ground());
    }

    #[test]
    fn grounded_above_a_flat_tile_snaps_to_floor_line() {
        let map = open_floor();
        let mut player = Player::grounded_at(Vec2::new(80.0, 58.5));

        player.tick(16.0, &InputSnapshot::empty(), &map);

        assert_eq!(player.position().y, 63.0);
        assert!(player.is_on_ground());
    }

    #[test]
    fn feet_slightly_inside_floor_pop_back_up() {
        let map = open_floor();
        let mut player = Player::grounded_at(Vec2::new(80.0, 66.0));

        player.tick(16.0, &InputSnapshot::empty(), &map);

        assert_eq!(player.position().y, 63.0);
        assert_eq!(player.embedded_recoveries(), 0);
    }

    #[test]
    fn embedded_in_solid_column_pops_and_records_fault() {
        let map = map_from_rows(&[
            "......",
            "......",
            "......",
            "######",
            "######",
        ]);
        let mut player = Player::grounded_at(Vec2::new(40.0, 66.0));

        player.tick(16.0, &InputSnapshot::empty(), &map);

        assert_eq!(player.position().y, 63.0);
        assert_eq!(player.embedded_recoveries(), 1);
        assert!(matches!(
            player.last_fault(),
            Some(PlayerFault::EmbeddedInSolid { .. })
        ));
    }

    #[test]
    fn damage_starts_knockback_away_from_facing() {
        let mut player = Player::grounded_at(Vec2::new(80.0, 63.0));

        assert!(player.damage(1));

        assert_eq!(player.health(), MAX_HEALTH - 1);
        assert!(player.is_knockback());
        assert!(player.is_invincible());
        assert!(!player.is_on_ground());
        assert!(player.velocity().x < 0.0);
        assert!(player.velocity().y < 0.0);
        assert_eq!(player.pose(), PlayerPose::Hurt);
    }

    #[test]
    fn invincibility_blocks_damage_until_it_expires() {
        let map = open_floor();
        let mut player = Player::grounded_at(Vec2::new(80.0, 63.0));
        assert!(player.damage(1));
        assert!(!player.damage(1));
        assert_eq!(player.health(), MAX_HEALTH - 1);

        let mut flashes = 0;
        for _ in 0..20 {
            player.tick(100.0, &InputSnapshot::empty(), &map);
            flashes += usize::from(player.is_flashing());
        }
        assert!(!player.is_invincible());
        assert!(!player.is_flashing());
        assert!(flashes > 0);
        assert!(player.damage(1));
    }

    #[test]
    fn knockback_ignores_controls() {
        let map = open_floor();
        let mut player = Player::grounded_at(Vec2::new(80.0, 63.0));
        player.damage(1);
        let knockback_x = player.velocity().x;

        player.tick(16.0, &InputSnapshot::holding(&[InputAction::MoveRight]), &map);

        assert_eq!(player.velocity().x, knockback_x);
        assert_eq!(player.facing(), Facing::Right);
        assert!(player.is_knockback());
    }
}
