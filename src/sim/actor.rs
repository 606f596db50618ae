//! Player and opponent bodies
//!
//! Both actors share one shape and differ only in where their `Intents` come
//! from. `x` is the hitbox center; `height` is how far the feet are above the
//! ground line, so a grounded actor always stands exactly on it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::ball::Side;
use super::geometry::Rect;
use crate::settings::{ActorConfig, FieldConfig};

/// What the actor is doing, read by the animation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Action {
    #[default]
    Idle,
    Run,
    Kick,
    Jump,
    /// Knocked back by a power kick, no control
    Hurt,
    /// Caught by ground fire, no control until revived
    Dead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JumpState {
    #[default]
    Grounded,
    Rising,
    Falling,
}

/// Per-tick control set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intents {
    pub move_left: bool,
    pub move_right: bool,
    pub jump: bool,
    pub kick: bool,
    pub power: bool,
    pub vine: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub side: Side,
    /// Hitbox center x
    pub x: f32,
    /// Feet above the ground line
    pub height: f32,
    /// Upward speed (pixels per tick)
    pub vy: f32,
    pub jump: JumpState,
    pub facing_left: bool,
    pub action: Action,
    pub hitbox_size: Vec2,
    /// Ticks left on the current kick
    pub kick_timer: u32,
    pub hurt_timer: u32,
    /// Held in place by a power sequence
    pub frozen: bool,
}

impl Actor {
    pub fn new(side: Side, config: &ActorConfig) -> Self {
        Self {
            side,
            x: config.spawn_x,
            height: 0.0,
            vy: 0.0,
            jump: JumpState::Grounded,
            facing_left: config.spawn_facing_left,
            action: Action::Idle,
            hitbox_size: config.hitbox,
            kick_timer: 0,
            hurt_timer: 0,
            frozen: false,
        }
    }

    /// Back to spawn defaults
    pub fn reset(&mut self, config: &ActorConfig) {
        *self = Self::new(self.side, config);
    }

    pub fn feet(&self, field: &FieldConfig) -> Vec2 {
        Vec2::new(self.x, field.ground_y - self.height)
    }

    pub fn hitbox(&self, field: &FieldConfig) -> Rect {
        Rect::from_bottom_center(self.feet(field), self.hitbox_size)
    }

    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.jump == JumpState::Grounded
    }

    pub fn is_kicking(&self) -> bool {
        self.action == Action::Kick
    }

    /// Accepts input this tick
    pub fn in_control(&self) -> bool {
        !self.frozen && !matches!(self.action, Action::Hurt | Action::Dead)
    }

    /// Apply intents and advance jump physics for one tick
    pub fn apply(&mut self, intents: &Intents, config: &ActorConfig, field: &FieldConfig) {
        if self.frozen {
            return;
        }

        let mut moving = false;
        if self.in_control() {
            if intents.move_left && !intents.move_right {
                self.x -= config.move_speed;
                self.facing_left = true;
                moving = true;
            } else if intents.move_right && !intents.move_left {
                self.x += config.move_speed;
                self.facing_left = false;
                moving = true;
            }

            if intents.jump && self.is_grounded() {
                self.vy = config.jump_velocity;
                self.jump = JumpState::Rising;
            }

            if intents.kick && self.kick_timer == 0 {
                self.kick_timer = config.kick_ticks;
            }
        }

        self.step_jump(config);
        self.clamp_x(field);

        self.kick_timer = self.kick_timer.saturating_sub(1);
        if self.action == Action::Hurt {
            self.hurt_timer = self.hurt_timer.saturating_sub(1);
        }
        self.action = self.next_action(moving);
    }

    fn step_jump(&mut self, config: &ActorConfig) {
        if self.is_grounded() {
            return;
        }
        self.height += self.vy;
        self.vy -= config.gravity;
        if self.vy <= 0.0 {
            self.jump = JumpState::Falling;
        }
        if self.height <= 0.0 {
            self.land();
        }
    }

    fn next_action(&self, moving: bool) -> Action {
        match self.action {
            Action::Dead => Action::Dead,
            Action::Hurt if self.hurt_timer > 0 => Action::Hurt,
            Action::Idle | Action::Run | Action::Kick | Action::Jump | Action::Hurt => {
                if self.kick_timer > 0 {
                    Action::Kick
                } else if !self.is_grounded() {
                    Action::Jump
                } else if moving {
                    Action::Run
                } else {
                    Action::Idle
                }
            }
        }
    }

    /// Snap to the ground line
    pub fn land(&mut self) {
        self.height = 0.0;
        self.vy = 0.0;
        self.jump = JumpState::Grounded;
    }

    /// Hold the feet at `height` with jump physics suspended
    pub fn hover_at(&mut self, height: f32) {
        self.height = height.max(0.0);
        self.vy = 0.0;
        self.jump = JumpState::Falling;
    }

    /// Shove horizontally, staying on the field
    pub fn push(&mut self, dx: f32, field: &FieldConfig) {
        self.x += dx;
        self.clamp_x(field);
    }

    fn clamp_x(&mut self, field: &FieldConfig) {
        let half = self.hitbox_size.x / 2.0;
        self.x = self.x.clamp(half, (field.width - half).max(half));
    }

    pub fn hurt(&mut self, ticks: u32) {
        if self.action == Action::Dead {
            return;
        }
        self.action = Action::Hurt;
        self.hurt_timer = ticks;
        self.kick_timer = 0;
    }

    pub fn kill(&mut self) {
        self.action = Action::Dead;
        self.kick_timer = 0;
        self.hurt_timer = 0;
    }

    pub fn revive(&mut self) {
        if self.action == Action::Dead {
            self.action = Action::Idle;
        }
    }

    /// Stop in place on the ground (opponent during a power shot)
    pub fn freeze(&mut self) {
        self.land();
        self.kick_timer = 0;
        if !matches!(self.action, Action::Dead | Action::Hurt) {
            self.action = Action::Idle;
        }
        self.frozen = true;
    }

    pub fn unfreeze(&mut self) {
        self.frozen = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::LevelConfig;

    fn player() -> (Actor, LevelConfig) {
        let config = LevelConfig::level_one();
        (Actor::new(Side::Player, &config.player), config)
    }

    #[test]
    fn test_hitbox_stands_on_ground() {
        let (actor, config) = player();
        let hitbox = actor.hitbox(&config.field);
        assert_eq!(hitbox.bottom(), config.field.ground_y);
        assert_eq!(hitbox.center().x, config.player.spawn_x);
    }

    #[test]
    fn test_run_sets_facing_and_action() {
        let (mut actor, config) = player();
        let left = Intents {
            move_left: true,
            ..Default::default()
        };
        actor.apply(&left, &config.player, &config.field);
        assert_eq!(actor.x, config.player.spawn_x - config.player.move_speed);
        assert!(actor.facing_left);
        assert_eq!(actor.action, Action::Run);

        actor.apply(&Intents::default(), &config.player, &config.field);
        assert_eq!(actor.action, Action::Idle);
    }

    #[test]
    fn test_jump_arc_returns_to_ground() {
        let (mut actor, config) = player();
        let jump = Intents {
            jump: true,
            ..Default::default()
        };
        actor.apply(&jump, &config.player, &config.field);
        assert_eq!(actor.action, Action::Jump);
        assert!(actor.height > 0.0);

        for _ in 0..200 {
            actor.apply(&Intents::default(), &config.player, &config.field);
            assert!(actor.height >= 0.0);
        }
        assert!(actor.is_grounded());
        assert_eq!(actor.height, 0.0);
        assert_eq!(actor.hitbox(&config.field).bottom(), config.field.ground_y);
    }

    #[test]
    fn test_kick_lasts_configured_ticks() {
        let (mut actor, config) = player();
        let kick = Intents {
            kick: true,
            ..Default::default()
        };
        actor.apply(&kick, &config.player, &config.field);
        assert!(actor.is_kicking());
        for _ in 1..config.player.kick_ticks {
            actor.apply(&Intents::default(), &config.player, &config.field);
        }
        assert!(!actor.is_kicking());
    }

    #[test]
    fn test_clamped_to_field() {
        let (mut actor, config) = player();
        actor.push(-10_000.0, &config.field);
        assert_eq!(actor.hitbox(&config.field).left(), 0.0);
        actor.push(10_000.0, &config.field);
        assert_eq!(actor.hitbox(&config.field).right(), config.field.width);
    }

    #[test]
    fn test_hurt_blocks_input_then_recovers() {
        let (mut actor, config) = player();
        actor.hurt(3);
        let right = Intents {
            move_right: true,
            ..Default::default()
        };
        let x = actor.x;
        actor.apply(&right, &config.player, &config.field);
        assert_eq!(actor.x, x);
        assert_eq!(actor.action, Action::Hurt);

        actor.apply(&right, &config.player, &config.field);
        actor.apply(&right, &config.player, &config.field);
        assert_eq!(actor.action, Action::Idle);
        actor.apply(&right, &config.player, &config.field);
        assert_eq!(actor.action, Action::Run);
    }

    #[test]
    fn test_dead_until_revived() {
        let (mut actor, config) = player();
        actor.kill();
        actor.hurt(5);
        for _ in 0..10 {
            actor.apply(&Intents { kick: true, ..Default::default() }, &config.player, &config.field);
        }
        assert_eq!(actor.action, Action::Dead);
        actor.revive();
        assert_eq!(actor.action, Action::Idle);
    }

    #[test]
    fn test_frozen_ignores_everything() {
        let (mut actor, config) = player();
        actor.hover_at(100.0);
        actor.freeze();
        assert!(actor.is_grounded());
        let x = actor.x;
        actor.apply(&Intents { move_right: true, jump: true, ..Default::default() }, &config.player, &config.field);
        assert_eq!(actor.x, x);
        assert_eq!(actor.height, 0.0);
        actor.unfreeze();
        assert!(actor.in_control());
    }
}
