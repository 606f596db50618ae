//! Ball physics body
//!
//! Velocities are pixels per tick and every position step is scaled by the
//! level's per-axis force scale. The ball never talks to the arena: touches
//! come back in `BallStep` and the match state decides what they mean.

use std::collections::VecDeque;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{
    circle_rect_contact, redirect_outward, resolve_circle_rect, resolve_power_kick, separate_circle_rect,
};
use super::geometry::Rect;
use crate::consts::CONTACT_EPSILON;
use crate::facing_sign;
use crate::settings::{BallConfig, ContactConfig, FieldConfig, TouchProfile, VineConfig};
use crate::wrap_degrees;

/// Which team an actor plays for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player,
    Opponent,
}

impl Side {
    pub fn other(&self) -> Side {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }
}

/// How the ball was last moved by a side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchKind {
    Kick,
    Touch,
    /// Opponent kick on a grounded ball
    SkyKick,
    /// Rebound off a vine, credited to the vine's owner
    Vine,
    PowerShot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TouchEvent {
    pub side: Side,
    pub kind: TouchKind,
}

/// Ball motion mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BallMode {
    #[default]
    Normal,
    /// Flat power shot trajectory
    SpecialEffect,
    /// Position driven externally, physics and scoring suspended
    MeteorLocked,
}

/// An actor as the ball sees it this tick
#[derive(Debug, Clone, Copy)]
pub struct ActorContact<'a> {
    pub side: Side,
    pub hitbox: Rect,
    pub kicking: bool,
    pub facing_left: bool,
    pub touch: &'a TouchProfile,
}

/// Everything the ball collides with during one update
#[derive(Debug, Clone, Copy)]
pub struct BallEnv<'a> {
    pub field: &'a FieldConfig,
    pub contacts: &'a ContactConfig,
    pub bars: &'a [Rect],
    pub actors: &'a [ActorContact<'a>],
    pub vines: &'a [Rect],
    pub vine: &'a VineConfig,
    pub vine_owner: Side,
    /// Player contacts use the power kick resolver
    pub power_kick_active: bool,
    /// The power shot shooter is mid-animation
    pub shooter_locked: bool,
}

/// What happened to the ball during one update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BallStep {
    pub touches: Vec<TouchEvent>,
    /// Landed fast enough to be heard
    pub ground_impact: bool,
    pub wall_hit: bool,
    pub vine_hit: bool,
    /// Horizontal shove for the player from a power kick contact
    pub player_push: Option<f32>,
    /// Ball is out of play and must be reset
    pub dead: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Rotation in degrees, cosmetic
    pub angle: f32,
    pub rotation_speed: f32,
    pub bounciness: f32,
    pub mode: BallMode,
    /// Ticks left in `SpecialEffect`
    pub special_timer: u32,
    pub last_toucher: Option<Side>,
    /// Ticks before another actor touch registers
    pub touch_cooldown: u32,
    /// Recent positions while in `SpecialEffect` (newest last)
    #[serde(skip)]
    pub trail: VecDeque<Vec2>,
}

impl Ball {
    pub fn new(config: &BallConfig) -> Self {
        Self {
            pos: config.spawn,
            vel: Vec2::ZERO,
            radius: config.radius,
            angle: 0.0,
            rotation_speed: 0.0,
            bounciness: config.bounciness,
            mode: BallMode::Normal,
            special_timer: 0,
            last_toucher: None,
            touch_cooldown: 0,
            trail: VecDeque::with_capacity(config.trail_length),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::around_circle(self.pos, self.radius)
    }

    /// Center height of a ball sitting on the ground
    #[inline]
    pub fn rest_y(&self, field: &FieldConfig) -> f32 {
        field.ground_y - self.radius
    }

    /// Within `tolerance` of the ground
    pub fn is_near_ground(&self, field: &FieldConfig, tolerance: f32) -> bool {
        (self.pos.y - self.rest_y(field)).abs() <= tolerance
    }

    pub fn is_special(&self) -> bool {
        self.mode == BallMode::SpecialEffect
    }

    /// Back to the spawn point. Refused while a power shot owns the ball.
    pub fn reset(&mut self, config: &BallConfig, shooter_locked: bool) -> bool {
        if shooter_locked {
            log::debug!("ball reset refused: power shot in progress");
            return false;
        }
        *self = Self::new(config);
        true
    }

    /// Pin the ball to `pos` with no velocity
    pub fn hold_at(&mut self, pos: Vec2) {
        self.pos = pos;
        self.vel = Vec2::ZERO;
    }

    /// Hand the ball to a scripted effect
    pub fn capture(&mut self, config: &BallConfig) {
        self.end_special(config);
        self.mode = BallMode::MeteorLocked;
        self.vel = Vec2::ZERO;
    }

    /// Give the ball back to physics, at rest
    pub fn release(&mut self) {
        if self.mode == BallMode::MeteorLocked {
            self.mode = BallMode::Normal;
        }
        self.vel = Vec2::ZERO;
    }

    /// Enter power shot mode, flattening the current velocity
    pub fn activate_special(&mut self, config: &BallConfig, by: Side) {
        self.mode = BallMode::SpecialEffect;
        self.special_timer = config.special_duration_ticks;
        self.trail.clear();
        self.last_toucher = Some(by);

        let h = config.horizontal_force_scale;
        let v = config.vertical_force_scale;
        let speed = (self.vel.x * self.vel.x * h + self.vel.y * self.vel.y * v).sqrt();
        if speed > 0.0 {
            let mut dir = self.vel / speed;
            if dir.y < 0.0 {
                dir.y *= 0.2;
            }
            dir.y += 0.1;
            let dir = dir.normalize_or(Vec2::X);
            let boosted = speed * config.special_launch_boost;
            self.vel = Vec2::new(dir.x * boosted * h, dir.y * boosted * v);
        } else {
            self.vel = Vec2::new(6.0 * h, 1.0 * v);
        }
        self.bounciness = config.special_bounciness;
    }

    fn end_special(&mut self, config: &BallConfig) {
        if self.mode == BallMode::SpecialEffect {
            self.mode = BallMode::Normal;
        }
        self.special_timer = 0;
        self.trail.clear();
        self.bounciness = config.bounciness;
    }

    /// Advance one tick
    pub fn update<R: Rng>(&mut self, config: &BallConfig, env: &BallEnv, rng: &mut R) -> BallStep {
        let mut step = BallStep::default();
        if self.mode == BallMode::MeteorLocked {
            self.vel = Vec2::ZERO;
            return step;
        }

        self.check_touches(config, env, &mut step);

        if self.is_special() {
            if env.shooter_locked {
                self.special_timer = self.special_timer.max(config.special_lock_floor_ticks);
            }
            self.record_trail(config);
            self.special_timer = self.special_timer.saturating_sub(1);
            if self.special_timer == 0 {
                self.end_special(config);
            }
        } else {
            self.trail.clear();
        }

        self.integrate(config, env.field);
        self.ground_contact(config, env.field, &mut step);
        self.wall_contact(env.field, &mut step);
        self.resolve_colliders(env, &mut step);
        self.vine_contact(env, rng, &mut step);

        // Collider push-out never sinks the ball below the ground line
        let rest_y = self.rest_y(env.field);
        if self.pos.y > rest_y {
            self.pos.y = rest_y;
            self.vel.y = self.vel.y.min(0.0);
        }
        self.settle_static(env, rest_y);

        self.spin(config);

        step.dead = self.is_dead(config, env.field);
        if step.dead && !env.shooter_locked {
            self.end_special(config);
        }
        step
    }

    /// Actor overlap: touches, kicks and nudges (shared cooldown)
    fn check_touches(&mut self, config: &BallConfig, env: &BallEnv, step: &mut BallStep) {
        if self.touch_cooldown > 0 {
            self.touch_cooldown -= 1;
            return;
        }

        let h = config.horizontal_force_scale;
        let v = config.vertical_force_scale;
        let on_ground = self.is_near_ground(env.field, config.on_ground_tolerance)
            && self.vel.y.abs() < config.on_ground_max_vy;
        let stationary = self.vel.x.abs() < config.stationary_speed
            && self.vel.y.abs() < config.stationary_speed
            && on_ground;
        let ball_rect = self.rect();

        for actor in env.actors {
            if !ball_rect.intersects(&actor.hitbox) {
                continue;
            }
            let profile = actor.touch;
            let dir = facing_sign(actor.facing_left);
            let delta = self.pos - actor.hitbox.center();
            let normal = delta / delta.length().max(CONTACT_EPSILON);

            let kind = if stationary {
                let push = if actor.kicking {
                    profile.stationary_kick
                } else {
                    profile.stationary_nudge
                };
                self.vel = Vec2::new(dir * push.x * h, push.y * v);
                if actor.kicking { TouchKind::Kick } else { TouchKind::Touch }
            } else if actor.kicking && profile.sky_kick && on_ground {
                self.vel = Vec2::new(
                    dir * profile.kick_force * profile.sky_kick_scale.x * h,
                    -profile.kick_force * profile.sky_kick_scale.y * v,
                );
                TouchKind::SkyKick
            } else if actor.kicking {
                self.vel += normal * profile.kick_force * Vec2::new(h, v);
                TouchKind::Kick
            } else {
                self.vel += normal * profile.touch_force * Vec2::new(h, v * profile.touch_vertical_scale);
                TouchKind::Touch
            };

            self.last_toucher = Some(actor.side);
            step.touches.push(TouchEvent { side: actor.side, kind });
        }

        if !step.touches.is_empty() {
            self.touch_cooldown = config.touch_cooldown_ticks;
        }
    }

    fn integrate(&mut self, config: &BallConfig, field: &FieldConfig) {
        let v = config.vertical_force_scale;
        let scale = Vec2::new(config.horizontal_force_scale, v);

        if self.is_special() {
            self.vel.y += config.gravity * config.special_gravity_scale * v;
            if self.pos.y < self.rest_y(field) - config.special_low_height {
                self.vel.y += config.special_low_bias * v;
            }
            self.pos += self.vel * config.special_speed_factor * scale;
        } else {
            self.vel.y += config.gravity * v;
            self.pos += self.vel * scale;
        }
    }

    fn ground_contact(&mut self, config: &BallConfig, field: &FieldConfig, step: &mut BallStep) {
        let rest_y = self.rest_y(field);
        if self.pos.y < rest_y {
            return;
        }

        let impact = self.vel.y;
        self.pos.y = rest_y;

        if impact <= config.rest_speed {
            // Settled: no re-bounce from gravity alone
            self.vel.y = 0.0;
        } else {
            self.vel.y *= self.bounciness * config.vertical_force_scale;
        }

        if self.is_special() {
            self.vel.x *= config.special_friction;
        } else {
            self.vel.x *= config.ground_friction;
            step.ground_impact = impact > config.ground_impact_threshold;
        }
    }

    fn wall_contact(&mut self, field: &FieldConfig, step: &mut BallStep) {
        if self.pos.x <= self.radius {
            self.pos.x = self.radius;
            self.vel.x = self.vel.x.abs();
            step.wall_hit = true;
        } else if self.pos.x >= field.width - self.radius {
            self.pos.x = field.width - self.radius;
            self.vel.x = -self.vel.x.abs();
            step.wall_hit = true;
        }
    }

    /// Kick override, goal bars, then actor bodies
    ///
    /// An actor whose kick connected this tick does not also bounce the ball
    /// off its own body.
    fn resolve_colliders(&mut self, env: &BallEnv, step: &mut BallStep) {
        let ball_rect = self.rect();
        let mut kicked_by = [false; 2];
        for (i, actor) in env.actors.iter().enumerate() {
            if actor.kicking && ball_rect.intersects(&actor.hitbox) {
                let kick = env.contacts.kick_override;
                self.vel = Vec2::new(facing_sign(actor.facing_left) * kick.x, kick.y);
                if let Some(flag) = kicked_by.get_mut(i) {
                    *flag = true;
                }
            }
        }

        for bar in env.bars {
            resolve_circle_rect(&mut self.pos, &mut self.vel, self.radius, bar, &env.contacts.goal_bars);
        }

        for (i, actor) in env.actors.iter().enumerate() {
            if kicked_by.get(i).copied().unwrap_or(false) {
                continue;
            }
            if env.power_kick_active && actor.side == Side::Player {
                if let Some(push) = resolve_power_kick(
                    &mut self.pos,
                    &mut self.vel,
                    self.radius,
                    &actor.hitbox,
                    &env.contacts.power_kick,
                ) {
                    step.player_push = Some(push);
                }
            } else {
                resolve_circle_rect(
                    &mut self.pos,
                    &mut self.vel,
                    self.radius,
                    &actor.hitbox,
                    &env.contacts.actors,
                );
            }
        }
    }

    /// Last word goes to the goal bars and vines: an actor shove can push the
    /// ball back into a post it was just resolved against
    ///
    /// A few passes cover the inside corner where a top bar meets its post.
    fn settle_static(&mut self, env: &BallEnv, rest_y: f32) {
        for _ in 0..3 {
            let mut moved = false;
            for rect in env.bars.iter().chain(env.vines) {
                moved |= separate_circle_rect(&mut self.pos, &mut self.vel, self.radius, rect, rest_y);
            }
            if !moved {
                break;
            }
        }
    }

    /// First vine hit sends the ball outward and credits the vine's owner
    fn vine_contact<R: Rng>(&mut self, env: &BallEnv, rng: &mut R, step: &mut BallStep) {
        for vine in env.vines {
            if !circle_rect_contact(self.pos, self.radius, vine).hit {
                continue;
            }
            resolve_circle_rect(&mut self.pos, &mut self.vel, self.radius, vine, &env.contacts.vines);

            let cfg = env.vine;
            let jitter = Vec2::new(
                rng.random_range(0.0..cfg.rebound_jitter.x.max(f32::EPSILON)),
                rng.random_range(-cfg.rebound_jitter.y..=cfg.rebound_jitter.y),
            );
            self.vel = redirect_outward(
                self.vel,
                cfg.outward,
                cfg.rebound_scale,
                cfg.rebound_min_speed,
                cfg.rebound_fall_scale,
                cfg.rebound_lift,
                jitter,
            );
            if self.is_special() {
                self.vel.x *= cfg.special_scale;
            }

            self.last_toucher = Some(env.vine_owner);
            step.touches.push(TouchEvent {
                side: env.vine_owner,
                kind: TouchKind::Vine,
            });
            step.vine_hit = true;
            return;
        }
    }

    fn spin(&mut self, config: &BallConfig) {
        let factor = if self.is_special() {
            config.special_spin_factor
        } else {
            config.spin_factor
        };
        self.rotation_speed = self.vel.x * factor * config.horizontal_force_scale * config.spin_decay;
        self.angle = wrap_degrees(self.angle + self.rotation_speed);
    }

    fn record_trail(&mut self, config: &BallConfig) {
        let far_enough = self
            .trail
            .back()
            .is_none_or(|last| last.distance(self.pos) > config.trail_spacing);
        if far_enough {
            self.trail.push_back(self.pos);
            while self.trail.len() > config.trail_length {
                self.trail.pop_front();
            }
        }
    }

    /// Stopped against a goal mouth, or out of horizontal bounds
    fn is_dead(&self, config: &BallConfig, field: &FieldConfig) -> bool {
        let resting = self.vel.x.abs() < config.dead_ball_speed
            && (self.pos.y - self.rest_y(field)).abs() < 1e-3;
        let at_goal_mouth = self.pos.x <= config.dead_ball_left_x || self.pos.x >= config.dead_ball_right_x;
        // The static push-out runs after the wall clamp and can carry the ball
        // past a wall when a bar sits flush against it
        let out_of_bounds = self.pos.x <= 0.0 || self.pos.x >= field.width;
        (resting && at_goal_mouth) || out_of_bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::LevelConfig;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn env<'a>(config: &'a LevelConfig, actors: &'a [ActorContact<'a>], bars: &'a [Rect]) -> BallEnv<'a> {
        BallEnv {
            field: &config.field,
            contacts: &config.contacts,
            bars,
            actors,
            vines: &[],
            vine: &config.vines,
            vine_owner: Side::Player,
            power_kick_active: false,
            shooter_locked: false,
        }
    }

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(7)
    }

    #[test]
    fn test_resting_ball_stays_at_rest() {
        let config = LevelConfig::level_one();
        let mut ball = Ball::new(&config.ball);
        ball.pos = Vec2::new(400.0, config.field.ground_y - 15.0);
        ball.vel = Vec2::ZERO;

        let step = ball.update(&config.ball, &env(&config, &[], &[]), &mut rng());
        assert_eq!(ball.vel.y, 0.0);
        assert_eq!(ball.pos, Vec2::new(400.0, config.field.ground_y - 15.0));
        assert!(!step.ground_impact);
    }

    #[test]
    fn test_fast_landing_bounces_and_sounds() {
        let config = LevelConfig::level_one();
        let mut ball = Ball::new(&config.ball);
        ball.pos = Vec2::new(400.0, config.field.ground_y - 20.0);
        ball.vel = Vec2::new(0.0, 9.5);

        let step = ball.update(&config.ball, &env(&config, &[], &[]), &mut rng());
        assert!(step.ground_impact);
        assert_eq!(ball.pos.y, config.field.ground_y - 15.0);
        // (9.5 + 0.5) * -0.8
        assert!((ball.vel.y - (-8.0)).abs() < 1e-4);
    }

    #[test]
    fn test_wall_bounce_reverses() {
        let config = LevelConfig::level_one();
        let mut ball = Ball::new(&config.ball);
        ball.pos = Vec2::new(20.0, 200.0);
        ball.vel = Vec2::new(-10.0, 0.0);

        let step = ball.update(&config.ball, &env(&config, &[], &[]), &mut rng());
        assert!(step.wall_hit);
        assert_eq!(ball.pos.x, 15.0);
        assert!(ball.vel.x > 0.0);
    }

    #[test]
    fn test_stationary_kick_uses_facing() {
        let config = LevelConfig::level_one();
        let mut ball = Ball::new(&config.ball);
        ball.pos = Vec2::new(280.0, config.field.ground_y - 15.0);

        let hitbox = Rect::from_bottom_center(Vec2::new(300.0, config.field.ground_y), config.player.hitbox);
        let actors = [ActorContact {
            side: Side::Player,
            hitbox,
            kicking: true,
            facing_left: true,
            touch: &config.player.touch,
        }];
        let step = ball.update(&config.ball, &env(&config, &actors, &[]), &mut rng());

        assert_eq!(
            step.touches,
            vec![TouchEvent {
                side: Side::Player,
                kind: TouchKind::Kick
            }]
        );
        assert_eq!(ball.last_toucher, Some(Side::Player));
        assert_eq!(ball.touch_cooldown, config.ball.touch_cooldown_ticks);
        assert!(ball.vel.x < 0.0);
    }

    #[test]
    fn test_touch_cooldown_suppresses_repeat() {
        let config = LevelConfig::level_one();
        let mut ball = Ball::new(&config.ball);
        ball.pos = Vec2::new(320.0, 500.0);
        ball.touch_cooldown = 3;

        let hitbox = Rect::from_bottom_center(Vec2::new(300.0, config.field.ground_y), config.player.hitbox);
        let actors = [ActorContact {
            side: Side::Player,
            hitbox,
            kicking: false,
            facing_left: false,
            touch: &config.player.touch,
        }];
        let step = ball.update(&config.ball, &env(&config, &actors, &[]), &mut rng());
        assert!(step.touches.is_empty());
        assert_eq!(ball.touch_cooldown, 2);
        assert_eq!(ball.last_toucher, None);
    }

    #[test]
    fn test_opponent_sky_kick() {
        let config = LevelConfig::level_one();
        let mut ball = Ball::new(&config.ball);
        ball.pos = Vec2::new(590.0, config.field.ground_y - 15.0);
        ball.vel = Vec2::new(-3.0, 0.0);

        let hitbox = Rect::from_bottom_center(Vec2::new(620.0, config.field.ground_y), config.opponent.hitbox);
        let actors = [ActorContact {
            side: Side::Opponent,
            hitbox,
            kicking: true,
            facing_left: true,
            touch: &config.opponent.touch,
        }];
        let mut ball_copy = ball;
        let mut step = BallStep::default();
        ball_copy.check_touches(&config.ball, &env(&config, &actors, &[]), &mut step);

        assert_eq!(step.touches[0].kind, TouchKind::SkyKick);
        assert!((ball_copy.vel.y - (-18.0)).abs() < 1e-4);
        assert!((ball_copy.vel.x - (-15.0 * 0.7 * 0.6)).abs() < 1e-4);
        assert_eq!(ball_copy.last_toucher, Some(Side::Opponent));
    }

    #[test]
    fn test_special_effect_flattens_and_decays() {
        let config = LevelConfig::level_one();
        let mut ball = Ball::new(&config.ball);
        ball.pos = Vec2::new(200.0, 300.0);
        ball.vel = Vec2::new(10.0, -10.0);
        ball.activate_special(&config.ball, Side::Player);

        assert_eq!(ball.mode, BallMode::SpecialEffect);
        assert_eq!(ball.bounciness, config.ball.special_bounciness);
        assert_eq!(ball.last_toucher, Some(Side::Player));
        // Upward component mostly cancelled
        assert!(ball.vel.y.abs() < ball.vel.x.abs() * 0.2);

        ball.special_timer = 1;
        ball.update(&config.ball, &env(&config, &[], &[]), &mut rng());
        assert_eq!(ball.mode, BallMode::Normal);
        assert_eq!(ball.bounciness, config.ball.bounciness);
        assert!(ball.trail.is_empty());
    }

    #[test]
    fn test_special_timer_held_while_shooter_locked() {
        let config = LevelConfig::level_one();
        let mut ball = Ball::new(&config.ball);
        ball.pos = Vec2::new(200.0, 300.0);
        ball.vel = Vec2::new(10.0, 0.0);
        ball.activate_special(&config.ball, Side::Player);
        ball.special_timer = 2;

        let mut locked = env(&config, &[], &[]);
        locked.shooter_locked = true;
        ball.update(&config.ball, &locked, &mut rng());
        assert_eq!(ball.special_timer, config.ball.special_lock_floor_ticks - 1);
        assert_eq!(ball.trail.len(), 1);
    }

    #[test]
    fn test_meteor_lock_suspends_physics() {
        let config = LevelConfig::level_one();
        let mut ball = Ball::new(&config.ball);
        ball.capture(&config.ball);
        ball.hold_at(Vec2::new(250.0, 200.0));

        let step = ball.update(&config.ball, &env(&config, &[], &[]), &mut rng());
        assert_eq!(step, BallStep::default());
        assert_eq!(ball.pos, Vec2::new(250.0, 200.0));

        ball.release();
        assert_eq!(ball.mode, BallMode::Normal);
    }

    #[test]
    fn test_dead_ball_against_goal_mouth() {
        let config = LevelConfig::level_one();
        let mut ball = Ball::new(&config.ball);
        ball.pos = Vec2::new(25.0, config.field.ground_y - 15.0);
        ball.vel = Vec2::ZERO;
        let step = ball.update(&config.ball, &env(&config, &[], &[]), &mut rng());
        assert!(step.dead);

        ball.pos = Vec2::new(400.0, config.field.ground_y - 15.0);
        let step = ball.update(&config.ball, &env(&config, &[], &[]), &mut rng());
        assert!(!step.dead);
    }

    #[test]
    fn test_out_of_bounds_is_dead() {
        let config = LevelConfig::level_one();
        let mut ball = Ball::new(&config.ball);
        ball.vel = Vec2::new(3.0, -4.0);
        ball.pos = Vec2::new(-1.0, 300.0);
        assert!(ball.is_dead(&config.ball, &config.field));
        ball.pos = Vec2::new(config.field.width + 1.0, 300.0);
        assert!(ball.is_dead(&config.ball, &config.field));
        ball.pos = Vec2::new(400.0, 300.0);
        assert!(!ball.is_dead(&config.ball, &config.field));
    }

    #[test]
    fn test_ball_squeezed_by_actor_stays_out_of_post() {
        let config = LevelConfig::level_one();
        let post = config.goals.left.bars[1];
        let bars: Vec<Rect> = config.goals.left.bars.iter().chain(&config.goals.right.bars).copied().collect();
        let hitbox = Rect::from_bottom_center(Vec2::new(60.0, config.field.ground_y), config.player.hitbox);
        let actors = [ActorContact {
            side: Side::Player,
            hitbox,
            kicking: false,
            facing_left: false,
            touch: &config.player.touch,
        }];

        let mut ball = Ball::new(&config.ball);
        ball.pos = Vec2::new(32.0, 500.0);
        ball.vel = Vec2::ZERO;
        ball.touch_cooldown = 10;
        ball.update(&config.ball, &env(&config, &actors, &bars), &mut rng());

        let separation = (ball.pos - post.closest_point(ball.pos)).length();
        assert!(separation >= ball.radius - 1e-3);
        assert!(ball.pos.x > post.right());
    }

    #[test]
    fn test_vine_always_rebounds_outward() {
        let config = LevelConfig::level_two();
        let mut ball = Ball::new(&config.ball);
        let vine = Rect::new(100.0, 370.0, 100.0, 200.0);
        ball.pos = Vec2::new(215.0, 450.0);
        ball.vel = Vec2::new(-6.0, 6.0);

        let mut e = env(&config, &[], &[]);
        let vines = [vine];
        e.vines = &vines;
        e.vine_owner = Side::Player;
        let step = ball.update(&config.ball, &e, &mut rng());

        assert!(step.vine_hit);
        assert!(ball.vel.x >= config.vines.rebound_min_speed);
        assert!(ball.vel.y < 0.0);
        assert_eq!(ball.last_toucher, Some(Side::Player));
    }

    #[test]
    fn test_power_kick_reports_player_push() {
        let config = LevelConfig::level_one();
        let mut ball = Ball::new(&config.ball);
        let hitbox = Rect::from_bottom_center(Vec2::new(300.0, config.field.ground_y), config.player.hitbox);
        ball.pos = Vec2::new(268.0, 480.0);
        ball.vel = Vec2::new(8.0, 0.0);
        ball.touch_cooldown = 10;

        let actors = [ActorContact {
            side: Side::Player,
            hitbox,
            kicking: false,
            facing_left: false,
            touch: &config.player.touch,
        }];
        let mut e = env(&config, &actors, &[]);
        e.power_kick_active = true;
        let step = ball.update(&config.ball, &e, &mut rng());
        assert_eq!(step.player_push, Some(-config.contacts.power_kick.actor_push));
    }

    #[test]
    fn test_reset_refused_while_shooter_locked() {
        let config = LevelConfig::level_one();
        let mut ball = Ball::new(&config.ball);
        ball.pos = Vec2::new(10.0, 10.0);
        assert!(!ball.reset(&config.ball, true));
        assert_eq!(ball.pos, Vec2::new(10.0, 10.0));
        assert!(ball.reset(&config.ball, false));
        assert_eq!(ball.pos, config.ball.spawn);
    }

    #[test]
    fn test_spin_wraps() {
        let config = LevelConfig::level_one();
        let mut ball = Ball::new(&config.ball);
        ball.angle = 359.0;
        ball.vel = Vec2::new(5.0, 0.0);
        ball.spin(&config.ball);
        assert!(ball.angle >= 0.0 && ball.angle < 360.0);
        assert!((ball.rotation_speed - 5.0 * 2.0 * 0.6 * 0.9).abs() < 1e-4);
    }

    proptest! {
        #[test]
        fn prop_never_below_ground(
            x in 20.0f32..780.0,
            y in 0.0f32..600.0,
            vx in -30.0f32..30.0,
            vy in -30.0f32..30.0,
        ) {
            let config = LevelConfig::level_one();
            let mut ball = Ball::new(&config.ball);
            ball.pos = Vec2::new(x, y);
            ball.vel = Vec2::new(vx, vy);
            let bars: Vec<Rect> = config.goals.left.bars.iter().chain(&config.goals.right.bars).copied().collect();
            ball.update(&config.ball, &env(&config, &[], &bars), &mut rng());
            prop_assert!(ball.pos.y <= config.field.ground_y - ball.radius + 1e-3);
        }
    }
}
