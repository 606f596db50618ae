//! Abilities bought with a power bar
//!
//! - `PowerShot`: scripted hover, kick and fall that launches the ball at a goal
//! - `VineManager`: timed obstacles that grow out of the ground
//! - `OpponentPowers`: the opponent's rotation of power kick, ground fire and meteor
//!
//! Every mode here is tick-counted and carries a hard cap, so none of them can
//! hold control forever.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::actor::{Action, Actor};
use super::ball::Ball;
use super::geometry::Rect;
use super::power::PowerBar;
use crate::settings::{BallConfig, FieldConfig, OpponentPower, OpponentPowerConfig, PowerShotConfig, VineConfig};

// === Power shot ===

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum ShotPhase {
    #[default]
    Inactive,
    /// Holding the ball at the peak
    Hover { ticks: u32 },
    /// Kick sub-animation; the shot fires on the trigger frame
    Kick { frame: u32, frame_ticks: u32 },
    /// Dropping back to the ground after the shot
    Falling { speed: f32 },
}

/// What one power shot update did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShotStep {
    pub kick_started: bool,
    pub fired: bool,
    /// Mode is over (landed or watchdog)
    pub ended: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PowerShot {
    pub phase: ShotPhase,
    /// Ticks since activation, for the watchdog
    pub elapsed: u32,
    pub fired: bool,
}

impl PowerShot {
    pub fn is_active(&self) -> bool {
        self.phase != ShotPhase::Inactive
    }

    /// Ball is held by the shooter, not by physics
    pub fn is_carrying(&self) -> bool {
        self.is_active() && !self.fired
    }

    /// Between the shot and landing the shooter's animation owns the ball's effect
    pub fn animation_locked(&self) -> bool {
        self.is_active() && self.fired
    }

    /// Start the sequence if the shooter is grounded and the bar is full
    pub fn activate(
        &mut self,
        bar: &mut PowerBar,
        shooter: &mut Actor,
        ball: &mut Ball,
        config: &PowerShotConfig,
        field: &FieldConfig,
    ) -> bool {
        if self.is_active() || !shooter.is_grounded() || !shooter.in_control() {
            return false;
        }
        if !bar.try_consume() {
            return false;
        }

        shooter.facing_left = false;
        shooter.kick_timer = 0;
        shooter.action = Action::Idle;
        shooter.hover_at(config.hover_height);
        ball.hold_at(shooter.feet(field) + config.carry_offset);

        self.phase = ShotPhase::Hover { ticks: 0 };
        self.elapsed = 0;
        self.fired = false;
        log::info!("power shot activated at x={:.0}", shooter.x);
        true
    }

    pub fn update(
        &mut self,
        shooter: &mut Actor,
        ball: &mut Ball,
        ball_config: &BallConfig,
        config: &PowerShotConfig,
        field: &FieldConfig,
    ) -> ShotStep {
        let mut step = ShotStep::default();
        if !self.is_active() {
            return step;
        }

        self.elapsed += 1;
        if self.elapsed > config.watchdog_ticks {
            log::warn!("power shot watchdog fired after {} ticks", self.elapsed);
            self.end(shooter);
            step.ended = true;
            return step;
        }

        match self.phase {
            ShotPhase::Inactive => {}
            ShotPhase::Hover { ticks } => {
                let ticks = ticks + 1;
                ball.hold_at(shooter.feet(field) + config.carry_offset);
                if ticks >= config.hover_ticks {
                    self.phase = ShotPhase::Kick {
                        frame: 0,
                        frame_ticks: 0,
                    };
                    shooter.action = Action::Kick;
                    step.kick_started = true;
                } else {
                    self.phase = ShotPhase::Hover { ticks };
                }
            }
            ShotPhase::Kick { frame, frame_ticks } => {
                ball.hold_at(shooter.feet(field) + config.carry_offset);
                let mut frame = frame;
                let mut frame_ticks = frame_ticks + 1;
                if frame_ticks >= config.kick_frame_ticks {
                    frame_ticks = 0;
                    if frame + 1 < config.kick_frames {
                        frame += 1;
                    }
                }
                self.phase = ShotPhase::Kick { frame, frame_ticks };
                if frame == config.kick_trigger_frame && !self.fired {
                    self.fire(shooter, ball, ball_config, config, field);
                    step.fired = true;
                    self.phase = ShotPhase::Falling { speed: 0.0 };
                }
            }
            ShotPhase::Falling { speed } => {
                let speed = speed - config.fall_decel;
                shooter.height += speed;
                shooter.action = Action::Jump;
                if shooter.height <= 0.0 {
                    self.end(shooter);
                    step.ended = true;
                } else {
                    self.phase = ShotPhase::Falling { speed };
                }
            }
        }
        step
    }

    fn fire(
        &mut self,
        shooter: &mut Actor,
        ball: &mut Ball,
        ball_config: &BallConfig,
        config: &PowerShotConfig,
        field: &FieldConfig,
    ) {
        shooter.facing_left = false;
        let feet = shooter.feet(field);
        let leg_x = config
            .leg_offset
            .x
            .min(field.width - shooter.x - config.edge_clearance);
        ball.pos = feet + Vec2::new(leg_x, config.leg_offset.y);

        let target = if shooter.x > field.width * config.target_switch_fraction {
            config.left_target
        } else {
            config.right_target
        };
        let delta = target - ball.pos;
        let magnitude = delta.length();
        ball.vel = if magnitude > 0.0 {
            delta / magnitude * config.launch_speed
        } else {
            Vec2::ZERO
        };
        ball.activate_special(ball_config, shooter.side);
        self.fired = true;
        log::info!("power shot fired toward ({:.0}, {:.0})", target.x, target.y);
    }

    /// Put the shooter back on the ground in control
    pub fn end(&mut self, shooter: &mut Actor) {
        self.phase = ShotPhase::Inactive;
        self.elapsed = 0;
        self.fired = false;
        shooter.land();
        shooter.action = Action::Idle;
    }
}

// === Vines ===

/// One growing collider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vine {
    /// Collider at full height
    pub full: Rect,
    pub grow_ticks: u32,
    pub age: u32,
}

impl Vine {
    fn new(base: Vec2, size: Vec2, grow_ticks: u32) -> Self {
        Self {
            full: Rect::from_bottom_center(base, size),
            grow_ticks: grow_ticks.max(1),
            age: 0,
        }
    }

    /// Grown fraction in [0, 1]
    pub fn growth(&self) -> f32 {
        (self.age as f32 / self.grow_ticks as f32).min(1.0)
    }

    pub fn rect(&self) -> Rect {
        self.full.with_height_from_bottom(self.full.height() * self.growth())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VineGroup {
    pub main: Vine,
    pub sides: Vec<Vine>,
    pub hold_ticks: u32,
}

impl VineGroup {
    fn is_expired(&self) -> bool {
        self.main.age >= self.main.grow_ticks + self.hold_ticks
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VineManager {
    pub groups: Vec<VineGroup>,
}

impl VineManager {
    /// Grow a new group if vines are enabled, below the cap, and the bar is full
    pub fn activate<R: Rng>(
        &mut self,
        bar: &mut PowerBar,
        config: &VineConfig,
        field: &FieldConfig,
        rng: &mut R,
    ) -> bool {
        if !config.enabled || self.groups.len() >= config.max_groups {
            return false;
        }
        if !bar.try_consume() {
            return false;
        }

        let base = Vec2::new(config.first_x + config.spacing * self.groups.len() as f32, field.ground_y);
        let lo = config.side_grow_ticks.saturating_sub(config.side_grow_jitter);
        let hi = config.side_grow_ticks + config.side_grow_jitter;
        let sides = config
            .side_offsets
            .iter()
            .map(|offset| {
                let grow = rng.random_range(lo..=hi);
                Vine::new(base + Vec2::new(*offset, 0.0), config.side_size, grow)
            })
            .collect();

        self.groups.push(VineGroup {
            main: Vine::new(base, config.main_size, config.main_grow_ticks),
            sides,
            hold_ticks: config.hold_ticks,
        });
        log::info!("vine group {} at x={:.0}", self.groups.len(), base.x);
        true
    }

    pub fn update(&mut self) {
        for group in &mut self.groups {
            group.main.age += 1;
            for side in &mut group.sides {
                side.age += 1;
            }
        }
        self.groups.retain(|group| !group.is_expired());
    }

    /// Current colliders with any height
    pub fn colliders(&self) -> Vec<Rect> {
        self.groups
            .iter()
            .flat_map(|group| std::iter::once(&group.main).chain(&group.sides))
            .map(Vine::rect)
            .filter(|rect| rect.height() > 0.0)
            .collect()
    }

    pub fn clear(&mut self) {
        self.groups.clear();
    }
}

// === Opponent powers ===

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActivePower {
    PowerKick { ticks_left: u32 },
    GroundFire { ticks_left: u32 },
    Meteor { tick: u32, from: Vec2 },
}

/// What one opponent power update did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PowersStep {
    pub player_killed: bool,
    pub ended: Option<OpponentPower>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpponentPowers {
    /// Index of the next power in the rotation
    pub next: usize,
    pub active: Option<ActivePower>,
}

impl OpponentPowers {
    pub fn power_kick_active(&self) -> bool {
        matches!(self.active, Some(ActivePower::PowerKick { .. }))
    }

    pub fn ground_fire_active(&self) -> bool {
        matches!(self.active, Some(ActivePower::GroundFire { .. }))
    }

    /// Spend a full bar on the next power in the rotation
    pub fn try_trigger(
        &mut self,
        bar: &mut PowerBar,
        config: &OpponentPowerConfig,
        ball: &mut Ball,
        ball_config: &BallConfig,
    ) -> Option<OpponentPower> {
        if self.active.is_some() || config.rotation.is_empty() {
            return None;
        }
        if !bar.try_consume() {
            return None;
        }

        let power = config.rotation[self.next % config.rotation.len()];
        self.next = (self.next + 1) % config.rotation.len();
        self.active = Some(match power {
            OpponentPower::PowerKick => ActivePower::PowerKick {
                ticks_left: config.power_kick_ticks,
            },
            OpponentPower::GroundFire => ActivePower::GroundFire {
                ticks_left: config.ground_fire_ticks,
            },
            OpponentPower::Meteor => {
                ball.capture(ball_config);
                ActivePower::Meteor { tick: 0, from: ball.pos }
            }
        });
        log::info!("opponent power: {:?}", power);
        Some(power)
    }

    pub fn update(&mut self, player: &mut Actor, ball: &mut Ball, config: &OpponentPowerConfig) -> PowersStep {
        let mut step = PowersStep::default();
        let Some(active) = self.active else {
            return step;
        };

        self.active = match active {
            ActivePower::PowerKick { ticks_left } => {
                if ticks_left <= 1 {
                    step.ended = Some(OpponentPower::PowerKick);
                    None
                } else {
                    Some(ActivePower::PowerKick {
                        ticks_left: ticks_left - 1,
                    })
                }
            }
            ActivePower::GroundFire { ticks_left } => {
                // Airborne players are caught the tick they land
                if player.is_grounded() && player.action != Action::Dead {
                    player.kill();
                    step.player_killed = true;
                }
                if ticks_left <= 1 {
                    player.revive();
                    step.ended = Some(OpponentPower::GroundFire);
                    None
                } else {
                    Some(ActivePower::GroundFire {
                        ticks_left: ticks_left - 1,
                    })
                }
            }
            ActivePower::Meteor { tick, from } => {
                let tick = tick + 1;
                let t = (tick as f32 / config.meteor_ticks.max(1) as f32).min(1.0);
                ball.hold_at(from.lerp(config.meteor_target, t));
                if tick >= config.meteor_ticks {
                    ball.release();
                    step.ended = Some(OpponentPower::Meteor);
                    None
                } else {
                    Some(ActivePower::Meteor { tick, from })
                }
            }
        };
        step
    }

    /// Cancel whatever is running; the rotation position is kept
    pub fn cancel(&mut self, player: &mut Actor, ball: &mut Ball) {
        match self.active.take() {
            Some(ActivePower::GroundFire { .. }) => player.revive(),
            Some(ActivePower::Meteor { .. }) => ball.release(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::LevelConfig;
    use crate::sim::actor::JumpState;
    use crate::sim::ball::{BallMode, Side};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    struct Rig {
        config: LevelConfig,
        player: Actor,
        ball: Ball,
        bar: PowerBar,
    }

    fn rig(config: LevelConfig) -> Rig {
        let mut bar = PowerBar::new(config.timing.bar_stages, config.timing.bar_stage_secs);
        bar.advance(config.timing.bar_stages as f32 * config.timing.bar_stage_secs);
        Rig {
            player: Actor::new(Side::Player, &config.player),
            ball: Ball::new(&config.ball),
            bar,
            config,
        }
    }

    #[test]
    fn test_power_shot_requires_full_bar() {
        let mut r = rig(LevelConfig::level_one());
        r.bar.try_consume();
        let mut shot = PowerShot::default();
        assert!(!shot.activate(&mut r.bar, &mut r.player, &mut r.ball, &r.config.power_shot, &r.config.field));
        assert!(!shot.is_active());
    }

    #[test]
    fn test_power_shot_requires_grounded() {
        let mut r = rig(LevelConfig::level_one());
        r.player.jump = JumpState::Rising;
        let mut shot = PowerShot::default();
        assert!(!shot.activate(&mut r.bar, &mut r.player, &mut r.ball, &r.config.power_shot, &r.config.field));
        assert!(r.bar.is_full());
    }

    #[test]
    fn test_power_shot_full_sequence() {
        let mut r = rig(LevelConfig::level_one());
        let cfg = r.config.power_shot.clone();
        let mut shot = PowerShot::default();
        assert!(shot.activate(&mut r.bar, &mut r.player, &mut r.ball, &cfg, &r.config.field));
        assert!(!r.bar.is_full());
        assert_eq!(r.player.height, cfg.hover_height);
        assert!(shot.is_carrying());

        // Second activation while active is refused
        assert!(!shot.activate(&mut r.bar, &mut r.player, &mut r.ball, &cfg, &r.config.field));

        let mut fired_at = None;
        let mut ended_at = None;
        for tick in 1..=cfg.watchdog_ticks {
            let step = shot.update(&mut r.player, &mut r.ball, &r.config.ball, &cfg, &r.config.field);
            if step.fired {
                fired_at = Some(tick);
                assert!(shot.animation_locked());
                assert_eq!(r.ball.mode, BallMode::SpecialEffect);
                assert_eq!(r.ball.last_toucher, Some(Side::Player));
                assert!(r.ball.vel.x > 0.0);
            }
            if step.ended {
                ended_at = Some(tick);
                break;
            }
        }

        // Hover, then one frame of the kick before the trigger frame
        assert_eq!(fired_at, Some(cfg.hover_ticks + cfg.kick_frame_ticks));
        assert!(ended_at.is_some());
        assert!(!shot.is_active());
        assert!(r.player.is_grounded());
        assert_eq!(r.player.action, Action::Idle);
    }

    #[test]
    fn test_power_shot_watchdog_ends_stalled_sequence() {
        let mut r = rig(LevelConfig::level_one());
        let mut cfg = r.config.power_shot.clone();
        // A trigger frame the animation never reaches
        cfg.kick_frames = 3;
        cfg.kick_trigger_frame = 7;
        let mut shot = PowerShot::default();
        assert!(shot.activate(&mut r.bar, &mut r.player, &mut r.ball, &cfg, &r.config.field));

        let mut ended = false;
        for _ in 0..=cfg.watchdog_ticks {
            ended |= shot.update(&mut r.player, &mut r.ball, &r.config.ball, &cfg, &r.config.field).ended;
        }
        assert!(ended);
        assert!(!shot.is_active());
        assert!(r.player.is_grounded());
    }

    #[test]
    fn test_shot_aims_left_from_far_right() {
        let mut r = rig(LevelConfig::level_one());
        r.player.x = 700.0;
        let cfg = r.config.power_shot.clone();
        let mut shot = PowerShot::default();
        shot.activate(&mut r.bar, &mut r.player, &mut r.ball, &cfg, &r.config.field);
        shot.fire(&mut r.player, &mut r.ball, &r.config.ball, &cfg, &r.config.field);
        assert!(r.ball.vel.x < 0.0);
        // Kicked ball kept clear of the right edge
        assert!(r.ball.pos.x <= r.config.field.width - cfg.edge_clearance);
    }

    #[test]
    fn test_vines_need_enabled_level() {
        let mut r = rig(LevelConfig::level_one());
        let mut vines = VineManager::default();
        let mut rng = Pcg32::seed_from_u64(3);
        assert!(!vines.activate(&mut r.bar, &r.config.vines, &r.config.field, &mut rng));
        assert!(r.bar.is_full());
    }

    #[test]
    fn test_vine_growth_is_monotonic_then_removed() {
        let mut r = rig(LevelConfig::level_two());
        let mut vines = VineManager::default();
        let mut rng = Pcg32::seed_from_u64(3);
        assert!(vines.activate(&mut r.bar, &r.config.vines, &r.config.field, &mut rng));
        assert_eq!(vines.groups[0].sides.len(), 5);
        for side in &vines.groups[0].sides {
            assert!((60..=80).contains(&side.grow_ticks));
        }

        let mut last_height = 0.0;
        let lifetime = r.config.vines.main_grow_ticks + r.config.vines.hold_ticks;
        for _ in 1..lifetime {
            vines.update();
            let main = vines.groups[0].main.rect();
            assert!(main.height() >= last_height);
            assert!((main.bottom() - r.config.field.ground_y).abs() < 1e-3);
            last_height = main.height();
        }
        assert_eq!(last_height, r.config.vines.main_size.y);
        vines.update();
        assert!(vines.groups.is_empty());
        assert!(vines.colliders().is_empty());
    }

    #[test]
    fn test_vine_cap_and_spacing() {
        let mut r = rig(LevelConfig::level_two());
        let mut vines = VineManager::default();
        let mut rng = Pcg32::seed_from_u64(3);
        for i in 0..r.config.vines.max_groups {
            r.bar.advance(100.0);
            assert!(vines.activate(&mut r.bar, &r.config.vines, &r.config.field, &mut rng));
            let expected = r.config.vines.first_x + r.config.vines.spacing * i as f32;
            assert_eq!(vines.groups[i].main.full.center().x, expected);
        }
        r.bar.advance(100.0);
        assert!(!vines.activate(&mut r.bar, &r.config.vines, &r.config.field, &mut rng));
        assert!(r.bar.is_full());
    }

    #[test]
    fn test_vine_jitter_is_seeded() {
        let r = rig(LevelConfig::level_two());
        let grow = |seed| {
            let mut bar = r.bar.clone();
            let mut vines = VineManager::default();
            let mut rng = Pcg32::seed_from_u64(seed);
            vines.activate(&mut bar, &r.config.vines, &r.config.field, &mut rng);
            vines.groups[0].sides.iter().map(|v| v.grow_ticks).collect::<Vec<_>>()
        };
        assert_eq!(grow(11), grow(11));
    }

    #[test]
    fn test_opponent_rotation_cycles() {
        let mut r = rig(LevelConfig::level_one());
        let mut powers = OpponentPowers::default();
        let cfg = r.config.opponent_powers.clone();

        assert_eq!(
            powers.try_trigger(&mut r.bar, &cfg, &mut r.ball, &r.config.ball),
            Some(OpponentPower::PowerKick)
        );
        assert!(powers.power_kick_active());
        // Busy: refused even with a full bar
        r.bar.advance(100.0);
        assert_eq!(powers.try_trigger(&mut r.bar, &cfg, &mut r.ball, &r.config.ball), None);

        for _ in 0..cfg.power_kick_ticks {
            powers.update(&mut r.player, &mut r.ball, &cfg);
        }
        assert!(powers.active.is_none());
        assert_eq!(
            powers.try_trigger(&mut r.bar, &cfg, &mut r.ball, &r.config.ball),
            Some(OpponentPower::GroundFire)
        );
    }

    #[test]
    fn test_ground_fire_kills_on_landing_and_revives() {
        let mut r = rig(LevelConfig::level_one());
        let mut cfg = r.config.opponent_powers.clone();
        cfg.rotation = vec![OpponentPower::GroundFire];
        let mut powers = OpponentPowers::default();
        powers.try_trigger(&mut r.bar, &cfg, &mut r.ball, &r.config.ball);

        r.player.hover_at(40.0);
        let step = powers.update(&mut r.player, &mut r.ball, &cfg);
        assert!(!step.player_killed);

        r.player.land();
        let step = powers.update(&mut r.player, &mut r.ball, &cfg);
        assert!(step.player_killed);
        assert_eq!(r.player.action, Action::Dead);

        let mut ended = None;
        for _ in 0..cfg.ground_fire_ticks {
            if let Some(power) = powers.update(&mut r.player, &mut r.ball, &cfg).ended {
                ended = Some(power);
            }
        }
        assert_eq!(ended, Some(OpponentPower::GroundFire));
        assert_eq!(r.player.action, Action::Idle);
    }

    #[test]
    fn test_meteor_carries_ball_then_releases() {
        let mut r = rig(LevelConfig::level_two());
        let cfg = r.config.opponent_powers.clone();
        let mut powers = OpponentPowers::default();
        r.ball.pos = Vec2::new(600.0, 300.0);
        r.ball.vel = Vec2::new(4.0, 4.0);

        assert_eq!(
            powers.try_trigger(&mut r.bar, &cfg, &mut r.ball, &r.config.ball),
            Some(OpponentPower::Meteor)
        );
        assert_eq!(r.ball.mode, BallMode::MeteorLocked);

        for _ in 0..cfg.meteor_ticks {
            powers.update(&mut r.player, &mut r.ball, &cfg);
            assert_eq!(r.ball.vel, Vec2::ZERO);
        }
        assert_eq!(r.ball.mode, BallMode::Normal);
        assert!(r.ball.pos.distance(cfg.meteor_target) < 1e-3);
    }
}
