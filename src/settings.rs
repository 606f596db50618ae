//! Level configuration and tuning
//!
//! Every screen-space constant and gameplay threshold the simulation uses
//! lives here so a level can be described as data. Presets carry the tuned
//! arcade values; JSON files can override any subset of them.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::collision::{ContactResponse, PowerKickConfig};
use crate::sim::geometry::Rect;

/// Built-in level presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Level {
    #[default]
    One,
    Two,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::One => "One",
            Level::Two => "Two",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "one" | "1" => Some(Level::One),
            "two" | "2" => Some(Level::Two),
            _ => None,
        }
    }

    /// Preset tuning for this level
    pub fn config(&self) -> LevelConfig {
        match self {
            Level::One => LevelConfig::level_one(),
            Level::Two => LevelConfig::level_two(),
        }
    }
}

/// Field extents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub width: f32,
    pub height: f32,
    /// The ground line (y of every grounded foot and resting ball bottom)
    pub ground_y: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: FIELD_WIDTH,
            height: FIELD_HEIGHT,
            ground_y: GROUND_Y,
        }
    }
}

/// One goal: the drawn net zone, its scoring area and its solid bars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalConfig {
    pub zone: Rect,
    pub scoring: Rect,
    /// Top bar and side post
    pub bars: Vec<Rect>,
}

impl GoalConfig {
    pub fn left_default() -> Self {
        Self {
            zone: Rect::new(0.0, 350.0, 100.0, 250.0),
            scoring: Rect::new(30.0, 395.0, 50.0, 150.0),
            bars: vec![
                Rect::new(30.0, 380.0, 50.0, 15.0),
                Rect::new(0.0, 380.0, 30.0, 165.0),
            ],
        }
    }

    pub fn right_default() -> Self {
        Self {
            zone: Rect::new(700.0, 350.0, 100.0, 250.0),
            scoring: Rect::new(720.0, 395.0, 50.0, 150.0),
            bars: vec![
                Rect::new(720.0, 380.0, 50.0, 15.0),
                Rect::new(770.0, 380.0, 30.0, 165.0),
            ],
        }
    }
}

/// Both goals plus the heuristics used for goal detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalsConfig {
    /// The player's own goal (the opponent scores here)
    pub left: GoalConfig,
    /// The opponent's goal (the player scores here)
    pub right: GoalConfig,
    /// A ball this close to the ground counts as rolling
    pub rolling_ground_tolerance: f32,
    /// Horizontal slack past the scoring area for a rolling ball
    pub rolling_goal_margin: f32,
}

impl Default for GoalsConfig {
    fn default() -> Self {
        Self {
            left: GoalConfig::left_default(),
            right: GoalConfig::right_default(),
            rolling_ground_tolerance: 2.0,
            rolling_goal_margin: 5.0,
        }
    }
}

/// Ball physics tuning (velocities are pixels per tick)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallConfig {
    pub radius: f32,
    /// Where the ball drops in from at kickoff and after every reset
    pub spawn: Vec2,
    pub gravity: f32,
    pub bounciness: f32,
    pub horizontal_force_scale: f32,
    pub vertical_force_scale: f32,
    /// Horizontal damping per tick of ground contact
    pub ground_friction: f32,
    /// Impact speed below which a ground contact settles instead of bouncing
    pub rest_speed: f32,
    /// Impact speed above which a ground bounce is audible
    pub ground_impact_threshold: f32,
    pub spin_factor: f32,
    pub spin_decay: f32,

    // Stationary ball detection
    pub stationary_speed: f32,
    pub on_ground_tolerance: f32,
    pub on_ground_max_vy: f32,
    /// Ticks after a touch before another touch registers
    pub touch_cooldown_ticks: u32,

    // Dead ball detection: at rest on the ground outside these x bounds
    pub dead_ball_left_x: f32,
    pub dead_ball_right_x: f32,
    pub dead_ball_speed: f32,

    // Power shot trajectory mode
    pub special_duration_ticks: u32,
    /// While the shooter is still animation-locked the effect cannot drop below this
    pub special_lock_floor_ticks: u32,
    pub special_gravity_scale: f32,
    /// Extra downward push once the ball climbs above `special_low_height`
    pub special_low_bias: f32,
    pub special_low_height: f32,
    pub special_speed_factor: f32,
    pub special_bounciness: f32,
    pub special_friction: f32,
    pub special_spin_factor: f32,
    /// Speed multiplier applied when the effect starts
    pub special_launch_boost: f32,
    pub trail_length: usize,
    /// Minimum distance between recorded trail samples
    pub trail_spacing: f32,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            radius: BALL_RADIUS,
            spawn: Vec2::new(FIELD_WIDTH / 2.0, 100.0),
            gravity: GRAVITY,
            bounciness: BOUNCINESS,
            horizontal_force_scale: 0.6,
            vertical_force_scale: 1.0,
            ground_friction: 0.99,
            rest_speed: 1.0,
            ground_impact_threshold: 2.0,
            spin_factor: 2.0,
            spin_decay: 0.9,

            stationary_speed: 0.5,
            on_ground_tolerance: 10.0,
            on_ground_max_vy: 2.0,
            touch_cooldown_ticks: 5,

            dead_ball_left_x: 30.0,
            dead_ball_right_x: 720.0,
            dead_ball_speed: 1e-4,

            special_duration_ticks: 800,
            special_lock_floor_ticks: 120,
            special_gravity_scale: 0.1,
            special_low_bias: 0.15,
            special_low_height: 50.0,
            special_speed_factor: 1.2,
            special_bounciness: -0.1,
            special_friction: 0.98,
            special_spin_factor: 3.0,
            special_launch_boost: 1.8,
            trail_length: 10,
            trail_spacing: 8.0,
        }
    }
}

/// Collider response profiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    pub goal_bars: ContactResponse,
    pub actors: ContactResponse,
    pub vines: ContactResponse,
    pub power_kick: PowerKickConfig,
    /// Velocity a kicking actor gives an overlapping ball (x mirrored by facing)
    pub kick_override: Vec2,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            goal_bars: ContactResponse::RIGID,
            actors: ContactResponse::ACTOR,
            vines: ContactResponse::RIGID,
            power_kick: PowerKickConfig::default(),
            kick_override: Vec2::new(10.0, -5.0),
        }
    }
}

/// How hard an actor moves the ball when it touches it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TouchProfile {
    /// Velocity given to a resting ball by a kick (x mirrored by facing)
    pub stationary_kick: Vec2,
    /// Velocity given to a resting ball by a plain touch
    pub stationary_nudge: Vec2,
    pub kick_force: f32,
    pub touch_force: f32,
    /// Vertical share of a plain touch on a moving ball
    pub touch_vertical_scale: f32,
    /// Kicks on a grounded ball launch it steeply upward
    pub sky_kick: bool,
    /// Horizontal / vertical share of `kick_force` for a sky kick
    pub sky_kick_scale: Vec2,
}

impl TouchProfile {
    pub fn player() -> Self {
        Self {
            stationary_kick: Vec2::new(8.0, -4.0),
            stationary_nudge: Vec2::new(4.0, -2.0),
            kick_force: 10.0,
            touch_force: 5.0,
            touch_vertical_scale: 0.5,
            sky_kick: false,
            sky_kick_scale: Vec2::new(0.7, 1.2),
        }
    }

    pub fn opponent() -> Self {
        Self {
            stationary_kick: Vec2::new(12.0, -6.0),
            stationary_nudge: Vec2::new(6.0, -3.0),
            kick_force: 15.0,
            touch_force: 6.0,
            touch_vertical_scale: 0.6,
            sky_kick: true,
            sky_kick_scale: Vec2::new(0.7, 1.2),
        }
    }
}

impl Default for TouchProfile {
    fn default() -> Self {
        Self::player()
    }
}

/// Movement and hitbox for one actor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    /// Spawn x (hitbox center)
    pub spawn_x: f32,
    pub spawn_facing_left: bool,
    /// Hitbox width and height, standing on the feet
    pub hitbox: Vec2,
    pub move_speed: f32,
    pub jump_velocity: f32,
    pub gravity: f32,
    /// How long a kick stays active
    pub kick_ticks: u32,
    /// How long a power-kick victim stays hurt
    pub hurt_ticks: u32,
    pub touch: TouchProfile,
}

impl ActorConfig {
    pub fn player() -> Self {
        Self {
            spawn_x: 300.0,
            spawn_facing_left: false,
            hitbox: Vec2::new(50.0, 100.0),
            move_speed: 5.0,
            jump_velocity: 10.0,
            gravity: 0.5,
            kick_ticks: 10,
            hurt_ticks: 30,
            touch: TouchProfile::player(),
        }
    }

    pub fn opponent() -> Self {
        Self {
            spawn_x: 620.0,
            spawn_facing_left: true,
            hitbox: Vec2::new(65.0, 100.0),
            move_speed: 5.0,
            jump_velocity: 10.0,
            gravity: 0.5,
            kick_ticks: 10,
            hurt_ticks: 30,
            touch: TouchProfile::opponent(),
        }
    }
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self::player()
    }
}

/// Opponent chase heuristic thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Horizontal gap at which the opponent kicks instead of running
    pub kick_reach: f32,
    /// Ball must be within this horizontal distance for a jump
    pub jump_window: f32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            kick_reach: 4.0,
            jump_window: 50.0,
        }
    }
}

/// Scripted power shot timings (ticks) and geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerShotConfig {
    /// Height above ground the shooter teleports to
    pub hover_height: f32,
    /// Ticks hovering with the ball before the kick starts
    pub hover_ticks: u32,
    /// Frames in the kick sub-animation
    pub kick_frames: u32,
    /// The frame on which the shot fires (never the first or last)
    pub kick_trigger_frame: u32,
    /// Ticks per kick frame
    pub kick_frame_ticks: u32,
    /// Launch speed along x and y of the normalized aim
    pub launch_speed: Vec2,
    /// Fall acceleration after the shot
    pub fall_decel: f32,
    /// Hard cap on the whole sequence
    pub watchdog_ticks: u32,
    /// Ball position relative to the shooter's feet while carried
    pub carry_offset: Vec2,
    /// Ball position relative to the shooter's feet at the kick
    pub leg_offset: Vec2,
    /// The kicked ball stays at least this far from the right edge
    pub edge_clearance: f32,
    /// Shooters beyond this fraction of the field width aim left
    pub target_switch_fraction: f32,
    pub left_target: Vec2,
    pub right_target: Vec2,
}

impl Default for PowerShotConfig {
    fn default() -> Self {
        Self {
            hover_height: 300.0,
            hover_ticks: 50,
            kick_frames: 3,
            kick_trigger_frame: 1,
            kick_frame_ticks: 5,
            launch_speed: Vec2::new(15.0, 8.0),
            fall_decel: 0.5,
            watchdog_ticks: 180,
            carry_offset: Vec2::new(60.0, -65.0),
            leg_offset: Vec2::new(70.0, -40.0),
            edge_clearance: 50.0,
            target_switch_fraction: 0.7,
            left_target: Vec2::new(50.0, 470.0),
            right_target: Vec2::new(750.0, 470.0),
        }
    }
}

/// Vine obstacle layout and timings (ticks)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VineConfig {
    pub enabled: bool,
    pub max_groups: usize,
    /// Base x of the first group
    pub first_x: f32,
    /// Base x advance per existing group
    pub spacing: f32,
    pub main_size: Vec2,
    pub main_grow_ticks: u32,
    pub side_offsets: Vec<f32>,
    pub side_size: Vec2,
    pub side_grow_ticks: u32,
    /// Side vines grow in `side_grow_ticks ± side_grow_jitter`
    pub side_grow_jitter: u32,
    pub hold_ticks: u32,
    /// +1 sends rebounds right, -1 left
    pub outward: f32,
    pub rebound_scale: f32,
    pub rebound_min_speed: f32,
    pub rebound_fall_scale: f32,
    pub rebound_lift: f32,
    pub rebound_jitter: Vec2,
    /// Extra horizontal scale while the ball is in power shot mode
    pub special_scale: f32,
}

impl Default for VineConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_groups: 3,
            first_x: 50.0,
            spacing: 100.0,
            main_size: Vec2::new(100.0, 200.0),
            main_grow_ticks: 60,
            side_offsets: vec![-60.0, -30.0, 0.0, 30.0, 60.0],
            side_size: Vec2::new(50.0, 180.0),
            side_grow_ticks: 70,
            side_grow_jitter: 10,
            hold_ticks: 180,
            outward: 1.0,
            rebound_scale: 1.5,
            rebound_min_speed: 5.0,
            rebound_fall_scale: 0.8,
            rebound_lift: 5.0,
            rebound_jitter: Vec2::new(3.0, 2.0),
            special_scale: 1.2,
        }
    }
}

/// Abilities the opponent spends its power bar on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpponentPower {
    /// Empowered contacts shove and hurt the player
    PowerKick,
    /// Grounded player is knocked out while the fire burns
    GroundFire,
    /// Ball is captured and carried toward the player's goal
    Meteor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpponentPowerConfig {
    /// Powers used in order, wrapping around
    pub rotation: Vec<OpponentPower>,
    pub power_kick_ticks: u32,
    pub ground_fire_ticks: u32,
    pub meteor_ticks: u32,
    /// Where the meteor drops the ball
    pub meteor_target: Vec2,
}

impl Default for OpponentPowerConfig {
    fn default() -> Self {
        Self {
            rotation: vec![OpponentPower::PowerKick, OpponentPower::GroundFire],
            power_kick_ticks: 180,
            ground_fire_ticks: 180,
            meteor_ticks: 50,
            meteor_target: Vec2::new(150.0, 420.0),
        }
    }
}

/// Match clock, celebration and power bar timings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchTimingConfig {
    /// Seconds of play
    pub total_time: f32,
    /// Seconds the celebration lasts (wall time, not paused)
    pub celebration_secs: f32,
    /// Ticks of the post-goal reset phase
    pub reset_ticks: u32,
    /// Power bar stages from empty to full
    pub bar_stages: u32,
    /// Seconds per power bar stage
    pub bar_stage_secs: f32,
}

impl Default for MatchTimingConfig {
    fn default() -> Self {
        Self {
            total_time: 60.0,
            celebration_secs: 3.0,
            reset_ticks: 30,
            bar_stages: 5,
            bar_stage_secs: 1.0,
        }
    }
}

/// Complete description of a level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub level: Level,
    pub field: FieldConfig,
    pub goals: GoalsConfig,
    pub ball: BallConfig,
    pub contacts: ContactConfig,
    pub player: ActorConfig,
    pub opponent: ActorConfig,
    pub ai: AiConfig,
    pub power_shot: PowerShotConfig,
    pub vines: VineConfig,
    pub opponent_powers: OpponentPowerConfig,
    pub timing: MatchTimingConfig,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self::level_one()
    }
}

impl LevelConfig {
    /// First level: power shot only, opponent alternates power kick and fire
    pub fn level_one() -> Self {
        Self {
            level: Level::One,
            field: FieldConfig::default(),
            goals: GoalsConfig::default(),
            ball: BallConfig::default(),
            contacts: ContactConfig::default(),
            player: ActorConfig::player(),
            opponent: ActorConfig::opponent(),
            ai: AiConfig::default(),
            power_shot: PowerShotConfig::default(),
            vines: VineConfig::default(),
            opponent_powers: OpponentPowerConfig::default(),
            timing: MatchTimingConfig::default(),
        }
    }

    /// Second level: livelier ball, vines unlocked, opponent gains the meteor
    pub fn level_two() -> Self {
        let mut config = Self::level_one();
        config.level = Level::Two;
        config.ball.horizontal_force_scale = 0.7;
        config.vines.enabled = true;
        config.opponent.hitbox = Vec2::new(60.0, 110.0);
        config.ai.jump_window = 100.0;
        config.opponent_powers.rotation = vec![OpponentPower::Meteor, OpponentPower::PowerKick];
        config
    }

    /// Parse a JSON level description; missing fields take level one defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Fail fast on geometry or timings that would break the simulation
    pub fn validate(&self) -> Result<(), ConfigError> {
        let field = &self.field;
        if field.width <= 0.0 || field.height <= 0.0 {
            return Err(ConfigError::InvalidField {
                width: field.width,
                height: field.height,
            });
        }
        if field.ground_y <= 0.0 || field.ground_y > field.height {
            return Err(ConfigError::GroundOutsideField {
                ground_y: field.ground_y,
                height: field.height,
            });
        }

        let bounds = Rect::new(0.0, 0.0, field.width, field.height);
        for (name, goal) in [("left", &self.goals.left), ("right", &self.goals.right)] {
            // Deserialized rects skip the clamp in `Rect::new`
            if !has_area(&goal.zone) {
                return Err(ConfigError::EmptyGoalPart { goal: name, part: "zone" });
            }
            if goal.bars.iter().any(|bar| !has_area(bar)) {
                return Err(ConfigError::EmptyGoalPart { goal: name, part: "bar" });
            }
            if !bounds.contains_rect(&goal.zone) {
                return Err(ConfigError::GoalOutsideField { goal: name });
            }
            if goal.scoring.width() <= 0.0 || goal.scoring.height() <= 0.0 {
                return Err(ConfigError::NonPositive {
                    what: "goal scoring area",
                    value: goal.scoring.width().min(goal.scoring.height()),
                });
            }
            if !goal.zone.contains_rect(&goal.scoring) {
                return Err(ConfigError::GoalPartOutsideZone {
                    goal: name,
                    part: "scoring area",
                });
            }
            if goal.bars.iter().any(|bar| !goal.zone.contains_rect(bar)) {
                return Err(ConfigError::GoalPartOutsideZone {
                    goal: name,
                    part: "bar",
                });
            }
        }

        positive("ball radius", self.ball.radius)?;
        positive("horizontal force scale", self.ball.horizontal_force_scale)?;
        positive("vertical force scale", self.ball.vertical_force_scale)?;
        positive("player hitbox width", self.player.hitbox.x)?;
        positive("player hitbox height", self.player.hitbox.y)?;
        positive("opponent hitbox width", self.opponent.hitbox.x)?;
        positive("opponent hitbox height", self.opponent.hitbox.y)?;
        positive("match time", self.timing.total_time)?;
        positive("celebration duration", self.timing.celebration_secs)?;
        positive("power bar stage duration", self.timing.bar_stage_secs)?;
        positive("power shot watchdog", self.power_shot.watchdog_ticks as f32)?;
        positive("kick frame duration", self.power_shot.kick_frame_ticks as f32)?;

        if self.timing.bar_stages == 0 {
            return Err(ConfigError::NoChargeStages);
        }

        let shot = &self.power_shot;
        if shot.kick_trigger_frame == 0 || shot.kick_trigger_frame + 1 >= shot.kick_frames {
            return Err(ConfigError::KickTriggerFrame {
                trigger: shot.kick_trigger_frame,
                frames: shot.kick_frames,
            });
        }

        not_negative("vine rebound jitter x", self.vines.rebound_jitter.x)?;
        not_negative("vine rebound jitter y", self.vines.rebound_jitter.y)?;

        if self.vines.enabled {
            positive("main vine width", self.vines.main_size.x)?;
            positive("main vine height", self.vines.main_size.y)?;
            if self.vines.max_groups == 0 {
                return Err(ConfigError::VineLayout {
                    max: self.vines.max_groups,
                });
            }
            positive("vine grow duration", self.vines.main_grow_ticks as f32)?;
            let shortest_side = self
                .vines
                .side_grow_ticks
                .saturating_sub(self.vines.side_grow_jitter);
            if !self.vines.side_offsets.is_empty() {
                positive("side vine grow duration", shortest_side as f32)?;
            }
        }

        Ok(())
    }
}

fn not_negative(what: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { what, value })
    }
}

fn has_area(rect: &Rect) -> bool {
    rect.size.x > 0.0 && rect.size.y > 0.0
}

fn positive(what: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { what, value })
    }
}
