//! Game state and match snapshot
//!
//! Everything one level's match needs lives here. Given the same config, seed
//! and inputs, two states advance identically.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ability::{ActivePower, OpponentPowers, PowerShot, VineManager};
use super::actor::{Action, Actor};
use super::arena::{Arena, MatchPhase, Outcome, Score};
use super::ball::{Ball, BallMode, Side};
use super::clock::PauseReason;
use super::geometry::Rect;
use super::power::PowerBar;
use crate::error::ConfigError;
use crate::settings::{Level, LevelConfig};

/// Complete match state
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: LevelConfig,
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    /// Simulation clock (seconds), advanced by `tick`
    pub time: f32,
    pub time_ticks: u64,
    /// Whole simulation held (menu pause)
    pub paused: bool,
    pub ball: Ball,
    pub player: Actor,
    pub opponent: Actor,
    pub arena: Arena,
    pub player_bar: PowerBar,
    pub opponent_bar: PowerBar,
    pub power_shot: PowerShot,
    pub vines: VineManager,
    pub opponent_powers: OpponentPowers,
    /// Goal bars, fixed for the level
    pub bars: Vec<Rect>,
}

impl GameState {
    /// Validate the level and set up kickoff
    pub fn new(config: LevelConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;

        let arena = Arena::new(&config.goals, &config.timing, 0.0);
        let bars = arena.bars();
        let bar = PowerBar::new(config.timing.bar_stages, config.timing.bar_stage_secs);
        log::info!("level {} ready (seed {})", config.level.as_str(), seed);

        Ok(Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            time: 0.0,
            time_ticks: 0,
            paused: false,
            ball: Ball::new(&config.ball),
            player: Actor::new(Side::Player, &config.player),
            opponent: Actor::new(Side::Opponent, &config.opponent),
            arena,
            player_bar: bar.clone(),
            opponent_bar: bar,
            power_shot: PowerShot::default(),
            vines: VineManager::default(),
            opponent_powers: OpponentPowers::default(),
            bars,
            config,
        })
    }

    pub fn from_level(level: Level, seed: u64) -> Result<Self, ConfigError> {
        Self::new(level.config(), seed)
    }

    /// Stop both power bars (idempotent)
    pub fn pause_abilities(&mut self) {
        self.player_bar.pause();
        self.opponent_bar.pause();
    }

    pub fn resume_abilities(&mut self) {
        self.player_bar.resume();
        self.opponent_bar.resume();
    }

    /// Finish an active power shot and give the opponent and clock back
    pub fn end_power_shot(&mut self) {
        if self.power_shot.is_active() {
            self.power_shot.end(&mut self.player);
        }
        self.opponent.unfreeze();
        self.arena.clock.resume(PauseReason::PowerShot, self.time);
    }

    /// Ball, actors and abilities back to kickoff after a goal
    pub fn reset_after_goal(&mut self) {
        self.end_power_shot();
        self.opponent_powers.cancel(&mut self.player, &mut self.ball);
        self.vines.clear();
        self.ball.reset(&self.config.ball, false);
        self.player.reset(&self.config.player);
        self.opponent.reset(&self.config.opponent);
        self.resume_abilities();
    }

    /// Unconditional restart after a dead ball. Refused mid power shot.
    pub fn reset_dead_ball(&mut self) -> bool {
        if !self.ball.reset(&self.config.ball, self.power_shot.animation_locked()) {
            return false;
        }
        self.opponent_powers.cancel(&mut self.player, &mut self.ball);
        self.player.reset(&self.config.player);
        self.opponent.reset(&self.config.opponent);
        true
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            tick: self.time_ticks,
            time: self.time,
            level: self.config.level,
            phase: self.arena.phase,
            outcome: self.arena.outcome(),
            score: self.arena.score,
            remaining: self.arena.clock.remaining(self.time),
            clock_paused: self.arena.clock.is_paused(),
            ball: BallSnapshot {
                pos: self.ball.pos,
                vel: self.ball.vel,
                angle: self.ball.angle,
                mode: self.ball.mode,
                last_toucher: self.arena.last_toucher,
            },
            player: ActorSnapshot::of(&self.player),
            opponent: ActorSnapshot::of(&self.opponent),
            player_bar_stage: self.player_bar.stage,
            opponent_bar_stage: self.opponent_bar.stage,
            power_shot_active: self.power_shot.is_active(),
            vine_groups: self.vines.groups.len(),
            opponent_power: self.opponent_powers.active,
            celebration_message: self.arena.celebration_message.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallSnapshot {
    pub pos: Vec2,
    pub vel: Vec2,
    pub angle: f32,
    pub mode: BallMode,
    pub last_toucher: Option<Side>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    pub x: f32,
    pub height: f32,
    pub action: Action,
    pub facing_left: bool,
}

impl ActorSnapshot {
    fn of(actor: &Actor) -> Self {
        Self {
            x: actor.x,
            height: actor.height,
            action: actor.action,
            facing_left: actor.facing_left,
        }
    }
}

/// Serializable view of a match at one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub tick: u64,
    pub time: f32,
    pub level: Level,
    pub phase: MatchPhase,
    pub outcome: Option<Outcome>,
    pub score: Score,
    pub remaining: f32,
    pub clock_paused: bool,
    pub ball: BallSnapshot,
    pub player: ActorSnapshot,
    pub opponent: ActorSnapshot,
    pub player_bar_stage: u32,
    pub opponent_bar_stage: u32,
    pub power_shot_active: bool,
    pub vine_groups: usize,
    pub opponent_power: Option<ActivePower>,
    pub celebration_message: Option<String>,
}
