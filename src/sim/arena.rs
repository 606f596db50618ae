//! Arena and match state machine
//!
//! The arena is the only writer of score and phase. It learns who touched the
//! ball from `TouchEvent`s and decides goals from the ball's rectangle.
//!
//! Phases loop `Ongoing -> Celebrating -> ResettingAfterGoal -> Ongoing`
//! until the clock runs out, which latches a terminal `TimedOut` outcome.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::ball::{Side, TouchEvent};
use super::clock::{MatchClock, PauseReason};
use super::geometry::Rect;
use crate::settings::{GoalConfig, GoalsConfig, MatchTimingConfig};

const GOAL_MESSAGES: &[&str] = &["GOAL!", "What a strike!", "Unstoppable!", "Back of the net!"];
const NO_SCORE_MESSAGES: &[&str] = &["Whistle! No goal.", "Own goal, no point given."];

/// Result of a finished match, from the player's side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Lose,
    Draw,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MatchPhase {
    Ongoing,
    Celebrating { started_at: f32 },
    ResettingAfterGoal { ticks_left: u32 },
    TimedOut(Outcome),
}

/// What `update_score` found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalEvent {
    /// `scorer` earned a point
    Scored { scorer: Side },
    /// Ball entered `defender`'s goal without an attacking touch
    NoScore { defender: Side },
}

/// Phase transitions reported by `advance`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArenaSignal {
    None,
    CelebrationOver,
    /// Reset ball, actors and abilities, then call `finish_reset`
    ResetDue,
    TimeUp(Outcome),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub player: u32,
    pub opponent: u32,
}

impl Score {
    fn add(&mut self, side: Side) {
        match side {
            Side::Player => self.player += 1,
            Side::Opponent => self.opponent += 1,
        }
    }
}

/// A goal mouth and the side defending it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalZone {
    pub defender: Side,
    pub zone: Rect,
    pub scoring: Rect,
    pub bars: Vec<Rect>,
}

impl GoalZone {
    fn from_config(defender: Side, config: &GoalConfig) -> Self {
        Self {
            defender,
            zone: config.zone,
            scoring: config.scoring,
            bars: config.bars.clone(),
        }
    }

    /// Ball rect inside the scoring area, or rolling along the ground past its mouth
    fn is_entered(&self, ball_rect: &Rect, rolling: bool, margin: f32) -> bool {
        if ball_rect.intersects(&self.scoring) {
            return true;
        }
        let cx = ball_rect.center().x;
        rolling && cx >= self.scoring.left() - margin && cx <= self.scoring.right() + margin
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arena {
    /// Player's own goal
    pub left: GoalZone,
    /// Opponent's goal
    pub right: GoalZone,
    pub score: Score,
    pub phase: MatchPhase,
    pub clock: MatchClock,
    pub last_toucher: Option<Side>,
    pub celebration_message: Option<String>,
    celebration_secs: f32,
    reset_ticks: u32,
    rolling_margin: f32,
    outcome: Option<Outcome>,
}

impl Arena {
    pub fn new(goals: &GoalsConfig, timing: &MatchTimingConfig, now: f32) -> Self {
        Self {
            left: GoalZone::from_config(Side::Player, &goals.left),
            right: GoalZone::from_config(Side::Opponent, &goals.right),
            score: Score::default(),
            phase: MatchPhase::Ongoing,
            clock: MatchClock::new(timing.total_time, now),
            last_toucher: None,
            celebration_message: None,
            celebration_secs: timing.celebration_secs,
            reset_ticks: timing.reset_ticks,
            rolling_margin: goals.rolling_goal_margin,
            outcome: None,
        }
    }

    /// Every solid goal bar
    pub fn bars(&self) -> Vec<Rect> {
        self.left.bars.iter().chain(&self.right.bars).copied().collect()
    }

    pub fn is_ongoing(&self) -> bool {
        self.phase == MatchPhase::Ongoing
    }

    pub fn is_celebrating(&self) -> bool {
        matches!(self.phase, MatchPhase::Celebrating { .. })
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, MatchPhase::TimedOut(_))
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn record_touch(&mut self, touch: &TouchEvent) {
        self.last_toucher = Some(touch.side);
    }

    /// Check both goals; a hit starts the celebration and stops the clock
    ///
    /// Only runs while `Ongoing`. A goal credited to nobody still stops play.
    pub fn update_score<R: Rng>(&mut self, ball_rect: &Rect, rolling: bool, now: f32, rng: &mut R) -> Option<GoalEvent> {
        if !self.is_ongoing() {
            return None;
        }

        let defender = [&self.left, &self.right]
            .into_iter()
            .find(|goal| goal.is_entered(ball_rect, rolling, self.rolling_margin))
            .map(|goal| goal.defender)?;

        let attacker = defender.other();
        let event = if self.last_toucher == Some(attacker) {
            self.score.add(attacker);
            GoalEvent::Scored { scorer: attacker }
        } else {
            GoalEvent::NoScore { defender }
        };

        let messages = match event {
            GoalEvent::Scored { .. } => GOAL_MESSAGES,
            GoalEvent::NoScore { .. } => NO_SCORE_MESSAGES,
        };
        self.celebration_message = messages.choose(rng).map(|m| m.to_string());
        self.phase = MatchPhase::Celebrating { started_at: now };
        self.clock.pause(PauseReason::Celebration, now);

        log::info!(
            "{:?} at {:.1}s, score {}-{}",
            event,
            self.clock.elapsed(now),
            self.score.player,
            self.score.opponent
        );
        Some(event)
    }

    /// Move time-driven phases along
    pub fn advance(&mut self, now: f32) -> ArenaSignal {
        match self.phase {
            MatchPhase::Ongoing => {
                if self.clock.is_expired(now) {
                    ArenaSignal::TimeUp(self.resolve_outcome())
                } else {
                    ArenaSignal::None
                }
            }
            MatchPhase::Celebrating { started_at } => {
                if now - started_at >= self.celebration_secs {
                    self.celebration_message = None;
                    self.phase = MatchPhase::ResettingAfterGoal {
                        ticks_left: self.reset_ticks,
                    };
                    ArenaSignal::CelebrationOver
                } else {
                    ArenaSignal::None
                }
            }
            MatchPhase::ResettingAfterGoal { ticks_left } => {
                if ticks_left <= 1 {
                    self.phase = MatchPhase::ResettingAfterGoal { ticks_left: 0 };
                    ArenaSignal::ResetDue
                } else {
                    self.phase = MatchPhase::ResettingAfterGoal {
                        ticks_left: ticks_left - 1,
                    };
                    ArenaSignal::None
                }
            }
            MatchPhase::TimedOut(_) => ArenaSignal::None,
        }
    }

    /// Kickoff after a goal: play and clock resume
    pub fn finish_reset(&mut self, now: f32) {
        if matches!(self.phase, MatchPhase::ResettingAfterGoal { .. }) {
            self.phase = MatchPhase::Ongoing;
            self.last_toucher = None;
            self.clock.resume(PauseReason::Celebration, now);
        }
    }

    /// Compare scores once; later calls return the latched result
    pub fn resolve_outcome(&mut self) -> Outcome {
        if let Some(outcome) = self.outcome {
            return outcome;
        }
        let outcome = match self.score.player.cmp(&self.score.opponent) {
            std::cmp::Ordering::Greater => Outcome::Win,
            std::cmp::Ordering::Less => Outcome::Lose,
            std::cmp::Ordering::Equal => Outcome::Draw,
        };
        log::info!(
            "time up: {:?} ({}-{})",
            outcome,
            self.score.player,
            self.score.opponent
        );
        self.outcome = Some(outcome);
        self.phase = MatchPhase::TimedOut(outcome);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::LevelConfig;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn arena() -> Arena {
        let config = LevelConfig::level_one();
        Arena::new(&config.goals, &config.timing, 0.0)
    }

    fn in_right_goal() -> Rect {
        Rect::around_circle(Vec2::new(745.0, 470.0), 15.0)
    }

    fn in_left_goal() -> Rect {
        Rect::around_circle(Vec2::new(55.0, 470.0), 15.0)
    }

    #[test]
    fn test_player_goal_scores_and_pauses() {
        let mut arena = arena();
        let mut rng = Pcg32::seed_from_u64(1);
        arena.record_touch(&TouchEvent {
            side: Side::Player,
            kind: crate::sim::ball::TouchKind::Kick,
        });

        let event = arena.update_score(&in_right_goal(), false, 10.0, &mut rng);
        assert_eq!(event, Some(GoalEvent::Scored { scorer: Side::Player }));
        assert_eq!(arena.score, Score { player: 1, opponent: 0 });
        assert!(arena.is_celebrating());
        assert!(arena.clock.is_paused());
        assert!(arena.celebration_message.is_some());
    }

    #[test]
    fn test_own_goal_resets_without_score() {
        let mut arena = arena();
        let mut rng = Pcg32::seed_from_u64(1);
        arena.record_touch(&TouchEvent {
            side: Side::Player,
            kind: crate::sim::ball::TouchKind::Touch,
        });

        let event = arena.update_score(&in_left_goal(), false, 10.0, &mut rng);
        assert_eq!(event, Some(GoalEvent::NoScore { defender: Side::Player }));
        assert_eq!(arena.score, Score::default());
        assert!(arena.is_celebrating());
    }

    #[test]
    fn test_no_double_score_while_celebrating() {
        let mut arena = arena();
        let mut rng = Pcg32::seed_from_u64(1);
        arena.last_toucher = Some(Side::Opponent);
        assert!(arena.update_score(&in_left_goal(), false, 1.0, &mut rng).is_some());
        assert!(arena.update_score(&in_left_goal(), false, 1.1, &mut rng).is_none());
        assert_eq!(arena.score.opponent, 1);
    }

    #[test]
    fn test_rolling_ball_counts_near_mouth() {
        let mut arena = arena();
        let mut rng = Pcg32::seed_from_u64(1);
        arena.last_toucher = Some(Side::Player);
        // Ball center just past the scoring area's left edge, below it
        let ball = Rect::around_circle(Vec2::new(718.0, 600.0), 15.0);
        assert!(arena.update_score(&ball, false, 1.0, &mut rng).is_none());
        assert!(arena.update_score(&ball, true, 1.0, &mut rng).is_some());
    }

    #[test]
    fn test_celebration_then_reset_cycle() {
        let config = LevelConfig::level_one();
        let mut arena = arena();
        let mut rng = Pcg32::seed_from_u64(1);
        arena.last_toucher = Some(Side::Player);
        arena.update_score(&in_right_goal(), false, 10.0, &mut rng);

        assert_eq!(arena.advance(12.0), ArenaSignal::None);
        assert_eq!(arena.advance(13.0), ArenaSignal::CelebrationOver);

        let mut signals = Vec::new();
        for _ in 0..config.timing.reset_ticks {
            signals.push(arena.advance(13.1));
        }
        assert_eq!(signals.last(), Some(&ArenaSignal::ResetDue));
        assert_eq!(signals.iter().filter(|s| **s == ArenaSignal::ResetDue).count(), 1);

        arena.finish_reset(14.0);
        assert!(arena.is_ongoing());
        assert!(!arena.clock.is_paused());
        // Four seconds of celebration and reset were not charged to the match
        assert!((arena.clock.remaining(14.0) - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_outcome_latches_once() {
        let mut arena = arena();
        arena.score = Score { player: 2, opponent: 1 };

        assert_eq!(arena.advance(30.0), ArenaSignal::None);
        assert_eq!(arena.advance(61.0), ArenaSignal::TimeUp(Outcome::Win));
        assert_eq!(arena.phase, MatchPhase::TimedOut(Outcome::Win));

        arena.score = Score { player: 0, opponent: 5 };
        assert_eq!(arena.resolve_outcome(), Outcome::Win);
        assert_eq!(arena.advance(62.0), ArenaSignal::None);
        assert_eq!(arena.outcome(), Some(Outcome::Win));
    }

    #[test]
    fn test_draw_and_loss() {
        let mut arena_draw = arena();
        arena_draw.score = Score { player: 1, opponent: 1 };
        assert_eq!(arena_draw.resolve_outcome(), Outcome::Draw);

        let mut arena_loss = arena();
        arena_loss.score = Score { player: 0, opponent: 1 };
        assert_eq!(arena_loss.resolve_outcome(), Outcome::Lose);
    }
}
