//! Match clock
//!
//! Reads time from the simulation's own clock (`GameState::time`, advanced by
//! a fixed dt every tick), never from the wall. Several systems can hold the
//! clock paused at once; it only runs again when every reason is released.

use serde::{Deserialize, Serialize};

/// Why the match clock is stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PauseReason {
    Celebration,
    PowerShot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchClock {
    pub total_time: f32,
    pub start_time: f32,
    /// Seconds spent paused in finished pause intervals
    pub accumulated_pause: f32,
    /// Start of the current pause interval
    pub paused_since: Option<f32>,
    reasons: Vec<PauseReason>,
}

impl MatchClock {
    pub fn new(total_time: f32, now: f32) -> Self {
        Self {
            total_time,
            start_time: now,
            accumulated_pause: 0.0,
            paused_since: None,
            reasons: Vec::new(),
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused_since.is_some()
    }

    pub fn is_paused_for(&self, reason: PauseReason) -> bool {
        self.reasons.contains(&reason)
    }

    /// Stop the clock. Pausing again for a held reason does nothing.
    pub fn pause(&mut self, reason: PauseReason, now: f32) {
        if self.reasons.contains(&reason) {
            return;
        }
        if self.reasons.is_empty() {
            self.paused_since = Some(now);
        }
        self.reasons.push(reason);
    }

    /// Release one reason; the clock runs once none are left
    pub fn resume(&mut self, reason: PauseReason, now: f32) {
        let before = self.reasons.len();
        self.reasons.retain(|r| *r != reason);
        if self.reasons.len() == before || !self.reasons.is_empty() {
            return;
        }
        if let Some(since) = self.paused_since.take() {
            self.accumulated_pause += (now - since).max(0.0);
        }
    }

    /// Drop every pause reason at once
    pub fn resume_all(&mut self, now: f32) {
        self.reasons.clear();
        if let Some(since) = self.paused_since.take() {
            self.accumulated_pause += (now - since).max(0.0);
        }
    }

    /// Running time, excluding every pause
    pub fn elapsed(&self, now: f32) -> f32 {
        let current_pause = self.paused_since.map_or(0.0, |since| (now - since).max(0.0));
        (now - self.start_time - self.accumulated_pause - current_pause).max(0.0)
    }

    pub fn remaining(&self, now: f32) -> f32 {
        (self.total_time - self.elapsed(now)).max(0.0)
    }

    pub fn is_expired(&self, now: f32) -> bool {
        self.remaining(now) <= 0.0
    }
}
