//! Power bar: a staged cooldown that gates abilities

use serde::{Deserialize, Serialize};

/// Slack for summed fixed-step dts landing a hair under a stage boundary
const TIME_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerBar {
    pub max_stage: u32,
    /// Counts down from `max_stage`; zero means full
    pub stage: u32,
    pub stage_secs: f32,
    /// Unpaused time toward the next stage
    pub accumulated: f32,
    pub paused: bool,
}

impl PowerBar {
    pub fn new(max_stage: u32, stage_secs: f32) -> Self {
        Self {
            max_stage,
            stage: max_stage,
            stage_secs,
            accumulated: 0.0,
            paused: false,
        }
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.stage == 0
    }

    /// Charge in [0, 1]
    pub fn charge(&self) -> f32 {
        if self.max_stage == 0 {
            return 1.0;
        }
        (self.max_stage - self.stage) as f32 / self.max_stage as f32
    }

    pub fn advance(&mut self, dt: f32) {
        if self.paused || self.is_full() {
            return;
        }
        self.accumulated += dt;
        while self.stage > 0 && self.accumulated + TIME_EPSILON >= self.stage_secs {
            self.accumulated = (self.accumulated - self.stage_secs).max(0.0);
            self.stage -= 1;
        }
        if self.is_full() {
            self.accumulated = 0.0;
        }
    }

    /// Spend a full bar. Returns false (and changes nothing) otherwise.
    pub fn try_consume(&mut self) -> bool {
        if !self.is_full() {
            return false;
        }
        self.stage = self.max_stage;
        self.accumulated = 0.0;
        true
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Back to empty and running
    pub fn reset(&mut self) {
        self.stage = self.max_stage;
        self.accumulated = 0.0;
        self.paused = false;
    }
}
