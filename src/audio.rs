//! Sound event vocabulary
//!
//! The simulation never plays anything itself. It emits named events into an
//! `AudioSink` and moves on; whatever sits behind the sink (a mixer, a log,
//! a test recorder) decides what they sound like.

use serde::{Deserialize, Serialize};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioEvent {
    /// An actor kicked or touched the ball
    BallKick,
    /// Ball landed hard enough to be heard
    BallGroundBounce,
    /// Ball struck a side wall
    WallBounce,
    /// A point was awarded
    GoalScored,
    /// Play stopped: own goal, unattributed goal, dead ball
    Whistle,
    /// Power shot released the ball
    PowerShotFired,
    /// A vine group started growing
    VineActivated,
    /// Player took a power kick
    Hurt,
    /// Opponent set the ground on fire
    GroundFire,
    /// Opponent captured the ball with a meteor
    Meteor,
    /// Match clock ran out
    TimeUp,
}

impl AudioEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioEvent::BallKick => "ball-kick",
            AudioEvent::BallGroundBounce => "ball-ground-bounce",
            AudioEvent::WallBounce => "wall-bounce",
            AudioEvent::GoalScored => "goal-scored",
            AudioEvent::Whistle => "whistle",
            AudioEvent::PowerShotFired => "power-shot-fired",
            AudioEvent::VineActivated => "vine-activated",
            AudioEvent::Hurt => "hurt",
            AudioEvent::GroundFire => "ground-fire",
            AudioEvent::Meteor => "meteor",
            AudioEvent::TimeUp => "time-up",
        }
    }

    /// Relative loudness, used by sinks that mix
    pub fn gain(&self) -> f32 {
        match self {
            AudioEvent::BallGroundBounce | AudioEvent::WallBounce => 0.3,
            AudioEvent::BallKick => 0.6,
            AudioEvent::GoalScored | AudioEvent::Whistle | AudioEvent::TimeUp => 1.0,
            _ => 0.8,
        }
    }
}

/// Receiver for sound events. Must not block.
pub trait AudioSink {
    fn emit(&mut self, event: AudioEvent);
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn emit(&mut self, _event: AudioEvent) {}
}

/// Keeps every event in order
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub events: Vec<AudioEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, event: AudioEvent) -> usize {
        self.events.iter().filter(|e| **e == event).count()
    }

    pub fn contains(&self, event: AudioEvent) -> bool {
        self.events.contains(&event)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl AudioSink for RecordingSink {
    fn emit(&mut self, event: AudioEvent) {
        self.events.push(event);
    }
}

/// Writes events to the log at their effective volume
#[derive(Debug, Clone)]
pub struct LogSink {
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink {
    pub fn new() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }
}

impl AudioSink for LogSink {
    fn emit(&mut self, event: AudioEvent) {
        let vol = self.effective_volume() * event.gain();
        if vol <= 0.0 {
            return;
        }
        match event {
            AudioEvent::GoalScored | AudioEvent::Whistle | AudioEvent::TimeUp => {
                log::info!("sound {} (vol {:.2})", event.as_str(), vol)
            }
            _ => log::debug!("sound {} (vol {:.2})", event.as_str(), vol),
        }
    }
}
