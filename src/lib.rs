//! Hellkick - A 2D arcade soccer match engine
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, match state, powers)
//! - `settings`: Data-driven level tuning and validation
//! - `audio`: Sound event vocabulary and the sink the simulation emits into
//! - `error`: Configuration errors raised at level setup

pub mod audio;
pub mod error;
pub mod settings;
pub mod sim;

pub use audio::{AudioEvent, AudioSink, LogSink, NullSink, RecordingSink};
pub use error::ConfigError;
pub use settings::{Level, LevelConfig};

/// Simulation constants shared by every level
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one step per rendered frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Default field dimensions (pixels, y grows downward)
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;
    pub const GROUND_Y: f32 = FIELD_HEIGHT - 30.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 15.0;
    /// Downward acceleration per tick before the vertical force scale
    pub const GRAVITY: f32 = 0.5;
    pub const BOUNCINESS: f32 = -0.8;

    /// Epsilon substituted for a zero contact distance
    pub const CONTACT_EPSILON: f32 = 0.1;
}

/// Wrap an angle in degrees to [0, 360)
#[inline]
pub fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle % 360.0;
    if wrapped < 0.0 { wrapped + 360.0 } else { wrapped }
}

/// Sign of a horizontal direction as -1.0 / 1.0 (zero counts as positive)
#[inline]
pub fn facing_sign(facing_left: bool) -> f32 {
    if facing_left { -1.0 } else { 1.0 }
}
