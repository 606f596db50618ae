//! Configuration errors
//!
//! Raised once at level setup. Bad geometry corrupts collision invariants, so
//! nothing is silently clamped or defaulted here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("field dimensions must be positive, got {width}x{height}")]
    InvalidField { width: f32, height: f32 },

    #[error("ground line {ground_y} must lie inside the field height {height}")]
    GroundOutsideField { ground_y: f32, height: f32 },

    #[error("{goal} goal zone lies outside the field bounds")]
    GoalOutsideField { goal: &'static str },

    #[error("{goal} goal {part} is not enclosed by its goal zone")]
    GoalPartOutsideZone {
        goal: &'static str,
        part: &'static str,
    },

    #[error("{goal} goal {part} needs a positive width and height")]
    EmptyGoalPart {
        goal: &'static str,
        part: &'static str,
    },

    #[error("{what} must not be negative, got {value}")]
    Negative { what: &'static str, value: f32 },

    #[error("{what} must be positive, got {value}")]
    NonPositive { what: &'static str, value: f32 },

    #[error("power bar needs at least one charge stage")]
    NoChargeStages,

    #[error("kick trigger frame {trigger} must be strictly inside 0..{frames}")]
    KickTriggerFrame { trigger: u32, frames: u32 },

    #[error("vines are enabled but at most {max} groups may grow")]
    VineLayout { max: usize },

    #[error("failed to read level config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse level config: {0}")]
    Parse(#[from] serde_json::Error),
}
