//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Match time read from the simulation clock, never the wall
//! - No rendering or platform dependencies

pub mod ability;
pub mod actor;
pub mod ai;
pub mod arena;
pub mod ball;
pub mod clock;
pub mod collision;
pub mod geometry;
pub mod power;
pub mod state;
pub mod tick;

pub use ability::{ActivePower, OpponentPowers, PowerShot, ShotPhase, VineManager};
pub use actor::{Action, Actor, Intents, JumpState};
pub use arena::{Arena, GoalEvent, MatchPhase, Outcome, Score};
pub use ball::{Ball, BallMode, BallStep, Side, TouchEvent, TouchKind};
pub use clock::{MatchClock, PauseReason};
pub use collision::{CollisionResult, ContactResponse, circle_rect_contact, reflect_velocity};
pub use geometry::Rect;
pub use power::PowerBar;
pub use state::{GameState, MatchSnapshot};
pub use tick::{TickInput, tick};
