//! Opponent chase heuristic
//!
//! Produces the same `Intents` a human would. Decisions only look at the
//! ball's and the opponent's hitboxes, so they are stable from tick to tick.

use super::actor::{Actor, Intents};
use super::geometry::Rect;
use crate::settings::{AiConfig, FieldConfig};

/// Decide what the opponent does this tick
pub fn chase(opponent: &Actor, ball_rect: &Rect, config: &AiConfig, field: &FieldConfig) -> Intents {
    let mut intents = Intents::default();
    if !opponent.in_control() {
        return intents;
    }

    let body = opponent.hitbox(field);
    let ball_low = ball_rect.bottom() > body.top();
    let gap_left = body.left() - ball_rect.right();
    let gap_right = ball_rect.left() - body.right();

    if gap_left >= 0.0 && gap_left <= config.kick_reach && ball_low {
        // Ball at the front foot: kick it back toward the player's goal
        intents.move_left = true;
        intents.kick = true;
    } else if gap_left > 0.0 {
        intents.move_left = true;
    } else if gap_right >= 0.0 && gap_right <= config.kick_reach && ball_low && opponent.is_grounded() {
        // Ball slipped behind: hop over it
        intents.move_right = true;
        intents.jump = true;
    } else if gap_right > 0.0 && opponent.is_grounded() {
        intents.move_right = true;
    }

    let ball_above = ball_rect.bottom() - 10.0 < body.top();
    if ball_above
        && opponent.is_grounded()
        && (ball_rect.center().x - body.center().x).abs() < config.jump_window
    {
        intents.jump = true;
    }

    intents
}

/// Demo driver for the player side (idle mode and the headless runner)
///
/// Gets behind the ball and kicks it toward the right goal. A full bar goes
/// on vines while the ball is in the player's half and the level has them,
/// otherwise on a power shot.
pub fn autoplay(
    player: &Actor,
    ball_rect: &Rect,
    bar_full: bool,
    vines_enabled: bool,
    config: &AiConfig,
    field: &FieldConfig,
) -> Intents {
    let mut intents = Intents::default();
    if !player.in_control() {
        return intents;
    }

    let body = player.hitbox(field);
    let ball_low = ball_rect.bottom() > body.top();
    let gap_right = ball_rect.left() - body.right();

    if ball_rect.center().x < body.center().x {
        intents.move_left = true;
    } else if gap_right > config.kick_reach {
        intents.move_right = true;
    } else {
        intents.move_right = true;
        intents.kick = ball_low;
    }

    if bar_full && player.is_grounded() {
        intents.vine = vines_enabled && ball_rect.center().x < field.width / 2.0;
        intents.power = !intents.vine;
    }
    intents
}
