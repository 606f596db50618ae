//! Collision detection and response for circles against rectangles
//!
//! Every ball interaction in the match (goal bars, actor hitboxes, vines) is a
//! circle against an axis-aligned rectangle. Detection finds the closest point
//! on the rectangle; response pushes the circle out along the contact normal,
//! reflects the velocity, then damps each axis with its own bounce factor.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use crate::consts::CONTACT_EPSILON;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Closest point on the rectangle (if hit)
    pub point: Vec2,
    /// Unit normal pointing from the rectangle toward the circle center
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// How a collider responds to the ball
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactResponse {
    /// Multiplier on the reflected horizontal velocity
    pub horizontal_bounce: f32,
    /// Multiplier on the reflected vertical velocity
    pub vertical_bounce: f32,
    /// Below this speed after the bounce, `min_impulse` is added along the normal.
    /// Zero disables the floor.
    pub min_speed: f32,
    /// Per-axis magnitude of the anti-stick impulse
    pub min_impulse: Vec2,
}

impl ContactResponse {
    /// Perfect reflection, no speed floor (goal bars)
    pub const RIGID: Self = Self {
        horizontal_bounce: 1.0,
        vertical_bounce: 1.0,
        min_speed: 0.0,
        min_impulse: Vec2::ZERO,
    };

    /// Soft actor body: damped reflection with an anti-stick floor
    pub const ACTOR: Self = Self {
        horizontal_bounce: 0.5,
        vertical_bounce: 0.8,
        min_speed: 10.0,
        min_impulse: Vec2::new(8.0, 10.0),
    };
}

impl Default for ContactResponse {
    fn default() -> Self {
        Self::RIGID
    }
}

/// Tuning for the empowered actor contact
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerKickConfig {
    /// Uniform bounce factor applied after reflection
    pub bounce: f32,
    /// Extra multiplier on the bounced velocity
    pub strength: f32,
    /// Horizontal shove applied to the struck actor (pixels)
    pub actor_push: f32,
}

impl Default for PowerKickConfig {
    fn default() -> Self {
        Self {
            bounce: 0.5,
            strength: 2.0,
            actor_push: 80.0,
        }
    }
}

/// Check a circle against a rectangle
///
/// A center strictly inside the rectangle has no usable closest-point normal;
/// it is pushed out through the nearest edge instead, so the resolved circle
/// never keeps residual penetration.
pub fn circle_rect_contact(center: Vec2, radius: f32, rect: &Rect) -> CollisionResult {
    let closest = rect.closest_point(center);
    let delta = center - closest;
    let distance = delta.length();

    if distance >= radius {
        return CollisionResult::miss();
    }

    if delta == Vec2::ZERO {
        return inside_contact(center, radius, rect);
    }

    let normal = delta / distance.max(CONTACT_EPSILON);
    CollisionResult {
        hit: true,
        point: closest,
        normal: normal.normalize_or_zero(),
        penetration: radius - distance,
    }
}

/// Center on or inside the rectangle: exit through the nearest edge
fn inside_contact(center: Vec2, radius: f32, rect: &Rect) -> CollisionResult {
    let to_left = center.x - rect.left();
    let to_right = rect.right() - center.x;
    let to_top = center.y - rect.top();
    let to_bottom = rect.bottom() - center.y;

    let mut best = (to_top, Vec2::NEG_Y, Vec2::new(center.x, rect.top()));
    for candidate in [
        (to_bottom, Vec2::Y, Vec2::new(center.x, rect.bottom())),
        (to_left, Vec2::NEG_X, Vec2::new(rect.left(), center.y)),
        (to_right, Vec2::X, Vec2::new(rect.right(), center.y)),
    ] {
        if candidate.0 < best.0 {
            best = candidate;
        }
    }

    let (depth, normal, point) = best;
    CollisionResult {
        hit: true,
        point,
        normal,
        penetration: radius + depth,
    }
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Resolve a ball against a static or actor-owned rectangle
///
/// Reflects once, then scales each axis by its own bounce factor. The
/// asymmetric damping is part of the arcade feel, not a restitution model.
pub fn resolve_circle_rect(
    pos: &mut Vec2,
    vel: &mut Vec2,
    radius: f32,
    rect: &Rect,
    response: &ContactResponse,
) -> CollisionResult {
    let result = circle_rect_contact(*pos, radius, rect);
    if !result.hit {
        return result;
    }

    *pos += result.normal * result.penetration;

    let reflected = reflect_velocity(*vel, result.normal);
    *vel = Vec2::new(
        reflected.x * response.horizontal_bounce,
        reflected.y * response.vertical_bounce,
    );

    if response.min_speed > 0.0 && vel.length() < response.min_speed {
        *vel += result.normal * response.min_impulse;
    }

    result
}

/// Resolve an empowered kick against an actor's hitbox
///
/// Separate from `resolve_circle_rect`: the ball leaves harder and the struck
/// actor is shoved horizontally against the ball's incoming direction.
/// Returns the horizontal shove to apply to the actor, or `None` on a miss.
pub fn resolve_power_kick(
    pos: &mut Vec2,
    vel: &mut Vec2,
    radius: f32,
    actor_rect: &Rect,
    config: &PowerKickConfig,
) -> Option<f32> {
    let incoming_vx = vel.x;
    let result = circle_rect_contact(*pos, radius, actor_rect);
    if !result.hit {
        return None;
    }

    *pos += result.normal * result.penetration;
    *vel = reflect_velocity(*vel, result.normal) * config.bounce * config.strength;

    // A ball with no horizontal motion shoves the actor away from the contact side
    let direction = if incoming_vx != 0.0 {
        -incoming_vx.signum()
    } else if result.normal.x != 0.0 {
        -result.normal.x.signum()
    } else {
        0.0
    };

    Some(direction * config.actor_push)
}

/// Push a circle out of a static rectangle without bouncing it
///
/// Only the velocity component pointing into the rectangle is removed. When
/// the exit through the bottom edge would sink the circle below `floor_y`, it
/// leaves through the nearer side instead.
pub fn separate_circle_rect(pos: &mut Vec2, vel: &mut Vec2, radius: f32, rect: &Rect, floor_y: f32) -> bool {
    let result = circle_rect_contact(*pos, radius, rect);
    if !result.hit {
        return false;
    }

    let (normal, depth) = if result.normal.y > 0.0 && pos.y + result.penetration > floor_y {
        let to_left = pos.x - (rect.left() - radius);
        let to_right = rect.right() + radius - pos.x;
        if to_left <= to_right {
            (Vec2::NEG_X, to_left)
        } else {
            (Vec2::X, to_right)
        }
    } else {
        (result.normal, result.penetration)
    };

    *pos += normal * depth;
    let into = vel.dot(normal);
    if into < 0.0 {
        *vel -= normal * into;
    }
    true
}

/// Force a rebound in a fixed horizontal direction
///
/// Vines do not reflect symmetrically: whatever the approach, the ball leaves
/// toward `outward` (+1 right, -1 left). `jitter` comes from the seeded RNG.
pub fn redirect_outward(
    vel: Vec2,
    outward: f32,
    speed_scale: f32,
    min_speed: f32,
    fall_scale: f32,
    lift: f32,
    jitter: Vec2,
) -> Vec2 {
    let vx = (vel.x.abs() * speed_scale).max(min_speed) + jitter.x.abs();
    let vy = if vel.y > 0.0 {
        -vel.y.abs() * fall_scale
    } else {
        -lift
    };
    Vec2::new(vx * outward.signum(), vy + jitter.y)
}
