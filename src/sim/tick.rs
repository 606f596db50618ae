//! Fixed timestep simulation tick
//!
//! Core match loop that advances the simulation deterministically. One call
//! is one 60 Hz step; every subsystem runs in a fixed order.

use super::ai;
use super::actor::{Action, Intents};
use super::arena::{ArenaSignal, GoalEvent};
use super::ball::{ActorContact, BallEnv, BallMode, Side, TouchEvent, TouchKind};
use super::clock::PauseReason;
use super::state::GameState;
use crate::audio::{AudioEvent, AudioSink};
use crate::settings::OpponentPower;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Player intents for this tick
    pub player: Intents,
    /// Pause toggle
    pub pause: bool,
    /// Idle/demo mode - AI plays the player side too
    pub idle_mode: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32, sink: &mut dyn AudioSink) {
    // Handle pause toggle
    if input.pause {
        state.paused = !state.paused;
        log::debug!("paused: {}", state.paused);
    }

    // Don't tick if paused or the match is over
    if state.paused || state.arena.is_finished() {
        return;
    }

    state.time += dt;
    state.time_ticks += 1;

    match state.arena.advance(state.time) {
        ArenaSignal::None => {}
        ArenaSignal::CelebrationOver => log::debug!("celebration over, resetting"),
        ArenaSignal::ResetDue => {
            state.reset_after_goal();
            state.arena.finish_reset(state.time);
        }
        ArenaSignal::TimeUp(outcome) => {
            log::info!("match over: {:?}", outcome);
            state.end_power_shot();
            sink.emit(AudioEvent::TimeUp);
            return;
        }
    }

    if !state.arena.is_ongoing() {
        return;
    }

    let field = state.config.field.clone();

    // === Player ===
    let intents = if input.idle_mode {
        ai::autoplay(
            &state.player,
            &state.ball.rect(),
            state.player_bar.is_full(),
            state.config.vines.enabled,
            &state.config.ai,
            &field,
        )
    } else {
        input.player
    };

    if !state.power_shot.is_active() {
        state.player.apply(&intents, &state.config.player, &field);
    }

    if intents.power
        && state.power_shot.activate(
            &mut state.player_bar,
            &mut state.player,
            &mut state.ball,
            &state.config.power_shot,
            &field,
        )
    {
        state.arena.clock.pause(PauseReason::PowerShot, state.time);
        state.opponent.freeze();
    }

    if intents.vine
        && state.player.in_control()
        && state
            .vines
            .activate(&mut state.player_bar, &state.config.vines, &field, &mut state.rng)
    {
        sink.emit(AudioEvent::VineActivated);
    }

    // === Opponent ===
    let opponent_intents = ai::chase(&state.opponent, &state.ball.rect(), &state.config.ai, &field);
    state.opponent.apply(&opponent_intents, &state.config.opponent, &field);

    if !state.opponent.frozen && !state.power_shot.is_active() && state.opponent_bar.is_full() {
        let triggered = state.opponent_powers.try_trigger(
            &mut state.opponent_bar,
            &state.config.opponent_powers,
            &mut state.ball,
            &state.config.ball,
        );
        match triggered {
            Some(OpponentPower::GroundFire) => sink.emit(AudioEvent::GroundFire),
            Some(OpponentPower::Meteor) => sink.emit(AudioEvent::Meteor),
            Some(OpponentPower::PowerKick) | None => {}
        }
    }

    // === Powers ===
    let shot = state.power_shot.update(
        &mut state.player,
        &mut state.ball,
        &state.config.ball,
        &state.config.power_shot,
        &field,
    );
    if shot.fired {
        state.arena.record_touch(&TouchEvent {
            side: Side::Player,
            kind: TouchKind::PowerShot,
        });
        sink.emit(AudioEvent::PowerShotFired);
    }
    if shot.ended {
        state.opponent.land();
        state.end_power_shot();
    }

    let powers = state
        .opponent_powers
        .update(&mut state.player, &mut state.ball, &state.config.opponent_powers);
    if powers.player_killed {
        sink.emit(AudioEvent::Hurt);
    }
    if let Some(ended) = powers.ended {
        log::debug!("opponent power {:?} ended", ended);
    }

    // === Ball ===
    let carrying = state.power_shot.is_carrying();
    let dead = !carrying && step_ball(state, sink);

    // === Scoring ===
    let scoring_suspended = carrying || state.ball.mode == BallMode::MeteorLocked;
    if !scoring_suspended {
        let rolling = state
            .ball
            .is_near_ground(&field, state.config.goals.rolling_ground_tolerance);
        let goal = state
            .arena
            .update_score(&state.ball.rect(), rolling, state.time, &mut state.rng);
        match goal {
            Some(GoalEvent::Scored { .. }) => {
                sink.emit(AudioEvent::GoalScored);
                state.end_power_shot();
                state.pause_abilities();
            }
            Some(GoalEvent::NoScore { .. }) => {
                sink.emit(AudioEvent::Whistle);
                state.end_power_shot();
                state.pause_abilities();
            }
            None => {
                if dead && state.reset_dead_ball() {
                    log::debug!("dead ball at tick {}", state.time_ticks);
                    sink.emit(AudioEvent::Whistle);
                }
            }
        }
    }

    state.player_bar.advance(dt);
    state.opponent_bar.advance(dt);
    state.vines.update();
}

/// Move the ball one tick against both actors, the goal bars and any vines.
/// Returns true when the ball ended up out of play.
fn step_ball(state: &mut GameState, sink: &mut dyn AudioSink) -> bool {
    let config = &state.config;
    let field = &config.field;

    let mut actors = Vec::with_capacity(2);
    for (actor, actor_config) in [(&state.player, &config.player), (&state.opponent, &config.opponent)] {
        if actor.action == Action::Dead {
            continue;
        }
        actors.push(ActorContact {
            side: actor.side,
            hitbox: actor.hitbox(field),
            kicking: actor.is_kicking(),
            facing_left: actor.facing_left,
            touch: &actor_config.touch,
        });
    }
    let vines = state.vines.colliders();

    let env = BallEnv {
        field,
        contacts: &config.contacts,
        bars: &state.bars,
        actors: &actors,
        vines: &vines,
        vine: &config.vines,
        vine_owner: Side::Player,
        power_kick_active: state.opponent_powers.power_kick_active(),
        shooter_locked: state.power_shot.animation_locked(),
    };
    let step = state.ball.update(&config.ball, &env, &mut state.rng);

    for touch in &step.touches {
        state.arena.record_touch(touch);
        if touch.kind != TouchKind::Vine {
            sink.emit(AudioEvent::BallKick);
        }
    }
    if step.ground_impact {
        sink.emit(AudioEvent::BallGroundBounce);
    }
    if step.wall_hit {
        sink.emit(AudioEvent::WallBounce);
    }
    if let Some(dx) = step.player_push {
        state.player.push(dx, field);
        state.player.hurt(config.player.hurt_ticks);
        sink.emit(AudioEvent::Hurt);
    }
    step.dead
}
