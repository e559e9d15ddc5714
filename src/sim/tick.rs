//! Per-frame simulation tick
//!
//! Advances the session by one variable-length frame. Stage order:
//! timers, deferred outcomes, day cycle, spawner, interceptor, decoy,
//! cat separation, eagle, trail, pickups, captures, commit.

use glam::Vec2;

use super::collision::{circles_overlap, separate_pair};
use super::effects;
use super::evader::{SteeringPolicy, update_evader};
use super::field::PlayField;
use super::input::seek_velocity;
use super::scoring;
use super::state::{Body, CaptureKind, DayCycle, GameState, PowerUpKind, RoundPhase};
use crate::consts::*;

/// Convert a frame delta to the 60 Hz movement multiplier
#[inline]
pub fn frame_multiplier(dt_ms: f32) -> f32 {
    dt_ms / REFERENCE_FRAME_MS
}

/// Advance the game state by `dt_ms` milliseconds
pub fn tick(state: &mut GameState, dt_ms: f32, steering: &dyn SteeringPolicy) {
    if state.field.is_degenerate() {
        log::trace!("Skipping tick, play field not laid out");
        return;
    }
    if !state.phase.wants_frames() {
        return;
    }
    let dt = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };

    state.clock_ms += dt;
    effects::tick_timers(state, dt);
    scoring::resolve_due(state);

    // Transitions keep their timers running but freeze everything else
    if state.phase != RoundPhase::Running {
        return;
    }

    let fm = frame_multiplier(dt);
    state.day_cycle = DayCycle::at(state.elapsed_ms, state.tuning.day_cycle_ms);
    effects::update_spawner(state, dt);

    // Interceptor follows the pointer once the player has moved Pluto
    state.interceptor.vel = match (state.autopilot_armed, state.controls.pointer) {
        (true, Some(target)) => seek_velocity(
            state.interceptor.pos,
            target,
            state.tuning.interceptor_speed,
            state.interceptor.radius,
        ),
        _ => Vec2::ZERO,
    };
    let mut interceptor_next = step_ground(&mut state.interceptor, &state.field, fm);

    let decoy_speed = if state.effect.is(PowerUpKind::Speed) {
        state.tuning.decoy_speed * state.tuning.decoy_speed_boost
    } else {
        state.tuning.decoy_speed
    };
    state.decoy.vel = state.controls.decoy_velocity(decoy_speed);
    let mut decoy_next = step_ground(&mut state.decoy, &state.field, fm);

    // Push the cats apart, then put them back on the ground
    if separate_pair(
        &mut interceptor_next,
        state.interceptor.radius,
        &mut decoy_next,
        state.decoy.radius,
    ) {
        let field = &state.field;
        interceptor_next = field
            .ground_bounds(state.interceptor.radius)
            .clamp(interceptor_next)
            .pos;
        decoy_next = field.ground_bounds(state.decoy.radius).clamp(decoy_next).pos;
    }

    let evader_next = update_evader(state, decoy_next, fm, steering);

    let status = &mut state.evader_status;
    let trail_due = state.clock_ms - status.last_trail_ms >= state.tuning.trail_interval_ms;
    if status.is_boosted() && trail_due {
        status.record_trail(state.evader.pos, state.clock_ms);
    }

    effects::collect_powerups(state, &mut decoy_next);

    if detect_capture(state, interceptor_next, decoy_next, evader_next) {
        return;
    }

    state.interceptor.pos = interceptor_next;
    state.decoy.pos = decoy_next;
    state.evader.pos = evader_next;
}

/// Integrate a cat for one frame, zeroing the velocity on any clamped axis
fn step_ground(body: &mut Body, field: &PlayField, fm: f32) -> Vec2 {
    let clamped = field.ground_bounds(body.radius).clamp(body.pos + body.vel * fm);
    if clamped.hit_x {
        body.vel.x = 0.0;
    }
    if clamped.hit_y {
        body.vel.y = 0.0;
    }
    clamped.pos
}

/// Interceptor contact is checked first, so a double capture favours the player
fn detect_capture(state: &mut GameState, interceptor: Vec2, decoy: Vec2, evader: Vec2) -> bool {
    if !state.evader_status.visible {
        return false;
    }
    let eagle_r = state.evader.radius;

    if circles_overlap(interceptor, state.interceptor.radius, evader, eagle_r) {
        scoring::player_capture(state, CaptureKind::Interceptor, evader);
        return true;
    }

    if circles_overlap(decoy, state.decoy.radius, evader, eagle_r) {
        if state.decoy_protected() {
            scoring::player_capture(state, CaptureKind::ProtectedDecoy, evader);
        } else {
            scoring::evader_capture(state);
        }
        return true;
    }

    false
}
