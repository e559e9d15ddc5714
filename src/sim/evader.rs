//! Eagle AI
//!
//! Each tick the eagle picks a target and a nominal speed (run from a shielded
//! decoy, run from a nearby interceptor, or dive at the decoy), then a
//! [`SteeringPolicy`] turns that intent into a new velocity. The shipped
//! policy, [`SmoothedPursuit`], limits turn rate and blends velocity so the
//! eagle flies curved, inertial paths instead of snapping toward its target.

use glam::Vec2;

use super::state::{EvaderColor, EvaderMode, GameEvent, GameState, PowerUpKind};
use crate::tuning::Tuning;
use crate::{heading, normalize_angle, unit_from_heading};

/// Speed multiplier at the outer edge of the close band
const CLOSE_BAND_OUTER_MULTIPLIER: f32 = 0.6;
/// Closer than this to the target, the eagle keeps its current heading
const MIN_TARGET_DISTANCE: f32 = 0.1;
/// Below this speed a velocity has no usable heading
const MIN_HEADING_SPEED: f32 = 0.01;

/// Where the eagle wants to go this tick and how fast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intent {
    pub target: Vec2,
    pub speed: f32,
    pub mode: EvaderMode,
}

/// Boost multipliers for one tick
///
/// `motion` is what actually scales speed (chase boost wins over defensive);
/// `display` is `max(chase, defensive)` times the shield factor. The two can
/// disagree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boost {
    pub motion: f32,
    pub display: f32,
    pub color: EvaderColor,
}

/// Turns an [`Intent`] into the eagle's next velocity
pub trait SteeringPolicy: std::fmt::Debug {
    fn steer(&self, pos: Vec2, vel: Vec2, intent: &Intent, tuning: &Tuning) -> Vec2;
}

/// Turn-rate-limited, acceleration-smoothed pursuit
#[derive(Debug, Clone, Copy, Default)]
pub struct SmoothedPursuit;

impl SmoothedPursuit {
    /// Slow down near the target so cats get an escape window, never below the floor
    pub fn damped_speed(&self, target_dist: f32, nominal: f32, tuning: &Tuning) -> f32 {
        let very_close = tuning.evader_very_close_distance;
        let close = tuning.evader_close_distance;
        let inner = tuning.evader_close_speed_multiplier;

        let speed = if target_dist < very_close {
            let capped = nominal
                .min(tuning.evader_base_speed * tuning.evader_very_close_max_speed_multiplier);
            let factor = (target_dist / very_close).max(0.1);
            capped * (inner + (CLOSE_BAND_OUTER_MULTIPLIER - inner) * factor)
        } else if target_dist < close {
            let factor = (target_dist - very_close) / (close - very_close);
            nominal * (inner + (CLOSE_BAND_OUTER_MULTIPLIER - inner) * factor)
        } else {
            nominal
        };

        speed.max(tuning.evader_min_speed)
    }
}

impl SteeringPolicy for SmoothedPursuit {
    fn steer(&self, pos: Vec2, vel: Vec2, intent: &Intent, tuning: &Tuning) -> Vec2 {
        let to_target = intent.target - pos;
        let target_dist = to_target.length();
        let speed = self.damped_speed(target_dist, intent.speed, tuning);

        let current_speed = vel.length();
        let desired_dir = if target_dist > MIN_TARGET_DISTANCE {
            to_target / target_dist
        } else if current_speed > MIN_HEADING_SPEED {
            vel / current_speed
        } else {
            Vec2::ZERO
        };
        let current_dir = if current_speed > MIN_HEADING_SPEED {
            vel / current_speed
        } else {
            Vec2::ZERO
        };

        // Limit how far the heading may swing this tick
        let current_angle = heading(current_dir);
        let turn = normalize_angle(heading(desired_dir) - current_angle)
            .clamp(-tuning.evader_max_turn_rate, tuning.evader_max_turn_rate);
        let desired_vel = unit_from_heading(current_angle + turn) * speed;

        let mut next = vel + (desired_vel - vel) * tuning.evader_acceleration;

        let next_speed = next.length();
        if next_speed > tuning.evader_max_velocity {
            next = next / next_speed * tuning.evader_max_velocity;
        } else if next_speed > MIN_HEADING_SPEED && next_speed < tuning.evader_min_speed {
            next = next / next_speed * tuning.evader_min_speed;
        }
        next
    }
}

/// Resolve this tick's boost multipliers from the eagle's timers
pub fn boost_for(state: &GameState) -> Boost {
    let tuning = &state.tuning;
    let status = &state.evader_status;
    let chase = tuning.level(state.level).chase_boost_multiplier;

    let (motion, color) = if status.chase_boost.is_active() {
        (chase, EvaderColor::Green)
    } else if status.defensive_boost.is_active() {
        (tuning.defensive_boost_multiplier, EvaderColor::Red)
    } else {
        (1.0, EvaderColor::Default)
    };

    let chase_display = if status.chase_boost.is_active() { chase } else { 1.0 };
    let defensive_display = if status.defensive_boost.is_active() {
        tuning.defensive_boost_multiplier
    } else {
        1.0
    };
    let shield = if state.effect.is(PowerUpKind::Shield) {
        tuning.shield_evasion_multiplier
    } else {
        1.0
    };

    Boost {
        motion,
        display: chase_display.max(defensive_display) * shield,
        color,
    }
}

/// Pick a target and nominal speed
///
/// The eagle reacts to the decoy's *next* position but the interceptor's
/// *current* one.
pub fn choose_intent(state: &GameState, decoy_next: Vec2, boost: f32) -> Intent {
    let tuning = &state.tuning;
    let eagle = state.evader.pos;
    let reach = Vec2::new(state.field.width, state.field.height);
    let base = tuning.evader_base_speed;

    if state.effect.is(PowerUpKind::Shield) {
        let away = unit_from_heading(heading(eagle - decoy_next));
        return Intent {
            target: eagle + away * reach,
            speed: base * boost * tuning.shield_evasion_multiplier,
            mode: EvaderMode::EvadingShield,
        };
    }

    let to_interceptor = state.interceptor.pos - eagle;
    if to_interceptor.length() < tuning.evasion_range {
        let away = unit_from_heading(heading(to_interceptor) + std::f32::consts::PI);
        return Intent {
            target: eagle + away * reach,
            speed: base * tuning.interceptor_evasion_multiplier * boost,
            mode: EvaderMode::EvadingInterceptor,
        };
    }

    Intent {
        target: decoy_next,
        speed: base * boost,
        mode: EvaderMode::SeekingDecoy,
    }
}

/// Arm the boosts from proximity and flag the "decoy scared" edge
fn update_proximity(state: &mut GameState, decoy_next: Vec2) {
    let eagle = state.evader.pos;
    let dist_interceptor = state.interceptor.pos.distance(eagle);
    let dist_decoy = decoy_next.distance(eagle);
    let tuning = &state.tuning;

    let scared = dist_decoy < tuning.evasion_range;
    let newly_scared = scared && !state.decoy_scared;

    let near_decoy = dist_decoy < tuning.decoy_boost_range;
    if near_decoy && !state.evader_status.near_decoy {
        state.evader_status.chase_boost.start(tuning.chase_boost_ms);
    }
    state.evader_status.near_decoy = near_decoy;

    // Re-armed every tick while the interceptor is close
    if dist_interceptor < tuning.interceptor_boost_range {
        state
            .evader_status
            .defensive_boost
            .start(tuning.defensive_boost_ms);
    }

    state.decoy_scared = scared;
    if newly_scared {
        state.emit(GameEvent::DecoyScared);
    }
}

/// Advance the eagle one tick. Returns its tentative next position.
pub fn update_evader(
    state: &mut GameState,
    decoy_next: Vec2,
    frame_multiplier: f32,
    policy: &dyn SteeringPolicy,
) -> Vec2 {
    let boost = boost_for(state);
    state.evader_status.color = boost.color;

    if !state.evader_status.visible {
        return state.evader.pos;
    }
    if state.evader_status.is_grounded() {
        state.evader_status.mode = if state.evader_status.freeze.is_active() {
            EvaderMode::Frozen
        } else {
            EvaderMode::Stunned
        };
        state.evader.vel = Vec2::ZERO;
        return state.evader.pos;
    }

    update_proximity(state, decoy_next);

    let intent = choose_intent(state, decoy_next, boost.motion);
    state.evader_status.mode = intent.mode;

    let vel = policy.steer(state.evader.pos, state.evader.vel, &intent, &state.tuning);
    let bounds = state.field.air_bounds(state.evader.radius);
    let clamped = bounds.clamp(state.evader.pos + vel * frame_multiplier);

    state.evader.vel = Vec2::new(
        if clamped.hit_x { 0.0 } else { vel.x },
        if clamped.hit_y { 0.0 } else { vel.y },
    );
    clamped.pos
}
