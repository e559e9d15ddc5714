//! Status effects and power-ups
//!
//! Owns every countdown in the session (effect slot, eagle boosts, stun,
//! freeze, invisibility, double score, lightning cooldown), the power-up
//! spawner and pickup handling.

use glam::Vec2;
use rand::Rng;

use super::collision::circles_overlap;
use super::evader::boost_for;
use super::state::{GameEvent, GameState, PowerUp, PowerUpKind, RoundPhase};
use crate::consts::*;
use crate::tuning::PowerUpWeight;

/// Decay every timer by `dt` ms. Runs in transition phases too.
pub fn tick_timers(state: &mut GameState, dt: f32) {
    if state.effect.tick(dt) {
        log::debug!("Decoy effect expired");
    }

    let status = &mut state.evader_status;
    status.chase_boost.tick(dt);
    status.defensive_boost.tick(dt);
    status.stun.tick(dt);
    status.freeze.tick(dt);

    state.decoy_invisible.tick(dt);
    state.double_score.tick(dt);
    state.lightning_flash.tick(dt);

    if state.lightning.tick(dt) {
        state.emit(GameEvent::AbilityReady);
    }

    state.evader_status.color = boost_for(state).color;
}

/// Current spawn interval: shorter once the eagle has scored, and per level
pub fn spawn_interval(state: &GameState) -> f32 {
    let tuning = &state.tuning;
    let base = tuning.powerup_spawn_interval_ms;
    let interval = if state.evader_score >= 2 {
        base / 1.5
    } else if state.evader_score > 0 {
        base / 1.25
    } else {
        base
    };
    interval * tuning.level(state.level).spawn_interval_scale
}

/// Accumulate time and drop a new power-up when the interval has passed
pub fn update_spawner(state: &mut GameState, dt: f32) -> Option<PowerUp> {
    state.spawn_timer_ms += dt;
    if state.spawn_timer_ms <= spawn_interval(state) || state.powerups.len() >= MAX_POWERUPS {
        return None;
    }
    state.spawn_timer_ms = 0.0;

    let area = state.field.spawn_area(POWERUP_SPAWN_MARGIN);
    let pos = uniform_in(&mut state.rng, area.min, area.max);
    let kind = draw_kind(&mut state.rng, &state.tuning.powerup_weights);
    let powerup = PowerUp {
        id: state.next_powerup_id(),
        pos,
        kind,
    };

    log::debug!("Spawned {:?} power-up #{} at {:?}", kind, powerup.id, pos);
    state.powerups.push(powerup.clone());
    state.emit(GameEvent::PowerUpSpawned { kind, pos });
    Some(powerup)
}

/// Uniform point in `[min, max)`, without panicking on an inverted range
fn uniform_in(rng: &mut impl Rng, min: Vec2, max: Vec2) -> Vec2 {
    Vec2::new(
        min.x + rng.random::<f32>() * (max.x - min.x),
        min.y + rng.random::<f32>() * (max.y - min.y),
    )
}

/// Weighted draw over the configured kinds
pub fn draw_kind(rng: &mut impl Rng, weights: &[PowerUpWeight]) -> PowerUpKind {
    let roll: f32 = rng.random();
    let mut acc = 0.0;
    for entry in weights {
        acc += entry.weight;
        if roll < acc {
            return entry.kind;
        }
    }
    // Float drift past the last bucket
    weights.last().map(|w| w.kind).unwrap_or(PowerUpKind::Shield)
}

/// Pick up every power-up the decoy's next position overlaps
///
/// Teleport moves `decoy_next` directly.
pub fn collect_powerups(state: &mut GameState, decoy_next: &mut Vec2) {
    let radius = state.decoy.radius;
    let (taken, kept): (Vec<_>, Vec<_>) = state
        .powerups
        .drain(..)
        .partition(|p| circles_overlap(*decoy_next, radius, p.pos, POWERUP_RADIUS));
    state.powerups = kept;

    for powerup in taken {
        apply_powerup(state, powerup.kind, decoy_next);
        state.emit(GameEvent::PowerUpCollected {
            kind: powerup.kind,
            pos: powerup.pos,
        });
    }
}

pub fn apply_powerup(state: &mut GameState, kind: PowerUpKind, decoy_next: &mut Vec2) {
    let duration = state.tuning.powerup_duration(kind);
    log::debug!("Decoy collected {:?}", kind);
    match kind {
        PowerUpKind::Speed | PowerUpKind::Shield => state.effect.set(kind, duration),
        PowerUpKind::Freeze => state.evader_status.freeze.start(duration),
        PowerUpKind::Teleport => {
            let bounds = state.field.ground_bounds(state.decoy.radius);
            *decoy_next = uniform_in(&mut state.rng, bounds.min, bounds.max);
        }
        PowerUpKind::Invisibility => state.decoy_invisible.start(duration),
        PowerUpKind::DoubleScore => state.double_score.start(duration),
    }
}

/// Fire the lightning ability: stun the eagle and start the cooldown
pub fn trigger_lightning(state: &mut GameState) -> bool {
    if state.phase != RoundPhase::Running {
        return false;
    }
    if !state.lightning.trigger(state.tuning.lightning_cooldown_ms) {
        return false;
    }

    let stun = state.tuning.lightning_stun_ms;
    let flash = state.tuning.lightning_flash_ms;
    state.evader_status.stun.start(stun);
    state.lightning_flash.start(flash);
    state.emit(GameEvent::AbilityTriggered);
    log::info!("Lightning! Eagle stunned for {} ms", stun);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::PlayField;
    use crate::tuning::Tuning;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn state() -> GameState {
        let mut s = GameState::new(42, Tuning::default(), PlayField::new(800.0, 600.0));
        s.phase = RoundPhase::Running;
        s
    }

    #[test]
    fn test_spawn_interval_shrinks_as_eagle_scores() {
        let mut s = state();
        assert_eq!(spawn_interval(&s), 8000.0);
        s.evader_score = 1;
        assert_eq!(spawn_interval(&s), 6400.0);
        s.evader_score = 2;
        assert!((spawn_interval(&s) - 8000.0 / 1.5).abs() < 1e-3);
        s.level = 2;
        assert!((spawn_interval(&s) - 8000.0 / 1.5 * 0.8).abs() < 1e-3);
    }

    #[test]
    fn test_spawner_respects_interval_and_cap() {
        let mut s = state();
        assert!(update_spawner(&mut s, 8000.0).is_none());
        let p = update_spawner(&mut s, 1.0).expect("spawn after interval");
        assert_eq!(s.spawn_timer_ms, 0.0);

        let area = s.field.spawn_area(POWERUP_SPAWN_MARGIN);
        assert!(area.contains(p.pos));

        for _ in 0..2 {
            update_spawner(&mut s, 8001.0);
        }
        assert_eq!(s.powerups.len(), MAX_POWERUPS);
        assert!(update_spawner(&mut s, 8001.0).is_none());
        assert_eq!(s.powerups.len(), MAX_POWERUPS);

        let ids: Vec<u32> = s.powerups.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_spawn_sequence_is_seeded() {
        let mut a = state();
        let mut b = state();
        for _ in 0..3 {
            assert_eq!(update_spawner(&mut a, 9000.0), update_spawner(&mut b, 9000.0));
        }
    }

    #[test]
    fn test_weighted_draw_covers_every_kind() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut counts = std::collections::HashMap::new();
        for _ in 0..20_000 {
            *counts.entry(draw_kind(&mut rng, &tuning.powerup_weights)).or_insert(0u32) += 1;
        }
        assert_eq!(counts.len(), 6);
        let shield = counts[&PowerUpKind::Shield] as f32 / 20_000.0;
        assert!((shield - 0.46875).abs() < 0.03);
    }

    #[test]
    fn test_pickup_overwrites_slot() {
        let mut s = state();
        let mut decoy = s.decoy.pos;
        s.effect.set(PowerUpKind::Speed, 500.0);
        s.powerups.push(PowerUp {
            id: 9,
            pos: decoy + Vec2::new(10.0, 0.0),
            kind: PowerUpKind::Shield,
        });
        collect_powerups(&mut s, &mut decoy);
        assert!(s.powerups.is_empty());
        assert!(s.effect.is(PowerUpKind::Shield));
        assert_eq!(s.effect.time_left, 2000.0);
        assert!(matches!(
            s.events.last(),
            Some(GameEvent::PowerUpCollected { kind: PowerUpKind::Shield, .. })
        ));
    }

    #[test]
    fn test_pickup_radius_is_strict() {
        let mut s = state();
        let mut decoy = Vec2::new(400.0, 300.0);
        s.powerups.push(PowerUp {
            id: 1,
            pos: decoy + Vec2::new(40.0, 0.0),
            kind: PowerUpKind::Speed,
        });
        collect_powerups(&mut s, &mut decoy);
        assert_eq!(s.powerups.len(), 1);
        assert!(s.effect.kind.is_none());
    }

    #[test]
    fn test_pickup_just_inside_radius_collects() {
        let mut s = state();
        let mut decoy = Vec2::new(400.0, 300.0);
        s.powerups.push(PowerUp {
            id: 1,
            pos: decoy + Vec2::new(39.9, 0.0),
            kind: PowerUpKind::Speed,
        });
        collect_powerups(&mut s, &mut decoy);
        assert!(s.powerups.is_empty());
        assert!(s.effect.is(PowerUpKind::Speed));
    }

    #[test]
    fn test_independent_timers_run_alongside_slot() {
        let mut s = state();
        let mut decoy = s.decoy.pos;
        s.effect.set(PowerUpKind::Speed, 2000.0);
        apply_powerup(&mut s, PowerUpKind::Freeze, &mut decoy);
        apply_powerup(&mut s, PowerUpKind::Invisibility, &mut decoy);
        apply_powerup(&mut s, PowerUpKind::DoubleScore, &mut decoy);
        assert!(s.effect.is(PowerUpKind::Speed));
        assert_eq!(s.evader_status.freeze.remaining(), 3000.0);
        assert_eq!(s.decoy_invisible.remaining(), 2000.0);
        assert_eq!(s.double_score.remaining(), 10_000.0);
        assert!(s.decoy_protected());

        tick_timers(&mut s, 2500.0);
        assert_eq!(s.effect.kind, None);
        assert!(!s.decoy_invisible.is_active());
        assert!(s.evader_status.freeze.is_active());
        assert!(s.double_score.is_active());
    }

    #[test]
    fn test_teleport_moves_decoy_onto_ground() {
        let mut s = state();
        let mut decoy = Vec2::new(-1000.0, -1000.0);
        apply_powerup(&mut s, PowerUpKind::Teleport, &mut decoy);
        assert!(s.field.ground_bounds(CAT_RADIUS).contains(decoy));
        assert_eq!(s.effect.kind, None);
    }

    #[test]
    fn test_lightning_stuns_and_cools_down() {
        let mut s = state();
        assert!(trigger_lightning(&mut s));
        assert!(!s.lightning.ready);
        assert_eq!(s.evader_status.stun.remaining(), 2000.0);
        assert!(!trigger_lightning(&mut s));

        tick_timers(&mut s, 2000.0);
        assert!(!s.evader_status.is_grounded());
        tick_timers(&mut s, 8000.0);
        assert!(s.lightning.ready);
        assert!(s.events.contains(&GameEvent::AbilityReady));
    }

    #[test]
    fn test_lightning_needs_running_phase() {
        let mut s = state();
        s.phase = RoundPhase::Paused;
        assert!(!trigger_lightning(&mut s));
        assert!(s.lightning.ready);
    }
}
