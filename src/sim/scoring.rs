//! Round and score state machine
//!
//! Captures freeze the round and queue a [`Deferred`] outcome. When the
//! outcome lands it moves the scores, and then either starts the next round,
//! begins the level-up pause, or ends the game.

use glam::Vec2;

use super::state::{
    CaptureKind, ComboState, DayCycle, Deferred, GameEvent, GameState, LightningAbility, Message,
    MessageKind, PowerUpKind, RoundPhase,
};

pub const READY_MESSAGE: &str = "Move Pluto with Arrow Keys to begin!";
pub const PAUSED_MESSAGE: &str = "Game Paused";
pub const LEVEL_UP_MESSAGE: &str = "Level 2!";

/// Put the bodies back on their marks without touching scores, level or combo
pub fn reset_round(state: &mut GameState) {
    let field = state.field;
    state.interceptor.pos = field.interceptor_start();
    state.interceptor.vel = Vec2::ZERO;
    state.decoy.pos = field.decoy_start();
    state.decoy.vel = Vec2::ZERO;
    state.evader.pos = field.evader_start();
    state.evader.vel = Vec2::ZERO;

    state.controls.release_all();
    state.effect.clear();
    state.powerups.clear();
    state.spawn_timer_ms = 0.0;
    state.decoy_scared = false;

    let status = &mut state.evader_status;
    status.visible = true;
    status.chase_boost.clear();
    status.defensive_boost.clear();
    status.stun.clear();
    status.color = Default::default();
    status.mode = Default::default();
    status.near_decoy = false;
    status.trail.clear();
    status.last_trail_ms = 0.0;

    let dropped = state.deferred.cancel_all();
    if dropped > 0 {
        log::debug!("Round reset dropped {} pending outcome(s)", dropped);
    }

    if state.phase.is_transition() {
        state.phase = RoundPhase::Running;
    }
}

/// Start a new game. High score survives.
pub fn reset_game(state: &mut GameState, auto_start: bool) {
    state.level = 1;
    state.player_score = 0;
    state.evader_score = 0;
    state.elapsed_ms = 0.0;
    state.clock_ms = 0.0;
    state.day_cycle = DayCycle::Day;
    state.combo = ComboState::default();

    state.evader_status.freeze.clear();
    state.decoy_invisible.clear();
    state.double_score.clear();
    state.lightning = LightningAbility::default();
    state.lightning_flash.clear();
    state.explosions.clear();
    state.autopilot_armed = false;

    reset_round(state);

    if auto_start {
        state.message = None;
        state.phase = RoundPhase::Running;
        state.emit(GameEvent::GameStarted);
    } else {
        state.message = Some(Message::info(READY_MESSAGE));
        state.phase = RoundPhase::Ready;
    }
    log::info!("New game (auto start: {})", auto_start);
}

/// Leave the ready screen
pub fn start(state: &mut GameState) -> bool {
    if state.phase != RoundPhase::Ready {
        return false;
    }
    state.phase = RoundPhase::Running;
    state.message = None;
    state.emit(GameEvent::GameStarted);
    log::info!("Game started");
    true
}

/// Running ⇄ paused. Other phases ignore the request.
pub fn toggle_pause(state: &mut GameState) -> bool {
    match state.phase {
        RoundPhase::Running => {
            state.phase = RoundPhase::Paused;
            state.message = Some(Message::info(PAUSED_MESSAGE));
            state.emit(GameEvent::Paused);
            log::info!("Paused");
            true
        }
        RoundPhase::Paused => {
            state.phase = RoundPhase::Running;
            state.message = None;
            state.emit(GameEvent::Resumed);
            log::info!("Resumed");
            true
        }
        _ => false,
    }
}

/// The interceptor, or a protected decoy, took down the eagle at `at`
pub fn player_capture(state: &mut GameState, kind: CaptureKind, at: Vec2) {
    let points = if state.double_score.is_active() { 2 } else { 1 };

    // A shield is spent on the catch; invisibility and other slot effects run on
    if kind == CaptureKind::ProtectedDecoy && state.effect.is(PowerUpKind::Shield) {
        state.effect.clear();
    }
    state.evader_status.visible = false;
    state.add_explosion(at);
    state.phase = RoundPhase::Transitioning;

    let delay = state.tuning.player_capture_delay_ms;
    state.deferred.schedule(state.clock_ms, delay, Deferred::PlayerCapture { points });
    state.emit(GameEvent::Capture(kind));
    log::info!("Eagle caught ({:?}), +{} pending", kind, points);
}

/// The eagle caught an unprotected decoy
pub fn evader_capture(state: &mut GameState) {
    state.phase = RoundPhase::Transitioning;

    let delay = state.tuning.evader_capture_delay_ms;
    state.deferred.schedule(state.clock_ms, delay, Deferred::EvaderCapture);
    state.emit(GameEvent::Capture(CaptureKind::Evader));
    log::info!("Pluto caught by the eagle");
}

/// Apply every outcome whose delay has run out
pub fn resolve_due(state: &mut GameState) {
    for outcome in state.deferred.take_due(state.clock_ms) {
        apply_deferred(state, outcome);
    }
}

pub fn apply_deferred(state: &mut GameState, outcome: Deferred) {
    match outcome {
        Deferred::PlayerCapture { points } => resolve_player_capture(state, points),
        Deferred::EvaderCapture => resolve_evader_capture(state),
        Deferred::FinishLevelTransition => {
            state.level = 2;
            state.message = None;
            reset_round(state);
            state.phase = RoundPhase::Running;
        }
    }
}

fn resolve_player_capture(state: &mut GameState, points: u32) {
    let now = state.clock_ms;
    if state.combo.register(now, &state.tuning) {
        let count = state.combo.count;
        state.emit(GameEvent::ComboExtended { count });
        log::debug!("Combo x{} ({:.1}x)", count, state.combo.multiplier);
    }

    state.player_score += points;
    let tuning = &state.tuning;

    if state.player_score >= tuning.victory_score {
        finish_game(state, MessageKind::Win);
    } else if state.player_score == tuning.level_transition_score && state.level == 1 {
        state.phase = RoundPhase::LevelTransition;
        state.message = Some(Message::info(LEVEL_UP_MESSAGE));
        let delay = tuning.level_transition_ms;
        state.deferred.schedule(now, delay, Deferred::FinishLevelTransition);
        state.emit(GameEvent::LevelUp { level: 2 });
        log::info!("Level up at {} points", state.player_score);
    } else {
        reset_round(state);
        state.phase = RoundPhase::Running;
    }
}

fn resolve_evader_capture(state: &mut GameState) {
    state.evader_score += 1;
    if state.evader_score >= state.tuning.game_over_score {
        finish_game(state, MessageKind::Lose);
    } else {
        reset_round(state);
        state.phase = RoundPhase::Running;
    }
}

fn finish_game(state: &mut GameState, kind: MessageKind) {
    state.phase = RoundPhase::GameOver;
    if state.elapsed_ms > state.high_score_ms {
        state.high_score_ms = state.elapsed_ms;
    }

    let headline = match kind {
        MessageKind::Win => "VICTORY!",
        _ => "GAME OVER!",
    };
    let text = format!(
        "{} Final Score: {} - {}",
        headline, state.player_score, state.evader_score
    );
    log::info!("{} (survived {:.1}s)", text, state.elapsed_ms / 1000.0);
    state.message = Some(Message { text, kind });

    state.emit(if kind == MessageKind::Win {
        GameEvent::Victory
    } else {
        GameEvent::Defeat
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::PlayField;
    use crate::tuning::Tuning;

    fn running() -> GameState {
        let mut s = GameState::new(3, Tuning::default(), PlayField::new(800.0, 600.0));
        start(&mut s);
        s
    }

    #[test]
    fn test_new_game_waits_for_input() {
        let s = GameState::new(3, Tuning::default(), PlayField::new(800.0, 600.0));
        assert_eq!(s.phase, RoundPhase::Ready);
        assert_eq!(s.message.as_ref().map(|m| m.text.as_str()), Some(READY_MESSAGE));
        assert!(s.evader_status.visible);
    }

    #[test]
    fn test_pause_round_trip() {
        let mut s = running();
        assert!(toggle_pause(&mut s));
        assert_eq!(s.phase, RoundPhase::Paused);
        assert_eq!(s.message.as_ref().map(|m| m.text.as_str()), Some(PAUSED_MESSAGE));
        assert!(toggle_pause(&mut s));
        assert_eq!(s.phase, RoundPhase::Running);
        assert!(s.message.is_none());

        s.phase = RoundPhase::GameOver;
        assert!(!toggle_pause(&mut s));
    }

    #[test]
    fn test_player_capture_waits_for_delay() {
        let mut s = running();
        let at = s.evader.pos;
        player_capture(&mut s, CaptureKind::Interceptor, at);
        assert!(!s.evader_status.visible);
        assert_eq!(s.explosions, vec![at]);
        assert_eq!(s.phase, RoundPhase::Transitioning);

        s.clock_ms += 999.0;
        resolve_due(&mut s);
        assert_eq!(s.player_score, 0);

        s.clock_ms += 1.0;
        resolve_due(&mut s);
        assert_eq!(s.player_score, 1);
        assert_eq!(s.phase, RoundPhase::Running);
        assert!(s.evader_status.visible);
        assert_eq!(s.evader.pos, s.field.evader_start());
    }

    #[test]
    fn test_double_score_is_read_at_capture() {
        let mut s = running();
        s.double_score.start(100.0);
        player_capture(&mut s, CaptureKind::Interceptor, Vec2::ZERO);
        s.double_score.clear();
        s.clock_ms += 1000.0;
        resolve_due(&mut s);
        assert_eq!(s.player_score, 2);
    }

    #[test]
    fn test_protected_capture_clears_shield() {
        let mut s = running();
        s.effect.set(PowerUpKind::Shield, 1500.0);
        player_capture(&mut s, CaptureKind::ProtectedDecoy, Vec2::ZERO);
        assert_eq!(s.effect.kind, None);
        assert_eq!(s.events.last(), Some(&GameEvent::Capture(CaptureKind::ProtectedDecoy)));
    }

    #[test]
    fn test_protected_capture_keeps_other_slot_effects() {
        let mut s = running();
        s.effect.set(PowerUpKind::Speed, 1500.0);
        s.decoy_invisible.start(2000.0);
        player_capture(&mut s, CaptureKind::ProtectedDecoy, Vec2::ZERO);
        assert!(s.effect.is(PowerUpKind::Speed));
        assert_eq!(s.effect.time_left, 1500.0);
    }

    #[test]
    fn test_level_transition_fires_once() {
        let mut s = running();
        s.player_score = 2;
        apply_deferred(&mut s, Deferred::PlayerCapture { points: 1 });
        assert_eq!(s.phase, RoundPhase::LevelTransition);
        assert_eq!(s.level, 1);
        assert!(s.events.contains(&GameEvent::LevelUp { level: 2 }));

        s.clock_ms += 1000.0;
        resolve_due(&mut s);
        assert_eq!(s.level, 2);
        assert_eq!(s.phase, RoundPhase::Running);
        assert!(s.evader_status.visible);

        s.events.clear();
        apply_deferred(&mut s, Deferred::PlayerCapture { points: 1 });
        assert_eq!(s.player_score, 4);
        assert_eq!(s.phase, RoundPhase::Running);
        assert!(!s.events.iter().any(|e| matches!(e, GameEvent::LevelUp { .. })));
    }

    #[test]
    fn test_level_transition_needs_exact_score() {
        let mut s = running();
        s.player_score = 2;
        apply_deferred(&mut s, Deferred::PlayerCapture { points: 2 });
        assert_eq!(s.player_score, 4);
        assert_eq!(s.level, 1);
        assert_eq!(s.phase, RoundPhase::Running);
    }

    #[test]
    fn test_victory_records_high_score() {
        let mut s = running();
        s.level = 2;
        s.player_score = 5;
        s.evader_score = 1;
        s.elapsed_ms = 42_000.0;
        s.high_score_ms = 30_000.0;
        apply_deferred(&mut s, Deferred::PlayerCapture { points: 1 });
        assert_eq!(s.phase, RoundPhase::GameOver);
        assert_eq!(s.high_score_ms, 42_000.0);
        let msg = s.message.clone().expect("victory message");
        assert_eq!(msg.text, "VICTORY! Final Score: 6 - 1");
        assert_eq!(msg.kind, MessageKind::Win);
        assert_eq!(s.events.last(), Some(&GameEvent::Victory));
    }

    #[test]
    fn test_evader_capture_to_game_over() {
        let mut s = running();
        s.player_score = 1;
        for expected in 1..=2 {
            evader_capture(&mut s);
            s.clock_ms += 199.0;
            resolve_due(&mut s);
            assert_eq!(s.evader_score, expected - 1);
            s.clock_ms += 1.0;
            resolve_due(&mut s);
            assert_eq!(s.evader_score, expected);
            assert_eq!(s.phase, RoundPhase::Running);
        }

        s.elapsed_ms = 5_000.0;
        evader_capture(&mut s);
        s.clock_ms += 200.0;
        resolve_due(&mut s);
        assert_eq!(s.phase, RoundPhase::GameOver);
        let msg = s.message.clone().expect("defeat message");
        assert_eq!(msg.text, "GAME OVER! Final Score: 1 - 3");
        assert_eq!(msg.kind, MessageKind::Lose);
        assert_eq!(s.high_score_ms, 5_000.0);
    }

    #[test]
    fn test_combo_counts_resolved_captures() {
        let mut s = running();
        apply_deferred(&mut s, Deferred::PlayerCapture { points: 1 });
        s.clock_ms += 4000.0;
        apply_deferred(&mut s, Deferred::PlayerCapture { points: 1 });
        assert_eq!(s.combo.count, 2);
        assert!((s.combo.multiplier - 1.4).abs() < 1e-5);
        assert!(s.events.contains(&GameEvent::ComboExtended { count: 2 }));
    }

    #[test]
    fn test_round_reset_keeps_progress() {
        let mut s = running();
        s.player_score = 2;
        s.evader_score = 1;
        s.level = 2;
        s.elapsed_ms = 9000.0;
        s.combo.count = 2;
        s.effect.set(PowerUpKind::Speed, 900.0);
        s.evader_status.stun.start(500.0);
        s.evader_status.chase_boost.start(500.0);
        s.controls.keys.left = true;
        evader_capture(&mut s);

        reset_round(&mut s);
        assert_eq!((s.player_score, s.evader_score, s.level), (2, 1, 2));
        assert_eq!(s.elapsed_ms, 9000.0);
        assert_eq!(s.combo.count, 2);
        assert_eq!(s.effect.kind, None);
        assert!(!s.evader_status.is_grounded());
        assert!(!s.evader_status.is_boosted());
        assert!(!s.controls.keys.any());
        assert!(s.deferred.is_empty());
        assert_eq!(s.phase, RoundPhase::Running);
    }

    #[test]
    fn test_full_reset_is_idempotent() {
        let mut s = running();
        s.player_score = 4;
        s.level = 2;
        s.high_score_ms = 12_345.0;
        s.lightning.trigger(10_000.0);
        s.add_explosion(Vec2::ONE);
        s.double_score.start(5000.0);

        reset_game(&mut s, false);
        let first = format!("{:?}", s);
        reset_game(&mut s, false);
        let second = format!("{:?}", s);
        assert_eq!(first, second);

        assert_eq!((s.player_score, s.level), (0, 1));
        assert_eq!(s.phase, RoundPhase::Ready);
        assert!(s.evader_status.visible);
        assert!(s.powerups.is_empty());
        assert!(s.lightning.ready);
        assert!(s.explosions.is_empty());
        assert_eq!(s.high_score_ms, 12_345.0);
    }
}
