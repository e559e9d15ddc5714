//! Read-only view of a session for rendering and audio collaborators

use glam::Vec2;
use serde::Serialize;

use crate::sim::evader::boost_for;
use crate::sim::{
    ComboState, DayCycle, EffectSlot, EvaderColor, EvaderMode, GameState, LightningAbility,
    Message, PlayField, PowerUp, PowerUpKind, RoundPhase, TrailPoint,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub phase: RoundPhase,
    pub level: u32,
    pub player_score: u32,
    pub evader_score: u32,
    pub elapsed_ms: f32,
    pub high_score_ms: f32,
    pub day_cycle: DayCycle,
    pub message: Option<Message>,
    pub field: PlayField,
    pub water_line: f32,

    pub interceptor: Vec2,
    pub decoy: Vec2,
    pub evader: Vec2,

    pub evader_visible: bool,
    pub evader_frozen: bool,
    pub evader_stunned: bool,
    pub evader_color: EvaderColor,
    pub evader_mode: EvaderMode,
    /// Speed multiplier shown next to the eagle
    pub evader_boost: f32,
    pub trail: Vec<TrailPoint>,

    pub decoy_invisible: bool,
    pub decoy_shielded: bool,
    pub decoy_scared: bool,
    pub effect: EffectSlot,
    pub double_score: bool,
    pub lightning: LightningAbility,
    pub lightning_flash: bool,
    pub combo: ComboState,

    pub powerups: Vec<PowerUp>,
    pub explosions: Vec<Vec2>,
}

impl Snapshot {
    pub fn capture(state: &GameState) -> Self {
        let status = &state.evader_status;
        Self {
            phase: state.phase,
            level: state.level,
            player_score: state.player_score,
            evader_score: state.evader_score,
            elapsed_ms: state.elapsed_ms,
            high_score_ms: state.high_score_ms,
            day_cycle: state.day_cycle,
            message: state.message.clone(),
            field: state.field,
            water_line: state.field.water_line(),

            interceptor: state.interceptor.pos,
            decoy: state.decoy.pos,
            evader: state.evader.pos,

            evader_visible: status.visible,
            evader_frozen: status.freeze.is_active(),
            evader_stunned: status.stun.is_active(),
            evader_color: status.color,
            evader_mode: status.mode,
            evader_boost: boost_for(state).display,
            trail: status.trail.clone(),

            decoy_invisible: state.decoy_invisible.is_active(),
            decoy_shielded: state.effect.is(PowerUpKind::Shield),
            decoy_scared: state.decoy_scared,
            effect: state.effect,
            double_score: state.double_score.is_active(),
            lightning: state.lightning,
            lightning_flash: state.lightning_flash.is_active(),
            combo: state.combo,

            powerups: state.powerups.clone(),
            explosions: state.explosions.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;

    #[test]
    fn test_snapshot_mirrors_state() {
        let mut state = GameState::new(5, Tuning::default(), PlayField::new(800.0, 600.0));
        state.effect.set(PowerUpKind::Shield, 1200.0);
        state.evader_status.chase_boost.start(1000.0);

        let snap = Snapshot::capture(&state);
        assert_eq!(snap.phase, RoundPhase::Ready);
        assert_eq!(snap.decoy, state.field.decoy_start());
        assert!(snap.decoy_shielded);
        assert_eq!(snap.water_line, 480.0);
        assert!((snap.evader_boost - 1.8 * 1.2).abs() < 1e-5);
        assert!(snap.message.is_some());
    }

    #[test]
    fn test_snapshot_serializes() {
        let state = GameState::new(5, Tuning::default(), PlayField::new(800.0, 600.0));
        let json = Snapshot::capture(&state).to_json().unwrap();
        assert!(json.contains("\"phase\":\"Ready\""));
        assert!(json.contains("\"player_score\":0"));
    }
}
