//! Data-driven game balance
//!
//! Every number that shapes how the chase feels lives here so it can be
//! tweaked from a JSON file without touching the simulation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::PowerUpKind;

/// Environment variable naming a JSON tuning file (native only)
pub const TUNING_ENV_VAR: &str = "VIBEYCAT_TUNING";

#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("could not read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("`{field}` must be positive (got {value})")]
    NotPositive { field: &'static str, value: f32 },
    #[error("power-up weights must sum to 1.0 (got {0})")]
    WeightSum(f32),
    #[error("no power-up kinds configured")]
    NoPowerUps,
}

/// Per-level evader/spawn parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelTuning {
    /// Speed multiplier while the offensive (chase) boost is running
    pub chase_boost_multiplier: f32,
    /// Scales the power-up spawn interval (lower = more power-ups)
    pub spawn_interval_scale: f32,
}

impl Default for LevelTuning {
    fn default() -> Self {
        Self {
            chase_boost_multiplier: 1.8,
            spawn_interval_scale: 1.0,
        }
    }
}

/// Weighted entry for the power-up kind draw
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerUpWeight {
    pub kind: PowerUpKind,
    pub weight: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Speeds (units per 60 Hz frame) ===
    pub decoy_speed: f32,
    /// Decoy speed multiplier while the `speed` effect is in the slot
    pub decoy_speed_boost: f32,
    pub interceptor_speed: f32,
    pub evader_base_speed: f32,

    // === Evader steering ===
    pub evader_acceleration: f32,
    pub evader_max_velocity: f32,
    pub evader_min_speed: f32,
    /// Max heading change per tick (radians)
    pub evader_max_turn_rate: f32,
    pub evader_close_distance: f32,
    pub evader_close_speed_multiplier: f32,
    pub evader_very_close_distance: f32,
    pub evader_very_close_max_speed_multiplier: f32,

    // === Evader reactions ===
    pub evasion_range: f32,
    pub decoy_boost_range: f32,
    pub interceptor_boost_range: f32,
    pub shield_evasion_multiplier: f32,
    pub interceptor_evasion_multiplier: f32,
    pub defensive_boost_multiplier: f32,
    pub chase_boost_ms: f32,
    pub defensive_boost_ms: f32,
    pub trail_interval_ms: f32,

    // === Power-ups and abilities ===
    pub powerup_spawn_interval_ms: f32,
    pub shield_ms: f32,
    pub speed_boost_ms: f32,
    pub freeze_ms: f32,
    pub invisibility_ms: f32,
    pub double_score_ms: f32,
    pub lightning_cooldown_ms: f32,
    pub lightning_stun_ms: f32,
    pub lightning_flash_ms: f32,
    pub powerup_weights: Vec<PowerUpWeight>,

    // === Rules ===
    pub victory_score: u32,
    pub level_transition_score: u32,
    pub game_over_score: u32,
    pub player_capture_delay_ms: f32,
    pub evader_capture_delay_ms: f32,
    pub level_transition_ms: f32,
    pub combo_window_ms: f32,
    pub combo_multiplier_base: f32,
    pub max_combo_multiplier: f32,
    pub day_cycle_ms: f32,

    pub level_one: LevelTuning,
    pub level_two: LevelTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            decoy_speed: 4.0,
            decoy_speed_boost: 1.5,
            interceptor_speed: 1.96875,
            evader_base_speed: 1.0,

            evader_acceleration: 0.05,
            evader_max_velocity: 3.0,
            evader_min_speed: 0.3,
            evader_max_turn_rate: 0.12,
            evader_close_distance: 200.0,
            evader_close_speed_multiplier: 0.5,
            evader_very_close_distance: 80.0,
            evader_very_close_max_speed_multiplier: 1.2,

            evasion_range: 200.0,
            decoy_boost_range: 100.0,
            interceptor_boost_range: 100.0,
            shield_evasion_multiplier: 1.2,
            interceptor_evasion_multiplier: 1.5,
            defensive_boost_multiplier: 1.5,
            chase_boost_ms: 3000.0,
            defensive_boost_ms: 1000.0,
            trail_interval_ms: 50.0,

            powerup_spawn_interval_ms: 8000.0,
            shield_ms: 2000.0,
            speed_boost_ms: 2000.0,
            freeze_ms: 3000.0,
            invisibility_ms: 2000.0,
            double_score_ms: 10000.0,
            lightning_cooldown_ms: 10000.0,
            lightning_stun_ms: 2000.0,
            lightning_flash_ms: 500.0,
            // Common (speed/shield) 75%, rare (freeze/teleport) 20%, epic 5%
            powerup_weights: vec![
                PowerUpWeight {
                    kind: PowerUpKind::Speed,
                    weight: 0.28125,
                },
                PowerUpWeight {
                    kind: PowerUpKind::Shield,
                    weight: 0.46875,
                },
                PowerUpWeight {
                    kind: PowerUpKind::Freeze,
                    weight: 0.10,
                },
                PowerUpWeight {
                    kind: PowerUpKind::Teleport,
                    weight: 0.10,
                },
                PowerUpWeight {
                    kind: PowerUpKind::Invisibility,
                    weight: 0.025,
                },
                PowerUpWeight {
                    kind: PowerUpKind::DoubleScore,
                    weight: 0.025,
                },
            ],

            victory_score: 6,
            level_transition_score: 3,
            game_over_score: 3,
            player_capture_delay_ms: 1000.0,
            evader_capture_delay_ms: 200.0,
            level_transition_ms: 1000.0,
            combo_window_ms: 5000.0,
            combo_multiplier_base: 1.2,
            max_combo_multiplier: 3.0,
            day_cycle_ms: 120_000.0,

            level_one: LevelTuning::default(),
            level_two: LevelTuning {
                chase_boost_multiplier: 2.5,
                spawn_interval_scale: 0.8,
            },
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON tuning document. Missing fields keep defaults.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from the file named by `VIBEYCAT_TUNING`, falling back to defaults.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var(TUNING_ENV_VAR) else {
            return Self::default();
        };
        match std::fs::read_to_string(&path)
            .map_err(TuningError::from)
            .and_then(|json| Self::from_json(&json))
        {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path);
                tuning
            }
            Err(e) => {
                log::warn!("Ignoring tuning file {}: {}", path, e);
                Self::default()
            }
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("decoy_speed", self.decoy_speed),
            ("interceptor_speed", self.interceptor_speed),
            ("evader_base_speed", self.evader_base_speed),
            ("evader_max_velocity", self.evader_max_velocity),
            ("evader_max_turn_rate", self.evader_max_turn_rate),
            ("evader_acceleration", self.evader_acceleration),
            ("evader_very_close_distance", self.evader_very_close_distance),
            ("powerup_spawn_interval_ms", self.powerup_spawn_interval_ms),
            ("shield_ms", self.shield_ms),
            ("speed_boost_ms", self.speed_boost_ms),
            ("freeze_ms", self.freeze_ms),
            ("invisibility_ms", self.invisibility_ms),
            ("double_score_ms", self.double_score_ms),
            ("lightning_cooldown_ms", self.lightning_cooldown_ms),
            ("lightning_stun_ms", self.lightning_stun_ms),
            ("combo_multiplier_base", self.combo_multiplier_base),
            ("day_cycle_ms", self.day_cycle_ms),
        ];
        for (field, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(TuningError::NotPositive { field, value });
            }
        }
        if self.evader_close_distance <= self.evader_very_close_distance {
            return Err(TuningError::NotPositive {
                field: "evader_close_distance - evader_very_close_distance",
                value: self.evader_close_distance - self.evader_very_close_distance,
            });
        }

        if self.powerup_weights.is_empty() {
            return Err(TuningError::NoPowerUps);
        }
        let sum: f32 = self.powerup_weights.iter().map(|w| w.weight).sum();
        if (sum - 1.0).abs() > 1e-3 {
            return Err(TuningError::WeightSum(sum));
        }
        Ok(())
    }

    /// Parameters for the given level (anything past 2 plays like level 2)
    pub fn level(&self, level: u32) -> &LevelTuning {
        if level <= 1 { &self.level_one } else { &self.level_two }
    }

    /// How long an effect lasts once picked up (0 for one-shot kinds)
    pub fn powerup_duration(&self, kind: PowerUpKind) -> f32 {
        match kind {
            PowerUpKind::Speed => self.speed_boost_ms,
            PowerUpKind::Shield => self.shield_ms,
            PowerUpKind::Freeze => self.freeze_ms,
            PowerUpKind::Teleport => 0.0,
            PowerUpKind::Invisibility => self.invisibility_ms,
            PowerUpKind::DoubleScore => self.double_score_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tuning_is_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "decoy_speed": 5.0 }"#).unwrap();
        assert_eq!(tuning.decoy_speed, 5.0);
        assert_eq!(tuning.victory_score, 6);
        assert_eq!(tuning.level_two.chase_boost_multiplier, 2.5);
    }

    #[test]
    fn test_rejects_bad_weights() {
        let json = r#"{ "powerup_weights": [
            { "kind": "Speed", "weight": 0.5 },
            { "kind": "Shield", "weight": 0.2 }
        ] }"#;
        assert!(matches!(
            Tuning::from_json(json),
            Err(TuningError::WeightSum(_))
        ));
    }

    #[test]
    fn test_rejects_non_positive_duration() {
        let err = Tuning::from_json(r#"{ "shield_ms": 0.0 }"#).unwrap_err();
        assert!(matches!(err, TuningError::NotPositive { field: "shield_ms", .. }));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            Tuning::from_json("not json"),
            Err(TuningError::Parse(_))
        ));
    }

    #[test]
    fn test_level_lookup() {
        let tuning = Tuning::default();
        assert_eq!(tuning.level(1).chase_boost_multiplier, 1.8);
        assert_eq!(tuning.level(2).chase_boost_multiplier, 2.5);
        assert_eq!(tuning.level(7).spawn_interval_scale, 0.8);
    }
}
