//! Game state and core simulation types
//!
//! Everything the per-frame tick reads or writes lives in [`GameState`].
//! Collaborators only ever see it through a [`crate::Snapshot`].

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::field::PlayField;
use super::input::Controls;
use super::schedule::DelayQueue;
use crate::consts::*;
use crate::tuning::Tuning;

/// Round lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Waiting for the first move
    Ready,
    /// Active gameplay
    Running,
    /// Game is paused
    Paused,
    /// A capture is resolving; motion is frozen, timers keep running
    Transitioning,
    /// Level-up pause between level 1 and 2
    LevelTransition,
    /// Victory or defeat
    GameOver,
}

impl RoundPhase {
    /// Phases in which the driver keeps requesting frames
    pub fn wants_frames(self) -> bool {
        matches!(
            self,
            RoundPhase::Running | RoundPhase::Transitioning | RoundPhase::LevelTransition
        )
    }

    pub fn is_transition(self) -> bool {
        matches!(self, RoundPhase::Transitioning | RoundPhase::LevelTransition)
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    Speed,
    Shield,
    Freeze,
    Teleport,
    Invisibility,
    DoubleScore,
}

/// A power-up waiting on the ground
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub pos: Vec2,
    pub kind: PowerUpKind,
}

/// A circular body moving through the room
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

impl Body {
    pub fn new(pos: Vec2, radius: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius,
        }
    }
}

/// A millisecond timer that never goes below zero
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Countdown {
    left: f32,
}

impl Countdown {
    pub fn start(&mut self, ms: f32) {
        self.left = ms.max(0.0);
    }

    pub fn clear(&mut self) {
        self.left = 0.0;
    }

    /// Advance by `dt` ms. Returns true on the tick the timer runs out.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.left <= 0.0 {
            return false;
        }
        self.left = (self.left - dt).max(0.0);
        self.left == 0.0
    }

    pub fn is_active(&self) -> bool {
        self.left > 0.0
    }

    pub fn remaining(&self) -> f32 {
        self.left
    }
}

/// Single-occupancy decoy status (speed or shield)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EffectSlot {
    pub kind: Option<PowerUpKind>,
    pub time_left: f32,
}

impl EffectSlot {
    /// Overwrite whatever is in the slot
    pub fn set(&mut self, kind: PowerUpKind, ms: f32) {
        self.kind = Some(kind);
        self.time_left = ms.max(0.0);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Returns true on the tick the effect expires
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.kind.is_none() {
            return false;
        }
        self.time_left = (self.time_left - dt).max(0.0);
        if self.time_left == 0.0 {
            self.clear();
            return true;
        }
        false
    }

    pub fn is(&self, kind: PowerUpKind) -> bool {
        self.kind == Some(kind) && self.time_left > 0.0
    }
}

/// Player-triggered stun; `ready` mirrors `cooldown_left <= 0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightningAbility {
    pub ready: bool,
    pub cooldown_left: f32,
}

impl Default for LightningAbility {
    fn default() -> Self {
        Self {
            ready: true,
            cooldown_left: 0.0,
        }
    }
}

impl LightningAbility {
    /// Spend the ability. Returns false while it is still cooling down.
    pub fn trigger(&mut self, cooldown_ms: f32) -> bool {
        if !self.ready {
            return false;
        }
        self.cooldown_left = cooldown_ms.max(0.0);
        self.ready = self.cooldown_left <= 0.0;
        true
    }

    /// Returns true on the tick the ability becomes ready again
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.cooldown_left <= 0.0 {
            self.ready = true;
            return false;
        }
        self.cooldown_left = (self.cooldown_left - dt).max(0.0);
        self.ready = self.cooldown_left <= 0.0;
        self.ready
    }
}

/// Consecutive player captures
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComboState {
    pub count: u32,
    pub multiplier: f32,
    /// Session clock (ms) of the previous capture, if any
    pub last_capture_ms: Option<f32>,
}

impl Default for ComboState {
    fn default() -> Self {
        Self {
            count: 0,
            multiplier: 1.0,
            last_capture_ms: None,
        }
    }
}

impl ComboState {
    /// Record a capture at `now`. Returns true if it extended a running combo.
    pub fn register(&mut self, now: f32, tuning: &Tuning) -> bool {
        let extended = self
            .last_capture_ms
            .is_some_and(|last| now - last < tuning.combo_window_ms);

        if extended {
            self.count += 1;
            self.multiplier = (1.0 + self.count as f32 * (tuning.combo_multiplier_base - 1.0))
                .min(tuning.max_combo_multiplier);
        } else {
            self.count = 1;
            self.multiplier = 1.0;
        }
        self.last_capture_ms = Some(now);
        extended
    }
}

/// Eagle tint, driven by which boost is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EvaderColor {
    #[default]
    Default,
    /// Offensive (chase) boost
    Green,
    /// Defensive boost
    Red,
}

/// What the eagle decided to do this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EvaderMode {
    #[default]
    SeekingDecoy,
    EvadingInterceptor,
    EvadingShield,
    Stunned,
    Frozen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DayCycle {
    #[default]
    Day,
    Dusk,
    Night,
}

impl DayCycle {
    /// Day for the first 40% and last 10% of a cycle, dusk until 70%, then night
    pub fn at(elapsed_ms: f32, cycle_ms: f32) -> Self {
        let progress = (elapsed_ms % cycle_ms) / cycle_ms;
        if progress > 0.9 || progress < 0.4 {
            DayCycle::Day
        } else if progress > 0.7 {
            DayCycle::Night
        } else {
            DayCycle::Dusk
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    Win,
    Lose,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub kind: MessageKind,
}

impl Message {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: MessageKind::Info,
        }
    }
}

/// Trail point for boosted-eagle rendering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailPoint {
    pub id: u32,
    pub pos: Vec2,
}

/// Who ended the round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureKind {
    /// Interceptor touched the eagle
    Interceptor,
    /// Eagle hit a shielded or invisible decoy
    ProtectedDecoy,
    /// Eagle caught the decoy
    Evader,
}

/// Discrete notifications for audio/haptics collaborators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    GameStarted,
    Paused,
    Resumed,
    PowerUpSpawned { kind: PowerUpKind, pos: Vec2 },
    PowerUpCollected { kind: PowerUpKind, pos: Vec2 },
    AbilityTriggered,
    AbilityReady,
    Capture(CaptureKind),
    ComboExtended { count: u32 },
    LevelUp { level: u32 },
    Victory,
    Defeat,
    DecoyScared,
}

/// Eagle-specific state that outlives a single tick
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaderStatus {
    pub visible: bool,
    pub chase_boost: Countdown,
    pub defensive_boost: Countdown,
    pub stun: Countdown,
    pub freeze: Countdown,
    pub color: EvaderColor,
    pub mode: EvaderMode,
    /// Eagle was within the decoy boost range last tick
    pub near_decoy: bool,
    pub trail: Vec<TrailPoint>,
    pub next_trail_id: u32,
    pub last_trail_ms: f32,
}

impl EvaderStatus {
    pub fn is_boosted(&self) -> bool {
        self.chase_boost.is_active() || self.defensive_boost.is_active()
    }

    /// Stunned or frozen: no motion at all
    pub fn is_grounded(&self) -> bool {
        self.stun.is_active() || self.freeze.is_active()
    }

    /// Append a trail point, keeping the newest `MAX_TRAIL_POINTS`
    pub fn record_trail(&mut self, pos: Vec2, now: f32) {
        self.trail.push(TrailPoint {
            id: self.next_trail_id,
            pos,
        });
        self.next_trail_id = self.next_trail_id.wrapping_add(1);
        if self.trail.len() > MAX_TRAIL_POINTS {
            self.trail.remove(0);
        }
        self.last_trail_ms = now;
    }
}

/// Deferred round outcomes, applied by the tick once their delay has elapsed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Deferred {
    /// Award `points` to the player and move on (next round, level or victory)
    PlayerCapture { points: u32 },
    /// Award a point to the eagle
    EvaderCapture,
    /// End the level-up pause
    FinishLevelTransition,
}

/// The whole session (aggregate root)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed the RNG was created from
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    /// Room dimensions latched at the last round reset
    pub field: PlayField,

    pub phase: RoundPhase,
    pub level: u32,
    pub player_score: u32,
    pub evader_score: u32,
    /// Scored play time, published in 100 ms chunks by the driver
    pub elapsed_ms: f32,
    /// Best elapsed time of a finished game
    pub high_score_ms: f32,
    /// Simulated time including transitions (drives deferred events)
    pub clock_ms: f32,
    pub day_cycle: DayCycle,
    pub message: Option<Message>,

    pub interceptor: Body,
    pub decoy: Body,
    pub evader: Body,
    pub evader_status: EvaderStatus,

    pub effect: EffectSlot,
    pub decoy_invisible: Countdown,
    pub decoy_scared: bool,
    pub double_score: Countdown,
    pub lightning: LightningAbility,
    /// Short visual flash after a lightning strike
    pub lightning_flash: Countdown,
    pub combo: ComboState,

    pub powerups: Vec<PowerUp>,
    next_powerup_id: u32,
    pub spawn_timer_ms: f32,
    pub explosions: Vec<Vec2>,

    pub controls: Controls,
    /// Interceptor follows the pointer only after the decoy has moved once
    pub autopilot_armed: bool,

    pub deferred: DelayQueue<Deferred>,
    /// Events raised since the driver last drained them
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new session with the given seed, balance and room size
    pub fn new(seed: u64, tuning: Tuning, field: PlayField) -> Self {
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            field,
            phase: RoundPhase::Ready,
            level: 1,
            player_score: 0,
            evader_score: 0,
            elapsed_ms: 0.0,
            high_score_ms: 0.0,
            clock_ms: 0.0,
            day_cycle: DayCycle::Day,
            message: None,
            interceptor: Body::new(Vec2::ZERO, CAT_RADIUS),
            decoy: Body::new(Vec2::ZERO, CAT_RADIUS),
            evader: Body::new(Vec2::ZERO, EAGLE_RADIUS),
            evader_status: EvaderStatus {
                visible: true,
                ..Default::default()
            },
            effect: EffectSlot::default(),
            decoy_invisible: Countdown::default(),
            decoy_scared: false,
            double_score: Countdown::default(),
            lightning: LightningAbility::default(),
            lightning_flash: Countdown::default(),
            combo: ComboState::default(),
            powerups: Vec::new(),
            next_powerup_id: 0,
            spawn_timer_ms: 0.0,
            explosions: Vec::new(),
            controls: Controls::default(),
            autopilot_armed: false,
            deferred: DelayQueue::new(),
            events: Vec::new(),
        };

        super::scoring::reset_game(&mut state, false);

        state
    }

    /// Allocate a new power-up ID
    pub fn next_powerup_id(&mut self) -> u32 {
        let id = self.next_powerup_id;
        self.next_powerup_id += 1;
        id
    }

    /// Decoy is exempt from being caught (shield or invisibility)
    pub fn decoy_protected(&self) -> bool {
        self.effect.is(PowerUpKind::Shield) || self.decoy_invisible.is_active()
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn add_explosion(&mut self, pos: Vec2) {
        self.explosions.push(pos);
        if self.explosions.len() > MAX_EXPLOSIONS {
            self.explosions.remove(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_clamps_at_zero() {
        let mut t = Countdown::default();
        t.start(100.0);
        assert!(!t.tick(60.0));
        assert!(t.tick(60.0));
        assert_eq!(t.remaining(), 0.0);
        assert!(!t.tick(60.0));
        assert_eq!(t.remaining(), 0.0);
    }

    #[test]
    fn test_effect_slot_overwrites_and_expires() {
        let mut slot = EffectSlot::default();
        slot.set(PowerUpKind::Speed, 2000.0);
        slot.set(PowerUpKind::Shield, 2000.0);
        assert!(slot.is(PowerUpKind::Shield));
        assert!(!slot.is(PowerUpKind::Speed));
        assert!(!slot.tick(1999.0));
        assert!(slot.tick(2.0));
        assert_eq!(slot, EffectSlot::default());
    }

    #[test]
    fn test_lightning_ready_tracks_cooldown() {
        let mut l = LightningAbility::default();
        assert!(l.trigger(10_000.0));
        assert!(!l.ready);
        assert!(!l.trigger(10_000.0));
        assert!(!l.tick(9_999.0));
        assert!(!l.ready);
        assert!(l.tick(1.0));
        assert!(l.ready);
        assert_eq!(l.cooldown_left, 0.0);
    }

    #[test]
    fn test_combo_window_is_exclusive() {
        let tuning = Tuning::default();
        let mut combo = ComboState::default();
        assert!(!combo.register(1000.0, &tuning));
        assert_eq!(combo.count, 1);

        assert!(combo.register(5999.0, &tuning));
        assert_eq!(combo.count, 2);

        assert!(!combo.register(11_000.0, &tuning));
        assert_eq!(combo.count, 1);
        assert_eq!(combo.multiplier, 1.0);
    }

    #[test]
    fn test_combo_multiplier_law() {
        let tuning = Tuning::default();
        let mut combo = ComboState {
            count: 4,
            multiplier: 1.8,
            last_capture_ms: Some(0.0),
        };
        combo.register(100.0, &tuning);
        assert_eq!(combo.count, 5);
        assert!((combo.multiplier - 2.0).abs() < 1e-5);

        combo.count = 20;
        combo.register(200.0, &tuning);
        assert_eq!(combo.multiplier, 3.0);
    }

    #[test]
    fn test_day_cycle_bands() {
        let cycle = 120_000.0;
        assert_eq!(DayCycle::at(0.0, cycle), DayCycle::Day);
        assert_eq!(DayCycle::at(60_000.0, cycle), DayCycle::Dusk);
        assert_eq!(DayCycle::at(96_000.0, cycle), DayCycle::Night);
        assert_eq!(DayCycle::at(115_000.0, cycle), DayCycle::Day);
        assert_eq!(DayCycle::at(180_000.0, cycle), DayCycle::Dusk);
    }

    #[test]
    fn test_trail_is_bounded() {
        let mut status = EvaderStatus::default();
        for i in 0..25 {
            status.record_trail(Vec2::splat(i as f32), i as f32 * 60.0);
        }
        assert_eq!(status.trail.len(), MAX_TRAIL_POINTS);
        assert_eq!(status.trail[0].pos, Vec2::splat(15.0));
        assert_eq!(status.trail.last().map(|p| p.id), Some(24));
    }
}
