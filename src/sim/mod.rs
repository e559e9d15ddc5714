//! Frame-driven simulation module
//!
//! All gameplay logic lives here. The module stays free of platform code:
//! - Variable frame deltas, scaled by a 60 Hz multiplier
//! - Seeded RNG only
//! - Delayed outcomes go through an in-process queue, never host timers

pub mod collision;
pub mod effects;
pub mod evader;
pub mod field;
pub mod input;
pub mod schedule;
pub mod scoring;
pub mod state;
pub mod tick;

pub use collision::{CollisionResult, circle_contact, circles_overlap, separate_pair};
pub use evader::{Intent, SmoothedPursuit, SteeringPolicy};
pub use field::{Bounds, PlayField};
pub use input::{Controls, Direction, HeldKeys};
pub use schedule::DelayQueue;
pub use state::{
    Body, CaptureKind, ComboState, Countdown, DayCycle, EffectSlot, EvaderColor, EvaderMode,
    GameEvent, GameState, LightningAbility, Message, MessageKind, PowerUp, PowerUpKind, RoundPhase,
    TrailPoint,
};
pub use tick::{frame_multiplier, tick};
