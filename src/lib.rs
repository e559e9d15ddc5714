//! Vibey Cat - a single-room pursuit mini-game
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (motion, evader AI, power-ups, scoring)
//! - `driver`: Animation-frame clock, frame requests, host commands
//! - `snapshot`: Read-only view published to rendering/audio collaborators
//! - `persistence`: Key/value storage for the few values that outlive a session
//! - `tuning`: Data-driven game balance

pub mod driver;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod snapshot;
pub mod tuning;

pub use driver::{Command, Driver, FrameHandle, FrameScheduler, ManualScheduler};
pub use highscores::HighScore;
pub use settings::Settings;
pub use snapshot::Snapshot;
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Frame duration the movement speeds are expressed against (60 Hz)
    pub const REFERENCE_FRAME_MS: f32 = 16.66;
    /// Elapsed time is published in chunks of at least this many ms
    pub const ELAPSED_PUBLISH_MS: f32 = 100.0;

    /// Interceptor and decoy share a body size
    pub const CAT_RADIUS: f32 = 20.0;
    pub const EAGLE_RADIUS: f32 = 25.0;
    /// Pickup radius used for decoy-vs-powerup overlap
    pub const POWERUP_RADIUS: f32 = 20.0;

    /// Bottom share of the field that is water (cats can't enter it)
    pub const LAKE_HEIGHT_FRACTION: f32 = 0.20;
    /// Power-ups keep this margin from the walls and the water line
    pub const POWERUP_SPAWN_MARGIN: f32 = 40.0;

    pub const MAX_POWERUPS: usize = 3;
    pub const MAX_TRAIL_POINTS: usize = 10;
    pub const MAX_EXPLOSIONS: usize = 16;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Heading of a vector in radians (0 for the zero vector)
#[inline]
pub fn heading(v: glam::Vec2) -> f32 {
    v.y.atan2(v.x)
}

/// Unit vector pointing along `angle`
#[inline]
pub fn unit_from_heading(angle: f32) -> glam::Vec2 {
    glam::Vec2::new(angle.cos(), angle.sin())
}
