//! Input aggregation
//!
//! Holds the latest raw input (held arrow keys, pointer/touch sample, virtual
//! joystick) and turns it into per-tick velocities for the two cats.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Diagonal moves are scaled by 1/√2 so they are no faster than straight ones
pub const DIAGONAL_NORMALIZATION: f32 = std::f32::consts::SQRT_2;

/// Arrow-key directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Map a DOM `KeyboardEvent.key` name
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" => Some(Direction::Up),
            "ArrowDown" => Some(Direction::Down),
            "ArrowLeft" => Some(Direction::Left),
            "ArrowRight" => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Which arrow keys are currently down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HeldKeys {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl HeldKeys {
    fn slot(&mut self, dir: Direction) -> &mut bool {
        match dir {
            Direction::Up => &mut self.up,
            Direction::Down => &mut self.down,
            Direction::Left => &mut self.left,
            Direction::Right => &mut self.right,
        }
    }

    pub fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }

    /// Unit-less direction in screen space (y grows downward); opposing keys cancel
    pub fn axis(&self) -> Vec2 {
        let x = (self.right as i8 - self.left as i8) as f32;
        let y = (self.down as i8 - self.up as i8) as f32;
        Vec2::new(x, y)
    }
}

/// Latest input samples; no queuing, the newest value wins
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Controls {
    pub keys: HeldKeys,
    /// Pointer or touch position the interceptor chases
    pub pointer: Option<Vec2>,
    /// Virtual joystick direction, overrides the keys while non-zero
    pub joystick: Vec2,
}

impl Controls {
    /// Mark a key as held. Returns true if it was not already down.
    pub fn press(&mut self, dir: Direction) -> bool {
        let slot = self.keys.slot(dir);
        let newly = !*slot;
        *slot = true;
        newly
    }

    pub fn release(&mut self, dir: Direction) {
        *self.keys.slot(dir) = false;
    }

    pub fn release_all(&mut self) {
        self.keys = HeldKeys::default();
        self.joystick = Vec2::ZERO;
    }

    /// Decoy velocity for this tick at the given axis speed
    pub fn decoy_velocity(&self, speed: f32) -> Vec2 {
        let axis = if self.joystick != Vec2::ZERO {
            self.joystick.clamp(Vec2::splat(-1.0), Vec2::splat(1.0))
        } else {
            self.keys.axis()
        };

        let mut vel = axis * speed;
        if vel.x != 0.0 && vel.y != 0.0 {
            vel /= DIAGONAL_NORMALIZATION;
        }
        vel
    }
}

/// Interceptor autopilot: head for `target` at `speed`, stop within `radius / 2`
pub fn seek_velocity(pos: Vec2, target: Vec2, speed: f32, radius: f32) -> Vec2 {
    let delta = target - pos;
    let distance = delta.length();
    if distance > radius / 2.0 {
        delta / distance * speed
    } else {
        Vec2::ZERO
    }
}
