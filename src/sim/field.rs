//! Play-field geometry
//!
//! The room is an axis-aligned rectangle with a lake along the bottom. Cats
//! live on the ground above the water line; the eagle may fly anywhere.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Axis-aligned containment box for a body centre
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

/// Result of clamping a tentative position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clamped {
    pub pos: Vec2,
    pub hit_x: bool,
    pub hit_y: bool,
}

impl Bounds {
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Clamp into the box, reporting which axes were pushed back
    pub fn clamp(&self, p: Vec2) -> Clamped {
        let x = p.x.max(self.min.x).min(self.max.x);
        let y = p.y.max(self.min.y).min(self.max.y);
        Clamped {
            pos: Vec2::new(x, y),
            hit_x: x != p.x,
            hit_y: y != p.y,
        }
    }
}

/// Host-provided room dimensions, latched at round reset
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayField {
    pub width: f32,
    pub height: f32,
}

impl PlayField {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True until the host has laid out a room big enough for the eagle
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= EAGLE_RADIUS * 2.0
            || self.height <= EAGLE_RADIUS * 2.0
    }

    pub fn water_line(&self) -> f32 {
        self.height * (1.0 - LAKE_HEIGHT_FRACTION)
    }

    /// Where a cat of `radius` may stand (above the water)
    pub fn ground_bounds(&self, radius: f32) -> Bounds {
        Bounds {
            min: Vec2::splat(radius),
            max: Vec2::new(self.width - radius, self.water_line() - radius),
        }
    }

    /// Where the eagle may fly (the whole room, water included)
    pub fn air_bounds(&self, radius: f32) -> Bounds {
        Bounds {
            min: Vec2::splat(radius),
            max: Vec2::new(self.width - radius, self.height - radius),
        }
    }

    /// Rectangle power-ups spawn in: `[m, w-m) x [m, waterLine-m)`
    pub fn spawn_area(&self, margin: f32) -> Bounds {
        Bounds {
            min: Vec2::splat(margin),
            max: Vec2::new(self.width - margin, self.water_line() - margin),
        }
    }

    pub fn interceptor_start(&self) -> Vec2 {
        Vec2::new(self.width * 0.4, self.water_line() - CAT_RADIUS * 1.5)
    }

    pub fn decoy_start(&self) -> Vec2 {
        Vec2::new(self.width * 0.6, self.water_line() - CAT_RADIUS * 1.5)
    }

    pub fn evader_start(&self) -> Vec2 {
        Vec2::splat(EAGLE_RADIUS * 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_water_line_is_bottom_fifth() {
        let field = PlayField::new(800.0, 600.0);
        assert!((field.water_line() - 480.0).abs() < 1e-4);
    }

    #[test]
    fn test_ground_bounds_stop_at_water() {
        let field = PlayField::new(800.0, 600.0);
        let b = field.ground_bounds(CAT_RADIUS);
        let c = b.clamp(Vec2::new(900.0, 590.0));
        assert_eq!(c.pos, Vec2::new(780.0, 460.0));
        assert!(c.hit_x && c.hit_y);
    }

    #[test]
    fn test_air_bounds_cover_water() {
        let field = PlayField::new(800.0, 600.0);
        let b = field.air_bounds(EAGLE_RADIUS);
        let c = b.clamp(Vec2::new(400.0, 560.0));
        assert_eq!(c.pos, Vec2::new(400.0, 560.0));
        assert!(!c.hit_x && !c.hit_y);
    }

    #[test]
    fn test_degenerate_fields() {
        assert!(PlayField::default().is_degenerate());
        assert!(PlayField::new(40.0, 600.0).is_degenerate());
        assert!(PlayField::new(f32::NAN, 600.0).is_degenerate());
        assert!(!PlayField::new(800.0, 600.0).is_degenerate());
    }

    #[test]
    fn test_start_positions_are_inside() {
        let field = PlayField::new(1024.0, 768.0);
        assert!(field.ground_bounds(CAT_RADIUS).contains(field.interceptor_start()));
        assert!(field.ground_bounds(CAT_RADIUS).contains(field.decoy_start()));
        assert!(field.air_bounds(EAGLE_RADIUS).contains(field.evader_start()));
    }
}
