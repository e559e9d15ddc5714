//! Collision detection and response for circular bodies
//!
//! Every body in the room is a circle, so overlap is a squared-distance
//! comparison; the square root is only paid when an overlap has to be resolved.

use glam::Vec2;

/// Below this centre distance the contact normal is undefined
const MIN_CONTACT_DISTANCE: f32 = 1e-4;

/// Result of a circle-circle contact check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether the circles overlap
    pub hit: bool,
    /// Unit normal pointing from `b` toward `a`
    pub normal: Vec2,
    /// Overlap depth (sum of radii minus centre distance)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Strict overlap test: touching circles (`d == ra + rb`) do not collide
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let radii = ra + rb;
    a.distance_squared(b) < radii * radii
}

/// Contact information between two circles
///
/// Coincident centres have no separating direction; they are pushed apart
/// along +x so the correction stays finite.
pub fn circle_contact(a: Vec2, ra: f32, b: Vec2, rb: f32) -> CollisionResult {
    if !circles_overlap(a, ra, b, rb) {
        return CollisionResult::miss();
    }

    let delta = a - b;
    let distance = delta.length();
    let normal = if distance > MIN_CONTACT_DISTANCE {
        delta / distance
    } else {
        Vec2::X
    };

    CollisionResult {
        hit: true,
        normal,
        penetration: ra + rb - distance,
    }
}

/// Push two overlapping circles apart by half the overlap each
///
/// Pure positional correction, no momentum is exchanged.
/// Returns true if the pair was overlapping.
pub fn separate_pair(a: &mut Vec2, ra: f32, b: &mut Vec2, rb: f32) -> bool {
    let contact = circle_contact(*a, ra, *b, rb);
    if !contact.hit {
        return false;
    }
    let correction = contact.normal * (contact.penetration / 2.0);
    *a += correction;
    *b -= correction;
    true
}
