//! 2D vector helpers
//!
//! `glam::DVec2` already covers add/sub/scale/length. The helpers here add the
//! total (never-NaN) variants the engine relies on.

use glam::DVec2;

use crate::consts::DIRECTION_EPSILON;

/// World-space vector in meters (x right, y down)
pub type Vector2 = DVec2;

#[inline]
pub fn add(a: Vector2, b: Vector2) -> Vector2 {
    a + b
}

#[inline]
pub fn sub(a: Vector2, b: Vector2) -> Vector2 {
    a - b
}

#[inline]
pub fn scale(v: Vector2, k: f64) -> Vector2 {
    v * k
}

#[inline]
pub fn magnitude(v: Vector2) -> f64 {
    v.length()
}

/// Normalize `v`, dividing by `max(|v|, eps)`.
///
/// The zero vector maps to the zero vector. Vectors shorter than `eps` come
/// back shorter than unit length rather than blowing up.
#[inline]
pub fn normalize_floored(v: Vector2, eps: f64) -> Vector2 {
    v / v.length().max(eps)
}

/// [`normalize_floored`] with the default direction epsilon
#[inline]
pub fn normalize(v: Vector2) -> Vector2 {
    normalize_floored(v, DIRECTION_EPSILON)
}

/// Unit vector at `radians` in world axes (`(cos, sin)`)
#[inline]
pub fn from_angle(radians: f64) -> Vector2 {
    Vector2::new(radians.cos(), radians.sin())
}

/// Unit vector for an angle measured counter-clockwise on screen.
///
/// Screen y grows downward, so the y component is negated.
#[inline]
pub fn screen_direction(radians: f64) -> Vector2 {
    Vector2::new(radians.cos(), -radians.sin())
}

/// Cosine of the angle between two vectors (0 if either is zero)
pub fn cosine_similarity(a: Vector2, b: Vector2) -> f64 {
    let denom = a.length() * b.length();
    if denom < f64::MIN_POSITIVE {
        0.0
    } else {
        a.dot(b) / denom
    }
}
