//! The 2D point/vector primitive and the scalar helpers every field uses.
//!
//! [`Point`] is glam's `DVec2`: a `Copy` value type, so every slot of a
//! displacement array is independent no matter how a field fills it.

use glam::DVec2;

/// Two-component f64 point or vector.
pub type Point = DVec2;

/// Rotates `p` by `angle` radians, clockwise-positive in screen space.
///
/// `rotate(p, θ) = (cosθ·x + sinθ·y, −sinθ·x + cosθ·y)`
pub fn rotate(p: Point, angle: f64) -> Point {
    let (sin, cos) = angle.sin_cos();
    Point::new(cos * p.x + sin * p.y, -sin * p.x + cos * p.y)
}

/// Cubic Hermite step between `edge0` and `edge1`, clamped to [0, 1].
///
/// The edges may be descending (`edge0 > edge1`), which yields 1 below
/// `edge1` and 0 above `edge0`. Equal edges are a step at `edge0`.
pub fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    let span = edge1 - edge0;
    if span == 0.0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / span).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
