//! Falloffs: per-point scalar weights that mask where a field acts.
//!
//! A falloff knows nothing about direction. The simulation multiplies a
//! field's displacement by the falloff weight of the same point.

use crate::point::{smoothstep, Point};

/// Maps a set of points to one weight per point.
pub trait Falloff {
    /// Returns exactly one weight per input point, in input order.
    fn evaluate(&self, points: &[Point]) -> Vec<f64>;
}

/// The same weight everywhere.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantFalloff {
    pub value: f64,
}

impl ConstantFalloff {
    pub fn new(value: f64) -> Self {
        Self { value }
    }

    pub fn set_value(&mut self, value: f64) -> &mut Self {
        self.value = value;
        self
    }
}

impl Falloff for ConstantFalloff {
    fn evaluate(&self, points: &[Point]) -> Vec<f64> {
        vec![self.value; points.len()]
    }
}

/// Smooth radial mask: 1 within `inner_radius` of `center`, 0 beyond
/// `outer_radius`, Hermite-interpolated in between.
///
/// Points and `center` live in normalized [0, 1] coordinates. The delta is
/// scaled to screen space by `screen_size` and the distance is normalized by
/// the screen diagonal, so radii are fractions of the diagonal.
///
/// With `wrap` set, each axis of the screen-space delta is shifted once by
/// ±1.0 when it falls outside [-0.5, 0.5].
#[derive(Debug, Clone, PartialEq)]
pub struct RadialFalloff {
    pub center: Point,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub screen_size: Point,
    pub wrap: bool,
}

impl RadialFalloff {
    /// Creates a wrapping radial falloff.
    pub fn new(center: Point, inner_radius: f64, outer_radius: f64, screen_size: Point) -> Self {
        Self {
            center,
            inner_radius,
            outer_radius,
            screen_size,
            wrap: true,
        }
    }

    pub fn with_wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }

    fn weight(&self, point: Point, diagonal: f64) -> f64 {
        let mut delta = self.screen_size * (point - self.center);
        if self.wrap {
            delta.x = wrap_axis(delta.x);
            delta.y = wrap_axis(delta.y);
        }
        let d = delta.length() / diagonal;
        if self.inner_radius == self.outer_radius {
            // Equal radii: hard edge at the radius.
            return if d <= self.inner_radius { 1.0 } else { 0.0 };
        }
        smoothstep(self.outer_radius, self.inner_radius, d)
    }
}

fn wrap_axis(v: f64) -> f64 {
    if v < -0.5 {
        v + 1.0
    } else if v > 0.5 {
        v - 1.0
    } else {
        v
    }
}

impl Falloff for RadialFalloff {
    fn evaluate(&self, points: &[Point]) -> Vec<f64> {
        let diagonal = self.screen_size.length();
        points.iter().map(|&p| self.weight(p, diagonal)).collect()
    }
}

/// Closed set of falloff kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum FalloffKind {
    Constant(ConstantFalloff),
    Radial(RadialFalloff),
}

impl Falloff for FalloffKind {
    fn evaluate(&self, points: &[Point]) -> Vec<f64> {
        match self {
            FalloffKind::Constant(f) => f.evaluate(points),
            FalloffKind::Radial(f) => f.evaluate(points),
        }
    }
}

impl From<ConstantFalloff> for FalloffKind {
    fn from(f: ConstantFalloff) -> Self {
        FalloffKind::Constant(f)
    }
}

impl From<RadialFalloff> for FalloffKind {
    fn from(f: RadialFalloff) -> Self {
        FalloffKind::Radial(f)
    }
}
