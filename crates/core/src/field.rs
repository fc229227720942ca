//! Vector fields evaluated over point clouds.
//!
//! A [`Field`] maps a slice of points to a [`FieldOutput`]: one displacement
//! vector and one falloff weight per point. The concrete kinds are linear,
//! radial, vortex, wave, Brownian and sum; [`FieldKind`] is the closed union
//! over them and is what scenes and [`SumField`] store.
//!
//! Every evaluator returns outputs of exactly `points.len()` entries.

use crate::point::{rotate, smoothstep, Point};
use crate::prng::{RandomSource, Xorshift64};
use std::f64::consts::TAU;

/// Screen-space distance below which the radial field leaves a point untouched.
pub const RADIAL_DEAD_ZONE: f64 = 1.0;

/// Smallest distance the vortex field divides by.
pub const VORTEX_MIN_DISTANCE: f64 = 0.001;

/// Per-point displacement and falloff weight.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldOutput {
    pub field: Vec<Point>,
    pub falloff: Vec<f64>,
}

impl FieldOutput {
    /// `n` zero displacements with zero weight.
    pub fn zeros(n: usize) -> Self {
        Self {
            field: vec![Point::ZERO; n],
            falloff: vec![0.0; n],
        }
    }

    /// `n` copies of `displacement` with weight 1.
    pub fn uniform(n: usize, displacement: Point) -> Self {
        Self {
            field: vec![displacement; n],
            falloff: vec![1.0; n],
        }
    }

    pub fn len(&self) -> usize {
        self.field.len()
    }

    pub fn is_empty(&self) -> bool {
        self.field.is_empty()
    }

    /// Adds `other` elementwise into `self`, displacement and falloff alike.
    ///
    /// Both outputs must come from the same point set.
    pub fn accumulate(&mut self, other: &FieldOutput) {
        debug_assert_eq!(self.len(), other.len());
        self.field
            .iter_mut()
            .zip(&other.field)
            .for_each(|(a, b)| *a += *b);
        self.falloff
            .iter_mut()
            .zip(&other.falloff)
            .for_each(|(a, b)| *a += *b);
    }
}

/// Anything that turns a point set into per-point displacement and weight.
///
/// The receiver is mutable because stochastic fields advance their random
/// source on every evaluation.
pub trait Field {
    fn evaluate(&mut self, points: &[Point]) -> FieldOutput;
}

// ---------------------------------------------------------------------------
// Linear
// ---------------------------------------------------------------------------

/// Uniform displacement `direction` everywhere, weight 1.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearField {
    pub direction: Point,
}

impl LinearField {
    pub fn new(direction: Point) -> Self {
        Self { direction }
    }

    pub fn set_direction(&mut self, direction: Point) -> &mut Self {
        self.direction = direction;
        self
    }
}

impl Field for LinearField {
    fn evaluate(&mut self, points: &[Point]) -> FieldOutput {
        FieldOutput::uniform(points.len(), self.direction)
    }
}

// ---------------------------------------------------------------------------
// Radial
// ---------------------------------------------------------------------------

/// Attracts (negative `magnitude`) or repels (positive) points from `center`.
///
/// Distances are measured in screen space (`screen_size` times the normalized
/// delta). Strength decays as `smoothstep(0.5, 0, d / diagonal) / d` and
/// vanishes at half the screen diagonal. Points within
/// [`RADIAL_DEAD_ZONE`] of the center keep a zero displacement and zero weight.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialField {
    pub center: Point,
    pub magnitude: f64,
    pub screen_size: Point,
}

impl RadialField {
    pub fn new(center: Point, magnitude: f64, screen_size: Point) -> Self {
        Self {
            center,
            magnitude,
            screen_size,
        }
    }

    pub fn set_center(&mut self, center: Point) -> &mut Self {
        self.center = center;
        self
    }

    pub fn set_magnitude(&mut self, magnitude: f64) -> &mut Self {
        self.magnitude = magnitude;
        self
    }

    pub fn set_screen_size(&mut self, screen_size: Point) -> &mut Self {
        self.screen_size = screen_size;
        self
    }
}

impl Field for RadialField {
    fn evaluate(&mut self, points: &[Point]) -> FieldOutput {
        let diagonal = self.screen_size.length();
        let mut out = FieldOutput::zeros(points.len());
        for (i, &p) in points.iter().enumerate() {
            let delta = self.screen_size * (p - self.center);
            let d = delta.length();
            if d <= RADIAL_DEAD_ZONE {
                continue;
            }
            let scale = self.magnitude * smoothstep(0.5, 0.0, d / diagonal) / d;
            out.field[i] = scale * delta / self.screen_size;
            out.falloff[i] = 1.0;
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Vortex
// ---------------------------------------------------------------------------

/// Rotation about `center` with angular velocity `omega`.
///
/// Each offset is rotated by `omega / 2π` radians and the displacement is the
/// change in offset divided by the distance (floored at
/// [`VORTEX_MIN_DISTANCE`]).
#[derive(Debug, Clone, PartialEq)]
pub struct VortexField {
    pub center: Point,
    pub omega: f64,
}

impl VortexField {
    pub fn new(center: Point, omega: f64) -> Self {
        Self { center, omega }
    }

    pub fn set_center(&mut self, center: Point) -> &mut Self {
        self.center = center;
        self
    }

    pub fn set_omega(&mut self, omega: f64) -> &mut Self {
        self.omega = omega;
        self
    }
}

impl Field for VortexField {
    fn evaluate(&mut self, points: &[Point]) -> FieldOutput {
        let angle = self.omega / TAU;
        let field = points
            .iter()
            .map(|&p| {
                let offset = p - self.center;
                let d = offset.length().max(VORTEX_MIN_DISTANCE);
                (rotate(offset, angle) - offset) / d
            })
            .collect();
        FieldOutput {
            field,
            falloff: vec![1.0; points.len()],
        }
    }
}

// ---------------------------------------------------------------------------
// Wave
// ---------------------------------------------------------------------------

/// Sinusoidal displacement perpendicular to the propagation `axis`.
///
/// Phase term `t = 2π (frequency · dot(p, axis) + phase)`; the wave
/// `magnitude · cos t` is applied along `axis` rotated by 90°.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveField {
    pub axis: Point,
    pub magnitude: f64,
    pub frequency: f64,
    pub phase: f64,
}

impl WaveField {
    pub fn new(axis: Point, magnitude: f64, frequency: f64, phase: f64) -> Self {
        Self {
            axis,
            magnitude,
            frequency,
            phase,
        }
    }

    pub fn set_axis(&mut self, axis: Point) -> &mut Self {
        self.axis = axis;
        self
    }

    pub fn set_magnitude(&mut self, magnitude: f64) -> &mut Self {
        self.magnitude = magnitude;
        self
    }

    pub fn set_frequency(&mut self, frequency: f64) -> &mut Self {
        self.frequency = frequency;
        self
    }

    pub fn set_phase(&mut self, phase: f64) -> &mut Self {
        self.phase = phase;
        self
    }
}

impl Field for WaveField {
    fn evaluate(&mut self, points: &[Point]) -> FieldOutput {
        let normal = self.axis.perp();
        let field = points
            .iter()
            .map(|&p| {
                let t = TAU * (self.frequency * p.dot(self.axis) + self.phase);
                self.magnitude * t.cos() * normal
            })
            .collect();
        FieldOutput {
            field,
            falloff: vec![1.0; points.len()],
        }
    }
}

// ---------------------------------------------------------------------------
// Brownian
// ---------------------------------------------------------------------------

/// Independent uniform jitter per point, scaled per axis by `magnitude`.
///
/// Each component is `magnitude · (U − 0.5)` with a fresh draw `U` from the
/// owned random source (x first, then y, point by point).
#[derive(Debug, Clone, PartialEq)]
pub struct BrownianField<R = Xorshift64> {
    pub magnitude: Point,
    rng: R,
}

impl<R: RandomSource> BrownianField<R> {
    pub fn new(magnitude: Point, rng: R) -> Self {
        Self { magnitude, rng }
    }

    pub fn set_magnitude(&mut self, magnitude: Point) -> &mut Self {
        self.magnitude = magnitude;
        self
    }

    /// The random source, e.g. to snapshot its state.
    pub fn rng(&self) -> &R {
        &self.rng
    }
}

impl<R: RandomSource> Field for BrownianField<R> {
    fn evaluate(&mut self, points: &[Point]) -> FieldOutput {
        let field = points
            .iter()
            .map(|_| {
                let ux = self.rng.next_f64() - 0.5;
                let uy = self.rng.next_f64() - 0.5;
                Point::new(self.magnitude.x * ux, self.magnitude.y * uy)
            })
            .collect();
        FieldOutput {
            field,
            falloff: vec![1.0; points.len()],
        }
    }
}

// ---------------------------------------------------------------------------
// Sum
// ---------------------------------------------------------------------------

/// Elementwise sum of sub-field outputs.
///
/// Falloff weights are added, not averaged: two constituents with weight 1
/// give weight 2. An empty sum yields zero displacement and zero weight.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SumField {
    fields: Vec<FieldKind>,
}

impl SumField {
    pub fn new(fields: Vec<FieldKind>) -> Self {
        Self { fields }
    }

    pub fn add_field(&mut self, field: impl Into<FieldKind>) -> &mut Self {
        self.fields.push(field.into());
        self
    }

    pub fn fields(&self) -> &[FieldKind] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Field for SumField {
    fn evaluate(&mut self, points: &[Point]) -> FieldOutput {
        let mut total = FieldOutput::zeros(points.len());
        for field in &mut self.fields {
            total.accumulate(&field.evaluate(points));
        }
        total
    }
}

// ---------------------------------------------------------------------------
// Closed union
// ---------------------------------------------------------------------------

/// Every field kind, dispatched by exhaustive match.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Linear(LinearField),
    Radial(RadialField),
    Vortex(VortexField),
    Wave(WaveField),
    Brownian(BrownianField),
    Sum(SumField),
}

impl FieldKind {
    /// Short snake_case name of the kind, as used in scene files.
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Linear(_) => "linear",
            FieldKind::Radial(_) => "radial",
            FieldKind::Vortex(_) => "vortex",
            FieldKind::Wave(_) => "wave",
            FieldKind::Brownian(_) => "brownian",
            FieldKind::Sum(_) => "sum",
        }
    }
}

impl Field for FieldKind {
    fn evaluate(&mut self, points: &[Point]) -> FieldOutput {
        match self {
            FieldKind::Linear(f) => f.evaluate(points),
            FieldKind::Radial(f) => f.evaluate(points),
            FieldKind::Vortex(f) => f.evaluate(points),
            FieldKind::Wave(f) => f.evaluate(points),
            FieldKind::Brownian(f) => f.evaluate(points),
            FieldKind::Sum(f) => f.evaluate(points),
        }
    }
}

macro_rules! impl_from_field {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for FieldKind {
                fn from(f: $ty) -> Self {
                    FieldKind::$variant(f)
                }
            }
        )*
    };
}

impl_from_field! {
    LinearField => Linear,
    RadialField => Radial,
    VortexField => Vortex,
    WaveField => Wave,
    BrownianField => Brownian,
    SumField => Sum,
}
