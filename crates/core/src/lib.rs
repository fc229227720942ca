#![deny(unsafe_code)]
//! Core types for the flowfield particle system.
//!
//! Provides the `Point` primitive with `rotate`/`smoothstep`, the `Falloff`
//! and `Field` evaluation traits with their closed kind enums, the
//! `ParticleSystem` store, `Scene` descriptions, the `Xorshift64` PRNG behind
//! the `RandomSource` trait, `Srgb` colors, and parameter helpers.

pub mod color;
pub mod error;
pub mod falloff;
pub mod field;
pub mod params;
pub mod particles;
pub mod point;
pub mod prng;
pub mod scene;

pub use color::{hsv_to_srgb, Srgb};
pub use error::FlowError;
pub use falloff::{ConstantFalloff, Falloff, FalloffKind, RadialFalloff};
pub use field::{
    BrownianField, Field, FieldKind, FieldOutput, LinearField, RadialField, SumField, VortexField,
    WaveField,
};
pub use particles::ParticleSystem;
pub use point::{rotate, smoothstep, Point};
pub use prng::{RandomSource, Xorshift64};
pub use scene::{ColorMode, FalloffSpec, FieldSpec, Scene};
