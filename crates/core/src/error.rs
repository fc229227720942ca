//! Error types for the flowfield core.

use thiserror::Error;

/// Errors produced while building scenes, simulations and snapshots.
///
/// Field and falloff evaluation itself is total and never returns this type.
#[derive(Debug, Error)]
pub enum FlowError {
    /// A grid or screen dimension was zero, or `width * height` overflowed.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// A scene description was structurally valid JSON but semantically unusable.
    #[error("invalid scene: {0}")]
    InvalidScene(String),

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// Writing an output file failed.
    #[error("I/O error: {0}")]
    Io(String),
}
