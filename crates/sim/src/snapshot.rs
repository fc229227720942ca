//! PNG output of a particle system.
//!
//! Feature-gated behind `png` (default on). Rasterization lives in
//! [`crate::pixel`], which is always available.

use flowfield_core::error::FlowError;
use flowfield_core::{ParticleSystem, Srgb};
use std::path::Path;

use crate::pixel::particles_to_rgba;

/// Rasterizes `particles` at `width × height` and writes the result as PNG.
///
/// Returns `FlowError::InvalidDimensions` for zero or `u32`-overflowing
/// dimensions, or `FlowError::Io` on write failure.
pub fn write_png(
    particles: &ParticleSystem,
    width: usize,
    height: usize,
    background: Srgb,
    path: &Path,
) -> Result<(), FlowError> {
    if width == 0 || height == 0 {
        return Err(FlowError::InvalidDimensions);
    }
    let w = u32::try_from(width).map_err(|_| FlowError::InvalidDimensions)?;
    let h = u32::try_from(height).map_err(|_| FlowError::InvalidDimensions)?;
    let rgba = particles_to_rgba(particles, width, height, background);
    let img = image::RgbaImage::from_raw(w, h, rgba)
        .ok_or_else(|| FlowError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| FlowError::Io(e.to_string()))
}
