//! Pure-computation RGBA rasterization of a [`ParticleSystem`].
//!
//! Kept free of the `image` crate so callers without the `png` feature can
//! still hand the buffer to their own presentation layer.

use flowfield_core::{ParticleSystem, Srgb};

/// Rasterizes particles as alpha-blended discs over an opaque background.
///
/// Particle `i` is drawn centered at `position × (width, height)` with radius
/// `radius` in pixels, in storage order, so later particles paint over earlier
/// ones. A pixel is covered when its center lies within the radius. Alpha is
/// clamped to [0, 1]. The buffer is row-major, four bytes per pixel, with
/// alpha always 255.
pub fn particles_to_rgba(
    particles: &ParticleSystem,
    width: usize,
    height: usize,
    background: Srgb,
) -> Vec<u8> {
    let mut canvas = vec![[background.r, background.g, background.b]; width * height];
    let (wf, hf) = (width as f64, height as f64);

    let discs = particles
        .positions()
        .iter()
        .zip(particles.radii())
        .zip(particles.colors().iter().zip(particles.alphas()));
    for ((pos, &radius), (color, &alpha)) in discs {
        let alpha = alpha.clamp(0.0, 1.0);
        if alpha == 0.0 || radius <= 0.0 || !pos.is_finite() {
            continue;
        }
        let (cx, cy) = (pos.x * wf, pos.y * hf);
        let x0 = (cx - radius).floor().max(0.0);
        let y0 = (cy - radius).floor().max(0.0);
        let x1 = (cx + radius).ceil().min(wf);
        let y1 = (cy + radius).ceil().min(hf);
        if x0 >= x1 || y0 >= y1 {
            continue;
        }

        let r2 = radius * radius;
        for y in y0 as usize..y1 as usize {
            let dy = y as f64 + 0.5 - cy;
            for x in x0 as usize..x1 as usize {
                let dx = x as f64 + 0.5 - cx;
                if dx * dx + dy * dy > r2 {
                    continue;
                }
                let px = &mut canvas[y * width + x];
                px[0] += (color.r - px[0]) * alpha;
                px[1] += (color.g - px[1]) * alpha;
                px[2] += (color.b - px[2]) * alpha;
            }
        }
    }

    canvas
        .iter()
        .flat_map(|&[r, g, b]| {
            let [r, g, b] = Srgb::new(r, g, b).to_rgb8();
            [r, g, b, 255u8]
        })
        .collect()
}
