//! Math utilities
//!
//! Re-exports glam with the seeded hash and the texture scaling used by the
//! display.

pub use glam::*;

/// Seeded pseudo-random value in `[0, 1)` (mulberry32 finalizer).
///
/// Same seed, same value. This is the only deterministic randomness in the
/// simulation; everything else draws from an `Rng`.
pub fn random_fast(seed: u32) -> f64 {
    let seed = seed.wrapping_add(0x6D2B_79F5);
    let mut t = (seed ^ (seed >> 15)).wrapping_mul(1 | seed);
    t = t.wrapping_add((t ^ (t >> 7)).wrapping_mul(61 | t)) ^ t;
    f64::from(t ^ (t >> 14)) / 4_294_967_296.0
}

/// How the state texture is fitted into the viewport.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ScaleMode {
    SpanHeight,
    SpanWidth,
    /// Fit inside the viewport keeping the texture's aspect ratio.
    Preserve,
    /// Cover the viewport keeping the texture's aspect ratio.
    Stretch,
}

/// Matrix that scales the full-screen quad so texels stay square, flipping
/// y so tile 0 ends up top-left.
pub fn scale_frag_coords(texture: Vec2, viewport: Vec2, mode: ScaleMode) -> Mat3 {
    let viewport_ratio = viewport.x / viewport.y;
    let texture_ratio = texture.x / texture.y;

    let (scale_x, scale_y) = match mode {
        ScaleMode::SpanHeight => (texture_ratio / viewport_ratio, 1.0),
        ScaleMode::SpanWidth => (1.0, viewport_ratio / texture_ratio),
        ScaleMode::Preserve => {
            let scale_x = texture_ratio / viewport_ratio;
            if scale_x > 1.0 {
                (1.0, 1.0 / scale_x)
            } else {
                (scale_x, 1.0)
            }
        }
        ScaleMode::Stretch => {
            let scale_x = texture_ratio / viewport_ratio;
            if scale_x < 1.0 {
                (1.0, 1.0 / scale_x)
            } else {
                (scale_x, 1.0)
            }
        }
    };

    Mat3::from_diagonal(Vec3::new(scale_x, -scale_y, 1.0))
}
