//! Perceptual color distance.
//!
//! Distances follow "Measuring perceived color difference using YIQ NTSC
//! transmission color space in mobile applications" (Kotsarenko, Ramos):
//! a weighted squared distance over luma and both chroma axes.

use crate::color::Color;

/// Largest magnitude [`color_delta`] can return over the 8-bit range.
pub const MAX_YIQ_DELTA: f64 = 35215.0;

/// Absolute squared-distance cutoff for a `threshold` in `0.0..=1.0`.
pub fn max_delta(threshold: f64) -> f64 {
    MAX_YIQ_DELTA * threshold * threshold
}

/// Signed perceptual distance between two colors.
///
/// Identical colors give exactly `0.0`. With `luma_only` the result is the
/// plain luma difference `Y(a) - Y(b)`. Otherwise it is the weighted YIQ
/// distance, negative when `b` is darker than `a`.
pub fn color_delta(a: Color, b: Color, luma_only: bool) -> f64 {
    if a == b {
        return 0.0;
    }

    let a = a.blend_white();
    let b = b.blend_white();

    let ya = a.y();
    let yb = b.y();
    let y = ya - yb;

    if luma_only {
        return y;
    }

    let i = a.i() - b.i();
    let q = a.q() - b.q();
    let delta = 0.5053 * y * y + 0.299 * i * i + 0.1957 * q * q;

    if ya > yb { -delta } else { delta }
}
