//! Perceptual pixel comparison.
//!
//! Two equally sized rasters are compared pixel by pixel in YIQ space.
//! Pixels whose perceptual distance exceeds the configured threshold are
//! counted as differences unless they look like anti-aliasing noise, and an
//! optional visualization marks every decision over a dimmed copy of the
//! left image.
//!
//! ```
//! use image::{Rgba, RgbaImage};
//! use pixelmatch::{MatchOptions, diff};
//!
//! let left = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
//! let mut right = left.clone();
//! right.put_pixel(1, 1, Rgba([255, 255, 255, 255]));
//!
//! let result = diff(&left, &right, &MatchOptions::default()).unwrap();
//! assert_eq!(result.diff_pixels, 1);
//! assert!(result.diff_image.is_some());
//! ```

use image::RgbaImage;
use thiserror::Error;

mod antialias;
pub mod color;
pub mod delta;
mod engine;
mod identical;
pub mod options;
#[cfg(feature = "parallel")]
pub mod parallel;
pub mod raster;
mod window;

pub use self::color::Color;
pub use self::delta::{MAX_YIQ_DELTA, color_delta};
pub use self::engine::{compare, compare_into, diff};
pub use self::options::{MatchOptions, MatchOptionsBuilder, OptionsError};
#[cfg(feature = "parallel")]
pub use self::parallel::{par_compare, par_compare_into, par_diff};
pub use self::raster::{Bounds, Raster, View};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MatchError {
    #[error("image sizes do not match: {left_w}x{left_h} vs {right_w}x{right_h}")]
    SizeMismatch {
        left_w: u32,
        left_h: u32,
        right_w: u32,
        right_h: u32,
    },

    #[error("output buffer is {out_w}x{out_h}, expected {width}x{height}")]
    OutputSize {
        width: u32,
        height: u32,
        out_w: u32,
        out_h: u32,
    },
}

#[derive(Debug, Clone)]
pub struct DiffResult {
    /// Number of pixels that differ above the threshold.
    pub diff_pixels: u64,
    /// Total number of pixels in the image.
    pub total_pixels: u64,
    /// Visualization, present when the entry point renders one.
    pub diff_image: Option<RgbaImage>,
}

impl DiffResult {
    /// 0.0 = identical, 1.0 = every pixel differs.
    pub fn score(&self) -> f64 {
        if self.total_pixels > 0 {
            self.diff_pixels as f64 / self.total_pixels as f64
        } else {
            0.0
        }
    }

    pub fn is_match(&self) -> bool {
        self.diff_pixels == 0
    }
}
