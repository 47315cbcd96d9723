//! Row-band parallel comparison on the rayon pool.
//!
//! Rows are split into bands of [`BAND_ROWS`]. Each band scans with its own
//! row windows, which also decode the two rows above and below the band so
//! the anti-aliasing check sees the same neighbourhood as a sequential scan.
//! Results are identical to [`compare`](crate::compare) and
//! [`compare_into`](crate::compare_into).

use image::RgbaImage;
use rayon::prelude::*;
use tracing::debug;

use crate::engine::{check_output, check_sizes, render_preview, scan_rows};
use crate::identical::identical;
use crate::options::MatchOptions;
use crate::raster::Raster;
use crate::{DiffResult, MatchError};

/// Rows per parallel task.
pub const BAND_ROWS: u32 = 64;

fn band_count(height: u32) -> u32 {
    height.div_ceil(BAND_ROWS)
}

fn band(index: u32, height: u32) -> std::ops::Range<u32> {
    let start = index * BAND_ROWS;
    start..(start + BAND_ROWS).min(height)
}

/// Parallel [`compare`](crate::compare).
pub fn par_compare<A, B>(a: &A, b: &B, options: &MatchOptions) -> Result<DiffResult, MatchError>
where
    A: Raster + Sync + ?Sized,
    B: Raster + Sync + ?Sized,
{
    let (width, height) = check_sizes(a, b)?;
    let total_pixels = u64::from(width) * u64::from(height);

    let diff_pixels = if identical(a, b) {
        debug!(width, height, "images identical, skipping scan");
        0
    } else {
        debug!(bands = band_count(height), "scanning in parallel");
        (0..band_count(height))
            .into_par_iter()
            .map(|i| scan_rows(a, b, options, band(i, height), None))
            .sum::<u64>()
    };

    Ok(DiffResult {
        diff_pixels,
        total_pixels,
        diff_image: None,
    })
}

/// Parallel [`compare_into`](crate::compare_into). Each band writes only its
/// own rows of `out`.
pub fn par_compare_into<A, B>(
    a: &A,
    b: &B,
    options: &MatchOptions,
    out: &mut RgbaImage,
) -> Result<u64, MatchError>
where
    A: Raster + Sync + ?Sized,
    B: Raster + Sync + ?Sized,
{
    let (width, height) = check_sizes(a, b)?;
    check_output(width, height, out)?;

    if identical(a, b) {
        debug!(width, height, "images identical, rendering preview only");
        render_preview(a, options, out);
        return Ok(0);
    }
    if width == 0 || height == 0 {
        return Ok(0);
    }

    let band_bytes = width as usize * 4 * BAND_ROWS as usize;
    let buf: &mut [u8] = out;
    debug!(bands = band_count(height), "scanning in parallel");
    let diff_pixels = buf
        .par_chunks_mut(band_bytes)
        .enumerate()
        .map(|(i, chunk)| scan_rows(a, b, options, band(i as u32, height), Some(chunk)))
        .sum::<u64>();
    Ok(diff_pixels)
}

/// Parallel [`diff`](crate::diff).
pub fn par_diff<A, B>(a: &A, b: &B, options: &MatchOptions) -> Result<DiffResult, MatchError>
where
    A: Raster + Sync + ?Sized,
    B: Raster + Sync + ?Sized,
{
    let (width, height) = check_sizes(a, b)?;
    let mut out = RgbaImage::new(width, height);
    let diff_pixels = par_compare_into(a, b, options, &mut out)?;
    Ok(DiffResult {
        diff_pixels,
        total_pixels: u64::from(width) * u64::from(height),
        diff_image: Some(out),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{compare, diff};
    use image::Rgba;

    /// Tall image with diagonal edges crossing every band boundary, some
    /// smoothed, some with real changes.
    fn pair(height: u32) -> (RgbaImage, RgbaImage) {
        let width = 40;
        let a = RgbaImage::from_fn(width, height, |x, y| {
            if x > y % width { Rgba([0, 0, 0, 255]) } else { Rgba([255, 255, 255, 255]) }
        });
        let mut b = a.clone();
        for y in 0..height {
            let x = y % width;
            b.put_pixel(x, y, Rgba([128, 128, 128, 255]));
            if y % 17 == 0 {
                b.put_pixel((x + 20) % width, y, Rgba([0, 200, 0, 255]));
            }
        }
        (a, b)
    }

    #[test]
    fn bands_cover_all_rows() {
        assert_eq!(band_count(0), 0);
        assert_eq!(band_count(64), 1);
        assert_eq!(band_count(65), 2);
        assert_eq!(band(1, 100), 64..100);
    }

    #[test]
    fn parallel_count_matches_sequential() {
        let (a, b) = pair(300);
        for options in [
            MatchOptions::default(),
            MatchOptions::builder().include_anti_aliasing(true).build().unwrap(),
            MatchOptions::builder().threshold(0.6).build().unwrap(),
        ] {
            let seq = compare(&a, &b, &options).unwrap();
            let par = par_compare(&a, &b, &options).unwrap();
            assert_eq!(par.diff_pixels, seq.diff_pixels);
            assert_eq!(par.total_pixels, seq.total_pixels);
        }
    }

    #[test]
    fn parallel_image_matches_sequential() {
        let (a, b) = pair(200);
        let options = MatchOptions::builder()
            .diff_color_alt(Rgba([0, 0, 255, 255]))
            .build()
            .unwrap();
        let seq = diff(&a, &b, &options).unwrap();
        let par = par_diff(&a, &b, &options).unwrap();
        assert_eq!(par.diff_pixels, seq.diff_pixels);
        assert!(par.diff_pixels > 0);
        assert_eq!(par.diff_image, seq.diff_image);
    }

    #[test]
    fn parallel_size_mismatch() {
        let a = RgbaImage::new(3, 3);
        let b = RgbaImage::new(3, 4);
        assert!(matches!(
            par_compare(&a, &b, &MatchOptions::default()),
            Err(MatchError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn parallel_identical_renders_preview() {
        let (a, _) = pair(70);
        let seq = diff(&a, &a, &MatchOptions::default()).unwrap();
        let par = par_diff(&a, &a, &MatchOptions::default()).unwrap();
        assert_eq!(par.diff_pixels, 0);
        assert_eq!(par.diff_image, seq.diff_image);
    }
}
