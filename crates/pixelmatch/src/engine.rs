use std::ops::Range;

use image::{Rgba, RgbaImage};
use tracing::{debug, trace};

use crate::antialias::is_anti_aliased;
use crate::color::{Color, blend};
use crate::delta::color_delta;
use crate::identical::identical;
use crate::options::MatchOptions;
use crate::raster::Raster;
use crate::window::RowWindow;
use crate::{DiffResult, MatchError};

/// Written for background pixels when the diff mask is on.
const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// Count the pixels of `b` that visibly differ from `a`. No visualization
/// is rendered.
pub fn compare<A, B>(a: &A, b: &B, options: &MatchOptions) -> Result<DiffResult, MatchError>
where
    A: Raster + ?Sized,
    B: Raster + ?Sized,
{
    let (width, height) = check_sizes(a, b)?;
    let total_pixels = u64::from(width) * u64::from(height);

    if identical(a, b) {
        debug!(width, height, "images identical, skipping scan");
        return Ok(DiffResult {
            diff_pixels: 0,
            total_pixels,
            diff_image: None,
        });
    }

    let diff_pixels = scan_rows(a, b, options, 0..height, None);
    debug!(diff_pixels, total_pixels, "scan complete");
    Ok(DiffResult {
        diff_pixels,
        total_pixels,
        diff_image: None,
    })
}

/// Compare and render the visualization into `out`, which must have the
/// size of the inputs. Every pixel of `out` is overwritten; output (0, 0)
/// is the top-left pixel of the inputs' bounds.
pub fn compare_into<A, B>(
    a: &A,
    b: &B,
    options: &MatchOptions,
    out: &mut RgbaImage,
) -> Result<u64, MatchError>
where
    A: Raster + ?Sized,
    B: Raster + ?Sized,
{
    let (width, height) = check_sizes(a, b)?;
    check_output(width, height, out)?;

    if identical(a, b) {
        debug!(width, height, "images identical, rendering preview only");
        render_preview(a, options, out);
        return Ok(0);
    }

    let buf: &mut [u8] = out;
    let diff_pixels = scan_rows(a, b, options, 0..height, Some(buf));
    debug!(diff_pixels, width, height, "scan complete");
    Ok(diff_pixels)
}

/// Compare and return a freshly rendered visualization with the count.
pub fn diff<A, B>(a: &A, b: &B, options: &MatchOptions) -> Result<DiffResult, MatchError>
where
    A: Raster + ?Sized,
    B: Raster + ?Sized,
{
    let (width, height) = check_sizes(a, b)?;
    let mut out = RgbaImage::new(width, height);
    let diff_pixels = compare_into(a, b, options, &mut out)?;
    Ok(DiffResult {
        diff_pixels,
        total_pixels: u64::from(width) * u64::from(height),
        diff_image: Some(out),
    })
}

pub(crate) fn check_sizes<A, B>(a: &A, b: &B) -> Result<(u32, u32), MatchError>
where
    A: Raster + ?Sized,
    B: Raster + ?Sized,
{
    let (left_w, left_h) = a.bounds().dimensions();
    let (right_w, right_h) = b.bounds().dimensions();
    if (left_w, left_h) != (right_w, right_h) {
        return Err(MatchError::SizeMismatch {
            left_w,
            left_h,
            right_w,
            right_h,
        });
    }
    Ok((left_w, left_h))
}

pub(crate) fn check_output(width: u32, height: u32, out: &RgbaImage) -> Result<(), MatchError> {
    let (out_w, out_h) = out.dimensions();
    if (out_w, out_h) != (width, height) {
        return Err(MatchError::OutputSize {
            width,
            height,
            out_w,
            out_h,
        });
    }
    Ok(())
}

/// Dimmed grayscale rendering of `a` alone, used when there is nothing to
/// highlight.
pub(crate) fn render_preview<A>(a: &A, options: &MatchOptions, out: &mut [u8])
where
    A: Raster + ?Sized,
{
    let bounds = a.bounds();
    let row_bytes = bounds.width as usize * 4;
    if row_bytes == 0 {
        return;
    }
    let mut line = Vec::with_capacity(bounds.width as usize);
    for (y, row) in (bounds.y..bounds.bottom()).zip(out.chunks_exact_mut(row_bytes)) {
        if options.diff_mask() {
            row.fill(0);
            continue;
        }
        a.read_row(y, &mut line);
        for (px, color) in row.chunks_exact_mut(4).zip(&line) {
            px.copy_from_slice(&gray_pixel(*color, options.alpha()));
        }
    }
}

/// Scan `rows` (relative to the inputs' origin) and return the number of
/// differing pixels. When `out` is given it holds exactly those rows of the
/// visualization, four bytes per pixel.
pub(crate) fn scan_rows<A, B>(
    a: &A,
    b: &B,
    options: &MatchOptions,
    rows: Range<u32>,
    mut out: Option<&mut [u8]>,
) -> u64
where
    A: Raster + ?Sized,
    B: Raster + ?Sized,
{
    let first = rows.start;
    let mut left = RowWindow::new(a, rows.clone());
    let mut right = RowWindow::new(b, rows);
    let width = left.width();
    let row_bytes = width as usize * 4;
    let max_delta = options.max_delta();
    let mask = options.diff_mask();
    let mut diff = 0u64;

    while left.advance() && right.advance() {
        let Some(y) = left.current() else { break };
        let mut line = out.as_deref_mut().and_then(|buf| {
            let start = (y - first) as usize * row_bytes;
            buf.get_mut(start..start + row_bytes)
        });

        for x in 0..width {
            let pa = left.pixel(x, y);
            let pb = right.pixel(x, y);
            let delta = color_delta(pa, pb, false);

            let marker = if delta.abs() <= max_delta {
                match &line {
                    Some(_) if !mask => Some(gray_pixel(pa, options.alpha())),
                    _ => None,
                }
            } else if !options.include_anti_aliasing()
                && (is_anti_aliased(&left, &right, x, y) || is_anti_aliased(&right, &left, x, y))
            {
                trace!(x, y, "anti-aliased pixel ignored");
                (!mask).then(|| opaque(options.anti_aliased_color()))
            } else {
                diff += 1;
                let color = match options.diff_color_alt() {
                    Some(alt) if delta < 0.0 => alt,
                    _ => options.diff_color(),
                };
                Some(opaque(color))
            };

            if let Some(line) = line.as_deref_mut() {
                let i = x as usize * 4;
                line[i..i + 4].copy_from_slice(&marker.unwrap_or(TRANSPARENT));
            }
        }
    }
    diff
}

/// The left pixel's luma, faded toward white by `alpha` times its coverage.
fn gray_pixel(color: Color, alpha: f64) -> [u8; 4] {
    let v = blend(color.y(), alpha * color.a / 255.0) as u8;
    [v, v, v, 255]
}

fn opaque(Rgba([r, g, b, _]): Rgba<u8>) -> [u8; 4] {
    [r, g, b, 255]
}
