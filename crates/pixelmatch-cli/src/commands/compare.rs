use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use image::{DynamicImage, ImageReader};
use pixelmatch::{DiffResult, MatchError, MatchOptions};
use tracing::debug;

use crate::config::ResolvedRunConfig;
use crate::report::terminal::{self, Outcome};

/// Compare two image files, write the diff image if asked, and return the
/// process exit code (0 = match, 1 = differences).
pub fn compare(left: &Path, right: &Path, config: ResolvedRunConfig) -> Result<i32> {
    let start = Instant::now();
    let name = format!("{} vs {}", left.display(), right.display());

    let left_img = open_image(left)?;
    let right_img = open_image(right)?;
    debug!(
        left = ?left_img.color(),
        right = ?right_img.color(),
        "decoded images"
    );

    configure_pool(config.jobs)?;
    let with_image = config.destination.is_some();
    let result = match run_comparison(&left_img, &right_img, &config.options, with_image, config.jobs)
    {
        Ok(result) => result,
        Err(MatchError::SizeMismatch {
            left_w,
            left_h,
            right_w,
            right_h,
        }) => {
            let outcome = Outcome::DimensionMismatch {
                left: (left_w, left_h),
                right: (right_w, right_h),
            };
            terminal::print_line(&name, &outcome, start.elapsed());
            return Ok(outcome.exit_code());
        }
        Err(e) => return Err(e.into()),
    };

    if let (Some(destination), Some(image)) = (&config.destination, &result.diff_image) {
        destination.write(image)?;
    }

    let outcome = if result.is_match() {
        Outcome::Match {
            total_pixels: result.total_pixels,
        }
    } else {
        Outcome::Differ {
            diff_pixels: result.diff_pixels,
            total_pixels: result.total_pixels,
            score: result.score(),
        }
    };
    debug!(diff_pixels = result.diff_pixels, "comparison finished");
    terminal::print_line(&name, &outcome, start.elapsed());
    Ok(outcome.exit_code())
}

fn open_image(path: &Path) -> Result<DynamicImage> {
    ImageReader::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("Failed to read {}", path.display()))?
        .decode()
        .with_context(|| format!("Failed to decode {}", path.display()))
}

fn run_sequential(
    left: &DynamicImage,
    right: &DynamicImage,
    options: &MatchOptions,
    with_image: bool,
) -> Result<DiffResult, MatchError> {
    if with_image {
        pixelmatch::diff(left, right, options)
    } else {
        pixelmatch::compare(left, right, options)
    }
}

#[cfg(feature = "parallel")]
fn run_comparison(
    left: &DynamicImage,
    right: &DynamicImage,
    options: &MatchOptions,
    with_image: bool,
    jobs: Option<usize>,
) -> Result<DiffResult, MatchError> {
    if jobs == Some(1) {
        return run_sequential(left, right, options, with_image);
    }
    if with_image {
        pixelmatch::par_diff(left, right, options)
    } else {
        pixelmatch::par_compare(left, right, options)
    }
}

#[cfg(not(feature = "parallel"))]
fn run_comparison(
    left: &DynamicImage,
    right: &DynamicImage,
    options: &MatchOptions,
    with_image: bool,
    _jobs: Option<usize>,
) -> Result<DiffResult, MatchError> {
    run_sequential(left, right, options, with_image)
}

#[cfg(feature = "parallel")]
fn configure_pool(jobs: Option<usize>) -> Result<()> {
    if let Some(n) = jobs.filter(|&n| n > 1) {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .context("Failed to start the worker pool")?;
        debug!(threads = n, "configured worker pool");
    }
    Ok(())
}

#[cfg(not(feature = "parallel"))]
fn configure_pool(jobs: Option<usize>) -> Result<()> {
    if jobs.is_some_and(|n| n > 1) {
        tracing::warn!("built without the `parallel` feature, --jobs is ignored");
    }
    Ok(())
}
