use image::Rgba;
use thiserror::Error;

use crate::delta::max_delta;

#[derive(Debug, Error, PartialEq)]
pub enum OptionsError {
    #[error("{name} must be between 0.0 and 1.0, got {value}")]
    OutOfRange { name: &'static str, value: f64 },
}

/// Settings for one comparison. Built once, never changed while a scan runs.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchOptions {
    threshold: f64,
    include_anti_aliasing: bool,
    alpha: f64,
    anti_aliased_color: Rgba<u8>,
    diff_color: Rgba<u8>,
    diff_color_alt: Option<Rgba<u8>>,
    diff_mask: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            include_anti_aliasing: false,
            alpha: 0.1,
            anti_aliased_color: Rgba([255, 255, 0, 255]),
            diff_color: Rgba([255, 0, 0, 255]),
            diff_color_alt: None,
            diff_mask: false,
        }
    }
}

impl MatchOptions {
    pub fn builder() -> MatchOptionsBuilder {
        MatchOptionsBuilder::default()
    }

    /// Start a builder from these settings.
    pub fn to_builder(&self) -> MatchOptionsBuilder {
        MatchOptionsBuilder {
            options: self.clone(),
        }
    }

    /// Perceptual sensitivity, 0.0 (any change counts) to 1.0 (nothing does).
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Squared YIQ distance a pixel pair must exceed to differ.
    pub fn max_delta(&self) -> f64 {
        max_delta(self.threshold)
    }

    /// When true, anti-aliased pixels are counted like any other difference.
    pub fn include_anti_aliasing(&self) -> bool {
        self.include_anti_aliasing
    }

    /// Opacity of the left image in the dimmed visualization background.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn anti_aliased_color(&self) -> Rgba<u8> {
        self.anti_aliased_color
    }

    pub fn diff_color(&self) -> Rgba<u8> {
        self.diff_color
    }

    /// Marker for pixels that got darker, if set.
    pub fn diff_color_alt(&self) -> Option<Rgba<u8>> {
        self.diff_color_alt
    }

    /// When true, the visualization shows only differing pixels over a
    /// transparent background.
    pub fn diff_mask(&self) -> bool {
        self.diff_mask
    }
}

/// Fluent constructor for [`MatchOptions`]. Unset fields keep their defaults.
///
/// ```
/// use image::Rgba;
/// use pixelmatch::MatchOptions;
///
/// let options = MatchOptions::builder()
///     .threshold(0.05)
///     .diff_color_alt(Rgba([0, 128, 255, 255]))
///     .diff_mask(true)
///     .build()
///     .unwrap();
/// assert_eq!(options.threshold(), 0.05);
/// ```
#[derive(Clone, Debug, Default)]
pub struct MatchOptionsBuilder {
    options: MatchOptions,
}

impl MatchOptionsBuilder {
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.options.threshold = threshold;
        self
    }

    pub fn include_anti_aliasing(mut self, include: bool) -> Self {
        self.options.include_anti_aliasing = include;
        self
    }

    pub fn alpha(mut self, alpha: f64) -> Self {
        self.options.alpha = alpha;
        self
    }

    pub fn anti_aliased_color(mut self, color: Rgba<u8>) -> Self {
        self.options.anti_aliased_color = color;
        self
    }

    pub fn diff_color(mut self, color: Rgba<u8>) -> Self {
        self.options.diff_color = color;
        self
    }

    pub fn diff_color_alt(mut self, color: Rgba<u8>) -> Self {
        self.options.diff_color_alt = Some(color);
        self
    }

    pub fn diff_mask(mut self, mask: bool) -> Self {
        self.options.diff_mask = mask;
        self
    }

    pub fn build(self) -> Result<MatchOptions, OptionsError> {
        check_unit("threshold", self.options.threshold)?;
        check_unit("alpha", self.options.alpha)?;
        Ok(self.options)
    }
}

fn check_unit(name: &'static str, value: f64) -> Result<(), OptionsError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(OptionsError::OutOfRange { name, value });
    }
    Ok(())
}
