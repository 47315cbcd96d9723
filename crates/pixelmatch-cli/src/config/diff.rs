use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use image::Rgba;
use pixelmatch::MatchOptions;
use serde::{Deserialize, Serialize};

use super::{parse_unit, validate_unit};

/// An RGBA color written as `#rrggbb`, `rrggbb` or `#rrggbbaa`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(pub Rgba<u8>);

impl FromStr for HexColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if !matches!(hex.len(), 6 | 8) || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(format!(
                "invalid color `{s}`, expected #rrggbb or #rrggbbaa"
            ));
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| e.to_string());
        let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Self(Rgba([channel(0)?, channel(2)?, channel(4)?, alpha])))
    }
}

impl TryFrom<String> for HexColor {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<HexColor> for String {
    fn from(c: HexColor) -> Self {
        c.to_string()
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.0.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")?;
        if a != 255 {
            write!(f, "{a:02x}")?;
        }
        Ok(())
    }
}

/// Comparison settings.
///
/// Every field is `Option`: `None` means "not set at this layer".
/// Serves both TOML deserialization (`[diff]`) and CLI argument parsing.
#[derive(Clone, Debug, Default, PartialEq, clap::Args, Serialize, Deserialize)]
pub struct DiffConfig {
    /// Matching threshold (0.0–1.0); smaller is more sensitive
    #[arg(long, short = 't', value_parser = parse_unit)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,

    /// Count anti-aliased pixels as differences
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_aa: Option<bool>,

    /// Opacity of the reference image in the diff output (0.0–1.0)
    #[arg(long, value_parser = parse_unit)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,

    /// Color of anti-aliased pixels in the diff output
    #[arg(long, value_name = "HEX")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aa_color: Option<HexColor>,

    /// Color of differing pixels in the diff output
    #[arg(long, value_name = "HEX")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_color: Option<HexColor>,

    /// Color of pixels that got darker, to tell them from lighter ones
    #[arg(long, value_name = "HEX")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_color_alt: Option<HexColor>,

    /// Draw the diff over a transparent background
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_mask: Option<bool>,
}

impl DiffConfig {
    /// Overlay non-None fields from `other` onto self.
    pub fn merge(&mut self, other: &DiffConfig) {
        if other.threshold.is_some() {
            self.threshold = other.threshold;
        }
        if other.include_aa.is_some() {
            self.include_aa = other.include_aa;
        }
        if other.alpha.is_some() {
            self.alpha = other.alpha;
        }
        if other.aa_color.is_some() {
            self.aa_color = other.aa_color;
        }
        if other.diff_color.is_some() {
            self.diff_color = other.diff_color;
        }
        if other.diff_color_alt.is_some() {
            self.diff_color_alt = other.diff_color_alt;
        }
        if other.diff_mask.is_some() {
            self.diff_mask = other.diff_mask;
        }
    }

    /// Read the `PIXELMATCH_*` variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let unit = |name: &str| -> Result<Option<f64>> {
            lookup(name)
                .map(|v| {
                    let v: f64 = v
                        .trim()
                        .parse()
                        .with_context(|| format!("{name} must be a valid float"))?;
                    validate_unit(v).map_err(|e| anyhow!("{name} {e}"))
                })
                .transpose()
        };
        let flag = |name: &str| -> Result<Option<bool>> {
            lookup(name)
                .map(|v| match v.trim().to_ascii_lowercase().as_str() {
                    "1" | "true" | "yes" => Ok(true),
                    "0" | "false" | "no" => Ok(false),
                    other => Err(anyhow!("{name} must be a boolean, got `{other}`")),
                })
                .transpose()
        };
        let color = |name: &str| -> Result<Option<HexColor>> {
            lookup(name)
                .map(|v| v.trim().parse().map_err(|e| anyhow!("{name}: {e}")))
                .transpose()
        };

        Ok(Self {
            threshold: unit("PIXELMATCH_THRESHOLD")?,
            include_aa: flag("PIXELMATCH_INCLUDE_AA")?,
            alpha: unit("PIXELMATCH_ALPHA")?,
            aa_color: color("PIXELMATCH_AA_COLOR")?,
            diff_color: color("PIXELMATCH_DIFF_COLOR")?,
            diff_color_alt: color("PIXELMATCH_DIFF_COLOR_ALT")?,
            diff_mask: flag("PIXELMATCH_DIFF_MASK")?,
        })
    }

    /// Fill unset fields with library defaults.
    pub fn to_options(&self) -> Result<MatchOptions> {
        let mut builder = MatchOptions::builder();
        if let Some(v) = self.threshold {
            builder = builder.threshold(v);
        }
        if let Some(v) = self.include_aa {
            builder = builder.include_anti_aliasing(v);
        }
        if let Some(v) = self.alpha {
            builder = builder.alpha(v);
        }
        if let Some(HexColor(c)) = self.aa_color {
            builder = builder.anti_aliased_color(c);
        }
        if let Some(HexColor(c)) = self.diff_color {
            builder = builder.diff_color(c);
        }
        if let Some(HexColor(c)) = self.diff_color_alt {
            builder = builder.diff_color_alt(c);
        }
        if let Some(v) = self.diff_mask {
            builder = builder.diff_mask(v);
        }
        Ok(builder.build()?)
    }
}
