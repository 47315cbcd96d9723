//! Canonical pixel values and their YIQ projections.
//!
//! Every raster pixel is normalised to a [`Color`]: premultiplied alpha, all
//! four channels on the 8-bit scale `0.0..=255.0` whatever the source depth.
//! Rasters hand out straight alpha (the `image` convention) and are
//! premultiplied on the way in. Translucent colors are then composited over
//! white before any perceptual math.

use image::Rgba;

/// A pixel on the 8-bit scale with premultiplied alpha.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const WHITE: Color = Color::new(255.0, 255.0, 255.0, 255.0);

    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Premultiply straight-alpha channels.
    pub fn from_straight(r: f64, g: f64, b: f64, a: f64) -> Self {
        let coverage = a / 255.0;
        Self::new(r * coverage, g * coverage, b * coverage, a)
    }

    pub fn from_rgba8(Rgba([r, g, b, a]): Rgba<u8>) -> Self {
        Self::from_straight(f64::from(r), f64::from(g), f64::from(b), f64::from(a))
    }

    pub fn is_opaque(self) -> bool {
        self.a >= 255.0
    }

    /// Composite over a white background. Opaque colors are returned as is.
    pub fn blend_white(self) -> Self {
        if self.is_opaque() {
            return self;
        }
        let coverage = self.a / 255.0;
        Self {
            r: blend(self.r, coverage),
            g: blend(self.g, coverage),
            b: blend(self.b, coverage),
            a: self.a,
        }
    }

    /// Luma.
    pub fn y(self) -> f64 {
        self.r * 0.29889531 + self.g * 0.58662247 + self.b * 0.11448223
    }

    /// In-phase chroma.
    pub fn i(self) -> f64 {
        self.r * 0.59597799 - self.g * 0.27417610 - self.b * 0.32180189
    }

    /// Quadrature chroma.
    pub fn q(self) -> f64 {
        self.r * 0.21147017 - self.g * 0.52261711 + self.b * 0.31114694
    }
}

/// Move `c` toward white by the uncovered fraction `1 - coverage`.
pub fn blend(c: f64, coverage: f64) -> f64 {
    255.0 + (c - 255.0) * coverage
}
