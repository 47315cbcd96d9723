//! Read access to pixel grids.
//!
//! [`Raster`] is implemented for every `image` buffer with 8-bit, 16-bit or
//! float channels, for [`DynamicImage`], and for [`View`], a sub-rectangle of
//! another raster. Coordinates passed to a raster are absolute: a view whose
//! bounds start at (10, 4) answers `color_at(10, 4)` with its first pixel.

use std::ops::Deref;

use image::{DynamicImage, GenericImageView, ImageBuffer, Pixel, Rgba};

use crate::color::Color;

/// A rectangle in absolute pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Overlap of two rectangles. Disjoint rectangles give an empty result.
    pub fn intersect(&self, other: &Bounds) -> Bounds {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right()).max(x);
        let bottom = self.bottom().min(other.bottom()).max(y);
        Bounds::new(x, y, right - x, bottom - y)
    }
}

/// Sample storage of a packed buffer.
#[derive(Clone, Copy, Debug)]
pub enum Samples<'a> {
    U8(&'a [u8]),
    U16(&'a [u16]),
}

/// Raw layout of a packed raster, as needed to compare two buffers
/// byte-for-byte.
#[derive(Clone, Copy, Debug)]
pub struct Packed<'a> {
    /// Color model name, e.g. `"RGBA"` or `"Y"`.
    pub model: &'static str,
    pub channels: usize,
    pub samples: Samples<'a>,
    /// Index of the first sample of the first row.
    pub offset: usize,
    /// Samples between the starts of consecutive rows.
    pub stride: usize,
    /// Pixels per row.
    pub width: usize,
    pub height: usize,
}

impl Packed<'_> {
    /// Samples in one logical row, excluding any padding up to the stride.
    pub fn row_len(&self) -> usize {
        self.width * self.channels
    }

    /// True when the rows follow each other with no gap, so the whole image
    /// is a single slice.
    pub fn is_contiguous(&self) -> bool {
        self.stride == self.row_len() || self.height <= 1
    }
}

/// A rectangular grid of pixels addressed in absolute coordinates.
pub trait Raster {
    fn bounds(&self) -> Bounds;

    /// Canonical color at an absolute coordinate inside [`bounds`](Self::bounds).
    fn color_at(&self, x: u32, y: u32) -> Color;

    /// Decode `width` pixels of row `y` starting at column `x` into `out`,
    /// replacing its contents.
    fn read_span(&self, x: u32, y: u32, width: u32, out: &mut Vec<Color>) {
        out.clear();
        out.extend((x..x + width).map(|px| self.color_at(px, y)));
    }

    /// Decode the full row `y` into `out`, replacing its contents.
    fn read_row(&self, y: u32, out: &mut Vec<Color>) {
        let bounds = self.bounds();
        self.read_span(bounds.x, y, bounds.width, out);
    }

    /// Raw sample layout, for rasters backed by a packed integer buffer.
    fn packed(&self) -> Option<Packed<'_>> {
        None
    }
}

/// A channel type that can be normalised to the 8-bit scale.
pub trait Channel: Copy {
    fn to_canonical(self) -> f64;

    /// Wrap a sample slice for byte-identity checks. Float buffers have no
    /// meaningful byte identity and return `None`.
    fn samples(data: &[Self]) -> Option<Samples<'_>>;
}

impl Channel for u8 {
    fn to_canonical(self) -> f64 {
        f64::from(self)
    }

    fn samples(data: &[Self]) -> Option<Samples<'_>> {
        Some(Samples::U8(data))
    }
}

impl Channel for u16 {
    fn to_canonical(self) -> f64 {
        f64::from(self) / 257.0
    }

    fn samples(data: &[Self]) -> Option<Samples<'_>> {
        Some(Samples::U16(data))
    }
}

impl Channel for f32 {
    fn to_canonical(self) -> f64 {
        (f64::from(self) * 255.0).clamp(0.0, 255.0)
    }

    fn samples(_: &[Self]) -> Option<Samples<'_>> {
        None
    }
}

fn color_of<P>(pixel: &P) -> Color
where
    P: Pixel,
    P::Subpixel: Channel,
{
    let Rgba([r, g, b, a]) = pixel.to_rgba();
    Color::from_straight(
        r.to_canonical(),
        g.to_canonical(),
        b.to_canonical(),
        a.to_canonical(),
    )
}

impl<P, C> Raster for ImageBuffer<P, C>
where
    P: Pixel,
    P::Subpixel: Channel,
    C: Deref<Target = [P::Subpixel]>,
{
    fn bounds(&self) -> Bounds {
        Bounds::new(0, 0, self.width(), self.height())
    }

    fn color_at(&self, x: u32, y: u32) -> Color {
        color_of(self.get_pixel(x, y))
    }

    fn read_span(&self, x: u32, y: u32, width: u32, out: &mut Vec<Color>) {
        out.clear();
        let channels = usize::from(P::CHANNEL_COUNT);
        let start = (y as usize * self.width() as usize + x as usize) * channels;
        let end = start + width as usize * channels;
        let raw: &[P::Subpixel] = self.as_raw();
        if let Some(samples) = raw.get(start..end) {
            out.extend(
                samples
                    .chunks_exact(channels)
                    .map(|px| color_of(P::from_slice(px))),
            );
        }
    }

    fn packed(&self) -> Option<Packed<'_>> {
        let channels = usize::from(P::CHANNEL_COUNT);
        let width = self.width() as usize;
        let height = self.height() as usize;
        let raw: &[P::Subpixel] = self.as_raw();
        let samples = raw.get(..width * height * channels)?;
        Some(Packed {
            model: P::COLOR_MODEL,
            channels,
            samples: P::Subpixel::samples(samples)?,
            offset: 0,
            stride: width * channels,
            width,
            height,
        })
    }
}

macro_rules! dispatch {
    ($image:expr, $buffer:ident => $body:expr, _ => $fallback:expr) => {
        match $image {
            DynamicImage::ImageLuma8($buffer) => $body,
            DynamicImage::ImageLumaA8($buffer) => $body,
            DynamicImage::ImageRgb8($buffer) => $body,
            DynamicImage::ImageRgba8($buffer) => $body,
            DynamicImage::ImageLuma16($buffer) => $body,
            DynamicImage::ImageLumaA16($buffer) => $body,
            DynamicImage::ImageRgb16($buffer) => $body,
            DynamicImage::ImageRgba16($buffer) => $body,
            DynamicImage::ImageRgb32F($buffer) => $body,
            DynamicImage::ImageRgba32F($buffer) => $body,
            _ => $fallback,
        }
    };
}

impl Raster for DynamicImage {
    fn bounds(&self) -> Bounds {
        Bounds::new(0, 0, self.width(), self.height())
    }

    fn color_at(&self, x: u32, y: u32) -> Color {
        dispatch!(self, buf => buf.color_at(x, y), _ => Color::from_rgba8(self.get_pixel(x, y)))
    }

    fn read_span(&self, x: u32, y: u32, width: u32, out: &mut Vec<Color>) {
        dispatch!(self, buf => buf.read_span(x, y, width, out), _ => {
            out.clear();
            out.extend((x..x + width).map(|px| Color::from_rgba8(self.get_pixel(px, y))));
        })
    }

    fn packed(&self) -> Option<Packed<'_>> {
        dispatch!(self, buf => buf.packed(), _ => None)
    }
}

/// A rectangular window into another raster.
///
/// The view keeps the parent's coordinate system and its row stride, so two
/// views cut from different places of larger images can still be compared
/// row by row without copying.
#[derive(Debug)]
pub struct View<'a, R: ?Sized> {
    inner: &'a R,
    bounds: Bounds,
}

impl<'a, R: Raster + ?Sized> View<'a, R> {
    /// Clip `bounds` to the parent and wrap it.
    pub fn new(inner: &'a R, bounds: Bounds) -> Self {
        let bounds = bounds.intersect(&inner.bounds());
        Self { inner, bounds }
    }

    pub fn inner(&self) -> &'a R {
        self.inner
    }
}

impl<R: ?Sized> Clone for View<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: ?Sized> Copy for View<'_, R> {}

impl<R: Raster + ?Sized> Raster for View<'_, R> {
    fn bounds(&self) -> Bounds {
        self.bounds
    }

    fn color_at(&self, x: u32, y: u32) -> Color {
        self.inner.color_at(x, y)
    }

    fn read_span(&self, x: u32, y: u32, width: u32, out: &mut Vec<Color>) {
        self.inner.read_span(x, y, width, out);
    }

    fn packed(&self) -> Option<Packed<'_>> {
        let parent = self.inner.packed()?;
        let origin = self.inner.bounds();
        let dx = (self.bounds.x - origin.x) as usize;
        let dy = (self.bounds.y - origin.y) as usize;
        Some(Packed {
            offset: parent.offset + dy * parent.stride + dx * parent.channels,
            width: self.bounds.width as usize,
            height: self.bounds.height as usize,
            ..parent
        })
    }
}
