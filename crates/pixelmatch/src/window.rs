use std::ops::Range;

use crate::color::Color;
use crate::raster::{Bounds, Raster};

/// Rows kept around the current scan line: two above, two below.
const WINDOW_ROWS: usize = 5;

/// Forward-only cursor over the rows of a raster that keeps the decoded
/// neighbourhood of the current row in a five-slot ring.
///
/// Coordinates are relative to the raster's origin. After a successful
/// [`advance`](Self::advance), every row within two of the current one
/// (clamped to the image) can be read without decoding it again.
pub(crate) struct RowWindow<'a, R: ?Sized> {
    raster: &'a R,
    bounds: Bounds,
    lines: [Vec<Color>; WINDOW_ROWS],
    /// Next row to become current.
    next: u32,
    /// Rows at or past `end` are never made current.
    end: u32,
    /// One past the last decoded row.
    loaded_to: u32,
    current: Option<u32>,
}

impl<'a, R: Raster + ?Sized> RowWindow<'a, R> {
    /// A window whose current row walks through `rows`. Rows outside the
    /// range are still decoded when they neighbour one inside it.
    pub(crate) fn new(raster: &'a R, rows: Range<u32>) -> Self {
        let bounds = raster.bounds();
        let end = rows.end.min(bounds.height);
        Self {
            raster,
            bounds,
            lines: Default::default(),
            next: rows.start,
            end,
            loaded_to: 0,
            current: None,
        }
    }

    /// Move to the next row. Returns `false` once the range is exhausted,
    /// and keeps returning `false` afterwards.
    pub(crate) fn advance(&mut self) -> bool {
        if self.next >= self.end {
            self.current = None;
            self.next = self.end;
            return false;
        }
        let row = self.next;
        self.next += 1;

        let top = row.saturating_sub(2);
        let bottom = row.saturating_add(3).min(self.bounds.height);
        for y in self.loaded_to.max(top)..bottom {
            let slot = y as usize % WINDOW_ROWS;
            self.raster
                .read_row(self.bounds.y + y, &mut self.lines[slot]);
        }
        self.loaded_to = self.loaded_to.max(bottom);
        self.current = Some(row);
        true
    }

    pub(crate) fn current(&self) -> Option<u32> {
        self.current
    }

    pub(crate) fn width(&self) -> u32 {
        self.bounds.width
    }

    pub(crate) fn height(&self) -> u32 {
        self.bounds.height
    }

    /// Decoded row `y`, which must be within two rows of the current one.
    pub(crate) fn row(&self, y: u32) -> &[Color] {
        debug_assert!(
            self.current.is_some_and(|c| y.abs_diff(c) <= 2 && y < self.bounds.height),
            "row {y} outside window around {:?}",
            self.current
        );
        &self.lines[y as usize % WINDOW_ROWS]
    }

    pub(crate) fn pixel(&self, x: u32, y: u32) -> Color {
        self.row(y)[x as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::cell::Cell;

    /// Encodes the row index in red and counts row decodes.
    struct Counting {
        img: RgbaImage,
        reads: Cell<usize>,
    }

    impl Raster for Counting {
        fn bounds(&self) -> Bounds {
            self.img.bounds()
        }

        fn color_at(&self, x: u32, y: u32) -> Color {
            self.img.color_at(x, y)
        }

        fn read_row(&self, y: u32, out: &mut Vec<Color>) {
            self.reads.set(self.reads.get() + 1);
            self.img.read_row(y, out);
        }
    }

    fn counting(width: u32, height: u32) -> Counting {
        Counting {
            img: RgbaImage::from_fn(width, height, |x, y| Rgba([y as u8, x as u8, 0, 255])),
            reads: Cell::new(0),
        }
    }

    #[test]
    fn walks_every_row_then_stops() {
        let src = counting(3, 7);
        let mut window = RowWindow::new(&src, 0..7);
        let mut seen = Vec::new();
        while window.advance() {
            seen.push(window.current().unwrap());
        }
        assert_eq!(seen, (0..7).collect::<Vec<_>>());
        assert!(!window.advance());
        assert_eq!(window.current(), None);
    }

    #[test]
    fn each_row_is_decoded_once() {
        let src = counting(4, 20);
        let mut window = RowWindow::new(&src, 0..20);
        while window.advance() {}
        assert_eq!(src.reads.get(), 20);
    }

    #[test]
    fn neighbourhood_rows_are_available() {
        let src = counting(2, 9);
        let mut window = RowWindow::new(&src, 0..9);
        while window.advance() {
            let row = window.current().unwrap();
            for y in row.saturating_sub(2)..(row + 3).min(9) {
                assert_eq!(window.pixel(1, y).r, f64::from(y as u8));
                assert_eq!(window.pixel(1, y).g, 1.0);
            }
        }
    }

    #[test]
    fn band_start_loads_rows_above() {
        let src = counting(2, 10);
        let mut window = RowWindow::new(&src, 4..6);
        assert!(window.advance());
        assert_eq!(window.current(), Some(4));
        assert_eq!(window.pixel(0, 2).r, 2.0);
        assert_eq!(window.pixel(0, 6).r, 6.0);
        assert!(window.advance());
        assert_eq!(window.pixel(0, 7).r, 7.0);
        assert!(!window.advance());
        assert_eq!(src.reads.get(), 6);
    }

    #[test]
    fn single_row_image() {
        let src = counting(3, 1);
        let mut window = RowWindow::new(&src, 0..1);
        assert!(window.advance());
        assert_eq!(window.row(0).len(), 3);
        assert!(!window.advance());
    }

    #[test]
    fn empty_image_never_advances() {
        let src = counting(0, 0);
        let mut window = RowWindow::new(&src, 0..0);
        assert!(!window.advance());
    }

    #[test]
    fn views_are_read_relative_to_their_origin() {
        let img = RgbaImage::from_fn(6, 6, |x, y| Rgba([y as u8, x as u8, 0, 255]));
        let view = crate::raster::View::new(&img, Bounds::new(2, 3, 2, 3));
        let mut window = RowWindow::new(&view, 0..3);
        assert!(window.advance());
        assert_eq!(window.pixel(0, 0), Color::new(3.0, 2.0, 0.0, 255.0));
        assert_eq!(window.pixel(1, 2), Color::new(5.0, 3.0, 0.0, 255.0));
        assert_eq!((window.width(), window.height()), (2, 3));
    }
}
