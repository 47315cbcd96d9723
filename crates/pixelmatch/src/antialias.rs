//! Anti-aliasing detection, after "Anti-aliased Pixel and Intensity Slope
//! Detector" (V. Vysniauskas, 2009).
//!
//! Border policy: a pixel whose 3x3 neighbourhood is clipped by the image
//! edge starts with one equal-neighbour credit, in both the classifier and
//! the sibling count. The missing neighbours are treated as continuing the
//! flat region the pixel sits in.

use crate::delta::color_delta;
use crate::raster::Raster;
use crate::window::RowWindow;

/// The clamped 3x3 neighbourhood of a pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Neighbourhood {
    x: u32,
    y: u32,
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
}

impl Neighbourhood {
    fn around(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            x0: x.saturating_sub(1),
            y0: y.saturating_sub(1),
            x1: x.saturating_add(1).min(width - 1),
            y1: y.saturating_add(1).min(height - 1),
        }
    }

    /// Equal-neighbour credit granted to pixels on the image border.
    fn border_credit(&self) -> u32 {
        let clipped =
            self.x == self.x0 || self.x == self.x1 || self.y == self.y0 || self.y == self.y1;
        u32::from(clipped)
    }

    /// Neighbour coordinates, column by column, without the centre.
    fn neighbours(self) -> impl Iterator<Item = (u32, u32)> {
        (self.x0..=self.x1)
            .flat_map(move |nx| (self.y0..=self.y1).map(move |ny| (nx, ny)))
            .filter(move |&(nx, ny)| (nx, ny) != (self.x, self.y))
    }
}

/// Whether the pixel at (x, y), already known to differ, looks like an
/// anti-aliased edge pixel of `primary`.
///
/// The caller asks both ways round and treats the pixel as anti-aliasing if
/// either answer is yes.
pub(crate) fn is_anti_aliased<P, O>(
    primary: &RowWindow<'_, P>,
    other: &RowWindow<'_, O>,
    x: u32,
    y: u32,
) -> bool
where
    P: Raster + ?Sized,
    O: Raster + ?Sized,
{
    let area = Neighbourhood::around(x, y, primary.width(), primary.height());
    let mut zeroes = area.border_credit();

    let mut min = 0.0;
    let mut max = 0.0;
    let mut darkest = (0, 0);
    let mut brightest = (0, 0);

    let center = primary.pixel(x, y);
    for (nx, ny) in area.neighbours() {
        let delta = color_delta(center, primary.pixel(nx, ny), true);

        if delta == 0.0 {
            // More than two equal neighbours is a flat area, not an edge.
            zeroes += 1;
            if zeroes > 2 {
                return false;
            }
        } else if delta < min {
            min = delta;
            darkest = (nx, ny);
        } else if delta > max {
            max = delta;
            brightest = (nx, ny);
        }
    }

    // An edge pixel sits between something darker and something brighter.
    if min == 0.0 || max == 0.0 {
        return false;
    }

    let flat_in_both = |(px, py): (u32, u32)| {
        has_many_siblings(primary, px, py) && has_many_siblings(other, px, py)
    };
    flat_in_both(darkest) || flat_in_both(brightest)
}

/// Whether at least three neighbours of (x, y) share its exact color.
pub(crate) fn has_many_siblings<R>(window: &RowWindow<'_, R>, x: u32, y: u32) -> bool
where
    R: Raster + ?Sized,
{
    let area = Neighbourhood::around(x, y, window.width(), window.height());
    let mut zeroes = area.border_credit();

    let center = window.pixel(x, y);
    for (nx, ny) in area.neighbours() {
        if window.pixel(nx, ny) == center {
            zeroes += 1;
        }
        if zeroes > 2 {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
    const GRAY: Rgba<u8> = Rgba([128, 128, 128, 255]);

    /// Run `check` with both windows centred on row `y`.
    fn at_row<T>(
        a: &RgbaImage,
        b: &RgbaImage,
        y: u32,
        check: impl FnOnce(&RowWindow<'_, RgbaImage>, &RowWindow<'_, RgbaImage>) -> T,
    ) -> T {
        let mut wa = RowWindow::new(a, y..y + 1);
        let mut wb = RowWindow::new(b, y..y + 1);
        assert!(wa.advance() && wb.advance());
        check(&wa, &wb)
    }

    /// Left half white, right half black, optional gray column at the seam.
    fn edge(smoothed: bool) -> RgbaImage {
        RgbaImage::from_fn(8, 8, |x, _| match x {
            4 if smoothed => GRAY,
            0..4 => WHITE,
            _ => BLACK,
        })
    }

    #[test]
    fn neighbourhood_is_clamped_at_corners() {
        let n = Neighbourhood::around(0, 0, 5, 5);
        assert_eq!(n.neighbours().collect::<Vec<_>>(), vec![(0, 1), (1, 0), (1, 1)]);
        assert_eq!(n.border_credit(), 1);

        let inner = Neighbourhood::around(2, 2, 5, 5);
        assert_eq!(inner.neighbours().count(), 8);
        assert_eq!(inner.border_credit(), 0);
    }

    #[test]
    fn one_pixel_image_has_no_neighbours() {
        let n = Neighbourhood::around(0, 0, 1, 1);
        assert_eq!(n.neighbours().count(), 0);
        assert_eq!(n.border_credit(), 1);
    }

    #[test]
    fn smoothed_seam_is_anti_aliasing() {
        let sharp = edge(false);
        let smooth = edge(true);
        for y in [0, 3, 7] {
            at_row(&sharp, &smooth, y, |wa, wb| {
                assert!(is_anti_aliased(wb, wa, 4, y), "row {y}");
            });
        }
    }

    #[test]
    fn flat_area_is_not_anti_aliasing() {
        let sharp = edge(false);
        let smooth = edge(true);
        at_row(&sharp, &smooth, 3, |wa, wb| {
            // In the sharp image (4, 3) is inside a black run.
            assert!(!is_anti_aliased(wa, wb, 4, 3));
        });
    }

    #[test]
    fn isolated_dot_is_not_anti_aliasing() {
        let plain = RgbaImage::from_pixel(5, 5, WHITE);
        let mut dotted = plain.clone();
        dotted.put_pixel(2, 2, BLACK);
        at_row(&plain, &dotted, 2, |wa, wb| {
            assert!(!is_anti_aliased(wa, wb, 2, 2));
            assert!(!is_anti_aliased(wb, wa, 2, 2));
        });
    }

    #[test]
    fn gradient_without_flat_sides_is_not_anti_aliasing() {
        let ramp = RgbaImage::from_fn(5, 5, |x, y| {
            let v = (x * 40 + y * 7) as u8;
            Rgba([v, v, v, 255])
        });
        let mut changed = ramp.clone();
        changed.put_pixel(2, 2, Rgba([0, 255, 0, 255]));
        at_row(&ramp, &changed, 2, |wa, wb| {
            assert!(!is_anti_aliased(wa, wb, 2, 2));
        });
    }

    #[test]
    fn siblings_counted_with_border_credit() {
        let img = RgbaImage::from_fn(4, 4, |x, y| if x == 0 && y < 2 { BLACK } else { WHITE });
        at_row(&img, &img, 1, |wa, _| {
            // (0, 0) black: one black neighbour plus the border credit.
            assert!(!has_many_siblings(wa, 0, 0));
            // (1, 1) white: plenty of white around it.
            assert!(has_many_siblings(wa, 1, 1));
        });
        let two_black = RgbaImage::from_fn(4, 4, |x, y| {
            if (x < 2 && y == 0) || (x, y) == (0, 1) { BLACK } else { WHITE }
        });
        at_row(&two_black, &two_black, 0, |wa, _| {
            // (0, 0) black: two black neighbours plus the border credit.
            assert!(has_many_siblings(wa, 0, 0));
        });
    }
}
