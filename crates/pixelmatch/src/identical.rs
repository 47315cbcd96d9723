use crate::raster::{Packed, Raster, Samples};

/// True when both rasters are packed buffers of the same layout holding the
/// same samples in every logical row. Row padding beyond the logical width
/// is ignored, so sub-views over differently sized parents still match.
pub(crate) fn identical<A, B>(a: &A, b: &B) -> bool
where
    A: Raster + ?Sized,
    B: Raster + ?Sized,
{
    let (Some(pa), Some(pb)) = (a.packed(), b.packed()) else {
        return false;
    };
    if pa.model != pb.model
        || pa.channels != pb.channels
        || pa.width != pb.width
        || pa.height != pb.height
    {
        return false;
    }
    match (pa.samples, pb.samples) {
        (Samples::U8(x), Samples::U8(y)) => rows_equal(x, y, &pa, &pb),
        (Samples::U16(x), Samples::U16(y)) => rows_equal(x, y, &pa, &pb),
        _ => false,
    }
}

fn rows_equal<T: PartialEq>(x: &[T], y: &[T], pa: &Packed<'_>, pb: &Packed<'_>) -> bool {
    let row_len = pa.row_len();
    if pa.is_contiguous() && pb.is_contiguous() {
        let len = row_len * pa.height;
        return slices_equal(x, pa.offset, y, pb.offset, len);
    }
    (0..pa.height).all(|row| {
        slices_equal(
            x,
            pa.offset + row * pa.stride,
            y,
            pb.offset + row * pb.stride,
            row_len,
        )
    })
}

fn slices_equal<T: PartialEq>(x: &[T], xs: usize, y: &[T], ys: usize, len: usize) -> bool {
    match (x.get(xs..xs + len), y.get(ys..ys + len)) {
        (Some(l), Some(r)) => l == r,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{Bounds, View};
    use image::{DynamicImage, GrayImage, ImageBuffer, Luma, Rgba, RgbaImage};

    #[test]
    fn same_buffer_is_identical() {
        let img = RgbaImage::from_fn(5, 4, |x, y| Rgba([x as u8, y as u8, 9, 255]));
        assert!(identical(&img, &img.clone()));
    }

    #[test]
    fn one_sample_difference_is_detected() {
        let a = RgbaImage::from_pixel(5, 4, Rgba([1, 2, 3, 255]));
        let mut b = a.clone();
        b.put_pixel(4, 3, Rgba([1, 2, 3, 254]));
        assert!(!identical(&a, &b));
    }

    #[test]
    fn different_layouts_never_match() {
        let gray = GrayImage::from_pixel(2, 2, Luma([0]));
        let rgba = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        assert!(!identical(&gray, &rgba));

        let deep: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::from_pixel(2, 2, Luma([0]));
        assert!(!identical(&gray, &deep));
    }

    #[test]
    fn dynamic_and_plain_buffers_compare_by_content() {
        let img = GrayImage::from_fn(3, 3, |x, y| Luma([(x * 3 + y) as u8]));
        assert!(identical(&DynamicImage::ImageLuma8(img.clone()), &img));
    }

    #[test]
    fn views_with_different_strides_compare_logical_rows() {
        // The same 3x2 patch placed in parents of different width and offset.
        let patch = |x: u32, y: u32| Rgba([(x * 40) as u8, (y * 90) as u8, 5, 255]);
        let small = RgbaImage::from_fn(4, 3, |x, y| {
            if x >= 1 && y >= 1 { patch(x - 1, y - 1) } else { Rgba([0, 0, 0, 0]) }
        });
        let wide = RgbaImage::from_fn(9, 4, |x, y| {
            if (5..8).contains(&x) && (2..4).contains(&y) {
                patch(x - 5, y - 2)
            } else {
                Rgba([255, 255, 255, 255])
            }
        });
        let a = View::new(&small, Bounds::new(1, 1, 3, 2));
        let b = View::new(&wide, Bounds::new(5, 2, 3, 2));
        assert!(identical(&a, &b));

        let c = View::new(&wide, Bounds::new(4, 2, 3, 2));
        assert!(!identical(&a, &c));
    }

    #[test]
    fn float_images_take_the_slow_path() {
        let img = DynamicImage::ImageRgba32F(ImageBuffer::new(2, 2));
        assert!(!identical(&img, &img.clone()));
    }
}
