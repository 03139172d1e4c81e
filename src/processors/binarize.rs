//! Binarization utilities: adaptive and Otsu thresholding with ink as
//! foreground.
//!
//! Both entry points return masks in which ink pixels are 255 and
//! background pixels are 0, the polarity the contour extractor and the
//! classifier expect.

use image::{GrayImage, Luma};
use imageproc::contrast::{ThresholdType, otsu_level, threshold};

/// Applies a mean adaptive threshold and inverts the result so ink is
/// foreground.
///
/// Each pixel is compared against the mean of its `block_size` x
/// `block_size` neighborhood (clamped at the image border) minus
/// `constant`; pixels at or below that local level become foreground. Box
/// means are computed from an integral image, so the cost is independent of
/// the block size.
///
/// # Arguments
///
/// * `src` - The grayscale image to binarize.
/// * `block_size` - Side length of the neighborhood; odd, at least 3.
/// * `constant` - Offset subtracted from the neighborhood mean.
///
/// # Returns
///
/// A mask with ink as 255 and background as 0.
pub fn adaptive_threshold_inv(src: &GrayImage, block_size: u32, constant: i16) -> GrayImage {
    let (width, height) = src.dimensions();
    let mut out = GrayImage::new(width, height);
    if width == 0 || height == 0 {
        return out;
    }

    // Row-major integral image with a zero top row and left column.
    let stride = (width + 1) as usize;
    let mut integral = vec![0u64; stride * (height + 1) as usize];
    for y in 0..height as usize {
        let mut row_sum = 0u64;
        for x in 0..width as usize {
            row_sum += src.as_raw()[y * width as usize + x] as u64;
            integral[(y + 1) * stride + x + 1] = integral[y * stride + x + 1] + row_sum;
        }
    }

    let radius = (block_size / 2) as i64;
    for y in 0..height as i64 {
        for x in 0..width as i64 {
            let x0 = (x - radius).max(0) as usize;
            let y0 = (y - radius).max(0) as usize;
            let x1 = (x + radius).min(width as i64 - 1) as usize + 1;
            let y1 = (y + radius).min(height as i64 - 1) as usize + 1;

            let sum = integral[y1 * stride + x1] + integral[y0 * stride + x0]
                - integral[y0 * stride + x1]
                - integral[y1 * stride + x0];
            let count = ((x1 - x0) * (y1 - y0)) as f64;
            let level = sum as f64 / count - constant as f64;

            let pixel = src.get_pixel(x as u32, y as u32)[0] as f64;
            let value = if pixel > level { 0 } else { 255 };
            out.put_pixel(x as u32, y as u32, Luma([value]));
        }
    }
    out
}

/// Binarizes with an Otsu global threshold, inverted so ink is foreground.
///
/// A zero-contrast image has no meaningful Otsu split; it yields an empty
/// mask (no ink) rather than an arbitrary all-foreground one.
pub fn otsu_binarize_inv(src: &GrayImage) -> GrayImage {
    let (min, max) = src
        .pixels()
        .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p[0]), hi.max(p[0])));
    if min == max {
        return GrayImage::new(src.width(), src.height());
    }

    let level = otsu_level(src);
    threshold(src, level, ThresholdType::BinaryInverted)
}

/// The fraction of foreground pixels in a binary mask, in [0, 1].
///
/// An empty mask yields 0.0.
pub fn ink_ratio(mask: &GrayImage) -> f32 {
    let area = mask.width() as u64 * mask.height() as u64;
    if area == 0 {
        return 0.0;
    }
    let foreground = mask.pixels().filter(|p| p[0] > 0).count() as u64;
    foreground as f32 / area as f32
}
