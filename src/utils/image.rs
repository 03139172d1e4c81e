//! Utility functions for loading and converting images.
//!
//! The pipeline works on 8-bit grayscale throughout; these helpers decode
//! caller-supplied paths or byte buffers into that form.

use crate::core::errors::{SudocrError, SudocrResult};
use image::{DynamicImage, GrayImage};
use std::path::Path;

/// Converts a DynamicImage to a GrayImage.
pub fn dynamic_to_gray(img: DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Loads an image from a file path and converts it to grayscale.
///
/// # Arguments
///
/// * `path` - Path of the image file to load.
///
/// # Errors
///
/// Returns [`SudocrError::ImageRead`] if the file cannot be opened or
/// decoded.
pub fn load_gray_image(path: &Path) -> SudocrResult<GrayImage> {
    let img = image::open(path).map_err(SudocrError::ImageRead)?;
    Ok(dynamic_to_gray(img))
}

/// Decodes an in-memory encoded image and converts it to grayscale.
///
/// # Arguments
///
/// * `bytes` - The encoded image bytes (any format the `image` crate
///   recognizes).
///
/// # Errors
///
/// Returns [`SudocrError::ImageRead`] if the buffer cannot be decoded.
pub fn load_gray_image_from_bytes(bytes: &[u8]) -> SudocrResult<GrayImage> {
    let img = image::load_from_memory(bytes).map_err(SudocrError::ImageRead)?;
    Ok(dynamic_to_gray(img))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};

    #[test]
    fn rgb_converts_to_luma() {
        let rgb = RgbImage::from_pixel(4, 4, Rgb([255, 0, 0]));
        let gray = dynamic_to_gray(DynamicImage::ImageRgb8(rgb));
        assert_eq!(gray.dimensions(), (4, 4));
        let value = gray.get_pixel(0, 0)[0];
        assert!(value > 0 && value < 255, "red must land strictly between extremes");
    }

    #[test]
    fn garbage_bytes_are_an_image_read_error() {
        assert!(matches!(
            load_gray_image_from_bytes(&[1, 2, 3]),
            Err(SudocrError::ImageRead(_))
        ));
    }

    #[test]
    fn missing_file_is_an_image_read_error() {
        let result = load_gray_image(Path::new("/nonexistent/sudoku.png"));
        assert!(matches!(result, Err(SudocrError::ImageRead(_))));
    }

    #[test]
    fn gray_input_round_trips() {
        let gray = GrayImage::from_pixel(3, 3, Luma([77]));
        let converted = dynamic_to_gray(DynamicImage::ImageLuma8(gray.clone()));
        assert_eq!(converted, gray);
    }
}
