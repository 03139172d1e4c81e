//! Puzzle-boundary detection stage.

use crate::core::config::QuadDetectorConfig;
use crate::core::errors::{SudocrError, SudocrResult};
use crate::processors::binarize::adaptive_threshold_inv;
use crate::processors::geometry::{
    Point, Quad, approx_polygon, points_from_contour, polygon_area, polygon_perimeter,
};
use image::GrayImage;
use imageproc::contours::{BorderType, find_contours};
use imageproc::filter::gaussian_blur_f32;
use tracing::debug;

/// Finds the puzzle's outer boundary as a 4-point polygon.
///
/// The puzzle boundary is assumed to be the dominant quadrilateral feature
/// in frame, so external contours are visited largest first; smaller
/// 4-sided contours (individual cells, stray shapes) must not preempt it.
#[derive(Debug, Clone)]
pub struct QuadDetector {
    config: QuadDetectorConfig,
}

impl QuadDetector {
    /// Creates a detector with a validated configuration.
    pub fn new(config: QuadDetectorConfig) -> SudocrResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Locates the puzzle boundary in a grayscale image.
    ///
    /// Blurs to suppress noise, applies the inverted adaptive threshold so
    /// puzzle ink is foreground, extracts external contours, and walks them
    /// by enclosed area descending, returning the first one whose polygon
    /// approximation (tolerance: a fraction of its perimeter) has exactly
    /// four vertices.
    ///
    /// # Errors
    ///
    /// Returns [`SudocrError::ContourNotFound`] when no external contour
    /// approximates to a quadrilateral.
    pub fn detect(&self, image: &GrayImage) -> SudocrResult<Quad> {
        let blurred = gaussian_blur_f32(image, self.config.blur_sigma);
        let binary = adaptive_threshold_inv(
            &blurred,
            self.config.adaptive_block_size,
            self.config.adaptive_constant,
        );

        let contours = find_contours::<u32>(&binary);
        let mut candidates: Vec<(f32, Vec<Point>)> = contours
            .iter()
            .filter(|contour| contour.border_type == BorderType::Outer)
            .map(points_from_contour)
            .filter(|points| points.len() >= 4)
            .map(|points| (polygon_area(&points), points))
            .collect();
        candidates.sort_by(|a, b| b.0.total_cmp(&a.0));

        let examined = candidates.len();
        for (area, points) in candidates {
            let epsilon = self.config.approx_tolerance * polygon_perimeter(&points);
            let approx = approx_polygon(&points, epsilon);
            debug!(
                area,
                contour_points = points.len(),
                approx_vertices = approx.len(),
                "boundary candidate"
            );
            if approx.len() == 4 {
                return Ok(Quad::order([approx[0], approx[1], approx[2], approx[3]]));
            }
        }

        Err(SudocrError::ContourNotFound {
            candidates: examined,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    /// White canvas with a black rectangular frame of the given thickness.
    fn framed_image(outer: (u32, u32, u32, u32), thickness: u32) -> GrayImage {
        let mut img = GrayImage::from_pixel(240, 240, Luma([255]));
        let (left, top, right, bottom) = outer;
        for y in top..=bottom {
            for x in left..=right {
                let on_frame = x < left + thickness
                    || x > right - thickness
                    || y < top + thickness
                    || y > bottom - thickness;
                if on_frame {
                    img.put_pixel(x, y, Luma([0]));
                }
            }
        }
        img
    }

    #[test]
    fn detects_synthetic_frame_corners() {
        let img = framed_image((40, 50, 200, 190), 5);
        let detector = QuadDetector::new(QuadDetectorConfig::default()).unwrap();
        let quad = detector.detect(&img).unwrap();

        let tolerance = 4.0;
        assert!(quad.tl.distance(&Point::new(40.0, 50.0)) <= tolerance, "{:?}", quad.tl);
        assert!(quad.tr.distance(&Point::new(200.0, 50.0)) <= tolerance, "{:?}", quad.tr);
        assert!(quad.br.distance(&Point::new(200.0, 190.0)) <= tolerance, "{:?}", quad.br);
        assert!(quad.bl.distance(&Point::new(40.0, 190.0)) <= tolerance, "{:?}", quad.bl);
    }

    #[test]
    fn blank_image_reports_contour_not_found() {
        let img = GrayImage::from_pixel(120, 120, Luma([255]));
        let detector = QuadDetector::new(QuadDetectorConfig::default()).unwrap();
        assert!(matches!(
            detector.detect(&img),
            Err(SudocrError::ContourNotFound { .. })
        ));
    }

    #[test]
    fn largest_quadrilateral_wins() {
        let mut img = framed_image((20, 20, 220, 220), 5);
        // A smaller solid square inside the frame must not preempt it.
        for y in 80..120 {
            for x in 80..120 {
                img.put_pixel(x, y, Luma([0]));
            }
        }
        let detector = QuadDetector::new(QuadDetectorConfig::default()).unwrap();
        let quad = detector.detect(&img).unwrap();
        assert!(quad.tl.distance(&Point::new(20.0, 20.0)) <= 4.0);
    }
}
