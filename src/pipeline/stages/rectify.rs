//! Perspective rectification stage.

use crate::core::errors::{SudocrError, SudocrResult};
use crate::processors::geometry::{Point, Quad};
use crate::processors::transform::{get_perspective_transform, warp_perspective};
use image::GrayImage;
use tracing::debug;

/// Warps the region inside a quadrilateral into an axis-aligned rectangle.
#[derive(Debug, Clone, Default)]
pub struct PerspectiveRectifier;

impl PerspectiveRectifier {
    /// Creates a rectifier.
    pub fn new() -> Self {
        Self
    }

    /// Rectifies the quadrilateral region of `image` into an axis-aligned
    /// rectangle.
    ///
    /// The destination width is the larger of the two horizontal edge
    /// lengths and the destination height the larger of the two vertical
    /// edge lengths, both truncated to whole pixels, so the warp never
    /// shrinks the longer side of the board.
    ///
    /// # Errors
    ///
    /// Returns [`SudocrError::DegenerateGeometry`] when two consecutive
    /// corners coincide or either destination dimension truncates to zero.
    pub fn rectify(&self, image: &GrayImage, quad: &Quad) -> SudocrResult<GrayImage> {
        if quad.has_coincident_corners() {
            return Err(SudocrError::degenerate("consecutive corners coincide"));
        }

        let width_bottom = quad.br.distance(&quad.bl);
        let width_top = quad.tr.distance(&quad.tl);
        let max_width = width_bottom.max(width_top) as u32;

        let height_right = quad.tr.distance(&quad.br);
        let height_left = quad.tl.distance(&quad.bl);
        let max_height = height_right.max(height_left) as u32;

        if max_width == 0 || max_height == 0 {
            return Err(SudocrError::degenerate(format!(
                "destination collapses to {max_width}x{max_height}"
            )));
        }

        let dst = [
            Point::new(0.0, 0.0),
            Point::new((max_width - 1) as f32, 0.0),
            Point::new((max_width - 1) as f32, (max_height - 1) as f32),
            Point::new(0.0, (max_height - 1) as f32),
        ];

        debug!(max_width, max_height, "rectifying boundary quad");
        let matrix = get_perspective_transform(&quad.points(), &dst)?;
        warp_perspective(image, &matrix, max_width, max_height)
    }
}
