//! Cell segmentation stage.

use crate::core::config::SegmenterConfig;
use crate::core::errors::{SudocrError, SudocrResult};
use crate::domain::grid::GRID_SIZE;
use image::{GrayImage, imageops};

/// One cell cut out of the rectified board.
#[derive(Debug, Clone)]
pub struct CellImage {
    /// Row index, 0..=8.
    pub row: usize,
    /// Column index, 0..=8.
    pub col: usize,
    /// The trimmed cell pixels.
    pub image: GrayImage,
}

/// Partitions the rectified board into 81 trimmed cell images.
#[derive(Debug, Clone)]
pub struct CellSegmenter {
    config: SegmenterConfig,
}

impl CellSegmenter {
    /// Creates a segmenter with a validated configuration.
    pub fn new(config: SegmenterConfig) -> SudocrResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Cuts the rectified board into exactly 81 cells in row-major order.
    ///
    /// The board is first cropped to a square of side `min(width, height)`,
    /// stepped at `side / 9`, and each cell is trimmed by the configured
    /// margin fraction on all four edges to exclude grid-line ink. Order
    /// matters: downstream components index results by position.
    ///
    /// # Errors
    ///
    /// Returns [`SudocrError::InvalidInput`] when the board is too small
    /// for the trim margin to leave any pixels.
    pub fn segment(&self, rectified: &GrayImage) -> SudocrResult<Vec<CellImage>> {
        let side = rectified.width().min(rectified.height());
        let step = side / GRID_SIZE as u32;
        if step == 0 {
            return Err(SudocrError::invalid_input(format!(
                "rectified board side {side} is smaller than one cell per row"
            )));
        }

        let margin = (self.config.trim_margin * step as f32).floor() as u32;
        let trimmed = step - 2 * margin;
        if trimmed == 0 {
            return Err(SudocrError::invalid_input(format!(
                "trim margin {margin}px consumes the whole {step}px cell"
            )));
        }

        let mut cells = Vec::with_capacity(GRID_SIZE * GRID_SIZE);
        for row in 0..GRID_SIZE {
            for col in 0..GRID_SIZE {
                let x = col as u32 * step + margin;
                let y = row as u32 * step + margin;
                let image = imageops::crop_imm(rectified, x, y, trimmed, trimmed).to_image();
                cells.push(CellImage { row, col, image });
            }
        }
        Ok(cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn yields_81_cells_in_row_major_order() {
        let img = GrayImage::new(450, 450);
        let segmenter = CellSegmenter::new(SegmenterConfig::default()).unwrap();
        let cells = segmenter.segment(&img).unwrap();

        assert_eq!(cells.len(), 81);
        for (i, cell) in cells.iter().enumerate() {
            assert_eq!(cell.row, i / 9);
            assert_eq!(cell.col, i % 9);
        }
    }

    #[test]
    fn untrimmed_cells_tile_the_square() {
        // With a zero margin the 81 crops must cover the stepped square
        // exactly once each; paint each crop region and count coverage.
        let side = 453u32;
        let step = side / 9;
        let img = GrayImage::new(side, side);
        let segmenter = CellSegmenter::new(SegmenterConfig::default().with_trim_margin(0.0)).unwrap();
        let cells = segmenter.segment(&img).unwrap();

        let mut coverage = vec![0u8; (side * side) as usize];
        for cell in &cells {
            assert_eq!(cell.image.dimensions(), (step, step));
            let x0 = cell.col as u32 * step;
            let y0 = cell.row as u32 * step;
            for y in y0..y0 + step {
                for x in x0..x0 + step {
                    coverage[(y * side + x) as usize] += 1;
                }
            }
        }
        for y in 0..step * 9 {
            for x in 0..step * 9 {
                assert_eq!(coverage[(y * side + x) as usize], 1, "gap or overlap at ({x}, {y})");
            }
        }
        // Cell size never strays more than a pixel from side / 9.
        assert!((side as f32 / 9.0 - step as f32).abs() <= 1.0);
    }

    #[test]
    fn default_margin_trims_twelve_percent_per_edge() {
        let img = GrayImage::new(450, 450);
        let segmenter = CellSegmenter::new(SegmenterConfig::default()).unwrap();
        let cells = segmenter.segment(&img).unwrap();

        // step = 50, margin = floor(0.12 * 50) = 6, trimmed side = 38.
        assert_eq!(cells[0].image.dimensions(), (38, 38));
    }

    #[test]
    fn wide_board_is_cropped_to_square() {
        let mut img = GrayImage::new(500, 450);
        img.put_pixel(460, 10, Luma([255]));
        let segmenter = CellSegmenter::new(SegmenterConfig::default()).unwrap();
        let cells = segmenter.segment(&img).unwrap();
        assert_eq!(cells.len(), 81);
        // Content beyond the square never reaches a cell.
        assert!(cells.iter().all(|c| c.image.pixels().all(|p| p[0] == 0)));
    }

    #[test]
    fn tiny_board_is_rejected() {
        let img = GrayImage::new(5, 5);
        let segmenter = CellSegmenter::new(SegmenterConfig::default()).unwrap();
        assert!(matches!(
            segmenter.segment(&img),
            Err(SudocrError::InvalidInput { .. })
        ));
    }
}
