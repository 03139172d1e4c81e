//! Visualization utilities for solved boards.
//!
//! Renders a grid as an image: white background, black grid lines with
//! heavier band borders, and digits drawn through an optional font. When
//! the original clue grid is supplied, clues render black and solved-in
//! digits render blue, so a reader can tell what the solver contributed.
//! Text rendering is skipped entirely when no font is configured.

use crate::core::errors::{SudocrError, SudocrResult};
use crate::domain::grid::{BOX_SIZE, GRID_SIZE, Grid};
use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use std::path::Path;

const BACKGROUND_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

const LINE_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

const CLUE_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

const SOLVED_COLOR: Rgb<u8> = Rgb([0, 0, 255]);

/// Configuration for board rendering.
pub struct RenderConfig {
    /// The font used for digits. If None, digit rendering is skipped.
    pub font: Option<FontVec>,
    /// Side length of one cell in pixels. Defaults to 80.
    pub cell_size: u32,
    /// Margin around the board in pixels. Defaults to 40.
    pub margin: u32,
    /// Thickness of ordinary grid lines; band borders are doubled.
    /// Defaults to 2.
    pub line_thickness: u32,
    /// Font scale for digits. Defaults to 48.0.
    pub font_scale: f32,
}

impl RenderConfig {
    /// Creates a config with no font; digits are skipped.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a config with a font loaded from the given path.
    ///
    /// # Errors
    ///
    /// Returns an IO error when the file cannot be read, or an
    /// invalid-input error when it is not a parseable font.
    pub fn with_font_path(font_path: &Path) -> SudocrResult<Self> {
        let font_data = std::fs::read(font_path)?;
        let font = FontVec::try_from_vec(font_data).map_err(|_| {
            SudocrError::invalid_input(format!(
                "failed to parse font file: {}",
                font_path.display()
            ))
        })?;
        Ok(Self {
            font: Some(font),
            ..Self::default()
        })
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font: None,
            cell_size: 80,
            margin: 40,
            line_thickness: 2,
            font_scale: 48.0,
        }
    }
}

/// Renders a board to an image.
///
/// # Arguments
///
/// * `solution` - The grid to render; blanks stay empty.
/// * `clues` - The pre-solve grid, if available. Cells filled there render
///   in the clue color; cells the solver filled render in the solution
///   color. Without it every digit renders as a clue.
/// * `config` - Rendering configuration.
pub fn render_board(solution: &Grid, clues: Option<&Grid>, config: &RenderConfig) -> RgbImage {
    let total = GRID_SIZE as u32 * config.cell_size + 2 * config.margin;
    let mut canvas = RgbImage::from_pixel(total, total, BACKGROUND_COLOR);

    let board_side = GRID_SIZE as u32 * config.cell_size;
    for line in 0..=GRID_SIZE as u32 {
        let thickness = if line % BOX_SIZE as u32 == 0 {
            config.line_thickness * 2
        } else {
            config.line_thickness
        };
        let offset = config.margin + line * config.cell_size;

        draw_filled_rect_mut(
            &mut canvas,
            Rect::at(offset as i32, config.margin as i32).of_size(thickness, board_side + thickness),
            LINE_COLOR,
        );
        draw_filled_rect_mut(
            &mut canvas,
            Rect::at(config.margin as i32, offset as i32).of_size(board_side + thickness, thickness),
            LINE_COLOR,
        );
    }

    if let Some(font) = &config.font {
        let scale = PxScale::from(config.font_scale);
        for row in 0..GRID_SIZE {
            for col in 0..GRID_SIZE {
                let value = solution.get(row, col);
                if value == 0 {
                    continue;
                }
                let is_clue = clues.map_or(true, |c| c.get(row, col) != 0);
                let color = if is_clue { CLUE_COLOR } else { SOLVED_COLOR };

                let x = config.margin
                    + col as u32 * config.cell_size
                    + (config.cell_size as f32 * 0.34) as u32;
                let y = config.margin
                    + row as u32 * config.cell_size
                    + (config.cell_size as f32 * 0.22) as u32;
                draw_text_mut(
                    &mut canvas,
                    color,
                    x as i32,
                    y as i32,
                    scale,
                    font,
                    &value.to_string(),
                );
            }
        }
    }

    canvas
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_has_expected_dimensions() {
        let config = RenderConfig::default();
        let canvas = render_board(&Grid::empty(), None, &config);
        let expected = 9 * config.cell_size + 2 * config.margin;
        assert_eq!(canvas.dimensions(), (expected, expected));
    }

    #[test]
    fn background_white_and_lines_black() {
        let config = RenderConfig::default();
        let canvas = render_board(&Grid::empty(), None, &config);

        // Center of the first cell is background.
        let mid = config.margin + config.cell_size / 2;
        assert_eq!(*canvas.get_pixel(mid, mid), BACKGROUND_COLOR);
        // The outer border line is drawn.
        assert_eq!(*canvas.get_pixel(config.margin, config.margin), LINE_COLOR);
        // An interior line one cell in.
        let line = config.margin + config.cell_size;
        assert_eq!(*canvas.get_pixel(line, mid), LINE_COLOR);
    }

    #[test]
    fn fontless_render_skips_digits() {
        let mut grid = Grid::empty();
        grid.set(0, 0, 8);
        let config = RenderConfig::default();
        let with_digit = render_board(&grid, None, &config);
        let without = render_board(&Grid::empty(), None, &config);
        assert_eq!(with_digit, without);
    }
}
