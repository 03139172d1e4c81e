//! Grid assembly stage.

use crate::core::errors::{SudocrError, SudocrResult};
use crate::domain::grid::{CELL_COUNT, CellReport, CellStatus, GRID_SIZE, Grid};
use crate::pipeline::stages::classify::{CellClassification, CellLabel};

/// Aggregates 81 cell classifications into a grid and its diagnostics.
///
/// Pure aggregation: no Sudoku constraint is validated here; that is the
/// solver's responsibility.
#[derive(Debug, Clone, Default)]
pub struct GridAssembler;

impl GridAssembler {
    /// Creates an assembler.
    pub fn new() -> Self {
        Self
    }

    /// Maps row-major classifications onto a [`Grid`] and a parallel
    /// diagnostic record per cell.
    ///
    /// # Errors
    ///
    /// Returns [`SudocrError::InvalidInput`] unless exactly 81
    /// classifications are supplied.
    pub fn assemble(
        &self,
        classifications: &[CellClassification],
    ) -> SudocrResult<(Grid, Vec<CellReport>)> {
        if classifications.len() != CELL_COUNT {
            return Err(SudocrError::invalid_input(format!(
                "expected {CELL_COUNT} classifications, got {}",
                classifications.len()
            )));
        }

        let mut grid = Grid::empty();
        let mut reports = Vec::with_capacity(CELL_COUNT);
        for (index, classification) in classifications.iter().enumerate() {
            let row = index / GRID_SIZE;
            let col = index % GRID_SIZE;
            let (status, value) = match classification.label {
                CellLabel::Blank => (CellStatus::Blank, 0),
                CellLabel::Digit(digit) => (CellStatus::Number, digit),
            };
            grid.set(row, col, value);
            reports.push(CellReport {
                row: row as u8,
                col: col as u8,
                status,
                value,
                ink_ratio: classification.ink_ratio,
            });
        }
        Ok((grid, reports))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank(ratio: f32) -> CellClassification {
        CellClassification {
            label: CellLabel::Blank,
            ink_ratio: ratio,
        }
    }

    #[test]
    fn maps_labels_to_values_and_statuses() {
        let mut classifications = vec![blank(0.001); CELL_COUNT];
        classifications[0] = CellClassification {
            label: CellLabel::Digit(5),
            ink_ratio: 0.09,
        };
        classifications[80] = CellClassification {
            label: CellLabel::Digit(9),
            ink_ratio: 0.11,
        };

        let (grid, reports) = GridAssembler::new().assemble(&classifications).unwrap();
        assert_eq!(grid.get(0, 0), 5);
        assert_eq!(grid.get(8, 8), 9);
        assert_eq!(grid.get(4, 4), 0);

        assert_eq!(reports.len(), CELL_COUNT);
        assert_eq!(reports[0].status, CellStatus::Number);
        assert_eq!(reports[0].value, 5);
        assert_eq!(reports[80].row, 8);
        assert_eq!(reports[80].col, 8);
        assert_eq!(reports[40].status, CellStatus::Blank);
        assert_eq!(reports[40].ink_ratio, 0.001);
    }

    #[test]
    fn wrong_count_is_rejected() {
        let classifications = vec![blank(0.0); 80];
        assert!(matches!(
            GridAssembler::new().assemble(&classifications),
            Err(SudocrError::InvalidInput { .. })
        ));
    }
}
