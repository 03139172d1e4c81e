//! The 9x9 digit grid and its diagnostic records.

use crate::core::errors::{SudocrError, SudocrResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Side length of the grid.
pub const GRID_SIZE: usize = 9;

/// Side length of one 3x3 box.
pub const BOX_SIZE: usize = 3;

/// Total number of cells.
pub const CELL_COUNT: usize = GRID_SIZE * GRID_SIZE;

/// A 9x9 matrix of values in 0..=9, where 0 means "no value".
///
/// A freshly assembled grid carries no validity guarantee: recognition
/// error may have produced duplicate values within a row, column, or box.
/// Use [`Grid::find_conflict`] to fast-fail on such input before solving,
/// or hand it straight to the solver, which reports such grids as
/// unsatisfiable through exhaustive search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid([[u8; GRID_SIZE]; GRID_SIZE]);

impl Grid {
    /// Creates an all-blank grid.
    pub fn empty() -> Self {
        Grid([[0; GRID_SIZE]; GRID_SIZE])
    }

    /// Creates a grid from row-major rows, rejecting values above 9.
    pub fn from_rows(rows: [[u8; GRID_SIZE]; GRID_SIZE]) -> SudocrResult<Self> {
        for (row, values) in rows.iter().enumerate() {
            for (col, &value) in values.iter().enumerate() {
                if value > 9 {
                    return Err(SudocrError::invalid_input(format!(
                        "cell ({row}, {col}) holds {value}, expected 0..=9"
                    )));
                }
            }
        }
        Ok(Grid(rows))
    }

    /// The value at `(row, col)`; 0 means blank.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.0[row][col]
    }

    /// Sets the value at `(row, col)`.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: u8) {
        debug_assert!(value <= 9);
        self.0[row][col] = value;
    }

    /// The rows of the grid, row-major.
    pub fn rows(&self) -> &[[u8; GRID_SIZE]; GRID_SIZE] {
        &self.0
    }

    /// The first blank cell in row-major order, if any.
    pub fn first_empty(&self) -> Option<(usize, usize)> {
        for row in 0..GRID_SIZE {
            for col in 0..GRID_SIZE {
                if self.0[row][col] == 0 {
                    return Some((row, col));
                }
            }
        }
        None
    }

    /// Whether every cell holds a value in 1..=9.
    pub fn is_complete(&self) -> bool {
        self.first_empty().is_none()
    }

    /// Whether placing `value` at `(row, col)` keeps row, column, and box
    /// uniqueness. The cell itself is not inspected; callers place into
    /// blank cells only.
    pub fn value_fits(&self, row: usize, col: usize, value: u8) -> bool {
        for x in 0..GRID_SIZE {
            if self.0[row][x] == value || self.0[x][col] == value {
                return false;
            }
        }
        let box_row = BOX_SIZE * (row / BOX_SIZE);
        let box_col = BOX_SIZE * (col / BOX_SIZE);
        for r in box_row..box_row + BOX_SIZE {
            for c in box_col..box_col + BOX_SIZE {
                if self.0[r][c] == value {
                    return false;
                }
            }
        }
        true
    }

    /// Finds a duplicate among the filled cells, if any.
    ///
    /// Scans rows, then columns, then boxes, and reports the first pair of
    /// cells sharing a value within the same unit. The solver does not run
    /// this check; it exists for callers who want to fail fast on malformed
    /// input instead of paying for an exhaustive search.
    pub fn find_conflict(&self) -> Option<Conflict> {
        for row in 0..GRID_SIZE {
            let cells: Vec<(usize, usize)> = (0..GRID_SIZE).map(|col| (row, col)).collect();
            if let Some(conflict) = self.conflict_in_unit(ConflictKind::Row, &cells) {
                return Some(conflict);
            }
        }
        for col in 0..GRID_SIZE {
            let cells: Vec<(usize, usize)> = (0..GRID_SIZE).map(|row| (row, col)).collect();
            if let Some(conflict) = self.conflict_in_unit(ConflictKind::Column, &cells) {
                return Some(conflict);
            }
        }
        for box_row in (0..GRID_SIZE).step_by(BOX_SIZE) {
            for box_col in (0..GRID_SIZE).step_by(BOX_SIZE) {
                let mut cells = Vec::with_capacity(GRID_SIZE);
                for r in box_row..box_row + BOX_SIZE {
                    for c in box_col..box_col + BOX_SIZE {
                        cells.push((r, c));
                    }
                }
                if let Some(conflict) = self.conflict_in_unit(ConflictKind::Box, &cells) {
                    return Some(conflict);
                }
            }
        }
        None
    }

    /// Whether the filled cells are free of row, column, and box duplicates.
    pub fn is_consistent(&self) -> bool {
        self.find_conflict().is_none()
    }

    fn conflict_in_unit(&self, kind: ConflictKind, cells: &[(usize, usize)]) -> Option<Conflict> {
        let mut seen: [Option<(usize, usize)>; 10] = [None; 10];
        for &(row, col) in cells {
            let value = self.0[row][col];
            if value == 0 {
                continue;
            }
            if let Some(first) = seen[value as usize] {
                return Some(Conflict {
                    kind,
                    value,
                    first,
                    second: (row, col),
                });
            }
            seen[value as usize] = Some((row, col));
        }
        None
    }
}

impl fmt::Display for Grid {
    /// Renders the grid with dots for blanks and separators between bands.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, values) in self.0.iter().enumerate() {
            if row % BOX_SIZE == 0 && row != 0 {
                writeln!(f, "------+-------+------")?;
            }
            for (col, &value) in values.iter().enumerate() {
                if col % BOX_SIZE == 0 && col != 0 {
                    write!(f, "| ")?;
                }
                if value == 0 {
                    write!(f, ". ")?;
                } else {
                    write!(f, "{value} ")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// The kind of unit a duplicate was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictKind {
    /// Duplicate within a row.
    Row,
    /// Duplicate within a column.
    Column,
    /// Duplicate within a 3x3 box.
    Box,
}

/// A duplicate value among the filled cells of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conflict {
    /// The unit the duplicate occurs in.
    pub kind: ConflictKind,
    /// The duplicated value.
    pub value: u8,
    /// The first cell holding the value, as `(row, col)`.
    pub first: (usize, usize),
    /// The second cell holding the value, as `(row, col)`.
    pub second: (usize, usize),
}

/// Classification status of a scanned cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellStatus {
    /// The cell was judged empty, or recognition was too uncertain to keep.
    Blank,
    /// The cell holds a recognized digit.
    Number,
}

/// Diagnostic record for one scanned cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellReport {
    /// Row index, 0..=8.
    pub row: u8,
    /// Column index, 0..=8.
    pub col: u8,
    /// Blank or number.
    pub status: CellStatus,
    /// The recognized value; 0 when blank.
    pub value: u8,
    /// Fraction of foreground pixels in the trimmed cell, in [0, 1].
    pub ink_ratio: f32,
}
