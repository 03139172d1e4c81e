//! Domain types: the 9x9 grid and its per-cell diagnostics.

pub mod grid;

pub use grid::{
    BOX_SIZE, CELL_COUNT, CellReport, CellStatus, Conflict, ConflictKind, GRID_SIZE, Grid,
};
