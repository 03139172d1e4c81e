//! # sudocr
//!
//! A Rust library that turns a photograph of a 9x9 Sudoku puzzle into a
//! validated digit grid and computes its completion.
//!
//! ## Features
//!
//! - Boundary detection: finds the puzzle's outer quadrilateral in frame
//! - Perspective rectification: warps the board into an axis-aligned square
//! - Cell segmentation: 81 trimmed cells in deterministic row-major order
//! - Cell classification: cheap ink-ratio blank gate, external OCR for the
//!   rest, majority-vote disambiguation
//! - Constraint solving: deterministic backtracking with deadline and
//!   cooperative cancellation
//!
//! The optical character recognizer is *not* part of this crate. Callers
//! supply one through the [`OcrCollaborator`] trait; uncertain recognition
//! degrades to a blank cell rather than a guessed digit.
//!
//! ## Modules
//!
//! * [`core`] - Errors, configuration, and the collaborator seam
//! * [`domain`] - The grid and its per-cell diagnostics
//! * [`pipeline`] - The perception pipeline and its five stages
//! * [`processors`] - Geometry, binarization, and warping primitives
//! * [`solver`] - The backtracking constraint solver
//! * [`utils`] - Image loading and board rendering
//!
//! ## Quick start
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use image::GrayImage;
//! use sudocr::prelude::*;
//!
//! // Wrap whatever OCR engine is available.
//! struct MyOcr;
//!
//! impl OcrCollaborator for MyOcr {
//!     fn recognize(
//!         &self,
//!         _glyph: &GrayImage,
//!         _whitelist: &[char],
//!         _timeout: Duration,
//!     ) -> Result<Vec<char>, BoxedOcrError> {
//!         Ok(vec!['7'])
//!     }
//! }
//!
//! # fn main() -> Result<(), sudocr::SudocrError> {
//! let scanner = SudokuScanner::with_defaults(Arc::new(MyOcr))?;
//! let scan = scanner.scan_path(Path::new("puzzle.jpg"))?;
//! println!("{}", scan.grid);
//!
//! let solved = scanner.solve_grid(&scan.grid)?;
//! println!("{solved}");
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod domain;
pub mod pipeline;
pub mod processors;
pub mod solver;
pub mod utils;

// --- High-level re-exports -------------------------------------------------

pub use crate::core::{
    BoxedOcrError, ClassifierConfig, OcrCollaborator, ParallelPolicy, QuadDetectorConfig,
    ScannerConfig, SegmenterConfig, SolverLimits, SudocrError, SudocrResult,
};
pub use crate::domain::{CellReport, CellStatus, Grid};
pub use crate::pipeline::{ScanResult, SudokuScanner};
pub use crate::processors::{Point, Quad};
pub use crate::solver::{CancelToken, solve};

/// Small prelude for callers who want the whole surface at once.
pub mod prelude {
    pub use crate::core::{BoxedOcrError, OcrCollaborator, ScannerConfig, SudocrResult};
    pub use crate::domain::{CellReport, CellStatus, Grid};
    pub use crate::pipeline::{ScanResult, SudokuScanner};
    pub use crate::solver::{CancelToken, solve};
}
