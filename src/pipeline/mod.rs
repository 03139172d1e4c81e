//! The scanning pipeline: image in, grid and diagnostics out.
//!
//! Control flow: image -> boundary detection -> perspective rectification
//! -> cell segmentation -> per-cell classification -> grid assembly. Each
//! stage fully consumes its input before the next runs, and each failure
//! propagates immediately; the only fan-out is the classification of the
//! 81 mutually independent cells, which spreads over a rayon pool under
//! the configured [`ParallelPolicy`].

pub mod stages;

use crate::core::config::{ParallelPolicy, ScannerConfig};
use crate::core::errors::{SudocrError, SudocrResult};
use crate::core::traits::OcrCollaborator;
use crate::domain::grid::{CellReport, Grid};
use crate::processors::geometry::Quad;
use crate::solver::{self, CancelToken};
use crate::utils::image::{load_gray_image, load_gray_image_from_bytes};
use image::GrayImage;
use rayon::prelude::*;
use self::stages::{
    CellClassification, CellClassifier, CellImage, CellSegmenter, GridAssembler,
    PerspectiveRectifier, QuadDetector,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Everything a scan produces.
#[derive(Debug, Clone)]
pub struct ScanResult {
    /// The assembled 9x9 grid; 0 means blank. Carries no validity
    /// guarantee: recognition error may have introduced duplicates.
    pub grid: Grid,
    /// Per-cell diagnostics, 81 entries in row-major order.
    pub cells: Vec<CellReport>,
    /// The detected puzzle boundary in source-image coordinates.
    pub quad: Quad,
    /// The perspective-corrected board, kept as a preview.
    pub rectified: GrayImage,
}

/// The end-to-end scanner: perception stages plus the solver entry point.
pub struct SudokuScanner {
    detector: QuadDetector,
    rectifier: PerspectiveRectifier,
    segmenter: CellSegmenter,
    classifier: CellClassifier,
    assembler: GridAssembler,
    config: ScannerConfig,
}

impl SudokuScanner {
    /// Creates a scanner from a validated configuration and an OCR
    /// collaborator handle.
    ///
    /// The collaborator is shared across classification workers, so it must
    /// either be stateless or serialize access internally.
    pub fn new(config: ScannerConfig, ocr: Arc<dyn OcrCollaborator>) -> SudocrResult<Self> {
        config.validate().map_err(SudocrError::from)?;
        Ok(Self {
            detector: QuadDetector::new(config.detector.clone())?,
            rectifier: PerspectiveRectifier::new(),
            segmenter: CellSegmenter::new(config.segmenter.clone())?,
            classifier: CellClassifier::new(config.classifier.clone(), ocr)?,
            assembler: GridAssembler::new(),
            config,
        })
    }

    /// Creates a scanner with default configuration.
    pub fn with_defaults(ocr: Arc<dyn OcrCollaborator>) -> SudocrResult<Self> {
        Self::new(ScannerConfig::default(), ocr)
    }

    /// Scans a puzzle photograph from a file path.
    pub fn scan_path(&self, path: &Path) -> SudocrResult<ScanResult> {
        let image = load_gray_image(path)?;
        self.scan_image(&image)
    }

    /// Scans a puzzle photograph from an encoded byte buffer.
    pub fn scan_bytes(&self, bytes: &[u8]) -> SudocrResult<ScanResult> {
        let image = load_gray_image_from_bytes(bytes)?;
        self.scan_image(&image)
    }

    /// Scans an already-decoded grayscale image.
    pub fn scan_image(&self, image: &GrayImage) -> SudocrResult<ScanResult> {
        let started = Instant::now();

        let quad = self.detector.detect(image)?;
        debug!(elapsed_ms = started.elapsed().as_millis() as u64, "boundary located");

        let rectified = self.rectifier.rectify(image, &quad)?;
        let cells = self.segmenter.segment(&rectified)?;
        let classifications = self.classify_cells(&cells)?;
        let (grid, reports) = self.assembler.assemble(&classifications)?;

        let recognized = reports.iter().filter(|r| r.value != 0).count();
        info!(
            recognized,
            blanks = reports.len() - recognized,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "scan complete"
        );

        Ok(ScanResult {
            grid,
            cells: reports,
            quad,
            rectified,
        })
    }

    /// Completes a scanned grid under the configured solver limits.
    pub fn solve_grid(&self, grid: &Grid) -> SudocrResult<Grid> {
        solver::solve(grid, &self.config.solver, None)
    }

    /// Completes a scanned grid with a cooperative cancellation token.
    pub fn solve_grid_with_cancel(&self, grid: &Grid, cancel: &CancelToken) -> SudocrResult<Grid> {
        solver::solve(grid, &self.config.solver, Some(cancel))
    }

    /// Classifies all cells, fanning out over rayon when the workload
    /// exceeds the policy threshold.
    ///
    /// Results are collected by index, never appended, so row-major
    /// ordering is preserved regardless of completion order.
    fn classify_cells(&self, cells: &[CellImage]) -> SudocrResult<Vec<CellClassification>> {
        let policy = &self.config.parallel;
        if cells.len() <= policy.cell_threshold {
            return cells
                .iter()
                .map(|cell| self.classifier.classify(&cell.image))
                .collect();
        }

        match policy.max_threads {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| SudocrError::Config {
                        message: format!("worker pool: {e}"),
                    })?;
                pool.install(|| self.classify_parallel(cells))
            }
            None => self.classify_parallel(cells),
        }
    }

    fn classify_parallel(&self, cells: &[CellImage]) -> SudocrResult<Vec<CellClassification>> {
        cells
            .par_iter()
            .map(|cell| self.classifier.classify(&cell.image))
            .collect()
    }
}

impl std::fmt::Debug for SudokuScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SudokuScanner")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::BoxedOcrError;
    use crate::domain::grid::CellStatus;
    use image::Luma;
    use std::time::Duration;

    /// Collaborator double: always reports the same digit.
    struct ConstantOcr(char);

    impl OcrCollaborator for ConstantOcr {
        fn recognize(
            &self,
            _glyph: &GrayImage,
            _whitelist: &[char],
            _timeout: Duration,
        ) -> Result<Vec<char>, BoxedOcrError> {
            Ok(vec![self.0])
        }
    }

    /// A white board with a black outer frame and black grid lines, so the
    /// detector finds the boundary and the segmenter sees clean cells.
    fn synthetic_board() -> GrayImage {
        let mut img = GrayImage::from_pixel(520, 520, Luma([255]));
        let (left, top, side) = (30u32, 30u32, 459u32);
        let step = side / 9;
        for line in 0..=9u32 {
            let offset = line * step;
            for t in 0..2u32 {
                for i in 0..=side {
                    img.put_pixel(left + i, top + offset + t, Luma([0]));
                    img.put_pixel(left + offset + t, top + i, Luma([0]));
                }
            }
        }
        img
    }

    #[test]
    fn scans_blank_board_to_empty_grid() {
        let scanner = SudokuScanner::with_defaults(Arc::new(ConstantOcr('5'))).unwrap();
        let result = scanner.scan_image(&synthetic_board()).unwrap();

        assert_eq!(result.cells.len(), 81);
        assert_eq!(result.grid, Grid::empty(), "\n{}", result.grid);
        assert!(result.cells.iter().all(|c| c.status == CellStatus::Blank));
        assert!(result.quad.tl.x < 40.0 && result.quad.tl.y < 40.0);
    }

    #[test]
    fn scan_then_solve_completes_the_board() {
        let scanner = SudokuScanner::with_defaults(Arc::new(ConstantOcr('1'))).unwrap();
        let result = scanner.scan_image(&synthetic_board()).unwrap();
        let solved = scanner.solve_grid(&result.grid).unwrap();
        assert!(solved.is_complete());
        assert!(solved.is_consistent());
    }

    #[test]
    fn sequential_and_parallel_classification_agree() {
        let mut config = ScannerConfig::default();
        config.parallel.cell_threshold = 100; // force sequential
        let sequential = SudokuScanner::new(config, Arc::new(ConstantOcr('3'))).unwrap();
        let parallel = SudokuScanner::with_defaults(Arc::new(ConstantOcr('3'))).unwrap();

        let board = synthetic_board();
        let a = sequential.scan_image(&board).unwrap();
        let b = parallel.scan_image(&board).unwrap();
        assert_eq!(a.grid, b.grid);
        let ratios_a: Vec<f32> = a.cells.iter().map(|c| c.ink_ratio).collect();
        let ratios_b: Vec<f32> = b.cells.iter().map(|c| c.ink_ratio).collect();
        assert_eq!(ratios_a, ratios_b);
    }

    #[test]
    fn featureless_image_fails_with_contour_not_found() {
        let scanner = SudokuScanner::with_defaults(Arc::new(ConstantOcr('1'))).unwrap();
        let blank = GrayImage::from_pixel(200, 200, Luma([255]));
        assert!(matches!(
            scanner.scan_image(&blank),
            Err(SudocrError::ContourNotFound { .. })
        ));
    }

    #[test]
    fn undecodable_bytes_fail_with_image_read() {
        let scanner = SudokuScanner::with_defaults(Arc::new(ConstantOcr('1'))).unwrap();
        assert!(matches!(
            scanner.scan_bytes(&[0u8, 1, 2, 3]),
            Err(SudocrError::ImageRead(_))
        ));
    }
}
