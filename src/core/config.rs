//! Configuration types for the scanning and solving pipeline.
//!
//! Every tunable the pipeline exposes lives in one of the structs below and
//! is passed explicitly to the component that consumes it; there is no
//! process-wide mutable configuration. Each struct carries serde-friendly
//! defaults, builder-style `with_*` setters, and a `validate` method that is
//! run when the owning component is constructed.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Enum representing configuration validation failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error indicating that a configuration value is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error indicating that a field is outside its permitted range.
    #[error("{field} out of range: {message}")]
    OutOfRange {
        /// The offending field.
        field: &'static str,
        /// The permitted range and the observed value.
        message: String,
    },
}

/// Configuration for the puzzle-boundary detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuadDetectorConfig {
    /// Sigma of the Gaussian blur applied before thresholding.
    /// Default: 1.4 (the equivalent of a 7x7 kernel).
    #[serde(default = "QuadDetectorConfig::default_blur_sigma")]
    pub blur_sigma: f32,

    /// Side length of the adaptive-threshold neighborhood, in pixels.
    /// Must be odd and at least 3. Default: 11.
    #[serde(default = "QuadDetectorConfig::default_block_size")]
    pub adaptive_block_size: u32,

    /// Constant subtracted from the neighborhood mean before comparison.
    /// Default: 2.
    #[serde(default = "QuadDetectorConfig::default_adaptive_constant")]
    pub adaptive_constant: i16,

    /// Polygon-approximation tolerance as a fraction of contour perimeter.
    /// Default: 0.02.
    #[serde(default = "QuadDetectorConfig::default_approx_tolerance")]
    pub approx_tolerance: f32,
}

impl QuadDetectorConfig {
    fn default_blur_sigma() -> f32 {
        1.4
    }

    fn default_block_size() -> u32 {
        11
    }

    fn default_adaptive_constant() -> i16 {
        2
    }

    fn default_approx_tolerance() -> f32 {
        0.02
    }

    /// Sets the blur sigma.
    pub fn with_blur_sigma(mut self, sigma: f32) -> Self {
        self.blur_sigma = sigma;
        self
    }

    /// Sets the adaptive-threshold block size.
    pub fn with_adaptive_block_size(mut self, block_size: u32) -> Self {
        self.adaptive_block_size = block_size;
        self
    }

    /// Sets the adaptive-threshold constant.
    pub fn with_adaptive_constant(mut self, constant: i16) -> Self {
        self.adaptive_constant = constant;
        self
    }

    /// Sets the polygon-approximation tolerance.
    pub fn with_approx_tolerance(mut self, tolerance: f32) -> Self {
        self.approx_tolerance = tolerance;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.blur_sigma > 0.0) {
            return Err(ConfigError::OutOfRange {
                field: "blur_sigma",
                message: format!("must be positive, got {}", self.blur_sigma),
            });
        }
        if self.adaptive_block_size < 3 || self.adaptive_block_size % 2 == 0 {
            return Err(ConfigError::OutOfRange {
                field: "adaptive_block_size",
                message: format!("must be odd and >= 3, got {}", self.adaptive_block_size),
            });
        }
        if !(self.approx_tolerance > 0.0 && self.approx_tolerance < 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "approx_tolerance",
                message: format!("must be in (0, 1), got {}", self.approx_tolerance),
            });
        }
        Ok(())
    }
}

impl Default for QuadDetectorConfig {
    fn default() -> Self {
        Self {
            blur_sigma: Self::default_blur_sigma(),
            adaptive_block_size: Self::default_block_size(),
            adaptive_constant: Self::default_adaptive_constant(),
            approx_tolerance: Self::default_approx_tolerance(),
        }
    }
}

/// Configuration for the cell segmenter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmenterConfig {
    /// Fraction of the cell step trimmed from each edge to exclude grid-line
    /// ink. Default: 0.12.
    #[serde(default = "SegmenterConfig::default_trim_margin")]
    pub trim_margin: f32,
}

impl SegmenterConfig {
    fn default_trim_margin() -> f32 {
        0.12
    }

    /// Sets the trim margin fraction.
    pub fn with_trim_margin(mut self, margin: f32) -> Self {
        self.trim_margin = margin;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..0.5).contains(&self.trim_margin) {
            return Err(ConfigError::OutOfRange {
                field: "trim_margin",
                message: format!("must be in [0, 0.5), got {}", self.trim_margin),
            });
        }
        Ok(())
    }
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            trim_margin: Self::default_trim_margin(),
        }
    }
}

/// Configuration for the cell classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Ink ratio below which a cell is classified blank without invoking
    /// recognition. The rule is strict: a ratio exactly at the threshold
    /// proceeds to recognition. Default: 0.02.
    #[serde(default = "ClassifierConfig::default_blank_ink_threshold")]
    pub blank_ink_threshold: f32,

    /// Radius of the morphological opening applied before recognition to
    /// remove speckle noise. Default: 1 (a 3x3 neighborhood).
    #[serde(default = "ClassifierConfig::default_opening_radius")]
    pub opening_radius: u8,

    /// Timeout for a single OCR collaborator call, in milliseconds.
    /// Default: 2000.
    #[serde(default = "ClassifierConfig::default_ocr_timeout_ms")]
    pub ocr_timeout_ms: u64,
}

impl ClassifierConfig {
    fn default_blank_ink_threshold() -> f32 {
        0.02
    }

    fn default_opening_radius() -> u8 {
        1
    }

    fn default_ocr_timeout_ms() -> u64 {
        2000
    }

    /// Sets the blank-ink threshold.
    pub fn with_blank_ink_threshold(mut self, threshold: f32) -> Self {
        self.blank_ink_threshold = threshold;
        self
    }

    /// Sets the opening radius.
    pub fn with_opening_radius(mut self, radius: u8) -> Self {
        self.opening_radius = radius;
        self
    }

    /// Sets the OCR timeout in milliseconds.
    pub fn with_ocr_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.ocr_timeout_ms = timeout_ms;
        self
    }

    /// The OCR timeout as a [`Duration`].
    pub fn ocr_timeout(&self) -> Duration {
        Duration::from_millis(self.ocr_timeout_ms)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.blank_ink_threshold) {
            return Err(ConfigError::OutOfRange {
                field: "blank_ink_threshold",
                message: format!("must be in [0, 1], got {}", self.blank_ink_threshold),
            });
        }
        if self.opening_radius == 0 {
            return Err(ConfigError::OutOfRange {
                field: "opening_radius",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            blank_ink_threshold: Self::default_blank_ink_threshold(),
            opening_radius: Self::default_opening_radius(),
            ocr_timeout_ms: Self::default_ocr_timeout_ms(),
        }
    }
}

/// Resource limits for the constraint solver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverLimits {
    /// Wall-clock budget for a single solve, in milliseconds. `None` means
    /// unbounded. Default: None.
    #[serde(default)]
    pub deadline_ms: Option<u64>,

    /// Number of placement attempts between deadline/cancellation checks.
    /// Default: 4096.
    #[serde(default = "SolverLimits::default_check_interval")]
    pub check_interval: u32,
}

impl SolverLimits {
    fn default_check_interval() -> u32 {
        4096
    }

    /// Sets the solve deadline in milliseconds.
    pub fn with_deadline_ms(mut self, deadline_ms: Option<u64>) -> Self {
        self.deadline_ms = deadline_ms;
        self
    }

    /// Sets the cancellation check interval.
    pub fn with_check_interval(mut self, interval: u32) -> Self {
        self.check_interval = interval;
        self
    }

    /// The deadline as a [`Duration`], if one is configured.
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.check_interval == 0 {
            return Err(ConfigError::OutOfRange {
                field: "check_interval",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for SolverLimits {
    fn default() -> Self {
        Self {
            deadline_ms: None,
            check_interval: Self::default_check_interval(),
        }
    }
}

/// Configuration for parallel processing behavior across the pipeline.
///
/// The 81 cell classifications are mutually independent and fan out over a
/// rayon pool once the workload exceeds `cell_threshold`; smaller workloads
/// stay sequential to avoid pool overhead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParallelPolicy {
    /// Maximum number of worker threads. If None, rayon uses its default
    /// pool size (typically the number of CPU cores). Default: None.
    #[serde(default)]
    pub max_threads: Option<usize>,

    /// Number of cells at or below which classification runs sequentially.
    /// Default: 8.
    #[serde(default = "ParallelPolicy::default_cell_threshold")]
    pub cell_threshold: usize,
}

impl ParallelPolicy {
    fn default_cell_threshold() -> usize {
        8
    }

    /// Sets the maximum worker thread count.
    pub fn with_max_threads(mut self, threads: Option<usize>) -> Self {
        self.max_threads = threads;
        self
    }

    /// Sets the sequential-classification threshold.
    pub fn with_cell_threshold(mut self, threshold: usize) -> Self {
        self.cell_threshold = threshold;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_threads == Some(0) {
            return Err(ConfigError::OutOfRange {
                field: "max_threads",
                message: "must be at least 1 when set".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for ParallelPolicy {
    fn default() -> Self {
        Self {
            max_threads: None,
            cell_threshold: Self::default_cell_threshold(),
        }
    }
}

/// Top-level configuration for [`SudokuScanner`](crate::pipeline::SudokuScanner).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Boundary-detector configuration.
    #[serde(default)]
    pub detector: QuadDetectorConfig,

    /// Cell-segmenter configuration.
    #[serde(default)]
    pub segmenter: SegmenterConfig,

    /// Cell-classifier configuration.
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Solver resource limits.
    #[serde(default)]
    pub solver: SolverLimits,

    /// Parallel processing policy.
    #[serde(default)]
    pub parallel: ParallelPolicy,
}

impl ScannerConfig {
    /// Creates a configuration with recommended defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates every component configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.detector.validate()?;
        self.segmenter.validate()?;
        self.classifier.validate()?;
        self.solver.validate()?;
        self.parallel.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(ScannerConfig::default().validate().is_ok());
    }

    #[test]
    fn even_block_size_rejected() {
        let config = QuadDetectorConfig::default().with_adaptive_block_size(10);
        assert!(config.validate().is_err());
    }

    #[test]
    fn trim_margin_range_enforced() {
        assert!(SegmenterConfig::default().with_trim_margin(0.5).validate().is_err());
        assert!(SegmenterConfig::default().with_trim_margin(-0.1).validate().is_err());
        assert!(SegmenterConfig::default().with_trim_margin(0.0).validate().is_ok());
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = ScannerConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: ScannerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.classifier.blank_ink_threshold, config.classifier.blank_ink_threshold);
        assert_eq!(back.segmenter.trim_margin, config.segmenter.trim_margin);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: ScannerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.detector.adaptive_block_size, 11);
        assert_eq!(config.classifier.blank_ink_threshold, 0.02);
    }
}
