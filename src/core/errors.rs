//! Error types for the scanning and solving pipeline.
//!
//! This module defines the error taxonomy shared by every pipeline stage:
//! image loading failures, boundary-detection and geometry failures, OCR
//! collaborator failures, and the two distinct solver outcomes (a grid that
//! provably admits no completion versus a search that was cut short). Each
//! stage fails fast and propagates its error to the caller; there is no
//! retry logic inside the pipeline.

use thiserror::Error;

/// Convenient result alias for pipeline operations.
pub type SudocrResult<T> = Result<T, SudocrError>;

/// Boxed error type returned by OCR collaborators.
///
/// The collaborator is an external capability; whatever engine backs it, its
/// failures cross the seam as an opaque boxed error and are surfaced as
/// [`SudocrError::OcrUnavailable`].
pub type BoxedOcrError = Box<dyn std::error::Error + Send + Sync>;

/// Enum representing the failures that can occur while scanning and solving.
#[derive(Error, Debug)]
pub enum SudocrError {
    /// The input image could not be read or decoded.
    #[error("image read")]
    ImageRead(#[source] image::ImageError),

    /// No external contour approximated to a 4-vertex polygon.
    #[error("no 4-vertex boundary found among {candidates} contour candidate(s)")]
    ContourNotFound {
        /// Number of external contours that were examined.
        candidates: usize,
    },

    /// The detected quadrilateral collapsed to a degenerate shape.
    #[error("degenerate quadrilateral: {message}")]
    DegenerateGeometry {
        /// What collapsed: coincident corners, a zero dimension, or an
        /// unsolvable perspective system.
        message: String,
    },

    /// The OCR collaborator failed or timed out.
    #[error("ocr collaborator unavailable during {context}")]
    OcrUnavailable {
        /// What the collaborator was asked to do.
        context: String,
        /// The underlying collaborator error.
        #[source]
        source: BoxedOcrError,
    },

    /// The solver exhausted every placement without completing the grid.
    #[error("grid admits no valid completion")]
    Unsatisfiable,

    /// The solver hit its deadline or was cancelled mid-search.
    ///
    /// Deliberately distinct from [`SudocrError::Unsatisfiable`]: a
    /// cancelled search says nothing about whether the grid is solvable.
    #[error("search cancelled before completion")]
    Cancelled,

    /// Error indicating invalid input to a stage.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    Config {
        /// A message describing the configuration error.
        message: String,
    },

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

impl SudocrError {
    /// Creates a [`SudocrError::DegenerateGeometry`] with the given message.
    pub fn degenerate(message: impl Into<String>) -> Self {
        SudocrError::DegenerateGeometry {
            message: message.into(),
        }
    }

    /// Creates a [`SudocrError::OcrUnavailable`] wrapping a collaborator error.
    ///
    /// # Arguments
    ///
    /// * `context` - What the collaborator was asked to do.
    /// * `source` - The underlying collaborator error.
    pub fn ocr_unavailable(context: impl Into<String>, source: BoxedOcrError) -> Self {
        SudocrError::OcrUnavailable {
            context: context.into(),
            source,
        }
    }

    /// Creates a [`SudocrError::InvalidInput`] with the given message.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        SudocrError::InvalidInput {
            message: message.into(),
        }
    }
}

impl From<crate::core::config::ConfigError> for SudocrError {
    fn from(err: crate::core::config::ConfigError) -> Self {
        SudocrError::Config {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solver_outcomes_are_distinct() {
        let unsat = SudocrError::Unsatisfiable;
        let cancelled = SudocrError::Cancelled;
        assert_ne!(unsat.to_string(), cancelled.to_string());
    }

    #[test]
    fn ocr_error_preserves_source() {
        let source: BoxedOcrError = "engine crashed".into();
        let err = SudocrError::ocr_unavailable("digit recognition", source);
        assert!(err.to_string().contains("digit recognition"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
