//! Trait seams for external collaborators.
//!
//! The optical character recognizer is not part of this crate: it is an
//! external capability the classifier calls through the narrow
//! [`OcrCollaborator`] interface. Implementations wrap whatever engine is
//! available (a Tesseract binding, a remote service, a test double) and are
//! injected into the pipeline at construction time rather than discovered
//! through process-wide state.

use crate::core::errors::BoxedOcrError;
use image::GrayImage;
use std::time::Duration;

/// The characters recognition is constrained to: decimal digits only.
pub const DIGIT_WHITELIST: [char; 10] = ['0', '1', '2', '3', '4', '5', '6', '7', '8', '9'];

/// An external single-glyph character recognizer.
///
/// Implementations must be shareable across worker threads: cell
/// classification fans out over a rayon pool and every worker calls the same
/// collaborator instance. Engines that are not reentrant should serialize
/// access internally.
pub trait OcrCollaborator: Send + Sync {
    /// Recognizes characters in a prepared glyph image.
    ///
    /// The glyph is a binarized cell with ink as foreground (non-zero
    /// pixels). The collaborator may return zero or more characters, in no
    /// guaranteed order, possibly including noise artifacts; the caller is
    /// responsible for all vote aggregation and confidence interpretation.
    ///
    /// # Arguments
    ///
    /// * `glyph` - The prepared cell image to recognize.
    /// * `whitelist` - Characters recognition is constrained to.
    /// * `timeout` - Budget for the call; implementations should give up and
    ///   return an error once it elapses.
    ///
    /// # Errors
    ///
    /// Any engine failure or timeout, boxed. The classifier surfaces these
    /// as [`SudocrError::OcrUnavailable`](crate::core::SudocrError::OcrUnavailable).
    fn recognize(
        &self,
        glyph: &GrayImage,
        whitelist: &[char],
        timeout: Duration,
    ) -> Result<Vec<char>, BoxedOcrError>;
}
