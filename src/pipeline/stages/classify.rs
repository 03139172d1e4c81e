//! Cell classification stage: blank detection and digit recognition.

use crate::core::config::ClassifierConfig;
use crate::core::errors::{SudocrError, SudocrResult};
use crate::core::traits::{DIGIT_WHITELIST, OcrCollaborator};
use crate::processors::binarize::{ink_ratio, otsu_binarize_inv};
use image::GrayImage;
use imageproc::distance_transform::Norm;
use imageproc::morphology;
use std::sync::Arc;
use tracing::{debug, trace};

/// The decision made for one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellLabel {
    /// No value: the cell is empty, or recognition was too uncertain.
    Blank,
    /// A recognized digit in 1..=9.
    Digit(u8),
}

/// Classification of one cell plus its ink diagnostic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellClassification {
    /// Blank or a recognized digit.
    pub label: CellLabel,
    /// Fraction of foreground pixels in the trimmed cell, in [0, 1].
    pub ink_ratio: f32,
}

/// Decides blank vs. digit-bearing per cell, delegating glyph recognition
/// to the external OCR collaborator.
///
/// The blankness gate is the dominant, cheap path: most cells of a typical
/// puzzle are empty and never reach the collaborator. Recognition output is
/// resolved by majority vote, and uncertain output degrades to blank: the
/// classifier under-reports rather than guessing a wrong digit.
#[derive(Clone)]
pub struct CellClassifier {
    config: ClassifierConfig,
    ocr: Arc<dyn OcrCollaborator>,
}

impl CellClassifier {
    /// Creates a classifier with a validated configuration and a shared
    /// collaborator handle.
    pub fn new(config: ClassifierConfig, ocr: Arc<dyn OcrCollaborator>) -> SudocrResult<Self> {
        config.validate()?;
        Ok(Self { config, ocr })
    }

    /// Classifies one trimmed cell image.
    ///
    /// Binarizes with an inverted Otsu threshold and computes the ink
    /// ratio. A ratio strictly below the blank threshold classifies the
    /// cell blank; a ratio exactly at the threshold proceeds to
    /// recognition. Digit-bearing cells are opened to drop speckle noise
    /// and handed to the collaborator restricted to the digit whitelist.
    ///
    /// # Errors
    ///
    /// Returns [`SudocrError::OcrUnavailable`] when the collaborator fails
    /// or times out. Ambiguous recognition is not an error; it degrades to
    /// blank.
    pub fn classify(&self, cell: &GrayImage) -> SudocrResult<CellClassification> {
        let mask = otsu_binarize_inv(cell);
        let ratio = ink_ratio(&mask);

        if ratio < self.config.blank_ink_threshold {
            trace!(ratio, "cell below ink threshold");
            return Ok(CellClassification {
                label: CellLabel::Blank,
                ink_ratio: ratio,
            });
        }

        let opened = morphology::open(&mask, Norm::LInf, self.config.opening_radius);
        let chars = self
            .ocr
            .recognize(&opened, &DIGIT_WHITELIST, self.config.ocr_timeout())
            .map_err(|source| SudocrError::ocr_unavailable("single-digit recognition", source))?;

        let label = match majority_digit(&chars) {
            Some(digit) if (1..=9).contains(&digit) => CellLabel::Digit(digit),
            _ => CellLabel::Blank,
        };
        debug!(ratio, ?label, returned = chars.len(), "cell classified");

        Ok(CellClassification {
            label,
            ink_ratio: ratio,
        })
    }
}

/// Picks the most frequent digit among the collaborator's output.
///
/// Ties break to the numerically smallest digit; non-digit characters are
/// ignored. Returns None when no digit was returned at all.
fn majority_digit(chars: &[char]) -> Option<u8> {
    let mut counts = [0usize; 10];
    for ch in chars {
        if let Some(digit) = ch.to_digit(10) {
            counts[digit as usize] += 1;
        }
    }

    let mut winner = None;
    let mut winner_count = 0usize;
    for (digit, &count) in counts.iter().enumerate() {
        if count > winner_count {
            winner = Some(digit as u8);
            winner_count = count;
        }
    }
    winner
}
