//! Invoice line-item extraction.

mod parser;
pub mod rules;

pub use parser::{ExtractionResult, LineItemParser, RowClassifier};

use crate::ocr::OcrOutput;

/// Trait for line-item extractors.
pub trait InvoiceExtractor {
    /// Extract line items from the OCR output of one image.
    fn extract(&self, ocr_output: &OcrOutput) -> ExtractionResult;
}
