//! Row classification and the box → row → record parser.

use std::time::Instant;

use tracing::debug;

use crate::models::config::FactureConfig;
use crate::models::record::InvoiceRecord;
use crate::ocr::{OcrOutput, RowGrouper};

use super::rules::{route_token, DesignationFilter, Number, Token};
use super::InvoiceExtractor;

/// Rows with fewer tokens than this never form a record.
const MIN_ROW_TOKENS: usize = 2;

/// Turns one row of text tokens into an [`InvoiceRecord`], or rejects it.
#[derive(Debug, Clone, Default)]
pub struct RowClassifier {
    filter: DesignationFilter,
}

impl RowClassifier {
    /// Create a classifier with the default French denylist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the designation prefix denylist.
    pub fn with_denied_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.filter = DesignationFilter::new(prefixes);
        self
    }

    /// Classify a row given its tokens in left-to-right order.
    ///
    /// Numeric tokens fill the quantity / unit price / amount columns; the
    /// remaining valid text tokens form the designation. Rows with fewer
    /// than two tokens, no designation text, or fewer than two numbers are
    /// rejected.
    pub fn classify<S: AsRef<str>>(&self, tokens: &[S]) -> Option<InvoiceRecord> {
        if tokens.len() < MIN_ROW_TOKENS {
            return None;
        }

        let mut numbers: Vec<Number> = Vec::new();
        let mut text_parts: Vec<&str> = Vec::new();

        for token in tokens {
            match route_token(token.as_ref(), &self.filter) {
                Token::Number(value) => numbers.push(value),
                Token::Text(text) => text_parts.push(text),
                Token::Dropped => {}
            }
        }

        if text_parts.is_empty() {
            return None;
        }

        let designation = text_parts.join(" ").trim().to_string();

        match numbers.as_slice() {
            [unit_price, amount] => Some(InvoiceRecord::new(
                designation,
                "",
                unit_price.format_amount(),
                amount.format_amount(),
            )),
            [quantity, unit_price, amount, ..] => Some(InvoiceRecord::new(
                designation,
                quantity.format_quantity(),
                unit_price.format_amount(),
                amount.format_amount(),
            )),
            _ => None,
        }
    }
}

/// Result of line-item extraction for one image.
#[derive(Debug, Clone, Default)]
pub struct ExtractionResult {
    /// Accepted records, top to bottom.
    pub records: Vec<InvoiceRecord>,
    /// Number of text boxes extracted from the OCR output.
    pub box_count: usize,
    /// Number of reconstructed rows.
    pub row_count: usize,
    /// Number of rows that produced no record.
    pub rejected_row_count: usize,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Full extraction: OCR output → text boxes → rows → records.
#[derive(Debug, Clone, Default)]
pub struct LineItemParser {
    grouper: RowGrouper,
    classifier: RowClassifier,
}

impl LineItemParser {
    /// Create a parser with default threshold and denylist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser from configuration.
    pub fn from_config(config: &FactureConfig) -> Self {
        Self::new()
            .with_y_threshold(config.table.y_threshold)
            .with_denied_prefixes(config.extraction.denied_prefixes.clone())
    }

    /// Set the row clustering threshold.
    pub fn with_y_threshold(mut self, y_threshold: f32) -> Self {
        self.grouper = self.grouper.with_y_threshold(y_threshold);
        self
    }

    /// Set the designation prefix denylist.
    pub fn with_denied_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.classifier = self.classifier.with_denied_prefixes(prefixes);
        self
    }

    pub fn grouper(&self) -> &RowGrouper {
        &self.grouper
    }

    pub fn classifier(&self) -> &RowClassifier {
        &self.classifier
    }
}

impl InvoiceExtractor for LineItemParser {
    fn extract(&self, ocr_output: &OcrOutput) -> ExtractionResult {
        let start = Instant::now();

        let boxes = ocr_output.text_boxes();
        let box_count = boxes.len();
        let rows = self.grouper.group(boxes);
        let row_count = rows.len();

        let records: Vec<InvoiceRecord> = rows
            .iter()
            .filter_map(|row| self.classifier.classify(&row.texts()))
            .collect();

        debug!(
            "Classified {} rows into {} records",
            row_count,
            records.len()
        );

        ExtractionResult {
            rejected_row_count: row_count - records.len(),
            records,
            box_count,
            row_count,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}
