//! WASM bindings for French invoice line-item extraction.
//!
//! OCR runs on the JavaScript side; these bindings take its JSON result
//! (PaddleOCR shape) and return line items or CSV text.

use wasm_bindgen::prelude::*;

use facture_core::invoice::rules;
use facture_core::models::config::validate_y_threshold;
use facture_core::output::records_to_csv_string;
use facture_core::{ExtractionResult, InvoiceExtractor, InvoiceRecord, LineItemParser, OcrOutput};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn run(parser: &LineItemParser, ocr_json: &str) -> Result<ExtractionResult, JsValue> {
    let output = OcrOutput::from_json_str(ocr_json).map_err(to_js_error)?;
    Ok(parser.extract(&output))
}

fn csv(records: &[InvoiceRecord]) -> Result<String, JsValue> {
    records_to_csv_string(records, b',').map_err(to_js_error)
}

/// Extract line items from an OCR result JSON document.
///
/// Returns an array of `{designation, quantity, unit_price, amount}`.
#[wasm_bindgen]
pub fn extract_records(ocr_json: &str) -> Result<JsValue, JsValue> {
    let result = run(&LineItemParser::new(), ocr_json)?;
    serde_wasm_bindgen::to_value(&result.records).map_err(to_js_error)
}

/// Extract line items from an OCR result JSON document as CSV text.
#[wasm_bindgen]
pub fn extract_csv(ocr_json: &str) -> Result<String, JsValue> {
    let result = run(&LineItemParser::new(), ocr_json)?;
    csv(&result.records)
}

/// Parse a French-formatted number (e.g., "1 234,56").
#[wasm_bindgen]
pub fn parse_number(token: &str) -> Option<f64> {
    rules::parse_number(token).and_then(rules::Number::to_f64)
}

/// Line-item extractor class with adjustable settings.
#[wasm_bindgen]
pub struct LineItemExtractor {
    parser: LineItemParser,
}

#[wasm_bindgen]
impl LineItemExtractor {
    /// Create an extractor with default settings.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            parser: LineItemParser::new(),
        }
    }

    /// Set the maximum vertical distance for boxes to share a row.
    #[wasm_bindgen]
    pub fn set_y_threshold(&mut self, y_threshold: f32) -> Result<(), JsValue> {
        let y_threshold = validate_y_threshold(y_threshold).map_err(to_js_error)?;
        self.parser = self.parser.clone().with_y_threshold(y_threshold);
        Ok(())
    }

    /// Replace the designation prefix denylist.
    #[wasm_bindgen]
    pub fn set_denied_prefixes(&mut self, prefixes: Vec<String>) {
        self.parser = self.parser.clone().with_denied_prefixes(prefixes);
    }

    /// Extract line items with row statistics.
    #[wasm_bindgen]
    pub fn extract(&self, ocr_json: &str) -> Result<JsValue, JsValue> {
        let result = run(&self.parser, ocr_json)?;

        #[derive(serde::Serialize)]
        struct ExtractOutput {
            records: Vec<InvoiceRecord>,
            box_count: usize,
            row_count: usize,
            rejected_row_count: usize,
            processing_time_ms: u64,
        }

        let output = ExtractOutput {
            records: result.records,
            box_count: result.box_count,
            row_count: result.row_count,
            rejected_row_count: result.rejected_row_count,
            processing_time_ms: result.processing_time_ms,
        };

        serde_wasm_bindgen::to_value(&output).map_err(to_js_error)
    }

    /// Extract line items as CSV text.
    #[wasm_bindgen]
    pub fn to_csv(&self, ocr_json: &str) -> Result<String, JsValue> {
        let result = run(&self.parser, ocr_json)?;
        csv(&result.records)
    }
}

impl Default for LineItemExtractor {
    fn default() -> Self {
        Self::new()
    }
}
