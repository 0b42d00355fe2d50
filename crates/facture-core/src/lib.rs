//! Core library for French invoice line-item extraction.
//!
//! This crate provides:
//! - Flattening of raw OCR output into positioned text boxes
//! - Row reconstruction by vertical clustering of text boxes
//! - Line-item classification (designation, quantity, unit price, amount)
//! - CSV output and per-image / batch orchestration

pub mod error;
pub mod models;
pub mod ocr;
pub mod invoice;
pub mod output;
pub mod pipeline;

pub use error::{FactureError, ImageFailure, OcrError, Result};
pub use models::config::FactureConfig;
pub use models::record::InvoiceRecord;
pub use ocr::{create_engine, OcrEngine, OcrOutput, OcrRegion, RawBox, Row, RowGrouper, TextBox};
pub use invoice::{ExtractionResult, InvoiceExtractor, LineItemParser, RowClassifier};
pub use output::{CsvSink, RecordSink, CSV_HEADER};
pub use pipeline::{output_path_for, BatchReport, ImageOutcome, ImageReport, ImageStatus, InvoiceProcessor};
