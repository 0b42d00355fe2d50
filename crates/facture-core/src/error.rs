//! Error types for the facture-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the facture library.
#[derive(Error, Debug)]
pub enum FactureError {
    /// OCR engine error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Image could not be opened or decoded.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writing or reading error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to the OCR collaborator.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The engine failed to run or reported a failure.
    #[error("OCR engine failed: {0}")]
    Engine(String),

    /// No OCR output exists for the image.
    #[error("no OCR output found at {}", path.display())]
    MissingOutput { path: PathBuf },

    /// The engine produced output that is not an OCR result document.
    #[error("malformed OCR output: {0}")]
    Malformed(String),

    /// The engine is not configured well enough to run.
    #[error("OCR engine not configured: {0}")]
    NotConfigured(String),
}

/// Failure of a single image inside a batch.
///
/// Carries the image path so a batch report can list what failed and why
/// without aborting the remaining images.
#[derive(Error, Debug)]
#[error("failed to process {}: {source}", path.display())]
pub struct ImageFailure {
    /// Image that failed.
    pub path: PathBuf,
    /// Underlying cause.
    #[source]
    pub source: FactureError,
}

impl ImageFailure {
    pub fn new(path: impl Into<PathBuf>, source: impl Into<FactureError>) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
        }
    }
}

/// Result type for the facture library.
pub type Result<T> = std::result::Result<T, FactureError>;
