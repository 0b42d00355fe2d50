//! Per-image and batch processing.
//!
//! Each image is processed on its own: OCR output is read, rows are rebuilt
//! and classified, and the records are written to `<stem>.csv`. A failing
//! image is reported with its path and never stops the rest of a batch
//! unless the caller asks for it.

use std::fs;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{ImageFailure, Result};
use crate::invoice::{ExtractionResult, InvoiceExtractor, LineItemParser};
use crate::models::config::{FactureConfig, InputConfig};
use crate::ocr::{create_engine, OcrEngine};
use crate::output::{CsvSink, RecordSink};

/// What happened to an image that was processed successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageStatus {
    /// Records were written to `output`.
    Written { output: PathBuf },
    /// No line items were found; nothing was written.
    NoData,
}

/// Report for one successfully processed image.
#[derive(Debug, Clone)]
pub struct ImageReport {
    pub image: PathBuf,
    pub status: ImageStatus,
    pub record_count: usize,
    pub processing_time_ms: u64,
}

/// Outcome of one image in a batch.
pub type ImageOutcome = std::result::Result<ImageReport, ImageFailure>;

/// Outcomes of a batch run, in processing order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<ImageOutcome>,
    /// The caller stopped the batch before all images were processed.
    pub stopped_early: bool,
    pub elapsed_ms: u64,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn successes(&self) -> impl Iterator<Item = &ImageReport> {
        self.outcomes.iter().filter_map(|o| o.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &ImageFailure> {
        self.outcomes.iter().filter_map(|o| o.as_ref().err())
    }

    pub fn written_count(&self) -> usize {
        self.successes()
            .filter(|r| matches!(r.status, ImageStatus::Written { .. }))
            .count()
    }

    pub fn no_data_count(&self) -> usize {
        self.successes()
            .filter(|r| r.status == ImageStatus::NoData)
            .count()
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }
}

/// CSV file for an image: `<output_dir>/<image stem>.csv`.
pub fn output_path_for(image: &Path, output_dir: &Path) -> PathBuf {
    let stem = image
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "invoice".to_string());
    output_dir.join(format!("{}.csv", stem))
}

/// Runs the extraction pipeline over images with one long-lived OCR engine.
pub struct InvoiceProcessor {
    engine: Box<dyn OcrEngine>,
    parser: LineItemParser,
    input: InputConfig,
    delimiter: u8,
}

impl InvoiceProcessor {
    /// Create a processor with default input settings and `,` delimiter.
    pub fn new(engine: Box<dyn OcrEngine>, parser: LineItemParser) -> Self {
        Self {
            engine,
            parser,
            input: InputConfig::default(),
            delimiter: b',',
        }
    }

    /// Build the engine, parser, and output settings from configuration.
    pub fn from_config(config: &FactureConfig) -> Result<Self> {
        config.table.validate()?;
        let engine = create_engine(&config.ocr)?;
        let parser = LineItemParser::from_config(config);
        Ok(Self::new(engine, parser)
            .with_input_config(config.input.clone())
            .with_delimiter(config.output.delimiter_byte()?))
    }

    pub fn with_input_config(mut self, input: InputConfig) -> Self {
        self.input = input;
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Run OCR and line-item extraction on one image.
    pub fn extract(&self, image: &Path) -> Result<ExtractionResult> {
        let start = Instant::now();

        let (width, height) = image::image_dimensions(image)?;
        info!("Processing {} ({}x{})", image.display(), width, height);

        let ocr_output = self.engine.recognize(image)?;
        let mut result = self.parser.extract(&ocr_output);
        result.processing_time_ms = start.elapsed().as_millis() as u64;

        debug!(
            "{}: {} boxes, {} rows, {} records in {}ms",
            image.display(),
            result.box_count,
            result.row_count,
            result.records.len(),
            result.processing_time_ms
        );

        Ok(result)
    }

    /// Process one image and write its records to `output`.
    ///
    /// Nothing is written when the image yields no records.
    pub fn process_invoice(&self, image: &Path, output: &Path) -> ImageOutcome {
        self.write_invoice(image, output)
            .map_err(|source| ImageFailure::new(image, source))
    }

    fn write_invoice(&self, image: &Path, output: &Path) -> Result<ImageReport> {
        let result = self.extract(image)?;
        let record_count = result.records.len();

        let status = if result.records.is_empty() {
            info!("No valid data found in {}", image.display());
            ImageStatus::NoData
        } else {
            let mut sink = CsvSink::from_path(output, self.delimiter)?;
            sink.write_records(&result.records)?;
            info!("Saved {} records to {}", record_count, output.display());
            ImageStatus::Written {
                output: output.to_path_buf(),
            }
        };

        Ok(ImageReport {
            image: image.to_path_buf(),
            status,
            record_count,
            processing_time_ms: result.processing_time_ms,
        })
    }

    /// List supported images in a directory, sorted by path.
    pub fn discover_images(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut images = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && self.input.is_supported_image(&path) {
                images.push(path);
            }
        }
        images.sort();
        debug!("Found {} images in {}", images.len(), dir.display());
        Ok(images)
    }

    /// Process every supported image of `input_dir` into `output_dir`.
    pub fn process_directory(&self, input_dir: &Path, output_dir: &Path) -> Result<BatchReport> {
        let images = self.discover_images(input_dir)?;
        self.process_files(&images, output_dir)
    }

    /// Process images into `output_dir`, continuing past failures.
    pub fn process_files(&self, images: &[PathBuf], output_dir: &Path) -> Result<BatchReport> {
        self.process_files_with(images, output_dir, |_, _| ControlFlow::Continue(()))
    }

    /// Process images into `output_dir`, calling `on_image` after each one.
    ///
    /// `on_image` receives the number of images done so far and the latest
    /// outcome; returning `ControlFlow::Break` stops the batch.
    pub fn process_files_with<F>(
        &self,
        images: &[PathBuf],
        output_dir: &Path,
        mut on_image: F,
    ) -> Result<BatchReport>
    where
        F: FnMut(usize, &ImageOutcome) -> ControlFlow<()>,
    {
        let start = Instant::now();
        fs::create_dir_all(output_dir)?;

        let mut report = BatchReport {
            outcomes: Vec::with_capacity(images.len()),
            ..BatchReport::default()
        };

        for image in images {
            let output = output_path_for(image, output_dir);
            let outcome = self.process_invoice(image, &output);

            if let Err(failure) = &outcome {
                warn!("{}", failure);
            }

            let flow = on_image(report.outcomes.len() + 1, &outcome);
            report.outcomes.push(outcome);

            if flow.is_break() {
                report.stopped_early = report.outcomes.len() < images.len();
                break;
            }
        }

        report.elapsed_ms = start.elapsed().as_millis() as u64;
        info!(
            "Processed {} images: {} written, {} without data, {} failed",
            report.total(),
            report.written_count(),
            report.no_data_count(),
            report.failure_count()
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_output_path_for() {
        assert_eq!(
            output_path_for(Path::new("in/facture-12.PNG"), Path::new("out")),
            PathBuf::from("out/facture-12.csv")
        );
    }

    #[test]
    fn test_from_config_rejects_bad_threshold() {
        let mut config = FactureConfig::default();
        config.table.y_threshold = -1.0;
        assert!(matches!(
            InvoiceProcessor::from_config(&config),
            Err(crate::error::FactureError::Config(_))
        ));
    }

    #[test]
    fn test_batch_report_counts() {
        let report = BatchReport {
            outcomes: vec![
                Ok(ImageReport {
                    image: PathBuf::from("a.png"),
                    status: ImageStatus::Written {
                        output: PathBuf::from("a.csv"),
                    },
                    record_count: 2,
                    processing_time_ms: 1,
                }),
                Ok(ImageReport {
                    image: PathBuf::from("b.png"),
                    status: ImageStatus::NoData,
                    record_count: 0,
                    processing_time_ms: 1,
                }),
                Err(ImageFailure::new(
                    "c.png",
                    crate::error::OcrError::Engine("boom".to_string()),
                )),
            ],
            stopped_early: false,
            elapsed_ms: 3,
        };

        assert_eq!(report.total(), 3);
        assert_eq!(report.written_count(), 1);
        assert_eq!(report.no_data_count(), 1);
        assert_eq!(report.failure_count(), 1);
    }
}
