//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default maximum vertical distance (pixels) from a row's opening box.
pub const DEFAULT_Y_THRESHOLD: f32 = 15.0;

/// Default designation prefixes that mark header/footer/metadata text.
pub const DEFAULT_DENIED_PREFIXES: [&str; 7] = ["N°", "Tel", "R.", "C.", "Sous", "Total", "TVA"];

/// Main configuration for the facture pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FactureConfig {
    /// OCR collaborator configuration.
    pub ocr: OcrConfig,

    /// Row reconstruction configuration.
    pub table: TableConfig,

    /// Line-item extraction configuration.
    pub extraction: ExtractionConfig,

    /// Input discovery configuration.
    pub input: InputConfig,

    /// Output configuration.
    pub output: OutputConfig,
}

/// Which OCR collaborator produces the raw results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    /// Read OCR results saved next to (or alongside) each image.
    #[default]
    Sidecar,
    /// Run an external OCR program per image and read its stdout.
    Command,
}

/// OCR collaborator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Engine to use.
    pub engine: EngineKind,

    /// Recognition language passed to external engines.
    pub lang: String,

    /// External OCR program (command engine only).
    pub command: Option<String>,

    /// Argument template for the external program.
    ///
    /// `{image}` and `{lang}` are substituted; the image path is appended
    /// when no `{image}` placeholder is present.
    pub args: Vec<String>,

    /// Directory holding saved OCR results (sidecar engine only).
    /// Defaults to the image's own directory.
    pub sidecar_dir: Option<PathBuf>,

    /// Suffix appended to the image stem to find its saved OCR result.
    pub sidecar_suffix: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::Sidecar,
            lang: "fr".to_string(),
            command: None,
            args: Vec::new(),
            sidecar_dir: None,
            sidecar_suffix: "_res.json".to_string(),
        }
    }
}

/// Row reconstruction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Maximum vertical pixel distance from a row's opening box.
    pub y_threshold: f32,
}

impl TableConfig {
    /// Check that the row threshold is usable.
    pub fn validate(&self) -> Result<(), crate::FactureError> {
        validate_y_threshold(self.y_threshold).map(|_| ())
    }
}

/// Accept a row threshold only if it is a finite, non-negative distance.
pub fn validate_y_threshold(value: f32) -> Result<f32, crate::FactureError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(crate::FactureError::Config(format!(
            "y_threshold must be a finite non-negative number, got {}",
            value
        )))
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            y_threshold: DEFAULT_Y_THRESHOLD,
        }
    }
}

/// Line-item extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Prefixes that disqualify a token from being designation text.
    pub denied_prefixes: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            denied_prefixes: DEFAULT_DENIED_PREFIXES.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Input discovery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Image file extensions (without dot, matched case-insensitively).
    pub image_extensions: Vec<String>,

    /// Default input directory for batch runs.
    pub input_dir: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            image_extensions: ["png", "jpg", "jpeg", "tiff", "bmp"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
            input_dir: PathBuf::from("input_invoices"),
        }
    }
}

impl InputConfig {
    /// Check whether a path has one of the configured image extensions.
    pub fn is_supported_image(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.image_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext))
    }
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output directory for batch runs.
    pub output_dir: PathBuf,

    /// Field delimiter for emitted CSV files.
    pub delimiter: char,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("processed_invoices"),
            delimiter: ',',
        }
    }
}

impl OutputConfig {
    /// Delimiter as a single byte, as the CSV writer requires.
    pub fn delimiter_byte(&self) -> Result<u8, crate::FactureError> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                crate::FactureError::Config(format!(
                    "CSV delimiter must be a single ASCII character, got {:?}",
                    self.delimiter
                ))
            })
    }
}

impl FactureConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
