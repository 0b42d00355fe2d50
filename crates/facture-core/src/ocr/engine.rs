//! OCR engine seam.
//!
//! Recognition runs outside this crate. An engine turns an image path into
//! an [`OcrOutput`]; one engine instance is created per run and reused for
//! every image.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::{EngineKind, OcrConfig};

use super::OcrOutput;

/// Source of raw OCR results for an image.
pub trait OcrEngine: Send + Sync {
    /// Short engine name for logs and reports.
    fn name(&self) -> &str;

    /// Recognize text in the image at `image`.
    fn recognize(&self, image: &Path) -> Result<OcrOutput, OcrError>;
}

/// Reads OCR results that were saved alongside the images.
///
/// For `scans/invoice-01.png` with the default suffix the result is read
/// from `scans/invoice-01_res.json` (or from the configured directory).
#[derive(Debug, Clone)]
pub struct SidecarEngine {
    dir: Option<PathBuf>,
    suffix: String,
}

impl SidecarEngine {
    pub fn new(dir: Option<PathBuf>, suffix: impl Into<String>) -> Self {
        Self {
            dir,
            suffix: suffix.into(),
        }
    }

    /// Path of the saved OCR result for an image.
    pub fn sidecar_path(&self, image: &Path) -> PathBuf {
        let stem = image
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dir = self
            .dir
            .clone()
            .or_else(|| image.parent().map(Path::to_path_buf))
            .unwrap_or_default();
        dir.join(format!("{}{}", stem, self.suffix))
    }
}

impl OcrEngine for SidecarEngine {
    fn name(&self) -> &str {
        "sidecar"
    }

    fn recognize(&self, image: &Path) -> Result<OcrOutput, OcrError> {
        let path = self.sidecar_path(image);
        debug!("Reading saved OCR result from {}", path.display());
        OcrOutput::from_json_file(&path)
    }
}

/// Runs an external OCR program once per image and parses its stdout.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: String,
    args: Vec<String>,
    lang: String,
}

impl CommandEngine {
    pub fn new(program: impl Into<String>, args: Vec<String>, lang: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args,
            lang: lang.into(),
        }
    }

    /// Arguments for one invocation, placeholders substituted.
    pub fn build_args(&self, image: &Path) -> Vec<String> {
        let image_arg = image.to_string_lossy();
        let mut has_image = false;

        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|arg| {
                if arg.contains("{image}") {
                    has_image = true;
                }
                arg.replace("{image}", &image_arg).replace("{lang}", &self.lang)
            })
            .collect();

        if !has_image {
            args.push(image_arg.into_owned());
        }

        args
    }
}

impl OcrEngine for CommandEngine {
    fn name(&self) -> &str {
        &self.program
    }

    fn recognize(&self, image: &Path) -> Result<OcrOutput, OcrError> {
        let args = self.build_args(image);
        debug!("Running {} {:?}", self.program, args);

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|e| OcrError::Engine(format!("failed to start {}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Engine(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        OcrOutput::from_json_str(&stdout)
    }
}

/// Create the engine selected by the configuration.
pub fn create_engine(config: &OcrConfig) -> Result<Box<dyn OcrEngine>, OcrError> {
    match config.engine {
        EngineKind::Sidecar => {
            info!("Using saved OCR results (suffix {:?})", config.sidecar_suffix);
            Ok(Box::new(SidecarEngine::new(
                config.sidecar_dir.clone(),
                config.sidecar_suffix.clone(),
            )))
        }
        EngineKind::Command => {
            let program = config
                .command
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .ok_or_else(|| {
                    OcrError::NotConfigured("command engine needs ocr.command".to_string())
                })?;
            info!("Using external OCR command {}", program);
            Ok(Box::new(CommandEngine::new(
                program,
                config.args.clone(),
                config.lang.clone(),
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sidecar_path_next_to_image() {
        let engine = SidecarEngine::new(None, "_res.json");
        assert_eq!(
            engine.sidecar_path(Path::new("scans/invoice-01.png")),
            PathBuf::from("scans/invoice-01_res.json")
        );
    }

    #[test]
    fn test_sidecar_path_in_configured_dir() {
        let engine = SidecarEngine::new(Some(PathBuf::from("ocr")), ".json");
        assert_eq!(
            engine.sidecar_path(Path::new("scans/invoice-01.png")),
            PathBuf::from("ocr/invoice-01.json")
        );
    }

    #[test]
    fn test_sidecar_missing_output() {
        let dir = tempfile::tempdir().unwrap();
        let engine = SidecarEngine::new(None, "_res.json");
        let err = engine.recognize(&dir.path().join("none.png")).unwrap_err();
        assert!(matches!(err, OcrError::MissingOutput { .. }));
    }

    #[test]
    fn test_sidecar_reads_saved_result() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("scan_res.json"),
            r#"{"res": {"rec_texts": ["Widget"], "rec_boxes": [[0, 0, 10, 10]]}}"#,
        )
        .unwrap();

        let engine = SidecarEngine::new(None, "_res.json");
        let output = engine.recognize(&dir.path().join("scan.png")).unwrap();
        assert_eq!(output.text_boxes().len(), 1);
    }

    #[test]
    fn test_command_args_substitution() {
        let engine = CommandEngine::new(
            "paddle-json",
            vec!["--lang".to_string(), "{lang}".to_string(), "--input={image}".to_string()],
            "fr",
        );
        assert_eq!(
            engine.build_args(Path::new("a.png")),
            vec!["--lang", "fr", "--input=a.png"]
        );
    }

    #[test]
    fn test_command_args_append_image() {
        let engine = CommandEngine::new("ocr", vec!["--json".to_string()], "fr");
        assert_eq!(engine.build_args(Path::new("a.png")), vec!["--json", "a.png"]);
    }

    #[test]
    fn test_command_engine_requires_program() {
        let config = OcrConfig {
            engine: EngineKind::Command,
            command: Some("  ".to_string()),
            ..OcrConfig::default()
        };
        assert!(matches!(
            create_engine(&config),
            Err(OcrError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_command_engine_start_failure() {
        let engine = CommandEngine::new("facture-no-such-ocr-program", Vec::new(), "fr");
        let err = engine.recognize(Path::new("a.png")).unwrap_err();
        assert!(matches!(err, OcrError::Engine(_)));
    }
}
