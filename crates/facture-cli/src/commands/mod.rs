//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod preview;
pub mod process;

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use tracing::debug;

use facture_core::models::config::{validate_y_threshold, EngineKind, FactureConfig};

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("facture")
        .join("config.json")
}

/// Load the configuration named by `--config`, else the default file if
/// present, else built-in defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<FactureConfig> {
    if let Some(path) = config_path {
        return FactureConfig::from_file(Path::new(path))
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {}", path, e));
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Loading configuration from {}", default_path.display());
        return FactureConfig::from_file(&default_path).map_err(|e| {
            anyhow::anyhow!("Failed to load config {}: {}", default_path.display(), e)
        });
    }

    Ok(FactureConfig::default())
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum EngineChoice {
    /// Read saved OCR results next to each image
    Sidecar,
    /// Run an external OCR program per image
    Command,
}

impl From<EngineChoice> for EngineKind {
    fn from(choice: EngineChoice) -> Self {
        match choice {
            EngineChoice::Sidecar => EngineKind::Sidecar,
            EngineChoice::Command => EngineKind::Command,
        }
    }
}

/// OCR and grouping overrides shared by `process` and `batch`.
#[derive(Args, Debug, Default)]
pub struct EngineArgs {
    /// OCR engine
    #[arg(long, value_enum)]
    engine: Option<EngineChoice>,

    /// External OCR program (implies --engine command)
    #[arg(long)]
    ocr_command: Option<String>,

    /// Directory holding saved OCR results
    #[arg(long)]
    sidecar_dir: Option<PathBuf>,

    /// Maximum vertical distance (pixels) for boxes to share a row
    #[arg(long, value_parser = parse_y_threshold)]
    y_threshold: Option<f32>,
}

fn parse_y_threshold(value: &str) -> Result<f32, String> {
    let threshold: f32 = value.parse().map_err(|e| format!("{}", e))?;
    validate_y_threshold(threshold).map_err(|e| e.to_string())
}

impl EngineArgs {
    /// Apply command-line overrides on top of loaded configuration.
    pub fn apply(&self, config: &mut FactureConfig) {
        if let Some(command) = &self.ocr_command {
            config.ocr.command = Some(command.clone());
            config.ocr.engine = EngineKind::Command;
        }
        if let Some(engine) = self.engine {
            config.ocr.engine = engine.into();
        }
        if let Some(dir) = &self.sidecar_dir {
            config.ocr.sidecar_dir = Some(dir.clone());
        }
        if let Some(threshold) = self.y_threshold {
            config.table.y_threshold = threshold;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_overrides() {
        let mut config = FactureConfig::default();
        let args = EngineArgs {
            ocr_command: Some("paddleocr".to_string()),
            y_threshold: Some(20.0),
            ..Default::default()
        };
        args.apply(&mut config);

        assert_eq!(config.ocr.engine, EngineKind::Command);
        assert_eq!(config.ocr.command.as_deref(), Some("paddleocr"));
        assert_eq!(config.table.y_threshold, 20.0);
    }

    #[test]
    fn test_y_threshold_parser() {
        assert_eq!(parse_y_threshold("20"), Ok(20.0));
        assert!(parse_y_threshold("NaN").is_err());
        assert!(parse_y_threshold("-3").is_err());
        assert!(parse_y_threshold("inf").is_err());
        assert!(parse_y_threshold("wide").is_err());
    }

    #[test]
    fn test_explicit_engine_wins() {
        let mut config = FactureConfig::default();
        let args = EngineArgs {
            engine: Some(EngineChoice::Sidecar),
            ocr_command: Some("paddleocr".to_string()),
            ..Default::default()
        };
        args.apply(&mut config);

        assert_eq!(config.ocr.engine, EngineKind::Sidecar);
    }
}
