//! Batch processing command for directories and glob patterns.

use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use facture_core::models::config::InputConfig;
use facture_core::{BatchReport, ImageStatus, InvoiceProcessor};

use super::{load_config, EngineArgs};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input directory or glob pattern (default: configured input directory)
    input: Option<String>,

    /// Output directory (default: configured output directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Stop at the first image that fails
    #[arg(long)]
    fail_fast: bool,

    #[command(flatten)]
    engine: EngineArgs,
}

pub fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    args.engine.apply(&mut config);

    let processor = InvoiceProcessor::from_config(&config)?;
    debug!("Using {} OCR engine", processor.engine_name());

    let input = args
        .input
        .clone()
        .unwrap_or_else(|| config.input.input_dir.to_string_lossy().into_owned());
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| config.output.output_dir.clone());

    let files = collect_images(&processor, &config.input, &input)?;
    if files.is_empty() {
        anyhow::bail!("No matching images found for: {}", input);
    }

    println!(
        "{} Found {} images to process",
        style("ℹ").blue(),
        files.len()
    );

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} images")?
            .progress_chars("=>-"),
    );

    let report = processor.process_files_with(&files, &output_dir, |done, outcome| {
        pb.set_position(done as u64);
        if args.fail_fast && outcome.is_err() {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    })?;

    pb.finish_and_clear();

    if args.summary {
        let summary_path = output_dir.join("summary.csv");
        write_summary(&summary_path, &report)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    print_report(&report);

    if args.fail_fast && report.failure_count() > 0 {
        anyhow::bail!(
            "Stopped after a failure; {} of {} images processed",
            report.total(),
            files.len()
        );
    }

    Ok(())
}

/// Resolve the input argument to a sorted list of supported images.
fn collect_images(
    processor: &InvoiceProcessor,
    input_config: &InputConfig,
    input: &str,
) -> anyhow::Result<Vec<PathBuf>> {
    let path = Path::new(input);
    if path.is_dir() {
        return Ok(processor.discover_images(path)?);
    }

    let mut files: Vec<PathBuf> = glob(input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file() && input_config.is_supported_image(p))
        .collect();
    files.sort();
    Ok(files)
}

fn print_report(report: &BatchReport) {
    println!();
    println!(
        "{} Processed {} images in {}ms",
        style("✓").green(),
        report.total(),
        report.elapsed_ms
    );
    println!(
        "   {} written, {} without data, {} failed",
        style(report.written_count()).green(),
        style(report.no_data_count()).yellow(),
        style(report.failure_count()).red()
    );

    if report.failure_count() > 0 {
        println!();
        println!("{}", style("Failed images:").red());
        for failure in report.failures() {
            println!("  - {}: {}", failure.path.display(), failure.source);
        }
    }
}

fn write_summary(path: &Path, report: &BatchReport) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "records",
        "output",
        "processing_time_ms",
        "error",
    ])?;

    for outcome in &report.outcomes {
        match outcome {
            Ok(image) => {
                let (status, output) = match &image.status {
                    ImageStatus::Written { output } => {
                        ("written", output.display().to_string())
                    }
                    ImageStatus::NoData => ("no_data", String::new()),
                };
                wtr.write_record([
                    file_name(&image.image),
                    status,
                    &image.record_count.to_string(),
                    &output,
                    &image.processing_time_ms.to_string(),
                    "",
                ])?;
            }
            Err(failure) => {
                wtr.write_record([
                    file_name(&failure.path),
                    "error",
                    "0",
                    "",
                    "",
                    &failure.source.to_string(),
                ])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|s| s.to_str()).unwrap_or("")
}
