//! Process command - extract line items from a single invoice image.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use facture_core::output::{records_to_csv_string, CsvSink, CSV_HEADER};
use facture_core::{InvoiceProcessor, InvoiceRecord, RecordSink};

use super::{load_config, preview::render_table, EngineArgs};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input invoice image
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: OutputFormat,

    #[command(flatten)]
    engine: EngineArgs,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// CSV with the French column headers
    Csv,
    /// JSON array of records
    Json,
    /// Aligned text table
    Text,
}

pub fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    args.engine.apply(&mut config);

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let delimiter = config.output.delimiter_byte()?;
    let processor = InvoiceProcessor::from_config(&config)?;
    debug!("Using {} OCR engine", processor.engine_name());

    let result = processor
        .extract(&args.input)
        .map_err(|e| anyhow::anyhow!("Failed to process {}: {}", args.input.display(), e))?;

    if result.records.is_empty() {
        eprintln!(
            "{} No valid data found in {}",
            style("⚠").yellow(),
            args.input.display()
        );
        return Ok(());
    }

    match (&args.output, args.format) {
        (Some(output_path), OutputFormat::Csv) => {
            let mut sink = CsvSink::from_path(output_path, delimiter)?;
            sink.write_records(&result.records)?;
        }
        (Some(output_path), format) => {
            std::fs::write(output_path, format_records(&result.records, format, delimiter)?)?;
        }
        (None, format) => {
            print!("{}", format_records(&result.records, format, delimiter)?);
        }
    }

    if let Some(output_path) = &args.output {
        println!(
            "{} Saved {} records to {}",
            style("✓").green(),
            result.records.len(),
            output_path.display()
        );
    }

    debug!(
        "{} rows, {} rejected, total time {:?}",
        result.row_count,
        result.rejected_row_count,
        start.elapsed()
    );

    Ok(())
}

fn format_records(
    records: &[InvoiceRecord],
    format: OutputFormat,
    delimiter: u8,
) -> anyhow::Result<String> {
    let content = match format {
        OutputFormat::Csv => records_to_csv_string(records, delimiter)?,
        OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(records)?),
        OutputFormat::Text => {
            let headers: Vec<String> = CSV_HEADER.iter().map(|h| h.to_string()).collect();
            let rows: Vec<Vec<String>> = records
                .iter()
                .map(|r| r.fields().iter().map(|f| f.to_string()).collect())
                .collect();
            render_table(&headers, &rows)
        }
    };
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<InvoiceRecord> {
        vec![InvoiceRecord::new("Widget A", "3", "10.00", "30.00")]
    }

    #[test]
    fn test_format_csv() {
        let csv = format_records(&sample(), OutputFormat::Csv, b';').unwrap();
        assert_eq!(
            csv,
            "Designation;Quantité;Prix Unitaire;Montant\nWidget A;3;10.00;30.00\n"
        );
    }

    #[test]
    fn test_format_json() {
        let json = format_records(&sample(), OutputFormat::Json, b',').unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["unit_price"], "10.00");
    }

    #[test]
    fn test_format_text() {
        let text = format_records(&sample(), OutputFormat::Text, b',').unwrap();
        assert!(text.contains("Widget A"));
        assert!(text.lines().next().unwrap().starts_with("Designation"));
    }
}
