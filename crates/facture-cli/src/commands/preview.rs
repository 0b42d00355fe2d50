//! Preview command - display extracted CSV files as tables.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use console::style;

use facture_core::output::read_csv_table;

use super::load_config;

/// Arguments for the preview command.
#[derive(Args)]
pub struct PreviewArgs {
    /// CSV file or directory of CSV files (default: configured output directory)
    path: Option<PathBuf>,
}

pub fn run(args: PreviewArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let delimiter = config.output.delimiter_byte()?;
    let path = args.path.unwrap_or_else(|| config.output.output_dir.clone());

    let files = if path.is_dir() {
        csv_files_in(&path)?
    } else if path.is_file() {
        vec![path.clone()]
    } else {
        anyhow::bail!("Path not found: {}", path.display());
    };

    if files.is_empty() {
        println!(
            "{} No CSV files found in {}",
            style("ℹ").blue(),
            path.display()
        );
        return Ok(());
    }

    for (i, file) in files.iter().enumerate() {
        let table = read_csv_table(file, delimiter)?;
        if i > 0 {
            println!();
        }
        println!(
            "{} ({} rows)",
            style(file.display()).bold(),
            table.rows.len()
        );
        print!("{}", render_table(&table.headers, &table.rows));
    }

    Ok(())
}

fn csv_files_in(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        if path.is_file() && is_csv {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Render rows under a header with columns padded to a common width.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let columns = rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(headers.len()))
        .max()
        .unwrap_or(0);

    let mut widths = vec![0; columns];
    for line in std::iter::once(headers).chain(rows.iter().map(Vec::as_slice)) {
        for (i, cell) in line.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut output = String::new();
    push_line(&mut output, headers, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut output, &rule, &widths);
    for row in rows {
        push_line(&mut output, row, &widths);
    }
    output
}

fn push_line(output: &mut String, cells: &[String], widths: &[usize]) {
    let padded: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(i, width)| {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            let pad = width - cell.chars().count();
            format!("{}{}", cell, " ".repeat(pad))
        })
        .collect();
    output.push_str(padded.join(" | ").trim_end());
    output.push('\n');
}
