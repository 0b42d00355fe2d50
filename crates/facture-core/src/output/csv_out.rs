//! CSV output of invoice records.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};

use crate::error::{FactureError, Result};
use crate::models::record::InvoiceRecord;

use super::RecordSink;

/// Header row of emitted CSV files.
pub const CSV_HEADER: [&str; 4] = ["Designation", "Quantité", "Prix Unitaire", "Montant"];

/// Writes records as a header row followed by one row per record.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvSink<File> {
    /// Create (or truncate) a CSV file.
    pub fn from_path(path: &Path, delimiter: u8) -> Result<Self> {
        let writer = WriterBuilder::new().delimiter(delimiter).from_path(path)?;
        Ok(Self { writer })
    }
}

impl<W: Write> CsvSink<W> {
    pub fn from_writer(writer: W, delimiter: u8) -> Self {
        Self {
            writer: WriterBuilder::new().delimiter(delimiter).from_writer(writer),
        }
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|error| FactureError::Csv(error.into_error().into()))
    }
}

impl<W: Write> RecordSink for CsvSink<W> {
    fn write_records(&mut self, records: &[InvoiceRecord]) -> Result<()> {
        self.writer.write_record(CSV_HEADER)?;
        for record in records {
            self.writer.write_record(record.fields())?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// Render records as a CSV document.
pub fn records_to_csv_string(records: &[InvoiceRecord], delimiter: u8) -> Result<String> {
    let mut sink = CsvSink::from_writer(Vec::<u8>::new(), delimiter);
    sink.write_records(records)?;
    let bytes = sink.into_inner()?;
    String::from_utf8(bytes).map_err(|error| {
        FactureError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("invalid utf-8 csv output: {error}"),
        ))
    })
}

/// A CSV file read back for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Read an emitted CSV file (header plus rows).
pub fn read_csv_table(path: &Path, delimiter: u8) -> Result<CsvTable> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)?;

    let headers = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }

    Ok(CsvTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_header_and_rows() {
        let records = vec![
            InvoiceRecord::new("Widget A", "", "10.00", "25.50"),
            InvoiceRecord::new("Widget B", "3", "5.00", "15.00"),
        ];

        let csv = records_to_csv_string(&records, b',').unwrap();
        assert_eq!(
            csv,
            "Designation,Quantité,Prix Unitaire,Montant\n\
             Widget A,,10.00,25.50\n\
             Widget B,3,5.00,15.00\n"
        );
    }

    #[test]
    fn test_quotes_embedded_delimiters() {
        let records = vec![InvoiceRecord::new("Vis, écrous \"M6\"", "2", "1.00", "2.00")];
        let csv = records_to_csv_string(&records, b',').unwrap();
        assert!(csv.contains("\"Vis, écrous \"\"M6\"\"\",2,1.00,2.00"));
    }

    #[test]
    fn test_empty_records_write_header_only() {
        let csv = records_to_csv_string(&[], b';').unwrap();
        assert_eq!(csv, "Designation;Quantité;Prix Unitaire;Montant\n");
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let records = vec![InvoiceRecord::new("Câble; 5m, gris", "", "3.00", "3.00")];

        let mut sink = CsvSink::from_path(&path, b',').unwrap();
        sink.write_records(&records).unwrap();
        drop(sink);

        let table = read_csv_table(&path, b',').unwrap();
        assert_eq!(table.headers, CSV_HEADER.to_vec());
        assert_eq!(table.rows, vec![records[0].fields().to_vec()]);
    }
}
