//! Record sinks.

mod csv_out;

pub use csv_out::{read_csv_table, records_to_csv_string, CsvSink, CsvTable, CSV_HEADER};

use crate::error::Result;
use crate::models::record::InvoiceRecord;

/// Destination for the records extracted from one image.
pub trait RecordSink {
    /// Write all records, in order.
    fn write_records(&mut self, records: &[InvoiceRecord]) -> Result<()>;
}
