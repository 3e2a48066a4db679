// CSV export of readings
pub mod exporter;

pub use exporter::{export_filename, CsvExporter, CsvRowOrder, ExportError, CSV_MIME, DATE_FORMAT};
