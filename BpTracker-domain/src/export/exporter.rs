use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use csv::Writer;
use thiserror::Error;
use tracing::debug;

use crate::entities::Reading;

/// MIME type of exported files
pub const CSV_MIME: &str = "text/csv";

/// Timestamp format of the `Date` column
pub const DATE_FORMAT: &str = "%Y-%m-%d:%H:%M";

const HEADER: [&str; 2] = ["Date", "Blood Pressure"];

/// Export errors
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV writer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Buffer could not be flushed
    #[error("Failed to flush CSV output: {0}")]
    Flush(String),

    /// Output was not UTF-8
    #[error("CSV output is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// Unknown row order name
    #[error("Unknown CSV row order '{0}': expected asc or desc")]
    UnknownOrder(String),
}

/// Row ordering of exported files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CsvRowOrder {
    /// Most recent first
    #[default]
    Descending,
    /// Keep the order the readings were given in
    Ascending,
}

impl FromStr for CsvRowOrder {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "desc" | "descending" => Ok(CsvRowOrder::Descending),
            "asc" | "ascending" => Ok(CsvRowOrder::Ascending),
            other => Err(ExportError::UnknownOrder(other.to_string())),
        }
    }
}

/// Turns readings into a two column CSV document
#[derive(Debug, Clone, Copy)]
pub struct CsvExporter {
    order: CsvRowOrder,
    offset: FixedOffset,
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self {
            order: CsvRowOrder::default(),
            offset: utc_offset(),
        }
    }
}

impl CsvExporter {
    pub fn new(order: CsvRowOrder, offset: FixedOffset) -> Self {
        Self { order, offset }
    }

    pub fn with_order(mut self, order: CsvRowOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    pub fn order(&self) -> CsvRowOrder {
        self.order
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Format a timestamp the way the `Date` column does
    pub fn format_date(&self, at: &DateTime<Utc>) -> String {
        at.with_timezone(&self.offset).format(DATE_FORMAT).to_string()
    }

    /// Render readings as CSV text. The header is always written, so no
    /// readings yields a header-only document.
    pub fn to_csv(&self, readings: &[Reading]) -> Result<String, ExportError> {
        let mut rows: Vec<(String, String)> = readings
            .iter()
            .map(|r| (self.format_date(&r.recorded_at), format!("{}/{}", r.systolic, r.diastolic)))
            .collect();

        if self.order == CsvRowOrder::Descending {
            rows.sort_by(|a, b| b.0.cmp(&a.0));
        }

        let mut writer = Writer::from_writer(vec![]);
        writer.write_record(HEADER)?;
        for (date, pressure) in &rows {
            writer.write_record([date, pressure])?;
        }

        let bytes = writer.into_inner().map_err(|e| ExportError::Flush(e.to_string()))?;
        debug!("Exported {} readings to CSV ({} bytes)", rows.len(), bytes.len());

        Ok(String::from_utf8(bytes)?)
    }
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}

/// File name for a download made on `today`, e.g. `jane-doe-bp-readings-2024-01-31.csv`
pub fn export_filename(owner: &str, today: NaiveDate) -> String {
    let slug = owner
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() {
        format!("bp-readings-{}.csv", today.format("%Y-%m-%d"))
    } else {
        format!("{}-bp-readings-{}.csv", slug, today.format("%Y-%m-%d"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reading(id: i64, systolic: i32, diastolic: i32, at: DateTime<Utc>) -> Reading {
        Reading { id, systolic, diastolic, recorded_at: at }
    }

    #[test]
    fn test_empty_export_is_header_only() {
        let csv = CsvExporter::default().to_csv(&[]).unwrap();
        assert_eq!(csv, "Date,Blood Pressure\n");
    }

    #[test]
    fn test_single_reading_row() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 8, 30, 0).unwrap();
        let csv = CsvExporter::default().to_csv(&[reading(42, 120, 80, at)]).unwrap();

        assert_eq!(csv, "Date,Blood Pressure\n2024-01-01:08:30,120/80\n");
        assert!(!csv.contains("42"));
    }

    #[test]
    fn test_rows_are_most_recent_first_by_default() {
        let readings = vec![
            reading(1, 110, 70, Utc.with_ymd_and_hms(2024, 1, 1, 7, 0, 0).unwrap()),
            reading(2, 120, 80, Utc.with_ymd_and_hms(2024, 1, 3, 7, 0, 0).unwrap()),
            reading(3, 130, 85, Utc.with_ymd_and_hms(2024, 1, 2, 7, 0, 0).unwrap()),
        ];

        let csv = CsvExporter::default().to_csv(&readings).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Date,Blood Pressure",
                "2024-01-03:07:00,120/80",
                "2024-01-02:07:00,130/85",
                "2024-01-01:07:00,110/70",
            ]
        );

        let ascending = CsvExporter::default()
            .with_order(CsvRowOrder::Ascending)
            .to_csv(&readings)
            .unwrap();
        assert_eq!(ascending.lines().nth(1), Some("2024-01-01:07:00,110/70"));
    }

    #[test]
    fn test_dates_use_configured_offset() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 23, 15, 0).unwrap();
        let exporter = CsvExporter::default().with_offset(FixedOffset::east_opt(2 * 3600).unwrap());

        assert_eq!(exporter.format_date(&at), "2024-01-02:01:15");
    }

    #[test]
    fn test_row_order_parsing() {
        assert_eq!("asc".parse::<CsvRowOrder>().unwrap(), CsvRowOrder::Ascending);
        assert_eq!("Descending".parse::<CsvRowOrder>().unwrap(), CsvRowOrder::Descending);
        assert!("newest".parse::<CsvRowOrder>().is_err());
    }

    #[test]
    fn test_export_filename() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(export_filename("Jane Doe", today), "jane-doe-bp-readings-2024-01-31.csv");
        assert_eq!(export_filename("", today), "bp-readings-2024-01-31.csv");
    }
}
