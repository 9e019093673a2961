//! Load OHLCV bars from CSV files

use crate::error::{ChartError, Result};
use crate::series::Series;
use crate::types::{PricePoint, Timestamp};
use chrono::{DateTime, NaiveDate, Utc};
use csv::ReaderBuilder;
use std::io::Read;
use std::path::Path;

/// CSV column layout
#[derive(Debug, Clone)]
pub struct CsvFormat {
    pub date_column: String,
    pub open_column: String,
    pub high_column: String,
    pub low_column: String,
    pub close_column: String,
    pub volume_column: String,
    /// Format of date-only values; RFC 3339 timestamps are always accepted
    pub date_format: String,
}

impl Default for CsvFormat {
    fn default() -> Self {
        Self {
            date_column: "date".to_string(),
            open_column: "open".to_string(),
            high_column: "high".to_string(),
            low_column: "low".to_string(),
            close_column: "close".to_string(),
            volume_column: "volume".to_string(),
            date_format: "%Y-%m-%d".to_string(),
        }
    }
}

/// Reads one ticker's bars from CSV into a normalized series
#[derive(Debug, Clone, Default)]
pub struct CsvBarReader {
    format: CsvFormat,
}

impl CsvBarReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(format: CsvFormat) -> Self {
        Self { format }
    }

    /// Load a CSV file
    pub fn load_path(&self, path: &Path) -> Result<Series> {
        let file = std::fs::File::open(path)?;
        log::info!("Loading bars from {}", path.display());
        self.load_reader(file)
    }

    /// Load CSV from any reader
    pub fn load_reader<R: Read>(&self, reader: R) -> Result<Series> {
        let mut rdr = ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let headers = rdr.headers()?.clone();

        let date_idx = Self::find_column(&headers, &self.format.date_column)?;
        let open_idx = Self::find_column(&headers, &self.format.open_column)?;
        let high_idx = Self::find_column(&headers, &self.format.high_column)?;
        let low_idx = Self::find_column(&headers, &self.format.low_column)?;
        let close_idx = Self::find_column(&headers, &self.format.close_column)?;
        let volume_idx = Self::find_column(&headers, &self.format.volume_column)?;

        let mut points = Vec::new();
        for (line, result) in rdr.records().enumerate() {
            let record = result?;
            let field = |idx: usize, name: &str| -> Result<f64> {
                let raw = record.get(idx).ok_or_else(|| {
                    ChartError::DataError(format!("Missing {} on row {}", name, line + 1))
                })?;
                raw.parse().map_err(|_| {
                    ChartError::DataError(format!("Invalid {} '{}' on row {}", name, raw, line + 1))
                })
            };

            let date_str = record.get(date_idx).ok_or_else(|| {
                ChartError::DataError(format!("Missing date on row {}", line + 1))
            })?;

            points.push(PricePoint::new(
                self.parse_timestamp(date_str)?,
                field(open_idx, "open")?,
                field(high_idx, "high")?,
                field(low_idx, "low")?,
                field(close_idx, "close")?,
                field(volume_idx, "volume")?,
            ));
        }

        log::debug!("Read {} bars", points.len());
        Series::normalize(points)
    }

    fn parse_timestamp(&self, value: &str) -> Result<Timestamp> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
            return Ok(ts.with_timezone(&Utc));
        }

        let date = NaiveDate::parse_from_str(value, &self.format.date_format)
            .map_err(|_| ChartError::DataError(format!("Invalid date format: {}", value)))?;
        date.and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc())
            .ok_or_else(|| ChartError::DataError("Invalid time".to_string()))
    }

    /// Find column index by name
    fn find_column(headers: &csv::StringRecord, name: &str) -> Result<usize> {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| ChartError::DataError(format!("Column '{}' not found", name)))
    }
}

/// Load a CSV file with the default column layout
pub fn load_csv(path: &Path) -> Result<Series> {
    CsvBarReader::new().load_path(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;

    #[test]
    fn test_load_reader_sorts_and_parses() {
        let data = "Date,Open,High,Low,Close,Volume\n\
                    2024-01-03,11,12,10,11.5,300\n\
                    2024-01-02,10,11,9,10.5,200\n";
        let series = CsvBarReader::new().load_reader(data.as_bytes()).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].close, 10.5);
        assert_eq!(
            series[0].timestamp,
            Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()
        );
        assert_eq!(series[1].volume, 300.0);
    }

    #[test]
    fn test_rfc3339_timestamps() {
        let data = "date,open,high,low,close,volume\n2024-01-02T14:30:00Z,1,2,0.5,1.5,10\n";
        let series = CsvBarReader::new().load_reader(data.as_bytes()).unwrap();
        assert_eq!(
            series[0].timestamp,
            Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_missing_column_and_bad_value() {
        let missing = "date,open,high,low,close\n2024-01-02,1,2,0.5,1.5\n";
        assert!(matches!(
            CsvBarReader::new().load_reader(missing.as_bytes()),
            Err(ChartError::DataError(_))
        ));

        let bad = "date,open,high,low,close,volume\n2024-01-02,1,2,x,1.5,10\n";
        assert!(CsvBarReader::new().load_reader(bad.as_bytes()).is_err());
    }

    #[test]
    fn test_header_only_is_empty_series() {
        let data = "date,open,high,low,close,volume\n";
        assert!(matches!(
            CsvBarReader::new().load_reader(data.as_bytes()),
            Err(ChartError::EmptySeries)
        ));
    }

    #[test]
    fn test_load_csv_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "date,open,high,low,close,volume").unwrap();
        writeln!(file, "2024-01-02,1,2,0.5,1.5,10").unwrap();

        let series = load_csv(file.path()).unwrap();
        assert_eq!(series.len(), 1);
    }
}
