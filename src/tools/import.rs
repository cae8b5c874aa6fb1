//! CSV reading import
//!
//! Parses exported reading tables (`type,systolic,diastolic,timestamp` plus an
//! optional `value` column) into `Reading`s. Timestamps are local wall-clock
//! times like `2025-05-17 08:18 AM` and are converted to UTC with the given
//! time zone. Bad rows are skipped and reported, never fatal.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::analytics::recency::{local_date, local_to_utc};
use crate::models::{Reading, VitalType};

/// Local timestamp format of the import file (12-hour clock)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %I:%M %p";

/// At most this many row errors are returned in the response
const MAX_REPORTED_ERRORS: usize = 10;

/// Import error types
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to open file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV header is missing required column '{0}'")]
    MissingColumn(&'static str),
}

/// Result type for import operations
pub type ImportResult<T> = Result<T, ImportError>;

/// Response for a CSV import
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub success: bool,
    pub total_rows: usize,
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
    pub date_range: String,
    pub readings: Vec<Reading>,
}

/// Column positions resolved from the header row
struct Columns {
    vital_type: usize,
    systolic: usize,
    diastolic: usize,
    timestamp: usize,
    value: Option<usize>,
}

impl Columns {
    fn from_header(header: &str) -> ImportResult<Self> {
        let names: Vec<String> = header.split(',').map(|h| clean_cell(h).to_lowercase()).collect();
        let find = |name: &'static str| names.iter().position(|n| n == name);
        let require = |name: &'static str| find(name).ok_or(ImportError::MissingColumn(name));

        Ok(Self {
            vital_type: require("type")?,
            systolic: require("systolic")?,
            diastolic: require("diastolic")?,
            timestamp: require("timestamp")?,
            value: find("value"),
        })
    }

    fn min_fields(&self) -> usize {
        [self.vital_type, self.systolic, self.diastolic, self.timestamp]
            .into_iter()
            .max()
            .unwrap_or(0)
            + 1
    }
}

fn clean_cell(cell: &str) -> &str {
    cell.trim().trim_matches('"').trim()
}

/// Empty cells are absent values
fn parse_optional<T: FromStr>(cell: &str, column: &str) -> Result<Option<T>, String> {
    let cell = clean_cell(cell);
    if cell.is_empty() {
        return Ok(None);
    }
    cell.parse()
        .map(Some)
        .map_err(|_| format!("Invalid {} value: {}", column, cell))
}

/// Parse a local `YYYY-MM-DD hh:mm AM` timestamp in `tz` into UTC
pub fn parse_local_timestamp<Tz: TimeZone>(text: &str, tz: &Tz) -> Result<DateTime<Utc>, String> {
    let text = clean_cell(text);
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
        .map(|local| local_to_utc(tz, local))
        .map_err(|_| format!("Invalid timestamp: {}", text))
}

fn parse_row<Tz: TimeZone>(fields: &[&str], columns: &Columns, tz: &Tz) -> Result<Reading, String> {
    if fields.len() < columns.min_fields() {
        return Err("Not enough fields".to_string());
    }

    let raw_type = clean_cell(fields[columns.vital_type]);
    let vital_type =
        VitalType::from_str(raw_type).ok_or_else(|| format!("Unknown vital type: {}", raw_type))?;
    let timestamp = parse_local_timestamp(fields[columns.timestamp], tz)?;
    let systolic = parse_optional(fields[columns.systolic], "systolic")?;
    let diastolic = parse_optional(fields[columns.diastolic], "diastolic")?;
    let value = match columns.value.and_then(|idx| fields.get(idx)) {
        Some(cell) => parse_optional(cell, "value")?,
        None => None,
    };

    Ok(Reading {
        vital_type,
        timestamp,
        systolic,
        diastolic,
        value,
    })
}

/// Import readings from CSV text
pub fn import_readings_csv<Tz: TimeZone>(text: &str, tz: &Tz) -> ImportResult<ImportResponse> {
    let mut lines = text
        .trim_start_matches('\u{feff}')
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let columns = match lines.next() {
        Some((_, header)) => Columns::from_header(header)?,
        None => return Err(ImportError::MissingColumn("type")),
    };

    let mut readings = Vec::new();
    let mut errors = Vec::new();
    let mut skipped = 0;

    for (line_num, line) in lines {
        let fields: Vec<&str> = line.split(',').collect();
        match parse_row(&fields, &columns, tz) {
            Ok(reading) => readings.push(reading),
            Err(e) => {
                tracing::warn!(row = line_num + 1, "skipping import row: {}", e);
                errors.push(format!("Row {}: {}", line_num + 1, e));
                skipped += 1;
            }
        }
    }

    // Stable, so rows sharing a timestamp keep their file order
    readings.sort_by_key(|r| r.timestamp);

    let imported = readings.len();
    let date_range = match (readings.first(), readings.last()) {
        (Some(first), Some(last)) => format!(
            "{} to {}",
            local_date(first.timestamp, tz),
            local_date(last.timestamp, tz)
        ),
        _ => "N/A".to_string(),
    };

    tracing::info!(imported, skipped, "imported readings from CSV");

    errors.truncate(MAX_REPORTED_ERRORS);
    Ok(ImportResponse {
        success: skipped == 0,
        total_rows: imported + skipped,
        imported,
        skipped,
        errors,
        date_range,
        readings,
    })
}

/// Import readings from a CSV file
pub fn import_readings_file<P, Tz>(path: P, tz: &Tz) -> ImportResult<ImportResponse>
where
    P: AsRef<Path>,
    Tz: TimeZone,
{
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    import_readings_csv(&text, tz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    const SAMPLE: &str = "\
type,systolic,diastolic,timestamp
blood_pressure,150,92,2025-05-17 08:18 AM
blood_pressure,138,85,2025-05-16 07:45 PM
heart_rate,,,2025-05-17 08:19 AM
";

    #[test]
    fn test_import_sorts_and_converts() {
        let response = import_readings_csv(SAMPLE, &Utc).unwrap();
        assert!(response.success);
        assert_eq!(response.total_rows, 3);
        assert_eq!(response.imported, 3);
        assert_eq!(response.date_range, "2025-05-16 to 2025-05-17");

        let first = &response.readings[0];
        assert_eq!(first.timestamp, Utc.with_ymd_and_hms(2025, 5, 16, 19, 45, 0).unwrap());
        assert_eq!(first.pressure(), Some((138, 85)));

        let hr = &response.readings[2];
        assert_eq!(hr.vital_type, VitalType::HeartRate);
        assert_eq!((hr.systolic, hr.diastolic), (None, None));
    }

    #[test]
    fn test_timestamps_interpreted_in_local_zone() {
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let ts = parse_local_timestamp("2025-05-17 08:18 PM", &tz).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2025, 5, 18, 1, 18, 0).unwrap());

        let midnight = parse_local_timestamp("2025-05-17 12:05 am", &Utc).unwrap();
        assert_eq!(midnight, Utc.with_ymd_and_hms(2025, 5, 17, 0, 5, 0).unwrap());
    }

    #[test]
    fn test_bad_rows_are_skipped() {
        let csv = "\
timestamp,type,diastolic,systolic
2025-05-17 08:18 AM,blood_pressure,80,120
not a date,blood_pressure,80,120
2025-05-17 09:00 AM,temperature,80,120
2025-05-17 10:00 AM,blood_pressure,eighty,120
2025-05-17 11:00 AM,blood_pressure
";
        let response = import_readings_csv(csv, &Utc).unwrap();
        assert!(!response.success);
        assert_eq!(response.imported, 1);
        assert_eq!(response.skipped, 4);
        assert_eq!(response.total_rows, 5);
        assert_eq!(response.readings[0].pressure(), Some((120, 80)));
        assert!(response.errors[0].starts_with("Row 3:"));
        assert!(response.errors[1].contains("Unknown vital type"));
        assert!(response.errors[2].contains("diastolic"));
        assert!(response.errors[3].contains("Not enough fields"));
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let err = import_readings_csv("type,systolic,timestamp\n", &Utc).unwrap_err();
        assert!(matches!(err, ImportError::MissingColumn("diastolic")));
        assert!(matches!(
            import_readings_csv("", &Utc),
            Err(ImportError::MissingColumn("type"))
        ));
    }

    #[test]
    fn test_value_column_and_quotes() {
        let csv = "\"type\",\"systolic\",\"diastolic\",\"value\",\"timestamp\"\nheart_rate,,,72,\"2025-05-01 08:00 AM\"\n";
        let response = import_readings_csv(csv, &Utc).unwrap();
        assert_eq!(response.readings[0].value, Some(72.0));
        assert!(!response.readings[0].is_valid_pressure());
    }

    #[test]
    fn test_errors_capped() {
        let mut csv = String::from("type,systolic,diastolic,timestamp\n");
        for _ in 0..15 {
            csv.push_str("blood_pressure,120,80,bogus\n");
        }
        let response = import_readings_csv(&csv, &Utc).unwrap();
        assert_eq!(response.skipped, 15);
        assert_eq!(response.errors.len(), MAX_REPORTED_ERRORS);
        assert_eq!(response.date_range, "N/A");
    }

    #[test]
    fn test_missing_file() {
        let err = import_readings_file("/nonexistent/bpdash/readings.csv", &Utc).unwrap_err();
        assert!(matches!(err, ImportError::Io { .. }));
    }
}
