//! CSV export of readings

use chrono::SecondsFormat;

use crate::models::Reading;

pub const EXPORT_HEADER: &str = "type,systolic,diastolic,value,timestamp";

fn cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Render readings as CSV, one row per reading, in input order.
///
/// Absent values are empty cells; timestamps are UTC RFC 3339 with milliseconds.
pub fn export_readings_csv<'a, I>(readings: I) -> String
where
    I: IntoIterator<Item = &'a Reading>,
{
    let mut out = String::from(EXPORT_HEADER);
    out.push('\n');
    for reading in readings {
        out.push_str(&format!(
            "{},{},{},{},{}\n",
            reading.vital_type.as_str(),
            cell(reading.systolic),
            cell(reading.diastolic),
            cell(reading.value),
            reading.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
        ));
    }
    out
}
