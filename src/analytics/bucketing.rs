//! Time bucketing
//!
//! Groups readings by calendar day, Monday-start week or calendar month in the
//! display time zone. Buckets come out in the order their key is first seen
//! while scanning the input, so sorted input gives chronological buckets.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use indexmap::IndexMap;

use crate::analytics::recency::{filter_recent, local_date, Granularity};
use crate::config::RecencyWindows;
use crate::models::Reading;

/// A group of readings sharing a time key
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket<'a> {
    /// Stable grouping key (`YYYY-MM-DD`, week-start `YYYY-MM-DD`, or `YYYY-MM`)
    pub key: String,
    /// Display label ("Jan 5", "Jan 5–11", "Jan 2025")
    pub label: String,
    pub readings: Vec<&'a Reading>,
}

impl Bucket<'_> {
    pub fn count(&self) -> usize {
        self.readings.len()
    }
}

fn day_label(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// Monday on or before `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// "Jan 5–11"; a week crossing a month boundary reads "Jan 27–2"
pub fn week_label(start: NaiveDate) -> String {
    let end = start + Duration::days(6);
    format!("{}–{}", day_label(start), end.format("%-d"))
}

/// "Jan 2025" from a `YYYY-MM` key; unparseable keys label themselves
pub fn month_label(key: &str) -> String {
    NaiveDate::parse_from_str(&format!("{}-01", key), "%Y-%m-%d")
        .map(|first| first.format("%b %Y").to_string())
        .unwrap_or_else(|_| key.to_string())
}

/// Grouping key and display label for a timestamp.
///
/// Hourly keys are the full local timestamp labeled with the clock time, so the
/// hourly view stays one reading per point.
pub fn bucket_key<Tz: TimeZone>(
    timestamp: DateTime<Utc>,
    granularity: Granularity,
    tz: &Tz,
) -> (String, String) {
    let date = local_date(timestamp, tz);
    match granularity {
        Granularity::Hourly => {
            let local = timestamp.with_timezone(tz).naive_local();
            (
                local.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
                local.format("%-I:%M %p").to_string(),
            )
        }
        Granularity::Daily => (date.format("%Y-%m-%d").to_string(), day_label(date)),
        Granularity::Weekly => {
            let start = week_start(date);
            (start.format("%Y-%m-%d").to_string(), week_label(start))
        }
        Granularity::Monthly => {
            let key = date.format("%Y-%m").to_string();
            let label = month_label(&key);
            (key, label)
        }
    }
}

/// Group readings without any recency filtering.
///
/// In the hourly granularity every reading is its own bucket, even when two
/// readings share a timestamp.
pub fn group_readings<'a, I, Tz>(readings: I, granularity: Granularity, tz: &Tz) -> Vec<Bucket<'a>>
where
    I: IntoIterator<Item = &'a Reading>,
    Tz: TimeZone,
{
    if granularity == Granularity::Hourly {
        return readings
            .into_iter()
            .map(|reading| {
                let (key, label) = bucket_key(reading.timestamp, granularity, tz);
                Bucket {
                    key,
                    label,
                    readings: vec![reading],
                }
            })
            .collect();
    }

    let mut groups: IndexMap<String, Bucket<'a>> = IndexMap::new();
    for reading in readings {
        let (key, label) = bucket_key(reading.timestamp, granularity, tz);
        groups
            .entry(key.clone())
            .or_insert_with(|| Bucket {
                key,
                label,
                readings: Vec::new(),
            })
            .readings
            .push(reading);
    }
    groups.into_values().collect()
}

/// Recency-filter then group, as each dashboard view does
pub fn bucket_readings<'a, I, Tz>(
    readings: I,
    granularity: Granularity,
    windows: &RecencyWindows,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Vec<Bucket<'a>>
where
    I: IntoIterator<Item = &'a Reading>,
    Tz: TimeZone,
{
    let recent = filter_recent(readings, granularity, windows, now, tz);
    group_readings(recent, granularity, tz)
}
