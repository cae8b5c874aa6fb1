//! Bucket aggregation
//!
//! Reduces a bucket to average/min/max systolic and diastolic values. Only
//! readings with both values present count toward the statistics. A bucket with
//! no such reading is still emitted, with `stats: None`, so point counts always
//! add up to the readings in the window.
//!
//! Averages round half away from zero (120.5 -> 121).

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::analytics::bucketing::{bucket_readings, Bucket};
use crate::analytics::events::EventAnnotation;
use crate::analytics::recency::Granularity;
use crate::config::RecencyWindows;
use crate::models::Reading;

/// Blood pressure statistics over the valid readings of one bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PressureStats {
    pub avg_systolic: i32,
    pub min_systolic: i32,
    pub max_systolic: i32,
    pub avg_diastolic: i32,
    pub min_diastolic: i32,
    pub max_diastolic: i32,
}

/// One point of an aggregated chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedPoint {
    pub label: String,
    /// All readings in the bucket, including ones without a BP pair
    pub count: usize,
    /// Readings that contributed to `stats`
    pub valid_count: usize,
    pub stats: Option<PressureStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<EventAnnotation>,
}

impl AggregatedPoint {
    pub fn from_bucket(bucket: &Bucket<'_>) -> Self {
        Self {
            label: bucket.label.clone(),
            count: bucket.count(),
            valid_count: bucket.readings.iter().filter(|r| r.is_valid_pressure()).count(),
            stats: aggregate(bucket.readings.iter().copied()),
            event: None,
        }
    }
}

/// Integer mean rounded half away from zero; `None` for an empty set
pub fn round_average(sum: i64, n: usize) -> Option<i32> {
    if n == 0 {
        return None;
    }
    let n = n as i64;
    let rounded = if sum >= 0 {
        (2 * sum + n) / (2 * n)
    } else {
        -((-2 * sum + n) / (2 * n))
    };
    Some(rounded as i32)
}

#[derive(Default)]
struct Accumulator {
    n: usize,
    sum: i64,
    min: i32,
    max: i32,
}

impl Accumulator {
    fn push(&mut self, value: i32) {
        if self.n == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.n += 1;
        self.sum += i64::from(value);
    }

    fn average(&self) -> Option<i32> {
        round_average(self.sum, self.n)
    }
}

/// Statistics over the readings that have both systolic and diastolic values.
///
/// Returns `None` when there are none, instead of dividing by zero.
pub fn aggregate<'a, I>(readings: I) -> Option<PressureStats>
where
    I: IntoIterator<Item = &'a Reading>,
{
    let mut systolic = Accumulator::default();
    let mut diastolic = Accumulator::default();

    for (s, d) in readings.into_iter().filter_map(Reading::pressure) {
        systolic.push(s);
        diastolic.push(d);
    }

    Some(PressureStats {
        avg_systolic: systolic.average()?,
        min_systolic: systolic.min,
        max_systolic: systolic.max,
        avg_diastolic: diastolic.average()?,
        min_diastolic: diastolic.min,
        max_diastolic: diastolic.max,
    })
}

pub fn aggregate_buckets(buckets: &[Bucket<'_>]) -> Vec<AggregatedPoint> {
    buckets.iter().map(AggregatedPoint::from_bucket).collect()
}

/// Recency-filter, bucket and aggregate in one call
pub fn aggregate_view<'a, I, Tz>(
    readings: I,
    granularity: Granularity,
    windows: &RecencyWindows,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Vec<AggregatedPoint>
where
    I: IntoIterator<Item = &'a Reading>,
    Tz: TimeZone,
{
    aggregate_buckets(&bucket_readings(readings, granularity, windows, now, tz))
}

/// Single reading shown as-is on a chart.
///
/// Missing values are drawn as 0 so the series stays dense; `zero_filled`
/// marks those points so they are never read as measurements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawPoint {
    pub label: String,
    pub timestamp: DateTime<Utc>,
    pub systolic: i32,
    pub diastolic: i32,
    pub zero_filled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<EventAnnotation>,
}

impl RawPoint {
    pub fn from_reading(reading: &Reading, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            timestamp: reading.timestamp,
            systolic: reading.systolic.unwrap_or(0),
            diastolic: reading.diastolic.unwrap_or(0),
            zero_filled: !reading.is_valid_pressure(),
            event: None,
        }
    }

    pub fn with_event(mut self, event: Option<EventAnnotation>) -> Self {
        self.event = event;
        self
    }
}
