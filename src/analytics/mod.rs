//! Blood pressure analytics
//!
//! Pure functions over slices of readings: recency filtering, bucketing,
//! aggregation, morning/evening summaries, goal assessment and medication
//! event association. Nothing in here reads the clock or logs; `now` and the
//! display time zone are always arguments.

pub mod aggregation;
pub mod bucketing;
pub mod events;
pub mod goals;
pub mod recency;
pub mod summary;

pub use aggregation::{aggregate, aggregate_buckets, aggregate_view, AggregatedPoint, PressureStats, RawPoint};
pub use bucketing::{bucket_readings, group_readings, Bucket};
pub use events::{associate_events, nearest_reading_index, AnnotatedReading, EventAnnotation};
pub use goals::{assess_goals, assess_trend, percent_in_range, GoalAssessment, RangeStatus, Trend, TrendAssessment};
pub use recency::{filter_recent, readings_today, recency_window, Granularity, RecencyWindow};
pub use summary::{
    filter_by_time_of_day, summarize, summarize_by_time_of_day, DaypartSummary, ReadingSummary, TimeOfDay,
};
