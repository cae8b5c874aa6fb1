//! Recency windows
//!
//! Each dashboard view only looks at recent readings: today for the hourly
//! view, and a configurable look-back for the aggregated views. `now` and the
//! display time zone are always passed in; nothing here reads the clock.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::config::RecencyWindows;
use crate::models::{ParseError, Reading};

/// Time granularity of a dashboard view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Hourly,
    Daily,
    Weekly,
    Monthly,
}

impl Granularity {
    pub const ALL: [Granularity; 4] = [
        Granularity::Hourly,
        Granularity::Daily,
        Granularity::Weekly,
        Granularity::Monthly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Hourly => "hourly",
            Granularity::Daily => "daily",
            Granularity::Weekly => "weekly",
            Granularity::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Granularity::ALL
            .into_iter()
            .find(|g| g.as_str() == lower)
            .ok_or_else(|| ParseError::UnknownValue {
                kind: "view",
                value: s.to_string(),
            })
    }
}

/// Inclusive time window; `end` is only bounded for the hourly view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecencyWindow {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

impl RecencyWindow {
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.start && self.end.map_or(true, |end| timestamp <= end)
    }
}

/// Convert a wall-clock time in `tz` to UTC.
///
/// Ambiguous times (DST fall-back) resolve to the earlier instant. Times that
/// do not exist in `tz` (DST spring-forward gap) are taken as UTC wall-clock.
pub(crate) fn local_to_utc<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> DateTime<Utc> {
    tz.from_local_datetime(&local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&local))
}

/// Calendar date of `timestamp` in the display time zone
pub(crate) fn local_date<Tz: TimeZone>(timestamp: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    timestamp.with_timezone(tz).date_naive()
}

/// `now - look_back`; a look-back too long to represent reaches back to the
/// earliest instant, so every reading is included.
fn cutoff(now: DateTime<Utc>, look_back: Option<Duration>) -> DateTime<Utc> {
    look_back
        .and_then(|d| now.checked_sub_signed(d))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Compute the window a view covers at `now`
pub fn recency_window<Tz: TimeZone>(
    granularity: Granularity,
    windows: &RecencyWindows,
    now: DateTime<Utc>,
    tz: &Tz,
) -> RecencyWindow {
    match granularity {
        Granularity::Hourly => {
            let today = local_date(now, tz).and_time(NaiveTime::MIN);
            let end_of_today = today + Duration::days(1) - Duration::nanoseconds(1);
            RecencyWindow {
                start: local_to_utc(tz, today),
                end: Some(local_to_utc(tz, end_of_today)),
            }
        }
        Granularity::Daily => RecencyWindow {
            start: cutoff(now, Duration::try_days(windows.daily_days)),
            end: None,
        },
        Granularity::Weekly => RecencyWindow {
            start: cutoff(now, Duration::try_weeks(windows.weekly_weeks)),
            end: None,
        },
        Granularity::Monthly => {
            // Month arithmetic follows the local calendar (Mar 31 - 1 month = Feb 28/29)
            let start = now
                .with_timezone(tz)
                .checked_sub_months(Months::new(windows.monthly_months))
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or(DateTime::<Utc>::MIN_UTC);
            RecencyWindow { start, end: None }
        }
    }
}

/// Keep only readings inside the view's window, preserving input order
pub fn filter_recent<'a, I, Tz>(
    readings: I,
    granularity: Granularity,
    windows: &RecencyWindows,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Vec<&'a Reading>
where
    I: IntoIterator<Item = &'a Reading>,
    Tz: TimeZone,
{
    let window = recency_window(granularity, windows, now, tz);
    readings
        .into_iter()
        .filter(|r| window.contains(r.timestamp))
        .collect()
}

/// Today's readings, unaggregated (the hourly view)
pub fn readings_today<'a, I, Tz>(readings: I, now: DateTime<Utc>, tz: &Tz) -> Vec<&'a Reading>
where
    I: IntoIterator<Item = &'a Reading>,
    Tz: TimeZone,
{
    filter_recent(readings, Granularity::Hourly, &RecencyWindows::default(), now, tz)
}
