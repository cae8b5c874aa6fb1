//! Morning / evening summaries
//!
//! Splits readings by the local hour they were taken and summarizes each part:
//! average pressure and the extreme readings.

use std::fmt;
use std::str::FromStr;

use chrono::{TimeZone, Timelike};
use serde::{Deserialize, Serialize};

use crate::analytics::aggregation::round_average;
use crate::models::{ParseError, Reading};

/// Local hour at which "evening" starts
pub const EVENING_START_HOUR: u32 = 12;

/// Time-of-day filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    #[default]
    All,
    Morning,
    Evening,
}

impl TimeOfDay {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::All => "all",
            TimeOfDay::Morning => "morning",
            TimeOfDay::Evening => "evening",
        }
    }

    pub fn matches_hour(&self, local_hour: u32) -> bool {
        match self {
            TimeOfDay::All => true,
            TimeOfDay::Morning => local_hour < EVENING_START_HOUR,
            TimeOfDay::Evening => local_hour >= EVENING_START_HOUR,
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeOfDay {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(TimeOfDay::All),
            "morning" | "am" => Ok(TimeOfDay::Morning),
            "evening" | "pm" => Ok(TimeOfDay::Evening),
            _ => Err(ParseError::UnknownValue {
                kind: "time of day",
                value: s.to_string(),
            }),
        }
    }
}

/// Readings taken in the given part of the day, by each reading's own local hour
pub fn filter_by_time_of_day<'a, I, Tz>(readings: I, filter: TimeOfDay, tz: &Tz) -> Vec<&'a Reading>
where
    I: IntoIterator<Item = &'a Reading>,
    Tz: TimeZone,
{
    readings
        .into_iter()
        .filter(|r| filter.matches_hour(r.timestamp.with_timezone(tz).hour()))
        .collect()
}

/// Averages and extremes over a set of readings
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReadingSummary {
    pub count: usize,
    pub avg_systolic: Option<i32>,
    pub avg_diastolic: Option<i32>,
    pub highest_systolic: Option<Reading>,
    pub highest_diastolic: Option<Reading>,
    pub lowest_systolic: Option<Reading>,
    pub lowest_diastolic: Option<Reading>,
}

/// Pick the reading whose value beats the current pick strictly, so the first
/// of several equal readings is kept.
fn pick<'a, F>(current: &mut Option<&'a Reading>, candidate: &'a Reading, value: F, better: fn(i32, i32) -> bool)
where
    F: Fn(&Reading) -> i32,
{
    let replace = match *current {
        Some(best) => better(value(candidate), value(best)),
        None => true,
    };
    if replace {
        *current = Some(candidate);
    }
}

/// Summarize the readings that have both values; others are ignored
pub fn summarize<'a, I>(readings: I) -> ReadingSummary
where
    I: IntoIterator<Item = &'a Reading>,
{
    let mut count = 0usize;
    let mut systolic_sum = 0i64;
    let mut diastolic_sum = 0i64;
    let mut highest_systolic = None;
    let mut highest_diastolic = None;
    let mut lowest_systolic = None;
    let mut lowest_diastolic = None;

    let systolic = |r: &Reading| r.systolic.unwrap_or_default();
    let diastolic = |r: &Reading| r.diastolic.unwrap_or_default();
    let greater: fn(i32, i32) -> bool = |a, b| a > b;
    let less: fn(i32, i32) -> bool = |a, b| a < b;

    for reading in readings.into_iter().filter(|r| r.is_valid_pressure()) {
        count += 1;
        systolic_sum += i64::from(systolic(reading));
        diastolic_sum += i64::from(diastolic(reading));

        pick(&mut highest_systolic, reading, systolic, greater);
        pick(&mut highest_diastolic, reading, diastolic, greater);
        pick(&mut lowest_systolic, reading, systolic, less);
        pick(&mut lowest_diastolic, reading, diastolic, less);
    }

    ReadingSummary {
        count,
        avg_systolic: round_average(systolic_sum, count),
        avg_diastolic: round_average(diastolic_sum, count),
        highest_systolic: highest_systolic.cloned(),
        highest_diastolic: highest_diastolic.cloned(),
        lowest_systolic: lowest_systolic.cloned(),
        lowest_diastolic: lowest_diastolic.cloned(),
    }
}

/// Which way morning differs from evening
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    MorningHigher,
    MorningLower,
    Same,
}

impl Direction {
    pub fn label(&self) -> &'static str {
        match self {
            Direction::MorningHigher => "⬆ Morning",
            Direction::MorningLower => "⬇ Morning",
            Direction::Same => "Same",
        }
    }
}

/// Morning average minus evening average; positive means morning is higher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Delta {
    pub difference: i32,
    pub direction: Direction,
    /// "⬆ Morning", "⬇ Morning" or "Same"
    pub label: &'static str,
}

impl Delta {
    pub fn between(morning: Option<i32>, evening: Option<i32>) -> Option<Self> {
        let difference = morning? - evening?;
        let direction = match difference {
            d if d > 0 => Direction::MorningHigher,
            d if d < 0 => Direction::MorningLower,
            _ => Direction::Same,
        };
        Some(Self {
            difference,
            direction,
            label: direction.label(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeOfDayComparison {
    pub systolic: Option<Delta>,
    pub diastolic: Option<Delta>,
}

/// All-day, morning and evening summaries with their comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaypartSummary {
    pub all: ReadingSummary,
    pub morning: ReadingSummary,
    pub evening: ReadingSummary,
    pub comparison: TimeOfDayComparison,
}

pub fn summarize_by_time_of_day<Tz: TimeZone>(readings: &[Reading], tz: &Tz) -> DaypartSummary {
    let all = summarize(readings);
    let morning = summarize(filter_by_time_of_day(readings, TimeOfDay::Morning, tz));
    let evening = summarize(filter_by_time_of_day(readings, TimeOfDay::Evening, tz));

    let comparison = TimeOfDayComparison {
        systolic: Delta::between(morning.avg_systolic, evening.avg_systolic),
        diastolic: Delta::between(morning.avg_diastolic, evening.avg_diastolic),
    };

    DaypartSummary {
        all,
        morning,
        evening,
        comparison,
    }
}
