//! Goal-range assessment
//!
//! How many readings fall inside the patient's goal range, a status band for
//! that percentage, and a first-half vs second-half trend.
//!
//! The trend is a two-point comparison, not a regression: it only says whether
//! the later half of the readings did better than the earlier half.

use serde::Serialize;

use crate::config::GoalRange;
use crate::models::Reading;

/// Rounded percentage, 0 when there is nothing to measure
fn percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((200 * part + total) / (2 * total)) as u32
}

fn count_in_range(readings: &[(i32, i32)], goals: &GoalRange) -> usize {
    readings
        .iter()
        .filter(|&&(s, d)| !goals.is_abnormal(s, d))
        .count()
}

/// Share of valid readings inside the goal range, as a rounded percentage
pub fn percent_in_range<'a, I>(readings: I, goals: &GoalRange) -> u32
where
    I: IntoIterator<Item = &'a Reading>,
{
    let pressures: Vec<(i32, i32)> = readings.into_iter().filter_map(Reading::pressure).collect();
    percent(count_in_range(&pressures, goals), pressures.len())
}

/// Status band for a percent-in-range value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeStatus {
    Ideal,
    NeedsImprovement,
    PoorControl,
}

impl RangeStatus {
    pub fn from_percent(percent: u32) -> Self {
        if percent >= 75 {
            RangeStatus::Ideal
        } else if percent >= 50 {
            RangeStatus::NeedsImprovement
        } else {
            RangeStatus::PoorControl
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RangeStatus::Ideal => "Ideal",
            RangeStatus::NeedsImprovement => "Needs Improvement",
            RangeStatus::PoorControl => "Poor Control",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Worsening,
    Stable,
}

impl Trend {
    pub fn label(&self) -> &'static str {
        match self {
            Trend::Improving => "Improving",
            Trend::Worsening => "Worsening",
            Trend::Stable => "Stable",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrendAssessment {
    pub first_half_percent: u32,
    pub second_half_percent: u32,
    pub trend: Trend,
    /// "Improving", "Worsening" or "Stable"
    pub label: &'static str,
}

fn trend_of(pressures: &[(i32, i32)], goals: &GoalRange) -> TrendAssessment {
    // The first half gets floor(n/2); with an odd count the extra reading is in the second half
    let (first, second) = pressures.split_at(pressures.len() / 2);
    let first_half_percent = percent(count_in_range(first, goals), first.len());
    let second_half_percent = percent(count_in_range(second, goals), second.len());

    let trend = if second_half_percent > first_half_percent {
        Trend::Improving
    } else if second_half_percent < first_half_percent {
        Trend::Worsening
    } else {
        Trend::Stable
    };

    TrendAssessment {
        first_half_percent,
        second_half_percent,
        trend,
        label: trend.label(),
    }
}

/// First-half vs second-half in-range trend over the valid readings, in input order
pub fn assess_trend<'a, I>(readings: I, goals: &GoalRange) -> TrendAssessment
where
    I: IntoIterator<Item = &'a Reading>,
{
    let pressures: Vec<(i32, i32)> = readings.into_iter().filter_map(Reading::pressure).collect();
    trend_of(&pressures, goals)
}

/// Goal compliance for a set of readings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GoalAssessment {
    pub percent_in_range: u32,
    pub in_range_count: usize,
    pub valid_count: usize,
    pub status: RangeStatus,
    /// "Ideal", "Needs Improvement" or "Poor Control"
    pub status_label: &'static str,
    pub trend: TrendAssessment,
    pub goals: GoalRange,
}

pub fn assess_goals<'a, I>(readings: I, goals: &GoalRange) -> GoalAssessment
where
    I: IntoIterator<Item = &'a Reading>,
{
    let pressures: Vec<(i32, i32)> = readings.into_iter().filter_map(Reading::pressure).collect();
    let in_range_count = count_in_range(&pressures, goals);
    let percent_in_range = percent(in_range_count, pressures.len());
    let status = RangeStatus::from_percent(percent_in_range);

    GoalAssessment {
        percent_in_range,
        in_range_count,
        valid_count: pressures.len(),
        status,
        status_label: status.label(),
        trend: trend_of(&pressures, goals),
        goals: *goals,
    }
}
