//! Dashboard composition
//!
//! Runs the analytics over one request and collects everything a chart page
//! needs: the points for the selected view, the readings annotated with
//! medication events, the morning/evening summary and the goal assessment.
//!
//! The time-of-day filter applies to the chart series (`points` and
//! `annotated`). The summary and the assessment always cover every reading in
//! the request.

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::analytics::aggregation::{aggregate_buckets, AggregatedPoint, RawPoint};
use crate::analytics::bucketing::{bucket_key, bucket_readings};
use crate::analytics::events::{associate_events, AnnotatedReading};
use crate::analytics::goals::{assess_goals, GoalAssessment};
use crate::analytics::recency::{readings_today, Granularity};
use crate::analytics::summary::{filter_by_time_of_day, summarize_by_time_of_day, DaypartSummary, TimeOfDay};
use crate::build_info::BuildInfo;
use crate::config::{DashboardConfig, RecencyWindows};
use crate::models::{MedicationEvent, Reading, VitalType};

/// One dashboard render: the data plus the selected view state
#[derive(Debug, Clone, Copy)]
pub struct DashboardRequest<'a> {
    pub readings: &'a [Reading],
    pub events: &'a [MedicationEvent],
    pub view: Granularity,
    pub time_of_day: TimeOfDay,
}

impl<'a> DashboardRequest<'a> {
    pub fn new(readings: &'a [Reading], events: &'a [MedicationEvent]) -> Self {
        Self {
            readings,
            events,
            view: Granularity::Daily,
            time_of_day: TimeOfDay::All,
        }
    }

    pub fn with_view(mut self, view: Granularity) -> Self {
        self.view = view;
        self
    }

    pub fn with_time_of_day(mut self, time_of_day: TimeOfDay) -> Self {
        self.time_of_day = time_of_day;
        self
    }
}

/// Chart series for the selected view
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ChartPoints {
    /// Today's readings as-is (hourly view)
    Raw(Vec<RawPoint>),
    Aggregated(Vec<AggregatedPoint>),
}

impl ChartPoints {
    pub fn len(&self) -> usize {
        match self {
            ChartPoints::Raw(points) => points.len(),
            ChartPoints::Aggregated(points) => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Readings represented by the series
    pub fn total_readings(&self) -> usize {
        match self {
            ChartPoints::Raw(points) => points.len(),
            ChartPoints::Aggregated(points) => points.iter().map(|p| p.count).sum(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardResponse {
    pub build: BuildInfo,
    pub generated_at: DateTime<Utc>,
    pub view: Granularity,
    pub time_of_day: TimeOfDay,
    pub points: ChartPoints,
    pub annotated: Vec<RawPoint>,
    pub summary: DaypartSummary,
    pub assessment: GoalAssessment,
    pub total_readings: usize,
}

/// Keep only blood pressure readings, for callers holding mixed vitals
pub fn blood_pressure_only(readings: &[Reading]) -> Vec<Reading> {
    readings
        .iter()
        .filter(|r| r.vital_type == VitalType::BloodPressure)
        .cloned()
        .collect()
}

fn display_date<Tz: TimeZone>(timestamp: DateTime<Utc>, tz: &Tz) -> String {
    timestamp.with_timezone(tz).naive_local().format("%b %-d").to_string()
}

/// Aggregate a view and mark each point with the events of its readings.
///
/// `associations` covers every reading of the series, not only the window, so
/// an event whose nearest reading lies outside the window marks no point. A
/// point takes the event of the last of its readings that received one.
fn aggregate_with_events<'a, Tz: TimeZone>(
    readings: &[&'a Reading],
    associations: &[AnnotatedReading<'a>],
    view: Granularity,
    windows: &RecencyWindows,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Vec<AggregatedPoint> {
    let buckets = bucket_readings(readings.iter().copied(), view, windows, now, tz);
    let mut points = aggregate_buckets(&buckets);

    // Buckets borrow from the same slice, so a reading is identified by address
    let owners: HashMap<*const Reading, usize> = buckets
        .iter()
        .enumerate()
        .flat_map(|(idx, bucket)| bucket.readings.iter().map(move |r| (*r as *const Reading, idx)))
        .collect();

    for annotated in associations {
        let Some(annotation) = annotated.annotation() else {
            continue;
        };
        let owner = owners.get(&(annotated.reading as *const Reading)).copied();
        if let Some(point) = owner.and_then(|idx| points.get_mut(idx)) {
            point.event = Some(annotation);
        }
    }
    points
}

fn raw_points_today<'a, Tz: TimeZone>(readings: &[&'a Reading], now: DateTime<Utc>, tz: &Tz) -> Vec<RawPoint> {
    readings_today(readings.iter().copied(), now, tz)
        .into_iter()
        .map(|reading| {
            let (_, label) = bucket_key(reading.timestamp, Granularity::Hourly, tz);
            RawPoint::from_reading(reading, label)
        })
        .collect()
}

/// Build the dashboard for one request at `now`
pub fn build_dashboard<Tz: TimeZone>(
    request: &DashboardRequest<'_>,
    config: &DashboardConfig,
    now: DateTime<Utc>,
    tz: &Tz,
) -> DashboardResponse {
    let filtered = filter_by_time_of_day(request.readings, request.time_of_day, tz);

    let associations = associate_events(filtered.iter().copied(), request.events);

    let points = match request.view {
        Granularity::Hourly => ChartPoints::Raw(raw_points_today(&filtered, now, tz)),
        view => ChartPoints::Aggregated(aggregate_with_events(
            &filtered,
            &associations,
            view,
            &config.windows,
            now,
            tz,
        )),
    };

    let annotated: Vec<RawPoint> = associations
        .iter()
        .map(|a| RawPoint::from_reading(a.reading, display_date(a.reading.timestamp, tz)).with_event(a.annotation()))
        .collect();

    let summary = summarize_by_time_of_day(request.readings, tz);
    let assessment = assess_goals(request.readings, &config.goals);
    let total_readings = points.total_readings();

    tracing::debug!(
        view = %request.view,
        time_of_day = %request.time_of_day,
        points = points.len(),
        total_readings,
        events = request.events.len(),
        "built dashboard"
    );

    DashboardResponse {
        build: BuildInfo::current(),
        generated_at: now,
        view: request.view,
        time_of_day: request.time_of_day,
        points,
        annotated,
        summary,
        assessment,
        total_readings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::goals::RangeStatus;
    use crate::models::EventKind;
    use chrono::FixedOffset;

    fn at(d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, d, h, mi, 0).unwrap()
    }

    fn sample_readings() -> Vec<Reading> {
        vec![
            Reading::blood_pressure(at(16, 8, 0), 150, 92),
            Reading::blood_pressure(at(16, 20, 0), 138, 85),
            Reading::blood_pressure(at(17, 7, 30), 172, 101),
            Reading::single(VitalType::HeartRate, at(17, 7, 31), 88.0),
            Reading::blood_pressure(at(17, 19, 0), 128, 80),
        ]
    }

    fn sample_events() -> Vec<MedicationEvent> {
        vec![MedicationEvent::new(
            at(17, 9, 0),
            "PRN Clonidine 0.1 mg",
            EventKind::AdhocDose,
        )]
    }

    #[test]
    fn test_daily_dashboard() {
        let readings = sample_readings();
        let events = sample_events();
        let request = DashboardRequest::new(&readings, &events);
        let response = build_dashboard(&request, &DashboardConfig::default(), at(18, 0, 0), &Utc);

        let ChartPoints::Aggregated(points) = &response.points else {
            panic!("daily view should aggregate");
        };
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].label, "May 16");
        assert!(points[0].event.is_none());
        assert_eq!(points[1].count, 3);
        assert_eq!(points[1].valid_count, 2);
        assert_eq!(points[1].event.as_ref().map(|e| e.kind), Some(EventKind::AdhocDose));
        assert_eq!(response.total_readings, 5);

        // 09:00 is closest to the heart-rate reading at 07:31
        assert_eq!(response.annotated.len(), 5);
        assert!(response.annotated[3].event.is_some());
        assert!(response.annotated[3].zero_filled);
        assert_eq!(response.annotated[3].label, "May 17");

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["annotated"][3]["event"]["kind"], "ADHOC_DOSE");
        assert_eq!(json["annotated"][3]["event"]["label"], "Adhoc Dose");
    }

    #[test]
    fn test_event_before_window_marks_no_point() {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap();
        let readings: Vec<Reading> = (0..60)
            .map(|day| Reading::blood_pressure(start + chrono::Duration::days(day), 130, 85))
            .collect();
        let events = vec![
            MedicationEvent::new(start, "Old med added", EventKind::MedAdded),
            MedicationEvent::new(start + chrono::Duration::days(45), "Dose adjusted", EventKind::Adjusted),
        ];
        let now = Utc.with_ymd_and_hms(2025, 3, 2, 0, 0, 0).unwrap();
        let request = DashboardRequest::new(&readings, &events);
        let response = build_dashboard(&request, &DashboardConfig::default(), now, &Utc);

        let ChartPoints::Aggregated(points) = &response.points else {
            panic!("daily view should aggregate");
        };
        assert_eq!(points[0].label, "Jan 31");
        assert!(points[0].event.is_none());

        let marked: Vec<&str> = points
            .iter()
            .filter(|p| p.event.is_some())
            .map(|p| p.label.as_str())
            .collect();
        assert_eq!(marked, vec!["Feb 15"]);

        // The full annotated series still shows the old event on its own reading
        assert_eq!(
            response.annotated[0].event.as_ref().map(|e| e.kind),
            Some(EventKind::MedAdded)
        );
    }

    #[test]
    fn test_hourly_dashboard_is_today_raw() {
        let readings = sample_readings();
        let request = DashboardRequest::new(&readings, &[]).with_view(Granularity::Hourly);
        let response = build_dashboard(&request, &DashboardConfig::default(), at(17, 21, 0), &Utc);

        let ChartPoints::Raw(points) = &response.points else {
            panic!("hourly view should pass readings through");
        };
        let labels: Vec<&str> = points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["7:30 AM", "7:31 AM", "7:00 PM"]);
        assert_eq!(response.total_readings, 3);
    }

    #[test]
    fn test_time_filter_limits_series_not_summary() {
        let readings = sample_readings();
        let request = DashboardRequest::new(&readings, &[])
            .with_view(Granularity::Weekly)
            .with_time_of_day(TimeOfDay::Evening);
        let response = build_dashboard(&request, &DashboardConfig::default(), at(18, 0, 0), &Utc);

        assert_eq!(response.total_readings, 2);
        assert_eq!(response.annotated.len(), 2);
        assert_eq!(response.summary.all.count, 4);
        assert_eq!(response.assessment.valid_count, 4);
    }

    #[test]
    fn test_assessment_uses_configured_goals() {
        let readings = sample_readings();
        let config = DashboardConfig::from_json_str(r#"{"goals": {"systolic_max": 140}}"#).unwrap();
        let request = DashboardRequest::new(&readings, &[]);
        let response = build_dashboard(&request, &config, at(18, 0, 0), &Utc);
        assert_eq!(response.assessment.in_range_count, 2);
        assert_eq!(response.assessment.percent_in_range, 50);
        assert_eq!(response.assessment.status, RangeStatus::NeedsImprovement);
        assert_eq!(response.assessment.goals.systolic_max, 140);
    }

    #[test]
    fn test_local_zone_moves_readings_between_days() {
        // 02:00Z on May 17 is the evening of May 16 at UTC-5
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let readings = vec![
            Reading::blood_pressure(at(16, 14, 0), 130, 80),
            Reading::blood_pressure(at(17, 2, 0), 140, 90),
        ];
        let request = DashboardRequest::new(&readings, &[]);
        let response = build_dashboard(&request, &DashboardConfig::default(), at(18, 0, 0), &tz);
        assert_eq!(response.points.len(), 1);
        assert_eq!(response.summary.evening.count, 1);
        assert_eq!(response.summary.morning.count, 1);
    }

    #[test]
    fn test_blood_pressure_only() {
        let readings = sample_readings();
        let bp = blood_pressure_only(&readings);
        assert_eq!(bp.len(), 4);
        assert!(bp.iter().all(|r| r.vital_type == VitalType::BloodPressure));
    }

    #[test]
    fn test_response_json_shape() {
        let readings = vec![Reading::single(VitalType::HeartRate, at(17, 8, 0), 72.0)];
        let request = DashboardRequest::new(&readings, &[]);
        let response = build_dashboard(&request, &DashboardConfig::default(), at(18, 0, 0), &Utc);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["points"]["kind"], "aggregated");
        assert!(json["points"]["data"][0]["stats"].is_null());
        assert!(json["points"]["data"][0].get("event").is_none());
        assert_eq!(json["assessment"]["status"], "poor_control");
        assert_eq!(json["assessment"]["status_label"], "Poor Control");
        assert_eq!(json["assessment"]["trend"]["label"], "Stable");
        assert_eq!(json["view"], "daily");
        assert_eq!(json["build"]["name"], "bpdash");
    }
}
