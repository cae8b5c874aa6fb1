//! Medication event association
//!
//! Pairs each medication event with the reading closest to it in time so the
//! event can be marked on that reading's chart point.
//!
//! Every event scans every reading, O(events x readings). That is fine for one
//! patient's history but should not be reused for large datasets without
//! switching to a sorted two-pointer merge.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{EventKind, MedicationEvent, Reading};

/// Event details carried on a chart point
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventAnnotation {
    pub description: String,
    pub kind: EventKind,
    /// Display name of `kind`, e.g. "Late Dose"
    pub label: &'static str,
}

impl From<&MedicationEvent> for EventAnnotation {
    fn from(event: &MedicationEvent) -> Self {
        Self {
            description: event.description.clone(),
            kind: event.kind,
            label: event.kind.display_name(),
        }
    }
}

/// A reading with at most one associated event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnotatedReading<'a> {
    pub reading: &'a Reading,
    pub event: Option<&'a MedicationEvent>,
}

impl AnnotatedReading<'_> {
    pub fn annotation(&self) -> Option<EventAnnotation> {
        self.event.map(EventAnnotation::from)
    }
}

/// Index of the timestamp closest to `at`; the first one wins a tie
fn nearest_index<I>(timestamps: I, at: DateTime<Utc>) -> Option<usize>
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let mut closest: Option<(usize, i64)> = None;
    for (idx, ts) in timestamps.into_iter().enumerate() {
        let delta = (at - ts).num_milliseconds().abs();
        match closest {
            Some((_, best)) if delta >= best => {}
            _ => closest = Some((idx, delta)),
        }
    }
    closest.map(|(idx, _)| idx)
}

/// Position of the reading nearest to `at`, or `None` for no readings
pub fn nearest_reading_index(readings: &[Reading], at: DateTime<Utc>) -> Option<usize> {
    nearest_index(readings.iter().map(|r| r.timestamp), at)
}

/// Attach each event to its nearest reading.
///
/// Events are applied in input order and a later event overwrites an earlier
/// one on the same reading, so a reading shows the last event that chose it.
/// With no readings the result is empty and every event is dropped.
pub fn associate_events<'a, I>(readings: I, events: &'a [MedicationEvent]) -> Vec<AnnotatedReading<'a>>
where
    I: IntoIterator<Item = &'a Reading>,
{
    let mut annotated: Vec<AnnotatedReading<'a>> = readings
        .into_iter()
        .map(|reading| AnnotatedReading { reading, event: None })
        .collect();

    for event in events {
        let nearest = nearest_index(annotated.iter().map(|a| a.reading.timestamp), event.timestamp);
        if let Some(idx) = nearest {
            annotated[idx].event = Some(event);
        }
    }

    annotated
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 17, h, mi, 0).unwrap()
    }

    fn readings_at(times: &[(u32, u32)]) -> Vec<Reading> {
        times
            .iter()
            .map(|&(h, m)| Reading::blood_pressure(at(h, m), 150, 90))
            .collect()
    }

    #[test]
    fn test_event_attaches_to_nearest_reading() {
        let readings = readings_at(&[(10, 0), (10, 30), (11, 0)]);
        let events = vec![MedicationEvent::new(at(10, 20), "PRN Clonidine 0.1 mg", EventKind::AdhocDose)];

        let annotated = associate_events(&readings, &events);
        assert_eq!(annotated.len(), 3);
        assert!(annotated[0].event.is_none());
        assert_eq!(annotated[1].event, Some(&events[0]));
        assert!(annotated[2].event.is_none());
    }

    #[test]
    fn test_tie_goes_to_first_reading() {
        let readings = readings_at(&[(10, 0), (10, 30)]);
        assert_eq!(nearest_reading_index(&readings, at(10, 15)), Some(0));
    }

    #[test]
    fn test_later_event_overwrites_shared_reading() {
        let readings = readings_at(&[(8, 0), (20, 0)]);
        let events = vec![
            MedicationEvent::new(at(8, 10), "Morning dose late", EventKind::AdminLate),
            MedicationEvent::new(at(8, 50), "Patch replaced", EventKind::Replaced),
        ];

        let annotated = associate_events(&readings, &events);
        let annotation = annotated[0].annotation().unwrap();
        assert_eq!(annotation.kind, EventKind::Replaced);
        assert_eq!(annotation.description, "Patch replaced");
        assert_eq!(annotation.label, "Medication Replaced");
        assert!(annotated[1].event.is_none());
    }

    #[test]
    fn test_no_readings_is_a_no_op() {
        let events = vec![MedicationEvent::new(at(9, 0), "Patch added", EventKind::MedAdded)];
        let readings: Vec<Reading> = Vec::new();
        let annotated = associate_events(&readings, &events);
        assert!(annotated.is_empty());
        assert_eq!(nearest_reading_index(&[], at(9, 0)), None);
    }

    #[test]
    fn test_event_outside_range_uses_edge_reading() {
        let readings = readings_at(&[(10, 0), (11, 0)]);
        let events = vec![MedicationEvent::new(at(23, 0), "Dose adjusted", EventKind::Adjusted)];
        let annotated = associate_events(&readings, &events);
        assert!(annotated[0].event.is_none());
        assert!(annotated[1].event.is_some());
    }
}
