//! Medication event model
//!
//! Point-in-time medication events (new prescriptions, PRN doses, late
//! administrations, dose changes) shown alongside blood pressure readings.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ParseError;

/// Medication event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    MedAdded,
    AdhocDose,
    AdminLate,
    Adjusted,
    Replaced,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        EventKind::MedAdded,
        EventKind::AdhocDose,
        EventKind::AdminLate,
        EventKind::Adjusted,
        EventKind::Replaced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::MedAdded => "MED_ADDED",
            EventKind::AdhocDose => "ADHOC_DOSE",
            EventKind::AdminLate => "ADMIN_LATE",
            EventKind::Adjusted => "ADJUSTED",
            EventKind::Replaced => "REPLACED",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            EventKind::MedAdded => "Medication Added",
            EventKind::AdhocDose => "Adhoc Dose",
            EventKind::AdminLate => "Late Dose",
            EventKind::Adjusted => "Medication Adjusted",
            EventKind::Replaced => "Medication Replaced",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace('-', "_");
        EventKind::ALL
            .into_iter()
            .find(|k| k.as_str() == normalized)
            .ok_or_else(|| ParseError::UnknownValue {
                kind: "event kind",
                value: s.to_string(),
            })
    }
}

/// A medication event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationEvent {
    pub timestamp: DateTime<Utc>,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
}

impl MedicationEvent {
    pub fn new(timestamp: DateTime<Utc>, description: impl Into<String>, kind: EventKind) -> Self {
        Self {
            timestamp,
            description: description.into(),
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_round_trips_wire_name() {
        for kind in EventKind::ALL {
            assert_eq!(kind.as_str().parse::<EventKind>().unwrap(), kind);
        }
        assert_eq!("adhoc-dose".parse::<EventKind>().unwrap(), EventKind::AdhocDose);
        assert!("DISCONTINUED".parse::<EventKind>().is_err());
    }

    #[test]
    fn test_event_deserializes_from_seed_shape() {
        let json = r#"{
            "timestamp": "2025-05-19T09:00:00Z",
            "description": "Clonidine 0.1 mg patch added",
            "type": "MED_ADDED"
        }"#;
        let event: MedicationEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.kind, EventKind::MedAdded);
        assert_eq!(event.kind.display_name(), "Medication Added");
    }
}
