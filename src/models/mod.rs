//! Data models
//!
//! Plain data carried between the importer, the analytics core and the dashboard.

mod medication_event;
mod reading;

use thiserror::Error;

pub use medication_event::{EventKind, MedicationEvent};
pub use reading::{Reading, VitalType};

/// Error for names supplied at the crate boundary (CLI flags, JSON, CSV)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unknown {kind}: '{value}'")]
    UnknownValue { kind: &'static str, value: String },
}
