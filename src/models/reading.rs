//! Reading model
//!
//! A single timestamped vital sign measurement. Blood pressure readings carry
//! systolic/diastolic values; other vital types carry a single `value`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Vital type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VitalType {
    Weight,
    BloodPressure,
    HeartRate,
    OxygenSaturation,
    Glucose,
}

impl VitalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VitalType::Weight => "weight",
            VitalType::BloodPressure => "blood_pressure",
            VitalType::HeartRate => "heart_rate",
            VitalType::OxygenSaturation => "oxygen_saturation",
            VitalType::Glucose => "glucose",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "weight" => Some(VitalType::Weight),
            "blood_pressure" | "bp" => Some(VitalType::BloodPressure),
            "heart_rate" | "hr" | "pulse" => Some(VitalType::HeartRate),
            "oxygen_saturation" | "o2" | "spo2" | "oxygen" => Some(VitalType::OxygenSaturation),
            "glucose" | "blood_sugar" | "sugar" => Some(VitalType::Glucose),
            _ => None,
        }
    }
}

/// A vital sign reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub vital_type: VitalType,
    pub timestamp: DateTime<Utc>,
    pub systolic: Option<i32>,
    pub diastolic: Option<i32>,
    /// Single-valued vitals (heart rate, weight, ...)
    #[serde(default)]
    pub value: Option<f64>,
}

impl Reading {
    /// Blood pressure reading with both values present
    pub fn blood_pressure(timestamp: DateTime<Utc>, systolic: i32, diastolic: i32) -> Self {
        Self {
            vital_type: VitalType::BloodPressure,
            timestamp,
            systolic: Some(systolic),
            diastolic: Some(diastolic),
            value: None,
        }
    }

    /// Reading of a single-valued vital type, without blood pressure values
    pub fn single(vital_type: VitalType, timestamp: DateTime<Utc>, value: f64) -> Self {
        Self {
            vital_type,
            timestamp,
            systolic: None,
            diastolic: None,
            value: Some(value),
        }
    }

    /// Systolic/diastolic pair, only when both are present.
    ///
    /// Readings without a pair are excluded from every blood pressure statistic
    /// but still take part in time filtering and bucketing.
    pub fn pressure(&self) -> Option<(i32, i32)> {
        match (self.systolic, self.diastolic) {
            (Some(s), Some(d)) => Some((s, d)),
            _ => None,
        }
    }

    pub fn is_valid_pressure(&self) -> bool {
        self.pressure().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_vital_type_aliases() {
        assert_eq!(VitalType::from_str("blood_pressure"), Some(VitalType::BloodPressure));
        assert_eq!(VitalType::from_str("BP"), Some(VitalType::BloodPressure));
        assert_eq!(VitalType::from_str("heart-rate"), Some(VitalType::HeartRate));
        assert_eq!(VitalType::from_str("pulse"), Some(VitalType::HeartRate));
        assert_eq!(VitalType::from_str("temperature"), None);
    }

    #[test]
    fn test_pressure_requires_both_values() {
        let ts = Utc.with_ymd_and_hms(2025, 5, 1, 8, 0, 0).unwrap();
        let bp = Reading::blood_pressure(ts, 120, 80);
        assert_eq!(bp.pressure(), Some((120, 80)));

        let mut partial = bp.clone();
        partial.diastolic = None;
        assert!(!partial.is_valid_pressure());

        let hr = Reading::single(VitalType::HeartRate, ts, 72.0);
        assert_eq!(hr.pressure(), None);
    }

    #[test]
    fn test_serde_wire_names() {
        let ts = Utc.with_ymd_and_hms(2025, 5, 1, 8, 0, 0).unwrap();
        let json = serde_json::to_value(Reading::blood_pressure(ts, 120, 80)).unwrap();
        assert_eq!(json["vital_type"], "blood_pressure");
        assert_eq!(json["systolic"], 120);
    }
}
