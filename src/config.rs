//! Dashboard configuration
//!
//! Goal bounds and recency windows. Loaded from the JSON file named by
//! `BPDASH_CONFIG`, falling back to the clinical defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming the JSON config file
pub const CONFIG_ENV_VAR: &str = "BPDASH_CONFIG";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid {which} goal range: min {min} is greater than max {max}")]
    InvalidGoalRange {
        which: &'static str,
        min: i32,
        max: i32,
    },

    #[error("Recency window '{0}' must be positive")]
    InvalidWindow(&'static str),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Goal bounds for blood pressure, inclusive on both ends (mmHg)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalRange {
    pub systolic_min: i32,
    pub systolic_max: i32,
    pub diastolic_min: i32,
    pub diastolic_max: i32,
}

impl Default for GoalRange {
    fn default() -> Self {
        Self {
            systolic_min: 90,
            systolic_max: 160,
            diastolic_min: 60,
            diastolic_max: 100,
        }
    }
}

impl GoalRange {
    pub fn new(
        systolic_min: i32,
        systolic_max: i32,
        diastolic_min: i32,
        diastolic_max: i32,
    ) -> ConfigResult<Self> {
        let goals = Self {
            systolic_min,
            systolic_max,
            diastolic_min,
            diastolic_max,
        };
        goals.validate()?;
        Ok(goals)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.systolic_min > self.systolic_max {
            return Err(ConfigError::InvalidGoalRange {
                which: "systolic",
                min: self.systolic_min,
                max: self.systolic_max,
            });
        }
        if self.diastolic_min > self.diastolic_max {
            return Err(ConfigError::InvalidGoalRange {
                which: "diastolic",
                min: self.diastolic_min,
                max: self.diastolic_max,
            });
        }
        Ok(())
    }

    /// True if either value falls outside its goal range
    pub fn is_abnormal(&self, systolic: i32, diastolic: i32) -> bool {
        systolic < self.systolic_min
            || systolic > self.systolic_max
            || diastolic < self.diastolic_min
            || diastolic > self.diastolic_max
    }
}

/// How far back each aggregated view looks from `now`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecencyWindows {
    pub daily_days: i64,
    pub weekly_weeks: i64,
    pub monthly_months: u32,
}

impl Default for RecencyWindows {
    fn default() -> Self {
        Self {
            daily_days: 30,
            weekly_weeks: 12,
            monthly_months: 12,
        }
    }
}

impl RecencyWindows {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.daily_days <= 0 {
            return Err(ConfigError::InvalidWindow("daily_days"));
        }
        if self.weekly_weeks <= 0 {
            return Err(ConfigError::InvalidWindow("weekly_weeks"));
        }
        if self.monthly_months == 0 {
            return Err(ConfigError::InvalidWindow("monthly_months"));
        }
        Ok(())
    }
}

/// Full dashboard configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub goals: GoalRange,
    pub windows: RecencyWindows,
}

impl DashboardConfig {
    /// Parse and validate a JSON config document
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Load from `BPDASH_CONFIG` if set, otherwise use defaults
    pub fn load() -> ConfigResult<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => {
                tracing::info!(path = %Path::new(&path).display(), "loading dashboard config");
                Self::from_file(path)
            }
            None => {
                tracing::info!("no {} set, using default goals", CONFIG_ENV_VAR);
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.goals.validate()?;
        self.windows.validate()
    }
}
