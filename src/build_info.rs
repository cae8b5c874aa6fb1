//! Build information module
//!
//! Compile-time build number and timestamp, embedded by `build.rs`, plus the
//! startup banner showing which goals and windows the dashboard will apply.

use serde::Serialize;

use crate::config::DashboardConfig;

/// Build number as embedded by `build.rs`, "0" when built without it
pub const BUILD_NUMBER: &str = match option_env!("BPDASH_BUILD_NUMBER") {
    Some(s) => s,
    None => "0",
};

/// Build timestamp in ISO 8601 format
pub const BUILD_TIMESTAMP: &str = match option_env!("BPDASH_BUILD_TIMESTAMP") {
    Some(s) => s,
    None => "unknown",
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Build information attached to dashboard output
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub build_number: u64,
    pub build_timestamp: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            name: NAME,
            version: VERSION,
            build_number: BUILD_NUMBER.trim().parse().unwrap_or(0),
            build_timestamp: BUILD_TIMESTAMP,
        }
    }
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self::current()
    }
}

/// Banner text: build identity, then the goal range and recency windows in effect
pub fn banner_lines(config: &DashboardConfig) -> Vec<String> {
    let info = BuildInfo::current();
    let goals = &config.goals;
    let windows = &config.windows;
    vec![
        format!(
            "Blood Pressure Dashboard ({}) v{} build {} ({})",
            info.name, info.version, info.build_number, info.build_timestamp
        ),
        format!(
            "  Goal range: {}-{} / {}-{} mmHg",
            goals.systolic_min, goals.systolic_max, goals.diastolic_min, goals.diastolic_max
        ),
        format!(
            "  Windows: daily {}d, weekly {}w, monthly {}mo",
            windows.daily_days, windows.weekly_weeks, windows.monthly_months
        ),
    ]
}

/// Print the startup banner to stderr
pub fn print_startup_banner(config: &DashboardConfig) {
    for line in banner_lines(config) {
        eprintln!("{}", line);
    }
}
