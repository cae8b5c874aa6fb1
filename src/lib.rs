//! Blood Pressure Dashboard (bpdash) Library
//!
//! Turns a history of blood pressure readings and medication events into
//! chart points, summaries and goal assessments.

pub mod analytics;
pub mod build_info;
pub mod config;
pub mod models;
pub mod tools;
