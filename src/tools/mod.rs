//! bpdash tools
//!
//! CSV import/export and the dashboard assembly used by the CLI.

pub mod dashboard;
pub mod export;
pub mod import;
