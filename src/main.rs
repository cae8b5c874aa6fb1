//! Blood Pressure Dashboard (bpdash)
//!
//! Imports a CSV of readings and prints the dashboard for one view as JSON.
//!
//! Usage:
//!   bpdash <readings.csv> [--events <events.json>] [--view daily] [--time all]
//!   bpdash <readings.csv> --export

use std::path::{Path, PathBuf};

use chrono::{Local, Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use bpdash::analytics::{Granularity, TimeOfDay};
use bpdash::build_info;
use bpdash::config::DashboardConfig;
use bpdash::models::MedicationEvent;
use bpdash::tools::dashboard::{blood_pressure_only, build_dashboard, DashboardRequest};
use bpdash::tools::export::export_readings_csv;
use bpdash::tools::import::import_readings_file;

#[derive(Parser)]
#[command(name = "bpdash")]
#[command(version)]
#[command(about = "Blood pressure dashboard: bucketed stats, summaries and goal assessment", long_about = None)]
struct Cli {
    /// CSV file of readings (type,systolic,diastolic,timestamp)
    readings: PathBuf,

    /// JSON array of medication events
    #[arg(short, long)]
    events: Option<PathBuf>,

    /// Chart view: hourly, daily, weekly or monthly
    #[arg(short, long, default_value = "daily")]
    view: Granularity,

    /// Time of day filter: all, morning or evening
    #[arg(short, long, default_value = "all")]
    time: TimeOfDay,

    /// Keep non blood pressure vitals in the chart series
    #[arg(long)]
    all_vitals: bool,

    /// Print the imported readings as CSV instead of the dashboard
    #[arg(long)]
    export: bool,
}

fn load_events(path: &Path) -> Result<Vec<MedicationEvent>, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to open events file '{}': {}", path.display(), e))?;
    let mut events: Vec<MedicationEvent> = serde_json::from_str(&text)?;
    events.sort_by_key(|e| e.timestamp);
    Ok(events)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("bpdash=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = DashboardConfig::load()?;
    build_info::print_startup_banner(&config);
    let tz = Local;

    let import = import_readings_file(&cli.readings, &tz)?;
    eprintln!(
        "Imported {} of {} rows ({}) from {}",
        import.imported,
        import.total_rows,
        import.date_range,
        cli.readings.display()
    );
    for error in &import.errors {
        eprintln!("  {}", error);
    }

    if cli.export {
        print!("{}", export_readings_csv(&import.readings));
        return Ok(());
    }

    let events = match &cli.events {
        Some(path) => load_events(path)?,
        None => Vec::new(),
    };

    let readings = if cli.all_vitals {
        import.readings
    } else {
        blood_pressure_only(&import.readings)
    };

    let request = DashboardRequest::new(&readings, &events)
        .with_view(cli.view)
        .with_time_of_day(cli.time);
    let dashboard = build_dashboard(&request, &config, Utc::now(), &tz);

    println!("{}", serde_json::to_string_pretty(&dashboard)?);

    Ok(())
}
