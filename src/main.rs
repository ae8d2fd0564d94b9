use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use aqi_planner::stats::{highest_region, monthly_averages};
use aqi_planner::{
    AqiHistoryStore, JsonDataset, PlanReport, PlannerConfig, PlannerError, Region, TravelPlanner,
};
use chrono::Month;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Plan a multi-day trip across air-quality monitoring stations
#[derive(Parser, Debug)]
#[command(name = "aqi-planner", version, about, long_about = None)]
struct Cli {
    /// JSON dataset with stations and AQI history
    #[arg(long, env = "AQI_PLANNER_DATASET")]
    dataset: PathBuf,

    /// State or union territory, by name or two-letter code
    #[arg(long, default_value = "Delhi")]
    region: String,

    /// Number of days to plan
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u16).range(1..=10))]
    days: u16,

    /// Configuration file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the average travel speed in km/h
    #[arg(long)]
    speed: Option<f64>,

    /// Also print monthly and regional AQI statistics
    #[arg(long)]
    stats: bool,

    /// Print the plan as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,
}

fn init_logging(config: &PlannerConfig, verbose: bool) {
    let level = if verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = PlannerConfig::load_from_path(cli.config.clone())
        .context("Failed to load configuration")?;
    if let Some(speed) = cli.speed {
        config.itinerary.average_speed_kmh = speed;
        config.validate()?;
    }
    init_logging(&config, cli.verbose);
    debug!("Configuration: {:?}", config);

    let region = Region::resolve(&cli.region)?;
    let dataset = JsonDataset::load(&cli.dataset)
        .with_context(|| format!("Failed to load dataset {}", cli.dataset.display()))?;

    let planner = TravelPlanner::from_config(config)?;
    let report = planner.plan(&dataset, &region, usize::from(cli.days))?;

    if cli.json {
        let mut output = serde_json::to_value(&report)?;
        if cli.stats {
            let history = dataset.full_history()?;
            output["stats"] = serde_json::json!({
                "monthly": monthly_averages(&history, region.code),
                "highest_region": highest_region(&history),
            });
        }
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_report(&report, &region);
    if cli.stats {
        print_stats(&dataset, &region)?;
    }
    Ok(())
}

fn print_report(report: &PlanReport, region: &Region) {
    println!("### AQI Rankings for Places in {}:", region.name);
    for entry in &report.ranking {
        let aqi = entry
            .aqi
            .map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"));
        println!("Place Name: {} - AQI: {}", entry.station.name, aqi);
    }

    if !report.warnings.is_empty() {
        println!();
        println!("Stations without a forecast:");
        for warning in &report.warnings {
            println!("  - {warning}");
        }
    }

    println!();
    println!("### Optimized Travel Plan for {}:", region.name);
    for step in &report.itinerary.steps {
        println!("{}", step.describe());
    }
    println!(
        "Total: {:.2} km, {:.2} hours of travel",
        report.itinerary.total_distance_km(),
        report.itinerary.total_travel_hours()
    );
}

fn print_stats(dataset: &JsonDataset, region: &Region) -> Result<()> {
    let history = dataset.full_history()?;

    let monthly = monthly_averages(&history, region.code);
    println!();
    println!("### High AQI Months for State: {}", region.code);
    for month in &monthly.months {
        println!("{:<10} {:>8.2}", month_name(month.month), month.mean_aqi);
    }
    let peaks: Vec<&str> = monthly.peak_months.iter().map(|m| month_name(*m)).collect();
    if !peaks.is_empty() {
        println!("Highest: {}", peaks.join(", "));
    }

    if let Some(highest) = highest_region(&history) {
        let name = Region::from_code(&highest.region_code)
            .map_or(highest.region_code.as_str(), |r| r.name);
        println!();
        println!(
            "The state with the highest AQI is {} with an average AQI of {:.2}.",
            name, highest.mean_aqi
        );
    }
    Ok(())
}

fn month_name(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map_or("?", |m| m.name())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<PlannerError>() {
                Some(planner_error) => {
                    eprintln!("Error: {}", planner_error.user_message());
                    debug!("{} ({})", planner_error, planner_error.condition());
                }
                None => eprintln!("Error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}
