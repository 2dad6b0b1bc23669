//! Terminal front end for the ride-bookings dashboard.
//!
//! One-shot mode renders the dashboard for the filters given on the command
//! line. `--interactive` keeps the session open: every filter edit from the
//! menu is followed by a fresh render.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use ride_dashboard::output;
use ride_dashboard::{AggregateResults, Dashboard, DateRange, FilterSelection};
use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "ride_dashboard")]
#[command(about = "KPIs and breakdowns over completed ride bookings", long_about = None)]
struct Cli {
    /// Bookings CSV to load
    #[arg(long, env = "RIDE_DASHBOARD_DATA", default_value = "data/ncr_ride_bookings.csv")]
    data: PathBuf,

    /// First booking date to include (YYYY-MM-DD); defaults to the earliest date
    #[arg(long, value_name = "DATE")]
    from: Option<NaiveDate>,

    /// Last booking date to include (YYYY-MM-DD); defaults to the latest date
    #[arg(long, value_name = "DATE")]
    to: Option<NaiveDate>,

    /// Accepted pickup location (repeatable)
    #[arg(long = "pickup", value_name = "NAME")]
    pickups: Vec<String>,

    /// Accepted dropoff location (repeatable)
    #[arg(long = "dropoff", value_name = "NAME")]
    dropoffs: Vec<String>,

    /// Accepted vehicle type (repeatable)
    #[arg(long = "vehicle", value_name = "NAME")]
    vehicles: Vec<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Edit filters from a menu and re-render after each change
    #[arg(short, long, default_value_t = false)]
    interactive: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(filter),
        )
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let dashboard = Dashboard::new(&cli.data);
    let table = dashboard
        .table()
        .with_context(|| format!("loading bookings from {}", cli.data.display()))?;
    let report = table.report();
    info!(
        rows = report.total_rows,
        completed = report.retained_rows,
        skipped = report.malformed_rows,
        "dataset ready"
    );

    let mut selection = dashboard.default_selection()?;
    if let Some(from) = cli.from {
        selection.dates.start = from;
    }
    if let Some(to) = cli.to {
        selection.dates.end = to;
    }
    selection.pickups = accepted_set(&cli.pickups);
    selection.dropoffs = accepted_set(&cli.dropoffs);
    selection.vehicle_types = accepted_set(&cli.vehicles);

    if cli.interactive {
        run_menu(&dashboard, selection, cli.format)
    } else {
        render(&dashboard, &selection, cli.format)
    }
}

/// One "filter changed" event: recompute everything and draw it.
fn render(dashboard: &Dashboard, selection: &FilterSelection, format: OutputFormat) -> Result<()> {
    let results: AggregateResults = dashboard.refresh(selection)?;
    if results.is_empty() {
        warn!("selection matched no trips");
    }
    match format {
        OutputFormat::Json => output::print_json(&results)?,
        OutputFormat::Table => {
            output::print_selection(selection);
            output::print_dashboard(&results);
        }
    }
    Ok(())
}

/// Print `prompt` and read one trimmed line. `None` on end of input.
fn read_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Picker values as an accepted set. `All` anywhere in the list, or no
/// values at all, means the column is unrestricted.
fn accepted_set<I, S>(values: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut set = BTreeSet::new();
    for v in values {
        let v = v.as_ref().trim();
        if v.eq_ignore_ascii_case("all") {
            return BTreeSet::new();
        }
        if !v.is_empty() {
            set.insert(v.to_string());
        }
    }
    set
}

/// Comma-separated names from the menu prompt.
fn parse_set(input: &str) -> BTreeSet<String> {
    accepted_set(input.split(','))
}

fn prompt_date(label: &str, current: NaiveDate) -> Option<NaiveDate> {
    loop {
        let input = read_line(&format!("{} (YYYY-MM-DD, blank keeps {}): ", label, current))?;
        if input.is_empty() {
            return Some(current);
        }
        match NaiveDate::parse_from_str(&input, "%Y-%m-%d") {
            Ok(d) => return Some(d),
            Err(_) => println!("Invalid date. Please use YYYY-MM-DD."),
        }
    }
}

fn print_menu() {
    println!("Dashboard Filters:");
    println!("[1] Set date range");
    println!("[2] Set pickup locations");
    println!("[3] Set dropoff locations");
    println!("[4] Set vehicle types");
    println!("[5] Clear filters");
    println!("[6] Show dashboard");
    println!("[7] List filter options");
    println!("[0] Exit\n");
}

fn run_menu(dashboard: &Dashboard, mut selection: FilterSelection, format: OutputFormat) -> Result<()> {
    render(dashboard, &selection, format)?;
    loop {
        print_menu();
        let Some(choice) = read_line("Enter choice: ") else {
            break;
        };
        let changed = match choice.as_str() {
            "1" => {
                let Some(start) = prompt_date("Start date", selection.dates.start) else {
                    break;
                };
                let Some(end) = prompt_date("End date", selection.dates.end) else {
                    break;
                };
                selection.dates = DateRange::new(start, end);
                if !selection.dates.is_valid() {
                    println!("Start date is after end date; nothing will match.");
                }
                true
            }
            "2" | "3" | "4" => {
                let Some(input) = read_line("Comma-separated values (blank = All): ") else {
                    break;
                };
                let values = parse_set(&input);
                match choice.as_str() {
                    "2" => selection.pickups = values,
                    "3" => selection.dropoffs = values,
                    _ => selection.vehicle_types = values,
                }
                true
            }
            "5" => {
                selection = dashboard.default_selection()?;
                true
            }
            "6" => true,
            "7" => {
                output::print_filter_options(&dashboard.filter_options()?);
                false
            }
            "0" => break,
            _ => {
                println!("Invalid choice. Please enter 0-7.\n");
                false
            }
        };
        if changed {
            render(dashboard, &selection, format)?;
        }
    }
    println!("Exiting the program.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_set() {
        let got = parse_set(" Saket , Dwarka,,");
        assert_eq!(got.into_iter().collect::<Vec<_>>(), vec!["Dwarka", "Saket"]);
        assert!(parse_set("").is_empty());
        assert!(parse_set("ALL").is_empty());
    }

    #[test]
    fn test_all_anywhere_clears_restriction() {
        assert!(parse_set("Saket, All").is_empty());
        assert!(accepted_set(["Auto", "all"]).is_empty());
        assert_eq!(
            accepted_set(["Auto", " Bike "]).into_iter().collect::<Vec<_>>(),
            vec!["Auto", "Bike"]
        );
    }

    #[test]
    fn test_cli_vehicle_all_is_unrestricted() {
        let cli = Cli::parse_from(["ride_dashboard", "--vehicle", "All", "--pickup", "Saket"]);
        assert!(accepted_set(&cli.vehicles).is_empty());
        assert_eq!(accepted_set(&cli.pickups).len(), 1);
    }

    #[test]
    fn test_cli_parses_repeated_filters() {
        let cli = Cli::parse_from([
            "ride_dashboard",
            "--data",
            "x.csv",
            "--from",
            "2024-01-01",
            "--vehicle",
            "Auto",
            "--vehicle",
            "Bike",
            "--format",
            "json",
        ]);
        assert_eq!(cli.data, PathBuf::from("x.csv"));
        assert_eq!(cli.from, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(cli.vehicles, vec!["Auto", "Bike"]);
        assert!(matches!(cli.format, OutputFormat::Json));
        assert!(!cli.interactive);
    }
}
