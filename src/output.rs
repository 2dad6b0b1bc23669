use crate::filter::FilterSelection;
use crate::types::{
    AggregateResults, CategoryDisplayRow, CategoryTotal, DailyDisplayRow, FilterOptions, Kpis,
    RankingDisplayRow, VehicleDisplayRow, VehicleSummaryRow,
};
use crate::util::{format_currency, format_currency_compact, format_int, format_number};
use serde::Serialize;
use std::collections::BTreeSet;
use tabled::{settings::Style, Table, Tabled};

pub const NO_DATA_MESSAGE: &str = "No data matches the selected filters.";

pub fn kpi_lines(k: &Kpis) -> Vec<(&'static str, String)> {
    vec![
        ("Total Bookings", format_int(k.total_bookings)),
        ("Total Booking Value", format_currency_compact(k.total_value)),
        ("Avg Booking Value", format!("₹{:.0}", k.avg_value)),
        ("Total Distance", format!("{} km", format_number(k.total_distance, 0))),
        ("Avg Duration", format!("{:.1} min", k.avg_duration)),
    ]
}

/// Donut-chart rows: value plus its share of the whole.
pub fn category_rows(totals: &[CategoryTotal]) -> Vec<CategoryDisplayRow> {
    let sum: f64 = totals.iter().map(|c| c.value).sum();
    totals
        .iter()
        .map(|c| CategoryDisplayRow {
            category: c.category.clone(),
            value: format_currency(c.value),
            share: if sum > 0.0 {
                format!("{:.1}%", c.value / sum * 100.0)
            } else {
                "0.0%".to_string()
            },
        })
        .collect()
}

pub fn ranking_rows(totals: &[CategoryTotal]) -> Vec<RankingDisplayRow> {
    totals
        .iter()
        .enumerate()
        .map(|(idx, c)| RankingDisplayRow {
            rank: idx + 1,
            location: c.category.clone(),
            value: format_currency(c.value),
        })
        .collect()
}

pub fn vehicle_rows(summary: &[VehicleSummaryRow]) -> Vec<VehicleDisplayRow> {
    summary
        .iter()
        .map(|r| VehicleDisplayRow {
            vehicle_type: r.vehicle_type.clone(),
            bookings: format_int(r.bookings),
            total_value: format_currency(r.total_value),
            avg_value: format!("₹{:.0}", r.avg_value),
        })
        .collect()
}

/// Markdown table for one dashboard panel, or a `(no rows)` marker so an
/// empty breakdown still shows up under its heading.
pub fn render_panel<T: Tabled>(rows: &[T]) -> String {
    if rows.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(rows).with(Style::markdown()).to_string()
}

fn print_panel<T: Tabled>(title: &str, rows: &[T]) {
    section(title);
    println!("{}\n", render_panel(rows));
}

fn section(title: &str) {
    println!("## {}\n", title);
}

/// Render one full dashboard pass to stdout.
pub fn print_dashboard(results: &AggregateResults) {
    if results.is_empty() {
        println!("{}\n", NO_DATA_MESSAGE);
        return;
    }

    section("Key Performance Indicators");
    for (label, value) in kpi_lines(&results.kpis) {
        println!("{:<20} {}", label, value);
    }
    println!();

    print_panel(
        "Revenue by Payment Type",
        &category_rows(&results.payment_breakdown),
    );
    print_panel(
        "Revenue by Vehicle Type",
        &category_rows(&results.vehicle_breakdown),
    );

    let daily: Vec<DailyDisplayRow> = results
        .daily_totals
        .iter()
        .map(|d| DailyDisplayRow {
            date: d.date.to_string(),
            value: format_currency(d.value),
        })
        .collect();
    print_panel("Total Booking Value Over Time", &daily);

    print_panel(
        "Top 10 Revenue by Pickup Location",
        &ranking_rows(&results.top_pickups),
    );
    print_panel(
        "Top 10 Revenue by Dropoff Location",
        &ranking_rows(&results.top_dropoffs),
    );
    print_panel(
        "Vehicle Summary",
        &vehicle_rows(&results.vehicle_summary),
    );

    let info = &results.info;
    section("Data Info");
    println!("Total Records:    {}", format_int(info.records));
    if let (Some(first), Some(last)) = (info.first_date, info.last_date) {
        println!("Date Range:       {} to {}", first, last);
    }
    println!("Vehicle Types:    {}", info.vehicle_types);
    println!("Pickup Locations: {}\n", info.pickup_locations);
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn join_or_all(values: &BTreeSet<String>) -> String {
    if values.is_empty() {
        "All".to_string()
    } else {
        values.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}

pub fn print_selection(sel: &FilterSelection) {
    println!(
        "Filters: {} to {} | pickup: {} | dropoff: {} | vehicle: {}\n",
        sel.dates.start,
        sel.dates.end,
        join_or_all(&sel.pickups),
        join_or_all(&sel.dropoffs),
        join_or_all(&sel.vehicle_types)
    );
}

pub fn print_filter_options(opts: &FilterOptions) {
    if let Some((lo, hi)) = opts.date_bounds {
        println!("Dates: {} to {}", lo, hi);
    }
    println!("Pickup locations ({}): {}", opts.pickups.len(), join_or_all(&opts.pickups));
    println!("Dropoff locations ({}): {}", opts.dropoffs.len(), join_or_all(&opts.dropoffs));
    println!(
        "Vehicle types ({}): {}\n",
        opts.vehicle_types.len(),
        join_or_all(&opts.vehicle_types)
    );
}
