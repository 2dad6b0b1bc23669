use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tabled::Tabled;

/// One CSV row as it comes off the reader. Every field is optional text so a
/// malformed cell never aborts the whole load; `loader` decides what survives.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "Date", default)]
    pub date: Option<String>,
    #[serde(rename = "Time", default)]
    pub time: Option<String>,
    #[serde(rename = "Booking ID", default)]
    pub booking_id: Option<String>,
    #[serde(rename = "Booking Status", default)]
    pub booking_status: Option<String>,
    #[serde(rename = "Vehicle Type", default)]
    pub vehicle_type: Option<String>,
    #[serde(rename = "Pickup Location", default)]
    pub pickup_location: Option<String>,
    #[serde(rename = "Drop Location", default)]
    pub drop_location: Option<String>,
    #[serde(rename = "Avg CTAT", default)]
    pub avg_ctat: Option<String>,
    #[serde(rename = "Booking Value", default)]
    pub booking_value: Option<String>,
    #[serde(rename = "Ride Distance", default)]
    pub ride_distance: Option<String>,
    #[serde(rename = "Payment Method", default)]
    pub payment_method: Option<String>,
}

/// Header names the loader refuses to run without.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "Date",
    "Time",
    "Booking Status",
    "Pickup Location",
    "Drop Location",
    "Vehicle Type",
    "Payment Method",
    "Booking Value",
    "Ride Distance",
    "Avg CTAT",
];

/// Status value that marks a finished ride.
pub const COMPLETED_STATUS: &str = "Completed";

/// A completed trip with typed fields.
#[derive(Debug, Clone, PartialEq)]
pub struct TripRecord {
    pub booking_id: String,
    pub booked_at: NaiveDateTime,
    pub pickup: String,
    pub dropoff: String,
    pub vehicle_type: String,
    pub payment_method: String,
    pub booking_value: f64,
    /// Kilometers. `None` when the source cell was blank or unusable.
    pub ride_distance: Option<f64>,
    /// Minutes. `None` when the source cell was blank or unusable.
    pub duration_min: Option<f64>,
}

impl TripRecord {
    pub fn date(&self) -> NaiveDate {
        self.booked_at.date()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub total_rows: usize,
    pub retained_rows: usize,
    pub not_completed: usize,
    pub malformed_rows: usize,
}

/// The loaded working set. Immutable once built; the pipeline only borrows it.
#[derive(Debug, Clone)]
pub struct TripTable {
    rows: Vec<TripRecord>,
    report: LoadReport,
}

impl TripTable {
    pub fn new(rows: Vec<TripRecord>, report: LoadReport) -> Self {
        Self { rows, report }
    }

    /// Build a table straight from records, e.g. for tests or other sources.
    pub fn from_records(rows: Vec<TripRecord>) -> Self {
        let report = LoadReport {
            total_rows: rows.len(),
            retained_rows: rows.len(),
            ..LoadReport::default()
        };
        Self { rows, report }
    }

    pub fn rows(&self) -> &[TripRecord] {
        &self.rows
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Earliest and latest booking date, or `None` for an empty table.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.rows.iter().map(TripRecord::date);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }

    /// Sorted distinct values for each picker plus the date span.
    pub fn filter_options(&self) -> FilterOptions {
        let mut opts = FilterOptions {
            date_bounds: self.date_bounds(),
            ..FilterOptions::default()
        };
        for r in &self.rows {
            opts.pickups.insert(r.pickup.clone());
            opts.dropoffs.insert(r.dropoff.clone());
            opts.vehicle_types.insert(r.vehicle_type.clone());
        }
        opts
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub date_bounds: Option<(NaiveDate, NaiveDate)>,
    pub pickups: BTreeSet<String>,
    pub dropoffs: BTreeSet<String>,
    pub vehicle_types: BTreeSet<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Kpis {
    pub total_bookings: usize,
    pub total_value: f64,
    pub avg_value: f64,
    pub total_distance: f64,
    pub avg_duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleSummaryRow {
    pub vehicle_type: String,
    pub bookings: usize,
    pub total_value: f64,
    pub avg_value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DataInfo {
    pub records: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub vehicle_types: usize,
    pub pickup_locations: usize,
}

/// Everything one render of the dashboard needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateResults {
    pub kpis: Kpis,
    pub payment_breakdown: Vec<CategoryTotal>,
    pub vehicle_breakdown: Vec<CategoryTotal>,
    pub daily_totals: Vec<DailyTotal>,
    pub top_pickups: Vec<CategoryTotal>,
    pub top_dropoffs: Vec<CategoryTotal>,
    pub vehicle_summary: Vec<VehicleSummaryRow>,
    pub info: DataInfo,
}

impl AggregateResults {
    pub fn is_empty(&self) -> bool {
        self.kpis.total_bookings == 0
    }
}

// Display rows: pre-formatted strings for the terminal tables.

#[derive(Debug, Tabled, Clone)]
pub struct CategoryDisplayRow {
    #[tabled(rename = "Category")]
    pub category: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Share")]
    pub share: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct DailyDisplayRow {
    #[tabled(rename = "Date")]
    pub date: String,
    #[tabled(rename = "TotalBookingValue")]
    pub value: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct RankingDisplayRow {
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[tabled(rename = "Location")]
    pub location: String,
    #[tabled(rename = "Revenue")]
    pub value: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct VehicleDisplayRow {
    #[tabled(rename = "VehicleType")]
    pub vehicle_type: String,
    #[tabled(rename = "TotalBookings")]
    pub bookings: String,
    #[tabled(rename = "TotalValue")]
    pub total_value: String,
    #[tabled(rename = "AverageFare")]
    pub avg_value: String,
}
