use crate::types::{CategoryTotal, DailyTotal, DataInfo, Kpis, TripRecord, VehicleSummaryRow};
use crate::util::mean;
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;

/// Number of locations kept in each ranking.
pub const TOP_LOCATIONS: usize = 10;

pub fn kpis(data: &[&TripRecord]) -> Kpis {
    let values: Vec<f64> = data.iter().map(|r| r.booking_value).collect();
    let durations: Vec<f64> = data.iter().filter_map(|r| r.duration_min).collect();
    let total_value: f64 = values.iter().sum();
    Kpis {
        total_bookings: data.len(),
        total_value,
        avg_value: mean(&values),
        total_distance: data.iter().filter_map(|r| r.ride_distance).sum(),
        avg_duration: mean(&durations),
    }
}

/// Group rows by `key` and accumulate into `A`, keeping groups in the order
/// their key was first seen.
fn group_by<'a, K, A, F, G>(data: &[&'a TripRecord], key: F, mut fold: G) -> Vec<(K, A)>
where
    K: Eq + Hash + Clone,
    A: Default,
    F: Fn(&'a TripRecord) -> K,
    G: FnMut(&mut A, &'a TripRecord),
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, A)> = Vec::new();
    for &r in data {
        let k = key(r);
        let slot = *index.entry(k.clone()).or_insert_with(|| {
            groups.push((k, A::default()));
            groups.len() - 1
        });
        fold(&mut groups[slot].1, r);
    }
    groups
}

/// Sum of booking value per category, in first-seen order.
pub fn breakdown<'a, F>(data: &[&'a TripRecord], category: F) -> Vec<CategoryTotal>
where
    F: Fn(&'a TripRecord) -> &'a str,
{
    group_by(data, category, |sum: &mut f64, r| *sum += r.booking_value)
        .into_iter()
        .map(|(category, value)| CategoryTotal {
            category: category.to_string(),
            value,
        })
        .collect()
}

pub fn payment_breakdown(data: &[&TripRecord]) -> Vec<CategoryTotal> {
    breakdown(data, |r| r.payment_method.as_str())
}

pub fn vehicle_breakdown(data: &[&TripRecord]) -> Vec<CategoryTotal> {
    breakdown(data, |r| r.vehicle_type.as_str())
}

/// Booking value per calendar day, ascending. Days without rows are absent.
pub fn daily_totals(data: &[&TripRecord]) -> Vec<DailyTotal> {
    let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for r in data {
        *by_day.entry(r.date()).or_insert(0.0) += r.booking_value;
    }
    by_day
        .into_iter()
        .map(|(date, value)| DailyTotal { date, value })
        .collect()
}

/// The `limit` highest-value categories, descending. `sort_by` is stable, so
/// equal values keep their first-seen order.
pub fn top_n<'a, F>(data: &[&'a TripRecord], category: F, limit: usize) -> Vec<CategoryTotal>
where
    F: Fn(&'a TripRecord) -> &'a str,
{
    let mut totals = breakdown(data, category);
    totals.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));
    totals.truncate(limit);
    totals
}

pub fn top_pickups(data: &[&TripRecord]) -> Vec<CategoryTotal> {
    top_n(data, |r| r.pickup.as_str(), TOP_LOCATIONS)
}

pub fn top_dropoffs(data: &[&TripRecord]) -> Vec<CategoryTotal> {
    top_n(data, |r| r.dropoff.as_str(), TOP_LOCATIONS)
}

/// Count, total and mean booking value per vehicle type, ordered by total
/// value descending.
pub fn vehicle_summary(data: &[&TripRecord]) -> Vec<VehicleSummaryRow> {
    #[derive(Default)]
    struct Acc {
        bookings: usize,
        total: f64,
    }
    let mut rows: Vec<VehicleSummaryRow> = group_by(
        data,
        |r| r.vehicle_type.as_str(),
        |acc: &mut Acc, r| {
            acc.bookings += 1;
            acc.total += r.booking_value;
        },
    )
    .into_iter()
    .map(|(vehicle_type, acc)| VehicleSummaryRow {
        vehicle_type: vehicle_type.to_string(),
        bookings: acc.bookings,
        total_value: acc.total,
        // A group always holds at least one row.
        avg_value: acc.total / acc.bookings as f64,
    })
    .collect();
    rows.sort_by(|a, b| {
        b.total_value
            .partial_cmp(&a.total_value)
            .unwrap_or(Ordering::Equal)
    });
    rows
}

pub fn data_info(data: &[&TripRecord]) -> DataInfo {
    let vehicles: HashSet<&str> = data.iter().map(|r| r.vehicle_type.as_str()).collect();
    let pickups: HashSet<&str> = data.iter().map(|r| r.pickup.as_str()).collect();
    DataInfo {
        records: data.len(),
        first_date: data.iter().map(|r| r.date()).min(),
        last_date: data.iter().map(|r| r.date()).max(),
        vehicle_types: vehicles.len(),
        pickup_locations: pickups.len(),
    }
}
