use crate::filter::{self, FilterSelection};
use crate::reports;
use crate::types::{AggregateResults, TripTable};
use tracing::debug;

/// Filter `table` by `selection` and compute every dashboard table.
///
/// Never fails: an empty filtered set (including an inverted date range)
/// yields zero KPIs and empty tables.
pub fn aggregate(table: &TripTable, selection: &FilterSelection) -> AggregateResults {
    let rows = filter::apply(table, selection);
    debug!(
        matched = rows.len(),
        of = table.len(),
        start = %selection.dates.start,
        end = %selection.dates.end,
        "filtered trips"
    );

    AggregateResults {
        kpis: reports::kpis(&rows),
        payment_breakdown: reports::payment_breakdown(&rows),
        vehicle_breakdown: reports::vehicle_breakdown(&rows),
        daily_totals: reports::daily_totals(&rows),
        top_pickups: reports::top_pickups(&rows),
        top_dropoffs: reports::top_dropoffs(&rows),
        vehicle_summary: reports::vehicle_summary(&rows),
        info: reports::data_info(&rows),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::DateRange;
    use crate::reports::TOP_LOCATIONS;
    use crate::types::{CategoryTotal, TripRecord, VehicleSummaryRow};
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn trip(d: &str, pickup: &str, vehicle: &str, value: f64) -> TripRecord {
        TripRecord {
            booking_id: String::new(),
            booked_at: date(d).and_hms_opt(10, 30, 0).unwrap(),
            pickup: pickup.to_string(),
            dropoff: "Z".to_string(),
            vehicle_type: vehicle.to_string(),
            payment_method: (if value > 60.0 { "Card" } else { "Cash" }).to_string(),
            booking_value: value,
            ride_distance: Some(value / 10.0),
            duration_min: Some(20.0),
        }
    }

    fn three_rows() -> TripTable {
        TripTable::from_records(vec![
            trip("2024-01-01", "A", "Car", 100.0),
            trip("2024-01-01", "B", "Bike", 50.0),
            trip("2024-01-02", "A", "Car", 30.0),
        ])
    }

    fn cat(category: &str, value: f64) -> CategoryTotal {
        CategoryTotal {
            category: category.to_string(),
            value,
        }
    }

    fn larger_table() -> TripTable {
        let pickups = [
            "Saket", "Dwarka", "Rohini", "Noida", "Gurgaon", "Karol Bagh", "Lajpat", "Okhla",
            "Janakpuri", "Pitampura", "Vasant Kunj", "Chanakyapuri",
        ];
        let vehicles = ["Auto", "Bike", "Go Mini", "Go Sedan", "eBike"];
        let mut rows = Vec::new();
        for i in 0..90usize {
            let day = format!("2024-02-{:02}", 1 + (i * 7) % 28);
            let mut t = trip(
                &day,
                pickups[i % pickups.len()],
                vehicles[(i * 3) % vehicles.len()],
                (50 + (i * 37) % 400) as f64,
            );
            t.dropoff = pickups[(i * 5) % pickups.len()].to_string();
            rows.push(t);
        }
        TripTable::from_records(rows)
    }

    fn assert_consistent(res: &AggregateResults) {
        let k = &res.kpis;
        let summary_count: usize = res.vehicle_summary.iter().map(|r| r.bookings).sum();
        assert_eq!(summary_count, k.total_bookings);

        let pay: f64 = res.payment_breakdown.iter().map(|c| c.value).sum();
        let veh: f64 = res.vehicle_breakdown.iter().map(|c| c.value).sum();
        let daily: f64 = res.daily_totals.iter().map(|d| d.value).sum();
        assert!((pay - k.total_value).abs() < 1e-6);
        assert!((veh - k.total_value).abs() < 1e-6);
        assert!((daily - k.total_value).abs() < 1e-6);

        for w in res.daily_totals.windows(2) {
            assert!(w[0].date < w[1].date);
        }
        for ranking in [&res.top_pickups, &res.top_dropoffs] {
            assert!(ranking.len() <= TOP_LOCATIONS);
            for w in ranking.windows(2) {
                assert!(w[0].value >= w[1].value);
            }
            for c in ranking {
                assert!(c.value <= k.total_value + 1e-6);
            }
        }
    }

    #[test]
    fn test_three_row_scenario_unfiltered() {
        let table = three_rows();
        let res = aggregate(&table, &FilterSelection::for_table(&table));

        assert_eq!(res.kpis.total_bookings, 3);
        assert_eq!(res.kpis.total_value, 180.0);
        assert_eq!(res.kpis.avg_value, 60.0);
        assert_eq!(res.daily_totals.len(), 2);
        assert_eq!(res.daily_totals[0].date, date("2024-01-01"));
        assert_eq!(res.daily_totals[0].value, 150.0);
        assert_eq!(res.daily_totals[1].date, date("2024-01-02"));
        assert_eq!(res.daily_totals[1].value, 30.0);
        assert_eq!(res.top_pickups, vec![cat("A", 130.0), cat("B", 50.0)]);
        assert_eq!(
            res.vehicle_summary,
            vec![
                VehicleSummaryRow {
                    vehicle_type: "Car".into(),
                    bookings: 2,
                    total_value: 130.0,
                    avg_value: 65.0,
                },
                VehicleSummaryRow {
                    vehicle_type: "Bike".into(),
                    bookings: 1,
                    total_value: 50.0,
                    avg_value: 50.0,
                },
            ]
        );
        assert_consistent(&res);
    }

    #[test]
    fn test_three_row_scenario_bike_only() {
        let table = three_rows();
        let sel = FilterSelection::for_table(&table).with_vehicle_types(["Bike"]);
        let res = aggregate(&table, &sel);

        assert_eq!(res.kpis.total_bookings, 1);
        assert_eq!(res.kpis.total_value, 50.0);
        assert_eq!(res.top_pickups, vec![cat("B", 50.0)]);
        assert_eq!(
            res.vehicle_summary,
            vec![VehicleSummaryRow {
                vehicle_type: "Bike".into(),
                bookings: 1,
                total_value: 50.0,
                avg_value: 50.0,
            }]
        );
        assert_consistent(&res);
    }

    #[test]
    fn test_empty_selection_is_well_defined() {
        let table = three_rows();
        let sel = FilterSelection::for_table(&table).with_pickups(["Nowhere"]);
        let res = aggregate(&table, &sel);

        assert!(res.is_empty());
        assert_eq!(res.kpis.total_bookings, 0);
        assert_eq!(res.kpis.avg_value, 0.0);
        assert_eq!(res.kpis.avg_duration, 0.0);
        assert!(res.payment_breakdown.is_empty());
        assert!(res.vehicle_breakdown.is_empty());
        assert!(res.daily_totals.is_empty());
        assert!(res.top_pickups.is_empty());
        assert!(res.top_dropoffs.is_empty());
        assert!(res.vehicle_summary.is_empty());
        assert_eq!(res.info.first_date, None);
    }

    #[test]
    fn test_inverted_date_range_is_empty_not_error() {
        let table = three_rows();
        let sel = FilterSelection::new(DateRange::new(date("2024-01-02"), date("2024-01-01")));
        let res = aggregate(&table, &sel);
        assert!(res.is_empty());
        assert_consistent(&res);
    }

    #[test]
    fn test_properties_hold_across_selections() {
        let table = larger_table();
        let base = FilterSelection::for_table(&table);
        let selections = vec![
            base.clone(),
            base.clone().with_vehicle_types(["Auto"]),
            base.clone().with_pickups(["Saket", "Noida", "Okhla"]),
            base.clone().with_dropoffs(["Rohini"]).with_vehicle_types(["Bike", "eBike"]),
            FilterSelection::new(DateRange::new(date("2024-02-05"), date("2024-02-12"))),
        ];
        for sel in &selections {
            assert_consistent(&aggregate(&table, sel));
        }
        let all = aggregate(&table, &base);
        assert_eq!(all.top_pickups.len(), TOP_LOCATIONS);
    }

    #[test]
    fn test_widening_never_shrinks_totals() {
        let table = larger_table();
        let base = FilterSelection::for_table(&table);
        let mut accepted: Vec<&str> = Vec::new();
        let mut prev = (0usize, 0.0f64);
        for v in ["Auto", "Bike", "Go Mini", "Go Sedan", "eBike"] {
            accepted.push(v);
            let res = aggregate(&table, &base.clone().with_vehicle_types(accepted.clone()));
            assert!(res.kpis.total_bookings >= prev.0);
            assert!(res.kpis.total_value >= prev.1);
            prev = (res.kpis.total_bookings, res.kpis.total_value);
        }
        let unrestricted = aggregate(&table, &base);
        assert_eq!(unrestricted.kpis.total_bookings, prev.0);
    }

    #[test]
    fn test_pipeline_is_repeatable() {
        let table = larger_table();
        let sel = FilterSelection::for_table(&table).with_pickups(["Dwarka", "Lajpat"]);
        assert_eq!(aggregate(&table, &sel), aggregate(&table, &sel));
    }
}
