use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::types::{TripRecord, TripTable};

/// Inclusive calendar range. `start > end` is allowed and matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn is_valid(&self) -> bool {
        self.start <= self.end
    }
}

/// What the user currently has selected in the dashboard controls.
///
/// Each set holds the accepted values for one column. An empty set means the
/// column is not restricted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSelection {
    pub dates: DateRange,
    pub pickups: BTreeSet<String>,
    pub dropoffs: BTreeSet<String>,
    pub vehicle_types: BTreeSet<String>,
}

impl FilterSelection {
    pub fn new(dates: DateRange) -> Self {
        Self {
            dates,
            pickups: BTreeSet::new(),
            dropoffs: BTreeSet::new(),
            vehicle_types: BTreeSet::new(),
        }
    }

    /// Default selection for a table: its full date span, nothing else
    /// restricted. An empty table gets an inverted range so nothing matches.
    pub fn for_table(table: &TripTable) -> Self {
        let dates = match table.date_bounds() {
            Some((lo, hi)) => DateRange::new(lo, hi),
            None => DateRange::new(NaiveDate::MAX, NaiveDate::MIN),
        };
        Self::new(dates)
    }

    pub fn with_pickups<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pickups = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_dropoffs<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dropoffs = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_vehicle_types<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vehicle_types = values.into_iter().map(Into::into).collect();
        self
    }

    /// True when `trip` passes every active condition.
    pub fn matches(&self, trip: &TripRecord) -> bool {
        self.dates.contains(trip.date())
            && accepts(&self.pickups, &trip.pickup)
            && accepts(&self.dropoffs, &trip.dropoff)
            && accepts(&self.vehicle_types, &trip.vehicle_type)
    }
}

fn accepts(selected: &BTreeSet<String>, value: &str) -> bool {
    selected.is_empty() || selected.contains(value)
}

/// Rows of `table` that pass the selection, in table order.
pub fn apply<'a>(table: &'a TripTable, selection: &FilterSelection) -> Vec<&'a TripRecord> {
    if !selection.dates.is_valid() {
        return Vec::new();
    }
    table
        .rows()
        .iter()
        .filter(|trip| selection.matches(trip))
        .collect()
}
