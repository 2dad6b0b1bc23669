use crate::error::LoadError;
use crate::types::{LoadReport, RawRow, TripRecord, TripTable, COMPLETED_STATUS, REQUIRED_COLUMNS};
use crate::util::{clean_text, parse_datetime_safe, parse_non_negative};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Read the bookings CSV at `path` into a [`TripTable`] of completed trips.
pub fn load(path: &Path) -> Result<TripTable, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_reader(file, path)
}

/// Same as [`load`] but from any reader; `origin` is only used in errors.
pub fn load_reader<R: Read>(reader: R, origin: &Path) -> Result<TripTable, LoadError> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers().map_err(|source| LoadError::Csv {
        path: origin.to_path_buf(),
        source,
    })?;
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns {
            path: origin.to_path_buf(),
            columns: missing,
        });
    }

    let mut report = LoadReport::default();
    let mut rows: Vec<TripRecord> = Vec::new();

    for result in rdr.deserialize::<RawRow>() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                debug!(line = report.total_rows, error = %e, "skipping unreadable record");
                report.malformed_rows += 1;
                continue;
            }
        };

        if row.booking_status.as_deref() != Some(COMPLETED_STATUS) {
            report.not_completed += 1;
            continue;
        }

        match clean_row(row) {
            Some(trip) => rows.push(trip),
            None => report.malformed_rows += 1,
        }
    }

    report.retained_rows = rows.len();
    debug!(
        not_completed = report.not_completed,
        malformed = report.malformed_rows,
        "dropped rows"
    );

    if rows.is_empty() {
        return Err(LoadError::NoCompletedTrips {
            path: origin.to_path_buf(),
        });
    }

    info!(
        source = %origin.display(),
        total = report.total_rows,
        retained = report.retained_rows,
        "loaded ride bookings"
    );
    Ok(TripTable::new(rows, report))
}

/// Turn a completed raw row into a typed record, or `None` if a required
/// field is unusable.
fn clean_row(row: RawRow) -> Option<TripRecord> {
    let booked_at = parse_datetime_safe(row.date.as_deref(), row.time.as_deref())?;
    let booking_value = parse_non_negative(row.booking_value.as_deref())?;
    let pickup = clean_text(row.pickup_location.as_deref())?;
    let dropoff = clean_text(row.drop_location.as_deref())?;
    let vehicle_type = clean_text(row.vehicle_type.as_deref())?;
    let payment_method = clean_text(row.payment_method.as_deref())?;

    let booking_id = row
        .booking_id
        .as_deref()
        .map(|id| id.replace('"', "").trim().to_string())
        .unwrap_or_default();

    Some(TripRecord {
        booking_id,
        booked_at,
        pickup,
        dropoff,
        vehicle_type,
        payment_method,
        booking_value,
        ride_distance: parse_non_negative(row.ride_distance.as_deref()),
        duration_min: parse_non_negative(row.avg_ctat.as_deref()),
    })
}
