// Parsing and formatting helpers.
//
// Everything that touches raw CSV text or human-facing number strings lives
// here so the loader and the reports can work with typed values only.
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use num_format::{Locale, ToFormattedString};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%m/%d/%Y"];
const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M"];

/// Numeric cell from the bookings export (`Booking Value`, `Ride Distance`,
/// `Avg CTAT`). Thousands separators are dropped and scientific notation is
/// accepted. Blank cells, the export's `null` marker and non-finite values
/// (`NaN`, `inf`) give `None`.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() || is_null_marker(s) {
        return None;
    }
    s.replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Like [`parse_f64_safe`] but also rejects negative amounts.
pub fn parse_non_negative(s: Option<&str>) -> Option<f64> {
    parse_f64_safe(s).filter(|v| *v >= 0.0)
}

pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Combine the separate date and time cells into one timestamp.
///
/// A blank time means midnight. A date cell that already carries a time
/// (`2024-03-23 12:29:38`) is accepted when the time cell is blank. Anything
/// unparseable yields `None`.
pub fn parse_datetime_safe(date: Option<&str>, time: Option<&str>) -> Option<NaiveDateTime> {
    let date = date?.trim();
    let time = time.map(str::trim).unwrap_or("");

    if time.is_empty() {
        if let Some((d, t)) = date.split_once(' ') {
            let day = parse_date_safe(Some(d))?;
            return parse_time_safe(t).map(|t| day.and_time(t));
        }
        return parse_date_safe(Some(date)).map(|d| d.and_time(NaiveTime::MIN));
    }

    let day = parse_date_safe(Some(date))?;
    parse_time_safe(time).map(|t| day.and_time(t))
}

fn parse_time_safe(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
}

/// The export writes missing cells as `null`.
fn is_null_marker(s: &str) -> bool {
    s.eq_ignore_ascii_case("null")
}

/// Trimmed categorical value, or `None` when the cell is missing, blank or
/// `null`.
pub fn clean_text(s: Option<&str>) -> Option<String> {
    let s = s?.trim();
    if s.is_empty() || is_null_marker(s) {
        None
    } else {
        Some(s.to_string())
    }
}

pub fn mean(v: &[f64]) -> f64 {
    // Returns 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

/// Amount or distance for the dashboard: `decimals` places with `en`
/// digit grouping (`2,437,812.40`). A value that rounds to zero has no sign.
pub fn format_number(n: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, n.abs());
    let (whole, frac) = match fixed.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (fixed.as_str(), None),
    };
    let grouped = whole
        .parse::<u64>()
        .map(|w| w.to_formatted_string(&Locale::en))
        .unwrap_or_else(|_| whole.to_string());
    let rounds_to_zero = fixed.bytes().all(|b| b == b'0' || b == b'.');
    let sign = if n < 0.0 && !rounds_to_zero { "-" } else { "" };
    match frac {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Booking counts and row totals (`93,000`).
pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// Rupee amount for the KPI strip: `₹1.23M` from one million up,
/// `₹12,345` below.
pub fn format_currency_compact(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("₹{:.2}M", value / 1_000_000.0)
    } else {
        format!("₹{}", format_number(value, 0))
    }
}

pub fn format_currency(value: f64) -> String {
    format!("₹{}", format_number(value, 0))
}
