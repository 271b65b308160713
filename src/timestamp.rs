// ⏱️ Timestamp Unit Resolver
// Vendor exports store stay dates as epoch numbers in unknown units, or as text.
// One unit is chosen per column from its largest value, then every cell converts.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

const NANOS_THRESHOLD: f64 = 1e15;
const MILLIS_THRESHOLD: f64 = 1e12;
const SECONDS_THRESHOLD: f64 = 1e10;

/// How a date column was interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampUnit {
    Nanoseconds,
    Milliseconds,
    Seconds,
    /// Values are calendar text (or too small to be an epoch)
    Text,
}

impl TimestampUnit {
    /// Pick the unit from the column's maximum numeric value
    pub fn from_max(max: Option<f64>) -> Self {
        match max {
            Some(m) if m > NANOS_THRESHOLD => TimestampUnit::Nanoseconds,
            Some(m) if m > MILLIS_THRESHOLD => TimestampUnit::Milliseconds,
            Some(m) if m > SECONDS_THRESHOLD => TimestampUnit::Seconds,
            _ => TimestampUnit::Text,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TimestampUnit::Nanoseconds => "ns",
            TimestampUnit::Milliseconds => "ms",
            TimestampUnit::Seconds => "s",
            TimestampUnit::Text => "text",
        }
    }

    /// Convert one epoch value in this unit to a UTC calendar date
    ///
    /// Each unit converts natively, so the seconds range is not limited by
    /// an i64 nanosecond count.
    fn epoch_to_date(&self, value: f64) -> Option<NaiveDate> {
        if !value.is_finite() {
            return None;
        }
        let whole = value.floor();
        if whole.abs() >= i64::MAX as f64 {
            return None;
        }
        let whole = whole as i64;
        let dt = match self {
            TimestampUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(whole)),
            TimestampUnit::Milliseconds => DateTime::from_timestamp_millis(whole),
            TimestampUnit::Seconds => DateTime::from_timestamp(whole, 0),
            TimestampUnit::Text => None,
        };
        dt.map(|dt| dt.date_naive())
    }
}

/// Result of resolving a whole column
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedColumn {
    pub unit: TimestampUnit,
    pub dates: Vec<Option<NaiveDate>>,
}

impl ResolvedColumn {
    pub fn unparsed_count(&self) -> usize {
        self.dates.iter().filter(|d| d.is_none()).count()
    }
}

/// Parse a numeric cell. Blank or non-numeric cells yield None.
fn parse_number(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Resolve a column of raw cells into calendar dates
///
/// The unit is decided once for the column. In an epoch column, cells that are
/// not numbers become `None`; in a text column every cell goes through
/// [`parse_date_lenient`].
pub fn resolve_date_column(values: &[&str]) -> ResolvedColumn {
    let max = values
        .iter()
        .filter_map(|v| parse_number(v))
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))));

    let unit = TimestampUnit::from_max(max);

    let dates = match unit {
        TimestampUnit::Text => values.iter().map(|v| parse_date_lenient(v)).collect(),
        _ => values
            .iter()
            .map(|v| parse_number(v).and_then(|n| unit.epoch_to_date(n)))
            .collect(),
    };

    ResolvedColumn { unit, dates }
}

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%y",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%Y/%m/%d",
    "%d.%m.%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
];

/// Parse a textual date in any of the formats seen in vendor exports
///
/// Month-first wins for ambiguous slashed forms. Returns None instead of
/// failing.
pub fn parse_date_lenient(cell: &str) -> Option<NaiveDate> {
    let text = cell.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt.date());
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(text, fmt) {
            return Some(d);
        }
    }

    None
}
