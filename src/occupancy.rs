// 🛏️ Occupancy Inferencer
// Occupied/vacant per room: read from a status column when the export has one,
// otherwise derived from stay dates overlapping "today".

use crate::error::SchemaError;
use crate::table::RawAuditTable;
use chrono::NaiveDate;

/// Stay-date column pairs accepted for inference, checked in this order
pub const STAY_DATE_PAIRS: [(&str, &str); 2] = [
    ("Arrival Date", "Departure Date"),
    ("Check-In Date", "Check-Out Date"),
];

/// Column indexes of a located arrival/departure pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StayColumns {
    pub check_in: usize,
    pub check_out: usize,
}

/// Find the stay-date pair (case-insensitive header match)
///
/// Fails with a SchemaError naming both accepted pairs when neither exists.
pub fn locate_stay_columns(table: &RawAuditTable) -> Result<StayColumns, SchemaError> {
    for (arrival, departure) in STAY_DATE_PAIRS {
        if let (Some(check_in), Some(check_out)) = (
            table.column_index_ci(arrival),
            table.column_index_ci(departure),
        ) {
            return Ok(StayColumns { check_in, check_out });
        }
    }

    Err(SchemaError::new(
        "Occupancy",
        vec![
            "Arrival Date/Departure Date".to_string(),
            "Check-In Date/Check-Out Date".to_string(),
        ],
    ))
}

/// A room is occupied iff check_in <= today <= check_out.
/// Missing dates never count as occupied.
pub fn is_occupied_on(
    check_in: Option<NaiveDate>,
    check_out: Option<NaiveDate>,
    today: NaiveDate,
) -> bool {
    match (check_in, check_out) {
        (Some(arrival), Some(departure)) => arrival <= today && today <= departure,
        _ => false,
    }
}

/// Infer the occupied flag for every row from already-resolved stay dates
pub fn infer_occupancy(
    check_in: &[Option<NaiveDate>],
    check_out: &[Option<NaiveDate>],
    today: NaiveDate,
) -> Vec<bool> {
    check_in
        .iter()
        .zip(check_out.iter())
        .map(|(ci, co)| is_occupied_on(*ci, *co, today))
        .collect()
}

/// Vendor status text: exact case-insensitive match against "occupied"
///
/// A leading icon prefix ("👤 Occupied") is stripped first. Anything else
/// around the word ("Not Occupied", "Unoccupied") is vacant.
pub fn is_occupied_status(cell: &str) -> bool {
    let text = cell
        .trim()
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .trim_start()
        .to_lowercase();
    text == "occupied"
}

/// Interpret a Standard-layout `Occupied` cell
///
/// Accepts status text (see [`is_occupied_status`]), numeric flags (non-zero
/// is occupied) and "true"/"yes". Everything else is vacant.
pub fn parse_occupied_flag(cell: &str) -> bool {
    let text = cell.trim().to_lowercase();
    if text.is_empty() {
        return false;
    }

    if is_occupied_status(&text) {
        return true;
    }

    if let Ok(n) = text.parse::<f64>() {
        return n != 0.0 && n.is_finite();
    }

    matches!(text.as_str(), "true" | "yes" | "y")
}
