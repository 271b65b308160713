// 📥 Ingestion Pipeline
// normalize → resolve stay dates → occupied flags → canonical room records

use crate::error::SchemaError;
use crate::layout::{self, AuditLayout, NormalizedTable, CHECK_IN, CHECK_OUT, OCCUPIED, RATE, ROOM_TYPE};
use crate::occupancy::{infer_occupancy, locate_stay_columns, parse_occupied_flag, StayColumns};
use crate::table::RawAuditTable;
use crate::timestamp::{resolve_date_column, TimestampUnit};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Explicit run context; one `today` for every row of an ingestion run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestContext {
    pub today: NaiveDate,
}

impl IngestContext {
    pub fn new(today: NaiveDate) -> Self {
        IngestContext { today }
    }
}

/// CanonicalRoomRecord - One room row in the canonical schema
///
/// `rate` is never negative. `extra_fields` keeps the pass-through columns in
/// the order the mapping listed them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRoomRecord {
    pub room_type: String,
    pub occupied: bool,
    pub rate: f64,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    #[serde(default)]
    pub extra_fields: Vec<(String, String)>,
}

impl CanonicalRoomRecord {
    pub fn new(room_type: &str, occupied: bool, rate: f64) -> Self {
        CanonicalRoomRecord {
            room_type: room_type.to_string(),
            occupied,
            rate: rate.max(0.0),
            check_in: None,
            check_out: None,
            extra_fields: Vec::new(),
        }
    }

    /// Builder pattern: set stay dates
    pub fn with_stay(mut self, check_in: Option<NaiveDate>, check_out: Option<NaiveDate>) -> Self {
        self.check_in = check_in;
        self.check_out = check_out;
        self
    }

    pub fn extra(&self, column: &str) -> Option<&str> {
        self.extra_fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueKind {
    /// Rate cell is not a number; recorded as 0.0 and the room as vacant
    InvalidRate,
    /// Rate below zero; recorded as 0.0 and the room as vacant
    NegativeRate,
    /// Non-blank date cell that could not be converted
    UnparsedDate,
}

/// A cell that was recovered locally instead of failing the run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseIssue {
    /// Zero-based data row (header excluded)
    pub row: usize,
    pub column: String,
    pub value: String,
    pub kind: IssueKind,
}

/// Everything one ingestion run produced
#[derive(Debug, Clone, PartialEq)]
pub struct AuditIngest {
    pub normalized: NormalizedTable,
    pub records: Vec<CanonicalRoomRecord>,
    pub issues: Vec<ParseIssue>,
    pub check_in_unit: TimestampUnit,
    pub check_out_unit: TimestampUnit,
    /// True when occupancy came from stay dates rather than a status column
    pub occupancy_inferred: bool,
}

impl AuditIngest {
    pub fn display_headers(&self) -> &[String] {
        &self.normalized.table.headers
    }

    /// Normalized rows with stay dates rendered in the layout's display format
    pub fn display_rows(&self) -> Vec<Vec<String>> {
        let table = &self.normalized.table;
        let format = self.normalized.date_format;
        let check_in = table.column_index(CHECK_IN);
        let check_out = table.column_index(CHECK_OUT);

        table
            .rows
            .iter()
            .zip(self.records.iter())
            .map(|(row, record)| {
                row.iter()
                    .enumerate()
                    .map(|(i, cell)| {
                        if Some(i) == check_in {
                            format.render(record.check_in, cell)
                        } else if Some(i) == check_out {
                            format.render(record.check_out, cell)
                        } else {
                            cell.clone()
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

/// Currency prefixes tolerated in front of a rate, matched in order
const CURRENCY_PREFIXES: &[&str] = &[
    "RS.", "RS", "INR", "AED", "USD", "EUR", "GBP", "C$", "A$", "$", "₹", "€", "£",
];

/// Parse a rate cell
///
/// Thousands separators and one leading currency prefix ("$", "Rs.", "AED ")
/// are tolerated. Blank cells are a zero rate. Any other text is invalid.
pub fn parse_rate(cell: &str) -> Result<f64, IssueKind> {
    let cleaned: String = cell
        .trim()
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return Ok(0.0);
    }

    let upper = cleaned.to_uppercase();
    let numeric = CURRENCY_PREFIXES
        .iter()
        .find(|prefix| upper.starts_with(*prefix))
        .map_or(upper.as_str(), |prefix| &upper[prefix.len()..]);

    match numeric.parse::<f64>() {
        Ok(value) if !value.is_finite() => Err(IssueKind::InvalidRate),
        Ok(value) if value < 0.0 => Err(IssueKind::NegativeRate),
        Ok(value) => Ok(value),
        Err(_) => Err(IssueKind::InvalidRate),
    }
}

/// Run the full ingestion pipeline over one raw table
pub fn ingest(
    table: &RawAuditTable,
    layout: &AuditLayout,
    ctx: &IngestContext,
) -> Result<AuditIngest, SchemaError> {
    let normalized = layout::normalize(table, layout)?;
    let norm = &normalized.table;
    let mut issues = Vec::new();

    let stay = match (norm.column_index(CHECK_IN), norm.column_index(CHECK_OUT)) {
        (Some(check_in), Some(check_out)) => StayColumns { check_in, check_out },
        _ => locate_stay_columns(norm)?,
    };
    let check_in_cells = norm.column_values(stay.check_in);
    let check_out_cells = norm.column_values(stay.check_out);
    let check_in = resolve_date_column(&check_in_cells);
    let check_out = resolve_date_column(&check_out_cells);
    debug!(
        check_in_unit = check_in.unit.name(),
        check_out_unit = check_out.unit.name(),
        "resolved stay date units"
    );

    for (column, cells, resolved) in [
        (CHECK_IN, &check_in_cells, &check_in.dates),
        (CHECK_OUT, &check_out_cells, &check_out.dates),
    ] {
        for (row, (cell, date)) in cells.iter().zip(resolved.iter()).enumerate() {
            if date.is_none() && !cell.trim().is_empty() {
                issues.push(ParseIssue {
                    row,
                    column: column.to_string(),
                    value: cell.to_string(),
                    kind: IssueKind::UnparsedDate,
                });
            }
        }
    }

    let occupancy_inferred = !normalized.has_occupied();
    let occupied: Vec<bool> = match norm.column_index(OCCUPIED) {
        Some(idx) => norm.column_values(idx).into_iter().map(parse_occupied_flag).collect(),
        None => {
            debug!(today = %ctx.today, "no occupancy column, inferring from stay dates");
            infer_occupancy(&check_in.dates, &check_out.dates, ctx.today)
        }
    };

    let room_idx = norm.column_index(ROOM_TYPE);
    let rate_idx = norm.column_index(RATE);
    let extra_idx: Vec<(String, Option<usize>)> = normalized
        .extra_columns
        .iter()
        .map(|name| (name.clone(), norm.column_index(name)))
        .collect();

    let mut records = Vec::with_capacity(norm.len());
    for row in 0..norm.len() {
        let rate_cell = rate_idx.map(|i| norm.cell(row, i)).unwrap_or("");
        let mut is_occupied = occupied[row];
        let rate = match parse_rate(rate_cell) {
            Ok(value) => value,
            Err(kind) => {
                is_occupied = false;
                issues.push(ParseIssue {
                    row,
                    column: RATE.to_string(),
                    value: rate_cell.to_string(),
                    kind,
                });
                0.0
            }
        };

        let extra_fields = extra_idx
            .iter()
            .map(|(name, idx)| {
                let value = idx.map(|i| norm.cell(row, i)).unwrap_or("");
                (name.clone(), value.to_string())
            })
            .collect();

        records.push(CanonicalRoomRecord {
            room_type: room_idx.map(|i| norm.cell(row, i)).unwrap_or("").trim().to_string(),
            occupied: is_occupied,
            rate,
            check_in: check_in.dates[row],
            check_out: check_out.dates[row],
            extra_fields,
        });
    }

    for issue in &issues {
        warn!(
            row = issue.row,
            column = issue.column.as_str(),
            value = issue.value.as_str(),
            kind = ?issue.kind,
            "recovered unparseable cell"
        );
    }

    Ok(AuditIngest {
        check_in_unit: check_in.unit,
        check_out_unit: check_out.unit,
        normalized,
        records,
        issues,
        occupancy_inferred,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{CustomMapping, DateDisplayFormat};

    fn ctx() -> IngestContext {
        IngestContext::new(NaiveDate::from_ymd_opt(2025, 4, 25).unwrap())
    }

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_parse_rate() {
        assert_eq!(parse_rate("100"), Ok(100.0));
        assert_eq!(parse_rate(" 1,250.50 "), Ok(1250.5));
        assert_eq!(parse_rate("$200"), Ok(200.0));
        assert_eq!(parse_rate("Rs.1500"), Ok(1500.0));
        assert_eq!(parse_rate(""), Ok(0.0));
        assert_eq!(parse_rate("-5"), Err(IssueKind::NegativeRate));
        assert_eq!(parse_rate("abc"), Err(IssueKind::InvalidRate));
        assert_eq!(parse_rate("AED 500"), Ok(500.0));
        assert_eq!(parse_rate("€ 99.5"), Ok(99.5));
    }

    #[test]
    fn test_parse_rate_keeps_leading_decimal_point() {
        assert_eq!(parse_rate(".5"), Ok(0.5));
        assert_eq!(parse_rate("$.99"), Ok(0.99));
        assert_eq!(parse_rate("Rs.1.5"), Ok(1.5));
    }

    #[test]
    fn test_parse_rate_rejects_unknown_prefix() {
        assert_eq!(parse_rate("abc100"), Err(IssueKind::InvalidRate));
        assert_eq!(parse_rate("100abc"), Err(IssueKind::InvalidRate));
        assert_eq!(parse_rate("$$100"), Err(IssueKind::InvalidRate));
        assert_eq!(parse_rate("$-5"), Err(IssueKind::NegativeRate));
    }

    #[test]
    fn test_ingest_standard_layout() {
        let table = RawAuditTable::from_strs(
            &["Room Type", "Occupied", "Rate", "Check-In Date", "Check-Out Date"],
            &[
                &["Deluxe", "1", "100", "2025-04-24", "2025-04-26"],
                &["Suite", "0", "150", "", ""],
            ],
        );
        let result = ingest(&table, &AuditLayout::Standard, &ctx()).unwrap();

        assert!(!result.occupancy_inferred);
        assert_eq!(result.records.len(), 2);
        assert!(result.records[0].occupied);
        assert!(!result.records[1].occupied);
        assert_eq!(result.records[0].check_in, date(2025, 4, 24));
        assert_eq!(result.records[1].check_in, None);
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_ingest_hilton_infers_occupancy_from_epoch_millis() {
        // 2025-04-24, 2025-04-26, 2025-04-20, 2025-04-22 at 00:00 UTC
        let table = RawAuditTable::from_strs(
            &["Type", "Tariff", "Arrival", "Departure"],
            &[
                &["Deluxe", "120", "1745452800000", "1745625600000"],
                &["Deluxe", "120", "1745107200000", "1745280000000"],
            ],
        );
        let result = ingest(&table, &AuditLayout::Hilton, &ctx()).unwrap();

        assert!(result.occupancy_inferred);
        assert_eq!(result.check_in_unit, TimestampUnit::Milliseconds);
        assert!(result.records[0].occupied);
        assert!(!result.records[1].occupied);
        assert_eq!(result.records[0].check_out, date(2025, 4, 26));
    }

    #[test]
    fn test_bad_rate_becomes_zero_and_vacant() {
        let table = RawAuditTable::from_strs(
            &["Room Type", "Occupied", "Rate", "Check-In Date", "Check-Out Date"],
            &[
                &["Deluxe", "1", "n/a", "2025-04-24", "2025-04-26"],
                &["Deluxe", "1", "-40", "2025-04-24", "not a date"],
            ],
        );
        let result = ingest(&table, &AuditLayout::Standard, &ctx()).unwrap();

        assert_eq!(result.records[0].rate, 0.0);
        assert!(!result.records[0].occupied);
        assert!(!result.records[1].occupied);

        let kinds: Vec<IssueKind> = result.issues.iter().map(|i| i.kind).collect();
        assert!(kinds.contains(&IssueKind::InvalidRate));
        assert!(kinds.contains(&IssueKind::NegativeRate));
        assert!(kinds.contains(&IssueKind::UnparsedDate));
        assert_eq!(result.issues.len(), 3);
    }

    #[test]
    fn test_schema_error_propagates() {
        let table = RawAuditTable::from_strs(&["Room Type", "Rate"], &[]);
        let err = ingest(&table, &AuditLayout::Marriott, &ctx()).unwrap_err();
        assert_eq!(err.context, "Marriott Format");
        assert_eq!(err.missing.len(), 5);
    }

    #[test]
    fn test_custom_extras_and_display_format() {
        let table = RawAuditTable::from_strs(
            &["Guest", "Category", "Price", "In", "Out"],
            &[&["Ali", "Executive", "180", "1745539200", "17457120000"]],
        );
        let mapping = CustomMapping::new("Category", "Price", "In", "Out")
            .with_extra_columns(&["Guest"])
            .with_date_format(DateDisplayFormat::OriginalTimestamp);
        let result = ingest(&table, &AuditLayout::Custom(mapping), &ctx()).unwrap();

        assert_eq!(result.records[0].extra("Guest"), Some("Ali"));
        assert_eq!(result.display_headers()[4], "Guest");
        assert_eq!(result.display_rows()[0][2], "1745539200");
    }

    #[test]
    fn test_custom_stay_dates_ignore_same_named_extras() {
        let table = RawAuditTable::from_strs(
            &["Cat", "Price", "In", "Out", "Arrival Date", "Departure Date"],
            &[&["Suite", "90", "2025-04-24", "2025-04-26", "2025-01-01", "2025-01-02"]],
        );
        let mapping = CustomMapping::new("Cat", "Price", "In", "Out")
            .with_extra_columns(&["Arrival Date", "Departure Date"]);
        let result = ingest(&table, &AuditLayout::Custom(mapping), &ctx()).unwrap();

        let record = &result.records[0];
        assert_eq!(record.check_in, date(2025, 4, 24));
        assert_eq!(record.check_out, date(2025, 4, 26));
        assert!(record.occupied);
        assert_eq!(record.extra("Arrival Date"), Some("2025-01-01"));
    }

    #[test]
    fn test_negated_status_is_vacant_through_ingest() {
        let table = RawAuditTable::from_strs(
            &["Room_Category", "Status", "Rate_USD", "In_Date", "Out_Date"],
            &[
                &["Executive", "Not Occupied", "200", "2025-04-24", "2025-04-26"],
                &["Executive", "Unoccupied", "200", "2025-04-24", "2025-04-26"],
                &["Executive", "Occupied", "200", "2025-04-24", "2025-04-26"],
            ],
        );
        let result = ingest(&table, &AuditLayout::Marriott, &ctx()).unwrap();
        let occupied: Vec<bool> = result.records.iter().map(|r| r.occupied).collect();
        assert_eq!(occupied, vec![false, false, true]);

        let standard = RawAuditTable::from_strs(
            &["Room Type", "Occupied", "Rate", "Check-In Date", "Check-Out Date"],
            &[&["Deluxe", "Not Occupied", "100", "2025-04-24", "2025-04-26"]],
        );
        let result = ingest(&standard, &AuditLayout::Standard, &ctx()).unwrap();
        assert!(!result.records[0].occupied);
    }

    #[test]
    fn test_display_rows_render_iso_dates() {
        let table = RawAuditTable::from_strs(
            &["Type", "Tariff", "Arrival", "Departure"],
            &[&["Deluxe", "120", "04/24/2025", "04/26/2025"]],
        );
        let result = ingest(&table, &AuditLayout::Hilton, &ctx()).unwrap();
        let rows = result.display_rows();
        assert_eq!(rows[0], vec!["Deluxe", "120", "2025-04-24", "2025-04-26"]);
    }
}
