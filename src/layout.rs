// 🏗️ Layout Framework - Column Normalizer
// Polymorphic normalizer system for the vendor night-audit layouts

use crate::error::SchemaError;
use crate::occupancy::is_occupied_status;
use crate::table::RawAuditTable;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

// ============================================================================
// CANONICAL SCHEMA
// ============================================================================

pub const ROOM_TYPE: &str = "Room Type";
pub const OCCUPIED: &str = "Occupied";
pub const RATE: &str = "Rate";
pub const CHECK_IN: &str = "Check-In Date";
pub const CHECK_OUT: &str = "Check-Out Date";

/// Columns every layout must end up with (Occupied may be inferred instead)
pub const READINESS_COLUMNS: [&str; 4] = [ROOM_TYPE, RATE, CHECK_IN, CHECK_OUT];

const STANDARD_COLUMNS: [&str; 5] = [ROOM_TYPE, OCCUPIED, RATE, CHECK_IN, CHECK_OUT];
const MARRIOTT_COLUMNS: [&str; 5] = ["Room_Category", "Status", "Rate_USD", "In_Date", "Out_Date"];
const HILTON_COLUMNS: [&str; 4] = ["Type", "Tariff", "Arrival", "Departure"];
const HILTON_STATUS: &str = "Status";

/// Header fixes applied to uploads before Standard parsing
const HEADER_ALIASES: [(&str, &str); 6] = [
    ("Arrival Date", CHECK_IN),
    ("Departure Date", CHECK_OUT),
    ("Status", OCCUPIED),
    ("RoomType", ROOM_TYPE),
    ("CheckIn", CHECK_IN),
    ("CheckOut", CHECK_OUT),
];

// ============================================================================
// CORE TYPES
// ============================================================================

/// LayoutKind - Which vendor export a table comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutKind {
    Standard,
    Marriott,
    Hilton,
    Custom,
}

impl LayoutKind {
    /// Human-readable name for display
    pub fn name(&self) -> &str {
        match self {
            LayoutKind::Standard => "Standard Format",
            LayoutKind::Marriott => "Marriott Format",
            LayoutKind::Hilton => "Hilton Format",
            LayoutKind::Custom => "Custom Format",
        }
    }

    /// Short code used in logs, CLI flags and error contexts
    pub fn code(&self) -> &str {
        match self {
            LayoutKind::Standard => "standard",
            LayoutKind::Marriott => "marriott",
            LayoutKind::Hilton => "hilton",
            LayoutKind::Custom => "custom",
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for LayoutKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        let word = lowered.trim_end_matches(" format");
        match word {
            "standard" => Ok(LayoutKind::Standard),
            "marriott" => Ok(LayoutKind::Marriott),
            "hilton" => Ok(LayoutKind::Hilton),
            "custom" => Ok(LayoutKind::Custom),
            other => Err(format!("unknown layout: {}", other)),
        }
    }
}

/// How converted check-in/out dates are shown to people.
/// Parsing never depends on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DateDisplayFormat {
    /// Show the cell exactly as it appeared in the upload
    OriginalTimestamp,
    #[default]
    Iso,
    DayMonthYear,
    MonthDayYear,
}

impl DateDisplayFormat {
    pub fn label(&self) -> &str {
        match self {
            DateDisplayFormat::OriginalTimestamp => "original-timestamp",
            DateDisplayFormat::Iso => "YYYY-MM-DD",
            DateDisplayFormat::DayMonthYear => "DD-MM-YYYY",
            DateDisplayFormat::MonthDayYear => "MM-DD-YYYY",
        }
    }

    /// Render a resolved date; unparsed dates render as an empty string
    pub fn render(&self, date: Option<NaiveDate>, original: &str) -> String {
        let pattern = match self {
            DateDisplayFormat::OriginalTimestamp => return original.to_string(),
            DateDisplayFormat::Iso => "%Y-%m-%d",
            DateDisplayFormat::DayMonthYear => "%d-%m-%Y",
            DateDisplayFormat::MonthDayYear => "%m-%d-%Y",
        };
        date.map(|d| d.format(pattern).to_string()).unwrap_or_default()
    }
}

impl FromStr for DateDisplayFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "original-timestamp" | "original" => Ok(DateDisplayFormat::OriginalTimestamp),
            "YYYY-MM-DD" | "iso" => Ok(DateDisplayFormat::Iso),
            "DD-MM-YYYY" => Ok(DateDisplayFormat::DayMonthYear),
            "MM-DD-YYYY" => Ok(DateDisplayFormat::MonthDayYear),
            other => Err(format!("unknown date format: {}", other)),
        }
    }
}

/// CustomMapping - Caller-chosen source column for each canonical field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomMapping {
    pub room_type: String,
    pub occupied: Option<String>,
    pub rate: String,
    pub check_in: String,
    pub check_out: String,

    /// Copied verbatim next to the canonical columns
    #[serde(default)]
    pub extra_columns: Vec<String>,

    #[serde(default)]
    pub date_format: DateDisplayFormat,
}

impl CustomMapping {
    pub fn new(room_type: &str, rate: &str, check_in: &str, check_out: &str) -> Self {
        CustomMapping {
            room_type: room_type.to_string(),
            occupied: None,
            rate: rate.to_string(),
            check_in: check_in.to_string(),
            check_out: check_out.to_string(),
            extra_columns: Vec::new(),
            date_format: DateDisplayFormat::default(),
        }
    }

    /// Builder pattern: map an occupancy/status column
    pub fn with_occupied(mut self, column: &str) -> Self {
        self.occupied = Some(column.to_string());
        self
    }

    /// Builder pattern: pass extra columns through
    pub fn with_extra_columns(mut self, columns: &[&str]) -> Self {
        self.extra_columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_date_format(mut self, format: DateDisplayFormat) -> Self {
        self.date_format = format;
        self
    }

    fn mapped_sources(&self) -> Vec<&str> {
        let mut sources = vec![
            self.room_type.as_str(),
            self.rate.as_str(),
            self.check_in.as_str(),
            self.check_out.as_str(),
        ];
        if let Some(occ) = &self.occupied {
            sources.push(occ.as_str());
        }
        sources
    }
}

/// AuditLayout - Closed set of supported layouts; Custom carries its mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AuditLayout {
    Standard,
    Marriott,
    Hilton,
    Custom(CustomMapping),
}

impl AuditLayout {
    pub fn kind(&self) -> LayoutKind {
        match self {
            AuditLayout::Standard => LayoutKind::Standard,
            AuditLayout::Marriott => LayoutKind::Marriott,
            AuditLayout::Hilton => LayoutKind::Hilton,
            AuditLayout::Custom(_) => LayoutKind::Custom,
        }
    }
}

/// NormalizedTable - Output of a normalizer
///
/// Headers are exactly the canonical names (Occupied only when the source had
/// one), followed by any pass-through extra columns. Status columns are
/// rewritten to "1"/"0"; every other cell is untouched text.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable {
    pub table: RawAuditTable,
    pub layout: LayoutKind,
    pub date_format: DateDisplayFormat,
    pub extra_columns: Vec<String>,
}

impl NormalizedTable {
    pub fn has_occupied(&self) -> bool {
        self.table.has_column(OCCUPIED)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

// ============================================================================
// NORMALIZER TRAIT
// ============================================================================

/// LayoutNormalizer - Core trait
///
/// One implementation per vendor layout. Pure: the same table always produces
/// the same NormalizedTable or the same SchemaError.
pub trait LayoutNormalizer: Send + Sync {
    /// Map the vendor table onto the canonical column set
    fn normalize(&self, table: &RawAuditTable) -> Result<NormalizedTable, SchemaError>;

    /// Get the layout this normalizer handles
    fn kind(&self) -> LayoutKind;

    /// Normalizer version (for provenance tracking)
    fn version(&self) -> &str {
        "1.0.0"
    }
}

/// One output column: canonical header + source column + cell conversion
struct ColumnPlan<'a> {
    header: &'a str,
    source: usize,
    status: bool,
}

fn project(table: &RawAuditTable, plan: &[ColumnPlan]) -> RawAuditTable {
    let headers = plan.iter().map(|c| c.header.to_string()).collect();
    let rows = table
        .rows
        .iter()
        .map(|row| {
            plan.iter()
                .map(|c| {
                    let cell = row.get(c.source).map(|s| s.as_str()).unwrap_or("");
                    if c.status {
                        status_cell(cell)
                    } else {
                        cell.to_string()
                    }
                })
                .collect()
        })
        .collect();

    RawAuditTable::new(headers, rows)
}

fn status_cell(cell: &str) -> String {
    let flag = if is_occupied_status(cell) { "1" } else { "0" };
    flag.to_string()
}

fn require(table: &RawAuditTable, kind: LayoutKind, columns: &[&str]) -> Result<(), SchemaError> {
    let missing = table.missing_columns(columns);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(SchemaError::new(kind.name(), missing))
    }
}

fn source(table: &RawAuditTable, kind: LayoutKind, name: &str) -> Result<usize, SchemaError> {
    table
        .column_index(name)
        .ok_or_else(|| SchemaError::new(kind.name(), vec![name.to_string()]))
}

// ============================================================================
// FACTORY FUNCTIONS
// ============================================================================

/// Get the normalizer for a layout
///
/// Factory pattern: Returns Box<dyn LayoutNormalizer> for polymorphism
pub fn get_normalizer(layout: &AuditLayout) -> Box<dyn LayoutNormalizer> {
    match layout {
        AuditLayout::Standard => Box::new(StandardNormalizer::new()),
        AuditLayout::Marriott => Box::new(MarriottNormalizer::new()),
        AuditLayout::Hilton => Box::new(HiltonNormalizer::new()),
        AuditLayout::Custom(mapping) => Box::new(CustomNormalizer::new(mapping.clone())),
    }
}

/// Normalize a table with the selected layout
pub fn normalize(table: &RawAuditTable, layout: &AuditLayout) -> Result<NormalizedTable, SchemaError> {
    let normalizer = get_normalizer(layout);
    debug!(
        layout = normalizer.kind().code(),
        version = normalizer.version(),
        rows = table.len(),
        "normalizing audit table"
    );
    normalizer.normalize(table)
}

/// Detect the vendor layout from headers
///
/// # Strategy:
/// 1. Standard if all five canonical columns are present
/// 2. Marriott if all five Marriott columns are present
/// 3. Hilton if the four required Hilton columns are present
/// 4. None otherwise (caller should fall back to a Custom mapping)
pub fn detect_layout(table: &RawAuditTable) -> Option<LayoutKind> {
    if table.missing_columns(&STANDARD_COLUMNS).is_empty() {
        return Some(LayoutKind::Standard);
    }
    if table.missing_columns(&MARRIOTT_COLUMNS).is_empty() {
        return Some(LayoutKind::Marriott);
    }
    if table.missing_columns(&HILTON_COLUMNS).is_empty() {
        return Some(LayoutKind::Hilton);
    }
    None
}

/// Rename common header variants to their canonical names
///
/// Never overwrites a column that already exists. Returns the renames applied.
pub fn apply_header_aliases(table: &mut RawAuditTable) -> Vec<(String, String)> {
    let mut applied = Vec::new();
    for (from, to) in HEADER_ALIASES {
        if table.rename_column(from, to) {
            applied.push((from.to_string(), to.to_string()));
        }
    }
    applied
}

/// File readiness check: which always-required canonical columns are missing
pub fn readiness(table: &RawAuditTable) -> Vec<String> {
    table.missing_columns(&READINESS_COLUMNS)
}

// ============================================================================
// NORMALIZERS
// ============================================================================

/// Standard layout: canonical names already, case-sensitive
pub struct StandardNormalizer;

impl StandardNormalizer {
    pub fn new() -> Self {
        StandardNormalizer
    }
}

impl Default for StandardNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutNormalizer for StandardNormalizer {
    fn normalize(&self, table: &RawAuditTable) -> Result<NormalizedTable, SchemaError> {
        require(table, self.kind(), &STANDARD_COLUMNS)?;

        let plan = STANDARD_COLUMNS
            .iter()
            .map(|name| {
                Ok(ColumnPlan {
                    header: *name,
                    source: source(table, self.kind(), name)?,
                    status: false,
                })
            })
            .collect::<Result<Vec<ColumnPlan>, SchemaError>>()?;

        Ok(NormalizedTable {
            table: project(table, &plan),
            layout: self.kind(),
            date_format: DateDisplayFormat::Iso,
            extra_columns: Vec::new(),
        })
    }

    fn kind(&self) -> LayoutKind {
        LayoutKind::Standard
    }
}

/// Marriott layout: Room_Category, Status, Rate_USD, In_Date, Out_Date
pub struct MarriottNormalizer;

impl MarriottNormalizer {
    pub fn new() -> Self {
        MarriottNormalizer
    }
}

impl Default for MarriottNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutNormalizer for MarriottNormalizer {
    fn normalize(&self, table: &RawAuditTable) -> Result<NormalizedTable, SchemaError> {
        require(table, self.kind(), &MARRIOTT_COLUMNS)?;

        let plan = [
            ColumnPlan { header: ROOM_TYPE, source: source(table, self.kind(), "Room_Category")?, status: false },
            ColumnPlan { header: OCCUPIED, source: source(table, self.kind(), "Status")?, status: true },
            ColumnPlan { header: RATE, source: source(table, self.kind(), "Rate_USD")?, status: false },
            ColumnPlan { header: CHECK_IN, source: source(table, self.kind(), "In_Date")?, status: false },
            ColumnPlan { header: CHECK_OUT, source: source(table, self.kind(), "Out_Date")?, status: false },
        ];

        Ok(NormalizedTable {
            table: project(table, &plan),
            layout: self.kind(),
            date_format: DateDisplayFormat::Iso,
            extra_columns: Vec::new(),
        })
    }

    fn kind(&self) -> LayoutKind {
        LayoutKind::Marriott
    }
}

/// Hilton layout: Type, Tariff, Arrival, Departure, optional Status
pub struct HiltonNormalizer;

impl HiltonNormalizer {
    pub fn new() -> Self {
        HiltonNormalizer
    }
}

impl Default for HiltonNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutNormalizer for HiltonNormalizer {
    fn normalize(&self, table: &RawAuditTable) -> Result<NormalizedTable, SchemaError> {
        require(table, self.kind(), &HILTON_COLUMNS)?;

        let mut plan = vec![ColumnPlan { header: ROOM_TYPE, source: source(table, self.kind(), "Type")?, status: false }];
        match table.column_index(HILTON_STATUS) {
            Some(status) => plan.push(ColumnPlan { header: OCCUPIED, source: status, status: true }),
            None => debug!("hilton export has no Status column, occupancy will be inferred"),
        }
        plan.extend([
            ColumnPlan { header: RATE, source: source(table, self.kind(), "Tariff")?, status: false },
            ColumnPlan { header: CHECK_IN, source: source(table, self.kind(), "Arrival")?, status: false },
            ColumnPlan { header: CHECK_OUT, source: source(table, self.kind(), "Departure")?, status: false },
        ]);

        Ok(NormalizedTable {
            table: project(table, &plan),
            layout: self.kind(),
            date_format: DateDisplayFormat::Iso,
            extra_columns: Vec::new(),
        })
    }

    fn kind(&self) -> LayoutKind {
        LayoutKind::Hilton
    }
}

/// Custom layout: explicit mapping supplied by the caller
pub struct CustomNormalizer {
    mapping: CustomMapping,
}

impl CustomNormalizer {
    pub fn new(mapping: CustomMapping) -> Self {
        CustomNormalizer { mapping }
    }
}

impl LayoutNormalizer for CustomNormalizer {
    fn normalize(&self, table: &RawAuditTable) -> Result<NormalizedTable, SchemaError> {
        let m = &self.mapping;

        let mut wanted = m.mapped_sources();
        wanted.extend(m.extra_columns.iter().map(|c| c.as_str()));
        require(table, self.kind(), &wanted)?;

        let mut plan = vec![ColumnPlan { header: ROOM_TYPE, source: source(table, self.kind(), &m.room_type)?, status: false }];
        if let Some(occ) = &m.occupied {
            plan.push(ColumnPlan { header: OCCUPIED, source: source(table, self.kind(), occ)?, status: true });
        }
        plan.extend([
            ColumnPlan { header: RATE, source: source(table, self.kind(), &m.rate)?, status: false },
            ColumnPlan { header: CHECK_IN, source: source(table, self.kind(), &m.check_in)?, status: false },
            ColumnPlan { header: CHECK_OUT, source: source(table, self.kind(), &m.check_out)?, status: false },
        ]);

        let mapped = m.mapped_sources();
        let mut extra_columns = Vec::new();
        for extra in &m.extra_columns {
            if mapped.contains(&extra.as_str())
                || STANDARD_COLUMNS.contains(&extra.as_str())
                || extra_columns.contains(extra)
            {
                debug!(column = extra.as_str(), "skipping extra column that collides with the mapping");
                continue;
            }
            extra_columns.push(extra.clone());
        }
        for extra in &extra_columns {
            plan.push(ColumnPlan { header: extra, source: source(table, self.kind(), extra)?, status: false });
        }

        Ok(NormalizedTable {
            table: project(table, &plan),
            layout: self.kind(),
            date_format: m.date_format,
            extra_columns,
        })
    }

    fn kind(&self) -> LayoutKind {
        LayoutKind::Custom
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn standard_table() -> RawAuditTable {
        RawAuditTable::from_strs(
            &["Room Type", "Occupied", "Rate", "Check-In Date", "Check-Out Date", "Guest"],
            &[
                &["Deluxe", "1", "100", "2025-04-25", "2025-04-27", "John Doe"],
                &["Suite", "0", "150", "2025-04-20", "2025-04-22", ""],
            ],
        )
    }

    #[test]
    fn test_layout_kind_names() {
        assert_eq!(LayoutKind::Standard.name(), "Standard Format");
        assert_eq!(LayoutKind::Marriott.name(), "Marriott Format");
        assert_eq!(LayoutKind::Hilton.code(), "hilton");
        assert_eq!(LayoutKind::Custom.code(), "custom");
    }

    #[test]
    fn test_layout_kind_from_str() {
        assert_eq!("standard".parse::<LayoutKind>().unwrap(), LayoutKind::Standard);
        assert_eq!("Marriott Format".parse::<LayoutKind>().unwrap(), LayoutKind::Marriott);
        assert_eq!(" HILTON ".parse::<LayoutKind>().unwrap(), LayoutKind::Hilton);
        assert!("opera".parse::<LayoutKind>().is_err());
    }

    #[test]
    fn test_standard_keeps_only_canonical_columns() {
        let normalized = normalize(&standard_table(), &AuditLayout::Standard).unwrap();
        assert_eq!(normalized.table.headers, STANDARD_COLUMNS.to_vec());
        assert_eq!(normalized.table.rows[0], vec!["Deluxe", "1", "100", "2025-04-25", "2025-04-27"]);
        assert!(normalized.has_occupied());
        assert_eq!(normalized.layout, LayoutKind::Standard);
    }

    #[test]
    fn test_standard_lists_all_missing_columns() {
        let table = RawAuditTable::from_strs(&["Room Type", "rate", "Check-In Date"], &[]);
        let err = normalize(&table, &AuditLayout::Standard).unwrap_err();
        assert_eq!(err.context, "Standard Format");
        assert_eq!(err.missing, vec!["Occupied", "Rate", "Check-Out Date"]);
    }

    #[test]
    fn test_marriott_renames_and_converts_status() {
        let table = RawAuditTable::from_strs(
            &["Room_Category", "Status", "Rate_USD", "In_Date", "Out_Date"],
            &[
                &["Executive", "OCCUPIED", "200", "2025-04-25", "2025-04-28"],
                &["Superior", "Vacant", "150", "2025-04-20", "2025-04-21"],
            ],
        );
        let normalized = normalize(&table, &AuditLayout::Marriott).unwrap();
        assert_eq!(normalized.table.headers, STANDARD_COLUMNS.to_vec());
        assert_eq!(normalized.table.rows[0][1], "1");
        assert_eq!(normalized.table.rows[1][1], "0");
        assert_eq!(normalized.table.rows[0][0], "Executive");
    }

    #[test]
    fn test_marriott_negated_status_is_vacant() {
        let table = RawAuditTable::from_strs(
            &["Room_Category", "Status", "Rate_USD", "In_Date", "Out_Date"],
            &[
                &["Executive", "Not Occupied", "200", "2025-04-25", "2025-04-28"],
                &["Superior", "Unoccupied", "150", "2025-04-25", "2025-04-28"],
                &["Superior", "👤 Occupied", "150", "2025-04-25", "2025-04-28"],
            ],
        );
        let normalized = normalize(&table, &AuditLayout::Marriott).unwrap();
        assert_eq!(normalized.table.rows[0][1], "0");
        assert_eq!(normalized.table.rows[1][1], "0");
        assert_eq!(normalized.table.rows[2][1], "1");
    }

    #[test]
    fn test_source_lookup_reports_missing_column() {
        let table = RawAuditTable::from_strs(&["Type"], &[]);
        assert_eq!(source(&table, LayoutKind::Hilton, "Type"), Ok(0));
        let err = source(&table, LayoutKind::Hilton, "Tariff").unwrap_err();
        assert_eq!(err.context, "Hilton Format");
        assert_eq!(err.missing, vec!["Tariff"]);
    }

    #[test]
    fn test_marriott_missing_status_is_schema_error() {
        let table = RawAuditTable::from_strs(&["Room_Category", "Rate_USD", "In_Date", "Out_Date"], &[]);
        let err = normalize(&table, &AuditLayout::Marriott).unwrap_err();
        assert_eq!(err.missing, vec!["Status"]);
    }

    #[test]
    fn test_hilton_without_status_has_no_occupied_column() {
        let table = RawAuditTable::from_strs(
            &["Type", "Tariff", "Arrival", "Departure"],
            &[&["Deluxe", "120", "2025-04-24", "2025-04-26"]],
        );
        let normalized = normalize(&table, &AuditLayout::Hilton).unwrap();
        assert!(!normalized.has_occupied());
        assert_eq!(normalized.table.headers, vec![ROOM_TYPE, RATE, CHECK_IN, CHECK_OUT]);
    }

    #[test]
    fn test_hilton_with_status() {
        let table = RawAuditTable::from_strs(
            &["Type", "Status", "Tariff", "Arrival", "Departure"],
            &[&["Deluxe", "Occupied", "120", "2025-04-24", "2025-04-26"]],
        );
        let normalized = normalize(&table, &AuditLayout::Hilton).unwrap();
        assert!(normalized.has_occupied());
        assert_eq!(normalized.table.rows[0], vec!["Deluxe", "1", "120", "2025-04-24", "2025-04-26"]);
    }

    #[test]
    fn test_custom_mapping_with_extras() {
        let table = RawAuditTable::from_strs(
            &["Guest Name", "Meal Plan", "Category", "Price", "In", "Out"],
            &[&["Ali Khan", "Full Board", "Executive", "180", "1745539200000", "1745712000000"]],
        );
        let mapping = CustomMapping::new("Category", "Price", "In", "Out")
            .with_extra_columns(&["Guest Name", "Meal Plan", "Price"])
            .with_date_format(DateDisplayFormat::DayMonthYear);

        let normalized = normalize(&table, &AuditLayout::Custom(mapping)).unwrap();
        assert_eq!(
            normalized.table.headers,
            vec![ROOM_TYPE, RATE, CHECK_IN, CHECK_OUT, "Guest Name", "Meal Plan"]
        );
        assert_eq!(normalized.extra_columns, vec!["Guest Name", "Meal Plan"]);
        assert_eq!(normalized.date_format, DateDisplayFormat::DayMonthYear);
        assert!(!normalized.has_occupied());
    }

    #[test]
    fn test_custom_mapping_missing_source_column() {
        let table = RawAuditTable::from_strs(&["Category", "Price"], &[]);
        let mapping = CustomMapping::new("Category", "Price", "In", "Out").with_occupied("Status");
        let err = normalize(&table, &AuditLayout::Custom(mapping)).unwrap_err();
        assert_eq!(err.context, "Custom Format");
        assert_eq!(err.missing, vec!["In", "Out", "Status"]);
    }

    #[test]
    fn test_custom_occupied_uses_status_match() {
        let table = RawAuditTable::from_strs(
            &["Cat", "State", "Price", "In", "Out"],
            &[&["Suite", "occupied", "90", "2025-04-25", "2025-04-27"], &["Suite", "1", "90", "", ""]],
        );
        let mapping = CustomMapping::new("Cat", "Price", "In", "Out").with_occupied("State");
        let normalized = normalize(&table, &AuditLayout::Custom(mapping)).unwrap();
        assert_eq!(normalized.table.rows[0][1], "1");
        assert_eq!(normalized.table.rows[1][1], "0");
    }

    #[test]
    fn test_detect_layout() {
        assert_eq!(detect_layout(&standard_table()), Some(LayoutKind::Standard));

        let marriott = RawAuditTable::from_strs(&MARRIOTT_COLUMNS, &[]);
        assert_eq!(detect_layout(&marriott), Some(LayoutKind::Marriott));

        let hilton = RawAuditTable::from_strs(&["Type", "Tariff", "Arrival", "Departure"], &[]);
        assert_eq!(detect_layout(&hilton), Some(LayoutKind::Hilton));

        let unknown = RawAuditTable::from_strs(&["Room Class", "Rate Per Night"], &[]);
        assert_eq!(detect_layout(&unknown), None);
    }

    #[test]
    fn test_header_aliases_fix_sample_template() {
        let mut table = RawAuditTable::from_strs(
            &["Room Type", "Status", "Rate", "Arrival Date", "Departure Date"],
            &[],
        );
        let applied = apply_header_aliases(&mut table);
        assert_eq!(applied.len(), 3);
        assert_eq!(table.headers, STANDARD_COLUMNS.to_vec());
        assert!(readiness(&table).is_empty());
    }

    #[test]
    fn test_readiness_reports_missing() {
        let table = RawAuditTable::from_strs(&["Room Type", "Rate"], &[]);
        assert_eq!(readiness(&table), vec![CHECK_IN, CHECK_OUT]);
    }

    #[test]
    fn test_date_display_formats() {
        let d = NaiveDate::from_ymd_opt(2025, 4, 5);
        assert_eq!(DateDisplayFormat::Iso.render(d, "x"), "2025-04-05");
        assert_eq!(DateDisplayFormat::DayMonthYear.render(d, "x"), "05-04-2025");
        assert_eq!(DateDisplayFormat::MonthDayYear.render(d, "x"), "04-05-2025");
        assert_eq!(
            DateDisplayFormat::OriginalTimestamp.render(d, "1743811200000"),
            "1743811200000"
        );
        assert_eq!(DateDisplayFormat::Iso.render(None, "junk"), "");
        assert_eq!(
            "DD-MM-YYYY".parse::<DateDisplayFormat>().unwrap(),
            DateDisplayFormat::DayMonthYear
        );
    }
}
