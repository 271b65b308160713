// 📋 Raw Audit Table
// Vendor export as read from disk: header row + text cells, nothing interpreted yet

use crate::error::{AuditError, AuditResult};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// RawAuditTable - Ordered rows under vendor-specific column names
///
/// Every row has exactly `headers.len()` cells; short rows are padded with
/// empty strings when loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAuditTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawAuditTable {
    /// Build a table from in-memory data, padding or truncating ragged rows
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();

        RawAuditTable { headers, rows }
    }

    /// Convenience constructor used heavily by tests and templates
    pub fn from_strs(headers: &[&str], rows: &[&[&str]]) -> Self {
        RawAuditTable::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    /// Load a CSV export (first line = headers)
    pub fn from_csv_path(path: &Path) -> AuditResult<Self> {
        let file = File::open(path)?;
        Self::from_csv_reader(file)
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> AuditResult<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(AuditError::MissingHeader);
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            // Blank trailing lines in spreadsheet exports
            if record.iter().all(|c| c.trim().is_empty()) {
                continue;
            }
            rows.push(record.iter().map(|c| c.to_string()).collect());
        }

        Ok(RawAuditTable::new(headers, rows))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Exact (case-sensitive) column lookup
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Case-insensitive column lookup, ignoring surrounding whitespace
    pub fn column_index_ci(&self, name: &str) -> Option<usize> {
        let wanted = name.trim().to_lowercase();
        self.headers
            .iter()
            .position(|h| h.trim().to_lowercase() == wanted)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// All cells of one column, in row order
    pub fn column_values(&self, index: usize) -> Vec<&str> {
        self.rows
            .iter()
            .map(|row| row.get(index).map(|c| c.as_str()).unwrap_or(""))
            .collect()
    }

    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(|c| c.as_str())
            .unwrap_or("")
    }

    /// Names from `required` that are not present (exact match), in order
    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|name| !self.has_column(name))
            .map(|name| name.to_string())
            .collect()
    }

    /// Rename a column in place. Returns false when `from` is absent or `to`
    /// already exists.
    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        if self.has_column(to) {
            return false;
        }
        match self.column_index(from) {
            Some(idx) => {
                self.headers[idx] = to.to_string();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_from_csv_reader_pads_short_rows() {
        let csv = "Room Type,Rate,Occupied\nDeluxe,100\nSuite,150,1\n";
        let table = RawAuditTable::from_csv_reader(csv.as_bytes()).unwrap();

        assert_eq!(table.headers, vec!["Room Type", "Rate", "Occupied"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0], vec!["Deluxe", "100", ""]);
        assert_eq!(table.cell(1, 2), "1");
    }

    #[test]
    fn test_from_csv_reader_skips_blank_lines() {
        let csv = "Room Type,Rate\nDeluxe,100\n,\nSuite,150\n";
        let table = RawAuditTable::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_from_csv_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Type,Tariff,Arrival,Departure").unwrap();
        writeln!(file, "Deluxe,120,2025-04-24,2025-04-26").unwrap();
        file.flush().unwrap();

        let table = RawAuditTable::from_csv_path(file.path()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.column_index("Tariff"), Some(1));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = RawAuditTable::from_csv_path(Path::new("/nonexistent/audit.csv"));
        assert!(matches!(result, Err(AuditError::Io(_))));
    }

    #[test]
    fn test_column_lookup_case_insensitive() {
        let table = RawAuditTable::from_strs(&["Arrival Date", " departure date "], &[]);
        assert_eq!(table.column_index("arrival date"), None);
        assert_eq!(table.column_index_ci("ARRIVAL DATE"), Some(0));
        assert_eq!(table.column_index_ci("Departure Date"), Some(1));
    }

    #[test]
    fn test_missing_columns_keeps_order() {
        let table = RawAuditTable::from_strs(&["Rate"], &[]);
        let missing = table.missing_columns(&["Room Type", "Rate", "Occupied"]);
        assert_eq!(missing, vec!["Room Type", "Occupied"]);
    }

    #[test]
    fn test_rename_column_never_overwrites() {
        let mut table = RawAuditTable::from_strs(&["Status", "Occupied"], &[]);
        assert!(!table.rename_column("Status", "Occupied"));
        assert!(table.rename_column("Status", "Raw Status"));
        assert_eq!(table.headers, vec!["Raw Status", "Occupied"]);
    }
}
