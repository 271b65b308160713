// 🚨 Error Types
// Schema failures carry the exact missing columns so a caller can remap

use thiserror::Error;

/// Required columns are absent for the selected layout, or no stay-date
/// pair exists for occupancy inference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[{context}] missing required columns: {}", .missing.join(", "))]
pub struct SchemaError {
    /// Which check failed (layout name or "Occupancy")
    pub context: String,
    /// Column names the caller must provide or remap
    pub missing: Vec<String>,
}

impl SchemaError {
    pub fn new(context: &str, missing: Vec<String>) -> Self {
        SchemaError {
            context: context.to_string(),
            missing,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuditError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("failed to read audit table: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to open audit file: {0}")]
    Io(#[from] std::io::Error),

    #[error("audit file has no header row")]
    MissingHeader,
}

pub type AuditResult<T> = std::result::Result<T, AuditError>;
