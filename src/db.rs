// 🗄️ SQLite persistence adapter
// Stores nightly audit summaries and rate suggestions; reads rate history back
// for the forecaster and optimizer.

use crate::aggregate::AuditSummary;
use crate::forecast::{RateHistoryEntry, HISTORY_TIMESTAMP_FORMAT};
use crate::pricing::DayType;
use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use rusqlite::{params, Connection};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One nightly audit ready to be stored
#[derive(Debug, Clone)]
pub struct AuditRecord {
    pub user_id: String,
    pub date: NaiveDate,
    pub hotel_name: String,
    pub summary: AuditSummary,
    /// Pass-through columns, already serialized
    pub extra_fields: Option<String>,
}

impl AuditRecord {
    /// Compute fingerprint for duplicate detection
    /// Same user + night + summary = same audit, whatever the upload time
    pub fn compute_fingerprint(&self) -> Result<String> {
        let summary_json = self.summary.to_summary_json()?;
        let mut hasher = Sha256::new();
        hasher.update(format!(
            "{}|{}|{}",
            self.user_id,
            self.date.format(DATE_FORMAT),
            summary_json
        ));
        Ok(format!("{:x}", hasher.finalize()))
    }
}

/// One saved rate suggestion
#[derive(Debug, Clone)]
pub struct RateSuggestionRecord {
    pub user_id: String,
    pub timestamp: NaiveDateTime,
    pub occupancy_pct: u32,
    pub competitor_rate: f64,
    pub event_today: bool,
    pub day_type: DayType,
    pub currency: String,
    pub suggested_rate: f64,
    pub hotel_name: String,
}

/// Audit read back from history
#[derive(Debug, Clone, PartialEq)]
pub struct StoredAudit {
    pub date: NaiveDate,
    pub occupancy_pct: u32,
    pub adr: f64,
    pub hotel_name: String,
    pub summary: AuditSummary,
}

/// Open (creating parent directories) and initialize the database file
pub fn open_database(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database {}", path.display()))?;
    setup_database(&conn)?;
    Ok(conn)
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS night_audit_history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            fingerprint TEXT UNIQUE NOT NULL,
            user_id TEXT NOT NULL,
            date TEXT NOT NULL,
            occupancy INTEGER NOT NULL,
            adr REAL NOT NULL,
            summary_data TEXT NOT NULL,
            extra_fields TEXT,
            room_breakdown TEXT,
            hotel_name TEXT,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS rate_history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            entry_uuid TEXT UNIQUE NOT NULL,
            user_id TEXT NOT NULL,
            timestamp TEXT NOT NULL,
            occupancy INTEGER,
            competitor_rate REAL,
            local_event TEXT,
            day_type TEXT,
            currency TEXT,
            suggested_rate REAL NOT NULL,
            hotel_name TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_audit_user_date ON night_audit_history(user_id, date)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_rate_user_timestamp ON rate_history(user_id, timestamp)",
        [],
    )?;

    Ok(())
}

/// Store an audit summary. Returns false when the same audit was already stored.
pub fn insert_audit_summary(conn: &Connection, record: &AuditRecord) -> Result<bool> {
    let fingerprint = record.compute_fingerprint()?;
    let summary_json = record.summary.to_summary_json()?;
    let breakdown_json = record.summary.room_breakdown_json()?;

    let result = conn.execute(
        "INSERT INTO night_audit_history (
            fingerprint, user_id, date, occupancy, adr,
            summary_data, extra_fields, room_breakdown, hotel_name, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            fingerprint,
            record.user_id,
            record.date.format(DATE_FORMAT).to_string(),
            record.summary.occupancy_pct,
            record.summary.adr,
            summary_json,
            record.extra_fields,
            breakdown_json,
            record.hotel_name,
            Utc::now().to_rfc3339(),
        ],
    );

    match result {
        Ok(_) => {
            info!(user_id = record.user_id.as_str(), date = %record.date, "audit summary saved");
            Ok(true)
        }
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            debug!(fingerprint = fingerprint.as_str(), "audit already stored, skipping");
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

/// Append a rate suggestion to the history log; returns the entry id
pub fn insert_rate_suggestion(conn: &Connection, record: &RateSuggestionRecord) -> Result<String> {
    let entry_uuid = uuid::Uuid::new_v4().to_string();

    conn.execute(
        "INSERT INTO rate_history (
            entry_uuid, user_id, timestamp, occupancy, competitor_rate,
            local_event, day_type, currency, suggested_rate, hotel_name
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            entry_uuid,
            record.user_id,
            record.timestamp.format(HISTORY_TIMESTAMP_FORMAT).to_string(),
            record.occupancy_pct,
            record.competitor_rate,
            if record.event_today { "Yes" } else { "No" },
            record.day_type.name(),
            record.currency,
            record.suggested_rate,
            record.hotel_name,
        ],
    )
    .context("Failed to insert rate suggestion")?;

    Ok(entry_uuid)
}

/// Rate history for one user at or after `since`, oldest first
///
/// Rows whose timestamp cannot be parsed are skipped.
pub fn get_rate_history(
    conn: &Connection,
    user_id: &str,
    since: NaiveDateTime,
) -> Result<Vec<RateHistoryEntry>> {
    let mut stmt = conn.prepare(
        "SELECT timestamp, suggested_rate, occupancy
         FROM rate_history
         WHERE user_id = ?1 AND timestamp >= ?2
         ORDER BY timestamp ASC",
    )?;

    let rows = stmt
        .query_map(
            params![user_id, since.format(HISTORY_TIMESTAMP_FORMAT).to_string()],
            |row| {
                let timestamp: String = row.get(0)?;
                let rate: f64 = row.get(1)?;
                let occupancy: Option<f64> = row.get(2)?;
                Ok((timestamp, rate, occupancy))
            },
        )?
        .collect::<Result<Vec<_>, _>>()?;

    let mut entries = Vec::with_capacity(rows.len());
    for (timestamp, suggested_rate, occupancy_pct) in rows {
        match NaiveDateTime::parse_from_str(&timestamp, HISTORY_TIMESTAMP_FORMAT) {
            Ok(timestamp) => entries.push(RateHistoryEntry {
                timestamp,
                suggested_rate,
                occupancy_pct,
            }),
            Err(_) => debug!(timestamp = timestamp.as_str(), "skipping unparseable history row"),
        }
    }

    Ok(entries)
}

/// Last `limit` audits for a user, oldest first
pub fn get_recent_audits(conn: &Connection, user_id: &str, limit: usize) -> Result<Vec<StoredAudit>> {
    let mut stmt = conn.prepare(
        "SELECT date, occupancy, adr, hotel_name, summary_data, room_breakdown
         FROM night_audit_history
         WHERE user_id = ?1
         ORDER BY date DESC, id DESC
         LIMIT ?2",
    )?;

    let rows = stmt
        .query_map(params![user_id, limit as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u32>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, Option<String>>(5)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut audits = Vec::with_capacity(rows.len());
    for (date, occupancy_pct, adr, hotel_name, summary_json, breakdown_json) in rows.into_iter().rev() {
        let date = NaiveDate::parse_from_str(&date, DATE_FORMAT)
            .with_context(|| format!("Invalid audit date {}", date))?;
        let summary = AuditSummary::from_summary_json(&summary_json, breakdown_json.as_deref())
            .context("Failed to decode stored audit summary")?;

        audits.push(StoredAudit {
            date,
            occupancy_pct,
            adr,
            hotel_name: hotel_name.unwrap_or_default(),
            summary,
        });
    }

    Ok(audits)
}

/// Count stored audits for a user
pub fn count_audits(conn: &Connection, user_id: &str) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM night_audit_history WHERE user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )?;
    Ok(count)
}
