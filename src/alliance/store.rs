//! Read-only access to the alliance database.
//!
//! The database is owned by the import tooling. The tables read here are:
//!
//! ```sql
//! alliance(id INTEGER PRIMARY KEY, server INTEGER, tag TEXT, name TEXT)
//! alliance_data(alliance_id INTEGER, date TEXT, tag TEXT, name TEXT,
//!               power INTEGER, gift_level INTEGER, member_count INTEGER)
//! ```

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};
use std::path::Path;

use super::{AllianceRecord, Snapshot};

/// Result of looking an alliance up by tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Found(AllianceRecord),
    NotFound,
    Failed(String),
}

/// A persisted collection of known alliances.
pub trait AllianceStore {
    fn lookup_by_tag(&self, server_id: i64, tag: &str) -> Lookup;
}

/// Alliance store backed by the SQLite database.
pub struct SqliteStore {
    conn: Connection,
}

fn row_to_snapshot(row: &Row) -> Result<Snapshot, rusqlite::Error> {
    let date: String = row.get("date")?;
    let capture_date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;

    Ok(Snapshot {
        capture_date,
        tag: row.get("tag")?,
        name: row.get("name")?,
        power: row.get("power")?,
        gift_level: row.get("gift_level")?,
        member_count: row.get("member_count")?,
    })
}

impl SqliteStore {
    /// Opens the database read-only.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .with_context(|| format!("Failed to open alliance database {}", path.display()))?;
        Ok(Self { conn })
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    fn find(&self, server_id: i64, tag: &str) -> rusqlite::Result<Option<AllianceRecord>> {
        let alliance = self
            .conn
            .query_row(
                "SELECT id, name FROM alliance WHERE server = ?1 AND tag = ?2",
                params![server_id, tag],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        let Some((id, name)) = alliance else {
            return Ok(None);
        };

        let mut stmt = self.conn.prepare(
            "SELECT date, tag, name, power, gift_level, member_count
             FROM alliance_data
             WHERE alliance_id = ?1
             ORDER BY date",
        )?;
        let history = stmt
            .query_map(params![id], row_to_snapshot)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(AllianceRecord {
            server_id,
            tag: tag.to_string(),
            name,
            history,
        }))
    }
}

impl AllianceStore for SqliteStore {
    fn lookup_by_tag(&self, server_id: i64, tag: &str) -> Lookup {
        match self.find(server_id, tag) {
            Ok(Some(record)) => Lookup::Found(record),
            Ok(None) => Lookup::NotFound,
            Err(e) => Lookup::Failed(e.to_string()),
        }
    }
}
