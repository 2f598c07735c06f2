//! SQLite cursor store implementation
//!
//! This module provides a SQLite-based implementation of the CursorStore
//! trait, suitable for harvesting jobs that need progress to survive process
//! restarts without a full database server.

use crate::cursor::{CursorMode, Watermark};
use crate::store::schema::initialize_schema;
use crate::store::{CursorSnapshot, CursorStore, StoreError, StoreResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite cursor store backend
pub struct SqliteCursorStore {
    conn: Connection,
}

impl SqliteCursorStore {
    /// Opens (or creates) a cursor database at the given path
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn snapshot_from_row(source: &str, row: &Row<'_>) -> rusqlite::Result<RawCursorRow> {
        Ok(RawCursorRow {
            source: source.to_string(),
            mode: row.get(0)?,
            last_entity_date: row.get(1)?,
            previous_last_entity_date: row.get(2)?,
            last_id: row.get(3)?,
            previous_last_id: row.get(4)?,
            page_size: row.get(5)?,
        })
    }
}

/// Raw column values of one cursor row, before mode validation
struct RawCursorRow {
    source: String,
    mode: String,
    last_entity_date: Option<String>,
    previous_last_entity_date: Option<String>,
    last_id: Option<i64>,
    previous_last_id: Option<i64>,
    page_size: u32,
}

impl RawCursorRow {
    fn into_snapshot(self) -> StoreResult<CursorSnapshot> {
        let corrupt = |message: &str| StoreError::Corrupt {
            source_name: self.source.clone(),
            message: message.to_string(),
        };

        let mode = CursorMode::from_db_string(&self.mode)
            .ok_or_else(|| corrupt(&format!("unknown mode '{}'", self.mode)))?;

        let (last, previous) = match mode {
            CursorMode::SinceLastUpdate => {
                if self.last_id.is_some() || self.previous_last_id.is_some() {
                    return Err(corrupt("id columns populated for a time-based cursor"));
                }
                (
                    parse_date(&self.source, self.last_entity_date.as_deref())?,
                    parse_date(&self.source, self.previous_last_entity_date.as_deref())?,
                )
            }
            CursorMode::FromLastId => {
                if self.last_entity_date.is_some() || self.previous_last_entity_date.is_some() {
                    return Err(corrupt("date columns populated for an id-based cursor"));
                }
                (
                    self.last_id.map(Watermark::Id),
                    self.previous_last_id.map(Watermark::Id),
                )
            }
        };

        Ok(CursorSnapshot {
            mode,
            last,
            previous,
            page_size: self.page_size,
        })
    }
}

fn parse_date(source: &str, text: Option<&str>) -> StoreResult<Option<Watermark>> {
    match text {
        None => Ok(None),
        Some(text) => {
            let date = DateTime::parse_from_rfc3339(text).map_err(|e| StoreError::Corrupt {
                source_name: source.to_string(),
                message: format!("invalid date '{}': {}", text, e),
            })?;
            Ok(Some(Watermark::Date(date.with_timezone(&Utc))))
        }
    }
}

fn date_column(value: Option<Watermark>) -> Option<String> {
    value.and_then(|w| w.as_date()).map(|d| d.to_rfc3339())
}

fn id_column(value: Option<Watermark>) -> Option<i64> {
    value.and_then(|w| w.as_id())
}

impl CursorStore for SqliteCursorStore {
    fn load(&self, source: &str) -> StoreResult<Option<CursorSnapshot>> {
        let mut stmt = self.conn.prepare(
            "SELECT mode, last_entity_date, previous_last_entity_date,
                    last_id, previous_last_id, page_size
             FROM crawl_cursors WHERE source = ?1",
        )?;

        let raw = stmt
            .query_row(params![source], |row| Self::snapshot_from_row(source, row))
            .optional()?;

        raw.map(RawCursorRow::into_snapshot).transpose()
    }

    fn save(&mut self, source: &str, snapshot: &CursorSnapshot) -> StoreResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT OR REPLACE INTO crawl_cursors
                 (source, mode, last_entity_date, previous_last_entity_date,
                  last_id, previous_last_id, page_size, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                source,
                snapshot.mode.to_db_string(),
                date_column(snapshot.last),
                date_column(snapshot.previous),
                id_column(snapshot.last),
                id_column(snapshot.previous),
                snapshot.page_size,
                now,
            ],
        )?;
        Ok(())
    }

    fn delete(&mut self, source: &str) -> StoreResult<()> {
        self.conn
            .execute("DELETE FROM crawl_cursors WHERE source = ?1", params![source])?;
        Ok(())
    }

    fn list_sources(&self) -> StoreResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT source FROM crawl_cursors ORDER BY source")?;
        let sources = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(sources)
    }
}
