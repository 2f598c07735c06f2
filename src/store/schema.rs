//! Database schema definitions for the SQLite cursor store

use rusqlite::Connection;

/// SQL schema for the cursor database
///
/// One row per harvested source. Exactly one watermark column pair is
/// populated, matching the stored mode; the loader rejects rows that mix
/// families. Dates are stored as RFC 3339 text.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS crawl_cursors (
    source TEXT PRIMARY KEY,
    mode TEXT NOT NULL,
    last_entity_date TEXT,
    previous_last_entity_date TEXT,
    last_id INTEGER,
    previous_last_id INTEGER,
    page_size INTEGER NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

/// Initializes the database schema
///
/// Safe to call on every open; all statements are idempotent.
pub fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}
