//! Cursor store: persistence of committed crawl progress
//!
//! A cursor store keeps one snapshot per harvested source, written only when
//! a crawl cycle returned at least one item. The snapshot carries the
//! watermark pair and the mode; the page position is never persisted since
//! watermark advancement, not page offset, defines cross-cycle progress.

mod memory;
mod schema;
mod sqlite;

pub use memory::MemoryCursorStore;
pub use sqlite::SqliteCursorStore;

use crate::cursor::{CursorMode, Watermark};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during cursor store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // `source` is reserved by thiserror for the error cause, hence the name
    #[error("Corrupt cursor row for source '{source_name}': {message}")]
    Corrupt {
        source_name: String,
        message: String,
    },
}

/// Result type for cursor store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Serializable snapshot of a cursor's committed progress
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CursorSnapshot {
    /// Active watermark family
    pub mode: CursorMode,

    /// Committed watermark; None means the source has never produced items
    pub last: Option<Watermark>,

    /// Overlap shadow; set once overlap bookkeeping ran for `last`
    pub previous: Option<Watermark>,

    /// Page size in effect when the snapshot was written (informational)
    pub page_size: u32,
}

/// Trait for cursor store backends
///
/// Implementations keep one snapshot per source name. The harvesting loop
/// loads at the start of a cycle and saves only after a cycle that returned
/// items; an aborted or empty cycle leaves the stored snapshot untouched.
pub trait CursorStore {
    /// Loads the snapshot for a source, or None for a never-committed source
    fn load(&self, source: &str) -> StoreResult<Option<CursorSnapshot>>;

    /// Saves (inserts or replaces) the snapshot for a source
    fn save(&mut self, source: &str, snapshot: &CursorSnapshot) -> StoreResult<()>;

    /// Deletes the snapshot for a source, forcing its next crawl from scratch
    fn delete(&mut self, source: &str) -> StoreResult<()>;

    /// Lists all sources with a persisted snapshot
    fn list_sources(&self) -> StoreResult<Vec<String>>;
}
