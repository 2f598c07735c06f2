//! Page provider contract
//!
//! A page provider executes the physical paged query against the harvested
//! collection on behalf of a [`CrawlingCursor`]: given the cursor's active
//! watermark and page coordinates, it returns the matching slice of items
//! in ascending key order and reports the page's maximum key and whether
//! further pages remain.
//!
//! The lower bound of the query is **inclusive** (`>=` the active
//! watermark). This guarantees that no item sharing the exact boundary value
//! with the previous cycle's last-seen item is silently dropped when keys
//! tie; the unavoidable cost is that items tied with the boundary are
//! re-delivered, so downstream consumers must be idempotent with respect to
//! the boundary tie group.
//!
//! [`CrawlingCursor`]: crate::cursor::CrawlingCursor

mod memory;

pub use memory::InMemoryProvider;

use crate::cursor::{CrawlingCursor, CursorMode, Watermark};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors a page provider can surface to the harvesting loop
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Page query failed: {0}")]
    Query(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for page provider operations
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// One fetched page plus the feedback the cursor protocol requires
#[derive(Debug, Clone)]
pub struct CrawledPage<T> {
    /// Items of the page, ascending by the active ordering key
    pub items: Vec<T>,

    /// Maximum ordering key among the returned items; None when no returned
    /// item carries a key
    pub max_key: Option<Watermark>,

    /// True when the page is empty or its last item is the last item of the
    /// full filtered set
    pub last_page: bool,
}

/// Trait for page providers backing a harvested collection
///
/// Implementations must honor the inclusive-bound contract described in the
/// module documentation. A failed fetch must leave no trace in the cursor;
/// the harvesting loop aborts the cycle without committing.
pub trait PageProvider {
    /// Item type of the harvested collection
    type Item;

    /// Fetches the page addressed by the cursor's position and watermark
    fn fetch_page(&mut self, cursor: &CrawlingCursor) -> ProviderResult<CrawledPage<Self::Item>>;
}

/// Trait for items of a harvested collection
///
/// The cursor never inspects item payload beyond the ordering key; an item
/// exposes whichever keys the collection carries and reports None for the
/// rest. Items without the active key are only visible to unfiltered
/// (from-scratch) scans and never advance the watermark.
pub trait Harvestable {
    /// Last-update timestamp, for time-based crawls
    fn last_update(&self) -> Option<DateTime<Utc>> {
        None
    }

    /// Integer identifier, for identifier-based crawls
    fn sequence_id(&self) -> Option<i64> {
        None
    }

    /// The ordering key under the given mode, if the item carries one
    fn key(&self, mode: CursorMode) -> Option<Watermark> {
        match mode {
            CursorMode::SinceLastUpdate => self.last_update().map(Watermark::Date),
            CursorMode::FromLastId => self.sequence_id().map(Watermark::Id),
        }
    }
}
