//! The crawling cursor and its page-iteration protocol
//!
//! A [`CrawlingCursor`] owns the position within one crawl cycle (a page
//! index and size) and the watermark triple that carries progress across
//! cycles: the committed `last` value, its `previous` shadow recorded by the
//! overlap bookkeeping, and the per-page `current` scratch value reported
//! back by the page provider.
//!
//! The iteration protocol is: fetch page 0, then while [`has_next`] call
//! [`next`] and fetch again. The provider reports each page's maximum key
//! and whether the page was the last one via [`record_page`]. The harvesting
//! loop commits `current` into `last` only after a cycle that returned at
//! least one item; partial cycles must never commit.
//!
//! [`has_next`]: CrawlingCursor::has_next
//! [`next`]: CrawlingCursor::next
//! [`record_page`]: CrawlingCursor::record_page

use crate::cursor::watermark::{CursorMode, Watermark};
use crate::store::CursorSnapshot;
use std::time::Duration;
use thiserror::Error;

/// Errors produced by cursor construction and the iteration protocol
#[derive(Debug, Error)]
pub enum CursorError {
    #[error("Invalid cursor configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Cursor protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("Watermark mode mismatch: cursor is {expected}, value is {actual}")]
    ModeMismatch {
        expected: CursorMode,
        actual: CursorMode,
    },
}

/// Result type alias for cursor operations
pub type CursorResult<T> = std::result::Result<T, CursorError>;

/// Watermark-based cursor over a paginated, mutable collection
///
/// A cursor is created fresh for each crawl cycle, seeded from the
/// previously committed snapshot, and mutated in place while walking pages.
/// It is owned exclusively by one harvesting-loop execution; independent
/// collections are crawled by independent cursor instances.
#[derive(Debug, Clone)]
pub struct CrawlingCursor {
    mode: CursorMode,
    position: u32,
    page_size: u32,
    has_next: bool,
    last: Option<Watermark>,
    previous: Option<Watermark>,
    current: Option<Watermark>,
}

impl CrawlingCursor {
    /// Creates a cursor starting from scratch (no committed watermark)
    ///
    /// A scratch cursor performs an unfiltered scan of the collection on its
    /// first cycle.
    pub fn new(mode: CursorMode, page_size: u32) -> CursorResult<Self> {
        if page_size == 0 {
            return Err(CursorError::InvalidConfiguration(
                "page_size must be >= 1".to_string(),
            ));
        }
        Ok(Self {
            mode,
            position: 0,
            page_size,
            has_next: true,
            last: None,
            previous: None,
            current: None,
        })
    }

    /// Creates a cursor seeded from a persisted snapshot
    ///
    /// The position always restarts at zero: watermark advancement, not page
    /// offset, defines cross-cycle progress. The page size comes from the
    /// caller rather than the snapshot so a re-tuned configuration takes
    /// effect without resetting cursors.
    pub fn resume(snapshot: &CursorSnapshot, page_size: u32) -> CursorResult<Self> {
        let mut cursor = Self::new(snapshot.mode, page_size)?;
        for value in [snapshot.last, snapshot.previous].into_iter().flatten() {
            if value.mode() != snapshot.mode {
                return Err(CursorError::InvalidConfiguration(format!(
                    "snapshot for mode {} holds a {} watermark",
                    snapshot.mode,
                    value.mode()
                )));
            }
        }
        cursor.last = snapshot.last;
        cursor.previous = snapshot.previous;
        Ok(cursor)
    }

    /// Returns the active watermark family
    pub fn mode(&self) -> CursorMode {
        self.mode
    }

    /// Returns the zero-based page index of the current cycle
    pub fn position(&self) -> u32 {
        self.position
    }

    /// Returns the page size
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Returns whether another page should be fetched
    ///
    /// True before any fetch: a cursor always attempts its first page. After
    /// a fetch, reflects what the provider reported via [`record_page`].
    ///
    /// [`record_page`]: CrawlingCursor::record_page
    pub fn has_next(&self) -> bool {
        self.has_next
    }

    /// Advances to the next page position
    ///
    /// Touches no watermark field. Calling this when [`has_next`] is false
    /// is a programming error in the harvesting loop and is rejected rather
    /// than silently tolerated.
    ///
    /// [`has_next`]: CrawlingCursor::has_next
    pub fn next(&mut self) -> CursorResult<()> {
        if !self.has_next {
            return Err(CursorError::ProtocolViolation(
                "next() called with no next page available".to_string(),
            ));
        }
        self.position += 1;
        Ok(())
    }

    /// Records the outcome of a page fetch
    ///
    /// `max_key` is the maximum ordering key among the returned items (None
    /// when no returned item carries a key); `last_page` is true when the
    /// page was empty or its last item was the last item of the full
    /// filtered set. A failed fetch must not be recorded, so that a partial
    /// cycle never commits state derived from it.
    pub fn record_page(&mut self, max_key: Option<Watermark>, last_page: bool) -> CursorResult<()> {
        if let Some(key) = max_key {
            if key.mode() != self.mode {
                return Err(CursorError::ModeMismatch {
                    expected: self.mode,
                    actual: key.mode(),
                });
            }
        }
        self.current = max_key;
        self.has_next = !last_page;
        Ok(())
    }

    /// Records overlap bookkeeping for the committed watermark, at most once
    ///
    /// Called once per crawl cycle, before the first page fetch. When the
    /// committed watermark has no overlap recorded yet (`previous` unset),
    /// its value is shadowed into `previous`; in every other state the call
    /// is a no-op, which bounds reprocessing: a run of empty cycles does not
    /// keep re-expanding the scan window. The inclusive lower bound of the
    /// page fetch already replays items tied with the committed watermark,
    /// so no rewind of the watermark itself is performed. `overlap_window`
    /// is accepted for a future time-rewind variant; a rewind would have to
    /// sit behind this same guard.
    pub fn try_apply_overlap(&mut self, overlap_window: Duration) {
        if self.last.is_some() && self.previous.is_none() {
            tracing::debug!(
                watermark = %self.last.as_ref().map(ToString::to_string).unwrap_or_default(),
                window_secs = overlap_window.as_secs(),
                "recording overlap for committed watermark"
            );
            self.previous = self.last;
        }
    }

    /// Returns the committed watermark, if any
    pub fn last_watermark(&self) -> Option<Watermark> {
        self.last
    }

    /// Returns the overlap shadow of the committed watermark, if recorded
    pub fn previous_watermark(&self) -> Option<Watermark> {
        self.previous
    }

    /// Returns the per-page scratch watermark from the most recent fetch
    pub fn current_watermark(&self) -> Option<Watermark> {
        self.current
    }

    /// Sets the committed watermark; used by the harvesting loop to commit
    ///
    /// `previous` is deliberately left untouched: it marks that overlap
    /// bookkeeping has occurred, not the prior watermark value.
    pub fn set_last_watermark(&mut self, value: Watermark) -> CursorResult<()> {
        if value.mode() != self.mode {
            return Err(CursorError::ModeMismatch {
                expected: self.mode,
                actual: value.mode(),
            });
        }
        self.last = Some(value);
        Ok(())
    }

    /// Returns the committed last-update timestamp (time-based mode)
    pub fn last_entity_date(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.last.and_then(|w| w.as_date())
    }

    /// Returns the overlap shadow timestamp (time-based mode)
    pub fn previous_last_entity_date(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.previous.and_then(|w| w.as_date())
    }

    /// Returns the per-page scratch timestamp (time-based mode)
    pub fn current_last_entity_date(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.current.and_then(|w| w.as_date())
    }

    /// Commits a last-update timestamp (time-based mode)
    pub fn set_last_entity_date(&mut self, date: chrono::DateTime<chrono::Utc>) -> CursorResult<()> {
        self.set_last_watermark(Watermark::Date(date))
    }

    /// Returns the committed identifier (identifier-based mode)
    pub fn last_id(&self) -> Option<i64> {
        self.last.and_then(|w| w.as_id())
    }

    /// Returns the overlap shadow identifier (identifier-based mode)
    pub fn previous_last_id(&self) -> Option<i64> {
        self.previous.and_then(|w| w.as_id())
    }

    /// Returns the per-page scratch identifier (identifier-based mode)
    pub fn current_last_id(&self) -> Option<i64> {
        self.current.and_then(|w| w.as_id())
    }

    /// Commits an identifier (identifier-based mode)
    pub fn set_last_id(&mut self, id: i64) -> CursorResult<()> {
        self.set_last_watermark(Watermark::Id(id))
    }

    /// Produces the serializable snapshot handed to the cursor store
    ///
    /// The page position is never persisted; a new cycle always restarts at
    /// page zero.
    pub fn snapshot(&self) -> CursorSnapshot {
        CursorSnapshot {
            mode: self.mode,
            last: self.last,
            previous: self.previous,
            page_size: self.page_size,
        }
    }
}
