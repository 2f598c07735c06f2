//! Crawl manager - the harvesting loop
//!
//! The manager drives one source's crawl cycles end to end: it loads the
//! committed snapshot, applies overlap bookkeeping, walks pages through the
//! page provider while streaming each batch to the downstream consumer, and
//! enforces the commit discipline that closes the cursor's invariants:
//!
//! - a cycle that returned at least one keyed item commits the maximum key
//!   observed across all of its pages as the new watermark;
//! - an empty cycle leaves the stored snapshot exactly as it was;
//! - an aborted cycle (provider or consumer failure) never commits, so a
//!   partial maximum can never masquerade as a full-cycle result.

use crate::config::SourceConfig;
use crate::cursor::{CrawlingCursor, CursorError, CursorMode, Watermark};
use crate::provider::PageProvider;
use crate::store::CursorStore;
use crate::Result;
use std::cmp::Ordering;
use std::time::Duration;

/// Outcome of one crawl cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// Number of pages fetched (at least one, even for an empty cycle)
    pub pages: u32,

    /// Total items delivered to the consumer across all pages
    pub items: usize,

    /// Whether a new snapshot was committed to the cursor store
    pub committed: bool,

    /// The committed watermark after the cycle (unchanged if not committed)
    pub watermark: Option<Watermark>,
}

/// Harvesting loop for one source
///
/// A manager owns its page provider and cursor store exclusively for the
/// duration of each cycle; independent sources are harvested by independent
/// managers, which may run in parallel with no shared state.
pub struct CrawlManager<P, S> {
    source: String,
    mode: CursorMode,
    page_size: u32,
    overlap_window: Duration,
    provider: P,
    store: S,
}

impl<P, S> CrawlManager<P, S>
where
    P: PageProvider,
    S: CursorStore,
{
    /// Creates a manager for a configured source
    pub fn new(source: &SourceConfig, provider: P, store: S) -> Result<Self> {
        // Reject invalid paging before the first fetch ever happens
        CrawlingCursor::new(source.mode, source.page_size)?;

        Ok(Self {
            source: source.name.clone(),
            mode: source.mode,
            page_size: source.page_size,
            overlap_window: Duration::from_secs(source.overlap_seconds),
            provider,
            store,
        })
    }

    /// Returns the source name this manager harvests
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the page provider (e.g., to insert items in tests)
    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    /// Returns the cursor store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the cursor store mutably (e.g., to seed or reset a source)
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Consumes the manager, returning its provider and store
    pub fn into_parts(self) -> (P, S) {
        (self.provider, self.store)
    }

    /// Runs one full crawl cycle, streaming each page to `consume`
    ///
    /// Pages are handed over one at a time and never held collectively in
    /// memory. A provider or consumer error aborts the cycle before any
    /// commit; the stored snapshot then still describes the last complete
    /// cycle, and the next cycle safely re-covers the same window.
    pub fn run_cycle<F>(&mut self, mut consume: F) -> Result<CycleReport>
    where
        F: FnMut(Vec<P::Item>) -> Result<()>,
    {
        let snapshot = self.store.load(&self.source)?;
        let mut cursor = match &snapshot {
            Some(snapshot) => {
                // A reconfigured mode must not silently keep crawling in the
                // persisted one; the operator deletes the cursor to switch.
                if snapshot.mode != self.mode {
                    return Err(CursorError::ModeMismatch {
                        expected: self.mode,
                        actual: snapshot.mode,
                    }
                    .into());
                }
                CrawlingCursor::resume(snapshot, self.page_size)?
            }
            None => CrawlingCursor::new(self.mode, self.page_size)?,
        };

        cursor.try_apply_overlap(self.overlap_window);

        tracing::info!(
            source = %self.source,
            from_scratch = snapshot.is_none(),
            watermark = %cursor
                .last_watermark()
                .map(|w| w.to_string())
                .unwrap_or_else(|| "none".to_string()),
            "starting crawl cycle"
        );

        let mut pages = 0u32;
        let mut total_items = 0usize;
        let mut cycle_max: Option<Watermark> = None;

        loop {
            let page = self.provider.fetch_page(&cursor)?;
            pages += 1;

            cursor.record_page(page.max_key, page.last_page)?;
            if let Some(key) = page.max_key {
                cycle_max = Some(match cycle_max {
                    Some(max) if matches!(max.partial_cmp(&key), Some(Ordering::Greater)) => max,
                    _ => key,
                });
            }

            tracing::debug!(
                source = %self.source,
                page = cursor.position(),
                items = page.items.len(),
                last_page = page.last_page,
                "fetched page"
            );

            total_items += page.items.len();
            if !page.items.is_empty() {
                consume(page.items)?;
            }

            if !cursor.has_next() {
                break;
            }
            cursor.next()?;
        }

        // Commit discipline: only a cycle that produced keyed items advances
        // the stored watermark. Empty cycles leave the store untouched so
        // the next cycle re-enters from the identical position.
        let committed = match cycle_max {
            Some(max) if total_items > 0 => {
                cursor.set_last_watermark(max)?;
                self.store.save(&self.source, &cursor.snapshot())?;
                true
            }
            _ => false,
        };

        let report = CycleReport {
            pages,
            items: total_items,
            committed,
            watermark: cursor.last_watermark(),
        };

        tracing::info!(
            source = %self.source,
            pages = report.pages,
            items = report.items,
            committed = report.committed,
            "crawl cycle finished"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{CrawledPage, Harvestable, InMemoryProvider, ProviderError};
    use crate::store::{CursorStore, MemoryCursorStore};
    use crate::LowmarkError;
    use chrono::{DateTime, TimeZone, Utc};

    #[derive(Debug, Clone)]
    struct Doc {
        id: i64,
        updated: Option<DateTime<Utc>>,
    }

    impl Harvestable for Doc {
        fn last_update(&self) -> Option<DateTime<Utc>> {
            self.updated
        }

        fn sequence_id(&self) -> Option<i64> {
            Some(self.id)
        }
    }

    fn doc(id: i64) -> Doc {
        Doc {
            id,
            updated: Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()),
        }
    }

    fn source_config(mode: CursorMode, page_size: u32) -> SourceConfig {
        SourceConfig {
            name: "test-source".to_string(),
            mode,
            page_size,
            overlap_seconds: 30,
        }
    }

    /// Provider that fails on the n-th fetch of its lifetime
    struct FailingProvider {
        inner: InMemoryProvider<Doc>,
        fail_on_fetch: u32,
        fetches: u32,
    }

    impl PageProvider for FailingProvider {
        type Item = Doc;

        fn fetch_page(&mut self, cursor: &CrawlingCursor) -> std::result::Result<CrawledPage<Doc>, ProviderError> {
            self.fetches += 1;
            if self.fetches == self.fail_on_fetch {
                return Err(ProviderError::Query("connection reset".to_string()));
            }
            self.inner.fetch_page(cursor)
        }
    }

    #[test]
    fn test_new_rejects_zero_page_size() {
        let provider = InMemoryProvider::<Doc>::new(vec![]);
        let store = MemoryCursorStore::new();
        let result = CrawlManager::new(&source_config(CursorMode::FromLastId, 0), provider, store);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_cycle_commits_nothing() {
        let provider = InMemoryProvider::<Doc>::new(vec![]);
        let store = MemoryCursorStore::new();
        let mut manager =
            CrawlManager::new(&source_config(CursorMode::FromLastId, 2), provider, store).unwrap();

        let report = manager.run_cycle(|_| Ok(())).unwrap();
        assert_eq!(report.pages, 1);
        assert_eq!(report.items, 0);
        assert!(!report.committed);
        assert!(manager.store().load("test-source").unwrap().is_none());
    }

    #[test]
    fn test_cycle_commits_max_key() {
        let provider = InMemoryProvider::new(vec![doc(3), doc(1), doc(2)]);
        let store = MemoryCursorStore::new();
        let mut manager =
            CrawlManager::new(&source_config(CursorMode::FromLastId, 2), provider, store).unwrap();

        let mut seen = Vec::new();
        let report = manager
            .run_cycle(|batch| {
                seen.extend(batch.iter().map(|d| d.id));
                Ok(())
            })
            .unwrap();

        assert_eq!(seen, vec![1, 2, 3]);
        assert_eq!(report.pages, 2);
        assert!(report.committed);
        assert_eq!(report.watermark, Some(Watermark::Id(3)));

        let snapshot = manager.store().load("test-source").unwrap().unwrap();
        assert_eq!(snapshot.last, Some(Watermark::Id(3)));
        // First cycle ran from scratch; no overlap was recorded
        assert_eq!(snapshot.previous, None);
    }

    #[test]
    fn test_provider_failure_aborts_without_commit() {
        let inner = InMemoryProvider::new((1..=5).map(doc).collect());
        let provider = FailingProvider {
            inner,
            fail_on_fetch: 2,
            fetches: 0,
        };
        let store = MemoryCursorStore::new();
        let mut manager =
            CrawlManager::new(&source_config(CursorMode::FromLastId, 2), provider, store).unwrap();

        let result = manager.run_cycle(|_| Ok(()));
        assert!(matches!(result, Err(LowmarkError::Provider(_))));
        // The partial cycle saw items 1 and 2, but nothing was committed
        assert!(manager.store().load("test-source").unwrap().is_none());
    }

    #[test]
    fn test_consumer_failure_aborts_without_commit() {
        let provider = InMemoryProvider::new((1..=5).map(doc).collect());
        let store = MemoryCursorStore::new();
        let mut manager =
            CrawlManager::new(&source_config(CursorMode::FromLastId, 2), provider, store).unwrap();

        let result = manager.run_cycle(|_| Err(LowmarkError::Consumer("index full".to_string())));
        assert!(matches!(result, Err(LowmarkError::Consumer(_))));
        assert!(manager.store().load("test-source").unwrap().is_none());
    }

    #[test]
    fn test_reconfigured_mode_rejects_persisted_snapshot() {
        let mut store = MemoryCursorStore::new();
        store
            .save(
                "test-source",
                &crate::store::CursorSnapshot {
                    mode: CursorMode::FromLastId,
                    last: Some(Watermark::Id(9)),
                    previous: None,
                    page_size: 2,
                },
            )
            .unwrap();

        // Config now says time-based, but the stored cursor is id-based
        let provider = InMemoryProvider::<Doc>::new(vec![]);
        let mut manager = CrawlManager::new(
            &source_config(CursorMode::SinceLastUpdate, 2),
            provider,
            store,
        )
        .unwrap();

        let result = manager.run_cycle(|_| Ok(()));
        assert!(matches!(
            result,
            Err(LowmarkError::Cursor(CursorError::ModeMismatch { .. }))
        ));
        // The stored snapshot is untouched by the refused cycle
        let snapshot = manager.store().load("test-source").unwrap().unwrap();
        assert_eq!(snapshot.last, Some(Watermark::Id(9)));
    }

    #[test]
    fn test_keyless_items_never_commit() {
        let items = (0..3)
            .map(|_| Doc {
                id: 0,
                updated: None,
            })
            .collect::<Vec<_>>();
        let provider = InMemoryProvider::new(items);
        let store = MemoryCursorStore::new();
        // Time-based crawl over items that carry no timestamp
        let mut manager = CrawlManager::new(
            &source_config(CursorMode::SinceLastUpdate, 2),
            provider,
            store,
        )
        .unwrap();

        let report = manager.run_cycle(|_| Ok(())).unwrap();
        assert_eq!(report.items, 3);
        assert!(!report.committed);
        assert!(manager.store().load("test-source").unwrap().is_none());
    }
}
