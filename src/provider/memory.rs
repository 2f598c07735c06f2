//! Vec-backed page provider
//!
//! Reference implementation of the page-provider contract over an in-memory
//! collection. Used by the test suite to simulate a live, concurrently
//! written table; also handy for embedders harvesting small collections that
//! are already materialized.

use crate::cursor::{CrawlingCursor, Watermark};
use crate::provider::{CrawledPage, Harvestable, PageProvider, ProviderResult};
use std::cmp::Ordering;

/// Page provider over an in-memory vector of items
///
/// Items may be inserted between crawl cycles to simulate concurrent
/// writers; each fetch re-sorts and re-filters, the same way a database
/// query would observe the latest collection state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider<T> {
    items: Vec<T>,
}

impl<T: Harvestable + Clone> InMemoryProvider<T> {
    /// Creates a provider over the given collection
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    /// Inserts one item, as a concurrent writer would
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Inserts a batch of items
    pub fn extend(&mut self, items: impl IntoIterator<Item = T>) {
        self.items.extend(items);
    }

    /// Returns the current number of items in the collection
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true when the collection is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Harvestable + Clone> PageProvider for InMemoryProvider<T> {
    type Item = T;

    fn fetch_page(&mut self, cursor: &CrawlingCursor) -> ProviderResult<CrawledPage<T>> {
        let mode = cursor.mode();

        // Ascending by active key, keyless items last (stable)
        let mut sorted: Vec<&T> = self.items.iter().collect();
        sorted.sort_by(|a, b| match (a.key(mode), b.key(mode)) {
            (Some(ka), Some(kb)) => ka.partial_cmp(&kb).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });

        // Inclusive lower bound; unfiltered scan when no watermark is set
        let filtered: Vec<&T> = match cursor.last_watermark() {
            Some(watermark) => sorted
                .into_iter()
                .filter(|item| {
                    item.key(mode).is_some_and(|key| {
                        matches!(
                            key.partial_cmp(&watermark),
                            Some(Ordering::Greater | Ordering::Equal)
                        )
                    })
                })
                .collect(),
            None => sorted,
        };

        let offset = (cursor.position() as usize) * (cursor.page_size() as usize);
        let end = filtered.len().min(offset + cursor.page_size() as usize);
        let slice: &[&T] = if offset < end { &filtered[offset..end] } else { &[] };

        let max_key = slice
            .iter()
            .filter_map(|item| item.key(mode))
            .fold(None, |max: Option<Watermark>, key| match max {
                Some(max) if matches!(max.partial_cmp(&key), Some(Ordering::Greater)) => Some(max),
                _ => Some(key),
            });

        Ok(CrawledPage {
            items: slice.iter().map(|item| (*item).clone()).collect(),
            max_key,
            last_page: slice.is_empty() || end >= filtered.len(),
        })
    }
}
