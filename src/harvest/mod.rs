//! Harvesting module: the crawl-cycle driver
//!
//! This module contains the loop that owns a cursor for the duration of one
//! crawl cycle and enforces the commit discipline between the page provider
//! and the cursor store.

mod manager;

pub use manager::{CrawlManager, CycleReport};
