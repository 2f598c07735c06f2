//! Lowmark: incremental crawling cursors for mutable collections
//!
//! This crate implements a watermark-based pagination mechanism used by
//! harvesting jobs to repeatedly scan a growing, concurrently-written
//! collection over time, feeding successive batches to a downstream
//! computation step. It guarantees at-least-once, bounded-reprocessing
//! delivery of items in non-decreasing watermark order: nothing is silently
//! dropped at a page boundary, and re-delivery is limited to the items tied
//! with the committed watermark.

pub mod config;
pub mod cursor;
pub mod harvest;
pub mod provider;
pub mod store;

use thiserror::Error;

/// Main error type for Lowmark operations
#[derive(Debug, Error)]
pub enum LowmarkError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cursor error: {0}")]
    Cursor(#[from] cursor::CursorError),

    #[error("Page provider error: {0}")]
    Provider(#[from] provider::ProviderError),

    #[error("Cursor store error: {0}")]
    Store(#[from] store::StoreError),

    #[error("Downstream consumer error: {0}")]
    Consumer(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for Lowmark operations
pub type Result<T> = std::result::Result<T, LowmarkError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use cursor::{CrawlingCursor, CursorMode, Watermark};
pub use harvest::{CrawlManager, CycleReport};
pub use provider::{CrawledPage, Harvestable, PageProvider};
pub use store::{CursorSnapshot, CursorStore};
