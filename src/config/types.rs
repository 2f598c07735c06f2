use crate::cursor::CursorMode;
use serde::Deserialize;

/// Main configuration structure for a harvesting deployment
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub store: StoreConfig,
    #[serde(default, rename = "source")]
    pub sources: Vec<SourceConfig>,
}

/// Cursor store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Path of the SQLite cursor database
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// Per-source crawl configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Unique name of the harvested source; keys the cursor store
    pub name: String,

    /// Watermark family used to track progress on this source
    pub mode: CursorMode,

    /// Number of items per fetched page
    #[serde(rename = "page-size")]
    pub page_size: u32,

    /// Overlap window handed to the cursor at the start of each cycle
    #[serde(rename = "overlap-seconds", default = "default_overlap_seconds")]
    pub overlap_seconds: u64,
}

fn default_overlap_seconds() -> u64 {
    30
}
