//! Configuration module
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files describing the cursor store and the harvested sources.
//!
//! # Example
//!
//! ```no_run
//! use lowmark::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! for source in &config.sources {
//!     println!("source {} crawls {} items per page", source.name, source.page_size);
//! }
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, SourceConfig, StoreConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config};
