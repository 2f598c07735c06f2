//! Cursor module: watermark families and the crawling cursor
//!
//! This module contains the unit of progress for incremental harvesting:
//! - The watermark families (timestamp or identifier) and their mode tag
//! - The crawling cursor owning page position and the watermark triple

mod crawling;
mod watermark;

pub use crawling::{CrawlingCursor, CursorError, CursorResult};
pub use watermark::{CursorMode, Watermark};
