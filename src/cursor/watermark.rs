//! Watermark families for crawl progress tracking
//!
//! A watermark is the scalar progress marker below which all items of a
//! harvested collection are considered already processed. Two families
//! exist: a last-update timestamp and a monotonically assigned integer
//! identifier. Exactly one family is active per cursor, selected by
//! [`CursorMode`]; the families are modeled as a tagged variant so a cursor
//! can never hold a value from the wrong family.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Selects which watermark family a cursor tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CursorMode {
    /// Crawl items whose last-update timestamp is at or past the watermark
    SinceLastUpdate,

    /// Crawl items whose identifier is at or past the watermark
    FromLastId,
}

impl CursorMode {
    /// Converts the mode to a database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::SinceLastUpdate => "since_last_update",
            Self::FromLastId => "from_last_id",
        }
    }

    /// Parses a mode from a database string representation
    ///
    /// Returns None if the string doesn't match any known mode.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "since_last_update" => Some(Self::SinceLastUpdate),
            "from_last_id" => Some(Self::FromLastId),
            _ => None,
        }
    }
}

impl fmt::Display for CursorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

/// A single watermark value, tagged with its family
///
/// Watermarks of different families are never ordered relative to each
/// other: `partial_cmp` returns `None` across variants. Within one crawl a
/// cursor only ever produces and consumes values of its own mode, so the
/// mixed case indicates a programming error upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Watermark {
    /// Last-update timestamp of an item
    Date(DateTime<Utc>),

    /// Integer identifier of an item
    Id(i64),
}

impl Watermark {
    /// Returns the mode this watermark value belongs to
    pub fn mode(&self) -> CursorMode {
        match self {
            Self::Date(_) => CursorMode::SinceLastUpdate,
            Self::Id(_) => CursorMode::FromLastId,
        }
    }

    /// Extracts the timestamp, if this is a date watermark
    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Date(date) => Some(*date),
            Self::Id(_) => None,
        }
    }

    /// Extracts the identifier, if this is an id watermark
    pub fn as_id(&self) -> Option<i64> {
        match self {
            Self::Date(_) => None,
            Self::Id(id) => Some(*id),
        }
    }
}

impl PartialOrd for Watermark {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Date(a), Self::Date(b)) => Some(a.cmp(b)),
            (Self::Id(a), Self::Id(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Watermark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(date) => write!(f, "{}", date.to_rfc3339()),
            Self::Id(id) => write!(f, "{}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_mode_db_string_roundtrip() {
        for mode in [CursorMode::SinceLastUpdate, CursorMode::FromLastId] {
            let db_str = mode.to_db_string();
            assert_eq!(CursorMode::from_db_string(db_str), Some(mode));
        }
        assert_eq!(CursorMode::from_db_string("invalid"), None);
    }

    #[test]
    fn test_watermark_mode() {
        let date = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(Watermark::Date(date).mode(), CursorMode::SinceLastUpdate);
        assert_eq!(Watermark::Id(42).mode(), CursorMode::FromLastId);
    }

    #[test]
    fn test_ordering_within_family() {
        let earlier = Watermark::Date(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
        let later = Watermark::Date(Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap());
        assert!(earlier < later);
        assert!(Watermark::Id(1) < Watermark::Id(2));
        assert!(Watermark::Id(2) <= Watermark::Id(2));
    }

    #[test]
    fn test_no_ordering_across_families() {
        let date = Watermark::Date(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
        let id = Watermark::Id(1);
        assert_eq!(date.partial_cmp(&id), None);
        assert_eq!(id.partial_cmp(&date), None);
        assert_ne!(date, id);
    }

    #[test]
    fn test_extractors() {
        let date = Utc.with_ymd_and_hms(2020, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(Watermark::Date(date).as_date(), Some(date));
        assert_eq!(Watermark::Date(date).as_id(), None);
        assert_eq!(Watermark::Id(7).as_id(), Some(7));
        assert_eq!(Watermark::Id(7).as_date(), None);
    }

    #[test]
    fn test_mode_serde_kebab_case() {
        let json = serde_json_like_toml(CursorMode::SinceLastUpdate);
        assert_eq!(json, "\"since-last-update\"");
        let json = serde_json_like_toml(CursorMode::FromLastId);
        assert_eq!(json, "\"from-last-id\"");
    }

    fn serde_json_like_toml(mode: CursorMode) -> String {
        // toml cannot serialize a bare enum value, so round-trip through a
        // wrapper table and strip it.
        #[derive(serde::Serialize)]
        struct Wrapper {
            mode: CursorMode,
        }
        let rendered = toml::to_string(&Wrapper { mode }).unwrap();
        rendered.trim().trim_start_matches("mode = ").to_string()
    }
}
