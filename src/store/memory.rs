//! In-memory cursor store
//!
//! Hash-map backed store for tests and embedders that manage persistence
//! themselves.

use crate::store::{CursorSnapshot, CursorStore, StoreResult};
use std::collections::HashMap;

/// Cursor store holding snapshots in a process-local map
#[derive(Debug, Default)]
pub struct MemoryCursorStore {
    snapshots: HashMap<String, CursorSnapshot>,
}

impl MemoryCursorStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl CursorStore for MemoryCursorStore {
    fn load(&self, source: &str) -> StoreResult<Option<CursorSnapshot>> {
        Ok(self.snapshots.get(source).copied())
    }

    fn save(&mut self, source: &str, snapshot: &CursorSnapshot) -> StoreResult<()> {
        self.snapshots.insert(source.to_string(), *snapshot);
        Ok(())
    }

    fn delete(&mut self, source: &str) -> StoreResult<()> {
        self.snapshots.remove(source);
        Ok(())
    }

    fn list_sources(&self) -> StoreResult<Vec<String>> {
        let mut sources: Vec<String> = self.snapshots.keys().cloned().collect();
        sources.sort();
        Ok(sources)
    }
}
