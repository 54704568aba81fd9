//! In-process snapshot store.

use std::collections::HashMap;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use super::{SnapshotStore, StoreResult};

/// Snapshot store backed by a shared map.
///
/// Clones share the same contents, so a test can keep one clone for
/// inspection while an engine owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    writes: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `contents` under `key`
    pub fn with_snapshot(key: &str, contents: &str) -> Self {
        let store = Self::new();
        store
            .entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), contents.to_string());
        store
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    /// Number of writes since creation
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl SnapshotStore for MemoryStore {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.get(key))
    }

    fn write(&self, key: &str, contents: &str) -> StoreResult<()> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), contents.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
