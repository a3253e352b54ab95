// ctail - core/offsets.rs
//
// Process-lifetime memory of how far each file has been read.
//
// Keyed by FileIdentity so a file keeps its offset across renames. Nothing
// is ever written to disk: a restarted process starts from scratch. There is
// no eviction; the map grows by one entry per distinct file seen.

use crate::core::model::FileIdentity;
use std::collections::HashMap;

/// Mapping from file identity to the number of bytes already consumed.
#[derive(Debug, Default)]
pub struct OffsetStore {
    offsets: HashMap<FileIdentity, u64>,
}

impl OffsetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the consumed offset for a file being relinquished.
    pub fn put(&mut self, id: FileIdentity, offset: u64) {
        tracing::trace!(file_id = %id, offset, "Offset stored");
        self.offsets.insert(id, offset);
    }

    /// Stored offset for `id`, or 0 if it has never been stored.
    pub fn get(&self, id: &FileIdentity) -> u64 {
        self.offsets.get(id).copied().unwrap_or(0)
    }

    /// Remove and return the stored offset for a file about to be opened.
    ///
    /// The store never holds an entry for the file that is currently open.
    pub fn take(&mut self, id: &FileIdentity) -> Option<u64> {
        self.offsets.remove(id)
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}
