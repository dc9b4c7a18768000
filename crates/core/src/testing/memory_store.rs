//! In-memory store for testing.

use std::sync::Mutex;

use crate::database::{decode_record, encode_record, DatabaseRecord, Store, StoreError};

/// Store keeping the encoded database in memory.
///
/// Records go through the same JSON encoding and upgrade path as the file
/// store, so what a test reads back is what a file would have held.
#[derive(Debug, Default)]
pub struct MemoryStore {
    content: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from raw stored JSON, e.g. a legacy document.
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            content: Mutex::new(Some(content.into())),
        }
    }

    /// The raw stored JSON, if anything was saved.
    pub fn content(&self) -> Option<String> {
        self.content.lock().ok().and_then(|c| c.clone())
    }
}

impl Store for MemoryStore {
    fn load(&self) -> Result<Option<DatabaseRecord>, StoreError> {
        let content = self
            .content
            .lock()
            .map_err(|e| StoreError::Corrupt(format!("lock poisoned: {}", e)))?;
        content.as_deref().map(decode_record).transpose()
    }

    fn save(&self, record: &DatabaseRecord) -> Result<(), StoreError> {
        let encoded = encode_record(record)?;
        let mut content = self
            .content
            .lock()
            .map_err(|e| StoreError::Corrupt(format!("lock poisoned: {}", e)))?;
        *content = Some(encoded);
        Ok(())
    }
}
