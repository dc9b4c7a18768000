//! Persistence of the subscription database.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use super::migrate::upgrade;
use crate::subscription::{SidError, Subscription};

/// Schema version written by this build.
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Errors from loading or saving the database.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored database is corrupt: {0}")]
    Corrupt(String),

    #[error("Unsupported database version: {0}")]
    UnsupportedVersion(String),

    #[error("Failed to assign sids during upgrade: {0}")]
    Sid(#[from] SidError),
}

/// The persisted shape of the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseRecord {
    pub version: String,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
}

impl DatabaseRecord {
    /// An empty database at the current schema version.
    pub fn empty() -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            subscriptions: Vec::new(),
        }
    }
}

impl Default for DatabaseRecord {
    fn default() -> Self {
        Self::empty()
    }
}

/// Trait for database storage backends.
///
/// Saves overwrite the whole stored representation.
pub trait Store: Send + Sync {
    /// Load the stored database, upgraded to [`SCHEMA_VERSION`].
    /// Returns `None` when nothing has been stored yet.
    fn load(&self) -> Result<Option<DatabaseRecord>, StoreError>;

    /// Replace the stored database.
    fn save(&self, record: &DatabaseRecord) -> Result<(), StoreError>;
}

/// Decode a stored JSON document, upgrading older schemas.
pub fn decode_record(content: &str) -> Result<DatabaseRecord, StoreError> {
    let value: serde_json::Value =
        serde_json::from_str(content).map_err(|e| StoreError::Corrupt(e.to_string()))?;
    upgrade(value)
}

/// Encode a record the way it is stored on disk.
pub fn encode_record(record: &DatabaseRecord) -> Result<String, StoreError> {
    serde_json::to_string_pretty(record).map_err(|e| StoreError::Corrupt(e.to_string()))
}

/// JSON file store.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Store for JsonFileStore {
    fn load(&self) -> Result<Option<DatabaseRecord>, StoreError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No stored database");
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        decode_record(&content).map(Some)
    }

    fn save(&self, record: &DatabaseRecord) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        fs::write(&self.path, encode_record(record)?)?;
        debug!(
            path = %self.path.display(),
            subscriptions = record.subscriptions.len(),
            "Saved database"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscription::Thread;
    use std::collections::HashSet;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("episub.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested/dir/episub.json"));

        let mut sub = Subscription::new("Show", ["kw"]);
        sub.add(Thread::new("E1", "l1", vec![1.0])).unwrap();
        sub.generate_sid(&HashSet::new()).unwrap();
        let record = DatabaseRecord {
            version: SCHEMA_VERSION.to_string(),
            subscriptions: vec![sub],
        };

        store.save(&record).unwrap();
        let loaded = store.load().unwrap().unwrap();

        assert_eq!(loaded.version, SCHEMA_VERSION);
        assert_eq!(loaded.subscriptions.len(), 1);
        assert_eq!(loaded.subscriptions[0].name(), "Show");
        assert_eq!(loaded.subscriptions[0].threads()[0].title, "E1");
        assert_eq!(
            loaded.subscriptions[0].sid(),
            record.subscriptions[0].sid()
        );
    }

    #[test]
    fn test_save_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("episub.json"));

        let mut record = DatabaseRecord::empty();
        let mut sub = Subscription::new("Show", ["kw"]);
        sub.generate_sid(&HashSet::new()).unwrap();
        record.subscriptions.push(sub);
        store.save(&record).unwrap();

        store.save(&DatabaseRecord::empty()).unwrap();

        assert!(store.load().unwrap().unwrap().subscriptions.is_empty());
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("episub.json");
        fs::write(&path, "{ not json").unwrap();

        let result = JsonFileStore::new(path).load();

        assert!(matches!(result, Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn test_stored_shape() {
        let json = encode_record(&DatabaseRecord::empty()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], SCHEMA_VERSION);
        assert!(value["subscriptions"].as_array().unwrap().is_empty());
    }
}
