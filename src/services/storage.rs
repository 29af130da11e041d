use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use thiserror::Error;
use tracing::{error, info};

/// Errors surfaced by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage capacity exceeded")]
    CapacityExceeded,

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Narrow key-value persistence interface for schemas and submissions.
///
/// The engine is storage-agnostic: the real backend may be an embedded
/// database or a remote service, and tests run against `MemoryStore`.
pub trait Store: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn delete(&self, key: &str) -> Result<(), StoreError>;
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

/// In-memory store with a bounded byte budget.
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
    capacity_bytes: usize,
}

impl MemoryStore {
    pub fn new(capacity_bytes: usize) -> Self {
        MemoryStore {
            entries: Mutex::new(BTreeMap::new()),
            capacity_bytes,
        }
    }

    /// Effectively unbounded store for tests that are not about capacity.
    pub fn unbounded() -> Self {
        MemoryStore::new(usize::MAX)
    }

    fn used_bytes(entries: &BTreeMap<String, String>) -> usize {
        entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::Backend(format!("failed to acquire mutex: {}", e)))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::Backend(format!("failed to acquire mutex: {}", e)))?;

        let current = Self::used_bytes(&entries);
        let replaced = entries.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
        let prospective = current - replaced + key.len() + value.len();
        if prospective > self.capacity_bytes {
            return Err(StoreError::CapacityExceeded);
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::Backend(format!("failed to acquire mutex: {}", e)))?;
        entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::Backend(format!("failed to acquire mutex: {}", e)))?;
        Ok(entries.keys().cloned().collect())
    }
}

/// File-backed store persisting the whole map as one JSON document.
///
/// Every mutation rewrites the file under the mutex, so a reader never
/// observes a partially written map.
pub struct JsonFileStore {
    json_path: String,
    file_mutex: Mutex<()>,
    capacity_bytes: usize,
}

impl JsonFileStore {
    pub fn new(json_path: &str, capacity_bytes: usize) -> Self {
        // Create the backing file with an empty map if it doesn't exist
        if !Path::new(json_path).exists() {
            info!("Creating new form storage file at {}", json_path);

            let file = File::create(json_path).unwrap_or_else(|e| {
                error!("Failed to create storage file: {}", e);
                panic!("Failed to create storage file: {}", e)
            });

            if let Err(e) = serde_json::to_writer(file, &BTreeMap::<String, String>::new()) {
                error!("Failed to initialize storage file: {}", e);
                panic!("Failed to initialize storage file: {}", e);
            }
        }

        JsonFileStore {
            json_path: json_path.to_string(),
            file_mutex: Mutex::new(()),
            capacity_bytes,
        }
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let file = File::open(&self.json_path)
            .map_err(|e| StoreError::Backend(format!("failed to open storage file: {}", e)))?;
        serde_json::from_reader(file)
            .map_err(|e| StoreError::Backend(format!("failed to parse storage file: {}", e)))
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let file = File::create(&self.json_path)
            .map_err(|e| StoreError::Backend(format!("failed to open storage file: {}", e)))?;
        serde_json::to_writer(file, entries)
            .map_err(|e| StoreError::Backend(format!("failed to write storage file: {}", e)))
    }
}

impl Store for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _lock = self
            .file_mutex
            .lock()
            .map_err(|e| StoreError::Backend(format!("failed to acquire mutex: {}", e)))?;
        Ok(self.load()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _lock = self
            .file_mutex
            .lock()
            .map_err(|e| StoreError::Backend(format!("failed to acquire mutex: {}", e)))?;

        let mut entries = self.load()?;
        let current: usize = entries.iter().map(|(k, v)| k.len() + v.len()).sum();
        let replaced = entries.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
        if current - replaced + key.len() + value.len() > self.capacity_bytes {
            return Err(StoreError::CapacityExceeded);
        }

        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let _lock = self
            .file_mutex
            .lock()
            .map_err(|e| StoreError::Backend(format!("failed to acquire mutex: {}", e)))?;

        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let _lock = self
            .file_mutex
            .lock()
            .map_err(|e| StoreError::Backend(format!("failed to acquire mutex: {}", e)))?;
        Ok(self.load()?.keys().cloned().collect())
    }
}
