// Storage medium abstraction over string-keyed byte blobs

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum MediumError {
    #[error("storage quota exceeded: {attempted} bytes against a {limit} byte limit")]
    QuotaExceeded { attempted: usize, limit: usize },
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Unified storage trait for the persisted snapshots.
///
/// Capacity-constrained implementations report `QuotaExceeded` for a
/// `put` they cannot hold; everything else is `Backend`. A rejected
/// `put` must leave prior contents untouched.
pub trait StorageMedium: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, MediumError>;
    fn put(&self, key: &str, value: &[u8]) -> Result<(), MediumError>;
    fn remove(&self, key: &str) -> Result<(), MediumError>;
}

struct MemoryInner {
    data: HashMap<String, Vec<u8>>,
    quota: Option<usize>,
}

/// In-memory medium for tests; built with a quota it models a
/// capacity-bounded key/value store.
#[derive(Clone)]
pub struct MemoryMedium {
    inner: Arc<RwLock<MemoryInner>>,
}

impl MemoryMedium {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryInner {
                data: HashMap::new(),
                quota: None,
            })),
        }
    }

    /// A medium that rejects any `put` pushing the total stored value
    /// bytes past `limit`. Replacing a key counts the replacement, not
    /// the sum of old and new.
    pub fn with_quota(limit: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryInner {
                data: HashMap::new(),
                quota: Some(limit),
            })),
        }
    }

    /// Change the capacity limit. Contents already stored stay readable
    /// even when they exceed the new limit; only later `put`s are checked.
    pub fn set_quota(&self, limit: Option<usize>) {
        self.inner.write().quota = limit;
    }

    /// Total bytes currently held across all values.
    pub fn stored_bytes(&self) -> usize {
        self.inner.read().data.values().map(|v| v.len()).sum()
    }
}

impl StorageMedium for MemoryMedium {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, MediumError> {
        Ok(self.inner.read().data.get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), MediumError> {
        let mut inner = self.inner.write();
        if let Some(limit) = inner.quota {
            let replaced = inner.data.get(key).map(|v| v.len()).unwrap_or(0);
            let occupied: usize = inner.data.values().map(|v| v.len()).sum();
            let attempted = occupied - replaced + value.len();
            if attempted > limit {
                return Err(MediumError::QuotaExceeded { attempted, limit });
            }
        }
        inner.data.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), MediumError> {
        self.inner.write().data.remove(key);
        Ok(())
    }
}

/// Durable sled-backed medium. Flushes after every mutation and never
/// reports `QuotaExceeded`.
#[derive(Clone)]
pub struct SledMedium {
    db: sled::Db,
}

impl SledMedium {
    pub fn open(path: &Path) -> Result<Self, MediumError> {
        let db = sled::open(path).map_err(|e| MediumError::Backend(e.to_string()))?;
        Ok(Self { db })
    }
}

impl StorageMedium for SledMedium {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, MediumError> {
        let value = self
            .db
            .get(key)
            .map_err(|e| MediumError::Backend(e.to_string()))?;
        Ok(value.map(|ivec| ivec.to_vec()))
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), MediumError> {
        self.db
            .insert(key, value)
            .map_err(|e| MediumError::Backend(e.to_string()))?;
        self.db
            .flush()
            .map_err(|e| MediumError::Backend(e.to_string()))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), MediumError> {
        self.db
            .remove(key)
            .map_err(|e| MediumError::Backend(e.to_string()))?;
        self.db
            .flush()
            .map_err(|e| MediumError::Backend(e.to_string()))?;
        Ok(())
    }
}
