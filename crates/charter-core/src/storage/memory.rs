//! In-process store

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{validate_key, ResultSink, ResultSource};
use crate::error::StorageError;

/// Shared in-memory key/value store
///
/// Clones share the same map, so a caller can keep a handle and inspect what
/// the controller stored.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl ResultSink for MemoryStore {
    fn store(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl ResultSource for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        Ok(self.get(key))
    }
}
