//! Result persistence
//!
//! A flat key/value store holding the final artifact between the drafting
//! flow and the viewer. Values are stored exactly as received.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::StorageError;

/// Write side, used by the progress controller
pub trait ResultSink {
    fn store(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Read side, used by the viewer
pub trait ResultSource {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;
}

/// Keys become file names, so they are restricted to a safe alphabet
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
