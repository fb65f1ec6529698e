//! Storage layer
//!
//! The durable side of notecard is a key-value store holding whole string
//! blobs. `NoteStore` keeps its entire collection under a single key and
//! rewrites it after every mutation.
//!
//! ## Backends
//!
//! - **FileStore**: one file per key in the data directory, atomic writes
//! - **MemoryStore**: in-process map, used by tests and embedders

pub mod error;
pub mod file;
pub mod memory;

pub use error::{StorageError, StorageResult};
pub use file::FileStore;
pub use memory::MemoryStore;

/// A durable store of named string blobs
///
/// Writes are whole-value replacements. A successful `set` means the value
/// is durable; a failed `set` must leave the previous value readable.
pub trait KeyValueStore {
    /// Read the blob stored under `key`, if any
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Replace the blob stored under `key`
    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;
}

/// Reject keys that could escape the store's namespace
pub(crate) fn validate_key(key: &str) -> StorageResult<()> {
    let bad = key.is_empty()
        || key.starts_with('.')
        || key.contains('/')
        || key.contains('\\')
        || key.contains("..");

    if bad {
        return Err(StorageError::InvalidKey {
            key: key.to_string(),
        });
    }
    Ok(())
}
