//! Errors returned by `NoteStore`

use thiserror::Error;

use crate::storage::StorageError;

/// Errors that can occur while operating on the note collection
#[derive(Error, Debug)]
pub enum NoteError {
    /// A note was created with exactly empty content
    #[error("Note has no content")]
    EmptyContent,

    /// A reorder position is outside the collection
    #[error("Position {index} is out of range for {len} note(s)")]
    IndexOutOfRange { index: usize, len: usize },

    /// The stored collection could not be parsed
    #[error("Stored notes are corrupted: {details}")]
    Corrupt { details: String },

    /// The collection could not be serialized
    #[error("Failed to serialize notes: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The durable store failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result type for note operations
pub type NoteResult<T> = Result<T, NoteError>;
