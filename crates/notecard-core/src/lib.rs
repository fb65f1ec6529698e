//! notecard Core Library
//!
//! This crate provides the core functionality for notecard, a small
//! local note-taking tool: notes are typed or dictated, shown as cards,
//! searched, reordered and deleted.
//!
//! # Architecture
//!
//! - **NoteStore**: owns the ordered note collection and mirrors it to a
//!   durable key-value store after every mutation
//! - **KeyValueStore**: a single named string blob per key (file or memory)
//! - **Dictation**: tracks the one active speech recognition session and the
//!   draft it produces
//!
//! # Quick Start
//!
//! ```text
//! let backend = FileStore::new(config.data_dir.clone());
//! let mut store = NoteStore::open(backend, config.on_corrupt)?;
//!
//! let note = store.create("buy milk")?;
//! store.reorder(0, 0)?;
//! let hits = store.search("MILK");
//! ```
//!
//! # Modules
//!
//! - `store`: The note collection manager (main entry point)
//! - `models`: The `Note` data structure
//! - `storage`: Durable key-value backends
//! - `recorder`: Speech-to-text capability seam and dictation state
//! - `config`: Application configuration
//! - `error`: Errors returned by `NoteStore`

pub mod config;
pub mod error;
pub mod models;
pub mod recorder;
pub mod storage;
pub mod store;

pub use config::{Config, CorruptBlobPolicy};
pub use error::{NoteError, NoteResult};
pub use models::Note;
pub use recorder::{
    CommandRecognizer, Dictation, RecognitionOptions, RecognitionSession, RecorderError,
    SpeechRecognizer, TranscriptEvent, TranscriptSink,
};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError, StorageResult};
pub use store::{NoteStore, BACKUP_KEY, NOTES_KEY};
