//! Command handlers

pub mod config;
pub mod note;
pub mod record;
pub mod status;

use anyhow::{Context, Result};

use notecard_core::{Config, FileStore, NoteStore};

/// The note store as used by the CLI
pub type Notes = NoteStore<FileStore>;

/// Open the note store in the configured data directory
pub fn open_store(config: &Config) -> Result<Notes> {
    let backend = FileStore::new(config.data_dir.clone());
    NoteStore::open(backend, config.on_corrupt).with_context(|| {
        format!(
            "Failed to open notes in {:?}. Set on_corrupt = \"reset\" to start over.",
            config.data_dir
        )
    })
}
