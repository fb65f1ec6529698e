//! Data models for notecard
//!
//! A `Note` is a piece of user-authored text with an id and a creation
//! timestamp. Notes are only created by `NoteStore` and are never edited in
//! place; reordering moves them, it does not touch their content.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single note card
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Note {
    /// Unique identifier, stable for the lifetime of the note
    pub id: Uuid,
    /// When this note was created
    #[serde(rename = "date")]
    pub created_at: DateTime<Utc>,
    /// Note text
    pub content: String,
}

impl Note {
    /// Create a new note with a fresh id and the current time
    pub(crate) fn new(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            content: content.into(),
        }
    }

    /// Short id used for display and prefix lookups
    pub fn short_id(&self) -> String {
        self.id.to_string()[..8].to_string()
    }

    /// Case-insensitive substring match on the content
    ///
    /// `needle` must already be lowercased.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.content.to_lowercase().contains(needle)
    }
}
