//! Note collection manager
//!
//! `NoteStore` owns the canonical ordered list of notes and mirrors it to a
//! durable key-value store after every mutation.
//!
//! ## Persistence
//!
//! The whole collection is serialized to JSON and written under
//! [`NOTES_KEY`] on every create, delete and reorder. A mutation is applied
//! to a candidate list first and only committed once the write succeeded,
//! so a failed write leaves both the store and the blob as they were.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = NoteStore::open(FileStore::new(dir), CorruptBlobPolicy::Reset)?;
//!
//! let note = store.create("buy milk")?;
//! store.reorder(0, 1)?;
//! store.delete(note.id)?;
//!
//! let hits = store.search("milk");
//! ```

use std::collections::HashSet;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::CorruptBlobPolicy;
use crate::error::{NoteError, NoteResult};
use crate::models::Note;
use crate::storage::KeyValueStore;

/// Key holding the serialized collection
pub const NOTES_KEY: &str = "notes";

/// Key holding the last blob that failed to parse
pub const BACKUP_KEY: &str = "notes.corrupt";

/// The ordered note collection and its durable mirror
pub struct NoteStore<S: KeyValueStore> {
    /// Display order, newest first unless reordered
    notes: Vec<Note>,
    /// Durable backend
    backend: S,
}

impl<S: KeyValueStore> NoteStore<S> {
    /// Load the collection from `backend`
    ///
    /// - No blob: starts empty
    /// - Unparsable blob: handled according to `policy`
    /// - Duplicate ids: the first occurrence wins
    pub fn open(mut backend: S, policy: CorruptBlobPolicy) -> NoteResult<Self> {
        let notes = match backend.get(NOTES_KEY)? {
            None => {
                debug!("No stored notes, starting empty");
                Vec::new()
            }
            Some(blob) => match serde_json::from_str::<Vec<Note>>(&blob) {
                Ok(notes) => dedup_ids(notes),
                Err(e) => match policy {
                    CorruptBlobPolicy::Fail => {
                        return Err(NoteError::Corrupt {
                            details: e.to_string(),
                        })
                    }
                    CorruptBlobPolicy::Reset => {
                        warn!(
                            "Stored notes are unreadable ({}), starting empty. Backup kept under '{}'",
                            e, BACKUP_KEY
                        );
                        backend.set(BACKUP_KEY, &blob)?;
                        Vec::new()
                    }
                },
            },
        };

        debug!("Loaded {} note(s)", notes.len());
        Ok(Self { notes, backend })
    }

    // ==================== Commands ====================

    /// Create a note and put it at the front of the collection
    ///
    /// Only exactly-empty content is rejected; whitespace is kept as typed.
    pub fn create(&mut self, content: impl Into<String>) -> NoteResult<Note> {
        let content = content.into();
        if content.is_empty() {
            return Err(NoteError::EmptyContent);
        }

        let note = Note::new(content);

        let mut next = Vec::with_capacity(self.notes.len() + 1);
        next.push(note.clone());
        next.extend(self.notes.iter().cloned());
        self.commit(next)?;

        info!("Created note {}", note.id);
        Ok(note)
    }

    /// Delete the note with `id`
    ///
    /// Returns whether a note was removed. Unknown ids leave the collection
    /// unchanged. The collection is written either way.
    pub fn delete(&mut self, id: Uuid) -> NoteResult<bool> {
        let next: Vec<Note> = self.notes.iter().filter(|n| n.id != id).cloned().collect();
        let removed = next.len() != self.notes.len();
        self.commit(next)?;

        if removed {
            info!("Deleted note {}", id);
        } else {
            debug!("Delete of unknown note {} ignored", id);
        }
        Ok(removed)
    }

    /// Move the note at `from` so that it ends up at `to`
    ///
    /// Remove-then-insert: notes between the two positions shift by one.
    /// `from == to` changes nothing but still writes the collection.
    pub fn reorder(&mut self, from: usize, to: usize) -> NoteResult<()> {
        let len = self.notes.len();
        for index in [from, to] {
            if index >= len {
                return Err(NoteError::IndexOutOfRange { index, len });
            }
        }

        let mut next = self.notes.clone();
        let moved = next.remove(from);
        next.insert(to, moved);
        self.commit(next)?;

        debug!("Moved note from {} to {}", from, to);
        Ok(())
    }

    // ==================== Queries ====================

    /// Notes whose content contains `query`, ignoring case
    ///
    /// An empty query returns every note. Collection order is preserved.
    pub fn search(&self, query: &str) -> Vec<&Note> {
        if query.is_empty() {
            return self.notes.iter().collect();
        }

        let needle = query.to_lowercase();
        self.notes
            .iter()
            .filter(|n| n.matches_lowercase(&needle))
            .collect()
    }

    /// All notes in display order
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Get a note by ID
    pub fn get(&self, id: Uuid) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    /// Display position of a note
    pub fn position(&self, id: Uuid) -> Option<usize> {
        self.notes.iter().position(|n| n.id == id)
    }

    /// Notes whose id starts with `prefix`
    ///
    /// An empty prefix matches nothing.
    pub fn find_by_prefix(&self, prefix: &str) -> Vec<&Note> {
        if prefix.is_empty() {
            return Vec::new();
        }
        let prefix = prefix.to_lowercase();
        self.notes
            .iter()
            .filter(|n| n.id.to_string().starts_with(&prefix))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Get access to the durable backend
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Persist `next` and make it the current collection
    fn commit(&mut self, next: Vec<Note>) -> NoteResult<()> {
        let blob = serde_json::to_string(&next)?;
        self.backend.set(NOTES_KEY, &blob)?;
        self.notes = next;
        Ok(())
    }
}

/// Drop later notes that reuse an earlier id
fn dedup_ids(notes: Vec<Note>) -> Vec<Note> {
    let total = notes.len();
    let mut seen = HashSet::with_capacity(total);
    let unique: Vec<Note> = notes.into_iter().filter(|n| seen.insert(n.id)).collect();

    if unique.len() != total {
        warn!(
            "Dropped {} stored note(s) with duplicate ids",
            total - unique.len()
        );
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStore, MemoryStore, StorageError, StorageResult};
    use std::io;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn empty_store() -> NoteStore<MemoryStore> {
        NoteStore::open(MemoryStore::new(), CorruptBlobPolicy::Reset).unwrap()
    }

    /// Store with notes [A, B, C] in that display order
    fn abc_store() -> NoteStore<MemoryStore> {
        let mut store = empty_store();
        store.create("Milk and eggs").unwrap();
        store.create("call mom").unwrap();
        store.create("buy milk").unwrap();
        store
    }

    fn contents<'a>(notes: impl IntoIterator<Item = &'a Note>) -> Vec<&'a str> {
        notes.into_iter().map(|n| n.content.as_str()).collect()
    }

    fn ids(store: &NoteStore<impl KeyValueStore>) -> Vec<Uuid> {
        store.notes().iter().map(|n| n.id).collect()
    }

    /// Backend whose writes can be switched off
    struct FlakyStore {
        inner: MemoryStore,
        fail_writes: bool,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> StorageResult<Option<String>> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
            if self.fail_writes {
                return Err(StorageError::WriteError {
                    path: PathBuf::from("/unwritable/notes.json"),
                    source: io::Error::new(io::ErrorKind::Other, "device unavailable"),
                });
            }
            self.inner.set(key, value)
        }
    }

    #[test]
    fn test_open_empty_backend() {
        let store = empty_store();
        assert!(store.is_empty());
        assert_eq!(store.backend().write_count(), 0);
    }

    #[test]
    fn test_creates_are_newest_first() {
        let mut store = empty_store();
        let mut created = Vec::new();
        for i in 0..5 {
            created.push(store.create(format!("note {}", i)).unwrap());
        }

        assert_eq!(store.len(), 5);
        assert_eq!(store.notes()[0].id, created[4].id);
        assert_eq!(store.notes()[4].id, created[0].id);
    }

    #[test]
    fn test_create_returns_note_and_persists() {
        let mut store = empty_store();
        let note = store.create("hello").unwrap();

        assert_eq!(note.content, "hello");
        assert!(!note.id.is_nil());
        assert_eq!(store.notes(), &[note.clone()]);

        let blob = store.backend().get(NOTES_KEY).unwrap().unwrap();
        let stored: Vec<Note> = serde_json::from_str(&blob).unwrap();
        assert_eq!(stored, vec![note]);
    }

    #[test]
    fn test_create_empty_is_rejected() {
        let mut store = abc_store();
        let before = store.notes().to_vec();
        let writes = store.backend().write_count();

        let err = store.create("").unwrap_err();
        assert!(matches!(err, NoteError::EmptyContent));
        assert_eq!(store.notes(), before.as_slice());
        assert_eq!(store.backend().write_count(), writes);
    }

    #[test]
    fn test_create_whitespace_is_accepted() {
        let mut store = empty_store();
        let note = store.create("   ").unwrap();
        assert_eq!(note.content, "   ");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_delete_existing() {
        let mut store = abc_store();
        let [a, b, c] = [store.notes()[0].id, store.notes()[1].id, store.notes()[2].id];

        assert!(store.delete(b).unwrap());
        assert_eq!(ids(&store), vec![a, c]);
        assert!(store.get(b).is_none());
    }

    #[test]
    fn test_delete_unknown_is_noop() {
        let mut store = abc_store();
        let before = serde_json::to_string(store.notes()).unwrap();
        let writes = store.backend().write_count();

        assert!(!store.delete(Uuid::new_v4()).unwrap());

        let after = serde_json::to_string(store.notes()).unwrap();
        assert_eq!(before, after);
        // Still mirrored, same content
        assert_eq!(store.backend().write_count(), writes + 1);
        assert_eq!(store.backend().get(NOTES_KEY).unwrap().unwrap(), after);
    }

    #[test]
    fn test_reorder_remove_then_insert() {
        let mut store = abc_store();
        let [a, b, c] = [store.notes()[0].id, store.notes()[1].id, store.notes()[2].id];

        store.reorder(0, 2).unwrap();
        assert_eq!(ids(&store), vec![b, c, a]);

        store.reorder(2, 0).unwrap();
        assert_eq!(ids(&store), vec![a, b, c]);
    }

    #[test]
    fn test_reorder_round_trip() {
        let mut store = empty_store();
        for i in 0..6 {
            store.create(format!("note {}", i)).unwrap();
        }
        let original = ids(&store);

        for (i, j) in [(0, 5), (1, 3), (4, 2), (5, 0)] {
            store.reorder(i, j).unwrap();
            store.reorder(j, i).unwrap();
            assert_eq!(ids(&store), original);
        }
    }

    #[test]
    fn test_reorder_same_index_still_writes() {
        let mut store = abc_store();
        let before = ids(&store);
        let writes = store.backend().write_count();

        store.reorder(1, 1).unwrap();
        assert_eq!(ids(&store), before);
        assert_eq!(store.backend().write_count(), writes + 1);
    }

    #[test]
    fn test_reorder_out_of_range() {
        let mut store = abc_store();
        let before = ids(&store);
        let writes = store.backend().write_count();

        let err = store.reorder(3, 0).unwrap_err();
        assert!(matches!(err, NoteError::IndexOutOfRange { index: 3, len: 3 }));

        let err = store.reorder(0, 7).unwrap_err();
        assert!(matches!(err, NoteError::IndexOutOfRange { index: 7, len: 3 }));

        assert_eq!(ids(&store), before);
        assert_eq!(store.backend().write_count(), writes);
    }

    #[test]
    fn test_reorder_on_empty_collection() {
        let mut store = empty_store();
        let err = store.reorder(0, 0).unwrap_err();
        assert!(matches!(err, NoteError::IndexOutOfRange { index: 0, len: 0 }));
    }

    #[test]
    fn test_search_case_insensitive_in_order() {
        let store = abc_store();

        assert_eq!(
            contents(store.search("milk")),
            vec!["buy milk", "Milk and eggs"]
        );
        assert_eq!(
            contents(store.search("MILK")),
            vec!["buy milk", "Milk and eggs"]
        );
        assert!(store.search("xyz").is_empty());
    }

    #[test]
    fn test_search_empty_query_returns_all() {
        let store = abc_store();
        assert_eq!(contents(store.search("")), contents(store.notes()));
    }

    #[test]
    fn test_search_is_idempotent_and_pure() {
        let store = abc_store();
        let writes = store.backend().write_count();

        let first: Vec<Note> = store.search("m").into_iter().cloned().collect();
        let second: Vec<Note> = store.search("m").into_iter().cloned().collect();
        assert_eq!(first, second);
        assert_eq!(store.backend().write_count(), writes);
    }

    #[test]
    fn test_search_non_ascii() {
        let mut store = empty_store();
        store.create("Reunião às 10h").unwrap();
        store.create("almoço").unwrap();

        assert_eq!(contents(store.search("REUNIÃO")), vec!["Reunião às 10h"]);
    }

    #[test]
    fn test_find_by_prefix_and_position() {
        let store = abc_store();
        let target = store.notes()[2].clone();

        let hits = store.find_by_prefix(&target.short_id());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, target.id);
        assert_eq!(store.position(target.id), Some(2));
        assert!(store.find_by_prefix("").is_empty());
    }

    #[test]
    fn test_reload_reconstructs_collection() {
        let temp_dir = TempDir::new().unwrap();

        let expected = {
            let mut store =
                NoteStore::open(FileStore::new(temp_dir.path()), CorruptBlobPolicy::Reset)
                    .unwrap();
            store.create("hello").unwrap();
            store.create("world").unwrap();
            store.reorder(0, 1).unwrap();
            store.notes().to_vec()
        };

        let store =
            NoteStore::open(FileStore::new(temp_dir.path()), CorruptBlobPolicy::Reset).unwrap();
        assert_eq!(store.notes(), expected.as_slice());
        assert_eq!(contents(store.notes()), vec!["hello", "world"]);
    }

    #[test]
    fn test_corrupt_blob_reset_keeps_backup() {
        let backend = MemoryStore::with_entry(NOTES_KEY, "{not json");
        let mut store = NoteStore::open(backend, CorruptBlobPolicy::Reset).unwrap();

        assert!(store.is_empty());
        assert_eq!(
            store.backend().get(BACKUP_KEY).unwrap().as_deref(),
            Some("{not json")
        );

        store.create("fresh start").unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_corrupt_blob_fail_policy() {
        let backend = MemoryStore::with_entry(NOTES_KEY, "[{\"id\": 1}]");
        let result = NoteStore::open(backend, CorruptBlobPolicy::Fail);

        assert!(matches!(result, Err(NoteError::Corrupt { .. })));
    }

    #[test]
    fn test_duplicate_ids_first_wins() {
        let id = "6f1c2a9e-3b4d-4e5f-8a7b-1c2d3e4f5a6b";
        let blob = format!(
            r#"[
                {{"id": "{id}", "date": "2024-02-10T14:30:00Z", "content": "first"}},
                {{"id": "{id}", "date": "2024-02-09T14:30:00Z", "content": "second"}}
            ]"#
        );
        let store =
            NoteStore::open(MemoryStore::with_entry(NOTES_KEY, blob), CorruptBlobPolicy::Fail)
                .unwrap();

        assert_eq!(contents(store.notes()), vec!["first"]);
    }

    #[test]
    fn test_failed_write_leaves_collection_unchanged() {
        let backend = FlakyStore {
            inner: MemoryStore::new(),
            fail_writes: false,
        };
        let mut store = NoteStore::open(backend, CorruptBlobPolicy::Reset).unwrap();
        store.create("one").unwrap();
        store.create("two").unwrap();
        let before = store.notes().to_vec();
        let blob_before = store.backend().get(NOTES_KEY).unwrap();

        store.backend.fail_writes = true;

        assert!(matches!(store.create("three"), Err(NoteError::Storage(_))));
        assert!(matches!(store.reorder(0, 1), Err(NoteError::Storage(_))));
        assert!(matches!(
            store.delete(before[0].id),
            Err(NoteError::Storage(_))
        ));

        assert_eq!(store.notes(), before.as_slice());
        assert_eq!(store.backend().get(NOTES_KEY).unwrap(), blob_before);
    }
}
