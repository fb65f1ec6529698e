//! Note command handlers
//!
//! These are the commands the card view issues: create, delete, move and
//! search. Each mutation is persisted by the store before it returns.

use anyhow::{bail, Context, Result};
use uuid::Uuid;

use notecard_core::{Note, NoteError};

use super::Notes;
use crate::editor::{compose_note, confirm};
use crate::output::{truncate_line, Output};

/// Create a new note
pub fn create(store: &mut Notes, content: Option<String>, output: &Output) -> Result<()> {
    let content = match content {
        Some(c) => c,
        None => compose_note().context("Failed to write note in editor")?,
    };

    let note = store.create(content).map_err(|e| match e {
        NoteError::EmptyContent => anyhow::anyhow!("Note has no content, nothing saved"),
        other => anyhow::Error::new(other).context("Failed to create note"),
    })?;

    report_created(&note, output);
    Ok(())
}

/// Confirm a freshly created note
pub fn report_created(note: &Note, output: &Output) {
    if output.is_quiet() {
        println!("{}", note.id);
    } else {
        output.success(&format!("Created note {}", note.short_id()));
    }
}

/// List all notes in display order
pub fn list(store: &Notes, output: &Output) -> Result<()> {
    let notes: Vec<(usize, &Note)> = store.notes().iter().enumerate().collect();
    output.print_notes(&notes);
    Ok(())
}

/// Show a single note
pub fn show(store: &Notes, id: String, output: &Output) -> Result<()> {
    let uuid = parse_note_id(&id, store)?;

    let note = store
        .get(uuid)
        .ok_or_else(|| anyhow::anyhow!("Note not found: {}", id))?;

    output.print_note(note, store.position(uuid));
    Ok(())
}

/// Delete a note
///
/// A full UUID that matches nothing is not an error; there is simply
/// nothing to delete.
pub fn delete(store: &mut Notes, id: String, output: &Output) -> Result<()> {
    let uuid = parse_note_id(&id, store)?;

    if let Some(note) = store.get(uuid) {
        if output.should_prompt() {
            println!(
                "Delete note: {} - {}",
                note.short_id(),
                truncate_line(&note.content, 50)
            );
            if !confirm("Are you sure?")? {
                println!("Cancelled.");
                return Ok(());
            }
        }
    }

    let short_id = store.get(uuid).map(Note::short_id);
    store.delete(uuid).context("Failed to delete note")?;

    match short_id {
        Some(short_id) => output.success(&format!("Deleted note: {}", short_id)),
        None => output.message(&format!("No note with id {}, nothing deleted.", uuid)),
    }

    Ok(())
}

/// Move a note between 1-based display positions
pub fn move_note(store: &mut Notes, from: usize, to: usize, output: &Output) -> Result<()> {
    let (Some(from_idx), Some(to_idx)) = (from.checked_sub(1), to.checked_sub(1)) else {
        bail!("Positions start at 1");
    };

    store.reorder(from_idx, to_idx).map_err(|e| match e {
        NoteError::IndexOutOfRange { index, len } => anyhow::anyhow!(
            "Position {} is out of range, there are {} note(s)",
            index + 1,
            len
        ),
        other => anyhow::Error::new(other).context("Failed to move note"),
    })?;

    output.success(&format!("Moved note from {} to {}", from, to));
    Ok(())
}

/// Search notes by content
pub fn search(store: &Notes, query: String, output: &Output) -> Result<()> {
    let hits = search_hits(store, &query);
    output.print_notes(&hits);
    Ok(())
}

/// Matching notes with their display positions, so `move` can use them
fn search_hits<'a>(store: &'a Notes, query: &str) -> Vec<(usize, &'a Note)> {
    store
        .search(query)
        .into_iter()
        .filter_map(|note| store.position(note.id).map(|pos| (pos, note)))
        .collect()
}

/// Parse a note ID (supports full UUID or prefix)
///
/// A blank id is refused instead of matching every note.
fn parse_note_id(id: &str, store: &Notes) -> Result<Uuid> {
    let id = id.trim();
    if id.is_empty() {
        bail!("Note ID is empty");
    }

    if let Ok(uuid) = Uuid::parse_str(id) {
        return Ok(uuid);
    }

    let matches = store.find_by_prefix(id);

    match matches.len() {
        0 => bail!("No note found matching: {}", id),
        1 => Ok(matches[0].id),
        _ => {
            eprintln!("Multiple notes match '{}':", id);
            for note in &matches {
                eprintln!(
                    "  {} - {}",
                    note.short_id(),
                    truncate_line(&note.content, 30)
                );
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}
