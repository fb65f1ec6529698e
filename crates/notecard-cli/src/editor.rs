//! Writing notes in $EDITOR, and yes/no prompts

use anyhow::{bail, Context, Result};
use std::env;
use std::fs;
use std::io::{self, Write};
use std::process::Command;

/// Marker for lines the editor template adds and the note should not keep
const COMMENT_PREFIX: &str = "<!--";

/// Tried in order when neither $VISUAL nor $EDITOR is set
const FALLBACK_EDITORS: &[&str] = &["nano", "vim", "vi", "notepad"];

/// Open the user's editor on a blank note and return what they wrote
///
/// Template lines are stripped. The result may be empty.
pub fn compose_note() -> Result<String> {
    let editor = find_editor()?;
    let mut parts = editor.split_whitespace();
    let Some(program) = parts.next() else {
        bail!("Editor command is empty");
    };

    let draft = tempfile::Builder::new()
        .prefix("notecard-")
        .suffix(".md")
        .tempfile()
        .context("Failed to create a temporary note file")?;
    fs::write(draft.path(), note_template())
        .with_context(|| format!("Failed to write {:?}", draft.path()))?;

    let status = Command::new(program)
        .args(parts)
        .arg(draft.path())
        .status()
        .with_context(|| format!("Failed to run editor: {}", editor))?;
    if !status.success() {
        bail!("Editor '{}' exited with {}, note not saved", editor, status);
    }

    let edited = fs::read_to_string(draft.path())
        .with_context(|| format!("Failed to read {:?}", draft.path()))?;
    Ok(strip_template(&edited))
}

/// Template shown when writing a new note in the editor
fn note_template() -> String {
    format!(
        "\n{} Write your note above. Lines starting with {} are ignored. -->\n",
        COMMENT_PREFIX, COMMENT_PREFIX
    )
}

/// Remove template comment lines and the trailing newline editors add
fn strip_template(edited: &str) -> String {
    edited
        .lines()
        .filter(|line| !line.trim_start().starts_with(COMMENT_PREFIX))
        .collect::<Vec<_>>()
        .join("\n")
        .trim_end()
        .to_string()
}

/// $VISUAL, then $EDITOR, then the first fallback editor found in `PATH`
fn find_editor() -> Result<String> {
    let from_env = ["VISUAL", "EDITOR"]
        .iter()
        .filter_map(|var| env::var(var).ok())
        .find(|value| !value.trim().is_empty());

    from_env
        .or_else(|| {
            FALLBACK_EDITORS
                .iter()
                .find(|editor| which::which(editor).is_ok())
                .map(|editor| editor.to_string())
        })
        .context("No editor found. Set $EDITOR, or pass the text directly: notecard add \"...\"")
}

/// Ask a yes/no question on the terminal
///
/// Anything but "y"/"yes" is a no, and so is a stdin that isn't a terminal.
pub fn confirm(question: &str) -> Result<bool> {
    if !atty::is(atty::Stream::Stdin) {
        return Ok(false);
    }

    print!("{} [y/N] ", question);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_template_untouched_template_is_empty() {
        assert_eq!(strip_template(&note_template()), "");
    }

    #[test]
    fn test_strip_template_keeps_body() {
        let edited = format!("buy milk\n  and eggs\n{}", note_template());
        assert_eq!(strip_template(&edited), "buy milk\n  and eggs");
    }

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("\n"));
        assert!(!is_yes("no"));
        assert!(!is_yes("yep"));
    }
}
