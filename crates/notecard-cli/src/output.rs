//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use std::io::{self, Write};

use notecard_core::Note;
use serde::Serialize;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Print a single note in full
    pub fn print_note(&self, note: &Note, position: Option<usize>) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:       {}", note.id);
                if let Some(pos) = position {
                    println!("Position: {}", pos + 1);
                }
                println!("Created:  {}", note.created_at.format("%Y-%m-%d %H:%M"));
                println!();
                println!("{}", note.content);
            }
            OutputFormat::Json => print_json(note),
            OutputFormat::Quiet => println!("{}", note.id),
        }
    }

    /// Print notes as numbered cards
    ///
    /// Numbers are the display positions `move` accepts.
    pub fn print_notes(&self, notes: &[(usize, &Note)]) {
        match self.format {
            OutputFormat::Human => {
                if notes.is_empty() {
                    println!("No notes found.");
                    return;
                }
                for (pos, note) in notes {
                    println!(
                        "{:>3}. {}  {}",
                        pos + 1,
                        note.short_id(),
                        note.created_at.format("%Y-%m-%d %H:%M")
                    );
                    println!("     {}", truncate_line(&note.content, 70));
                }
                println!("\n{} note(s)", notes.len());
            }
            OutputFormat::Json => {
                let list: Vec<&Note> = notes.iter().map(|(_, n)| *n).collect();
                print_json(&list);
            }
            OutputFormat::Quiet => {
                for (_, note) in notes {
                    println!("{}", note.id);
                }
            }
        }
    }

    /// Redraw the live dictation draft
    pub fn draft(&self, text: &str) {
        match self.format {
            OutputFormat::Human => {
                print!("\r\x1b[2K> {}", truncate_line(text, 100));
                let _ = io::stdout().flush();
            }
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"event": "transcript", "text": text}));
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Finish the live draft line
    pub fn end_draft(&self) {
        if self.format == OutputFormat::Human {
            println!();
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a notice the user should see even though nothing failed
    ///
    /// Goes to stderr so scripted output stays clean.
    pub fn notice(&self, message: &str) {
        match self.format {
            OutputFormat::Human | OutputFormat::Quiet => eprintln!("⚠ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "notice", "message": message})
                );
            }
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to encode JSON output: {}", e),
    }
}

/// Truncate a string to max characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Truncate to first line and max length
pub fn truncate_line(s: &str, max_len: usize) -> String {
    let first_line = s.lines().next().unwrap_or("");
    truncate(first_line, max_len)
}
