//! notecard CLI
//!
//! Command-line interface for notecard - typed and dictated notes.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use notecard_core::{Config, NoteError, StorageError};

mod commands;
mod editor;
mod logging;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "notecard")]
#[command(about = "notecard - Notes you can type or dictate")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long = "config", global = true, value_name = "PATH")]
    config_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new note
    #[command(alias = "new")]
    Add {
        /// Note content (opens editor if not provided)
        content: Option<String>,
    },
    /// Dictate a new note
    Record,
    /// List all notes, newest first unless reordered
    #[command(alias = "ls")]
    List,
    /// Show a note
    Show {
        /// Note ID (full UUID or prefix)
        id: String,
    },
    /// Delete a note
    #[command(alias = "rm")]
    Delete {
        /// Note ID (full UUID or prefix)
        id: String,
    },
    /// Move a note to another position
    #[command(alias = "mv")]
    Move {
        /// Current position (as shown by `list`, starting at 1)
        from: usize,
        /// New position
        to: usize,
    },
    /// Search notes (case-insensitive)
    Search {
        /// Text to look for; empty matches everything
        query: String,
    },
    /// Show data location, note count and dictation support
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, locale, recorder_command, on_corrupt, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    if let Err(e) = run(cli, &output).await {
        eprintln!("Error: {:?}", e);
        if let Some(hint) = recovery_hint(&e) {
            eprintln!("\nHint: {}", hint);
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: &Output) -> Result<()> {
    let config_path = cli.config_path.as_ref();

    // Config commands don't need the store
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), config_path, output);
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    logging::init(&config);

    let mut store = commands::open_store(&config)?;

    match cli.command {
        Commands::Add { content } => commands::note::create(&mut store, content, output),
        Commands::Record => commands::record::record(&mut store, &config, output).await,
        Commands::List => commands::note::list(&store, output),
        Commands::Show { id } => commands::note::show(&store, id, output),
        Commands::Delete { id } => commands::note::delete(&mut store, id, output),
        Commands::Move { from, to } => commands::note::move_note(&mut store, from, to, output),
        Commands::Search { query } => commands::note::search(&store, query, output),
        Commands::Status => commands::status::show(&store, &config, output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Recovery suggestion for a storage failure anywhere in the error chain
fn recovery_hint(error: &anyhow::Error) -> Option<&'static str> {
    error
        .chain()
        .find_map(|cause| {
            cause
                .downcast_ref::<StorageError>()
                .or(match cause.downcast_ref::<NoteError>() {
                    Some(NoteError::Storage(storage)) => Some(storage),
                    _ => None,
                })
        })
        .and_then(StorageError::recovery_suggestion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_move() {
        let cli = Cli::try_parse_from(["notecard", "mv", "3", "1"]).unwrap();
        assert!(matches!(cli.command, Commands::Move { from: 3, to: 1 }));
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["notecard", "search", "milk", "--json"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Search { ref query } if query == "milk"));
    }

    #[test]
    fn test_parse_add_without_content() {
        let cli = Cli::try_parse_from(["notecard", "add"]).unwrap();
        assert!(matches!(cli.command, Commands::Add { content: None }));
    }

    #[test]
    fn test_parse_config_path() {
        let cli =
            Cli::try_parse_from(["notecard", "--config", "/tmp/c.toml", "config", "show"]).unwrap();
        assert_eq!(cli.config_path, Some(PathBuf::from("/tmp/c.toml")));
        assert!(matches!(
            cli.command,
            Commands::Config {
                command: Some(ConfigCommands::Show)
            }
        ));
    }

    #[test]
    fn test_recovery_hint_for_storage_failure() {
        let storage = StorageError::from_io(
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            PathBuf::from("/data/notes.json"),
        );
        let err = anyhow::Error::new(NoteError::from(storage)).context("Failed to create note");

        assert!(recovery_hint(&err).unwrap().contains("data_dir"));
    }

    #[test]
    fn test_no_recovery_hint_for_user_errors() {
        let err = anyhow::Error::new(NoteError::EmptyContent).context("Failed to create note");
        assert!(recovery_hint(&err).is_none());
    }
}
