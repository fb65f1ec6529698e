//! Status command handler

use anyhow::Result;

use notecard_core::{CommandRecognizer, Config, SpeechRecognizer, NOTES_KEY};

use super::Notes;
use crate::output::{Output, OutputFormat};

/// Show status information
pub fn show(store: &Notes, config: &Config, output: &Output) -> Result<()> {
    let dictation = CommandRecognizer::new(config.recorder_command.clone()).is_available();
    let notes_path = store.backend().path_for(NOTES_KEY);

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": store.backend().dir(),
                    "notes_file": notes_path,
                    "notes": store.len(),
                    "dictation_available": dictation,
                    "locale": config.locale,
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", store.len());
        }
        OutputFormat::Human => {
            println!("Data directory: {}", store.backend().dir().display());
            println!("Notes file:     {}", notes_path.display());
            println!("Notes:          {}", store.len());
            println!(
                "Dictation:      {}",
                if dictation {
                    format!("available ({})", config.locale)
                } else {
                    "not available".to_string()
                }
            );
        }
    }

    Ok(())
}
