//! Dictation command handler
//!
//! Starts the configured speech recognizer, shows the transcript as it
//! grows, and saves it as a note once the user presses Enter or the
//! recognizer finishes on its own.

use std::future::Future;
use std::io::BufRead;
use std::thread;

use anyhow::{Context, Result};
use tokio::sync::oneshot;

use notecard_core::{
    CommandRecognizer, Config, Dictation, NoteError, RecognitionOptions, RecorderError,
    SpeechRecognizer, TranscriptEvent,
};

use super::note::report_created;
use super::Notes;
use crate::output::Output;

const UNSUPPORTED_NOTICE: &str = "Speech recording is not supported here. \
     Configure a transcription program with `notecard config set recorder_command <cmd>`, \
     or type your note with `notecard add`.";

/// Record a note by dictation
pub async fn record(store: &mut Notes, config: &Config, output: &Output) -> Result<()> {
    let recognizer = CommandRecognizer::new(config.recorder_command.clone());
    let options = RecognitionOptions::new(config.locale.clone());

    record_with(store, recognizer, options, enter_pressed(), output).await
}

/// Dictate until `stop` resolves or the recognizer exits, then save the draft
async fn record_with<R, F>(
    store: &mut Notes,
    recognizer: R,
    options: RecognitionOptions,
    stop: F,
    output: &Output,
) -> Result<()>
where
    R: SpeechRecognizer,
    F: Future<Output = ()>,
{
    let Some(content) = dictate(recognizer, options, stop, output).await? else {
        return Ok(());
    };

    let note = store.create(content).map_err(|e| match e {
        NoteError::EmptyContent => anyhow::anyhow!("Nothing was transcribed, no note created"),
        other => anyhow::Error::new(other).context("Failed to save dictated note"),
    })?;

    report_created(&note, output);
    Ok(())
}

/// Resolves when the user presses Enter
///
/// Nothing reads stdin until the future is first polled. The read runs on
/// a plain thread, which does not hold up process exit the way a pending
/// read on the tokio blocking pool does.
async fn enter_pressed() {
    let (tx, rx) = oneshot::channel();
    thread::spawn(move || {
        let mut line = String::new();
        let _ = std::io::stdin().lock().read_line(&mut line);
        let _ = tx.send(());
    });
    let _ = rx.await;
}

/// Run one dictation session until `stop` resolves or the recognizer exits
///
/// Returns `None` when dictation is not available.
async fn dictate<R, F>(
    recognizer: R,
    options: RecognitionOptions,
    stop: F,
    output: &Output,
) -> Result<Option<String>>
where
    R: SpeechRecognizer,
    F: Future<Output = ()>,
{
    let mut dictation = Dictation::new(recognizer, options);

    match dictation.start() {
        Ok(()) => {}
        Err(RecorderError::Unavailable) => {
            output.notice(UNSUPPORTED_NOTICE);
            return Ok(None);
        }
        Err(e) => return Err(e).context("Failed to start recording"),
    }

    output.message("Recording... press Enter to stop.");

    tokio::pin!(stop);
    loop {
        tokio::select! {
            _ = &mut stop => break,
            event = dictation.next_event() => match event {
                Some(TranscriptEvent::Update(text)) => output.draft(&text),
                Some(TranscriptEvent::Error(message)) => {
                    output.end_draft();
                    output.notice(&format!("Recognition error: {}", message));
                }
                None => break,
            },
        }
    }

    let content = dictation.stop().to_string();
    output.end_draft();
    Ok(Some(content))
}
