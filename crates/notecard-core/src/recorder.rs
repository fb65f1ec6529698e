//! Dictation support
//!
//! Speech recognition is an external capability. This module defines the
//! seam to it (`SpeechRecognizer` / `RecognitionSession`) and `Dictation`,
//! which tracks the single active recording session and the draft text it
//! produces.
//!
//! Recognizers report through a channel of `TranscriptEvent`s. Every
//! `Update` carries the whole transcript so far, so the draft is replaced,
//! never appended to.

use std::io::{self, BufRead, BufReader, Read};
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use crate::config::DEFAULT_LOCALE;

/// Errors raised when driving a recognizer
#[derive(Error, Debug)]
pub enum RecorderError {
    /// No speech recognition engine is usable here
    #[error("Speech recording is not supported on this platform")]
    Unavailable,

    /// `start` was called while a session is active
    #[error("A recording is already in progress")]
    AlreadyRecording,

    /// The transcription command could not be launched
    #[error("Failed to start transcription command '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
}

/// Something the recognizer reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEvent {
    /// Cumulative transcript so far
    Update(String),
    /// Engine error; the session stays open
    Error(String),
}

/// Where a recognizer sends its events
pub type TranscriptSink = UnboundedSender<TranscriptEvent>;

/// Settings handed to the recognizer on start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionOptions {
    pub locale: String,
    /// Keep listening across pauses
    pub continuous: bool,
    /// Report partial results while the user is still speaking
    pub interim_results: bool,
}

impl RecognitionOptions {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            continuous: true,
            interim_results: true,
        }
    }
}

impl Default for RecognitionOptions {
    fn default() -> Self {
        Self::new(DEFAULT_LOCALE)
    }
}

/// Handle to a running recognition session
pub trait RecognitionSession: Send {
    /// Stop listening
    ///
    /// Every event produced before the engine stopped must be in the sink
    /// when this returns.
    fn stop(&mut self);
}

/// A speech-to-text engine
pub trait SpeechRecognizer {
    /// Whether the engine can be started on this platform
    fn is_available(&self) -> bool;

    /// Begin a session that reports into `sink`
    fn start(
        &mut self,
        options: &RecognitionOptions,
        sink: TranscriptSink,
    ) -> Result<Box<dyn RecognitionSession>, RecorderError>;
}

struct ActiveSession {
    handle: Box<dyn RecognitionSession>,
    events: UnboundedReceiver<TranscriptEvent>,
}

/// Recording state for a note being dictated
///
/// At most one session is active. `start` while recording fails, and `stop`
/// is the only way to end a session.
pub struct Dictation<R: SpeechRecognizer> {
    recognizer: R,
    options: RecognitionOptions,
    session: Option<ActiveSession>,
    draft: String,
}

impl<R: SpeechRecognizer> Dictation<R> {
    pub fn new(recognizer: R, options: RecognitionOptions) -> Self {
        Self {
            recognizer,
            options,
            session: None,
            draft: String::new(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.recognizer.is_available()
    }

    pub fn is_recording(&self) -> bool {
        self.session.is_some()
    }

    /// Current draft text
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Start a recording session
    pub fn start(&mut self) -> Result<(), RecorderError> {
        if !self.recognizer.is_available() {
            return Err(RecorderError::Unavailable);
        }
        if self.session.is_some() {
            return Err(RecorderError::AlreadyRecording);
        }

        let (sink, events) = mpsc::unbounded_channel();
        let handle = self.recognizer.start(&self.options, sink)?;
        self.session = Some(ActiveSession { handle, events });

        info!("Recording started (locale {})", self.options.locale);
        Ok(())
    }

    /// Stop the active session and return the final draft
    ///
    /// The recognizer has flushed everything it produced by the time its
    /// `stop` returns, so the draft reflects the last transcript it wrote.
    /// Does nothing when idle.
    pub fn stop(&mut self) -> &str {
        if let Some(session) = self.session.as_mut() {
            session.handle.stop();
            self.poll();
            self.session = None;
            info!("Recording stopped");
        }
        &self.draft
    }

    /// Apply every queued event without waiting
    pub fn poll(&mut self) -> Vec<TranscriptEvent> {
        let mut drained = Vec::new();
        if let Some(session) = self.session.as_mut() {
            while let Ok(event) = session.events.try_recv() {
                drained.push(event);
            }
        }
        for event in &drained {
            self.apply(event);
        }
        drained
    }

    /// Wait for the next event and apply it
    ///
    /// Returns `None` when idle or when the recognizer has gone away.
    pub async fn next_event(&mut self) -> Option<TranscriptEvent> {
        let session = self.session.as_mut()?;
        let event = session.events.recv().await?;
        self.apply(&event);
        Some(event)
    }

    fn apply(&mut self, event: &TranscriptEvent) {
        match event {
            TranscriptEvent::Update(text) => {
                debug!("Transcript update ({} chars)", text.len());
                self.draft = text.clone();
            }
            TranscriptEvent::Error(message) => {
                error!("Speech recognition error: {}", message);
            }
        }
    }
}

impl<R: SpeechRecognizer> Drop for Dictation<R> {
    fn drop(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.handle.stop();
        }
    }
}

/// Recognizer backed by an external transcription program
///
/// The program is expected to write the cumulative transcript as one line
/// on stdout each time it changes. Lines on stderr are reported as errors.
/// Recognition options are passed through the environment:
/// `NOTECARD_LOCALE`, `NOTECARD_CONTINUOUS`, `NOTECARD_INTERIM_RESULTS`.
#[derive(Debug, Clone, Default)]
pub struct CommandRecognizer {
    command: Option<String>,
}

impl CommandRecognizer {
    /// `command` is a program followed by whitespace-separated arguments
    pub fn new(command: Option<String>) -> Self {
        let command = command.filter(|c| !c.trim().is_empty());
        Self { command }
    }

    fn program_and_args(&self) -> Option<(&str, Vec<&str>)> {
        let mut parts = self.command.as_deref()?.split_whitespace();
        let program = parts.next()?;
        Some((program, parts.collect()))
    }
}

impl SpeechRecognizer for CommandRecognizer {
    fn is_available(&self) -> bool {
        self.program_and_args()
            .map(|(program, _)| which::which(program).is_ok())
            .unwrap_or(false)
    }

    fn start(
        &mut self,
        options: &RecognitionOptions,
        sink: TranscriptSink,
    ) -> Result<Box<dyn RecognitionSession>, RecorderError> {
        let (program, args) = self.program_and_args().ok_or(RecorderError::Unavailable)?;
        let command_line = self.command.clone().unwrap_or_default();

        let mut child = Command::new(program)
            .args(args)
            .env("NOTECARD_LOCALE", &options.locale)
            .env("NOTECARD_CONTINUOUS", options.continuous.to_string())
            .env("NOTECARD_INTERIM_RESULTS", options.interim_results.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RecorderError::Spawn {
                command: command_line.clone(),
                source,
            })?;

        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(forward_lines(stdout, sink.clone(), TranscriptEvent::Update));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(forward_lines(stderr, sink, TranscriptEvent::Error));
        }

        debug!("Spawned transcription command '{}'", command_line);
        Ok(Box::new(CommandSession {
            child: Some(child),
            readers,
        }))
    }
}

/// How long `stop` waits for the pipes to drain after the child is gone
///
/// A grandchild that inherited stdout can keep the pipe open after the
/// command itself was killed.
const DRAIN_TIMEOUT: Duration = Duration::from_millis(500);

/// Read `source` line by line on a background thread
fn forward_lines<T>(
    source: T,
    sink: TranscriptSink,
    wrap: fn(String) -> TranscriptEvent,
) -> JoinHandle<()>
where
    T: Read + Send + 'static,
{
    thread::spawn(move || {
        for line in BufReader::new(source).lines() {
            let Ok(line) = line else { break };
            let line = line.trim_end().to_string();
            if line.is_empty() {
                continue;
            }
            if sink.send(wrap(line)).is_err() {
                break;
            }
        }
    })
}

struct CommandSession {
    child: Option<Child>,
    readers: Vec<JoinHandle<()>>,
}

impl RecognitionSession for CommandSession {
    fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }

        // Lines still sitting in the pipes are forwarded before EOF
        let deadline = Instant::now() + DRAIN_TIMEOUT;
        for reader in self.readers.drain(..) {
            while !reader.is_finished() && Instant::now() < deadline {
                thread::sleep(Duration::from_millis(5));
            }
            if reader.is_finished() {
                let _ = reader.join();
            } else {
                warn!("Transcription output still open after stop, later lines are ignored");
            }
        }
    }
}

impl Drop for CommandSession {
    fn drop(&mut self) {
        self.stop();
    }
}
