//! Logging setup
//!
//! Library code logs through `tracing`. The filter comes from `NOTECARD_LOG`
//! (e.g. `NOTECARD_LOG=notecard_core=debug`) and defaults to warnings only.
//! Logs go to stderr unless `log_file` is configured.

use std::fs::OpenOptions;
use std::sync::Mutex;

use notecard_core::Config;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "NOTECARD_LOG";
const DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber
///
/// Safe to call more than once; later calls are ignored.
pub fn init(config: &Config) {
    let env_filter = filter();

    if let Some(path) = &config.log_file {
        let log_file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("Warning: Could not open log file {:?}: {}", path, e);
                init_stderr(env_filter);
                return;
            }
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_ansi(false)
            .with_writer(Mutex::new(log_file))
            .try_init();

        debug!("Logging to {:?}", path);
        return;
    }

    init_stderr(env_filter);
}

fn init_stderr(env_filter: EnvFilter) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
