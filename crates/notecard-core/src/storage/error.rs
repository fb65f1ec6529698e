//! Storage errors
//!
//! Every variant carries the path it failed on. `recovery_suggestion` gives
//! the CLI something actionable to print next to the error.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure reading or writing a blob
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Could not create data directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Permission denied for '{path}'")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No space left to write '{path}'")]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not read '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not write '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The temp file was written but could not replace the blob
    #[error("Could not move '{from}' into place at '{to}': {source}")]
    AtomicWriteFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Key is empty or would escape the store directory
    #[error("Invalid storage key '{key}'")]
    InvalidKey { key: String },
}

impl StorageError {
    /// Classify a write-side I/O error on `path`
    pub fn from_io(error: io::Error, path: PathBuf) -> Self {
        if error.kind() == io::ErrorKind::PermissionDenied {
            StorageError::PermissionDenied {
                path,
                source: error,
            }
        } else if is_out_of_space(&error) {
            StorageError::DiskFull {
                path,
                source: error,
            }
        } else {
            StorageError::WriteError {
                path,
                source: error,
            }
        }
    }

    /// What the user can do about it, when there is something
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StorageError::DiskFull { .. } => {
                Some("Free some disk space and run the command again. Your notes were not changed.")
            }
            StorageError::PermissionDenied { .. } | StorageError::CreateDirectory { .. } => Some(
                "Make sure the data directory is writable, or point `data_dir` somewhere else \
                 with `notecard config set data_dir <path>`.",
            ),
            StorageError::AtomicWriteFailed { .. } => {
                Some("The previous notes file is intact. Check the data directory and retry.")
            }
            _ => None,
        }
    }
}

/// ENOSPC and quota errors do not have a stable `ErrorKind` on every platform
fn is_out_of_space(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    ["no space left", "disk full", "quota exceeded", "not enough space"]
        .iter()
        .any(|needle| msg.contains(needle))
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_has_suggestion() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err = StorageError::from_io(io_err, PathBuf::from("/data/notes.json"));

        assert!(matches!(err, StorageError::PermissionDenied { .. }));
        assert!(err.recovery_suggestion().unwrap().contains("data_dir"));
    }

    #[test]
    fn test_out_of_space_is_disk_full() {
        let io_err = io::Error::new(io::ErrorKind::Other, "No space left on device");
        let err = StorageError::from_io(io_err, PathBuf::from("/full/notes.json.tmp"));

        assert!(matches!(err, StorageError::DiskFull { .. }));
        assert!(err.to_string().contains("/full/notes.json.tmp"));
        assert!(err.recovery_suggestion().is_some());
    }

    #[test]
    fn test_other_io_is_write_error_without_suggestion() {
        let io_err = io::Error::new(io::ErrorKind::Other, "device busy");
        let err = StorageError::from_io(io_err, PathBuf::from("/busy"));

        assert!(matches!(err, StorageError::WriteError { .. }));
        assert!(err.recovery_suggestion().is_none());
    }
}
