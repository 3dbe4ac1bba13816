//! Slot storage errors
//!
//! File failures carry the path they happened on; content failures carry
//! the slot key. Each kind can offer the user a next step.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Messages the OS uses when a write runs out of room
const OUT_OF_SPACE_MARKERS: &[&str] = &["no space left", "quota exceeded", "not enough space"];

/// Errors from reading or writing slots
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Cannot create data directory {path:?}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Access to {path:?} was denied")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Disk full or user quota exhausted
    #[error("Out of space while writing {path:?}")]
    OutOfSpace {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The finished temp file could not replace the slot file
    #[error("Cannot replace {to:?} with {from:?}: {source}")]
    Replace {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Slot content is not the expected JSON
    #[error("Slot '{slot}' is corrupt: {details}")]
    Corrupt { slot: String, details: String },

    #[error("Cannot encode slot '{slot}': {source}")]
    Encode {
        slot: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    /// Classify a failed read of `path`
    pub fn reading(error: io::Error, path: PathBuf) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                path,
                source: error,
            },
            _ => Self::Read {
                path,
                source: error,
            },
        }
    }

    /// Classify a failed write or delete of `path`
    pub fn writing(error: io::Error, path: PathBuf) -> Self {
        if error.kind() == io::ErrorKind::PermissionDenied {
            Self::PermissionDenied {
                path,
                source: error,
            }
        } else if is_out_of_space(&error) {
            Self::OutOfSpace {
                path,
                source: error,
            }
        } else {
            Self::Write {
                path,
                source: error,
            }
        }
    }

    /// What the user can do about it, if anything
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            Self::OutOfSpace { .. } => Some("Free up disk space, then add or sync again."),
            Self::PermissionDenied { .. } | Self::CreateDirectory { .. } => {
                Some("Make the data directory writable, or point data_dir somewhere else.")
            }
            Self::Corrupt { .. } => Some(
                "Back up quotes.json from the data directory. \
                 The next add, import or sync will overwrite it.",
            ),
            _ => None,
        }
    }
}

fn is_out_of_space(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    OUT_OF_SPACE_MARKERS.iter().any(|marker| msg.contains(marker))
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
