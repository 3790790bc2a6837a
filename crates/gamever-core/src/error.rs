use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Io,
    Validation,
    Conflict,
    NotFound,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Io => "io",
            Self::Validation => "validation",
            Self::Conflict => "conflict",
            Self::NotFound => "not-found",
        }
    }
}

#[derive(Debug, Error)]
pub enum GameverError {
    #[error("{operation} failed for {target}: {message}")]
    Network {
        operation: &'static str,
        target: String,
        message: String,
    },
    #[error("{operation} failed for {target}: server responded with HTTP {status}")]
    Http {
        operation: &'static str,
        target: String,
        status: u16,
    },
    #[error("failed to {operation}: {}: {source}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode {what} from {target}: {message}")]
    Decode {
        what: &'static str,
        target: String,
        message: String,
        on_disk: bool,
    },
    #[error("invalid name '{name}': {reason}")]
    Validation { name: String, reason: &'static str },
    #[error("version '{0}' already exists")]
    Conflict(String),
    #[error("{what} not found: {target}")]
    NotFound { what: &'static str, target: String },
    #[error("digest mismatch for {target}: expected {expected}, got {actual}")]
    Integrity {
        target: String,
        expected: String,
        actual: String,
    },
}

impl GameverError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network { .. } | Self::Http { .. } | Self::Integrity { .. } => {
                ErrorKind::Network
            }
            Self::Io { .. } => ErrorKind::Io,
            Self::Decode { on_disk, .. } => {
                if *on_disk {
                    ErrorKind::Io
                } else {
                    ErrorKind::Network
                }
            }
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::NotFound { .. } => ErrorKind::NotFound,
        }
    }

    pub fn not_found(what: &'static str, target: impl Into<String>) -> Self {
        Self::NotFound {
            what,
            target: target.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GameverError>;

/// Builds a `map_err` adapter that tags an `io::Error` with the failing operation and path.
pub fn io_error(operation: &'static str, path: &Path) -> impl FnOnce(io::Error) -> GameverError {
    let path = path.to_path_buf();
    move |source| GameverError::Io {
        operation,
        path,
        source,
    }
}
