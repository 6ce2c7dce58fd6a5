use std::path::PathBuf;
use thiserror::Error;

pub type MappingResult<T> = Result<T, MappingError>;

/// Coarse classification of a [`MappingError`], as reported to the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    AlreadyExists,
    NotFound,
    Io,
}

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("the volume {0} already exists")]
    AlreadyExists(String),

    #[error("volume {0} not found")]
    NotFound(String),

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed state file {}: {source}", .path.display())]
    StateFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl MappingError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Io { .. } | Self::StateFormat { .. } => ErrorKind::Io,
        }
    }

    /// True when the error is an I/O failure because the path does not exist.
    pub fn is_missing_file(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}
