use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FsError {
    #[error("No such file or directory")]
    NotFound,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("File exists")]
    AlreadyExists,

    #[error("Not a directory")]
    NotADirectory,

    #[error("Operation not supported on this platform")]
    Unsupported,

    #[error("I/O error: {0}")]
    Io(io::Error),
}

impl From<io::Error> for FsError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => FsError::NotFound,
            io::ErrorKind::PermissionDenied => FsError::PermissionDenied,
            io::ErrorKind::AlreadyExists => FsError::AlreadyExists,
            io::ErrorKind::Unsupported => FsError::Unsupported,
            _ => FsError::Io(err),
        }
    }
}

impl FsError {
    pub fn to_ftp_response(&self) -> String {
        match self {
            FsError::NotFound => "550 No such file or directory.".to_string(),
            FsError::PermissionDenied => "550 Permission denied.".to_string(),
            FsError::AlreadyExists => "550 File exists.".to_string(),
            FsError::NotADirectory => "550 Not a directory.".to_string(),
            FsError::Unsupported => "502 Operation not supported on this platform.".to_string(),
            FsError::Io(_) => "451 Requested action aborted. Local error in processing.".to_string(),
        }
    }
}

/// A client path that would leave the user's home directory.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("Path escapes the home directory: {0}")]
    Violation(String),

    #[error("Path contains a NUL byte")]
    InvalidCharacter,
}

impl PathError {
    pub fn to_ftp_response(&self) -> String {
        match self {
            PathError::Violation(_) => "550 Path is outside of the allowed area.".to_string(),
            PathError::InvalidCharacter => "550 Invalid path.".to_string(),
        }
    }
}
