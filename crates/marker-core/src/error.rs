use std::collections::TryReserveError;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub const E_MISSING_ARGUMENT: &str = "E_MISSING_ARGUMENT";
pub const E_INVALID_SIZE: &str = "E_INVALID_SIZE";
pub const E_BUFFER_TOO_SMALL: &str = "E_BUFFER_TOO_SMALL";
pub const E_IO: &str = "E_IO";
pub const E_MEMORY_ALLOCATION: &str = "E_MEMORY_ALLOCATION";
pub const E_INVALID_INPUT: &str = "E_INVALID_INPUT";
pub const E_PARSE_FAILED: &str = "E_PARSE_FAILED";

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("missing required argument `{0}`")]
    MissingArgument(&'static str),

    #[error("invalid size {0}")]
    InvalidSize(usize),

    #[error("output buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },

    #[error("I/O failure on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("memory allocation failed")]
    MemoryAllocation(#[from] TryReserveError),

    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    #[error("parse failed")]
    ParseFailed,
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingArgument(_) => ErrorKind::MissingArgument,
            Error::InvalidSize(_) => ErrorKind::InvalidSize,
            Error::BufferTooSmall { .. } => ErrorKind::BufferTooSmall,
            Error::Io { .. } => ErrorKind::Io,
            Error::MemoryAllocation(_) => ErrorKind::MemoryAllocation,
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::ParseFailed => ErrorKind::ParseFailed,
        }
    }
}

/// The closed set of failure kinds an operation can report.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    MissingArgument,
    InvalidSize,
    BufferTooSmall,
    Io,
    MemoryAllocation,
    InvalidInput,
    ParseFailed,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::MissingArgument => E_MISSING_ARGUMENT,
            ErrorKind::InvalidSize => E_INVALID_SIZE,
            ErrorKind::BufferTooSmall => E_BUFFER_TOO_SMALL,
            ErrorKind::Io => E_IO,
            ErrorKind::MemoryAllocation => E_MEMORY_ALLOCATION,
            ErrorKind::InvalidInput => E_INVALID_INPUT,
            ErrorKind::ParseFailed => E_PARSE_FAILED,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ErrorKind::MissingArgument => "Missing required argument",
            ErrorKind::InvalidSize => "Invalid size argument",
            ErrorKind::BufferTooSmall => "Output buffer too small",
            ErrorKind::Io => "I/O operation failed",
            ErrorKind::MemoryAllocation => "Memory allocation failed",
            ErrorKind::InvalidInput => "Invalid input",
            ErrorKind::ParseFailed => "Parse failed",
        }
    }
}
