//! Library-wide error and result types.

use std::io;

use thiserror::Error;

/// Result alias used throughout ndskit.
pub type Result<T> = std::result::Result<T, Error>;

/// All errors the library can produce.
///
/// Error messages are kept intentionally terse; callers that need richer
/// context should wrap `Error` in their own type. Use [`Error::kind`] to
/// branch on the broad category instead of matching every variant.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    /// A magic/signature field did not match the expected value.
    #[error("bad magic value, expected {:?}", String::from_utf8_lossy(.expected))]
    BadMagic {
        /// The signature the parser was looking for.
        expected: &'static [u8],
    },
    /// The data ended before all expected bytes could be read.
    #[error("unexpected end of data")]
    UnexpectedEof,
    /// An offset or size field would read outside the valid region.
    #[error("invalid offset or size")]
    InvalidRange,
    /// A structural constraint was violated (message describes which one).
    #[error("parse error: {0}")]
    Parse(&'static str),
    /// The filename table referenced a directory id before registering it.
    #[error("directory {0:#x} referenced before it was declared")]
    UnregisteredDirectory(u16),
    /// The container is recognized but this codec variant is not implemented.
    #[error("unsupported {what}: {code}")]
    UnsupportedFormat {
        /// Which field carried the unsupported value.
        what: &'static str,
        /// The raw value found in the data.
        code: u32,
    },
    /// A name-based lookup matched more than one catalog entry.
    #[error("{matches} entries match {path:?}")]
    AmbiguousLookup {
        /// The path that was looked up.
        path: String,
        /// How many entries carry that path.
        matches: usize,
    },
    /// An external input required by the operation was not supplied.
    #[error("missing resource: {0}")]
    MissingResource(&'static str),
    /// An underlying I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[source] io::Error),
}

/// Broad error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Structural mismatch; fatal to the structure being parsed.
    Format,
    /// Recognized container, unimplemented codec variant.
    Unsupported,
    /// A lookup matched several entries.
    Ambiguous,
    /// The caller did not supply something the operation needs.
    Missing,
    /// I/O failure from the backing stream.
    Io,
}

impl Error {
    /// The category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::BadMagic { .. }
            | Error::UnexpectedEof
            | Error::InvalidRange
            | Error::Parse(_)
            | Error::UnregisteredDirectory(_) => ErrorKind::Format,
            Error::UnsupportedFormat { .. } => ErrorKind::Unsupported,
            Error::AmbiguousLookup { .. } => ErrorKind::Ambiguous,
            Error::MissingResource(_) => ErrorKind::Missing,
            Error::Io(_) => ErrorKind::Io,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        // Truncation surfaces through `read_exact`.
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Error::UnexpectedEof
        } else {
            Error::Io(e)
        }
    }
}
