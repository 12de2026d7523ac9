//! Error types for discforged-media.

use std::io;
use thiserror::Error;

/// Result type for discforged-media operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for discforged-media operations.
///
/// End of stream is not an error: reads report it as `Ok(0)`.
#[derive(Debug, Error)]
pub enum Error {
    /// Disc, title set, title file or playable title could not be found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Explicit selector outside its valid bounds.
    #[error("{what} {value} out of range (valid: 0..{count})")]
    OutOfRange {
        what: &'static str,
        value: u32,
        count: u32,
    },

    /// Cross-reference table points outside its own bounds.
    #[error("corrupt index: {0}")]
    CorruptIndex(String),

    /// I/O error from the underlying sector store.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Seek or size query not meaningful for the backing medium.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Caller buffer cannot hold a single sector.
    #[error("buffer underflow: need {need} bytes, have {have}")]
    BufferUnderflow { need: usize, have: usize },
}

impl Error {
    /// Create a not-found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a corrupt-index error.
    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::CorruptIndex(msg.into())
    }

    /// Create an unsupported error.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Create a short-read I/O error.
    pub fn short_read(lba: u32, requested: u32) -> Self {
        Self::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("no blocks read ({requested} requested at sector {lba})"),
        ))
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(e) => e,
            Error::NotFound(_) => io::Error::new(io::ErrorKind::NotFound, err),
            Error::OutOfRange { .. } | Error::BufferUnderflow { .. } => {
                io::Error::new(io::ErrorKind::InvalidInput, err)
            }
            Error::CorruptIndex(_) => io::Error::new(io::ErrorKind::InvalidData, err),
            Error::Unsupported(_) => io::Error::new(io::ErrorKind::Unsupported, err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_kind_mapping() {
        let e: io::Error = Error::unsupported("seek").into();
        assert_eq!(e.kind(), io::ErrorKind::Unsupported);

        let e: io::Error = Error::OutOfRange {
            what: "angle",
            value: 3,
            count: 2,
        }
        .into();
        assert_eq!(e.kind(), io::ErrorKind::InvalidInput);

        let e: io::Error = Error::corrupt("vts_ttn").into();
        assert_eq!(e.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_io_error_passthrough() {
        let inner = io::Error::new(io::ErrorKind::BrokenPipe, "ejected");
        let e: io::Error = Error::Io(inner).into();
        assert_eq!(e.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_out_of_range_message() {
        let e = Error::OutOfRange {
            what: "title",
            value: 7,
            count: 3,
        };
        assert_eq!(e.to_string(), "title 7 out of range (valid: 0..3)");
    }
}
