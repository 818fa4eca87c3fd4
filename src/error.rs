//! Error type shared by every stage of the compressor.
//!
//! Errors fall into three kinds: I/O failures surfaced verbatim, format
//! errors for bad paths or corrupt/truncated containers, and logic errors
//! that a correct build never produces but that must still fail loudly.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HzipError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("Invalid file path format (extension must be explicit): {0}")]
    MissingExtension(String),

    #[error("File extension {0:?} contains the separator byte")]
    SeparatorInExtension(String),

    #[error("Cannot build a Huffman tree from an empty alphabet")]
    EmptyAlphabet,

    #[error("Corrupt container header: {0}")]
    CorruptHeader(String),

    #[error("Compressed stream is truncated: decoded {decoded} of {expected} symbols")]
    Truncated { decoded: u64, expected: u64 },

    #[error("Compressed stream ended before the extension separator")]
    MissingSeparator,

    #[error("Restored file extension is not valid UTF-8")]
    InvalidExtension,

    #[error("Source file changed while it was being compressed")]
    SourceChanged,

    #[error("Refusing to overwrite the source file: {0}")]
    OverwritesSource(String),

    #[error("Internal logic error (this is a bug): {0}")]
    Logic(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Format,
    Logic,
}

impl HzipError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HzipError::Io(_) => ErrorKind::Io,
            HzipError::Logic(_) => ErrorKind::Logic,
            HzipError::MissingExtension(_)
            | HzipError::SeparatorInExtension(_)
            | HzipError::EmptyAlphabet
            | HzipError::CorruptHeader(_)
            | HzipError::Truncated { .. }
            | HzipError::MissingSeparator
            | HzipError::InvalidExtension
            | HzipError::SourceChanged
            | HzipError::OverwritesSource(_) => ErrorKind::Format,
        }
    }
}

pub type Result<T> = std::result::Result<T, HzipError>;
