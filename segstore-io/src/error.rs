use std::io;

use thiserror::Error;

/// Error type for snapshot operations.
#[derive(Error, Debug)]
pub enum SegsError {
    /// IO error occurred during file operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// File is not a valid `.segs` snapshot.
    #[error("File doesn't appear to be a valid .segs snapshot")]
    InvalidSegsFile,

    /// Snapshot was written by an unknown format version.
    #[error("Unsupported .segs format version: {0}")]
    UnsupportedVersion(u8),

    /// Invalid payload tag found in a snapshot record.
    #[error("Invalid payload tag found in .segs record: {0:#x}")]
    InvalidPayloadTag(u8),

    /// A record decodes to an ill-formed segment.
    #[error("Corrupt .segs record: start {0} is after end {1}")]
    CorruptRecord(i64, i64),

    /// A text payload held invalid UTF-8.
    #[error("Text payload is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Result type alias for snapshot operations.
pub type Result<T> = std::result::Result<T, SegsError>;
