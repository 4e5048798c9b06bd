//! Error types for CIN decoding and encoding

use std::io;

use crate::convert::Format;

/// Errors that can occur when decoding, encoding or converting CIN data
#[derive(Debug, thiserror::Error)]
pub enum CinError {
    /// Buffer ended before a field or record could be read
    #[error(
        "Truncated input: {what} needs {need} bytes at offset 0x{offset:X}, only {available} available"
    )]
    TruncatedInput {
        what: &'static str,
        offset: usize,
        need: usize,
        available: usize,
    },

    /// Structured document is missing a field, has a wrong type or breaks the format
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// File extension is neither `.cin` nor `.json`
    #[error("Unsupported input kind: {0}")]
    UnsupportedInputKind(String),

    /// Input is already in the requested format
    #[error("Can't convert .{0} to .{0}")]
    SameFormat(Format),

    /// IO error while reading or writing a file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl CinError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedDocument(msg.into())
    }
}

impl From<serde_json::Error> for CinError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedDocument(err.to_string())
    }
}
