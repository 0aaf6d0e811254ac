//! Error types for the Aether codec.

use std::io;

use crate::codec::Tag;

/// Errors that can occur while encoding or decoding Aether values.
///
/// Every variant is fatal for the read or write in progress. After a decode
/// error the source position is undefined, and after a write error the sink
/// may hold a partial value; neither should be used further.
#[derive(Debug, thiserror::Error)]
pub enum AetherError {
    /// The input is not a valid encoding: unknown tag, malformed varint,
    /// invalid UTF-8, negative size, or nesting beyond the configured depth.
    #[error("format error: {0}")]
    Format(String),

    /// The source ran out of bytes in the middle of a value.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// A runtime value of a Rust type the codec cannot represent.
    #[error("unsupported value type: {type_name}")]
    UnsupportedValue { type_name: &'static str },

    /// A typed read found a different kind of value than it asked for.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: Tag, found: Tag },

    /// A declared size is above the configured limit or not addressable.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("I/O error: {0}")]
    Io(#[source] io::Error),
}

impl AetherError {
    /// Wraps any displayable message as a format error.
    pub fn format(msg: impl std::fmt::Display) -> Self {
        Self::Format(msg.to_string())
    }

    /// Returns `true` if the input ended before a complete value was read.
    pub fn is_eof(&self) -> bool {
        matches!(self, Self::UnexpectedEof)
    }
}

impl From<io::Error> for AetherError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Self::UnexpectedEof
        } else {
            Self::Io(e)
        }
    }
}

/// Result type alias using [`AetherError`].
pub type Result<T> = std::result::Result<T, AetherError>;
