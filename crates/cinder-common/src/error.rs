//! Error types for cinder-common.

use thiserror::Error;

/// Common error type for Cinder operations.
#[derive(Debug, Error)]
pub enum Error {
    /// End of buffer reached while reading.
    #[error("unexpected end of buffer: needed {needed} bytes but only {available} available")]
    UnexpectedEof { needed: usize, available: usize },

    /// A length prefix was negative.
    #[error("positive length required, but got {0}")]
    NegativeLength(i32),

    /// A string does not fit its single-byte length prefix.
    #[error("string of {0} bytes exceeds the 255 byte limit of a short string")]
    StringTooLong(usize),

    /// A 7-bit encoded integer ran past five bytes.
    #[error("7-bit encoded integer is malformed")]
    Bad7BitInt,

    /// UTF-8 decoding error.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
