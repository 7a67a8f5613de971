//! Error types for texture handling.

use thiserror::Error;

use crate::SurfaceFormat;

/// Errors that can occur when decoding or encoding texture data.
#[derive(Debug, Error)]
pub enum Error {
    /// The pixel format has no decoder.
    #[error("unsupported texture format: {0:?}")]
    UnsupportedFormat(SurfaceFormat),

    /// The pixel format has no encoder.
    #[error("re-encoding to {0:?} is not supported")]
    UnsupportedEncoding(SurfaceFormat),

    /// Input length is inconsistent with the texture dimensions.
    #[error("texture data size mismatch: expected {expected} bytes, got {actual}")]
    DataSizeMismatch { expected: usize, actual: usize },

    /// Texture dimensions are negative or overflow.
    #[error("invalid texture dimensions {width}x{height}")]
    InvalidDimensions { width: i64, height: i64 },

    /// Block decompression engine failure.
    #[error("decompression error: {0}")]
    Decompression(String),

    /// Block compression engine failure.
    #[error("compression error: {0}")]
    Compression(String),
}

/// Result type for texture operations.
pub type Result<T> = std::result::Result<T, Error>;
