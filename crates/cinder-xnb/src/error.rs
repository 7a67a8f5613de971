//! Error types for XNB decoding.

use thiserror::Error;

use crate::AssetKind;

/// Errors that can occur when reading or writing XNB containers.
#[derive(Debug, Error)]
pub enum Error {
    /// Common library error (truncation, bad strings).
    #[error("{0}")]
    Common(#[from] cinder_common::Error),

    /// Texture library error.
    #[error("{0}")]
    Texture(#[from] cinder_texture::Error),

    /// The container does not start with `XNB` and a known platform byte.
    #[error("asset does not appear to be a valid XNB file (magic {magic:?}, platform {platform:#04x})")]
    InvalidHeader { magic: [u8; 3], platform: u8 },

    /// Container version other than 5 or 6.
    #[error("invalid XNB version {0}")]
    UnsupportedVersion(u8),

    /// Declared sizes are negative or exceed the data.
    #[error("invalid XNB length: {0}")]
    InvalidLength(i64),

    /// Whole-container decompression failed.
    #[error("XNB decompression error: {0}")]
    Decompression(String),

    /// A type reader name with no implementation.
    #[error("unsupported type reader {0:?}")]
    UnsupportedTypeReader(String),

    /// An object references a type reader outside the table.
    #[error("incorrect type reader index {index} (table has {count})")]
    InvalidTypeReaderIndex { index: i32, count: usize },

    /// The root object is null.
    #[error("XNB root asset is null")]
    NullAsset,

    /// The root object is not of the requested kind.
    #[error("expected {expected:?} asset, found {actual:?}")]
    UnexpectedAsset { expected: AssetKind, actual: AssetKind },

    /// Texture carries more than one mip level.
    #[error("textures with {0} mip levels are not supported")]
    UnsupportedMipLevels(i32),

    /// Negative texture dimension or data size.
    #[error("negative {field} in texture asset: {value}")]
    NegativeField { field: &'static str, value: i32 },

    /// Serialized container exceeds the 32-bit length field.
    #[error("XNB payload of {0} bytes is too large")]
    TooLarge(usize),
}

/// Result type for XNB operations.
pub type Result<T> = std::result::Result<T, Error>;
