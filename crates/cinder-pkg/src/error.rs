//! Error types for the package crate.

use thiserror::Error;

use crate::FileKind;

/// Errors that can occur when reading or writing packages.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error (truncation, bad strings).
    #[error("{0}")]
    Common(#[from] cinder_common::Error),

    /// Texture library error.
    #[error("{0}")]
    Texture(#[from] cinder_texture::Error),

    /// Embedded XNB error.
    #[error("{0}")]
    Xnb(#[from] cinder_xnb::Error),

    /// A manifest header has the compression flag set.
    #[error("compressed manifests are not allowed (in file {file})")]
    CompressedManifest { file: String },

    /// Header version other than the supported one.
    #[error("package version {version} is not supported (in file {file})")]
    UnsupportedVersion { version: i32, file: String },

    /// Tag byte with no entry type for this kind of file.
    #[error("unknown {kind} entry type {tag:#04x}")]
    UnknownEntryType { tag: u8, kind: FileKind },

    /// A size field is negative.
    #[error("{entry} has negative size of {size}")]
    NegativeSize { entry: String, size: i32 },

    /// A texture's declared size runs past the end of its chunk.
    #[error("texture named {name:?} exceeds the boundaries of the file, size is {size}")]
    EntryOutOfBounds { name: String, size: i32 },

    /// An entry carries a version this crate cannot read.
    #[error("{entry} has version {version}, expected {expected}")]
    UnsupportedEntryVersion {
        entry: &'static str,
        version: i32,
        expected: i32,
    },

    /// The entry cannot be written into a container.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// A serialized entry does not fit into an empty chunk.
    #[error("entry of {size} bytes does not fit into a chunk of {capacity} bytes")]
    EntryTooLarge { size: usize, capacity: usize },

    /// Packed chunks violate the size layout.
    #[error("chunk {index} has length {len}, expected {expected}")]
    ChunkLayout {
        index: usize,
        len: usize,
        expected: String,
    },

    /// LZF chunk decompression failed.
    #[error("decompression error: {0}")]
    Decompression(String),

    /// The package has not been loaded yet.
    #[error("package {0:?} is not loaded yet")]
    NotLoaded(String),

    /// A reference naming both files cannot address a single entry.
    #[error("reference to {0:?} must name either the manifest or the package file")]
    AmbiguousReference(String),

    /// An entry reference points past the end of its list.
    #[error("entry index {index} out of range for {file} ({len} entries)")]
    EntryIndexOutOfRange {
        index: usize,
        len: usize,
        file: String,
    },

    /// An entry reference was resolved against the wrong package.
    #[error("reference to package {expected:?} resolved against {actual:?}")]
    PackageMismatch { expected: String, actual: String },
}

/// Result type for package operations.
pub type Result<T> = std::result::Result<T, Error>;
