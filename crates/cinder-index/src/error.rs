//! Error types for the package index.

use thiserror::Error;

/// Errors that can occur when loading or resolving packages.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error while scanning a root directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Package library error.
    #[error("{0}")]
    Pkg(#[from] cinder_pkg::Error),

    /// Texture library error.
    #[error("{0}")]
    Texture(#[from] cinder_texture::Error),

    /// No root directory has been set.
    #[error("no root directory set")]
    NoRoot,

    /// The name is not in the catalog of the current root.
    #[error("unknown package: {0}")]
    UnknownPackage(String),

    /// A reference names a package that is not loaded.
    #[error("package not loaded: {0}")]
    PackageNotLoaded(String),

    /// A handle expected a texture entry.
    #[error("entry {0} is not a texture")]
    NotATexture(String),

    /// A handle expected an atlas entry.
    #[error("entry {0} is not an atlas")]
    NotAnAtlas(String),

    /// A sub-atlas index past the end of its atlas.
    #[error("sub-atlas {index} out of range for atlas {atlas} with {len} sub-atlases")]
    SubAtlasOutOfRange {
        atlas: String,
        index: usize,
        len: usize,
    },

    /// The bulk load thread panicked.
    #[error("load worker panicked")]
    WorkerPanicked,
}

/// Result type for index operations.
pub type Result<T> = std::result::Result<T, Error>;
