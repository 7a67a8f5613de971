//! Cinder - package file reading, inspection and repacking.
//!
//! This crate provides a unified interface to the Cinder library ecosystem.
//!
//! # Crates
//!
//! - [`cinder_common`] - Binary stream primitives
//! - [`cinder_texture`] - Texture model, pixel formats and block decoders
//! - [`cinder_xnb`] - Embedded XNB texture containers
//! - [`cinder_pkg`] - `.pkg` / `.pkg_manifest` containers and entry types
//! - [`cinder_index`] - Package catalog, texture index and pixel cache
//!
//! # Example
//!
//! ```no_run
//! use cinder::prelude::*;
//!
//! let package = Package::open("Content/Win/Packages", "MainMenu")?;
//! for entry in package.package_contents()? {
//!     println!("{}: {}", entry.entry_type(), entry.display_name());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use cinder_common as common;
pub use cinder_index as index;
pub use cinder_pkg as pkg;
pub use cinder_texture as texture;
pub use cinder_xnb as xnb;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use cinder_common::{BinaryReader, BinaryWriter};
    pub use cinder_index::{PackageManager, TextureHandle};
    pub use cinder_pkg::entries::{AtlasEntry, AtlasTexture, SubAtlas, TextureEntry};
    pub use cinder_pkg::{Entry, EntryReference, EntryType, FileKind, Package, WriteOptions};
    pub use cinder_texture::{Decoders, SurfaceFormat, Texture};
}

pub use cinder_pkg::Package;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
