//! Package container support for Cinder.
//!
//! A package is a pair of files sharing one name: `<name>.pkg_manifest`
//! lists atlases, bink atlases and includes of other packages, and
//! `<name>.pkg` carries the texture and bink payloads.
//!
//! Both files use the same layout: a big-endian version word, then chunks of
//! tagged records. Package chunks may be LZF compressed; manifests never are.
//!
//! # Example
//!
//! ```
//! use cinder_pkg::{create_container, read_container, Entry, FileKind, WriteOptions};
//! use cinder_pkg::entries::IncludePackageEntry;
//!
//! let entries = vec![Entry::IncludePackage(IncludePackageEntry::new("Base"))];
//! let bytes = create_container(&entries, WriteOptions { compress: false })?;
//!
//! let decoded = read_container(&bytes, FileKind::Manifest, "Menu.pkg_manifest")?;
//! assert_eq!(decoded[0].display_name(), "Base");
//! # Ok::<(), cinder_pkg::Error>(())
//! ```

mod container;
pub mod entries;
mod error;
mod package;
mod reference;

pub use container::{
    create_container, read_container, WriteOptions, CHUNK_SIZE, COMPRESSION_FLAG, PACKAGE_VERSION,
};
pub use entries::{Entry, EntryType};
pub use error::{Error, Result};
pub use package::Package;
pub use reference::{
    EntryReference, FileKind, Files, PackageReference, MANIFEST_EXTENSION, PACKAGE_EXTENSION,
};
