//! Package catalog and texture lookups for Cinder.
//!
//! [`PackageManager`] scans a root directory for packages, loads them on
//! request and keeps an index from texture names to the entries that hold
//! them, plus the atlases that point at each texture. State lives in an
//! immutable [`Snapshot`] that is swapped whole on every change.
//!
//! # Example
//!
//! ```no_run
//! use cinder_index::PackageManager;
//!
//! let manager = PackageManager::open("Content/Win/Packages")?;
//! manager.load_package("MainMenu")?;
//!
//! if let Some(texture) = manager.texture_by_name("GUI\\Title") {
//!     let pixels = manager.texture_cache().get(&texture)?;
//!     println!("{} bytes of BGRA", pixels.len());
//! }
//! # Ok::<(), cinder_index::Error>(())
//! ```

mod cache;
mod error;
mod events;
mod handle;
mod index;
mod load;
mod loaded;
mod manager;

pub use cache::TextureCache;
pub use error::{Error, Result};
pub use events::ManagerEvent;
pub use handle::{EntryHandle, SubAtlasHandle, TextureHandle, TextureKey};
pub use index::TextureIndex;
pub use load::{LoadProgress, LoadSummary, LoadTask};
pub use loaded::{Dereference, LoadedPackages};
pub use manager::{PackageManager, Snapshot};
