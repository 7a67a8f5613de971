//! Handles to entries of loaded packages.

use std::sync::Arc;

use cinder_pkg::entries::{AtlasEntry, SubAtlas, TextureEntry};
use cinder_pkg::{Entry, EntryReference, Package};
use cinder_texture::Texture;

use crate::{Error, Result};

/// An entry together with the package that owns it.
///
/// The handle keeps the package alive, so it stays valid after the package
/// is released from the manager.
#[derive(Debug, Clone)]
pub struct EntryHandle {
    package: Arc<Package>,
    reference: EntryReference,
}

impl EntryHandle {
    /// Pin `reference` to `package`, checking that it points at an entry.
    pub fn new(package: Arc<Package>, reference: EntryReference) -> Result<Self> {
        package.entry(&reference)?;
        Ok(Self { package, reference })
    }

    pub fn package(&self) -> &Arc<Package> {
        &self.package
    }

    pub fn reference(&self) -> &EntryReference {
        &self.reference
    }

    pub fn entry(&self) -> Result<&Entry> {
        Ok(self.package.entry(&self.reference)?)
    }

    /// The entry as an atlas, if it is one.
    pub fn atlas(&self) -> Result<Option<&AtlasEntry>> {
        Ok(self.entry()?.as_atlas())
    }

    fn expect_atlas(&self) -> Result<&AtlasEntry> {
        self.atlas()?
            .ok_or_else(|| Error::NotAnAtlas(self.reference.to_string()))
    }

    /// Handles to every sub-atlas of this atlas entry.
    pub fn sub_atlases(&self) -> Result<Vec<SubAtlasHandle>> {
        let len = self.expect_atlas()?.sub_atlases.len();
        Ok((0..len)
            .map(|index| SubAtlasHandle {
                atlas: self.clone(),
                index,
            })
            .collect())
    }
}

/// A sub-atlas, identified by its atlas entry and its position in it.
///
/// `SubAtlas` values carry no link to their atlas; this handle is the way
/// back from a region to the atlas and package that hold it.
#[derive(Debug, Clone)]
pub struct SubAtlasHandle {
    atlas: EntryHandle,
    index: usize,
}

impl SubAtlasHandle {
    /// Point at sub-atlas `index` of the atlas behind `atlas`.
    pub fn new(atlas: EntryHandle, index: usize) -> Result<Self> {
        let len = atlas.expect_atlas()?.sub_atlases.len();
        if index >= len {
            return Err(Error::SubAtlasOutOfRange {
                atlas: atlas.reference.to_string(),
                index,
                len,
            });
        }
        Ok(Self { atlas, index })
    }

    /// The atlas entry holding this region.
    pub fn atlas(&self) -> &EntryHandle {
        &self.atlas
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn sub_atlas(&self) -> Result<&SubAtlas> {
        let atlas = self.atlas.expect_atlas()?;
        atlas
            .sub_atlases
            .get(self.index)
            .ok_or_else(|| Error::SubAtlasOutOfRange {
                atlas: self.atlas.reference.to_string(),
                index: self.index,
                len: atlas.sub_atlases.len(),
            })
    }
}

/// Handle to a texture entry.
#[derive(Debug, Clone)]
pub struct TextureHandle {
    inner: EntryHandle,
}

impl TextureHandle {
    /// Wrap an entry handle, which must point at a 2D texture.
    pub fn new(inner: EntryHandle) -> Result<Self> {
        if inner.entry()?.as_texture().is_none() {
            return Err(Error::NotATexture(inner.reference.to_string()));
        }
        Ok(Self { inner })
    }

    pub fn entry(&self) -> Result<&TextureEntry> {
        self.inner
            .entry()?
            .as_texture()
            .ok_or_else(|| Error::NotATexture(self.inner.reference.to_string()))
    }

    pub fn texture(&self) -> Result<&Texture> {
        Ok(&self.entry()?.texture)
    }

    pub fn name(&self) -> Result<&str> {
        Ok(&self.entry()?.name)
    }

    pub fn reference(&self) -> &EntryReference {
        &self.inner.reference
    }

    pub fn package(&self) -> &Arc<Package> {
        &self.inner.package
    }

    pub fn key(&self) -> TextureKey {
        TextureKey {
            package: self.inner.package.id(),
            reference: self.inner.reference.clone(),
        }
    }
}

/// Identity of a texture: the package value that holds it plus its file and
/// index. A reloaded package gets a new identity, so handles into the old one
/// never share cache slots with the new one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureKey {
    package: u64,
    reference: EntryReference,
}

impl TextureKey {
    pub fn reference(&self) -> &EntryReference {
        &self.reference
    }
}
