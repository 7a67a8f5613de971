//! Lookup tables derived from the loaded packages.

use cinder_pkg::{Entry, EntryReference, FileKind};
use hashbrown::hash_map::Entry as Slot;
use hashbrown::HashMap;
use tracing::{debug, warn};

use crate::loaded::LoadedPackages;
use crate::Result;

/// Texture and atlas lookups across every loaded package.
#[derive(Debug, Clone, Default)]
pub struct TextureIndex {
    textures: HashMap<String, EntryReference>,
    atlases: HashMap<String, Vec<EntryReference>>,
}

impl TextureIndex {
    /// Scan every package in load order, manifest entries before package
    /// entries. The first texture registered under a name wins, so a later
    /// load never takes over a name already in use.
    pub fn build(loaded: &LoadedPackages) -> Result<Self> {
        let mut index = Self::default();
        for package in loaded.iter() {
            for kind in [FileKind::Manifest, FileKind::Package] {
                for (reference, entry) in package.references(kind)? {
                    index.add(reference, entry);
                }
            }
        }
        debug!(
            textures = index.textures.len(),
            atlas_targets = index.atlases.len(),
            "rebuilt texture index"
        );
        Ok(index)
    }

    fn add(&mut self, reference: EntryReference, entry: &Entry) {
        match entry {
            Entry::Texture(texture) => match self.textures.entry(texture.name.clone()) {
                Slot::Occupied(existing) => {
                    warn!(
                        texture = %texture.name,
                        duplicate = %reference.package(),
                        kept = %existing.get().package(),
                        "duplicate texture entry"
                    );
                }
                Slot::Vacant(slot) => {
                    slot.insert(reference);
                }
            },
            Entry::Atlas(atlas) => {
                if let Some(name) = atlas.referenced_texture_name() {
                    self.atlases
                        .entry(name.to_string())
                        .or_default()
                        .push(reference);
                }
            }
            _ => {}
        }
    }

    pub fn texture(&self, name: &str) -> Option<&EntryReference> {
        self.textures.get(name)
    }

    /// References to atlases that point at the texture `name`.
    pub fn atlases(&self, name: &str) -> &[EntryReference] {
        self.atlases.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }
}
