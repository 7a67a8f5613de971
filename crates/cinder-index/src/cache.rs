//! Premultiplied BGRA pixel cache.

use std::sync::Arc;

use cinder_texture::{premultiply_bgra, Decoders};
use hashbrown::HashMap;
use parking_lot::{Mutex, RwLock};
use tracing::trace;

use crate::handle::{TextureHandle, TextureKey};
use crate::Result;

type Generation = Arc<Mutex<HashMap<TextureKey, Arc<[u8]>>>>;

/// Display-ready pixels keyed by texture identity.
///
/// [`reset`](Self::reset) swaps in a fresh map instead of clearing the current
/// one, so a decode that started before the reset lands in the discarded map.
#[derive(Debug)]
pub struct TextureCache {
    decoders: Decoders,
    current: RwLock<Generation>,
}

impl TextureCache {
    pub fn new(decoders: Decoders) -> Self {
        Self {
            decoders,
            current: RwLock::new(Generation::default()),
        }
    }

    fn generation(&self) -> Generation {
        Arc::clone(&self.current.read())
    }

    /// Cached pixels, or decode and premultiply them once.
    pub fn get(&self, texture: &TextureHandle) -> Result<Arc<[u8]>> {
        let key = texture.key();
        let generation = self.generation();
        if let Some(pixels) = generation.lock().get(&key) {
            return Ok(Arc::clone(pixels));
        }

        let mut pixels = texture.texture()?.rgba_data(&self.decoders)?.to_vec();
        premultiply_bgra(&mut pixels);
        let pixels: Arc<[u8]> = pixels.into();
        trace!(texture = %key.reference(), bytes = pixels.len(), "cached texture pixels");

        let mut map = generation.lock();
        Ok(Arc::clone(map.entry(key).or_insert(pixels)))
    }

    /// Cached pixels without decoding.
    pub fn get_cached(&self, texture: &TextureHandle) -> Option<Arc<[u8]>> {
        self.generation().lock().get(&texture.key()).cloned()
    }

    /// Drop one texture, e.g. after its pixels were replaced.
    pub fn flush(&self, texture: &TextureHandle) {
        self.generation().lock().remove(&texture.key());
    }

    /// Start over with an empty map.
    pub fn reset(&self) {
        *self.current.write() = Generation::default();
    }

    pub fn len(&self) -> usize {
        self.generation().lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TextureCache {
    fn default() -> Self {
        Self::new(Decoders::default())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use cinder_pkg::entries::TextureEntry;
    use cinder_pkg::{Entry, EntryReference, Package};
    use cinder_texture::{SurfaceFormat, Texture};

    use super::*;
    use crate::handle::EntryHandle;

    fn handle() -> TextureHandle {
        let texture = Texture::new(SurfaceFormat::Color, 1, 1, vec![200, 100, 0, 128]);
        let package = Arc::new(Package::from_entries(
            "Art",
            Vec::new(),
            vec![Entry::Texture(TextureEntry {
                name: "dot".to_string(),
                texture,
            })],
        ));
        let reference = EntryReference::new(0, package.package_reference()).unwrap();
        TextureHandle::new(EntryHandle::new(package, reference).unwrap()).unwrap()
    }

    #[test]
    fn test_premultiplied_bgra() {
        let cache = TextureCache::default();
        let texture = handle();
        let pixels = cache.get(&texture).unwrap();
        assert_eq!(&*pixels, &[0, 50, 100, 128]);
        assert!(Arc::ptr_eq(&pixels, &cache.get(&texture).unwrap()));
    }

    #[test]
    fn test_flush_and_reset() {
        let cache = TextureCache::default();
        let texture = handle();
        assert!(cache.get_cached(&texture).is_none());

        cache.get(&texture).unwrap();
        assert!(cache.get_cached(&texture).is_some());
        cache.flush(&texture);
        assert!(cache.is_empty());

        cache.get(&texture).unwrap();
        cache.reset();
        assert!(cache.get_cached(&texture).is_none());
    }
}
