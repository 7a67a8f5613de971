//! The package manager: catalog, loaded packages and lookups.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use cinder_pkg::{FileKind, Package, MANIFEST_EXTENSION, PACKAGE_EXTENSION};
use cinder_texture::Decoders;
use crossbeam_channel::{unbounded, Receiver};
use hashbrown::HashMap;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::cache::TextureCache;
use crate::events::{ManagerEvent, Subscribers};
use crate::handle::{EntryHandle, TextureHandle};
use crate::index::TextureIndex;
use crate::load::{load_all, LoadProgress, LoadSummary, LoadTask};
use crate::loaded::LoadedPackages;
use crate::{Error, Result};

/// Immutable view of the manager state. Every change builds a new one.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    root: Option<PathBuf>,
    catalog: Vec<String>,
    sizes: HashMap<String, u64>,
    loaded: LoadedPackages,
    index: TextureIndex,
}

impl Snapshot {
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Package names found in the root, sorted.
    pub fn packages(&self) -> &[String] {
        &self.catalog
    }

    pub fn loaded(&self) -> &LoadedPackages {
        &self.loaded
    }

    pub fn index(&self) -> &TextureIndex {
        &self.index
    }

    pub fn package_size(&self, name: &str) -> Option<u64> {
        self.sizes.get(name).copied()
    }
}

#[derive(Debug)]
struct Shared {
    state: RwLock<Arc<Snapshot>>,
    cache: TextureCache,
    subscribers: Subscribers,
}

/// Catalog of the packages in a root directory plus the ones loaded from it.
///
/// Clones share state. Readers take a [`Snapshot`] and never block writers
/// for longer than an `Arc` clone.
#[derive(Debug, Clone)]
pub struct PackageManager {
    shared: Arc<Shared>,
}

impl Default for PackageManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageManager {
    pub fn new() -> Self {
        Self::with_decoders(Decoders::default())
    }

    /// A manager whose texture cache uses the given block decoders.
    pub fn with_decoders(decoders: Decoders) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: RwLock::new(Arc::new(Snapshot::default())),
                cache: TextureCache::new(decoders),
                subscribers: Subscribers::default(),
            }),
        }
    }

    /// Open a manager on `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let manager = Self::new();
        manager.set_root(root)?;
        Ok(manager)
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.shared.state.read())
    }

    pub fn subscribe(&self) -> Receiver<ManagerEvent> {
        self.shared.subscribers.subscribe()
    }

    pub fn texture_cache(&self) -> &TextureCache {
        &self.shared.cache
    }

    /// Scan `dir` and replace the catalog. Every loaded package is dropped.
    pub fn set_root(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref().to_path_buf();
        let mut names = BTreeSet::new();
        for item in fs::read_dir(&dir)? {
            let path = item?.path();
            let is_package = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext == PACKAGE_EXTENSION || ext == MANIFEST_EXTENSION);
            if !is_package || !path.is_file() {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.insert(stem.to_string());
            }
        }

        let catalog: Vec<String> = names.into_iter().collect();
        let sizes = catalog
            .iter()
            .map(|name| (name.clone(), package_size_on_disk(&dir, name)))
            .collect();
        info!(root = %dir.display(), packages = catalog.len(), "set package root");

        let snapshot = Snapshot {
            root: Some(dir.clone()),
            catalog,
            sizes,
            loaded: LoadedPackages::new(),
            index: TextureIndex::default(),
        };
        *self.shared.state.write() = Arc::new(snapshot);
        self.shared.cache.reset();
        self.shared.subscribers.emit(ManagerEvent::RootChanged(dir));
        Ok(())
    }

    pub fn root(&self) -> Option<PathBuf> {
        self.snapshot().root().map(Path::to_path_buf)
    }

    pub fn packages(&self) -> Vec<String> {
        self.snapshot().packages().to_vec()
    }

    /// Combined size of both files, with a missing file counting as empty.
    pub fn package_size(&self, name: &str) -> Option<u64> {
        self.snapshot().package_size(name)
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.snapshot().loaded().contains(name)
    }

    pub fn loaded_packages(&self) -> LoadedPackages {
        self.snapshot().loaded().clone()
    }

    pub fn load_package(&self, name: &str) -> Result<Arc<Package>> {
        self.load_package_with_progress(name, |_| {})
    }

    /// Load `name` from the root, or return it if already loaded.
    ///
    /// Decoding happens without holding the state lock.
    pub fn load_package_with_progress(
        &self,
        name: &str,
        progress: impl FnMut(f64),
    ) -> Result<Arc<Package>> {
        let snapshot = self.snapshot();
        if let Some(package) = snapshot.loaded().get(name) {
            return Ok(Arc::clone(package));
        }
        let root = snapshot.root().ok_or(Error::NoRoot)?;
        if snapshot.catalog.binary_search_by(|n| n.as_str().cmp(name)).is_err() {
            return Err(Error::UnknownPackage(name.to_string()));
        }

        let mut package = Package::in_dir(root, name);
        package.load_with_progress(progress)?;
        let package = Arc::new(package);

        {
            let mut state = self.shared.state.write();
            if state.root.as_deref() != Some(root) {
                // The root changed while decoding.
                return Err(Error::UnknownPackage(name.to_string()));
            }
            if let Some(existing) = state.loaded.get(name) {
                return Ok(Arc::clone(existing));
            }
            let mut next = Snapshot::clone(&state);
            next.loaded.insert(Arc::clone(&package));
            next.index = TextureIndex::build(&next.loaded)?;
            *state = Arc::new(next);
        }
        debug!(package = %name, "registered package");
        self.shared
            .subscribers
            .emit(ManagerEvent::PackageLoaded(name.to_string()));
        Ok(package)
    }

    /// Drop `name` from the loaded table. Returns whether it was loaded.
    ///
    /// Handles already given out keep the package alive.
    pub fn release_package(&self, name: &str) -> Result<bool> {
        {
            let mut state = self.shared.state.write();
            if !state.loaded.contains(name) {
                return Ok(false);
            }
            let mut next = Snapshot::clone(&state);
            next.loaded.remove(name);
            next.index = TextureIndex::build(&next.loaded)?;
            *state = Arc::new(next);
        }
        self.shared.cache.reset();
        info!(package = %name, "released package");
        self.shared
            .subscribers
            .emit(ManagerEvent::PackageUnloaded(name.to_string()));
        Ok(true)
    }

    /// The first loaded texture registered under `name`.
    pub fn texture_by_name(&self, name: &str) -> Option<TextureHandle> {
        let snapshot = self.snapshot();
        let reference = snapshot.index().texture(name)?;
        let handle = snapshot.loaded().resolve(reference).ok()?;
        TextureHandle::new(handle).ok()
    }

    /// Display name of the package file holding the texture `name`.
    pub fn texture_package_name(&self, name: &str) -> Option<String> {
        let snapshot = self.snapshot();
        snapshot
            .index()
            .texture(name)
            .map(|reference| reference.package().display_name())
    }

    /// Atlases whose texture is a reference to `name`.
    pub fn atlases_by_texture_name(&self, name: &str) -> Vec<EntryHandle> {
        let snapshot = self.snapshot();
        snapshot
            .index()
            .atlases(name)
            .iter()
            .filter_map(|reference| snapshot.loaded().resolve(reference).ok())
            .collect()
    }

    /// Premultiplied BGRA pixels of the texture `name`, through the cache.
    pub fn texture_pixels(&self, name: &str) -> Result<Option<Arc<[u8]>>> {
        match self.texture_by_name(name) {
            Some(handle) => Ok(Some(self.shared.cache.get(&handle)?)),
            None => Ok(None),
        }
    }

    /// Load `names` on a background thread.
    pub fn load_packages_async(&self, names: impl IntoIterator<Item = String>) -> LoadTask {
        let names: Vec<String> = names.into_iter().collect();
        let (sender, receiver) = unbounded();
        let manager = self.clone();
        let worker = thread::spawn(move || {
            load_all(&manager, &names, &mut |progress| {
                sender.send(progress).ok();
            })
        });
        LoadTask::new(receiver, worker)
    }

    /// Load `names` on a background thread, calling `callback` with each
    /// package name and overall fraction.
    pub fn load_packages_with_callback<F>(
        &self,
        names: impl IntoIterator<Item = String>,
        mut callback: F,
    ) -> thread::JoinHandle<LoadSummary>
    where
        F: FnMut(&str, f64) + Send + 'static,
    {
        let names: Vec<String> = names.into_iter().collect();
        let manager = self.clone();
        thread::spawn(move || {
            load_all(&manager, &names, &mut |progress: LoadProgress| {
                callback(&progress.package, progress.fraction)
            })
        })
    }
}

fn package_size_on_disk(dir: &Path, name: &str) -> u64 {
    [FileKind::Manifest, FileKind::Package]
        .into_iter()
        .map(|kind| {
            let path = dir.join(format!("{}.{}", name, kind.extension()));
            fs::metadata(path).map(|meta| meta.len()).unwrap_or(0)
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use cinder_pkg::entries::{
        AtlasEntry, AtlasTexture, IncludePackageEntry, SubAtlas, TextureEntry,
    };
    use cinder_pkg::{Entry, WriteOptions};
    use cinder_texture::{SurfaceFormat, Texture};
    use tempfile::TempDir;

    use super::*;
    use crate::handle::SubAtlasHandle;

    fn texture(name: &str, value: u8) -> Entry {
        Entry::Texture(TextureEntry {
            name: name.to_string(),
            texture: Texture::new(SurfaceFormat::Color, 1, 1, vec![value, value, value, 255]),
        })
    }

    fn atlas(target: &str) -> Entry {
        // Atlases with no sub-atlases encode a negative size and do not read back.
        Entry::Atlas(AtlasEntry {
            version: 3,
            sub_atlases: vec![SubAtlas {
                name: format!("{}_frame", target),
                rect: Default::default(),
                top_left: Default::default(),
                original_size: Default::default(),
                scale: Default::default(),
                is_multi_texture: false,
                is_mip: false,
                hull: Some(Vec::new()),
            }],
            texture: AtlasTexture::Reference(target.to_string()),
        })
    }

    fn pixels_of(manager: &PackageManager, name: &str) -> Vec<u8> {
        manager.texture_pixels(name).unwrap().unwrap().to_vec()
    }

    fn write(dir: &Path, name: &str, manifest: Vec<Entry>, package: Vec<Entry>) {
        Package::from_entries(name, manifest, package)
            .write_package_files_with(dir.join(name), WriteOptions { compress: false })
            .unwrap();
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "Alpha",
            vec![atlas("shared")],
            vec![texture("shared", 10), texture("alpha_only", 20)],
        );
        write(
            dir.path(),
            "Beta",
            vec![Entry::IncludePackage(IncludePackageEntry::new("Alpha")), atlas("shared")],
            vec![texture("shared", 99)],
        );
        fs::write(dir.path().join("Orphan.pkg_manifest"), [0, 0, 0, 5, 0xFF]).unwrap();
        fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();
        dir
    }

    #[test]
    fn test_catalog_and_sizes() {
        let dir = fixture();
        let manager = PackageManager::open(dir.path()).unwrap();
        assert_eq!(manager.packages(), ["Alpha", "Beta", "Orphan"]);
        assert_eq!(manager.package_size("Orphan"), Some(5));

        let alpha = fs::metadata(dir.path().join("Alpha.pkg")).unwrap().len()
            + fs::metadata(dir.path().join("Alpha.pkg_manifest")).unwrap().len();
        assert_eq!(manager.package_size("Alpha"), Some(alpha));
        assert_eq!(manager.package_size("Gamma"), None);
    }

    #[test]
    fn test_first_texture_wins() {
        let dir = fixture();
        let manager = PackageManager::open(dir.path()).unwrap();
        manager.load_package("Beta").unwrap();
        manager.load_package("Alpha").unwrap();

        // Beta was loaded first, so its copy of "shared" is kept.
        let handle = manager.texture_by_name("shared").unwrap();
        assert_eq!(handle.package().name(), "Beta");
        assert_eq!(manager.texture_package_name("shared").as_deref(), Some("Beta.pkg"));
        assert_eq!(pixels_of(&manager, "shared"), [99, 99, 99, 255]);
        assert_eq!(manager.atlases_by_texture_name("shared").len(), 2);
        assert!(manager.atlases_by_texture_name("missing").is_empty());
    }

    #[test]
    fn test_sub_atlas_leads_back_to_atlas() {
        let dir = fixture();
        let manager = PackageManager::open(dir.path()).unwrap();
        manager.load_package("Alpha").unwrap();

        let atlases = manager.atlases_by_texture_name("shared");
        let regions = atlases[0].sub_atlases().unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].sub_atlas().unwrap().name, "shared_frame");
        assert_eq!(regions[0].atlas().reference(), atlases[0].reference());
        assert_eq!(regions[0].atlas().package().name(), "Alpha");

        assert!(matches!(
            SubAtlasHandle::new(atlases[0].clone(), 1),
            Err(Error::SubAtlasOutOfRange { index: 1, len: 1, .. })
        ));
        let texture = manager.texture_by_name("alpha_only").unwrap();
        let entry = EntryHandle::new(Arc::clone(texture.package()), texture.reference().clone())
            .unwrap();
        assert!(matches!(entry.sub_atlases(), Err(Error::NotAnAtlas(_))));
    }

    #[test]
    fn test_load_is_idempotent() {
        let dir = fixture();
        let manager = PackageManager::open(dir.path()).unwrap();
        let first = manager.load_package("Alpha").unwrap();
        let second = manager.load_package("Alpha").unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        assert!(matches!(manager.load_package("Gamma"), Err(Error::UnknownPackage(_))));
        assert!(matches!(PackageManager::new().load_package("Alpha"), Err(Error::NoRoot)));
    }

    #[test]
    fn test_release_rebuilds_index() {
        let dir = fixture();
        let manager = PackageManager::open(dir.path()).unwrap();
        manager.load_package("Alpha").unwrap();
        manager.load_package("Beta").unwrap();

        let pinned = manager.texture_by_name("alpha_only").unwrap();
        manager.texture_pixels("alpha_only").unwrap();
        assert!(!manager.texture_cache().is_empty());

        assert!(manager.release_package("Alpha").unwrap());
        assert!(!manager.release_package("Alpha").unwrap());
        assert!(manager.texture_cache().is_empty());
        assert!(manager.texture_by_name("alpha_only").is_none());
        assert_eq!(manager.texture_by_name("shared").unwrap().package().name(), "Beta");

        // The handle still owns its package.
        assert_eq!(pinned.name().unwrap(), "alpha_only");
    }

    #[test]
    fn test_stale_handle_after_reload() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Art", Vec::new(), vec![texture("dot", 10)]);
        let manager = PackageManager::open(dir.path()).unwrap();
        manager.load_package("Art").unwrap();
        let stale = manager.texture_by_name("dot").unwrap();

        manager.release_package("Art").unwrap();
        write(dir.path(), "Art", Vec::new(), vec![texture("dot", 200)]);
        manager.load_package("Art").unwrap();

        // Same package name and entry index, different package value.
        assert_eq!(&*manager.texture_cache().get(&stale).unwrap(), &[10, 10, 10, 255]);
        assert_eq!(pixels_of(&manager, "dot"), [200, 200, 200, 255]);
        assert_ne!(manager.texture_by_name("dot").unwrap().key(), stale.key());
    }

    #[test]
    fn test_events() {
        let dir = fixture();
        let manager = PackageManager::new();
        let events = manager.subscribe();

        manager.set_root(dir.path()).unwrap();
        manager.load_package("Alpha").unwrap();
        manager.release_package("Alpha").unwrap();

        let received: Vec<_> = events.try_iter().collect();
        assert_eq!(
            received,
            [
                ManagerEvent::RootChanged(dir.path().to_path_buf()),
                ManagerEvent::PackageLoaded("Alpha".to_string()),
                ManagerEvent::PackageUnloaded("Alpha".to_string()),
            ]
        );
    }

    #[test]
    fn test_async_load_progress() {
        let dir = fixture();
        let manager = PackageManager::open(dir.path()).unwrap();
        manager.load_package("Beta").unwrap();

        let task = manager.load_packages_async(
            ["Alpha", "Beta", "Orphan"].map(String::from),
        );
        let progress = task.progress().clone();
        let summary = task.wait().unwrap();
        let messages: Vec<_> = progress.try_iter().collect();

        assert_eq!(summary.loaded, ["Alpha"]);
        assert_eq!(summary.skipped, ["Beta"]);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].0, "Orphan");
        assert!(!manager.is_loaded("Orphan"));

        assert_eq!(messages[0], LoadProgress { package: "Alpha".to_string(), fraction: 0.0 });
        assert!(messages.windows(2).all(|w| w[0].fraction <= w[1].fraction));
        assert_eq!(
            messages.last(),
            Some(&LoadProgress { package: String::new(), fraction: 1.0 })
        );
    }

    #[test]
    fn test_callback_load() {
        let dir = fixture();
        let manager = PackageManager::open(dir.path()).unwrap();
        let (sender, receiver) = unbounded();
        let worker = manager.load_packages_with_callback(
            vec!["Alpha".to_string()],
            move |name, fraction| {
                sender.send((name.to_string(), fraction)).ok();
            },
        );
        let summary = worker.join().unwrap();
        assert!(summary.is_success());
        assert!(manager.is_loaded("Alpha"));
        assert_eq!(receiver.try_iter().last(), Some((String::new(), 1.0)));
    }
}
