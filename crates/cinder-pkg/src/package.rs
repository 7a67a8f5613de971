//! A package: a manifest file and a data file sharing one name.

use std::ffi::OsString;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use memmap2::Mmap;
use tracing::info;

use crate::container::{create_container, read_chunks, WriteOptions, CHUNK_SIZE};
use crate::entries::Entry;
use crate::reference::{EntryReference, Files, PackageReference};
use crate::{Error, FileKind, Result};

#[derive(Debug, Clone, Default)]
struct Contents {
    manifest: Vec<Entry>,
    package: Vec<Entry>,
}

/// A package and, once loaded, the entries of both its files.
///
/// Entry lists are only readable after [`Package::load`] succeeds. A failed
/// load leaves the package unloaded.
#[derive(Debug)]
pub struct Package {
    id: u64,
    name: String,
    manifest_path: PathBuf,
    package_path: PathBuf,
    contents: Option<Contents>,
}

fn next_id() -> u64 {
    static NEXT: AtomicU64 = AtomicU64::new(1);
    NEXT.fetch_add(1, Ordering::Relaxed)
}

impl Clone for Package {
    fn clone(&self) -> Self {
        Self {
            id: next_id(),
            name: self.name.clone(),
            manifest_path: self.manifest_path.clone(),
            package_path: self.package_path.clone(),
            contents: self.contents.clone(),
        }
    }
}

impl Package {
    /// Describe a package without reading it.
    pub fn new(
        name: impl Into<String>,
        manifest_path: impl Into<PathBuf>,
        package_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            id: next_id(),
            name: name.into(),
            manifest_path: manifest_path.into(),
            package_path: package_path.into(),
            contents: None,
        }
    }

    /// Describe the package `name` inside `root`.
    pub fn in_dir(root: impl AsRef<Path>, name: &str) -> Self {
        let root = root.as_ref();
        Self::new(
            name,
            root.join(format!("{}.{}", name, FileKind::Manifest.extension())),
            root.join(format!("{}.{}", name, FileKind::Package.extension())),
        )
    }

    /// Describe and load the package `name` inside `root`.
    pub fn open(root: impl AsRef<Path>, name: &str) -> Result<Self> {
        let mut package = Self::in_dir(root, name);
        package.load()?;
        Ok(package)
    }

    /// An already loaded package built from entry lists.
    pub fn from_entries(name: impl Into<String>, manifest: Vec<Entry>, package: Vec<Entry>) -> Self {
        let name = name.into();
        let mut built = Self::in_dir(".", &name);
        built.contents = Some(Contents { manifest, package });
        built
    }

    /// Identity of this package value, unique within the process. Clones and
    /// reloads get a new one, so two packages with the same name and
    /// different contents never share it.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    pub fn package_path(&self) -> &Path {
        &self.package_path
    }

    pub fn path(&self, kind: FileKind) -> &Path {
        match kind {
            FileKind::Manifest => &self.manifest_path,
            FileKind::Package => &self.package_path,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.contents.is_some()
    }

    /// Read both files.
    pub fn load(&mut self) -> Result<()> {
        self.load_with_progress(|_| {})
    }

    /// Read both files, reporting the fraction of input bytes consumed after
    /// every chunk.
    pub fn load_with_progress(&mut self, mut progress: impl FnMut(f64)) -> Result<()> {
        let manifest_map = map_file(&self.manifest_path)?;
        let package_map = map_file(&self.package_path)?;
        let manifest_len = manifest_map.len();
        let total = (manifest_len + package_map.len()).max(1) as f64;

        let manifest_label = self.manifest_path.display().to_string();
        let manifest = read_chunks(
            &manifest_map,
            FileKind::Manifest,
            &manifest_label,
            CHUNK_SIZE,
            &mut |consumed| progress(consumed as f64 / total),
        )?;

        let package_label = self.package_path.display().to_string();
        let package = read_chunks(
            &package_map,
            FileKind::Package,
            &package_label,
            CHUNK_SIZE,
            &mut |consumed| progress((manifest_len + consumed) as f64 / total),
        )?;

        info!(
            package = %self.name,
            manifest_entries = manifest.len(),
            package_entries = package.len(),
            "loaded package"
        );
        self.contents = Some(Contents { manifest, package });
        self.id = next_id();
        Ok(())
    }

    fn loaded(&self) -> Result<&Contents> {
        self.contents
            .as_ref()
            .ok_or_else(|| Error::NotLoaded(self.name.clone()))
    }

    /// Entries of the manifest file.
    pub fn manifest_contents(&self) -> Result<&[Entry]> {
        Ok(&self.loaded()?.manifest)
    }

    /// Entries of the package file.
    pub fn package_contents(&self) -> Result<&[Entry]> {
        Ok(&self.loaded()?.package)
    }

    pub fn contents(&self, kind: FileKind) -> Result<&[Entry]> {
        match kind {
            FileKind::Manifest => self.manifest_contents(),
            FileKind::Package => self.package_contents(),
        }
    }

    /// Mutable entry list, for replacing or editing entries before a rewrite.
    pub fn entries_mut(&mut self, kind: FileKind) -> Result<&mut Vec<Entry>> {
        let name = self.name.clone();
        let contents = self.contents.as_mut().ok_or(Error::NotLoaded(name))?;
        Ok(match kind {
            FileKind::Manifest => &mut contents.manifest,
            FileKind::Package => &mut contents.package,
        })
    }

    pub fn manifest_reference(&self) -> PackageReference {
        PackageReference::new(self.name.clone(), Files::Manifest)
    }

    pub fn package_reference(&self) -> PackageReference {
        PackageReference::new(self.name.clone(), Files::Package)
    }

    pub fn reference(&self, kind: FileKind) -> PackageReference {
        PackageReference::new(self.name.clone(), kind.into())
    }

    /// Entries of one file paired with references pointing back at them.
    pub fn references(
        &self,
        kind: FileKind,
    ) -> Result<impl Iterator<Item = (EntryReference, &Entry)> + '_> {
        let entries = self.contents(kind)?;
        let reference = self.reference(kind);
        Ok(entries.iter().enumerate().filter_map(move |(index, entry)| {
            EntryReference::new(index, reference.clone())
                .ok()
                .map(|r| (r, entry))
        }))
    }

    /// Look up the entry a reference points at.
    pub fn entry(&self, reference: &EntryReference) -> Result<&Entry> {
        if reference.package_name() != self.name {
            return Err(Error::PackageMismatch {
                expected: reference.package_name().to_string(),
                actual: self.name.clone(),
            });
        }
        let entries = self.contents(reference.file_kind())?;
        entries
            .get(reference.index())
            .ok_or_else(|| Error::EntryIndexOutOfRange {
                index: reference.index(),
                len: entries.len(),
                file: reference.package().display_name(),
            })
    }

    /// Encode the data file, compressed.
    pub fn create_package_file(&self) -> Result<Vec<u8>> {
        self.create_package_file_with(WriteOptions::default())
    }

    pub fn create_package_file_with(&self, options: WriteOptions) -> Result<Vec<u8>> {
        create_container(self.package_contents()?, options)
    }

    /// Encode the manifest file. Manifests are never compressed.
    pub fn create_manifest_file(&self) -> Result<Vec<u8>> {
        create_container(self.manifest_contents()?, WriteOptions { compress: false })
    }

    /// Write `<base>.pkg` and `<base>.pkg_manifest`.
    pub fn write_package_files(&self, base: impl AsRef<Path>) -> Result<()> {
        self.write_package_files_with(base, WriteOptions::default())
    }

    pub fn write_package_files_with(
        &self,
        base: impl AsRef<Path>,
        options: WriteOptions,
    ) -> Result<()> {
        let base = base.as_ref();
        let package = self.create_package_file_with(options)?;
        let manifest = self.create_manifest_file()?;
        fs::write(with_extension(base, FileKind::Package), package)?;
        fs::write(with_extension(base, FileKind::Manifest), manifest)?;
        info!(package = %self.name, base = %base.display(), "wrote package files");
        Ok(())
    }
}

/// Append the file extension without replacing any dot already in `base`.
fn with_extension(base: &Path, kind: FileKind) -> PathBuf {
    let mut path = OsString::from(base.as_os_str());
    path.push(".");
    path.push(kind.extension());
    PathBuf::from(path)
}

fn map_file(path: &Path) -> Result<Mmap> {
    let file = File::open(path)?;
    let mmap = unsafe { Mmap::map(&file)? };
    Ok(mmap)
}
