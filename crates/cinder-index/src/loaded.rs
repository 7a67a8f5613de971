//! The table of loaded packages.

use std::collections::BTreeMap;
use std::sync::Arc;

use cinder_pkg::{EntryReference, Package};

use crate::handle::EntryHandle;
use crate::{Error, Result};

/// Loaded packages by name, iterated in load order.
#[derive(Debug, Clone, Default)]
pub struct LoadedPackages {
    packages: BTreeMap<String, Arc<Package>>,
    order: Vec<String>,
}

impl LoadedPackages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Package>> {
        self.packages.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Names in load order, oldest first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Packages in load order, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Package>> {
        self.order.iter().filter_map(|name| self.packages.get(name))
    }

    /// Add a package. Replacing a loaded name keeps its original position.
    pub(crate) fn insert(&mut self, package: Arc<Package>) {
        let name = package.name().to_string();
        if self.packages.insert(name.clone(), package).is_none() {
            self.order.push(name);
        }
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<Arc<Package>> {
        let removed = self.packages.remove(name)?;
        self.order.retain(|loaded| loaded != name);
        Some(removed)
    }

    /// Resolve a reference against the loaded packages.
    pub fn resolve(&self, reference: &EntryReference) -> Result<EntryHandle> {
        let package = self
            .get(reference.package_name())
            .ok_or_else(|| Error::PackageNotLoaded(reference.package_name().to_string()))?;
        EntryHandle::new(Arc::clone(package), reference.clone())
    }
}

/// Follow an entry reference to the entry it names.
pub trait Dereference {
    fn dereference(&self, packages: &LoadedPackages) -> Result<EntryHandle>;
}

impl Dereference for EntryReference {
    fn dereference(&self, packages: &LoadedPackages) -> Result<EntryHandle> {
        packages.resolve(self)
    }
}
