//! Package and entry references.

use std::fmt;

use crate::{Error, Result};

/// Extension of the index file.
pub const MANIFEST_EXTENSION: &str = "pkg_manifest";
/// Extension of the data file.
pub const PACKAGE_EXTENSION: &str = "pkg";

/// One of the two files that make up a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FileKind {
    Manifest,
    Package,
}

impl FileKind {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Manifest => MANIFEST_EXTENSION,
            Self::Package => PACKAGE_EXTENSION,
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manifest => f.write_str("manifest"),
            Self::Package => f.write_str("package"),
        }
    }
}

/// Which files of a package a reference covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Files {
    Manifest,
    Package,
    Both,
}

impl From<FileKind> for Files {
    fn from(kind: FileKind) -> Self {
        match kind {
            FileKind::Manifest => Self::Manifest,
            FileKind::Package => Self::Package,
        }
    }
}

/// A package name plus the files it refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageReference {
    pub name: String,
    pub files: Files,
}

impl PackageReference {
    pub fn new(name: impl Into<String>, files: Files) -> Self {
        Self {
            name: name.into(),
            files,
        }
    }

    /// The single file this reference names, or `None` for [`Files::Both`].
    pub fn file_kind(&self) -> Option<FileKind> {
        match self.files {
            Files::Manifest => Some(FileKind::Manifest),
            Files::Package => Some(FileKind::Package),
            Files::Both => None,
        }
    }

    /// `name`, `name.pkg_manifest` or `name.pkg`.
    pub fn display_name(&self) -> String {
        match self.file_kind() {
            Some(kind) => format!("{}.{}", self.name, kind.extension()),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for PackageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// Position of an entry inside one file of one package.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryReference {
    index: usize,
    package: PackageReference,
    kind: FileKind,
}

impl EntryReference {
    /// Create a reference. `package` must name a single file.
    pub fn new(index: usize, package: PackageReference) -> Result<Self> {
        let kind = package
            .file_kind()
            .ok_or_else(|| Error::AmbiguousReference(package.name.clone()))?;
        Ok(Self {
            index,
            package,
            kind,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn package(&self) -> &PackageReference {
        &self.package
    }

    pub fn package_name(&self) -> &str {
        &self.package.name
    }

    pub fn file_kind(&self) -> FileKind {
        self.kind
    }
}

impl fmt::Display for EntryReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.package, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names() {
        assert_eq!(PackageReference::new("Base", Files::Both).display_name(), "Base");
        assert_eq!(
            PackageReference::new("Base", Files::Manifest).display_name(),
            "Base.pkg_manifest"
        );
        assert_eq!(PackageReference::new("Base", Files::Package).to_string(), "Base.pkg");
    }

    #[test]
    fn test_both_is_not_an_entry_container() {
        let err = EntryReference::new(0, PackageReference::new("Base", Files::Both)).unwrap_err();
        assert!(matches!(err, Error::AmbiguousReference(name) if name == "Base"));

        let reference =
            EntryReference::new(3, PackageReference::new("Base", Files::Package)).unwrap();
        assert_eq!(reference.file_kind(), FileKind::Package);
        assert_eq!(reference.to_string(), "Base.pkg#3");
    }
}
