//! Entry records stored in package and manifest chunks.
//!
//! Every record in a chunk starts with a tag byte naming its type. Manifest
//! files only carry atlases, bink atlases and package includes; package files
//! also carry the texture and bink payloads.

mod atlas;
mod bink;
mod include;
mod spine;
mod texture;

use std::fmt;

use cinder_common::{BinaryReader, BinaryWriter};

use crate::{Error, FileKind, Result};

pub use atlas::{AtlasEntry, AtlasTexture, IntVector2, Rect, SubAtlas, Vector2};
pub use bink::{BinkAtlasEntry, BinkEntry};
pub use include::IncludePackageEntry;
pub use spine::SpineEntry;
pub use texture::{Texture3DEntry, TextureEntry};

/// Tag bytes.
pub mod tag {
    pub const ATLAS: u8 = 0xDE;
    pub const BINK_ATLAS: u8 = 0xEE;
    pub const INCLUDE_PACKAGE: u8 = 0xCC;
    pub const BINK: u8 = 0xBB;
    pub const TEXTURE: u8 = 0xAD;
    pub const END_OF_CHUNK: u8 = 0xBE;
    pub const END_OF_FILE: u8 = 0xFF;
}

/// Type of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryType {
    Texture,
    Texture3D,
    Atlas,
    BinkAtlas,
    Bink,
    IncludePackage,
    Spine,
}

impl EntryType {
    /// Tag byte written before the entry, `None` for types with no tag.
    ///
    /// Volume textures share the texture tag; the embedded XNB tells them apart.
    pub fn tag(self) -> Option<u8> {
        match self {
            Self::Texture | Self::Texture3D => Some(tag::TEXTURE),
            Self::Atlas => Some(tag::ATLAS),
            Self::BinkAtlas => Some(tag::BINK_ATLAS),
            Self::Bink => Some(tag::BINK),
            Self::IncludePackage => Some(tag::INCLUDE_PACKAGE),
            Self::Spine => None,
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Texture => "Texture",
            Self::Texture3D => "Texture3D",
            Self::Atlas => "Atlas",
            Self::BinkAtlas => "BinkAtlas",
            Self::Bink => "Bink",
            Self::IncludePackage => "IncludePackage",
            Self::Spine => "Spine",
        };
        f.write_str(name)
    }
}

/// A decoded entry.
#[derive(Debug, Clone)]
pub enum Entry {
    Texture(TextureEntry),
    Texture3D(Texture3DEntry),
    Atlas(AtlasEntry),
    BinkAtlas(BinkAtlasEntry),
    Bink(BinkEntry),
    IncludePackage(IncludePackageEntry),
    Spine(SpineEntry),
}

impl Entry {
    pub fn entry_type(&self) -> EntryType {
        match self {
            Self::Texture(_) => EntryType::Texture,
            Self::Texture3D(_) => EntryType::Texture3D,
            Self::Atlas(_) => EntryType::Atlas,
            Self::BinkAtlas(_) => EntryType::BinkAtlas,
            Self::Bink(_) => EntryType::Bink,
            Self::IncludePackage(_) => EntryType::IncludePackage,
            Self::Spine(_) => EntryType::Spine,
        }
    }

    /// Human readable name shown in listings.
    pub fn display_name(&self) -> String {
        match self {
            Self::Texture(e) => e.name.clone(),
            Self::Texture3D(e) => e.name.clone(),
            Self::Atlas(e) => e.display_name(),
            Self::BinkAtlas(e) => e.name.clone(),
            Self::Bink(e) => e.file_name.clone(),
            Self::IncludePackage(e) => e.name.clone(),
            Self::Spine(e) => e.display_name(),
        }
    }

    /// Write the entry body, without its tag.
    pub fn write_to(&self, writer: &mut BinaryWriter) -> Result<()> {
        match self {
            Self::Texture(e) => e.write_to(writer),
            Self::Texture3D(e) => e.write_to(writer),
            Self::Atlas(e) => e.write_to(writer),
            Self::BinkAtlas(e) => e.write_to(writer),
            Self::Bink(e) => e.write_to(writer),
            Self::IncludePackage(e) => e.write_to(writer),
            Self::Spine(e) => e.write_to(writer),
        }
    }

    /// Tag byte followed by the body, as stored in a chunk.
    pub fn to_blob(&self) -> Result<Vec<u8>> {
        let entry_type = self.entry_type();
        let tag = entry_type.tag().ok_or_else(|| {
            Error::Unsupported(format!(
                "{} entries cannot be stored in a package ({})",
                entry_type,
                self.display_name()
            ))
        })?;
        let mut writer = BinaryWriter::new();
        writer.write_u8(tag);
        self.write_to(&mut writer)?;
        Ok(writer.into_inner())
    }

    pub fn as_texture(&self) -> Option<&TextureEntry> {
        match self {
            Self::Texture(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_atlas(&self) -> Option<&AtlasEntry> {
        match self {
            Self::Atlas(e) => Some(e),
            _ => None,
        }
    }
}

/// One step of reading a chunk.
#[derive(Debug)]
pub(crate) enum Record {
    Entry(Entry),
    EndOfChunk,
    EndOfFile,
}

/// Read the next tagged record. Running out of chunk data counts as end of file.
pub(crate) fn read_record(reader: &mut BinaryReader<'_>, kind: FileKind) -> Result<Record> {
    let Some(code) = reader.next_byte() else {
        return Ok(Record::EndOfFile);
    };
    let entry = match (code, kind) {
        (tag::END_OF_CHUNK, _) => return Ok(Record::EndOfChunk),
        (tag::END_OF_FILE, _) => return Ok(Record::EndOfFile),
        (tag::ATLAS, _) => Entry::Atlas(AtlasEntry::read(reader, kind == FileKind::Manifest)?),
        (tag::BINK_ATLAS, _) => Entry::BinkAtlas(BinkAtlasEntry::read(reader)?),
        (tag::INCLUDE_PACKAGE, _) => Entry::IncludePackage(IncludePackageEntry::read(reader)?),
        (tag::BINK, FileKind::Package) => Entry::Bink(BinkEntry::read(reader)?),
        (tag::TEXTURE, FileKind::Package) => texture::read_texture_record(reader)?,
        (code, kind) => return Err(Error::UnknownEntryType { tag: code, kind }),
    };
    Ok(Record::Entry(entry))
}

/// Convert a serialized length to the 32-bit field that stores it.
pub(crate) fn length_field(len: usize) -> Result<i32> {
    i32::try_from(len).map_err(|_| Error::EntryTooLarge {
        size: len,
        capacity: i32::MAX as usize,
    })
}
