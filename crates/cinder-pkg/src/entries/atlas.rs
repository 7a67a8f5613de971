use cinder_common::{BinaryReader, BinaryWriter};

use super::{length_field, TextureEntry};
use crate::{Error, Result};

/// Sub-atlas count value announcing an explicit version code.
pub const ATLAS_VERSION_MAGIC: i32 = 2142336875;
/// Version code written by [`AtlasEntry::write_to`].
pub const ATLAS_VERSION: i32 = 3;

const MULTI_TEXTURE_FLAG: u8 = 0x1;
const MIP_FLAG: u8 = 0x2;
const REFERENCE_CODE: u8 = 0xDD;
const INLINE_TEXTURE_CODE: u8 = 0x00;

/// Amount the written size field falls short of the body length. Game files
/// carry this same value and the engine does not rely on it.
const SIZE_FIELD_SHORTFALL: usize = 35;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntVector2 {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// A named region of an atlas texture.
#[derive(Debug, Clone, PartialEq)]
pub struct SubAtlas {
    pub name: String,
    pub rect: Rect,
    pub top_left: IntVector2,
    pub original_size: IntVector2,
    pub scale: Vector2,
    pub is_multi_texture: bool,
    pub is_mip: bool,
    /// Convex hull, present from version 3.
    pub hull: Option<Vec<IntVector2>>,
}

/// Where an atlas keeps its pixels.
#[derive(Debug, Clone)]
pub enum AtlasTexture {
    /// Name of a texture entry stored elsewhere.
    Reference(String),
    /// A texture embedded in the atlas record.
    Inline(Box<TextureEntry>),
}

#[derive(Debug, Clone)]
pub struct AtlasEntry {
    /// Version code the entry was read with.
    pub version: i32,
    pub sub_atlases: Vec<SubAtlas>,
    pub texture: AtlasTexture,
}

impl AtlasEntry {
    /// Read an atlas body. Manifest atlases are always references, whatever
    /// their discriminator byte says.
    pub fn read(reader: &mut BinaryReader<'_>, in_manifest: bool) -> Result<Self> {
        let size = reader.read_i32()?;
        if size < 0 {
            return Err(Error::NegativeSize {
                entry: "atlas".to_string(),
                size,
            });
        }

        let mut version = 0;
        let mut count = reader.read_i32()?;
        if count == ATLAS_VERSION_MAGIC {
            version = reader.read_i32()?;
            count = reader.read_i32()?;
        }

        let mut sub_atlases = Vec::with_capacity(count.clamp(0, 1024) as usize);
        for _ in 0..count.max(0) {
            sub_atlases.push(read_sub_atlas(reader, version)?);
        }

        let discriminator = reader.read_u8()?;
        let texture = if discriminator == REFERENCE_CODE || in_manifest {
            AtlasTexture::Reference(reader.read_string()?)
        } else {
            AtlasTexture::Inline(Box::new(TextureEntry::read(reader)?))
        };

        Ok(Self {
            version,
            sub_atlases,
            texture,
        })
    }

    /// Write the atlas with the versioned wrapper and the newest layout.
    pub fn write_to(&self, writer: &mut BinaryWriter) -> Result<()> {
        let mut body = BinaryWriter::new();
        body.write_i32(ATLAS_VERSION_MAGIC);
        body.write_i32(ATLAS_VERSION);
        body.write_i32(length_field(self.sub_atlases.len())?);
        for sub in &self.sub_atlases {
            write_sub_atlas(&mut body, sub)?;
        }

        match &self.texture {
            AtlasTexture::Reference(name) => {
                body.write_u8(REFERENCE_CODE);
                body.write_string(name)?;
            }
            AtlasTexture::Inline(texture) => {
                body.write_u8(INLINE_TEXTURE_CODE);
                texture.write_to(&mut body)?;
            }
        }

        let size = length_field(body.len())? - SIZE_FIELD_SHORTFALL as i32;
        writer.write_i32(size);
        writer.write_bytes(body.as_bytes());
        Ok(())
    }

    pub fn is_reference(&self) -> bool {
        matches!(self.texture, AtlasTexture::Reference(_))
    }

    /// Name of the referenced texture, for reference atlases.
    pub fn referenced_texture_name(&self) -> Option<&str> {
        match &self.texture {
            AtlasTexture::Reference(name) => Some(name),
            AtlasTexture::Inline(_) => None,
        }
    }

    /// The embedded texture, for inline atlases.
    pub fn included_texture(&self) -> Option<&TextureEntry> {
        match &self.texture {
            AtlasTexture::Inline(texture) => Some(texture),
            AtlasTexture::Reference(_) => None,
        }
    }

    /// `<ref NAME>` or `<included NAME>`.
    pub fn display_name(&self) -> String {
        match &self.texture {
            AtlasTexture::Reference(name) => format!("<ref {}>", name),
            AtlasTexture::Inline(texture) => format!("<included {}>", texture.name),
        }
    }
}

fn read_point(reader: &mut BinaryReader<'_>) -> Result<IntVector2> {
    Ok(IntVector2 {
        x: reader.read_i32()?,
        y: reader.read_i32()?,
    })
}

fn read_sub_atlas(reader: &mut BinaryReader<'_>, version: i32) -> Result<SubAtlas> {
    let name = reader.read_string()?;
    let rect = Rect {
        x: reader.read_i32()?,
        y: reader.read_i32()?,
        width: reader.read_i32()?,
        height: reader.read_i32()?,
    };
    let top_left = read_point(reader)?;
    let original_size = read_point(reader)?;
    let scale = Vector2 {
        x: reader.read_f32()?,
        y: reader.read_f32()?,
    };

    let (mut is_multi_texture, mut is_mip) = (false, false);
    if version > 0 {
        let flags = reader.read_u8()?;
        if version > 1 {
            is_multi_texture = flags & MULTI_TEXTURE_FLAG != 0;
            is_mip = flags & MIP_FLAG != 0;
        } else {
            is_multi_texture = flags != 0;
        }
    }

    let hull = if version > 2 {
        let hull_count = reader.read_i32()?;
        let mut points = Vec::with_capacity(hull_count.clamp(0, 256) as usize);
        for _ in 0..hull_count.max(0) {
            points.push(read_point(reader)?);
        }
        Some(points)
    } else {
        None
    };

    Ok(SubAtlas {
        name,
        rect,
        top_left,
        original_size,
        scale,
        is_multi_texture,
        is_mip,
        hull,
    })
}

fn write_sub_atlas(writer: &mut BinaryWriter, sub: &SubAtlas) -> Result<()> {
    writer.write_string(&sub.name)?;
    for value in [sub.rect.x, sub.rect.y, sub.rect.width, sub.rect.height] {
        writer.write_i32(value);
    }
    for point in [sub.top_left, sub.original_size] {
        writer.write_i32(point.x);
        writer.write_i32(point.y);
    }
    writer.write_f32(sub.scale.x);
    writer.write_f32(sub.scale.y);

    let mut flags = 0;
    if sub.is_multi_texture {
        flags |= MULTI_TEXTURE_FLAG;
    }
    if sub.is_mip {
        flags |= MIP_FLAG;
    }
    writer.write_u8(flags);

    let hull = sub.hull.as_deref().unwrap_or_default();
    writer.write_i32(length_field(hull.len())?);
    for point in hull {
        writer.write_i32(point.x);
        writer.write_i32(point.y);
    }
    Ok(())
}
