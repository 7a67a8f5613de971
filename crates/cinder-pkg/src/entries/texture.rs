use cinder_common::{BinaryReader, BinaryWriter};
use cinder_texture::{Texture, Texture3D};
use cinder_xnb::{Asset, AssetKind};

use super::{length_field, Entry};
use crate::{Error, Result};

/// A named 2D texture stored as an embedded XNB.
#[derive(Debug, Clone)]
pub struct TextureEntry {
    pub name: String,
    pub texture: Texture,
}

/// A named volume texture, sharing the texture record layout.
#[derive(Debug, Clone)]
pub struct Texture3DEntry {
    pub name: String,
    pub texture: Texture3D,
}

/// Read the name and the embedded XNB bytes. The cursor always moves past
/// exactly the declared size.
fn read_xnb_bytes<'a>(reader: &mut BinaryReader<'a>) -> Result<(String, &'a [u8])> {
    let name = reader.read_string()?;
    let size = reader.read_i32()?;
    if size < 0 {
        return Err(Error::NegativeSize {
            entry: format!("texture named {:?}", name),
            size,
        });
    }
    if reader.remaining() < size as usize {
        return Err(Error::EntryOutOfBounds { name, size });
    }
    let xnb = reader.read_bytes(size as usize)?;
    Ok((name, xnb))
}

/// Read a texture-tagged record, yielding a volume entry when the XNB root
/// is a 3D texture.
pub(crate) fn read_texture_record(reader: &mut BinaryReader<'_>) -> Result<Entry> {
    let (name, xnb) = read_xnb_bytes(reader)?;
    let entry = match cinder_xnb::read_asset(xnb, None)? {
        Asset::Texture2D(texture) => Entry::Texture(TextureEntry { name, texture }),
        Asset::Texture3D(texture) => Entry::Texture3D(Texture3DEntry { name, texture }),
    };
    Ok(entry)
}

impl TextureEntry {
    /// Read a record whose XNB root must be a 2D texture.
    pub fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let (name, xnb) = read_xnb_bytes(reader)?;
        let texture = match cinder_xnb::read_asset(xnb, Some(AssetKind::Texture2D))? {
            Asset::Texture2D(texture) => texture,
            other => {
                return Err(cinder_xnb::Error::UnexpectedAsset {
                    expected: AssetKind::Texture2D,
                    actual: other.kind(),
                }
                .into())
            }
        };
        Ok(Self { name, texture })
    }

    pub fn write_to(&self, writer: &mut BinaryWriter) -> Result<()> {
        let xnb = cinder_xnb::write_texture(&self.texture)?;
        writer.write_string(&self.name)?;
        writer.write_i32(length_field(xnb.len())?);
        writer.write_bytes(&xnb);
        Ok(())
    }
}

impl Texture3DEntry {
    pub fn write_to(&self, writer: &mut BinaryWriter) -> Result<()> {
        let xnb = cinder_xnb::write_texture3d(&self.texture)?;
        writer.write_string(&self.name)?;
        writer.write_i32(length_field(xnb.len())?);
        writer.write_bytes(&xnb);
        Ok(())
    }
}
