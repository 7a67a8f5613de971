//! Static table of content type readers.

use cinder_common::BinaryReader;
use cinder_texture::{SurfaceFormat, Texture, Texture3D};

use crate::{Error, Result};

/// Reader name for 2D textures.
pub const TEXTURE2D_READER: &str = "Microsoft.Xna.Framework.Content.Texture2DReader";
/// Reader name for volume textures.
pub const TEXTURE3D_READER: &str = "Microsoft.Xna.Framework.Content.Texture3DReader";

static TYPE_READERS: &[(&str, TypeReader)] = &[
    (TEXTURE2D_READER, TypeReader::Texture2D),
    (TEXTURE3D_READER, TypeReader::Texture3D),
];

/// Kind of a decoded asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Texture2D,
    Texture3D,
}

/// A decoded asset.
#[derive(Debug, Clone)]
pub enum Asset {
    Texture2D(Texture),
    Texture3D(Texture3D),
}

impl Asset {
    pub fn kind(&self) -> AssetKind {
        match self {
            Self::Texture2D(_) => AssetKind::Texture2D,
            Self::Texture3D(_) => AssetKind::Texture3D,
        }
    }
}

/// A resolved type reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeReader {
    Texture2D,
    Texture3D,
}

impl TypeReader {
    /// Resolve a reader by name. Assembly qualification after a `,` is ignored.
    pub fn resolve(name: &str) -> Result<Self> {
        let type_name = name.split(',').next().unwrap_or(name).trim();
        TYPE_READERS
            .iter()
            .find(|(reader_name, _)| *reader_name == type_name)
            .map(|&(_, reader)| reader)
            .ok_or_else(|| Error::UnsupportedTypeReader(name.to_string()))
    }

    /// The reader for a given asset kind.
    pub fn for_kind(kind: AssetKind) -> Self {
        match kind {
            AssetKind::Texture2D => Self::Texture2D,
            AssetKind::Texture3D => Self::Texture3D,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Texture2D => TEXTURE2D_READER,
            Self::Texture3D => TEXTURE3D_READER,
        }
    }

    pub fn kind(self) -> AssetKind {
        match self {
            Self::Texture2D => AssetKind::Texture2D,
            Self::Texture3D => AssetKind::Texture3D,
        }
    }

    /// Read one object body.
    pub fn read(self, reader: &mut BinaryReader<'_>) -> Result<Asset> {
        match self {
            Self::Texture2D => read_texture2d(reader).map(Asset::Texture2D),
            Self::Texture3D => read_texture3d(reader).map(Asset::Texture3D),
        }
    }
}

fn read_field(reader: &mut BinaryReader<'_>, field: &'static str) -> Result<usize> {
    let value = reader.read_i32_le()?;
    usize::try_from(value).map_err(|_| Error::NegativeField { field, value })
}

fn read_texture2d(reader: &mut BinaryReader<'_>) -> Result<Texture> {
    let format = SurfaceFormat::from_code(reader.read_i32_le()?);
    let width = read_field(reader, "width")?;
    let height = read_field(reader, "height")?;
    let level_count = reader.read_i32_le()?;
    if level_count != 1 {
        return Err(Error::UnsupportedMipLevels(level_count));
    }
    let size = read_field(reader, "data size")?;
    let data = reader.read_bytes(size)?;
    Ok(Texture::new(format, width, height, data))
}

fn read_texture3d(reader: &mut BinaryReader<'_>) -> Result<Texture3D> {
    let format = SurfaceFormat::from_code(reader.read_i32_le()?);
    let width = read_field(reader, "width")?;
    let height = read_field(reader, "height")?;
    let depth = read_field(reader, "depth")?;
    let size = read_field(reader, "data size")?;
    let data = reader.read_bytes(size)?.to_vec();
    Ok(Texture3D {
        format,
        width,
        height,
        depth,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn le(values: &[i32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn test_resolve_strips_assembly() {
        let qualified = "Microsoft.Xna.Framework.Content.Texture3DReader, Microsoft.Xna.Framework.Graphics, Version=4.0.0.0";
        assert_eq!(TypeReader::resolve(qualified).unwrap(), TypeReader::Texture3D);
        assert_eq!(TypeReader::resolve(TEXTURE2D_READER).unwrap(), TypeReader::Texture2D);
    }

    #[test]
    fn test_resolve_unknown() {
        let err = TypeReader::resolve("Microsoft.Xna.Framework.Content.StringReader").unwrap_err();
        assert!(matches!(err, Error::UnsupportedTypeReader(name) if name.ends_with("StringReader")));
    }

    #[test]
    fn test_read_texture2d_body() {
        let mut data = le(&[0, 1, 1, 1, 4]);
        data.extend_from_slice(&[1, 2, 3, 4]);

        let asset = TypeReader::Texture2D.read(&mut BinaryReader::new(&data)).unwrap();
        let Asset::Texture2D(texture) = asset else {
            panic!("expected a 2D texture");
        };
        assert_eq!(texture.format(), SurfaceFormat::Color);
        assert_eq!(texture.dimensions(), (1, 1));
        assert_eq!(&*texture.encoded_data().unwrap(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_mip_levels_rejected() {
        let data = le(&[0, 4, 4, 3, 0]);
        let err = TypeReader::Texture2D.read(&mut BinaryReader::new(&data)).unwrap_err();
        assert!(matches!(err, Error::UnsupportedMipLevels(3)));
    }

    #[test]
    fn test_read_texture3d_body() {
        let mut data = le(&[12, 2, 1, 2, 4]);
        data.extend_from_slice(&[9, 8, 7, 6]);

        let asset = TypeReader::Texture3D.read(&mut BinaryReader::new(&data)).unwrap();
        let Asset::Texture3D(volume) = asset else {
            panic!("expected a volume texture");
        };
        assert_eq!(volume.format, SurfaceFormat::Alpha8);
        assert_eq!((volume.width, volume.height, volume.depth), (2, 1, 2));
        assert_eq!(volume.data, [9, 8, 7, 6]);
    }
}
