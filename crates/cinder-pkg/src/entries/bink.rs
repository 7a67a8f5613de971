use cinder_common::{string_size, BinaryReader, BinaryWriter};

use super::length_field;
use crate::{Error, Result};

/// Layout version of bink atlas records.
pub const BINK_ATLAS_VERSION: i32 = 1;

/// A reference to a Bink video file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinkEntry {
    pub is_alpha: bool,
    pub file_name: String,
}

impl BinkEntry {
    pub fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let is_alpha = reader.read_u8()? == 1;
        let file_name = reader.read_string()?;
        Ok(Self {
            is_alpha,
            file_name,
        })
    }

    pub fn write_to(&self, writer: &mut BinaryWriter) -> Result<()> {
        writer.write_u8(u8::from(self.is_alpha));
        writer.write_string(&self.file_name)?;
        Ok(())
    }
}

/// Frame dimensions of a Bink video used as an atlas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinkAtlasEntry {
    pub name: String,
    pub width: i32,
    pub height: i32,
}

impl BinkAtlasEntry {
    pub fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let size = reader.read_i32()?;
        if size < 0 {
            return Err(Error::NegativeSize {
                entry: "bink atlas".to_string(),
                size,
            });
        }
        let version = reader.read_i32()?;
        if version != BINK_ATLAS_VERSION {
            return Err(Error::UnsupportedEntryVersion {
                entry: "bink atlas",
                version,
                expected: BINK_ATLAS_VERSION,
            });
        }

        Ok(Self {
            name: reader.read_string()?,
            width: reader.read_i32()?,
            height: reader.read_i32()?,
        })
    }

    /// The size field covers everything after itself.
    pub fn write_to(&self, writer: &mut BinaryWriter) -> Result<()> {
        let size = 4 + string_size(&self.name)? + 8;
        writer.write_i32(length_field(size)?);
        writer.write_i32(BINK_ATLAS_VERSION);
        writer.write_string(&self.name)?;
        writer.write_i32(self.width);
        writer.write_i32(self.height);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bink_alpha_flag() {
        let data = [2, 3, b'a', b'b', b'c'];
        let entry = BinkEntry::read(&mut BinaryReader::new(&data)).unwrap();
        // Only exactly 1 means alpha.
        assert!(!entry.is_alpha);
        assert_eq!(entry.file_name, "abc");
    }

    #[test]
    fn test_bink_atlas_roundtrip() {
        let entry = BinkAtlasEntry {
            name: "intro".to_string(),
            width: 1280,
            height: 720,
        };
        let mut writer = BinaryWriter::new();
        entry.write_to(&mut writer).unwrap();
        let bytes = writer.into_inner();

        assert_eq!(&bytes[..4], &(bytes.len() as i32 - 4).to_be_bytes());
        assert_eq!(BinkAtlasEntry::read(&mut BinaryReader::new(&bytes)).unwrap(), entry);
    }

    #[test]
    fn test_bink_atlas_version_checked() {
        let mut writer = BinaryWriter::new();
        writer.write_i32(10);
        writer.write_i32(2);
        let err = BinkAtlasEntry::read(&mut BinaryReader::new(writer.as_bytes())).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedEntryVersion {
                version: 2,
                expected: 1,
                ..
            }
        ));

        let data = (-7i32).to_be_bytes();
        let err = BinkAtlasEntry::read(&mut BinaryReader::new(&data)).unwrap_err();
        assert!(matches!(err, Error::NegativeSize { size: -7, .. }));
    }
}
