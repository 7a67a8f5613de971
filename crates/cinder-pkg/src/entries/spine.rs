use cinder_common::{BinaryReader, BinaryWriter};

use crate::{Error, Result};

pub const SPINE_VERSION: u8 = 0;

/// A Spine skeleton: its atlas description and skeleton data as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpineEntry {
    pub path: String,
    pub atlas: String,
    pub data: String,
}

impl SpineEntry {
    pub fn new(path: impl Into<String>, atlas: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            atlas: atlas.into(),
            data: data.into(),
        }
    }

    pub fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let version = reader.read_u8()?;
        if version != SPINE_VERSION {
            return Err(Error::UnsupportedEntryVersion {
                entry: "spine",
                version: version as i32,
                expected: SPINE_VERSION as i32,
            });
        }
        Ok(Self {
            path: reader.read_string()?,
            atlas: reader.read_big_string()?,
            data: reader.read_big_string()?,
        })
    }

    pub fn write_to(&self, writer: &mut BinaryWriter) -> Result<()> {
        writer.write_u8(SPINE_VERSION);
        writer.write_string(&self.path)?;
        writer.write_big_string(&self.atlas);
        writer.write_big_string(&self.data);
        Ok(())
    }

    pub fn display_name(&self) -> String {
        format!("Spine (Path={})", self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spine_roundtrip() {
        let entry = SpineEntry::new("spine/hero", "hero.png\nsize: 64,64", "{\"bones\":[]}");
        let mut writer = BinaryWriter::new();
        entry.write_to(&mut writer).unwrap();

        let decoded = SpineEntry::read(&mut BinaryReader::new(writer.as_bytes())).unwrap();
        assert_eq!(decoded, entry);
        assert_eq!(decoded.display_name(), "Spine (Path=spine/hero)");
    }

    #[test]
    fn test_spine_version_must_be_zero() {
        let data = [1, 0];
        let err = SpineEntry::read(&mut BinaryReader::new(&data)).unwrap_err();
        assert!(matches!(err, Error::UnsupportedEntryVersion { version: 1, .. }));
    }
}
