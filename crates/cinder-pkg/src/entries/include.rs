use cinder_common::{BinaryReader, BinaryWriter};

use crate::Result;

/// Pulls another package in when this one is loaded by the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludePackageEntry {
    pub name: String,
}

impl IncludePackageEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self::new(reader.read_string()?))
    }

    pub fn write_to(&self, writer: &mut BinaryWriter) -> Result<()> {
        writer.write_string(&self.name)?;
        Ok(())
    }
}
