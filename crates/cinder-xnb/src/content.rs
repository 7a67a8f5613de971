//! Object graph reading for decompressed XNB payloads.

use cinder_common::BinaryReader;
use tracing::debug;

use crate::readers::{Asset, AssetKind, TypeReader};
use crate::{Error, Result};

/// Reader over a decompressed payload, starting at the type reader table.
pub struct ContentReader<'a> {
    reader: BinaryReader<'a>,
    type_readers: Vec<TypeReader>,
    shared_resource_count: usize,
}

impl<'a> ContentReader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self {
            reader: BinaryReader::new(payload),
            type_readers: Vec::new(),
            shared_resource_count: 0,
        }
    }

    /// Read a legacy (version 5) payload.
    ///
    /// The reader table and the two leading integers are skipped and the
    /// asset body is read directly with the reader for `kind`.
    pub fn read_legacy(mut self, kind: AssetKind) -> Result<Asset> {
        let count = self.reader.read_7bit_encoded_int()?;
        for _ in 0..count.max(0) {
            self.reader.read_7bit_string()?;
            self.reader.read_i32_le()?;
        }
        self.reader.read_7bit_encoded_int()?;
        self.reader.read_7bit_encoded_int()?;

        TypeReader::for_kind(kind).read(&mut self.reader)
    }

    /// Read a version 6 payload: reader table, root object, shared resources.
    pub fn read_graph(mut self, requested: Option<AssetKind>) -> Result<Asset> {
        self.read_type_readers()?;
        let shared = self.reader.read_7bit_encoded_int()?;
        self.shared_resource_count =
            usize::try_from(shared).map_err(|_| Error::InvalidLength(shared as i64))?;

        let root = self.read_object()?.ok_or(Error::NullAsset)?;
        if let Some(expected) = requested {
            if root.kind() != expected {
                return Err(Error::UnexpectedAsset {
                    expected,
                    actual: root.kind(),
                });
            }
        }

        self.read_shared_resources()?;
        Ok(root)
    }

    fn read_type_readers(&mut self) -> Result<()> {
        let count = self.reader.read_7bit_encoded_int()?;
        self.type_readers = Vec::with_capacity(count.clamp(0, 16) as usize);
        for _ in 0..count.max(0) {
            let name = self.reader.read_7bit_string()?;
            let reader = TypeReader::resolve(&name)?;
            let _version = self.reader.read_i32_le()?;
            self.type_readers.push(reader);
        }
        Ok(())
    }

    /// Read a 7-bit reader index followed by that reader's body; index 0 is null.
    fn read_object(&mut self) -> Result<Option<Asset>> {
        let index = self.reader.read_7bit_encoded_int()?;
        if index == 0 {
            return Ok(None);
        }
        let reader = usize::try_from(index - 1)
            .ok()
            .and_then(|i| self.type_readers.get(i).copied())
            .ok_or(Error::InvalidTypeReaderIndex {
                index,
                count: self.type_readers.len(),
            })?;
        reader.read(&mut self.reader).map(Some)
    }

    /// Texture readers never register fixups, so shared resources are read
    /// for validation and then dropped.
    fn read_shared_resources(&mut self) -> Result<()> {
        for _ in 0..self.shared_resource_count {
            self.read_object()?;
        }
        if self.shared_resource_count > 0 {
            debug!(count = self.shared_resource_count, "skipped shared resources");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use cinder_common::BinaryWriter;

    use super::*;
    use crate::readers::TEXTURE2D_READER;

    fn texture_body(writer: &mut BinaryWriter) {
        for value in [0, 1, 1, 1, 4] {
            writer.write_i32_le(value);
        }
        writer.write_bytes(&[1, 2, 3, 4]);
    }

    fn graph(root_index: i32, shared: i32) -> Vec<u8> {
        let mut writer = BinaryWriter::new();
        writer.write_7bit_encoded_int(1);
        writer.write_7bit_string(TEXTURE2D_READER);
        writer.write_i32_le(0);
        writer.write_7bit_encoded_int(shared);
        writer.write_7bit_encoded_int(root_index);
        if root_index == 1 {
            texture_body(&mut writer);
        }
        for _ in 0..shared {
            writer.write_7bit_encoded_int(1);
            texture_body(&mut writer);
        }
        writer.into_inner()
    }

    #[test]
    fn test_read_graph_root() {
        let data = graph(1, 0);
        let asset = ContentReader::new(&data).read_graph(None).unwrap();
        assert_eq!(asset.kind(), AssetKind::Texture2D);
    }

    #[test]
    fn test_read_graph_with_shared_resources() {
        let data = graph(1, 2);
        let asset = ContentReader::new(&data)
            .read_graph(Some(AssetKind::Texture2D))
            .unwrap();
        assert_eq!(asset.kind(), AssetKind::Texture2D);
    }

    #[test]
    fn test_null_root() {
        let data = graph(0, 0);
        let err = ContentReader::new(&data).read_graph(None).unwrap_err();
        assert!(matches!(err, Error::NullAsset));
    }

    #[test]
    fn test_reader_index_out_of_range() {
        let data = graph(2, 0);
        let err = ContentReader::new(&data).read_graph(None).unwrap_err();
        assert!(matches!(err, Error::InvalidTypeReaderIndex { index: 2, count: 1 }));
    }

    #[test]
    fn test_requested_kind_mismatch() {
        let data = graph(1, 0);
        let err = ContentReader::new(&data)
            .read_graph(Some(AssetKind::Texture3D))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedAsset {
                expected: AssetKind::Texture3D,
                actual: AssetKind::Texture2D
            }
        ));
    }

    #[test]
    fn test_huge_reader_count_fails_on_data() {
        let mut writer = BinaryWriter::new();
        writer.write_7bit_encoded_int(i32::MAX);
        writer.write_7bit_string(TEXTURE2D_READER);
        writer.write_i32_le(0);
        let data = writer.into_inner();

        let err = ContentReader::new(&data).read_graph(None).unwrap_err();
        assert!(matches!(
            err,
            Error::Common(cinder_common::Error::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_read_legacy_skips_table() {
        let mut writer = BinaryWriter::new();
        writer.write_7bit_encoded_int(2);
        writer.write_7bit_string("Some.Unknown.Reader");
        writer.write_i32_le(0);
        writer.write_7bit_string(TEXTURE2D_READER);
        writer.write_i32_le(0);
        writer.write_7bit_encoded_int(0);
        writer.write_7bit_encoded_int(1);
        texture_body(&mut writer);
        let data = writer.into_inner();

        let asset = ContentReader::new(&data)
            .read_legacy(AssetKind::Texture2D)
            .unwrap();
        assert_eq!(asset.kind(), AssetKind::Texture2D);
    }
}
