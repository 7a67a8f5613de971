//! XNB header.

use cinder_common::BinaryReader;
use zerocopy::{FromBytes, Immutable, KnownLayout};

use crate::{Error, Result};

/// The three magic bytes opening every container.
pub const MAGIC: [u8; 3] = *b"XNB";

/// Accepted target platform identifiers.
///
/// `w` Windows, `x` Xbox 360, `m` Windows Phone, `i` iOS, `a` Android,
/// `d` DesktopGL, `X` macOS, `W` Windows Store, `n` Native Client, `u` Ouya,
/// `p` PlayStation Mobile, `M` Windows Phone 8, `r` Raspberry Pi,
/// `P` PlayStation 4, `l` old Linux.
pub const PLATFORMS: &[u8] = b"wxmiadXWnupMrPl";

/// Flag bit selecting LZX whole-container compression.
pub const FLAG_LZX: u8 = 0x80;
/// Flag bit selecting LZ4 whole-container compression.
pub const FLAG_LZ4: u8 = 0x40;

/// Bytes taken by magic, platform, version, flags, total length and
/// decompressed size in a compressed container.
pub const COMPRESSED_HEADER_LEN: usize = 14;
/// Bytes taken by magic, platform, version, flags and total length.
pub const HEADER_LEN: usize = 10;

/// Magic and platform, read in one piece.
#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable)]
#[repr(C)]
struct Ident {
    magic: [u8; 3],
    platform: u8,
}

/// Whole-container compression scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Lzx,
    Lz4,
}

/// Parsed container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XnbHeader {
    pub platform: u8,
    pub version: u8,
    pub flags: u8,
    /// Length of the entire container including this header.
    pub total_len: usize,
    /// Size after decompression, present when compressed.
    pub decompressed_len: Option<usize>,
}

impl XnbHeader {
    /// Read and validate a header.
    ///
    /// The platform byte is checked before version and flags are read.
    pub fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let Ident { magic, platform } = reader.read_struct::<Ident>()?;
        if magic != MAGIC || !PLATFORMS.contains(&platform) {
            return Err(Error::InvalidHeader { magic, platform });
        }

        let version = reader.read_u8()?;
        let flags = reader.read_u8()?;
        if version != 5 && version != 6 {
            return Err(Error::UnsupportedVersion(version));
        }

        let total_len = read_length(reader)?;
        let mut header = Self {
            platform,
            version,
            flags,
            total_len,
            decompressed_len: None,
        };
        if header.compression() != Compression::None {
            header.decompressed_len = Some(read_length(reader)?);
        }
        Ok(header)
    }

    /// Compression scheme selected by the flags. LZX wins if both bits are set.
    pub fn compression(&self) -> Compression {
        if self.flags & FLAG_LZX != 0 {
            Compression::Lzx
        } else if self.flags & FLAG_LZ4 != 0 {
            Compression::Lz4
        } else {
            Compression::None
        }
    }
}

fn read_length(reader: &mut BinaryReader<'_>) -> Result<usize> {
    let value = reader.read_i32_le()?;
    usize::try_from(value).map_err(|_| Error::InvalidLength(value as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_uncompressed_header() {
        let data = [b'X', b'N', b'B', b'w', 6, 0, 42, 0, 0, 0];
        let header = XnbHeader::read(&mut BinaryReader::new(&data)).unwrap();

        assert_eq!(header.version, 6);
        assert_eq!(header.total_len, 42);
        assert_eq!(header.compression(), Compression::None);
        assert_eq!(header.decompressed_len, None);
    }

    #[test]
    fn test_read_compressed_header() {
        let data = [b'X', b'N', b'B', b'd', 5, 0x80, 20, 0, 0, 0, 0, 1, 0, 0];
        let header = XnbHeader::read(&mut BinaryReader::new(&data)).unwrap();

        assert_eq!(header.compression(), Compression::Lzx);
        assert_eq!(header.decompressed_len, Some(256));
    }

    #[test]
    fn test_bad_platform_rejected_before_version() {
        // Only the platform byte follows the magic; a version read would hit EOF.
        let data = [b'X', b'N', b'B', b'q'];
        let mut reader = BinaryReader::new(&data);

        let err = XnbHeader::read(&mut reader).unwrap_err();
        assert!(matches!(err, Error::InvalidHeader { platform: b'q', .. }));
        assert_eq!(reader.position(), 4);
    }

    #[test]
    fn test_bad_version() {
        let data = [b'X', b'N', b'B', b'w', 4, 0, 10, 0, 0, 0];
        let err = XnbHeader::read(&mut BinaryReader::new(&data)).unwrap_err();
        assert!(matches!(err, Error::UnsupportedVersion(4)));
    }
}
