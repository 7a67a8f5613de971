//! XNB content container support for Cinder.
//!
//! Texture entries embed a small XNB container: a header naming the target
//! platform and version, optional LZX or LZ4 whole-container compression,
//! a type reader table and an object graph. Only the 2D and 3D texture
//! readers are implemented.
//!
//! # Example
//!
//! ```
//! use cinder_texture::{SurfaceFormat, Texture};
//! use cinder_xnb::{read_texture, write_texture};
//!
//! let texture = Texture::new(SurfaceFormat::Alpha8, 2, 1, vec![10, 20]);
//! let xnb = write_texture(&texture)?;
//!
//! let decoded = read_texture(&xnb)?;
//! assert_eq!(decoded.dimensions(), (2, 1));
//! # Ok::<(), cinder_xnb::Error>(())
//! ```

mod content;
mod decompress;
mod error;
pub mod header;
mod readers;
mod writer;

use cinder_common::BinaryReader;
use cinder_texture::Texture;
use tracing::trace;

pub use content::ContentReader;
pub use decompress::{decompress_lz4, decompress_lzx};
pub use error::{Error, Result};
pub use header::{Compression, XnbHeader};
pub use readers::{Asset, AssetKind, TypeReader, TEXTURE2D_READER, TEXTURE3D_READER};
pub use writer::{write_texture, write_texture3d};

/// Decode the root asset of a container.
///
/// With `requested` set, a version 6 root of another kind is an error.
/// Version 5 containers carry no usable reader table, so their body is read
/// as `requested`, defaulting to a 2D texture.
pub fn read_asset(data: &[u8], requested: Option<AssetKind>) -> Result<Asset> {
    let mut reader = BinaryReader::new(data);
    let header = XnbHeader::read(&mut reader)?;
    if header.total_len > data.len() {
        return Err(Error::InvalidLength(header.total_len as i64));
    }
    trace!(
        version = header.version,
        compression = ?header.compression(),
        total_len = header.total_len,
        "reading XNB"
    );

    let decompressed;
    let payload = match (header.compression(), header.decompressed_len) {
        (Compression::None, _) | (_, None) => {
            let end = header.total_len.max(reader.position());
            &data[reader.position()..end]
        }
        (scheme, Some(decompressed_len)) => {
            let compressed_len = header
                .total_len
                .checked_sub(header::COMPRESSED_HEADER_LEN)
                .ok_or(Error::InvalidLength(header.total_len as i64))?;
            let compressed = reader.read_bytes(compressed_len)?;
            decompressed = match scheme {
                Compression::Lzx => decompress_lzx(compressed, decompressed_len)?,
                _ => decompress_lz4(compressed, decompressed_len)?,
            };
            &decompressed[..]
        }
    };

    let content = ContentReader::new(payload);
    if header.version == 5 {
        content.read_legacy(requested.unwrap_or(AssetKind::Texture2D))
    } else {
        content.read_graph(requested)
    }
}

/// Decode a container whose root is a 2D texture.
pub fn read_texture(data: &[u8]) -> Result<Texture> {
    match read_asset(data, Some(AssetKind::Texture2D))? {
        Asset::Texture2D(texture) => Ok(texture),
        other => Err(Error::UnexpectedAsset {
            expected: AssetKind::Texture2D,
            actual: other.kind(),
        }),
    }
}
