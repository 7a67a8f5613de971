//! Texture XNB writer.

use cinder_common::BinaryWriter;
use cinder_texture::{Texture, Texture3D};

use crate::header::{HEADER_LEN, MAGIC};
use crate::readers::TypeReader;
use crate::{Error, Result};

/// Version byte written by this crate.
pub const WRITE_VERSION: u8 = 6;
/// Platform byte written by this crate.
pub const WRITE_PLATFORM: u8 = b'w';

/// Serialize a 2D texture as an uncompressed single-object container.
pub fn write_texture(texture: &Texture) -> Result<Vec<u8>> {
    let (width, height) = texture.dimensions();
    let data = texture.encoded_data()?;

    let mut body = BinaryWriter::with_capacity(data.len() + 24);
    body.write_i32_le(texture.format().code());
    body.write_i32_le(to_i32(width)?);
    body.write_i32_le(to_i32(height)?);
    body.write_i32_le(1);
    body.write_i32_le(to_i32(data.len())?);
    body.write_bytes(&data);

    wrap(TypeReader::Texture2D, body.as_bytes())
}

/// Serialize a volume texture as an uncompressed single-object container.
pub fn write_texture3d(texture: &Texture3D) -> Result<Vec<u8>> {
    let mut body = BinaryWriter::with_capacity(texture.data.len() + 20);
    body.write_i32_le(texture.format.code());
    body.write_i32_le(to_i32(texture.width)?);
    body.write_i32_le(to_i32(texture.height)?);
    body.write_i32_le(to_i32(texture.depth)?);
    body.write_i32_le(to_i32(texture.data.len())?);
    body.write_bytes(&texture.data);

    wrap(TypeReader::Texture3D, body.as_bytes())
}

/// Prefix an object body with a one-reader table and the container header.
fn wrap(reader: TypeReader, body: &[u8]) -> Result<Vec<u8>> {
    let mut inner = BinaryWriter::with_capacity(body.len() + 64);
    inner.write_7bit_encoded_int(1);
    inner.write_7bit_string(reader.name());
    inner.write_i32_le(0);
    // No shared resources, root uses reader 1.
    inner.write_7bit_encoded_int(0);
    inner.write_7bit_encoded_int(1);
    inner.write_bytes(body);

    let total_len = to_i32(inner.len() + HEADER_LEN)?;
    let mut output = BinaryWriter::with_capacity(total_len as usize);
    output.write_bytes(&MAGIC);
    output.write_u8(WRITE_PLATFORM);
    output.write_u8(WRITE_VERSION);
    output.write_u8(0);
    output.write_i32_le(total_len);
    output.write_bytes(inner.as_bytes());
    Ok(output.into_inner())
}

fn to_i32(value: usize) -> Result<i32> {
    i32::try_from(value).map_err(|_| Error::TooLarge(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_and_length() {
        let texture = Texture::new(cinder_texture::SurfaceFormat::Color, 1, 1, vec![1, 2, 3, 4]);
        let xnb = write_texture(&texture).unwrap();

        assert_eq!(&xnb[..6], b"XNBw\x06\x00");
        let total = i32::from_le_bytes([xnb[6], xnb[7], xnb[8], xnb[9]]);
        assert_eq!(total as usize, xnb.len());
        assert_eq!(&xnb[xnb.len() - 4..], &[1, 2, 3, 4]);
    }
}
