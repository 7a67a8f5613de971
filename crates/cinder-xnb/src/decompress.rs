//! Whole-container decompression.

use cinder_common::BinaryReader;
use lzxd::{Lzxd, WindowSize};

use crate::{Error, Result};

/// Output frame size used unless a block overrides it.
const DEFAULT_FRAME_SIZE: usize = 0x8000;

/// Decompress an LZX stream in MonoGame's block framing.
///
/// Each block starts with a big-endian `u16` compressed size. A leading
/// `0xFF` byte instead introduces an explicit `u16` frame size followed by the
/// block size. A zero size ends the stream.
pub fn decompress_lzx(data: &[u8], decompressed_len: usize) -> Result<Vec<u8>> {
    let mut lzx = Lzxd::new(WindowSize::KB64);
    let mut reader = BinaryReader::new(data);
    let mut output = Vec::with_capacity(decompressed_len.min(data.len().saturating_mul(8)));

    while !reader.is_empty() {
        let hi = reader.read_u8()?;
        let lo = reader.read_u8()?;
        let (frame_size, block_size) = if hi == 0xFF {
            let frame = ((lo as usize) << 8) | reader.read_u8()? as usize;
            (frame, reader.read_u16()? as usize)
        } else {
            (DEFAULT_FRAME_SIZE, ((hi as usize) << 8) | lo as usize)
        };
        if block_size == 0 || frame_size == 0 {
            break;
        }

        let block = reader.read_bytes(block_size)?;
        let frame_size = frame_size.min(decompressed_len.saturating_sub(output.len()));
        let frame = lzx
            .decompress_next(block, frame_size)
            .map_err(|e| Error::Decompression(format!("LZX: {}", e)))?;
        output.extend_from_slice(frame);
    }

    if output.len() != decompressed_len {
        return Err(Error::Decompression(format!(
            "LZX produced {} bytes, expected {}",
            output.len(),
            decompressed_len
        )));
    }
    Ok(output)
}

/// Decompress an LZ4 block into exactly `decompressed_len` bytes.
pub fn decompress_lz4(data: &[u8], decompressed_len: usize) -> Result<Vec<u8>> {
    let output = lz4_flex::block::decompress(data, decompressed_len)
        .map_err(|e| Error::Decompression(format!("LZ4: {}", e)))?;
    if output.len() != decompressed_len {
        return Err(Error::Decompression(format!(
            "LZ4 produced {} bytes, expected {}",
            output.len(),
            decompressed_len
        )));
    }
    Ok(output)
}
