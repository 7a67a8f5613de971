//! Block compression engines.
//!
//! The decoders here are thin adapters over external, already-optimized
//! libraries: `texpresso` (a libsquish port) for BC3/DXT5 and
//! `texture2ddecoder` for BC7. Each takes `(bytes, width, height)` and
//! returns tightly packed RGBA8 rows, top to bottom.

use std::fmt;
use std::sync::Arc;

use crate::format::block_grid_size;
use crate::{Error, Result};

/// Bytes per 4x4 block for both supported block formats.
const BLOCK_BYTES: usize = 16;

/// A block decompression engine.
pub trait BlockDecompressor: Send + Sync {
    /// Decode a block-compressed surface into RGBA8.
    ///
    /// Fails if `data` is too short for the block grid of `width` x `height`.
    fn decompress(&self, data: &[u8], width: usize, height: usize) -> Result<Vec<u8>>;
}

/// The set of engines used by [`decompress`](crate::decompress).
#[derive(Clone)]
pub struct Decoders {
    /// Engine for [`SurfaceFormat::Dxt5`](crate::SurfaceFormat::Dxt5).
    pub dxt5: Arc<dyn BlockDecompressor>,
    /// Engine for [`SurfaceFormat::Bc7`](crate::SurfaceFormat::Bc7).
    pub bc7: Arc<dyn BlockDecompressor>,
}

impl Default for Decoders {
    fn default() -> Self {
        Self {
            dxt5: Arc::new(Dxt5Decoder),
            bc7: Arc::new(Bc7Decoder),
        }
    }
}

impl fmt::Debug for Decoders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoders").finish_non_exhaustive()
    }
}

/// Check that `data` covers the whole block grid and return the used prefix.
fn block_input(data: &[u8], width: usize, height: usize) -> Result<&[u8]> {
    let expected = block_grid_size(width, height, BLOCK_BYTES);
    if data.len() < expected {
        return Err(Error::DataSizeMismatch {
            expected,
            actual: data.len(),
        });
    }
    Ok(&data[..expected])
}

fn rgba_len(width: usize, height: usize) -> Result<usize> {
    width
        .checked_mul(height)
        .and_then(|pixels| pixels.checked_mul(4))
        .ok_or(Error::InvalidDimensions {
            width: width as i64,
            height: height as i64,
        })
}

/// BC3/DXT5 decoder backed by `texpresso`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Dxt5Decoder;

impl BlockDecompressor for Dxt5Decoder {
    fn decompress(&self, data: &[u8], width: usize, height: usize) -> Result<Vec<u8>> {
        let input = block_input(data, width, height)?;
        let mut output = vec![0u8; rgba_len(width, height)?];
        texpresso::Format::Bc3.decompress(input, width, height, &mut output);
        Ok(output)
    }
}

/// BC7 decoder backed by `texture2ddecoder`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Bc7Decoder;

impl BlockDecompressor for Bc7Decoder {
    fn decompress(&self, data: &[u8], width: usize, height: usize) -> Result<Vec<u8>> {
        let input = block_input(data, width, height)?;
        let mut pixels = vec![0u32; rgba_len(width, height)? / 4];
        texture2ddecoder::decode_bc7(input, width, height, &mut pixels)
            .map_err(|e| Error::Decompression(format!("BC7: {}", e)))?;

        // texture2ddecoder packs each pixel as little-endian B, G, R, A.
        let mut output = Vec::with_capacity(pixels.len() * 4);
        for pixel in pixels {
            let [b, g, r, a] = pixel.to_le_bytes();
            output.extend_from_slice(&[r, g, b, a]);
        }
        Ok(output)
    }
}

/// BC3/DXT5 encoder used when an imported image replaces a DXT5 texture.
#[derive(Debug, Default, Clone, Copy)]
pub struct Dxt5Encoder;

impl Dxt5Encoder {
    /// Compress tightly packed RGBA8 into BC3 blocks.
    pub fn compress(&self, rgba: &[u8], width: usize, height: usize) -> Result<Vec<u8>> {
        let expected = rgba_len(width, height)?;
        if rgba.len() != expected {
            return Err(Error::DataSizeMismatch {
                expected,
                actual: rgba.len(),
            });
        }
        let format = texpresso::Format::Bc3;
        let mut output = vec![0u8; format.compressed_size(width, height)];
        format.compress(rgba, width, height, texpresso::Params::default(), &mut output);
        Ok(output)
    }
}
