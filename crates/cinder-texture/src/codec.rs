//! Format dispatch between encoded surfaces and RGBA8.

use crate::block::{Decoders, Dxt5Encoder};
use crate::{Error, Result, SurfaceFormat};

/// Decode a surface of `format` into tightly packed RGBA8.
///
/// - `Color` is passed through and must be exactly `width * height * 4` bytes.
/// - `Alpha8` expands each byte to `(0, 0, 0, a)`.
/// - `LuminanceAlpha8` expands each pair to `(l, l, l, a)`.
/// - `Dxt5` and `Bc7` go through the matching engine in `decoders`.
pub fn decompress(
    format: SurfaceFormat,
    data: &[u8],
    width: usize,
    height: usize,
    decoders: &Decoders,
) -> Result<Vec<u8>> {
    match format {
        SurfaceFormat::Color => {
            check_len(format, data, width, height)?;
            Ok(data.to_vec())
        }
        SurfaceFormat::Alpha8 => {
            check_len(format, data, width, height)?;
            let mut output = Vec::with_capacity(data.len() * 4);
            for &a in data {
                output.extend_from_slice(&[0, 0, 0, a]);
            }
            Ok(output)
        }
        SurfaceFormat::LuminanceAlpha8 => {
            check_len(format, data, width, height)?;
            let mut output = Vec::with_capacity(data.len() * 2);
            for pair in data.chunks_exact(2) {
                let (l, a) = (pair[0], pair[1]);
                output.extend_from_slice(&[l, l, l, a]);
            }
            Ok(output)
        }
        SurfaceFormat::Dxt5 => decoders.dxt5.decompress(data, width, height),
        SurfaceFormat::Bc7 => decoders.bc7.decompress(data, width, height),
        SurfaceFormat::Other(_) => Err(Error::UnsupportedFormat(format)),
    }
}

/// Encode tightly packed RGBA8 back into `format`.
///
/// `LuminanceAlpha8` keeps the red channel as luminance. `Bc7` and unknown
/// formats have no encoder.
pub fn encode(format: SurfaceFormat, rgba: &[u8], width: usize, height: usize) -> Result<Vec<u8>> {
    match format {
        SurfaceFormat::Color => {
            check_len(format, rgba, width, height)?;
            Ok(rgba.to_vec())
        }
        SurfaceFormat::Alpha8 => {
            check_len(SurfaceFormat::Color, rgba, width, height)?;
            Ok(rgba.chunks_exact(4).map(|px| px[3]).collect())
        }
        SurfaceFormat::LuminanceAlpha8 => {
            check_len(SurfaceFormat::Color, rgba, width, height)?;
            let mut output = Vec::with_capacity(rgba.len() / 2);
            for px in rgba.chunks_exact(4) {
                output.extend_from_slice(&[px[0], px[3]]);
            }
            Ok(output)
        }
        SurfaceFormat::Dxt5 => Dxt5Encoder.compress(rgba, width, height),
        SurfaceFormat::Bc7 | SurfaceFormat::Other(_) => Err(Error::UnsupportedEncoding(format)),
    }
}

/// Convert RGBA8 in place to premultiplied BGRA8.
///
/// Each colour channel becomes `c * a / 255`, truncated.
pub fn premultiply_bgra(pixels: &mut [u8]) {
    for px in pixels.chunks_exact_mut(4) {
        let a = px[3] as u32;
        let r = (px[0] as u32 * a / 255) as u8;
        let g = (px[1] as u32 * a / 255) as u8;
        let b = (px[2] as u32 * a / 255) as u8;
        px[0] = b;
        px[1] = g;
        px[2] = r;
    }
}

fn check_len(format: SurfaceFormat, data: &[u8], width: usize, height: usize) -> Result<()> {
    let expected = format
        .encoded_size(width, height)
        .ok_or(Error::InvalidDimensions {
            width: width as i64,
            height: height as i64,
        })?;
    if data.len() != expected {
        return Err(Error::DataSizeMismatch {
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}
