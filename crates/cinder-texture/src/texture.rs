//! Texture model with a memoized decoded representation.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::codec::{decompress, encode};
use crate::{Decoders, Result, SurfaceFormat};

/// The single current representation of a texture's pixels.
#[derive(Clone)]
enum Pixels {
    /// Bytes in the texture's own `format`.
    Encoded(Arc<[u8]>),
    /// Decoded RGBA8.
    Rgba(Arc<[u8]>),
}

#[derive(Clone)]
struct State {
    width: usize,
    height: usize,
    pixels: Pixels,
}

/// A 2D texture.
///
/// The format is fixed at construction. Width, height and the pixel buffer
/// live behind one lock and are either the encoded bytes or the decoded RGBA,
/// never both.
pub struct Texture {
    format: SurfaceFormat,
    state: Mutex<State>,
}

impl Texture {
    /// Create a texture from encoded bytes.
    pub fn new(
        format: SurfaceFormat,
        width: usize,
        height: usize,
        data: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            format,
            state: Mutex::new(State {
                width,
                height,
                pixels: Pixels::Encoded(data.into()),
            }),
        }
    }

    pub fn format(&self) -> SurfaceFormat {
        self.format
    }

    pub fn width(&self) -> usize {
        self.state.lock().width
    }

    pub fn height(&self) -> usize {
        self.state.lock().height
    }

    /// Width and height read under one lock.
    pub fn dimensions(&self) -> (usize, usize) {
        let state = self.state.lock();
        (state.width, state.height)
    }

    /// Whether the current representation is decoded RGBA.
    pub fn is_decompressed(&self) -> bool {
        matches!(self.state.lock().pixels, Pixels::Rgba(_))
    }

    /// Decoded RGBA8 pixels.
    ///
    /// The first call runs the decoder and replaces the encoded bytes with the
    /// result; later calls return the stored buffer. Decoding happens without
    /// holding the lock.
    pub fn rgba_data(&self, decoders: &Decoders) -> Result<Arc<[u8]>> {
        let (encoded, width, height) = {
            let state = self.state.lock();
            match &state.pixels {
                Pixels::Rgba(rgba) => return Ok(Arc::clone(rgba)),
                Pixels::Encoded(encoded) => (Arc::clone(encoded), state.width, state.height),
            }
        };

        let rgba: Arc<[u8]> = decompress(self.format, &encoded, width, height, decoders)?.into();

        let mut state = self.state.lock();
        match &state.pixels {
            Pixels::Encoded(current) if Arc::ptr_eq(current, &encoded) => {
                state.pixels = Pixels::Rgba(Arc::clone(&rgba));
                Ok(rgba)
            }
            // Another thread finished first.
            Pixels::Rgba(current) => Ok(Arc::clone(current)),
            // Replaced while decoding; the result describes the old pixels.
            Pixels::Encoded(_) => Ok(rgba),
        }
    }

    /// Replace the pixels with decoded RGBA8 of new dimensions.
    pub fn set_rgba_data(&self, rgba: impl Into<Arc<[u8]>>, width: usize, height: usize) {
        let mut state = self.state.lock();
        state.width = width;
        state.height = height;
        state.pixels = Pixels::Rgba(rgba.into());
    }

    /// Pixels in the texture's own format, re-encoding decoded RGBA if needed.
    pub fn encoded_data(&self) -> Result<Arc<[u8]>> {
        let state = self.state.lock().clone();
        match state.pixels {
            Pixels::Encoded(encoded) => Ok(encoded),
            Pixels::Rgba(rgba) => {
                tracing::debug!(
                    format = ?self.format,
                    width = state.width,
                    height = state.height,
                    "re-encoding texture"
                );
                Ok(encode(self.format, &rgba, state.width, state.height)?.into())
            }
        }
    }
}

impl Clone for Texture {
    fn clone(&self) -> Self {
        Self {
            format: self.format,
            state: Mutex::new(self.state.lock().clone()),
        }
    }
}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        let (kind, len) = match &state.pixels {
            Pixels::Encoded(data) => ("encoded", data.len()),
            Pixels::Rgba(data) => ("rgba", data.len()),
        };
        f.debug_struct("Texture")
            .field("format", &self.format)
            .field("width", &state.width)
            .field("height", &state.height)
            .field(kind, &len)
            .finish()
    }
}

/// A volume texture. Kept as raw bytes; there is no decoder for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture3D {
    pub format: SurfaceFormat,
    pub width: usize,
    pub height: usize,
    pub depth: usize,
    pub data: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::BlockDecompressor;

    #[derive(Default)]
    struct CountingDecoder {
        calls: AtomicUsize,
    }

    impl BlockDecompressor for CountingDecoder {
        fn decompress(&self, _data: &[u8], width: usize, height: usize) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![0x5A; width * height * 4])
        }
    }

    #[test]
    fn test_second_decode_is_cached() {
        let counting = Arc::new(CountingDecoder::default());
        let decoders = Decoders {
            dxt5: counting.clone(),
            bc7: counting.clone(),
        };
        let texture = Texture::new(SurfaceFormat::Dxt5, 4, 4, vec![0u8; 16]);

        let first = texture.rgba_data(&decoders).unwrap();
        let second = texture.rgba_data(&decoders).unwrap();

        assert_eq!(first, second);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(counting.calls.load(Ordering::SeqCst), 1);
        assert!(texture.is_decompressed());
    }

    #[test]
    fn test_set_rgba_replaces_dimensions() {
        let texture = Texture::new(SurfaceFormat::Color, 1, 1, vec![1, 2, 3, 4]);
        texture.set_rgba_data(vec![9u8; 2 * 3 * 4], 2, 3);

        assert_eq!(texture.dimensions(), (2, 3));
        assert_eq!(texture.format(), SurfaceFormat::Color);
        assert_eq!(texture.encoded_data().unwrap().len(), 24);
    }

    #[test]
    fn test_encoded_data_reencodes_alpha() {
        let texture = Texture::new(SurfaceFormat::Alpha8, 2, 1, vec![10, 20]);
        texture.rgba_data(&Decoders::default()).unwrap();
        assert_eq!(&*texture.encoded_data().unwrap(), &[10, 20]);
    }

    #[test]
    fn test_bc7_reencode_unsupported() {
        let texture = Texture::new(SurfaceFormat::Bc7, 4, 4, vec![0u8; 16]);
        texture.set_rgba_data(vec![0u8; 64], 4, 4);
        assert!(texture.encoded_data().is_err());
    }
}
