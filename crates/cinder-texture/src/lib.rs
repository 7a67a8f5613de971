//! Texture pixel handling for Cinder.
//!
//! Texture entries store their pixels in one of a handful of encodings. This
//! crate turns any of them into plain RGBA8 and, for display, into
//! premultiplied BGRA8:
//!
//! - `Color` - 32-bit RGBA, passed through
//! - `Alpha8` - single alpha channel
//! - `LuminanceAlpha8` - luminance + alpha
//! - `Dxt5` - BC3 blocks, decoded by the DXT5 engine
//! - `Bc7` - BPTC blocks, decoded by the BC7 engine
//!
//! Block engines sit behind the [`BlockDecompressor`] trait so callers can
//! swap them via [`Decoders`].
//!
//! # Example
//!
//! ```
//! use cinder_texture::{premultiply_bgra, SurfaceFormat, Texture, Decoders};
//!
//! let texture = Texture::new(SurfaceFormat::Color, 1, 1, vec![200, 0, 0, 128]);
//! let rgba = texture.rgba_data(&Decoders::default())?;
//!
//! let mut bgra = rgba.to_vec();
//! premultiply_bgra(&mut bgra);
//! assert_eq!(bgra, [0, 0, 100, 128]);
//! # Ok::<(), cinder_texture::Error>(())
//! ```

pub mod block;
mod codec;
mod error;
mod format;
mod texture;

pub use block::{Bc7Decoder, BlockDecompressor, Decoders, Dxt5Decoder, Dxt5Encoder};
pub use codec::{decompress, encode, premultiply_bgra};
pub use error::{Error, Result};
pub use format::{block_grid_size, SurfaceFormat};
pub use texture::{Texture, Texture3D};
