//! Common utilities for Cinder.
//!
//! This crate provides the binary stream primitives used across all Cinder crates:
//!
//! - [`BinaryReader`] - Zero-copy reading from byte slices (big-endian by default,
//!   with little-endian and 7-bit encoded helpers for the nested XNB container)
//! - [`BinaryWriter`] - Growable writer producing the same encodings
//!
//! Package files store every multi-byte scalar big-endian. Short strings carry a
//! single length byte and are limited to 255 bytes; "big strings" carry a 4-byte
//! length prefix.

mod error;
mod reader;
mod writer;

pub use error::{Error, Result};
pub use reader::BinaryReader;
pub use writer::{string_size, BinaryWriter};

/// Maximum length in bytes of a single-byte-prefixed string.
pub const MAX_SHORT_STRING: usize = u8::MAX as usize;
