//! Binary writer producing package encodings.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::{Error, Result, MAX_SHORT_STRING};

/// A growable binary writer.
///
/// The counterpart of [`BinaryReader`](crate::BinaryReader): plain `write_*`
/// methods emit big-endian values, `_le` variants little-endian ones.
#[derive(Debug, Default, Clone)]
pub struct BinaryWriter {
    buf: Vec<u8>,
}

impl BinaryWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty writer with preallocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Number of bytes written so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if nothing has been written.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Borrow the written bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the writer, returning the written bytes.
    #[inline]
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    #[inline]
    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    #[inline]
    pub fn write_u16(&mut self, value: u16) {
        let mut bytes = [0u8; 2];
        BigEndian::write_u16(&mut bytes, value);
        self.write_bytes(&bytes);
    }

    #[inline]
    pub fn write_i16(&mut self, value: i16) {
        let mut bytes = [0u8; 2];
        BigEndian::write_i16(&mut bytes, value);
        self.write_bytes(&bytes);
    }

    #[inline]
    pub fn write_u32(&mut self, value: u32) {
        let mut bytes = [0u8; 4];
        BigEndian::write_u32(&mut bytes, value);
        self.write_bytes(&bytes);
    }

    #[inline]
    pub fn write_i32(&mut self, value: i32) {
        let mut bytes = [0u8; 4];
        BigEndian::write_i32(&mut bytes, value);
        self.write_bytes(&bytes);
    }

    #[inline]
    pub fn write_f32(&mut self, value: f32) {
        let mut bytes = [0u8; 4];
        BigEndian::write_f32(&mut bytes, value);
        self.write_bytes(&bytes);
    }

    #[inline]
    pub fn write_i32_le(&mut self, value: i32) {
        let mut bytes = [0u8; 4];
        LittleEndian::write_i32(&mut bytes, value);
        self.write_bytes(&bytes);
    }

    /// Write a .NET style 7-bit encoded integer.
    pub fn write_7bit_encoded_int(&mut self, value: i32) {
        let mut value = value as u32;
        while value >= 0x80 {
            self.write_u8((value as u8) | 0x80);
            value >>= 7;
        }
        self.write_u8(value as u8);
    }

    /// Write a string with a single-byte length prefix.
    pub fn write_string(&mut self, value: &str) -> Result<()> {
        if value.len() > MAX_SHORT_STRING {
            return Err(Error::StringTooLong(value.len()));
        }
        self.write_u8(value.len() as u8);
        self.write_bytes(value.as_bytes());
        Ok(())
    }

    /// Write a UTF-8 string with a 4-byte big-endian length prefix.
    pub fn write_big_string(&mut self, value: &str) {
        self.write_i32(value.len() as i32);
        self.write_bytes(value.as_bytes());
    }

    /// Write a UTF-8 string with a 7-bit encoded length prefix.
    pub fn write_7bit_string(&mut self, value: &str) {
        self.write_7bit_encoded_int(value.len() as i32);
        self.write_bytes(value.as_bytes());
    }
}

/// Size in bytes of `value` once written with [`BinaryWriter::write_string`].
pub fn string_size(value: &str) -> Result<usize> {
    if value.len() > MAX_SHORT_STRING {
        return Err(Error::StringTooLong(value.len()));
    }
    Ok(1 + value.len())
}
