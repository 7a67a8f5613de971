//! Binary reader for zero-copy parsing of byte slices.
//!
//! This module provides [`BinaryReader`], a cursor-like type that reads
//! package data from a byte slice without copying.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use zerocopy::FromBytes;

use crate::{Error, Result};

/// A binary reader over a byte slice.
///
/// Plain `read_*` methods decode big-endian values, which is what package and
/// manifest files use. The `_le` variants and the 7-bit helpers exist for the
/// nested XNB container, which follows .NET `BinaryReader` conventions.
///
/// # Example
///
/// ```
/// use cinder_common::BinaryReader;
///
/// let data = [0x00, 0x00, 0x00, 0x05, 0x03, b'a', b'b', b'c'];
/// let mut reader = BinaryReader::new(&data);
///
/// assert_eq!(reader.read_i32().unwrap(), 5);
/// assert_eq!(reader.read_string().unwrap(), "abc");
/// assert!(reader.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BinaryReader<'a> {
    /// Create a new reader from a byte slice.
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Get the current position in the buffer.
    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Get the total length of the underlying buffer.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Get the number of bytes remaining to read.
    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Check if there are no more bytes to read.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Advance the position by a number of bytes, failing past the end.
    #[inline]
    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.read_bytes(count).map(|_| ())
    }

    /// Get the remaining bytes as a slice.
    #[inline]
    pub fn remaining_bytes(&self) -> &'a [u8] {
        &self.data[self.position.min(self.data.len())..]
    }

    /// Peek at bytes without advancing the position.
    #[inline]
    pub fn peek_bytes(&self, count: usize) -> Result<&'a [u8]> {
        if self.remaining() < count {
            return Err(Error::UnexpectedEof {
                needed: count,
                available: self.remaining(),
            });
        }
        Ok(&self.data[self.position..self.position + count])
    }

    /// Read bytes and advance the position.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let bytes = self.peek_bytes(count)?;
        self.position += count;
        Ok(bytes)
    }

    /// Read a single byte, or `None` at the end of the buffer.
    ///
    /// Mirrors a stream `ReadByte` returning -1, which the container format
    /// treats as an end-of-file marker.
    #[inline]
    pub fn next_byte(&mut self) -> Option<u8> {
        let byte = self.data.get(self.position).copied();
        if byte.is_some() {
            self.position += 1;
        }
        byte
    }

    /// Peek at the next byte without advancing.
    #[inline]
    pub fn peek_u8(&self) -> Result<u8> {
        self.peek_bytes(1).map(|b| b[0])
    }

    /// Read a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_bytes(1).map(|b| b[0])
    }

    /// Read a boolean (non-zero = true).
    #[inline]
    pub fn read_bool(&mut self) -> Result<bool> {
        self.read_u8().map(|b| b != 0)
    }

    /// Read a big-endian u16.
    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_bytes(2).map(BigEndian::read_u16)
    }

    /// Read a big-endian i16.
    #[inline]
    pub fn read_i16(&mut self) -> Result<i16> {
        self.read_bytes(2).map(BigEndian::read_i16)
    }

    /// Read a big-endian u32.
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_bytes(4).map(BigEndian::read_u32)
    }

    /// Read a big-endian i32.
    #[inline]
    pub fn read_i32(&mut self) -> Result<i32> {
        self.read_bytes(4).map(BigEndian::read_i32)
    }

    /// Read a big-endian f32.
    #[inline]
    pub fn read_f32(&mut self) -> Result<f32> {
        self.read_bytes(4).map(BigEndian::read_f32)
    }

    /// Read a little-endian i32.
    #[inline]
    pub fn read_i32_le(&mut self) -> Result<i32> {
        self.read_bytes(4).map(LittleEndian::read_i32)
    }

    /// Read a little-endian u32.
    #[inline]
    pub fn read_u32_le(&mut self) -> Result<u32> {
        self.read_bytes(4).map(LittleEndian::read_u32)
    }

    /// Read a .NET style 7-bit encoded integer.
    pub fn read_7bit_encoded_int(&mut self) -> Result<i32> {
        let mut value: u32 = 0;
        let mut shift = 0;
        loop {
            if shift == 35 {
                return Err(Error::Bad7BitInt);
            }
            let byte = self.read_u8()?;
            value |= ((byte & 0x7F) as u32) << shift;
            shift += 7;
            if byte & 0x80 == 0 {
                return Ok(value as i32);
            }
        }
    }

    /// Read a string with a single-byte length prefix.
    ///
    /// Package strings are nominally ASCII; any other bytes are replaced
    /// rather than rejected.
    pub fn read_string(&mut self) -> Result<String> {
        let length = self.read_u8()? as usize;
        let bytes = self.read_bytes(length)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Read a UTF-8 string with a 4-byte big-endian length prefix.
    pub fn read_big_string(&mut self) -> Result<String> {
        let length = self.read_i32()?;
        if length < 0 {
            return Err(Error::NegativeLength(length));
        }
        let bytes = self.read_bytes(length as usize)?;
        Ok(std::str::from_utf8(bytes)?.to_owned())
    }

    /// Read a UTF-8 string with a 7-bit encoded length prefix.
    pub fn read_7bit_string(&mut self) -> Result<String> {
        let length = self.read_7bit_encoded_int()?;
        if length < 0 {
            return Err(Error::NegativeLength(length));
        }
        let bytes = self.read_bytes(length as usize)?;
        Ok(std::str::from_utf8(bytes)?.to_owned())
    }

    /// Read a struct using zerocopy.
    ///
    /// The struct must implement `FromBytes` from the zerocopy crate.
    #[inline]
    pub fn read_struct<T: FromBytes>(&mut self) -> Result<T> {
        let size = std::mem::size_of::<T>();
        let bytes = self.read_bytes(size)?;
        T::read_from_bytes(bytes).map_err(|_| Error::UnexpectedEof {
            needed: size,
            available: bytes.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_big_endian_primitives() {
        let data = [
            0x01u8, 0x02, 0x03, 0x04, // i32: 0x01020304
            0xFF, 0xFF, 0xFF, 0xFE, // i32: -2
            0x3F, 0x80, 0x00, 0x00, // f32: 1.0
        ];
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.read_i32().unwrap(), 0x01020304);
        assert_eq!(reader.read_i32().unwrap(), -2);
        assert_eq!(reader.read_f32().unwrap(), 1.0);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_read_little_endian() {
        let data = [0x04, 0x03, 0x02, 0x01];
        let mut reader = BinaryReader::new(&data);
        assert_eq!(reader.read_i32_le().unwrap(), 0x01020304);
    }

    #[test]
    fn test_7bit_encoded_int() {
        let data = [0x7F, 0x80, 0x01, 0xAC, 0x02];
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.read_7bit_encoded_int().unwrap(), 127);
        assert_eq!(reader.read_7bit_encoded_int().unwrap(), 128);
        assert_eq!(reader.read_7bit_encoded_int().unwrap(), 300);
    }

    #[test]
    fn test_7bit_encoded_int_overlong() {
        let data = [0xFF; 6];
        let mut reader = BinaryReader::new(&data);
        assert!(matches!(reader.read_7bit_encoded_int(), Err(Error::Bad7BitInt)));
    }

    #[test]
    fn test_truncated_string_reports_counts() {
        let data = [0x05, b'a', b'b'];
        let mut reader = BinaryReader::new(&data);

        match reader.read_string() {
            Err(Error::UnexpectedEof { needed, available }) => {
                assert_eq!(needed, 5);
                assert_eq!(available, 2);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_big_string_negative_length() {
        let data = [0xFF, 0xFF, 0xFF, 0xFF];
        let mut reader = BinaryReader::new(&data);
        assert!(matches!(reader.read_big_string(), Err(Error::NegativeLength(-1))));
    }

    #[test]
    fn test_next_byte_at_end() {
        let data = [0xBE];
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.next_byte(), Some(0xBE));
        assert_eq!(reader.next_byte(), None);
        assert_eq!(reader.position(), 1);
    }

    #[test]
    fn test_eof_error() {
        let data = [0x01, 0x02];
        let mut reader = BinaryReader::new(&data);

        assert!(reader.read_u32().is_err());
    }
}
