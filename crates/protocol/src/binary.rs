//! Binary reading and writing utilities for the arena protocol.
//!
//! All values are little-endian. Every read is checked against the remaining
//! length, so a truncated frame surfaces as [`ProtocolError::UnexpectedEof`].

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::ProtocolError;

/// A reader for parsing binary protocol messages.
#[derive(Debug)]
pub struct BinaryReader {
    buf: Bytes,
}

impl BinaryReader {
    /// Create a new reader from raw bytes.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { buf: data.into() }
    }

    /// Returns remaining bytes.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    #[inline]
    fn ensure(&self, needed: usize) -> Result<(), ProtocolError> {
        let remaining = self.buf.remaining();
        if remaining < needed {
            Err(ProtocolError::UnexpectedEof { needed, remaining })
        } else {
            Ok(())
        }
    }

    /// Skip `n` bytes. Skipping past the end is an error.
    #[inline]
    pub fn skip(&mut self, n: usize) -> Result<(), ProtocolError> {
        self.ensure(n)?;
        self.buf.advance(n);
        Ok(())
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, ProtocolError> {
        self.ensure(1)?;
        Ok(self.buf.get_u8())
    }

    #[inline]
    pub fn read_u16(&mut self) -> Result<u16, ProtocolError> {
        self.ensure(2)?;
        Ok(self.buf.get_u16_le())
    }

    #[inline]
    pub fn read_u32(&mut self) -> Result<u32, ProtocolError> {
        self.ensure(4)?;
        Ok(self.buf.get_u32_le())
    }

    #[inline]
    pub fn read_f64(&mut self) -> Result<f64, ProtocolError> {
        self.ensure(8)?;
        Ok(self.buf.get_f64_le())
    }

    /// Read a zero-terminated sequence of UTF-16 code units.
    ///
    /// Units are converted one by one; lone surrogates become U+FFFD.
    pub fn read_string_unicode(&mut self) -> Result<String, ProtocolError> {
        let mut units = Vec::new();
        loop {
            if self.buf.remaining() < 2 {
                return Err(ProtocolError::UnterminatedString);
            }
            let unit = self.buf.get_u16_le();
            if unit == 0 {
                break;
            }
            units.push(unit);
        }
        Ok(char::decode_utf16(units)
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect())
    }
}

/// A writer for building binary protocol messages.
#[derive(Debug, Default)]
pub struct BinaryWriter {
    buf: BytesMut,
}

impl BinaryWriter {
    /// Create a new writer with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Create a new writer with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Returns the current length.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn put_u8(&mut self, v: u8) {
        self.buf.put_u8(v);
    }

    #[inline]
    pub fn put_u16(&mut self, v: u16) {
        self.buf.put_u16_le(v);
    }

    #[inline]
    pub fn put_u32(&mut self, v: u32) {
        self.buf.put_u32_le(v);
    }

    #[inline]
    pub fn put_f64(&mut self, v: f64) {
        self.buf.put_f64_le(v);
    }

    /// Write UTF-16 code units without a terminator.
    pub fn put_utf16_units(&mut self, s: &str) {
        for c in s.encode_utf16() {
            self.buf.put_u16_le(c);
        }
    }

    /// Write a zero-terminated UTF-16 string.
    pub fn put_string_unicode(&mut self, s: &str) {
        self.put_utf16_units(s);
        self.buf.put_u16_le(0);
    }

    /// Write raw bytes.
    pub fn put_slice(&mut self, data: &[u8]) {
        self.buf.put_slice(data);
    }

    /// Consume the writer and return the built buffer.
    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }

    /// Get current buffer as a slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_little_endian_layout() {
        let mut w = BinaryWriter::new();
        w.put_u32(0xDEADBEEF);
        assert_eq!(w.as_slice(), &[0xEF, 0xBE, 0xAD, 0xDE]);
    }

    #[test]
    fn test_string_unicode_stops_at_terminator() {
        let mut w = BinaryWriter::new();
        w.put_string_unicode("héllo");
        w.put_u8(7);
        let mut r = BinaryReader::new(w.finish());
        assert_eq!(r.read_string_unicode().unwrap(), "héllo");
        assert_eq!(r.read_u8().unwrap(), 7);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_unterminated_string_is_error() {
        let mut w = BinaryWriter::new();
        w.put_utf16_units("abc");
        let mut r = BinaryReader::new(w.finish());
        assert_eq!(r.read_string_unicode(), Err(ProtocolError::UnterminatedString));
    }

    #[test]
    fn test_short_read_reports_sizes() {
        let mut r = BinaryReader::new(vec![1u8, 2, 3]);
        assert_eq!(
            r.read_f64(),
            Err(ProtocolError::UnexpectedEof { needed: 8, remaining: 3 })
        );
        assert!(r.skip(4).is_err());
        assert!(r.skip(3).is_ok());
    }
}
