//! Fixed-width integer and cstring wire primitives
//!
//! Everything on the wire is little-endian two's complement. Strings are
//! NUL-terminated (cstring), never length-prefixed.

use bytes::{Buf, BufMut};

use super::{Error, Result};

/// Append a little-endian i32.
pub fn put_i32(buf: &mut Vec<u8>, n: i32) {
    buf.put_i32_le(n);
}

/// Append a little-endian u32 (flag words).
pub fn put_u32(buf: &mut Vec<u8>, n: u32) {
    buf.put_u32_le(n);
}

/// Append a little-endian i64.
pub fn put_i64(buf: &mut Vec<u8>, n: i64) {
    buf.put_i64_le(n);
}

/// Append a NUL-terminated string.
///
/// The string must not contain an interior NUL byte; the wire format has
/// no escaping, so an embedded NUL silently truncates the string on
/// decode. This is a caller contract and is not validated here.
pub fn put_cstring(buf: &mut Vec<u8>, s: &str) {
    buf.put_slice(s.as_bytes());
    buf.put_u8(0);
}

/// Cursor over a message body.
///
/// Tracks the absolute byte offset within the full message so decode
/// errors can point at the exact position that failed.
#[derive(Debug)]
pub struct Reader<'a> {
    rest: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    /// Create a reader over `buf`, which starts `base_offset` bytes into
    /// the full message.
    #[must_use]
    pub fn new(buf: &'a [u8], base_offset: usize) -> Self {
        Self {
            rest: buf,
            offset: base_offset,
        }
    }

    /// Absolute offset of the next unread byte.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Unread byte count.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.rest.len()
    }

    fn check(&self, needed: usize) -> Result<()> {
        if self.rest.len() < needed {
            return Err(Error::BufferTooSmall {
                needed,
                got: self.rest.len(),
            });
        }
        Ok(())
    }

    /// Read a little-endian i32.
    pub fn read_i32(&mut self) -> Result<i32> {
        self.check(4)?;
        self.offset += 4;
        Ok(self.rest.get_i32_le())
    }

    /// Read a little-endian u32.
    pub fn read_u32(&mut self) -> Result<u32> {
        self.check(4)?;
        self.offset += 4;
        Ok(self.rest.get_u32_le())
    }

    /// Read a little-endian i64.
    pub fn read_i64(&mut self) -> Result<i64> {
        self.check(8)?;
        self.offset += 8;
        Ok(self.rest.get_i64_le())
    }

    /// Read a NUL-terminated string, consuming the terminator.
    ///
    /// Fails when no terminator remains or when the bytes before it are
    /// not valid UTF-8; the input is untrusted, so a byte sequence this
    /// codec could not have produced is rejected rather than repaired.
    pub fn read_cstring(&mut self) -> Result<String> {
        let Some(nul) = self.rest.iter().position(|&b| b == 0) else {
            return Err(Error::MalformedString {
                offset: self.offset,
            });
        };
        let s = std::str::from_utf8(&self.rest[..nul])
            .map_err(|_| Error::InvalidUtf8 {
                offset: self.offset,
            })?
            .to_owned();
        self.rest.advance(nul + 1);
        self.offset += nul + 1;
        Ok(s)
    }

    /// Take all unread bytes.
    pub fn take_rest(&mut self) -> &'a [u8] {
        let rest = self.rest;
        self.offset += rest.len();
        self.rest = &[];
        rest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_i32_roundtrip() {
        let mut buf = Vec::new();
        put_i32(&mut buf, -2);
        assert_eq!(buf, [0xFE, 0xFF, 0xFF, 0xFF]);

        let mut r = Reader::new(&buf, 0);
        assert_eq!(r.read_i32().unwrap(), -2);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_i64_negative_one_is_all_ff() {
        let mut buf = Vec::new();
        put_i64(&mut buf, -1);
        assert_eq!(buf, [0xFF; 8]);

        let mut r = Reader::new(&buf, 0);
        assert_eq!(r.read_i64().unwrap(), -1);
    }

    #[test]
    fn test_cstring_roundtrip() {
        let mut buf = Vec::new();
        put_cstring(&mut buf, "test.test");
        put_i32(&mut buf, 7);
        assert_eq!(buf.len(), 14);

        let mut r = Reader::new(&buf, 0);
        assert_eq!(r.read_cstring().unwrap(), "test.test");
        assert_eq!(r.read_i32().unwrap(), 7);
    }

    #[test]
    fn test_cstring_invalid_utf8_rejected() {
        let mut r = Reader::new(&[0x68, 0xFF, 0x69, 0x00], 4);
        assert!(matches!(
            r.read_cstring(),
            Err(Error::InvalidUtf8 { offset: 4 })
        ));
    }

    #[test]
    fn test_cstring_missing_nul() {
        let mut r = Reader::new(b"no terminator", 16);
        let err = r.read_cstring().unwrap_err();
        assert!(matches!(err, Error::MalformedString { offset: 16 }));
    }

    #[test]
    fn test_short_read_fails() {
        let mut r = Reader::new(&[1, 2], 0);
        assert!(matches!(
            r.read_i32(),
            Err(Error::BufferTooSmall { needed: 4, got: 2 })
        ));
    }

    #[test]
    fn test_offset_tracking() {
        let mut buf = Vec::new();
        put_i32(&mut buf, 0);
        put_cstring(&mut buf, "db.col");
        put_i64(&mut buf, 99);

        let mut r = Reader::new(&buf, 16);
        r.read_i32().unwrap();
        assert_eq!(r.offset(), 20);
        r.read_cstring().unwrap();
        assert_eq!(r.offset(), 27);
        r.read_i64().unwrap();
        assert_eq!(r.offset(), 35);
        assert_eq!(r.take_rest(), &[] as &[u8]);
    }
}
