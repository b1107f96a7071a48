//! Positioned read primitives over an in-memory byte buffer.
//!
//! All accessors share one contract: `Ok(None)` when the offset is at or
//! past the end of the buffer (no data to start the value), an
//! `EndOfStream` error when the buffer holds fewer bytes than the value
//! needs, and `Ok(Some(..))` otherwise.  A length of zero means "the rest
//! of the buffer".

use byteorder::{BigEndian, ReadBytesExt};
use std::io::Cursor;

use crate::ebcdic;
use crate::error::ErrorKind;

/// Borrow `length` bytes starting at `offset`.
pub fn take(data: &[u8], offset: usize, length: usize) -> Result<Option<&[u8]>, ErrorKind> {
    let n = if length == 0 {
        data.len().saturating_sub(offset)
    } else {
        length
    };
    if offset >= data.len() {
        return Ok(None);
    }
    if offset + n > data.len() {
        return Err(ErrorKind::EndOfStream(format!(
            "Out of data while parsing {} byte(s) from offset {} of a {} byte buffer",
            n,
            offset,
            data.len()
        )));
    }
    Ok(Some(&data[offset..offset + n]))
}

/// Unsigned big-endian integer of `length` bytes.
pub fn ubin(data: &[u8], offset: usize, length: usize) -> Result<Option<u64>, ErrorKind> {
    match take(data, offset, length)? {
        None => Ok(None),
        Some(b) => {
            let mut c = Cursor::new(b);
            let v = c
                .read_uint::<BigEndian>(b.len())
                .map_err(|e| ErrorKind::EndOfStream(e.to_string()))?;
            Ok(Some(v))
        }
    }
}

/// Signed big-endian two's-complement integer of `length` bytes.  Sign
/// extension happens at the exact bit width read.
pub fn sbin(data: &[u8], offset: usize, length: usize) -> Result<Option<i64>, ErrorKind> {
    match take(data, offset, length)? {
        None => Ok(None),
        Some(b) => {
            let mut c = Cursor::new(b);
            let v = c
                .read_int::<BigEndian>(b.len())
                .map_err(|e| ErrorKind::EndOfStream(e.to_string()))?;
            Ok(Some(v))
        }
    }
}

/// EBCDIC-CP-BE text of `length` bytes with trailing whitespace dropped.
pub fn chars(data: &[u8], offset: usize, length: usize) -> Result<Option<String>, ErrorKind> {
    match take(data, offset, length)? {
        None => Ok(None),
        Some(b) => Ok(Some(ebcdic::decode(b))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_exact_and_rest() {
        let data = [1_u8, 2, 3, 4];
        assert_eq!(take(&data, 1, 2).unwrap(), Some(&data[1..3]));
        // Zero length takes the rest of the buffer.
        assert_eq!(take(&data, 1, 0).unwrap(), Some(&data[1..]));
    }

    #[test]
    fn test_take_past_end_is_none() {
        let data = [1_u8, 2];
        assert_eq!(take(&data, 2, 1).unwrap(), None);
        assert_eq!(take(&data, 5, 0).unwrap(), None);
        assert_eq!(take(&[], 0, 0).unwrap(), None);
    }

    #[test]
    fn test_take_short_is_error() {
        let data = [1_u8, 2, 3];
        assert!(matches!(
            take(&data, 2, 2),
            Err(ErrorKind::EndOfStream(_))
        ));
    }

    #[test]
    fn test_ubin() {
        assert_eq!(ubin(&[0x00, 0x11], 0, 2).unwrap(), Some(0x11));
        assert_eq!(ubin(&[0xD3, 0xA8, 0xA8], 0, 3).unwrap(), Some(0xD3A8A8));
        assert_eq!(ubin(&[0xFF, 0xFF], 0, 2).unwrap(), Some(0xFFFF));
        assert_eq!(ubin(&[0x01], 1, 1).unwrap(), None);
    }

    #[test]
    fn test_sbin_sign_extension_at_width() {
        // Three-byte two's complement.
        assert_eq!(sbin(&[0xFF, 0xFF, 0xFE], 0, 3).unwrap(), Some(-2));
        assert_eq!(sbin(&[0x80, 0x00, 0x00], 0, 3).unwrap(), Some(-8_388_608));
        assert_eq!(sbin(&[0x7F, 0xFF, 0xFF], 0, 3).unwrap(), Some(8_388_607));
        // Two-byte.
        assert_eq!(sbin(&[0xFF, 0x9C], 0, 2).unwrap(), Some(-100));
        assert_eq!(sbin(&[0x00, 0x64], 0, 2).unwrap(), Some(100));
    }

    #[test]
    fn test_chars_trims_padding() {
        // "DOC" followed by EBCDIC spaces.
        let data = [0xC4, 0xD6, 0xC3, 0x40, 0x40];
        assert_eq!(chars(&data, 0, 5).unwrap(), Some(String::from("DOC")));
        assert_eq!(chars(&data, 5, 1).unwrap(), None);
    }
}
