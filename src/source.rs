//! Sequential positioned reads from a byte stream.
//!
//! The structured-field reader pulls from a [`StreamSource`] one field at a
//! time.  `Ok(None)` from a read means the stream ended cleanly before the
//! first requested byte; a partial read raises `EndOfFile`.  The source
//! tracks how many bytes it has handed out so the stream driver can report
//! the start offset of a failing field.

use std::io::Read;

use crate::error::ErrorKind;

pub struct StreamSource<R> {
    inner: R,
    position: u64,
}

impl<R: Read> StreamSource<R> {
    pub fn new(inner: R) -> StreamSource<R> {
        StreamSource { inner, position: 0 }
    }

    /// Byte offset of the next unread byte.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Read exactly `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<Option<Vec<u8>>, ErrorKind> {
        let mut buf = vec![0_u8; n];
        let mut filled = 0;
        while filled < n {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(k) => filled += k,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(ErrorKind::Io(e.to_string())),
            }
        }
        self.position += filled as u64;
        if filled == 0 {
            return Ok(None);
        }
        if filled < n {
            return Err(ErrorKind::EndOfFile(String::from(
                "Unexpected EOF while reading file",
            )));
        }
        Ok(Some(buf))
    }

    pub fn read_byte(&mut self) -> Result<Option<u8>, ErrorKind> {
        Ok(self.read_bytes(1)?.map(|b| b[0]))
    }

    /// Unsigned big-endian integer `n` bytes long.
    pub fn read_ubin(&mut self, n: usize) -> Result<Option<u64>, ErrorKind> {
        match self.read_bytes(n)? {
            None => Ok(None),
            Some(b) => Ok(Some(b.iter().fold(0_u64, |u, &x| (u << 8) + x as u64))),
        }
    }
}
