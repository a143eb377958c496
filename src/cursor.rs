use std::io::{BufRead, Read};

use crate::error::{DecodeError, Result};

/// Forward-only reader over a log stream.
///
/// The position only ever grows. Running out of data is noticed when a read
/// comes up short, never ahead of time.
#[derive(Debug)]
pub struct ByteCursor<R> {
    reader: R,
    position: u64,
}

impl<R: BufRead> ByteCursor<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            position: 0,
        }
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Read exactly `n` bytes, failing with `TruncatedStream` if the source
    /// runs dry first.
    pub fn read_exact(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(n.min(64 * 1024));
        let available = (&mut self.reader).take(n as u64).read_to_end(&mut buf)?;
        let offset = self.position;
        self.position += available as u64;

        if available < n {
            return Err(DecodeError::TruncatedStream {
                offset,
                needed: n,
                available,
            });
        }
        Ok(buf)
    }

    /// Read a fixed-size little-endian field.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.read_exact(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&bytes);
        Ok(out)
    }

    /// Read up to the next NUL. The NUL is consumed but not returned.
    ///
    /// Returns `Ok(None)` when the source is already exhausted, which is how a
    /// clean end of stream looks. Running out after at least one byte is a
    /// truncated record.
    pub fn read_until_nul(&mut self) -> Result<Option<Vec<u8>>> {
        let mut buf = Vec::new();
        let offset = self.position;
        let read = self.reader.read_until(0, &mut buf)?;
        self.position += read as u64;

        if read == 0 {
            return Ok(None);
        }
        if buf.pop() != Some(0) {
            return Err(DecodeError::TruncatedStream {
                offset,
                needed: read + 1,
                available: read,
            });
        }
        Ok(Some(buf))
    }
}
