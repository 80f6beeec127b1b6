//! The byte source feeding a [`DelimiterScanner`](crate::scanner::DelimiterScanner).
//!
//! A source only has to fill a buffer on demand and report how many bytes it
//! wrote. Every [`std::io::Read`] is a source, so files, sockets, cursors and
//! byte slices can be scanned directly.

use std::io;
use std::io::Read;

/// A blocking supplier of raw bytes.
///
/// `Ok(0)` means the source is exhausted. The scanner treats it as permanent and
/// never calls [`ByteSource::read`] again afterwards, so a source must not use
/// `0` to signal "no data yet".
#[cfg_attr(test, mockall::automock)]
pub trait ByteSource {
    /// Fills `buf` with up to `buf.len()` bytes and returns the count written.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

impl<R: Read> ByteSource for R {
    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Read::read(self, buf)
    }
}
