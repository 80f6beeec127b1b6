//! Blocking scanner turning a [`ByteSource`] into delimiter-separated tokens.
//!
//! The scanner owns a carry buffer holding bytes read from the source but not yet
//! returned in a token. Every [`DelimiterScanner::scan`] call either cuts a token
//! out of that buffer, or pulls one more chunk from the source and tries again,
//! until the source reports exhaustion. Residual bytes left at that point are
//! returned as a final token without delimiter.
//!
//! # Memory
//!
//! Each read is limited to the space left below the configured maximum. Once the
//! buffer is full without a delimiter, one more byte is requested: if the source
//! is exhausted the buffered bytes make up the final token, otherwise the scan
//! fails with [`ScanError::BufferLimitExceeded`]. The carry buffer therefore
//! never holds more than one byte past the maximum.

use std::io;
use std::io::ErrorKind;

use bytes::{Bytes, BytesMut};
use tokio_util::codec::Decoder;
use tracing::{debug, trace};

use super::ScannerConfig;
use crate::codec::DelimiterDecoder;
use crate::ensure;
use crate::protocol::{ScanError, ScanItem};
use crate::source::ByteSource;

/// Splits the bytes of a [`ByteSource`] into tokens separated by a delimiter.
///
/// # Example
///
/// ```
/// use micro_header::protocol::ScanItem;
/// use micro_header::scanner::DelimiterScanner;
///
/// let mut scanner = DelimiterScanner::new(&b"a;b;c"[..], &b";"[..]).unwrap();
///
/// assert_eq!(scanner.scan().unwrap(), ScanItem::Token("a".into()));
/// assert_eq!(scanner.scan().unwrap(), ScanItem::Token("b".into()));
/// assert_eq!(scanner.scan().unwrap(), ScanItem::Token("c".into()));
/// assert_eq!(scanner.scan().unwrap(), ScanItem::Eof);
/// ```
#[derive(Debug)]
pub struct DelimiterScanner<S> {
    source: S,
    decoder: DelimiterDecoder,
    /// Carry buffer, its length is the count of valid unconsumed bytes
    buffer: BytesMut,
    /// Fixed-size area each read from the source lands in
    transfer: Box<[u8]>,
    exhausted: bool,
}

impl<S: ByteSource> DelimiterScanner<S> {
    /// Creates a scanner splitting on `delimiter`, with every other option at its default.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidConfig`] if the delimiter is empty or too long.
    pub fn new(source: S, delimiter: impl Into<Bytes>) -> Result<Self, ScanError> {
        Self::with_config(source, ScannerConfig::default().delimiter(delimiter))
    }

    /// Creates a scanner from a full configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidConfig`] if [`ScannerConfig::validate`] fails.
    pub fn with_config(source: S, config: ScannerConfig) -> Result<Self, ScanError> {
        config.validate()?;
        Ok(Self::from_valid_config(source, config))
    }

    pub(crate) fn from_valid_config(source: S, config: ScannerConfig) -> Self {
        let ScannerConfig { delimiter, include_delimiter, chunk_size, max_buffer_size } = config;
        Self {
            source,
            decoder: DelimiterDecoder::new_unchecked(delimiter, include_delimiter, max_buffer_size),
            buffer: BytesMut::with_capacity(chunk_size.min(max_buffer_size)),
            transfer: vec![0; chunk_size].into_boxed_slice(),
            exhausted: false,
        }
    }

    /// Returns the next token, or [`ScanItem::Eof`] once the source is exhausted and
    /// the carry buffer is empty.
    ///
    /// Tokens already complete in the carry buffer are returned without touching the
    /// source. Calling `scan` again after [`ScanItem::Eof`] keeps returning it.
    ///
    /// # Errors
    ///
    /// - [`ScanError::BufferLimitExceeded`] if the next token is longer than the
    ///   maximum buffer size while the source still has data; repeated calls fail
    ///   the same way until [`reset`](Self::reset)
    /// - [`ScanError::Io`] if the source fails to read
    pub fn scan(&mut self) -> Result<ScanItem, ScanError> {
        loop {
            if self.exhausted {
                return match self.decoder.decode_eof(&mut self.buffer)? {
                    Some(token) => Ok(ScanItem::Token(token)),
                    None => Ok(ScanItem::Eof),
                };
            }

            if let Some(token) = self.decoder.decode(&mut self.buffer)? {
                return Ok(ScanItem::Token(token));
            }

            if self.fill()? == 0 {
                debug!(buffered = self.buffer.len(), "byte source exhausted");
                self.exhausted = true;
            }
        }
    }

    /// Reads one chunk from the source into the carry buffer and returns its size.
    fn fill(&mut self) -> Result<usize, ScanError> {
        // decode fails once the buffer is past the cap, a full buffer reads one byte
        let room = self.decoder.max_buffer_size().saturating_sub(self.buffer.len());
        let want = self.transfer.len().min(room).max(1);
        let buf = &mut self.transfer[..want];

        let read = loop {
            match self.source.read(buf) {
                Ok(read) => break read,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(ScanError::io(e)),
            }
        };

        ensure!(
            read <= want,
            ScanError::io(io::Error::new(ErrorKind::InvalidData, format!("source reported {read} bytes read into {want} bytes")))
        );

        self.buffer.extend_from_slice(&self.transfer[..read]);
        trace!(read, buffered = self.buffer.len(), "read chunk from source");
        Ok(read)
    }

    /// Returns the first `n` bytes of the carry buffer without consuming them.
    ///
    /// Only bytes already read from the source are inspected; this never reads more.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InsufficientData`] if fewer than `n` bytes are buffered.
    pub fn peek(&self, n: usize) -> Result<&[u8], ScanError> {
        ensure!(self.buffer.len() >= n, ScanError::insufficient_data(n, self.buffer.len()));
        Ok(&self.buffer[..n])
    }

    /// Returns an iterator over the remaining tokens.
    pub fn tokens(&mut self) -> Tokens<'_, S> {
        Tokens { scanner: self, done: false }
    }
}

impl<S> DelimiterScanner<S> {
    /// Returns the bytes read from the source but not consumed yet.
    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }

    /// Returns true once the source has reported it is exhausted.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Returns the delimiter separating tokens.
    pub fn delimiter(&self) -> &[u8] {
        self.decoder.delimiter()
    }

    /// Drops every buffered byte, e.g. to resynchronise after [`ScanError::BufferLimitExceeded`].
    pub fn reset(&mut self) {
        debug!(dropped = self.buffer.len(), "reset carry buffer");
        self.buffer.clear();
        self.decoder.reset();
    }

    /// Returns a reference to the underlying source.
    pub fn get_ref(&self) -> &S {
        &self.source
    }

    /// Consumes the scanner, returning the source and the unconsumed buffered bytes.
    pub fn into_parts(self) -> (S, Bytes) {
        (self.source, self.buffer.freeze())
    }
}

/// Iterator over the tokens of a [`DelimiterScanner`], see [`DelimiterScanner::tokens`].
///
/// Ends after the end of stream or after yielding the first error.
#[derive(Debug)]
pub struct Tokens<'a, S> {
    scanner: &'a mut DelimiterScanner<S>,
    done: bool,
}

impl<S: ByteSource> Iterator for Tokens<'_, S> {
    type Item = Result<Bytes, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.scanner.scan() {
            Ok(ScanItem::Token(token)) => Some(Ok(token)),
            Ok(ScanItem::Eof) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockByteSource;
    use mockall::Sequence;
    use std::io::Cursor;

    fn scanner(input: &'static [u8], delimiter: &'static [u8], chunk_size: usize) -> DelimiterScanner<Cursor<&'static [u8]>> {
        let config = ScannerConfig::default().delimiter(delimiter).chunk_size(chunk_size);
        DelimiterScanner::with_config(Cursor::new(input), config).unwrap()
    }

    fn token(item: ScanItem) -> Bytes {
        item.into_bytes().unwrap()
    }

    #[test]
    fn test_basic() {
        let mut scanner = scanner(b"foo\r\nbar\r\n", b"\r\n", 64);

        assert_eq!(token(scanner.scan().unwrap()), "foo");
        assert_eq!(token(scanner.scan().unwrap()), "bar");
        assert!(scanner.scan().unwrap().is_eof());
        assert!(scanner.scan().unwrap().is_eof());
    }

    #[test]
    fn test_empty_source() {
        let mut scanner = scanner(b"", b"\n", 8);
        assert!(scanner.scan().unwrap().is_eof());
        assert!(scanner.is_exhausted());
    }

    #[test]
    fn test_residual_flushed_once() {
        let mut scanner = scanner(b"a\nrest", b"\n", 3);

        assert_eq!(token(scanner.scan().unwrap()), "a");
        assert_eq!(token(scanner.scan().unwrap()), "rest");
        assert!(scanner.scan().unwrap().is_eof());
        assert!(scanner.scan().unwrap().is_eof());
    }

    #[test]
    fn test_include_delimiter() {
        let config = ScannerConfig::default().delimiter(&b"--"[..]).include_delimiter(true).chunk_size(1);
        let mut scanner = DelimiterScanner::with_config(Cursor::new(&b"x--y--z"[..]), config).unwrap();

        assert_eq!(token(scanner.scan().unwrap()), "x--");
        assert_eq!(token(scanner.scan().unwrap()), "y--");
        assert_eq!(token(scanner.scan().unwrap()), "z");
        assert!(scanner.scan().unwrap().is_eof());
    }

    #[test]
    fn test_buffered_tokens_need_no_read() {
        let mut scanner = scanner(b"1\n2\n3\n", b"\n", 64);

        assert_eq!(token(scanner.scan().unwrap()), "1");
        assert_eq!(scanner.buffered(), b"2\n3\n");
        assert_eq!(token(scanner.scan().unwrap()), "2");
        assert_eq!(scanner.buffered(), b"3\n");
    }

    #[test]
    fn test_peek_only_sees_buffered_bytes() {
        let mut scanner = scanner(b"ab\ncd\nef", b"\n", 4);

        // nothing read yet
        assert!(matches!(scanner.peek(1), Err(ScanError::InsufficientData { requested: 1, available: 0 })));

        // first read pulls "ab\nc"
        assert_eq!(token(scanner.scan().unwrap()), "ab");
        assert_eq!(scanner.peek(1).unwrap(), b"c");
        assert!(scanner.peek(2).is_err());
        assert_eq!(scanner.peek(0).unwrap(), b"");

        // peek does not consume
        assert_eq!(scanner.peek(1).unwrap(), b"c");
        assert_eq!(token(scanner.scan().unwrap()), "cd");
    }

    #[test]
    fn test_buffer_limit_and_reset() {
        let config = ScannerConfig::default().delimiter(&b"\n"[..]).chunk_size(4).max_buffer_size(8);
        let mut scanner = DelimiterScanner::with_config(Cursor::new(&b"0123456789abc\nnext\n"[..]), config).unwrap();

        // the byte read past the full buffer shows the token is too long
        let result = scanner.scan();
        assert!(matches!(result, Err(ScanError::BufferLimitExceeded { buffered: 9, max_size: 8 })));
        assert_eq!(scanner.buffered(), b"012345678");

        // still stuck until reset
        assert!(scanner.scan().is_err());

        scanner.reset();
        assert_eq!(token(scanner.scan().unwrap()), "9abc");
        assert_eq!(token(scanner.scan().unwrap()), "next");
        assert!(scanner.scan().unwrap().is_eof());
    }

    #[test]
    fn test_residual_filling_buffer_at_eof() {
        let config = ScannerConfig::default().delimiter(&b"\n"[..]).chunk_size(4).max_buffer_size(8);
        let mut scanner = DelimiterScanner::with_config(Cursor::new(&b"01234567"[..]), config).unwrap();

        assert_eq!(token(scanner.scan().unwrap()), "01234567");
        assert!(scanner.scan().unwrap().is_eof());
    }

    #[test]
    fn test_token_filling_buffer() {
        let config = ScannerConfig::default().delimiter(&b"\r\n"[..]).chunk_size(4).max_buffer_size(8);
        let mut scanner = DelimiterScanner::with_config(Cursor::new(&b"012345\r\nabc"[..]), config).unwrap();

        assert_eq!(token(scanner.scan().unwrap()), "012345");
        assert_eq!(token(scanner.scan().unwrap()), "abc");
    }

    #[test]
    fn test_delimiter_completed_past_cap() {
        let config = ScannerConfig::default().delimiter(&b"\r\n"[..]).chunk_size(4).max_buffer_size(8);
        let mut scanner = DelimiterScanner::with_config(Cursor::new(&b"0123456\r\n"[..]), config).unwrap();

        assert!(matches!(scanner.scan(), Err(ScanError::BufferLimitExceeded { buffered: 9, max_size: 8 })));
    }

    #[test]
    fn test_full_buffer_probes_source_once() {
        let mut source = MockByteSource::new();
        let mut seq = Sequence::new();
        source.expect_read().times(1).in_sequence(&mut seq).returning(|buf| {
            assert_eq!(buf.len(), 4);
            buf.copy_from_slice(b"abcd");
            Ok(4)
        });
        source.expect_read().times(1).in_sequence(&mut seq).returning(|buf| {
            assert_eq!(buf.len(), 1);
            Ok(0)
        });

        let config = ScannerConfig::default().delimiter(&b"\n"[..]).chunk_size(16).max_buffer_size(4);
        let mut scanner = DelimiterScanner::with_config(source, config).unwrap();

        assert_eq!(token(scanner.scan().unwrap()), "abcd");
        assert!(scanner.scan().unwrap().is_eof());
    }

    #[test]
    fn test_reads_never_exceed_cap() {
        let config = ScannerConfig::default().delimiter(&b"\n"[..]).chunk_size(16).max_buffer_size(6);
        let mut scanner = DelimiterScanner::with_config(Cursor::new(&b"abcde\nfg"[..]), config).unwrap();

        assert_eq!(token(scanner.scan().unwrap()), "abcde");
        assert_eq!(token(scanner.scan().unwrap()), "fg");
    }

    #[test]
    fn test_source_not_read_after_exhaustion() {
        let mut source = MockByteSource::new();
        let mut seq = Sequence::new();
        source.expect_read().times(1).in_sequence(&mut seq).returning(|buf| {
            buf[..3].copy_from_slice(b"a\nb");
            Ok(3)
        });
        source.expect_read().times(1).in_sequence(&mut seq).returning(|_| Ok(0));

        let mut scanner = DelimiterScanner::new(source, &b"\n"[..]).unwrap();

        assert_eq!(token(scanner.scan().unwrap()), "a");
        assert_eq!(token(scanner.scan().unwrap()), "b");
        assert!(scanner.scan().unwrap().is_eof());
        assert!(scanner.scan().unwrap().is_eof());
    }

    #[test]
    fn test_interrupted_read_is_retried() {
        let mut source = MockByteSource::new();
        let mut seq = Sequence::new();
        source
            .expect_read()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(io::Error::from(ErrorKind::Interrupted)));
        source.expect_read().times(1).in_sequence(&mut seq).returning(|buf| {
            buf[..2].copy_from_slice(b"x\n");
            Ok(2)
        });

        let mut scanner = DelimiterScanner::new(source, &b"\n"[..]).unwrap();
        assert_eq!(token(scanner.scan().unwrap()), "x");
    }

    #[test]
    fn test_io_error_is_returned() {
        let mut source = MockByteSource::new();
        source.expect_read().returning(|_| Err(io::Error::from(ErrorKind::ConnectionReset)));

        let mut scanner = DelimiterScanner::new(source, &b"\n"[..]).unwrap();
        assert!(matches!(scanner.scan(), Err(ScanError::Io { .. })));
    }

    #[test]
    fn test_over_reporting_source_is_rejected() {
        let mut source = MockByteSource::new();
        source.expect_read().returning(|buf| Ok(buf.len() + 1));

        let mut scanner = DelimiterScanner::new(source, &b"\n"[..]).unwrap();
        assert!(matches!(scanner.scan(), Err(ScanError::Io { .. })));
    }

    #[test]
    fn test_tokens_iterator() {
        let mut scanner = scanner(b"a,b,,c", b",", 2);
        let tokens: Vec<Bytes> = scanner.tokens().collect::<Result<_, _>>().unwrap();
        assert_eq!(tokens, vec![Bytes::from("a"), Bytes::from("b"), Bytes::new(), Bytes::from("c")]);
    }

    #[test]
    fn test_into_parts_keeps_unconsumed_bytes() {
        let mut scanner = scanner(b"head\r\n\r\nbody bytes", b"\r\n", 64);

        assert_eq!(token(scanner.scan().unwrap()), "head");
        assert_eq!(token(scanner.scan().unwrap()), "");

        let (_source, rest) = scanner.into_parts();
        assert_eq!(rest, "body bytes");
    }
}
