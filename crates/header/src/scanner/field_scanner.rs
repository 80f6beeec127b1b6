//! Scanner reconstructing logical header fields from CRLF separated lines.
//!
//! A header block is a sequence of `name: value` lines closed by an empty line.
//! A value may be folded over several physical lines, each continuation line
//! starting with a space or a tab:
//!
//! ```text
//! Subject: a long\r\n
//!   subject\r\n
//! \r\n
//! ```
//!
//! Unfolding concatenates the continuation lines onto the field line with the
//! CRLF removed and nothing inserted, so the value above is `a long  subject`.
//!
//! # Lookahead
//!
//! Whether the next line continues the current field is decided by peeking at the
//! first byte already sitting in the carry buffer. If the current line ends exactly
//! where the bytes read so far end, nothing is buffered, the peek fails and the
//! field is returned without looking at the source again.

use bytes::{Bytes, BytesMut};
use memchr::memchr;
use tracing::{debug, trace};

use super::{DelimiterScanner, ScannerConfig};
use crate::protocol::{FieldError, HeaderField, HeaderFieldValue, ScanError, ScanItem};
use crate::source::ByteSource;
use crate::utils::{is_lws, trim_lws_start};

/// Reads [`HeaderField`]s one at a time from a header block.
///
/// # Example
///
/// ```
/// use micro_header::protocol::FieldError;
/// use micro_header::scanner::HeaderFieldScanner;
///
/// let input = &b"Subject: hello\r\n world\r\nX-Id: 1\r\n\r\n"[..];
/// let mut scanner = HeaderFieldScanner::new(input);
///
/// let field = scanner.scan_field().unwrap();
/// assert_eq!(field.name(), "Subject");
/// assert_eq!(field.value().as_bytes(), "hello world");
///
/// let field = scanner.scan_field().unwrap();
/// assert_eq!(field.name(), "X-Id");
///
/// assert!(matches!(scanner.scan_field(), Err(FieldError::EndOfHeaderSequence)));
/// ```
#[derive(Debug)]
pub struct HeaderFieldScanner<S> {
    scanner: DelimiterScanner<S>,
}

impl<S: ByteSource> HeaderFieldScanner<S> {
    /// Creates a scanner with the default chunk size and line size limit.
    pub fn new(source: S) -> Self {
        Self { scanner: DelimiterScanner::from_valid_config(source, ScannerConfig::default()) }
    }

    /// Creates a scanner reading `chunk_size` bytes at a time and buffering at most
    /// `max_line_size` bytes while looking for the end of a line.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidConfig`] if `chunk_size` is zero or `max_line_size`
    /// cannot hold a CRLF.
    pub fn with_limits(source: S, chunk_size: usize, max_line_size: usize) -> Result<Self, ScanError> {
        let config = ScannerConfig::default().chunk_size(chunk_size).max_buffer_size(max_line_size);
        Ok(Self { scanner: DelimiterScanner::with_config(source, config)? })
    }

    /// Reads the next logical field of the header block.
    ///
    /// # Errors
    ///
    /// - [`FieldError::EndOfHeaderSequence`] on the empty line closing the block
    /// - [`FieldError::EndOfStream`] if the source is exhausted before that line
    /// - [`FieldError::UnreadFwsLine`] on a continuation line without a field before it
    /// - [`FieldError::InvalidHeader`] on any other line without a colon
    /// - [`FieldError::Scan`] if the underlying [`DelimiterScanner`] fails; when that
    ///   happens while reading continuation lines, the field they belong to is lost
    pub fn scan_field(&mut self) -> Result<HeaderField, FieldError> {
        let line = match self.scanner.scan()? {
            ScanItem::Token(line) => line,
            ScanItem::Eof => return Err(FieldError::EndOfStream),
        };

        if line.is_empty() {
            trace!("reached end of header sequence");
            return Err(FieldError::EndOfHeaderSequence);
        }

        let Some(colon) = memchr(b':', &line) else {
            if is_lws(line[0]) {
                return Err(FieldError::unread_fws_line(&line));
            }
            return Err(FieldError::invalid_header(format!("missing colon in line {:?}", String::from_utf8_lossy(&line))));
        };

        let line = self.unfold(line)?;

        let name = line.slice(..colon);
        let value = line.slice_ref(trim_lws_start(&line[colon + 1..]));
        trace!(name = %String::from_utf8_lossy(&name), value_len = value.len(), "scanned header field");

        Ok(HeaderField::new(name, HeaderFieldValue::new(value)))
    }

    /// Appends every following continuation line to `line`.
    fn unfold(&mut self, line: Bytes) -> Result<Bytes, ScanError> {
        if !self.next_line_continues() {
            return Ok(line);
        }

        let mut folded = BytesMut::from(&line[..]);
        while self.next_line_continues() {
            match self.scanner.scan() {
                Ok(ScanItem::Token(continuation)) => folded.extend_from_slice(&continuation),
                Ok(ScanItem::Eof) => break,
                Err(e) => {
                    debug!(line = %String::from_utf8_lossy(&line), cause = %e, "dropped header field while unfolding");
                    return Err(e);
                }
            }
        }

        trace!(lines_len = folded.len(), "unfolded continuation lines");
        Ok(folded.freeze())
    }

    fn next_line_continues(&self) -> bool {
        matches!(self.scanner.peek(1), Ok([b]) if is_lws(*b))
    }
}

impl<S> HeaderFieldScanner<S> {
    /// Returns the bytes read from the source but not consumed yet.
    pub fn buffered(&self) -> &[u8] {
        self.scanner.buffered()
    }

    /// Returns a reference to the underlying source.
    pub fn get_ref(&self) -> &S {
        self.scanner.get_ref()
    }

    /// Consumes this scanner, returning the underlying line scanner, e.g. to keep
    /// reading the body that follows the header block.
    pub fn into_inner(self) -> DelimiterScanner<S> {
        self.scanner
    }
}
