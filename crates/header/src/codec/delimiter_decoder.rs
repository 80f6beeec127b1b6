//! Decoder cutting a byte buffer into tokens separated by a multi-byte delimiter.
//!
//! The decoder owns no buffer itself: it works on the carry buffer handed to it,
//! which is either the one owned by a [`DelimiterScanner`](crate::scanner::DelimiterScanner)
//! or the read buffer of a `tokio_util::codec::FramedRead`.
//!
//! # Searching
//!
//! A delimiter may straddle two reads, so the search always covers the whole
//! unconsumed region. To avoid rescanning bytes, the decoder remembers where the
//! previous unsuccessful search stopped and resumes `delimiter.len() - 1` bytes
//! before that point, which is the longest prefix of a delimiter that could still
//! be completed by newly appended bytes.

use bytes::{Bytes, BytesMut};
use memchr::memmem;
use tokio_util::codec::Decoder;
use tracing::{trace, warn};

use crate::ensure;
use crate::protocol::ScanError;

/// Decoder for delimiter-separated tokens implementing the [`Decoder`] trait.
#[derive(Debug, Clone)]
pub struct DelimiterDecoder {
    delimiter: Bytes,
    include_delimiter: bool,
    max_buffer_size: usize,
    /// Offset where the next search starts, always inside the unconsumed region
    next_index: usize,
}

impl DelimiterDecoder {
    /// Creates a new decoder.
    ///
    /// # Arguments
    ///
    /// * `delimiter` - Non-empty byte sequence separating tokens
    /// * `include_delimiter` - Whether returned tokens end with the delimiter
    /// * `max_buffer_size` - Maximum number of buffered bytes allowed without a delimiter
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidConfig`] if the delimiter is empty or does not fit
    /// into `max_buffer_size`.
    pub fn new(delimiter: impl Into<Bytes>, include_delimiter: bool, max_buffer_size: usize) -> Result<Self, ScanError> {
        let delimiter = delimiter.into();
        ensure!(!delimiter.is_empty(), ScanError::invalid_config("delimiter must not be empty"));
        ensure!(
            delimiter.len() <= max_buffer_size,
            ScanError::invalid_config(format!(
                "max buffer size {max_buffer_size} is smaller than the delimiter length {}",
                delimiter.len()
            ))
        );

        Ok(Self::new_unchecked(delimiter, include_delimiter, max_buffer_size))
    }

    /// Creates a decoder from values already checked by [`ScannerConfig::validate`](crate::scanner::ScannerConfig::validate).
    pub(crate) fn new_unchecked(delimiter: Bytes, include_delimiter: bool, max_buffer_size: usize) -> Self {
        Self { delimiter, include_delimiter, max_buffer_size, next_index: 0 }
    }

    /// Returns the delimiter separating tokens.
    pub fn delimiter(&self) -> &[u8] {
        &self.delimiter
    }

    /// Returns true if tokens end with their delimiter.
    pub fn include_delimiter(&self) -> bool {
        self.include_delimiter
    }

    /// Returns the longest token, delimiter included, this decoder accepts.
    pub fn max_buffer_size(&self) -> usize {
        self.max_buffer_size
    }

    /// Forgets the search progress, must be called whenever the buffer is cleared
    /// behind the decoder's back.
    pub fn reset(&mut self) {
        self.next_index = 0;
    }

    /// Returns the offset of the first delimiter in `src`, remembering how far the
    /// search got when none is found.
    fn find_delimiter(&mut self, src: &[u8]) -> Option<usize> {
        let start = self.next_index.min(src.len());
        match memmem::find(&src[start..], &self.delimiter) {
            Some(offset) => {
                self.next_index = 0;
                Some(start + offset)
            }
            None => {
                self.next_index = src.len().saturating_sub(self.delimiter.len() - 1);
                None
            }
        }
    }

    /// Splits the token ending at `at` off the front of `src`, consuming the delimiter.
    fn split_token(&self, src: &mut BytesMut, at: usize) -> Bytes {
        let mut token = src.split_to(at + self.delimiter.len());
        if !self.include_delimiter {
            token.truncate(at);
        }
        trace!(token_len = token.len(), remaining = src.len(), "split token");
        token.freeze()
    }

    fn limit_exceeded(&self, src: &BytesMut) -> ScanError {
        warn!(buffered = src.len(), max_size = self.max_buffer_size, "delimiter not found within buffer limit");
        ScanError::buffer_limit_exceeded(src.len(), self.max_buffer_size)
    }
}

impl Decoder for DelimiterDecoder {
    type Item = Bytes;
    type Error = ScanError;

    /// Attempts to cut one token from the front of `src`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(token))` if a delimiter was found and the token with its delimiter
    ///   fits into `max_buffer_size` bytes
    /// - `Ok(None)` if more data is needed
    /// - `Err(ScanError::BufferLimitExceeded)` if the first token is longer than
    ///   `max_buffer_size`, or `src` holds more bytes than that without a delimiter
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.find_delimiter(src) {
            Some(at) if at + self.delimiter.len() <= self.max_buffer_size => Ok(Some(self.split_token(src, at))),
            Some(_) => Err(self.limit_exceeded(src)),
            None if src.len() > self.max_buffer_size => Err(self.limit_exceeded(src)),
            None => Ok(None),
        }
    }

    /// Like [`decode`](Self::decode), but flushes the residual bytes as a final
    /// token once the stream is exhausted. The final token never carries a delimiter.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(token) = self.decode(src)? {
            return Ok(Some(token));
        }

        if src.is_empty() {
            return Ok(None);
        }

        self.next_index = 0;
        let token = src.split().freeze();
        trace!(token_len = token.len(), "flush residual token at end of stream");
        Ok(Some(token))
    }
}
