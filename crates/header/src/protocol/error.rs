use std::io;
use thiserror::Error;

/// Errors raised while cutting a byte stream into delimiter-separated tokens.
///
/// End-of-stream is not an error: it is reported as [`ScanItem::Eof`](crate::protocol::ScanItem::Eof).
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("carry buffer size {buffered} reached the limit {max_size} without finding the delimiter")]
    BufferLimitExceeded { buffered: usize, max_size: usize },

    #[error("insufficient buffered data, requested {requested} bytes but only {available} available")]
    InsufficientData { requested: usize, available: usize },

    #[error("invalid scanner config: {reason}")]
    InvalidConfig { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ScanError {
    pub fn buffer_limit_exceeded(buffered: usize, max_size: usize) -> Self {
        Self::BufferLimitExceeded { buffered, max_size }
    }

    pub fn insufficient_data(requested: usize, available: usize) -> Self {
        Self::InsufficientData { requested, available }
    }

    pub fn invalid_config<S: ToString>(str: S) -> Self {
        Self::InvalidConfig { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

/// Outcomes of [`HeaderFieldScanner::scan_field`](crate::scanner::HeaderFieldScanner::scan_field)
/// other than a parsed field.
///
/// [`FieldError::EndOfHeaderSequence`] and [`FieldError::EndOfStream`] are normal terminations,
/// see [`FieldError::is_end`].
#[derive(Error, Debug)]
pub enum FieldError {
    #[error("end of header sequence")]
    EndOfHeaderSequence,

    #[error("stream exhausted before the end of the header sequence")]
    EndOfStream,

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("continuation line without a preceding field: {line:?}")]
    UnreadFwsLine { line: String },

    #[error("scan error: {source}")]
    Scan {
        #[from]
        source: ScanError,
    },
}

impl FieldError {
    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn unread_fws_line(line: &[u8]) -> Self {
        Self::UnreadFwsLine { line: String::from_utf8_lossy(line).into_owned() }
    }

    /// Returns true if this is a clean end of the header block rather than a failure.
    #[inline]
    pub fn is_end(&self) -> bool {
        matches!(self, FieldError::EndOfHeaderSequence | FieldError::EndOfStream)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuredError {
    #[error("value is not a structured field, no '=' found")]
    NotAStructuredField,

    /// Keyless parameters are keyed by a single byte index, so at most 256 fit.
    #[error("too many keyless parameters: {count}, the limit is 256")]
    TooManyPositional { count: usize },
}

impl StructuredError {
    pub fn too_many_positional(count: usize) -> Self {
        Self::TooManyPositional { count }
    }
}
