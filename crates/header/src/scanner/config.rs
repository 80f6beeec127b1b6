use bytes::Bytes;

use crate::ensure;
use crate::protocol::ScanError;

/// Default number of bytes pulled from the source per read
pub const DEFAULT_CHUNK_SIZE: usize = 4 * 1024;

/// Default maximum size of the carry buffer before a scan fails
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 64 * 1024;

/// Record delimiter of header blocks
pub const CRLF: &[u8] = b"\r\n";

/// Configuration of a [`DelimiterScanner`](super::DelimiterScanner).
///
/// ```
/// use micro_header::scanner::ScannerConfig;
///
/// let config = ScannerConfig::default()
///     .delimiter(&b"\n"[..])
///     .include_delimiter(true)
///     .chunk_size(512)
///     .max_buffer_size(8 * 1024);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerConfig {
    pub(crate) delimiter: Bytes,
    pub(crate) include_delimiter: bool,
    pub(crate) chunk_size: usize,
    pub(crate) max_buffer_size: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            delimiter: Bytes::from_static(CRLF),
            include_delimiter: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
        }
    }
}

impl ScannerConfig {
    #[must_use]
    pub fn delimiter(mut self, delimiter: impl Into<Bytes>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    #[must_use]
    pub fn include_delimiter(mut self, include_delimiter: bool) -> Self {
        self.include_delimiter = include_delimiter;
        self
    }

    #[must_use]
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    #[must_use]
    pub fn max_buffer_size(mut self, max_buffer_size: usize) -> Self {
        self.max_buffer_size = max_buffer_size;
        self
    }

    /// Checks the configuration can drive a scanner.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidConfig`] if:
    /// - the delimiter is empty
    /// - the chunk size is zero
    /// - the max buffer size cannot hold a single delimiter
    pub fn validate(&self) -> Result<(), ScanError> {
        ensure!(!self.delimiter.is_empty(), ScanError::invalid_config("delimiter must not be empty"));
        ensure!(self.chunk_size > 0, ScanError::invalid_config("chunk size must be greater than 0"));
        ensure!(
            self.max_buffer_size >= self.delimiter.len(),
            ScanError::invalid_config(format!(
                "max buffer size {} is smaller than the delimiter length {}",
                self.max_buffer_size,
                self.delimiter.len()
            ))
        );
        Ok(())
    }
}
