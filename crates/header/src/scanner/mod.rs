//! Blocking scanners pulling bytes from a [`ByteSource`](crate::source::ByteSource).
//!
//! - [`DelimiterScanner`]: splits a stream into tokens around a configurable delimiter
//! - [`HeaderFieldScanner`]: reads CRLF lines through a [`DelimiterScanner`] and
//!   rebuilds folded header fields from them
//!
//! Both are single-owner objects: every call completes before the next one starts,
//! and tokens and fields come out in the order they appear in the source.

mod config;
mod delimiter_scanner;
mod field_scanner;

pub use config::{CRLF, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_BUFFER_SIZE, ScannerConfig};
pub use delimiter_scanner::{DelimiterScanner, Tokens};
pub use field_scanner::HeaderFieldScanner;
