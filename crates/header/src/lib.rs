//! A streaming delimiter scanner and folded header block parser
//!
//! This crate cuts an arbitrary byte stream into records separated by a
//! multi-byte delimiter, and builds on top of it a parser for line-folded header
//! blocks as found in MIME parts, mail messages and similar formats.
//!
//! # Features
//!
//! - Delimiters of any length, found even when they straddle two reads
//! - Bounded memory: a token longer than a configured limit fails instead of growing the buffer
//! - Non-destructive lookahead over already buffered bytes
//! - Residual bytes flushed as a final token at end of stream
//! - Unfolding of continuation lines into one logical header value
//! - Lazy, memoized decoding of `key=value; ...` structured values
//!
//! # Example
//!
//! ```
//! use micro_header::protocol::{BlockEnd, HeaderCollection};
//! use micro_header::scanner::HeaderFieldScanner;
//!
//! let input = &b"Content-Type: text/plain;\r\n charset=utf-8\r\nX-Tag: a\r\nX-Tag: b\r\n\r\nbody"[..];
//!
//! let mut scanner = HeaderFieldScanner::new(input);
//! let mut headers = HeaderCollection::new();
//! assert_eq!(headers.scan_all(&mut scanner).unwrap(), BlockEnd::Blank);
//!
//! let content_type = headers.get_first("Content-Type").unwrap();
//! assert_eq!(content_type.as_bytes(), "text/plain; charset=utf-8");
//!
//! let params = content_type.as_structured().unwrap();
//! assert_eq!(params.positional(0).unwrap(), "text/plain");
//! assert_eq!(params.get("charset").unwrap(), "utf-8");
//!
//! assert_eq!(headers.get("X-Tag").unwrap().len(), 2);
//!
//! // the body is still buffered in the scanner
//! assert_eq!(scanner.buffered(), b"body");
//! ```
//!
//! # Architecture
//!
//! - [`source`]: the [`ByteSource`](source::ByteSource) contract, implemented by every `std::io::Read`
//! - [`codec`]: the [`DelimiterDecoder`](codec::DelimiterDecoder) doing the search and split work
//! - [`scanner`]: the blocking [`DelimiterScanner`](scanner::DelimiterScanner) and
//!   [`HeaderFieldScanner`](scanner::HeaderFieldScanner)
//! - [`protocol`]: tokens, header fields, header collections and errors
//!
//! # Error Handling
//!
//! - [`protocol::ScanError`]: tokenizer errors, buffer limit and I/O
//! - [`protocol::FieldError`]: header field errors, including the end of a header block
//! - [`protocol::StructuredError`]: structured value decoding errors
//!
//! # Limitations
//!
//! - Single-threaded: one scanner serves one consumer, reads block without timeout
//! - Lookahead for folded lines only sees bytes already read from the source
//! - Header names are compared byte for byte, without case folding

pub mod codec;
pub mod protocol;
pub mod scanner;
pub mod source;

mod utils;
pub(crate) use utils::ensure;
