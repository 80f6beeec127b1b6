//! Codec module for cutting byte streams into tokens
//!
//! - [`DelimiterDecoder`]: finds a multi-byte delimiter in a carry buffer and splits
//!   one token off its front, flushing the residual bytes at end of stream
//!
//! The decoder implements [`tokio_util::codec::Decoder`], so besides backing the
//! blocking [`DelimiterScanner`](crate::scanner::DelimiterScanner) it can be wrapped
//! in a `FramedRead` to tokenize any `AsyncRead`.
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use micro_header::codec::DelimiterDecoder;
//! use tokio_util::codec::Decoder;
//!
//! let mut decoder = DelimiterDecoder::new(&b"\r\n"[..], false, 1024).unwrap();
//! let mut buffer = BytesMut::from(&b"Subject: hi\r\nrest"[..]);
//!
//! let token = decoder.decode(&mut buffer).unwrap().unwrap();
//! assert_eq!(&token[..], b"Subject: hi");
//! assert_eq!(&buffer[..], b"rest");
//! ```

mod delimiter_decoder;

pub use delimiter_decoder::DelimiterDecoder;
