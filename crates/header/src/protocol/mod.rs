//! Core types produced by the scanners.
//!
//! - **Scan results** ([`message`]): [`ScanItem`], a token or the end of the stream
//! - **Header fields** ([`field`]): [`HeaderField`] and [`HeaderFieldValue`], with the
//!   lazily decoded [`StructuredValue`] parameters of a value
//! - **Header blocks** ([`collection`]): [`HeaderCollection`], all fields of one block
//!   indexed by name, and [`BlockEnd`]
//! - **Errors** ([`error`]): [`ScanError`], [`FieldError`] and [`StructuredError`]

mod message;
pub use message::ScanItem;

mod field;
pub use field::HeaderField;
pub use field::HeaderFieldValue;
pub use field::StructuredValue;

mod collection;
pub use collection::BlockEnd;
pub use collection::HeaderCollection;

mod error;
pub use error::FieldError;
pub use error::ScanError;
pub use error::StructuredError;
