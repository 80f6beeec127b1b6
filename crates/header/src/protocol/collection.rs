//! Aggregation of the fields of one header block.

use std::collections::HashMap;

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue};
use tracing::debug;

use crate::protocol::{FieldError, HeaderField, HeaderFieldValue};
use crate::scanner::HeaderFieldScanner;
use crate::source::ByteSource;

/// How a header block ended when it was read without error.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BlockEnd {
    /// The block was closed by an empty line
    Blank,
    /// The source was exhausted before an empty line
    EndOfStream,
}

/// Header fields indexed by name.
///
/// Every value of a name is kept, in the order it was added. Names are compared
/// byte for byte, so `Content-Type` and `content-type` are different fields.
#[derive(Debug, Clone, Default)]
pub struct HeaderCollection {
    fields: HashMap<Bytes, Vec<HeaderFieldValue>>,
    len: usize,
}

impl HeaderCollection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a whole header block from `source`.
    ///
    /// # Errors
    ///
    /// Returns the first [`FieldError`] that is not a clean end of the block.
    pub fn scan_all_from_stream<S: ByteSource>(source: S) -> Result<Self, FieldError> {
        let mut scanner = HeaderFieldScanner::new(source);
        let mut headers = Self::new();
        headers.scan_all(&mut scanner)?;
        Ok(headers)
    }

    /// Adds every field `scanner` yields until the header block ends.
    ///
    /// Fields read before an error stay in the collection.
    ///
    /// # Returns
    ///
    /// - `Ok(BlockEnd::Blank)` if the block was closed by an empty line
    /// - `Ok(BlockEnd::EndOfStream)` if the source ran out first
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::InvalidHeader`], [`FieldError::UnreadFwsLine`] or
    /// [`FieldError::Scan`] when the block is malformed or cannot be read.
    pub fn scan_all<S: ByteSource>(&mut self, scanner: &mut HeaderFieldScanner<S>) -> Result<BlockEnd, FieldError> {
        loop {
            match scanner.scan_field() {
                Ok(field) => self.put_field(field),
                Err(FieldError::EndOfHeaderSequence) => return Ok(BlockEnd::Blank),
                Err(FieldError::EndOfStream) => return Ok(BlockEnd::EndOfStream),
                Err(e) => {
                    debug!(fields = self.len, cause = %e, "stop reading header block");
                    return Err(e);
                }
            }
        }
    }

    /// Appends `value` to the values of `name`.
    pub fn put(&mut self, name: impl Into<Bytes>, value: impl Into<HeaderFieldValue>) {
        self.fields.entry(name.into()).or_default().push(value.into());
        self.len += 1;
    }

    /// Appends the value of `field` to the values of its name.
    pub fn put_field(&mut self, field: HeaderField) {
        let (name, value) = field.into_parts();
        self.put(name, value);
    }

    /// Returns every value of `name`, in insertion order.
    pub fn get(&self, name: impl AsRef<[u8]>) -> Option<&[HeaderFieldValue]> {
        self.fields.get(name.as_ref()).map(Vec::as_slice)
    }

    /// Returns the first value of `name`.
    pub fn get_first(&self, name: impl AsRef<[u8]>) -> Option<&HeaderFieldValue> {
        self.get(name).and_then(<[HeaderFieldValue]>::first)
    }

    /// Returns true if at least one value of `name` was added.
    pub fn contains(&self, name: impl AsRef<[u8]>) -> bool {
        self.fields.contains_key(name.as_ref())
    }

    /// Returns the number of values, counting every value of a repeated name.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns the number of distinct names.
    pub fn names_len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the collection holds no value.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates over every `(name, value)` pair. Values of one name come in insertion
    /// order, the order of distinct names is unspecified.
    pub fn iter(&self) -> impl Iterator<Item = (&Bytes, &HeaderFieldValue)> {
        self.fields.iter().flat_map(|(name, values)| values.iter().map(move |value| (name, value)))
    }

    /// Converts the collection into an [`http::HeaderMap`].
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::InvalidHeader`] if a name or value is not valid for `http`.
    pub fn to_header_map(&self) -> Result<HeaderMap, FieldError> {
        let mut map = HeaderMap::with_capacity(self.len);
        for (name, value) in self.iter() {
            let header_name = HeaderName::from_bytes(name)
                .map_err(|e| FieldError::invalid_header(format!("{e}: {:?}", String::from_utf8_lossy(name))))?;
            let header_value = HeaderValue::from_maybe_shared(value.as_bytes().clone())
                .map_err(|e| FieldError::invalid_header(format!("{e}: value of {header_name}")))?;
            map.append(header_name, header_value);
        }
        Ok(map)
    }
}

impl FromIterator<HeaderField> for HeaderCollection {
    fn from_iter<T: IntoIterator<Item = HeaderField>>(iter: T) -> Self {
        let mut headers = Self::new();
        for field in iter {
            headers.put_field(field);
        }
        headers
    }
}
