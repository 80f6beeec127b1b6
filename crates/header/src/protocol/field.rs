//! Header fields and their values.
//!
//! A [`HeaderFieldValue`] keeps the unfolded raw value exactly as read. It can be
//! decoded on demand into a [`StructuredValue`], the semicolon separated parameter
//! list used by values such as `Content-Type` or `Content-Disposition`:
//!
//! ```text
//! text/plain; size="1024909"; name="wololo.txt"
//! ```
//!
//! Each `key=value` segment is keyed by its textual key. A segment without `=`
//! is keyed by a single byte holding its index among the keyless segments, so
//! the leading `text/plain` above is stored under the key `[0]`. Such a key can
//! collide with a textual key made of that same byte; the later segment wins.

use std::collections::HashMap;
use std::collections::hash_map;
use std::str::Utf8Error;

use bytes::Bytes;
use memchr::memchr;
use once_cell::unsync::OnceCell;

use crate::ensure;
use crate::protocol::StructuredError;
use crate::utils::trim_lws_start;

/// One logical header field: the raw name and its unfolded value.
///
/// Names are kept byte for byte, no case normalization is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderField {
    name: Bytes,
    value: HeaderFieldValue,
}

impl HeaderField {
    /// Creates a field from its name and value.
    pub fn new(name: impl Into<Bytes>, value: impl Into<HeaderFieldValue>) -> Self {
        Self { name: name.into(), value: value.into() }
    }

    /// Returns the field name as read, up to the first colon.
    pub fn name(&self) -> &Bytes {
        &self.name
    }

    /// Returns the unfolded field value.
    pub fn value(&self) -> &HeaderFieldValue {
        &self.value
    }

    /// Consumes the field, returning its name and value.
    pub fn into_parts(self) -> (Bytes, HeaderFieldValue) {
        (self.name, self.value)
    }
}

/// The value of a header field, with a lazily decoded structured view.
///
/// The raw value never changes after construction, so the structured view is
/// computed at most once and then returned from cache.
#[derive(Debug, Clone)]
pub struct HeaderFieldValue {
    raw: Bytes,
    structured: OnceCell<StructuredValue>,
}

impl HeaderFieldValue {
    /// Wraps a raw, already unfolded value.
    pub fn new(raw: impl Into<Bytes>) -> Self {
        Self { raw: raw.into(), structured: OnceCell::new() }
    }

    /// Returns the unstructured value.
    pub fn as_bytes(&self) -> &Bytes {
        &self.raw
    }

    /// Returns the unstructured value as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns [`Utf8Error`] if the value is not valid UTF-8.
    pub fn to_str(&self) -> Result<&str, Utf8Error> {
        std::str::from_utf8(&self.raw)
    }

    /// Returns true if the value holds at least one `key=value` parameter.
    pub fn is_structured(&self) -> bool {
        memchr(b'=', &self.raw).is_some()
    }

    /// Decodes the value into its semicolon separated parameters.
    ///
    /// The first successful decode is cached; later calls return the same mapping.
    ///
    /// # Errors
    ///
    /// - [`StructuredError::NotAStructuredField`] if the value contains no `=`
    /// - [`StructuredError::TooManyPositional`] if more than 256 segments have no key
    pub fn as_structured(&self) -> Result<&StructuredValue, StructuredError> {
        self.structured.get_or_try_init(|| StructuredValue::parse(&self.raw))
    }

    /// Parses the value as a media type, e.g. the value of a `Content-Type` field.
    pub fn to_mime(&self) -> Option<mime::Mime> {
        self.to_str().ok()?.parse().ok()
    }
}

impl PartialEq for HeaderFieldValue {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for HeaderFieldValue {}

impl From<Bytes> for HeaderFieldValue {
    fn from(raw: Bytes) -> Self {
        Self::new(raw)
    }
}

impl From<&'static str> for HeaderFieldValue {
    fn from(raw: &'static str) -> Self {
        Self::new(raw)
    }
}

impl From<&'static [u8]> for HeaderFieldValue {
    fn from(raw: &'static [u8]) -> Self {
        Self::new(raw)
    }
}

/// Parameters decoded from a structured header value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredValue {
    params: HashMap<Bytes, Bytes>,
}

impl StructuredValue {
    fn parse(raw: &Bytes) -> Result<Self, StructuredError> {
        ensure!(memchr(b'=', raw).is_some(), StructuredError::NotAStructuredField);

        let mut params = HashMap::new();
        let mut positional = 0_usize;

        for segment in raw.split(|b| *b == b';') {
            let segment = trim_lws_start(segment);
            if segment.is_empty() {
                continue;
            }

            if let Some(eq) = memchr(b'=', segment) {
                params.insert(raw.slice_ref(&segment[..eq]), raw.slice_ref(&segment[eq + 1..]));
            } else {
                let key = Self::positional_key(positional).ok_or_else(|| StructuredError::too_many_positional(positional + 1))?;
                params.insert(key, raw.slice_ref(segment));
                positional += 1;
            }
        }

        Ok(Self { params })
    }

    /// The synthetic key of the `index`-th segment without `=`.
    pub fn positional_key(index: usize) -> Option<Bytes> {
        let index = u8::try_from(index).ok()?;
        Some(Bytes::copy_from_slice(&[index]))
    }

    /// Returns the value of a `key=value` parameter. The value is kept verbatim,
    /// surrounding quotes included.
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<&Bytes> {
        self.params.get(key.as_ref())
    }

    /// Returns the `index`-th parameter that had no `=`.
    pub fn positional(&self, index: usize) -> Option<&Bytes> {
        let index = u8::try_from(index).ok()?;
        self.params.get(&[index][..])
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, Bytes, Bytes> {
        self.params.iter()
    }
}

impl<'a> IntoIterator for &'a StructuredValue {
    type Item = (&'a Bytes, &'a Bytes);
    type IntoIter = hash_map::Iter<'a, Bytes, Bytes>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_content_type() {
        let value = HeaderFieldValue::new(r#"text/plain; size="1024909"; name="wololo.txt""#);
        let structured = value.as_structured().unwrap();

        assert_eq!(structured.len(), 3);
        assert_eq!(structured.positional(0).unwrap(), "text/plain");
        assert_eq!(structured.get(&[0_u8][..]).unwrap(), "text/plain");
        assert_eq!(structured.get("size").unwrap(), r#""1024909""#);
        assert_eq!(structured.get("name").unwrap(), r#""wololo.txt""#);
    }

    #[test]
    fn not_structured_without_equals() {
        let value = HeaderFieldValue::new("text/plain; charset");
        assert!(!value.is_structured());
        assert_eq!(value.as_structured(), Err(StructuredError::NotAStructuredField));
    }

    #[test]
    fn structured_is_memoized() {
        let value = HeaderFieldValue::new("a=1; b=2");
        let first: *const StructuredValue = value.as_structured().unwrap();
        let second: *const StructuredValue = value.as_structured().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn positional_segments_are_counted_separately() {
        let value = HeaderFieldValue::new("form-data; inline; name=\"file\"; attachment");
        let structured = value.as_structured().unwrap();

        assert_eq!(structured.positional(0).unwrap(), "form-data");
        assert_eq!(structured.positional(1).unwrap(), "inline");
        assert_eq!(structured.positional(2).unwrap(), "attachment");
        assert_eq!(structured.get("name").unwrap(), "\"file\"");
        assert!(structured.positional(3).is_none());
    }

    #[test]
    fn value_split_on_first_equals() {
        let value = HeaderFieldValue::new("token=a=b==;k=");
        let structured = value.as_structured().unwrap();

        assert_eq!(structured.get("token").unwrap(), "a=b==");
        assert_eq!(structured.get("k").unwrap(), "");
    }

    #[test]
    fn only_leading_whitespace_is_trimmed() {
        let value = HeaderFieldValue::new("a=1 ;\t b = 2");
        let structured = value.as_structured().unwrap();

        assert_eq!(structured.get("a").unwrap(), "1 ");
        assert_eq!(structured.get("b ").unwrap(), " 2");
    }

    #[test]
    fn empty_segments_are_skipped() {
        let value = HeaderFieldValue::new("text/html;; charset=utf-8;");
        let structured = value.as_structured().unwrap();

        assert_eq!(structured.len(), 2);
        assert_eq!(structured.positional(0).unwrap(), "text/html");
        assert_eq!(structured.get("charset").unwrap(), "utf-8");
    }

    #[test]
    fn positional_key_collides_with_textual_key() {
        let value = HeaderFieldValue::new(Bytes::from_static(b"first; \x00=second"));
        let structured = value.as_structured().unwrap();

        assert_eq!(structured.len(), 1);
        assert_eq!(structured.positional(0).unwrap(), "second");
    }

    #[test]
    fn too_many_positional_segments() {
        let raw = format!("{}k=v", "p;".repeat(257));
        let value = HeaderFieldValue::new(raw);

        assert_eq!(value.as_structured(), Err(StructuredError::TooManyPositional { count: 257 }));
    }

    #[test]
    fn value_to_mime() {
        let value = HeaderFieldValue::new("text/plain; charset=utf-8");
        let mime = value.to_mime().unwrap();

        assert_eq!(mime.type_(), mime::TEXT);
        assert_eq!(mime.subtype(), mime::PLAIN);
        assert_eq!(mime.get_param(mime::CHARSET), Some(mime::UTF_8));

        assert!(HeaderFieldValue::new("not a mime").to_mime().is_none());
    }
}
