use bytes::Bytes;

/// Represents one result of a successful scan.
///
/// A scan either produces a token, which may be empty, or signals that the
/// underlying source is exhausted and nothing is left in the carry buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanItem {
    /// A token cut from the stream, owned by the caller
    Token(Bytes),
    /// Marks the end of the stream
    Eof,
}

impl ScanItem {
    /// Returns true if this item represents the end of the stream
    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self, ScanItem::Eof)
    }

    /// Returns true if this item contains a token
    #[inline]
    pub fn is_token(&self) -> bool {
        matches!(self, ScanItem::Token(_))
    }

    /// Returns a reference to the contained bytes if this is a Token
    ///
    /// Returns None if this is an EOF marker
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            ScanItem::Token(bytes) => Some(bytes),
            ScanItem::Eof => None,
        }
    }

    /// Consumes the item and returns the contained bytes if this is a Token
    ///
    /// Returns None if this is an EOF marker
    pub fn into_bytes(self) -> Option<Bytes> {
        match self {
            ScanItem::Token(bytes) => Some(bytes),
            ScanItem::Eof => None,
        }
    }
}

impl From<Bytes> for ScanItem {
    fn from(bytes: Bytes) -> Self {
        Self::Token(bytes)
    }
}
