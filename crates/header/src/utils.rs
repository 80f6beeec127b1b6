//! Utility macros and functions for the header crate.

/// Returns early with an error if a condition is not met.
///
/// Works like `assert!`, but returns `Err($error)` instead of panicking.
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;

/// Linear whitespace: space or horizontal tab.
#[inline]
pub(crate) fn is_lws(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

/// Strips leading linear whitespace.
pub(crate) fn trim_lws_start(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| !is_lws(*b)).unwrap_or(bytes.len());
    &bytes[start..]
}
