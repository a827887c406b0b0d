//! Percent-encoding for job identifiers interpolated into API paths.
//!
//! Job ids are opaque strings chosen by the server. They are encoded before
//! being placed in `/exports/{jobId}/...` so that a hostile or malformed id
//! cannot add path segments, query parameters or fragments.
//!
//! # Example
//!
//! ```
//! use coverage_client::endpoints::url_encoding::encode_path_segment;
//!
//! assert_eq!(encode_path_segment("job/1"), "job%2F1");
//! ```

use percent_encoding::{AsciiSet, CONTROLS, percent_encode};

/// Characters percent-encoded in a path segment.
///
/// RFC 3986 section 3.3 plus the separators that would otherwise change how
/// the URL is resolved (`/`, `?`, `#`) and `%` to avoid double decoding.
pub const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'|')
    .add(b'\\')
    .add(b'^')
    .add(b'%')
    .add(b'/')
    .add(b'?')
    .add(b'#')
    .add(b'+')
    .add(b';')
    .add(b'[')
    .add(b']');

/// Percent-encode a string for use as a single URL path segment.
///
/// The dot segments `.` and `..` are encoded in full, since URL
/// normalization would otherwise collapse them.
///
/// ```
/// use coverage_client::endpoints::url_encoding::encode_path_segment;
///
/// assert_eq!(encode_path_segment("7f3c-11"), "7f3c-11");
/// assert_eq!(encode_path_segment("a b"), "a%20b");
/// assert_eq!(encode_path_segment(".."), "%2E%2E");
/// ```
pub fn encode_path_segment(segment: &str) -> String {
    match segment {
        "." => "%2E".to_string(),
        ".." => "%2E%2E".to_string(),
        _ => percent_encode(segment.as_bytes(), PATH_SEGMENT_ENCODE_SET).to_string(),
    }
}
