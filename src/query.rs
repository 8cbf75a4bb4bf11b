//! Query component extraction.
//!
//! Simple extraction only: pairs are split on `&` and at the first `=`, in
//! request order, duplicates preserved. No percent-decoding is applied.

/// Parses a raw query component into ordered `(name, value)` pairs.
///
/// A segment without `=` becomes a pair with an empty value; empty segments
/// (from `&&` or a trailing `&`) are skipped.
///
/// # Example
///
/// ```
/// use minihttp::query;
///
/// let pairs = query::parse("q=rust&page=2&flag");
/// assert_eq!(pairs[0], ("q".to_string(), "rust".to_string()));
/// assert_eq!(pairs[2], ("flag".to_string(), String::new()));
/// ```
#[must_use]
pub fn parse(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|segment| !segment.is_empty())
        .map(|segment| match segment.split_once('=') {
            Some((name, value)) => (name.to_string(), value.to_string()),
            None => (segment.to_string(), String::new()),
        })
        .collect()
}
