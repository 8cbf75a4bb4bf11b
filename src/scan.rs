//! Byte-pattern scanner.
//!
//! The framing primitive under the request parser: a bounded, naive
//! subsequence search. The buffer is capped at [`crate::READ_LIMIT`] bytes,
//! so the O(n·m) scan is fine and keeps the bound handling obvious.

/// Returns the first offset `>= start` at which `needle` occurs in full
/// inside `haystack`, with the match ending at or before `bound`.
///
/// Bytes at or past `bound` are never inspected, even when the haystack is
/// longer. An empty needle never matches.
///
/// # Example
///
/// ```
/// use minihttp::scan::find;
///
/// let buffer = b"GET / HTTP/1.1\r\nHost: x\r\n\r\n";
/// assert_eq!(find(buffer, b"\r\n", 0, buffer.len()), Some(14));
/// assert_eq!(find(buffer, b"\r\n\r\n", 16, buffer.len()), Some(23));
/// ```
#[must_use]
pub fn find(haystack: &[u8], needle: &[u8], start: usize, bound: usize) -> Option<usize> {
    let bound = bound.min(haystack.len());
    if needle.is_empty() || start >= bound || needle.len() > bound - start {
        return None;
    }

    let last = bound - needle.len();
    (start..=last).find(|&offset| &haystack[offset..offset + needle.len()] == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ========================================================================
    // Basic Matching
    // ========================================================================

    #[test]
    fn finds_first_occurrence() {
        let buffer = b"abcabc";
        assert_eq!(find(buffer, b"abc", 0, buffer.len()), Some(0));
    }

    #[test]
    fn finds_occurrence_after_start() {
        let buffer = b"abcabc";
        assert_eq!(find(buffer, b"abc", 1, buffer.len()), Some(3));
    }

    #[test]
    fn finds_crlf_in_request_line() {
        let buffer = b"GET / HTTP/1.1\r\nHost: x\r\n\r\n";
        assert_eq!(find(buffer, b"\r\n", 0, buffer.len()), Some(14));
    }

    #[test]
    fn missing_needle_is_none() {
        assert_eq!(find(b"abcdef", b"xyz", 0, 6), None);
    }

    #[test]
    fn empty_needle_is_none() {
        assert_eq!(find(b"abc", b"", 0, 3), None);
    }

    #[test]
    fn empty_haystack_is_none() {
        assert_eq!(find(b"", b"a", 0, 0), None);
    }

    // ========================================================================
    // Bound Handling
    // ========================================================================

    #[test]
    fn match_must_end_within_bound() {
        let buffer = b"xx\r\n";
        // The needle is present, but its last byte sits at the bound.
        assert_eq!(find(buffer, b"\r\n", 0, 3), None);
        assert_eq!(find(buffer, b"\r\n", 0, 4), Some(2));
    }

    #[test]
    fn bound_larger_than_haystack_is_clamped() {
        let buffer = b"ab\r\n";
        assert_eq!(find(buffer, b"\r\n", 0, 4096), Some(2));
    }

    #[test]
    fn start_at_or_past_bound_is_none() {
        let buffer = b"\r\n\r\n";
        assert_eq!(find(buffer, b"\r\n", 4, 4), None);
        assert_eq!(find(buffer, b"\r\n", 7, 4), None);
    }

    #[test]
    fn needle_longer_than_window_is_none() {
        assert_eq!(find(b"abc", b"abcd", 0, 3), None);
    }

    // ========================================================================
    // Properties
    // ========================================================================

    fn naive(haystack: &[u8], needle: &[u8], start: usize, bound: usize) -> Option<usize> {
        let bound = bound.min(haystack.len());
        if needle.is_empty() {
            return None;
        }
        let mut offset = start;
        while offset + needle.len() <= bound {
            if &haystack[offset..offset + needle.len()] == needle {
                return Some(offset);
            }
            offset += 1;
        }
        None
    }

    proptest! {
        #[test]
        fn agrees_with_reference_scan(
            haystack in proptest::collection::vec(0u8..4, 0..64),
            needle in proptest::collection::vec(0u8..4, 1..5),
            start in 0usize..70,
            bound in 0usize..70,
        ) {
            prop_assert_eq!(
                find(&haystack, &needle, start, bound),
                naive(&haystack, &needle, start, bound)
            );
        }

        #[test]
        fn match_always_lies_inside_window(
            haystack in proptest::collection::vec(0u8..4, 0..64),
            needle in proptest::collection::vec(0u8..4, 1..5),
            start in 0usize..70,
            bound in 0usize..70,
        ) {
            if let Some(offset) = find(&haystack, &needle, start, bound) {
                prop_assert!(offset >= start);
                prop_assert!(offset + needle.len() <= bound.min(haystack.len()));
                prop_assert_eq!(&haystack[offset..offset + needle.len()], &needle[..]);
            }
        }
    }
}
