//! UTF-16 key encoding helpers.
//!
//! The tree stores keys as sequences of 16-bit code units. Callers holding
//! `&str` data encode through these helpers; lookups use a stack buffer so
//! short keys never touch the heap.

use smallvec::SmallVec;

/// Stack buffer for encoded lookup keys; most keys fit inline.
pub(crate) type KeyBuf = SmallVec<[u16; 32]>;

/// Encode a `&str` as the UTF-16 code units the tree stores.
///
/// Supplementary-plane characters become surrogate pairs, so the result can
/// be longer than `key.chars().count()`.
pub fn encode_key(key: &str) -> Vec<u16> {
    key.encode_utf16().collect()
}

/// Encode into a stack-allocated buffer for allocation-free lookups.
pub(crate) fn encode_key_buf(key: &str) -> KeyBuf {
    key.encode_utf16().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii() {
        assert_eq!(encode_key("abc"), vec![97, 98, 99]);
        assert_eq!(encode_key(""), Vec::<u16>::new());
    }

    #[test]
    fn test_surrogate_pairs() {
        // One supplementary-plane character is two code units.
        let units = encode_key("\u{1F600}");
        assert_eq!(units.len(), 2);
        assert_eq!(units[0], 0xD83D);
        assert_eq!(units[1], 0xDE00);
    }

    #[test]
    fn test_buf_stays_inline_for_short_keys() {
        let buf = encode_key_buf("short key");
        assert!(!buf.spilled());
        assert_eq!(&buf[..], encode_key("short key").as_slice());
    }
}
