//! Fixed-time byte comparison.

use std::hint::black_box;

/// Compare two byte slices in time independent of where they first differ.
///
/// Every byte pair is visited and the differences are OR-folded, so a guess
/// that matches a long prefix takes exactly as long as one that matches
/// nothing. Length is not treated as secret: slices of different length
/// compare unequal immediately.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= black_box(x ^ y);
    }

    black_box(diff) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_slices() {
        assert!(constant_time_eq(b"same digest", b"same digest"));
    }

    #[test]
    fn test_empty_slices() {
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    fn test_differ_in_first_byte() {
        assert!(!constant_time_eq(b"xbcdef", b"abcdef"));
    }

    #[test]
    fn test_differ_in_last_byte() {
        assert!(!constant_time_eq(b"abcdex", b"abcdef"));
    }

    #[test]
    fn test_length_mismatch() {
        assert!(!constant_time_eq(b"abc", b"abcd"));
        assert!(!constant_time_eq(b"abcd", b""));
    }

    #[test]
    fn test_single_bit_difference() {
        let a = [0u8; 32];
        let mut b = [0u8; 32];
        b[17] = 0x01;
        assert!(!constant_time_eq(&a, &b));
    }
}
