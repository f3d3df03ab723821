// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Byte-slice helpers for integer marshalling.

use num_bigint::{BigInt, Sign};

/// Big-endian magnitude bytes for each integer.
pub fn bigints_to_bytes(big_ints: &[&BigInt]) -> Vec<Vec<u8>> {
    big_ints.iter().map(|n| n.to_bytes_be().1).collect()
}

/// Interprets each byte vector as a big-endian unsigned integer.
pub fn multi_bytes_to_bigints(bytes: &[Vec<u8>]) -> Vec<BigInt> {
    bytes.iter().map(|bz| BigInt::from_bytes_be(Sign::Plus, bz)).collect()
}

pub fn non_empty_bytes(bz: &[u8]) -> bool {
    !bz.is_empty()
}

/// True when the outer slice is non-empty, every inner slice is non-empty,
/// and the outer length matches `expect_len` when given.
pub fn non_empty_multi_bytes(bzs: &[Vec<u8>], expect_len: Option<usize>) -> bool {
    if bzs.is_empty() {
        return false;
    }
    if let Some(expected) = expect_len {
        if bzs.len() != expected {
            return false;
        }
    }
    bzs.iter().all(|bz| non_empty_bytes(bz))
}

/// Left-pads `src` with zero bytes up to `length`.
pub fn pad_to_length_bytes(src: &[u8], length: usize) -> Vec<u8> {
    if src.len() >= length {
        return src.to_vec();
    }
    let mut result = vec![0u8; length - src.len()];
    result.extend_from_slice(src);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;

    #[test]
    fn test_bigint_bytes_round_trip() {
        let nums = vec![
            BigInt::from(12345u64),
            BigInt::zero(),
            BigInt::parse_bytes(b"ABCDEF", 16).unwrap(),
        ];
        let refs: Vec<&BigInt> = nums.iter().collect();
        let bytes = bigints_to_bytes(&refs);
        assert_eq!(multi_bytes_to_bigints(&bytes), nums);
    }

    #[test]
    fn test_non_empty_multi_bytes() {
        let ok = vec![vec![1u8], vec![2, 3]];
        assert!(non_empty_multi_bytes(&ok, None));
        assert!(non_empty_multi_bytes(&ok, Some(2)));
        assert!(!non_empty_multi_bytes(&ok, Some(1)));

        let has_empty = vec![vec![1u8], vec![]];
        assert!(!non_empty_multi_bytes(&has_empty, None));

        let none: Vec<Vec<u8>> = vec![];
        assert!(!non_empty_multi_bytes(&none, None));
    }

    #[test]
    fn test_pad_to_length_bytes() {
        assert_eq!(pad_to_length_bytes(&[1, 2, 3], 5), vec![0, 0, 1, 2, 3]);
        assert_eq!(pad_to_length_bytes(&[1, 2, 3, 4, 5], 5), vec![1, 2, 3, 4, 5]);
        assert_eq!(pad_to_length_bytes(&[1, 2, 3, 4, 5, 6], 5), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(pad_to_length_bytes(&[], 3), vec![0, 0, 0]);
    }
}
