// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use num_bigint::BigInt;
use num_integer::Integer;

/// Maps a Fiat-Shamir hash into `Z_q` by modular reduction.
pub fn rejection_sample(q: &BigInt, e_hash: &BigInt) -> BigInt {
    e_hash.mod_floor(q)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;

    #[test]
    fn test_rejection_sample() {
        let q = BigInt::from(1000u64);

        assert_eq!(rejection_sample(&q, &BigInt::from(500u64)), BigInt::from(500u64));
        assert_eq!(rejection_sample(&q, &BigInt::from(1000u64)), BigInt::zero());
        assert_eq!(rejection_sample(&q, &BigInt::from(1234u64)), BigInt::from(234u64));
        // negative inputs reduce into [0, q)
        assert_eq!(rejection_sample(&q, &BigInt::from(-1234i64)), BigInt::from(766u64));

        let big = BigInt::parse_bytes(b"abcdef1234567890abcdef1234567890", 16).unwrap();
        let r = rejection_sample(&q, &big);
        assert!(r >= BigInt::zero() && r < q);
    }
}
