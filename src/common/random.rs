// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Random integer sampling helpers used across the protocol.

use log::error;
use num_bigint::{BigInt, RandBigInt};
use num_integer::Integer;
use num_prime::RandPrime;
use num_traits::{One, Signed, Zero};
use rand::{CryptoRng, RngCore};

const MUST_GET_RANDOM_INT_MAX_BITS: u64 = 5000;

/// Uniform random integer in `[0, 2^bits)`. Panics on out-of-range `bits`;
/// callers pass constants.
pub fn must_get_random_int<R: CryptoRng + RngCore>(rng: &mut R, bits: u64) -> BigInt {
    assert!(
        bits > 0 && bits <= MUST_GET_RANDOM_INT_MAX_BITS,
        "bits should be positive, non-zero and less than {}",
        MUST_GET_RANDOM_INT_MAX_BITS
    );
    BigInt::from(rng.gen_biguint(bits))
}

/// Uniform random integer in `[0, less_than)`, or `None` when the bound is
/// not positive.
pub fn get_random_positive_int<R: CryptoRng + RngCore>(
    rng: &mut R,
    less_than: &BigInt,
) -> Option<BigInt> {
    if !less_than.is_positive() {
        error!("get_random_positive_int: bound must be positive");
        return None;
    }
    Some(rng.gen_bigint_range(&BigInt::zero(), less_than))
}

/// Random probable prime of exactly `bits` bits.
pub fn get_random_prime_int<R: CryptoRng + RngCore>(rng: &mut R, bits: usize) -> Option<BigInt> {
    if bits == 0 {
        error!("get_random_prime_int: bits must be positive");
        return None;
    }
    let p: num_bigint::BigUint = rng.gen_prime(bits, None);
    Some(BigInt::from(p))
}

/// Returns true iff `v` is in the multiplicative group `(Z/nZ)*`.
pub fn is_number_in_multiplicative_group(n: &BigInt, v: &BigInt) -> bool {
    n.is_positive() && v.is_positive() && v < n && v.gcd(n).is_one()
}

/// Random element of `(Z/nZ)*`.
pub fn get_random_positive_relatively_prime_int<R: CryptoRng + RngCore>(
    rng: &mut R,
    n: &BigInt,
) -> Option<BigInt> {
    if !n.is_positive() {
        error!("get_random_positive_relatively_prime_int: n must be positive");
        return None;
    }
    loop {
        let try_val = rng.gen_bigint_range(&BigInt::one(), n);
        if try_val.gcd(n).is_one() {
            return Some(try_val);
        }
    }
}

/// Random generator of the quadratic residues mod `n`, as `f^2 mod n` for a
/// random `f` in `(Z/nZ)*`. Generates the full QR group only when `n` is a
/// product of two safe primes.
pub fn get_random_generator_of_quadratic_residue<R: CryptoRng + RngCore>(
    rng: &mut R,
    n: &BigInt,
) -> Option<BigInt> {
    let f = get_random_positive_relatively_prime_int(rng, n)?;
    Some(f.modpow(&BigInt::from(2u8), n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_prime::nt_funcs;
    use rand::thread_rng;

    #[test]
    fn test_must_get_random_int() {
        let mut rng = thread_rng();
        let val = must_get_random_int(&mut rng, 128);
        assert!(val.bits() <= 128);
        assert!(!val.is_negative());
    }

    #[test]
    #[should_panic]
    fn test_must_get_random_int_panics_on_zero_bits() {
        let mut rng = thread_rng();
        must_get_random_int(&mut rng, 0);
    }

    #[test]
    fn test_get_random_positive_int() {
        let mut rng = thread_rng();
        let bound = BigInt::from(10000u64);
        for _ in 0..32 {
            let val = get_random_positive_int(&mut rng, &bound).unwrap();
            assert!(val < bound && !val.is_negative());
        }
        assert!(get_random_positive_int(&mut rng, &BigInt::zero()).is_none());
        assert!(get_random_positive_int(&mut rng, &BigInt::from(-1i64)).is_none());
    }

    #[test]
    fn test_get_random_prime_int() {
        let mut rng = thread_rng();
        let prime = get_random_prime_int(&mut rng, 64).unwrap();
        assert!(nt_funcs::is_prime(prime.magnitude(), None).probably());
        assert!(get_random_prime_int(&mut rng, 0).is_none());
    }

    #[test]
    fn test_multiplicative_group_membership() {
        let n = BigInt::from(10u64);
        assert!(is_number_in_multiplicative_group(&n, &BigInt::from(3u64)));
        assert!(is_number_in_multiplicative_group(&n, &BigInt::from(7u64)));
        assert!(!is_number_in_multiplicative_group(&n, &BigInt::from(2u64)));
        assert!(!is_number_in_multiplicative_group(&n, &BigInt::from(5u64)));
        assert!(!is_number_in_multiplicative_group(&n, &BigInt::from(10u64)));
        assert!(!is_number_in_multiplicative_group(&n, &BigInt::zero()));
    }

    #[test]
    fn test_get_random_positive_relatively_prime_int() {
        let mut rng = thread_rng();
        let n = BigInt::from(100u64);
        for _ in 0..16 {
            let val = get_random_positive_relatively_prime_int(&mut rng, &n).unwrap();
            assert!(val.is_positive() && val < n);
            assert!(val.gcd(&n).is_one());
        }
        assert!(get_random_positive_relatively_prime_int(&mut rng, &BigInt::zero()).is_none());
    }

    #[test]
    fn test_quadratic_residue_generator() {
        let mut rng = thread_rng();
        // 7 and 11 are safe primes
        let n = BigInt::from(77u64);
        let g = get_random_generator_of_quadratic_residue(&mut rng, &n).unwrap();
        assert!(g.is_positive() && g < n);
        assert!(g.gcd(&n).is_one());
    }
}
