// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Modular arithmetic over arbitrary-precision integers.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::Signed;

/// Carries a modulus and performs arithmetic reduced by it.
///
/// All results are canonical representatives in `[0, modulus)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModInt {
    modulus: BigInt,
}

impl ModInt {
    /// Creates a new `ModInt`. The modulus must be positive.
    pub fn new(modulus: BigInt) -> Self {
        debug_assert!(modulus.is_positive(), "modulus must be positive");
        ModInt { modulus }
    }

    pub fn modulus(&self) -> &BigInt {
        &self.modulus
    }

    /// (x + y) mod m
    pub fn add(&self, x: &BigInt, y: &BigInt) -> BigInt {
        (x + y).mod_floor(&self.modulus)
    }

    /// (x - y) mod m
    pub fn sub(&self, x: &BigInt, y: &BigInt) -> BigInt {
        (x - y).mod_floor(&self.modulus)
    }

    /// (x * y) mod m
    pub fn mul(&self, x: &BigInt, y: &BigInt) -> BigInt {
        (x * y).mod_floor(&self.modulus)
    }

    /// base^exponent mod m. The exponent must be non-negative.
    pub fn exp(&self, base: &BigInt, exponent: &BigInt) -> BigInt {
        base.mod_floor(&self.modulus).modpow(exponent, &self.modulus)
    }

    /// Reduces x into `[0, m)`.
    pub fn reduce(&self, x: &BigInt) -> BigInt {
        x.mod_floor(&self.modulus)
    }

    /// g^-1 mod m, or `None` when gcd(g, m) != 1.
    pub fn mod_inverse(&self, g: &BigInt) -> Option<BigInt> {
        g.mod_floor(&self.modulus).modinv(&self.modulus)
    }

    /// (x * y^-1) mod m, or `None` when y is not invertible.
    pub fn div(&self, x: &BigInt, y: &BigInt) -> Option<BigInt> {
        self.mod_inverse(y).map(|y_inv| self.mul(x, &y_inv))
    }
}

/// Returns true iff `0 <= b < bound`.
pub fn is_in_interval(b: &BigInt, bound: &BigInt) -> bool {
    !b.is_negative() && b < bound
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::{One, Zero};

    #[test]
    fn test_mod_int_operations() {
        let modular = ModInt::new(BigInt::from(100u64));

        let x = BigInt::from(50u64);
        let y = BigInt::from(75u64);
        let z = BigInt::from(4u64);

        assert_eq!(modular.add(&x, &y), BigInt::from(25u64));
        assert_eq!(modular.sub(&x, &y), BigInt::from(75u64));
        assert_eq!(modular.sub(&y, &x), BigInt::from(25u64));
        assert_eq!(modular.mul(&x, &y), BigInt::from(50u64));
        assert_eq!(modular.exp(&y, &z), BigInt::from(25u64));

        // 75^-1 mod 100 does not exist (gcd = 25)
        assert_eq!(modular.mod_inverse(&y), None);
        // 7 * 43 = 301 = 3*100 + 1
        let seven = BigInt::from(7u64);
        assert_eq!(modular.mod_inverse(&seven), Some(BigInt::from(43u64)));

        assert_eq!(modular.div(&x, &seven), Some(BigInt::from(50u64)));
        assert_eq!(modular.div(&x, &y), None);
    }

    #[test]
    fn test_negative_operands_reduce_into_range() {
        let modular = ModInt::new(BigInt::from(100u64));
        let neg = BigInt::from(-25i64);
        assert_eq!(modular.add(&neg, &BigInt::zero()), BigInt::from(75u64));
        assert_eq!(modular.exp(&neg, &BigInt::from(2u64)), BigInt::from(25u64));
    }

    #[test]
    fn test_is_in_interval() {
        let bound = BigInt::from(100u64);
        assert!(is_in_interval(&BigInt::zero(), &bound));
        assert!(is_in_interval(&BigInt::from(99u64), &bound));
        assert!(!is_in_interval(&BigInt::from(100u64), &bound));
        assert!(!is_in_interval(&BigInt::from(-1i64), &bound));
        assert!(is_in_interval(&BigInt::one(), &bound));
    }
}
