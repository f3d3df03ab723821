// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Zeroizing container for secret scalars.
//!
//! `BigInt` offers no mutable access to its digit buffer, so dropping or
//! reassigning one frees the secret bytes without wiping them. Session
//! secrets are therefore held as big-endian bytes in a buffer that is
//! scrubbed in place on zeroize and on drop.

use std::fmt;

use num_bigint::{BigInt, Sign};
use num_traits::Signed;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A non-negative secret integer with a wipeable backing buffer.
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct SecretInt {
    bytes: Vec<u8>,
}

impl SecretInt {
    /// Takes ownership of a secret value. The value must be non-negative
    /// (protocol secrets are canonical residues).
    pub fn new(value: BigInt) -> Self {
        debug_assert!(!value.is_negative());
        Self { bytes: value.to_bytes_be().1 }
    }

    /// The contained value. Arithmetic on the result produces ordinary,
    /// unprotected temporaries; keep their scope tight.
    pub fn expose(&self) -> BigInt {
        BigInt::from_bytes_be(Sign::Plus, &self.bytes)
    }

    pub fn is_zero(&self) -> bool {
        self.bytes.iter().all(|b| *b == 0)
    }
}

// never print secret material
impl fmt::Debug for SecretInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretInt(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;

    #[test]
    fn test_round_trip() {
        let v = BigInt::parse_bytes(b"deadbeefcafebabe0123456789", 16).unwrap();
        let secret = SecretInt::new(v.clone());
        assert_eq!(secret.expose(), v);
        assert!(!secret.is_zero());
    }

    #[test]
    fn test_zeroize_wipes_value() {
        let mut secret = SecretInt::new(BigInt::from(123456789u64));
        secret.zeroize();
        assert!(secret.is_zero());
        assert!(secret.expose().is_zero());
    }

    #[test]
    fn test_default_is_zero() {
        let secret = SecretInt::default();
        assert!(secret.is_zero());
        assert!(secret.expose().is_zero());
    }

    #[test]
    fn test_debug_is_redacted() {
        let secret = SecretInt::new(BigInt::from(987654321u64));
        assert_eq!(format!("{:?}", secret), "SecretInt(..)");
    }
}
