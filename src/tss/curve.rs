// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! The process-wide curve selection is explicit: every session carries a
//! `CurveId` on its `Parameters`.

use std::fmt;

use num_bigint::BigInt;
use num_traits::Num;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Supported short-Weierstrass prime-order curves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurveId {
    Secp256k1,
    NistP256,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CurveError {
    #[error("unsupported curve name: {0}")]
    UnsupportedCurve(String),
    #[error("curve mismatch between operands")]
    CurveMismatch,
}

static SECP256K1_ORDER: Lazy<BigInt> = Lazy::new(|| {
    BigInt::from_str_radix(
        "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141",
        16,
    )
    .expect("const")
});

static P256_ORDER: Lazy<BigInt> = Lazy::new(|| {
    BigInt::from_str_radix(
        "ffffffff00000000ffffffffffffffffbce6faada7179e84f3b9cac2fc632551",
        16,
    )
    .expect("const")
});

impl CurveId {
    pub fn name(&self) -> &'static str {
        match self {
            CurveId::Secp256k1 => "secp256k1",
            CurveId::NistP256 => "nist-p256",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, CurveError> {
        match name {
            "secp256k1" => Ok(CurveId::Secp256k1),
            "nist-p256" => Ok(CurveId::NistP256),
            other => Err(CurveError::UnsupportedCurve(other.to_string())),
        }
    }

    /// The order q of the scalar field.
    pub fn order(&self) -> BigInt {
        match self {
            CurveId::Secp256k1 => SECP256K1_ORDER.clone(),
            CurveId::NistP256 => P256_ORDER.clone(),
        }
    }

    pub fn order_bit_len(&self) -> usize {
        256
    }

    /// Byte length of a field element / scalar encoding.
    pub fn field_bytes_len(&self) -> usize {
        32
    }
}

impl fmt::Display for CurveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;

    #[test]
    fn test_curve_names() {
        assert_eq!(CurveId::Secp256k1.name(), "secp256k1");
        assert_eq!(CurveId::from_name("secp256k1"), Ok(CurveId::Secp256k1));
        assert_eq!(CurveId::from_name("nist-p256"), Ok(CurveId::NistP256));
        assert!(CurveId::from_name("ed25519").is_err());
    }

    #[test]
    fn test_curve_orders() {
        for curve in [CurveId::Secp256k1, CurveId::NistP256] {
            let q = curve.order();
            assert!(q > BigInt::zero());
            assert_eq!(q.bits(), 256);
        }
        assert_ne!(CurveId::Secp256k1.order(), CurveId::NistP256.order());
    }
}
