// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Schnorr proofs of knowledge of discrete logarithms.

use num_bigint::BigInt;
use num_traits::Signed;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::common::hash::sha512_256i_tagged;
use crate::common::hash_utils::rejection_sample;
use crate::common::int::ModInt;
use crate::common::random::get_random_positive_int;
use crate::crypto::ecpoint::{ECPoint, PointError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchnorrError {
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    #[error("point operation failed: {0}")]
    Point(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<PointError> for SchnorrError {
    fn from(err: PointError) -> Self {
        SchnorrError::Point(err.to_string())
    }
}

/// Proof of knowledge of x with X = x*G.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZkProof {
    pub alpha: ECPoint,
    pub t: BigInt,
}

/// Proof of knowledge of (s, l) with V = s*R + l*G.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZkvProof {
    pub alpha: ECPoint,
    pub t: BigInt,
    pub u: BigInt,
}

impl ZkProof {
    pub fn new<R: CryptoRng + RngCore>(
        session: &[u8],
        x_priv: &BigInt,
        x_pub: &ECPoint,
        rng: &mut R,
    ) -> Result<Self, SchnorrError> {
        if x_priv.is_negative() || !x_pub.validate_basic() {
            return Err(SchnorrError::InvalidParameters("invalid x or X".to_string()));
        }
        let curve = x_pub.curve();
        let q = curve.order();
        let mod_q = ModInt::new(q.clone());
        let g = ECPoint::generator(curve);

        let a = get_random_positive_int(rng, &q)
            .ok_or_else(|| SchnorrError::Internal("failed to sample a".to_string()))?;
        let alpha = ECPoint::scalar_base_mult(curve, &a);

        let c = Self::challenge(session, x_pub, &g, &alpha, &q)
            .ok_or_else(|| SchnorrError::Internal("challenge hash failed".to_string()))?;

        // t = a + c*x mod q
        let t = mod_q.add(&a, &mod_q.mul(&c, x_priv));
        Ok(Self { alpha, t })
    }

    /// Checks t*G == alpha + c*X.
    pub fn verify(&self, session: &[u8], x_pub: &ECPoint) -> bool {
        if !self.validate_basic() || !x_pub.validate_basic() {
            return false;
        }
        let curve = x_pub.curve();
        let q = curve.order();
        let g = ECPoint::generator(curve);

        let c = match Self::challenge(session, x_pub, &g, &self.alpha, &q) {
            Some(c) => c,
            None => return false,
        };

        let lhs = ECPoint::scalar_base_mult(curve, &self.t);
        let rhs = match self.alpha.add(&x_pub.scalar_mul(&c)) {
            Ok(p) => p,
            Err(_) => return false,
        };
        lhs == rhs
    }

    pub fn validate_basic(&self) -> bool {
        self.alpha.validate_basic()
    }

    fn challenge(
        session: &[u8],
        x_pub: &ECPoint,
        g: &ECPoint,
        alpha: &ECPoint,
        q: &BigInt,
    ) -> Option<BigInt> {
        let (xx, xy) = x_pub.coords();
        let (gx, gy) = g.coords();
        let (ax, ay) = alpha.coords();
        let hash = sha512_256i_tagged(session, &[&xx, &xy, &gx, &gy, &ax, &ay])?;
        Some(rejection_sample(q, &hash))
    }
}

impl ZkvProof {
    pub fn new<Rng: CryptoRng + RngCore>(
        session: &[u8],
        s: &BigInt,
        l: &BigInt,
        v_pub: &ECPoint,
        r_pub: &ECPoint,
        rng: &mut Rng,
    ) -> Result<Self, SchnorrError> {
        if s.is_negative() || l.is_negative() || !v_pub.validate_basic() || !r_pub.validate_basic()
        {
            return Err(SchnorrError::InvalidParameters("invalid s, l, V or R".to_string()));
        }
        let curve = v_pub.curve();
        let q = curve.order();
        let mod_q = ModInt::new(q.clone());

        let a = get_random_positive_int(rng, &q)
            .ok_or_else(|| SchnorrError::Internal("failed to sample a".to_string()))?;
        let b = get_random_positive_int(rng, &q)
            .ok_or_else(|| SchnorrError::Internal("failed to sample b".to_string()))?;

        // alpha = a*R + b*G
        let alpha = r_pub
            .scalar_mul(&a)
            .add(&ECPoint::scalar_base_mult(curve, &b))?;

        let c = Self::challenge(session, v_pub, r_pub, &alpha, &q)
            .ok_or_else(|| SchnorrError::Internal("challenge hash failed".to_string()))?;

        let t = mod_q.add(&a, &mod_q.mul(&c, s));
        let u = mod_q.add(&b, &mod_q.mul(&c, l));
        Ok(Self { alpha, t, u })
    }

    /// Checks t*R + u*G == alpha + c*V.
    pub fn verify(&self, session: &[u8], v_pub: &ECPoint, r_pub: &ECPoint) -> bool {
        if !self.validate_basic() || !v_pub.validate_basic() || !r_pub.validate_basic() {
            return false;
        }
        let curve = v_pub.curve();
        let q = curve.order();

        let c = match Self::challenge(session, v_pub, r_pub, &self.alpha, &q) {
            Some(c) => c,
            None => return false,
        };

        let lhs = match r_pub
            .scalar_mul(&self.t)
            .add(&ECPoint::scalar_base_mult(curve, &self.u))
        {
            Ok(p) => p,
            Err(_) => return false,
        };
        let rhs = match self.alpha.add(&v_pub.scalar_mul(&c)) {
            Ok(p) => p,
            Err(_) => return false,
        };
        lhs == rhs
    }

    pub fn validate_basic(&self) -> bool {
        self.alpha.validate_basic()
    }

    fn challenge(
        session: &[u8],
        v_pub: &ECPoint,
        r_pub: &ECPoint,
        alpha: &ECPoint,
        q: &BigInt,
    ) -> Option<BigInt> {
        let g = ECPoint::generator(v_pub.curve());
        let (vx, vy) = v_pub.coords();
        let (rx, ry) = r_pub.coords();
        let (gx, gy) = g.coords();
        let (ax, ay) = alpha.coords();
        let hash = sha512_256i_tagged(session, &[&vx, &vy, &rx, &ry, &gx, &gy, &ax, &ay])?;
        Some(rejection_sample(q, &hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tss::curve::CurveId;
    use num_traits::One;
    use rand::thread_rng;

    const CURVE: CurveId = CurveId::Secp256k1;

    #[test]
    fn test_zk_proof() {
        let mut rng = thread_rng();
        let q = CURVE.order();
        let session = b"session_zkp";

        let x = get_random_positive_int(&mut rng, &q).unwrap();
        let x_pub = ECPoint::scalar_base_mult(CURVE, &x);

        let proof = ZkProof::new(session, &x, &x_pub, &mut rng).unwrap();
        assert!(proof.verify(session, &x_pub));

        assert!(!proof.verify(b"other_session", &x_pub));

        let other = ECPoint::scalar_base_mult(CURVE, &(&x + BigInt::one()));
        assert!(!proof.verify(session, &other));

        let mut tampered = proof.clone();
        tampered.t += BigInt::one();
        assert!(!tampered.verify(session, &x_pub));

        let mut tampered = proof;
        tampered.alpha = tampered.alpha.add(&ECPoint::generator(CURVE)).unwrap();
        assert!(!tampered.verify(session, &x_pub));
    }

    #[test]
    fn test_zkv_proof() {
        let mut rng = thread_rng();
        let q = CURVE.order();
        let session = b"session_zkv";

        let s = get_random_positive_int(&mut rng, &q).unwrap();
        let l = get_random_positive_int(&mut rng, &q).unwrap();
        let r_secret = get_random_positive_int(&mut rng, &q).unwrap();
        let r_pub = ECPoint::scalar_base_mult(CURVE, &r_secret);

        let v_pub = r_pub
            .scalar_mul(&s)
            .add(&ECPoint::scalar_base_mult(CURVE, &l))
            .unwrap();

        let proof = ZkvProof::new(session, &s, &l, &v_pub, &r_pub, &mut rng).unwrap();
        assert!(proof.verify(session, &v_pub, &r_pub));

        assert!(!proof.verify(b"other", &v_pub, &r_pub));

        let wrong_v = v_pub.add(&ECPoint::generator(CURVE)).unwrap();
        assert!(!proof.verify(session, &wrong_v, &r_pub));

        let wrong_r = r_pub.add(&ECPoint::generator(CURVE)).unwrap();
        assert!(!proof.verify(session, &v_pub, &wrong_r));

        let mut tampered = proof.clone();
        tampered.t += BigInt::one();
        assert!(!tampered.verify(session, &v_pub, &r_pub));

        let mut tampered = proof;
        tampered.u += BigInt::one();
        assert!(!tampered.verify(session, &v_pub, &r_pub));
    }
}
