// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Proofs binding the signing commitments T_i and S_i to the bases G, H
//! and R.

use num_bigint::BigInt;
use num_traits::Signed;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::common::hash::sha512_256i_tagged;
use crate::common::hash_utils::rejection_sample;
use crate::common::int::ModInt;
use crate::common::random::get_random_positive_int;
use crate::crypto::ecpoint::{second_base_point, ECPoint, PointError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StProofError {
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    #[error("point operation failed: {0}")]
    Point(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<PointError> for StProofError {
    fn from(err: PointError) -> Self {
        StProofError::Point(err.to_string())
    }
}

/// Proof of knowledge of (sigma, l) with T = sigma*G + l*H.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TProof {
    pub alpha: ECPoint,
    pub t: BigInt,
    pub u: BigInt,
}

/// Proof of knowledge of (sigma, l) with T = sigma*G + l*H and S = sigma*R.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StProof {
    pub alpha: ECPoint,
    pub beta: ECPoint,
    pub t: BigInt,
    pub u: BigInt,
}

impl TProof {
    pub fn new<R: CryptoRng + RngCore>(
        session: &[u8],
        sigma: &BigInt,
        l: &BigInt,
        t_point: &ECPoint,
        rng: &mut R,
    ) -> Result<Self, StProofError> {
        if sigma.is_negative() || l.is_negative() || !t_point.validate_basic() {
            return Err(StProofError::InvalidParameters(
                "invalid sigma, l or T".to_string(),
            ));
        }
        let curve = t_point.curve();
        let q = curve.order();
        let mod_q = ModInt::new(q.clone());
        let h = second_base_point(curve);

        let a = get_random_positive_int(rng, &q)
            .ok_or_else(|| StProofError::Internal("failed to sample a".to_string()))?;
        let b = get_random_positive_int(rng, &q)
            .ok_or_else(|| StProofError::Internal("failed to sample b".to_string()))?;

        // alpha = a*G + b*H
        let alpha = ECPoint::scalar_base_mult(curve, &a).add(&h.scalar_mul(&b))?;

        let e = t_challenge(session, t_point, h, &alpha, &q)
            .ok_or_else(|| StProofError::Internal("challenge hash failed".to_string()))?;

        let t = mod_q.add(&a, &mod_q.mul(&e, sigma));
        let u = mod_q.add(&b, &mod_q.mul(&e, l));
        Ok(Self { alpha, t, u })
    }

    /// Checks t*G + u*H == alpha + e*T.
    pub fn verify(&self, session: &[u8], t_point: &ECPoint) -> bool {
        if !self.alpha.validate_basic() || !t_point.validate_basic() {
            return false;
        }
        let curve = t_point.curve();
        let q = curve.order();
        let h = second_base_point(curve);

        let e = match t_challenge(session, t_point, h, &self.alpha, &q) {
            Some(e) => e,
            None => return false,
        };

        let lhs = match ECPoint::scalar_base_mult(curve, &self.t).add(&h.scalar_mul(&self.u)) {
            Ok(p) => p,
            Err(_) => return false,
        };
        let rhs = match self.alpha.add(&t_point.scalar_mul(&e)) {
            Ok(p) => p,
            Err(_) => return false,
        };
        lhs == rhs
    }
}

impl StProof {
    pub fn new<Rng: CryptoRng + RngCore>(
        session: &[u8],
        sigma: &BigInt,
        l: &BigInt,
        s_point: &ECPoint,
        t_point: &ECPoint,
        r_point: &ECPoint,
        rng: &mut Rng,
    ) -> Result<Self, StProofError> {
        if sigma.is_negative() || l.is_negative() {
            return Err(StProofError::InvalidParameters("negative witness".to_string()));
        }
        if !s_point.validate_basic() || !t_point.validate_basic() || !r_point.validate_basic() {
            return Err(StProofError::InvalidParameters("invalid S, T or R".to_string()));
        }
        let curve = t_point.curve();
        let q = curve.order();
        let mod_q = ModInt::new(q.clone());
        let h = second_base_point(curve);

        let a = get_random_positive_int(rng, &q)
            .ok_or_else(|| StProofError::Internal("failed to sample a".to_string()))?;
        let b = get_random_positive_int(rng, &q)
            .ok_or_else(|| StProofError::Internal("failed to sample b".to_string()))?;

        // alpha = a*R, beta = a*G + b*H
        let alpha = r_point.scalar_mul(&a);
        let beta = ECPoint::scalar_base_mult(curve, &a).add(&h.scalar_mul(&b))?;

        let e = st_challenge(session, s_point, t_point, r_point, h, &alpha, &beta, &q)
            .ok_or_else(|| StProofError::Internal("challenge hash failed".to_string()))?;

        let t = mod_q.add(&a, &mod_q.mul(&e, sigma));
        let u = mod_q.add(&b, &mod_q.mul(&e, l));
        Ok(Self { alpha, beta, t, u })
    }

    /// Checks t*R == alpha + e*S and t*G + u*H == beta + e*T.
    pub fn verify(
        &self,
        session: &[u8],
        s_point: &ECPoint,
        t_point: &ECPoint,
        r_point: &ECPoint,
    ) -> bool {
        if !self.alpha.validate_basic() || !self.beta.validate_basic() {
            return false;
        }
        if !s_point.validate_basic() || !t_point.validate_basic() || !r_point.validate_basic() {
            return false;
        }
        let curve = t_point.curve();
        let q = curve.order();
        let h = second_base_point(curve);

        let e = match st_challenge(session, s_point, t_point, r_point, h, &self.alpha, &self.beta, &q)
        {
            Some(e) => e,
            None => return false,
        };

        let lhs1 = r_point.scalar_mul(&self.t);
        let rhs1 = match self.alpha.add(&s_point.scalar_mul(&e)) {
            Ok(p) => p,
            Err(_) => return false,
        };
        if lhs1 != rhs1 {
            return false;
        }

        let lhs2 = match ECPoint::scalar_base_mult(curve, &self.t).add(&h.scalar_mul(&self.u)) {
            Ok(p) => p,
            Err(_) => return false,
        };
        let rhs2 = match self.beta.add(&t_point.scalar_mul(&e)) {
            Ok(p) => p,
            Err(_) => return false,
        };
        lhs2 == rhs2
    }
}

fn t_challenge(
    session: &[u8],
    t_point: &ECPoint,
    h: &ECPoint,
    alpha: &ECPoint,
    q: &BigInt,
) -> Option<BigInt> {
    let g = ECPoint::generator(t_point.curve());
    let (tx, ty) = t_point.coords();
    let (gx, gy) = g.coords();
    let (hx, hy) = h.coords();
    let (ax, ay) = alpha.coords();
    let hash = sha512_256i_tagged(session, &[&tx, &ty, &gx, &gy, &hx, &hy, &ax, &ay])?;
    Some(rejection_sample(q, &hash))
}

#[allow(clippy::too_many_arguments)]
fn st_challenge(
    session: &[u8],
    s_point: &ECPoint,
    t_point: &ECPoint,
    r_point: &ECPoint,
    h: &ECPoint,
    alpha: &ECPoint,
    beta: &ECPoint,
    q: &BigInt,
) -> Option<BigInt> {
    let (sx, sy) = s_point.coords();
    let (tx, ty) = t_point.coords();
    let (rx, ry) = r_point.coords();
    let (hx, hy) = h.coords();
    let (ax, ay) = alpha.coords();
    let (bx, by) = beta.coords();
    let hash = sha512_256i_tagged(
        session,
        &[&sx, &sy, &tx, &ty, &rx, &ry, &hx, &hy, &ax, &ay, &bx, &by],
    )?;
    Some(rejection_sample(q, &hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tss::curve::CurveId;
    use num_traits::One;
    use rand::thread_rng;

    const CURVE: CurveId = CurveId::Secp256k1;

    #[test]
    fn test_t_proof() {
        let mut rng = thread_rng();
        let q = CURVE.order();
        let session = b"t_proof";
        let h = second_base_point(CURVE);

        let sigma = get_random_positive_int(&mut rng, &q).unwrap();
        let l = get_random_positive_int(&mut rng, &q).unwrap();
        let t_point = ECPoint::scalar_base_mult(CURVE, &sigma)
            .add(&h.scalar_mul(&l))
            .unwrap();

        let proof = TProof::new(session, &sigma, &l, &t_point, &mut rng).unwrap();
        assert!(proof.verify(session, &t_point));

        assert!(!proof.verify(b"other", &t_point));
        let wrong_t = t_point.add(&ECPoint::generator(CURVE)).unwrap();
        assert!(!proof.verify(session, &wrong_t));

        let mut tampered = proof;
        tampered.t += BigInt::one();
        assert!(!tampered.verify(session, &t_point));
    }

    #[test]
    fn test_st_proof() {
        let mut rng = thread_rng();
        let q = CURVE.order();
        let session = b"st_proof";
        let h = second_base_point(CURVE);

        let sigma = get_random_positive_int(&mut rng, &q).unwrap();
        let l = get_random_positive_int(&mut rng, &q).unwrap();
        let r_secret = get_random_positive_int(&mut rng, &q).unwrap();
        let r_point = ECPoint::scalar_base_mult(CURVE, &r_secret);

        let t_point = ECPoint::scalar_base_mult(CURVE, &sigma)
            .add(&h.scalar_mul(&l))
            .unwrap();
        let s_point = r_point.scalar_mul(&sigma);

        let proof = StProof::new(session, &sigma, &l, &s_point, &t_point, &r_point, &mut rng)
            .unwrap();
        assert!(proof.verify(session, &s_point, &t_point, &r_point));

        assert!(!proof.verify(b"other", &s_point, &t_point, &r_point));

        // S inconsistent with sigma
        let wrong_s = s_point.add(&r_point).unwrap();
        assert!(!proof.verify(session, &wrong_s, &t_point, &r_point));

        let wrong_t = t_point.add(&ECPoint::generator(CURVE)).unwrap();
        assert!(!proof.verify(session, &s_point, &wrong_t, &r_point));

        let mut tampered = proof;
        tampered.u += BigInt::one();
        assert!(!tampered.verify(session, &s_point, &t_point, &r_point));
    }
}
