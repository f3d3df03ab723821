// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Feldman verifiable secret sharing over the curve's scalar field.

use std::collections::HashSet;

use num_bigint::BigInt;
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::common::int::ModInt;
use crate::common::random::get_random_positive_int;
use crate::crypto::ecpoint::{ECPoint, PointError};
use crate::tss::curve::CurveId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VssError {
    #[error("not enough shares to satisfy the threshold (required: {0}, have: {1})")]
    NumSharesBelowThreshold(usize, usize),
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    #[error("duplicate share index: {0}")]
    DuplicateIndex(String),
    #[error("share index is zero mod q")]
    IndexIsZero,
    #[error("reconstruction failed: {0}")]
    Reconstruction(String),
    #[error("point operation failed: {0}")]
    Point(String),
}

impl From<PointError> for VssError {
    fn from(err: PointError) -> Self {
        VssError::Point(err.to_string())
    }
}

/// A share sigma_i = f(id_i) for party id_i.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub threshold: usize,
    pub id: BigInt,
    pub share: BigInt,
}

/// The public verification vector V = [u*G, a_1*G, ..., a_t*G].
pub type Vs = Vec<ECPoint>;

/// Rejects indexes that are zero or collide modulo q.
pub fn check_indexes(q: &BigInt, indexes: &[BigInt]) -> Result<(), VssError> {
    if indexes.is_empty() {
        return Err(VssError::InvalidParameters("indexes cannot be empty".to_string()));
    }
    let mod_q = ModInt::new(q.clone());
    let mut visited = HashSet::new();
    for v in indexes {
        let v_mod = mod_q.reduce(v);
        if v_mod.is_zero() {
            return Err(VssError::IndexIsZero);
        }
        if !visited.insert(v_mod.to_string()) {
            return Err(VssError::DuplicateIndex(v_mod.to_string()));
        }
    }
    Ok(())
}

/// Shares `secret` among the parties at `indexes` with the given threshold.
/// Returns the verification vector and one share per index.
pub fn create<R: CryptoRng + RngCore>(
    curve: CurveId,
    threshold: usize,
    secret: &BigInt,
    indexes: &[BigInt],
    rng: &mut R,
) -> Result<(Vs, Vec<Share>), VssError> {
    if threshold < 1 {
        return Err(VssError::InvalidParameters("threshold must be at least 1".to_string()));
    }
    if indexes.len() < threshold + 1 {
        return Err(VssError::NumSharesBelowThreshold(threshold + 1, indexes.len()));
    }
    let q = curve.order();
    check_indexes(&q, indexes)?;

    let poly = sample_polynomial(&q, threshold, secret, rng);
    let vs: Vs = poly
        .iter()
        .map(|a| ECPoint::scalar_base_mult(curve, a))
        .collect();

    let shares = indexes
        .iter()
        .map(|id| Share {
            threshold,
            id: id.clone(),
            share: evaluate_polynomial(&q, &poly, id),
        })
        .collect();

    Ok((vs, shares))
}

impl Share {
    /// Accepts the share iff share*G equals the polynomial commitment
    /// evaluated at this id: sum_c id^c * V_c.
    pub fn verify(&self, curve: CurveId, threshold: usize, vs: &Vs) -> bool {
        if threshold != self.threshold || vs.len() != threshold + 1 {
            return false;
        }
        let q = curve.order();
        let mod_q = ModInt::new(q);

        let mut rhs = vs[0].clone();
        let mut id_pow = BigInt::one();
        for v_c in vs.iter().skip(1) {
            id_pow = mod_q.mul(&id_pow, &self.id);
            let term = v_c.scalar_mul(&id_pow);
            rhs = match rhs.add(&term) {
                Ok(sum) => sum,
                Err(_) => return false,
            };
        }

        ECPoint::scalar_base_mult(curve, &self.share) == rhs
    }
}

/// The Lagrange basis coefficient lambda_i(0) for the cohort `indexes`.
pub fn lagrange_coefficient(
    q: &BigInt,
    indexes: &[BigInt],
    i: usize,
) -> Result<BigInt, VssError> {
    let mod_q = ModInt::new(q.clone());
    let id_i = &indexes[i];
    let mut coef = BigInt::one();
    for (j, id_j) in indexes.iter().enumerate() {
        if j == i {
            continue;
        }
        let denominator = mod_q.sub(id_j, id_i);
        if denominator.is_zero() {
            return Err(VssError::Reconstruction(format!(
                "colliding share ids {} and {}",
                id_i, id_j
            )));
        }
        let term = mod_q
            .div(id_j, &denominator)
            .ok_or_else(|| VssError::Reconstruction("non-invertible denominator".to_string()))?;
        coef = mod_q.mul(&coef, &term);
    }
    Ok(coef)
}

/// Reconstructs the secret at 0 from at least threshold+1 shares.
pub fn reconstruct_secret(q: &BigInt, shares: &[Share]) -> Result<BigInt, VssError> {
    if shares.is_empty() {
        return Err(VssError::Reconstruction("no shares given".to_string()));
    }
    let threshold = shares[0].threshold;
    if shares.len() <= threshold {
        return Err(VssError::NumSharesBelowThreshold(threshold + 1, shares.len()));
    }

    let effective = &shares[0..=threshold];
    let indexes: Vec<BigInt> = effective.iter().map(|s| s.id.clone()).collect();
    let mod_q = ModInt::new(q.clone());

    let mut secret = BigInt::zero();
    for (i, share) in effective.iter().enumerate() {
        let lambda = lagrange_coefficient(q, &indexes, i)?;
        secret = mod_q.add(&secret, &mod_q.mul(&share.share, &lambda));
    }
    Ok(secret)
}

fn sample_polynomial<R: CryptoRng + RngCore>(
    q: &BigInt,
    threshold: usize,
    secret: &BigInt,
    rng: &mut R,
) -> Vec<BigInt> {
    let mod_q = ModInt::new(q.clone());
    let mut poly = Vec::with_capacity(threshold + 1);
    poly.push(mod_q.reduce(secret));
    for _ in 1..=threshold {
        let a = get_random_positive_int(rng, q).unwrap_or_else(BigInt::zero);
        poly.push(a);
    }
    poly
}

fn evaluate_polynomial(q: &BigInt, poly: &[BigInt], id: &BigInt) -> BigInt {
    let mod_q = ModInt::new(q.clone());
    let mut result = poly[0].clone();
    let mut id_pow = BigInt::one();
    for a in poly.iter().skip(1) {
        id_pow = mod_q.mul(&id_pow, id);
        result = mod_q.add(&result, &mod_q.mul(a, &id_pow));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::thread_rng;

    const CURVE: CurveId = CurveId::Secp256k1;

    #[test]
    fn test_create_verify_reconstruct() {
        let mut rng = thread_rng();
        let q = CURVE.order();
        let secret = BigInt::from(123456789012345u64);
        let threshold = 2;
        let indexes: Vec<BigInt> = (1..=5).map(BigInt::from).collect();

        let (vs, shares) = create(CURVE, threshold, &secret, &indexes, &mut rng).unwrap();
        assert_eq!(vs.len(), threshold + 1);
        assert_eq!(shares.len(), 5);

        for share in &shares {
            assert!(share.verify(CURVE, threshold, &vs));
        }

        let rec = reconstruct_secret(&q, &shares[0..=threshold]).unwrap();
        assert_eq!(rec, secret);

        // a different t+1 subset reconstructs the same secret
        let rec_alt = reconstruct_secret(&q, &shares[2..5]).unwrap();
        assert_eq!(rec_alt, secret);

        // t shares are not enough
        assert!(matches!(
            reconstruct_secret(&q, &shares[0..threshold]),
            Err(VssError::NumSharesBelowThreshold(_, _))
        ));
    }

    #[test]
    fn test_zeroed_share_breaks_reconstruction() {
        let mut rng = thread_rng();
        let q = CURVE.order();
        let secret = get_random_positive_int(&mut rng, &q).unwrap();
        let indexes: Vec<BigInt> = (1..=3).map(BigInt::from).collect();

        let (vs, mut shares) = create(CURVE, 1, &secret, &indexes, &mut rng).unwrap();
        shares[0].share = BigInt::zero();

        let rec = reconstruct_secret(&q, &shares[0..2]).unwrap();
        assert_ne!(rec, secret);
        // and its generator image differs from V_0
        assert_ne!(ECPoint::scalar_base_mult(CURVE, &rec), vs[0]);
    }

    #[test]
    fn test_tampered_share_fails_verification() {
        let mut rng = thread_rng();
        let secret = BigInt::from(999u64);
        let indexes = vec![BigInt::from(1), BigInt::from(2)];

        let (vs, mut shares) = create(CURVE, 1, &secret, &indexes, &mut rng).unwrap();
        shares[0].share += BigInt::one();
        assert!(!shares[0].verify(CURVE, 1, &vs));
        assert!(shares[1].verify(CURVE, 1, &vs));
    }

    #[test]
    fn test_verify_against_wrong_vector() {
        let mut rng = thread_rng();
        let indexes = vec![BigInt::from(1), BigInt::from(2)];

        let (vs1, shares1) = create(CURVE, 1, &BigInt::from(888u64), &indexes, &mut rng).unwrap();
        let (vs2, _) = create(CURVE, 1, &BigInt::from(777u64), &indexes, &mut rng).unwrap();

        assert!(!shares1[0].verify(CURVE, 1, &vs2));
        assert!(shares1[0].verify(CURVE, 1, &vs1));
    }

    #[test]
    fn test_lagrange_identity_over_all_cohorts() {
        // sum_j lambda_j * f(k_j) == f(0) for every (t+1)-cohort
        let mut rng = thread_rng();
        let q = CURVE.order();
        let secret = get_random_positive_int(&mut rng, &q).unwrap();
        let indexes: Vec<BigInt> = (1..=4).map(BigInt::from).collect();
        let threshold = 1;

        let (_, shares) = create(CURVE, threshold, &secret, &indexes, &mut rng).unwrap();
        let mod_q = ModInt::new(q.clone());

        for a in 0..shares.len() {
            for b in (a + 1)..shares.len() {
                let cohort = [shares[a].clone(), shares[b].clone()];
                let ids: Vec<BigInt> = cohort.iter().map(|s| s.id.clone()).collect();
                let mut sum = BigInt::zero();
                for (i, s) in cohort.iter().enumerate() {
                    let lambda = lagrange_coefficient(&q, &ids, i).unwrap();
                    sum = mod_q.add(&sum, &mod_q.mul(&lambda, &s.share));
                }
                assert_eq!(sum, secret);
            }
        }
    }

    #[test]
    fn test_check_indexes() {
        let q = CURVE.order();
        assert!(check_indexes(&q, &[BigInt::from(1), BigInt::from(2)]).is_ok());
        assert!(matches!(
            check_indexes(&q, &[BigInt::from(1), BigInt::zero()]),
            Err(VssError::IndexIsZero)
        ));
        assert!(matches!(
            check_indexes(&q, &[BigInt::from(1), BigInt::from(2), BigInt::from(1)]),
            Err(VssError::DuplicateIndex(_))
        ));
        // equal mod q counts as duplicate
        let q_plus_1 = &q + BigInt::one();
        assert!(matches!(
            check_indexes(&q, &[BigInt::one(), q_plus_1]),
            Err(VssError::DuplicateIndex(_))
        ));
        assert!(check_indexes(&q, &[]).is_err());
    }

    #[test]
    fn test_create_parameter_errors() {
        let mut rng = thread_rng();
        let secret = BigInt::one();
        let indexes = vec![BigInt::from(1), BigInt::from(2)];

        assert!(matches!(
            create(CURVE, 0, &secret, &indexes, &mut rng),
            Err(VssError::InvalidParameters(_))
        ));
        assert!(matches!(
            create(CURVE, 2, &secret, &indexes, &mut rng),
            Err(VssError::NumSharesBelowThreshold(3, 2))
        ));
        assert!(matches!(
            create(CURVE, 1, &secret, &[BigInt::one(), BigInt::zero()], &mut rng),
            Err(VssError::IndexIsZero)
        ));
    }
}
