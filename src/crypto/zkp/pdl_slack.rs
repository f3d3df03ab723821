// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! PDL-with-slack: consistency between a Paillier ciphertext and a curve
//! point. Proves knowledge of (x, r) with ct = Enc_pk(x; r) and Q = x*B for
//! a base point B, with slack in the range bound (x effectively bounded by
//! q^3).

use log::debug;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::common::hash::sha512_256i_tagged;
use crate::common::hash_utils::rejection_sample;
use crate::common::int::{is_in_interval, ModInt};
use crate::common::random::{get_random_positive_int, get_random_positive_relatively_prime_int};
use crate::crypto::ecpoint::ECPoint;
use crate::crypto::paillier::PublicKey;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PdlError {
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    #[error("proof generation failed: {0}")]
    Generation(String),
}

/// Public statement of the PDL-with-slack relation.
#[derive(Clone, Debug)]
pub struct PdlWSlackStatement {
    /// Ciphertext of the witness under `pk`.
    pub ct: BigInt,
    pub pk: PublicKey,
    /// Q = x * base.
    pub q_point: ECPoint,
    /// The base point B (the group element R during signing).
    pub base: ECPoint,
    pub n_tilde: BigInt,
    pub h1: BigInt,
    pub h2: BigInt,
}

/// Witness: the plaintext and the encryption randomness.
#[derive(Clone, Debug)]
pub struct PdlWSlackWitness {
    pub x: BigInt,
    pub r: BigInt,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdlWSlackProof {
    pub z: BigInt,
    pub u1: ECPoint,
    pub u2: BigInt,
    pub u3: BigInt,
    pub s1: BigInt,
    pub s2: BigInt,
    pub s3: BigInt,
}

impl PdlWSlackProof {
    pub fn new<R: CryptoRng + RngCore>(
        session: &[u8],
        curve_q: &BigInt,
        witness: &PdlWSlackWitness,
        statement: &PdlWSlackStatement,
        rng: &mut R,
    ) -> Result<Self, PdlError> {
        let st = statement;
        if !st.pk.n.is_positive() || !st.n_tilde.is_positive() {
            return Err(PdlError::InvalidParameters(
                "N and NTilde must be positive".to_string(),
            ));
        }

        let n = &st.pk.n;
        let mod_n_square = ModInt::new(st.pk.n_square());
        let mod_n_tilde = ModInt::new(st.n_tilde.clone());
        let mod_n = ModInt::new(n.clone());

        let q3 = curve_q * curve_q * curve_q;
        let q_n_tilde = curve_q * &st.n_tilde;
        let q3_n_tilde = &q3 * &st.n_tilde;

        let alpha = get_random_positive_int(rng, &q3)
            .ok_or_else(|| PdlError::Generation("failed to sample alpha".to_string()))?;
        let beta = get_random_positive_relatively_prime_int(rng, n)
            .ok_or_else(|| PdlError::Generation("failed to sample beta".to_string()))?;
        let rho = get_random_positive_int(rng, &q_n_tilde)
            .ok_or_else(|| PdlError::Generation("failed to sample rho".to_string()))?;
        let mu = get_random_positive_int(rng, &q3_n_tilde)
            .ok_or_else(|| PdlError::Generation("failed to sample mu".to_string()))?;

        // z  = h1^x * h2^rho     mod NTilde
        // u1 = alpha * base
        // u2 = (N+1)^alpha * beta^N mod N^2
        // u3 = h1^alpha * h2^mu  mod NTilde
        let z = mod_n_tilde.mul(
            &mod_n_tilde.exp(&st.h1, &witness.x),
            &mod_n_tilde.exp(&st.h2, &rho),
        );
        let u1 = st.base.scalar_mul(&alpha);
        let u2 = mod_n_square.mul(
            &mod_n_square.exp(&st.pk.gamma(), &alpha),
            &mod_n_square.exp(&beta, n),
        );
        let u3 = mod_n_tilde.mul(
            &mod_n_tilde.exp(&st.h1, &alpha),
            &mod_n_tilde.exp(&st.h2, &mu),
        );

        let e = challenge(session, curve_q, st, &z, &u1, &u2, &u3)
            .ok_or_else(|| PdlError::Generation("challenge hash failed".to_string()))?;

        let s1 = &alpha + &e * &witness.x;
        let s2 = &mu + &e * &rho;
        let s3 = mod_n.mul(&mod_n.exp(&witness.r, &e), &beta);

        Ok(Self { z, u1, u2, u3, s1, s2, s3 })
    }

    pub fn verify(&self, session: &[u8], curve_q: &BigInt, statement: &PdlWSlackStatement) -> bool {
        let st = statement;
        if !st.pk.n.is_positive() || !st.n_tilde.is_positive() {
            return false;
        }
        if !self.u1.validate_basic() || !st.q_point.validate_basic() || !st.base.validate_basic()
        {
            debug!("pdl-with-slack: invalid points");
            return false;
        }

        let n = &st.pk.n;
        let n_square = st.pk.n_square();
        let mod_n_square = ModInt::new(n_square.clone());
        let mod_n_tilde = ModInt::new(st.n_tilde.clone());

        let q3 = curve_q * curve_q * curve_q;
        if self.s1.is_negative() || self.s1 > q3 {
            debug!("pdl-with-slack: s1 out of bound");
            return false;
        }
        if !is_in_interval(&self.z, &st.n_tilde)
            || !is_in_interval(&self.u2, &n_square)
            || !is_in_interval(&self.u3, &st.n_tilde)
            || !is_in_interval(&self.s3, n)
        {
            debug!("pdl-with-slack: interval check failed");
            return false;
        }
        if !self.z.gcd(&st.n_tilde).is_one() || self.z.is_zero() {
            debug!("pdl-with-slack: z not a unit");
            return false;
        }

        let e = match challenge(session, curve_q, st, &self.z, &self.u1, &self.u2, &self.u3) {
            Some(e) => e,
            None => return false,
        };

        // base^s1 == u1 + e*Q
        let lhs = st.base.scalar_mul(&self.s1);
        let rhs = match self.u1.add(&st.q_point.scalar_mul(&e)) {
            Ok(p) => p,
            Err(_) => return false,
        };
        if lhs != rhs {
            debug!("pdl-with-slack: point check failed");
            return false;
        }

        // (N+1)^s1 * s3^N * ct^-e == u2 mod N^2
        let ct_inv = match mod_n_square.mod_inverse(&st.ct) {
            Some(inv) => inv,
            None => {
                debug!("pdl-with-slack: ct not invertible");
                return false;
            }
        };
        let lhs = mod_n_square.mul(
            &mod_n_square.mul(
                &mod_n_square.exp(&st.pk.gamma(), &self.s1),
                &mod_n_square.exp(&self.s3, n),
            ),
            &mod_n_square.exp(&ct_inv, &e),
        );
        if lhs != self.u2 {
            debug!("pdl-with-slack: ciphertext check failed");
            return false;
        }

        // h1^s1 * h2^s2 * z^-e == u3 mod NTilde
        let z_inv = match mod_n_tilde.mod_inverse(&self.z) {
            Some(inv) => inv,
            None => return false,
        };
        let lhs = mod_n_tilde.mul(
            &mod_n_tilde.mul(
                &mod_n_tilde.exp(&st.h1, &self.s1),
                &mod_n_tilde.exp(&st.h2, &self.s2),
            ),
            &mod_n_tilde.exp(&z_inv, &e),
        );
        if lhs != self.u3 {
            debug!("pdl-with-slack: commitment check failed");
            return false;
        }

        true
    }
}

fn challenge(
    session: &[u8],
    curve_q: &BigInt,
    st: &PdlWSlackStatement,
    z: &BigInt,
    u1: &ECPoint,
    u2: &BigInt,
    u3: &BigInt,
) -> Option<BigInt> {
    let (bx, by) = st.base.coords();
    let (qx, qy) = st.q_point.coords();
    let (u1x, u1y) = u1.coords();
    let hash = sha512_256i_tagged(
        session,
        &[
            &st.pk.n, &st.n_tilde, &st.h1, &st.h2, &bx, &by, &qx, &qy, &st.ct, z, &u1x, &u1y, u2,
            u3,
        ],
    )?;
    Some(rejection_sample(curve_q, &hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_aux_params;
    use crate::tss::curve::CurveId;
    use rand::thread_rng;

    const CURVE: CurveId = CurveId::Secp256k1;

    fn setup() -> (PdlWSlackStatement, PdlWSlackWitness) {
        let mut rng = thread_rng();
        let q = CURVE.order();
        let (pk, _sk, n_tilde, h1, h2) = test_aux_params();

        let x = get_random_positive_int(&mut rng, &q).unwrap();
        let (ct, r) = pk.encrypt_and_return_randomness(&mut rng, &x).unwrap();

        let base_secret = get_random_positive_int(&mut rng, &q).unwrap();
        let base = ECPoint::scalar_base_mult(CURVE, &base_secret);
        let q_point = base.scalar_mul(&x);

        (
            PdlWSlackStatement { ct, pk, q_point, base, n_tilde, h1, h2 },
            PdlWSlackWitness { x, r },
        )
    }

    #[test]
    fn test_pdl_with_slack_round_trip() {
        let mut rng = thread_rng();
        let q = CURVE.order();
        let session = b"pdl_slack";
        let (st, wit) = setup();

        let proof = PdlWSlackProof::new(session, &q, &wit, &st, &mut rng).unwrap();
        assert!(proof.verify(session, &q, &st));
        assert!(!proof.verify(b"other", &q, &st));
    }

    #[test]
    fn test_pdl_with_slack_rejects_wrong_point() {
        let mut rng = thread_rng();
        let q = CURVE.order();
        let session = b"pdl_slack_wrong";
        let (st, wit) = setup();

        let proof = PdlWSlackProof::new(session, &q, &wit, &st, &mut rng).unwrap();

        let mut wrong_st = st.clone();
        wrong_st.q_point = wrong_st.q_point.add(&wrong_st.base).unwrap();
        assert!(!proof.verify(session, &q, &wrong_st));
    }

    #[test]
    fn test_pdl_with_slack_rejects_wrong_ciphertext() {
        let mut rng = thread_rng();
        let q = CURVE.order();
        let session = b"pdl_slack_ct";
        let (st, wit) = setup();

        let proof = PdlWSlackProof::new(session, &q, &wit, &st, &mut rng).unwrap();

        let mut wrong_st = st.clone();
        let (other_ct, _) = wrong_st
            .pk
            .encrypt_and_return_randomness(&mut rng, &wit.x)
            .unwrap();
        wrong_st.ct = other_ct;
        assert!(!proof.verify(session, &q, &wrong_st));
    }

    #[test]
    fn test_pdl_with_slack_tampered_proof() {
        let mut rng = thread_rng();
        let q = CURVE.order();
        let session = b"pdl_slack_tamper";
        let (st, wit) = setup();

        let proof = PdlWSlackProof::new(session, &q, &wit, &st, &mut rng).unwrap();

        let mut tampered = proof.clone();
        tampered.s1 += 1;
        assert!(!tampered.verify(session, &q, &st));

        let mut tampered = proof;
        tampered.u2 += 1;
        assert!(!tampered.verify(session, &q, &st));
    }
}
