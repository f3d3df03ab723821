// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Alice's range proof for the MtA protocol (GG18 Fig. 9): the plaintext of
//! a Paillier ciphertext is bounded by q^3, with respect to the verifier's
//! auxiliary parameters (NTilde, h1, h2).

use log::debug;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::common::hash::sha512_256i;
use crate::common::hash_utils::rejection_sample;
use crate::common::int::{is_in_interval, ModInt};
use crate::common::random::{get_random_positive_int, get_random_positive_relatively_prime_int};
use crate::crypto::paillier::PublicKey;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeProofError {
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    #[error("proof generation failed: {0}")]
    Generation(String),
}

/// The proof tuple (z, u, w, s, s1, s2).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeProofAlice {
    pub z: BigInt,
    pub u: BigInt,
    pub w: BigInt,
    pub s: BigInt,
    pub s1: BigInt,
    pub s2: BigInt,
}

impl RangeProofAlice {
    /// Proves that the plaintext `m` of `c = Enc_pk(m; r)` is small, bound to
    /// the verifier's (n_tilde, h1, h2).
    #[allow(clippy::too_many_arguments)]
    pub fn new<R: CryptoRng + RngCore>(
        curve_q: &BigInt,
        pk: &PublicKey,
        c: &BigInt,
        n_tilde: &BigInt,
        h1: &BigInt,
        h2: &BigInt,
        m: &BigInt,
        r: &BigInt,
        rng: &mut R,
    ) -> Result<Self, RangeProofError> {
        if !pk.n.is_positive() || !n_tilde.is_positive() || !h1.is_positive() || !h2.is_positive()
        {
            return Err(RangeProofError::InvalidParameters(
                "N, NTilde, h1, h2 must be positive".to_string(),
            ));
        }

        let n = &pk.n;
        let n_square = pk.n_square();
        let mod_n_tilde = ModInt::new(n_tilde.clone());
        let mod_n_square = ModInt::new(n_square);
        let mod_n = ModInt::new(n.clone());

        let q3 = curve_q * curve_q * curve_q;
        let q_n_tilde = curve_q * n_tilde;
        let q3_n_tilde = &q3 * n_tilde;

        let sample = |rng: &mut R, bound: &BigInt, what: &str| {
            get_random_positive_int(rng, bound)
                .ok_or_else(|| RangeProofError::Generation(format!("failed to sample {}", what)))
        };

        let alpha = sample(rng, &q3, "alpha")?;
        let beta = get_random_positive_relatively_prime_int(rng, n)
            .ok_or_else(|| RangeProofError::Generation("failed to sample beta".to_string()))?;
        let gamma = sample(rng, &q3_n_tilde, "gamma")?;
        let rho = sample(rng, &q_n_tilde, "rho")?;

        // z = h1^m * h2^rho mod NTilde
        let z = mod_n_tilde.mul(&mod_n_tilde.exp(h1, m), &mod_n_tilde.exp(h2, &rho));
        // u = (N+1)^alpha * beta^N mod N^2
        let u = mod_n_square.mul(
            &mod_n_square.exp(&pk.gamma(), &alpha),
            &mod_n_square.exp(&beta, n),
        );
        // w = h1^alpha * h2^gamma mod NTilde
        let w = mod_n_tilde.mul(&mod_n_tilde.exp(h1, &alpha), &mod_n_tilde.exp(h2, &gamma));

        let e = challenge(curve_q, pk, c, &z, &u, &w)
            .ok_or_else(|| RangeProofError::Generation("challenge hash failed".to_string()))?;

        // s = r^e * beta mod N
        let s = mod_n.mul(&mod_n.exp(r, &e), &beta);
        // responses over the integers, no reduction
        let s1 = &alpha + &e * m;
        let s2 = &gamma + &e * &rho;

        Ok(Self { z, u, w, s, s1, s2 })
    }

    /// Verifies the proof against the same auxiliary parameters Alice bound
    /// it to.
    pub fn verify(
        &self,
        curve_q: &BigInt,
        pk: &PublicKey,
        n_tilde: &BigInt,
        h1: &BigInt,
        h2: &BigInt,
        c: &BigInt,
    ) -> bool {
        if !self.validate_basic() || !pk.n.is_positive() || !n_tilde.is_positive() {
            debug!("range proof alice: basic validation failed");
            return false;
        }

        let n = &pk.n;
        let n_square = pk.n_square();
        let mod_n_tilde = ModInt::new(n_tilde.clone());
        let mod_n_square = ModInt::new(n_square.clone());

        let q3 = curve_q * curve_q * curve_q;
        if !is_in_interval(&self.z, n_tilde)
            || !is_in_interval(&self.u, &n_square)
            || !is_in_interval(&self.w, n_tilde)
            || !is_in_interval(&self.s, n)
        {
            debug!("range proof alice: interval check failed");
            return false;
        }
        // the soundness bound on the response
        if self.s1 > q3 {
            debug!("range proof alice: s1 exceeds q^3");
            return false;
        }
        if !self.z.gcd(n_tilde).is_one()
            || !self.u.gcd(&n_square).is_one()
            || !self.w.gcd(n_tilde).is_one()
            || !self.s.gcd(n).is_one()
        {
            debug!("range proof alice: gcd check failed");
            return false;
        }

        let e = match challenge(curve_q, pk, c, &self.z, &self.u, &self.w) {
            Some(e) => e,
            None => return false,
        };

        // (N+1)^s1 * s^N * c^-e == u mod N^2
        let c_inv = match mod_n_square.mod_inverse(c) {
            Some(inv) => inv,
            None => {
                debug!("range proof alice: c not invertible mod N^2");
                return false;
            }
        };
        let lhs1 = mod_n_square.mul(
            &mod_n_square.mul(
                &mod_n_square.exp(&pk.gamma(), &self.s1),
                &mod_n_square.exp(&self.s, n),
            ),
            &mod_n_square.exp(&c_inv, &e),
        );
        if lhs1 != self.u {
            debug!("range proof alice: ciphertext check failed");
            return false;
        }

        // h1^s1 * h2^s2 * z^-e == w mod NTilde
        let z_inv = match mod_n_tilde.mod_inverse(&self.z) {
            Some(inv) => inv,
            None => {
                debug!("range proof alice: z not invertible mod NTilde");
                return false;
            }
        };
        let lhs2 = mod_n_tilde.mul(
            &mod_n_tilde.mul(
                &mod_n_tilde.exp(h1, &self.s1),
                &mod_n_tilde.exp(h2, &self.s2),
            ),
            &mod_n_tilde.exp(&z_inv, &e),
        );
        if lhs2 != self.w {
            debug!("range proof alice: commitment check failed");
            return false;
        }

        true
    }

    pub fn validate_basic(&self) -> bool {
        !self.z.is_zero()
            && !self.u.is_zero()
            && !self.w.is_zero()
            && !self.s.is_zero()
            && !self.s1.is_zero()
            && !self.s2.is_zero()
    }
}

fn challenge(
    curve_q: &BigInt,
    pk: &PublicKey,
    c: &BigInt,
    z: &BigInt,
    u: &BigInt,
    w: &BigInt,
) -> Option<BigInt> {
    let pk_ints = pk.as_ints();
    let hash = sha512_256i(&[&pk_ints[0], &pk_ints[1], c, z, u, w])?;
    Some(rejection_sample(curve_q, &hash))
}
