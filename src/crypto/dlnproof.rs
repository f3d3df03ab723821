// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Discrete-log proof over the hidden-order group modulo NTilde.
//!
//! Proves knowledge of x with h2 = h1^x mod NTilde, where NTilde = P*Q is a
//! product of safe primes P = 2p+1, Q = 2q+1 and the witness lives in
//! Z_{p*q}. Binary-challenge sigma protocol, Fiat-Shamir compressed over
//! ITERATIONS parallel instances.

use log::debug;
use num_bigint::BigInt;
use num_traits::{One, Signed};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::common::hash::sha512_256i;
use crate::common::int::ModInt;
use crate::common::random::get_random_positive_int;

pub const ITERATIONS: usize = 128;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DlnError {
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    #[error("internal error: {0}")]
    Internal(String),
}

/// The proof: per-iteration commitments alpha_i and responses t_i.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DlnProof {
    pub alpha: Vec<BigInt>,
    pub t: Vec<BigInt>,
}

impl DlnProof {
    /// Creates a proof of h2 = h1^x mod n. `p` and `q` are the Sophie
    /// Germain halves of the safe-prime factors of `n`.
    pub fn new<R: CryptoRng + RngCore>(
        h1: &BigInt,
        h2: &BigInt,
        x: &BigInt,
        p: &BigInt,
        q: &BigInt,
        n: &BigInt,
        rng: &mut R,
    ) -> Result<Self, DlnError> {
        if !h1.is_positive() || !h2.is_positive() || !p.is_positive() || !q.is_positive()
            || !n.is_positive() || x.is_negative()
        {
            return Err(DlnError::InvalidParameters(
                "all of h1, h2, p, q, n must be positive and x non-negative".to_string(),
            ));
        }

        let p_mul_q = p * q;
        let mod_n = ModInt::new(n.clone());
        let mod_pq = ModInt::new(p_mul_q.clone());

        let mut a_vals = Vec::with_capacity(ITERATIONS);
        let mut alpha_vals = Vec::with_capacity(ITERATIONS);
        for _ in 0..ITERATIONS {
            let a = get_random_positive_int(rng, &p_mul_q)
                .ok_or_else(|| DlnError::Internal("failed to sample a_i".to_string()))?;
            alpha_vals.push(mod_n.exp(h1, &a));
            a_vals.push(a);
        }

        let c = challenge(h1, h2, n, &alpha_vals)
            .ok_or_else(|| DlnError::Internal("challenge hash failed".to_string()))?;

        let mut t_vals = Vec::with_capacity(ITERATIONS);
        for i in 0..ITERATIONS {
            // t_i = a_i + c_i * x mod p*q, with c_i the i-th challenge bit
            let t = if c.bit(i as u64) {
                mod_pq.add(&a_vals[i], x)
            } else {
                mod_pq.reduce(&a_vals[i])
            };
            t_vals.push(t);
        }

        Ok(DlnProof { alpha: alpha_vals, t: t_vals })
    }

    pub fn verify(&self, h1: &BigInt, h2: &BigInt, n: &BigInt) -> bool {
        if self.alpha.len() != ITERATIONS || self.t.len() != ITERATIONS || !n.is_positive() {
            debug!("dln verify: malformed proof or modulus");
            return false;
        }

        let mod_n = ModInt::new(n.clone());
        let one = BigInt::one();

        let h1_mod = mod_n.reduce(h1);
        let h2_mod = mod_n.reduce(h2);
        if h1_mod <= one || h1_mod >= *n || h2_mod <= one || h2_mod >= *n || h1_mod == h2_mod {
            debug!("dln verify: invalid h1/h2");
            return false;
        }
        for alpha in &self.alpha {
            let a_mod = mod_n.reduce(alpha);
            if a_mod <= one || a_mod >= *n {
                debug!("dln verify: alpha out of range");
                return false;
            }
        }
        for t in &self.t {
            let t_mod = mod_n.reduce(t);
            if t_mod <= one || t_mod >= *n {
                debug!("dln verify: t out of range");
                return false;
            }
        }

        let c = match challenge(h1, h2, n, &self.alpha) {
            Some(c) => c,
            None => return false,
        };

        // h1^t_i == alpha_i * h2^c_i mod n
        for i in 0..ITERATIONS {
            let lhs = mod_n.exp(h1, &self.t[i]);
            let rhs = if c.bit(i as u64) {
                mod_n.mul(&self.alpha[i], &h2_mod)
            } else {
                mod_n.reduce(&self.alpha[i])
            };
            if lhs != rhs {
                debug!("dln verify: check failed at iteration {}", i);
                return false;
            }
        }
        true
    }
}

fn challenge(h1: &BigInt, h2: &BigInt, n: &BigInt, alphas: &[BigInt]) -> Option<BigInt> {
    let mut hash_input: Vec<&BigInt> = Vec::with_capacity(3 + alphas.len());
    hash_input.push(h1);
    hash_input.push(h2);
    hash_input.push(n);
    hash_input.extend(alphas.iter());
    sha512_256i(&hash_input)
}
