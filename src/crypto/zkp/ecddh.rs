// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Chaum-Pedersen discrete-log equality over two bases: given (g1, h1) and
//! (g2, h2), proves knowledge of x with h1 = x*g1 and h2 = x*g2. Used by the
//! type-7 identifiable-abort branch to tie sigma*G to sigma*R.

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
pub enum EcddhError {
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    #[error("point operation failed: {0}")]
    Point(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<PointError> for EcddhError {
    fn from(err: PointError) -> Self {
        EcddhError::Point(err.to_string())
    }
}

/// The statement: two base points and their images under the same scalar.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcddhStatement {
    pub g1: ECPoint,
    pub h1: ECPoint,
    pub g2: ECPoint,
    pub h2: ECPoint,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcddhProof {
    pub a1: ECPoint,
    pub a2: ECPoint,
    pub t: BigInt,
}

impl EcddhProof {
    pub fn new<R: CryptoRng + RngCore>(
        session: &[u8],
        x: &BigInt,
        statement: &EcddhStatement,
        rng: &mut R,
    ) -> Result<Self, EcddhError> {
        if x.is_negative() {
            return Err(EcddhError::InvalidParameters("negative witness".to_string()));
        }
        let st = statement;
        if !st.g1.validate_basic() || !st.g2.validate_basic() {
            return Err(EcddhError::InvalidParameters("invalid base points".to_string()));
        }
        let curve = st.g1.curve();
        let q = curve.order();
        let mod_q = ModInt::new(q.clone());

        let a = get_random_positive_int(rng, &q)
            .ok_or_else(|| EcddhError::Internal("failed to sample a".to_string()))?;
        let a1 = st.g1.scalar_mul(&a);
        let a2 = st.g2.scalar_mul(&a);

        let e = challenge(session, st, &a1, &a2, &q)
            .ok_or_else(|| EcddhError::Internal("challenge hash failed".to_string()))?;

        let t = mod_q.add(&a, &mod_q.mul(&e, x));
        Ok(Self { a1, a2, t })
    }

    /// Checks t*g1 == a1 + e*h1 and t*g2 == a2 + e*h2.
    pub fn verify(&self, session: &[u8], statement: &EcddhStatement) -> bool {
        let st = statement;
        if !st.g1.validate_basic() || !st.g2.validate_basic() {
            return false;
        }
        let q = st.g1.curve().order();

        let e = match challenge(session, st, &self.a1, &self.a2, &q) {
            Some(e) => e,
            None => return false,
        };

        let lhs1 = st.g1.scalar_mul(&self.t);
        let rhs1 = match self.a1.add(&st.h1.scalar_mul(&e)) {
            Ok(p) => p,
            Err(_) => return false,
        };
        if lhs1 != rhs1 {
            return false;
        }

        let lhs2 = st.g2.scalar_mul(&self.t);
        let rhs2 = match self.a2.add(&st.h2.scalar_mul(&e)) {
            Ok(p) => p,
            Err(_) => return false,
        };
        lhs2 == rhs2
    }
}

fn challenge(
    session: &[u8],
    st: &EcddhStatement,
    a1: &ECPoint,
    a2: &ECPoint,
    q: &BigInt,
) -> Option<BigInt> {
    let coords = [
        st.g1.coords(),
        st.h1.coords(),
        st.g2.coords(),
        st.h2.coords(),
        a1.coords(),
        a2.coords(),
    ];
    let mut ints: Vec<&BigInt> = Vec::with_capacity(12);
    for (x, y) in &coords {
        ints.push(x);
        ints.push(y);
    }
    let hash = sha512_256i_tagged(session, &ints)?;
    Some(rejection_sample(q, &hash))
}
