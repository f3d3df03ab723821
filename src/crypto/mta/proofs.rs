// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Bob's proofs for the MtA protocol (GG18 Figs. 10 & 11): the response
//! ciphertext was formed homomorphically with bounded multiplier and offset,
//! optionally consistent with a public point B = b*G (the "with check"
//! variant used for the chi shares).

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
use crate::crypto::ecpoint::{ECPoint, PointError};
use crate::crypto::paillier::PublicKey;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MtaProofError {
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    #[error("proof generation failed: {0}")]
    Generation(String),
    #[error("point operation failed: {0}")]
    Point(String),
}

impl From<PointError> for MtaProofError {
    fn from(err: PointError) -> Self {
        MtaProofError::Point(err.to_string())
    }
}

/// Bob's proof without the consistency check (Fig. 11).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofBob {
    pub z: BigInt,
    pub z_prm: BigInt,
    pub t: BigInt,
    pub v: BigInt,
    pub w: BigInt,
    pub s: BigInt,
    pub s1: BigInt,
    pub s2: BigInt,
    pub t1: BigInt,
    pub t2: BigInt,
}

/// Bob's proof with the consistency check against B = b*G (Fig. 10).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofBobWC {
    pub proof_bob: ProofBob,
    pub u: ECPoint,
}

impl ProofBobWC {
    /// Builds Bob's proof for `c2 = c1^x * Enc_pk(y; r)`. When `x_pub` is
    /// given the proof additionally binds x to X = x*G.
    #[allow(clippy::too_many_arguments)]
    pub fn new<R: CryptoRng + RngCore>(
        session: &[u8],
        curve_q: &BigInt,
        pk: &PublicKey,
        n_tilde: &BigInt,
        h1: &BigInt,
        h2: &BigInt,
        c1: &BigInt,
        c2: &BigInt,
        x: &BigInt,
        y: &BigInt,
        r: &BigInt,
        x_pub: Option<&ECPoint>,
        rng: &mut R,
    ) -> Result<Self, MtaProofError> {
        if !pk.n.is_positive() || !n_tilde.is_positive() || !h1.is_positive() || !h2.is_positive()
        {
            return Err(MtaProofError::InvalidParameters(
                "N, NTilde, h1, h2 must be positive".to_string(),
            ));
        }
        if let Some(x_p) = x_pub {
            if !x_p.validate_basic() {
                return Err(MtaProofError::InvalidParameters("invalid X".to_string()));
            }
        }

        let n = &pk.n;
        let n_square = pk.n_square();
        let mod_n_tilde = ModInt::new(n_tilde.clone());
        let mod_n_square = ModInt::new(n_square);
        let mod_n = ModInt::new(n.clone());

        let q3 = curve_q * curve_q * curve_q;
        let q7 = &q3 * &q3 * curve_q;
        let q_n_tilde = curve_q * n_tilde;
        let q3_n_tilde = &q3 * n_tilde;

        let sample = |rng: &mut R, bound: &BigInt, what: &str| {
            get_random_positive_int(rng, bound)
                .ok_or_else(|| MtaProofError::Generation(format!("failed to sample {}", what)))
        };

        let alpha = sample(rng, &q3, "alpha")?;
        let rho = sample(rng, &q_n_tilde, "rho")?;
        let sigma = sample(rng, &q_n_tilde, "sigma")?;
        let tau = sample(rng, &q3_n_tilde, "tau")?;
        let rho_prm = sample(rng, &q3_n_tilde, "rho_prm")?;
        let beta = get_random_positive_relatively_prime_int(rng, n)
            .ok_or_else(|| MtaProofError::Generation("failed to sample beta".to_string()))?;
        let gamma = sample(rng, &q7, "gamma")?;

        // u = alpha*G, only meaningful for the with-check variant
        let u = match x_pub {
            Some(x_p) => ECPoint::scalar_base_mult(x_p.curve(), &alpha),
            None => {
                // placeholder; never hashed nor checked without X
                ECPoint::generator(crate::tss::curve::CurveId::Secp256k1)
            }
        };

        // z  = h1^x * h2^rho        mod NTilde
        // z' = h1^alpha * h2^rho'   mod NTilde
        // t  = h1^y * h2^sigma      mod NTilde
        // w  = h1^gamma * h2^tau    mod NTilde
        let z = mod_n_tilde.mul(&mod_n_tilde.exp(h1, x), &mod_n_tilde.exp(h2, &rho));
        let z_prm = mod_n_tilde.mul(&mod_n_tilde.exp(h1, &alpha), &mod_n_tilde.exp(h2, &rho_prm));
        let t_val = mod_n_tilde.mul(&mod_n_tilde.exp(h1, y), &mod_n_tilde.exp(h2, &sigma));
        let w = mod_n_tilde.mul(&mod_n_tilde.exp(h1, &gamma), &mod_n_tilde.exp(h2, &tau));

        // v = c1^alpha * (N+1)^gamma * beta^N mod N^2
        let v = mod_n_square.mul(
            &mod_n_square.mul(
                &mod_n_square.exp(c1, &alpha),
                &mod_n_square.exp(&pk.gamma(), &gamma),
            ),
            &mod_n_square.exp(&beta, n),
        );

        let e = bob_challenge(
            session, curve_q, pk, c1, c2, x_pub, &u, &z, &z_prm, &t_val, &v, &w,
        )
        .ok_or_else(|| MtaProofError::Generation("challenge hash failed".to_string()))?;

        // s = r^e * beta mod N; responses over the integers
        let s = mod_n.mul(&mod_n.exp(r, &e), &beta);
        let s1 = &alpha + &e * x;
        let s2 = &rho_prm + &e * &rho;
        let t1 = &gamma + &e * y;
        let t2 = &tau + &e * &sigma;

        let proof_bob = ProofBob { z, z_prm, t: t_val, v, w, s, s1, s2, t1, t2 };
        Ok(Self { proof_bob, u })
    }

    /// Verifies the with-check proof against X = x*G.
    #[allow(clippy::too_many_arguments)]
    pub fn verify(
        &self,
        session: &[u8],
        curve_q: &BigInt,
        pk: &PublicKey,
        n_tilde: &BigInt,
        h1: &BigInt,
        h2: &BigInt,
        c1: &BigInt,
        c2: &BigInt,
        x_pub: &ECPoint,
    ) -> bool {
        if !self.validate_basic() || !x_pub.validate_basic() {
            return false;
        }
        let e = match self.proof_bob.verify_common(
            session,
            curve_q,
            pk,
            n_tilde,
            h1,
            h2,
            c1,
            c2,
            Some((x_pub, &self.u)),
        ) {
            Some(e) => e,
            None => return false,
        };

        // s1*G == u + e*X
        let curve = x_pub.curve();
        let lhs = ECPoint::scalar_base_mult(curve, &self.proof_bob.s1);
        let rhs = match self.u.add(&x_pub.scalar_mul(&e)) {
            Ok(p) => p,
            Err(_) => return false,
        };
        if lhs != rhs {
            debug!("proof bob wc: point check failed");
            return false;
        }
        true
    }

    pub fn validate_basic(&self) -> bool {
        self.proof_bob.validate_basic() && self.u.validate_basic()
    }
}

impl ProofBob {
    /// Builds the no-check variant (Fig. 11).
    #[allow(clippy::too_many_arguments)]
    pub fn new<R: CryptoRng + RngCore>(
        session: &[u8],
        curve_q: &BigInt,
        pk: &PublicKey,
        n_tilde: &BigInt,
        h1: &BigInt,
        h2: &BigInt,
        c1: &BigInt,
        c2: &BigInt,
        x: &BigInt,
        y: &BigInt,
        r: &BigInt,
        rng: &mut R,
    ) -> Result<Self, MtaProofError> {
        let pf = ProofBobWC::new(
            session, curve_q, pk, n_tilde, h1, h2, c1, c2, x, y, r, None, rng,
        )?;
        Ok(pf.proof_bob)
    }

    /// Verifies the no-check variant.
    #[allow(clippy::too_many_arguments)]
    pub fn verify(
        &self,
        session: &[u8],
        curve_q: &BigInt,
        pk: &PublicKey,
        n_tilde: &BigInt,
        h1: &BigInt,
        h2: &BigInt,
        c1: &BigInt,
        c2: &BigInt,
    ) -> bool {
        if !self.validate_basic() {
            return false;
        }
        self.verify_common(session, curve_q, pk, n_tilde, h1, h2, c1, c2, None)
            .is_some()
    }

    /// Shared range, gcd and algebraic checks. Returns the challenge on
    /// success so the with-check variant can run its point equation.
    #[allow(clippy::too_many_arguments)]
    fn verify_common(
        &self,
        session: &[u8],
        curve_q: &BigInt,
        pk: &PublicKey,
        n_tilde: &BigInt,
        h1: &BigInt,
        h2: &BigInt,
        c1: &BigInt,
        c2: &BigInt,
        wc: Option<(&ECPoint, &ECPoint)>,
    ) -> Option<BigInt> {
        if !pk.n.is_positive() || !n_tilde.is_positive() {
            return None;
        }
        let n = &pk.n;
        let n_square = pk.n_square();
        let mod_n_tilde = ModInt::new(n_tilde.clone());
        let mod_n_square = ModInt::new(n_square.clone());

        let q3 = curve_q * curve_q * curve_q;
        let q7 = &q3 * &q3 * curve_q;

        if !is_in_interval(&self.z, n_tilde)
            || !is_in_interval(&self.z_prm, n_tilde)
            || !is_in_interval(&self.t, n_tilde)
            || !is_in_interval(&self.v, &n_square)
            || !is_in_interval(&self.w, n_tilde)
            || !is_in_interval(&self.s, n)
        {
            debug!("proof bob: interval check failed");
            return None;
        }
        if self.s1.is_negative() || self.s2.is_negative() || self.t1.is_negative()
            || self.t2.is_negative()
        {
            debug!("proof bob: negative response");
            return None;
        }
        // soundness bounds on the responses
        if self.s1 > q3 || self.t1 > q7 {
            debug!("proof bob: response exceeds bound");
            return None;
        }
        if !self.z.gcd(n_tilde).is_one()
            || !self.z_prm.gcd(n_tilde).is_one()
            || !self.t.gcd(n_tilde).is_one()
            || !self.v.gcd(&n_square).is_one()
            || !self.w.gcd(n_tilde).is_one()
            || !self.s.gcd(n).is_one()
        {
            debug!("proof bob: gcd check failed");
            return None;
        }

        let (x_pub, u) = match wc {
            Some((x_pub, u)) => (Some(x_pub), u.clone()),
            None => (None, ECPoint::generator(crate::tss::curve::CurveId::Secp256k1)),
        };
        let e = bob_challenge(
            session, curve_q, pk, c1, c2, x_pub, &u, &self.z, &self.z_prm, &self.t, &self.v,
            &self.w,
        )?;

        // h1^s1 * h2^s2 == z' * z^e mod NTilde
        let lhs = mod_n_tilde.mul(&mod_n_tilde.exp(h1, &self.s1), &mod_n_tilde.exp(h2, &self.s2));
        let rhs = mod_n_tilde.mul(&self.z_prm, &mod_n_tilde.exp(&self.z, &e));
        if lhs != rhs {
            debug!("proof bob: z-relation check failed");
            return None;
        }

        // c1^s1 * (N+1)^t1 * s^N == v * c2^e mod N^2
        let lhs = mod_n_square.mul(
            &mod_n_square.mul(
                &mod_n_square.exp(c1, &self.s1),
                &mod_n_square.exp(&pk.gamma(), &self.t1),
            ),
            &mod_n_square.exp(&self.s, n),
        );
        let rhs = mod_n_square.mul(&self.v, &mod_n_square.exp(c2, &e));
        if lhs != rhs {
            debug!("proof bob: ciphertext check failed");
            return None;
        }

        // h1^t1 * h2^t2 == w * t^e mod NTilde
        let lhs = mod_n_tilde.mul(&mod_n_tilde.exp(h1, &self.t1), &mod_n_tilde.exp(h2, &self.t2));
        let rhs = mod_n_tilde.mul(&self.w, &mod_n_tilde.exp(&self.t, &e));
        if lhs != rhs {
            debug!("proof bob: t-relation check failed");
            return None;
        }

        Some(e)
    }

    pub fn validate_basic(&self) -> bool {
        !self.z.is_zero()
            && !self.z_prm.is_zero()
            && !self.t.is_zero()
            && !self.v.is_zero()
            && !self.w.is_zero()
            && !self.s.is_zero()
            && !self.s1.is_zero()
            && !self.s2.is_zero()
            && !self.t1.is_zero()
            && !self.t2.is_zero()
    }
}

#[allow(clippy::too_many_arguments)]
fn bob_challenge(
    session: &[u8],
    curve_q: &BigInt,
    pk: &PublicKey,
    c1: &BigInt,
    c2: &BigInt,
    x_pub: Option<&ECPoint>,
    u: &ECPoint,
    z: &BigInt,
    z_prm: &BigInt,
    t: &BigInt,
    v: &BigInt,
    w: &BigInt,
) -> Option<BigInt> {
    let pk_ints = pk.as_ints();
    let hash = match x_pub {
        Some(x_p) => {
            let (xx, xy) = x_p.coords();
            let (ux, uy) = u.coords();
            sha512_256i_tagged(
                session,
                &[&pk_ints[0], &pk_ints[1], &xx, &xy, c1, c2, &ux, &uy, z, z_prm, t, v, w],
            )?
        }
        None => sha512_256i_tagged(
            session,
            &[&pk_ints[0], &pk_ints[1], c1, c2, z, z_prm, t, v, w],
        )?,
    };
    Some(rejection_sample(curve_q, &hash))
}
