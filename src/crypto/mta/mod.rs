// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Multiplicative-to-additive share conversion.
//!
//! A pair (Alice holding a, Bob holding b) derives additive shares
//! alpha + beta = a*b mod q without revealing a or b, via Alice's Paillier
//! key. Alice's ciphertext travels with a range proof bound to Bob's
//! auxiliary parameters; Bob's response carries a proof bound to Alice's.

pub mod proofs;
pub mod range_proof;

use num_bigint::BigInt;
use num_integer::Integer;
use rand::{CryptoRng, RngCore};
use thiserror::Error;

pub use proofs::{MtaProofError, ProofBob, ProofBobWC};
pub use range_proof::{RangeProofAlice, RangeProofError};

use crate::common::random::get_random_positive_int;
use crate::crypto::ecpoint::ECPoint;
use crate::crypto::paillier::{PaillierError, PrivateKey, PublicKey};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MtaError {
    #[error("alice range proof failed verification")]
    AliceProofFailed,
    #[error("bob proof failed verification")]
    BobProofFailed,
    #[error("paillier operation failed: {0}")]
    Paillier(#[from] PaillierError),
    #[error("range proof generation failed: {0}")]
    RangeProof(#[from] RangeProofError),
    #[error("bob proof generation failed: {0}")]
    BobProof(#[from] MtaProofError),
    #[error("sampling failed: {0}")]
    Sampling(String),
}

/// Alice's opening move: c_A = Enc_pkA(a), returning the ciphertext and its
/// randomness. Per-recipient range proofs are built with
/// [`RangeProofAlice::new`] against each recipient's auxiliary parameters.
pub fn alice_init<R: CryptoRng + RngCore>(
    pk_a: &PublicKey,
    a: &BigInt,
    rng: &mut R,
) -> Result<(BigInt, BigInt), MtaError> {
    Ok(pk_a.encrypt_and_return_randomness(rng, a)?)
}

/// Bob's response for the plain MtA: verifies Alice's range proof (bound to
/// Bob's own parameters), computes c_B = c_A^b * Enc_pkA(beta') and
/// beta = -beta' mod q, and proves the relation bound to Alice's parameters.
#[allow(clippy::too_many_arguments)]
pub fn bob_mid<R: CryptoRng + RngCore>(
    session: &[u8],
    curve_q: &BigInt,
    pk_a: &PublicKey,
    alice_proof: &RangeProofAlice,
    b: &BigInt,
    c_a: &BigInt,
    n_tilde_a: &BigInt,
    h1_a: &BigInt,
    h2_a: &BigInt,
    n_tilde_b: &BigInt,
    h1_b: &BigInt,
    h2_b: &BigInt,
    rng: &mut R,
) -> Result<(BigInt, BigInt, BigInt, ProofBob), MtaError> {
    if !alice_proof.verify(curve_q, pk_a, n_tilde_b, h1_b, h2_b, c_a) {
        return Err(MtaError::AliceProofFailed);
    }
    let (beta, c_b, beta_prm, r) = bob_respond(curve_q, pk_a, b, c_a, rng)?;
    let proof = ProofBob::new(
        session, curve_q, pk_a, n_tilde_a, h1_a, h2_a, c_a, &c_b, b, &beta_prm, &r, rng,
    )?;
    Ok((beta, c_b, beta_prm, proof))
}

/// Bob's response for MtA-with-check: as [`bob_mid`], but the proof also
/// binds b to the public point B = b*G.
#[allow(clippy::too_many_arguments)]
pub fn bob_mid_wc<R: CryptoRng + RngCore>(
    session: &[u8],
    curve_q: &BigInt,
    pk_a: &PublicKey,
    alice_proof: &RangeProofAlice,
    b: &BigInt,
    c_a: &BigInt,
    n_tilde_a: &BigInt,
    h1_a: &BigInt,
    h2_a: &BigInt,
    n_tilde_b: &BigInt,
    h1_b: &BigInt,
    h2_b: &BigInt,
    b_point: &ECPoint,
    rng: &mut R,
) -> Result<(BigInt, BigInt, BigInt, ProofBobWC), MtaError> {
    if !alice_proof.verify(curve_q, pk_a, n_tilde_b, h1_b, h2_b, c_a) {
        return Err(MtaError::AliceProofFailed);
    }
    let (beta, c_b, beta_prm, r) = bob_respond(curve_q, pk_a, b, c_a, rng)?;
    let proof = ProofBobWC::new(
        session,
        curve_q,
        pk_a,
        n_tilde_a,
        h1_a,
        h2_a,
        c_a,
        &c_b,
        b,
        &beta_prm,
        &r,
        Some(b_point),
        rng,
    )?;
    Ok((beta, c_b, beta_prm, proof))
}

fn bob_respond<R: CryptoRng + RngCore>(
    curve_q: &BigInt,
    pk_a: &PublicKey,
    b: &BigInt,
    c_a: &BigInt,
    rng: &mut R,
) -> Result<(BigInt, BigInt, BigInt, BigInt), MtaError> {
    // beta' <- [0, q^5)
    let q5 = curve_q * curve_q * curve_q * curve_q * curve_q;
    let beta_prm = get_random_positive_int(rng, &q5)
        .ok_or_else(|| MtaError::Sampling("failed to sample beta'".to_string()))?;

    let c_b_partial = pk_a.homo_mult(&b.mod_floor(&pk_a.n), c_a)?;
    let (enc_beta_prm, r) = pk_a.encrypt_and_return_randomness(rng, &beta_prm)?;
    let c_b = pk_a.homo_add(&c_b_partial, &enc_beta_prm)?;

    // beta = -beta' mod q
    let beta = (-&beta_prm).mod_floor(curve_q);
    Ok((beta, c_b, beta_prm, r))
}

/// Alice's share from the plain MtA: verifies Bob's proof (bound to Alice's
/// parameters) and decrypts. Returns (alpha mod q, raw plaintext).
#[allow(clippy::too_many_arguments)]
pub fn alice_end(
    session: &[u8],
    curve_q: &BigInt,
    pk_a: &PublicKey,
    sk_a: &PrivateKey,
    proof: &ProofBob,
    c_a: &BigInt,
    c_b: &BigInt,
    n_tilde_a: &BigInt,
    h1_a: &BigInt,
    h2_a: &BigInt,
) -> Result<(BigInt, BigInt), MtaError> {
    if !proof.verify(session, curve_q, pk_a, n_tilde_a, h1_a, h2_a, c_a, c_b) {
        return Err(MtaError::BobProofFailed);
    }
    let plaintext = sk_a.decrypt(c_b)?;
    Ok((plaintext.mod_floor(curve_q), plaintext))
}

/// Alice's share from MtA-with-check: as [`alice_end`], additionally
/// checking consistency against B = b*G.
#[allow(clippy::too_many_arguments)]
pub fn alice_end_wc(
    session: &[u8],
    curve_q: &BigInt,
    pk_a: &PublicKey,
    sk_a: &PrivateKey,
    proof: &ProofBobWC,
    b_point: &ECPoint,
    c_a: &BigInt,
    c_b: &BigInt,
    n_tilde_a: &BigInt,
    h1_a: &BigInt,
    h2_a: &BigInt,
) -> Result<(BigInt, BigInt), MtaError> {
    if !proof.verify(
        session, curve_q, pk_a, n_tilde_a, h1_a, h2_a, c_a, c_b, b_point,
    ) {
        return Err(MtaError::BobProofFailed);
    }
    let plaintext = sk_a.decrypt(c_b)?;
    Ok((plaintext.mod_floor(curve_q), plaintext))
}

#[cfg(test)]
mod mta_tests {
    use super::*;
    use crate::common::int::ModInt;
    use crate::test_support::{test_aux_params, test_aux_params_second};
    use crate::tss::curve::CurveId;
    use rand::thread_rng;

    const CURVE: CurveId = CurveId::Secp256k1;

    #[test]
    fn test_mta_round_trip() {
        let mut rng = thread_rng();
        let q = CURVE.order();
        let session = b"mta_round_trip";
        let (pk_a, sk_a, n_tilde_a, h1_a, h2_a) = test_aux_params();
        let (_, _, n_tilde_b, h1_b, h2_b) = test_aux_params_second();

        let a = get_random_positive_int(&mut rng, &q).unwrap();
        let b = get_random_positive_int(&mut rng, &q).unwrap();

        let (c_a, r_a) = alice_init(&pk_a, &a, &mut rng).unwrap();
        let alice_proof = RangeProofAlice::new(
            &q, &pk_a, &c_a, &n_tilde_b, &h1_b, &h2_b, &a, &r_a, &mut rng,
        )
        .unwrap();

        let (beta, c_b, _beta_prm, bob_proof) = bob_mid(
            session, &q, &pk_a, &alice_proof, &b, &c_a, &n_tilde_a, &h1_a, &h2_a, &n_tilde_b,
            &h1_b, &h2_b, &mut rng,
        )
        .unwrap();

        let (alpha, _) = alice_end(
            session, &q, &pk_a, &sk_a, &bob_proof, &c_a, &c_b, &n_tilde_a, &h1_a, &h2_a,
        )
        .unwrap();

        // alpha + beta == a*b mod q
        let mod_q = ModInt::new(q.clone());
        assert_eq!(mod_q.add(&alpha, &beta), mod_q.mul(&a, &b));
    }

    #[test]
    fn test_mta_with_check_round_trip() {
        let mut rng = thread_rng();
        let q = CURVE.order();
        let session = b"mta_wc_round_trip";
        let (pk_a, sk_a, n_tilde_a, h1_a, h2_a) = test_aux_params();
        let (_, _, n_tilde_b, h1_b, h2_b) = test_aux_params_second();

        let k = get_random_positive_int(&mut rng, &q).unwrap();
        let w = get_random_positive_int(&mut rng, &q).unwrap();
        let w_point = ECPoint::scalar_base_mult(CURVE, &w);

        let (c_a, r_a) = alice_init(&pk_a, &k, &mut rng).unwrap();
        let alice_proof = RangeProofAlice::new(
            &q, &pk_a, &c_a, &n_tilde_b, &h1_b, &h2_b, &k, &r_a, &mut rng,
        )
        .unwrap();

        let (nu, c_b, _nu_prm, bob_proof) = bob_mid_wc(
            session, &q, &pk_a, &alice_proof, &w, &c_a, &n_tilde_a, &h1_a, &h2_a, &n_tilde_b,
            &h1_b, &h2_b, &w_point, &mut rng,
        )
        .unwrap();

        let (mu, _) = alice_end_wc(
            session, &q, &pk_a, &sk_a, &bob_proof, &w_point, &c_a, &c_b, &n_tilde_a, &h1_a,
            &h2_a,
        )
        .unwrap();

        let mod_q = ModInt::new(q.clone());
        assert_eq!(mod_q.add(&mu, &nu), mod_q.mul(&k, &w));
    }

    #[test]
    fn test_bob_rejects_bad_alice_proof() {
        let mut rng = thread_rng();
        let q = CURVE.order();
        let (pk_a, _sk_a, n_tilde_a, h1_a, h2_a) = test_aux_params();
        let (_, _, n_tilde_b, h1_b, h2_b) = test_aux_params_second();

        let a = get_random_positive_int(&mut rng, &q).unwrap();
        let b = get_random_positive_int(&mut rng, &q).unwrap();
        let (c_a, r_a) = alice_init(&pk_a, &a, &mut rng).unwrap();
        let mut alice_proof = RangeProofAlice::new(
            &q, &pk_a, &c_a, &n_tilde_b, &h1_b, &h2_b, &a, &r_a, &mut rng,
        )
        .unwrap();
        alice_proof.s1 += 1;

        let res = bob_mid(
            b"s", &q, &pk_a, &alice_proof, &b, &c_a, &n_tilde_a, &h1_a, &h2_a, &n_tilde_b, &h1_b,
            &h2_b, &mut rng,
        );
        assert!(matches!(res, Err(MtaError::AliceProofFailed)));
    }

    #[test]
    fn test_alice_rejects_wrong_w_point() {
        let mut rng = thread_rng();
        let q = CURVE.order();
        let session = b"mta_wc_wrong_point";
        let (pk_a, sk_a, n_tilde_a, h1_a, h2_a) = test_aux_params();
        let (_, _, n_tilde_b, h1_b, h2_b) = test_aux_params_second();

        let k = get_random_positive_int(&mut rng, &q).unwrap();
        let w = get_random_positive_int(&mut rng, &q).unwrap();
        let w_point = ECPoint::scalar_base_mult(CURVE, &w);

        let (c_a, r_a) = alice_init(&pk_a, &k, &mut rng).unwrap();
        let alice_proof = RangeProofAlice::new(
            &q, &pk_a, &c_a, &n_tilde_b, &h1_b, &h2_b, &k, &r_a, &mut rng,
        )
        .unwrap();
        let (_nu, c_b, _nu_prm, bob_proof) = bob_mid_wc(
            session, &q, &pk_a, &alice_proof, &w, &c_a, &n_tilde_a, &h1_a, &h2_a, &n_tilde_b,
            &h1_b, &h2_b, &w_point, &mut rng,
        )
        .unwrap();

        let wrong_point = ECPoint::scalar_base_mult(CURVE, &(w + 1));
        let res = alice_end_wc(
            session, &q, &pk_a, &sk_a, &bob_proof, &wrong_point, &c_a, &c_b, &n_tilde_a, &h1_a,
            &h2_a,
        );
        assert!(matches!(res, Err(MtaError::BobProofFailed)));
    }
}
