// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Shared fixtures for unit tests: pre-generated 2048-bit safe-prime
//! pre-parameters, so tests never pay the safe-prime search.

use num_bigint::BigInt;
use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::crypto::paillier::{key_pair_from_primes, PrivateKey, PublicKey};
use crate::protocols::keygen::types::LocalPreParams;

#[derive(Deserialize)]
struct RawPreParams {
    paillier_p: String,
    paillier_q: String,
    ntilde_p: String,
    ntilde_q: String,
    ntilde: String,
    h1: String,
    h2: String,
    alpha: String,
    beta: String,
}

static FIXTURES: Lazy<Vec<RawPreParams>> = Lazy::new(|| {
    serde_json::from_str(include_str!("../testdata/preparams.json")).expect("fixture json")
});

fn hex(s: &str) -> BigInt {
    BigInt::parse_bytes(s.as_bytes(), 16).expect("fixture hex")
}

/// Full pre-parameters for fixture party `i`.
pub(crate) fn fixture_pre_params(i: usize) -> LocalPreParams {
    let raw = &FIXTURES[i];
    let (sk, _pk) = key_pair_from_primes(hex(&raw.paillier_p), hex(&raw.paillier_q));
    LocalPreParams {
        paillier_sk: sk,
        n_tilde: hex(&raw.ntilde),
        h1: hex(&raw.h1),
        h2: hex(&raw.h2),
        p: Some(hex(&raw.ntilde_p)),
        q: Some(hex(&raw.ntilde_q)),
        alpha: Some(hex(&raw.alpha)),
        beta: Some(hex(&raw.beta)),
    }
}

/// (paillier pk, paillier sk, NTilde, h1, h2) of fixture party 0.
pub(crate) fn test_aux_params() -> (PublicKey, PrivateKey, BigInt, BigInt, BigInt) {
    aux_params(0)
}

/// Same, for fixture party 1 (an independent verifier-side parameter set).
pub(crate) fn test_aux_params_second() -> (PublicKey, PrivateKey, BigInt, BigInt, BigInt) {
    aux_params(1)
}

fn aux_params(i: usize) -> (PublicKey, PrivateKey, BigInt, BigInt, BigInt) {
    let pre = fixture_pre_params(i);
    let pk = pre.paillier_sk.public_key.clone();
    (pk, pre.paillier_sk, pre.n_tilde, pre.h1, pre.h2)
}
