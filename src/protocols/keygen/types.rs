// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Key generation state: pre-parameters, save data and per-session scratch.

use std::time::Duration;

use log::info;
use num_bigint::BigInt;
use num_traits::One;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use crate::common::int::ModInt;
use crate::common::random::{
    get_random_generator_of_quadratic_residue, get_random_positive_relatively_prime_int,
};
use crate::common::safe_prime::get_random_safe_primes_concurrent;
use crate::common::secret::SecretInt;
use crate::crypto::ecpoint::ECPoint;
use crate::crypto::paillier::{self, PaillierError, PrivateKey, PublicKey};
use crate::crypto::vss::{Share, Vs};
use crate::crypto::commitments::HashDeCommitment;
use crate::tss::message::ParsedMessage;
use crate::tss::round::PeerBitset;

use super::messages::{
    KGRound1Message, KGRound2Message1, KGRound2Message2, KGRound4Message, KeygenMessage,
};

/// Bit length of the Paillier modulus and of NTilde. Mandatory; peers reject
/// anything else.
pub const MODULUS_BIT_LEN: usize = 2048;

/// Per-identity pre-parameters: the Paillier key and the auxiliary
/// (NTilde, h1, h2) with their generation witnesses. Generated once and
/// reusable across sessions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LocalPreParams {
    pub paillier_sk: PrivateKey,
    pub n_tilde: BigInt,
    pub h1: BigInt,
    pub h2: BigInt,
    /// Sophie Germain half of NTilde's first factor.
    pub p: Option<BigInt>,
    /// Sophie Germain half of NTilde's second factor.
    pub q: Option<BigInt>,
    /// Discrete log of h2 base h1 modulo p*q.
    pub alpha: Option<BigInt>,
    /// alpha^-1 mod p*q.
    pub beta: Option<BigInt>,
}

impl LocalPreParams {
    pub fn validate(&self) -> bool {
        self.paillier_sk.public_key.n.bits() == MODULUS_BIT_LEN as u64
            && self.n_tilde.bits() == MODULUS_BIT_LEN as u64
            && self.h1 > BigInt::one()
            && self.h2 > BigInt::one()
            && self.h1 != self.h2
    }

    /// Full validation, requiring the DLN witnesses to be present. Only
    /// pre-parameters passing this can produce round-1 proofs.
    pub fn validate_with_proof(&self) -> bool {
        self.validate()
            && self.p.is_some()
            && self.q.is_some()
            && self.alpha.is_some()
            && self.beta.is_some()
    }

    /// Generates fresh pre-parameters: a 2048-bit Paillier key and an
    /// independent NTilde = P*Q from safe primes, with h1, h2 generating the
    /// quadratic residues. The safe-prime searches run on `concurrency`
    /// workers under `timeout`.
    pub fn generate(concurrency: usize, timeout: Duration) -> Result<Self, PaillierError> {
        info!("generating pre-parameters ({} bit moduli)", MODULUS_BIT_LEN);
        let (paillier_sk, _) = paillier::generate_key_pair(MODULUS_BIT_LEN, concurrency, timeout)?;

        let sgps =
            get_random_safe_primes_concurrent(MODULUS_BIT_LEN / 2, 2, concurrency, timeout)?;
        let p = sgps[0].prime().clone();
        let q = sgps[1].prime().clone();
        let n_tilde = sgps[0].safe_prime() * sgps[1].safe_prime();

        let mut rng = OsRng;
        let p_mul_q = &p * &q;
        let h1 = get_random_generator_of_quadratic_residue(&mut rng, &n_tilde)
            .ok_or_else(|| PaillierError::Internal("failed to sample h1".to_string()))?;
        let alpha = get_random_positive_relatively_prime_int(&mut rng, &p_mul_q)
            .ok_or_else(|| PaillierError::Internal("failed to sample alpha".to_string()))?;
        let beta = alpha
            .modinv(&p_mul_q)
            .ok_or_else(|| PaillierError::Internal("alpha not invertible".to_string()))?;
        let h2 = ModInt::new(n_tilde.clone()).exp(&h1, &alpha);

        Ok(Self {
            paillier_sk,
            n_tilde,
            h1,
            h2,
            p: Some(p),
            q: Some(q),
            alpha: Some(alpha),
            beta: Some(beta),
        })
    }
}

/// The saved-key artifact produced by a successful DKG run. Per-peer arrays
/// follow the sorted cohort order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LocalPartySaveData {
    pub pre_params: Option<LocalPreParams>,
    /// This party's secret Shamir share x_i.
    pub xi: Option<BigInt>,
    /// This party's Shamir evaluation abscissa.
    pub share_id: Option<BigInt>,
    /// All parties' abscissas, in cohort order.
    pub ks: Vec<BigInt>,
    pub n_tilde_j: Vec<Option<BigInt>>,
    pub h1_j: Vec<Option<BigInt>>,
    pub h2_j: Vec<Option<BigInt>>,
    /// X_j = x_j * G for every party.
    pub big_x_j: Vec<Option<ECPoint>>,
    pub paillier_pks: Vec<Option<PublicKey>>,
    /// The group public key Y.
    pub ecdsa_pub: Option<ECPoint>,
}

impl LocalPartySaveData {
    pub fn new(party_count: usize) -> Self {
        Self {
            pre_params: None,
            xi: None,
            share_id: None,
            ks: Vec::new(),
            n_tilde_j: vec![None; party_count],
            h1_j: vec![None; party_count],
            h2_j: vec![None; party_count],
            big_x_j: vec![None; party_count],
            paillier_pks: vec![None; party_count],
            ecdsa_pub: None,
        }
    }

    pub fn paillier_sk(&self) -> Option<&PrivateKey> {
        self.pre_params.as_ref().map(|p| &p.paillier_sk)
    }

    /// Reshapes the per-party-indexed arrays to a signing cohort given by
    /// its sorted share ids. Every cohort id must exist in this save data.
    pub fn build_subset(&self, sorted_cohort_ks: &[BigInt]) -> Result<Self, String> {
        let mut subset = LocalPartySaveData::new(sorted_cohort_ks.len());
        subset.pre_params = self.pre_params.clone();
        subset.xi = self.xi.clone();
        subset.share_id = self.share_id.clone();
        subset.ecdsa_pub = self.ecdsa_pub.clone();
        for (new_j, k) in sorted_cohort_ks.iter().enumerate() {
            let old_j = self
                .ks
                .iter()
                .position(|existing| existing == k)
                .ok_or_else(|| format!("share id {} not found in save data", k))?;
            subset.ks.push(k.clone());
            subset.n_tilde_j[new_j] = self.n_tilde_j[old_j].clone();
            subset.h1_j[new_j] = self.h1_j[old_j].clone();
            subset.h2_j[new_j] = self.h2_j[old_j].clone();
            subset.big_x_j[new_j] = self.big_x_j[old_j].clone();
            subset.paillier_pks[new_j] = self.paillier_pks[old_j].clone();
        }
        Ok(subset)
    }
}

/// Scratch state for a keygen session; dropped when the session ends.
#[derive(Debug)]
pub(super) struct LocalTempData {
    // message stores, indexed by sender, with a received-peer bitset per
    // round slot; a round advances exactly when its bitset is full
    pub r1_messages: Vec<Option<KGRound1Message>>,
    pub r2_shares: Vec<Option<KGRound2Message1>>,
    pub r2_decommits: Vec<Option<KGRound2Message2>>,
    pub r4_messages: Vec<Option<KGRound4Message>>,
    pub r1_ok: PeerBitset,
    pub r2_share_ok: PeerBitset,
    pub r2_decommit_ok: PeerBitset,
    pub r4_ok: PeerBitset,

    // own round-1 artifacts
    pub ui: Option<SecretInt>,
    pub vs: Option<Vs>,
    pub shares: Option<Vec<Share>>,
    pub decommit_poly_g: Option<HashDeCommitment>,
}

impl LocalTempData {
    pub fn new(party_count: usize) -> Self {
        Self {
            r1_messages: vec![None; party_count],
            r2_shares: vec![None; party_count],
            r2_decommits: vec![None; party_count],
            r4_messages: vec![None; party_count],
            r1_ok: PeerBitset::new(party_count),
            r2_share_ok: PeerBitset::new(party_count),
            r2_decommit_ok: PeerBitset::new(party_count),
            r4_ok: PeerBitset::new(party_count),
            ui: None,
            vs: None,
            shares: None,
            decommit_poly_g: None,
        }
    }

    pub fn store(&mut self, from: usize, msg: &ParsedMessage<KeygenMessage>) {
        match &msg.content {
            KeygenMessage::Round1(m) => {
                self.r1_messages[from] = Some(m.clone());
                self.r1_ok.set(from);
            }
            KeygenMessage::Round2Share(m) => {
                self.r2_shares[from] = Some(m.clone());
                self.r2_share_ok.set(from);
            }
            KeygenMessage::Round2Decommit(m) => {
                self.r2_decommits[from] = Some(m.clone());
                self.r2_decommit_ok.set(from);
            }
            KeygenMessage::Round4(m) => {
                self.r4_messages[from] = Some(m.clone());
                self.r4_ok.set(from);
            }
        }
    }
}
