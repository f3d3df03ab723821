// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Round 1: sample k_i and gamma_i, commit to Gamma_i, and send the k_i
//! ciphertext with a per-recipient range proof.

use num_bigint::BigInt;
use rand::rngs::OsRng;

use crate::common::hash::sha512_256;
use crate::common::random::get_random_positive_int;
use crate::common::secret::SecretInt;
use crate::crypto::commitments::HashCommitDecommit;
use crate::crypto::ecpoint::{flatten_ec_points, ECPoint};
use crate::crypto::mta::{self, RangeProofAlice};
use crate::protocols::signing::TASK_NAME;
use crate::tss::error::{ErrorKind, TssError};

use super::local_party::LocalParty;
use super::messages::{SignRound1Bcast, SignRound1P2P, SigningMessage};
use super::types::prepare_for_signing;

impl LocalParty {
    pub(super) fn round1_start(&mut self) -> Result<(), TssError> {
        let mut rng = OsRng;
        let curve = self.params.ec();
        let q = curve.order();
        let i = self.params.party_index();
        let parties = self.params.parties().clone();

        // session binding for every tagged proof in this run
        self.temp.session = self.session_bytes()?;

        // Lagrange-adjusted multiplicative shares for this cohort
        let xi = self
            .keys
            .xi
            .clone()
            .ok_or_else(|| self.error(ErrorKind::Internal("x_i missing".into()), 1, vec![]))?;
        let big_x_j: Vec<ECPoint> = (0..self.params.party_count())
            .map(|j| self.keys.big_x_j[j].clone())
            .collect::<Option<_>>()
            .ok_or_else(|| self.error(ErrorKind::Internal("X_j missing".into()), 1, vec![]))?;
        let (w_i, big_w_j) = prepare_for_signing(curve, i, &self.keys.ks, &xi, &big_x_j)
            .map_err(|e| self.error(ErrorKind::Crypto(e), 1, vec![]))?;
        self.temp.w_i = SecretInt::new(w_i);
        self.temp.big_w_j = big_w_j;

        // nonce shares
        let k_i = get_random_positive_int(&mut rng, &q)
            .ok_or_else(|| self.error(ErrorKind::Internal("sampling k_i failed".into()), 1, vec![]))?;
        let gamma_i = get_random_positive_int(&mut rng, &q)
            .ok_or_else(|| self.error(ErrorKind::Internal("sampling gamma_i failed".into()), 1, vec![]))?;

        // commitment to Gamma_i
        let big_gamma_i = ECPoint::scalar_base_mult(curve, &gamma_i);
        let flat = flatten_ec_points(&[big_gamma_i.clone()])
            .map_err(|e| self.error(ErrorKind::Crypto(e.to_string()), 1, vec![]))?;
        let flat_refs: Vec<&BigInt> = flat.iter().collect();
        let cmt = HashCommitDecommit::new(&mut rng, &flat_refs);

        // c_A = Enc(k_i), one range proof per recipient
        let pk_i = self.paillier_pk(i).clone();
        let (c_a, c_a_randomness) = mta::alice_init(&pk_i, &k_i, &mut rng)
            .map_err(|e| self.error(ErrorKind::Crypto(e.to_string()), 1, vec![]))?;

        for j in 0..self.params.party_count() {
            if j == i {
                continue;
            }
            let (n_tilde_j, h1_j, h2_j) = {
                let (a, b, c) = self.n_tilde(j);
                (a.clone(), b.clone(), c.clone())
            };
            let range_proof = RangeProofAlice::new(
                &q,
                &pk_i,
                &c_a,
                &n_tilde_j,
                &h1_j,
                &h2_j,
                &k_i,
                &c_a_randomness,
                &mut rng,
            )
            .map_err(|e| self.error(ErrorKind::Crypto(e.to_string()), 1, vec![]))?;
            self.send_p2p(
                parties.party(j).as_ref().clone(),
                SigningMessage::Round1P2P(SignRound1P2P { c_a: c_a.clone(), range_proof }),
            )?;
        }

        self.temp.k_i = SecretInt::new(k_i);
        self.temp.gamma_i = SecretInt::new(gamma_i);
        self.temp.big_gamma_i = Some(big_gamma_i);
        self.temp.decommit_gamma = Some(cmt.d.clone());
        self.temp.c_a = c_a;
        self.temp.c_a_randomness = SecretInt::new(c_a_randomness);

        self.broadcast(SigningMessage::Round1Bcast(SignRound1Bcast { commitment: cmt.c }))
    }

    /// Session bytes: the task name, the cohort's share ids in order, and
    /// the message hash.
    fn session_bytes(&self) -> Result<Vec<u8>, TssError> {
        let key_bytes: Vec<Vec<u8>> = self
            .params
            .parties()
            .keys()
            .iter()
            .map(|k| k.to_bytes_be().1)
            .collect();
        let m_bytes = self.temp.m.to_bytes_be().1;
        let mut parts: Vec<&[u8]> = Vec::with_capacity(key_bytes.len() + 2);
        parts.push(TASK_NAME.as_bytes());
        for kb in &key_bytes {
            parts.push(kb.as_slice());
        }
        parts.push(m_bytes.as_slice());
        sha512_256(&parts)
            .ok_or_else(|| self.error(ErrorKind::Internal("session hash failed".into()), 1, vec![]))
    }
}
