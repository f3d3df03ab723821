// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Round 3 (internal): open the Feldman commitments, verify the received
//! shares, derive x_i, {X_j} and Y, then broadcast the Paillier
//! key-knowledge proof.

use log::debug;

use crate::common::int::ModInt;
use crate::crypto::commitments::HashCommitDecommit;
use crate::crypto::ecpoint::{un_flatten_ec_points, ECPoint};
use crate::crypto::vss::{Share, Vs};
use crate::tss::error::{ErrorKind, TssError};
use crate::tss::party_id::PartyID;

use super::local_party::LocalParty;
use super::messages::{KGRound4Message, KeygenMessage};

impl LocalParty {
    pub(super) fn round3_start(&mut self) -> Result<(), TssError> {
        let curve = self.params.ec();
        let q = curve.order();
        let mod_q = ModInt::new(q.clone());
        let n = self.params.party_count();
        let i = self.params.party_index();
        let threshold = self.params.threshold();
        let parties = self.params.parties().clone();

        // ordering is fixed: commitments first, then share proofs, then the
        // aggregate invariants
        let mut vss_vectors: Vec<Vs> = Vec::with_capacity(n);
        let mut open_culprits: Vec<PartyID> = Vec::new();
        for j in 0..n {
            let party_j = parties.party(j).as_ref().clone();
            let commitment = self.temp.r1_messages[j]
                .as_ref()
                .map(|m| m.commitment.clone())
                .ok_or_else(|| self.error(ErrorKind::Internal("round 1 store incomplete".into()), 3, vec![]))?;
            let decommitment = self.temp.r2_decommits[j]
                .as_ref()
                .map(|m| m.decommitment.clone())
                .ok_or_else(|| self.error(ErrorKind::Internal("round 2 store incomplete".into()), 3, vec![]))?;

            let cmt = HashCommitDecommit { c: commitment, d: decommitment };
            let flat = match cmt.decommit() {
                Some(flat) => flat,
                None => {
                    debug!("party {} failed to open its commitment", party_j);
                    open_culprits.push(party_j);
                    continue;
                }
            };
            let points = match un_flatten_ec_points(curve, &flat) {
                Ok(points) if points.len() == threshold + 1 => points,
                _ => {
                    debug!("party {} opened a malformed verification vector", party_j);
                    open_culprits.push(party_j);
                    continue;
                }
            };
            vss_vectors.push(points);
        }
        if !open_culprits.is_empty() {
            return Err(self.error(
                ErrorKind::InvariantFailed { name: "vss commitment opening" },
                3,
                open_culprits,
            ));
        }

        // each received share against its sender's opened vector
        let own_key = self.params.party_id().key.clone();
        let mut share_culprits: Vec<PartyID> = Vec::new();
        for j in 0..n {
            let share_value = self.temp.r2_shares[j]
                .as_ref()
                .map(|m| m.share.clone())
                .ok_or_else(|| self.error(ErrorKind::Internal("round 2 share store incomplete".into()), 3, vec![]))?;
            let share = Share { threshold, id: own_key.clone(), share: share_value };
            if !share.verify(curve, threshold, &vss_vectors[j]) {
                debug!("share from party {} failed verification", parties.party(j));
                share_culprits.push(parties.party(j).as_ref().clone());
            }
        }
        if !share_culprits.is_empty() {
            return Err(self.error(
                ErrorKind::ProofFailed { proof: "vss share" },
                3,
                share_culprits,
            ));
        }

        // x_i = sum_j s_ji mod q
        let mut xi = num_bigint::BigInt::from(0u8);
        for j in 0..n {
            if let Some(m) = &self.temp.r2_shares[j] {
                xi = mod_q.add(&xi, &m.share);
            }
        }
        self.data.xi = Some(xi.clone());

        // V_c = sum_j V^(j)_c
        let mut combined: Vs = vss_vectors[0].clone();
        for vec_j in vss_vectors.iter().skip(1) {
            for (c, point) in vec_j.iter().enumerate() {
                combined[c] = combined[c]
                    .add(point)
                    .map_err(|e| self.error(ErrorKind::Crypto(e.to_string()), 3, vec![]))?;
            }
        }

        // X_j = sum_c k_j^c * V_c for every party
        for j in 0..n {
            let k_j = &parties.party(j).key;
            let mut x_j = combined[0].clone();
            let mut k_pow = num_bigint::BigInt::from(1u8);
            for v_c in combined.iter().skip(1) {
                k_pow = mod_q.mul(&k_pow, k_j);
                x_j = x_j
                    .add(&v_c.scalar_mul(&k_pow))
                    .map_err(|e| self.error(ErrorKind::Crypto(e.to_string()), 3, vec![]))?;
            }
            self.data.big_x_j[j] = Some(x_j);
        }

        // Y = V_0
        let y = combined[0].clone();
        if !y.validate_basic() {
            return Err(self.error(
                ErrorKind::InvariantFailed { name: "public key is identity" },
                3,
                vec![],
            ));
        }
        self.data.ecdsa_pub = Some(y.clone());

        // own X_i must agree with x_i
        if self.data.big_x_j[i] != Some(ECPoint::scalar_base_mult(curve, &xi)) {
            return Err(self.error(
                ErrorKind::InvariantFailed { name: "own share inconsistent with X_i" },
                3,
                vec![],
            ));
        }

        // broadcast the Paillier key-knowledge proof, bound to (k_i, Y)
        let paillier_sk = self
            .data
            .paillier_sk()
            .ok_or_else(|| self.error(ErrorKind::Internal("paillier secret key missing".into()), 3, vec![]))?;
        let proof = paillier_sk
            .proof(&own_key, &y)
            .map_err(|e| self.error(ErrorKind::Crypto(e.to_string()), 3, vec![]))?;
        self.broadcast(KeygenMessage::Round4(KGRound4Message { proof }))
    }
}
