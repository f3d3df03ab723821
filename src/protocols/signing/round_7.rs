// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Round 7: under abort type 5, identify the culprits from the revealed
//! nonce material. Otherwise verify the ST proofs, check sum S_j == Y, and
//! either broadcast s_i or open the type-7 abort branch.

use num_bigint::BigInt;

use crate::common::int::ModInt;
use crate::crypto::ecpoint::ECPoint;
use crate::crypto::zkp::ecddh::{EcddhProof, EcddhStatement};
use crate::tss::error::{ErrorKind, TssError};
use crate::tss::party_id::PartyID;

use super::local_party::LocalParty;
use super::messages::{AbortType7Bundle, Round6Payload, SignRound7Success, SigningMessage};

impl LocalParty {
    pub(super) fn round7_start(&mut self) -> Result<(), TssError> {
        let any_abort = self
            .temp
            .sr6
            .iter()
            .any(|slot| matches!(slot, Some(Round6Payload::Abort(_))));
        if any_abort && !self.temp.abort5 {
            // the aggregate checks run on identical broadcast data, so an
            // abort nobody else sees marks its sender
            let culprits: Vec<PartyID> = (0..self.params.party_count())
                .filter(|&j| matches!(self.temp.sr6[j], Some(Round6Payload::Abort(_))))
                .map(|j| self.params.parties().party(j).as_ref().clone())
                .collect();
            return Err(self.error(ErrorKind::Aborted { abort_type: 5 }, 7, culprits));
        }
        if self.temp.abort5 {
            return Err(self.identify_abort_type5());
        }

        let curve = self.params.ec();
        let q = curve.order();
        let mod_q = ModInt::new(q.clone());
        let i = self.params.party_index();
        let n = self.params.party_count();
        let parties = self.params.parties().clone();
        let session = self.temp.session.clone();

        let big_r = self
            .temp
            .big_r
            .clone()
            .ok_or_else(|| self.error(ErrorKind::Internal("R missing".into()), 7, vec![]))?;

        // ST proofs bind every S_j to its round-3 T_j
        let mut culprits: Vec<PartyID> = Vec::new();
        for j in 0..n {
            if j == i {
                continue;
            }
            let success = match &self.temp.sr6[j] {
                Some(Round6Payload::Success(m)) => m,
                _ => {
                    return Err(self.error(
                        ErrorKind::Internal("round 6 store incomplete".into()),
                        7,
                        vec![],
                    ))
                }
            };
            let t_j = self.temp.sr3[j]
                .as_ref()
                .map(|m| m.t_point.clone())
                .ok_or_else(|| self.error(ErrorKind::Internal("round 3 store incomplete".into()), 7, vec![]))?;
            if !success.st_proof.verify(&session, &success.big_s, &t_j, &big_r) {
                culprits.push(parties.party(j).as_ref().clone());
            }
        }
        if !culprits.is_empty() {
            return Err(self.error(ErrorKind::ProofFailed { proof: "st" }, 7, culprits));
        }

        // integrity check on sigma and R: sum_j S_j must equal Y
        let mut big_s_sum: Option<ECPoint> = None;
        for j in 0..n {
            let s_j = match &self.temp.sr6[j] {
                Some(Round6Payload::Success(m)) => m.big_s.clone(),
                _ => {
                    return Err(self.error(
                        ErrorKind::Internal("round 6 store incomplete".into()),
                        7,
                        vec![],
                    ))
                }
            };
            big_s_sum = Some(match big_s_sum {
                None => s_j,
                Some(acc) => acc
                    .add(&s_j)
                    .map_err(|e| self.error(ErrorKind::Crypto(e.to_string()), 7, vec![]))?,
            });
        }
        if big_s_sum.as_ref() != Some(self.ecdsa_pub()) {
            // open the type-7 branch: reveal k_i with its randomness, the mu
            // plaintexts with theirs, and prove sigma_i consistent with S_i
            self.temp.abort7 = true;
            let sk = self.own_paillier_sk().clone();
            let mut mu_randomness = vec![None; n];
            for j in 0..n {
                if j == i {
                    continue;
                }
                let c_w = self.temp.sr2[j]
                    .as_ref()
                    .map(|m| m.c_w.clone())
                    .ok_or_else(|| self.error(ErrorKind::Internal("round 2 store incomplete".into()), 7, vec![]))?;
                let rand = sk
                    .recover_randomness(&c_w)
                    .map_err(|e| self.error(ErrorKind::Crypto(e.to_string()), 7, vec![]))?;
                mu_randomness[j] = Some(rand);
            }

            let big_s_i = self
                .temp
                .big_s_i
                .clone()
                .ok_or_else(|| self.error(ErrorKind::Internal("S_i missing".into()), 7, vec![]))?;
            let sigma_i = self.temp.sigma_i.expose();
            let statement = EcddhStatement {
                g1: ECPoint::generator(curve),
                h1: ECPoint::scalar_base_mult(curve, &sigma_i),
                g2: big_r,
                h2: big_s_i,
            };
            let ecddh_proof = EcddhProof::new(&session, &sigma_i, &statement, &mut rand::rngs::OsRng)
                .map_err(|e| self.error(ErrorKind::Crypto(e.to_string()), 7, vec![]))?;

            let bundle = AbortType7Bundle {
                k: self.temp.k_i.expose(),
                k_randomness: self.temp.c_a_randomness.expose(),
                mus: self
                    .temp
                    .mu_plain
                    .iter()
                    .map(|s| s.as_ref().map(|v| v.expose()))
                    .collect(),
                mu_randomness,
                ecddh_proof,
            };
            return self.broadcast(SigningMessage::Round7Abort(bundle));
        }

        // s_i = m*k_i + r*sigma_i mod q
        let s_i = mod_q.add(
            &mod_q.mul(&self.temp.m, &self.temp.k_i.expose()),
            &mod_q.mul(&self.temp.r_x, &self.temp.sigma_i.expose()),
        );
        self.temp.s_i = s_i.clone();
        self.broadcast(SigningMessage::Round7Success(SignRound7Success { s_share: s_i }))
    }

    /// Type-5 identification: recompute every delta_j from the revealed
    /// bundles and compare against the round-3 broadcasts.
    fn identify_abort_type5(&mut self) -> TssError {
        let q = self.params.ec().order();
        let mod_q = ModInt::new(q);
        let curve = self.params.ec();
        let i = self.params.party_index();
        let n = self.params.party_count();
        let parties = self.params.parties().clone();

        let mut culprits: Vec<PartyID> = Vec::new();
        for j in 0..n {
            if j == i {
                continue;
            }
            let party_j = parties.party(j).as_ref().clone();
            let bundle = match &self.temp.sr6[j] {
                Some(Round6Payload::Abort(b)) => b.clone(),
                // refusing to open the abort branch is itself attributable
                _ => {
                    culprits.push(party_j);
                    continue;
                }
            };
            if bundle.alphas.len() != n || bundle.betas.len() != n {
                culprits.push(party_j);
                continue;
            }

            // the revealed k_j must re-encrypt to the round-1 ciphertext
            let c_a_j = match self.temp.sr1_p2p[j].as_ref() {
                Some(m) => m.c_a.clone(),
                None => {
                    culprits.push(party_j);
                    continue;
                }
            };
            let reencrypted = self
                .paillier_pk(j)
                .encrypt_with_chosen_randomness(&bundle.k, &bundle.k_randomness);
            if reencrypted.as_ref() != Ok(&c_a_j) {
                culprits.push(party_j);
                continue;
            }

            // the revealed gamma_j must match the decommitted Gamma_j
            match self.temp.big_gamma_j[j].as_ref() {
                Some(gamma_point)
                    if *gamma_point == ECPoint::scalar_base_mult(curve, &bundle.gamma) => {}
                _ => {
                    culprits.push(party_j);
                    continue;
                }
            }

            // recomputed delta_j must match the round-3 broadcast
            let mut delta_j = mod_q.mul(&bundle.k, &bundle.gamma);
            for l in 0..n {
                if l == j {
                    continue;
                }
                let alpha = bundle.alphas[l].clone().unwrap_or_else(|| BigInt::from(0u8));
                let beta = bundle.betas[l].clone().unwrap_or_else(|| BigInt::from(0u8));
                delta_j = mod_q.add(&delta_j, &mod_q.add(&alpha, &beta));
            }
            let claimed = self.temp.sr3[j].as_ref().map(|m| mod_q.reduce(&m.delta));
            if claimed != Some(delta_j) {
                culprits.push(party_j);
            }
        }

        self.error(ErrorKind::Aborted { abort_type: 5 }, 7, culprits)
    }
}
