// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Round 5: open the Gamma commitments, derive R = delta^-1 * sum Gamma_j,
//! and broadcast RBar_i = k_i * R with PDL-with-slack proofs.

use num_integer::Integer;
use num_traits::Zero;
use rand::rngs::OsRng;

use crate::crypto::commitments::HashCommitDecommit;
use crate::crypto::ecpoint::un_flatten_ec_points;
use crate::crypto::zkp::pdl_slack::{PdlWSlackProof, PdlWSlackStatement, PdlWSlackWitness};
use crate::tss::error::{ErrorKind, TssError};
use crate::tss::party_id::PartyID;

use super::local_party::LocalParty;
use super::messages::{SignRound5Bcast, SigningMessage};

impl LocalParty {
    pub(super) fn round5_start(&mut self) -> Result<(), TssError> {
        let mut rng = OsRng;
        let curve = self.params.ec();
        let q = curve.order();
        let i = self.params.party_index();
        let n = self.params.party_count();
        let parties = self.params.parties().clone();
        let session = self.temp.session.clone();

        // open commitments first, then check the Schnorr proofs
        let mut open_culprits: Vec<PartyID> = Vec::new();
        for j in 0..n {
            let commitment = self.temp.sr1_bcast[j]
                .as_ref()
                .map(|m| m.commitment.clone())
                .ok_or_else(|| self.error(ErrorKind::Internal("round 1 store incomplete".into()), 5, vec![]))?;
            let decommitment = self.temp.sr4[j]
                .as_ref()
                .map(|m| m.decommitment.clone())
                .ok_or_else(|| self.error(ErrorKind::Internal("round 4 store incomplete".into()), 5, vec![]))?;

            let cmt = HashCommitDecommit { c: commitment, d: decommitment };
            let gamma_point = cmt
                .decommit()
                .and_then(|flat| un_flatten_ec_points(curve, &flat).ok())
                .and_then(|points| points.into_iter().next());
            match gamma_point {
                Some(point) if point.validate_basic() => {
                    self.temp.big_gamma_j[j] = Some(point);
                }
                _ => open_culprits.push(parties.party(j).as_ref().clone()),
            }
        }
        if !open_culprits.is_empty() {
            return Err(self.error(
                ErrorKind::InvariantFailed { name: "gamma commitment opening" },
                5,
                open_culprits,
            ));
        }

        let mut proof_culprits: Vec<PartyID> = Vec::new();
        for j in 0..n {
            if j == i {
                continue;
            }
            let gamma_j = self.temp.big_gamma_j[j]
                .as_ref()
                .ok_or_else(|| self.error(ErrorKind::Internal("gamma store incomplete".into()), 5, vec![]))?;
            let proof = &self.temp.sr4[j]
                .as_ref()
                .ok_or_else(|| self.error(ErrorKind::Internal("round 4 store incomplete".into()), 5, vec![]))?
                .gamma_proof;
            if !proof.verify(&session, gamma_j) {
                proof_culprits.push(parties.party(j).as_ref().clone());
            }
        }
        if !proof_culprits.is_empty() {
            return Err(self.error(ErrorKind::ProofFailed { proof: "gamma-schnorr" }, 5, proof_culprits));
        }

        // R = delta^-1 * sum_j Gamma_j
        let mut big_gamma = self.temp.big_gamma_j[0]
            .clone()
            .ok_or_else(|| self.error(ErrorKind::Internal("gamma store incomplete".into()), 5, vec![]))?;
        for j in 1..n {
            let gamma_j = self.temp.big_gamma_j[j]
                .as_ref()
                .ok_or_else(|| self.error(ErrorKind::Internal("gamma store incomplete".into()), 5, vec![]))?;
            big_gamma = big_gamma
                .add(gamma_j)
                .map_err(|e| self.error(ErrorKind::Crypto(e.to_string()), 5, vec![]))?;
        }

        let delta_inv = self
            .temp
            .delta
            .modinv(&q)
            .ok_or_else(|| self.error(ErrorKind::InvariantFailed { name: "delta not invertible" }, 5, vec![]))?;
        let big_r = big_gamma.scalar_mul(&delta_inv);
        let r_x = big_r.x().mod_floor(&q);
        if r_x.is_zero() {
            return Err(self.error(ErrorKind::InvariantFailed { name: "r is zero" }, 5, vec![]));
        }

        let big_r_bar = big_r.scalar_mul(&self.temp.k_i.expose());

        // one PDL-with-slack proof per verifier parameter set
        let pk_i = self.paillier_pk(i).clone();
        let witness = PdlWSlackWitness {
            x: self.temp.k_i.expose(),
            r: self.temp.c_a_randomness.expose(),
        };
        let mut proofs = Vec::with_capacity(n);
        for j in 0..n {
            let (n_tilde_j, h1_j, h2_j) = {
                let (a, b, c) = self.n_tilde(j);
                (a.clone(), b.clone(), c.clone())
            };
            let statement = PdlWSlackStatement {
                ct: self.temp.c_a.clone(),
                pk: pk_i.clone(),
                q_point: big_r_bar.clone(),
                base: big_r.clone(),
                n_tilde: n_tilde_j,
                h1: h1_j,
                h2: h2_j,
            };
            let proof = PdlWSlackProof::new(&session, &q, &witness, &statement, &mut rng)
                .map_err(|e| self.error(ErrorKind::Crypto(e.to_string()), 5, vec![]))?;
            proofs.push(proof);
        }

        self.temp.big_r = Some(big_r);
        self.temp.r_x = r_x;

        self.broadcast(SigningMessage::Round5Bcast(SignRound5Bcast { big_r_bar, proofs }))
    }
}
