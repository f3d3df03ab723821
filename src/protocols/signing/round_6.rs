// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Round 6: verify the PDL-with-slack proofs, check sum RBar_j == G, and
//! either publish S_i with its ST proof or open the type-5 abort branch.

use std::sync::mpsc;

use rand::rngs::OsRng;
use threadpool::ThreadPool;

use crate::common::secret::SecretInt;
use crate::crypto::ecpoint::ECPoint;
use crate::crypto::zkp::pdl_slack::PdlWSlackStatement;
use crate::crypto::zkp::StProof;
use crate::tss::error::{ErrorKind, TssError};
use crate::tss::party_id::PartyID;

use super::local_party::LocalParty;
use super::messages::{AbortType5Bundle, SignRound6Success, SigningMessage};

impl LocalParty {
    pub(super) fn round6_start(&mut self) -> Result<(), TssError> {
        let mut rng = OsRng;
        let curve = self.params.ec();
        let q = curve.order();
        let i = self.params.party_index();
        let n = self.params.party_count();
        let parties = self.params.parties().clone();
        let session = self.temp.session.clone();

        let big_r = self
            .temp
            .big_r
            .clone()
            .ok_or_else(|| self.error(ErrorKind::Internal("R missing".into()), 6, vec![]))?;
        let (own_n_tilde, own_h1, own_h2) = {
            let (a, b, c) = self.n_tilde(i);
            (a.clone(), b.clone(), c.clone())
        };

        // each peer's consistency proof between its k ciphertext and RBar_j,
        // checked against our own auxiliary parameters; verification fans
        // out to the bounded worker pool
        let mut culprits: Vec<PartyID> = Vec::new();
        let pool = ThreadPool::new(self.params.concurrency());
        let (tx, rx) = mpsc::channel();
        for j in 0..n {
            if j == i {
                continue;
            }
            let msg5 = self.temp.sr5[j]
                .as_ref()
                .ok_or_else(|| self.error(ErrorKind::Internal("round 5 store incomplete".into()), 6, vec![]))?;
            let c_a_j = self.temp.sr1_p2p[j]
                .as_ref()
                .map(|m| m.c_a.clone())
                .ok_or_else(|| self.error(ErrorKind::Internal("round 1 store incomplete".into()), 6, vec![]))?;
            let proof = match msg5.proofs.get(i) {
                Some(proof) => proof.clone(),
                None => {
                    culprits.push(parties.party(j).as_ref().clone());
                    continue;
                }
            };
            let statement = PdlWSlackStatement {
                ct: c_a_j,
                pk: self.paillier_pk(j).clone(),
                q_point: msg5.big_r_bar.clone(),
                base: big_r.clone(),
                n_tilde: own_n_tilde.clone(),
                h1: own_h1.clone(),
                h2: own_h2.clone(),
            };
            let session = session.clone();
            let q = q.clone();
            let tx = tx.clone();
            pool.execute(move || {
                let ok = proof.verify(&session, &q, &statement);
                let _ = tx.send((j, ok));
            });
        }
        drop(tx);
        pool.join();
        for (j, ok) in rx.try_iter() {
            if !ok {
                culprits.push(parties.party(j).as_ref().clone());
            }
        }
        if !culprits.is_empty() {
            culprits.sort_by_key(|p| p.index);
            return Err(self.error(ErrorKind::ProofFailed { proof: "pdl-with-slack" }, 6, culprits));
        }

        // integrity check on k and R: sum_j RBar_j must equal G
        let mut big_r_bar_sum: Option<ECPoint> = None;
        for j in 0..n {
            let msg5 = self.temp.sr5[j]
                .as_ref()
                .ok_or_else(|| self.error(ErrorKind::Internal("round 5 store incomplete".into()), 6, vec![]))?;
            big_r_bar_sum = Some(match big_r_bar_sum {
                None => msg5.big_r_bar.clone(),
                Some(acc) => acc
                    .add(&msg5.big_r_bar)
                    .map_err(|e| self.error(ErrorKind::Crypto(e.to_string()), 6, vec![]))?,
            });
        }
        let g = ECPoint::generator(curve);
        if big_r_bar_sum.as_ref() != Some(&g) {
            // open the identifiable-abort branch: reveal the nonce material
            // so every party can recompute each delta_j
            self.temp.abort5 = true;
            let expose_all = |shares: &[Option<SecretInt>]| -> Vec<Option<num_bigint::BigInt>> {
                shares.iter().map(|s| s.as_ref().map(|v| v.expose())).collect()
            };
            let bundle = AbortType5Bundle {
                k: self.temp.k_i.expose(),
                gamma: self.temp.gamma_i.expose(),
                k_randomness: self.temp.c_a_randomness.expose(),
                alphas: expose_all(&self.temp.alpha_gamma),
                betas: expose_all(&self.temp.beta_gamma),
            };
            return self.broadcast(SigningMessage::Round6Abort(bundle));
        }

        // S_i = sigma_i * R, tied to T_i over (R, H)
        let sigma_i = self.temp.sigma_i.expose();
        let l_i = self.temp.l_i.expose();
        let big_s_i = big_r.scalar_mul(&sigma_i);
        let t_i = self
            .temp
            .t_i
            .clone()
            .ok_or_else(|| self.error(ErrorKind::Internal("T_i missing".into()), 6, vec![]))?;
        let st_proof = StProof::new(
            &session,
            &sigma_i,
            &l_i,
            &big_s_i,
            &t_i,
            &big_r,
            &mut rng,
        )
        .map_err(|e| self.error(ErrorKind::Crypto(e.to_string()), 6, vec![]))?;

        self.temp.big_s_i = Some(big_s_i.clone());
        self.broadcast(SigningMessage::Round6Success(SignRound6Success { big_s: big_s_i, st_proof }))
    }
}
