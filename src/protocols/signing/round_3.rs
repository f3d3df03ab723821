// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Round 3: decrypt the MtA responses into alpha and mu shares, derive
//! delta_i and sigma_i, and broadcast delta_i with the T_i commitment.

use rand::rngs::OsRng;

use crate::common::int::ModInt;
use crate::common::random::get_random_positive_int;
use crate::common::secret::SecretInt;
use crate::crypto::ecpoint::{second_base_point, ECPoint};
use crate::crypto::mta::{self, MtaError};
use crate::crypto::zkp::TProof;
use crate::tss::error::{ErrorKind, TssError};

use super::local_party::LocalParty;
use super::messages::{SignRound3Bcast, SigningMessage};

impl LocalParty {
    pub(super) fn round3_start(&mut self) -> Result<(), TssError> {
        let mut rng = OsRng;
        let curve = self.params.ec();
        let q = curve.order();
        let mod_q = ModInt::new(q.clone());
        let i = self.params.party_index();
        let n = self.params.party_count();
        let parties = self.params.parties().clone();
        let session = self.temp.session.clone();

        let pk_i = self.paillier_pk(i).clone();
        let sk_i = self.own_paillier_sk().clone();
        let (own_n_tilde, own_h1, own_h2) = {
            let (a, b, c) = self.n_tilde(i);
            (a.clone(), b.clone(), c.clone())
        };
        let c_a = self.temp.c_a.clone();

        for j in 0..n {
            if j == i {
                continue;
            }
            let party_j = parties.party(j).as_ref().clone();
            let msg = self.temp.sr2[j]
                .clone()
                .ok_or_else(|| self.error(ErrorKind::Internal("round 2 store incomplete".into()), 3, vec![]))?;

            // alpha_ij from the gamma pair
            let gamma_result = mta::alice_end(
                &session, &q, &pk_i, &sk_i, &msg.proof_gamma, &c_a, &msg.c_gamma, &own_n_tilde,
                &own_h1, &own_h2,
            );
            let (alpha, _) = match gamma_result {
                Ok(res) => res,
                Err(MtaError::BobProofFailed) => {
                    return Err(self.error(
                        ErrorKind::ProofFailed { proof: "bob-mid" },
                        3,
                        vec![party_j],
                    ))
                }
                Err(e) => return Err(self.error(ErrorKind::Crypto(e.to_string()), 3, vec![party_j])),
            };

            // mu_ij from the w pair, checked against W_j
            let w_result = mta::alice_end_wc(
                &session,
                &q,
                &pk_i,
                &sk_i,
                &msg.proof_w,
                &self.temp.big_w_j[j],
                &c_a,
                &msg.c_w,
                &own_n_tilde,
                &own_h1,
                &own_h2,
            );
            let (mu, mu_plain) = match w_result {
                Ok(res) => res,
                Err(MtaError::BobProofFailed) => {
                    return Err(self.error(
                        ErrorKind::ProofFailed { proof: "bob-mid-wc" },
                        3,
                        vec![party_j],
                    ))
                }
                Err(e) => return Err(self.error(ErrorKind::Crypto(e.to_string()), 3, vec![party_j])),
            };

            self.temp.alpha_gamma[j] = Some(SecretInt::new(alpha));
            self.temp.mu_w[j] = Some(SecretInt::new(mu));
            self.temp.mu_plain[j] = Some(SecretInt::new(mu_plain));
        }

        // delta_i = k_i*gamma_i + sum_j (alpha_ij + beta_ij)
        // sigma_i = k_i*w_i     + sum_j (mu_ij + nu_ij)
        let k_i = self.temp.k_i.expose();
        let mut delta_i = mod_q.mul(&k_i, &self.temp.gamma_i.expose());
        let mut sigma_i = mod_q.mul(&k_i, &self.temp.w_i.expose());
        for j in 0..n {
            if j == i {
                continue;
            }
            let alpha = self.temp.alpha_gamma[j].as_ref().map(|s| s.expose()).unwrap_or_default();
            let beta = self.temp.beta_gamma[j].as_ref().map(|s| s.expose()).unwrap_or_default();
            let mu = self.temp.mu_w[j].as_ref().map(|s| s.expose()).unwrap_or_default();
            let nu = self.temp.nu_w[j].as_ref().map(|s| s.expose()).unwrap_or_default();
            delta_i = mod_q.add(&delta_i, &mod_q.add(&alpha, &beta));
            sigma_i = mod_q.add(&sigma_i, &mod_q.add(&mu, &nu));
        }

        // T_i = sigma_i*G + l_i*H with a proof over both bases
        let l_i = get_random_positive_int(&mut rng, &q)
            .ok_or_else(|| self.error(ErrorKind::Internal("sampling l_i failed".into()), 3, vec![]))?;
        let h = second_base_point(curve);
        let t_i = ECPoint::scalar_base_mult(curve, &sigma_i)
            .add(&h.scalar_mul(&l_i))
            .map_err(|e| self.error(ErrorKind::Crypto(e.to_string()), 3, vec![]))?;
        let t_proof = TProof::new(&session, &sigma_i, &l_i, &t_i, &mut rng)
            .map_err(|e| self.error(ErrorKind::Crypto(e.to_string()), 3, vec![]))?;

        self.temp.delta_i = delta_i.clone();
        self.temp.sigma_i = SecretInt::new(sigma_i);
        self.temp.l_i = SecretInt::new(l_i);
        self.temp.t_i = Some(t_i.clone());

        self.broadcast(SigningMessage::Round3Bcast(SignRound3Bcast {
            delta: delta_i,
            t_point: t_i,
            t_proof,
        }))
    }
}
