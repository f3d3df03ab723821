// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Round 2: act as Bob for every peer's k_j ciphertext, running the plain
//! MtA with gamma_i and the with-check MtA with w_i.

use rand::rngs::OsRng;

use crate::common::secret::SecretInt;
use crate::crypto::mta::{self, MtaError};
use crate::tss::error::{ErrorKind, TssError};

use super::local_party::LocalParty;
use super::messages::{SignRound2P2P, SigningMessage};

impl LocalParty {
    pub(super) fn round2_start(&mut self) -> Result<(), TssError> {
        let mut rng = OsRng;
        let curve = self.params.ec();
        let q = curve.order();
        let i = self.params.party_index();
        let n = self.params.party_count();
        let parties = self.params.parties().clone();
        let session = self.temp.session.clone();

        let (own_n_tilde, own_h1, own_h2) = {
            let (a, b, c) = self.n_tilde(i);
            (a.clone(), b.clone(), c.clone())
        };
        let gamma_i = self.temp.gamma_i.expose();
        let w_i = self.temp.w_i.expose();
        let big_w_i = self.temp.big_w_j[i].clone();

        for j in 0..n {
            if j == i {
                continue;
            }
            let party_j = parties.party(j).as_ref().clone();
            let msg = self.temp.sr1_p2p[j]
                .clone()
                .ok_or_else(|| self.error(ErrorKind::Internal("round 1 store incomplete".into()), 2, vec![]))?;
            let pk_j = self.paillier_pk(j).clone();
            let (n_tilde_j, h1_j, h2_j) = {
                let (a, b, c) = self.n_tilde(j);
                (a.clone(), b.clone(), c.clone())
            };

            // plain MtA on (k_j, gamma_i): Alice's proof is bound to our own
            // parameters, our response proof to Alice's
            let gamma_result = mta::bob_mid(
                &session, &q, &pk_j, &msg.range_proof, &gamma_i, &msg.c_a, &n_tilde_j, &h1_j,
                &h2_j, &own_n_tilde, &own_h1, &own_h2, &mut rng,
            );
            let (beta, c_gamma, _beta_prm, proof_gamma) = match gamma_result {
                Ok(res) => res,
                Err(MtaError::AliceProofFailed) => {
                    return Err(self.error(
                        ErrorKind::ProofFailed { proof: "alice-range" },
                        2,
                        vec![party_j],
                    ))
                }
                Err(e) => return Err(self.error(ErrorKind::Crypto(e.to_string()), 2, vec![])),
            };

            // with-check MtA on (k_j, w_i), bound to W_i
            let w_result = mta::bob_mid_wc(
                &session, &q, &pk_j, &msg.range_proof, &w_i, &msg.c_a, &n_tilde_j, &h1_j, &h2_j,
                &own_n_tilde, &own_h1, &own_h2, &big_w_i, &mut rng,
            );
            let (nu, c_w, _nu_prm, proof_w) = match w_result {
                Ok(res) => res,
                Err(MtaError::AliceProofFailed) => {
                    return Err(self.error(
                        ErrorKind::ProofFailed { proof: "alice-range" },
                        2,
                        vec![party_j],
                    ))
                }
                Err(e) => return Err(self.error(ErrorKind::Crypto(e.to_string()), 2, vec![])),
            };

            self.temp.beta_gamma[j] = Some(SecretInt::new(beta));
            self.temp.nu_w[j] = Some(SecretInt::new(nu));
            self.temp.c_b_gamma_out[j] = Some(c_gamma.clone());
            self.temp.c_b_w_out[j] = Some(c_w.clone());

            self.send_p2p(
                party_j,
                SigningMessage::Round2P2P(SignRound2P2P { c_gamma, proof_gamma, c_w, proof_w }),
            )?;
        }
        Ok(())
    }
}
