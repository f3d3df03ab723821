// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Round 1: sample u_i, commit to the Feldman vector, publish Paillier and
//! auxiliary parameters with DLN proofs.

use log::debug;
use rand::rngs::OsRng;

use crate::common::random::get_random_positive_int;
use crate::common::secret::SecretInt;
use crate::crypto::commitments::HashCommitDecommit;
use crate::crypto::dlnproof::DlnProof;
use crate::crypto::ecpoint::flatten_ec_points;
use crate::crypto::paillier::PaillierError;
use crate::crypto::vss;
use crate::tss::error::{ErrorKind, TssError};

use super::local_party::LocalParty;
use super::messages::{KGRound1Message, KeygenMessage};
use super::types::LocalPreParams;

impl LocalParty {
    pub(super) fn round1_start(&mut self) -> Result<(), TssError> {
        let mut rng = OsRng;
        let curve = self.params.ec();
        let q = curve.order();
        let i = self.params.party_index();

        // 1. sample the partial key u_i and deal it with Feldman VSS
        let ui = get_random_positive_int(&mut rng, &q)
            .ok_or_else(|| self.error(ErrorKind::Internal("sampling u_i failed".into()), 1, vec![]))?;

        let all_keys = self.params.parties().keys();
        let (vs, shares) = vss::create(curve, self.params.threshold(), &ui, &all_keys, &mut rng)
            .map_err(|e| self.error(ErrorKind::Crypto(e.to_string()), 1, vec![]))?;

        self.data.ks = all_keys;
        self.data.share_id = Some(self.params.party_id().key.clone());

        // 2. commit to the verification vector
        let flat = flatten_ec_points(&vs)
            .map_err(|e| self.error(ErrorKind::Crypto(e.to_string()), 1, vec![]))?;
        let flat_refs: Vec<&num_bigint::BigInt> = flat.iter().collect();
        let cmt = HashCommitDecommit::new(&mut rng, &flat_refs);

        // 3. pre-parameters: reuse validated ones or generate now
        let pre_params = match &self.data.pre_params {
            Some(pre) if pre.validate_with_proof() => pre.clone(),
            _ => {
                debug!("party {}: generating pre-params", self.params.party_id());
                let generated = LocalPreParams::generate(
                    self.params.concurrency(),
                    self.params.safe_prime_gen_timeout(),
                )
                .map_err(|e| {
                    let kind = match e {
                        PaillierError::Timeout => ErrorKind::Timeout,
                        other => ErrorKind::Crypto(other.to_string()),
                    };
                    self.error(kind, 1, vec![])
                })?;
                self.data.pre_params = Some(generated.clone());
                generated
            }
        };

        // witnesses are present: checked by validate_with_proof or generated
        let missing =
            || self.error(ErrorKind::Internal("pre-params missing witnesses".into()), 1, vec![]);
        let p = pre_params.p.clone().ok_or_else(missing)?;
        let pq = pre_params.q.clone().ok_or_else(missing)?;
        let alpha = pre_params.alpha.clone().ok_or_else(missing)?;
        let beta = pre_params.beta.clone().ok_or_else(missing)?;

        // 4. both DLN proofs over (h1, h2)
        let dln_proof_1 = DlnProof::new(
            &pre_params.h1, &pre_params.h2, &alpha, &p, &pq, &pre_params.n_tilde, &mut rng,
        )
        .map_err(|e| self.error(ErrorKind::Crypto(e.to_string()), 1, vec![]))?;
        let dln_proof_2 = DlnProof::new(
            &pre_params.h2, &pre_params.h1, &beta, &p, &pq, &pre_params.n_tilde, &mut rng,
        )
        .map_err(|e| self.error(ErrorKind::Crypto(e.to_string()), 1, vec![]))?;

        // save own slots
        let paillier_pk = pre_params.paillier_sk.public_key.clone();
        self.data.n_tilde_j[i] = Some(pre_params.n_tilde.clone());
        self.data.h1_j[i] = Some(pre_params.h1.clone());
        self.data.h2_j[i] = Some(pre_params.h2.clone());
        self.data.paillier_pks[i] = Some(paillier_pk.clone());

        self.temp.ui = Some(SecretInt::new(ui));
        self.temp.vs = Some(vs);
        self.temp.shares = Some(shares);
        self.temp.decommit_poly_g = Some(cmt.d.clone());

        self.broadcast(KeygenMessage::Round1(KGRound1Message {
            commitment: cmt.c,
            paillier_pk,
            n_tilde: pre_params.n_tilde.clone(),
            h1: pre_params.h1.clone(),
            h2: pre_params.h2.clone(),
            dln_proof_1,
            dln_proof_2,
        }))
    }
}
