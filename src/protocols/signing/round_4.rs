// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Round 4: verify the T_i proofs, aggregate delta, and open the Gamma_i
//! commitment with a Schnorr proof of gamma_i.

use rand::rngs::OsRng;

use crate::common::int::ModInt;
use crate::crypto::schnorr::ZkProof;
use crate::tss::error::{ErrorKind, TssError};
use crate::tss::party_id::PartyID;

use super::local_party::LocalParty;
use super::messages::{SignRound4Bcast, SigningMessage};

impl LocalParty {
    pub(super) fn round4_start(&mut self) -> Result<(), TssError> {
        let mut rng = OsRng;
        let q = self.params.ec().order();
        let mod_q = ModInt::new(q);
        let i = self.params.party_index();
        let n = self.params.party_count();
        let parties = self.params.parties().clone();
        let session = self.temp.session.clone();

        // peers' T_i proofs
        let mut culprits: Vec<PartyID> = Vec::new();
        for j in 0..n {
            if j == i {
                continue;
            }
            let msg = self.temp.sr3[j]
                .as_ref()
                .ok_or_else(|| self.error(ErrorKind::Internal("round 3 store incomplete".into()), 4, vec![]))?;
            if !msg.t_proof.verify(&session, &msg.t_point) {
                culprits.push(parties.party(j).as_ref().clone());
            }
        }
        if !culprits.is_empty() {
            return Err(self.error(ErrorKind::ProofFailed { proof: "t-commitment" }, 4, culprits));
        }

        // delta = sum_j delta_j
        let mut delta = num_bigint::BigInt::from(0u8);
        for j in 0..n {
            let msg = self.temp.sr3[j]
                .as_ref()
                .ok_or_else(|| self.error(ErrorKind::Internal("round 3 store incomplete".into()), 4, vec![]))?;
            delta = mod_q.add(&delta, &msg.delta);
        }
        self.temp.delta = delta;

        let decommitment = self
            .temp
            .decommit_gamma
            .clone()
            .ok_or_else(|| self.error(ErrorKind::Internal("own decommitment missing".into()), 4, vec![]))?;
        let big_gamma_i = self
            .temp
            .big_gamma_i
            .clone()
            .ok_or_else(|| self.error(ErrorKind::Internal("own Gamma missing".into()), 4, vec![]))?;
        let gamma_proof = ZkProof::new(&session, &self.temp.gamma_i.expose(), &big_gamma_i, &mut rng)
            .map_err(|e| self.error(ErrorKind::Crypto(e.to_string()), 4, vec![]))?;

        self.broadcast(SigningMessage::Round4Bcast(SignRound4Bcast { decommitment, gamma_proof }))
    }
}
