// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Round 2: verify the round-1 DLN proofs and parameter well-formedness,
//! then open the commitment and deal the private Shamir shares.

use std::collections::HashMap;

use log::debug;

use crate::tss::error::{ErrorKind, TssError};
use crate::tss::party_id::PartyID;

use super::dln_verifier::DlnProofVerifier;
use super::local_party::LocalParty;
use super::messages::{KGRound2Message1, KGRound2Message2, KeygenMessage};
use super::types::MODULUS_BIT_LEN;

impl LocalParty {
    pub(super) fn round2_start(&mut self) -> Result<(), TssError> {
        let n = self.params.party_count();
        let i = self.params.party_index();
        let parties = self.params.parties().clone();

        let r1_messages: Vec<_> = (0..n)
            .map(|j| {
                self.temp.r1_messages[j]
                    .clone()
                    .ok_or_else(|| self.error(ErrorKind::Internal("round 1 store incomplete".into()), 2, vec![]))
            })
            .collect::<Result<_, _>>()?;

        // structural checks first: exact modulus widths, h1 != h2, and
        // (h1, h2) pairwise-unique across the session
        let mut culprits: Vec<PartyID> = Vec::new();
        let mut h1_seen: HashMap<String, usize> = HashMap::new();
        let mut h2_seen: HashMap<String, usize> = HashMap::new();
        for (j, msg) in r1_messages.iter().enumerate() {
            let party_j = parties.party(j).as_ref().clone();
            if msg.paillier_pk.n.bits() != MODULUS_BIT_LEN as u64 {
                debug!("party {} sent a paillier modulus of {} bits", party_j, msg.paillier_pk.n.bits());
                culprits.push(party_j);
                continue;
            }
            if msg.n_tilde.bits() != MODULUS_BIT_LEN as u64 {
                debug!("party {} sent an NTilde of {} bits", party_j, msg.n_tilde.bits());
                culprits.push(party_j);
                continue;
            }
            if msg.h1 == msg.h2 {
                debug!("party {} sent h1 == h2", party_j);
                culprits.push(party_j);
                continue;
            }
            if let Some(&other) = h1_seen.get(&msg.h1.to_string()) {
                culprits.push(parties.party(other).as_ref().clone());
                culprits.push(party_j);
                continue;
            }
            if let Some(&other) = h2_seen.get(&msg.h2.to_string()) {
                culprits.push(parties.party(other).as_ref().clone());
                culprits.push(party_j);
                continue;
            }
            h1_seen.insert(msg.h1.to_string(), j);
            h2_seen.insert(msg.h2.to_string(), j);
        }
        if !culprits.is_empty() {
            culprits.dedup();
            return Err(self.error(
                ErrorKind::InvariantFailed { name: "round1 parameter checks" },
                2,
                culprits,
            ));
        }

        // both DLN proofs of every party, verified on the bounded pool
        let verifier = DlnProofVerifier::new(self.params.concurrency());
        let contexts: Vec<_> = r1_messages.iter().cloned().enumerate().collect();
        let results = verifier.verify_all(contexts);

        let culprits: Vec<PartyID> = results
            .iter()
            .filter(|r| !(r.proof1_valid && r.proof2_valid))
            .map(|r| parties.party(r.party_index).as_ref().clone())
            .collect();
        if !culprits.is_empty() {
            return Err(self.error(ErrorKind::ProofFailed { proof: "dln" }, 2, culprits));
        }

        // accept the peers' parameters
        for (j, msg) in r1_messages.iter().enumerate() {
            if j == i {
                continue;
            }
            self.data.paillier_pks[j] = Some(msg.paillier_pk.clone());
            self.data.n_tilde_j[j] = Some(msg.n_tilde.clone());
            self.data.h1_j[j] = Some(msg.h1.clone());
            self.data.h2_j[j] = Some(msg.h2.clone());
        }

        // p2p: the private share s_ij = f_i(k_j) for every peer
        let shares = self
            .temp
            .shares
            .clone()
            .ok_or_else(|| self.error(ErrorKind::Internal("own shares missing".into()), 2, vec![]))?;
        for (j, share) in shares.iter().enumerate() {
            let content = KeygenMessage::Round2Share(KGRound2Message1 { share: share.share.clone() });
            if j == i {
                // own share goes straight into the store
                self.temp.r2_shares[i] = Some(KGRound2Message1 { share: share.share.clone() });
                continue;
            }
            self.send_p2p(parties.party(j).as_ref().clone(), content)?;
        }

        // broadcast: open the round-1 commitment
        let decommitment = self
            .temp
            .decommit_poly_g
            .clone()
            .ok_or_else(|| self.error(ErrorKind::Internal("own decommitment missing".into()), 2, vec![]))?;
        self.broadcast(KeygenMessage::Round2Decommit(KGRound2Message2 { decommitment }))
    }
}
