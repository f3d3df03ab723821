// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Round 4 (output): verify every peer's Paillier key-knowledge proof and
//! emit the final save data.

use std::sync::mpsc;

use threadpool::ThreadPool;

use crate::tss::error::{ErrorKind, TssError};
use crate::tss::party_id::PartyID;

use super::local_party::LocalParty;

impl LocalParty {
    pub(super) fn round4_finish(&mut self) -> Result<(), TssError> {
        let n = self.params.party_count();
        let i = self.params.party_index();
        let parties = self.params.parties().clone();
        let y = self
            .data
            .ecdsa_pub
            .clone()
            .ok_or_else(|| self.error(ErrorKind::Internal("public key missing".into()), 4, vec![]))?;

        // peers' proofs verify on the bounded pool; results joined before
        // the session completes
        let pool = ThreadPool::new(self.params.concurrency());
        let (tx, rx) = mpsc::channel();
        for j in 0..n {
            if j == i {
                continue;
            }
            let proof = self.temp.r4_messages[j]
                .as_ref()
                .map(|m| m.proof.clone())
                .ok_or_else(|| self.error(ErrorKind::Internal("round 4 store incomplete".into()), 4, vec![]))?;
            let pk_n = self.data.paillier_pks[j]
                .as_ref()
                .map(|pk| pk.n.clone())
                .ok_or_else(|| self.error(ErrorKind::Internal("peer paillier key missing".into()), 4, vec![]))?;
            let k_j = parties.party(j).key.clone();
            let y = y.clone();
            let tx = tx.clone();
            pool.execute(move || {
                let ok = proof.verify(&pk_n, &k_j, &y).unwrap_or(false);
                let _ = tx.send((j, ok));
            });
        }
        drop(tx);
        pool.join();

        let mut culprits: Vec<PartyID> = rx
            .try_iter()
            .filter(|(_, ok)| !ok)
            .map(|(j, _)| parties.party(j).as_ref().clone())
            .collect();
        if !culprits.is_empty() {
            culprits.sort_by_key(|p| p.index);
            return Err(self.error(ErrorKind::ProofFailed { proof: "paillier-key" }, 4, culprits));
        }

        self.end.send(self.data.clone()).map_err(|e| {
            self.error(ErrorKind::Internal(format!("end channel closed: {}", e)), 4, vec![])
        })
    }
}
