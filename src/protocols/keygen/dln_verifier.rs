// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Bounded-concurrency verification of round-1 DLN proofs.

use std::sync::mpsc;

use threadpool::ThreadPool;

use super::messages::KGRound1Message;

/// Result of checking one party's pair of DLN proofs.
#[derive(Debug)]
pub struct DlnVerificationResult {
    pub party_index: usize,
    pub proof1_valid: bool,
    pub proof2_valid: bool,
}

/// A worker pool for DLN proof verification. The concurrency is bounded and
/// must not be zero.
pub struct DlnProofVerifier {
    pool: ThreadPool,
}

impl DlnProofVerifier {
    pub fn new(concurrency: usize) -> Self {
        assert!(concurrency >= 1, "concurrency must be at least 1");
        Self { pool: ThreadPool::new(concurrency) }
    }

    /// Verifies both DLN proofs of each round-1 message in parallel.
    /// `messages` holds (sender index, message) pairs.
    pub fn verify_all(&self, messages: Vec<(usize, KGRound1Message)>) -> Vec<DlnVerificationResult> {
        let expected = messages.len();
        let (tx, rx) = mpsc::channel();
        for (party_index, msg) in messages {
            let tx = tx.clone();
            self.pool.execute(move || {
                let proof1_valid =
                    msg.unmarshal_dln_proof_1().verify(&msg.h1, &msg.h2, &msg.n_tilde);
                let proof2_valid =
                    msg.unmarshal_dln_proof_2().verify(&msg.h2, &msg.h1, &msg.n_tilde);
                // receiver outliving the pool is guaranteed by the join below
                let _ = tx.send(DlnVerificationResult { party_index, proof1_valid, proof2_valid });
            });
        }
        drop(tx);
        self.pool.join();
        let mut results: Vec<DlnVerificationResult> = rx.try_iter().collect();
        debug_assert_eq!(results.len(), expected);
        results.sort_by_key(|r| r.party_index);
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::dlnproof::DlnProof;
    use crate::crypto::paillier::PublicKey;
    use crate::test_support::fixture_pre_params;
    use num_bigint::BigInt;
    use rand::thread_rng;

    fn r1_message(i: usize) -> KGRound1Message {
        let mut rng = thread_rng();
        let pre = fixture_pre_params(i);
        let (p, q) = (pre.p.unwrap(), pre.q.unwrap());
        let dln_proof_1 = DlnProof::new(
            &pre.h1, &pre.h2, &pre.alpha.clone().unwrap(), &p, &q, &pre.n_tilde, &mut rng,
        )
        .unwrap();
        let dln_proof_2 = DlnProof::new(
            &pre.h2, &pre.h1, &pre.beta.unwrap(), &p, &q, &pre.n_tilde, &mut rng,
        )
        .unwrap();
        KGRound1Message {
            commitment: BigInt::from(1u8),
            paillier_pk: PublicKey { n: pre.paillier_sk.public_key.n.clone() },
            n_tilde: pre.n_tilde,
            h1: pre.h1,
            h2: pre.h2,
            dln_proof_1,
            dln_proof_2,
        }
    }

    #[test]
    fn test_parallel_verification() {
        let verifier = DlnProofVerifier::new(2);
        let m0 = r1_message(0);
        let mut m1 = r1_message(1);
        // corrupt one side of party 1's proofs
        m1.dln_proof_2.t[0] += BigInt::from(1u8);

        let results = verifier.verify_all(vec![(0, m0), (1, m1)]);
        assert_eq!(results.len(), 2);
        assert!(results[0].proof1_valid && results[0].proof2_valid);
        assert!(results[1].proof1_valid);
        assert!(!results[1].proof2_valid);
    }

    #[test]
    #[should_panic]
    fn test_zero_concurrency_is_rejected() {
        DlnProofVerifier::new(0);
    }
}
