// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Keygen wire messages.

use num_bigint::BigInt;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::crypto::dlnproof::{DlnProof, ITERATIONS};
use crate::crypto::paillier::{PaillierProof, PublicKey, PROOF_ITERS};
use crate::tss::message::MessageContent;

/// Round 1 broadcast: commitment to the Feldman vector plus the party's
/// Paillier and auxiliary parameters with both DLN proofs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KGRound1Message {
    pub commitment: BigInt,
    pub paillier_pk: PublicKey,
    pub n_tilde: BigInt,
    pub h1: BigInt,
    pub h2: BigInt,
    pub dln_proof_1: DlnProof,
    pub dln_proof_2: DlnProof,
}

impl KGRound1Message {
    /// The proof of h2 = h1^alpha.
    pub fn unmarshal_dln_proof_1(&self) -> &DlnProof {
        &self.dln_proof_1
    }

    /// The proof of h1 = h2^beta.
    pub fn unmarshal_dln_proof_2(&self) -> &DlnProof {
        &self.dln_proof_2
    }
}

/// Round 2 point-to-point: the recipient's Shamir share.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KGRound2Message1 {
    pub share: BigInt,
}

/// Round 2 broadcast: the decommitment opening the round-1 commitment to
/// the Feldman verification vector.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KGRound2Message2 {
    pub decommitment: Vec<BigInt>,
}

/// Round 4 broadcast: the Paillier secret-key knowledge proof.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KGRound4Message {
    pub proof: PaillierProof,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum KeygenMessage {
    Round1(KGRound1Message),
    Round2Share(KGRound2Message1),
    Round2Decommit(KGRound2Message2),
    Round4(KGRound4Message),
}

impl MessageContent for KeygenMessage {
    fn round_number(&self) -> i32 {
        match self {
            KeygenMessage::Round1(_) => 1,
            KeygenMessage::Round2Share(_) | KeygenMessage::Round2Decommit(_) => 2,
            KeygenMessage::Round4(_) => 4,
        }
    }

    fn is_broadcast(&self) -> bool {
        !matches!(self, KeygenMessage::Round2Share(_))
    }

    fn validate_basic(&self) -> bool {
        match self {
            KeygenMessage::Round1(m) => {
                !m.commitment.is_zero()
                    && !m.paillier_pk.n.is_zero()
                    && !m.n_tilde.is_zero()
                    && !m.h1.is_zero()
                    && !m.h2.is_zero()
                    && m.dln_proof_1.alpha.len() == ITERATIONS
                    && m.dln_proof_1.t.len() == ITERATIONS
                    && m.dln_proof_2.alpha.len() == ITERATIONS
                    && m.dln_proof_2.t.len() == ITERATIONS
            }
            KeygenMessage::Round2Share(m) => !m.share.is_zero(),
            KeygenMessage::Round2Decommit(m) => {
                // blinding value plus an even number of point coordinates
                m.decommitment.len() >= 3 && m.decommitment.len() % 2 == 1
            }
            KeygenMessage::Round4(m) => m.proof.values.len() == PROOF_ITERS,
        }
    }

    fn content_type(&self) -> &'static str {
        match self {
            KeygenMessage::Round1(_) => "KGRound1Message",
            KeygenMessage::Round2Share(_) => "KGRound2Message1",
            KeygenMessage::Round2Decommit(_) => "KGRound2Message2",
            KeygenMessage::Round4(_) => "KGRound4Message",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_numbers_and_flags() {
        let share = KeygenMessage::Round2Share(KGRound2Message1 { share: BigInt::from(1) });
        assert_eq!(share.round_number(), 2);
        assert!(!share.is_broadcast());
        assert!(share.validate_basic());

        let decommit = KeygenMessage::Round2Decommit(KGRound2Message2 {
            decommitment: vec![BigInt::from(1); 5],
        });
        assert_eq!(decommit.round_number(), 2);
        assert!(decommit.is_broadcast());
        assert!(decommit.validate_basic());

        let zero_share = KeygenMessage::Round2Share(KGRound2Message1 { share: BigInt::zero() });
        assert!(!zero_share.validate_basic());

        let bad_decommit = KeygenMessage::Round2Decommit(KGRound2Message2 {
            decommitment: vec![BigInt::from(1); 4],
        });
        assert!(!bad_decommit.validate_basic());
    }
}
