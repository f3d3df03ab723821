// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Signing wire messages, including the identifiable-abort bundles.

use num_bigint::BigInt;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::crypto::ecpoint::ECPoint;
use crate::crypto::mta::{ProofBob, ProofBobWC, RangeProofAlice};
use crate::crypto::schnorr::ZkProof;
use crate::crypto::zkp::{EcddhProof, PdlWSlackProof, StProof, TProof};
use crate::tss::message::MessageContent;

/// Round 1 point-to-point: the k_i ciphertext with a range proof bound to
/// the recipient's auxiliary parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignRound1P2P {
    pub c_a: BigInt,
    pub range_proof: RangeProofAlice,
}

/// Round 1 broadcast: commitment to Gamma_i = gamma_i * G.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignRound1Bcast {
    pub commitment: BigInt,
}

/// Round 2 point-to-point: the two MtA response ciphertexts with Bob's
/// proofs (plain for the gamma pair, with-check for the w pair).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignRound2P2P {
    pub c_gamma: BigInt,
    pub proof_gamma: ProofBob,
    pub c_w: BigInt,
    pub proof_w: ProofBobWC,
}

/// Round 3 broadcast: delta_i and T_i with its two-base proof.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignRound3Bcast {
    pub delta: BigInt,
    pub t_point: ECPoint,
    pub t_proof: TProof,
}

/// Round 4 broadcast: the Gamma_i decommitment and a Schnorr proof of
/// gamma_i.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignRound4Bcast {
    pub decommitment: Vec<BigInt>,
    pub gamma_proof: ZkProof,
}

/// Round 5 broadcast: RBar_i = k_i * R with one PDL-with-slack proof per
/// verifier's auxiliary parameters (indexed by party).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignRound5Bcast {
    pub big_r_bar: ECPoint,
    pub proofs: Vec<PdlWSlackProof>,
}

/// Round 6 broadcast, success branch: S_i with the ST proof linking it to
/// T_i via R and H.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignRound6Success {
    pub big_s: ECPoint,
    pub st_proof: StProof,
}

/// Type-5 abort bundle: the nonce material needed to recompute every
/// delta_j. Vectors are indexed by peer; the own slot is `None`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AbortType5Bundle {
    pub k: BigInt,
    pub gamma: BigInt,
    pub k_randomness: BigInt,
    pub alphas: Vec<Option<BigInt>>,
    pub betas: Vec<Option<BigInt>>,
}

/// Round 7 broadcast, success branch: the additive signature share s_i.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignRound7Success {
    pub s_share: BigInt,
}

/// Type-7 abort bundle: the k_i/mu material plus an ECDDH proof tying
/// sigma_i * G to S_i. Vectors are indexed by peer; the own slot is `None`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AbortType7Bundle {
    pub k: BigInt,
    pub k_randomness: BigInt,
    pub mus: Vec<Option<BigInt>>,
    pub mu_randomness: Vec<Option<BigInt>>,
    pub ecddh_proof: EcddhProof,
}

/// A stored round-6 slot: a peer either progressed or opened the type-5
/// abort branch.
#[derive(Clone, Debug)]
pub(super) enum Round6Payload {
    Success(SignRound6Success),
    Abort(AbortType5Bundle),
}

/// A stored round-7 slot.
#[derive(Clone, Debug)]
pub(super) enum Round7Payload {
    Success(SignRound7Success),
    Abort(AbortType7Bundle),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum SigningMessage {
    Round1P2P(SignRound1P2P),
    Round1Bcast(SignRound1Bcast),
    Round2P2P(SignRound2P2P),
    Round3Bcast(SignRound3Bcast),
    Round4Bcast(SignRound4Bcast),
    Round5Bcast(SignRound5Bcast),
    Round6Success(SignRound6Success),
    Round6Abort(AbortType5Bundle),
    Round7Success(SignRound7Success),
    Round7Abort(AbortType7Bundle),
}

impl MessageContent for SigningMessage {
    fn round_number(&self) -> i32 {
        match self {
            SigningMessage::Round1P2P(_) | SigningMessage::Round1Bcast(_) => 1,
            SigningMessage::Round2P2P(_) => 2,
            SigningMessage::Round3Bcast(_) => 3,
            SigningMessage::Round4Bcast(_) => 4,
            SigningMessage::Round5Bcast(_) => 5,
            SigningMessage::Round6Success(_) | SigningMessage::Round6Abort(_) => 6,
            SigningMessage::Round7Success(_) | SigningMessage::Round7Abort(_) => 7,
        }
    }

    fn is_broadcast(&self) -> bool {
        !matches!(self, SigningMessage::Round1P2P(_) | SigningMessage::Round2P2P(_))
    }

    fn validate_basic(&self) -> bool {
        match self {
            SigningMessage::Round1P2P(m) => !m.c_a.is_zero() && m.range_proof.validate_basic(),
            SigningMessage::Round1Bcast(m) => !m.commitment.is_zero(),
            SigningMessage::Round2P2P(m) => {
                !m.c_gamma.is_zero()
                    && !m.c_w.is_zero()
                    && m.proof_gamma.validate_basic()
                    && m.proof_w.validate_basic()
            }
            SigningMessage::Round3Bcast(m) => m.t_point.validate_basic(),
            SigningMessage::Round4Bcast(m) => {
                m.decommitment.len() == 3 && m.gamma_proof.validate_basic()
            }
            SigningMessage::Round5Bcast(m) => {
                m.big_r_bar.validate_basic() && !m.proofs.is_empty()
            }
            SigningMessage::Round6Success(m) => m.big_s.validate_basic(),
            SigningMessage::Round6Abort(m) => {
                !m.k.is_zero() && m.alphas.len() == m.betas.len()
            }
            SigningMessage::Round7Success(m) => !m.s_share.is_zero(),
            SigningMessage::Round7Abort(m) => {
                !m.k.is_zero() && m.mus.len() == m.mu_randomness.len()
            }
        }
    }

    fn content_type(&self) -> &'static str {
        match self {
            SigningMessage::Round1P2P(_) => "SignRound1P2P",
            SigningMessage::Round1Bcast(_) => "SignRound1Bcast",
            SigningMessage::Round2P2P(_) => "SignRound2P2P",
            SigningMessage::Round3Bcast(_) => "SignRound3Bcast",
            SigningMessage::Round4Bcast(_) => "SignRound4Bcast",
            SigningMessage::Round5Bcast(_) => "SignRound5Bcast",
            SigningMessage::Round6Success(_) => "SignRound6Success",
            SigningMessage::Round6Abort(_) => "SignRound6Abort",
            SigningMessage::Round7Success(_) => "SignRound7Success",
            SigningMessage::Round7Abort(_) => "SignRound7Abort",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_numbers_and_broadcast_flags() {
        let bcast = SigningMessage::Round1Bcast(SignRound1Bcast { commitment: BigInt::from(5) });
        assert_eq!(bcast.round_number(), 1);
        assert!(bcast.is_broadcast());
        assert!(bcast.validate_basic());

        let s7 = SigningMessage::Round7Success(SignRound7Success { s_share: BigInt::from(1) });
        assert_eq!(s7.round_number(), 7);
        assert!(s7.is_broadcast());

        let zero = SigningMessage::Round1Bcast(SignRound1Bcast { commitment: BigInt::zero() });
        assert!(!zero.validate_basic());
    }
}
