// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Distributed key generation (DKG).
//!
//! Four message-bearing stages plus an internal verification stage, per
//! party: commit to a Feldman vector and publish auxiliary parameters with
//! DLN proofs (round 1); open the commitment and deal Shamir shares
//! (round 2); verify everything, derive the key material, and publish the
//! Paillier key-knowledge proof (round 3, internal, emitting the round-4
//! broadcast); verify the key-knowledge proofs and emit save data (round 4).

mod dln_verifier;
mod local_party;
pub mod messages;
mod round_1;
mod round_2;
mod round_3;
mod round_4;
pub mod types;

pub use dln_verifier::DlnProofVerifier;
pub use local_party::LocalParty;
pub use messages::KeygenMessage;
pub use types::{LocalPartySaveData, LocalPreParams};

pub(crate) const TASK_NAME: &str = "ecdsa-keygen";
