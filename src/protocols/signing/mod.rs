// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Threshold signing (GG18 with identifiable-abort hardening).
//!
//! Seven message-bearing rounds plus finalization. Rounds 1-3 run the MtA
//! conversions that turn the multiplicative nonce/key shares into additive
//! delta and sigma shares; rounds 4-5 reveal R = k^-1*G; rounds 6-7 run the
//! two aggregate integrity checks, each with an identifiable-abort branch
//! that attributes a failed check to the misbehaving party; finalization
//! assembles and verifies the signature.

mod finalize;
mod local_party;
pub mod messages;
mod round_1;
mod round_2;
mod round_3;
mod round_4;
mod round_5;
mod round_6;
mod round_7;
pub mod types;

pub use local_party::LocalParty;
pub use messages::SigningMessage;
pub use types::SignatureData;

pub(crate) const TASK_NAME: &str = "ecdsa-signing";
