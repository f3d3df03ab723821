// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

pub mod commitments;
pub mod dlnproof;
pub mod ecpoint;
pub mod mta;
pub mod paillier;
pub mod schnorr;
pub mod vss;
pub mod zkp;
