// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

pub mod ecddh;
pub mod pdl_slack;
pub mod st_proof;

pub use ecddh::EcddhProof;
pub use pdl_slack::PdlWSlackProof;
pub use st_proof::{StProof, TProof};
