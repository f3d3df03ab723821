// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

pub mod curve;
pub mod error;
pub mod message;
pub mod params;
pub mod party;
pub mod party_id;
pub mod peers;
pub mod round;

pub use curve::CurveId;
pub use error::{CulpritSet, ErrorKind, TssError};
pub use message::{MessageContent, ParsedMessage};
pub use params::Parameters;
pub use party::Party;
pub use party_id::{sort_party_ids, PartyID};
pub use peers::PeerContext;
