// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! The per-party driver interface.
//!
//! A `Party` is driven from the outside: `start` kicks off round 1, and every
//! inbound message goes through `update`, which validates, buffers, and
//! advances rounds once all expected messages for the current round have
//! arrived. Sessions are single-threaded as seen by the driver; callers that
//! feed messages from several threads wrap the party in a mutex.

use crate::tss::error::{ErrorKind, TssError};
use crate::tss::message::{MessageContent, ParsedMessage};
use crate::tss::params::Parameters;
use crate::tss::party_id::PartyID;

pub trait Party {
    type Content: MessageContent;

    fn params(&self) -> &Parameters;

    fn party_id(&self) -> &PartyID;

    /// Starts the first round. Errors if already running.
    fn start(&mut self) -> Result<(), TssError>;

    /// Feeds one validated inbound message; buffers it and advances as many
    /// rounds as possible. Returns `Ok(true)` when the message was consumed.
    fn update(&mut self, msg: ParsedMessage<Self::Content>) -> Result<bool, TssError>;

    /// The current round number, or -1 before start / after completion.
    fn round_number(&self) -> i32;

    /// Parties the current round is still waiting on.
    fn waiting_for(&self) -> Vec<PartyID>;

    fn is_finished(&self) -> bool;
}

/// Driver-level message validation (`BasicValidate`): known sender, sane
/// routing, structurally valid payload. Cryptographic checks happen in the
/// rounds.
pub fn validate_message<C: MessageContent>(
    params: &Parameters,
    msg: &ParsedMessage<C>,
    task: &'static str,
    round: i32,
) -> Result<usize, TssError> {
    let bad = |reason: String, culprits: Vec<PartyID>| {
        TssError::new(
            ErrorKind::BadMessage { reason },
            task,
            round,
            Some(params.party_id().as_ref().clone()),
            culprits,
        )
    };

    if !msg.from.validate_basic() {
        return Err(bad(format!("invalid sender: {:?}", msg.from), Vec::new()));
    }
    let from_index = match params.parties().index_of_key(&msg.from.key) {
        Some(i) => i,
        None => {
            return Err(bad(
                format!("sender not in session: {}", msg.from),
                vec![msg.from.clone()],
            ))
        }
    };
    if from_index != msg.from.index as usize {
        return Err(bad(
            format!("sender index mismatch: {}", msg.from),
            vec![msg.from.clone()],
        ));
    }
    if from_index == params.party_index() {
        return Err(bad("message from self".to_string(), Vec::new()));
    }
    if let Err(reason) = msg.validate_routing() {
        return Err(bad(reason, vec![msg.from.clone()]));
    }
    if !msg.content.validate_basic() {
        return Err(bad(
            format!("{} failed basic validation", msg.content.content_type()),
            vec![msg.from.clone()],
        ));
    }
    Ok(from_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tss::curve::CurveId;
    use crate::tss::message::MessageContent;
    use crate::tss::party_id::generate_test_party_ids;
    use crate::tss::peers::PeerContext;
    use std::sync::Arc;

    #[derive(Clone, Debug)]
    struct Dummy;

    impl MessageContent for Dummy {
        fn round_number(&self) -> i32 {
            1
        }
        fn is_broadcast(&self) -> bool {
            true
        }
        fn validate_basic(&self) -> bool {
            true
        }
        fn content_type(&self) -> &'static str {
            "Dummy"
        }
    }

    fn params() -> Parameters {
        let ids = generate_test_party_ids(3);
        let me = Arc::new(ids[0].clone());
        Parameters::new(CurveId::Secp256k1, Arc::new(PeerContext::new(ids)), me, 1).unwrap()
    }

    #[test]
    fn test_accepts_peer_broadcast() {
        let params = params();
        let from = params.parties().party(1).as_ref().clone();
        let msg = ParsedMessage::broadcast(from, Dummy);
        assert_eq!(validate_message(&params, &msg, "test", 1).unwrap(), 1);
    }

    #[test]
    fn test_rejects_self_and_unknown_senders() {
        let params = params();

        let own = params.party_id().as_ref().clone();
        let msg = ParsedMessage::broadcast(own, Dummy);
        assert!(validate_message(&params, &msg, "test", 1).is_err());

        let mut stranger = PartyID::new("x", "X", num_bigint::BigInt::from(42));
        stranger.index = 0;
        let msg = ParsedMessage::broadcast(stranger, Dummy);
        assert!(validate_message(&params, &msg, "test", 1).is_err());
    }

    #[test]
    fn test_rejects_bad_routing() {
        let params = params();
        let from = params.parties().party(1).as_ref().clone();
        let to = params.party_id().as_ref().clone();
        // Dummy declares itself broadcast; sending p2p must fail
        let msg = ParsedMessage::p2p(from, to, Dummy);
        let err = validate_message(&params, &msg, "test", 1).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::BadMessage { .. }));
    }
}
