// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Typed protocol messages and their routing metadata.
//!
//! The wire encoding of a message is the transport's concern; the driver
//! deals in typed contents. Every content type reports its round number and
//! whether it travels as a broadcast, which the driver checks against the
//! actual routing.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tss::party_id::PartyID;

/// Behaviour common to all protocol message payloads.
pub trait MessageContent: Clone + fmt::Debug {
    /// The round this content belongs to (1-based).
    fn round_number(&self) -> i32;

    /// Whether this content type is sent as a reliable broadcast.
    fn is_broadcast(&self) -> bool;

    /// Structural validation of the payload, before any cryptography.
    fn validate_basic(&self) -> bool;

    /// Stable name used in logs and error reasons.
    fn content_type(&self) -> &'static str;
}

/// A routed protocol message.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParsedMessage<C> {
    pub from: PartyID,
    /// Recipients for point-to-point messages; `None` for broadcasts.
    pub to: Option<Vec<PartyID>>,
    pub is_broadcast: bool,
    pub content: C,
}

impl<C: MessageContent> ParsedMessage<C> {
    pub fn broadcast(from: PartyID, content: C) -> Self {
        Self { from, to: None, is_broadcast: true, content }
    }

    pub fn p2p(from: PartyID, to: PartyID, content: C) -> Self {
        Self { from, to: Some(vec![to]), is_broadcast: false, content }
    }

    /// Routing-level validation: the broadcast flag must match the content
    /// type and point-to-point messages must have exactly one recipient.
    pub fn validate_routing(&self) -> Result<(), String> {
        if self.is_broadcast != self.content.is_broadcast() {
            return Err(format!(
                "{}: broadcast flag mismatch (got {}, want {})",
                self.content.content_type(),
                self.is_broadcast,
                self.content.is_broadcast()
            ));
        }
        if self.is_broadcast {
            if self.to.is_some() {
                return Err(format!(
                    "{}: broadcast message must not carry recipients",
                    self.content.content_type()
                ));
            }
        } else {
            match &self.to {
                Some(to) if to.len() == 1 => {}
                _ => {
                    return Err(format!(
                        "{}: point-to-point message must have exactly one recipient",
                        self.content.content_type()
                    ));
                }
            }
        }
        Ok(())
    }
}
