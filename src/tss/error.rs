// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Session errors carrying culprit attribution.

use std::fmt;

use thiserror::Error;

use crate::tss::party_id::PartyID;

/// The set of parties responsible for a failure. Empty means the error is
/// self-attributable (local computation or configuration).
pub type CulpritSet = Vec<PartyID>;

/// Classification of protocol failures visible to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("proof verification failed: {proof}")]
    ProofFailed { proof: &'static str },
    #[error("invariant failed: {name}")]
    InvariantFailed { name: &'static str },
    #[error("bad message: {reason}")]
    BadMessage { reason: String },
    #[error("identifiable abort (type {abort_type})")]
    Aborted { abort_type: u8 },
    #[error("produced signature failed verification")]
    SignatureInvalid,
    #[error("invalid configuration: {0}")]
    Configuration(String),
    #[error("operation timed out")]
    Timeout,
    #[error("cryptographic operation failed: {0}")]
    Crypto(String),
    #[error("internal error: {0}")]
    Internal(String),
}

/// A protocol error wrapped with its task, round, victim and culprits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TssError {
    pub kind: ErrorKind,
    pub task: &'static str,
    pub round: i32,
    pub victim: Option<PartyID>,
    pub culprits: CulpritSet,
}

impl TssError {
    pub fn new(
        kind: ErrorKind,
        task: &'static str,
        round: i32,
        victim: Option<PartyID>,
        culprits: CulpritSet,
    ) -> Self {
        Self { kind, task, round, victim, culprits }
    }

    /// An error with no protocol context (configuration and similar).
    pub fn config(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration(reason.into()), "", -1, None, Vec::new())
    }
}

impl fmt::Display for TssError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task '{}', round {}", self.task, self.round)?;
        if let Some(victim) = &self.victim {
            write!(f, ", victim {}", victim)?;
        }
        if !self.culprits.is_empty() {
            write!(f, ", culprits {:?}", self.culprits)?;
        }
        write!(f, ": {}", self.kind)
    }
}

impl std::error::Error for TssError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}
