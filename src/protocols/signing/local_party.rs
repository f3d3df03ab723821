// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! The per-party signing driver.

use std::sync::mpsc::Sender;
use std::sync::Arc;

use log::{debug, info};
use num_bigint::BigInt;
use num_integer::Integer;

use crate::crypto::ecpoint::ECPoint;
use crate::crypto::paillier::{PrivateKey, PublicKey};
use crate::protocols::keygen::LocalPartySaveData;
use crate::tss::error::{ErrorKind, TssError};
use crate::tss::message::{MessageContent, ParsedMessage};
use crate::tss::params::Parameters;
use crate::tss::party::{validate_message, Party};
use crate::tss::party_id::PartyID;

use super::messages::SigningMessage;
use super::types::{LocalTempData, SignatureData};
use super::TASK_NAME;

const ROUND_FINISHED: i32 = -1;

/// One party's signing session over a cohort of size >= t+1. `keys` must be
/// keygen save data already reshaped to the cohort (see
/// [`LocalPartySaveData::build_subset`]); `msg` is the message hash.
pub struct LocalParty {
    pub(super) params: Arc<Parameters>,
    pub(super) keys: LocalPartySaveData,
    pub(super) temp: LocalTempData,
    pub(super) round: i32,
    pub(super) out: Sender<ParsedMessage<SigningMessage>>,
    pub(super) end: Sender<SignatureData>,
}

impl LocalParty {
    pub fn new(
        params: Arc<Parameters>,
        keys: LocalPartySaveData,
        msg: BigInt,
        out: Sender<ParsedMessage<SigningMessage>>,
        end: Sender<SignatureData>,
    ) -> Result<Self, TssError> {
        let n = params.party_count();
        if keys.ks.len() != n {
            return Err(TssError::config("save data does not match the cohort size"));
        }
        if keys.ks != params.parties().keys() {
            return Err(TssError::config("save data share ids do not match the cohort"));
        }
        if keys.xi.is_none() || keys.ecdsa_pub.is_none() || keys.pre_params.is_none() {
            return Err(TssError::config("incomplete keygen save data"));
        }
        for j in 0..n {
            if keys.n_tilde_j[j].is_none()
                || keys.h1_j[j].is_none()
                || keys.h2_j[j].is_none()
                || keys.big_x_j[j].is_none()
                || keys.paillier_pks[j].is_none()
            {
                return Err(TssError::config("incomplete per-party keygen arrays"));
            }
        }
        let m = msg.mod_floor(&params.ec().order());
        let temp = LocalTempData::new(n, m);
        Ok(Self { params, keys, temp, round: 0, out, end })
    }

    pub(super) fn error(&self, kind: ErrorKind, round: i32, culprits: Vec<PartyID>) -> TssError {
        TssError::new(
            kind,
            TASK_NAME,
            round,
            Some(self.params.party_id().as_ref().clone()),
            culprits,
        )
    }

    pub(super) fn broadcast(&mut self, content: SigningMessage) -> Result<(), TssError> {
        let own_index = self.params.party_index();
        let msg = ParsedMessage::broadcast(self.params.party_id().as_ref().clone(), content);
        self.temp.store(own_index, &msg);
        self.out.send(msg).map_err(|e| {
            self.error(ErrorKind::Internal(format!("outbound channel closed: {}", e)), self.round, vec![])
        })
    }

    pub(super) fn send_p2p(&mut self, to: PartyID, content: SigningMessage) -> Result<(), TssError> {
        let msg = ParsedMessage::p2p(self.params.party_id().as_ref().clone(), to, content);
        self.out.send(msg).map_err(|e| {
            self.error(ErrorKind::Internal(format!("outbound channel closed: {}", e)), self.round, vec![])
        })
    }

    // --- keygen-array accessors; completeness was checked at construction ---

    pub(super) fn paillier_pk(&self, j: usize) -> &PublicKey {
        self.keys.paillier_pks[j].as_ref().expect("checked at construction")
    }

    pub(super) fn own_paillier_sk(&self) -> &PrivateKey {
        self.keys.paillier_sk().expect("checked at construction")
    }

    pub(super) fn n_tilde(&self, j: usize) -> (&BigInt, &BigInt, &BigInt) {
        (
            self.keys.n_tilde_j[j].as_ref().expect("checked at construction"),
            self.keys.h1_j[j].as_ref().expect("checked at construction"),
            self.keys.h2_j[j].as_ref().expect("checked at construction"),
        )
    }

    pub(super) fn ecdsa_pub(&self) -> &ECPoint {
        self.keys.ecdsa_pub.as_ref().expect("checked at construction")
    }

    /// Post-session invariant: the secret temporaries read zero.
    pub fn secrets_cleared(&self) -> bool {
        self.temp.secrets_cleared()
    }

    fn round_complete(&self) -> bool {
        let i = self.params.party_index();
        match self.round {
            1 => self.temp.sr1_p2p_ok.is_full_except(i) && self.temp.sr1_bcast_ok.is_full(),
            2 => self.temp.sr2_ok.is_full_except(i),
            3 => self.temp.sr3_ok.is_full(),
            4 => self.temp.sr4_ok.is_full(),
            5 => self.temp.sr5_ok.is_full(),
            6 => self.temp.sr6_ok.is_full(),
            7 => self.temp.sr7_ok.is_full(),
            _ => false,
        }
    }

    fn try_advance(&mut self) -> Result<(), TssError> {
        while self.round_complete() {
            let result = match self.round {
                1 => {
                    self.round = 2;
                    info!("party {}: signing round 2", self.params.party_id());
                    self.round2_start()
                }
                2 => {
                    self.round = 3;
                    info!("party {}: signing round 3", self.params.party_id());
                    self.round3_start()
                }
                3 => {
                    self.round = 4;
                    info!("party {}: signing round 4", self.params.party_id());
                    self.round4_start()
                }
                4 => {
                    self.round = 5;
                    info!("party {}: signing round 5", self.params.party_id());
                    self.round5_start()
                }
                5 => {
                    self.round = 6;
                    info!("party {}: signing round 6", self.params.party_id());
                    self.round6_start()
                }
                6 => {
                    self.round = 7;
                    info!("party {}: signing round 7", self.params.party_id());
                    self.round7_start()
                }
                7 => {
                    info!("party {}: signing finalization", self.params.party_id());
                    let result = self.finalize();
                    self.round = ROUND_FINISHED;
                    result
                }
                _ => return Ok(()),
            };
            if let Err(err) = result {
                // secrets never survive a failed session
                self.temp.zeroize_secrets();
                self.round = ROUND_FINISHED;
                return Err(err);
            }
            if self.round == ROUND_FINISHED {
                return Ok(());
            }
        }
        Ok(())
    }
}

impl Party for LocalParty {
    type Content = SigningMessage;

    fn params(&self) -> &Parameters {
        &self.params
    }

    fn party_id(&self) -> &PartyID {
        self.params.party_id()
    }

    fn start(&mut self) -> Result<(), TssError> {
        if self.round != 0 {
            return Err(self.error(
                ErrorKind::Internal("party already started".to_string()),
                self.round,
                vec![],
            ));
        }
        self.round = 1;
        info!("party {}: signing round 1", self.params.party_id());
        if let Err(err) = self.round1_start() {
            self.temp.zeroize_secrets();
            self.round = ROUND_FINISHED;
            return Err(err);
        }
        Ok(())
    }

    fn update(&mut self, msg: ParsedMessage<SigningMessage>) -> Result<bool, TssError> {
        if self.round == ROUND_FINISHED {
            return Err(self.error(
                ErrorKind::BadMessage { reason: "session already finished".to_string() },
                ROUND_FINISHED,
                vec![msg.from.clone()],
            ));
        }
        if self.round == 0 {
            return Err(self.error(
                ErrorKind::BadMessage { reason: "session not started".to_string() },
                0,
                vec![],
            ));
        }
        let from = validate_message(&self.params, &msg, TASK_NAME, self.round)?;
        debug!(
            "party {}: stored {} from {}",
            self.params.party_id(),
            msg.content.content_type(),
            msg.from
        );
        self.temp.store(from, &msg);
        self.try_advance()?;
        Ok(true)
    }

    fn round_number(&self) -> i32 {
        self.round
    }

    fn waiting_for(&self) -> Vec<PartyID> {
        let i = self.params.party_index();
        let missing: Vec<usize> = match self.round {
            1 => {
                let mut missing = self.temp.sr1_p2p_ok.missing();
                for j in self.temp.sr1_bcast_ok.missing() {
                    if !missing.contains(&j) {
                        missing.push(j);
                    }
                }
                missing.sort_unstable();
                missing
            }
            2 => self.temp.sr2_ok.missing(),
            3 => self.temp.sr3_ok.missing(),
            4 => self.temp.sr4_ok.missing(),
            5 => self.temp.sr5_ok.missing(),
            6 => self.temp.sr6_ok.missing(),
            7 => self.temp.sr7_ok.missing(),
            _ => Vec::new(),
        };
        missing
            .into_iter()
            .filter(|&j| j != i)
            .map(|j| self.params.parties().party(j).as_ref().clone())
            .collect()
    }

    fn is_finished(&self) -> bool {
        self.round == ROUND_FINISHED
    }
}
