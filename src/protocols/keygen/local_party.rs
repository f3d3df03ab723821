// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! The per-party keygen driver.

use std::sync::mpsc::Sender;
use std::sync::Arc;

use log::{debug, info};

use crate::tss::error::{ErrorKind, TssError};
use crate::tss::message::{MessageContent, ParsedMessage};
use crate::tss::params::Parameters;
use crate::tss::party::{validate_message, Party};
use crate::tss::party_id::PartyID;

use super::messages::KeygenMessage;
use super::types::{LocalPartySaveData, LocalPreParams, LocalTempData};
use super::TASK_NAME;

const ROUND_FINISHED: i32 = -1;

/// One party's keygen session. Outbound messages are pushed to `out`; the
/// final save data is delivered on `end`. Callers wrap the party in the
/// per-session mutex and feed inbound messages through [`Party::update`].
pub struct LocalParty {
    pub(super) params: Arc<Parameters>,
    pub(super) temp: LocalTempData,
    pub(super) data: LocalPartySaveData,
    pub(super) round: i32,
    pub(super) out: Sender<ParsedMessage<KeygenMessage>>,
    pub(super) end: Sender<LocalPartySaveData>,
}

impl LocalParty {
    /// Creates a keygen party. Supplying validated `pre_params` skips the
    /// expensive safe-prime generation in round 1.
    pub fn new(
        params: Arc<Parameters>,
        pre_params: Option<LocalPreParams>,
        out: Sender<ParsedMessage<KeygenMessage>>,
        end: Sender<LocalPartySaveData>,
    ) -> Result<Self, TssError> {
        let n = params.party_count();
        if let Some(pre) = &pre_params {
            if !pre.validate_with_proof() {
                return Err(TssError::config("supplied pre-params failed validation"));
            }
        }
        let mut data = LocalPartySaveData::new(n);
        data.pre_params = pre_params;
        Ok(Self {
            params,
            temp: LocalTempData::new(n),
            data,
            round: 0,
            out,
            end,
        })
    }

    pub(super) fn error(
        &self,
        kind: ErrorKind,
        round: i32,
        culprits: Vec<PartyID>,
    ) -> TssError {
        TssError::new(
            kind,
            TASK_NAME,
            round,
            Some(self.params.party_id().as_ref().clone()),
            culprits,
        )
    }

    pub(super) fn broadcast(&mut self, content: KeygenMessage) -> Result<(), TssError> {
        let own_index = self.params.party_index();
        let msg = ParsedMessage::broadcast(self.params.party_id().as_ref().clone(), content);
        // self-delivery: a party's own broadcast lands in its store directly
        self.temp.store(own_index, &msg);
        self.out.send(msg).map_err(|e| {
            self.error(ErrorKind::Internal(format!("outbound channel closed: {}", e)), self.round, vec![])
        })
    }

    pub(super) fn send_p2p(&mut self, to: PartyID, content: KeygenMessage) -> Result<(), TssError> {
        let msg = ParsedMessage::p2p(self.params.party_id().as_ref().clone(), to, content);
        self.out.send(msg).map_err(|e| {
            self.error(ErrorKind::Internal(format!("outbound channel closed: {}", e)), self.round, vec![])
        })
    }

    fn round_complete(&self) -> bool {
        let i = self.params.party_index();
        match self.round {
            1 => self.temp.r1_ok.is_full(),
            2 => self.temp.r2_share_ok.is_full_except(i) && self.temp.r2_decommit_ok.is_full(),
            4 => self.temp.r4_ok.is_full(),
            _ => false,
        }
    }

    /// Runs rounds for as long as the buffered messages allow.
    fn try_advance(&mut self) -> Result<(), TssError> {
        while self.round_complete() {
            match self.round {
                1 => {
                    self.round = 2;
                    info!("party {}: keygen round 2", self.params.party_id());
                    self.round2_start()?;
                }
                2 => {
                    // round 3 is internal: it verifies round-2 material and
                    // immediately emits the round-4 broadcast
                    self.round = 3;
                    info!("party {}: keygen round 3", self.params.party_id());
                    self.round3_start()?;
                    self.round = 4;
                }
                4 => {
                    info!("party {}: keygen output", self.params.party_id());
                    self.round4_finish()?;
                    self.round = ROUND_FINISHED;
                    return Ok(());
                }
                _ => return Ok(()),
            }
        }
        Ok(())
    }
}

impl Party for LocalParty {
    type Content = KeygenMessage;

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
        info!("party {}: keygen round 1", self.params.party_id());
        if let Err(err) = self.round1_start() {
            self.round = ROUND_FINISHED;
            return Err(err);
        }
        Ok(())
    }

    fn update(&mut self, msg: ParsedMessage<KeygenMessage>) -> Result<bool, TssError> {
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
        // future-round messages are buffered and picked up on advancement
        self.temp.store(from, &msg);
        if let Err(err) = self.try_advance() {
            self.round = ROUND_FINISHED;
            return Err(err);
        }
        Ok(true)
    }

    fn round_number(&self) -> i32 {
        self.round
    }

    fn waiting_for(&self) -> Vec<PartyID> {
        let i = self.params.party_index();
        let missing: Vec<usize> = match self.round {
            1 => self.temp.r1_ok.missing(),
            2 => {
                let mut missing = self.temp.r2_share_ok.missing();
                for j in self.temp.r2_decommit_ok.missing() {
                    if !missing.contains(&j) {
                        missing.push(j);
                    }
                }
                missing.sort_unstable();
                missing
            }
            4 => self.temp.r4_ok.missing(),
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
