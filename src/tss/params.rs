// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Session parameters.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use num_integer::Integer;
use num_traits::Zero;

use crate::tss::curve::CurveId;
use crate::tss::error::TssError;
use crate::tss::party_id::PartyID;
use crate::tss::peers::PeerContext;

const DEFAULT_SAFE_PRIME_GEN_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Common parameters for a protocol session.
///
/// `threshold` is t: any t+1 parties can sign. Construction validates the
/// configuration; violations are fatal with an empty culprit set.
#[derive(Clone, Debug)]
pub struct Parameters {
    ec: CurveId,
    parties: Arc<PeerContext>,
    party_id: Arc<PartyID>,
    party_count: usize,
    threshold: usize,
    concurrency: usize,
    safe_prime_gen_timeout: Duration,
}

impl Parameters {
    pub fn new(
        ec: CurveId,
        parties: Arc<PeerContext>,
        party_id: Arc<PartyID>,
        threshold: usize,
    ) -> Result<Self, TssError> {
        let party_count = parties.len();
        if threshold == 0 || threshold >= party_count {
            return Err(TssError::config(format!(
                "threshold must satisfy 0 < t < n (t={}, n={})",
                threshold, party_count
            )));
        }
        let order = ec.order();
        let mut keys = HashSet::new();
        for p in parties.party_ids() {
            let key_mod_q = p.key.mod_floor(&order);
            if key_mod_q.is_zero() {
                return Err(TssError::config(format!("party {} has a zero key", p.id)));
            }
            if !keys.insert(key_mod_q) {
                return Err(TssError::config(format!(
                    "duplicate party key (mod curve order): {}",
                    p.key
                )));
            }
        }
        if parties.index_of_key(&party_id.key).is_none() {
            return Err(TssError::config("own party id not found in parties"));
        }

        let concurrency = thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        Ok(Self {
            ec,
            parties,
            party_id,
            party_count,
            threshold,
            concurrency,
            safe_prime_gen_timeout: DEFAULT_SAFE_PRIME_GEN_TIMEOUT,
        })
    }

    pub fn ec(&self) -> CurveId {
        self.ec
    }

    pub fn parties(&self) -> &Arc<PeerContext> {
        &self.parties
    }

    pub fn party_id(&self) -> &Arc<PartyID> {
        &self.party_id
    }

    /// This party's index in the sorted party list.
    pub fn party_index(&self) -> usize {
        self.party_id.index as usize
    }

    pub fn party_count(&self) -> usize {
        self.party_count
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn safe_prime_gen_timeout(&self) -> Duration {
        self.safe_prime_gen_timeout
    }

    /// Sets the worker-pool width for proof verification and pre-parameter
    /// generation. Must be at least 1.
    pub fn set_concurrency(&mut self, concurrency: usize) -> &mut Self {
        assert!(concurrency >= 1, "concurrency must be at least 1");
        self.concurrency = concurrency;
        self
    }

    pub fn set_safe_prime_gen_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.safe_prime_gen_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tss::party_id::{generate_test_party_ids, sort_party_ids};
    use num_bigint::BigInt;

    fn make(n: usize, t: usize) -> Result<Parameters, TssError> {
        let ids = generate_test_party_ids(n);
        let me = Arc::new(ids[0].clone());
        Parameters::new(CurveId::Secp256k1, Arc::new(PeerContext::new(ids)), me, t)
    }

    #[test]
    fn test_valid_parameters() {
        let params = make(3, 1).unwrap();
        assert_eq!(params.party_count(), 3);
        assert_eq!(params.threshold(), 1);
        assert!(params.concurrency() >= 1);
        assert_eq!(params.party_index(), 0);
    }

    #[test]
    fn test_threshold_bounds() {
        assert!(make(3, 0).is_err());
        assert!(make(3, 3).is_err());
        assert!(make(3, 4).is_err());
        assert!(make(3, 2).is_ok());
    }

    #[test]
    fn test_self_must_be_member() {
        let ids = generate_test_party_ids(3);
        let outsider = Arc::new(PartyID::new("x", "X", BigInt::from(99)));
        let err =
            Parameters::new(CurveId::Secp256k1, Arc::new(PeerContext::new(ids)), outsider, 1);
        assert!(err.is_err());
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let mut ids = vec![
            PartyID::new("a", "A", BigInt::from(1)),
            PartyID::new("b", "B", BigInt::from(2)),
            PartyID::new("c", "C", BigInt::from(2)),
        ];
        sort_party_ids(&mut ids);
        let me = Arc::new(ids[0].clone());
        let err = Parameters::new(CurveId::Secp256k1, Arc::new(PeerContext::new(ids)), me, 1);
        assert!(err.is_err());
    }
}
