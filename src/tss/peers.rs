// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Sorted peer context shared by a session's rounds.

use std::sync::Arc;

use num_bigint::BigInt;

use crate::tss::party_id::PartyID;

/// An immutable, sorted list of the session's parties.
#[derive(Clone, Debug)]
pub struct PeerContext {
    party_ids: Vec<Arc<PartyID>>,
}

impl PeerContext {
    /// Wraps an already sorted and indexed party list.
    pub fn new(sorted_ids: Vec<PartyID>) -> Self {
        debug_assert!(sorted_ids.windows(2).all(|w| w[0].key <= w[1].key));
        Self {
            party_ids: sorted_ids.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.party_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.party_ids.is_empty()
    }

    pub fn party_ids(&self) -> &[Arc<PartyID>] {
        &self.party_ids
    }

    pub fn party(&self, index: usize) -> &Arc<PartyID> {
        &self.party_ids[index]
    }

    /// Keys of all parties, in sorted order.
    pub fn keys(&self) -> Vec<BigInt> {
        self.party_ids.iter().map(|p| p.key.clone()).collect()
    }

    /// Index of the party with the given key.
    pub fn index_of_key(&self, key: &BigInt) -> Option<usize> {
        self.party_ids.iter().position(|p| &p.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tss::party_id::generate_test_party_ids;

    #[test]
    fn test_peer_context_lookup() {
        let ids = generate_test_party_ids(4);
        let ctx = PeerContext::new(ids.clone());
        assert_eq!(ctx.len(), 4);
        for (i, id) in ids.iter().enumerate() {
            assert_eq!(ctx.index_of_key(&id.key), Some(i));
        }
        assert_eq!(ctx.index_of_key(&BigInt::from(999)), None);
    }
}
