// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Protocol participant identities.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use num_bigint::BigInt;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

/// A participant in the protocol rounds.
///
/// `key` is the unique Shamir evaluation abscissa; `index` is the party's
/// rank after sorting by key and is assigned by [`sort_party_ids`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PartyID {
    pub id: String,
    pub moniker: String,
    pub key: BigInt,
    pub index: i32,
}

impl PartyID {
    /// Creates a new `PartyID`. `index` starts at -1 and is assigned when the
    /// session's party list is sorted.
    pub fn new(id: impl Into<String>, moniker: impl Into<String>, key: BigInt) -> Self {
        Self {
            id: id.into(),
            moniker: moniker.into(),
            key,
            index: -1,
        }
    }

    pub fn validate_basic(&self) -> bool {
        !self.key.is_zero() && self.index >= 0
    }
}

// Ordering, equality and hashing consider the key only.
impl Ord for PartyID {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl PartialOrd for PartyID {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PartyID {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for PartyID {}

impl Hash for PartyID {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for PartyID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{},{}}}", self.index, self.moniker)
    }
}

/// Sorts parties in place by key and assigns zero-based indices.
pub fn sort_party_ids(ids: &mut [PartyID]) {
    ids.sort_unstable();
    for (i, id) in ids.iter_mut().enumerate() {
        id.index = i as i32;
    }
}

/// Finds a party by its key.
pub fn find_party_by_key<'a>(ids: &'a [PartyID], key: &BigInt) -> Option<&'a PartyID> {
    ids.iter().find(|p| &p.key == key)
}

/// All parties except `exclude`.
pub fn exclude_party(ids: &[PartyID], exclude: &PartyID) -> Vec<PartyID> {
    ids.iter().filter(|&p| p != exclude).cloned().collect()
}

/// The keys of all parties, in list order.
pub fn get_party_keys(ids: &[PartyID]) -> Vec<BigInt> {
    ids.iter().map(|p| p.key.clone()).collect()
}

/// Generates `count` parties with small distinct keys, sorted and indexed.
/// Intended for tests and local simulations.
pub fn generate_test_party_ids(count: usize) -> Vec<PartyID> {
    let mut ids: Vec<PartyID> = (1..=count)
        .map(|i| PartyID::new(format!("id_{}", i), format!("P[{}]", i), BigInt::from(i)))
        .collect();
    sort_party_ids(&mut ids);
    debug_assert_eq!(
        ids.iter().map(|p| p.key.clone()).collect::<HashSet<_>>().len(),
        count
    );
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_basic() {
        let mut p1 = PartyID::new("p1", "Moniker1", BigInt::from(123));
        assert!(!p1.validate_basic()); // index is -1
        p1.index = 0;
        assert!(p1.validate_basic());

        let mut p0 = PartyID::new("p0", "Moniker0", BigInt::zero());
        p0.index = 0;
        assert!(!p0.validate_basic()); // zero key
    }

    #[test]
    fn test_sorting_assigns_indices() {
        let mut ids = vec![
            PartyID::new("p3", "P3", BigInt::from(300)),
            PartyID::new("p1", "P1", BigInt::from(100)),
            PartyID::new("p2", "P2", BigInt::from(200)),
        ];
        sort_party_ids(&mut ids);
        assert_eq!(ids[0].key, BigInt::from(100));
        assert_eq!(ids[0].index, 0);
        assert_eq!(ids[1].key, BigInt::from(200));
        assert_eq!(ids[1].index, 1);
        assert_eq!(ids[2].key, BigInt::from(300));
        assert_eq!(ids[2].index, 2);
    }

    #[test]
    fn test_equality_and_hashing_by_key() {
        let a = PartyID { id: "a".into(), moniker: "A".into(), key: BigInt::from(100), index: 0 };
        let b = PartyID { id: "b".into(), moniker: "B".into(), key: BigInt::from(100), index: 1 };
        let c = PartyID { id: "c".into(), moniker: "C".into(), key: BigInt::from(200), index: 2 };

        assert_eq!(a, b);
        assert_ne!(a, c);

        let mut set = HashSet::new();
        assert!(set.insert(a.clone()));
        assert!(!set.insert(b));
        assert!(set.insert(c));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_find_and_exclude() {
        let mut ids = vec![
            PartyID::new("p3", "P3", BigInt::from(300)),
            PartyID::new("p1", "P1", BigInt::from(100)),
            PartyID::new("p2", "P2", BigInt::from(200)),
        ];
        sort_party_ids(&mut ids);

        let found = find_party_by_key(&ids, &BigInt::from(200)).unwrap();
        assert_eq!(found.moniker, "P2");
        assert!(find_party_by_key(&ids, &BigInt::from(400)).is_none());

        let rest = exclude_party(&ids, &ids[1].clone());
        assert_eq!(rest.len(), 2);
        assert_eq!(rest[0].key, BigInt::from(100));
        assert_eq!(rest[1].key, BigInt::from(300));
    }

    #[test]
    fn test_generate_test_party_ids() {
        let ids = generate_test_party_ids(5);
        assert_eq!(ids.len(), 5);
        for (i, id) in ids.iter().enumerate() {
            assert_eq!(id.index, i as i32);
            assert!(id.validate_basic());
        }
    }
}
