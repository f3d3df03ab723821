// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Collision-resistant hash commitments over lists of integers.

use num_bigint::BigInt;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::common::hash::sha512_256i;
use crate::common::random::must_get_random_int;
use crate::common::slice::multi_bytes_to_bigints;

const HASH_COMMITMENT_RANDOMNESS_BITS: u64 = 256;

pub type HashCommitment = BigInt;
/// The decommitment is the blinding value followed by the secrets.
pub type HashDeCommitment = Vec<BigInt>;

/// A commitment C = H(r, m1, m2, ...) together with its opening.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashCommitDecommit {
    pub c: HashCommitment,
    pub d: HashDeCommitment,
}

impl HashCommitDecommit {
    pub fn new_with_randomness(r: BigInt, secrets: &[&BigInt]) -> Self {
        let mut parts: Vec<&BigInt> = Vec::with_capacity(secrets.len() + 1);
        parts.push(&r);
        parts.extend_from_slice(secrets);

        let c = sha512_256i(&parts).expect("non-empty input");

        let mut d = Vec::with_capacity(parts.len());
        d.push(r);
        d.extend(secrets.iter().map(|&s| s.clone()));
        Self { c, d }
    }

    pub fn new<R: CryptoRng + RngCore>(rng: &mut R, secrets: &[&BigInt]) -> Self {
        let r = must_get_random_int(rng, HASH_COMMITMENT_RANDOMNESS_BITS);
        Self::new_with_randomness(r, secrets)
    }

    /// Rebuilds a decommitment from marshalled bytes.
    pub fn decommitment_from_bytes(marshalled: &[Vec<u8>]) -> HashDeCommitment {
        multi_bytes_to_bigints(marshalled)
    }

    /// True when C matches the hash of D.
    pub fn verify(&self) -> bool {
        if self.d.is_empty() {
            return false;
        }
        let d_refs: Vec<&BigInt> = self.d.iter().collect();
        match sha512_256i(&d_refs) {
            Some(hash) => hash == self.c,
            None => false,
        }
    }

    /// Verifies and, on success, returns the committed secrets (the
    /// decommitment minus the leading blinding value).
    pub fn decommit(&self) -> Option<Vec<BigInt>> {
        if self.verify() {
            Some(self.d.iter().skip(1).cloned().collect())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::One;
    use rand::thread_rng;

    #[test]
    fn test_commit_verify_decommit() {
        let mut rng = thread_rng();
        let s1 = BigInt::from(123456789u64);
        let s2 = BigInt::parse_bytes(b"deadbeefcafebabe", 16).unwrap();

        let cmt = HashCommitDecommit::new(&mut rng, &[&s1, &s2]);
        assert!(cmt.verify());

        let opened = cmt.decommit().unwrap();
        assert_eq!(opened, vec![s1.clone(), s2.clone()]);

        let mut tampered_c = cmt.clone();
        tampered_c.c += BigInt::one();
        assert!(!tampered_c.verify());
        assert!(tampered_c.decommit().is_none());

        let mut tampered_r = cmt.clone();
        tampered_r.d[0] += BigInt::one();
        assert!(tampered_r.decommit().is_none());

        let mut tampered_s = cmt;
        tampered_s.d[1] += BigInt::one();
        assert!(tampered_s.decommit().is_none());
    }

    #[test]
    fn test_fixed_randomness_layout() {
        let secret = BigInt::from(999u64);
        let r = BigInt::from(123u64);
        let cmt = HashCommitDecommit::new_with_randomness(r.clone(), &[&secret]);
        assert_eq!(cmt.d.len(), 2);
        assert_eq!(cmt.d[0], r);
        assert_eq!(cmt.d[1], secret);
        assert!(cmt.verify());
    }

    #[test]
    fn test_empty_secrets_commit_to_randomness_only() {
        let mut rng = thread_rng();
        let cmt = HashCommitDecommit::new(&mut rng, &[]);
        assert_eq!(cmt.d.len(), 1);
        assert!(cmt.verify());
        assert!(cmt.decommit().unwrap().is_empty());
    }

    #[test]
    fn test_decommitment_from_bytes() {
        let original = vec![BigInt::from(111u64), BigInt::from(222u64), BigInt::from(333u64)];
        let refs: Vec<&BigInt> = original.iter().collect();
        let marshalled = crate::common::slice::bigints_to_bytes(&refs);
        assert_eq!(HashCommitDecommit::decommitment_from_bytes(&marshalled), original);
    }
}
