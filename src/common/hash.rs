// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! SHA-512/256 over lists of byte strings and big integers.
//!
//! Inputs are length-prefixed and delimited so that the hash is safe against
//! concatenation ambiguity and length-extension.

use num_bigint::{BigInt, Sign};
use sha2::{Digest, Sha512_256};

const HASH_INPUT_DELIMITER: u8 = b'$';

fn prepare_hash_data(inputs: &[&[u8]]) -> Option<Vec<u8>> {
    if inputs.is_empty() {
        return None;
    }

    let bz_size: usize = inputs.iter().map(|bz| bz.len()).sum();
    let mut data = Vec::with_capacity(8 + bz_size + inputs.len() * 9);

    data.extend_from_slice(&(inputs.len() as u64).to_le_bytes());
    for bz in inputs {
        data.extend_from_slice(bz);
        data.push(HASH_INPUT_DELIMITER);
        data.extend_from_slice(&(bz.len() as u64).to_le_bytes());
    }
    Some(data)
}

/// SHA-512/256 over byte slices.
pub fn sha512_256(inputs: &[&[u8]]) -> Option<Vec<u8>> {
    let data = prepare_hash_data(inputs)?;
    Some(Sha512_256::digest(&data).to_vec())
}

/// SHA-512/256 over big integers (big-endian magnitude bytes).
pub fn sha512_256i(inputs: &[&BigInt]) -> Option<BigInt> {
    let input_bytes: Vec<Vec<u8>> = inputs.iter().map(|n| n.to_bytes_be().1).collect();
    let input_slices: Vec<&[u8]> = input_bytes.iter().map(|v| v.as_slice()).collect();
    let data = prepare_hash_data(&input_slices)?;
    let hash = Sha512_256::digest(&data);
    Some(BigInt::from_bytes_be(Sign::Plus, &hash))
}

/// Tagged SHA-512/256 over big integers. The tag hash is fed into the state
/// twice before the prepared data, domain-separating independent usages.
pub fn sha512_256i_tagged(tag: &[u8], inputs: &[&BigInt]) -> Option<BigInt> {
    if inputs.is_empty() {
        return None;
    }
    let tag_hash = Sha512_256::digest(tag);

    let mut state = Sha512_256::new();
    state.update(tag_hash);
    state.update(tag_hash);

    let input_bytes: Vec<Vec<u8>> = inputs.iter().map(|n| n.to_bytes_be().1).collect();
    let input_slices: Vec<&[u8]> = input_bytes.iter().map(|v| v.as_slice()).collect();
    let data = prepare_hash_data(&input_slices)?;
    state.update(&data);

    let hash = state.finalize();
    Some(BigInt::from_bytes_be(Sign::Plus, &hash))
}

/// SHA-512/256 of a single integer, without prefixes.
pub fn sha512_256i_one(input: &BigInt) -> BigInt {
    let hash = Sha512_256::digest(input.to_bytes_be().1);
    BigInt::from_bytes_be(Sign::Plus, &hash)
}
