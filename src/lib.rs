// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

pub mod common;
pub mod crypto;
pub mod protocols;
pub mod tss;

#[cfg(test)]
pub(crate) mod test_support;
