// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

pub mod hash;
pub mod hash_utils;
pub mod int;
pub mod random;
pub mod safe_prime;
pub mod secret;
pub mod slice;
