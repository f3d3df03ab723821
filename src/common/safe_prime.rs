// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Concurrent Sophie Germain / safe prime generation.
//!
//! A safe prime p = 2q + 1 is searched by sieving random candidates q against
//! a table of small primes (for both q and 2q+1) before running probabilistic
//! primality tests. The search fans out over a fixed number of worker threads
//! and is bounded by a deadline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::debug;
use num_bigint::{BigInt, BigUint, RandBigInt};
use num_integer::Integer;
use num_prime::nt_funcs;
use num_traits::{One, ToPrimitive};
use once_cell::sync::Lazy;
use rand::thread_rng;
use thiserror::Error;

const MIN_BIT_LEN: usize = 6;

// Sieve table: candidates divisible by any of these (or whose 2q+1 is) are
// rejected before the expensive primality test.
static SMALL_PRIMES: [u64; 15] = [3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53];

static SMALL_PRIMES_PRODUCT: Lazy<BigUint> = Lazy::new(|| {
    SMALL_PRIMES
        .iter()
        .fold(BigUint::one(), |acc, &p| acc * BigUint::from(p))
});

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SafePrimeError {
    #[error("safe prime size must be at least {MIN_BIT_LEN} bits, got {0}")]
    BitLenTooSmall(usize),
    #[error("num_primes must be greater than 0, got {0}")]
    NumPrimesInvalid(usize),
    #[error("concurrency must be greater than 0")]
    ConcurrencyInvalid,
    #[error("generator work cancelled (deadline exceeded)")]
    Timeout,
}

/// A Sophie Germain prime q together with its safe prime p = 2q + 1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GermainSafePrime {
    q: BigInt,
    p: BigInt,
}

impl GermainSafePrime {
    /// The Sophie Germain prime q.
    pub fn prime(&self) -> &BigInt {
        &self.q
    }

    /// The safe prime p = 2q + 1.
    pub fn safe_prime(&self) -> &BigInt {
        &self.p
    }

    /// Re-checks primality of both halves and the p = 2q + 1 relation.
    pub fn validate(&self) -> bool {
        self.p == &self.q * 2 + BigInt::one()
            && probably_prime(&self.q)
            && probably_prime(&self.p)
    }
}

fn probably_prime(n: &BigInt) -> bool {
    match n.to_biguint() {
        Some(mag) => nt_funcs::is_prime(&mag, None).probably(),
        None => false,
    }
}

/// Cheap compositeness filter for q and 2q + 1 via the small-prime table.
fn passes_sieve(q: &BigUint) -> bool {
    let residue = q.mod_floor(&SMALL_PRIMES_PRODUCT);
    // The residue fits in u128 comfortably for this table.
    let r = match residue.to_u128() {
        Some(r) => r,
        None => return true,
    };
    for &p in SMALL_PRIMES.iter() {
        let p = p as u128;
        let rq = r % p;
        if rq == 0 {
            return false;
        }
        // 2q + 1 ≡ 0 (mod p)?
        if (2 * rq + 1) % p == 0 {
            return false;
        }
    }
    true
}

/// One random candidate Sophie Germain prime of `bit_len - 1` bits whose safe
/// prime has exactly `bit_len` bits. Returns `None` when the stop flag is
/// raised before a hit.
fn search_one(bit_len: usize, stop: &AtomicBool) -> Option<GermainSafePrime> {
    let q_bits = (bit_len - 1) as u64;
    let mut rng = thread_rng();
    loop {
        if stop.load(Ordering::Relaxed) {
            return None;
        }
        let mut q = rng.gen_biguint(q_bits);
        // Top two bits set: products of two such safe primes keep full width.
        q.set_bit(q_bits - 1, true);
        q.set_bit(q_bits - 2, true);
        q.set_bit(0, true);

        if !passes_sieve(&q) {
            continue;
        }
        if !nt_funcs::is_prime(&q, None).probably() {
            continue;
        }
        let p = &q * 2u8 + BigUint::one();
        if p.bits() != bit_len as u64 {
            continue;
        }
        if !nt_funcs::is_prime(&p, None).probably() {
            continue;
        }
        return Some(GermainSafePrime {
            q: BigInt::from(q),
            p: BigInt::from(p),
        });
    }
}

/// Generates `num_primes` distinct safe primes of exactly `bit_len` bits,
/// searching on `concurrency` worker threads, failing with
/// [`SafePrimeError::Timeout`] once the deadline expires.
pub fn get_random_safe_primes_concurrent(
    bit_len: usize,
    num_primes: usize,
    concurrency: usize,
    timeout: Duration,
) -> Result<Vec<GermainSafePrime>, SafePrimeError> {
    if bit_len < MIN_BIT_LEN {
        return Err(SafePrimeError::BitLenTooSmall(bit_len));
    }
    if num_primes == 0 {
        return Err(SafePrimeError::NumPrimesInvalid(num_primes));
    }
    if concurrency == 0 {
        return Err(SafePrimeError::ConcurrencyInvalid);
    }

    let deadline = Instant::now() + timeout;
    let stop = Arc::new(AtomicBool::new(false));
    let (tx, rx) = mpsc::channel::<GermainSafePrime>();

    for _ in 0..concurrency {
        let stop = Arc::clone(&stop);
        let tx = tx.clone();
        thread::spawn(move || {
            while !stop.load(Ordering::Relaxed) {
                if let Some(sgp) = search_one(bit_len, &stop) {
                    if tx.send(sgp).is_err() {
                        return;
                    }
                }
            }
        });
    }
    drop(tx);

    let mut found: Vec<GermainSafePrime> = Vec::with_capacity(num_primes);
    while found.len() < num_primes {
        let remaining = match deadline.checked_duration_since(Instant::now()) {
            Some(d) if !d.is_zero() => d,
            _ => {
                stop.store(true, Ordering::Relaxed);
                return Err(SafePrimeError::Timeout);
            }
        };
        match rx.recv_timeout(remaining) {
            Ok(sgp) => {
                if found.iter().all(|f| f.p != sgp.p) {
                    debug!("safe prime found ({} bits)", bit_len);
                    found.push(sgp);
                }
            }
            Err(_) => {
                stop.store(true, Ordering::Relaxed);
                return Err(SafePrimeError::Timeout);
            }
        }
    }
    stop.store(true, Ordering::Relaxed);
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_small_safe_primes() {
        let primes =
            get_random_safe_primes_concurrent(64, 2, 2, Duration::from_secs(60)).unwrap();
        assert_eq!(primes.len(), 2);
        for sgp in &primes {
            assert!(sgp.validate());
            assert_eq!(sgp.safe_prime().bits(), 64);
            assert_eq!(sgp.safe_prime(), &(sgp.prime() * 2 + BigInt::one()));
        }
        assert_ne!(primes[0], primes[1]);
    }

    #[test]
    fn test_deadline_returns_timeout() {
        let started = Instant::now();
        let res = get_random_safe_primes_concurrent(1024, 2, 1, Duration::from_millis(5));
        assert_eq!(res.unwrap_err(), SafePrimeError::Timeout);
        assert!(started.elapsed() < Duration::from_millis(500));
    }

    #[test]
    fn test_parameter_validation() {
        let t = Duration::from_secs(1);
        assert!(matches!(
            get_random_safe_primes_concurrent(4, 1, 1, t),
            Err(SafePrimeError::BitLenTooSmall(4))
        ));
        assert!(matches!(
            get_random_safe_primes_concurrent(64, 0, 1, t),
            Err(SafePrimeError::NumPrimesInvalid(0))
        ));
        assert!(matches!(
            get_random_safe_primes_concurrent(64, 1, 0, t),
            Err(SafePrimeError::ConcurrencyInvalid)
        ));
    }
}
