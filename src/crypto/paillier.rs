// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Paillier additively-homomorphic cryptosystem, plus the zero-knowledge
//! proof of knowledge of the secret key used in the final DKG round.

use std::time::Duration;

use log::{debug, warn};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::common::hash::sha512_256i;
use crate::common::int::ModInt;
use crate::common::random::get_random_positive_relatively_prime_int;
use crate::common::safe_prime::{get_random_safe_primes_concurrent, SafePrimeError};
use crate::crypto::ecpoint::ECPoint;

/// Number of iterations of the secret-key knowledge proof.
pub const PROOF_ITERS: usize = 13;

// The verifier rejects moduli divisible by any prime below this bound.
const VERIFY_PRIMES_UNTIL: u64 = 1000;

// Minimum bit length of |p - q| relative to the prime size; guards against
// Fermat factoring of N.
const PQ_BIT_LEN_DIFFERENCE: u64 = 3;

const SMALL_PRIMES: [u64; 168] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89,
    97, 101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191,
    193, 197, 199, 211, 223, 227, 229, 233, 239, 241, 251, 257, 263, 269, 271, 277, 281, 283, 293,
    307, 311, 313, 317, 331, 337, 347, 349, 353, 359, 367, 373, 379, 383, 389, 397, 401, 409, 419,
    421, 431, 433, 439, 443, 449, 457, 461, 463, 467, 479, 487, 491, 499, 503, 509, 521, 523, 541,
    547, 557, 563, 569, 571, 577, 587, 593, 599, 601, 607, 613, 617, 619, 631, 641, 643, 647, 653,
    659, 661, 673, 677, 683, 691, 701, 709, 719, 727, 733, 739, 743, 751, 757, 761, 769, 773, 787,
    797, 809, 811, 821, 823, 827, 829, 839, 853, 857, 859, 863, 877, 881, 883, 887, 907, 911, 919,
    929, 937, 941, 947, 953, 967, 971, 977, 983, 991, 997,
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaillierError {
    #[error("message is too large or negative")]
    MessageTooLong,
    #[error("message is malformed (gcd(c, N^2) != 1)")]
    MessageMalformed,
    #[error("key generation failed: {0}")]
    KeyGeneration(String),
    #[error("key generation timed out")]
    Timeout,
    #[error("proof verification failed: {0}")]
    ProofVerification(String),
    #[error("internal crypto error: {0}")]
    Internal(String),
}

impl From<SafePrimeError> for PaillierError {
    fn from(err: SafePrimeError) -> Self {
        match err {
            SafePrimeError::Timeout => PaillierError::Timeout,
            other => PaillierError::KeyGeneration(other.to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    pub n: BigInt,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateKey {
    pub public_key: PublicKey,
    /// Carmichael function lambda(N) = lcm(p-1, q-1).
    pub lambda_n: BigInt,
    /// Euler totient phi(N) = (p-1)(q-1).
    pub phi_n: BigInt,
    p: BigInt,
    q: BigInt,
}

/// The secret-key knowledge proof: PROOF_ITERS N-th roots of deterministic
/// challenges derived from (k, N, Y).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaillierProof {
    pub values: Vec<BigInt>,
}

/// Generates a Paillier key pair from two safe primes of `modulus_bit_len/2`
/// bits each. The search runs on `concurrency` workers and fails with
/// [`PaillierError::Timeout`] when the deadline expires.
pub fn generate_key_pair(
    modulus_bit_len: usize,
    concurrency: usize,
    timeout: Duration,
) -> Result<(PrivateKey, PublicKey), PaillierError> {
    if modulus_bit_len < 2048 {
        warn!(
            "paillier modulus of {} bits is below the recommended 2048",
            modulus_bit_len
        );
    }
    let prime_bits = modulus_bit_len / 2;

    let (p, q) = loop {
        let sgps = get_random_safe_primes_concurrent(prime_bits, 2, concurrency, timeout)?;
        let p = sgps[0].safe_prime().clone();
        let q = sgps[1].safe_prime().clone();
        if p == q {
            continue;
        }
        // |p - q| must be large to rule out easy factoring
        let diff = (&p - &q).abs();
        if diff.bits() < prime_bits as u64 - PQ_BIT_LEN_DIFFERENCE {
            debug!("regenerating paillier primes: |p-q| too small");
            continue;
        }
        let n = &p * &q;
        if n.bits() == modulus_bit_len as u64 {
            break (p, q);
        }
        debug!("regenerating paillier primes: N has {} bits", n.bits());
    };

    let n = &p * &q;
    let p_minus_1 = &p - BigInt::one();
    let q_minus_1 = &q - BigInt::one();
    let phi_n = &p_minus_1 * &q_minus_1;
    let lambda_n = &phi_n / p_minus_1.gcd(&q_minus_1);

    let public_key = PublicKey { n };
    let private_key = PrivateKey {
        public_key: public_key.clone(),
        lambda_n,
        phi_n,
        p,
        q,
    };
    Ok((private_key, public_key))
}

/// Builds a key pair from known safe primes (persisted pre-parameters).
pub fn key_pair_from_primes(p: BigInt, q: BigInt) -> (PrivateKey, PublicKey) {
    let n = &p * &q;
    let p_minus_1 = &p - BigInt::one();
    let q_minus_1 = &q - BigInt::one();
    let phi_n = &p_minus_1 * &q_minus_1;
    let lambda_n = &phi_n / p_minus_1.gcd(&q_minus_1);
    let public_key = PublicKey { n };
    let private_key = PrivateKey {
        public_key: public_key.clone(),
        lambda_n,
        phi_n,
        p,
        q,
    };
    (private_key, public_key)
}

impl PublicKey {
    pub fn n_square(&self) -> BigInt {
        &self.n * &self.n
    }

    /// N + 1, the plaintext-space generator.
    pub fn gamma(&self) -> BigInt {
        &self.n + BigInt::one()
    }

    /// The key serialized to integers for hashing: [N, N+1].
    pub fn as_ints(&self) -> Vec<BigInt> {
        vec![self.n.clone(), self.gamma()]
    }

    /// Encrypts `m` and returns (ciphertext, randomness).
    pub fn encrypt_and_return_randomness<R: CryptoRng + RngCore>(
        &self,
        rng: &mut R,
        m: &BigInt,
    ) -> Result<(BigInt, BigInt), PaillierError> {
        let x = get_random_positive_relatively_prime_int(rng, &self.n)
            .ok_or_else(|| PaillierError::Internal("failed to sample randomness".to_string()))?;
        let c = self.encrypt_with_chosen_randomness(m, &x)?;
        Ok((c, x))
    }

    /// c = (1+N)^m * x^N mod N^2 for the given randomness x.
    pub fn encrypt_with_chosen_randomness(
        &self,
        m: &BigInt,
        x: &BigInt,
    ) -> Result<BigInt, PaillierError> {
        if m.is_negative() || m >= &self.n {
            return Err(PaillierError::MessageTooLong);
        }
        let mod_n_square = ModInt::new(self.n_square());
        let gm = mod_n_square.exp(&self.gamma(), m);
        let xn = mod_n_square.exp(x, &self.n);
        Ok(mod_n_square.mul(&gm, &xn))
    }

    pub fn encrypt<R: CryptoRng + RngCore>(
        &self,
        rng: &mut R,
        m: &BigInt,
    ) -> Result<BigInt, PaillierError> {
        self.encrypt_and_return_randomness(rng, m).map(|(c, _)| c)
    }

    /// Homomorphic scalar multiply: Dec(c^m) = m * Dec(c).
    pub fn homo_mult(&self, m: &BigInt, c1: &BigInt) -> Result<BigInt, PaillierError> {
        if m.is_negative() || m >= &self.n {
            return Err(PaillierError::MessageTooLong);
        }
        let n_square = self.n_square();
        if c1.is_negative() || c1 >= &n_square {
            return Err(PaillierError::MessageTooLong);
        }
        let mod_n_square = ModInt::new(n_square);
        Ok(mod_n_square.exp(c1, m))
    }

    /// Homomorphic add: Dec(c1 * c2) = Dec(c1) + Dec(c2).
    pub fn homo_add(&self, c1: &BigInt, c2: &BigInt) -> Result<BigInt, PaillierError> {
        let n_square = self.n_square();
        if c1.is_negative() || c1 >= &n_square || c2.is_negative() || c2 >= &n_square {
            return Err(PaillierError::MessageTooLong);
        }
        let mod_n_square = ModInt::new(n_square);
        Ok(mod_n_square.mul(c1, c2))
    }
}

impl PrivateKey {
    pub fn p(&self) -> &BigInt {
        &self.p
    }

    pub fn q(&self) -> &BigInt {
        &self.q
    }

    pub fn decrypt(&self, c: &BigInt) -> Result<BigInt, PaillierError> {
        let n = &self.public_key.n;
        let n_square = self.public_key.n_square();
        if c.is_negative() || c >= &n_square {
            return Err(PaillierError::MessageTooLong);
        }
        if !c.gcd(&n_square).is_one() {
            return Err(PaillierError::MessageMalformed);
        }

        let mod_n_square = ModInt::new(n_square);
        let mod_n = ModInt::new(n.clone());

        // m = L(c^lambda) * L(g^lambda)^-1 mod N, with L(u) = (u-1)/N
        let lc = l_function(&mod_n_square.exp(c, &self.lambda_n), n)?;
        let lg = l_function(&mod_n_square.exp(&self.public_key.gamma(), &self.lambda_n), n)?;
        let lg_inv = mod_n
            .mod_inverse(&lg)
            .ok_or_else(|| PaillierError::Internal("L(g^lambda) not invertible".to_string()))?;
        Ok(mod_n.mul(&lc, &lg_inv))
    }

    /// Recovers the encryption randomness of a ciphertext:
    /// r = (c mod N)^(N^-1 mod phi(N)) mod N.
    pub fn recover_randomness(&self, c: &BigInt) -> Result<BigInt, PaillierError> {
        let n = &self.public_key.n;
        let m_inv = n
            .modinv(&self.phi_n)
            .ok_or_else(|| PaillierError::Internal("N^-1 mod phi(N) missing".to_string()))?;
        let mod_n = ModInt::new(n.clone());
        Ok(mod_n.exp(&mod_n.reduce(c), &m_inv))
    }

    /// Produces the key-knowledge proof bound to a party key `k` and the
    /// group public key `y`.
    pub fn proof(&self, k: &BigInt, y: &ECPoint) -> Result<PaillierProof, PaillierError> {
        let n = &self.public_key.n;
        let m_inv = n
            .modinv(&self.phi_n)
            .ok_or_else(|| PaillierError::Internal("N^-1 mod phi(N) missing".to_string()))?;

        let xs = generate_xs(PROOF_ITERS, k, n, y)?;
        let mod_n = ModInt::new(n.clone());
        let values = xs.iter().map(|x| mod_n.exp(x, &m_inv)).collect();
        Ok(PaillierProof { values })
    }
}

impl PaillierProof {
    pub fn verify(&self, pk_n: &BigInt, k: &BigInt, y: &ECPoint) -> Result<bool, PaillierError> {
        if self.values.len() != PROOF_ITERS {
            return Err(PaillierError::ProofVerification(format!(
                "invalid proof length: expected {}, got {}",
                PROOF_ITERS,
                self.values.len()
            )));
        }
        if !pk_n.is_positive() {
            return Ok(false);
        }

        for sp in SMALL_PRIMES.iter().take_while(|&&p| p < VERIFY_PRIMES_UNTIL) {
            if (pk_n % BigInt::from(*sp)).is_zero() {
                debug!("paillier proof: N divisible by small prime {}", sp);
                return Ok(false);
            }
        }

        let xs = generate_xs(PROOF_ITERS, k, pk_n, y)?;
        let mod_n = ModInt::new(pk_n.clone());
        for (value, x) in self.values.iter().zip(&xs) {
            if mod_n.exp(value, pk_n) != mod_n.reduce(x) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// L(u) = (u - 1) / N; u must be ≡ 1 (mod N).
fn l_function(u: &BigInt, n: &BigInt) -> Result<BigInt, PaillierError> {
    let u_minus_1 = u - BigInt::one();
    if !(&u_minus_1 % n).is_zero() {
        return Err(PaillierError::Internal(
            "L-function input not congruent to 1 mod N".to_string(),
        ));
    }
    Ok(u_minus_1 / n)
}

/// Deterministic challenges x_i = H(k, N, N+1, Yx, Yy, i).
fn generate_xs(
    m: usize,
    k: &BigInt,
    n: &BigInt,
    y: &ECPoint,
) -> Result<Vec<BigInt>, PaillierError> {
    let g = n + BigInt::one();
    let (yx, yy) = y.coords();
    let mut xs = Vec::with_capacity(m);
    for i in 0..m {
        let i_big = BigInt::from(i);
        let x = sha512_256i(&[k, n, &g, &yx, &yy, &i_big])
            .ok_or_else(|| PaillierError::Internal("challenge hash failed".to_string()))?;
        xs.push(x);
    }
    Ok(xs)
}
