// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Signing state: the produced signature, per-session scratch, and the
//! cohort preparation that turns additive Shamir shares into multiplicative
//! signing shares.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::common::int::ModInt;
use crate::common::secret::SecretInt;
use crate::crypto::commitments::HashDeCommitment;
use crate::crypto::ecpoint::ECPoint;
use crate::crypto::vss::lagrange_coefficient;
use crate::tss::curve::CurveId;

use super::messages::{
    Round6Payload, Round7Payload, SignRound1Bcast, SignRound1P2P, SignRound2P2P, SignRound3Bcast,
    SignRound4Bcast, SignRound5Bcast, SigningMessage,
};
use crate::tss::message::ParsedMessage;
use crate::tss::round::PeerBitset;

/// The finished signature: r, canonical low-half s, and the recovery byte.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureData {
    pub r: BigInt,
    pub s: BigInt,
    pub recovery_id: u8,
}

/// Computes this party's Lagrange-adjusted multiplicative share
/// w_i = lambda_i(0) * x_i and the corresponding {W_j = lambda_j(0) * X_j}.
/// The cohort is given by `ks` (sorted share ids); sum of all w_j equals the
/// group secret key.
pub fn prepare_for_signing(
    curve: CurveId,
    own_index: usize,
    ks: &[BigInt],
    xi: &BigInt,
    big_x_j: &[ECPoint],
) -> Result<(BigInt, Vec<ECPoint>), String> {
    if ks.len() != big_x_j.len() {
        return Err("ks and big_x_j length mismatch".to_string());
    }
    if own_index >= ks.len() {
        return Err("own index out of range".to_string());
    }
    let q = curve.order();
    let mod_q = ModInt::new(q.clone());

    let own_lambda = lagrange_coefficient(&q, ks, own_index).map_err(|e| e.to_string())?;
    let w_i = mod_q.mul(&own_lambda, xi);

    let mut big_w_j = Vec::with_capacity(ks.len());
    for (j, x_j) in big_x_j.iter().enumerate() {
        let lambda_j = lagrange_coefficient(&q, ks, j).map_err(|e| e.to_string())?;
        big_w_j.push(x_j.scalar_mul(&lambda_j));
    }
    Ok((w_i, big_w_j))
}

/// Recovers the public key from a signature and message hash using the
/// recovery byte: bit 0 carries R.y's parity, bit 1 the R.x >= q overflow.
pub fn recover_public_key(
    curve: CurveId,
    m: &BigInt,
    sig: &SignatureData,
) -> Result<ECPoint, String> {
    let q = curve.order();
    if sig.r.is_zero() || sig.s.is_zero() || sig.r >= q || sig.s >= q {
        return Err("r and s must be in (0, q)".to_string());
    }
    if sig.recovery_id > 3 {
        return Err("recovery id out of range".to_string());
    }

    let mut x = sig.r.clone();
    if sig.recovery_id & 2 != 0 {
        x += &q;
    }
    let mut encoded = Vec::with_capacity(curve.field_bytes_len() + 1);
    encoded.push(if sig.recovery_id & 1 == 1 { 0x03 } else { 0x02 });
    encoded.extend_from_slice(&crate::common::slice::pad_to_length_bytes(
        &x.to_bytes_be().1,
        curve.field_bytes_len(),
    ));
    let big_r = ECPoint::from_bytes(curve, &encoded)
        .map_err(|e| format!("R does not decompress: {}", e))?;

    // Q = r^-1 * (s*R - m*G)
    let mod_q = ModInt::new(q);
    let r_inv = mod_q
        .mod_inverse(&sig.r)
        .ok_or_else(|| "r not invertible".to_string())?;
    let point = big_r
        .scalar_mul(&sig.s)
        .sub(&ECPoint::scalar_base_mult(curve, &mod_q.reduce(m)))
        .map_err(|e| e.to_string())?
        .scalar_mul(&r_inv);
    if !point.validate_basic() {
        return Err("recovered key is the identity".to_string());
    }
    Ok(point)
}

/// Plain ECDSA verification of (r, s) over a message hash, used as the
/// final self-check before the signature is released.
pub fn verify_ecdsa(m: &BigInt, r: &BigInt, s: &BigInt, y: &ECPoint) -> bool {
    let curve = y.curve();
    let q = curve.order();
    if r.is_zero() || s.is_zero() || r >= &q || s >= &q {
        return false;
    }
    let mod_q = ModInt::new(q.clone());
    let s_inv = match mod_q.mod_inverse(s) {
        Some(inv) => inv,
        None => return false,
    };
    let u1 = mod_q.mul(&mod_q.reduce(m), &s_inv);
    let u2 = mod_q.mul(r, &s_inv);
    let point = match ECPoint::scalar_base_mult(curve, &u1).add(&y.scalar_mul(&u2)) {
        Ok(p) => p,
        Err(_) => return false,
    };
    if point.is_identity() {
        return false;
    }
    point.x().mod_floor(&q) == *r
}

/// Per-session scratch. Secret fields live in zeroizing buffers and are
/// wiped before the session returns, on success and on abort alike.
#[derive(Debug)]
pub(super) struct LocalTempData {
    pub session: Vec<u8>,
    /// The message hash, reduced mod q.
    pub m: BigInt,

    // multiplicative shares for this cohort
    pub w_i: SecretInt,
    pub big_w_j: Vec<ECPoint>,

    // round-1 secrets
    pub k_i: SecretInt,
    pub gamma_i: SecretInt,
    pub big_gamma_i: Option<ECPoint>,
    pub decommit_gamma: Option<HashDeCommitment>,
    pub c_a: BigInt,
    pub c_a_randomness: SecretInt,

    // Bob-side additive shares, per Alice peer
    pub beta_gamma: Vec<Option<SecretInt>>,
    pub nu_w: Vec<Option<SecretInt>>,
    pub c_b_gamma_out: Vec<Option<BigInt>>,
    pub c_b_w_out: Vec<Option<BigInt>>,

    // Alice-side additive shares, per Bob peer
    pub alpha_gamma: Vec<Option<SecretInt>>,
    pub mu_w: Vec<Option<SecretInt>>,
    pub mu_plain: Vec<Option<SecretInt>>,

    // round-3 onward
    pub delta_i: BigInt,
    pub sigma_i: SecretInt,
    pub l_i: SecretInt,
    pub t_i: Option<ECPoint>,
    pub delta: BigInt,
    pub big_gamma_j: Vec<Option<ECPoint>>,
    pub big_r: Option<ECPoint>,
    pub r_x: BigInt,
    pub big_s_i: Option<ECPoint>,
    pub s_i: BigInt,

    pub abort5: bool,
    pub abort7: bool,

    // message stores, indexed by sender, with a received-peer bitset per
    // round slot
    pub sr1_p2p: Vec<Option<SignRound1P2P>>,
    pub sr1_bcast: Vec<Option<SignRound1Bcast>>,
    pub sr2: Vec<Option<SignRound2P2P>>,
    pub sr3: Vec<Option<SignRound3Bcast>>,
    pub sr4: Vec<Option<SignRound4Bcast>>,
    pub sr5: Vec<Option<SignRound5Bcast>>,
    pub sr6: Vec<Option<Round6Payload>>,
    pub sr7: Vec<Option<Round7Payload>>,
    pub sr1_p2p_ok: PeerBitset,
    pub sr1_bcast_ok: PeerBitset,
    pub sr2_ok: PeerBitset,
    pub sr3_ok: PeerBitset,
    pub sr4_ok: PeerBitset,
    pub sr5_ok: PeerBitset,
    pub sr6_ok: PeerBitset,
    pub sr7_ok: PeerBitset,

    secrets_cleared: bool,
}

impl LocalTempData {
    pub fn new(party_count: usize, m: BigInt) -> Self {
        Self {
            session: Vec::new(),
            m,
            w_i: SecretInt::default(),
            big_w_j: Vec::new(),
            k_i: SecretInt::default(),
            gamma_i: SecretInt::default(),
            big_gamma_i: None,
            decommit_gamma: None,
            c_a: BigInt::zero(),
            c_a_randomness: SecretInt::default(),
            beta_gamma: vec![None; party_count],
            nu_w: vec![None; party_count],
            c_b_gamma_out: vec![None; party_count],
            c_b_w_out: vec![None; party_count],
            alpha_gamma: vec![None; party_count],
            mu_w: vec![None; party_count],
            mu_plain: vec![None; party_count],
            delta_i: BigInt::zero(),
            sigma_i: SecretInt::default(),
            l_i: SecretInt::default(),
            t_i: None,
            delta: BigInt::zero(),
            big_gamma_j: vec![None; party_count],
            big_r: None,
            r_x: BigInt::zero(),
            big_s_i: None,
            s_i: BigInt::zero(),
            abort5: false,
            abort7: false,
            sr1_p2p: vec![None; party_count],
            sr1_bcast: vec![None; party_count],
            sr2: vec![None; party_count],
            sr3: vec![None; party_count],
            sr4: vec![None; party_count],
            sr5: vec![None; party_count],
            sr6: vec![None; party_count],
            sr7: vec![None; party_count],
            sr1_p2p_ok: PeerBitset::new(party_count),
            sr1_bcast_ok: PeerBitset::new(party_count),
            sr2_ok: PeerBitset::new(party_count),
            sr3_ok: PeerBitset::new(party_count),
            sr4_ok: PeerBitset::new(party_count),
            sr5_ok: PeerBitset::new(party_count),
            sr6_ok: PeerBitset::new(party_count),
            sr7_ok: PeerBitset::new(party_count),
            secrets_cleared: false,
        }
    }

    pub fn store(&mut self, from: usize, msg: &ParsedMessage<SigningMessage>) {
        match &msg.content {
            SigningMessage::Round1P2P(m) => {
                self.sr1_p2p[from] = Some(m.clone());
                self.sr1_p2p_ok.set(from);
            }
            SigningMessage::Round1Bcast(m) => {
                self.sr1_bcast[from] = Some(m.clone());
                self.sr1_bcast_ok.set(from);
            }
            SigningMessage::Round2P2P(m) => {
                self.sr2[from] = Some(m.clone());
                self.sr2_ok.set(from);
            }
            SigningMessage::Round3Bcast(m) => {
                self.sr3[from] = Some(m.clone());
                self.sr3_ok.set(from);
            }
            SigningMessage::Round4Bcast(m) => {
                self.sr4[from] = Some(m.clone());
                self.sr4_ok.set(from);
            }
            SigningMessage::Round5Bcast(m) => {
                self.sr5[from] = Some(m.clone());
                self.sr5_ok.set(from);
            }
            SigningMessage::Round6Success(m) => {
                self.sr6[from] = Some(Round6Payload::Success(m.clone()));
                self.sr6_ok.set(from);
            }
            SigningMessage::Round6Abort(m) => {
                self.sr6[from] = Some(Round6Payload::Abort(m.clone()));
                self.sr6_ok.set(from);
            }
            SigningMessage::Round7Success(m) => {
                self.sr7[from] = Some(Round7Payload::Success(m.clone()));
                self.sr7_ok.set(from);
            }
            SigningMessage::Round7Abort(m) => {
                self.sr7[from] = Some(Round7Payload::Abort(m.clone()));
                self.sr7_ok.set(from);
            }
        }
    }

    /// Wipes every secret temporary in place. Called on every exit path of
    /// the session.
    pub fn zeroize_secrets(&mut self) {
        self.w_i.zeroize();
        self.k_i.zeroize();
        self.gamma_i.zeroize();
        self.l_i.zeroize();
        self.sigma_i.zeroize();
        self.c_a_randomness.zeroize();
        self.delta_i = BigInt::zero();
        self.s_i = BigInt::zero();
        for slot in self
            .beta_gamma
            .iter_mut()
            .chain(self.nu_w.iter_mut())
            .chain(self.alpha_gamma.iter_mut())
            .chain(self.mu_w.iter_mut())
            .chain(self.mu_plain.iter_mut())
        {
            if let Some(v) = slot {
                v.zeroize();
            }
        }
        self.decommit_gamma = None;
        self.secrets_cleared = true;
    }

    pub fn secrets_cleared(&self) -> bool {
        self.secrets_cleared
            && self.k_i.is_zero()
            && self.w_i.is_zero()
            && self.gamma_i.is_zero()
    }
}
