// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Finalization: under abort type 7, identify culprits from the revealed
//! mu material. Otherwise assemble (r, s, v), canonicalize s, self-verify
//! and deliver the signature. The one-round scratch is destroyed on every
//! exit path.

use num_bigint::BigInt;
use num_integer::Integer;

use crate::common::int::ModInt;
use crate::crypto::ecpoint::ECPoint;
use crate::crypto::zkp::ecddh::EcddhStatement;
use crate::tss::error::{ErrorKind, TssError};
use crate::tss::party_id::PartyID;

use super::local_party::LocalParty;
use super::messages::{AbortType7Bundle, Round6Payload, Round7Payload};
use super::types::{verify_ecdsa, SignatureData};

impl LocalParty {
    pub(super) fn finalize(&mut self) -> Result<(), TssError> {
        let any_abort = self
            .temp
            .sr7
            .iter()
            .any(|slot| matches!(slot, Some(Round7Payload::Abort(_))));
        if any_abort && !self.temp.abort7 {
            // see round 7: an abort nobody else sees marks its sender
            let culprits: Vec<PartyID> = (0..self.params.party_count())
                .filter(|&j| matches!(self.temp.sr7[j], Some(Round7Payload::Abort(_))))
                .map(|j| self.params.parties().party(j).as_ref().clone())
                .collect();
            self.temp.zeroize_secrets();
            return Err(self.error(ErrorKind::Aborted { abort_type: 7 }, 8, culprits));
        }
        if self.temp.abort7 {
            let err = self.identify_abort_type7();
            self.temp.zeroize_secrets();
            return Err(err);
        }

        let curve = self.params.ec();
        let q = curve.order();
        let mod_q = ModInt::new(q.clone());
        let n = self.params.party_count();

        // s = sum_j s_j
        let mut s = BigInt::from(0u8);
        for j in 0..n {
            let share = match &self.temp.sr7[j] {
                Some(Round7Payload::Success(m)) => m.s_share.clone(),
                _ => {
                    return Err(self.error(
                        ErrorKind::Internal("round 7 store incomplete".into()),
                        8,
                        vec![],
                    ))
                }
            };
            s = mod_q.add(&s, &share);
        }

        let big_r = self
            .temp
            .big_r
            .clone()
            .ok_or_else(|| self.error(ErrorKind::Internal("R missing".into()), 8, vec![]))?;
        let r = self.temp.r_x.clone();

        // recovery byte: overflow bit of R.x, parity bit of R.y; the parity
        // flips when s is negated into the lower half
        let mut recovery_id: u8 = 0;
        if big_r.x() >= q {
            recovery_id |= 2;
        }
        if big_r.y_is_odd() {
            recovery_id |= 1;
        }
        let half_q = &q >> 1;
        if s > half_q {
            s = mod_q.sub(&BigInt::from(0u8), &s);
            recovery_id ^= 1;
        }

        // the assembled signature must verify under Y before release
        if !verify_ecdsa(&self.temp.m, &r, &s, self.ecdsa_pub()) {
            self.temp.zeroize_secrets();
            return Err(self.error(ErrorKind::SignatureInvalid, 8, vec![]));
        }

        let signature = SignatureData { r, s, recovery_id };
        self.temp.zeroize_secrets();
        self.end.send(signature).map_err(|e| {
            self.error(ErrorKind::Internal(format!("end channel closed: {}", e)), 8, vec![])
        })
    }

    /// Type-7 identification: re-encryption checks on the revealed k and mu
    /// values, then the ECDDH proof of each peer's sigma against its S_j
    /// reconstructed in the exponent.
    fn identify_abort_type7(&mut self) -> TssError {
        let curve = self.params.ec();
        let q = curve.order();
        let mod_q = ModInt::new(q);
        let i = self.params.party_index();
        let n = self.params.party_count();
        let parties = self.params.parties().clone();
        let session = self.temp.session.clone();

        // collect every bundle; non-cooperation is attributable
        let mut bundles: Vec<Option<AbortType7Bundle>> = vec![None; n];
        let mut culprits: Vec<PartyID> = Vec::new();
        for j in 0..n {
            match &self.temp.sr7[j] {
                Some(Round7Payload::Abort(b)) if b.mus.len() == n && b.mu_randomness.len() == n => {
                    bundles[j] = Some(b.clone());
                }
                _ => {
                    if j != i {
                        culprits.push(parties.party(j).as_ref().clone());
                    }
                }
            }
        }

        let big_r = match self.temp.big_r.clone() {
            Some(r) => r,
            None => return self.error(ErrorKind::Aborted { abort_type: 7 }, 8, culprits),
        };

        for j in 0..n {
            if j == i {
                continue;
            }
            let party_j = parties.party(j).as_ref().clone();
            let bundle = match &bundles[j] {
                Some(b) => b.clone(),
                None => continue, // already attributed above
            };

            // revealed k_j re-encrypts to the round-1 ciphertext
            let c_a_j = match self.temp.sr1_p2p[j].as_ref() {
                Some(m) => m.c_a.clone(),
                None => {
                    culprits.push(party_j);
                    continue;
                }
            };
            let reencrypted = self
                .paillier_pk(j)
                .encrypt_with_chosen_randomness(&bundle.k, &bundle.k_randomness);
            if reencrypted.as_ref() != Ok(&c_a_j) {
                culprits.push(party_j);
                continue;
            }

            // the mu value j claims from our pair re-encrypts to the
            // ciphertext we actually sent
            if let (Some(mu), Some(rand), Some(c_w_sent)) = (
                bundle.mus[i].as_ref(),
                bundle.mu_randomness[i].as_ref(),
                self.temp.c_b_w_out[j].as_ref(),
            ) {
                let reencrypted = self
                    .paillier_pk(j)
                    .encrypt_with_chosen_randomness(&mu.mod_floor(&self.paillier_pk(j).n), rand);
                if reencrypted.as_ref() != Ok(c_w_sent) {
                    culprits.push(party_j);
                    continue;
                }
            } else {
                culprits.push(party_j);
                continue;
            }

            // reconstruct sigma_j in the exponent:
            // Q_j = k_j*W_j + sum_{l != j} [ mu_jl*G + (k_l*W_j - mu_lj*G) ]
            let w_j = self.temp.big_w_j[j].clone();
            let mut q_j = w_j.scalar_mul(&bundle.k);
            let mut reconstruction_ok = true;
            for l in 0..n {
                if l == j {
                    continue;
                }
                let mu_jl = match bundle.mus[l].as_ref() {
                    Some(v) => mod_q.reduce(v),
                    None => {
                        reconstruction_ok = false;
                        break;
                    }
                };
                let k_l = if l == i {
                    self.temp.k_i.expose()
                } else {
                    match bundles[l].as_ref() {
                        Some(b) => b.k.clone(),
                        None => {
                            reconstruction_ok = false;
                            break;
                        }
                    }
                };
                let mu_lj = if l == i {
                    match self.temp.mu_plain[j].as_ref() {
                        Some(v) => mod_q.reduce(&v.expose()),
                        None => {
                            reconstruction_ok = false;
                            break;
                        }
                    }
                } else {
                    match bundles[l].as_ref().and_then(|b| b.mus[j].as_ref()) {
                        Some(v) => mod_q.reduce(v),
                        None => {
                            reconstruction_ok = false;
                            break;
                        }
                    }
                };

                // nu_jl*G = k_l*W_j - mu_lj*G
                let nu_point = match w_j
                    .scalar_mul(&k_l)
                    .sub(&ECPoint::scalar_base_mult(curve, &mu_lj))
                {
                    Ok(p) => p,
                    Err(_) => {
                        reconstruction_ok = false;
                        break;
                    }
                };
                q_j = match q_j
                    .add(&ECPoint::scalar_base_mult(curve, &mu_jl))
                    .and_then(|p| p.add(&nu_point))
                {
                    Ok(p) => p,
                    Err(_) => {
                        reconstruction_ok = false;
                        break;
                    }
                };
            }
            if !reconstruction_ok {
                continue; // missing material was attributed to its owner
            }

            // the ECDDH proof must tie Q_j to the broadcast S_j over (G, R)
            let big_s_j = match &self.temp.sr6[j] {
                Some(Round6Payload::Success(m)) => m.big_s.clone(),
                _ => {
                    culprits.push(party_j);
                    continue;
                }
            };
            let statement = EcddhStatement {
                g1: ECPoint::generator(curve),
                h1: q_j,
                g2: big_r.clone(),
                h2: big_s_j,
            };
            if !bundle.ecddh_proof.verify(&session, &statement) {
                culprits.push(party_j);
            }
        }

        culprits.dedup();
        self.error(ErrorKind::Aborted { abort_type: 7 }, 8, culprits)
    }
}
