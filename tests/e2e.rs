// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! End-to-end distributed keygen and signing over an in-memory router,
//! including culprit-attribution and identifiable-abort scenarios.

use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;

use num_bigint::BigInt;
use num_traits::{One, Zero};
use once_cell::sync::Lazy;
use serde::Deserialize;

use threshold_ecdsa::common::hash::sha512_256i;
use threshold_ecdsa::common::int::ModInt;
use threshold_ecdsa::crypto::ecpoint::ECPoint;
use threshold_ecdsa::crypto::paillier::key_pair_from_primes;
use threshold_ecdsa::crypto::vss::lagrange_coefficient;
use threshold_ecdsa::protocols::keygen;
use threshold_ecdsa::protocols::signing;
use threshold_ecdsa::protocols::signing::types::{recover_public_key, verify_ecdsa};
use threshold_ecdsa::tss::{
    CurveId, ErrorKind, MessageContent, Parameters, ParsedMessage, Party, PartyID, PeerContext,
    TssError,
};

const CURVE: CurveId = CurveId::Secp256k1;
const N_PARTIES: usize = 3;
const THRESHOLD: usize = 1; // 2-of-3

// --- fixtures -----------------------------------------------------------

#[derive(Deserialize)]
struct RawPreParams {
    paillier_p: String,
    paillier_q: String,
    ntilde: String,
    ntilde_p: String,
    ntilde_q: String,
    h1: String,
    h2: String,
    alpha: String,
    beta: String,
}

fn hex(s: &str) -> BigInt {
    BigInt::parse_bytes(s.as_bytes(), 16).unwrap()
}

fn fixture_pre_params() -> Vec<keygen::LocalPreParams> {
    let raw: Vec<RawPreParams> =
        serde_json::from_str(include_str!("../testdata/preparams.json")).unwrap();
    raw.iter()
        .map(|r| {
            let (sk, _) = key_pair_from_primes(hex(&r.paillier_p), hex(&r.paillier_q));
            keygen::LocalPreParams {
                paillier_sk: sk,
                n_tilde: hex(&r.ntilde),
                h1: hex(&r.h1),
                h2: hex(&r.h2),
                p: Some(hex(&r.ntilde_p)),
                q: Some(hex(&r.ntilde_q)),
                alpha: Some(hex(&r.alpha)),
                beta: Some(hex(&r.beta)),
            }
        })
        .collect()
}

// --- in-memory router ---------------------------------------------------

fn make_parameters(n: usize, t: usize) -> Vec<Arc<Parameters>> {
    let mut ids: Vec<PartyID> = (1..=n)
        .map(|i| PartyID::new(format!("party-{}", i), format!("P[{}]", i), BigInt::from(i)))
        .collect();
    threshold_ecdsa::tss::sort_party_ids(&mut ids);
    let ctx = Arc::new(PeerContext::new(ids.clone()));
    ids.iter()
        .map(|id| {
            Arc::new(Parameters::new(CURVE, ctx.clone(), Arc::new(id.clone()), t).unwrap())
        })
        .collect()
}

/// Pumps messages between parties until every outbox is drained. A tamper
/// hook may rewrite messages in flight; errors are collected per victim.
fn run_rounds<P: Party>(
    parties: &mut [P],
    outs: &[Receiver<ParsedMessage<P::Content>>],
    mut tamper: impl FnMut(&mut ParsedMessage<P::Content>),
) -> Vec<(usize, TssError)> {
    let mut errors = Vec::new();
    let mut queue: VecDeque<ParsedMessage<P::Content>> = VecDeque::new();
    loop {
        for out in outs {
            while let Ok(mut msg) = out.try_recv() {
                tamper(&mut msg);
                queue.push_back(msg);
            }
        }
        let msg = match queue.pop_front() {
            Some(msg) => msg,
            None => break,
        };
        let recipients: Vec<usize> = match (&msg.to, msg.is_broadcast) {
            (None, true) => (0..parties.len())
                .filter(|&j| j != msg.from.index as usize)
                .collect(),
            (Some(to), false) => to.iter().map(|p| p.index as usize).collect(),
            _ => panic!("malformed routing"),
        };
        for j in recipients {
            if parties[j].is_finished() {
                continue;
            }
            if let Err(err) = parties[j].update(msg.clone()) {
                errors.push((j, err));
            }
        }
    }
    errors
}

// --- keygen harness -----------------------------------------------------

#[derive(Debug)]
struct KeygenOutcome {
    saves: Vec<keygen::LocalPartySaveData>,
    params: Vec<Arc<Parameters>>,
}

fn run_keygen(
    tamper: impl FnMut(&mut ParsedMessage<keygen::KeygenMessage>),
) -> Result<KeygenOutcome, Vec<(usize, TssError)>> {
    let params = make_parameters(N_PARTIES, THRESHOLD);
    let pre_params = fixture_pre_params();

    let mut parties = Vec::new();
    let mut outs = Vec::new();
    let mut ends = Vec::new();
    for i in 0..N_PARTIES {
        let (out_tx, out_rx) = channel();
        let (end_tx, end_rx) = channel();
        let party = keygen::LocalParty::new(
            params[i].clone(),
            Some(pre_params[i].clone()),
            out_tx,
            end_tx,
        )
        .unwrap();
        parties.push(party);
        outs.push(out_rx);
        ends.push(end_rx);
    }

    for party in parties.iter_mut() {
        party.start().unwrap();
    }
    let errors = run_rounds(&mut parties, &outs, tamper);
    if !errors.is_empty() {
        return Err(errors);
    }

    let saves: Vec<_> = ends.iter().map(|rx| rx.try_recv().unwrap()).collect();
    Ok(KeygenOutcome { saves, params })
}

static KEYGEN: Lazy<KeygenOutcome> =
    Lazy::new(|| run_keygen(|_| {}).expect("honest keygen must succeed"));

// --- signing harness ----------------------------------------------------

struct SigningSetup {
    parties: Vec<signing::LocalParty>,
    outs: Vec<Receiver<ParsedMessage<signing::SigningMessage>>>,
    ends: Vec<Receiver<signing::SignatureData>>,
    msg_hash: BigInt,
}

/// Builds a signing session over the cohort given by indices into KEYGEN.
fn signing_setup(cohort: &[usize]) -> SigningSetup {
    let keygen = &*KEYGEN;
    let cohort_keys: Vec<BigInt> = cohort
        .iter()
        .map(|&i| keygen.params[i].party_id().key.clone())
        .collect();
    let params = make_parameters_for_cohort(&cohort_keys);
    let msg_hash = sha512_256i(&[&BigInt::from_bytes_be(
        num_bigint::Sign::Plus,
        b"Hi, threshold signing",
    )])
    .unwrap();

    let mut parties = Vec::new();
    let mut outs = Vec::new();
    let mut ends = Vec::new();
    for (pos, &i) in cohort.iter().enumerate() {
        let subset = keygen.saves[i].build_subset(&cohort_keys).unwrap();
        let (out_tx, out_rx) = channel();
        let (end_tx, end_rx) = channel();
        let party = signing::LocalParty::new(
            params[pos].clone(),
            subset,
            msg_hash.clone(),
            out_tx,
            end_tx,
        )
        .unwrap();
        parties.push(party);
        outs.push(out_rx);
        ends.push(end_rx);
    }
    SigningSetup { parties, outs, ends, msg_hash }
}

fn make_parameters_for_cohort(cohort_keys: &[BigInt]) -> Vec<Arc<Parameters>> {
    let mut ids: Vec<PartyID> = cohort_keys
        .iter()
        .map(|k| PartyID::new(format!("party-{}", k), format!("P[{}]", k), k.clone()))
        .collect();
    threshold_ecdsa::tss::sort_party_ids(&mut ids);
    let ctx = Arc::new(PeerContext::new(ids.clone()));
    ids.iter()
        .map(|id| {
            Arc::new(Parameters::new(CURVE, ctx.clone(), Arc::new(id.clone()), THRESHOLD).unwrap())
        })
        .collect()
}

// --- tests --------------------------------------------------------------

#[test]
fn test_keygen_produces_consistent_key_material() {
    let keygen = &*KEYGEN;
    let q = CURVE.order();
    let mod_q = ModInt::new(q.clone());

    // every party derived the same group key
    let y = keygen.saves[0].ecdsa_pub.clone().unwrap();
    assert!(y.validate_basic());
    for save in &keygen.saves {
        assert_eq!(save.ecdsa_pub.clone().unwrap(), y);
    }

    // sum_j lambda_j * x_j == sk for every cohort of size >= t+1,
    // equivalently sk*G == Y
    let ks: Vec<BigInt> = keygen.saves[0].ks.clone();
    let xs: Vec<BigInt> = keygen.saves.iter().map(|s| s.xi.clone().unwrap()).collect();
    for cohort in [vec![0usize, 1], vec![0, 2], vec![1, 2], vec![0, 1, 2]] {
        let cohort_ks: Vec<BigInt> = cohort.iter().map(|&j| ks[j].clone()).collect();
        let mut sk = BigInt::zero();
        for (pos, &j) in cohort.iter().enumerate() {
            let lambda = lagrange_coefficient(&q, &cohort_ks, pos).unwrap();
            sk = mod_q.add(&sk, &mod_q.mul(&lambda, &xs[j]));
        }
        assert_eq!(ECPoint::scalar_base_mult(CURVE, &sk), y, "cohort {:?}", cohort);
    }

    // X_j matches x_j * G for every party
    for (j, save) in keygen.saves.iter().enumerate() {
        let x_j = ECPoint::scalar_base_mult(CURVE, &xs[j]);
        for other in &keygen.saves {
            assert_eq!(other.big_x_j[j].clone().unwrap(), x_j);
        }
        assert_eq!(save.ks, ks);
    }
}

#[test]
fn test_sign_two_of_three() {
    let mut setup = signing_setup(&[0, 1]);
    for party in setup.parties.iter_mut() {
        party.start().unwrap();
    }
    let errors = run_rounds(&mut setup.parties, &setup.outs, |_| {});
    assert!(errors.is_empty(), "unexpected errors: {:?}", errors);

    let q = CURVE.order();
    let y = KEYGEN.saves[0].ecdsa_pub.clone().unwrap();
    let sigs: Vec<signing::SignatureData> =
        setup.ends.iter().map(|rx| rx.try_recv().unwrap()).collect();

    // all parties agree bit-for-bit
    assert_eq!(sigs[0], sigs[1]);

    let sig = &sigs[0];
    assert!(!sig.r.is_zero());
    // canonical low-half s
    assert!(sig.s <= (&q >> 1));
    assert!(sig.recovery_id <= 3);
    assert!(verify_ecdsa(&setup.msg_hash, &sig.r, &sig.s, &y));
    // the recovery byte leads back to the group key
    assert_eq!(recover_public_key(CURVE, &setup.msg_hash, sig).unwrap(), y);

    // secret temporaries read zero after the session returned
    for party in &setup.parties {
        assert!(party.is_finished());
        assert!(party.secrets_cleared());
    }
}

#[test]
fn test_sign_with_other_cohorts() {
    for cohort in [vec![0usize, 2], vec![1, 2], vec![0, 1, 2]] {
        let mut setup = signing_setup(&cohort);
        for party in setup.parties.iter_mut() {
            party.start().unwrap();
        }
        let errors = run_rounds(&mut setup.parties, &setup.outs, |_| {});
        assert!(errors.is_empty(), "cohort {:?}: {:?}", cohort, errors);

        let y = KEYGEN.saves[0].ecdsa_pub.clone().unwrap();
        let sig = setup.ends[0].try_recv().unwrap();
        assert!(verify_ecdsa(&setup.msg_hash, &sig.r, &sig.s, &y));
    }
}

#[test]
fn test_keygen_culprit_on_bad_dln_proof() {
    let result = run_keygen(|msg| {
        if msg.from.index == 0 {
            if let keygen::KeygenMessage::Round1(m) = &mut msg.content {
                m.dln_proof_1.t[0] += BigInt::one();
            }
        }
    });
    let errors = result.expect_err("tampered dln proof must fail");
    assert!(!errors.is_empty());
    for (victim, err) in errors {
        assert_ne!(victim, 0);
        assert!(matches!(err.kind, ErrorKind::ProofFailed { proof: "dln" }), "{:?}", err);
        assert_eq!(err.culprits.len(), 1);
        assert_eq!(err.culprits[0].index, 0);
    }
}

#[test]
fn test_keygen_culprit_on_bad_vss_share() {
    let result = run_keygen(|msg| {
        if msg.from.index == 0 && !msg.is_broadcast {
            if let keygen::KeygenMessage::Round2Share(m) = &mut msg.content {
                // corrupt the share dealt to party 1 only
                if msg.to.as_ref().map(|to| to[0].index) == Some(1) {
                    m.share += BigInt::one();
                }
            }
        }
    });
    let errors = result.expect_err("tampered share must fail");
    // only the recipient of the bad share detects it
    assert_eq!(errors.len(), 1);
    let (victim, err) = &errors[0];
    assert_eq!(*victim, 1);
    assert!(matches!(err.kind, ErrorKind::ProofFailed { proof: "vss share" }), "{:?}", err);
    assert_eq!(err.culprits.len(), 1);
    assert_eq!(err.culprits[0].index, 0);
}

#[test]
fn test_signing_culprit_on_bad_gamma_decommitment() {
    let mut setup = signing_setup(&[0, 1]);
    for party in setup.parties.iter_mut() {
        party.start().unwrap();
    }
    // party 0's round-4 opening no longer matches its round-1 commitment
    let errors = run_rounds(&mut setup.parties, &setup.outs, |msg| {
        if msg.from.index == 0 {
            if let signing::SigningMessage::Round4Bcast(m) = &mut msg.content {
                m.decommitment[1] += BigInt::one();
            }
        }
    });
    assert!(!errors.is_empty());
    for (victim, err) in errors {
        assert_eq!(victim, 1, "only the honest party reports");
        assert!(
            matches!(err.kind, ErrorKind::InvariantFailed { name: "gamma commitment opening" }),
            "{:?}",
            err
        );
        assert_eq!(err.culprits.len(), 1, "{:?}", err.culprits);
        assert_eq!(err.culprits[0].index, 0);
    }
    // secrets are destroyed on the failure path as well
    assert!(setup.parties[1].secrets_cleared());
}

#[test]
fn test_signing_rejects_invalid_final_share() {
    let mut setup = signing_setup(&[0, 1]);
    for party in setup.parties.iter_mut() {
        party.start().unwrap();
    }
    let errors = run_rounds(&mut setup.parties, &setup.outs, |msg| {
        if msg.from.index == 0 {
            if let signing::SigningMessage::Round7Success(m) = &mut msg.content {
                m.s_share += BigInt::one();
            }
        }
    });
    assert!(!errors.is_empty());
    for (victim, err) in errors {
        assert_eq!(victim, 1);
        assert!(matches!(err.kind, ErrorKind::SignatureInvalid), "{:?}", err);
    }
}

#[test]
fn test_driver_rejects_spoofed_sender_index() {
    let mut setup = signing_setup(&[0, 1]);
    for party in setup.parties.iter_mut() {
        party.start().unwrap();
    }
    // deliver a message whose claimed index does not match its key
    let mut from = setup.parties[0].party_id().clone();
    from.index = 1;
    let bogus = ParsedMessage::broadcast(
        from,
        signing::SigningMessage::Round1Bcast(signing::messages::SignRound1Bcast {
            commitment: BigInt::from(7),
        }),
    );
    let err = setup.parties[1].update(bogus).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::BadMessage { .. }));
}

#[test]
fn test_message_round_numbers_follow_wire_taxonomy() {
    // a light check that stored round numbers match the protocol layout
    let m1 = signing::SigningMessage::Round1Bcast(signing::messages::SignRound1Bcast {
        commitment: BigInt::one(),
    });
    assert_eq!(m1.round_number(), 1);
    let m7 = signing::SigningMessage::Round7Success(signing::messages::SignRound7Success {
        s_share: BigInt::one(),
    });
    assert_eq!(m7.round_number(), 7);
    assert!(m7.is_broadcast());
}
