// Copyright © 2026 the threshold-ecdsa authors
//
// This file is part of threshold-ecdsa. The full copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Elliptic curve points with a big-integer scalar API.
//!
//! `ECPoint` wraps the projective point of whichever curve the session
//! selected. Scalars are reduced modulo the curve order before use, so any
//! `BigInt` is a valid scalar input. The module also derives the second,
//! independent base point H used by commitment-style proofs.

use std::fmt;

use elliptic_curve::group::Group;
use elliptic_curve::ops::Reduce;
use elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use num_bigint::{BigInt, Sign};
use num_integer::Integer;
use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::common::slice::pad_to_length_bytes;
use crate::tss::curve::CurveId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PointError {
    #[error("point is not on curve")]
    NotOnCurve,
    #[error("failed to decode point: {0}")]
    InvalidEncoding(String),
    #[error("curve mismatch between operands")]
    CurveMismatch,
    #[error("point is the identity")]
    Identity,
    #[error("flatten/unflatten error: {0}")]
    FlattenError(String),
}

/// A point on one of the supported curves, stored in projective form.
#[derive(Clone)]
pub enum ECPoint {
    K256(k256::ProjectivePoint),
    P256(p256::ProjectivePoint),
}

fn k256_scalar(k: &BigInt) -> k256::Scalar {
    let reduced = k.mod_floor(&CurveId::Secp256k1.order());
    let bytes = pad_to_length_bytes(&reduced.to_bytes_be().1, 32);
    <k256::Scalar as Reduce<k256::U256>>::reduce(k256::U256::from_be_slice(&bytes))
}

fn p256_scalar(k: &BigInt) -> p256::Scalar {
    let reduced = k.mod_floor(&CurveId::NistP256.order());
    let bytes = pad_to_length_bytes(&reduced.to_bytes_be().1, 32);
    <p256::Scalar as Reduce<p256::U256>>::reduce(p256::U256::from_be_slice(&bytes))
}

impl ECPoint {
    pub fn curve(&self) -> CurveId {
        match self {
            ECPoint::K256(_) => CurveId::Secp256k1,
            ECPoint::P256(_) => CurveId::NistP256,
        }
    }

    /// The curve generator G.
    pub fn generator(curve: CurveId) -> Self {
        match curve {
            CurveId::Secp256k1 => ECPoint::K256(k256::ProjectivePoint::GENERATOR),
            CurveId::NistP256 => ECPoint::P256(p256::ProjectivePoint::GENERATOR),
        }
    }

    pub fn identity(curve: CurveId) -> Self {
        match curve {
            CurveId::Secp256k1 => ECPoint::K256(k256::ProjectivePoint::IDENTITY),
            CurveId::NistP256 => ECPoint::P256(p256::ProjectivePoint::IDENTITY),
        }
    }

    /// k·G.
    pub fn scalar_base_mult(curve: CurveId, k: &BigInt) -> Self {
        match curve {
            CurveId::Secp256k1 => {
                ECPoint::K256(k256::ProjectivePoint::GENERATOR * k256_scalar(k))
            }
            CurveId::NistP256 => {
                ECPoint::P256(p256::ProjectivePoint::GENERATOR * p256_scalar(k))
            }
        }
    }

    /// k·P.
    pub fn scalar_mul(&self, k: &BigInt) -> Self {
        match self {
            ECPoint::K256(p) => ECPoint::K256(p * &k256_scalar(k)),
            ECPoint::P256(p) => ECPoint::P256(p * &p256_scalar(k)),
        }
    }

    /// P + Q. Errors when the operands live on different curves.
    pub fn add(&self, other: &Self) -> Result<Self, PointError> {
        match (self, other) {
            (ECPoint::K256(a), ECPoint::K256(b)) => Ok(ECPoint::K256(a + b)),
            (ECPoint::P256(a), ECPoint::P256(b)) => Ok(ECPoint::P256(a + b)),
            _ => Err(PointError::CurveMismatch),
        }
    }

    /// -P.
    pub fn neg(&self) -> Self {
        match self {
            ECPoint::K256(p) => ECPoint::K256(-*p),
            ECPoint::P256(p) => ECPoint::P256(-*p),
        }
    }

    /// P - Q.
    pub fn sub(&self, other: &Self) -> Result<Self, PointError> {
        self.add(&other.neg())
    }

    pub fn is_identity(&self) -> bool {
        match self {
            ECPoint::K256(p) => bool::from(p.is_identity()),
            ECPoint::P256(p) => bool::from(p.is_identity()),
        }
    }

    /// Not the identity. Points built through this module are on-curve by
    /// construction.
    pub fn validate_basic(&self) -> bool {
        !self.is_identity()
    }

    /// Affine coordinates as non-negative integers; the identity maps to
    /// (0, 0).
    pub fn coords(&self) -> (BigInt, BigInt) {
        match self {
            ECPoint::K256(p) => {
                let ep = p.to_affine().to_encoded_point(false);
                coords_from_sec1(ep.x().map(|x| x.as_slice()), ep.y().map(|y| y.as_slice()))
            }
            ECPoint::P256(p) => {
                let ep = p.to_affine().to_encoded_point(false);
                coords_from_sec1(ep.x().map(|x| x.as_slice()), ep.y().map(|y| y.as_slice()))
            }
        }
    }

    pub fn x(&self) -> BigInt {
        self.coords().0
    }

    pub fn y(&self) -> BigInt {
        self.coords().1
    }

    /// Builds a point from affine coordinates, checking curve membership.
    pub fn from_coords(curve: CurveId, x: &BigInt, y: &BigInt) -> Result<Self, PointError> {
        let len = curve.field_bytes_len();
        let x_bytes = pad_to_length_bytes(&x.to_bytes_be().1, len);
        let y_bytes = pad_to_length_bytes(&y.to_bytes_be().1, len);
        if x_bytes.len() != len || y_bytes.len() != len {
            return Err(PointError::InvalidEncoding("coordinate too large".to_string()));
        }
        match curve {
            CurveId::Secp256k1 => {
                let ep = k256::EncodedPoint::from_affine_coordinates(
                    k256::FieldBytes::from_slice(&x_bytes),
                    k256::FieldBytes::from_slice(&y_bytes),
                    false,
                );
                let affine: Option<k256::AffinePoint> =
                    k256::AffinePoint::from_encoded_point(&ep).into();
                affine
                    .map(|a| ECPoint::K256(k256::ProjectivePoint::from(a)))
                    .ok_or(PointError::NotOnCurve)
            }
            CurveId::NistP256 => {
                let ep = p256::EncodedPoint::from_affine_coordinates(
                    p256::FieldBytes::from_slice(&x_bytes),
                    p256::FieldBytes::from_slice(&y_bytes),
                    false,
                );
                let affine: Option<p256::AffinePoint> =
                    p256::AffinePoint::from_encoded_point(&ep).into();
                affine
                    .map(|a| ECPoint::P256(p256::ProjectivePoint::from(a)))
                    .ok_or(PointError::NotOnCurve)
            }
        }
    }

    /// Compressed SEC1 encoding.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            ECPoint::K256(p) => p.to_affine().to_encoded_point(true).as_bytes().to_vec(),
            ECPoint::P256(p) => p.to_affine().to_encoded_point(true).as_bytes().to_vec(),
        }
    }

    /// Decodes a SEC1 encoding (compressed or not) on the given curve.
    pub fn from_bytes(curve: CurveId, bytes: &[u8]) -> Result<Self, PointError> {
        match curve {
            CurveId::Secp256k1 => {
                let ep = k256::EncodedPoint::from_bytes(bytes)
                    .map_err(|e| PointError::InvalidEncoding(e.to_string()))?;
                let affine: Option<k256::AffinePoint> =
                    k256::AffinePoint::from_encoded_point(&ep).into();
                affine
                    .map(|a| ECPoint::K256(k256::ProjectivePoint::from(a)))
                    .ok_or(PointError::NotOnCurve)
            }
            CurveId::NistP256 => {
                let ep = p256::EncodedPoint::from_bytes(bytes)
                    .map_err(|e| PointError::InvalidEncoding(e.to_string()))?;
                let affine: Option<p256::AffinePoint> =
                    p256::AffinePoint::from_encoded_point(&ep).into();
                affine
                    .map(|a| ECPoint::P256(p256::ProjectivePoint::from(a)))
                    .ok_or(PointError::NotOnCurve)
            }
        }
    }

    /// Whether the affine y coordinate is odd; used for the recovery byte.
    pub fn y_is_odd(&self) -> bool {
        self.y().is_odd()
    }
}

fn coords_from_sec1(x: Option<&[u8]>, y: Option<&[u8]>) -> (BigInt, BigInt) {
    match (x, y) {
        (Some(x), Some(y)) => (
            BigInt::from_bytes_be(Sign::Plus, x),
            BigInt::from_bytes_be(Sign::Plus, y),
        ),
        _ => (BigInt::from(0u8), BigInt::from(0u8)),
    }
}

impl PartialEq for ECPoint {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ECPoint::K256(a), ECPoint::K256(b)) => a == b,
            (ECPoint::P256(a), ECPoint::P256(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ECPoint {}

impl fmt::Debug for ECPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (x, y) = self.coords();
        f.debug_struct("ECPoint")
            .field("curve", &self.curve().name())
            .field("x", &x.to_str_radix(16))
            .field("y", &y.to_str_radix(16))
            .finish()
    }
}

#[derive(Serialize, Deserialize)]
struct EncodedECPoint {
    curve: CurveId,
    point: Vec<u8>,
}

impl Serialize for ECPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        EncodedECPoint { curve: self.curve(), point: self.to_bytes() }.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ECPoint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let enc = EncodedECPoint::deserialize(deserializer)?;
        ECPoint::from_bytes(enc.curve, &enc.point).map_err(serde::de::Error::custom)
    }
}

// --- Flatten/unflatten for commitments over point lists ---

/// Serializes points into a flat `[x1, y1, x2, y2, ...]` integer list.
pub fn flatten_ec_points(points: &[ECPoint]) -> Result<Vec<BigInt>, PointError> {
    let mut flat = Vec::with_capacity(points.len() * 2);
    for point in points {
        if point.is_identity() {
            return Err(PointError::FlattenError("cannot flatten identity point".to_string()));
        }
        let (x, y) = point.coords();
        flat.push(x);
        flat.push(y);
    }
    Ok(flat)
}

/// Rebuilds points from a flat coordinate list, checking curve membership.
pub fn un_flatten_ec_points(curve: CurveId, coords: &[BigInt]) -> Result<Vec<ECPoint>, PointError> {
    if coords.len() % 2 != 0 {
        return Err(PointError::FlattenError("input length must be even".to_string()));
    }
    coords
        .chunks_exact(2)
        .map(|pair| ECPoint::from_coords(curve, &pair[0], &pair[1]))
        .collect()
}

// --- Second base point H ---

const H_DERIVATION_TAG: &[u8] = b"TSS-SHA256-SECOND-BASE-POINT";

fn derive_second_base_point(curve: CurveId) -> ECPoint {
    let g = ECPoint::generator(curve);
    let mut hasher = Sha256::new();
    hasher.update(H_DERIVATION_TAG);
    hasher.update(curve.name().as_bytes());
    hasher.update(g.to_bytes());
    let seed = hasher.finalize();

    // Walk a hash chain over candidate x coordinates until one decompresses.
    // The discrete log of the result w.r.t. G is unknown by construction.
    for counter in 0u64.. {
        let mut hasher = Sha256::new();
        hasher.update(seed);
        hasher.update(counter.to_le_bytes());
        let x = hasher.finalize();

        let mut candidate = Vec::with_capacity(33);
        candidate.push(0x02);
        candidate.extend_from_slice(&x);
        if let Ok(point) = ECPoint::from_bytes(curve, &candidate) {
            if point.validate_basic() && point != g {
                return point;
            }
        }
    }
    unreachable!("hash-to-curve chain exhausted");
}

static K256_H: Lazy<ECPoint> = Lazy::new(|| derive_second_base_point(CurveId::Secp256k1));
static P256_H: Lazy<ECPoint> = Lazy::new(|| derive_second_base_point(CurveId::NistP256));

/// The second, independent base point H for commitment-style proofs.
/// Derived once per curve and cached; read-only after initialization.
pub fn second_base_point(curve: CurveId) -> &'static ECPoint {
    match curve {
        CurveId::Secp256k1 => &K256_H,
        CurveId::NistP256 => &P256_H,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::random::get_random_positive_int;
    use rand::thread_rng;

    #[test]
    fn test_point_ops_match_scalar_arithmetic() {
        for curve in [CurveId::Secp256k1, CurveId::NistP256] {
            let mut rng = thread_rng();
            let q = curve.order();
            let a = get_random_positive_int(&mut rng, &q).unwrap();
            let b = get_random_positive_int(&mut rng, &q).unwrap();

            let pa = ECPoint::scalar_base_mult(curve, &a);
            let pb = ECPoint::scalar_base_mult(curve, &b);

            let sum = pa.add(&pb).unwrap();
            let expected = ECPoint::scalar_base_mult(curve, &((&a + &b) % &q));
            assert_eq!(sum, expected);

            let prod = pa.scalar_mul(&b);
            let expected = ECPoint::scalar_base_mult(curve, &((&a * &b) % &q));
            assert_eq!(prod, expected);

            assert_eq!(pa.sub(&pa).unwrap(), ECPoint::identity(curve));
        }
    }

    #[test]
    fn test_scalar_reduction_mod_order() {
        let curve = CurveId::Secp256k1;
        let q = curve.order();
        let k = BigInt::from(7u64);
        let k_plus_q = &k + &q;
        assert_eq!(
            ECPoint::scalar_base_mult(curve, &k),
            ECPoint::scalar_base_mult(curve, &k_plus_q)
        );
    }

    #[test]
    fn test_curve_mismatch() {
        let a = ECPoint::generator(CurveId::Secp256k1);
        let b = ECPoint::generator(CurveId::NistP256);
        assert_eq!(a.add(&b), Err(PointError::CurveMismatch));
        assert_ne!(a, b);
    }

    #[test]
    fn test_coords_round_trip() {
        let mut rng = thread_rng();
        for curve in [CurveId::Secp256k1, CurveId::NistP256] {
            let k = get_random_positive_int(&mut rng, &curve.order()).unwrap();
            let p = ECPoint::scalar_base_mult(curve, &k);
            let (x, y) = p.coords();
            let p2 = ECPoint::from_coords(curve, &x, &y).unwrap();
            assert_eq!(p, p2);

            // tampered y must not be on the curve (overwhelmingly likely)
            let bad = ECPoint::from_coords(curve, &x, &(y + 1));
            assert!(bad.is_err());
        }
    }

    #[test]
    fn test_bytes_round_trip() {
        let mut rng = thread_rng();
        let curve = CurveId::Secp256k1;
        let k = get_random_positive_int(&mut rng, &curve.order()).unwrap();
        let p = ECPoint::scalar_base_mult(curve, &k);
        let bytes = p.to_bytes();
        assert_eq!(bytes.len(), 33);
        assert_eq!(ECPoint::from_bytes(curve, &bytes).unwrap(), p);
    }

    #[test]
    fn test_flatten_unflatten() {
        let mut rng = thread_rng();
        let curve = CurveId::Secp256k1;
        let points: Vec<ECPoint> = (0..3)
            .map(|_| {
                let k = get_random_positive_int(&mut rng, &curve.order()).unwrap();
                ECPoint::scalar_base_mult(curve, &k)
            })
            .collect();
        let flat = flatten_ec_points(&points).unwrap();
        assert_eq!(flat.len(), 6);
        let back = un_flatten_ec_points(curve, &flat).unwrap();
        assert_eq!(back, points);

        assert!(flatten_ec_points(&[ECPoint::identity(curve)]).is_err());
        assert!(un_flatten_ec_points(curve, &flat[..3]).is_err());
    }

    #[test]
    fn test_second_base_point() {
        for curve in [CurveId::Secp256k1, CurveId::NistP256] {
            let h = second_base_point(curve);
            assert!(h.validate_basic());
            assert_ne!(*h, ECPoint::generator(curve));
            // H must not be a small multiple of G
            for k in 1u64..=8 {
                assert_ne!(*h, ECPoint::scalar_base_mult(curve, &BigInt::from(k)));
            }
            // deterministic
            assert_eq!(*h, *second_base_point(curve));
        }
    }

    #[test]
    fn test_serde_round_trip() {
        let p = ECPoint::scalar_base_mult(CurveId::Secp256k1, &BigInt::from(42u64));
        let json = serde_json::to_string(&p).unwrap();
        let back: ECPoint = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }
}
