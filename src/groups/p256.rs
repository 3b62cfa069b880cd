//! NIST P-256 (secp256r1) backed by the `p256` crate.
//!
//! # Security Level
//!
//! P-256 provides approximately 128 bits of security against classical attacks.
//! All scalar multiplications run on the crate's constant-time arithmetic.
//!
//! Encodings are SEC1 and byte-identical to [`EcFpGroup`] built from the
//! `P-256` parameters.
//!
//! [`EcFpGroup`]: super::EcFpGroup

use num_bigint::BigUint;
use p256::elliptic_curve::ops::Reduce;
use p256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use p256::{AffinePoint, EncodedPoint, FieldBytes, ProjectivePoint, Scalar, U256};
use zeroize::Zeroizing;

use super::native;
use crate::crypto::field::to_be_padded;
use crate::crypto::group::ensure_same_group;
use crate::crypto::{DlogGroup, GroupId, GroupType};
use crate::params::{hex_int, P256_ORDER};
use crate::{Error, Result};

/// Number of bytes in a P-256 scalar or coordinate.
const P256_SCALAR_BYTES: usize = 32;

/// Number of bytes in a compressed P-256 point (1 byte prefix + 32 byte x-coordinate).
const P256_COMPRESSED_BYTES: usize = 33;

const P256_UNCOMPRESSED_BYTES: usize = 65;

#[derive(Clone, Debug)]
enum Repr {
    Point(ProjectivePoint),
    /// Well-formed uncompressed encoding that is not on the curve.
    Unchecked(EncodedPoint),
}

/// Element (point) in the native P-256 group.
///
/// Points are stored in projective coordinates for efficient arithmetic.
#[derive(Clone, Debug)]
pub struct P256Element {
    group: GroupId,
    repr: Repr,
}

impl PartialEq for P256Element {
    fn eq(&self, other: &Self) -> bool {
        if self.group != other.group {
            return false;
        }
        match (&self.repr, &other.repr) {
            (Repr::Point(a), Repr::Point(b)) => a == b,
            (Repr::Unchecked(a), Repr::Unchecked(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for P256Element {}

impl P256Element {
    /// The underlying projective point, if the element lies on the curve.
    pub fn inner(&self) -> Option<&ProjectivePoint> {
        match &self.repr {
            Repr::Point(point) => Some(point),
            Repr::Unchecked(_) => None,
        }
    }
}

/// P-256 group on the native backend.
#[derive(Debug)]
pub struct NativeP256Group {
    order: BigUint,
    generator: P256Element,
    id: GroupId,
}

impl NativeP256Group {
    /// Creates the group.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Uninitialized`] unless [`native::initialize`] has
    /// completed successfully.
    pub fn new() -> Result<Self> {
        if !native::is_initialized() {
            return Err(Error::Uninitialized(
                "call groups::native::initialize() before NativeP256Group::new()",
            ));
        }
        let id = GroupId::derive("p256-native", &[b"P-256"]);
        Ok(Self {
            order: hex_int(P256_ORDER),
            generator: P256Element {
                group: id,
                repr: Repr::Point(ProjectivePoint::GENERATOR),
            },
            id,
        })
    }

    fn point(&self, point: ProjectivePoint) -> P256Element {
        P256Element {
            group: self.id,
            repr: Repr::Point(point),
        }
    }

    fn on_curve<'a>(&self, element: &'a P256Element) -> Result<&'a ProjectivePoint> {
        ensure_same_group(self.id, element.group, "P-256")?;
        element.inner().ok_or_else(|| {
            Error::InvalidGroupElement("point is not on P-256".to_string())
        })
    }

    fn scalar(&self, exponent: &BigUint) -> Result<Scalar> {
        let reduced = exponent % &self.order;
        let bytes = Zeroizing::new(to_be_padded(&reduced, P256_SCALAR_BYTES)?);
        Ok(<Scalar as Reduce<U256>>::reduce_bytes(FieldBytes::from_slice(&bytes)))
    }
}

impl DlogGroup for NativeP256Group {
    type Element = P256Element;

    fn name(&self) -> &str {
        "P-256"
    }

    fn id(&self) -> GroupId {
        self.id
    }

    fn group_type(&self) -> GroupType {
        GroupType::EcFp
    }

    fn order(&self) -> &BigUint {
        &self.order
    }

    fn generator(&self) -> &P256Element {
        &self.generator
    }

    fn identity(&self) -> P256Element {
        self.point(ProjectivePoint::IDENTITY)
    }

    fn is_identity(&self, element: &P256Element) -> Result<bool> {
        ensure_same_group(self.id, element.group, "P-256")?;
        Ok(matches!(&element.repr, Repr::Point(p) if *p == ProjectivePoint::IDENTITY))
    }

    fn is_member(&self, element: &P256Element) -> Result<bool> {
        ensure_same_group(self.id, element.group, "P-256")?;
        // cofactor 1: every curve point is in the group
        Ok(matches!(element.repr, Repr::Point(_)))
    }

    fn multiply(&self, a: &P256Element, b: &P256Element) -> Result<P256Element> {
        Ok(self.point(*self.on_curve(a)? + *self.on_curve(b)?))
    }

    fn exponentiate(&self, base: &P256Element, exponent: &BigUint) -> Result<P256Element> {
        let point = *self.on_curve(base)?;
        Ok(self.point(point * self.scalar(exponent)?))
    }

    fn exponentiate_secret(&self, base: &P256Element, exponent: &BigUint) -> Result<P256Element> {
        self.exponentiate(base, exponent)
    }

    fn invert(&self, element: &P256Element) -> Result<P256Element> {
        Ok(self.point(-*self.on_curve(element)?))
    }

    fn encode_element(&self, element: &P256Element, compressed: bool) -> Result<Vec<u8>> {
        ensure_same_group(self.id, element.group, "P-256")?;
        match &element.repr {
            Repr::Point(point) => Ok(point
                .to_affine()
                .to_encoded_point(compressed)
                .as_bytes()
                .to_vec()),
            Repr::Unchecked(encoded) if !compressed => Ok(encoded.as_bytes().to_vec()),
            Repr::Unchecked(_) => Err(Error::InvalidGroupElement(
                "an off-curve point has no compressed encoding".to_string(),
            )),
        }
    }

    fn element_byte_len(&self, compressed: bool) -> usize {
        if compressed {
            P256_COMPRESSED_BYTES
        } else {
            P256_UNCOMPRESSED_BYTES
        }
    }

    fn reconstruct_element(&self, bytes: &[u8], compressed: bool) -> Result<P256Element> {
        let encoded = EncodedPoint::from_bytes(bytes).map_err(|_| {
            Error::Deserialization(format!(
                "P-256: malformed point encoding of {} bytes",
                bytes.len()
            ))
        })?;
        if encoded.is_identity() {
            return Ok(self.identity());
        }
        if encoded.is_compressed() != compressed {
            return Err(Error::Deserialization(format!(
                "P-256: expected a {} point",
                if compressed { "compressed" } else { "uncompressed" }
            )));
        }
        match Option::<AffinePoint>::from(AffinePoint::from_encoded_point(&encoded)) {
            Some(affine) => Ok(self.point(ProjectivePoint::from(affine))),
            None if compressed => Err(Error::Deserialization(
                "P-256: x is not on the curve".to_string(),
            )),
            None => Ok(P256Element {
                group: self.id,
                repr: Repr::Unchecked(encoded),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SecureRng;

    fn group() -> NativeP256Group {
        native::initialize().unwrap();
        NativeP256Group::new().unwrap()
    }

    #[test]
    fn element_serialization() {
        let group = group();
        let mut rng = SecureRng::new();
        let y = group.random_element(&mut rng).unwrap();

        for compressed in [true, false] {
            let bytes = group.encode_element(&y, compressed).unwrap();
            assert_eq!(bytes.len(), group.element_byte_len(compressed));
            assert_eq!(group.reconstruct_element(&bytes, compressed).unwrap(), y);
        }
    }

    #[test]
    fn off_curve_point_is_not_member() {
        let group = group();
        let mut bytes = group.encode_element(group.generator(), false).unwrap();
        bytes[64] ^= 1;
        let candidate = group.reconstruct_element(&bytes, false).unwrap();
        assert!(!group.is_member(&candidate).unwrap());
        assert!(group.multiply(&candidate, group.generator()).is_err());
    }

    #[test]
    fn compression_flag_must_match_prefix() {
        let group = group();
        let bytes = group.encode_element(group.generator(), true).unwrap();
        let err = group.reconstruct_element(&bytes, false).unwrap_err();
        assert!(matches!(err, Error::Deserialization(_)));
    }

    #[test]
    fn exponent_is_reduced_mod_order() {
        let group = group();
        let g = group.generator();
        let e = BigUint::from(5u32);
        let wrapped = &e + group.order();
        assert_eq!(
            group.exponentiate(g, &e).unwrap(),
            group.exponentiate(g, &wrapped).unwrap()
        );
        assert!(group
            .is_identity(&group.exponentiate(g, group.order()).unwrap())
            .unwrap());
    }
}
