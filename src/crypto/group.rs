use core::fmt::{self, Debug};

use num_bigint::{BigUint, RandBigInt};
use num_traits::Zero;
use rand_core::CryptoRngCore;
use sha2::{Digest, Sha256};

use crate::{Error, Result};

/// Identity of a group instance, derived from its parameters.
///
/// Two instances built from the same parameters share an id; elements
/// remember the id of the group that produced them.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId([u8; 8]);

impl GroupId {
    /// Fingerprints a group type tag and its canonical parameter encoding.
    pub fn derive(tag: &str, parameters: &[&[u8]]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update((tag.len() as u32).to_be_bytes());
        hasher.update(tag.as_bytes());
        for part in parameters {
            hasher.update((part.len() as u32).to_be_bytes());
            hasher.update(part);
        }
        let digest = hasher.finalize();
        let mut id = [0u8; 8];
        id.copy_from_slice(&digest[..8]);
        Self(id)
    }

    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

impl Debug for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GroupId({})", hex::encode(self.0))
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Algebraic family of a discrete-log group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupType {
    /// Prime-order subgroup of the multiplicative group modulo a prime.
    Zp,
    /// Elliptic curve over a prime field.
    EcFp,
    /// Elliptic curve over a binary extension field.
    EcF2m,
}

/// A cyclic group of prime order in which discrete logarithms are hard.
///
/// Exponents are integers in `[0, order)`. Every element carries the
/// [`GroupId`] of the instance that produced it and every operation rejects
/// operands from another instance with [`Error::InvalidGroupElement`].
///
/// # Security
///
/// - [`reconstruct_element`](Self::reconstruct_element) does NOT check
///   membership; callers handling untrusted bytes must follow it with
///   [`is_member`](Self::is_member).
/// - [`exponentiate`](Self::exponentiate) may run in variable time and is only
///   for public exponents. Witnesses, nonces and blinding exponents go through
///   [`exponentiate_secret`](Self::exponentiate_secret).
pub trait DlogGroup: Debug + Send + Sync + 'static {
    type Element: Clone + Debug + PartialEq + Eq + Send + Sync + 'static;

    /// Human-readable name, e.g. `"P-256"`.
    fn name(&self) -> &str;

    fn id(&self) -> GroupId;

    fn group_type(&self) -> GroupType;

    /// Prime order `q` of the group.
    fn order(&self) -> &BigUint;

    fn generator(&self) -> &Self::Element;

    fn identity(&self) -> Self::Element;

    fn is_identity(&self, element: &Self::Element) -> Result<bool>;

    /// Group-specific membership test. The identity is always a member.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGroupElement`] if `element` belongs to a
    /// different group instance.
    fn is_member(&self, element: &Self::Element) -> Result<bool>;

    fn multiply(&self, a: &Self::Element, b: &Self::Element) -> Result<Self::Element>;

    /// Raises `base` to a public exponent.
    fn exponentiate(&self, base: &Self::Element, exponent: &BigUint) -> Result<Self::Element>;

    fn invert(&self, element: &Self::Element) -> Result<Self::Element>;

    /// Byte encoding of `element`, distinguishing the identity.
    fn encode_element(&self, element: &Self::Element, compressed: bool) -> Result<Vec<u8>>;

    /// Parses untrusted bytes into a candidate element WITHOUT checking
    /// membership.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Deserialization`] if the bytes cannot form a
    /// candidate at all (wrong length, unknown prefix, no square root).
    fn reconstruct_element(&self, bytes: &[u8], compressed: bool) -> Result<Self::Element>;

    /// Length of the encoding of a non-identity element.
    fn element_byte_len(&self, compressed: bool) -> usize;

    /// Raises `base` to a secret exponent with a fixed sequence of group
    /// operations.
    ///
    /// The default is a Montgomery ladder over `order().bits()` steps, each
    /// doing exactly one multiplication and one squaring. Backends with
    /// constant-time native arithmetic override it.
    fn exponentiate_secret(
        &self,
        base: &Self::Element,
        exponent: &BigUint,
    ) -> Result<Self::Element> {
        let exponent = exponent % self.order();
        let mut r0 = self.identity();
        let mut r1 = base.clone();
        for i in (0..self.order().bits()).rev() {
            if exponent.bit(i) {
                r0 = self.multiply(&r0, &r1)?;
                r1 = self.multiply(&r1, &r1)?;
            } else {
                r1 = self.multiply(&r0, &r1)?;
                r0 = self.multiply(&r0, &r0)?;
            }
        }
        Ok(r0)
    }

    /// `generator^exponent` for a secret exponent.
    fn exponentiate_generator(&self, exponent: &BigUint) -> Result<Self::Element> {
        self.exponentiate_secret(self.generator(), exponent)
    }

    /// Uniform exponent in `[0, order)`.
    fn random_exponent<R: CryptoRngCore + ?Sized>(&self, rng: &mut R) -> BigUint {
        rng.gen_biguint_below(self.order())
    }

    /// Uniform exponent in `[1, order)`.
    fn random_nonzero_exponent<R: CryptoRngCore + ?Sized>(&self, rng: &mut R) -> BigUint {
        loop {
            let candidate = self.random_exponent(rng);
            if !candidate.is_zero() {
                return candidate;
            }
        }
    }

    /// Uniformly sampled member of the group.
    fn random_element<R: CryptoRngCore + ?Sized>(&self, rng: &mut R) -> Result<Self::Element> {
        let exponent = self.random_exponent(rng);
        self.exponentiate_generator(&exponent)
    }

    /// Bytes needed for a fixed-length big-endian exponent.
    fn scalar_byte_len(&self) -> usize {
        (self.order().bits() as usize).div_ceil(8)
    }

    /// `a / b`.
    fn divide(&self, a: &Self::Element, b: &Self::Element) -> Result<Self::Element> {
        let inverse = self.invert(b)?;
        self.multiply(a, &inverse)
    }

    /// Checks that the generator is a non-identity member of order `q`.
    fn validate(&self) -> Result<()> {
        let generator = self.generator();
        if !self.is_member(generator)? {
            return Err(Error::InvalidParams(format!(
                "{}: generator is not a group member",
                self.name()
            )));
        }
        if self.is_identity(generator)? {
            return Err(Error::InvalidParams(format!(
                "{}: generator is the identity",
                self.name()
            )));
        }
        let power = self.exponentiate(generator, self.order())?;
        if !self.is_identity(&power)? {
            return Err(Error::InvalidParams(format!(
                "{}: generator does not have the declared order",
                self.name()
            )));
        }
        Ok(())
    }
}

/// Rejects an element owned by another group instance.
pub(crate) fn ensure_same_group(expected: GroupId, actual: GroupId, group: &str) -> Result<()> {
    if expected != actual {
        return Err(Error::InvalidGroupElement(format!(
            "element of group {actual} used with {group} ({expected})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_id_depends_on_parameters() {
        let a = GroupId::derive("zp", &[b"23", b"11", b"4"]);
        let b = GroupId::derive("zp", &[b"23", b"11", b"2"]);
        let c = GroupId::derive("zp", &[b"23", b"11", b"4"]);
        assert_ne!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn group_id_is_length_prefixed() {
        let a = GroupId::derive("zp", &[b"2", b"34"]);
        let b = GroupId::derive("zp", &[b"23", b"4"]);
        assert_ne!(a, b);
    }

    #[test]
    fn mismatched_ids_are_contract_errors() {
        let a = GroupId::derive("zp", &[b"1"]);
        let b = GroupId::derive("zp", &[b"2"]);
        let err = ensure_same_group(a, b, "toy").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Contract);
    }
}
