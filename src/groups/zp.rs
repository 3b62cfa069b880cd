//! Prime-order subgroup of `Z_p^*` over arbitrary-precision integers.
//!
//! This is the portable reference backend for multiplicative groups. It
//! accepts any parameters that pass validation; [`Rfc5114Group`] is the
//! fixed-width alternative for the RFC 5114 group.
//!
//! [`Rfc5114Group`]: super::Rfc5114Group

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};

use crate::crypto::field::{is_probable_prime, to_be_padded, PRIMALITY_ROUNDS};
use crate::crypto::group::ensure_same_group;
use crate::crypto::{DlogGroup, GroupId, GroupType, SecureRng};
use crate::params::{BuiltinParameters, ParameterSource, ZpParams};
use crate::{Error, Result};

/// Residue modulo `p` tagged with its group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZpElement {
    group: GroupId,
    value: BigUint,
}

impl ZpElement {
    /// The residue as an integer.
    pub fn value(&self) -> &BigUint {
        &self.value
    }
}

/// Multiplicative group modulo a prime, restricted to its order-`q` subgroup.
#[derive(Debug)]
pub struct ZpGroup {
    name: String,
    p: BigUint,
    q: BigUint,
    generator: ZpElement,
    id: GroupId,
    byte_len: usize,
}

impl ZpGroup {
    /// Builds a group from caller-supplied parameters.
    ///
    /// Runs full validation including Miller-Rabin on `p` and `q`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParams`] if the parameters do not describe a
    /// subgroup of prime order `q` generated by `g`.
    pub fn new(params: ZpParams) -> Result<Self> {
        Self::build(params, true)
    }

    /// Builds a named group from the built-in registry.
    ///
    /// Built-in parameters are known primes, so only the structural checks run.
    pub fn named(name: &str) -> Result<Self> {
        Self::build(BuiltinParameters.zp(name)?, false)
    }

    /// Builds a named group from any parameter source, with full validation.
    pub fn from_source(source: &impl ParameterSource, name: &str) -> Result<Self> {
        Self::new(source.zp(name)?)
    }

    fn build(params: ZpParams, check_primality: bool) -> Result<Self> {
        let ZpParams { name, p, q, g } = params;
        let two = BigUint::from(2u32);

        if p <= two || p.is_even() {
            return Err(Error::InvalidParams(format!("{name}: p must be an odd prime")));
        }
        if q < two {
            return Err(Error::InvalidParams(format!("{name}: q must be prime")));
        }
        if !(&p - 1u32).is_multiple_of(&q) {
            return Err(Error::InvalidParams(format!("{name}: q does not divide p - 1")));
        }
        if g <= BigUint::one() || g >= p {
            return Err(Error::InvalidParams(format!("{name}: g must lie in (1, p)")));
        }
        if check_primality {
            let mut rng = SecureRng::new();
            if !is_probable_prime(&p, PRIMALITY_ROUNDS, &mut rng) {
                return Err(Error::InvalidParams(format!("{name}: p is not prime")));
            }
            if !is_probable_prime(&q, PRIMALITY_ROUNDS, &mut rng) {
                return Err(Error::InvalidParams(format!("{name}: q is not prime")));
            }
        }

        let id = GroupId::derive(
            "zp",
            &[&p.to_bytes_be(), &q.to_bytes_be(), &g.to_bytes_be()],
        );
        let byte_len = (p.bits() as usize).div_ceil(8);
        let group = Self {
            name,
            p,
            q,
            generator: ZpElement { group: id, value: g },
            id,
            byte_len,
        };
        group.validate()?;
        Ok(group)
    }

    /// The field modulus `p`.
    pub fn modulus(&self) -> &BigUint {
        &self.p
    }

    /// Wraps an integer as an element of this group WITHOUT checking
    /// membership, the same way [`DlogGroup::reconstruct_element`] does.
    pub fn element_unchecked(&self, value: BigUint) -> ZpElement {
        ZpElement {
            group: self.id,
            value,
        }
    }

    fn check(&self, element: &ZpElement) -> Result<()> {
        ensure_same_group(self.id, element.group, &self.name)
    }
}

impl DlogGroup for ZpGroup {
    type Element = ZpElement;

    fn name(&self) -> &str {
        &self.name
    }

    fn id(&self) -> GroupId {
        self.id
    }

    fn group_type(&self) -> GroupType {
        GroupType::Zp
    }

    fn order(&self) -> &BigUint {
        &self.q
    }

    fn generator(&self) -> &ZpElement {
        &self.generator
    }

    fn identity(&self) -> ZpElement {
        self.element_unchecked(BigUint::one())
    }

    fn is_identity(&self, element: &ZpElement) -> Result<bool> {
        self.check(element)?;
        Ok(element.value.is_one())
    }

    fn is_member(&self, element: &ZpElement) -> Result<bool> {
        self.check(element)?;
        let value = &element.value;
        if value.is_zero() || value >= &self.p {
            return Ok(false);
        }
        if value.is_one() {
            return Ok(true);
        }
        Ok(value.modpow(&self.q, &self.p).is_one())
    }

    fn multiply(&self, a: &ZpElement, b: &ZpElement) -> Result<ZpElement> {
        self.check(a)?;
        self.check(b)?;
        Ok(self.element_unchecked((&a.value * &b.value) % &self.p))
    }

    fn exponentiate(&self, base: &ZpElement, exponent: &BigUint) -> Result<ZpElement> {
        self.check(base)?;
        Ok(self.element_unchecked(base.value.modpow(exponent, &self.p)))
    }

    fn invert(&self, element: &ZpElement) -> Result<ZpElement> {
        self.check(element)?;
        let inverse = element.value.modinv(&self.p).ok_or_else(|| {
            Error::InvalidGroupElement(format!("{} has no inverse mod p", element.value))
        })?;
        Ok(self.element_unchecked(inverse))
    }

    fn encode_element(&self, element: &ZpElement, _compressed: bool) -> Result<Vec<u8>> {
        self.check(element)?;
        to_be_padded(&element.value, self.byte_len)
    }

    fn element_byte_len(&self, _compressed: bool) -> usize {
        self.byte_len
    }

    fn reconstruct_element(&self, bytes: &[u8], _compressed: bool) -> Result<ZpElement> {
        if bytes.len() != self.byte_len {
            return Err(Error::Deserialization(format!(
                "{}: expected {} element bytes, got {}",
                self.name,
                self.byte_len,
                bytes.len()
            )));
        }
        Ok(self.element_unchecked(BigUint::from_bytes_be(bytes)))
    }
}
