//! RFC 5114 section 2.3 group on fixed-width integers.
//!
//! Same group as [`ZpGroup::named`] with [`RFC5114_2048_256`], with every
//! operation running on 2048-bit Montgomery arithmetic whose timing does not
//! depend on operand values. Element encodings match the software backend.
//!
//! [`ZpGroup::named`]: super::ZpGroup::named
//! [`RFC5114_2048_256`]: crate::params::RFC5114_2048_256

use crypto_bigint::modular::runtime_mod::{DynResidue, DynResidueParams};
use crypto_bigint::{Encoding, U2048, U256};
use num_bigint::BigUint;
use num_traits::Zero;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::crypto::field::{mod_pow, to_be_padded};
use crate::crypto::group::ensure_same_group;
use crate::crypto::{DlogGroup, GroupId, GroupType};
use crate::params::{hex_int, RFC5114_2048_256, RFC5114_G, RFC5114_P, RFC5114_Q};
use crate::{Error, Result};

const ELEMENT_BYTES: usize = 256;
const SCALAR_BYTES: usize = 32;

/// Residue modulo the RFC 5114 prime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rfc5114Element {
    group: GroupId,
    value: U2048,
}

impl Rfc5114Element {
    pub fn inner(&self) -> &U2048 {
        &self.value
    }
}

/// Fixed-width backend for the 2048-bit MODP group with 256-bit order.
#[derive(Debug)]
pub struct Rfc5114Group {
    p: U2048,
    p_minus_two: U2048,
    p_minus_one: BigUint,
    q_fixed: U256,
    q: BigUint,
    montgomery: DynResidueParams<{ U2048::LIMBS }>,
    generator: Rfc5114Element,
    id: GroupId,
}

impl Rfc5114Group {
    /// Builds the group and checks that the generator has order `q`.
    pub fn new() -> Result<Self> {
        let p = U2048::from_be_hex(RFC5114_P);
        let id = GroupId::derive("rfc5114-fixed", &[&p.to_be_bytes()]);
        let group = Self {
            p,
            p_minus_two: p.wrapping_sub(&U2048::from_u8(2)),
            p_minus_one: hex_int(RFC5114_P) - 1u32,
            q_fixed: U256::from_be_hex(RFC5114_Q),
            q: hex_int(RFC5114_Q),
            montgomery: DynResidueParams::new(&p),
            generator: Rfc5114Element {
                group: id,
                value: U2048::from_be_hex(RFC5114_G),
            },
            id,
        };
        group.validate()?;
        Ok(group)
    }

    fn element(&self, value: U2048) -> Rfc5114Element {
        Rfc5114Element {
            group: self.id,
            value,
        }
    }

    fn check(&self, element: &Rfc5114Element) -> Result<()> {
        ensure_same_group(self.id, element.group, RFC5114_2048_256)
    }

    fn residue(&self, value: &U2048) -> DynResidue<{ U2048::LIMBS }> {
        DynResidue::new(value, self.montgomery)
    }

    /// Secret exponents are reduced mod `q` to 256 bits, as the ladder in
    /// the software backend does.
    fn secret_exponent(&self, exponent: &BigUint) -> Result<U256> {
        let reduced = exponent % &self.q;
        let bytes = Zeroizing::new(to_be_padded(&reduced, SCALAR_BYTES)?);
        Ok(U256::from_be_slice(&bytes))
    }

    /// Public exponents keep their full value so non-members behave as they
    /// do under `modpow`. Anything wider than the modulus is folded mod
    /// `p - 1`, keeping a nonzero exponent nonzero.
    fn public_exponent(&self, exponent: &BigUint) -> Result<U2048> {
        let folded;
        let exponent = if exponent.bits() > U2048::BITS as u64 {
            let r = exponent % &self.p_minus_one;
            folded = if r.is_zero() { self.p_minus_one.clone() } else { r };
            &folded
        } else {
            exponent
        };
        Ok(U2048::from_be_slice(&to_be_padded(exponent, ELEMENT_BYTES)?))
    }
}

impl DlogGroup for Rfc5114Group {
    type Element = Rfc5114Element;

    fn name(&self) -> &str {
        RFC5114_2048_256
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

    fn generator(&self) -> &Rfc5114Element {
        &self.generator
    }

    fn identity(&self) -> Rfc5114Element {
        self.element(U2048::ONE)
    }

    fn is_identity(&self, element: &Rfc5114Element) -> Result<bool> {
        self.check(element)?;
        Ok(bool::from(element.value.ct_eq(&U2048::ONE)))
    }

    fn is_member(&self, element: &Rfc5114Element) -> Result<bool> {
        self.check(element)?;
        let value = &element.value;
        if value == &U2048::ZERO || value >= &self.p {
            return Ok(false);
        }
        let power = self.residue(value).pow(&self.q_fixed).retrieve();
        Ok(bool::from(power.ct_eq(&U2048::ONE)))
    }

    fn multiply(&self, a: &Rfc5114Element, b: &Rfc5114Element) -> Result<Rfc5114Element> {
        self.check(a)?;
        self.check(b)?;
        let product = self.residue(&a.value) * self.residue(&b.value);
        Ok(self.element(product.retrieve()))
    }

    fn exponentiate(&self, base: &Rfc5114Element, exponent: &BigUint) -> Result<Rfc5114Element> {
        self.check(base)?;
        let exponent = self.public_exponent(exponent)?;
        Ok(self.element(self.residue(&base.value).pow(&exponent).retrieve()))
    }

    fn exponentiate_secret(
        &self,
        base: &Rfc5114Element,
        exponent: &BigUint,
    ) -> Result<Rfc5114Element> {
        self.check(base)?;
        let exponent = Zeroizing::new(self.secret_exponent(exponent)?);
        Ok(self.element(self.residue(&base.value).pow(&*exponent).retrieve()))
    }

    fn invert(&self, element: &Rfc5114Element) -> Result<Rfc5114Element> {
        self.check(element)?;
        if element.value == U2048::ZERO {
            return Err(Error::InvalidGroupElement(
                "0 has no inverse mod p".to_string(),
            ));
        }
        // Fermat: x^(p-2)
        Ok(self.element(mod_pow(&element.value, &self.p_minus_two, &self.p)?))
    }

    fn encode_element(&self, element: &Rfc5114Element, _compressed: bool) -> Result<Vec<u8>> {
        self.check(element)?;
        Ok(element.value.to_be_bytes().to_vec())
    }

    fn element_byte_len(&self, _compressed: bool) -> usize {
        ELEMENT_BYTES
    }

    fn reconstruct_element(&self, bytes: &[u8], _compressed: bool) -> Result<Rfc5114Element> {
        if bytes.len() != ELEMENT_BYTES {
            return Err(Error::Deserialization(format!(
                "{RFC5114_2048_256}: expected {ELEMENT_BYTES} element bytes, got {}",
                bytes.len()
            )));
        }
        Ok(self.element(U2048::from_be_slice(bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::SecureRng;
    use crate::groups::ZpGroup;

    #[test]
    fn identity() {
        let group = Rfc5114Group::new().unwrap();
        assert!(group.is_identity(&group.identity()).unwrap());
        assert!(!group.is_identity(group.generator()).unwrap());
    }

    #[test]
    fn element_operations() {
        let group = Rfc5114Group::new().unwrap();
        let mut rng = SecureRng::new();
        let y = group.random_element(&mut rng).unwrap();
        assert!(group.is_member(&y).unwrap());

        let y_inv = group.invert(&y).unwrap();
        let product = group.multiply(&y, &y_inv).unwrap();
        assert!(group.is_identity(&product).unwrap());
    }

    #[test]
    fn non_residue_is_rejected() {
        let group = Rfc5114Group::new().unwrap();
        let minus_one = group.element(group.p.wrapping_sub(&U2048::ONE));
        assert!(!group.is_member(&minus_one).unwrap());
        assert!(!group.is_member(&group.element(U2048::ZERO)).unwrap());
        assert!(!group.is_member(&group.element(group.p)).unwrap());
    }

    #[test]
    fn public_exponent_is_not_reduced_mod_q() {
        let group = Rfc5114Group::new().unwrap();
        let software = ZpGroup::named(RFC5114_2048_256).unwrap();
        let minus_one = group.element(group.p.wrapping_sub(&U2048::ONE));
        let software_minus_one = software.element_unchecked(hex_int(RFC5114_P) - 1u32);

        let fixed = group.exponentiate(&minus_one, group.order()).unwrap();
        let reference = software
            .exponentiate(&software_minus_one, software.order())
            .unwrap();
        assert!(!group.is_identity(&fixed).unwrap());
        assert_eq!(
            group.encode_element(&fixed, false).unwrap(),
            software.encode_element(&reference, false).unwrap()
        );
    }

    #[test]
    fn exponents_wider_than_the_modulus_are_folded() {
        let group = Rfc5114Group::new().unwrap();
        let software = ZpGroup::named(RFC5114_2048_256).unwrap();
        let wide = (BigUint::from(1u32) << 2100usize) + 12345u32;
        let base = group.exponentiate(group.generator(), &BigUint::from(7u32)).unwrap();
        let software_base = software
            .exponentiate(software.generator(), &BigUint::from(7u32))
            .unwrap();
        assert_eq!(
            group.encode_element(&group.exponentiate(&base, &wide).unwrap(), false).unwrap(),
            software
                .encode_element(&software.exponentiate(&software_base, &wide).unwrap(), false)
                .unwrap()
        );

        let zero = group.element(U2048::ZERO);
        let multiple = &group.p_minus_one << 1500usize;
        let power = group.exponentiate(&zero, &multiple).unwrap();
        assert_eq!(power.inner(), &U2048::ZERO);
    }

    #[test]
    fn reconstruct_checks_length() {
        let group = Rfc5114Group::new().unwrap();
        let bytes = group.encode_element(group.generator(), false).unwrap();
        assert_eq!(&group.reconstruct_element(&bytes, false).unwrap(), group.generator());
        assert!(group.reconstruct_element(&bytes[1..], false).is_err());
    }
}
