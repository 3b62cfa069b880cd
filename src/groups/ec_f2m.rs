//! Elliptic curves `y^2 + xy = x^3 + ax^2 + b` over GF(2^m), software backend.

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::crypto::binary_field::{BinaryField, Gf2mElement};
use crate::crypto::field::{is_probable_prime, PRIMALITY_ROUNDS};
use crate::crypto::group::ensure_same_group;
use crate::crypto::{DlogGroup, GroupId, GroupType, SecureRng};
use crate::params::{BuiltinParameters, EcF2mParams, ParameterSource};
use crate::{Error, Result};

const TAG_INFINITY: u8 = 0x00;
const TAG_COMPRESSED_EVEN: u8 = 0x02;
const TAG_COMPRESSED_ODD: u8 = 0x03;
const TAG_UNCOMPRESSED: u8 = 0x04;

/// Affine point on a binary curve; `None` is the point at infinity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EcF2mPoint {
    group: GroupId,
    coords: Option<(Gf2mElement, Gf2mElement)>,
}

impl EcF2mPoint {
    pub fn is_infinity(&self) -> bool {
        self.coords.is_none()
    }

    /// Coordinates as integers whose bits are polynomial coefficients.
    pub fn coordinates(&self) -> Option<(BigUint, BigUint)> {
        self.coords
            .as_ref()
            .map(|(x, y)| (x.to_biguint(), y.to_biguint()))
    }
}

/// Binary curve with a prime-order base point.
#[derive(Debug)]
pub struct EcF2mGroup {
    name: String,
    field: BinaryField,
    a: Gf2mElement,
    b: Gf2mElement,
    q: BigUint,
    cofactor: BigUint,
    generator: EcF2mPoint,
    id: GroupId,
}

impl EcF2mGroup {
    /// Builds a binary curve from caller-supplied parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParams`] if `b` is zero, a coefficient is not
    /// a field element, or the base point does not have prime order `q`.
    pub fn new(params: EcF2mParams) -> Result<Self> {
        Self::build(params, true)
    }

    /// Builds a named curve from the built-in registry.
    pub fn named(name: &str) -> Result<Self> {
        Self::build(BuiltinParameters.ec_f2m(name)?, false)
    }

    /// Builds a named curve from any parameter source, with full validation.
    pub fn from_source(source: &impl ParameterSource, name: &str) -> Result<Self> {
        Self::new(source.ec_f2m(name)?)
    }

    fn build(params: EcF2mParams, check_primality: bool) -> Result<Self> {
        let field = BinaryField::new(params.m, &params.terms)?;
        let to_field = |value: &BigUint, what: &str| {
            field.from_biguint(value).ok_or_else(|| {
                Error::InvalidParams(format!("{}: {what} is not a field element", params.name))
            })
        };
        let a = to_field(&params.a, "a")?;
        let b = to_field(&params.b, "b")?;
        let gx = to_field(&params.gx, "gx")?;
        let gy = to_field(&params.gy, "gy")?;

        if b.is_zero() {
            return Err(Error::InvalidParams(format!(
                "{}: b = 0 gives a singular curve",
                params.name
            )));
        }
        if params.cofactor.is_zero() {
            return Err(Error::InvalidParams(format!(
                "{}: cofactor cannot be zero",
                params.name
            )));
        }
        if check_primality && !is_probable_prime(&params.q, PRIMALITY_ROUNDS, &mut SecureRng::new())
        {
            return Err(Error::InvalidParams(format!(
                "{}: order is not prime",
                params.name
            )));
        }

        let terms: Vec<u8> = field
            .terms()
            .iter()
            .flat_map(|t| (*t as u32).to_be_bytes())
            .collect();
        let id = GroupId::derive(
            "ec-f2m",
            &[
                &(params.m as u32).to_be_bytes(),
                &terms,
                &params.a.to_bytes_be(),
                &params.b.to_bytes_be(),
                &params.gx.to_bytes_be(),
                &params.gy.to_bytes_be(),
                &params.q.to_bytes_be(),
            ],
        );
        let group = Self {
            name: params.name,
            field,
            a,
            b,
            q: params.q,
            cofactor: params.cofactor,
            generator: EcF2mPoint {
                group: id,
                coords: Some((gx, gy)),
            },
            id,
        };
        group.validate()?;
        Ok(group)
    }

    /// Wraps coordinates (as coefficient bit patterns) as a point of this
    /// curve WITHOUT checking the curve equation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if a coordinate is not a field element.
    pub fn point_unchecked(&self, x: &BigUint, y: &BigUint) -> Result<EcF2mPoint> {
        let convert = |v: &BigUint| {
            self.field
                .from_biguint(v)
                .ok_or_else(|| Error::InvalidInput(format!("{v:#x} is not a field element")))
        };
        Ok(self.point(convert(x)?, convert(y)?))
    }

    /// Degree `m` of the underlying field.
    pub fn field_degree(&self) -> usize {
        self.field.degree()
    }

    fn point(&self, x: Gf2mElement, y: Gf2mElement) -> EcF2mPoint {
        EcF2mPoint {
            group: self.id,
            coords: Some((x, y)),
        }
    }

    fn infinity(&self) -> EcF2mPoint {
        EcF2mPoint {
            group: self.id,
            coords: None,
        }
    }

    fn check(&self, point: &EcF2mPoint) -> Result<()> {
        ensure_same_group(self.id, point.group, &self.name)
    }

    fn is_on_curve(&self, x: &Gf2mElement, y: &Gf2mElement) -> bool {
        let f = &self.field;
        let x2 = f.square(x);
        let lhs = f.add(&f.square(y), &f.mul(x, y));
        let rhs = f.add(&f.add(&f.mul(&x2, x), &f.mul(&self.a, &x2)), &self.b);
        lhs == rhs
    }

    fn double(&self, point: &EcF2mPoint) -> EcF2mPoint {
        let Some((x, y)) = &point.coords else {
            return self.infinity();
        };
        let f = &self.field;
        let Some(x_inv) = f.inv(x) else {
            return self.infinity();
        };
        let lambda = f.add(x, &f.mul(y, &x_inv));
        let x3 = f.add(&f.add(&f.square(&lambda), &lambda), &self.a);
        let y3 = f.add(&f.square(x), &f.mul(&f.add(&lambda, &f.one()), &x3));
        self.point(x3, y3)
    }

    fn add(&self, p: &EcF2mPoint, q: &EcF2mPoint) -> EcF2mPoint {
        let (Some((x1, y1)), Some((x2, y2))) = (&p.coords, &q.coords) else {
            return if p.is_infinity() { q.clone() } else { p.clone() };
        };
        let f = &self.field;
        if x1 == x2 {
            return if y1 == y2 {
                self.double(p)
            } else {
                self.infinity()
            };
        }
        let dx = f.add(x1, x2);
        let Some(dx_inv) = f.inv(&dx) else {
            return self.infinity();
        };
        let lambda = f.mul(&f.add(y1, y2), &dx_inv);
        let x3 = f.add(
            &f.add(&f.add(&f.square(&lambda), &lambda), &dx),
            &self.a,
        );
        let y3 = f.add(&f.add(&f.mul(&lambda, &f.add(x1, &x3)), &x3), y1);
        self.point(x3, y3)
    }

    fn scalar_mul(&self, point: &EcF2mPoint, k: &BigUint) -> EcF2mPoint {
        let mut acc = self.infinity();
        for i in (0..k.bits()).rev() {
            acc = self.double(&acc);
            if k.bit(i) {
                acc = self.add(&acc, point);
            }
        }
        acc
    }
}

impl DlogGroup for EcF2mGroup {
    type Element = EcF2mPoint;

    fn name(&self) -> &str {
        &self.name
    }

    fn id(&self) -> GroupId {
        self.id
    }

    fn group_type(&self) -> GroupType {
        GroupType::EcF2m
    }

    fn order(&self) -> &BigUint {
        &self.q
    }

    fn generator(&self) -> &EcF2mPoint {
        &self.generator
    }

    fn identity(&self) -> EcF2mPoint {
        self.infinity()
    }

    fn is_identity(&self, element: &EcF2mPoint) -> Result<bool> {
        self.check(element)?;
        Ok(element.is_infinity())
    }

    fn is_member(&self, element: &EcF2mPoint) -> Result<bool> {
        self.check(element)?;
        let Some((x, y)) = &element.coords else {
            return Ok(true);
        };
        if !self.is_on_curve(x, y) {
            return Ok(false);
        }
        if self.cofactor.is_one() {
            return Ok(true);
        }
        Ok(self.scalar_mul(element, &self.q).is_infinity())
    }

    fn multiply(&self, a: &EcF2mPoint, b: &EcF2mPoint) -> Result<EcF2mPoint> {
        self.check(a)?;
        self.check(b)?;
        Ok(self.add(a, b))
    }

    fn exponentiate(&self, base: &EcF2mPoint, exponent: &BigUint) -> Result<EcF2mPoint> {
        self.check(base)?;
        Ok(self.scalar_mul(base, exponent))
    }

    fn invert(&self, element: &EcF2mPoint) -> Result<EcF2mPoint> {
        self.check(element)?;
        Ok(match &element.coords {
            None => self.infinity(),
            Some((x, y)) => self.point(x.clone(), self.field.add(x, y)),
        })
    }

    fn encode_element(&self, element: &EcF2mPoint, compressed: bool) -> Result<Vec<u8>> {
        self.check(element)?;
        let Some((x, y)) = &element.coords else {
            return Ok(vec![TAG_INFINITY]);
        };
        let f = &self.field;
        let mut out = Vec::with_capacity(1 + 2 * f.byte_len());
        if compressed {
            if f.degree() % 2 == 0 {
                return Err(Error::InvalidInput(format!(
                    "{}: point compression needs an odd field degree",
                    self.name
                )));
            }
            let odd = match f.inv(x) {
                Some(x_inv) => f.mul(y, &x_inv).bit(0),
                None => false,
            };
            out.push(if odd { TAG_COMPRESSED_ODD } else { TAG_COMPRESSED_EVEN });
            out.extend(f.to_be_bytes(x));
        } else {
            out.push(TAG_UNCOMPRESSED);
            out.extend(f.to_be_bytes(x));
            out.extend(f.to_be_bytes(y));
        }
        Ok(out)
    }

    fn element_byte_len(&self, compressed: bool) -> usize {
        let len = self.field.byte_len();
        if compressed {
            1 + len
        } else {
            1 + 2 * len
        }
    }

    fn reconstruct_element(&self, bytes: &[u8], compressed: bool) -> Result<EcF2mPoint> {
        let f = &self.field;
        let len = f.byte_len();
        let malformed = |what: &str| Error::Deserialization(format!("{}: {what}", self.name));
        match (bytes.first().copied(), compressed) {
            (Some(TAG_INFINITY), _) if bytes.len() == 1 => Ok(self.infinity()),
            (Some(tag @ (TAG_COMPRESSED_EVEN | TAG_COMPRESSED_ODD)), true)
                if bytes.len() == 1 + len =>
            {
                if f.degree() % 2 == 0 {
                    return Err(malformed("point compression needs an odd field degree"));
                }
                let x = f
                    .from_be_bytes(&bytes[1..])
                    .ok_or_else(|| malformed("x is not a field element"))?;
                let Some(x_inv) = f.inv(&x) else {
                    return Ok(self.point(x, f.sqrt(&self.b)));
                };
                // z^2 + z = x + a + b / x^2, then y = x z
                let beta = f.add(&f.add(&x, &self.a), &f.mul(&self.b, &f.square(&x_inv)));
                if f.trace(&beta) {
                    return Err(malformed("x is not on the curve"));
                }
                let mut z = f.half_trace(&beta);
                if z.bit(0) != (tag == TAG_COMPRESSED_ODD) {
                    z = f.add(&z, &f.one());
                }
                let y = f.mul(&x, &z);
                Ok(self.point(x, y))
            }
            (Some(TAG_UNCOMPRESSED), false) if bytes.len() == 1 + 2 * len => {
                let x = f
                    .from_be_bytes(&bytes[1..1 + len])
                    .ok_or_else(|| malformed("x is not a field element"))?;
                let y = f
                    .from_be_bytes(&bytes[1 + len..])
                    .ok_or_else(|| malformed("y is not a field element"))?;
                Ok(self.point(x, y))
            }
            _ => Err(malformed(&format!(
                "malformed {} point encoding of {} bytes",
                if compressed { "compressed" } else { "uncompressed" },
                bytes.len()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_curve() -> EcF2mGroup {
        EcF2mGroup::new(EcF2mParams {
            name: "toy-f2-11".to_string(),
            m: 11,
            terms: vec![2, 0],
            a: BigUint::one(),
            b: BigUint::one(),
            gx: BigUint::from(0x742u32),
            gy: BigUint::from(0x52u32),
            q: BigUint::from(991u32),
            cofactor: BigUint::from(2u32),
        })
        .unwrap()
    }

    #[test]
    fn point_of_order_two_is_not_member() {
        let curve = toy_curve();
        let order_two = curve
            .point_unchecked(&BigUint::zero(), &BigUint::one())
            .unwrap();
        assert!(!curve.is_member(&order_two).unwrap());
        assert!(curve.double(&order_two).is_infinity());
    }

    #[test]
    fn outsider_on_curve_is_not_member() {
        let curve = toy_curve();
        let outsider = curve
            .point_unchecked(&BigUint::from(0x6u32), &BigUint::from(0x521u32))
            .unwrap();
        let (x, y) = outsider.coords.clone().unwrap();
        assert!(curve.is_on_curve(&x, &y));
        assert!(!curve.is_member(&outsider).unwrap());
    }

    #[test]
    fn compressed_round_trip_over_subgroup() {
        let curve = toy_curve();
        let mut point = curve.generator().clone();
        for _ in 0..50 {
            let bytes = curve.encode_element(&point, true).unwrap();
            assert_eq!(curve.reconstruct_element(&bytes, true).unwrap(), point);
            point = curve.multiply(&point, curve.generator()).unwrap();
        }
    }

    #[test]
    fn koblitz_generator_has_declared_order() {
        let curve = EcF2mGroup::named("K-163").unwrap();
        let g = curve.generator();
        assert!(curve.exponentiate(g, curve.order()).unwrap().is_infinity());
        let bytes = curve.encode_element(g, true).unwrap();
        assert_eq!(bytes.len(), 22);
        assert_eq!(&curve.reconstruct_element(&bytes, true).unwrap(), g);
    }

    #[test]
    fn singular_curve_is_rejected() {
        let result = EcF2mGroup::new(EcF2mParams {
            name: "singular".to_string(),
            m: 11,
            terms: vec![2, 0],
            a: BigUint::one(),
            b: BigUint::zero(),
            gx: BigUint::from(0x742u32),
            gy: BigUint::from(0x52u32),
            q: BigUint::from(991u32),
            cofactor: BigUint::from(2u32),
        });
        assert!(result.is_err());
    }
}
