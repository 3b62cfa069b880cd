//! Elliptic curves `y^2 = x^3 + ax + b` over GF(p), software backend.
//!
//! Points are stored in affine form; arithmetic runs in Jacobian
//! coordinates so a scalar multiplication needs a single field inversion.

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::crypto::field::{is_probable_prime, to_be_padded, PrimeField, PRIMALITY_ROUNDS};
use crate::crypto::group::ensure_same_group;
use crate::crypto::{DlogGroup, GroupId, GroupType, SecureRng};
use crate::params::{BuiltinParameters, EcFpParams, ParameterSource};
use crate::{Error, Result};

const TAG_INFINITY: u8 = 0x00;
const TAG_COMPRESSED_EVEN: u8 = 0x02;
const TAG_COMPRESSED_ODD: u8 = 0x03;
const TAG_UNCOMPRESSED: u8 = 0x04;

/// Affine point on a prime-field curve; `None` is the point at infinity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EcFpPoint {
    group: GroupId,
    coords: Option<(BigUint, BigUint)>,
}

impl EcFpPoint {
    pub fn is_infinity(&self) -> bool {
        self.coords.is_none()
    }

    /// Affine coordinates, `None` at infinity.
    pub fn coordinates(&self) -> Option<(&BigUint, &BigUint)> {
        self.coords.as_ref().map(|(x, y)| (x, y))
    }
}

#[derive(Clone, Debug)]
struct Jacobian {
    x: BigUint,
    y: BigUint,
    z: BigUint,
}

impl Jacobian {
    fn infinity() -> Self {
        Self {
            x: BigUint::one(),
            y: BigUint::one(),
            z: BigUint::zero(),
        }
    }

    fn is_infinity(&self) -> bool {
        self.z.is_zero()
    }
}

/// Curve over a prime field with a prime-order base point.
#[derive(Debug)]
pub struct EcFpGroup {
    name: String,
    field: PrimeField,
    a: BigUint,
    b: BigUint,
    q: BigUint,
    cofactor: BigUint,
    generator: EcFpPoint,
    id: GroupId,
}

impl EcFpGroup {
    /// Builds a curve from caller-supplied parameters with full validation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParams`] if the curve is singular, the base
    /// point is not on it, or its order is not the declared prime.
    pub fn new(params: EcFpParams) -> Result<Self> {
        Self::build(params, true)
    }

    /// Builds a named curve from the built-in registry.
    pub fn named(name: &str) -> Result<Self> {
        Self::build(BuiltinParameters.ec_fp(name)?, false)
    }

    /// Builds a named curve from any parameter source, with full validation.
    pub fn from_source(source: &impl ParameterSource, name: &str) -> Result<Self> {
        Self::new(source.ec_fp(name)?)
    }

    fn build(params: EcFpParams, check_primality: bool) -> Result<Self> {
        let EcFpParams {
            name,
            p,
            a,
            b,
            gx,
            gy,
            q,
            cofactor,
        } = params;

        if p <= BigUint::from(3u32) || a >= p || b >= p || gx >= p || gy >= p {
            return Err(Error::InvalidParams(format!(
                "{name}: coefficients and coordinates must be reduced mod p"
            )));
        }
        if cofactor.is_zero() {
            return Err(Error::InvalidParams(format!("{name}: cofactor cannot be zero")));
        }
        if check_primality {
            let mut rng = SecureRng::new();
            if !is_probable_prime(&p, PRIMALITY_ROUNDS, &mut rng) {
                return Err(Error::InvalidParams(format!("{name}: p is not prime")));
            }
            if !is_probable_prime(&q, PRIMALITY_ROUNDS, &mut rng) {
                return Err(Error::InvalidParams(format!("{name}: order is not prime")));
            }
        }

        let field = PrimeField::new(p);
        let a3 = field.mul(&field.square(&a), &a);
        let b2 = field.square(&b);
        let discriminant = field.add(&field.mul_small(&a3, 4), &field.mul_small(&b2, 27));
        if discriminant.is_zero() {
            return Err(Error::InvalidParams(format!("{name}: curve is singular")));
        }

        let id = GroupId::derive(
            "ec-fp",
            &[
                &field.modulus().to_bytes_be(),
                &a.to_bytes_be(),
                &b.to_bytes_be(),
                &gx.to_bytes_be(),
                &gy.to_bytes_be(),
                &q.to_bytes_be(),
            ],
        );
        let group = Self {
            name,
            field,
            a,
            b,
            q,
            cofactor,
            generator: EcFpPoint {
                group: id,
                coords: Some((gx, gy)),
            },
            id,
        };
        group.validate()?;
        Ok(group)
    }

    /// Wraps affine coordinates as a point of this curve WITHOUT checking
    /// that they satisfy the curve equation.
    pub fn point_unchecked(&self, x: BigUint, y: BigUint) -> EcFpPoint {
        EcFpPoint {
            group: self.id,
            coords: Some((x, y)),
        }
    }

    /// Field modulus `p`.
    pub fn modulus(&self) -> &BigUint {
        self.field.modulus()
    }

    /// The cofactor `#E / q`.
    pub fn cofactor(&self) -> &BigUint {
        &self.cofactor
    }

    fn check(&self, point: &EcFpPoint) -> Result<()> {
        ensure_same_group(self.id, point.group, &self.name)
    }

    fn infinity(&self) -> EcFpPoint {
        EcFpPoint {
            group: self.id,
            coords: None,
        }
    }

    fn curve_rhs(&self, x: &BigUint) -> BigUint {
        let f = &self.field;
        let x3 = f.mul(&f.square(x), x);
        f.add(&f.add(&x3, &f.mul(&self.a, x)), &self.b)
    }

    fn is_on_curve(&self, x: &BigUint, y: &BigUint) -> bool {
        self.field.contains(x)
            && self.field.contains(y)
            && self.field.square(y) == self.curve_rhs(x)
    }

    fn to_jacobian(&self, point: &EcFpPoint) -> Jacobian {
        match &point.coords {
            None => Jacobian::infinity(),
            Some((x, y)) => Jacobian {
                x: self.field.reduce(x),
                y: self.field.reduce(y),
                z: BigUint::one(),
            },
        }
    }

    fn to_affine(&self, point: &Jacobian) -> EcFpPoint {
        if point.is_infinity() {
            return self.infinity();
        }
        let f = &self.field;
        let Some(z_inv) = f.inv(&point.z) else {
            return self.infinity();
        };
        let z_inv2 = f.square(&z_inv);
        let z_inv3 = f.mul(&z_inv2, &z_inv);
        EcFpPoint {
            group: self.id,
            coords: Some((f.mul(&point.x, &z_inv2), f.mul(&point.y, &z_inv3))),
        }
    }

    fn double(&self, p: &Jacobian) -> Jacobian {
        if p.is_infinity() || p.y.is_zero() {
            return Jacobian::infinity();
        }
        let f = &self.field;
        let xx = f.square(&p.x);
        let yy = f.square(&p.y);
        let yyyy = f.square(&yy);
        let zz = f.square(&p.z);
        let s = f.mul_small(&f.mul(&p.x, &yy), 4);
        let m = f.add(&f.mul_small(&xx, 3), &f.mul(&self.a, &f.square(&zz)));
        let x3 = f.sub(&f.square(&m), &f.add(&s, &s));
        let y3 = f.sub(&f.mul(&m, &f.sub(&s, &x3)), &f.mul_small(&yyyy, 8));
        let z3 = f.mul_small(&f.mul(&p.y, &p.z), 2);
        Jacobian {
            x: x3,
            y: y3,
            z: z3,
        }
    }

    fn add(&self, p: &Jacobian, q: &Jacobian) -> Jacobian {
        if p.is_infinity() {
            return q.clone();
        }
        if q.is_infinity() {
            return p.clone();
        }
        let f = &self.field;
        let z1z1 = f.square(&p.z);
        let z2z2 = f.square(&q.z);
        let u1 = f.mul(&p.x, &z2z2);
        let u2 = f.mul(&q.x, &z1z1);
        let s1 = f.mul(&f.mul(&p.y, &q.z), &z2z2);
        let s2 = f.mul(&f.mul(&q.y, &p.z), &z1z1);
        if u1 == u2 {
            return if s1 == s2 {
                self.double(p)
            } else {
                Jacobian::infinity()
            };
        }
        let h = f.sub(&u2, &u1);
        let r = f.sub(&s2, &s1);
        let hh = f.square(&h);
        let hhh = f.mul(&h, &hh);
        let v = f.mul(&u1, &hh);
        let x3 = f.sub(&f.sub(&f.square(&r), &hhh), &f.add(&v, &v));
        let y3 = f.sub(&f.mul(&r, &f.sub(&v, &x3)), &f.mul(&s1, &hhh));
        let z3 = f.mul(&f.mul(&p.z, &q.z), &h);
        Jacobian {
            x: x3,
            y: y3,
            z: z3,
        }
    }

    fn scalar_mul(&self, point: &Jacobian, k: &BigUint) -> Jacobian {
        let mut acc = Jacobian::infinity();
        for i in (0..k.bits()).rev() {
            acc = self.double(&acc);
            if k.bit(i) {
                acc = self.add(&acc, point);
            }
        }
        acc
    }

    /// Montgomery ladder: one addition and one doubling per bit of `q`.
    fn ladder(&self, point: &Jacobian, k: &BigUint) -> Jacobian {
        let mut r0 = Jacobian::infinity();
        let mut r1 = point.clone();
        for i in (0..self.q.bits()).rev() {
            if k.bit(i) {
                r0 = self.add(&r0, &r1);
                r1 = self.double(&r1);
            } else {
                r1 = self.add(&r0, &r1);
                r0 = self.double(&r0);
            }
        }
        r0
    }
}

impl DlogGroup for EcFpGroup {
    type Element = EcFpPoint;

    fn name(&self) -> &str {
        &self.name
    }

    fn id(&self) -> GroupId {
        self.id
    }

    fn group_type(&self) -> GroupType {
        GroupType::EcFp
    }

    fn order(&self) -> &BigUint {
        &self.q
    }

    fn generator(&self) -> &EcFpPoint {
        &self.generator
    }

    fn identity(&self) -> EcFpPoint {
        self.infinity()
    }

    fn is_identity(&self, element: &EcFpPoint) -> Result<bool> {
        self.check(element)?;
        Ok(element.is_infinity())
    }

    fn is_member(&self, element: &EcFpPoint) -> Result<bool> {
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
        let multiple = self.scalar_mul(&self.to_jacobian(element), &self.q);
        Ok(multiple.is_infinity())
    }

    fn multiply(&self, a: &EcFpPoint, b: &EcFpPoint) -> Result<EcFpPoint> {
        self.check(a)?;
        self.check(b)?;
        if a.is_infinity() {
            return Ok(b.clone());
        }
        if b.is_infinity() {
            return Ok(a.clone());
        }
        let sum = self.add(&self.to_jacobian(a), &self.to_jacobian(b));
        Ok(self.to_affine(&sum))
    }

    fn exponentiate(&self, base: &EcFpPoint, exponent: &BigUint) -> Result<EcFpPoint> {
        self.check(base)?;
        if base.is_infinity() || exponent.is_zero() {
            return Ok(self.infinity());
        }
        let product = self.scalar_mul(&self.to_jacobian(base), exponent);
        Ok(self.to_affine(&product))
    }

    fn exponentiate_secret(&self, base: &EcFpPoint, exponent: &BigUint) -> Result<EcFpPoint> {
        self.check(base)?;
        let exponent = exponent % &self.q;
        let product = self.ladder(&self.to_jacobian(base), &exponent);
        Ok(self.to_affine(&product))
    }

    fn invert(&self, element: &EcFpPoint) -> Result<EcFpPoint> {
        self.check(element)?;
        Ok(match &element.coords {
            None => self.infinity(),
            Some((x, y)) => self.point_unchecked(x.clone(), self.field.neg(&self.field.reduce(y))),
        })
    }

    fn encode_element(&self, element: &EcFpPoint, compressed: bool) -> Result<Vec<u8>> {
        self.check(element)?;
        let Some((x, y)) = &element.coords else {
            return Ok(vec![TAG_INFINITY]);
        };
        let len = self.field.byte_len();
        let mut out = Vec::with_capacity(1 + 2 * len);
        if compressed {
            out.push(if self.field.is_odd(y) {
                TAG_COMPRESSED_ODD
            } else {
                TAG_COMPRESSED_EVEN
            });
            out.extend(to_be_padded(x, len)?);
        } else {
            out.push(TAG_UNCOMPRESSED);
            out.extend(to_be_padded(x, len)?);
            out.extend(to_be_padded(y, len)?);
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

    fn reconstruct_element(&self, bytes: &[u8], compressed: bool) -> Result<EcFpPoint> {
        let len = self.field.byte_len();
        match (bytes.first().copied(), compressed) {
            (Some(TAG_INFINITY), _) if bytes.len() == 1 => Ok(self.infinity()),
            (Some(tag @ (TAG_COMPRESSED_EVEN | TAG_COMPRESSED_ODD)), true)
                if bytes.len() == 1 + len =>
            {
                let x = BigUint::from_bytes_be(&bytes[1..]);
                if !self.field.contains(&x) {
                    return Err(Error::Deserialization(format!(
                        "{}: x coordinate is not a field element",
                        self.name
                    )));
                }
                let root = self.field.sqrt(&self.curve_rhs(&x)).ok_or_else(|| {
                    Error::Deserialization(format!("{}: x is not on the curve", self.name))
                })?;
                let want_odd = tag == TAG_COMPRESSED_ODD;
                if want_odd && root.is_zero() {
                    return Err(Error::Deserialization(format!(
                        "{}: y = 0 has no odd encoding",
                        self.name
                    )));
                }
                let y = if self.field.is_odd(&root) == want_odd {
                    root
                } else {
                    self.field.neg(&root)
                };
                Ok(self.point_unchecked(x, y))
            }
            (Some(TAG_UNCOMPRESSED), false) if bytes.len() == 1 + 2 * len => {
                let x = BigUint::from_bytes_be(&bytes[1..1 + len]);
                let y = BigUint::from_bytes_be(&bytes[1 + len..]);
                Ok(self.point_unchecked(x, y))
            }
            _ => Err(Error::Deserialization(format!(
                "{}: malformed {} point encoding of {} bytes",
                self.name,
                if compressed { "compressed" } else { "uncompressed" },
                bytes.len()
            ))),
        }
    }
}
