//! Arithmetic in binary extension fields GF(2^m).
//!
//! Elements are polynomials over GF(2) stored as little-endian 64-bit limbs
//! and kept reduced modulo the field polynomial `f(x) = x^m + ...`.

use num_bigint::BigUint;

use crate::{Error, Result};

/// An element of GF(2^m). Bit `i` is the coefficient of `x^i`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Gf2mElement(Vec<u64>);

impl Gf2mElement {
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&limb| limb == 0)
    }

    pub fn is_one(&self) -> bool {
        self.0.first() == Some(&1) && self.0.iter().skip(1).all(|&limb| limb == 0)
    }

    /// Coefficient of `x^i`.
    pub fn bit(&self, i: usize) -> bool {
        get_bit(&self.0, i)
    }

    pub fn to_biguint(&self) -> BigUint {
        let bytes: Vec<u8> = self.0.iter().flat_map(|limb| limb.to_le_bytes()).collect();
        BigUint::from_bytes_le(&bytes)
    }
}

/// The field GF(2)[x] / f(x).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryField {
    m: usize,
    /// Exponents of `f` strictly below `m`, in descending order.
    low_terms: Vec<usize>,
    limbs: usize,
}

impl BinaryField {
    /// Builds GF(2^m) from the exponents of a trinomial or pentanomial.
    ///
    /// `terms` lists the exponents of `f` other than `m`; `0` must be among
    /// them for `f` to be irreducible.
    pub fn new(m: usize, terms: &[usize]) -> Result<Self> {
        if m < 2 {
            return Err(Error::InvalidParams(format!("field degree {m} is too small")));
        }
        if !terms.contains(&0) {
            return Err(Error::InvalidParams(
                "field polynomial must have a constant term".to_string(),
            ));
        }
        if terms.iter().any(|&t| t >= m) {
            return Err(Error::InvalidParams(
                "field polynomial terms must be below the degree".to_string(),
            ));
        }
        let mut low_terms = terms.to_vec();
        low_terms.sort_unstable_by(|a, b| b.cmp(a));
        low_terms.dedup();
        Ok(Self {
            m,
            low_terms,
            limbs: m.div_ceil(64),
        })
    }

    /// Field degree `m`.
    pub fn degree(&self) -> usize {
        self.m
    }

    /// Exponents of the reduction polynomial below `m`.
    pub fn terms(&self) -> &[usize] {
        &self.low_terms
    }

    /// Bytes needed for a fixed-length encoding of a field element.
    pub fn byte_len(&self) -> usize {
        self.m.div_ceil(8)
    }

    pub fn zero(&self) -> Gf2mElement {
        Gf2mElement(vec![0; self.limbs])
    }

    pub fn one(&self) -> Gf2mElement {
        let mut limbs = vec![0; self.limbs];
        limbs[0] = 1;
        Gf2mElement(limbs)
    }

    /// Interprets big-endian bytes as a polynomial.
    ///
    /// Returns `None` if the polynomial has degree `m` or higher, i.e. it is
    /// not a canonical field element.
    pub fn from_be_bytes(&self, bytes: &[u8]) -> Option<Gf2mElement> {
        let mut limbs = vec![0u64; self.limbs.max(bytes.len().div_ceil(8))];
        for (i, byte) in bytes.iter().rev().enumerate() {
            limbs[i / 8] |= u64::from(*byte) << (8 * (i % 8));
        }
        if degree(&limbs).is_some_and(|d| d >= self.m) {
            return None;
        }
        limbs.truncate(self.limbs);
        Some(Gf2mElement(limbs))
    }

    /// Converts an integer whose bits are the polynomial coefficients.
    pub fn from_biguint(&self, value: &BigUint) -> Option<Gf2mElement> {
        self.from_be_bytes(&value.to_bytes_be())
    }

    /// Fixed-length big-endian encoding.
    pub fn to_be_bytes(&self, element: &Gf2mElement) -> Vec<u8> {
        let len = self.byte_len();
        let le: Vec<u8> = element.0.iter().flat_map(|limb| limb.to_le_bytes()).collect();
        le.into_iter().take(len).rev().collect()
    }

    pub fn add(&self, a: &Gf2mElement, b: &Gf2mElement) -> Gf2mElement {
        Gf2mElement(a.0.iter().zip(&b.0).map(|(x, y)| x ^ y).collect())
    }

    pub fn mul(&self, a: &Gf2mElement, b: &Gf2mElement) -> Gf2mElement {
        let mut product = vec![0u64; 2 * self.limbs];
        for (i, &x) in a.0.iter().enumerate() {
            if x == 0 {
                continue;
            }
            for (j, &y) in b.0.iter().enumerate() {
                let (lo, hi) = clmul(x, y);
                product[i + j] ^= lo;
                product[i + j + 1] ^= hi;
            }
        }
        self.reduce(product)
    }

    pub fn square(&self, a: &Gf2mElement) -> Gf2mElement {
        self.mul(a, a)
    }

    /// Multiplicative inverse by the binary extended Euclidean algorithm.
    ///
    /// Returns `None` for zero.
    pub fn inv(&self, a: &Gf2mElement) -> Option<Gf2mElement> {
        if a.is_zero() {
            return None;
        }
        let width = self.limbs + 1;
        let mut u = a.0.clone();
        u.resize(width, 0);
        let mut v = self.modulus_limbs(width);
        let mut g1 = vec![0u64; width];
        g1[0] = 1;
        let mut g2 = vec![0u64; width];

        loop {
            let du = degree(&u)?;
            if du == 0 {
                break;
            }
            let dv = degree(&v)?;
            if du < dv {
                core::mem::swap(&mut u, &mut v);
                core::mem::swap(&mut g1, &mut g2);
                continue;
            }
            let shift = du - dv;
            xor_shifted(&mut u, &v, shift);
            xor_shifted(&mut g1, &g2, shift);
        }
        Some(self.reduce(g1))
    }

    /// Square root, `a^(2^(m-1))`.
    pub fn sqrt(&self, a: &Gf2mElement) -> Gf2mElement {
        let mut r = a.clone();
        for _ in 1..self.m {
            r = self.square(&r);
        }
        r
    }

    /// Absolute trace `Tr(a) = a + a^2 + ... + a^(2^(m-1))`, zero or one.
    pub fn trace(&self, a: &Gf2mElement) -> bool {
        let mut t = a.clone();
        let mut sum = a.clone();
        for _ in 1..self.m {
            t = self.square(&t);
            sum = self.add(&sum, &t);
        }
        sum.is_one()
    }

    /// Half-trace, a solution `z` of `z^2 + z = a` when `m` is odd and
    /// `Tr(a) = 0`.
    pub fn half_trace(&self, a: &Gf2mElement) -> Gf2mElement {
        let mut t = a.clone();
        let mut sum = a.clone();
        for _ in 0..(self.m - 1) / 2 {
            t = self.square(&self.square(&t));
            sum = self.add(&sum, &t);
        }
        sum
    }

    fn modulus_limbs(&self, width: usize) -> Vec<u64> {
        let mut f = vec![0u64; width];
        set_bit(&mut f, self.m);
        for &t in &self.low_terms {
            set_bit(&mut f, t);
        }
        f
    }

    fn reduce(&self, mut value: Vec<u64>) -> Gf2mElement {
        if let Some(top) = degree(&value) {
            for d in (self.m..=top).rev() {
                if get_bit(&value, d) {
                    flip_bit(&mut value, d);
                    for &t in &self.low_terms {
                        flip_bit(&mut value, d - self.m + t);
                    }
                }
            }
        }
        value.resize(self.limbs, 0);
        Gf2mElement(value)
    }
}

/// Carry-less 64x64 multiplication, returning the low and high words.
fn clmul(a: u64, b: u64) -> (u64, u64) {
    let mut lo = 0u64;
    let mut hi = 0u64;
    for i in 0..64 {
        if (b >> i) & 1 == 1 {
            lo ^= a << i;
            if i > 0 {
                hi ^= a >> (64 - i);
            }
        }
    }
    (lo, hi)
}

fn degree(limbs: &[u64]) -> Option<usize> {
    limbs
        .iter()
        .enumerate()
        .rev()
        .find(|(_, &limb)| limb != 0)
        .map(|(i, limb)| 64 * i + 63 - limb.leading_zeros() as usize)
}

fn get_bit(limbs: &[u64], i: usize) -> bool {
    limbs.get(i / 64).is_some_and(|limb| (limb >> (i % 64)) & 1 == 1)
}

fn set_bit(limbs: &mut [u64], i: usize) {
    limbs[i / 64] |= 1 << (i % 64);
}

fn flip_bit(limbs: &mut [u64], i: usize) {
    limbs[i / 64] ^= 1 << (i % 64);
}

/// `dst ^= src << shift`, dropping bits past the end of `dst`.
fn xor_shifted(dst: &mut [u64], src: &[u64], shift: usize) {
    let limb_shift = shift / 64;
    let bit_shift = shift % 64;
    for (i, &word) in src.iter().enumerate() {
        if word == 0 {
            continue;
        }
        let at = i + limb_shift;
        if at < dst.len() {
            dst[at] ^= word << bit_shift;
        }
        if bit_shift > 0 && at + 1 < dst.len() {
            dst[at + 1] ^= word >> (64 - bit_shift);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_field() -> BinaryField {
        BinaryField::new(11, &[2, 0]).unwrap()
    }

    fn element(field: &BinaryField, value: u64) -> Gf2mElement {
        field.from_biguint(&BigUint::from(value)).unwrap()
    }

    #[test]
    fn multiplication_reduces() {
        let field = toy_field();
        // x^10 * x = x^11 = x^2 + 1
        let a = element(&field, 1 << 10);
        let b = element(&field, 0b10);
        assert_eq!(field.mul(&a, &b), element(&field, 0b101));
    }

    #[test]
    fn inverse_of_every_nonzero_element() {
        let field = toy_field();
        for value in 1..(1u64 << 11) {
            let a = element(&field, value);
            let inv = field.inv(&a).unwrap();
            assert!(field.mul(&a, &inv).is_one(), "inverse failed for {value}");
        }
        assert!(field.inv(&field.zero()).is_none());
    }

    #[test]
    fn sqrt_inverts_square() {
        let field = toy_field();
        for value in [1u64, 2, 3, 0x742, 0x52, 0x7ff] {
            let a = element(&field, value);
            assert_eq!(field.sqrt(&field.square(&a)), a);
        }
    }

    #[test]
    fn half_trace_solves_quadratic() {
        let field = toy_field();
        for value in 1..512u64 {
            let a = element(&field, value);
            if field.trace(&a) {
                continue;
            }
            let z = field.half_trace(&a);
            assert_eq!(field.add(&field.square(&z), &z), a);
        }
    }

    #[test]
    fn byte_encoding_rejects_high_degree() {
        let field = toy_field();
        assert!(field.from_be_bytes(&[0x08, 0x00]).is_none());
        let a = field.from_be_bytes(&[0x07, 0x42]).unwrap();
        assert_eq!(field.to_be_bytes(&a), vec![0x07, 0x42]);
    }

    #[test]
    fn large_field_inverse() {
        let field = BinaryField::new(163, &[7, 6, 3, 0]).unwrap();
        let value = BigUint::parse_bytes(b"02FE13C0537BBC11ACAA07D793DE4E6D5E5C94EEE8", 16).unwrap();
        let a = field.from_biguint(&value).unwrap();
        let inv = field.inv(&a).unwrap();
        assert!(field.mul(&a, &inv).is_one());
    }
}
