use crypto_bigint::modular::runtime_mod::{DynResidue, DynResidueParams};
use crypto_bigint::{Integer as _, Uint, Zero as _};
use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand_core::RngCore;

use crate::{Error, Result};

/// Number of Miller-Rabin rounds used when validating group parameters.
pub const PRIMALITY_ROUNDS: usize = 32;

const SMALL_PRIMES: [u32; 15] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47];

/// Performs fixed-width modular exponentiation in Montgomery form.
///
/// Computes `base^exp mod modulus`. The running time depends only on the
/// limb counts, never on the value of `exp`.
///
/// # Errors
///
/// Returns an error if the modulus is zero or even.
pub fn mod_pow<const LIMBS: usize, const EXP_LIMBS: usize>(
    base: &Uint<LIMBS>,
    exp: &Uint<EXP_LIMBS>,
    modulus: &Uint<LIMBS>,
) -> Result<Uint<LIMBS>> {
    if bool::from(modulus.is_zero()) {
        return Err(Error::InvalidParams("modulus cannot be zero".to_string()));
    }
    if !bool::from(modulus.is_odd()) {
        return Err(Error::InvalidParams(
            "modulus must be odd for Montgomery form".to_string(),
        ));
    }

    let params = DynResidueParams::new(modulus);
    Ok(DynResidue::new(base, params).pow(exp).retrieve())
}

/// Encodes `value` as exactly `len` big-endian bytes.
///
/// # Errors
///
/// Returns an error if `value` does not fit in `len` bytes.
pub fn to_be_padded(value: &BigUint, len: usize) -> Result<Vec<u8>> {
    let bytes = value.to_bytes_be();
    if value.is_zero() {
        return Ok(vec![0u8; len]);
    }
    if bytes.len() > len {
        return Err(Error::InvalidInput(format!(
            "value needs {} bytes, only {len} available",
            bytes.len()
        )));
    }
    let mut out = vec![0u8; len - bytes.len()];
    out.extend_from_slice(&bytes);
    Ok(out)
}

/// Miller-Rabin probabilistic primality test with random bases.
pub fn is_probable_prime<R: RngCore + ?Sized>(n: &BigUint, rounds: usize, rng: &mut R) -> bool {
    let two = BigUint::from(2u32);
    if *n < two {
        return false;
    }
    for small in SMALL_PRIMES {
        let small = BigUint::from(small);
        if *n == small {
            return true;
        }
        if (n % &small).is_zero() {
            return false;
        }
    }

    let n_minus_one = n - 1u32;
    let s = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> s;

    'witness: for _ in 0..rounds {
        let a = rng.gen_biguint_range(&two, &n_minus_one);
        let mut x = a.modpow(&d, n);
        if x.is_one() || x == n_minus_one {
            continue;
        }
        for _ in 1..s {
            x = x.modpow(&two, n);
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// The prime field GF(p) over arbitrary-precision integers.
///
/// Operands are expected to be reduced (`< p`); results always are.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrimeField {
    p: BigUint,
}

impl PrimeField {
    /// Wraps an (odd prime) modulus.
    pub fn new(p: BigUint) -> Self {
        Self { p }
    }

    /// The field modulus.
    pub fn modulus(&self) -> &BigUint {
        &self.p
    }

    /// Bytes needed for a fixed-length encoding of a field element.
    pub fn byte_len(&self) -> usize {
        (self.p.bits() as usize).div_ceil(8)
    }

    /// True when `x` is a canonical field element.
    pub fn contains(&self, x: &BigUint) -> bool {
        x < &self.p
    }

    /// Reduces an arbitrary integer into the field.
    pub fn reduce(&self, x: &BigUint) -> BigUint {
        x % &self.p
    }

    pub fn add(&self, a: &BigUint, b: &BigUint) -> BigUint {
        let sum = a + b;
        if sum >= self.p {
            sum - &self.p
        } else {
            sum
        }
    }

    pub fn sub(&self, a: &BigUint, b: &BigUint) -> BigUint {
        if a >= b {
            a - b
        } else {
            &self.p - (b - a)
        }
    }

    pub fn neg(&self, a: &BigUint) -> BigUint {
        if a.is_zero() {
            BigUint::zero()
        } else {
            &self.p - a
        }
    }

    pub fn mul(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a * b) % &self.p
    }

    pub fn square(&self, a: &BigUint) -> BigUint {
        (a * a) % &self.p
    }

    /// Multiplies by a small constant.
    pub fn mul_small(&self, a: &BigUint, k: u32) -> BigUint {
        (a * k) % &self.p
    }

    pub fn pow(&self, a: &BigUint, e: &BigUint) -> BigUint {
        a.modpow(e, &self.p)
    }

    /// Multiplicative inverse, `None` for zero.
    pub fn inv(&self, a: &BigUint) -> Option<BigUint> {
        if a.is_zero() {
            return None;
        }
        a.modinv(&self.p)
    }

    /// Euler's criterion. Zero counts as a square.
    pub fn is_square(&self, a: &BigUint) -> bool {
        if a.is_zero() {
            return true;
        }
        let exp = (&self.p - 1u32) >> 1;
        self.pow(a, &exp).is_one()
    }

    /// Square root by Tonelli-Shanks, with the `p = 3 mod 4` shortcut.
    pub fn sqrt(&self, a: &BigUint) -> Option<BigUint> {
        if a.is_zero() {
            return Some(BigUint::zero());
        }
        if !self.is_square(a) {
            return None;
        }

        let three = BigUint::from(3u32);
        if (&self.p % 4u32) == three {
            let exp = (&self.p + 1u32) >> 2;
            return Some(self.pow(a, &exp));
        }

        let p_minus_one = &self.p - 1u32;
        let s = p_minus_one.trailing_zeros().unwrap_or(0);
        let q = &p_minus_one >> s;

        let mut z = BigUint::from(2u32);
        while self.is_square(&z) {
            z += 1u32;
        }

        let mut m = s;
        let mut c = self.pow(&z, &q);
        let mut t = self.pow(a, &q);
        let mut r = self.pow(a, &((&q + 1u32) >> 1));

        while !t.is_one() {
            let mut i = 0u64;
            let mut t2 = t.clone();
            while !t2.is_one() {
                t2 = self.square(&t2);
                i += 1;
                if i == m {
                    return None;
                }
            }
            let mut b = c.clone();
            for _ in 0..(m - i - 1) {
                b = self.square(&b);
            }
            m = i;
            c = self.square(&b);
            t = self.mul(&t, &c);
            r = self.mul(&r, &b);
        }
        Some(r)
    }

    /// Parity of a field element, used by SEC1 point compression.
    pub fn is_odd(&self, a: &BigUint) -> bool {
        Integer::is_odd(a)
    }
}
