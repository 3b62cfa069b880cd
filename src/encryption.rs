//! ElGamal and Cramer-Shoup value objects over any [`DlogGroup`].
//!
//! Keys and ciphertexts are generic over the element type so they stay
//! plain data; every operation takes the group explicitly.

use num_bigint::BigUint;
use rand_core::CryptoRngCore;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::crypto::DlogGroup;
use crate::wire::encode_element;
use crate::{Error, Result, Role};

/// ElGamal public key `h = g^k`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElGamalPublicKey<E> {
    pub h: E,
}

/// ElGamal ciphertext `(c1, c2) = (g^r, h^r * x)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElGamalCiphertext<E> {
    pub c1: E,
    pub c2: E,
}

/// ElGamal key pair. The private key is an exponent in `[1, q)`.
#[derive(Clone, Debug)]
pub struct ElGamalKeyPair<E> {
    pub public_key: ElGamalPublicKey<E>,
    private_key: BigUint,
}

impl<E: Clone> ElGamalKeyPair<E> {
    pub fn generate<G, R>(group: &G, rng: &mut R) -> Result<Self>
    where
        G: DlogGroup<Element = E>,
        R: CryptoRngCore + ?Sized,
    {
        let private_key = group.random_nonzero_exponent(rng);
        let h = group.exponentiate_generator(&private_key)?;
        Ok(Self {
            public_key: ElGamalPublicKey { h },
            private_key,
        })
    }

    pub fn private_key(&self) -> &BigUint {
        &self.private_key
    }

    /// Recovers `x = c2 / c1^k`.
    pub fn decrypt<G>(&self, group: &G, ciphertext: &ElGamalCiphertext<E>) -> Result<E>
    where
        G: DlogGroup<Element = E>,
    {
        let shared = group.exponentiate_secret(&ciphertext.c1, &self.private_key)?;
        group.divide(&ciphertext.c2, &shared)
    }
}

impl<E: Clone> ElGamalPublicKey<E> {
    /// Encrypts the group element `x`, returning the ciphertext and the
    /// randomness `r` used.
    pub fn encrypt<G, R>(
        &self,
        group: &G,
        x: &E,
        rng: &mut R,
    ) -> Result<(ElGamalCiphertext<E>, BigUint)>
    where
        G: DlogGroup<Element = E>,
        R: CryptoRngCore + ?Sized,
    {
        let r = group.random_exponent(rng);
        let c1 = group.exponentiate_generator(&r)?;
        let shared = group.exponentiate_secret(&self.h, &r)?;
        let c2 = group.multiply(&shared, x)?;
        Ok((ElGamalCiphertext { c1, c2 }, r))
    }
}

/// Cramer-Shoup public key over generators `g1`, `g2`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CramerShoupPublicKey<E> {
    pub g1: E,
    pub g2: E,
    pub c: E,
    pub d: E,
    pub h: E,
}

/// Cramer-Shoup ciphertext `(u1, u2, e, v)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CramerShoupCiphertext<E> {
    pub u1: E,
    pub u2: E,
    pub e: E,
    pub v: E,
}

#[derive(Clone, Debug)]
struct CramerShoupPrivateKey {
    x1: BigUint,
    x2: BigUint,
    y1: BigUint,
    y2: BigUint,
    z: BigUint,
}

/// Cramer-Shoup key pair.
#[derive(Clone, Debug)]
pub struct CramerShoupKeyPair<E> {
    pub public_key: CramerShoupPublicKey<E>,
    private_key: CramerShoupPrivateKey,
}

impl<E: Clone> CramerShoupKeyPair<E> {
    /// Generates keys with `g1` the group generator and `g2` a random member.
    pub fn generate<G, R>(group: &G, rng: &mut R) -> Result<Self>
    where
        G: DlogGroup<Element = E>,
        R: CryptoRngCore + ?Sized,
    {
        let g1 = group.generator().clone();
        let g2 = group.exponentiate_generator(&group.random_nonzero_exponent(rng))?;
        let private_key = CramerShoupPrivateKey {
            x1: group.random_exponent(rng),
            x2: group.random_exponent(rng),
            y1: group.random_exponent(rng),
            y2: group.random_exponent(rng),
            z: group.random_exponent(rng),
        };
        let pair = |a: &BigUint, b: &BigUint| -> Result<E> {
            group.multiply(
                &group.exponentiate_secret(&g1, a)?,
                &group.exponentiate_secret(&g2, b)?,
            )
        };
        let c = pair(&private_key.x1, &private_key.x2)?;
        let d = pair(&private_key.y1, &private_key.y2)?;
        let h = group.exponentiate_secret(&g1, &private_key.z)?;
        Ok(Self {
            public_key: CramerShoupPublicKey { g1, g2, c, d, h },
            private_key,
        })
    }

    /// Checks `v` and recovers `x = e / u1^z`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CheatAttempt`] blaming the sender if `v` does not
    /// match, which means the ciphertext was not honestly generated.
    pub fn decrypt<G>(&self, group: &G, ciphertext: &CramerShoupCiphertext<E>) -> Result<E>
    where
        G: DlogGroup<Element = E>,
        E: PartialEq,
    {
        let sk = &self.private_key;
        let alpha = cramer_shoup_alpha(group, ciphertext)?;
        let y1_alpha = (&sk.y1 * &alpha) % group.order();
        let y2_alpha = (&sk.y2 * &alpha) % group.order();
        let first_exponent = (&sk.x1 + y1_alpha) % group.order();
        let first = group.exponentiate_secret(&ciphertext.u1, &first_exponent)?;
        let second =
            group.exponentiate_secret(&ciphertext.u2, &((&sk.x2 + y2_alpha) % group.order()))?;
        if group.multiply(&first, &second)? != ciphertext.v {
            warn!(role = %Role::Sender, "Cramer-Shoup ciphertext failed validation");
            return Err(Error::cheat(Role::Sender, "ciphertext check value v is invalid"));
        }
        let shared = group.exponentiate_secret(&ciphertext.u1, &sk.z)?;
        group.divide(&ciphertext.e, &shared)
    }
}

impl<E: Clone> CramerShoupPublicKey<E> {
    /// Encrypts the group element `x`, returning the ciphertext and `r`.
    pub fn encrypt<G, R>(
        &self,
        group: &G,
        x: &E,
        rng: &mut R,
    ) -> Result<(CramerShoupCiphertext<E>, BigUint)>
    where
        G: DlogGroup<Element = E>,
        R: CryptoRngCore + ?Sized,
    {
        let r = group.random_nonzero_exponent(rng);
        let u1 = group.exponentiate_secret(&self.g1, &r)?;
        let u2 = group.exponentiate_secret(&self.g2, &r)?;
        let e = group.multiply(&group.exponentiate_secret(&self.h, &r)?, x)?;
        let mut ciphertext = CramerShoupCiphertext {
            u1,
            u2,
            e,
            v: group.identity(),
        };
        let alpha = cramer_shoup_alpha(group, &ciphertext)?;
        ciphertext.v = group.exponentiate_secret(&self.validation_base(group, &alpha)?, &r)?;
        Ok((ciphertext, r))
    }

    /// `c * d^alpha`, the base of the check value `v`.
    pub fn validation_base<G>(&self, group: &G, alpha: &BigUint) -> Result<E>
    where
        G: DlogGroup<Element = E>,
    {
        group.multiply(&self.c, &group.exponentiate(&self.d, alpha)?)
    }
}

/// `alpha = SHA-256(u1 || u2 || e) mod q`, each element length-prefixed.
pub fn cramer_shoup_alpha<G: DlogGroup>(
    group: &G,
    ciphertext: &CramerShoupCiphertext<G::Element>,
) -> Result<BigUint> {
    let mut hasher = Sha256::new();
    for element in [&ciphertext.u1, &ciphertext.u2, &ciphertext.e] {
        let bytes = encode_element(group, element)?;
        hasher.update((bytes.len() as u32).to_be_bytes());
        hasher.update(&bytes);
    }
    Ok(BigUint::from_bytes_be(&hasher.finalize()) % group.order())
}
