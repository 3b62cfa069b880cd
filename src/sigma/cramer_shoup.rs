use num_bigint::BigUint;
use rand_core::CryptoRngCore;

use super::dh::{DhInput, SigmaDhExtended};
use super::{SigmaNonces, SigmaStatement};
use crate::crypto::DlogGroup;
use crate::encryption::{cramer_shoup_alpha, CramerShoupCiphertext, CramerShoupPublicKey};
use crate::Result;

/// A Cramer-Shoup ciphertext claimed to encrypt `plaintext`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CramerShoupEncryptedValueInput<E> {
    pub public_key: CramerShoupPublicKey<E>,
    pub ciphertext: CramerShoupCiphertext<E>,
    pub plaintext: E,
}

/// Knowledge of the randomness `r` behind a Cramer-Shoup ciphertext of a
/// known plaintext.
///
/// With `alpha = H(u1, u2, e)`, the bases `(g1, g2, h, c * d^alpha)` and the
/// values `(u1, u2, e / x, v)` share the exponent `r`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SigmaCramerShoupEncryptedValue;

impl SigmaCramerShoupEncryptedValue {
    fn dh_input<G: DlogGroup>(
        group: &G,
        input: &CramerShoupEncryptedValueInput<G::Element>,
    ) -> Result<DhInput<G::Element>> {
        let pk = &input.public_key;
        let ct = &input.ciphertext;
        let alpha = cramer_shoup_alpha(group, ct)?;
        DhInput::new(
            vec![
                pk.g1.clone(),
                pk.g2.clone(),
                pk.h.clone(),
                pk.validation_base(group, &alpha)?,
            ],
            vec![
                ct.u1.clone(),
                ct.u2.clone(),
                group.divide(&ct.e, &input.plaintext)?,
                ct.v.clone(),
            ],
        )
    }
}

impl<G: DlogGroup> SigmaStatement<G> for SigmaCramerShoupEncryptedValue {
    type Input = CramerShoupEncryptedValueInput<G::Element>;
    type Witness = BigUint;

    fn name(&self) -> &'static str {
        "cramer-shoup-encrypted-value"
    }

    fn public_elements(&self, _group: &G, input: &Self::Input) -> Result<Vec<G::Element>> {
        let pk = &input.public_key;
        let ct = &input.ciphertext;
        Ok(vec![
            pk.g1.clone(),
            pk.g2.clone(),
            pk.c.clone(),
            pk.d.clone(),
            pk.h.clone(),
            ct.u1.clone(),
            ct.u2.clone(),
            ct.e.clone(),
            ct.v.clone(),
            input.plaintext.clone(),
        ])
    }

    fn commitment_len(&self, _input: &Self::Input) -> usize {
        4
    }

    fn response_len(&self, _input: &Self::Input) -> usize {
        1
    }

    fn commit<R: CryptoRngCore + ?Sized>(
        &self,
        group: &G,
        input: &Self::Input,
        rng: &mut R,
    ) -> Result<(Vec<G::Element>, SigmaNonces)> {
        SigmaDhExtended.commit(group, &Self::dh_input(group, input)?, rng)
    }

    fn respond(
        &self,
        group: &G,
        input: &Self::Input,
        witness: &BigUint,
        nonces: &[BigUint],
        challenge: &BigUint,
    ) -> Result<Vec<BigUint>> {
        SigmaDhExtended.respond(group, &Self::dh_input(group, input)?, witness, nonces, challenge)
    }

    fn verify(
        &self,
        group: &G,
        input: &Self::Input,
        commitment: &[G::Element],
        challenge: &BigUint,
        response: &[BigUint],
    ) -> Result<bool> {
        SigmaDhExtended.verify(
            group,
            &Self::dh_input(group, input)?,
            commitment,
            challenge,
            response,
        )
    }
}
