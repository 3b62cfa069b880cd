use num_bigint::BigUint;
use rand_core::CryptoRngCore;

use super::dh::{DhInput, SigmaDhExtended};
use super::{SigmaNonces, SigmaStatement};
use crate::crypto::DlogGroup;
use crate::encryption::{ElGamalCiphertext, ElGamalPublicKey};
use crate::Result;

/// Which secret the prover holds for an ElGamal ciphertext.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElGamalKnowledge {
    /// The encryption randomness `r`: `(g, h, c1, c2/x)` is a DH tuple.
    Randomness,
    /// The private key `k`: `(g, c1, h, c2/x)` is a DH tuple.
    PrivateKey,
}

/// A ciphertext under `public_key` claimed to encrypt `plaintext`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElGamalEncryptedValueInput<E> {
    pub public_key: ElGamalPublicKey<E>,
    pub ciphertext: ElGamalCiphertext<E>,
    pub plaintext: E,
}

/// Proves an ElGamal ciphertext encrypts a known group element.
#[derive(Clone, Copy, Debug)]
pub struct SigmaElGamalEncryptedValue {
    knowledge: ElGamalKnowledge,
}

impl SigmaElGamalEncryptedValue {
    pub fn new(knowledge: ElGamalKnowledge) -> Self {
        Self { knowledge }
    }

    pub fn knowledge(&self) -> ElGamalKnowledge {
        self.knowledge
    }

    fn dh_input<G: DlogGroup>(
        &self,
        group: &G,
        input: &ElGamalEncryptedValueInput<G::Element>,
    ) -> Result<DhInput<G::Element>> {
        let g = group.generator().clone();
        let h = input.public_key.h.clone();
        let c1 = input.ciphertext.c1.clone();
        let blinded = group.divide(&input.ciphertext.c2, &input.plaintext)?;
        Ok(match self.knowledge {
            ElGamalKnowledge::Randomness => DhInput::dh_tuple(g, h, c1, blinded),
            ElGamalKnowledge::PrivateKey => DhInput::dh_tuple(g, c1, h, blinded),
        })
    }
}

impl<G: DlogGroup> SigmaStatement<G> for SigmaElGamalEncryptedValue {
    type Input = ElGamalEncryptedValueInput<G::Element>;
    type Witness = BigUint;

    fn name(&self) -> &'static str {
        match self.knowledge {
            ElGamalKnowledge::Randomness => "elgamal-encrypted-value/randomness",
            ElGamalKnowledge::PrivateKey => "elgamal-encrypted-value/private-key",
        }
    }

    fn public_elements(&self, _group: &G, input: &Self::Input) -> Result<Vec<G::Element>> {
        Ok(vec![
            input.public_key.h.clone(),
            input.ciphertext.c1.clone(),
            input.ciphertext.c2.clone(),
            input.plaintext.clone(),
        ])
    }

    fn commitment_len(&self, _input: &Self::Input) -> usize {
        2
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
        SigmaDhExtended.commit(group, &self.dh_input(group, input)?, rng)
    }

    fn respond(
        &self,
        group: &G,
        input: &Self::Input,
        witness: &BigUint,
        nonces: &[BigUint],
        challenge: &BigUint,
    ) -> Result<Vec<BigUint>> {
        SigmaDhExtended.respond(group, &self.dh_input(group, input)?, witness, nonces, challenge)
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
            &self.dh_input(group, input)?,
            commitment,
            challenge,
            response,
        )
    }
}
