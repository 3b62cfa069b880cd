use core::marker::PhantomData;

use num_bigint::BigUint;
use rand_core::CryptoRngCore;

use super::{SigmaNonces, SigmaStatement};
use crate::crypto::DlogGroup;
use crate::{Error, Result};

/// Conjunction of several instances of `S`, answered under one challenge.
///
/// Commitments, nonces and responses are the concatenation of the
/// components' in input order.
#[derive(Clone, Copy, Debug, Default)]
pub struct SigmaAnd<S> {
    inner: S,
}

impl<S> SigmaAnd<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

struct Offsets<'a, G: DlogGroup, S: SigmaStatement<G>> {
    inner: &'a S,
    inputs: core::slice::Iter<'a, <S as SigmaStatement<G>>::Input>,
    commitment: usize,
    response: usize,
    _group: PhantomData<G>,
}

impl<'a, G: DlogGroup, S: SigmaStatement<G>> Iterator for Offsets<'a, G, S> {
    /// `(input, commitment range, response range)`
    type Item = (
        &'a S::Input,
        core::ops::Range<usize>,
        core::ops::Range<usize>,
    );

    fn next(&mut self) -> Option<Self::Item> {
        let input = self.inputs.next()?;
        let c = self.commitment..self.commitment + self.inner.commitment_len(input);
        let r = self.response..self.response + self.inner.response_len(input);
        self.commitment = c.end;
        self.response = r.end;
        Some((input, c, r))
    }
}

impl<S> SigmaAnd<S> {
    fn offsets<'a, G>(&'a self, inputs: &'a [S::Input]) -> Offsets<'a, G, S>
    where
        G: DlogGroup,
        S: SigmaStatement<G>,
    {
        Offsets {
            inner: &self.inner,
            inputs: inputs.iter(),
            commitment: 0,
            response: 0,
            _group: PhantomData,
        }
    }
}

impl<G: DlogGroup, S: SigmaStatement<G>> SigmaStatement<G> for SigmaAnd<S> {
    type Input = Vec<S::Input>;
    type Witness = Vec<S::Witness>;

    fn name(&self) -> &'static str {
        "and"
    }

    fn public_elements(&self, group: &G, inputs: &Self::Input) -> Result<Vec<G::Element>> {
        let mut elements = Vec::new();
        for input in inputs {
            elements.extend(self.inner.public_elements(group, input)?);
        }
        Ok(elements)
    }

    fn commitment_len(&self, inputs: &Self::Input) -> usize {
        inputs.iter().map(|i| self.inner.commitment_len(i)).sum()
    }

    fn response_len(&self, inputs: &Self::Input) -> usize {
        inputs.iter().map(|i| self.inner.response_len(i)).sum()
    }

    fn commit<R: CryptoRngCore + ?Sized>(
        &self,
        group: &G,
        inputs: &Self::Input,
        rng: &mut R,
    ) -> Result<(Vec<G::Element>, SigmaNonces)> {
        let mut commitment = Vec::with_capacity(self.commitment_len(inputs));
        let mut nonces = Vec::with_capacity(self.response_len(inputs));
        for input in inputs {
            let (a, n) = self.inner.commit(group, input, rng)?;
            commitment.extend(a);
            nonces.extend_from_slice(n.as_slice());
        }
        Ok((commitment, SigmaNonces::new(nonces)))
    }

    fn respond(
        &self,
        group: &G,
        inputs: &Self::Input,
        witnesses: &Self::Witness,
        nonces: &[BigUint],
        challenge: &BigUint,
    ) -> Result<Vec<BigUint>> {
        if witnesses.len() != inputs.len() || nonces.len() != self.response_len(inputs) {
            return Err(Error::InvalidInput(format!(
                "AND of {} statements got {} witnesses and {} nonces",
                inputs.len(),
                witnesses.len(),
                nonces.len()
            )));
        }
        let mut response = Vec::with_capacity(nonces.len());
        for ((input, _, range), witness) in self.offsets(inputs).zip(witnesses) {
            response.extend(
                self.inner
                    .respond(group, input, witness, &nonces[range], challenge)?,
            );
        }
        Ok(response)
    }

    fn verify(
        &self,
        group: &G,
        inputs: &Self::Input,
        commitment: &[G::Element],
        challenge: &BigUint,
        response: &[BigUint],
    ) -> Result<bool> {
        if commitment.len() != self.commitment_len(inputs)
            || response.len() != self.response_len(inputs)
        {
            return Ok(false);
        }
        for (input, c, r) in self.offsets(inputs) {
            if !self
                .inner
                .verify(group, input, &commitment[c], challenge, &response[r])?
            {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::ZpGroup;
    use crate::params::ZpParams;
    use crate::sigma::SigmaDlog;
    use crate::SecureRng;

    #[test]
    fn every_component_must_hold() {
        let group = ZpGroup::new(ZpParams {
            name: "toy-23".to_string(),
            p: BigUint::from(23u32),
            q: BigUint::from(11u32),
            g: BigUint::from(4u32),
        })
        .unwrap();
        let and = SigmaAnd::new(SigmaDlog);
        let witnesses: Vec<BigUint> = [2u32, 5, 8].into_iter().map(BigUint::from).collect();
        let inputs: Vec<_> = witnesses
            .iter()
            .map(|w| group.exponentiate_generator(w).unwrap())
            .collect();
        let mut rng = SecureRng::new();

        let (a, nonces) = and.commit(&group, &inputs, &mut rng).unwrap();
        assert_eq!(a.len(), 3);
        let e = BigUint::from(3u32);
        let z = and
            .respond(&group, &inputs, &witnesses, nonces.as_slice(), &e)
            .unwrap();
        assert!(and.verify(&group, &inputs, &a, &e, &z).unwrap());

        let mut tampered = z.clone();
        tampered[1] = (&tampered[1] + 1u32) % group.order();
        assert!(!and.verify(&group, &inputs, &a, &e, &tampered).unwrap());
    }
}
