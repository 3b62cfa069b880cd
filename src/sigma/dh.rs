use num_bigint::BigUint;
use rand_core::CryptoRngCore;

use super::{linear_response, SigmaNonces, SigmaStatement};
use crate::crypto::DlogGroup;
use crate::{Error, Result};

/// Bases `g_i` and values `h_i` with a common exponent `w`, `h_i = g_i^w`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DhInput<E> {
    pub bases: Vec<E>,
    pub values: Vec<E>,
}

impl<E> DhInput<E> {
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the lists are empty or differ in
    /// length.
    pub fn new(bases: Vec<E>, values: Vec<E>) -> Result<Self> {
        if bases.is_empty() || bases.len() != values.len() {
            return Err(Error::InvalidInput(format!(
                "extended DH needs matching non-empty bases and values, got {} and {}",
                bases.len(),
                values.len()
            )));
        }
        Ok(Self { bases, values })
    }

    /// The Diffie-Hellman tuple `(g, h, u, v)`: `u = g^w` and `v = h^w`.
    pub fn dh_tuple(g: E, h: E, u: E, v: E) -> Self {
        Self {
            bases: vec![g, h],
            values: vec![u, v],
        }
    }

    fn is_well_formed(&self) -> bool {
        !self.bases.is_empty() && self.bases.len() == self.values.len()
    }
}

/// Equality of discrete logs: knowledge of `w` with `h_i = g_i^w` for all `i`.
///
/// With two bases this is the Chaum-Pedersen relation.
#[derive(Clone, Copy, Debug, Default)]
pub struct SigmaDhExtended;

impl<G: DlogGroup> SigmaStatement<G> for SigmaDhExtended {
    type Input = DhInput<G::Element>;
    type Witness = BigUint;

    fn name(&self) -> &'static str {
        "dh-extended"
    }

    fn public_elements(&self, _group: &G, input: &Self::Input) -> Result<Vec<G::Element>> {
        Ok(input.bases.iter().chain(&input.values).cloned().collect())
    }

    fn commitment_len(&self, input: &Self::Input) -> usize {
        input.bases.len()
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
        if !input.is_well_formed() {
            return Err(Error::InvalidInput(
                "extended DH input has mismatched bases and values".to_string(),
            ));
        }
        let r = group.random_exponent(rng);
        let commitment = input
            .bases
            .iter()
            .map(|g_i| group.exponentiate_secret(g_i, &r))
            .collect::<Result<Vec<_>>>()?;
        Ok((commitment, SigmaNonces::new(vec![r])))
    }

    fn respond(
        &self,
        group: &G,
        _input: &Self::Input,
        w: &BigUint,
        nonces: &[BigUint],
        e: &BigUint,
    ) -> Result<Vec<BigUint>> {
        let [r] = nonces else {
            return Err(Error::InvalidInput(format!(
                "extended DH expects 1 nonce, got {}",
                nonces.len()
            )));
        };
        Ok(vec![linear_response(group, r, e, w)])
    }

    // g_i^z == a_i * h_i^e for every i
    fn verify(
        &self,
        group: &G,
        input: &Self::Input,
        commitment: &[G::Element],
        e: &BigUint,
        response: &[BigUint],
    ) -> Result<bool> {
        let [z] = response else {
            return Ok(false);
        };
        if !input.is_well_formed() || commitment.len() != input.bases.len() {
            return Ok(false);
        }
        for ((g_i, h_i), a_i) in input.bases.iter().zip(&input.values).zip(commitment) {
            let lhs = group.exponentiate(g_i, z)?;
            let rhs = group.multiply(a_i, &group.exponentiate(h_i, e)?)?;
            if lhs != rhs {
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
    use crate::SecureRng;

    fn toy() -> ZpGroup {
        ZpGroup::new(ZpParams {
            name: "toy-23".to_string(),
            p: BigUint::from(23u32),
            q: BigUint::from(11u32),
            g: BigUint::from(4u32),
        })
        .unwrap()
    }

    #[test]
    fn chaum_pedersen_small_numbers() {
        let group = toy();
        let g = group.generator().clone();
        let h = group.element_unchecked(BigUint::from(9u32));
        let w = BigUint::from(6u32);
        let input = DhInput::dh_tuple(
            g.clone(),
            h.clone(),
            group.exponentiate(&g, &w).unwrap(),
            group.exponentiate(&h, &w).unwrap(),
        );
        assert_eq!(input.values[0].value(), &BigUint::from(2u32));
        assert_eq!(input.values[1].value(), &BigUint::from(3u32));

        let mut rng = SecureRng::new();
        let (a, nonces) = SigmaDhExtended.commit(&group, &input, &mut rng).unwrap();
        let e = BigUint::from(4u32);
        let z = SigmaDhExtended
            .respond(&group, &input, &w, nonces.as_slice(), &e)
            .unwrap();
        assert!(SigmaDhExtended.verify(&group, &input, &a, &e, &z).unwrap());

        let forged = SigmaDhExtended
            .respond(&group, &input, &BigUint::from(7u32), nonces.as_slice(), &e)
            .unwrap();
        assert!(!SigmaDhExtended.verify(&group, &input, &a, &e, &forged).unwrap());
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let group = toy();
        let g = group.generator().clone();
        assert!(DhInput::new(vec![g.clone()], vec![]).is_err());
        assert!(DhInput::<crate::groups::ZpElement>::new(vec![], vec![]).is_err());
        assert!(DhInput::new(vec![g.clone()], vec![g]).is_ok());
    }
}
