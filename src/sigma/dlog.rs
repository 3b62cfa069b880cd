use num_bigint::BigUint;
use rand_core::CryptoRngCore;

use super::{linear_response, SigmaNonces, SigmaStatement};
use crate::crypto::DlogGroup;
use crate::{Error, Result};

/// Knowledge of `w` with `h = g^w`. The input is `h`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SigmaDlog;

impl<G: DlogGroup> SigmaStatement<G> for SigmaDlog {
    type Input = G::Element;
    type Witness = BigUint;

    fn name(&self) -> &'static str {
        "dlog"
    }

    fn public_elements(&self, group: &G, h: &G::Element) -> Result<Vec<G::Element>> {
        Ok(vec![group.generator().clone(), h.clone()])
    }

    fn commitment_len(&self, _h: &G::Element) -> usize {
        1
    }

    fn response_len(&self, _h: &G::Element) -> usize {
        1
    }

    fn commit<R: CryptoRngCore + ?Sized>(
        &self,
        group: &G,
        _h: &G::Element,
        rng: &mut R,
    ) -> Result<(Vec<G::Element>, SigmaNonces)> {
        let r = group.random_exponent(rng);
        let a = group.exponentiate_generator(&r)?;
        Ok((vec![a], SigmaNonces::new(vec![r])))
    }

    fn respond(
        &self,
        group: &G,
        _h: &G::Element,
        w: &BigUint,
        nonces: &[BigUint],
        e: &BigUint,
    ) -> Result<Vec<BigUint>> {
        let [r] = nonces else {
            return Err(Error::InvalidInput(format!(
                "dlog expects 1 nonce, got {}",
                nonces.len()
            )));
        };
        Ok(vec![linear_response(group, r, e, w)])
    }

    // g^z == a * h^e
    fn verify(
        &self,
        group: &G,
        h: &G::Element,
        commitment: &[G::Element],
        e: &BigUint,
        response: &[BigUint],
    ) -> Result<bool> {
        let ([a], [z]) = (commitment, response) else {
            return Ok(false);
        };
        let lhs = group.exponentiate(group.generator(), z)?;
        let rhs = group.multiply(a, &group.exponentiate(h, e)?)?;
        Ok(lhs == rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::ZpGroup;
    use crate::params::ZpParams;
    use crate::SecureRng;

    #[test]
    fn honest_transcript_verifies() {
        let group = ZpGroup::new(ZpParams {
            name: "toy-23".to_string(),
            p: BigUint::from(23u32),
            q: BigUint::from(11u32),
            g: BigUint::from(4u32),
        })
        .unwrap();
        let mut rng = SecureRng::new();
        let w = BigUint::from(9u32);
        let h = group.exponentiate_generator(&w).unwrap();

        let (a, nonces) = SigmaDlog.commit(&group, &h, &mut rng).unwrap();
        let e = BigUint::from(6u32);
        let z = SigmaDlog
            .respond(&group, &h, &w, nonces.as_slice(), &e)
            .unwrap();
        assert!(SigmaDlog.verify(&group, &h, &a, &e, &z).unwrap());

        let wrong = vec![(&z[0] + 1u32) % group.order()];
        assert!(!SigmaDlog.verify(&group, &h, &a, &e, &wrong).unwrap());
    }
}
