//! Operating-system randomness for exponents, nonces and challenges.

use rand_core::{CryptoRng, OsRng, RngCore};

/// `OsRng` behind a crate-local name.
///
/// Protocol runs construct one per execution with [`SecureRng::new`] and
/// never store it in a sender, receiver or prover, so concurrent transfers
/// on a shared façade do not share sampling state.
#[derive(Clone, Copy, Debug, Default)]
pub struct SecureRng(OsRng);

impl SecureRng {
    pub fn new() -> Self {
        Self(OsRng)
    }
}

impl CryptoRng for SecureRng {}

impl RngCore for SecureRng {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> core::result::Result<(), rand_core::Error> {
        self.0.try_fill_bytes(dest)
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigUint;

    use super::*;
    use crate::crypto::DlogGroup;
    use crate::groups::ZpGroup;
    use crate::params::ZpParams;

    #[test]
    fn exponents_cover_the_toy_order() {
        let group = ZpGroup::new(ZpParams {
            name: "toy-23".to_string(),
            p: BigUint::from(23u32),
            q: BigUint::from(11u32),
            g: BigUint::from(4u32),
        })
        .unwrap();
        let mut rng = SecureRng::new();
        let mut seen = [false; 11];
        for _ in 0..2000 {
            let e = group.random_exponent(&mut rng);
            assert!(e < BigUint::from(11u32));
            seen[usize::try_from(e.to_u64_digits().first().copied().unwrap_or(0)).unwrap()] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }
}
