//! Three-move public-coin proofs of knowledge.
//!
//! A [`SigmaStatement`] supplies the commitment, response and verification
//! formulas; [`SigmaProver`] and [`SigmaVerifier`] run them, either as pure
//! functions or interactively over a [`Channel`]. Every statement here uses
//! responses of the form `z = r + e * w mod q`.

/// AND composition of statements under one challenge.
pub mod and;
/// Knowledge of the randomness of a Cramer-Shoup ciphertext.
pub mod cramer_shoup;
/// Equality of discrete logs across several bases.
pub mod dh;
/// Knowledge of a discrete log (Schnorr).
pub mod dlog;
/// Knowledge behind an ElGamal ciphertext of a known plaintext.
pub mod elgamal;
/// Fiat-Shamir transform over a Merlin transcript.
pub mod transcript;
/// Zero-knowledge proofs of knowledge via a trapdoor commitment to the challenge.
pub mod zkpok;

use std::sync::Arc;

use num_bigint::{BigUint, RandBigInt};
use num_traits::Zero;
use rand_core::CryptoRngCore;
use tracing::{debug, warn};

use crate::channel::Channel;
use crate::crypto::DlogGroup;
use crate::wire::{decode_element, decode_scalar, encode_elements, encode_scalar, Frame};
use crate::{Error, Result, Role, SecureRng};

pub use and::SigmaAnd;
pub use cramer_shoup::{CramerShoupEncryptedValueInput, SigmaCramerShoupEncryptedValue};
pub use dh::{DhInput, SigmaDhExtended};
pub use dlog::SigmaDlog;
pub use elgamal::{ElGamalEncryptedValueInput, ElGamalKnowledge, SigmaElGamalEncryptedValue};
pub use transcript::{SigmaProof, Transcript};
pub use zkpok::{ZkPokMessage, ZkPokProver, ZkPokVerifier};

/// Prover randomness of one execution, one nonce per response.
#[derive(Debug)]
pub struct SigmaNonces(Vec<BigUint>);

impl SigmaNonces {
    pub fn new(nonces: Vec<BigUint>) -> Self {
        Self(nonces)
    }

    pub fn as_slice(&self) -> &[BigUint] {
        &self.0
    }
}

/// A relation with Sigma-protocol formulas.
///
/// `commit` returns exactly `response_len` nonces; `respond` consumes them
/// in the same order.
pub trait SigmaStatement<G: DlogGroup>: Send + Sync {
    type Input: Send + Sync;
    type Witness: Send + Sync;

    /// Domain-separation name bound into transcripts.
    fn name(&self) -> &'static str;

    /// Public group elements the statement is about.
    fn public_elements(&self, group: &G, input: &Self::Input) -> Result<Vec<G::Element>>;

    fn commitment_len(&self, input: &Self::Input) -> usize;

    fn response_len(&self, input: &Self::Input) -> usize;

    fn commit<R: CryptoRngCore + ?Sized>(
        &self,
        group: &G,
        input: &Self::Input,
        rng: &mut R,
    ) -> Result<(Vec<G::Element>, SigmaNonces)>;

    fn respond(
        &self,
        group: &G,
        input: &Self::Input,
        witness: &Self::Witness,
        nonces: &[BigUint],
        challenge: &BigUint,
    ) -> Result<Vec<BigUint>>;

    /// Checks the verification equation. Shapes were already checked by
    /// the caller, but implementations still return `false` on mismatch.
    fn verify(
        &self,
        group: &G,
        input: &Self::Input,
        commitment: &[G::Element],
        challenge: &BigUint,
        response: &[BigUint],
    ) -> Result<bool>;
}

/// `r + e * w mod q`.
pub(crate) fn linear_response<G: DlogGroup>(
    group: &G,
    nonce: &BigUint,
    challenge: &BigUint,
    witness: &BigUint,
) -> BigUint {
    (nonce + challenge * witness) % group.order()
}

/// Fails unless `2^bits < q`.
///
/// # Errors
///
/// Returns [`Error::SecurityLevel`] when the challenge space does not fit
/// below the group order, or when `bits` is zero.
pub fn check_soundness<G: DlogGroup>(group: &G, bits: usize) -> Result<()> {
    let order_bits = group.order().bits() as usize;
    if bits == 0 || bits >= order_bits {
        return Err(Error::SecurityLevel(format!(
            "{bits}-bit challenges need 2^{bits} < q, but {} has a {order_bits}-bit order",
            group.name()
        )));
    }
    Ok(())
}

/// A challenge drawn from `[0, 2^bits)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Challenge {
    bits: usize,
    value: BigUint,
}

impl Challenge {
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `value >= 2^bits`.
    pub fn new(bits: usize, value: BigUint) -> Result<Self> {
        if value.bits() > bits as u64 {
            return Err(Error::InvalidInput(format!(
                "challenge does not fit in {bits} bits"
            )));
        }
        Ok(Self { bits, value })
    }

    pub fn random<R: CryptoRngCore + ?Sized>(bits: usize, rng: &mut R) -> Self {
        Self {
            bits,
            value: rng.gen_biguint(bits as u64),
        }
    }

    pub fn bits(&self) -> usize {
        self.bits
    }

    pub fn value(&self) -> &BigUint {
        &self.value
    }

    pub fn byte_len(bits: usize) -> usize {
        bits.div_ceil(8)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let len = Self::byte_len(self.bits);
        let mut out = vec![0u8; len];
        if !self.value.is_zero() {
            let bytes = self.value.to_bytes_be();
            out[len - bytes.len()..].copy_from_slice(&bytes);
        }
        out
    }

    /// Parses a challenge of exactly `bits` bits sent by `sender`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CheatAttempt`] blaming `sender` if the challenge has
    /// the wrong width.
    pub fn from_bytes(bits: usize, bytes: &[u8], sender: Role) -> Result<Self> {
        let value = BigUint::from_bytes_be(bytes);
        if bytes.len() != Self::byte_len(bits) || value.bits() > bits as u64 {
            warn!(role = %sender, bits, len = bytes.len(), "challenge has the wrong width");
            return Err(Error::cheat(
                sender,
                format!("challenge is not a {bits}-bit string"),
            ));
        }
        Ok(Self { bits, value })
    }
}

const TAG_COMMITMENT: u8 = 0x10;
const TAG_CHALLENGE: u8 = 0x11;
const TAG_RESPONSE: u8 = 0x12;

/// Message alphabet of an interactive Sigma execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SigmaMessage {
    /// Encoded commitment elements.
    Commitment(Vec<Vec<u8>>),
    Challenge(Vec<u8>),
    /// Encoded response exponents.
    Response(Vec<Vec<u8>>),
}

impl SigmaMessage {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let frame = match self {
            Self::Commitment(fields) => Frame::new(TAG_COMMITMENT, fields.clone()),
            Self::Challenge(bytes) => Frame::new(TAG_CHALLENGE, vec![bytes.clone()]),
            Self::Response(fields) => Frame::new(TAG_RESPONSE, fields.clone()),
        };
        frame.to_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let frame = Frame::from_bytes(bytes)?;
        match frame.tag {
            TAG_COMMITMENT => Ok(Self::Commitment(frame.fields)),
            TAG_CHALLENGE => {
                frame.expect_fields(1, "sigma challenge")?;
                Ok(Self::Challenge(frame.fields.into_iter().next().unwrap_or_default()))
            }
            TAG_RESPONSE => Ok(Self::Response(frame.fields)),
            other => Err(Error::Deserialization(format!(
                "unknown sigma message tag {other:#04x}"
            ))),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Commitment(_) => "commitment",
            Self::Challenge(_) => "challenge",
            Self::Response(_) => "response",
        }
    }
}

fn unexpected(expected: &str, got: &SigmaMessage) -> Error {
    Error::Deserialization(format!("expected sigma {expected}, got {}", got.kind()))
}

/// Decodes commitment elements received from `sender`, checking count and
/// membership of each.
pub(crate) fn decode_commitment<G: DlogGroup>(
    group: &G,
    fields: &[Vec<u8>],
    expected: usize,
    sender: Role,
) -> Result<Vec<G::Element>> {
    if fields.len() != expected {
        return Err(Error::Deserialization(format!(
            "expected {expected} commitment elements, got {}",
            fields.len()
        )));
    }
    fields
        .iter()
        .enumerate()
        .map(|(i, bytes)| decode_element(group, bytes, sender, &format!("commitment[{i}]")))
        .collect()
}

pub(crate) fn decode_response<G: DlogGroup>(
    group: &G,
    fields: &[Vec<u8>],
    expected: usize,
) -> Result<Vec<BigUint>> {
    if fields.len() != expected {
        return Err(Error::Deserialization(format!(
            "expected {expected} response scalars, got {}",
            fields.len()
        )));
    }
    fields
        .iter()
        .enumerate()
        .map(|(i, bytes)| decode_scalar(group, bytes, &format!("response[{i}]")))
        .collect()
}

pub(crate) fn encode_response<G: DlogGroup>(
    group: &G,
    response: &[BigUint],
) -> Result<Vec<Vec<u8>>> {
    response.iter().map(|z| encode_scalar(group, z)).collect()
}

/// Prover side of a statement.
#[derive(Debug)]
pub struct SigmaProver<G: DlogGroup, S> {
    group: Arc<G>,
    statement: S,
    soundness_bits: usize,
}

impl<G: DlogGroup, S: SigmaStatement<G>> SigmaProver<G, S> {
    /// # Errors
    ///
    /// Returns [`Error::SecurityLevel`] unless `2^soundness_bits < q`.
    pub fn new(group: Arc<G>, statement: S, soundness_bits: usize) -> Result<Self> {
        check_soundness(&*group, soundness_bits)?;
        Ok(Self {
            group,
            statement,
            soundness_bits,
        })
    }

    pub fn group(&self) -> &G {
        &self.group
    }

    pub fn statement(&self) -> &S {
        &self.statement
    }

    pub fn soundness_bits(&self) -> usize {
        self.soundness_bits
    }

    /// Samples fresh nonces and computes the commitment.
    ///
    /// The returned [`PendingResponse`] owns the nonces and is consumed by
    /// the second message, so they cannot serve two challenges.
    pub fn compute_first_message<'a, R: CryptoRngCore + ?Sized>(
        &'a self,
        input: &'a S::Input,
        witness: &'a S::Witness,
        rng: &mut R,
    ) -> Result<(Vec<G::Element>, PendingResponse<'a, G, S>)> {
        let (commitment, nonces) = self.statement.commit(&*self.group, input, rng)?;
        Ok((
            commitment,
            PendingResponse {
                prover: self,
                input,
                witness,
                nonces,
            },
        ))
    }

    /// Runs the prover over `channel`: commitment out, challenge in,
    /// response out.
    pub async fn prove<C: Channel>(
        &self,
        channel: &mut C,
        input: &S::Input,
        witness: &S::Witness,
    ) -> Result<()> {
        let group = &*self.group;
        let mut rng = SecureRng::new();
        let (commitment, pending) = self.compute_first_message(input, witness, &mut rng)?;
        let message = SigmaMessage::Commitment(encode_elements(group, &commitment)?);
        channel.send(message.to_bytes()?).await?;
        debug!(statement = self.statement.name(), "sent sigma commitment");

        let challenge = match SigmaMessage::from_bytes(&channel.receive().await?)? {
            SigmaMessage::Challenge(bytes) => {
                Challenge::from_bytes(self.soundness_bits, &bytes, Role::Verifier)?
            }
            other => return Err(unexpected("challenge", &other)),
        };
        let response = pending.compute_second_message(&challenge)?;
        let message = SigmaMessage::Response(encode_response(group, &response)?);
        channel.send(message.to_bytes()?).await?;
        debug!(statement = self.statement.name(), "sent sigma response");
        Ok(())
    }
}

/// Prover state between the commitment and the response.
pub struct PendingResponse<'a, G: DlogGroup, S: SigmaStatement<G>> {
    prover: &'a SigmaProver<G, S>,
    input: &'a S::Input,
    witness: &'a S::Witness,
    nonces: SigmaNonces,
}

impl<'a, G: DlogGroup, S: SigmaStatement<G>> PendingResponse<'a, G, S> {
    /// Computes the response to `challenge`, consuming the nonces.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CheatAttempt`] blaming the verifier if the challenge
    /// width differs from the agreed soundness parameter.
    pub fn compute_second_message(self, challenge: &Challenge) -> Result<Vec<BigUint>> {
        let prover = self.prover;
        if challenge.bits() != prover.soundness_bits {
            return Err(Error::cheat(
                Role::Verifier,
                format!(
                    "challenge has {} bits, expected {}",
                    challenge.bits(),
                    prover.soundness_bits
                ),
            ));
        }
        prover.statement.respond(
            &*prover.group,
            self.input,
            self.witness,
            self.nonces.as_slice(),
            challenge.value(),
        )
    }
}

/// Verifier side of a statement.
#[derive(Debug)]
pub struct SigmaVerifier<G: DlogGroup, S> {
    group: Arc<G>,
    statement: S,
    soundness_bits: usize,
}

impl<G: DlogGroup, S: SigmaStatement<G>> SigmaVerifier<G, S> {
    /// # Errors
    ///
    /// Returns [`Error::SecurityLevel`] unless `2^soundness_bits < q`.
    pub fn new(group: Arc<G>, statement: S, soundness_bits: usize) -> Result<Self> {
        check_soundness(&*group, soundness_bits)?;
        Ok(Self {
            group,
            statement,
            soundness_bits,
        })
    }

    pub fn group(&self) -> &G {
        &self.group
    }

    pub fn statement(&self) -> &S {
        &self.statement
    }

    pub fn soundness_bits(&self) -> usize {
        self.soundness_bits
    }

    pub fn sample_challenge<R: CryptoRngCore + ?Sized>(&self, rng: &mut R) -> Challenge {
        Challenge::random(self.soundness_bits, rng)
    }

    /// Decides whether `(commitment, challenge, response)` is an accepting
    /// transcript for `input`.
    ///
    /// Rejects wrong shapes, non-member public or commitment elements and
    /// unreduced responses before evaluating the statement equation.
    pub fn verify(
        &self,
        input: &S::Input,
        commitment: &[G::Element],
        challenge: &Challenge,
        response: &[BigUint],
    ) -> Result<bool> {
        let group = &*self.group;
        if challenge.bits() != self.soundness_bits
            || commitment.len() != self.statement.commitment_len(input)
            || response.len() != self.statement.response_len(input)
        {
            return Ok(false);
        }
        for element in self.statement.public_elements(group, input)? {
            if !group.is_member(&element)? {
                return Ok(false);
            }
        }
        for element in commitment {
            if !group.is_member(element)? {
                return Ok(false);
            }
        }
        if response.iter().any(|z| z >= group.order()) {
            return Ok(false);
        }
        self.statement
            .verify(group, input, commitment, challenge.value(), response)
    }

    /// Runs the verifier over `channel` and returns its decision.
    pub async fn verify_interactive<C: Channel>(
        &self,
        channel: &mut C,
        input: &S::Input,
    ) -> Result<bool> {
        let group = &*self.group;
        let commitment = match SigmaMessage::from_bytes(&channel.receive().await?)? {
            SigmaMessage::Commitment(fields) => decode_commitment(
                group,
                &fields,
                self.statement.commitment_len(input),
                Role::Prover,
            )?,
            other => return Err(unexpected("commitment", &other)),
        };

        let challenge = self.sample_challenge(&mut SecureRng::new());
        channel
            .send(SigmaMessage::Challenge(challenge.to_bytes()).to_bytes()?)
            .await?;

        let response = match SigmaMessage::from_bytes(&channel.receive().await?)? {
            SigmaMessage::Response(fields) => {
                decode_response(group, &fields, self.statement.response_len(input))?
            }
            other => return Err(unexpected("response", &other)),
        };
        let accepted = self.verify(input, &commitment, &challenge, &response)?;
        debug!(statement = self.statement.name(), accepted, "sigma verification finished");
        Ok(accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::ZpGroup;
    use crate::params::ZpParams;

    fn toy() -> Arc<ZpGroup> {
        Arc::new(
            ZpGroup::new(ZpParams {
                name: "toy-23".to_string(),
                p: BigUint::from(23u32),
                q: BigUint::from(11u32),
                g: BigUint::from(4u32),
            })
            .unwrap(),
        )
    }

    #[test]
    fn soundness_parameter_must_fit_below_order() {
        let group = toy();
        assert!(SigmaVerifier::new(group.clone(), SigmaDlog, 3).is_ok());
        let err = SigmaVerifier::new(group.clone(), SigmaDlog, 4).unwrap_err();
        assert!(matches!(err, Error::SecurityLevel(_)));
        assert!(SigmaProver::new(group, SigmaDlog, 0).is_err());
    }

    #[test]
    fn challenge_width_is_enforced() {
        let challenge = Challenge::new(12, BigUint::from(4095u32)).unwrap();
        let bytes = challenge.to_bytes();
        assert_eq!(bytes.len(), 2);
        assert_eq!(Challenge::from_bytes(12, &bytes, Role::Verifier).unwrap(), challenge);

        assert!(Challenge::new(12, BigUint::from(4096u32)).is_err());
        let err = Challenge::from_bytes(12, &[0x10, 0x00], Role::Verifier).unwrap_err();
        assert!(err.is_cheat_attempt());
        assert!(Challenge::from_bytes(12, &[0x01], Role::Verifier).is_err());
    }

    #[test]
    fn pending_response_rejects_foreign_challenge_width() {
        let group = toy();
        let prover = SigmaProver::new(group.clone(), SigmaDlog, 3).unwrap();
        let w = BigUint::from(7u32);
        let h = group.exponentiate_generator(&w).unwrap();
        let (_, pending) = prover
            .compute_first_message(&h, &w, &mut SecureRng::new())
            .unwrap();
        let narrow = Challenge::new(2, BigUint::from(1u32)).unwrap();
        let err = pending.compute_second_message(&narrow).unwrap_err();
        assert!(matches!(
            err,
            Error::CheatAttempt {
                role: Role::Verifier,
                ..
            }
        ));
    }

    #[test]
    fn verify_rejects_wrong_shapes_and_unreduced_responses() {
        let group = toy();
        let prover = SigmaProver::new(group.clone(), SigmaDlog, 3).unwrap();
        let verifier = SigmaVerifier::new(group.clone(), SigmaDlog, 3).unwrap();
        let w = BigUint::from(5u32);
        let h = group.exponentiate_generator(&w).unwrap();
        let mut rng = SecureRng::new();

        let (commitment, pending) = prover.compute_first_message(&h, &w, &mut rng).unwrap();
        let challenge = verifier.sample_challenge(&mut rng);
        let response = pending.compute_second_message(&challenge).unwrap();
        assert!(verifier.verify(&h, &commitment, &challenge, &response).unwrap());

        assert!(!verifier.verify(&h, &[], &challenge, &response).unwrap());
        let unreduced = vec![&response[0] + group.order()];
        assert!(!verifier.verify(&h, &commitment, &challenge, &unreduced).unwrap());
    }

    #[test]
    fn message_tags_round_trip() {
        let message = SigmaMessage::Response(vec![vec![1], vec![2]]);
        let bytes = message.to_bytes().unwrap();
        assert_eq!(SigmaMessage::from_bytes(&bytes).unwrap(), message);

        let unknown = Frame::new(0x7f, vec![]).to_bytes().unwrap();
        assert!(matches!(
            SigmaMessage::from_bytes(&unknown),
            Err(Error::Deserialization(_))
        ));
    }
}
