use merlin::Transcript as MerlinTranscript;
use num_bigint::BigUint;
use rand_core::CryptoRngCore;
use tracing::debug;

use super::{
    decode_commitment, decode_response, encode_response, Challenge, SigmaProver, SigmaStatement,
    SigmaVerifier,
};
use crate::crypto::{DlogGroup, GroupId};
use crate::wire::{encode_elements, Frame};
use crate::{Error, Result, Role};

/// Protocol label for transcript initialization.
const PROTOCOL_LABEL: &[u8] = b"dlog-protocols sigma v1";

/// Domain separation tag for challenge generation.
const CHALLENGE_DST: &[u8] = b"challenge";

const TAG_PROOF: u8 = 0x13;

/// Transcript wrapper for the Fiat-Shamir transformation.
///
/// Binds, in order, the statement name, the group id, the public elements,
/// the commitment and the caller's context.
pub struct Transcript(MerlinTranscript);

impl Transcript {
    pub fn new(statement: &str) -> Self {
        let mut transcript = MerlinTranscript::new(PROTOCOL_LABEL);
        transcript.append_message(b"statement", statement.as_bytes());
        Self(transcript)
    }

    pub fn append_group(&mut self, id: GroupId) {
        self.0.append_message(b"group", id.as_bytes());
    }

    /// Appends the encoded public elements of the statement.
    pub fn append_public_elements(&mut self, elements: &[Vec<u8>]) {
        self.0
            .append_u64(b"public-count", elements.len() as u64);
        for element in elements {
            self.0.append_message(b"public", element);
        }
    }

    pub fn append_commitment(&mut self, commitment: &[Vec<u8>]) {
        self.0
            .append_u64(b"commitment-count", commitment.len() as u64);
        for element in commitment {
            self.0.append_message(b"commitment", element);
        }
    }

    /// Appends application-specific context to prevent cross-protocol attacks.
    ///
    /// # Security
    ///
    /// Proofs made under one context do not verify under another. Use a
    /// session id, a purpose string or both.
    pub fn append_context(&mut self, context: &[u8]) {
        self.0.append_message(b"context", context);
    }

    /// Squeezes a `bits`-bit challenge.
    pub fn challenge(&mut self, bits: usize) -> Result<Challenge> {
        let len = Challenge::byte_len(bits);
        let mut buf = vec![0u8; len];
        self.0.challenge_bytes(CHALLENGE_DST, &mut buf);
        let excess = len * 8 - bits;
        if let Some(first) = buf.first_mut() {
            *first &= 0xff >> excess;
        }
        Challenge::new(bits, BigUint::from_bytes_be(&buf))
    }
}

/// A non-interactive proof: the encoded commitment and response.
///
/// The challenge is recomputed by the verifier and never transmitted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SigmaProof {
    pub commitment: Vec<Vec<u8>>,
    pub response: Vec<Vec<u8>>,
}

impl SigmaProof {
    /// Serializes as a versioned frame: commitment count, commitment
    /// elements, response scalars.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut fields = Vec::with_capacity(1 + self.commitment.len() + self.response.len());
        fields.push((self.commitment.len() as u32).to_be_bytes().to_vec());
        fields.extend(self.commitment.iter().cloned());
        fields.extend(self.response.iter().cloned());
        Frame::new(TAG_PROOF, fields).to_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let frame = Frame::from_bytes(bytes)?;
        if frame.tag != TAG_PROOF {
            return Err(Error::Deserialization(format!(
                "expected sigma proof, got tag {:#04x}",
                frame.tag
            )));
        }
        let mut fields = frame.fields.into_iter();
        let count = fields
            .next()
            .and_then(|f| <[u8; 4]>::try_from(f.as_slice()).ok())
            .map(u32::from_be_bytes)
            .ok_or_else(|| {
                Error::Deserialization("sigma proof is missing its commitment count".to_string())
            })? as usize;
        let rest: Vec<Vec<u8>> = fields.collect();
        if count > rest.len() {
            return Err(Error::Deserialization(format!(
                "sigma proof declares {count} commitment elements but carries {}",
                rest.len()
            )));
        }
        let mut commitment = rest;
        let response = commitment.split_off(count);
        Ok(Self {
            commitment,
            response,
        })
    }
}

fn bind<G: DlogGroup, S: SigmaStatement<G>>(
    group: &G,
    statement: &S,
    input: &S::Input,
    commitment: &[Vec<u8>],
    context: &[u8],
) -> Result<Transcript> {
    let mut transcript = Transcript::new(statement.name());
    transcript.append_group(group.id());
    let public = statement.public_elements(group, input)?;
    transcript.append_public_elements(&encode_elements(group, &public)?);
    transcript.append_commitment(commitment);
    transcript.append_context(context);
    Ok(transcript)
}

impl<G: DlogGroup, S: SigmaStatement<G>> SigmaProver<G, S> {
    /// Proves `input` without interaction, deriving the challenge from a
    /// transcript of everything the verifier will see plus `context`.
    pub fn prove_non_interactive<R: CryptoRngCore + ?Sized>(
        &self,
        input: &S::Input,
        witness: &S::Witness,
        context: &[u8],
        rng: &mut R,
    ) -> Result<SigmaProof> {
        let group = self.group();
        let (commitment, pending) = self.compute_first_message(input, witness, rng)?;
        let commitment = encode_elements(group, &commitment)?;
        let challenge = bind(group, self.statement(), input, &commitment, context)?
            .challenge(self.soundness_bits())?;
        let response = pending.compute_second_message(&challenge)?;
        debug!(statement = self.statement().name(), "produced non-interactive proof");
        Ok(SigmaProof {
            commitment,
            response: encode_response(group, &response)?,
        })
    }
}

impl<G: DlogGroup, S: SigmaStatement<G>> SigmaVerifier<G, S> {
    /// Verifies a proof produced by
    /// [`SigmaProver::prove_non_interactive`] under the same `context`.
    ///
    /// # Errors
    ///
    /// A commitment element that is not a group member is reported as a
    /// cheat attempt by the prover; malformed encodings are deserialization
    /// errors.
    pub fn verify_non_interactive(
        &self,
        input: &S::Input,
        proof: &SigmaProof,
        context: &[u8],
    ) -> Result<bool> {
        let group = self.group();
        let statement = self.statement();
        if proof.commitment.len() != statement.commitment_len(input)
            || proof.response.len() != statement.response_len(input)
        {
            return Ok(false);
        }
        let commitment = decode_commitment(
            group,
            &proof.commitment,
            proof.commitment.len(),
            Role::Prover,
        )?;
        let response = decode_response(group, &proof.response, proof.response.len())?;
        let challenge = bind(group, statement, input, &proof.commitment, context)?
            .challenge(self.soundness_bits())?;
        self.verify(input, &commitment, &challenge, &response)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::groups::{native, NativeP256Group};
    use crate::sigma::SigmaDlog;
    use crate::SecureRng;

    fn p256() -> Arc<NativeP256Group> {
        native::initialize().unwrap();
        Arc::new(NativeP256Group::new().unwrap())
    }

    #[test]
    fn challenge_is_deterministic_and_masked() {
        let mut t1 = Transcript::new("dlog");
        t1.append_context(b"ctx");
        let mut t2 = Transcript::new("dlog");
        t2.append_context(b"ctx");
        let c1 = t1.challenge(13).unwrap();
        assert_eq!(c1, t2.challenge(13).unwrap());
        assert!(c1.value().bits() <= 13);

        let mut t3 = Transcript::new("dh-extended");
        t3.append_context(b"ctx");
        assert_ne!(c1, t3.challenge(13).unwrap());
    }

    #[test]
    fn proof_verifies_only_under_its_context() {
        let group = p256();
        let prover = SigmaProver::new(group.clone(), SigmaDlog, 80).unwrap();
        let verifier = SigmaVerifier::new(group.clone(), SigmaDlog, 80).unwrap();
        let mut rng = SecureRng::new();
        let w = group.random_exponent(&mut rng);
        let h = group.exponentiate_generator(&w).unwrap();

        let proof = prover
            .prove_non_interactive(&h, &w, b"session-1", &mut rng)
            .unwrap();
        let parsed = SigmaProof::from_bytes(&proof.to_bytes().unwrap()).unwrap();
        assert_eq!(parsed, proof);
        assert!(verifier.verify_non_interactive(&h, &parsed, b"session-1").unwrap());
        assert!(!verifier.verify_non_interactive(&h, &parsed, b"session-2").unwrap());

        let other = group.random_element(&mut rng).unwrap();
        assert!(!verifier.verify_non_interactive(&other, &parsed, b"session-1").unwrap());
    }

    #[test]
    fn truncated_proof_is_rejected() {
        let proof = SigmaProof {
            commitment: vec![vec![2; 33]],
            response: vec![vec![1; 32]],
        };
        let mut bytes = proof.to_bytes().unwrap();
        bytes.truncate(bytes.len() - 1);
        assert!(matches!(
            SigmaProof::from_bytes(&bytes),
            Err(Error::Deserialization(_))
        ));
    }
}
