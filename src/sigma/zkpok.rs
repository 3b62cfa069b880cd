//! Zero-knowledge proofs of knowledge compiled from Sigma protocols.
//!
//! The verifier commits to its challenge with a Pedersen commitment under a
//! key `h = g^tau` chosen by the prover, and opens it only after seeing the
//! prover's Sigma commitment. The prover reveals `tau` at the end, which
//! lets a simulator equivocate the challenge and so makes the proof
//! zero-knowledge against a malicious verifier.
//!
//! Flow:
//! 1. P -> V: `h = g^tau`
//! 2. V -> P: `com = g^rho * h^e`
//! 3. P -> V: Sigma commitment `a`
//! 4. V -> P: `(e, rho)`; P checks it opens `com`
//! 5. P -> V: response `z` and `tau`; V checks `h = g^tau` and the Sigma
//!    equation

use std::sync::Arc;

use tracing::{debug, warn};

use super::{
    decode_commitment, decode_response, encode_response, Challenge, SigmaProver, SigmaStatement,
    SigmaVerifier,
};
use crate::channel::Channel;
use crate::crypto::DlogGroup;
use crate::wire::{
    decode_element, decode_scalar, encode_element, encode_elements, encode_scalar, Frame,
};
use crate::{Error, Result, Role, SecureRng};

const TAG_TRAPDOOR_KEY: u8 = 0x20;
const TAG_CHALLENGE_COMMITMENT: u8 = 0x21;
const TAG_COMMITMENT: u8 = 0x22;
const TAG_OPENING: u8 = 0x23;
const TAG_RESPONSE: u8 = 0x24;

/// Message alphabet of a ZKPOK execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ZkPokMessage {
    TrapdoorKey(Vec<u8>),
    ChallengeCommitment(Vec<u8>),
    Commitment(Vec<Vec<u8>>),
    Opening {
        challenge: Vec<u8>,
        randomness: Vec<u8>,
    },
    Response {
        response: Vec<Vec<u8>>,
        trapdoor: Vec<u8>,
    },
}

impl ZkPokMessage {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let frame = match self {
            Self::TrapdoorKey(h) => Frame::new(TAG_TRAPDOOR_KEY, vec![h.clone()]),
            Self::ChallengeCommitment(com) => {
                Frame::new(TAG_CHALLENGE_COMMITMENT, vec![com.clone()])
            }
            Self::Commitment(a) => Frame::new(TAG_COMMITMENT, a.clone()),
            Self::Opening {
                challenge,
                randomness,
            } => Frame::new(TAG_OPENING, vec![challenge.clone(), randomness.clone()]),
            Self::Response { response, trapdoor } => {
                let mut fields = Vec::with_capacity(1 + response.len());
                fields.push(trapdoor.clone());
                fields.extend(response.iter().cloned());
                Frame::new(TAG_RESPONSE, fields)
            }
        };
        frame.to_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let frame = Frame::from_bytes(bytes)?;
        let tag = frame.tag;
        let mut fields = frame.fields;
        match tag {
            TAG_TRAPDOOR_KEY | TAG_CHALLENGE_COMMITMENT => {
                let [field]: [Vec<u8>; 1] = fields.try_into().map_err(|f: Vec<Vec<u8>>| {
                    Error::Deserialization(format!("zkpok key message has {} fields", f.len()))
                })?;
                Ok(if tag == TAG_TRAPDOOR_KEY {
                    Self::TrapdoorKey(field)
                } else {
                    Self::ChallengeCommitment(field)
                })
            }
            TAG_COMMITMENT => Ok(Self::Commitment(fields)),
            TAG_OPENING => {
                let [challenge, randomness]: [Vec<u8>; 2] =
                    fields.try_into().map_err(|f: Vec<Vec<u8>>| {
                        Error::Deserialization(format!("zkpok opening has {} fields", f.len()))
                    })?;
                Ok(Self::Opening {
                    challenge,
                    randomness,
                })
            }
            TAG_RESPONSE => {
                if fields.is_empty() {
                    return Err(Error::Deserialization(
                        "zkpok response is missing the trapdoor".to_string(),
                    ));
                }
                let trapdoor = fields.remove(0);
                Ok(Self::Response {
                    response: fields,
                    trapdoor,
                })
            }
            other => Err(Error::Deserialization(format!(
                "unknown zkpok message tag {other:#04x}"
            ))),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::TrapdoorKey(_) => "trapdoor key",
            Self::ChallengeCommitment(_) => "challenge commitment",
            Self::Commitment(_) => "commitment",
            Self::Opening { .. } => "opening",
            Self::Response { .. } => "response",
        }
    }
}

fn unexpected(expected: &str, got: &ZkPokMessage) -> Error {
    Error::Deserialization(format!("expected zkpok {expected}, got {}", got.kind()))
}

async fn receive<C: Channel>(channel: &mut C) -> Result<ZkPokMessage> {
    ZkPokMessage::from_bytes(&channel.receive().await?)
}

/// Proves knowledge of a witness for a Sigma statement.
#[derive(Debug)]
pub struct ZkPokProver<G: DlogGroup, S> {
    sigma: SigmaProver<G, S>,
    peer: Role,
}

impl<G: DlogGroup, S: SigmaStatement<G>> ZkPokProver<G, S> {
    /// # Errors
    ///
    /// Returns [`Error::SecurityLevel`] unless `2^soundness_bits < q`.
    pub fn new(group: Arc<G>, statement: S, soundness_bits: usize) -> Result<Self> {
        Ok(Self {
            sigma: SigmaProver::new(group, statement, soundness_bits)?,
            peer: Role::Verifier,
        })
    }

    /// Role blamed when the verifier misbehaves, e.g. `Role::Sender` when
    /// the proof runs inside an OT.
    pub fn with_peer_role(mut self, peer: Role) -> Self {
        self.peer = peer;
        self
    }

    pub fn sigma(&self) -> &SigmaProver<G, S> {
        &self.sigma
    }

    pub async fn prove<C: Channel>(
        &self,
        channel: &mut C,
        input: &S::Input,
        witness: &S::Witness,
    ) -> Result<()> {
        let group = self.sigma.group();
        let mut rng = SecureRng::new();

        let tau = group.random_exponent(&mut rng);
        let h = group.exponentiate_generator(&tau)?;
        channel
            .send(ZkPokMessage::TrapdoorKey(encode_element(group, &h)?).to_bytes()?)
            .await?;

        let com = match receive(channel).await? {
            ZkPokMessage::ChallengeCommitment(bytes) => {
                decode_element(group, &bytes, self.peer, "challenge commitment")?
            }
            other => return Err(unexpected("challenge commitment", &other)),
        };

        let (commitment, pending) = self.sigma.compute_first_message(input, witness, &mut rng)?;
        channel
            .send(ZkPokMessage::Commitment(encode_elements(group, &commitment)?).to_bytes()?)
            .await?;

        let (challenge, rho) = match receive(channel).await? {
            ZkPokMessage::Opening {
                challenge,
                randomness,
            } => (
                Challenge::from_bytes(self.sigma.soundness_bits(), &challenge, self.peer)?,
                decode_scalar(group, &randomness, "challenge opening")?,
            ),
            other => return Err(unexpected("opening", &other)),
        };
        let opened = group.multiply(
            &group.exponentiate(group.generator(), &rho)?,
            &group.exponentiate(&h, challenge.value())?,
        )?;
        if &rho >= group.order() || opened != com {
            warn!(role = %self.peer, "challenge opening does not match its commitment");
            return Err(Error::cheat(
                self.peer,
                "challenge opening does not match its commitment",
            ));
        }

        let response = pending.compute_second_message(&challenge)?;
        let message = ZkPokMessage::Response {
            response: encode_response(group, &response)?,
            trapdoor: encode_scalar(group, &tau)?,
        };
        channel.send(message.to_bytes()?).await?;
        debug!(statement = self.sigma.statement().name(), "zkpok prover finished");
        Ok(())
    }
}

/// Verifies a proof of knowledge produced by [`ZkPokProver`].
#[derive(Debug)]
pub struct ZkPokVerifier<G: DlogGroup, S> {
    sigma: SigmaVerifier<G, S>,
    peer: Role,
}

impl<G: DlogGroup, S: SigmaStatement<G>> ZkPokVerifier<G, S> {
    /// # Errors
    ///
    /// Returns [`Error::SecurityLevel`] unless `2^soundness_bits < q`.
    pub fn new(group: Arc<G>, statement: S, soundness_bits: usize) -> Result<Self> {
        Ok(Self {
            sigma: SigmaVerifier::new(group, statement, soundness_bits)?,
            peer: Role::Prover,
        })
    }

    /// Role blamed when the prover misbehaves.
    pub fn with_peer_role(mut self, peer: Role) -> Self {
        self.peer = peer;
        self
    }

    pub fn sigma(&self) -> &SigmaVerifier<G, S> {
        &self.sigma
    }

    /// Runs the verifier and returns whether the Sigma equation held.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CheatAttempt`] blaming the peer if an element it sent
    /// is not a group member or the revealed trapdoor does not open `h`.
    pub async fn verify<C: Channel>(&self, channel: &mut C, input: &S::Input) -> Result<bool> {
        let group = self.sigma.group();
        let statement = self.sigma.statement();
        let mut rng = SecureRng::new();

        let h = match receive(channel).await? {
            ZkPokMessage::TrapdoorKey(bytes) => {
                decode_element(group, &bytes, self.peer, "trapdoor key")?
            }
            other => return Err(unexpected("trapdoor key", &other)),
        };

        let challenge = self.sigma.sample_challenge(&mut rng);
        let rho = group.random_exponent(&mut rng);
        let com = group.multiply(
            &group.exponentiate_generator(&rho)?,
            &group.exponentiate_secret(&h, challenge.value())?,
        )?;
        channel
            .send(ZkPokMessage::ChallengeCommitment(encode_element(group, &com)?).to_bytes()?)
            .await?;

        let commitment = match receive(channel).await? {
            ZkPokMessage::Commitment(fields) => decode_commitment(
                group,
                &fields,
                statement.commitment_len(input),
                self.peer,
            )?,
            other => return Err(unexpected("commitment", &other)),
        };

        let opening = ZkPokMessage::Opening {
            challenge: challenge.to_bytes(),
            randomness: encode_scalar(group, &rho)?,
        };
        channel.send(opening.to_bytes()?).await?;

        let (response, tau) = match receive(channel).await? {
            ZkPokMessage::Response { response, trapdoor } => (
                decode_response(group, &response, statement.response_len(input))?,
                decode_scalar(group, &trapdoor, "trapdoor")?,
            ),
            other => return Err(unexpected("response", &other)),
        };
        if &tau >= group.order() || group.exponentiate(group.generator(), &tau)? != h {
            warn!(role = %self.peer, "trapdoor does not open the trapdoor key");
            return Err(Error::cheat(
                self.peer,
                "trapdoor does not open the trapdoor key",
            ));
        }

        let accepted = self.sigma.verify(input, &commitment, &challenge, &response)?;
        debug!(statement = statement.name(), accepted, "zkpok verification finished");
        Ok(accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::LocalChannel;
    use crate::groups::EcFpGroup;
    use crate::params::EcFpParams;
    use crate::sigma::SigmaDlog;
    use num_bigint::BigUint;

    fn toy_curve() -> Arc<EcFpGroup> {
        Arc::new(
            EcFpGroup::new(EcFpParams {
                name: "toy-10007".to_string(),
                p: BigUint::from(10007u32),
                a: BigUint::from(10004u32),
                b: BigUint::from(7u32),
                gx: BigUint::from(2u32),
                gy: BigUint::from(3u32),
                q: BigUint::from(10193u32),
                cofactor: BigUint::from(1u32),
            })
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn honest_run_is_accepted_and_wrong_witness_rejected() {
        let group = toy_curve();
        let prover = ZkPokProver::new(group.clone(), SigmaDlog, 10).unwrap();
        let verifier = ZkPokVerifier::new(group.clone(), SigmaDlog, 10).unwrap();
        let w = BigUint::from(1234u32);
        let h = group.exponentiate_generator(&w).unwrap();

        let (mut a, mut b) = LocalChannel::pair();
        let (proved, accepted) =
            tokio::join!(prover.prove(&mut a, &h, &w), verifier.verify(&mut b, &h));
        proved.unwrap();
        assert!(accepted.unwrap());

        let (mut a, mut b) = LocalChannel::pair();
        let wrong = BigUint::from(4321u32);
        let (proved, accepted) =
            tokio::join!(prover.prove(&mut a, &h, &wrong), verifier.verify(&mut b, &h));
        proved.unwrap();
        assert!(!accepted.unwrap());
    }

    #[tokio::test]
    async fn prover_rejects_a_false_opening() {
        let group = toy_curve();
        let prover = ZkPokProver::new(group.clone(), SigmaDlog, 10)
            .unwrap()
            .with_peer_role(Role::Sender);
        let w = BigUint::from(77u32);
        let h = group.exponentiate_generator(&w).unwrap();
        let (mut a, mut b) = LocalChannel::pair();

        let cheating_verifier = async {
            let key = match ZkPokMessage::from_bytes(&b.receive().await.unwrap()).unwrap() {
                ZkPokMessage::TrapdoorKey(bytes) => {
                    group.reconstruct_element(&bytes, true).unwrap()
                }
                other => panic!("unexpected {other:?}"),
            };
            // g^7 * h^3 never equals the opened g^6 * h^3
            let com = group
                .multiply(
                    &group.exponentiate_generator(&BigUint::from(7u32)).unwrap(),
                    &group.exponentiate(&key, &BigUint::from(3u32)).unwrap(),
                )
                .unwrap();
            let msg = ZkPokMessage::ChallengeCommitment(encode_element(&*group, &com).unwrap());
            b.send(msg.to_bytes().unwrap()).await.unwrap();
            let _commitment = b.receive().await.unwrap();
            let opening = ZkPokMessage::Opening {
                challenge: Challenge::new(10, BigUint::from(3u32)).unwrap().to_bytes(),
                randomness: encode_scalar(&*group, &BigUint::from(6u32)).unwrap(),
            };
            b.send(opening.to_bytes().unwrap()).await.unwrap();
        };
        let (proved, ()) = tokio::join!(prover.prove(&mut a, &h, &w), cheating_verifier);
        assert!(matches!(
            proved.unwrap_err(),
            Error::CheatAttempt {
                role: Role::Sender,
                ..
            }
        ));
    }

    #[test]
    fn message_round_trip() {
        let message = ZkPokMessage::Response {
            response: vec![vec![1, 2], vec![3]],
            trapdoor: vec![9],
        };
        let bytes = message.to_bytes().unwrap();
        assert_eq!(ZkPokMessage::from_bytes(&bytes).unwrap(), message);
        let opening = Frame::new(TAG_OPENING, vec![vec![1]]).to_bytes().unwrap();
        assert!(ZkPokMessage::from_bytes(&opening).is_err());
    }
}
