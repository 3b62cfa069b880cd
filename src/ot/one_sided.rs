//! OT with one-sided simulation from the DDH assumption.
//!
//! # Threat model
//!
//! Security is simulation-based against a malicious sender and holds only
//! against a semi-honest receiver (the receiver's privacy is protected
//! against a malicious sender, the sender's privacy only against a receiver
//! that follows the protocol up to the proof of knowledge). This is NOT a
//! fully malicious-secure OT.
//!
//! # Flow, per transfer
//!
//! 1. R samples `alpha, beta, gamma` with `gamma != alpha * beta` and sends
//!    `x = g^alpha`, `y = g^beta`, `z_sigma = g^(alpha*beta)`,
//!    `z_{1-sigma} = g^gamma`.
//! 2. R proves knowledge of every `alpha` (ZKPOK of an AND of dlogs).
//! 3. S checks membership of `x, y, z0, z1` and `z0 != z1`, then verifies
//!    the proof.
//! 4. S samples `u_i, v_i` and sends `w_i = x^u_i * g^v_i` with
//!    `c_i = mask(x_i, z_i^u_i * y^v_i)`.
//! 5. R checks membership of `w0, w1` and outputs
//!    `unmask(c_sigma, w_sigma^beta)`.

use std::sync::Arc;

use num_bigint::BigUint;
use tracing::{debug, warn};

use super::{
    chunk_fields, element_label, unexpected, ChoiceBit, OtMessage, OtReceiverInput,
    OtReceiverOutput, OtSenderInput, PayloadCodec, SecurityLevel,
};
use crate::channel::Channel;
use crate::crypto::DlogGroup;
use crate::sigma::{SigmaAnd, SigmaDlog, ZkPokProver, ZkPokVerifier};
use crate::wire::{decode_element, encode_element};
use crate::{Error, Result, Role, SecureRng};

/// Receiver secrets of one transfer. `BigUint` cannot be zeroized, so
/// these live only for the duration of one `transfer` call.
struct ReceiverSecrets {
    alpha: BigUint,
    beta: BigUint,
}

#[derive(Debug)]
pub struct OneSidedOtSender<G: DlogGroup, P> {
    group: Arc<G>,
    codec: P,
    zkpok: ZkPokVerifier<G, SigmaAnd<SigmaDlog>>,
}

impl<G: DlogGroup, P: PayloadCodec<G>> OneSidedOtSender<G, P> {
    /// # Errors
    ///
    /// Returns [`Error::SecurityLevel`] unless `2^soundness_bits < q`.
    pub fn new(group: Arc<G>, codec: P, soundness_bits: usize) -> Result<Self> {
        let zkpok = ZkPokVerifier::new(group.clone(), SigmaAnd::new(SigmaDlog), soundness_bits)?
            .with_peer_role(Role::Receiver);
        Ok(Self {
            group,
            codec,
            zkpok,
        })
    }

    pub fn security_level(&self) -> SecurityLevel {
        SecurityLevel::OneSidedSimulation
    }

    pub async fn transfer<C: Channel>(
        &self,
        channel: &mut C,
        input: &OtSenderInput<P::Plaintext>,
    ) -> Result<()> {
        let group = &*self.group;
        let transfers = input.len();
        let fields = match OtMessage::from_bytes(&channel.receive().await?)? {
            OtMessage::ReceiverTuples(fields) => fields,
            other => return Err(unexpected("receiver tuples", &other)),
        };

        let mut xs = Vec::with_capacity(transfers);
        let mut keys_input = Vec::with_capacity(transfers);
        for (i, tuple) in chunk_fields(&fields, transfers, 4, "one-sided receiver tuples")?
            .iter()
            .enumerate()
        {
            let label = |name| element_label(name, i, transfers);
            let x = decode_element(group, &tuple[0], Role::Receiver, &label("x"))?;
            let y = decode_element(group, &tuple[1], Role::Receiver, &label("y"))?;
            let z0 = decode_element(group, &tuple[2], Role::Receiver, &label("z0"))?;
            let z1 = decode_element(group, &tuple[3], Role::Receiver, &label("z1"))?;
            if z0 == z1 {
                let check = format!("{} equals {}", label("z0"), label("z1"));
                warn!(role = %Role::Receiver, check = %check, "receiver tuple is degenerate");
                return Err(Error::cheat(Role::Receiver, check));
            }
            xs.push(x.clone());
            keys_input.push((x, y, z0, z1));
        }

        if !self.zkpok.verify(channel, &xs).await? {
            warn!(role = %Role::Receiver, "proof of knowledge of alpha was rejected");
            return Err(Error::cheat(
                Role::Receiver,
                "proof of knowledge of alpha was rejected",
            ));
        }

        let mut rng = SecureRng::new();
        let g = group.generator();
        let mut reply = Vec::with_capacity(4 * transfers);
        for ((x, y, z0, z1), (x0, x1)) in keys_input.iter().zip(&input.pairs) {
            for (z, plaintext) in [(z0, x0), (z1, x1)] {
                let u = group.random_exponent(&mut rng);
                let v = group.random_exponent(&mut rng);
                let w = group.multiply(
                    &group.exponentiate_secret(x, &u)?,
                    &group.exponentiate_secret(g, &v)?,
                )?;
                let key = group.multiply(
                    &group.exponentiate_secret(z, &u)?,
                    &group.exponentiate_secret(y, &v)?,
                )?;
                reply.push(encode_element(group, &w)?);
                reply.push(
                    self.codec
                        .encode_masked(group, &self.codec.mask(group, plaintext, &key)?)?,
                );
            }
        }
        channel
            .send(OtMessage::SenderOneSided(reply).to_bytes()?)
            .await?;
        debug!(transfers, group = group.name(), "one-sided OT sender finished");
        Ok(())
    }
}

#[derive(Debug)]
pub struct OneSidedOtReceiver<G: DlogGroup, P> {
    group: Arc<G>,
    codec: P,
    zkpok: ZkPokProver<G, SigmaAnd<SigmaDlog>>,
}

impl<G: DlogGroup, P: PayloadCodec<G>> OneSidedOtReceiver<G, P> {
    /// # Errors
    ///
    /// Returns [`Error::SecurityLevel`] unless `2^soundness_bits < q`.
    pub fn new(group: Arc<G>, codec: P, soundness_bits: usize) -> Result<Self> {
        let zkpok = ZkPokProver::new(group.clone(), SigmaAnd::new(SigmaDlog), soundness_bits)?
            .with_peer_role(Role::Sender);
        Ok(Self {
            group,
            codec,
            zkpok,
        })
    }

    pub fn security_level(&self) -> SecurityLevel {
        SecurityLevel::OneSidedSimulation
    }

    pub async fn transfer<C: Channel>(
        &self,
        channel: &mut C,
        input: &OtReceiverInput,
    ) -> Result<OtReceiverOutput<P::Plaintext>> {
        let group = &*self.group;
        let q = group.order();
        let transfers = input.len();
        let mut rng = SecureRng::new();

        let mut secrets = Vec::with_capacity(transfers);
        let mut xs = Vec::with_capacity(transfers);
        let mut tuples = Vec::with_capacity(4 * transfers);
        for &choice in &input.choices {
            let alpha = group.random_exponent(&mut rng);
            let beta = group.random_exponent(&mut rng);
            let alpha_beta = (&alpha * &beta) % q;
            let gamma = loop {
                let gamma = group.random_exponent(&mut rng);
                if gamma != alpha_beta {
                    break gamma;
                }
            };
            let x = group.exponentiate_generator(&alpha)?;
            let y = group.exponentiate_generator(&beta)?;
            let chosen = group.exponentiate_generator(&alpha_beta)?;
            let other = group.exponentiate_generator(&gamma)?;
            let (z0, z1) = match choice {
                ChoiceBit::Zero => (chosen, other),
                ChoiceBit::One => (other, chosen),
            };
            for element in [&x, &y, &z0, &z1] {
                tuples.push(encode_element(group, element)?);
            }
            xs.push(x);
            secrets.push(ReceiverSecrets { alpha, beta });
        }
        channel
            .send(OtMessage::ReceiverTuples(tuples).to_bytes()?)
            .await?;

        let alphas: Vec<BigUint> = secrets.iter().map(|s| s.alpha.clone()).collect();
        self.zkpok.prove(channel, &xs, &alphas).await?;

        let fields = match OtMessage::from_bytes(&channel.receive().await?)? {
            OtMessage::SenderOneSided(fields) => fields,
            other => return Err(unexpected("one-sided sender message", &other)),
        };
        let replies = chunk_fields(&fields, transfers, 4, "one-sided sender message")?;

        let mut values = Vec::with_capacity(transfers);
        for (i, ((reply, &choice), secret)) in replies
            .iter()
            .zip(&input.choices)
            .zip(&secrets)
            .enumerate()
        {
            let label = |name| element_label(name, i, transfers);
            let w0 = decode_element(group, &reply[0], Role::Sender, &label("w0"))?;
            let c0 = self.codec.decode_masked(group, &reply[1], &label("c0"))?;
            let w1 = decode_element(group, &reply[2], Role::Sender, &label("w1"))?;
            let c1 = self.codec.decode_masked(group, &reply[3], &label("c1"))?;

            let (w, c) = choice.select(((w0, c0), (w1, c1)));
            let key = group.exponentiate_secret(&w, &secret.beta)?;
            values.push(self.codec.unmask(group, &c, &key)?);
        }
        debug!(transfers, group = group.name(), "one-sided OT receiver finished");
        Ok(OtReceiverOutput { values })
    }
}
