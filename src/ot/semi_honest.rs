//! Semi-honest OT from the DDH assumption.
//!
//! Receiver: `h_sigma = g^alpha`, `h_{1-sigma}` a random element.
//! Sender: `u = g^r`, `c_i = mask(x_i, h_i^r)`.
//! Receiver: `x_sigma = unmask(c_sigma, u^alpha)`.
//!
//! Secure only if both parties follow the protocol.

use std::sync::Arc;

use num_bigint::BigUint;
use tracing::debug;

use super::{
    chunk_fields, element_label, unexpected, ChoiceBit, OtMessage, OtReceiverInput,
    OtReceiverOutput, OtSenderInput, PayloadCodec, SecurityLevel,
};
use crate::channel::Channel;
use crate::crypto::DlogGroup;
use crate::wire::{decode_element, encode_element};
use crate::{Result, Role, SecureRng};

#[derive(Debug)]
pub struct SemiHonestOtSender<G, P> {
    group: Arc<G>,
    codec: P,
}

impl<G: DlogGroup, P: PayloadCodec<G>> SemiHonestOtSender<G, P> {
    pub fn new(group: Arc<G>, codec: P) -> Self {
        Self { group, codec }
    }

    pub fn security_level(&self) -> SecurityLevel {
        SecurityLevel::SemiHonest
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
        let tuples = chunk_fields(&fields, transfers, 2, "semi-honest receiver tuples")?;

        let mut rng = SecureRng::new();
        let mut reply = Vec::with_capacity(3 * transfers);
        for (i, (tuple, (x0, x1))) in tuples.iter().zip(&input.pairs).enumerate() {
            let label = |name| element_label(name, i, transfers);
            let h0 = decode_element(group, &tuple[0], Role::Receiver, &label("h0"))?;
            let h1 = decode_element(group, &tuple[1], Role::Receiver, &label("h1"))?;

            let r = group.random_exponent(&mut rng);
            let u = group.exponentiate_generator(&r)?;
            let k0 = group.exponentiate_secret(&h0, &r)?;
            let k1 = group.exponentiate_secret(&h1, &r)?;
            reply.push(encode_element(group, &u)?);
            let c0 = self.codec.mask(group, x0, &k0)?;
            let c1 = self.codec.mask(group, x1, &k1)?;
            reply.push(self.codec.encode_masked(group, &c0)?);
            reply.push(self.codec.encode_masked(group, &c1)?);
        }
        channel
            .send(OtMessage::SenderSemiHonest(reply).to_bytes()?)
            .await?;
        debug!(transfers, group = group.name(), "semi-honest OT sender finished");
        Ok(())
    }
}

#[derive(Debug)]
pub struct SemiHonestOtReceiver<G, P> {
    group: Arc<G>,
    codec: P,
}

impl<G: DlogGroup, P: PayloadCodec<G>> SemiHonestOtReceiver<G, P> {
    pub fn new(group: Arc<G>, codec: P) -> Self {
        Self { group, codec }
    }

    pub fn security_level(&self) -> SecurityLevel {
        SecurityLevel::SemiHonest
    }

    pub async fn transfer<C: Channel>(
        &self,
        channel: &mut C,
        input: &OtReceiverInput,
    ) -> Result<OtReceiverOutput<P::Plaintext>> {
        let group = &*self.group;
        let transfers = input.len();
        let mut rng = SecureRng::new();

        let mut alphas: Vec<BigUint> = Vec::with_capacity(transfers);
        let mut tuples = Vec::with_capacity(2 * transfers);
        for &choice in &input.choices {
            let alpha = group.random_exponent(&mut rng);
            let chosen = group.exponentiate_generator(&alpha)?;
            let other = group.random_element(&mut rng)?;
            let (h0, h1) = match choice {
                ChoiceBit::Zero => (chosen, other),
                ChoiceBit::One => (other, chosen),
            };
            tuples.push(encode_element(group, &h0)?);
            tuples.push(encode_element(group, &h1)?);
            alphas.push(alpha);
        }
        channel
            .send(OtMessage::ReceiverTuples(tuples).to_bytes()?)
            .await?;

        let fields = match OtMessage::from_bytes(&channel.receive().await?)? {
            OtMessage::SenderSemiHonest(fields) => fields,
            other => return Err(unexpected("semi-honest sender message", &other)),
        };
        let replies = chunk_fields(&fields, transfers, 3, "semi-honest sender message")?;

        let mut values = Vec::with_capacity(transfers);
        let received = replies.iter().zip(&input.choices).zip(&alphas);
        for (i, ((reply, &choice), alpha)) in received.enumerate() {
            let label = |name| element_label(name, i, transfers);
            let u = decode_element(group, &reply[0], Role::Sender, &label("u"))?;
            let c0 = self.codec.decode_masked(group, &reply[1], &label("c0"))?;
            let c1 = self.codec.decode_masked(group, &reply[2], &label("c1"))?;
            let key = group.exponentiate_secret(&u, alpha)?;
            values.push(self.codec.unmask(group, &choice.select((c0, c1)), &key)?);
        }
        debug!(transfers, group = group.name(), "semi-honest OT receiver finished");
        Ok(OtReceiverOutput { values })
    }
}
