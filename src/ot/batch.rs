use std::sync::Arc;

use tracing::{info_span, Instrument};

use super::{
    OneSidedOtReceiver, OneSidedOtSender, OtReceiverInput, OtReceiverOutput, OtSenderInput,
    PayloadCodec, SecurityLevel, SemiHonestOtReceiver, SemiHonestOtSender,
};
use crate::channel::Channel;
use crate::crypto::DlogGroup;
use crate::Result;

#[derive(Debug)]
enum SenderEngine<G: DlogGroup, P> {
    SemiHonest(SemiHonestOtSender<G, P>),
    OneSided(OneSidedOtSender<G, P>),
}

/// OT sender that can be shared, e.g. through an `Arc`, by many concurrent
/// transfers.
///
/// Each [`transfer`](Self::transfer) call owns its channel, samples with its
/// own RNG and keeps its state on its own stack; only the group is shared.
#[derive(Debug)]
pub struct OtBatchSender<G: DlogGroup, P> {
    engine: SenderEngine<G, P>,
}

impl<G: DlogGroup, P: PayloadCodec<G>> OtBatchSender<G, P> {
    /// `soundness_bits` sizes the receiver's proof of knowledge and is only
    /// used at [`SecurityLevel::OneSidedSimulation`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::SecurityLevel`] if the group order is too
    /// small for `soundness_bits`.
    pub fn new(
        group: Arc<G>,
        codec: P,
        level: SecurityLevel,
        soundness_bits: usize,
    ) -> Result<Self> {
        let engine = match level {
            SecurityLevel::SemiHonest => {
                SenderEngine::SemiHonest(SemiHonestOtSender::new(group, codec))
            }
            SecurityLevel::OneSidedSimulation => {
                SenderEngine::OneSided(OneSidedOtSender::new(group, codec, soundness_bits)?)
            }
        };
        Ok(Self { engine })
    }

    pub fn security_level(&self) -> SecurityLevel {
        match &self.engine {
            SenderEngine::SemiHonest(s) => s.security_level(),
            SenderEngine::OneSided(s) => s.security_level(),
        }
    }

    pub async fn transfer<C: Channel>(
        &self,
        channel: &mut C,
        input: &OtSenderInput<P::Plaintext>,
    ) -> Result<()> {
        let span = info_span!("ot_send", level = %self.security_level(), transfers = input.len());
        match &self.engine {
            SenderEngine::SemiHonest(s) => s.transfer(channel, input).instrument(span).await,
            SenderEngine::OneSided(s) => s.transfer(channel, input).instrument(span).await,
        }
    }
}

#[derive(Debug)]
enum ReceiverEngine<G: DlogGroup, P> {
    SemiHonest(SemiHonestOtReceiver<G, P>),
    OneSided(OneSidedOtReceiver<G, P>),
}

/// OT receiver counterpart of [`OtBatchSender`].
#[derive(Debug)]
pub struct OtBatchReceiver<G: DlogGroup, P> {
    engine: ReceiverEngine<G, P>,
}

impl<G: DlogGroup, P: PayloadCodec<G>> OtBatchReceiver<G, P> {
    /// # Errors
    ///
    /// Returns [`crate::Error::SecurityLevel`] if the group order is too
    /// small for `soundness_bits`.
    pub fn new(
        group: Arc<G>,
        codec: P,
        level: SecurityLevel,
        soundness_bits: usize,
    ) -> Result<Self> {
        let engine = match level {
            SecurityLevel::SemiHonest => {
                ReceiverEngine::SemiHonest(SemiHonestOtReceiver::new(group, codec))
            }
            SecurityLevel::OneSidedSimulation => {
                ReceiverEngine::OneSided(OneSidedOtReceiver::new(group, codec, soundness_bits)?)
            }
        };
        Ok(Self { engine })
    }

    pub fn security_level(&self) -> SecurityLevel {
        match &self.engine {
            ReceiverEngine::SemiHonest(r) => r.security_level(),
            ReceiverEngine::OneSided(r) => r.security_level(),
        }
    }

    pub async fn transfer<C: Channel>(
        &self,
        channel: &mut C,
        input: &OtReceiverInput,
    ) -> Result<OtReceiverOutput<P::Plaintext>> {
        let span = info_span!(
            "ot_receive",
            level = %self.security_level(),
            transfers = input.len()
        );
        match &self.engine {
            ReceiverEngine::SemiHonest(r) => r.transfer(channel, input).instrument(span).await,
            ReceiverEngine::OneSided(r) => r.transfer(channel, input).instrument(span).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigUint;

    use super::*;
    use crate::channel::LocalChannel;
    use crate::groups::ZpGroup;
    use crate::ot::{ByteArrayPayload, ChoiceBit};
    use crate::params::ZpParams;
    use crate::Error;

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
    fn one_sided_needs_room_for_the_challenge() {
        let err = OtBatchSender::new(toy(), ByteArrayPayload, SecurityLevel::OneSidedSimulation, 8)
            .unwrap_err();
        assert!(matches!(err, Error::SecurityLevel(_)));
        let sender =
            OtBatchSender::new(toy(), ByteArrayPayload, SecurityLevel::SemiHonest, 8).unwrap();
        assert_eq!(sender.security_level(), SecurityLevel::SemiHonest);
    }

    #[tokio::test]
    async fn byte_payloads_over_both_levels() {
        for level in [SecurityLevel::SemiHonest, SecurityLevel::OneSidedSimulation] {
            let sender = OtBatchSender::new(toy(), ByteArrayPayload, level, 3).unwrap();
            let receiver = OtBatchReceiver::new(toy(), ByteArrayPayload, level, 3).unwrap();
            let input = OtSenderInput::new(vec![
                (b"left-0".to_vec(), b"right-0".to_vec()),
                (b"left-1".to_vec(), b"right-1".to_vec()),
            ])
            .unwrap();
            let choices = OtReceiverInput::new(vec![ChoiceBit::One, ChoiceBit::Zero]).unwrap();

            let (mut a, mut b) = LocalChannel::pair();
            let (sent, received) =
                tokio::join!(sender.transfer(&mut a, &input), receiver.transfer(&mut b, &choices));
            sent.unwrap();
            assert_eq!(
                received.unwrap().values,
                vec![b"right-0".to_vec(), b"left-1".to_vec()]
            );
        }
    }
}
