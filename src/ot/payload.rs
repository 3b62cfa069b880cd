use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::crypto::DlogGroup;
use crate::wire::{decode_element, encode_element};
use crate::{Error, Result, Role};

/// Domain separation tag for the byte-array key derivation.
const KDF_DST: &[u8] = b"dlog-protocols ot kdf v1";

/// How an OT sender hides a plaintext under a DDH key `k`, and how the
/// receiver recovers it.
///
/// `unmask(mask(x, k), k) == x` for every plaintext and key.
pub trait PayloadCodec<G: DlogGroup>: Clone + Send + Sync + 'static {
    type Plaintext: Clone + Send + Sync;
    type Masked: Clone + Send + Sync;

    fn mask(&self, group: &G, plaintext: &Self::Plaintext, key: &G::Element)
        -> Result<Self::Masked>;

    fn unmask(&self, group: &G, masked: &Self::Masked, key: &G::Element)
        -> Result<Self::Plaintext>;

    fn encode_masked(&self, group: &G, masked: &Self::Masked) -> Result<Vec<u8>>;

    /// Parses a masked value received from the sender.
    ///
    /// # Errors
    ///
    /// Codecs whose masked values are group elements return a cheat attempt
    /// by the sender, labelled with `label`, for a non-member.
    fn decode_masked(&self, group: &G, bytes: &[u8], label: &str) -> Result<Self::Masked>;
}

/// Plaintexts are group elements, masked by multiplication: `c = x * k`.
#[derive(Clone, Copy, Debug, Default)]
pub struct GroupElementPayload;

impl<G: DlogGroup> PayloadCodec<G> for GroupElementPayload {
    type Plaintext = G::Element;
    type Masked = G::Element;

    fn mask(&self, group: &G, plaintext: &G::Element, key: &G::Element) -> Result<G::Element> {
        group.multiply(plaintext, key)
    }

    fn unmask(&self, group: &G, masked: &G::Element, key: &G::Element) -> Result<G::Element> {
        group.divide(masked, key)
    }

    fn encode_masked(&self, group: &G, masked: &G::Element) -> Result<Vec<u8>> {
        encode_element(group, masked)
    }

    fn decode_masked(&self, group: &G, bytes: &[u8], label: &str) -> Result<G::Element> {
        decode_element(group, bytes, Role::Sender, label)
    }
}

/// Plaintexts are byte strings, masked as `c = x XOR KDF(k, |x|)`.
///
/// The KDF is SHA-256 in counter mode over the encoded key.
#[derive(Clone, Copy, Debug, Default)]
pub struct ByteArrayPayload;

impl ByteArrayPayload {
    fn keystream<G: DlogGroup>(
        group: &G,
        key: &G::Element,
        len: usize,
    ) -> Result<Zeroizing<Vec<u8>>> {
        let encoded = Zeroizing::new(encode_element(group, key)?);
        let mut stream = Zeroizing::new(Vec::with_capacity(len.next_multiple_of(32)));
        let mut counter: u32 = 0;
        while stream.len() < len {
            let block = Sha256::new()
                .chain_update(KDF_DST)
                .chain_update((encoded.len() as u32).to_be_bytes())
                .chain_update(encoded.as_slice())
                .chain_update(counter.to_be_bytes())
                .finalize();
            stream.extend_from_slice(&block);
            counter = counter.checked_add(1).ok_or_else(|| {
                Error::InvalidInput(format!("payload of {len} bytes is too long to mask"))
            })?;
        }
        stream.truncate(len);
        Ok(stream)
    }

    fn xor<G: DlogGroup>(group: &G, data: &[u8], key: &G::Element) -> Result<Vec<u8>> {
        let stream = Self::keystream(group, key, data.len())?;
        Ok(data.iter().zip(stream.iter()).map(|(d, s)| d ^ s).collect())
    }
}

impl<G: DlogGroup> PayloadCodec<G> for ByteArrayPayload {
    type Plaintext = Vec<u8>;
    type Masked = Vec<u8>;

    fn mask(&self, group: &G, plaintext: &Vec<u8>, key: &G::Element) -> Result<Vec<u8>> {
        Self::xor(group, plaintext, key)
    }

    fn unmask(&self, group: &G, masked: &Vec<u8>, key: &G::Element) -> Result<Vec<u8>> {
        Self::xor(group, masked, key)
    }

    fn encode_masked(&self, _group: &G, masked: &Vec<u8>) -> Result<Vec<u8>> {
        Ok(masked.clone())
    }

    fn decode_masked(&self, _group: &G, bytes: &[u8], _label: &str) -> Result<Vec<u8>> {
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigUint;

    use super::*;
    use crate::groups::ZpGroup;
    use crate::params::ZpParams;

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
    fn byte_payload_masks_and_unmasks() {
        let group = toy();
        let key = group.exponentiate_generator(&BigUint::from(3u32)).unwrap();
        let other = group.exponentiate_generator(&BigUint::from(4u32)).unwrap();
        let plaintext = b"a message longer than one sha-256 block of keystream".to_vec();

        let masked = ByteArrayPayload.mask(&group, &plaintext, &key).unwrap();
        assert_ne!(masked, plaintext);
        assert_eq!(ByteArrayPayload.unmask(&group, &masked, &key).unwrap(), plaintext);
        assert_ne!(ByteArrayPayload.unmask(&group, &masked, &other).unwrap(), plaintext);
    }

    #[test]
    fn group_payload_rejects_non_members() {
        let group = toy();
        let key = group.exponentiate_generator(&BigUint::from(5u32)).unwrap();
        let x = group.exponentiate_generator(&BigUint::from(2u32)).unwrap();
        let c = GroupElementPayload.mask(&group, &x, &key).unwrap();
        assert_eq!(GroupElementPayload.unmask(&group, &c, &key).unwrap(), x);

        let bad = group
            .encode_element(&group.element_unchecked(BigUint::from(5u32)), false)
            .unwrap();
        let err = PayloadCodec::<ZpGroup>::decode_masked(&GroupElementPayload, &group, &bad, "c0")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::CheatAttempt {
                role: Role::Sender,
                ref check,
            } if check == "c0 is not a member of the group"
        ));
    }
}
