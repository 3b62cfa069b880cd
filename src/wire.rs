//! Versioned, tagged frames for protocol messages.
//!
//! Layout: `[version u8][tag u8][count u32 BE]` followed by `count` fields,
//! each `[len u32 BE][bytes]`. Every protocol message alphabet maps its
//! variants onto tags and decodes a [`Frame`] exactly once on receipt.

use num_bigint::BigUint;
use tracing::warn;

use crate::crypto::field::to_be_padded;
use crate::crypto::DlogGroup;
use crate::{Error, Result, Role};

/// Current wire format version.
pub const WIRE_VERSION: u8 = 1;

/// Maximum number of fields in one frame.
pub const MAX_FIELDS: usize = 1 << 16;

/// Maximum size of one field in bytes.
pub const MAX_FIELD_LEN: usize = 1 << 20;

/// Curve points travel in compressed form.
pub const COMPRESSED_POINTS: bool = true;

const HEADER_LEN: usize = 1 + 1 + 4;

/// A tagged list of opaque byte fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub tag: u8,
    pub fields: Vec<Vec<u8>>,
}

impl Frame {
    pub fn new(tag: u8, fields: Vec<Vec<u8>>) -> Self {
        Self { tag, fields }
    }

    /// Serializes the frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the frame exceeds the field caps.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        if self.fields.len() > MAX_FIELDS {
            return Err(Error::InvalidInput(format!(
                "frame has {} fields, limit is {MAX_FIELDS}",
                self.fields.len()
            )));
        }
        let body: usize = self.fields.iter().map(|f| 4 + f.len()).sum();
        let mut out = Vec::with_capacity(HEADER_LEN + body);
        out.push(WIRE_VERSION);
        out.push(self.tag);
        out.extend_from_slice(&(self.fields.len() as u32).to_be_bytes());
        for field in &self.fields {
            if field.len() > MAX_FIELD_LEN {
                return Err(Error::InvalidInput(format!(
                    "field of {} bytes exceeds limit of {MAX_FIELD_LEN}",
                    field.len()
                )));
            }
            out.extend_from_slice(&(field.len() as u32).to_be_bytes());
            out.extend_from_slice(field);
        }
        Ok(out)
    }

    /// Parses a frame from untrusted bytes.
    ///
    /// The tag is not interpreted here; message alphabets reject unknown tags.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(Error::Deserialization(format!(
                "frame too small: {} bytes",
                bytes.len()
            )));
        }
        if bytes[0] != WIRE_VERSION {
            return Err(Error::Deserialization(format!(
                "unsupported wire version: {}",
                bytes[0]
            )));
        }
        let tag = bytes[1];
        let count = read_u32(bytes, 2)? as usize;
        if count > MAX_FIELDS {
            return Err(Error::Deserialization(format!(
                "frame declares {count} fields, limit is {MAX_FIELDS}"
            )));
        }

        let mut pos = HEADER_LEN;
        let mut fields = Vec::with_capacity(count.min(64));
        for index in 0..count {
            let len = read_u32(bytes, pos)? as usize;
            pos += 4;
            if len > MAX_FIELD_LEN {
                return Err(Error::Deserialization(format!(
                    "field {index} declares {len} bytes, limit is {MAX_FIELD_LEN}"
                )));
            }
            let end = pos
                .checked_add(len)
                .filter(|end| *end <= bytes.len())
                .ok_or_else(|| {
                    Error::Deserialization(format!("truncated frame: incomplete field {index}"))
                })?;
            fields.push(bytes[pos..end].to_vec());
            pos = end;
        }
        if pos != bytes.len() {
            return Err(Error::Deserialization(format!(
                "{} trailing bytes after frame",
                bytes.len() - pos
            )));
        }
        Ok(Self { tag, fields })
    }

    /// Fails unless the frame carries exactly `expected` fields.
    pub fn expect_fields(&self, expected: usize, message: &str) -> Result<()> {
        if self.fields.len() != expected {
            return Err(Error::Deserialization(format!(
                "{message}: expected {expected} fields, got {}",
                self.fields.len()
            )));
        }
        Ok(())
    }
}

fn read_u32(bytes: &[u8], pos: usize) -> Result<u32> {
    bytes
        .get(pos..pos + 4)
        .and_then(|slice| slice.try_into().ok())
        .map(u32::from_be_bytes)
        .ok_or_else(|| Error::Deserialization(format!("truncated frame at offset {pos}")))
}

/// Wire encoding of one group element.
pub fn encode_element<G: DlogGroup>(group: &G, element: &G::Element) -> Result<Vec<u8>> {
    group.encode_element(element, COMPRESSED_POINTS)
}

pub fn encode_elements<G: DlogGroup>(group: &G, elements: &[G::Element]) -> Result<Vec<Vec<u8>>> {
    elements.iter().map(|e| encode_element(group, e)).collect()
}

/// Reconstructs an element received from `sender` and checks membership.
///
/// # Errors
///
/// - [`Error::Deserialization`] if the bytes do not form a candidate element.
/// - [`Error::CheatAttempt`] blaming `sender` if the candidate is not a member;
///   the check is labelled `"{label} is not a member of the group"`.
pub fn decode_element<G: DlogGroup>(
    group: &G,
    bytes: &[u8],
    sender: Role,
    label: &str,
) -> Result<G::Element> {
    let candidate = group.reconstruct_element(bytes, COMPRESSED_POINTS)?;
    if !group.is_member(&candidate)? {
        warn!(role = %sender, element = label, group = group.name(), "membership check failed");
        return Err(Error::cheat(
            sender,
            format!("{label} is not a member of the group"),
        ));
    }
    Ok(candidate)
}

/// Fixed-length big-endian encoding of an exponent.
pub fn encode_scalar<G: DlogGroup>(group: &G, scalar: &BigUint) -> Result<Vec<u8>> {
    to_be_padded(scalar, group.scalar_byte_len())
}

/// Parses an exponent; range checks are left to the consumer.
pub fn decode_scalar<G: DlogGroup>(group: &G, bytes: &[u8], label: &str) -> Result<BigUint> {
    if bytes.len() != group.scalar_byte_len() {
        return Err(Error::Deserialization(format!(
            "{label}: expected {} scalar bytes, got {}",
            group.scalar_byte_len(),
            bytes.len()
        )));
    }
    Ok(BigUint::from_bytes_be(bytes))
}
