//! DDH-based oblivious transfer.
//!
//! A sender holds pairs `(x0, x1)`, a receiver holds one [`ChoiceBit`] per
//! pair and learns exactly `x_sigma`. Two security levels are offered:
//!
//! - [`SecurityLevel::SemiHonest`]: both parties follow the protocol.
//! - [`SecurityLevel::OneSidedSimulation`]: simulatable against a malicious
//!   sender, private (but not simulatable) against a malicious receiver. The
//!   receiver checks every element it gets for group membership and proves
//!   knowledge of its secret exponents; it is NOT fully malicious-secure.
//!
//! Payload handling is abstracted by [`PayloadCodec`], so the same engines
//! transfer group elements or byte strings.

/// Façade running many independent transfers concurrently.
pub mod batch;
/// One-sided-simulation sender and receiver.
pub mod one_sided;
/// How plaintexts are masked with a DDH key.
pub mod payload;
/// Semi-honest sender and receiver.
pub mod semi_honest;

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::wire::Frame;
use crate::{Error, Result};

pub use batch::{OtBatchReceiver, OtBatchSender};
pub use one_sided::{OneSidedOtReceiver, OneSidedOtSender};
pub use payload::{ByteArrayPayload, GroupElementPayload, PayloadCodec};
pub use semi_honest::{SemiHonestOtReceiver, SemiHonestOtSender};

/// Adversary model an OT implementation is proven secure in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityLevel {
    SemiHonest,
    /// Malicious sender, semi-honest receiver.
    OneSidedSimulation,
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecurityLevel::SemiHonest => f.write_str("semi-honest"),
            SecurityLevel::OneSidedSimulation => f.write_str("one-sided simulation"),
        }
    }
}

/// The receiver's selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChoiceBit {
    Zero,
    One,
}

impl ChoiceBit {
    pub fn index(self) -> usize {
        match self {
            ChoiceBit::Zero => 0,
            ChoiceBit::One => 1,
        }
    }

    /// Picks the chosen member of a pair.
    pub fn select<T>(self, pair: (T, T)) -> T {
        match self {
            ChoiceBit::Zero => pair.0,
            ChoiceBit::One => pair.1,
        }
    }
}

impl TryFrom<u8> for ChoiceBit {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(ChoiceBit::Zero),
            1 => Ok(ChoiceBit::One),
            other => Err(Error::InvalidChoice(other)),
        }
    }
}

impl From<bool> for ChoiceBit {
    fn from(bit: bool) -> Self {
        if bit {
            ChoiceBit::One
        } else {
            ChoiceBit::Zero
        }
    }
}

/// Sender input of `m` transfers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OtSenderInput<T> {
    pub pairs: Vec<(T, T)>,
}

impl<T> OtSenderInput<T> {
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for an empty batch.
    pub fn new(pairs: Vec<(T, T)>) -> Result<Self> {
        if pairs.is_empty() {
            return Err(Error::InvalidInput("OT batch has no pairs".to_string()));
        }
        Ok(Self { pairs })
    }

    pub fn single(x0: T, x1: T) -> Self {
        Self {
            pairs: vec![(x0, x1)],
        }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Receiver input of `m` transfers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OtReceiverInput {
    pub choices: Vec<ChoiceBit>,
}

impl OtReceiverInput {
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for an empty batch.
    pub fn new(choices: Vec<ChoiceBit>) -> Result<Self> {
        if choices.is_empty() {
            return Err(Error::InvalidInput("OT batch has no choices".to_string()));
        }
        Ok(Self { choices })
    }

    pub fn single(choice: ChoiceBit) -> Self {
        Self {
            choices: vec![choice],
        }
    }

    /// Parses raw selection bits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidChoice`] for any byte other than 0 or 1.
    pub fn from_bits(bits: &[u8]) -> Result<Self> {
        let choices = bits
            .iter()
            .map(|&b| ChoiceBit::try_from(b))
            .collect::<Result<Vec<_>>>()?;
        Self::new(choices)
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }
}

/// What the receiver learns: one value per transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OtReceiverOutput<T> {
    pub values: Vec<T>,
}

const TAG_RECEIVER_TUPLES: u8 = 0x30;
const TAG_SENDER_SEMI_HONEST: u8 = 0x31;
const TAG_SENDER_ONE_SIDED: u8 = 0x32;

/// Message alphabet of both OT variants, vectorized over the batch.
///
/// Fields are flattened per transfer:
/// - `ReceiverTuples`: `(h0, h1)` semi-honest, `(x, y, z0, z1)` one-sided
/// - `SenderSemiHonest`: `(u, c0, c1)`
/// - `SenderOneSided`: `(w0, c0, w1, c1)`
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OtMessage {
    ReceiverTuples(Vec<Vec<u8>>),
    SenderSemiHonest(Vec<Vec<u8>>),
    SenderOneSided(Vec<Vec<u8>>),
}

impl OtMessage {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let (tag, fields) = match self {
            Self::ReceiverTuples(f) => (TAG_RECEIVER_TUPLES, f),
            Self::SenderSemiHonest(f) => (TAG_SENDER_SEMI_HONEST, f),
            Self::SenderOneSided(f) => (TAG_SENDER_ONE_SIDED, f),
        };
        Frame::new(tag, fields.clone()).to_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let frame = Frame::from_bytes(bytes)?;
        match frame.tag {
            TAG_RECEIVER_TUPLES => Ok(Self::ReceiverTuples(frame.fields)),
            TAG_SENDER_SEMI_HONEST => Ok(Self::SenderSemiHonest(frame.fields)),
            TAG_SENDER_ONE_SIDED => Ok(Self::SenderOneSided(frame.fields)),
            other => Err(Error::Deserialization(format!(
                "unknown OT message tag {other:#04x}"
            ))),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::ReceiverTuples(_) => "receiver tuples",
            Self::SenderSemiHonest(_) => "semi-honest sender message",
            Self::SenderOneSided(_) => "one-sided sender message",
        }
    }
}

pub(crate) fn unexpected(expected: &str, got: &OtMessage) -> Error {
    Error::Deserialization(format!("expected OT {expected}, got {}", got.kind()))
}

/// Splits flattened fields into `transfers` chunks of `width`.
pub(crate) fn chunk_fields(
    fields: &[Vec<u8>],
    transfers: usize,
    width: usize,
    message: &str,
) -> Result<Vec<Vec<Vec<u8>>>> {
    if fields.len() != transfers * width {
        return Err(Error::Deserialization(format!(
            "{message}: expected {} fields for {transfers} transfers, got {}",
            transfers * width,
            fields.len()
        )));
    }
    Ok(fields.chunks(width).map(<[Vec<u8>]>::to_vec).collect())
}

/// `"w0"` for a single transfer, `"w0[i]"` inside a batch.
pub(crate) fn element_label(name: &str, index: usize, transfers: usize) -> String {
    if transfers == 1 {
        name.to_string()
    } else {
        format!("{name}[{index}]")
    }
}
