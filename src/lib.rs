//! Discrete-log groups and the two-party protocols built on them.
//!
//! This crate contains:
//! - **groups**: the [`DlogGroup`] contract and its backends (software
//!   `Z_p^*`, curves over GF(p) and GF(2^m), fixed-width RFC 5114, native
//!   P-256)
//! - **sigma**: three-move proofs of knowledge, their Fiat-Shamir form and
//!   a ZKPOK compiler
//! - **ot**: DDH-based oblivious transfer, semi-honest and one-sided
//!   simulation, behind a concurrent batch façade
//! - **channel** / **wire**: the transport contract and message framing
//!
//! Protocol code depends only on [`DlogGroup`]; every element received from
//! a peer is membership-checked before it is combined with anything, and a
//! failed check surfaces as [`Error::CheatAttempt`] naming the element and
//! the role blamed.

/// Ordered point-to-point channels.
pub mod channel;
/// Runtime configuration.
pub mod config;
/// Arithmetic primitives, the group trait and randomness.
pub mod crypto;
/// ElGamal and Cramer-Shoup value objects.
pub mod encryption;
/// Error types and result alias.
pub mod error;
/// Concrete group backends.
pub mod groups;
/// Oblivious transfer.
pub mod ot;
/// Named group parameters.
pub mod params;
/// Sigma protocols.
pub mod sigma;
/// Message framing.
pub mod wire;

pub use channel::{Channel, LocalChannel, TcpChannel};
pub use config::ProtocolConfig;
pub use crypto::{DlogGroup, GroupId, GroupType, SecureRng};
pub use error::{Error, ErrorKind, Role};
pub use ot::{
    ChoiceBit, OtBatchReceiver, OtBatchSender, OtReceiverInput, OtReceiverOutput, OtSenderInput,
    SecurityLevel,
};
pub use params::{BuiltinParameters, ParameterSource};
pub use sigma::{Challenge, SigmaProver, SigmaStatement, SigmaVerifier};

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;
