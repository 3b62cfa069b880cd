//! Error types for discrete-log groups and the protocols built on them.

use core::fmt;

/// Protocol role that produced (or is blamed for) a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Sigma protocol prover.
    Prover,
    /// Sigma protocol verifier.
    Verifier,
    /// Oblivious transfer sender.
    Sender,
    /// Oblivious transfer receiver.
    Receiver,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Prover => "prover",
            Role::Verifier => "verifier",
            Role::Sender => "sender",
            Role::Receiver => "receiver",
        };
        f.write_str(name)
    }
}

/// Coarse classification of [`Error`] values.
///
/// Callers use this to decide between aborting a session (cheat attempts,
/// malformed messages), retrying at the session level (transport) or fixing
/// their setup (configuration, contract).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid or unsupported setup, detected at construction.
    Configuration,
    /// Misuse of the API, e.g. mixing elements of different groups.
    Contract,
    /// The peer sent something that breaks a security precondition.
    CheatAttempt,
    /// The channel failed.
    Transport,
    /// A received message could not be parsed.
    Deserialization,
}

/// Main error type for the library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid group parameters were provided.
    #[error("Invalid group parameters: {0}")]
    InvalidParams(String),

    /// A named group or curve is not known to the parameter source.
    #[error("Unsupported group: {0}")]
    UnsupportedGroup(String),

    /// The chosen group cannot provide the security a protocol requires.
    #[error("Security level mismatch: {0}")]
    SecurityLevel(String),

    /// A backend was used before its explicit initialization.
    #[error("Backend not initialized: {0}")]
    Uninitialized(&'static str),

    /// A selection bit outside `{0, 1}` was supplied to an OT receiver.
    #[error("Invalid OT choice bit: {0}")]
    InvalidChoice(u8),

    /// An element does not belong to the group instance it was used with.
    #[error("Invalid group element: {0}")]
    InvalidGroupElement(String),

    /// Inputs to a protocol call are inconsistent with each other.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The peer failed a membership or well-formedness check.
    #[error("Cheat attempt by {role}: {check}")]
    CheatAttempt {
        /// Role of the misbehaving peer.
        role: Role,
        /// Which check failed, naming the offending element.
        check: String,
    },

    /// Sending or receiving on a channel failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A received message could not be parsed into the expected shape.
    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl Error {
    /// Builds a cheat-attempt error blaming `role`.
    pub fn cheat(role: Role, check: impl Into<String>) -> Self {
        Error::CheatAttempt {
            role,
            check: check.into(),
        }
    }

    /// Returns the taxonomy bucket of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidParams(_)
            | Error::UnsupportedGroup(_)
            | Error::SecurityLevel(_)
            | Error::Uninitialized(_)
            | Error::InvalidChoice(_) => ErrorKind::Configuration,
            Error::InvalidGroupElement(_) | Error::InvalidInput(_) => ErrorKind::Contract,
            Error::CheatAttempt { .. } => ErrorKind::CheatAttempt,
            Error::Transport(_) => ErrorKind::Transport,
            Error::Deserialization(_) => ErrorKind::Deserialization,
        }
    }

    /// True for errors that indicate a possibly malicious peer.
    pub fn is_cheat_attempt(&self) -> bool {
        self.kind() == ErrorKind::CheatAttempt
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Transport(err.to_string())
    }
}
