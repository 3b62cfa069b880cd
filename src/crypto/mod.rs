/// GF(2^m) arithmetic for curves over binary fields.
pub mod binary_field;
/// Prime-field and fixed-width modular arithmetic primitives.
pub mod field;
/// Discrete-log group trait and group identity.
pub mod group;
/// Cryptographically secure random number generation.
pub mod rng;

pub use group::{DlogGroup, GroupId, GroupType};
pub use rng::SecureRng;
