/// Elliptic curves over binary fields GF(2^m).
pub mod ec_f2m;
/// Elliptic curves over prime fields.
pub mod ec_fp;
/// Initialization of native backends.
pub mod native;
/// NIST P-256 on the `p256` crate.
pub mod p256;
/// RFC 5114 MODP group on fixed-width integers.
pub mod rfc5114;
/// Prime-order subgroups of `Z_p^*`.
pub mod zp;

pub use ec_f2m::{EcF2mGroup, EcF2mPoint};
pub use ec_fp::{EcFpGroup, EcFpPoint};
pub use self::p256::{NativeP256Group, P256Element};
pub use rfc5114::{Rfc5114Element, Rfc5114Group};
pub use zp::{ZpElement, ZpGroup};
