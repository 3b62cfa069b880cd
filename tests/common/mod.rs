//! Common test utilities shared across integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use dlog_protocols::groups::{
    native, EcF2mGroup, EcFpGroup, NativeP256Group, Rfc5114Group, ZpGroup,
};
use dlog_protocols::params::{EcF2mParams, EcFpParams, ZpParams};
use num_bigint::BigUint;

/// Initialize test tracing (call once at the beginning of tests).
///
/// Subsequent calls are safe and will be ignored.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("dlog_protocols=info"));

    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(filter)
        .try_init();
}

/// `Z_23^*` restricted to its order-11 subgroup. 5 is not a member.
pub fn toy_zp() -> Arc<ZpGroup> {
    Arc::new(
        ZpGroup::new(ZpParams {
            name: "toy-zp-23".to_string(),
            p: BigUint::from(23u32),
            q: BigUint::from(11u32),
            g: BigUint::from(4u32),
        })
        .unwrap(),
    )
}

/// Prime-order curve `y^2 = x^3 - 3x + 7` over GF(10007).
pub fn toy_ec_fp() -> Arc<EcFpGroup> {
    Arc::new(
        EcFpGroup::new(EcFpParams {
            name: "toy-ec-10007".to_string(),
            p: BigUint::from(10_007u32),
            a: BigUint::from(10_004u32),
            b: BigUint::from(7u32),
            gx: BigUint::from(2u32),
            gy: BigUint::from(3u32),
            q: BigUint::from(10_193u32),
            cofactor: BigUint::from(1u32),
        })
        .unwrap(),
    )
}

/// Prime-order curve over GF(10009), a field with `p = 1 mod 4`.
pub fn toy_ec_fp_1_mod_4() -> Arc<EcFpGroup> {
    Arc::new(
        EcFpGroup::new(EcFpParams {
            name: "toy-ec-10009".to_string(),
            p: BigUint::from(10_009u32),
            a: BigUint::from(10_006u32),
            b: BigUint::from(4u32),
            gx: BigUint::from(2u32),
            gy: BigUint::from(3013u32),
            q: BigUint::from(10_039u32),
            cofactor: BigUint::from(1u32),
        })
        .unwrap(),
    )
}

/// Curve with cofactor 4. `(5, 265)` is on the curve but outside the
/// order-2503 subgroup.
pub fn toy_ec_fp_cofactor() -> Arc<EcFpGroup> {
    Arc::new(
        EcFpGroup::new(EcFpParams {
            name: "toy-ec-cofactor".to_string(),
            p: BigUint::from(10_007u32),
            a: BigUint::from(10_004u32),
            b: BigUint::from(66u32),
            gx: BigUint::from(4745u32),
            gy: BigUint::from(6732u32),
            q: BigUint::from(2503u32),
            cofactor: BigUint::from(4u32),
        })
        .unwrap(),
    )
}

/// `y^2 + xy = x^3 + x^2 + 1` over GF(2^11). `(0x6, 0x521)` is on the
/// curve but outside the order-991 subgroup.
pub fn toy_ec_f2m() -> Arc<EcF2mGroup> {
    Arc::new(
        EcF2mGroup::new(EcF2mParams {
            name: "toy-f2-11".to_string(),
            m: 11,
            terms: vec![2, 0],
            a: BigUint::from(1u32),
            b: BigUint::from(1u32),
            gx: BigUint::from(0x742u32),
            gy: BigUint::from(0x52u32),
            q: BigUint::from(991u32),
            cofactor: BigUint::from(2u32),
        })
        .unwrap(),
    )
}

pub fn native_p256() -> Arc<NativeP256Group> {
    native::initialize().unwrap();
    Arc::new(NativeP256Group::new().unwrap())
}

/// RFC 5114 2048-bit group on fixed-width arithmetic.
pub fn rfc5114_fixed() -> Arc<Rfc5114Group> {
    Arc::new(Rfc5114Group::new().unwrap())
}
