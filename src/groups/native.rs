//! One-time initialization of the native curve backends.
//!
//! Native groups refuse to construct until [`initialize`] has run. The first
//! call performs a known-answer self-test; later calls return the cached
//! outcome.

use std::sync::OnceLock;

use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::{ProjectivePoint, Scalar};
use tracing::{info, warn};

use crate::{Error, Result};

/// x-coordinate of `2 * G` on P-256.
const P256_DOUBLE_G_X: &str = "7cf27b188d034f7e8a52380304b51ac3c08969e277f21b35a60b48fc47669978";

static INITIALIZED: OnceLock<core::result::Result<(), String>> = OnceLock::new();

/// Runs the native backend self-test once per process.
///
/// # Errors
///
/// Returns [`Error::Uninitialized`] if the self-test failed, on this call or
/// on an earlier one.
pub fn initialize() -> Result<()> {
    INITIALIZED
        .get_or_init(|| {
            let outcome = self_test();
            match &outcome {
                Ok(()) => info!(backend = "p256", "native backend self-test passed"),
                Err(reason) => warn!(backend = "p256", %reason, "native backend self-test failed"),
            }
            outcome
        })
        .clone()
        .map_err(|_| Error::Uninitialized("native backend self-test failed"))
}

/// Whether [`initialize`] has completed successfully.
pub fn is_initialized() -> bool {
    matches!(INITIALIZED.get(), Some(Ok(())))
}

fn self_test() -> core::result::Result<(), String> {
    let doubled = ProjectivePoint::GENERATOR * Scalar::from(2u64);
    let encoded = doubled.to_affine().to_encoded_point(false);
    let x = encoded.x().ok_or("2G encoded as the identity")?;
    if hex::encode(x) != P256_DOUBLE_G_X {
        return Err("2G has the wrong x-coordinate".to_string());
    }
    if ProjectivePoint::GENERATOR + ProjectivePoint::GENERATOR != doubled {
        return Err("addition disagrees with doubling".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_is_idempotent() {
        initialize().unwrap();
        initialize().unwrap();
        assert!(is_initialized());
    }
}
