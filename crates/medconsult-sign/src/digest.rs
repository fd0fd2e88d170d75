//! Digest primitives for prescription signatures.
//!
//! Digest input layout (bytes, in order):
//!   1. doctor key material
//!   2. signing timestamp as RFC 3339 with nanoseconds, UTF-8
//!   3. canonical JSON of the prescription's signing payload
//!
//! The signing payload leaves out the registry code, the creation date and
//! the signature itself, so stamping and registering a prescription does not
//! change its digest.

use chrono::{DateTime, SecondsFormat, Utc};
use sha2::{Digest, Sha256};

use medconsult_contracts::error::{ConsultError, ConsultResult};
use medconsult_core::prescription::MedicalPrescription;

/// Length in bytes of a SHA-256 digest.
pub const DIGEST_LEN: usize = 32;

/// Compute the SHA-256 digest binding `key`, `signed_at` and the content of
/// `prescription`.
pub fn signing_digest(
    key: &[u8],
    signed_at: DateTime<Utc>,
    prescription: &MedicalPrescription,
) -> ConsultResult<[u8; DIGEST_LEN]> {
    let payload = serde_json::to_vec(&prescription.signing_payload()).map_err(|e| {
        ConsultError::Signature {
            reason: format!("prescription payload could not be serialized: {e}"),
        }
    })?;

    let mut hasher = Sha256::new();
    hasher.update(key);
    hasher.update(signed_at.to_rfc3339_opts(SecondsFormat::Nanos, true).as_bytes());
    hasher.update(&payload);

    let mut digest = [0u8; DIGEST_LEN];
    digest.copy_from_slice(&hasher.finalize());
    Ok(digest)
}
