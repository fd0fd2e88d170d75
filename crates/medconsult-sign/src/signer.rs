//! `DigestSigner`: the reference `SignatureProvider`.

use std::fmt;

use chrono::{DateTime, Utc};
use tracing::debug;

use medconsult_contracts::{
    error::{ConsultError, ConsultResult},
    ids::DigitalSignature,
};
use medconsult_core::{prescription::MedicalPrescription, traits::SignatureProvider};

use crate::digest::signing_digest;

/// Signs prescriptions with a SHA-256 fingerprint keyed by the doctor's
/// key material.
///
/// This is a content fingerprint: anyone holding the key can produce or
/// check a signature. It stands in for a smart-card signature in tests and
/// demos.
pub struct DigestSigner {
    key: Vec<u8>,
}

impl DigestSigner {
    /// Fails with `Signature` if `key` is empty.
    pub fn new(key: impl Into<Vec<u8>>) -> ConsultResult<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(ConsultError::Signature {
                reason: "signing key must not be empty".to_string(),
            });
        }
        Ok(Self { key })
    }

    /// Check the signature stamped on `prescription`.
    ///
    /// Recomputes the digest with the prescription's creation date, which
    /// the terminal sets to the signing instant. Returns `Ok(false)` when
    /// the content or key do not match.
    ///
    /// # Errors
    ///
    /// `Signature` if the prescription carries no signature or no creation
    /// date.
    pub fn verify(&self, prescription: &MedicalPrescription) -> ConsultResult<bool> {
        let (Some(signature), Some(signed_at)) = (prescription.signature(), prescription.created_at())
        else {
            return Err(ConsultError::Signature {
                reason: "prescription is not signed".to_string(),
            });
        };

        let expected = signing_digest(&self.key, signed_at, prescription)?;
        Ok(signature.as_bytes() == expected.as_slice())
    }
}

impl fmt::Debug for DigestSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigestSigner")
            .field("key", &format_args!("<{} bytes>", self.key.len()))
            .finish()
    }
}

impl SignatureProvider for DigestSigner {
    fn sign(
        &self,
        prescription: &MedicalPrescription,
        signed_at: DateTime<Utc>,
    ) -> ConsultResult<DigitalSignature> {
        let digest = signing_digest(&self.key, signed_at, prescription)?;
        debug!(
            patient = %prescription.patient_id(),
            fingerprint = %fingerprint_bytes(&digest),
            "prescription signed"
        );
        DigitalSignature::new(digest.to_vec())
    }
}

/// Lowercase hex rendering of a signature, for display and logs.
pub fn fingerprint(signature: &DigitalSignature) -> String {
    fingerprint_bytes(signature.as_bytes())
}

fn fingerprint_bytes(bytes: &[u8]) -> String {
    hex::encode(bytes)
}
