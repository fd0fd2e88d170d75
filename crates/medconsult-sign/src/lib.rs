//! # medconsult-sign
//!
//! A SHA-256 digest signature provider for MEDCONSULT prescriptions.
//!
//! [`DigestSigner`] implements
//! [`SignatureProvider`](medconsult_core::traits::SignatureProvider) by
//! hashing the doctor's key material, the signing instant and the canonical
//! JSON of the prescription content. [`DigestSigner::verify`] recomputes the
//! digest and detects any change to the signed content.

pub mod digest;
pub mod signer;

pub use digest::{signing_digest, DIGEST_LEN};
pub use signer::{fingerprint, DigestSigner};

// ── Tests ────────────────────────────────────────────────────────────────────
