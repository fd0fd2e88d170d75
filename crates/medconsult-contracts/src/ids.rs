//! Identifier value types.
//!
//! Every identifier is validated once on construction and is immutable
//! afterwards. Equality and hashing are by value. Deserialisation runs the
//! same validation through `TryFrom`, so an invalid identifier can never be
//! observed anywhere in the workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ConsultError, ConsultResult, ValidationKind};

/// The patient's personal code in the national health service (CIP).
///
/// Exactly 16 ASCII alphanumeric characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HealthCardId(String);

impl HealthCardId {
    pub const LEN: usize = 16;

    pub fn new(code: impl Into<String>) -> ConsultResult<Self> {
        let code = code.into();
        if code.len() != Self::LEN || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConsultError::validation(
                "health card id",
                ValidationKind::InvalidFormat,
                format!("'{code}' must be {} alphanumeric characters", Self::LEN),
            ));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A medicine's product code (UPC): exactly 12 ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductId(String);

impl ProductId {
    pub const LEN: usize = 12;

    pub fn new(code: impl Into<String>) -> ConsultResult<Self> {
        let code = code.into();
        if code.len() != Self::LEN || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(ConsultError::validation(
                "product id",
                ValidationKind::InvalidFormat,
                format!("'{code}' must be {} digits", Self::LEN),
            ));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The ePrescription code assigned by the national registry on submission.
///
/// Between 8 and 20 characters drawn from ASCII letters, digits and `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PrescriptionCode(String);

impl PrescriptionCode {
    pub const MIN_LEN: usize = 8;
    pub const MAX_LEN: usize = 20;

    pub fn new(code: impl Into<String>) -> ConsultResult<Self> {
        let code = code.into();
        let len_ok = (Self::MIN_LEN..=Self::MAX_LEN).contains(&code.len());
        let chars_ok = code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        if !len_ok || !chars_ok {
            return Err(ConsultError::validation(
                "prescription code",
                ValidationKind::InvalidFormat,
                format!(
                    "'{code}' must be {}-{} alphanumeric characters or hyphens",
                    Self::MIN_LEN,
                    Self::MAX_LEN
                ),
            ));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The doctor's electronic signature over a prescription: opaque, non-empty bytes.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct DigitalSignature(Vec<u8>);

impl DigitalSignature {
    pub fn new(bytes: impl Into<Vec<u8>>) -> ConsultResult<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(ConsultError::validation(
                "digital signature",
                ValidationKind::Blank,
                "signature must not be empty",
            ));
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Never true for a constructed signature.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// Signature bytes are never printed in full.
impl fmt::Debug for DigitalSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DigitalSignature({} bytes)", self.0.len())
    }
}

/// Unique identifier for one consultation session, carried in every log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub uuid::Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ── String plumbing shared by the textual identifiers ────────────────────────

macro_rules! string_identifier {
    ($ty:ident) => {
        impl TryFrom<String> for $ty {
            type Error = ConsultError;

            fn try_from(value: String) -> ConsultResult<Self> {
                Self::new(value)
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> String {
                value.0
            }
        }

        impl std::str::FromStr for $ty {
            type Err = ConsultError;

            fn from_str(s: &str) -> ConsultResult<Self> {
                Self::new(s)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_identifier!(HealthCardId);
string_identifier!(ProductId);
string_identifier!(PrescriptionCode);

impl TryFrom<Vec<u8>> for DigitalSignature {
    type Error = ConsultError;

    fn try_from(value: Vec<u8>) -> ConsultResult<Self> {
        Self::new(value)
    }
}

impl From<DigitalSignature> for Vec<u8> {
    fn from(value: DigitalSignature) -> Vec<u8> {
        value.0
    }
}
