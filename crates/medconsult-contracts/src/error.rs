//! Error types for the MEDCONSULT consultation terminal.
//!
//! All fallible operations in the workspace return `ConsultResult<T>`.
//! Variants carry the identifier or step that caused the failure so the
//! caller can report it and re-drive the consultation with corrected input.

use std::fmt;

use thiserror::Error;

/// Classifies why a value was rejected at construction or mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    /// The value does not match the required textual format.
    InvalidFormat,
    /// A numeric value that must be strictly positive was zero, negative or NaN.
    NotPositive,
    /// A required text value was empty or only whitespace.
    Blank,
}

impl fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::InvalidFormat => "invalid format",
            Self::NotPositive => "not positive",
            Self::Blank => "blank",
        };
        f.write_str(label)
    }
}

/// The unified error type for the consultation terminal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConsultError {
    /// A value failed validation when it was built or mutated.
    #[error("invalid {field} ({kind}): {reason}")]
    Validation {
        field: String,
        kind: ValidationKind,
        reason: String,
    },

    /// A product code inside an AI suggestion is not a valid product identifier.
    #[error("invalid product identifier '{value}' in suggestion: {reason}")]
    InvalidIdentifier { value: String, reason: String },

    /// A session event was triggered before its prerequisite step.
    #[error("procedural error in '{operation}': {requirement}")]
    Procedural {
        operation: String,
        requirement: String,
    },

    /// The product already has a line in the prescription.
    #[error("product {product} is already in the prescription")]
    DuplicateProduct { product: String },

    /// The product has no line in the prescription.
    #[error("product {product} is not in the prescription")]
    ProductNotFound { product: String },

    /// The raw taking-guideline fields could not be parsed or are out of range.
    #[error("incorrect taking guidelines: {reason}")]
    GuidelineFormat { reason: String },

    /// The treatment end date is too close to now, or in the past.
    #[error("invalid treatment end date: {reason}")]
    InvalidEndDate { reason: String },

    /// The registry refused a prescription that is missing required data.
    #[error("medical prescription is not complete: {reason}")]
    IncompletePrescription { reason: String },

    /// The national health registry could not be reached.
    #[error("registry connectivity error: {reason}")]
    Connectivity { reason: String },

    /// The health card is not registered in the national health registry.
    #[error("patient {patient} is not registered in the national health service")]
    UnknownPatient { patient: String },

    /// The patient has no current prescription for the requested illness.
    #[error("patient {patient} has no active prescription for '{illness}'")]
    NoActivePrescription { patient: String, illness: String },

    /// The decision-making AI could not be initialised or is unavailable.
    #[error("decision-making AI error: {reason}")]
    Ai { reason: String },

    /// The prompt sent to the decision-making AI was unclear or inconsistent.
    #[error("bad AI prompt: {reason}")]
    BadPrompt { reason: String },

    /// The signature provider could not produce an electronic signature.
    #[error("electronic signature error: {reason}")]
    Signature { reason: String },

    /// A configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    Config { reason: String },
}

impl ConsultError {
    /// Shorthand for a `Validation` error.
    pub fn validation(
        field: impl Into<String>,
        kind: ValidationKind,
        reason: impl Into<String>,
    ) -> Self {
        Self::Validation {
            field: field.into(),
            kind,
            reason: reason.into(),
        }
    }

    /// Shorthand for a `Procedural` error.
    pub fn procedural(operation: impl Into<String>, requirement: impl Into<String>) -> Self {
        Self::Procedural {
            operation: operation.into(),
            requirement: requirement.into(),
        }
    }
}

/// Convenience alias used throughout the MEDCONSULT crates.
pub type ConsultResult<T> = Result<T, ConsultError>;
