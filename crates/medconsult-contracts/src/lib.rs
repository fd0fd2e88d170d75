//! # medconsult-contracts
//!
//! Shared identifiers, suggestion types, and errors for the MEDCONSULT
//! consultation terminal.
//!
//! All crates in the workspace import from here. Nothing in this crate talks
//! to a collaborator or holds session state: only validated value types and
//! the error taxonomy.

pub mod error;
pub mod ids;
pub mod suggestion;

pub use error::{ConsultError, ConsultResult, ValidationKind};
pub use ids::{DigitalSignature, HealthCardId, PrescriptionCode, ProductId, SessionId};
pub use suggestion::{MalformedSuggestionPolicy, OperationKind, SuggestedGuideline, Suggestion};
