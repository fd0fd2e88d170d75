//! Collaborator traits for the consultation terminal.
//!
//! These three traits are the terminal's only way out of the process:
//!
//! - `HealthNationalService` is the national health registry (history,
//!   active prescriptions, submission)
//! - `DecisionMakingAi` is the optional clinical suggestion service
//! - `SignatureProvider` produces the doctor's electronic signature
//!
//! The terminal owns one boxed implementation of each and calls them only
//! after its own preconditions pass.

use chrono::{DateTime, Utc};

use medconsult_contracts::{
    error::ConsultResult,
    ids::{DigitalSignature, HealthCardId},
    suggestion::Suggestion,
};

use crate::{history::MedicalHistory, prescription::MedicalPrescription};

/// The national health registry.
pub trait HealthNationalService: Send + Sync {
    /// Fetch the medical history of `patient`.
    ///
    /// Fails with `UnknownPatient` or `Connectivity`.
    fn fetch_history(&self, patient: &HealthCardId) -> ConsultResult<MedicalHistory>;

    /// Fetch the active prescription of `patient` for `illness`.
    ///
    /// Fails with `UnknownPatient`, `NoActivePrescription` or `Connectivity`.
    fn fetch_prescription(
        &self,
        patient: &HealthCardId,
        illness: &str,
    ) -> ConsultResult<MedicalPrescription>;

    /// Register a signed prescription and return the registry's copy.
    ///
    /// The returned prescription carries the registry-assigned code and
    /// replaces the caller's copy. Fails with `IncompletePrescription` if
    /// anything other than the code is missing, or `Connectivity`.
    fn submit(
        &self,
        patient: &HealthCardId,
        history: &MedicalHistory,
        illness: &str,
        prescription: &MedicalPrescription,
    ) -> ConsultResult<MedicalPrescription>;
}

/// A clinical decision-support service answering free-text prompts.
pub trait DecisionMakingAi: Send + Sync {
    /// Open a session with the service. Fails with `Ai`.
    fn init(&self) -> ConsultResult<()>;

    /// Send `prompt` and return the raw answer text. Fails with `BadPrompt`.
    fn get_suggestions(&self, prompt: &str) -> ConsultResult<String>;

    /// Turn a raw answer into structured suggestions.
    fn parse_suggestions(&self, text: &str) -> ConsultResult<Vec<Suggestion>>;
}

/// Produces electronic signatures for prescriptions.
pub trait SignatureProvider: Send + Sync {
    /// Sign `prescription` as of `signed_at`. Fails with `Signature`.
    fn sign(
        &self,
        prescription: &MedicalPrescription,
        signed_at: DateTime<Utc>,
    ) -> ConsultResult<DigitalSignature>;
}
