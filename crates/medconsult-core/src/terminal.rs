//! The consultation terminal: the doctor's session state machine.
//!
//! A session moves strictly forward through
//!
//!   Idle → RevisionActive → EditionActive → EditionFinished → Signed → Submitted
//!
//! with two ways back: `init_revision` restarts from any state, and an
//! unsigned prescription may be reopened for edition. Every event checks its
//! precondition against the current state before any collaborator is called
//! or any data is touched. A failed event leaves the session exactly as it
//! was.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use medconsult_contracts::{
    error::{ConsultError, ConsultResult},
    ids::{HealthCardId, ProductId, SessionId},
    suggestion::Suggestion,
};

use crate::{
    config::TerminalConfig,
    history::MedicalHistory,
    prescription::MedicalPrescription,
    traits::{DecisionMakingAi, HealthNationalService, SignatureProvider},
};

/// Where a consultation session stands. Later variants compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    RevisionActive,
    EditionActive,
    EditionFinished,
    Signed,
    Submitted,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::RevisionActive => "revision active",
            Self::EditionActive => "edition active",
            Self::EditionFinished => "edition finished",
            Self::Signed => "signed",
            Self::Submitted => "submitted",
        };
        f.write_str(label)
    }
}

/// Data fetched for the patient under review. Present from `RevisionActive` on.
#[derive(Debug, Clone)]
struct Consultation {
    patient: HealthCardId,
    illness: String,
    history: MedicalHistory,
    prescription: MedicalPrescription,
}

/// Drives one doctor's consultation sessions against the registry, the
/// signature provider and, optionally, the decision-making AI.
pub struct ConsultationTerminal {
    registry: Box<dyn HealthNationalService>,
    signer: Box<dyn SignatureProvider>,
    ai: Option<Box<dyn DecisionMakingAi>>,
    config: TerminalConfig,
    session_id: SessionId,
    state: SessionState,
    consultation: Option<Consultation>,
    last_ai_response: Option<String>,
}

impl ConsultationTerminal {
    pub fn new(
        registry: Box<dyn HealthNationalService>,
        signer: Box<dyn SignatureProvider>,
    ) -> Self {
        Self {
            registry,
            signer,
            ai: None,
            config: TerminalConfig::default(),
            session_id: SessionId::new(),
            state: SessionState::Idle,
            consultation: None,
            last_ai_response: None,
        }
    }

    /// Attach a decision-making AI. Without one every AI event fails with `Ai`.
    pub fn with_ai(mut self, ai: Box<dyn DecisionMakingAi>) -> Self {
        self.ai = Some(ai);
        self
    }

    /// Replace the default configuration.
    ///
    /// # Errors
    ///
    /// `Config` if `config` fails `TerminalConfig::validate`.
    pub fn with_config(mut self, config: TerminalConfig) -> ConsultResult<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn config(&self) -> &TerminalConfig {
        &self.config
    }

    pub fn patient(&self) -> Option<&HealthCardId> {
        self.consultation.as_ref().map(|c| &c.patient)
    }

    pub fn illness(&self) -> Option<&str> {
        self.consultation.as_ref().map(|c| c.illness.as_str())
    }

    pub fn history(&self) -> Option<&MedicalHistory> {
        self.consultation.as_ref().map(|c| &c.history)
    }

    pub fn prescription(&self) -> Option<&MedicalPrescription> {
        self.consultation.as_ref().map(|c| &c.prescription)
    }

    /// Raw text of the last successful `ask_ai`.
    pub fn last_ai_response(&self) -> Option<&str> {
        self.last_ai_response.as_deref()
    }

    // ── Revision ─────────────────────────────────────────────────────────────

    /// Start reviewing `patient` for `illness`.
    ///
    /// Fetches history and active prescription from the registry and, only
    /// if both succeed, replaces whatever session was in progress. Allowed
    /// from any state.
    pub fn init_revision(&mut self, patient: HealthCardId, illness: &str) -> ConsultResult<()> {
        debug!(
            session_id = %self.session_id,
            patient = %patient,
            state = %self.state,
            "init_revision"
        );

        if illness.trim().is_empty() {
            return Err(self.reject("init_revision", "an illness must be named to start a revision"));
        }

        let history = self.registry.fetch_history(&patient)?;
        let prescription = self.registry.fetch_prescription(&patient, illness)?;

        self.session_id = SessionId::new();
        self.consultation = Some(Consultation {
            patient,
            illness: illness.to_string(),
            history,
            prescription,
        });
        self.last_ai_response = None;
        self.enter(SessionState::RevisionActive);
        Ok(())
    }

    /// Append a clinical note to the patient's history. Blank notes are ignored.
    pub fn add_assessment_note(&mut self, text: &str) -> ConsultResult<()> {
        self.trace_event("add_assessment_note");
        self.require_revision("add_assessment_note")?;
        self.consultation_mut("add_assessment_note")?
            .history
            .append_annotation(text);
        Ok(())
    }

    // ── Prescription edition ─────────────────────────────────────────────────

    pub fn begin_prescription_edition(&mut self) -> ConsultResult<()> {
        self.trace_event("begin_prescription_edition");
        if !matches!(
            self.state,
            SessionState::RevisionActive | SessionState::EditionActive | SessionState::EditionFinished
        ) {
            return Err(self.reject(
                "begin_prescription_edition",
                "a revision must be active and the prescription not yet signed",
            ));
        }
        self.enter(SessionState::EditionActive);
        Ok(())
    }

    pub fn add_medicine<S: AsRef<str>>(
        &mut self,
        product: ProductId,
        fields: &[S],
    ) -> ConsultResult<()> {
        self.trace_product("add_medicine", &product);
        self.edit("add_medicine", |p| p.add_line(product, fields))
    }

    pub fn modify_dose(&mut self, product: &ProductId, dose: f32) -> ConsultResult<()> {
        self.trace_product("modify_dose", product);
        self.edit("modify_dose", |p| p.modify_dose(product, dose))
    }

    pub fn modify_frequency(&mut self, product: &ProductId, frequency: f32) -> ConsultResult<()> {
        self.trace_product("modify_frequency", product);
        self.edit("modify_frequency", |p| p.modify_frequency(product, frequency))
    }

    pub fn modify_duration(&mut self, product: &ProductId, duration_days: f32) -> ConsultResult<()> {
        self.trace_product("modify_duration", product);
        self.edit("modify_duration", |p| p.modify_duration(product, duration_days))
    }

    pub fn remove_line(&mut self, product: &ProductId) -> ConsultResult<()> {
        self.trace_product("remove_line", product);
        self.edit("remove_line", |p| p.remove_line(product))
    }

    /// Set the treatment end date.
    ///
    /// # Errors
    ///
    /// `InvalidEndDate` unless `end_date` is strictly later than now plus the
    /// configured lead (24 hours by default).
    pub fn set_treatment_end_date(&mut self, end_date: DateTime<Utc>) -> ConsultResult<()> {
        self.trace_event("set_treatment_end_date");
        self.require_edition("set_treatment_end_date")?;

        let earliest = Utc::now()
            .checked_add_signed(self.config.min_treatment_lead())
            .ok_or_else(|| ConsultError::Config {
                reason: "edition.min_treatment_lead_hours overflows the calendar".to_string(),
            })?;
        if end_date <= earliest {
            warn!(
                session_id = %self.session_id,
                end_date = %end_date,
                earliest = %earliest,
                "treatment end date rejected"
            );
            return Err(ConsultError::InvalidEndDate {
                reason: format!(
                    "end date {} must be later than {}",
                    end_date.format("%Y-%m-%d %H:%M"),
                    earliest.format("%Y-%m-%d %H:%M")
                ),
            });
        }

        self.consultation_mut("set_treatment_end_date")?
            .prescription
            .set_end_date(end_date);
        Ok(())
    }

    /// Apply a batch of AI suggestions.
    ///
    /// The batch is applied to a copy of the prescription and committed only
    /// if every suggestion succeeds.
    pub fn apply_suggestions(&mut self, suggestions: &[Suggestion]) -> ConsultResult<()> {
        self.trace_event("apply_suggestions");
        self.require_edition("apply_suggestions")?;

        let consultation = self.consultation_mut("apply_suggestions")?;
        let mut draft = consultation.prescription.clone();
        for suggestion in suggestions {
            draft.apply_suggestion(suggestion)?;
        }
        consultation.prescription = draft;

        info!(
            session_id = %self.session_id,
            applied = suggestions.len(),
            "suggestions applied"
        );
        Ok(())
    }

    pub fn finish_prescription_edition(&mut self) -> ConsultResult<()> {
        self.trace_event("finish_prescription_edition");
        if !matches!(
            self.state,
            SessionState::EditionActive | SessionState::EditionFinished
        ) {
            return Err(self.reject(
                "finish_prescription_edition",
                "prescription edition must be active",
            ));
        }
        self.enter(SessionState::EditionFinished);
        Ok(())
    }

    // ── Signature and submission ─────────────────────────────────────────────

    /// Sign the finished prescription and stamp its creation date.
    pub fn stamp_signature(&mut self) -> ConsultResult<()> {
        self.trace_event("stamp_signature");
        if self.state != SessionState::EditionFinished {
            return Err(self.reject(
                "stamp_signature",
                "prescription edition must be finished and not yet signed",
            ));
        }

        let signed_at = Utc::now();
        let signature = {
            let consultation = self.consultation("stamp_signature")?;
            self.signer.sign(&consultation.prescription, signed_at)?
        };

        let prescription = &mut self.consultation_mut("stamp_signature")?.prescription;
        prescription.set_created_at(signed_at);
        if let Some(end_date) = prescription.end_date() {
            prescription.set_end_date(end_date);
        }
        prescription.set_signature(signature);

        self.enter(SessionState::Signed);
        Ok(())
    }

    /// Send the signed prescription to the registry.
    ///
    /// The registry's copy, carrying the assigned code, replaces the local one.
    pub fn submit(&mut self) -> ConsultResult<()> {
        self.trace_event("submit");
        if self.state != SessionState::Signed {
            return Err(self.reject("submit", "prescription must be signed and not yet submitted"));
        }

        let registered = {
            let c = self.consultation("submit")?;
            self.registry
                .submit(&c.patient, &c.history, &c.illness, &c.prescription)?
        };

        let code = registered.code().map(ToString::to_string).unwrap_or_default();
        self.consultation_mut("submit")?.prescription = registered;

        info!(session_id = %self.session_id, code = %code, "prescription registered");
        self.enter(SessionState::Submitted);
        Ok(())
    }

    // ── Decision-making AI ───────────────────────────────────────────────────

    pub fn call_ai(&mut self) -> ConsultResult<()> {
        self.trace_event("call_ai");
        self.require_revision("call_ai")?;
        self.ai()?.init()?;
        info!(session_id = %self.session_id, "decision-making AI ready");
        Ok(())
    }

    /// Send `prompt` to the AI and cache the raw answer.
    pub fn ask_ai(&mut self, prompt: &str) -> ConsultResult<String> {
        self.trace_event("ask_ai");
        self.require_revision("ask_ai")?;
        let answer = self.ai()?.get_suggestions(prompt)?;
        self.last_ai_response = Some(answer.clone());
        Ok(answer)
    }

    /// Parse the cached answer of the last `ask_ai` into suggestions.
    pub fn extract_guidelines_from_last_response(&mut self) -> ConsultResult<Vec<Suggestion>> {
        self.trace_event("extract_guidelines_from_last_response");
        self.require_revision("extract_guidelines_from_last_response")?;
        let Some(text) = self.last_ai_response.as_deref() else {
            return Err(self.reject(
                "extract_guidelines_from_last_response",
                "ask_ai must succeed before guidelines can be extracted",
            ));
        };

        let suggestions = self.ai()?.parse_suggestions(text)?;
        debug!(
            session_id = %self.session_id,
            count = suggestions.len(),
            "suggestions extracted"
        );
        Ok(suggestions)
    }

    // ── Internals ────────────────────────────────────────────────────────────

    fn ai(&self) -> ConsultResult<&dyn DecisionMakingAi> {
        self.ai.as_deref().ok_or_else(|| ConsultError::Ai {
            reason: "no decision-making AI is configured on this terminal".to_string(),
        })
    }

    fn enter(&mut self, next: SessionState) {
        info!(
            session_id = %self.session_id,
            from = %self.state,
            to = %next,
            "session state changed"
        );
        self.state = next;
    }

    fn reject(&self, operation: &str, requirement: &str) -> ConsultError {
        warn!(
            session_id = %self.session_id,
            operation = operation,
            state = %self.state,
            "precondition not met"
        );
        ConsultError::procedural(operation, requirement)
    }

    fn require_revision(&self, operation: &str) -> ConsultResult<()> {
        if self.state < SessionState::RevisionActive {
            return Err(self.reject(operation, "a revision must be started with init_revision"));
        }
        Ok(())
    }

    fn require_edition(&self, operation: &str) -> ConsultResult<()> {
        if self.state != SessionState::EditionActive {
            return Err(self.reject(operation, "prescription edition must be active"));
        }
        Ok(())
    }

    fn consultation(&self, operation: &str) -> ConsultResult<&Consultation> {
        self.consultation
            .as_ref()
            .ok_or_else(|| ConsultError::procedural(operation, "no patient is under revision"))
    }

    fn consultation_mut(&mut self, operation: &str) -> ConsultResult<&mut Consultation> {
        self.consultation
            .as_mut()
            .ok_or_else(|| ConsultError::procedural(operation, "no patient is under revision"))
    }

    /// Run a prescription mutation while edition is active.
    fn edit<F>(&mut self, operation: &str, f: F) -> ConsultResult<()>
    where
        F: FnOnce(&mut MedicalPrescription) -> ConsultResult<()>,
    {
        self.require_edition(operation)?;
        f(&mut self.consultation_mut(operation)?.prescription)
    }

    fn trace_event(&self, operation: &str) {
        debug!(
            session_id = %self.session_id,
            state = %self.state,
            "{operation}"
        );
    }

    fn trace_product(&self, operation: &str, product: &ProductId) {
        debug!(
            session_id = %self.session_id,
            state = %self.state,
            product = %product,
            "{operation}"
        );
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
