//! Fictional patients and canned AI answers for the reference scenarios.
//!
//! Nothing here refers to a real person. Health card numbers and product
//! codes are made up and only need to pass format validation.

use medconsult_contracts::{
    error::ConsultResult,
    ids::{HealthCardId, ProductId},
};
use medconsult_core::{history::MedicalHistory, prescription::MedicalPrescription};

use crate::{ai::ScriptedDecisionAi, registry::InMemoryHealthService};

// ── Patients ─────────────────────────────────────────────────────────────────

/// Hypertensive patient with no active prescription.
pub const HYPERTENSIVE_PATIENT: &str = "1234567890ABCDEF";

/// Asthmatic patient with an active inhaler prescription.
pub const ASTHMATIC_PATIENT: &str = "ZX81SPECTRUM2048";

/// Not registered anywhere.
pub const UNREGISTERED_PATIENT: &str = "0000000000000000";

pub const FAMILY_DOCTOR: u32 = 100;

// ── Products ─────────────────────────────────────────────────────────────────

pub const ENALAPRIL: &str = "123456789012";
pub const HYDROCHLOROTHIAZIDE: &str = "456789012345";
pub const SALBUTAMOL: &str = "640557143200";
pub const BUDESONIDE: &str = "210987654321";

/// Build the registry every scenario starts from.
pub fn seeded_registry() -> ConsultResult<InMemoryHealthService> {
    let hypertensive = HealthCardId::new(HYPERTENSIVE_PATIENT)?;
    let mut hypertensive_history = MedicalHistory::new(hypertensive, FAMILY_DOCTOR)?;
    hypertensive_history.append_annotation("2026-03-02: BP 150/95, lifestyle advice given");
    hypertensive_history.append_annotation("2026-06-11: BP 148/92, persistent despite diet");

    let asthmatic = HealthCardId::new(ASTHMATIC_PATIENT)?;
    let mut asthmatic_history = MedicalHistory::new(asthmatic.clone(), FAMILY_DOCTOR)?;
    asthmatic_history.append_annotation("2025-11-20: mild persistent asthma, night symptoms");

    let mut inhaler = MedicalPrescription::new(asthmatic, FAMILY_DOCTOR, "Asma")?;
    inhaler.add_line(
        ProductId::new(SALBUTAMOL)?,
        &["AFTERMEALS", "90", "2", "8", "HOUR", "on demand, max 8 puffs a day", ""],
    )?;

    Ok(InMemoryHealthService::new()
        .with_patient(hypertensive_history)
        .with_patient(asthmatic_history)
        .with_prescription(inhaler))
}

/// The scripted AI used by the AI-assisted scenario.
pub fn scripted_ai() -> ScriptedDecisionAi {
    ScriptedDecisionAi::new()
        .answer(
            "asthma",
            format!(
                "Night symptoms suggest poor control. Switch reliever-only therapy to a \
                 maintenance inhaler: <R, {SALBUTAMOL}> \
                 <I, {BUDESONIDE}, AFTERBREAKFAST, 30, 1, 12, HOUR, rinse mouth after use>"
            ),
        )
        .answer(
            "night",
            format!("Consider a higher evening dose: <M, {BUDESONIDE}, , , 2, , , >"),
        )
}
