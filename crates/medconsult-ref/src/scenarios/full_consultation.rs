//! Scenario 1: Full consultation
//!
//! A hypertensive patient is reviewed, a new two-medicine prescription is
//! written and adjusted by hand, signed, and registered.
//!
//! Walk-through:
//!   1. init_revision fetches history and opens an empty prescription
//!   2. The doctor adds an assessment note
//!   3. Edition: add two medicines, raise one dose, drop the other
//!   4. Treatment end date set fifteen days out
//!   5. Edition finished, signature stamped and checked
//!   6. Submission returns the registered copy with its TRAT code

use chrono::{Duration, Utc};
use tracing::warn;

use medconsult_contracts::{
    error::{ConsultError, ConsultResult},
    ids::{HealthCardId, ProductId},
};
use medconsult_core::{config::TerminalConfig, terminal::ConsultationTerminal};
use medconsult_sign::{fingerprint, DigestSigner};

use crate::mock_data::{seeded_registry, ENALAPRIL, HYDROCHLOROTHIAZIDE, HYPERTENSIVE_PATIENT};

use super::DOCTOR_KEY;

pub fn run_scenario(config: &TerminalConfig) -> ConsultResult<()> {
    println!("=== Scenario 1: Full Consultation ===");
    println!();

    // ── Wire up the terminal ─────────────────────────────────────────────────

    let registry = seeded_registry()?;
    let mut terminal = ConsultationTerminal::new(
        Box::new(registry.clone()),
        Box::new(DigestSigner::new(DOCTOR_KEY)?),
    )
    .with_config(config.clone())?;

    let patient = HealthCardId::new(HYPERTENSIVE_PATIENT)?;
    let enalapril = ProductId::new(ENALAPRIL)?;
    let diuretic = ProductId::new(HYDROCHLOROTHIAZIDE)?;

    // ── Revision ─────────────────────────────────────────────────────────────

    terminal.init_revision(patient, "Hipertensión")?;
    terminal.add_assessment_note("2026-10-19: BP 152/96, starting ACE inhibitor")?;

    if let Some(history) = terminal.history() {
        println!("  Revision started: {history}");
        for line in history.annotation_lines() {
            println!("    | {line}");
        }
    }
    println!();

    // ── Edition ──────────────────────────────────────────────────────────────

    terminal.begin_prescription_edition()?;
    terminal.add_medicine(
        enalapril.clone(),
        &["BEFOREBREAKFAST", "30", "1", "1", "DAY", "check BP weekly", ""],
    )?;
    terminal.add_medicine(
        diuretic.clone(),
        &["AFTERBREAKFAST", "30", "0.5", "1", "DAY", "", ""],
    )?;
    println!("  Added {enalapril} and {diuretic}");

    terminal.modify_dose(&enalapril, 2.0)?;
    println!("  Raised {enalapril} dose to 2");

    terminal.remove_line(&diuretic)?;
    println!("  Removed {diuretic}");

    terminal.set_treatment_end_date(Utc::now() + Duration::days(15))?;
    terminal.finish_prescription_edition()?;
    println!("  Edition finished ({})", terminal.state());
    println!();

    // ── Signature ────────────────────────────────────────────────────────────

    terminal.stamp_signature()?;
    let verifier = DigestSigner::new(DOCTOR_KEY)?;
    if let Some(prescription) = terminal.prescription() {
        let signature_ok = verifier.verify(prescription)?;
        let print = prescription.signature().map(fingerprint).unwrap_or_default();
        println!("  Signature:     {print}");
        println!("  Verification:  {}", if signature_ok { "VALID" } else { "INVALID" });
    }

    // ── Submission ───────────────────────────────────────────────────────────

    terminal.submit()?;
    let registered = terminal.prescription().ok_or_else(|| {
        ConsultError::procedural("submit", "no prescription after submission")
    })?;

    println!("  Submitted:     {} submission(s) on record", registry.submissions().len());
    println!();
    println!("{registered}");
    println!();

    match serde_json::to_string_pretty(registered) {
        Ok(json) => {
            println!("  Registered prescription (JSON):");
            for line in json.lines() {
                println!("    {line}");
            }
        }
        Err(e) => warn!(error = %e, "prescription could not be rendered as JSON"),
    }
    println!();
    println!("  Scenario 1 complete.");
    println!();

    Ok(())
}
