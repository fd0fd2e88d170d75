//! Scenario 2: AI-assisted consultation
//!
//! An asthmatic patient on a reliever inhaler is reviewed with help from the
//! decision-making AI. The AI's answer is parsed into suggestions and the
//! whole batch is applied to the active prescription in one step.
//!
//! Walk-through:
//!   1. init_revision loads the active "Asma" prescription (one line)
//!   2. call_ai / ask_ai: the AI proposes a REMOVE and an INSERT
//!   3. extract_guidelines_from_last_response parses them
//!   4. apply_suggestions commits both or neither
//!   5. A follow-up question yields a MODIFY for the new inhaler
//!   6. The prescription is finished, signed and submitted

use chrono::{Duration, Utc};

use medconsult_contracts::{error::ConsultResult, ids::HealthCardId};
use medconsult_core::{config::TerminalConfig, terminal::ConsultationTerminal};
use medconsult_sign::DigestSigner;

use crate::mock_data::{scripted_ai, seeded_registry, ASTHMATIC_PATIENT};

use super::DOCTOR_KEY;

pub fn run_scenario(config: &TerminalConfig) -> ConsultResult<()> {
    println!("=== Scenario 2: AI-Assisted Consultation ===");
    println!();

    let ai = scripted_ai().with_policy(config.malformed_policy());
    let mut terminal = ConsultationTerminal::new(
        Box::new(seeded_registry()?),
        Box::new(DigestSigner::new(DOCTOR_KEY)?),
    )
    .with_ai(Box::new(ai))
    .with_config(config.clone())?;

    // ── Revision ─────────────────────────────────────────────────────────────

    terminal.init_revision(HealthCardId::new(ASTHMATIC_PATIENT)?, "Asma")?;
    if let Some(prescription) = terminal.prescription() {
        println!("  Active prescription:");
        println!("{prescription}");
    }
    println!();

    // ── Ask the AI ───────────────────────────────────────────────────────────

    terminal.call_ai()?;
    let prompt = "Patient with asthma still waking at night on salbutamol. Adjust?";
    let answer = terminal.ask_ai(prompt)?;
    println!("  Prompt:  {prompt}");
    println!("  Answer:  {answer}");

    let suggestions = terminal.extract_guidelines_from_last_response()?;
    println!("  Parsed {} suggestion(s):", suggestions.len());
    for suggestion in &suggestions {
        println!("    - {suggestion}");
    }
    println!();

    // ── Apply ────────────────────────────────────────────────────────────────

    terminal.begin_prescription_edition()?;
    terminal.apply_suggestions(&suggestions)?;

    let follow_up = terminal.ask_ai("Is the night dose enough?")?;
    let adjustments = terminal.extract_guidelines_from_last_response()?;
    println!("  Follow-up answer: {follow_up}");
    terminal.apply_suggestions(&adjustments)?;

    terminal.set_treatment_end_date(Utc::now() + Duration::days(30))?;
    terminal.finish_prescription_edition()?;
    terminal.stamp_signature()?;
    terminal.submit()?;

    if let Some(prescription) = terminal.prescription() {
        println!();
        println!("{prescription}");
    }
    println!();
    println!("  Scenario 2 complete.");
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use medconsult_contracts::{
        error::ConsultError,
        ids::ProductId,
        suggestion::{OperationKind, Suggestion},
    };
    use medconsult_core::terminal::SessionState;

    use super::*;
    use crate::mock_data::{BUDESONIDE, SALBUTAMOL};

    fn terminal() -> ConsultationTerminal {
        let mut t = ConsultationTerminal::new(
            Box::new(seeded_registry().unwrap()),
            Box::new(DigestSigner::new(DOCTOR_KEY).unwrap()),
        )
        .with_ai(Box::new(scripted_ai()));
        t.init_revision(HealthCardId::new(ASTHMATIC_PATIENT).unwrap(), "Asma")
            .unwrap();
        t.call_ai().unwrap();
        t
    }

    #[test]
    fn test_ai_batch_replaces_reliever_with_maintenance_inhaler() {
        let mut t = terminal();
        t.ask_ai("asthma control").unwrap();
        let suggestions = t.extract_guidelines_from_last_response().unwrap();
        let ops: Vec<OperationKind> = suggestions.iter().map(Suggestion::operation).collect();
        assert_eq!(ops, [OperationKind::Remove, OperationKind::Insert]);

        t.begin_prescription_edition().unwrap();
        t.apply_suggestions(&suggestions).unwrap();

        let p = t.prescription().unwrap();
        assert!(!p.contains(&ProductId::new(SALBUTAMOL).unwrap()));
        let budesonide = p.line(&ProductId::new(BUDESONIDE).unwrap()).unwrap();
        assert_eq!(budesonide.guideline().posology().frequency(), 12.0);
    }

    #[test]
    fn test_applying_twice_fails_without_side_effects() {
        let mut t = terminal();
        t.ask_ai("asthma control").unwrap();
        let suggestions = t.extract_guidelines_from_last_response().unwrap();
        t.begin_prescription_edition().unwrap();
        t.apply_suggestions(&suggestions).unwrap();
        let after_first = t.prescription().unwrap().clone();

        let err = t.apply_suggestions(&suggestions).unwrap_err();
        assert!(matches!(err, ConsultError::ProductNotFound { .. }));
        assert_eq!(t.prescription().unwrap(), &after_first);
        assert_eq!(t.state(), SessionState::EditionActive);
    }

    #[test]
    fn test_suggestions_cannot_be_applied_outside_edition() {
        let mut t = terminal();
        t.ask_ai("asthma control").unwrap();
        let suggestions = t.extract_guidelines_from_last_response().unwrap();
        assert!(matches!(
            t.apply_suggestions(&suggestions),
            Err(ConsultError::Procedural { .. })
        ));
    }

    #[test]
    fn test_scenario_runs_with_default_config() {
        run_scenario(&TerminalConfig::default()).unwrap();
    }
}
