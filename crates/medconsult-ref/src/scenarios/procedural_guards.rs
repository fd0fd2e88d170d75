//! Scenario 3: Procedural guard rails
//!
//! Shows the terminal refusing out-of-order steps and bad data, and staying
//! usable afterwards. Each refused step is printed with its error; the
//! scenario fails if any of them is unexpectedly accepted.
//!
//! Sub-cases:
//!   A. Unknown patient and blank illness never start a revision
//!   B. Edition steps before begin / after finish are procedural errors
//!   C. Domain errors (duplicate, missing product, bad values, early end date)
//!   D. Double signature is refused
//!   E. A registry outage at submission keeps the prescription signed, and a
//!      retry after the outage succeeds

use chrono::{Duration, Utc};

use medconsult_contracts::{
    error::ConsultResult,
    ids::{HealthCardId, ProductId},
};
use medconsult_core::{config::TerminalConfig, terminal::ConsultationTerminal};
use medconsult_sign::DigestSigner;

use crate::{
    mock_data::{seeded_registry, ENALAPRIL, HYPERTENSIVE_PATIENT, UNREGISTERED_PATIENT},
    registry::RegistryFailures,
};

use super::{expect_rejection, DOCTOR_KEY};

pub fn run_scenario(config: &TerminalConfig) -> ConsultResult<()> {
    println!("=== Scenario 3: Procedural Guard Rails ===");
    println!();

    let registry = seeded_registry()?;
    let mut terminal = ConsultationTerminal::new(
        Box::new(registry.clone()),
        Box::new(DigestSigner::new(DOCTOR_KEY)?),
    )
    .with_config(config.clone())?;

    let patient = HealthCardId::new(HYPERTENSIVE_PATIENT)?;
    let enalapril = ProductId::new(ENALAPRIL)?;
    let line = ["BEFORELUNCH", "15", "1", "1", "DAY", "water", ""];

    // ── A: revision guards ───────────────────────────────────────────────────

    println!("  Sub-case A: starting a revision");
    expect_rejection(
        "unregistered patient",
        terminal.init_revision(HealthCardId::new(UNREGISTERED_PATIENT)?, "Gripe"),
    )?;
    expect_rejection("blank illness", terminal.init_revision(patient.clone(), "   "))?;
    expect_rejection("note before revision", terminal.add_assessment_note("n/a"))?;
    println!("  State after refusals: {}", terminal.state());
    println!();

    // ── B: edition ordering ──────────────────────────────────────────────────

    println!("  Sub-case B: edition ordering");
    terminal.init_revision(patient, "Hipertensión")?;
    expect_rejection(
        "add medicine before edition",
        terminal.add_medicine(enalapril.clone(), &line),
    )?;
    expect_rejection("sign before edition", terminal.stamp_signature())?;

    terminal.begin_prescription_edition()?;
    terminal.add_medicine(enalapril.clone(), &line)?;
    terminal.finish_prescription_edition()?;
    expect_rejection("modify after finish", terminal.modify_dose(&enalapril, 2.0))?;
    expect_rejection("submit before signature", terminal.submit())?;

    terminal.begin_prescription_edition()?;
    println!("  Edition reopened ({})", terminal.state());
    println!();

    // ── C: domain errors ─────────────────────────────────────────────────────

    println!("  Sub-case C: bad data");
    expect_rejection("duplicate product", terminal.add_medicine(enalapril.clone(), &line))?;
    expect_rejection(
        "six fields instead of seven",
        terminal.add_medicine(ProductId::new("999999999999")?, &line[..6]),
    )?;
    expect_rejection(
        "unknown day moment",
        terminal.add_medicine(
            ProductId::new("999999999999")?,
            &["NOON", "15", "1", "1", "DAY", "", ""],
        ),
    )?;
    expect_rejection(
        "modify absent product",
        terminal.modify_dose(&ProductId::new("999999999999")?, 1.0),
    )?;
    expect_rejection("zero dose", terminal.modify_dose(&enalapril, 0.0))?;
    expect_rejection(
        "end date within lead time",
        terminal.set_treatment_end_date(Utc::now() + Duration::hours(2)),
    )?;
    let line_count = terminal.prescription().map(|p| p.line_count()).unwrap_or_default();
    println!("  Lines after refusals: {line_count}");
    println!();

    // ── D: signature ─────────────────────────────────────────────────────────

    println!("  Sub-case D: signature");
    terminal.set_treatment_end_date(Utc::now() + Duration::days(15))?;
    terminal.finish_prescription_edition()?;
    terminal.stamp_signature()?;
    expect_rejection("second signature", terminal.stamp_signature())?;
    expect_rejection("reopen signed prescription", terminal.begin_prescription_edition())?;
    println!();

    // ── E: registry outage ───────────────────────────────────────────────────

    println!("  Sub-case E: registry outage");
    registry.set_failures(RegistryFailures {
        offline: true,
        ..Default::default()
    });
    expect_rejection("submit while offline", terminal.submit())?;
    println!("  State after outage: {}", terminal.state());

    registry.set_failures(RegistryFailures::default());
    terminal.submit()?;
    let code = terminal
        .prescription()
        .and_then(|p| p.code())
        .map(ToString::to_string)
        .unwrap_or_default();
    println!("  Retry succeeded, code {code}");
    expect_rejection("second submission", terminal.submit())?;

    println!();
    println!("  Scenario 3 complete.");
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use medconsult_contracts::error::ConsultError;

    use super::*;

    #[test]
    fn test_expect_rejection_fails_on_success() {
        let err = expect_rejection("accepted step", Ok::<(), ConsultError>(())).unwrap_err();
        assert!(matches!(err, ConsultError::Procedural { .. }));
    }

    #[test]
    fn test_scenario_runs() {
        let config = TerminalConfig::default();
        run_scenario(&config).unwrap();
    }
}
