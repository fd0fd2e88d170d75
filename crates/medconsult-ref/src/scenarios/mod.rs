//! Consultation scenarios for the reference runtime.
//!
//! Each scenario wires a real `ConsultationTerminal` to the in-memory
//! registry, the digest signer and, where relevant, the scripted AI, then
//! walks one consultation and prints what happens at each step.

pub mod ai_assisted;
pub mod full_consultation;
pub mod procedural_guards;

use medconsult_contracts::error::{ConsultError, ConsultResult};
use medconsult_core::config::TerminalConfig;

/// Embedded terminal settings shared by the scenarios.
pub const CONSULTATION_CONFIG: &str = include_str!("../../config/consultation.toml");

/// Key material of the fictional family doctor.
pub(crate) const DOCTOR_KEY: &[u8] = b"dr-100-demo-key";

pub fn default_config() -> ConsultResult<TerminalConfig> {
    TerminalConfig::from_toml_str(CONSULTATION_CONFIG)
}

/// Print a rejected step, or fail the scenario if the step was accepted.
pub(crate) fn expect_rejection<T>(label: &str, result: ConsultResult<T>) -> ConsultResult<ConsultError> {
    match result {
        Err(e) => {
            println!("  {label:<38} REJECTED: {e}");
            Ok(e)
        }
        Ok(_) => Err(ConsultError::procedural(
            label,
            "step was expected to be rejected but succeeded",
        )),
    }
}
