//! # medconsult-core
//!
//! The prescription model and the consultation-session state machine.
//!
//! This crate provides:
//! - The clinical value model (`Posology`, `TakingGuideline`,
//!   `PrescriptionLine`, `MedicalHistory`, `MedicalPrescription`)
//! - The three collaborator traits (`HealthNationalService`,
//!   `DecisionMakingAi`, `SignatureProvider`)
//! - The `ConsultationTerminal` that drives a session through them
//!
//! ## Usage
//!
//! ```rust,ignore
//! use medconsult_core::{ConsultationTerminal, TerminalConfig};
//!
//! let mut terminal = ConsultationTerminal::new(registry, signer)
//!     .with_config(TerminalConfig::from_file(path)?)?;
//! terminal.init_revision(patient, "Hipertensión")?;
//! ```

mod apply;
pub mod config;
pub mod guideline;
pub mod history;
pub mod line;
pub mod posology;
pub mod prescription;
pub mod terminal;
pub mod traits;

pub use config::TerminalConfig;
pub use guideline::{DayMoment, TakingGuideline};
pub use history::MedicalHistory;
pub use line::PrescriptionLine;
pub use posology::{FrequencyUnit, Posology};
pub use prescription::{MedicalPrescription, SigningPayload, GUIDELINE_FIELD_COUNT};
pub use terminal::{ConsultationTerminal, SessionState};
