//! # medconsult-ref
//!
//! Reference collaborators and demo scenarios for the MEDCONSULT
//! consultation terminal.
//!
//! - [`registry::InMemoryHealthService`]: in-memory national registry with
//!   failure switches for every registry error
//! - [`ai::ScriptedDecisionAi`]: keyword-scripted AI answering with tagged
//!   suggestion fragments
//! - [`scenarios`]: three walk-throughs (full consultation, AI-assisted
//!   consultation, procedural guard rails)
//!
//! All patient data is fictional. No external service is contacted.

pub mod ai;
pub mod mock_data;
pub mod registry;
pub mod scenarios;

pub use ai::ScriptedDecisionAi;
pub use registry::{InMemoryHealthService, RegistryFailures};
