//! In-memory implementation of `HealthNationalService`.
//!
//! `InMemoryHealthService` is the reference registry. Patients, active
//! prescriptions and every accepted submission live behind an
//! `Arc<Mutex<_>>`, so a clone handed to the terminal and a clone kept by
//! the caller observe the same registry.
//!
//! Failure switches make every registry error reproducible on demand.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use chrono::Utc;
use tracing::{info, warn};

use medconsult_contracts::{
    error::{ConsultError, ConsultResult},
    ids::{HealthCardId, PrescriptionCode},
};
use medconsult_core::{
    history::MedicalHistory, prescription::MedicalPrescription, traits::HealthNationalService,
};

/// Switches that force the registry to fail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryFailures {
    /// Every call fails with `Connectivity`.
    pub offline: bool,
    /// Every patient lookup fails with `UnknownPatient`, seeded or not.
    pub unknown_patients: bool,
    /// Prescription lookups without a seeded prescription fail with
    /// `NoActivePrescription` instead of opening a new one.
    pub no_active_prescriptions: bool,
    /// Every submission fails with `IncompletePrescription`.
    pub reject_submissions: bool,
}

// ── Internal mutable state ────────────────────────────────────────────────────

#[derive(Default)]
struct RegistryState {
    histories: HashMap<HealthCardId, MedicalHistory>,
    /// Active prescriptions keyed by patient and illness.
    prescriptions: HashMap<(HealthCardId, String), MedicalPrescription>,
    submissions: Vec<MedicalPrescription>,
    failures: RegistryFailures,
}

impl RegistryState {
    fn ensure_online(&self) -> ConsultResult<()> {
        if self.failures.offline {
            return Err(ConsultError::Connectivity {
                reason: "national health registry is unreachable".to_string(),
            });
        }
        Ok(())
    }

    fn history(&self, patient: &HealthCardId) -> ConsultResult<&MedicalHistory> {
        let unknown = || ConsultError::UnknownPatient {
            patient: patient.to_string(),
        };
        if self.failures.unknown_patients {
            return Err(unknown());
        }
        self.histories.get(patient).ok_or_else(unknown)
    }
}

// ── Public registry ───────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct InMemoryHealthService {
    state: Arc<Mutex<RegistryState>>,
}

impl InMemoryHealthService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a patient through their medical history.
    pub fn with_patient(self, history: MedicalHistory) -> Self {
        self.lock_for_inspection()
            .histories
            .insert(history.patient_id().clone(), history);
        self
    }

    /// Seed an active prescription, keyed by its patient and illness.
    pub fn with_prescription(self, prescription: MedicalPrescription) -> Self {
        let key = (prescription.patient_id().clone(), prescription.illness().to_string());
        self.lock_for_inspection().prescriptions.insert(key, prescription);
        self
    }

    pub fn set_failures(&self, failures: RegistryFailures) {
        self.lock_for_inspection().failures = failures;
    }

    pub fn failures(&self) -> RegistryFailures {
        self.lock_for_inspection().failures
    }

    /// Every prescription accepted so far, in submission order.
    pub fn submissions(&self) -> Vec<MedicalPrescription> {
        self.lock_for_inspection().submissions.clone()
    }

    fn lock_for_inspection(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().expect("registry state lock poisoned")
    }

    fn lock(&self) -> ConsultResult<MutexGuard<'_, RegistryState>> {
        self.state.lock().map_err(|e| ConsultError::Connectivity {
            reason: format!("registry state lock poisoned: {e}"),
        })
    }
}

// ── HealthNationalService impl ────────────────────────────────────────────────

impl HealthNationalService for InMemoryHealthService {
    fn fetch_history(&self, patient: &HealthCardId) -> ConsultResult<MedicalHistory> {
        let state = self.lock()?;
        state.ensure_online()?;
        state.history(patient).cloned()
    }

    /// Return the seeded prescription for `illness`, or open a new empty
    /// one under the patient's family doctor.
    fn fetch_prescription(
        &self,
        patient: &HealthCardId,
        illness: &str,
    ) -> ConsultResult<MedicalPrescription> {
        let state = self.lock()?;
        state.ensure_online()?;
        let history = state.history(patient)?;

        let key = (patient.clone(), illness.to_string());
        if let Some(active) = state.prescriptions.get(&key) {
            return Ok(active.clone());
        }
        if state.failures.no_active_prescriptions {
            return Err(ConsultError::NoActivePrescription {
                patient: patient.to_string(),
                illness: illness.to_string(),
            });
        }
        MedicalPrescription::new(patient.clone(), history.doctor_membership(), illness)
    }

    /// Accept a signed prescription and return it with a `TRAT<millis>` code.
    fn submit(
        &self,
        patient: &HealthCardId,
        _history: &MedicalHistory,
        illness: &str,
        prescription: &MedicalPrescription,
    ) -> ConsultResult<MedicalPrescription> {
        let mut state = self.lock()?;
        state.ensure_online()?;
        state.history(patient)?;

        let missing = prescription.missing_for_submission();
        if state.failures.reject_submissions || !missing.is_empty() {
            let reason = if missing.is_empty() {
                "registry rejected the submission".to_string()
            } else {
                format!("missing {}", missing.join(", "))
            };
            warn!(patient = %patient, reason = %reason, "submission rejected");
            return Err(ConsultError::IncompletePrescription { reason });
        }

        let code = PrescriptionCode::new(format!("TRAT{}", Utc::now().timestamp_millis()))?;
        let mut registered = prescription.clone();
        registered.set_code(code);

        info!(
            patient = %patient,
            illness = %illness,
            code = %registered.code().map(ToString::to_string).unwrap_or_default(),
            "prescription registered"
        );

        state
            .prescriptions
            .insert((patient.clone(), illness.to_string()), registered.clone());
        state.submissions.push(registered.clone());
        Ok(registered)
    }
}
