//! The patient's medical history as seen during one consultation.

use std::fmt;

use serde::Serialize;

use medconsult_contracts::{
    error::{ConsultError, ConsultResult, ValidationKind},
    ids::HealthCardId,
};

/// Free-text clinical annotations for one patient, plus the family doctor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MedicalHistory {
    patient_id: HealthCardId,
    doctor_membership: u32,
    annotations: String,
}

pub(crate) fn ensure_membership(membership: u32) -> ConsultResult<u32> {
    if membership == 0 {
        return Err(ConsultError::validation(
            "membership number",
            ValidationKind::NotPositive,
            "doctor membership number must be positive",
        ));
    }
    Ok(membership)
}

impl MedicalHistory {
    pub fn new(patient_id: HealthCardId, doctor_membership: u32) -> ConsultResult<Self> {
        Ok(Self {
            patient_id,
            doctor_membership: ensure_membership(doctor_membership)?,
            annotations: String::new(),
        })
    }

    /// Append an annotation on its own line. Blank text is ignored.
    pub fn append_annotation(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        if !self.annotations.is_empty() {
            self.annotations.push('\n');
        }
        self.annotations.push_str(text);
    }

    /// Assign a new family doctor.
    pub fn reassign_doctor(&mut self, doctor_membership: u32) -> ConsultResult<()> {
        self.doctor_membership = ensure_membership(doctor_membership)?;
        Ok(())
    }

    pub fn patient_id(&self) -> &HealthCardId {
        &self.patient_id
    }

    pub fn doctor_membership(&self) -> u32 {
        self.doctor_membership
    }

    /// All annotations, newline-joined, oldest first.
    pub fn annotations(&self) -> &str {
        &self.annotations
    }

    pub fn annotation_lines(&self) -> impl Iterator<Item = &str> {
        self.annotations.lines()
    }
}

impl fmt::Display for MedicalHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "history of {} (doctor #{}, {} annotation line(s))",
            self.patient_id,
            self.doctor_membership,
            self.annotation_lines().count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cip() -> HealthCardId {
        HealthCardId::new("1234567890ABCDEF").unwrap()
    }

    #[test]
    fn zero_membership_is_rejected() {
        assert!(MedicalHistory::new(cip(), 0).is_err());
        let mut h = MedicalHistory::new(cip(), 100).unwrap();
        assert!(h.reassign_doctor(0).is_err());
        assert_eq!(h.doctor_membership(), 100);
        h.reassign_doctor(250).unwrap();
        assert_eq!(h.doctor_membership(), 250);
    }

    #[test]
    fn annotations_are_newline_joined_and_blank_is_ignored() {
        let mut h = MedicalHistory::new(cip(), 100).unwrap();
        h.append_annotation("Patient improves");
        h.append_annotation("   ");
        h.append_annotation("");
        h.append_annotation("Blood pressure 130/85");

        assert_eq!(h.annotations(), "Patient improves\nBlood pressure 130/85");
        assert_eq!(h.annotation_lines().count(), 2);
    }
}
