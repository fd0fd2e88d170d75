//! The medical prescription aggregate and its line collection.
//!
//! A prescription owns at most one line per product. Lines keep their
//! insertion order so the prescription prints the way the doctor wrote it.
//! Every mutator validates before touching state: a failed call leaves the
//! prescription exactly as it was.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use medconsult_contracts::{
    error::{ConsultError, ConsultResult, ValidationKind},
    ids::{DigitalSignature, HealthCardId, PrescriptionCode, ProductId},
};

use crate::{
    guideline::{DayMoment, TakingGuideline},
    history::ensure_membership,
    line::PrescriptionLine,
    posology::FrequencyUnit,
};

/// Number of raw fields `add_line` expects.
///
/// Order: day moment, duration (days), dose, frequency, frequency unit,
/// free-text instructions, reserved.
pub const GUIDELINE_FIELD_COUNT: usize = 7;

/// An electronic prescription for one patient and one illness.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedicalPrescription {
    patient_id: HealthCardId,
    doctor_membership: u32,
    illness: String,
    code: Option<PrescriptionCode>,
    created_at: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    signature: Option<DigitalSignature>,
    lines: Vec<PrescriptionLine>,
}

/// The part of a prescription an electronic signature commits to.
///
/// Excludes the registry-assigned code, the creation date and the signature
/// itself, which are all set at or after signing time.
#[derive(Debug, Serialize)]
pub struct SigningPayload<'a> {
    pub patient_id: &'a HealthCardId,
    pub doctor_membership: u32,
    pub illness: &'a str,
    pub end_date: Option<DateTime<Utc>>,
    pub lines: &'a [PrescriptionLine],
}

impl MedicalPrescription {
    pub fn new(
        patient_id: HealthCardId,
        doctor_membership: u32,
        illness: impl Into<String>,
    ) -> ConsultResult<Self> {
        let illness = illness.into();
        if illness.trim().is_empty() {
            return Err(ConsultError::validation(
                "illness",
                ValidationKind::Blank,
                "illness must not be blank",
            ));
        }

        Ok(Self {
            patient_id,
            doctor_membership: ensure_membership(doctor_membership)?,
            illness,
            code: None,
            created_at: None,
            end_date: None,
            signature: None,
            lines: Vec::new(),
        })
    }

    // ── Line collection ──────────────────────────────────────────────────────

    /// Add a line for `product_id` from the seven raw guideline fields.
    ///
    /// # Errors
    ///
    /// - `DuplicateProduct` if the product already has a line (checked first).
    /// - `GuidelineFormat` if `fields` is not exactly seven long, a value does
    ///   not parse, or a numeric value is not strictly positive.
    pub fn add_line<S: AsRef<str>>(
        &mut self,
        product_id: ProductId,
        fields: &[S],
    ) -> ConsultResult<()> {
        if self.contains(&product_id) {
            return Err(ConsultError::DuplicateProduct {
                product: product_id.to_string(),
            });
        }

        let guideline = parse_guideline_fields(fields)?;
        self.lines.push(PrescriptionLine::new(product_id, guideline));
        Ok(())
    }

    pub fn modify_dose(&mut self, product_id: &ProductId, dose: f32) -> ConsultResult<()> {
        self.line_mut(product_id)?
            .guideline_mut()
            .posology_mut()
            .set_dose(dose)
    }

    pub fn modify_frequency(&mut self, product_id: &ProductId, frequency: f32) -> ConsultResult<()> {
        self.line_mut(product_id)?
            .guideline_mut()
            .posology_mut()
            .set_frequency(frequency)
    }

    pub fn modify_duration(&mut self, product_id: &ProductId, duration_days: f32) -> ConsultResult<()> {
        self.line_mut(product_id)?
            .guideline_mut()
            .set_duration_days(duration_days)
    }

    /// Swap the whole guideline of an existing line.
    pub fn replace_guideline(
        &mut self,
        product_id: &ProductId,
        guideline: TakingGuideline,
    ) -> ConsultResult<()> {
        self.line_mut(product_id)?.replace_guideline(guideline);
        Ok(())
    }

    pub fn remove_line(&mut self, product_id: &ProductId) -> ConsultResult<()> {
        let index = self.position(product_id)?;
        self.lines.remove(index);
        Ok(())
    }

    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.lines.iter().any(|l| l.product_id() == product_id)
    }

    pub fn line(&self, product_id: &ProductId) -> Option<&PrescriptionLine> {
        self.lines.iter().find(|l| l.product_id() == product_id)
    }

    /// All lines in insertion order.
    pub fn lines(&self) -> &[PrescriptionLine] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn position(&self, product_id: &ProductId) -> ConsultResult<usize> {
        self.lines
            .iter()
            .position(|l| l.product_id() == product_id)
            .ok_or_else(|| ConsultError::ProductNotFound {
                product: product_id.to_string(),
            })
    }

    fn line_mut(&mut self, product_id: &ProductId) -> ConsultResult<&mut PrescriptionLine> {
        let index = self.position(product_id)?;
        Ok(&mut self.lines[index])
    }

    // ── Completion ───────────────────────────────────────────────────────────

    /// Code, creation date, end date and signature all set, and at least one line.
    pub fn is_complete(&self) -> bool {
        self.code.is_some() && self.is_ready_for_submission()
    }

    /// Everything but the registry-assigned code is in place.
    pub fn is_ready_for_submission(&self) -> bool {
        self.missing_for_submission().is_empty()
    }

    /// Names of the parts still missing before the registry will accept this
    /// prescription.
    pub fn missing_for_submission(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.created_at.is_none() {
            missing.push("creation date");
        }
        if self.end_date.is_none() {
            missing.push("treatment end date");
        }
        if self.signature.is_none() {
            missing.push("electronic signature");
        }
        if self.lines.is_empty() {
            missing.push("prescription lines");
        }
        missing
    }

    pub fn signing_payload(&self) -> SigningPayload<'_> {
        SigningPayload {
            patient_id: &self.patient_id,
            doctor_membership: self.doctor_membership,
            illness: &self.illness,
            end_date: self.end_date,
            lines: &self.lines,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn patient_id(&self) -> &HealthCardId {
        &self.patient_id
    }

    pub fn doctor_membership(&self) -> u32 {
        self.doctor_membership
    }

    pub fn illness(&self) -> &str {
        &self.illness
    }

    pub fn code(&self) -> Option<&PrescriptionCode> {
        self.code.as_ref()
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn end_date(&self) -> Option<DateTime<Utc>> {
        self.end_date
    }

    pub fn signature(&self) -> Option<&DigitalSignature> {
        self.signature.as_ref()
    }

    // ── Setters ──────────────────────────────────────────────────────────────

    pub fn set_code(&mut self, code: PrescriptionCode) {
        self.code = Some(code);
    }

    pub fn set_created_at(&mut self, created_at: DateTime<Utc>) {
        self.created_at = Some(created_at);
    }

    pub fn set_end_date(&mut self, end_date: DateTime<Utc>) {
        self.end_date = Some(end_date);
    }

    pub fn set_signature(&mut self, signature: DigitalSignature) {
        self.signature = Some(signature);
    }

    pub fn clear_code(&mut self) -> ConsultResult<()> {
        self.ensure_incomplete("prescription code")?;
        self.code = None;
        Ok(())
    }

    pub fn clear_created_at(&mut self) -> ConsultResult<()> {
        self.ensure_incomplete("creation date")?;
        self.created_at = None;
        Ok(())
    }

    pub fn clear_end_date(&mut self) -> ConsultResult<()> {
        self.ensure_incomplete("treatment end date")?;
        self.end_date = None;
        Ok(())
    }

    pub fn clear_signature(&mut self) -> ConsultResult<()> {
        self.ensure_incomplete("electronic signature")?;
        self.signature = None;
        Ok(())
    }

    pub fn reassign_doctor(&mut self, doctor_membership: u32) -> ConsultResult<()> {
        self.doctor_membership = ensure_membership(doctor_membership)?;
        Ok(())
    }

    fn ensure_incomplete(&self, field: &str) -> ConsultResult<()> {
        if self.is_complete() {
            return Err(ConsultError::validation(
                field,
                ValidationKind::Blank,
                format!("{field} cannot be unset on a complete prescription"),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for MedicalPrescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Prescription for {} ({}), doctor #{}",
            self.patient_id, self.illness, self.doctor_membership
        )?;
        if let Some(code) = &self.code {
            writeln!(f, "  code:    {code}")?;
        }
        if let Some(created_at) = self.created_at {
            writeln!(f, "  created: {}", created_at.format("%Y-%m-%d %H:%M UTC"))?;
        }
        if let Some(end_date) = self.end_date {
            writeln!(f, "  ends:    {}", end_date.format("%Y-%m-%d"))?;
        }
        for line in &self.lines {
            writeln!(f, "  - {line}")?;
        }
        write!(
            f,
            "  {} line(s), {}",
            self.lines.len(),
            if self.is_complete() { "complete" } else { "incomplete" }
        )
    }
}

// ── Raw field parsing ────────────────────────────────────────────────────────

/// Parse one numeric guideline value, trimmed.
pub(crate) fn parse_number(field: &str, raw: &str) -> ConsultResult<f32> {
    raw.trim().parse::<f32>().map_err(|_| {
        ConsultError::validation(
            field,
            ValidationKind::InvalidFormat,
            format!("'{}' is not a number", raw.trim()),
        )
    })
}

/// Turn the seven raw fields of a manual line entry into a guideline.
///
/// Parse failures and range failures both surface as `GuidelineFormat`.
pub fn parse_guideline_fields<S: AsRef<str>>(fields: &[S]) -> ConsultResult<TakingGuideline> {
    if fields.len() != GUIDELINE_FIELD_COUNT {
        return Err(ConsultError::GuidelineFormat {
            reason: format!(
                "expected exactly {GUIDELINE_FIELD_COUNT} fields, got {}",
                fields.len()
            ),
        });
    }

    let field = |i: usize| fields[i].as_ref();
    let build = || -> ConsultResult<TakingGuideline> {
        let day_moment: DayMoment = field(0).parse()?;
        let duration = parse_number("duration", field(1))?;
        let dose = parse_number("dose", field(2))?;
        let frequency = parse_number("frequency", field(3))?;
        let unit: FrequencyUnit = field(4).parse()?;
        TakingGuideline::with_posology(day_moment, duration, dose, frequency, unit, field(5))
    };

    build().map_err(|e| ConsultError::GuidelineFormat {
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn cip() -> HealthCardId {
        HealthCardId::new("1234567890ABCDEF").unwrap()
    }

    fn pid(code: &str) -> ProductId {
        ProductId::new(code).unwrap()
    }

    fn fields() -> [&'static str; 7] {
        ["BEFORELUNCH", "15", "1", "1", "DAY", "with water", ""]
    }

    fn prescription() -> MedicalPrescription {
        MedicalPrescription::new(cip(), 100, "Hipertensión").unwrap()
    }

    #[test]
    fn new_validates_illness_and_membership() {
        assert!(MedicalPrescription::new(cip(), 100, "  ").is_err());
        assert!(MedicalPrescription::new(cip(), 0, "Asma").is_err());
        let p = prescription();
        assert_eq!(p.line_count(), 0);
        assert!(!p.is_complete());
    }

    #[test]
    fn add_line_parses_fields() {
        let mut p = prescription();
        p.add_line(pid("123456789012"), &fields()).unwrap();

        let line = p.line(&pid("123456789012")).unwrap();
        let g = line.guideline();
        assert_eq!(g.day_moment(), DayMoment::BeforeLunch);
        assert_eq!(g.duration_days(), 15.0);
        assert_eq!(g.posology().dose(), 1.0);
        assert_eq!(g.posology().frequency(), 1.0);
        assert_eq!(g.posology().frequency_unit(), FrequencyUnit::Day);
        assert_eq!(g.instructions(), "with water");
    }

    #[test]
    fn add_line_duplicate_product_fails_and_keeps_count() {
        let mut p = prescription();
        p.add_line(pid("123456789012"), &fields()).unwrap();

        let err = p.add_line(pid("123456789012"), &fields()).unwrap_err();
        assert!(matches!(err, ConsultError::DuplicateProduct { .. }));
        assert_eq!(p.line_count(), 1);
    }

    #[test]
    fn add_line_duplicate_is_reported_before_format() {
        let mut p = prescription();
        p.add_line(pid("123456789012"), &fields()).unwrap();
        let err = p.add_line(pid("123456789012"), &["BEFORELUNCH"]).unwrap_err();
        assert!(matches!(err, ConsultError::DuplicateProduct { .. }));
    }

    #[test]
    fn add_line_rejects_malformed_fields_without_mutation() {
        let bad_inputs: Vec<Vec<&str>> = vec![
            vec!["BEFORELUNCH", "15"],
            vec!["BEFORELUNCH", "15", "1", "1", "DAY", "water"],
            vec!["BEFORELUNCH", "15", "1", "1", "DAY", "water", "", "extra"],
            vec!["NOON", "15", "1", "1", "DAY", "water", ""],
            vec!["BEFORELUNCH", "fifteen", "1", "1", "DAY", "water", ""],
            vec!["BEFORELUNCH", "15", "0", "1", "DAY", "water", ""],
            vec!["BEFORELUNCH", "15", "1", "-3", "DAY", "water", ""],
            vec!["BEFORELUNCH", "-15", "1", "1", "DAY", "water", ""],
            vec!["BEFORELUNCH", "15", "1", "1", "YEAR", "water", ""],
            vec!["BEFORELUNCH", "15", "NaN", "1", "DAY", "water", ""],
        ];

        let mut p = prescription();
        for bad in bad_inputs {
            let err = p.add_line(pid("123456789012"), &bad).unwrap_err();
            assert!(
                matches!(err, ConsultError::GuidelineFormat { .. }),
                "expected GuidelineFormat for {bad:?}, got {err:?}"
            );
            assert_eq!(p.line_count(), 0);
        }
    }

    #[test]
    fn modify_operations_touch_only_their_line() {
        let mut p = prescription();
        p.add_line(pid("123456789012"), &fields()).unwrap();
        p.add_line(pid("987654321098"), &fields()).unwrap();

        p.modify_dose(&pid("123456789012"), 2.0).unwrap();
        p.modify_frequency(&pid("123456789012"), 3.0).unwrap();
        p.modify_duration(&pid("123456789012"), 30.0).unwrap();

        let changed = p.line(&pid("123456789012")).unwrap().guideline();
        assert_eq!(changed.posology().dose(), 2.0);
        assert_eq!(changed.posology().frequency(), 3.0);
        assert_eq!(changed.duration_days(), 30.0);

        let untouched = p.line(&pid("987654321098")).unwrap().guideline();
        assert_eq!(untouched.posology().dose(), 1.0);
        assert_eq!(untouched.duration_days(), 15.0);
    }

    #[test]
    fn modify_absent_product_is_not_found_even_with_bad_value() {
        let mut p = prescription();
        let err = p.modify_dose(&pid("123456789012"), -1.0).unwrap_err();
        assert!(matches!(err, ConsultError::ProductNotFound { .. }));
        assert!(matches!(
            p.modify_frequency(&pid("123456789012"), 1.0),
            Err(ConsultError::ProductNotFound { .. })
        ));
        assert!(matches!(
            p.modify_duration(&pid("123456789012"), 1.0),
            Err(ConsultError::ProductNotFound { .. })
        ));
    }

    #[test]
    fn modify_with_non_positive_value_is_validation_error() {
        let mut p = prescription();
        p.add_line(pid("123456789012"), &fields()).unwrap();
        let err = p.modify_dose(&pid("123456789012"), 0.0).unwrap_err();
        assert!(matches!(err, ConsultError::Validation { kind: ValidationKind::NotPositive, .. }));
        assert_eq!(
            p.line(&pid("123456789012")).unwrap().guideline().posology().dose(),
            1.0
        );
    }

    #[test]
    fn remove_line_and_not_found() {
        let mut p = prescription();
        p.add_line(pid("123456789012"), &fields()).unwrap();
        p.remove_line(&pid("123456789012")).unwrap();
        assert_eq!(p.line_count(), 0);

        let err = p.remove_line(&pid("123456789012")).unwrap_err();
        assert!(matches!(err, ConsultError::ProductNotFound { .. }));
    }

    #[test]
    fn lines_keep_insertion_order() {
        let mut p = prescription();
        for code in ["300000000000", "100000000000", "200000000000"] {
            p.add_line(pid(code), &fields()).unwrap();
        }
        let order: Vec<&str> = p.lines().iter().map(|l| l.product_id().as_str()).collect();
        assert_eq!(order, ["300000000000", "100000000000", "200000000000"]);
    }

    fn complete() -> MedicalPrescription {
        let mut p = prescription();
        p.add_line(pid("123456789012"), &fields()).unwrap();
        p.set_created_at(Utc::now());
        p.set_end_date(Utc::now() + Duration::days(15));
        p.set_signature(DigitalSignature::new(vec![7; 32]).unwrap());
        assert!(p.is_ready_for_submission());
        assert!(!p.is_complete());
        p.set_code(PrescriptionCode::new("TRAT-0001").unwrap());
        p
    }

    #[test]
    fn completeness_requires_every_part() {
        let p = complete();
        assert!(p.is_complete());

        let mut no_lines = p.clone();
        no_lines.remove_line(&pid("123456789012")).unwrap();
        assert!(!no_lines.is_complete());
        assert_eq!(no_lines.missing_for_submission(), vec!["prescription lines"]);
    }

    #[test]
    fn fields_cannot_be_cleared_once_complete() {
        let mut p = complete();
        assert!(p.clear_end_date().is_err());
        assert!(p.clear_signature().is_err());
        assert!(p.end_date().is_some());

        let mut draft = prescription();
        draft.set_end_date(Utc::now());
        draft.clear_end_date().unwrap();
        assert!(draft.end_date().is_none());
    }

    #[test]
    fn dates_are_values_not_aliases() {
        let mut p = prescription();
        let mut end = Utc::now() + Duration::days(3);
        p.set_end_date(end);
        end += Duration::days(10);
        assert_ne!(p.end_date(), Some(end));
    }

    #[test]
    fn signing_payload_excludes_code_and_signature() {
        let p = complete();
        let json = serde_json::to_value(p.signing_payload()).unwrap();
        assert!(json.get("code").is_none());
        assert!(json.get("signature").is_none());
        assert_eq!(json["illness"], "Hipertensión");
        assert_eq!(json["lines"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn display_lists_lines() {
        let p = complete();
        let text = p.to_string();
        assert!(text.contains("123456789012"));
        assert!(text.contains("TRAT-0001"));
        assert!(text.contains("complete"));
    }
}
