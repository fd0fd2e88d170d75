//! Applying AI suggestions to a prescription.

use medconsult_contracts::{
    error::{ConsultError, ConsultResult},
    suggestion::{OperationKind, SuggestedGuideline, Suggestion},
};

use crate::{
    guideline::TakingGuideline,
    posology::Posology,
    prescription::{parse_number, MedicalPrescription},
};

impl MedicalPrescription {
    /// Apply one suggestion.
    ///
    /// INSERT goes through `add_line`, REMOVE through `remove_line`. MODIFY
    /// rebuilds the line's guideline with every filled slot overriding the
    /// current value and swaps it in whole, so a bad override leaves the
    /// line untouched.
    pub fn apply_suggestion(&mut self, suggestion: &Suggestion) -> ConsultResult<()> {
        let product = suggestion.product_id();
        match suggestion.operation() {
            OperationKind::Insert => self.add_line(product.clone(), &suggestion.to_line_fields()),
            OperationKind::Remove => self.remove_line(product),
            OperationKind::Modify => {
                let current = self
                    .line(product)
                    .ok_or_else(|| ConsultError::ProductNotFound {
                        product: product.to_string(),
                    })?
                    .guideline();
                let merged = merge_guideline(current, suggestion.guideline())?;
                self.replace_guideline(product, merged)
            }
        }
    }
}

fn merge_guideline(
    current: &TakingGuideline,
    overrides: &SuggestedGuideline,
) -> ConsultResult<TakingGuideline> {
    let build = || -> ConsultResult<TakingGuideline> {
        let day_moment = match &overrides.day_moment {
            Some(raw) => raw.parse()?,
            None => current.day_moment(),
        };
        let duration = match &overrides.duration {
            Some(raw) => parse_number("duration", raw)?,
            None => current.duration_days(),
        };
        let dose = match &overrides.dose {
            Some(raw) => parse_number("dose", raw)?,
            None => current.posology().dose(),
        };
        let frequency = match &overrides.frequency {
            Some(raw) => parse_number("frequency", raw)?,
            None => current.posology().frequency(),
        };
        let unit = match &overrides.frequency_unit {
            Some(raw) => raw.parse()?,
            None => current.posology().frequency_unit(),
        };
        let instructions = overrides
            .instructions
            .clone()
            .unwrap_or_else(|| current.instructions().to_string());

        let posology = Posology::new(dose, frequency, unit)?;
        TakingGuideline::new(day_moment, duration, posology, instructions)
    };

    build().map_err(|e| ConsultError::GuidelineFormat {
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use medconsult_contracts::ids::{HealthCardId, ProductId};

    use super::*;
    use crate::{guideline::DayMoment, posology::FrequencyUnit};

    fn pid(code: &str) -> ProductId {
        ProductId::new(code).unwrap()
    }

    fn prescription_with_line() -> MedicalPrescription {
        let mut p = MedicalPrescription::new(HealthCardId::new("1234567890ABCDEF").unwrap(), 100, "Asma")
            .unwrap();
        p.add_line(
            pid("123456789012"),
            &["BEFORELUNCH", "15", "1", "1", "DAY", "with water", ""],
        )
        .unwrap();
        p
    }

    fn modify(product: &str, raw: &[&str]) -> Suggestion {
        Suggestion::new(OperationKind::Modify, pid(product), SuggestedGuideline::from_raw(raw)).unwrap()
    }

    #[test]
    fn insert_adds_a_full_line() {
        let mut p = prescription_with_line();
        let s = Suggestion::new(
            OperationKind::Insert,
            pid("210987654321"),
            SuggestedGuideline::from_raw(&["AFTERDINNER", "7", "2", "8", "HOUR", "crushed"]),
        )
        .unwrap();
        p.apply_suggestion(&s).unwrap();

        let g = p.line(&pid("210987654321")).unwrap().guideline();
        assert_eq!(g.day_moment(), DayMoment::AfterDinner);
        assert_eq!(g.posology().frequency_unit(), FrequencyUnit::Hour);
        assert_eq!(g.instructions(), "crushed");
    }

    #[test]
    fn insert_of_existing_product_is_duplicate() {
        let mut p = prescription_with_line();
        let s = Suggestion::new(
            OperationKind::Insert,
            pid("123456789012"),
            SuggestedGuideline::from_raw(&["AFTERDINNER", "7", "2", "8", "HOUR", "crushed"]),
        )
        .unwrap();
        assert!(matches!(
            p.apply_suggestion(&s),
            Err(ConsultError::DuplicateProduct { .. })
        ));
    }

    #[test]
    fn remove_drops_the_line() {
        let mut p = prescription_with_line();
        p.apply_suggestion(&Suggestion::remove(pid("123456789012"))).unwrap();
        assert_eq!(p.line_count(), 0);
    }

    #[test]
    fn modify_overrides_only_filled_slots() {
        let mut p = prescription_with_line();
        p.apply_suggestion(&modify("123456789012", &["", "", "3", "", "WEEK", ""]))
            .unwrap();

        let g = p.line(&pid("123456789012")).unwrap().guideline();
        assert_eq!(g.day_moment(), DayMoment::BeforeLunch);
        assert_eq!(g.duration_days(), 15.0);
        assert_eq!(g.posology().dose(), 3.0);
        assert_eq!(g.posology().frequency(), 1.0);
        assert_eq!(g.posology().frequency_unit(), FrequencyUnit::Week);
        assert_eq!(g.instructions(), "with water");
    }

    #[test]
    fn bad_modify_leaves_line_untouched() {
        let mut p = prescription_with_line();
        let before = p.clone();
        let err = p
            .apply_suggestion(&modify("123456789012", &["", "", "3", "-1", "", ""]))
            .unwrap_err();
        assert!(matches!(err, ConsultError::GuidelineFormat { .. }));
        assert_eq!(p, before);
    }

    #[test]
    fn modify_absent_product_is_not_found() {
        let mut p = prescription_with_line();
        assert!(matches!(
            p.apply_suggestion(&modify("999999999999", &["", "", "3", "", "", ""])),
            Err(ConsultError::ProductNotFound { .. })
        ));
    }
}
