//! A single medicine line within a prescription.

use std::fmt;

use serde::Serialize;

use medconsult_contracts::ids::ProductId;

use crate::guideline::TakingGuideline;

/// Associates a product with its taking guideline.
///
/// Callers may read the guideline or replace it wholesale. Patching single
/// values goes through `MedicalPrescription`, which owns the line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrescriptionLine {
    product_id: ProductId,
    guideline: TakingGuideline,
}

impl PrescriptionLine {
    pub fn new(product_id: ProductId, guideline: TakingGuideline) -> Self {
        Self {
            product_id,
            guideline,
        }
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn guideline(&self) -> &TakingGuideline {
        &self.guideline
    }

    pub fn replace_guideline(&mut self, guideline: TakingGuideline) {
        self.guideline = guideline;
    }

    pub(crate) fn guideline_mut(&mut self) -> &mut TakingGuideline {
        &mut self.guideline
    }
}

impl fmt::Display for PrescriptionLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.product_id, self.guideline)
    }
}
