//! Structured prescription edits proposed by the decision-making AI.
//!
//! A `Suggestion` is what the AI parser produces from one tagged fragment of
//! an AI answer. Guideline values stay textual here: they are parsed and
//! range-checked only when the suggestion is applied to a prescription, so
//! that INSERT suggestions go through exactly the same checks as a doctor
//! typing the line by hand.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    error::{ConsultError, ConsultResult, ValidationKind},
    ids::ProductId,
};

/// The edit a suggestion asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperationKind {
    /// Add a new medicine line.
    Insert,
    /// Remove an existing medicine line.
    Remove,
    /// Change some guideline values of an existing line.
    Modify,
}

impl OperationKind {
    /// Resolve an operation code as written by the AI.
    ///
    /// Accepted aliases (trimmed, case-insensitive): `I`/`INSERT`,
    /// `R`/`E`/`REMOVE`, `M`/`MODIFY`.
    pub fn from_code(code: &str) -> ConsultResult<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "I" | "INSERT" => Ok(Self::Insert),
            "R" | "E" | "REMOVE" => Ok(Self::Remove),
            "M" | "MODIFY" => Ok(Self::Modify),
            _ => Err(ConsultError::validation(
                "suggestion operation",
                ValidationKind::InvalidFormat,
                format!("unknown operation code '{}'", code.trim()),
            )),
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Insert => "INSERT",
            Self::Remove => "REMOVE",
            Self::Modify => "MODIFY",
        };
        f.write_str(label)
    }
}

/// The six guideline values a suggestion may carry, in wire order.
///
/// `None` means the AI left the slot empty. Values are stored trimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedGuideline {
    pub day_moment: Option<String>,
    pub duration: Option<String>,
    pub dose: Option<String>,
    pub frequency: Option<String>,
    pub frequency_unit: Option<String>,
    pub instructions: Option<String>,
}

impl SuggestedGuideline {
    /// Number of guideline slots a fragment carries after the product code.
    pub const FIELD_COUNT: usize = 6;

    /// Build from raw slots in wire order; missing trailing slots are empty.
    pub fn from_raw<S: AsRef<str>>(raw: &[S]) -> Self {
        let slot = |i: usize| -> Option<String> {
            raw.get(i)
                .map(|s| s.as_ref().trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Self {
            day_moment: slot(0),
            duration: slot(1),
            dose: slot(2),
            frequency: slot(3),
            frequency_unit: slot(4),
            instructions: slot(5),
        }
    }

    fn slots(&self) -> [&Option<String>; Self::FIELD_COUNT] {
        [
            &self.day_moment,
            &self.duration,
            &self.dose,
            &self.frequency,
            &self.frequency_unit,
            &self.instructions,
        ]
    }

    /// True when every slot is filled.
    pub fn is_full(&self) -> bool {
        self.slots().iter().all(|s| s.is_some())
    }

    /// True when no slot is filled.
    pub fn is_empty(&self) -> bool {
        self.slots().iter().all(|s| s.is_none())
    }
}

/// One structured edit proposed by the decision-making AI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    operation: OperationKind,
    product_id: ProductId,
    guideline: SuggestedGuideline,
}

impl Suggestion {
    /// Build a suggestion, enforcing the per-operation field rules.
    ///
    /// - INSERT needs all six guideline values.
    /// - REMOVE ignores guideline values; they are dropped.
    /// - MODIFY needs at least one guideline value.
    pub fn new(
        operation: OperationKind,
        product_id: ProductId,
        guideline: SuggestedGuideline,
    ) -> ConsultResult<Self> {
        let guideline = match operation {
            OperationKind::Insert if !guideline.is_full() => {
                return Err(ConsultError::validation(
                    "suggestion guideline",
                    ValidationKind::Blank,
                    format!("INSERT of {product_id} requires all six guideline values"),
                ));
            }
            OperationKind::Modify if guideline.is_empty() => {
                return Err(ConsultError::validation(
                    "suggestion guideline",
                    ValidationKind::Blank,
                    format!("MODIFY of {product_id} requires at least one guideline value"),
                ));
            }
            OperationKind::Remove => SuggestedGuideline::default(),
            _ => guideline,
        };

        Ok(Self {
            operation,
            product_id,
            guideline,
        })
    }

    /// Shorthand for a REMOVE suggestion.
    pub fn remove(product_id: ProductId) -> Self {
        Self {
            operation: OperationKind::Remove,
            product_id,
            guideline: SuggestedGuideline::default(),
        }
    }

    pub fn operation(&self) -> OperationKind {
        self.operation
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn guideline(&self) -> &SuggestedGuideline {
        &self.guideline
    }

    /// The seven raw taking-guideline fields an INSERT maps to.
    ///
    /// Slot order matches manual line entry; the seventh slot is reserved and
    /// left empty. Empty slots (only possible for MODIFY) render as `""`.
    pub fn to_line_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = self
            .guideline
            .slots()
            .iter()
            .map(|s| s.as_deref().unwrap_or_default().to_string())
            .collect();
        fields.push(String::new());
        fields
    }
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.operation, self.product_id)?;
        if !self.guideline.is_empty() {
            let values: Vec<&str> = self
                .guideline
                .slots()
                .iter()
                .map(|s| s.as_deref().unwrap_or("-"))
                .collect();
            write!(f, " [{}]", values.join(", "))?;
        }
        Ok(())
    }
}

/// What the parser does with a fragment it cannot turn into a suggestion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MalformedSuggestionPolicy {
    /// Fail the whole parse with the fragment's error.
    #[default]
    Abort,
    /// Log the fragment and carry on with the rest.
    Skip,
}
