//! Taking guidelines: the full administration instructions for one medicine.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use medconsult_contracts::error::{ConsultError, ConsultResult, ValidationKind};

use crate::posology::{ensure_positive, FrequencyUnit, Posology};

/// The moment of the day a medicine is taken, relative to meals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DayMoment {
    BeforeBreakfast,
    DuringBreakfast,
    AfterBreakfast,
    BeforeLunch,
    DuringLunch,
    AfterLunch,
    BeforeDinner,
    DuringDinner,
    AfterDinner,
    BeforeMeals,
    DuringMeals,
    AfterMeals,
}

impl DayMoment {
    pub const ALL: [DayMoment; 12] = [
        Self::BeforeBreakfast,
        Self::DuringBreakfast,
        Self::AfterBreakfast,
        Self::BeforeLunch,
        Self::DuringLunch,
        Self::AfterLunch,
        Self::BeforeDinner,
        Self::DuringDinner,
        Self::AfterDinner,
        Self::BeforeMeals,
        Self::DuringMeals,
        Self::AfterMeals,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BeforeBreakfast => "BEFOREBREAKFAST",
            Self::DuringBreakfast => "DURINGBREAKFAST",
            Self::AfterBreakfast => "AFTERBREAKFAST",
            Self::BeforeLunch => "BEFORELUNCH",
            Self::DuringLunch => "DURINGLUNCH",
            Self::AfterLunch => "AFTERLUNCH",
            Self::BeforeDinner => "BEFOREDINNER",
            Self::DuringDinner => "DURINGDINNER",
            Self::AfterDinner => "AFTERDINNER",
            Self::BeforeMeals => "BEFOREMEALS",
            Self::DuringMeals => "DURINGMEALS",
            Self::AfterMeals => "AFTERMEALS",
        }
    }
}

impl FromStr for DayMoment {
    type Err = ConsultError;

    fn from_str(s: &str) -> ConsultResult<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                ConsultError::validation(
                    "day moment",
                    ValidationKind::InvalidFormat,
                    format!("'{wanted}' is not a recognised moment of the day"),
                )
            })
    }
}

impl fmt::Display for DayMoment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When, for how long, how much and how often a medicine is taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TakingGuideline {
    day_moment: DayMoment,
    duration_days: f32,
    posology: Posology,
    instructions: String,
}

impl TakingGuideline {
    pub fn new(
        day_moment: DayMoment,
        duration_days: f32,
        posology: Posology,
        instructions: impl Into<String>,
    ) -> ConsultResult<Self> {
        Ok(Self {
            day_moment,
            duration_days: ensure_positive("duration", duration_days)?,
            posology,
            instructions: instructions.into(),
        })
    }

    /// Build a guideline and its posology in one go.
    pub fn with_posology(
        day_moment: DayMoment,
        duration_days: f32,
        dose: f32,
        frequency: f32,
        frequency_unit: FrequencyUnit,
        instructions: impl Into<String>,
    ) -> ConsultResult<Self> {
        let posology = Posology::new(dose, frequency, frequency_unit)?;
        Self::new(day_moment, duration_days, posology, instructions)
    }

    pub fn day_moment(&self) -> DayMoment {
        self.day_moment
    }

    pub fn duration_days(&self) -> f32 {
        self.duration_days
    }

    pub fn posology(&self) -> &Posology {
        &self.posology
    }

    pub fn posology_mut(&mut self) -> &mut Posology {
        &mut self.posology
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn set_day_moment(&mut self, day_moment: DayMoment) {
        self.day_moment = day_moment;
    }

    pub fn set_duration_days(&mut self, duration_days: f32) -> ConsultResult<()> {
        self.duration_days = ensure_positive("duration", duration_days)?;
        Ok(())
    }

    pub fn set_posology(&mut self, posology: Posology) {
        self.posology = posology;
    }

    pub fn set_instructions(&mut self, instructions: impl Into<String>) {
        self.instructions = instructions.into();
    }
}

impl fmt::Display for TakingGuideline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {} day(s), {}",
            self.day_moment, self.duration_days, self.posology
        )?;
        if !self.instructions.is_empty() {
            write!(f, " ({})", self.instructions)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TakingGuideline {
        TakingGuideline::with_posology(
            DayMoment::BeforeLunch,
            15.0,
            1.0,
            1.0,
            FrequencyUnit::Day,
            "with water",
        )
        .unwrap()
    }

    #[test]
    fn builds_with_valid_values() {
        let g = sample();
        assert_eq!(g.day_moment(), DayMoment::BeforeLunch);
        assert_eq!(g.duration_days(), 15.0);
        assert_eq!(g.posology().dose(), 1.0);
        assert_eq!(g.instructions(), "with water");
    }

    #[test]
    fn rejects_non_positive_duration() {
        let posology = Posology::new(1.0, 1.0, FrequencyUnit::Day).unwrap();
        assert!(TakingGuideline::new(DayMoment::AfterLunch, 0.0, posology.clone(), "").is_err());
        assert!(TakingGuideline::new(DayMoment::AfterLunch, -1.0, posology, "").is_err());
    }

    #[test]
    fn rejects_invalid_posology_values() {
        let err = TakingGuideline::with_posology(
            DayMoment::BeforeLunch,
            15.0,
            0.0,
            1.0,
            FrequencyUnit::Day,
            "",
        )
        .unwrap_err();
        assert!(matches!(err, ConsultError::Validation { ref field, .. } if field == "dose"));
    }

    #[test]
    fn setters_revalidate() {
        let mut g = sample();
        g.set_day_moment(DayMoment::AfterLunch);
        assert_eq!(g.day_moment(), DayMoment::AfterLunch);

        assert!(g.set_duration_days(0.0).is_err());
        assert_eq!(g.duration_days(), 15.0);

        g.posology_mut().set_dose(3.0).unwrap();
        assert_eq!(g.posology().dose(), 3.0);

        g.set_instructions("");
        assert_eq!(g.instructions(), "");
    }

    #[test]
    fn day_moment_parsing() {
        assert_eq!("BEFORELUNCH".parse::<DayMoment>().unwrap(), DayMoment::BeforeLunch);
        assert_eq!(" afterlunch".parse::<DayMoment>().unwrap(), DayMoment::AfterLunch);
        assert!("BEFORE_LUNCH".parse::<DayMoment>().is_err());
        assert!("".parse::<DayMoment>().is_err());
    }
}
