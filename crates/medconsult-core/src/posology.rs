//! Posology: how much of a medicine, and how often.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use medconsult_contracts::error::{ConsultError, ConsultResult, ValidationKind};

/// The time unit a posology frequency is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FrequencyUnit {
    Hour,
    Day,
    Week,
    Month,
}

impl FrequencyUnit {
    pub const ALL: [FrequencyUnit; 4] = [Self::Hour, Self::Day, Self::Week, Self::Month];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hour => "HOUR",
            Self::Day => "DAY",
            Self::Week => "WEEK",
            Self::Month => "MONTH",
        }
    }
}

impl FromStr for FrequencyUnit {
    type Err = ConsultError;

    /// Parse a unit name, ignoring surrounding whitespace and case.
    fn from_str(s: &str) -> ConsultResult<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|u| u.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                ConsultError::validation(
                    "frequency unit",
                    ValidationKind::InvalidFormat,
                    format!("'{wanted}' is not one of HOUR, DAY, WEEK, MONTH"),
                )
            })
    }
}

impl fmt::Display for FrequencyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reject zero, negative, NaN and infinite values for a strictly positive field.
pub(crate) fn ensure_positive(field: &str, value: f32) -> ConsultResult<f32> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConsultError::validation(
            field,
            ValidationKind::NotPositive,
            format!("{field} must be a positive number, got {value}"),
        ))
    }
}

/// Dose and frequency of one medicine.
///
/// Every setter re-validates, so a `Posology` never holds a non-positive
/// dose or frequency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posology {
    dose: f32,
    frequency: f32,
    frequency_unit: FrequencyUnit,
}

impl Posology {
    pub fn new(dose: f32, frequency: f32, frequency_unit: FrequencyUnit) -> ConsultResult<Self> {
        Ok(Self {
            dose: ensure_positive("dose", dose)?,
            frequency: ensure_positive("frequency", frequency)?,
            frequency_unit,
        })
    }

    pub fn dose(&self) -> f32 {
        self.dose
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn frequency_unit(&self) -> FrequencyUnit {
        self.frequency_unit
    }

    pub fn set_dose(&mut self, dose: f32) -> ConsultResult<()> {
        self.dose = ensure_positive("dose", dose)?;
        Ok(())
    }

    pub fn set_frequency(&mut self, frequency: f32) -> ConsultResult<()> {
        self.frequency = ensure_positive("frequency", frequency)?;
        Ok(())
    }

    pub fn set_frequency_unit(&mut self, unit: FrequencyUnit) {
        self.frequency_unit = unit;
    }
}

impl fmt::Display for Posology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} unit(s) every {} {}", self.dose, self.frequency, self.frequency_unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_non_positive_values() {
        assert!(Posology::new(1.0, 1.0, FrequencyUnit::Day).is_ok());
        assert!(Posology::new(0.0, 1.0, FrequencyUnit::Day).is_err());
        assert!(Posology::new(1.0, -2.0, FrequencyUnit::Day).is_err());
        assert!(Posology::new(f32::NAN, 1.0, FrequencyUnit::Day).is_err());
        assert!(Posology::new(1.0, f32::INFINITY, FrequencyUnit::Day).is_err());
    }

    #[test]
    fn setters_revalidate_and_keep_old_value_on_failure() {
        let mut p = Posology::new(1.0, 8.0, FrequencyUnit::Hour).unwrap();

        p.set_dose(2.5).unwrap();
        assert_eq!(p.dose(), 2.5);

        let err = p.set_dose(0.0).unwrap_err();
        assert!(matches!(err, ConsultError::Validation { kind: ValidationKind::NotPositive, .. }));
        assert_eq!(p.dose(), 2.5);

        assert!(p.set_frequency(-1.0).is_err());
        assert_eq!(p.frequency(), 8.0);

        p.set_frequency_unit(FrequencyUnit::Week);
        assert_eq!(p.frequency_unit(), FrequencyUnit::Week);
    }

    #[test]
    fn unit_parsing_is_trimmed_and_case_insensitive() {
        assert_eq!(" day ".parse::<FrequencyUnit>().unwrap(), FrequencyUnit::Day);
        assert_eq!("MONTH".parse::<FrequencyUnit>().unwrap(), FrequencyUnit::Month);
        assert!("FORTNIGHT".parse::<FrequencyUnit>().is_err());
    }
}
