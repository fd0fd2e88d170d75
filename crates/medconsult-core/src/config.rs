//! Terminal configuration loaded from TOML.
//!
//! ```toml
//! [edition]
//! min_treatment_lead_hours = 24
//!
//! [suggestions]
//! on_malformed = "abort"   # or "skip"
//! ```
//!
//! Every table and key is optional; missing values take the defaults shown.

use std::path::Path;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use medconsult_contracts::{
    error::{ConsultError, ConsultResult},
    suggestion::MalformedSuggestionPolicy,
};

/// Default minimum distance between now and a treatment end date.
pub const DEFAULT_MIN_TREATMENT_LEAD_HOURS: i64 = 24;

/// Upper bound on the configured lead: ten years.
pub const MAX_MIN_TREATMENT_LEAD_HOURS: i64 = 87_600;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TerminalConfig {
    pub edition: EditionConfig,
    pub suggestions: SuggestionConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditionConfig {
    /// The treatment end date must be strictly later than now plus this many hours.
    pub min_treatment_lead_hours: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SuggestionConfig {
    pub on_malformed: MalformedSuggestionPolicy,
}

impl Default for EditionConfig {
    fn default() -> Self {
        Self {
            min_treatment_lead_hours: DEFAULT_MIN_TREATMENT_LEAD_HOURS,
        }
    }
}

impl TerminalConfig {
    /// Parse `s` as TOML.
    ///
    /// Returns `ConsultError::Config` if the TOML is malformed, carries
    /// unknown keys, or holds out-of-range values.
    pub fn from_toml_str(s: &str) -> ConsultResult<Self> {
        let config: TerminalConfig = toml::from_str(s).map_err(|e| ConsultError::Config {
            reason: format!("failed to parse terminal TOML: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read the file at `path` and parse it as TOML.
    pub fn from_file(path: &Path) -> ConsultResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConsultError::Config {
            reason: format!("failed to read terminal config '{}': {e}", path.display()),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Check value ranges. Called by the loaders and by
    /// `ConsultationTerminal::with_config`.
    pub fn validate(&self) -> ConsultResult<()> {
        let lead = self.edition.min_treatment_lead_hours;
        if !(1..=MAX_MIN_TREATMENT_LEAD_HOURS).contains(&lead) {
            return Err(ConsultError::Config {
                reason: format!(
                    "edition.min_treatment_lead_hours must be between 1 and \
                     {MAX_MIN_TREATMENT_LEAD_HOURS}, got {lead}"
                ),
            });
        }
        Ok(())
    }

    pub fn min_treatment_lead(&self) -> Duration {
        Duration::hours(self.edition.min_treatment_lead_hours)
    }

    pub fn malformed_policy(&self) -> MalformedSuggestionPolicy {
        self.suggestions.on_malformed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = TerminalConfig::from_toml_str("").unwrap();
        assert_eq!(config, TerminalConfig::default());
        assert_eq!(config.min_treatment_lead(), Duration::hours(24));
        assert_eq!(config.malformed_policy(), MalformedSuggestionPolicy::Abort);
    }

    #[test]
    fn parses_both_tables() {
        let config = TerminalConfig::from_toml_str(
            r#"
            [edition]
            min_treatment_lead_hours = 48

            [suggestions]
            on_malformed = "skip"
            "#,
        )
        .unwrap();
        assert_eq!(config.min_treatment_lead(), Duration::hours(48));
        assert_eq!(config.malformed_policy(), MalformedSuggestionPolicy::Skip);
    }

    #[test]
    fn rejects_non_positive_lead() {
        for lead in [0, -5] {
            let doc = format!("[edition]\nmin_treatment_lead_hours = {lead}\n");
            let err = TerminalConfig::from_toml_str(&doc).unwrap_err();
            assert!(matches!(err, ConsultError::Config { .. }));
        }
    }

    #[test]
    fn rejects_lead_beyond_ten_years() {
        let err = TerminalConfig::from_toml_str("[edition]\nmin_treatment_lead_hours = 10000000000\n")
            .unwrap_err();
        assert!(matches!(err, ConsultError::Config { .. }));

        let at_bound = format!("[edition]\nmin_treatment_lead_hours = {MAX_MIN_TREATMENT_LEAD_HOURS}\n");
        let config = TerminalConfig::from_toml_str(&at_bound).unwrap();
        assert_eq!(config.min_treatment_lead(), Duration::hours(MAX_MIN_TREATMENT_LEAD_HOURS));
    }

    #[test]
    fn validate_catches_configs_built_in_code() {
        let config = TerminalConfig {
            edition: EditionConfig {
                min_treatment_lead_hours: -48,
            },
            ..TerminalConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConsultError::Config { .. })));
    }

    #[test]
    fn rejects_malformed_documents() {
        for doc in [
            "[edition\n",
            "[suggestions]\non_malformed = \"ignore\"\n",
            "[edition]\nlead = 3\n",
            "[edition]\nmin_treatment_lead_hours = \"soon\"\n",
        ] {
            assert!(
                matches!(TerminalConfig::from_toml_str(doc), Err(ConsultError::Config { .. })),
                "expected Config error for {doc:?}"
            );
        }
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = TerminalConfig::from_file(Path::new("/nonexistent/terminal.toml")).unwrap_err();
        match err {
            ConsultError::Config { reason } => assert!(reason.contains("terminal.toml")),
            other => panic!("expected Config, got {other:?}"),
        }
    }
}
