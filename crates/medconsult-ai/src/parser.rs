//! Fragment extraction and per-fragment parsing.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use medconsult_contracts::{
    error::{ConsultError, ConsultResult, ValidationKind},
    ids::ProductId,
    suggestion::{MalformedSuggestionPolicy, OperationKind, SuggestedGuideline, Suggestion},
};

/// One `<...>` fragment. Nested angle brackets are not part of the format.
static FRAGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([^<>]*)>").expect("fragment pattern is valid"));

/// Operation, product, then the six guideline slots. The last slot keeps
/// any further commas, so free-text instructions may contain them.
const MAX_FRAGMENT_FIELDS: usize = 2 + SuggestedGuideline::FIELD_COUNT;

/// Parses AI answers into suggestions under a fixed malformed-fragment policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuggestionParser {
    policy: MalformedSuggestionPolicy,
}

impl SuggestionParser {
    pub fn new(policy: MalformedSuggestionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> MalformedSuggestionPolicy {
        self.policy
    }

    /// Parse every fragment of `text`, in order of appearance.
    ///
    /// Blank text, or text without fragments, yields no suggestions.
    ///
    /// # Errors
    ///
    /// With `Abort`, the error of the first malformed fragment. With `Skip`,
    /// never fails: malformed fragments are logged and dropped.
    pub fn parse(&self, text: &str) -> ConsultResult<Vec<Suggestion>> {
        let mut suggestions = Vec::new();

        for captures in FRAGMENT.captures_iter(text) {
            let body = &captures[1];
            match parse_fragment(body) {
                Ok(suggestion) => {
                    debug!(suggestion = %suggestion, "suggestion parsed");
                    suggestions.push(suggestion);
                }
                Err(e) => match self.policy {
                    MalformedSuggestionPolicy::Abort => return Err(e),
                    MalformedSuggestionPolicy::Skip => {
                        warn!(fragment = %body, error = %e, "malformed suggestion skipped");
                    }
                },
            }
        }

        Ok(suggestions)
    }
}

/// Parse the inside of one fragment, without its angle brackets.
///
/// # Errors
///
/// - `Validation` for a missing or unknown operation code, a missing
///   product code, or missing guideline values for INSERT / MODIFY.
/// - `InvalidIdentifier` for a product code that is not 12 digits.
pub fn parse_fragment(body: &str) -> ConsultResult<Suggestion> {
    let fields: Vec<&str> = body.splitn(MAX_FRAGMENT_FIELDS, ',').map(str::trim).collect();

    let operation = OperationKind::from_code(fields[0])?;

    let raw_product = fields.get(1).copied().unwrap_or_default();
    if raw_product.is_empty() {
        return Err(ConsultError::validation(
            "suggestion fragment",
            ValidationKind::Blank,
            format!("fragment '<{body}>' has no product code"),
        ));
    }
    let product = ProductId::new(raw_product).map_err(|e| ConsultError::InvalidIdentifier {
        value: raw_product.to_string(),
        reason: e.to_string(),
    })?;

    let guideline = SuggestedGuideline::from_raw(&fields[2..]);
    Suggestion::new(operation, product, guideline)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(code: &str) -> ProductId {
        ProductId::new(code).unwrap()
    }

    #[test]
    fn test_insert_and_remove_from_one_answer() {
        let text = "<I, 123456789012, BEFORELUNCH, 15, 1, 1, DAY, water> <R, 640557143200>";
        let suggestions = SuggestionParser::default().parse(text).unwrap();

        assert_eq!(suggestions.len(), 2);

        let insert = &suggestions[0];
        assert_eq!(insert.operation(), OperationKind::Insert);
        assert_eq!(insert.product_id(), &pid("123456789012"));
        assert!(insert.guideline().is_full());
        assert_eq!(insert.guideline().day_moment.as_deref(), Some("BEFORELUNCH"));
        assert_eq!(insert.guideline().duration.as_deref(), Some("15"));
        assert_eq!(insert.guideline().frequency_unit.as_deref(), Some("DAY"));
        assert_eq!(insert.guideline().instructions.as_deref(), Some("water"));

        let remove = &suggestions[1];
        assert_eq!(remove.operation(), OperationKind::Remove);
        assert_eq!(remove.product_id(), &pid("640557143200"));
        assert!(remove.guideline().is_empty());
    }

    #[test]
    fn test_blank_or_fragment_free_text_yields_nothing() {
        let parser = SuggestionParser::default();
        assert!(parser.parse("").unwrap().is_empty());
        assert!(parser.parse("   \n ").unwrap().is_empty());
        assert!(parser.parse("No changes recommended.").unwrap().is_empty());
    }

    #[test]
    fn test_fragments_embedded_in_prose() {
        let text = "Keep the current plan but <M, 210987654321, , , 3, , , > \
                    since the patient tolerates it well.";
        let suggestions = SuggestionParser::default().parse(text).unwrap();

        assert_eq!(suggestions.len(), 1);
        let modify = &suggestions[0];
        assert_eq!(modify.operation(), OperationKind::Modify);
        assert_eq!(modify.guideline().dose.as_deref(), Some("3"));
        assert!(modify.guideline().day_moment.is_none());
        assert!(modify.guideline().instructions.is_none());
    }

    #[test]
    fn test_operation_aliases() {
        let parser = SuggestionParser::default();
        for (code, expected) in [
            ("i", OperationKind::Insert),
            ("INSERT", OperationKind::Insert),
            ("E", OperationKind::Remove),
            ("remove", OperationKind::Remove),
            (" m ", OperationKind::Modify),
        ] {
            let text = format!("<{code}, 123456789012, AFTERLUNCH, 7, 1, 8, HOUR, none>");
            let suggestions = parser.parse(&text).unwrap();
            assert_eq!(suggestions[0].operation(), expected, "code {code:?}");
        }
    }

    #[test]
    fn test_instructions_may_contain_commas() {
        let s = parse_fragment("I, 123456789012, AFTERDINNER, 7, 1, 1, DAY, with water, not milk")
            .unwrap();
        assert_eq!(s.guideline().instructions.as_deref(), Some("with water, not milk"));
    }

    #[test]
    fn test_unknown_operation_is_validation_error() {
        let err = SuggestionParser::default()
            .parse("<X, 123456789012>")
            .unwrap_err();
        assert!(matches!(err, ConsultError::Validation { kind: ValidationKind::InvalidFormat, .. }));
    }

    #[test]
    fn test_bad_product_is_invalid_identifier() {
        let err = SuggestionParser::default().parse("<R, 64055714>").unwrap_err();
        match err {
            ConsultError::InvalidIdentifier { value, .. } => assert_eq!(value, "64055714"),
            other => panic!("expected InvalidIdentifier, got {other:?}"),
        }
    }

    #[test]
    fn test_incomplete_insert_and_empty_modify_are_rejected() {
        let parser = SuggestionParser::default();
        assert!(parser.parse("<I, 123456789012, BEFORELUNCH, 15>").is_err());
        assert!(parser.parse("<M, 123456789012, , , , , , >").is_err());
        assert!(parser.parse("<R>").is_err());
        assert!(parser.parse("<>").is_err());
    }

    #[test]
    fn test_abort_policy_fails_whole_parse() {
        let text = "<R, 640557143200> <R, bad> <R, 123456789012>";
        assert!(SuggestionParser::new(MalformedSuggestionPolicy::Abort)
            .parse(text)
            .is_err());
    }

    #[test]
    fn test_skip_policy_drops_malformed_fragments() {
        let text = "<R, 640557143200> <R, bad> <Q, 123456789012> <R, 123456789012>";
        let suggestions = SuggestionParser::new(MalformedSuggestionPolicy::Skip)
            .parse(text)
            .unwrap();
        let products: Vec<&str> = suggestions.iter().map(|s| s.product_id().as_str()).collect();
        assert_eq!(products, ["640557143200", "123456789012"]);
    }
}
