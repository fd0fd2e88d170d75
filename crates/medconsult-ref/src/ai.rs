//! A scripted stand-in for the decision-making AI.
//!
//! `ScriptedDecisionAi` answers prompts from a fixed table of keyword rules
//! and delegates parsing to `medconsult_ai::SuggestionParser`, so the demo
//! exercises the real fragment parser on canned answers.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};

use medconsult_ai::SuggestionParser;
use medconsult_contracts::{
    error::{ConsultError, ConsultResult},
    suggestion::{MalformedSuggestionPolicy, Suggestion},
};
use medconsult_core::traits::DecisionMakingAi;

/// One canned answer, chosen when the prompt mentions `keyword`.
#[derive(Debug, Clone)]
struct ScriptedAnswer {
    keyword: String,
    answer: String,
}

#[derive(Debug, Default)]
pub struct ScriptedDecisionAi {
    answers: Vec<ScriptedAnswer>,
    parser: SuggestionParser,
    unavailable: bool,
    ready: AtomicBool,
}

impl ScriptedDecisionAi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer with `answer` whenever a prompt contains `keyword`
    /// (case-insensitive). Earlier rules win.
    pub fn answer(mut self, keyword: impl Into<String>, answer: impl Into<String>) -> Self {
        self.answers.push(ScriptedAnswer {
            keyword: keyword.into().to_lowercase(),
            answer: answer.into(),
        });
        self
    }

    pub fn with_policy(mut self, policy: MalformedSuggestionPolicy) -> Self {
        self.parser = SuggestionParser::new(policy);
        self
    }

    /// Make `init` fail, as if the service were down.
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }
}

impl DecisionMakingAi for ScriptedDecisionAi {
    fn init(&self) -> ConsultResult<()> {
        if self.unavailable {
            return Err(ConsultError::Ai {
                reason: "decision-making service is not available".to_string(),
            });
        }
        self.ready.store(true, Ordering::SeqCst);
        info!(rules = self.answers.len(), "scripted AI initialised");
        Ok(())
    }

    /// Fails with `Ai` before `init`, and with `BadPrompt` for a blank prompt
    /// or one no rule recognises.
    fn get_suggestions(&self, prompt: &str) -> ConsultResult<String> {
        if !self.ready.load(Ordering::SeqCst) {
            return Err(ConsultError::Ai {
                reason: "AI session has not been initialised".to_string(),
            });
        }
        if prompt.trim().is_empty() {
            return Err(ConsultError::BadPrompt {
                reason: "prompt is empty".to_string(),
            });
        }

        let lowered = prompt.to_lowercase();
        let rule = self
            .answers
            .iter()
            .find(|r| lowered.contains(&r.keyword))
            .ok_or_else(|| ConsultError::BadPrompt {
                reason: format!("no clinical guidance matches '{}'", prompt.trim()),
            })?;

        debug!(keyword = %rule.keyword, "scripted answer selected");
        Ok(rule.answer.clone())
    }

    fn parse_suggestions(&self, text: &str) -> ConsultResult<Vec<Suggestion>> {
        self.parser.parse(text)
    }
}
