//! # medconsult-ai
//!
//! Turns the free-text answers of a decision-making AI into structured
//! prescription suggestions.
//!
//! The AI embeds its edits as tagged fragments anywhere in its answer:
//!
//! ```text
//! Consider adding <I, 123456789012, BEFORELUNCH, 15, 1, 1, DAY, with water>
//! and dropping <R, 640557143200>.
//! ```
//!
//! [`parser::SuggestionParser`] extracts every fragment and builds one
//! [`Suggestion`](medconsult_contracts::Suggestion) per fragment. What
//! happens to a fragment that does not parse is governed by a
//! [`MalformedSuggestionPolicy`](medconsult_contracts::MalformedSuggestionPolicy).

pub mod parser;

pub use parser::{parse_fragment, SuggestionParser};
