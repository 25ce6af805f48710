//! Question answering over policy text
//!
//! Every question is answered independently and in input order:
//! - the ordered rule table is consulted first (first match wins)
//! - otherwise the best keyword-overlap sentences are returned
//! - otherwise a fixed not-found message naming the question
//!
//! A question that cannot be evaluated is answered with
//! [`TECHNICAL_DIFFICULTIES`] and never affects the rest of the batch.

pub mod document;
pub mod ranker;
pub mod rules;

pub use document::PolicyDocument;
pub use ranker::{LexicalRanker, ScoredSentence};
pub use rules::{Category, Clause, Predicate, Rule, RuleSet, DEFAULT_RULES};

use crate::config::AnsweringConfig;
use crate::error::{QaError, Result};
use crate::metrics::METRICS;
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, error};

/// Substituted for any question that fails to evaluate
pub const TECHNICAL_DIFFICULTIES: &str =
    "Unable to process this question due to technical difficulties.";

/// Generic answer when neither a rule nor the ranker finds anything
pub fn not_found_message(question: &str) -> String {
    format!(
        "Based on the document analysis, I couldn't find specific information to answer: \"{}\". Please refer to the complete policy document for detailed information.",
        question
    )
}

/// One entry of an incoming question list
///
/// Anything that is not a JSON string is kept as `Malformed` so the
/// batch can still be answered position by position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionInput {
    Text(String),
    Malformed(serde_json::Value),
}

impl From<&str> for QuestionInput {
    fn from(question: &str) -> Self {
        Self::Text(question.to_string())
    }
}

impl From<String> for QuestionInput {
    fn from(question: String) -> Self {
        Self::Text(question)
    }
}

/// How an answer was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerSource {
    Rule(Category),
    Ranked,
    NotFound,
    Failed,
}

impl AnswerSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rule(_) => "rule",
            Self::Ranked => "ranked",
            Self::NotFound => "not_found",
            Self::Failed => "failed",
        }
    }
}

/// Answer text with its provenance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    pub source: AnswerSource,
}

impl Answer {
    pub fn failed() -> Self {
        Self {
            text: TECHNICAL_DIFFICULTIES.to_string(),
            source: AnswerSource::Failed,
        }
    }
}

/// Rule matcher plus lexical fallback
#[derive(Debug, Clone)]
pub struct AnswerEngine {
    rules: RuleSet,
    ranker: LexicalRanker,
}

impl Default for AnswerEngine {
    fn default() -> Self {
        Self::new(&AnsweringConfig::default())
    }
}

impl AnswerEngine {
    /// Engine over the built-in insurance rules
    pub fn new(config: &AnsweringConfig) -> Self {
        Self::with_rules(DEFAULT_RULES.clone(), config)
    }

    pub fn with_rules(rules: RuleSet, config: &AnsweringConfig) -> Self {
        Self {
            rules,
            ranker: LexicalRanker::new(config),
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Answer one well-formed question
    pub fn answer(&self, document: &PolicyDocument, question: &str) -> Answer {
        let lowered = question.to_lowercase();

        if let Some(rule) = self.rules.first_match(document, &lowered) {
            return Answer {
                text: rule.answer.to_string(),
                source: AnswerSource::Rule(rule.category),
            };
        }

        match self.ranker.answer(document.text(), question) {
            Some(text) => Answer {
                text,
                source: AnswerSource::Ranked,
            },
            None => {
                debug!("No rule or overlapping sentence for question");
                Answer {
                    text: not_found_message(question),
                    source: AnswerSource::NotFound,
                }
            }
        }
    }

    /// Answer one raw question entry, surfacing malformed input and panics as errors
    pub fn try_answer(&self, document: &PolicyDocument, input: &QuestionInput) -> Result<Answer> {
        let question = match input {
            QuestionInput::Text(question) => question,
            QuestionInput::Malformed(value) => {
                return Err(QaError::MalformedQuestion(json_kind(value).to_string()));
            }
        };

        guard_question(|| self.answer(document, question))
    }

    /// Answer every question in order; the result always has one entry per question
    pub fn generate_answers(
        &self,
        document: &PolicyDocument,
        questions: &[QuestionInput],
    ) -> Vec<Answer> {
        questions
            .iter()
            .enumerate()
            .map(|(i, input)| {
                if let QuestionInput::Text(q) = input {
                    debug!(
                        "Processing question {}/{}: {}",
                        i + 1,
                        questions.len(),
                        truncate(q, 100)
                    );
                }

                let answer = self.try_answer(document, input).unwrap_or_else(|e| {
                    error!("Error processing question {}: {}", i + 1, e);
                    Answer::failed()
                });

                METRICS.record_answer(answer.source);
                answer
            })
            .collect()
    }

    /// Plain-text convenience over [`AnswerEngine::generate_answers`]
    pub fn generate_answer_texts(&self, document_text: &str, questions: &[QuestionInput]) -> Vec<String> {
        let document = PolicyDocument::new(document_text);
        self.generate_answers(&document, questions)
            .into_iter()
            .map(|answer| answer.text)
            .collect()
    }
}

/// Run one question's evaluation, turning a panic into an error
fn guard_question<F>(evaluate: F) -> Result<Answer>
where
    F: FnOnce() -> Answer,
{
    panic::catch_unwind(AssertUnwindSafe(evaluate))
        .map_err(|payload| QaError::QuestionPanicked(panic_message(payload.as_ref())))
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Truncate to at most `max` characters for log output
pub(crate) fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
