//! Insurance policy question answering
//!
//! Downloads a policy document, extracts its text, and answers each question
//! with an ordered set of domain rules, falling back to lexical sentence ranking.

pub mod answering;
pub mod api;
pub mod config;
pub mod error;
pub mod ingest;
pub mod metrics;

pub use answering::{Answer, AnswerEngine, AnswerSource, PolicyDocument, QuestionInput};
pub use config::Config;
pub use error::{QaError, Result};
