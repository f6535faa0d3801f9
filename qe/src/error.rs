//! Questionnaire engine error types

use thiserror::Error;

use crate::state::Phase;

/// Reasons the engine refuses an action
///
/// A refusal never changes the session state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("Answer is empty")]
    EmptyAnswer,

    #[error("No category selected")]
    NoCategory,

    #[error("Category already selected; restart to choose another")]
    CategoryAlreadySelected,

    #[error("Not waiting for an answer (phase: {0})")]
    NotAnswering(Phase),

    #[error("Questionnaire is not complete (phase: {0})")]
    NotReady(Phase),

    #[error("A plan request is already in flight")]
    PlanInFlight,

    #[error("Unknown category: '{0}'. Supported: nutrition, training")]
    UnknownCategory(String),

    #[error("Question set must contain at least one non-blank question")]
    EmptyQuestionSet,
}

impl EngineError {
    /// Whether this is the silent empty-answer refusal
    pub fn is_validation(&self) -> bool {
        matches!(self, EngineError::EmptyAnswer)
    }
}
