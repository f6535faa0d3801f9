//! Session state snapshot types
//!
//! Pure data. All mutation goes through [`crate::Questionnaire::dispatch`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::category::Category;

/// Where a session is in the questionnaire flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "phase", content = "step", rename_all = "kebab-case")]
pub enum Phase {
    #[default]
    CategoryUnselected,
    /// Waiting for the answer to question `step`
    InProgress(usize),
    SummaryReady,
    Submitting,
    Completed,
    /// Transient; the engine reverts to `SummaryReady` right after
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::CategoryUnselected => f.write_str("category-unselected"),
            Phase::InProgress(step) => write!(f, "in-progress({})", step),
            Phase::SummaryReady => f.write_str("summary-ready"),
            Phase::Submitting => f.write_str("submitting"),
            Phase::Completed => f.write_str("completed"),
            Phase::Failed => f.write_str("failed"),
        }
    }
}

/// One question of the session and its answer once given
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerEntry {
    pub question: String,
    pub answer: Option<String>,
}

impl AnswerEntry {
    pub fn pending(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: None,
        }
    }

    pub fn is_answered(&self) -> bool {
        self.answer.is_some()
    }
}

/// Identifies one in-flight plan request
///
/// A result carrying a ticket other than the pending one is stale and is
/// discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlanTicket {
    /// Session generation the request was issued in
    pub generation: u64,
    /// Submission counter within the questionnaire
    pub sequence: u64,
}

impl fmt::Display for PlanTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.generation, self.sequence)
    }
}

/// Why a plan request failed, as seen by the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "kebab-case")]
pub enum PlanFailure {
    /// Network failure or non-success status talking to the gateway
    Request(String),
    /// Response arrived but carried no plan
    Format(String),
    /// Completion provider failed (in-process generation)
    Provider(String),
}

/// Message shown to the user for every failure kind
pub const PLAN_FAILURE_MESSAGE: &str = "Não foi possível gerar o plano. Tente novamente.";

impl PlanFailure {
    pub fn user_message(&self) -> &'static str {
        PLAN_FAILURE_MESSAGE
    }

    /// Underlying cause, for logs
    pub fn detail(&self) -> &str {
        match self {
            PlanFailure::Request(detail) | PlanFailure::Format(detail) | PlanFailure::Provider(detail) => detail,
        }
    }
}

impl fmt::Display for PlanFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanFailure::Request(detail) => write!(f, "gateway request failed: {}", detail),
            PlanFailure::Format(detail) => write!(f, "malformed gateway response: {}", detail),
            PlanFailure::Provider(detail) => write!(f, "provider failed: {}", detail),
        }
    }
}

/// Read-only snapshot of one session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub category: Option<Category>,
    /// Index of the question being answered; stays on the last question once
    /// the summary is ready
    pub current_step: usize,
    pub history: Vec<AnswerEntry>,
    pub summary_ready: bool,
    pub generated_plan: Option<String>,
    pub phase: Phase,
    /// User-visible error from the last failed generation
    pub last_error: Option<PlanFailure>,
    /// Ticket of the request in flight, if any
    pub pending: Option<PlanTicket>,
    /// Bumped on every restart; survives the reset
    pub generation: u64,
}

impl SessionState {
    /// Answers given so far, in question order
    pub fn answers(&self) -> Vec<String> {
        self.history.iter().filter_map(|entry| entry.answer.clone()).collect()
    }

    /// The question waiting for an answer, if any
    pub fn current_question(&self) -> Option<&str> {
        match self.phase {
            Phase::InProgress(_) => self.history.last().map(|entry| entry.question.as_str()),
            _ => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }
}

/// One recorded phase change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: Phase,
    pub to: Phase,
}
