//! Questionnaire - sequential anamnesis state machine
//!
//! Drives one user through the ordered questions of a plan [`Category`],
//! one question at a time, and produces the [`PlanRequest`] sent to the plan
//! generation gateway.
//!
//! # Flow
//!
//! ```text
//! CategoryUnselected ──select──► InProgress(0) ──answer──► InProgress(n)
//!        ▲                                                    │ answer (last)
//!        │ restart (any phase)                                ▼
//!        └──────────────  Completed ◄──plan── Submitting ◄── SummaryReady
//!                                              │  ▲
//!                                        error ▼  │ generate
//!                                             Failed ─► SummaryReady
//! ```
//!
//! The engine performs no IO. [`Questionnaire::dispatch`] returns
//! [`Outcome::Submit`] with a [`PlanTicket`]; the caller sends the request and
//! feeds the result back as [`Action::PlanReceived`] or [`Action::PlanFailed`].
//! Results whose ticket is not the pending one are discarded as stale.

mod category;
mod engine;
mod error;
mod state;
mod wire;

pub use category::{Category, QuestionSet, QuestionSets};
pub use engine::{Action, Outcome, Questionnaire};
pub use error::EngineError;
pub use state::{AnswerEntry, PLAN_FAILURE_MESSAGE, Phase, PlanFailure, PlanTicket, SessionState, Transition};
pub use wire::{PlanRequest, PlanResponse};
