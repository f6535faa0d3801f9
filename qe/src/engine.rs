//! The questionnaire reducer
//!
//! Every state change is an [`Action`] passed to [`Questionnaire::dispatch`].
//! Side effects are never performed here; a generation request is handed back
//! as [`Outcome::Submit`] and its result comes back as another action.

use tracing::{debug, info, warn};

use crate::category::{Category, QuestionSet, QuestionSets};
use crate::error::EngineError;
use crate::state::{AnswerEntry, Phase, PlanFailure, PlanTicket, SessionState, Transition};
use crate::wire::PlanRequest;

/// Everything the UI or the request driver can ask of the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SelectCategory(Category),
    SubmitAnswer(String),
    GeneratePlan,
    PlanReceived { ticket: PlanTicket, plan: String },
    PlanFailed { ticket: PlanTicket, failure: PlanFailure },
    Restart,
}

/// What an accepted action did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Category chosen; `question` is the first one to answer
    CategorySelected { question: String },
    /// Answer stored, now waiting on question `step`
    Advanced { step: usize },
    /// Final answer stored
    SummaryReady,
    /// Caller must send `request` and report back with `ticket`
    Submit { ticket: PlanTicket, request: PlanRequest },
    Completed,
    /// Generation failed; the session is back in `SummaryReady`
    Failed(PlanFailure),
    /// Result belonged to a superseded request and was dropped
    Stale,
    Reset,
}

/// Owns one session's state and the question sets it draws from
#[derive(Debug, Clone)]
pub struct Questionnaire {
    questions: QuestionSets,
    state: SessionState,
    next_sequence: u64,
    transitions: Vec<Transition>,
}

impl Default for Questionnaire {
    fn default() -> Self {
        Self::new(QuestionSets::default())
    }
}

impl Questionnaire {
    pub fn new(questions: QuestionSets) -> Self {
        Self {
            questions,
            state: SessionState::default(),
            next_sequence: 0,
            transitions: Vec::new(),
        }
    }

    /// Current snapshot
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn question_set(&self, category: Category) -> &QuestionSet {
        self.questions.for_category(category)
    }

    /// Phase changes since the last restart, oldest first
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// `(answered, total)` for the selected category
    pub fn progress(&self) -> Option<(usize, usize)> {
        let category = self.state.category?;
        let answered = self.state.history.iter().filter(|e| e.is_answered()).count();
        Some((answered, self.question_set(category).len()))
    }

    pub fn select_category(&mut self, category: Category) -> Result<Outcome, EngineError> {
        self.dispatch(Action::SelectCategory(category))
    }

    pub fn submit_answer(&mut self, answer: impl Into<String>) -> Result<Outcome, EngineError> {
        self.dispatch(Action::SubmitAnswer(answer.into()))
    }

    pub fn generate_plan(&mut self) -> Result<Outcome, EngineError> {
        self.dispatch(Action::GeneratePlan)
    }

    /// Accepted in every phase
    pub fn restart(&mut self) -> Outcome {
        self.on_restart()
    }

    /// Apply one action. A refusal leaves the state untouched.
    pub fn dispatch(&mut self, action: Action) -> Result<Outcome, EngineError> {
        debug!(phase = %self.state.phase, ?action, "dispatch: called");
        match action {
            Action::SelectCategory(category) => self.on_select_category(category),
            Action::SubmitAnswer(input) => self.on_submit_answer(&input),
            Action::GeneratePlan => self.on_generate_plan(),
            Action::PlanReceived { ticket, plan } => Ok(self.on_plan_received(ticket, plan)),
            Action::PlanFailed { ticket, failure } => Ok(self.on_plan_failed(ticket, failure)),
            Action::Restart => Ok(self.on_restart()),
        }
    }

    fn on_select_category(&mut self, category: Category) -> Result<Outcome, EngineError> {
        if self.state.category.is_some() {
            debug!("on_select_category: category already chosen");
            return Err(EngineError::CategoryAlreadySelected);
        }

        let question = self.question_set(category).get(0).unwrap_or_default().to_string();
        self.state.category = Some(category);
        self.state.current_step = 0;
        self.state.history = vec![AnswerEntry::pending(question.clone())];
        self.set_phase(Phase::InProgress(0));
        info!(%category, "Category selected");
        Ok(Outcome::CategorySelected { question })
    }

    fn on_submit_answer(&mut self, input: &str) -> Result<Outcome, EngineError> {
        let step = match self.state.phase {
            Phase::InProgress(step) => step,
            Phase::CategoryUnselected => return Err(EngineError::NoCategory),
            other => return Err(EngineError::NotAnswering(other)),
        };

        let answer = input.trim();
        if answer.is_empty() {
            debug!(step, "on_submit_answer: empty answer refused");
            return Err(EngineError::EmptyAnswer);
        }

        let Some(category) = self.state.category else {
            return Err(EngineError::NoCategory);
        };
        let set = self.questions.for_category(category);
        let last = set.last_index();
        let next_question = set.get(step + 1).map(str::to_string);

        if let Some(entry) = self.state.history.last_mut() {
            entry.answer = Some(answer.to_string());
        }

        match next_question {
            Some(question) if step < last => {
                self.state.history.push(AnswerEntry::pending(question));
                self.state.current_step = step + 1;
                self.set_phase(Phase::InProgress(step + 1));
                Ok(Outcome::Advanced { step: step + 1 })
            }
            _ => {
                self.state.summary_ready = true;
                self.set_phase(Phase::SummaryReady);
                info!(%category, answers = self.state.history.len(), "Questionnaire complete");
                Ok(Outcome::SummaryReady)
            }
        }
    }

    fn on_generate_plan(&mut self) -> Result<Outcome, EngineError> {
        match self.state.phase {
            Phase::SummaryReady | Phase::Completed => {}
            Phase::Submitting => {
                debug!("on_generate_plan: request already in flight");
                return Err(EngineError::PlanInFlight);
            }
            Phase::CategoryUnselected => return Err(EngineError::NoCategory),
            other => return Err(EngineError::NotReady(other)),
        }

        let Some(category) = self.state.category else {
            return Err(EngineError::NoCategory);
        };

        let ticket = PlanTicket {
            generation: self.state.generation,
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;

        self.state.pending = Some(ticket);
        self.state.last_error = None;
        // A plan only ever shows alongside Completed
        self.state.generated_plan = None;
        self.set_phase(Phase::Submitting);

        let request = PlanRequest::new(category, self.state.answers());
        info!(%ticket, %category, "Plan request issued");
        Ok(Outcome::Submit { ticket, request })
    }

    fn on_plan_received(&mut self, ticket: PlanTicket, plan: String) -> Outcome {
        if self.state.pending != Some(ticket) {
            debug!(%ticket, "on_plan_received: stale result dropped");
            return Outcome::Stale;
        }

        if plan.trim().is_empty() {
            return self.fail(PlanFailure::Format("plan text is empty".to_string()));
        }

        self.state.pending = None;
        self.state.generated_plan = Some(plan);
        self.set_phase(Phase::Completed);
        info!(%ticket, "Plan received");
        Outcome::Completed
    }

    fn on_plan_failed(&mut self, ticket: PlanTicket, failure: PlanFailure) -> Outcome {
        if self.state.pending != Some(ticket) {
            debug!(%ticket, "on_plan_failed: stale failure dropped");
            return Outcome::Stale;
        }
        self.fail(failure)
    }

    fn fail(&mut self, failure: PlanFailure) -> Outcome {
        warn!(%failure, "Plan generation failed");
        self.state.pending = None;
        self.state.last_error = Some(failure.clone());
        self.set_phase(Phase::Failed);
        self.set_phase(Phase::SummaryReady);
        Outcome::Failed(failure)
    }

    fn on_restart(&mut self) -> Outcome {
        let from = self.state.phase;
        let generation = self.state.generation + 1;
        self.state = SessionState {
            generation,
            ..SessionState::default()
        };
        self.transitions.clear();
        self.transitions.push(Transition {
            from,
            to: Phase::CategoryUnselected,
        });
        info!(generation, "Session restarted");
        Outcome::Reset
    }

    fn set_phase(&mut self, to: Phase) {
        let from = self.state.phase;
        debug!(%from, %to, "set_phase: called");
        self.state.phase = to;
        self.transitions.push(Transition { from, to });
    }
}
