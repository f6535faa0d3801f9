//! Async driver around the questionnaire engine
//!
//! The engine is a pure reducer; this module owns the single async side
//! effect (the plan request) and feeds its result back as an action.

use std::sync::Arc;

use async_trait::async_trait;
use questionnaire::{
    Action, Category, EngineError, Outcome, PlanFailure, PlanRequest, Questionnaire, QuestionSets, SessionState,
    Transition,
};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::client::GatewayClient;
use crate::gateway::{GatewayError, PlanGateway};

/// Something that turns a finished questionnaire into plan text
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    async fn generate(&self, request: &PlanRequest) -> Result<String, PlanFailure>;
}

#[async_trait]
impl PlanGenerator for GatewayClient {
    async fn generate(&self, request: &PlanRequest) -> Result<String, PlanFailure> {
        self.generate_plan(request).await.map_err(PlanFailure::from)
    }
}

#[async_trait]
impl PlanGenerator for PlanGateway {
    async fn generate(&self, request: &PlanRequest) -> Result<String, PlanFailure> {
        self.generate_plan(request).await.map_err(|e| match e {
            GatewayError::EmptyCompletion => PlanFailure::Format(e.to_string()),
            other => PlanFailure::Provider(other.to_string()),
        })
    }
}

/// One user's questionnaire session
///
/// Cheap to clone; clones share the same session. The engine lock is
/// released while the plan request is in flight.
#[derive(Clone)]
pub struct SessionController {
    engine: Arc<Mutex<Questionnaire>>,
    generator: Arc<dyn PlanGenerator>,
}

impl SessionController {
    pub fn new(questions: QuestionSets, generator: Arc<dyn PlanGenerator>) -> Self {
        Self {
            engine: Arc::new(Mutex::new(Questionnaire::new(questions))),
            generator,
        }
    }

    pub async fn select_category(&self, category: Category) -> Result<Outcome, EngineError> {
        self.engine.lock().await.select_category(category)
    }

    pub async fn submit_answer(&self, answer: &str) -> Result<Outcome, EngineError> {
        self.engine.lock().await.submit_answer(answer)
    }

    /// Request a plan and apply the result
    ///
    /// Returns `Outcome::Completed` or `Outcome::Failed` for the request this
    /// call issued, or `Outcome::Stale` when the session was restarted while
    /// waiting.
    pub async fn generate_plan(&self) -> Result<Outcome, EngineError> {
        let (ticket, request) = {
            let mut engine = self.engine.lock().await;
            match engine.generate_plan()? {
                Outcome::Submit { ticket, request } => (ticket, request),
                other => return Ok(other),
            }
        };
        debug!(%ticket, "generate_plan: request sent");

        let action = match self.generator.generate(&request).await {
            Ok(plan) => Action::PlanReceived { ticket, plan },
            Err(failure) => Action::PlanFailed { ticket, failure },
        };

        let outcome = self.engine.lock().await.dispatch(action)?;
        if outcome == Outcome::Stale {
            info!(%ticket, "Plan arrived after restart and was discarded");
        }
        Ok(outcome)
    }

    pub async fn restart(&self) -> Outcome {
        self.engine.lock().await.restart()
    }

    pub async fn snapshot(&self) -> SessionState {
        self.engine.lock().await.state().clone()
    }

    pub async fn progress(&self) -> Option<(usize, usize)> {
        self.engine.lock().await.progress()
    }

    pub async fn transitions(&self) -> Vec<Transition> {
        self.engine.lock().await.transitions().to_vec()
    }
}
