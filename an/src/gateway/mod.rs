//! Plan generation gateway
//!
//! Turns a finished answer list into one provider prompt and relays the
//! generated plan (or a generic error) back to the caller.
//!
//! # Architecture
//!
//! ```text
//! client ──POST /gerar-plano──► server ──► PlanGateway ──► LlmClient ──► provider
//!        ◄── {plano} | {erro} ──        ◄── Result<String, GatewayError>
//! ```

mod prompt;
mod server;

pub use prompt::build_prompt;
pub use server::{GENERIC_ERROR_MESSAGE, router, serve};

use std::sync::Arc;
use std::time::Duration;

use questionnaire::PlanRequest;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::llm::{CompletionRequest, LlmClient, LlmError};

/// Why a generation failed on the gateway side
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Request has no answers")]
    EmptyAnswers,

    #[error("Provider call failed: {0}")]
    Provider(#[from] LlmError),

    #[error("Provider returned no plan text")]
    EmptyCompletion,

    #[error("Provider did not answer within {0:?}")]
    Timeout(Duration),
}

impl GatewayError {
    /// Input problems are the caller's fault; everything else is ours
    pub fn is_client_error(&self) -> bool {
        matches!(self, GatewayError::EmptyAnswers)
    }
}

/// Composes prompts and calls the provider exactly once per request
#[derive(Clone)]
pub struct PlanGateway {
    llm: Arc<dyn LlmClient>,
    max_tokens: u32,
    timeout: Duration,
}

impl PlanGateway {
    pub fn new(llm: Arc<dyn LlmClient>, max_tokens: u32, timeout: Duration) -> Self {
        Self {
            llm,
            max_tokens,
            timeout,
        }
    }

    pub fn from_config(config: &Config, llm: Arc<dyn LlmClient>) -> Self {
        Self::new(
            llm,
            config.llm.max_tokens,
            Duration::from_millis(config.server.generate_timeout_ms),
        )
    }

    /// Generate a plan for a finished questionnaire
    ///
    /// No retries: a failed provider call fails the request. The cause is
    /// logged here and never forwarded to HTTP clients.
    pub async fn generate_plan(&self, request: &PlanRequest) -> Result<String, GatewayError> {
        let request_id = Uuid::now_v7();
        debug!(%request_id, category = %request.category, answers = request.answers.len(), "generate_plan: called");

        if request.answers.is_empty() {
            info!(%request_id, "Rejected plan request without answers");
            return Err(GatewayError::EmptyAnswers);
        }

        let prompt = build_prompt(request.category, &request.answers);
        let completion = CompletionRequest::single(prompt, self.max_tokens);

        let response = match tokio::time::timeout(self.timeout, self.llm.complete(completion)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                log_provider_failure(request_id, &e);
                return Err(GatewayError::Provider(e));
            }
            Err(_) => {
                error!(%request_id, timeout = ?self.timeout, "Erro ao gerar plano: provider timed out");
                return Err(GatewayError::Timeout(self.timeout));
            }
        };

        match response.content {
            Some(plan) if !plan.trim().is_empty() => {
                info!(
                    %request_id,
                    category = %request.category,
                    output_tokens = response.usage.output_tokens,
                    "Plan generated"
                );
                Ok(plan)
            }
            _ => {
                error!(%request_id, stop_reason = ?response.stop_reason, "Erro ao gerar plano: empty completion");
                Err(GatewayError::EmptyCompletion)
            }
        }
    }
}

/// Operators need to tell a bad key from a flaky provider
fn log_provider_failure(request_id: Uuid, e: &LlmError) {
    if e.is_auth() {
        error!(%request_id, error = %e, "Erro ao gerar plano: provider rejected credentials, check llm.api-key-env");
    } else if e.is_transient() {
        warn!(%request_id, error = %e, "Erro ao gerar plano: provider temporarily unavailable");
    } else {
        error!(%request_id, error = %e, "Erro ao gerar plano: provider call failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::mock::{MockLlmClient, MockReply};
    use questionnaire::Category;

    fn gateway(mock: Arc<MockLlmClient>, timeout: Duration) -> PlanGateway {
        PlanGateway::new(mock, 1024, timeout)
    }

    fn request(answers: &[&str]) -> PlanRequest {
        PlanRequest::new(Category::Nutrition, answers.iter().map(|a| a.to_string()).collect())
    }

    #[tokio::test]
    async fn test_generate_plan_success() {
        let mock = Arc::new(MockLlmClient::text("Plano: ..."));
        let gw = gateway(mock.clone(), Duration::from_secs(5));

        let plan = gw.generate_plan(&request(&["25 anos", "nenhuma restrição"])).await.unwrap();

        assert_eq!(plan, "Plano: ...");
        assert_eq!(mock.call_count(), 1);
        let prompt = &mock.prompts()[0];
        assert!(prompt.contains("Question 1: 25 anos\nQuestion 2: nenhuma restrição"));
    }

    #[tokio::test]
    async fn test_empty_answers_never_reach_provider() {
        let mock = Arc::new(MockLlmClient::text("unused"));
        let gw = gateway(mock.clone(), Duration::from_secs(5));

        let err = gw.generate_plan(&request(&[])).await.unwrap_err();
        assert!(matches!(err, GatewayError::EmptyAnswers));
        assert!(err.is_client_error());
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_provider_error_is_not_retried() {
        let mock = Arc::new(MockLlmClient::new(vec![
            MockReply::ApiError(503),
            MockReply::Text("second".into()),
        ]));
        let gw = gateway(mock.clone(), Duration::from_secs(5));

        let err = gw.generate_plan(&request(&["a"])).await.unwrap_err();
        assert!(matches!(err, GatewayError::Provider(LlmError::ApiError { status: 503, .. })));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_content_is_an_error() {
        let mock = Arc::new(MockLlmClient::new(vec![MockReply::NoContent]));
        let gw = gateway(mock, Duration::from_secs(5));

        let err = gw.generate_plan(&request(&["a"])).await.unwrap_err();
        assert!(matches!(err, GatewayError::EmptyCompletion));
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let mock = Arc::new(MockLlmClient::text("late").with_delay(Duration::from_millis(500)));
        let gw = gateway(mock, Duration::from_millis(20));

        let err = gw.generate_plan(&request(&["a"])).await.unwrap_err();
        assert!(matches!(err, GatewayError::Timeout(_)));
        assert!(!err.is_client_error());
    }
}
