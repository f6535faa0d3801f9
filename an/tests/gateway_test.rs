//! Integration tests for the plan generation flow
//!
//! A real gateway server backed by a scripted provider, driven through the
//! HTTP client and the session controller.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anamnese::client::GatewayClient;
use anamnese::gateway::{self, GENERIC_ERROR_MESSAGE, PlanGateway};
use anamnese::llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError};
use anamnese::session::SessionController;
use async_trait::async_trait;
use questionnaire::{Category, Outcome, Phase, PlanFailure, QuestionSets};
use tokio::net::TcpListener;

/// Provider that answers from a script and records prompts
struct ScriptedProvider {
    reply: Result<String, u16>,
    calls: AtomicUsize,
    last_prompt: std::sync::Mutex<Option<String>>,
}

impl ScriptedProvider {
    fn ok(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
            last_prompt: std::sync::Mutex::new(None),
        })
    }

    fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(status),
            calls: AtomicUsize::new(0),
            last_prompt: std::sync::Mutex::new(None),
        })
    }
}

#[async_trait]
impl LlmClient for ScriptedProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(request.prompt);
        match &self.reply {
            Ok(text) => Ok(CompletionResponse::text(text.clone())),
            Err(status) => Err(LlmError::ApiError {
                status: *status,
                message: "Incorrect API key provided".to_string(),
            }),
        }
    }
}

async fn spawn_gateway(provider: Arc<ScriptedProvider>) -> String {
    let plan_gateway = PlanGateway::new(provider, 1024, Duration::from_secs(5));
    let app = gateway::router(plan_gateway);
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{addr}")
}

async fn answered_session(base: &str, category: Category) -> SessionController {
    let client = GatewayClient::new(base, Duration::from_secs(5)).expect("client");
    let session = SessionController::new(QuestionSets::default(), Arc::new(client));
    session.select_category(category).await.expect("select");
    for answer in ["25 anos, 1,70m, 70kg", "nenhuma restrição", "emagrecer", "3 refeições", "pouca água"] {
        session.submit_answer(answer).await.expect("answer");
    }
    session
}

// =============================================================================
// End-to-end
// =============================================================================

#[tokio::test]
async fn test_questionnaire_to_plan() {
    let provider = ScriptedProvider::ok("Plano: café da manhã reforçado");
    let base = spawn_gateway(provider.clone()).await;
    let session = answered_session(&base, Category::Nutrition).await;

    assert_eq!(session.snapshot().await.phase, Phase::SummaryReady);
    assert_eq!(session.generate_plan().await, Ok(Outcome::Completed));

    let state = session.snapshot().await;
    assert_eq!(state.phase, Phase::Completed);
    assert_eq!(state.generated_plan.as_deref(), Some("Plano: café da manhã reforçado"));
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

    let prompt = provider.last_prompt.lock().unwrap().clone().expect("prompt sent");
    assert!(prompt.contains("meal plan"));
    assert!(prompt.contains("Question 1: 25 anos, 1,70m, 70kg"));
    assert!(prompt.contains("Question 5: pouca água"));
}

#[tokio::test]
async fn test_provider_failure_keeps_answers() {
    let provider = ScriptedProvider::failing(401);
    let base = spawn_gateway(provider).await;
    let session = answered_session(&base, Category::Training).await;

    let outcome = session.generate_plan().await.expect("accepted");
    assert!(matches!(outcome, Outcome::Failed(PlanFailure::Request(ref detail)) if detail.contains("500")));

    let state = session.snapshot().await;
    assert_eq!(state.phase, Phase::SummaryReady);
    assert_eq!(state.answers().len(), 5);
    assert!(state.generated_plan.is_none());
}

#[tokio::test]
async fn test_retry_after_failure_issues_new_request() {
    let provider = ScriptedProvider::failing(503);
    let base = spawn_gateway(provider.clone()).await;
    let session = answered_session(&base, Category::Training).await;

    session.generate_plan().await.expect("first");
    session.generate_plan().await.expect("second");
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
}

// =============================================================================
// HTTP contract
// =============================================================================

#[tokio::test]
async fn test_error_body_never_leaks_provider_detail() {
    let base = spawn_gateway(ScriptedProvider::failing(401)).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/gerar-plano"))
        .json(&serde_json::json!({"respostas": ["a", "b"], "tipo": "alimentacao"}))
        .send()
        .await
        .expect("send");

    assert_eq!(response.status(), 500);
    let body = response.text().await.expect("body");
    assert!(body.contains(GENERIC_ERROR_MESSAGE));
    assert!(!body.contains("API key"));
}

#[tokio::test]
async fn test_missing_fields_are_rejected() {
    let provider = ScriptedProvider::ok("unused");
    let base = spawn_gateway(provider.clone()).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/gerar-plano"))
        .json(&serde_json::json!({"tipo": "treino"}))
        .send()
        .await
        .expect("send");

    assert_eq!(response.status(), 400);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}
