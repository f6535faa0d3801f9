//! Client for the plan generation gateway

use std::time::Duration;

use questionnaire::{PlanRequest, PlanResponse};
use reqwest::Client;
use tracing::{debug, warn};

use super::error::{ClientError, error_message};
use crate::config::GatewayConfig;

/// Posts finished questionnaires to `POST /gerar-plano`
#[derive(Debug, Clone)]
pub struct GatewayClient {
    base_url: String,
    http: Client,
}

impl GatewayClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(%base_url, ?timeout, "GatewayClient::new: called");
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, http })
    }

    pub fn from_config(config: &GatewayConfig) -> Result<Self, ClientError> {
        Self::new(&config.url, Duration::from_millis(config.timeout_ms))
    }

    /// Request a plan; one HTTP call, no retries
    pub async fn generate_plan(&self, request: &PlanRequest) -> Result<String, ClientError> {
        let url = format!("{}/gerar-plano", self.base_url);
        debug!(%url, category = %request.category, "generate_plan: called");

        let response = self.http.post(&url).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(%status, body = %body, "Gateway returned an error status");
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        match serde_json::from_str::<PlanResponse>(&body) {
            Ok(PlanResponse::Plan { plan }) => Ok(plan),
            _ => {
                warn!(raw = %body, "Resposta inesperada do gateway: no plan field");
                Err(ClientError::Format { raw: body })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::post;
    use questionnaire::Category;
    use tokio::net::TcpListener;

    async fn spawn(app: Router) -> GatewayClient {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        GatewayClient::new(format!("http://{addr}/"), Duration::from_secs(5)).unwrap()
    }

    fn request() -> PlanRequest {
        PlanRequest::new(Category::Training, vec!["30 anos".into(), "academia".into()])
    }

    #[tokio::test]
    async fn test_plan_is_returned() {
        let app = Router::new().route(
            "/gerar-plano",
            post(|axum::Json(body): axum::Json<serde_json::Value>| async move {
                assert_eq!(body["tipo"], "treino");
                assert_eq!(body["respostas"][1], "academia");
                axum::Json(serde_json::json!({"plano": "Treino A/B"}))
            }),
        );
        let client = spawn(app).await;

        assert_eq!(client.generate_plan(&request()).await.unwrap(), "Treino A/B");
    }

    #[tokio::test]
    async fn test_error_status_is_request_error() {
        let app = Router::new().route(
            "/gerar-plano",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    axum::Json(serde_json::json!({"erro": "Erro ao gerar plano com IA"})),
                )
            }),
        );
        let client = spawn(app).await;

        let err = client.generate_plan(&request()).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Status { status: 500, ref message } if message == "Erro ao gerar plano com IA"
        ));
    }

    #[tokio::test]
    async fn test_missing_plan_field_is_format_error() {
        let app = Router::new().route(
            "/gerar-plano",
            post(|| async { axum::Json(serde_json::json!({"resultado": "?"})) }),
        );
        let client = spawn(app).await;

        let err = client.generate_plan(&request()).await.unwrap_err();
        assert!(matches!(err, ClientError::Format { ref raw } if raw.contains("resultado")));
    }

    #[tokio::test]
    async fn test_unreachable_gateway_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = GatewayClient::new(format!("http://{addr}"), Duration::from_secs(2)).unwrap();
        let err = client.generate_plan(&request()).await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
    }
}
