//! HTTP surface of the gateway

use std::net::SocketAddr;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::routing::{get, post};
use eyre::{Context, Result};
use questionnaire::{PlanRequest, PlanResponse};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

use super::PlanGateway;
use crate::config::ServerConfig;

/// Body of every 500 response; provider details stay in the logs
pub const GENERIC_ERROR_MESSAGE: &str = "Erro ao gerar plano com IA";

/// Routes without CORS, for embedding and tests
pub fn router(gateway: PlanGateway) -> Router {
    Router::new()
        .route("/gerar-plano", post(generate_plan))
        .route("/health", get(health))
        .with_state(gateway)
}

fn cors_layer(allowed_origin: &str) -> Result<CorsLayer> {
    let origin: HeaderValue = allowed_origin
        .parse()
        .context(format!("Invalid allowed-origin: {}", allowed_origin))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::POST])
        .allow_headers([header::CONTENT_TYPE]))
}

/// Bind and serve until Ctrl-C
pub async fn serve(config: &ServerConfig, gateway: PlanGateway) -> Result<()> {
    let app = router(gateway).layer(cors_layer(&config.allowed_origin)?);

    let listener = TcpListener::bind(&config.bind)
        .await
        .context(format!("Failed to bind {}", config.bind))?;
    let addr: SocketAddr = listener.local_addr()?;
    info!(%addr, origin = %config.allowed_origin, "Gateway listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Gateway server failed")?;

    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn generate_plan(
    State(gateway): State<PlanGateway>,
    payload: Result<Json<PlanRequest>, JsonRejection>,
) -> (StatusCode, Json<PlanResponse>) {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "Malformed plan request");
            return (
                StatusCode::BAD_REQUEST,
                Json(PlanResponse::error(format!("Requisição inválida: {}", rejection.body_text()))),
            );
        }
    };
    debug!(category = %request.category, "generate_plan: request accepted");

    match gateway.generate_plan(&request).await {
        Ok(plan) => (StatusCode::OK, Json(PlanResponse::plan(plan))),
        Err(e) if e.is_client_error() => (StatusCode::BAD_REQUEST, Json(PlanResponse::error(e.to_string()))),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(PlanResponse::error(GENERIC_ERROR_MESSAGE)),
        ),
    }
}

async fn health() -> &'static str {
    "ok"
}
