//! HTTP client error types

use questionnaire::PlanFailure;
use thiserror::Error;

/// Errors talking to the gateway, plan store or identity service
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed response: {raw}")]
    Format { raw: String },

    #[error("Not logged in; run `an login` first")]
    NotAuthenticated,
}

impl ClientError {
    /// Message to show the user, preferring what the server said
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Status { message, .. } if !message.is_empty() => message.clone(),
            ClientError::NotAuthenticated => self.to_string(),
            _ => "Falha na comunicação com o servidor.".to_string(),
        }
    }
}

impl From<ClientError> for PlanFailure {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Format { raw } => PlanFailure::Format(raw),
            other => PlanFailure::Request(other.to_string()),
        }
    }
}

/// Pull a human message out of an error body (`erro` or `error`)
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("erro")
                .or_else(|| v.get("error"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
