//! Client for the external plan history API

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use questionnaire::Category;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::{ClientError, error_message};
use crate::config::StoreConfig;

/// Identifier assigned by the store; numeric or textual depending on backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlanId {
    Number(u64),
    Text(String),
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanId::Number(n) => write!(f, "{}", n),
            PlanId::Text(s) => f.write_str(s),
        }
    }
}

/// A plan saved in the user's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPlan {
    pub id: PlanId,

    #[serde(rename = "tipo")]
    pub category: Category,

    #[serde(rename = "plano")]
    pub text: String,

    #[serde(rename = "criado_em")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct PlanList {
    #[serde(default, rename = "planos")]
    plans: Vec<StoredPlan>,
}

#[derive(Debug, Serialize)]
struct NewPlan<'a> {
    #[serde(rename = "tipo")]
    category: Category,
    #[serde(rename = "plano")]
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct PlanUpdate<'a> {
    #[serde(rename = "plano")]
    text: &'a str,
}

/// List / create / update plans for the logged-in user
#[derive(Debug, Clone)]
pub struct PlanStoreClient {
    base_url: String,
    token: String,
    http: Client,
}

impl PlanStoreClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(%base_url, "PlanStoreClient::new: called");
        let token = token.into();
        if token.is_empty() {
            return Err(ClientError::NotAuthenticated);
        }
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, token, http })
    }

    pub fn from_config(config: &StoreConfig, token: impl Into<String>) -> Result<Self, ClientError> {
        Self::new(&config.url, token, Duration::from_millis(config.timeout_ms))
    }

    /// All plans of the user, as returned by the store
    pub async fn list(&self) -> Result<Vec<StoredPlan>, ClientError> {
        debug!("list: called");
        let request = self.http.get(format!("{}/meus-planos", self.base_url));
        let list: PlanList = self.send(request).await?;
        debug!(count = list.plans.len(), "list: received");
        Ok(list.plans)
    }

    pub async fn create(&self, category: Category, text: &str) -> Result<StoredPlan, ClientError> {
        debug!(%category, len = text.len(), "create: called");
        let request = self
            .http
            .post(format!("{}/meus-planos", self.base_url))
            .json(&NewPlan { category, text });
        self.send(request).await
    }

    pub async fn update(&self, id: &PlanId, text: &str) -> Result<StoredPlan, ClientError> {
        debug!(%id, len = text.len(), "update: called");
        let request = self
            .http
            .put(format!("{}/meus-planos/{}", self.base_url, id))
            .json(&PlanUpdate { text });
        self.send(request).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.bearer_auth(&self.token).send().await?;
        parse_json(response).await
    }
}

/// Map status and body of a JSON API response
pub(crate) async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        warn!(%status, body = %body, "Service returned an error status");
        return Err(ClientError::Status {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    serde_json::from_str(&body).map_err(|e| {
        warn!(error = %e, raw = %body, "Unexpected response body");
        ClientError::Format { raw: body }
    })
}
