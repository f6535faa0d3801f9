//! Wire types shared by the gateway and its clients

use serde::{Deserialize, Serialize};

use crate::category::Category;

/// Body of `POST /gerar-plano`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRequest {
    /// Answers in question order
    #[serde(rename = "respostas")]
    pub answers: Vec<String>,

    #[serde(rename = "tipo")]
    pub category: Category,
}

impl PlanRequest {
    pub fn new(category: Category, answers: Vec<String>) -> Self {
        Self { answers, category }
    }
}

/// Response of `POST /gerar-plano`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlanResponse {
    Plan {
        #[serde(rename = "plano")]
        plan: String,
    },
    Error {
        #[serde(rename = "erro")]
        error: String,
    },
}

impl PlanResponse {
    pub fn plan(plan: impl Into<String>) -> Self {
        PlanResponse::Plan { plan: plan.into() }
    }

    pub fn error(error: impl Into<String>) -> Self {
        PlanResponse::Error { error: error.into() }
    }
}
