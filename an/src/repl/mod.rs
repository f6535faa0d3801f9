//! Interactive terminal questionnaire
//!
//! Category menu, one question at a time, plan generation and optional
//! saving to the plan history.

mod session;

pub use session::ReplSession;

use std::sync::Arc;

use eyre::{Context, Result};
use questionnaire::Category;
use tracing::info;

use crate::client::{GatewayClient, PlanStoreClient, TokenStore};
use crate::config::Config;
use crate::gateway::PlanGateway;
use crate::llm::create_client;
use crate::session::{PlanGenerator, SessionController};

/// Options of `an ask`
#[derive(Debug, Clone, Default)]
pub struct AskOptions {
    /// Skip the menu and start with this category
    pub category: Option<Category>,

    /// Call the provider from this process instead of the gateway
    pub local: bool,

    /// Save the generated plan to the plan history
    pub save: bool,
}

/// Build the plan generator selected by `local`
pub fn plan_generator(config: &Config, local: bool) -> Result<Arc<dyn PlanGenerator>> {
    if local {
        config.validate_provider()?;
        let llm = create_client(&config.llm).context("Failed to create LLM client")?;
        info!(provider = %config.llm.provider, "Generating plans in-process");
        Ok(Arc::new(PlanGateway::from_config(config, llm)))
    } else {
        let client = GatewayClient::from_config(&config.gateway).context("Failed to create gateway client")?;
        info!(url = %config.gateway.url, "Generating plans through the gateway");
        Ok(Arc::new(client))
    }
}

/// Run the interactive questionnaire
///
/// This is the main entry point for `an ask`.
pub async fn run_interactive(config: &Config, options: AskOptions) -> Result<()> {
    let generator = plan_generator(config, options.local)?;

    let store = if options.save {
        let credentials = TokenStore::from_config(&config.store)
            .load()?
            .ok_or_else(|| eyre::eyre!("Not logged in; run `an login` before using --save"))?;
        Some(PlanStoreClient::from_config(&config.store, credentials.token)?)
    } else {
        None
    };

    let controller = SessionController::new(config.questions.clone(), generator);
    if let Some(category) = options.category {
        controller.select_category(category).await?;
    }

    let mut session = ReplSession::new(controller, store);
    session.run().await
}
