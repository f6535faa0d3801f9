//! HTTP clients for the services a questionnaire session talks to

mod auth;
mod error;
mod gateway;
mod store;

pub use auth::{AuthClient, Credentials, TokenStore};
pub use error::ClientError;
pub use gateway::GatewayClient;
pub use store::{PlanId, PlanStoreClient, StoredPlan};
