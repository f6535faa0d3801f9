//! Anamnese - guided questionnaire with LLM-generated plans
//!
//! The questionnaire itself lives in the `questionnaire` crate. This crate
//! adds everything with IO around it:
//!
//! - [`gateway`]: HTTP service that turns answers into a provider prompt
//! - [`llm`]: completion provider clients
//! - [`client`]: HTTP clients for the gateway, plan history and identity service
//! - [`session`]: async driver that runs one questionnaire against a generator
//! - [`repl`]: interactive terminal questionnaire
//! - [`config`]: YAML configuration

pub mod cli;
pub mod client;
pub mod config;
pub mod gateway;
pub mod llm;
pub mod repl;
pub mod session;

pub use config::Config;
pub use gateway::{GatewayError, PlanGateway};
pub use llm::{LlmClient, LlmError};
pub use session::{PlanGenerator, SessionController};
