//! Completion request/response types
//!
//! Provider-agnostic; each client maps them onto its own API.

use tracing::debug;

/// Everything needed for one completion call
///
/// Plan generation sends exactly one user turn, so the request is just the
/// prompt text and a token limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// The composed prompt, sent as the only user message
    pub prompt: String,

    /// Max tokens for the response (capped by config)
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn single(prompt: impl Into<String>, max_tokens: u32) -> Self {
        debug!("CompletionRequest::single: called");
        Self {
            prompt: prompt.into(),
            max_tokens,
        }
    }
}

/// Response from a completion request
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Generated text (if any)
    pub content: Option<String>,

    /// Why the model stopped
    pub stop_reason: StopReason,

    /// Token usage
    pub usage: TokenUsage,
}

impl CompletionResponse {
    /// A finished text response, mostly for tests and mocks
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        }
    }
}

/// Why the model stopped generating
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    StopSequence,
    Other(String),
}

impl StopReason {
    /// Parse from Anthropic API stop_reason string
    pub fn from_anthropic(s: &str) -> Self {
        match s {
            "end_turn" => StopReason::EndTurn,
            "max_tokens" => StopReason::MaxTokens,
            "stop_sequence" => StopReason::StopSequence,
            other => {
                debug!(%other, "StopReason::from_anthropic: unknown stop reason");
                StopReason::Other(other.to_string())
            }
        }
    }

    /// Parse from OpenAI finish_reason string
    pub fn from_openai(s: &str) -> Self {
        match s {
            "stop" => StopReason::EndTurn,
            "length" => StopReason::MaxTokens,
            other => {
                debug!(%other, "StopReason::from_openai: unknown finish reason");
                StopReason::Other(other.to_string())
            }
        }
    }
}

/// Token usage
#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}
