use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::error::GatewayError;
use crate::core::message::GatewayUsage;

/// Gateway pricing constants (gpt-4o-mini): $0.15/1M prompt, $0.60/1M
/// completion. The gateway computes `estimated_cost` server-side; the helper
/// below documents the formula and backs the ledger tests.
pub const COST_PER_1M_PROMPT: f64 = 0.15;
pub const COST_PER_1M_COMPLETION: f64 = 0.60;

pub fn estimate_cost(prompt_tokens: u64, completion_tokens: u64) -> f64 {
    (prompt_tokens as f64 / 1_000_000.0) * COST_PER_1M_PROMPT
        + (completion_tokens as f64 / 1_000_000.0) * COST_PER_1M_COMPLETION
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Request body sent to the role-play gateway.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    /// Catalog persona id; the gateway substitutes its default persona
    /// prompt for ids it does not recognize.
    pub persona: String,
    /// Free-text scenario label inserted into the gateway system prompt.
    pub scenario: String,
}

/// Successful gateway payload: reply text plus token/cost accounting.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub content: String,
    pub usage: GatewayUsage,
}

/// Human-readable state of the last reply attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayStatus {
    Idle,
    Success,
    Error,
    Fallback,
}

impl std::fmt::Display for GatewayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// Boundary to the external chat-completion service. Both failure shapes the
/// service produces (non-2xx transport status, 2xx body with an `error`
/// field) surface as `GatewayError`; callers treat them identically.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, GatewayError>;
}
