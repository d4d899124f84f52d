use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    /// The simulated customer persona.
    Guest,
    /// The human trainee.
    Agent,
}

/// Token counts and cost reported by the gateway for one AI-backed reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GatewayUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    pub estimated_cost: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Present only on guest replies produced by the live gateway.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<GatewayUsage>,
}

impl Message {
    pub fn guest(content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: MessageRole::Guest,
            content: content.into(),
            created_at: Utc::now(),
            usage: None,
        }
    }

    pub fn guest_with_usage(content: impl Into<String>, usage: GatewayUsage) -> Self {
        let mut msg = Self::guest(content);
        msg.usage = Some(usage);
        msg
    }

    pub fn agent(content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: MessageRole::Agent,
            content: content.into(),
            created_at: Utc::now(),
            usage: None,
        }
    }

    pub fn is_agent(&self) -> bool {
        self.role == MessageRole::Agent
    }
}
