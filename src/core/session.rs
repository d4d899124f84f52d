use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::message::{GatewayUsage, Message};

/// One complete guest/agent conversation, from start to end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub scenario_id: String,
    pub persona_id: String,
    pub messages: Vec<Message>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub score: Option<u32>,
    pub feedback: Option<SessionFeedback>,
    /// Usage of the most recent gateway-backed reply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_usage: Option<GatewayUsage>,
    /// Indices of trigger lines already injected for this session.
    #[serde(default)]
    pub used_triggers: Vec<usize>,
}

impl Session {
    /// Create a session seeded with the scenario opening line as the first
    /// guest message.
    pub fn new(scenario_id: impl Into<String>, persona_id: impl Into<String>, opening_line: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            scenario_id: scenario_id.into(),
            persona_id: persona_id.into(),
            messages: vec![Message::guest(opening_line)],
            started_at: Utc::now(),
            ended_at: None,
            score: None,
            feedback: None,
            last_usage: None,
            used_triggers: Vec::new(),
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn agent_messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.is_agent())
    }

    pub fn is_ended(&self) -> bool {
        self.ended_at.is_some()
    }
}

/// Per-dimension session scores, 0-100 each.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionScores {
    pub empathy: u32,
    pub clarity: u32,
    pub accuracy: u32,
    pub solution: u32,
    pub deescalation: u32,
    pub brand: u32,
}

/// Coaching report produced when a session is sealed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionFeedback {
    pub total_score: u32,
    pub dimensions: DimensionScores,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub recommendations: Vec<String>,
}
