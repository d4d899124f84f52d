use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::LedgerError;
use crate::core::message::GatewayUsage;

/// Most-recent usage entries retained in history.
const HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    pub cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Append-only token and cost accounting across gateway calls. Lifetime
/// counters survive `reset_session`; session counters are zeroed when a new
/// role-play starts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenLedger {
    pub total_tokens_used: u64,
    pub total_cost: f64,
    pub session_tokens: u64,
    pub session_cost: f64,
    #[serde(default)]
    pub history: Vec<UsageRecord>,
}

impl TokenLedger {
    pub fn add_usage(&mut self, usage: GatewayUsage, scenario: Option<String>) {
        self.total_tokens_used += usage.total_tokens;
        self.total_cost += usage.estimated_cost;
        self.session_tokens += usage.total_tokens;
        self.session_cost += usage.estimated_cost;

        self.history.push(UsageRecord {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
            cost: usage.estimated_cost,
            scenario,
            timestamp: Utc::now(),
        });
        if self.history.len() > HISTORY_LIMIT {
            let excess = self.history.len() - HISTORY_LIMIT;
            self.history.drain(..excess);
        }
    }

    pub fn reset_session(&mut self) {
        self.session_tokens = 0;
        self.session_cost = 0.0;
    }

    /// Sub-cent costs render in cents so tiny per-message amounts stay
    /// legible.
    pub fn format_cost(cost: f64) -> String {
        if cost < 0.01 {
            format!("{:.4}¢", cost * 100.0)
        } else {
            format!("${cost:.4}")
        }
    }

    /// Load the cached ledger; a missing file yields a fresh ledger.
    pub fn load(path: &Path) -> Result<Self, LedgerError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).map_err(|e| LedgerError::Io(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| LedgerError::Serialization(e.to_string()))
    }

    pub fn save(&self, path: &Path) -> Result<(), LedgerError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LedgerError::Io(e.to_string()))?;
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| LedgerError::Serialization(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| LedgerError::Io(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage(total: u64) -> GatewayUsage {
        GatewayUsage {
            prompt_tokens: total / 2,
            completion_tokens: total - total / 2,
            total_tokens: total,
            estimated_cost: 0.0001,
        }
    }

    #[test]
    fn test_add_usage_accumulates_both_counters() {
        let mut ledger = TokenLedger::default();
        ledger.add_usage(usage(120), Some("Why is Viking so expensive?".into()));
        ledger.add_usage(usage(80), None);

        assert_eq!(ledger.total_tokens_used, 200);
        assert_eq!(ledger.session_tokens, 200);
        assert_eq!(ledger.history.len(), 2);
    }

    #[test]
    fn test_reset_session_keeps_lifetime_counters() {
        let mut ledger = TokenLedger::default();
        ledger.add_usage(usage(120), None);
        ledger.add_usage(usage(80), None);
        ledger.reset_session();

        assert_eq!(ledger.session_tokens, 0);
        assert_eq!(ledger.session_cost, 0.0);
        assert_eq!(ledger.total_tokens_used, 200);
        assert!(ledger.total_cost > 0.0);
    }

    #[test]
    fn test_history_keeps_most_recent_hundred() {
        let mut ledger = TokenLedger::default();
        for i in 0..130u64 {
            ledger.add_usage(usage(i), None);
        }
        assert_eq!(ledger.history.len(), 100);
        // The oldest thirty entries were dropped.
        assert_eq!(ledger.history[0].total_tokens, 30);
        assert_eq!(ledger.history[99].total_tokens, 129);
    }

    #[test]
    fn test_format_cost() {
        assert_eq!(TokenLedger::format_cost(0.0001), "0.0100¢");
        assert_eq!(TokenLedger::format_cost(0.5), "$0.5000");
    }

    #[test]
    fn test_cache_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache").join("ledger.json");

        let mut ledger = TokenLedger::default();
        ledger.add_usage(usage(200), Some("Dietary requirements".into()));
        ledger.save(&path).unwrap();

        let loaded = TokenLedger::load(&path).unwrap();
        assert_eq!(loaded.total_tokens_used, 200);
        assert_eq!(loaded.history.len(), 1);
        assert_eq!(loaded.history[0].scenario.as_deref(), Some("Dietary requirements"));
    }

    #[test]
    fn test_load_missing_file_is_fresh_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = TokenLedger::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(ledger.total_tokens_used, 0);
    }
}
