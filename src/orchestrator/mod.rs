use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::core::catalog::Catalog;
use crate::core::config::SimulatorConfig;
use crate::core::error::RolePlayError;
use crate::core::gateway::{ChatMessage, ChatRequest, ChatRole, Gateway, GatewayStatus};
use crate::core::message::{Message, MessageRole};
use crate::core::session::Session;
use crate::ledger::TokenLedger;
use crate::scoring::classifier::{classify, ReplyQuality};
use crate::scoring::session::score_session;

/// Owns the active role-play conversation: one session at a time, strictly
/// alternating agent/guest turns, dual-path reply generation (live gateway
/// first, local simulation as fallback).
pub struct Orchestrator {
    catalog: Catalog,
    gateway: Arc<dyn Gateway>,
    ledger: TokenLedger,
    rng: StdRng,
    simulator: SimulatorConfig,
    ai_enabled: bool,
    current: Option<Session>,
    completed: Vec<Session>,
    typing: bool,
    status: GatewayStatus,
    last_error: Option<String>,
}

impl Orchestrator {
    pub fn new(
        catalog: Catalog,
        gateway: Arc<dyn Gateway>,
        ledger: TokenLedger,
        simulator: SimulatorConfig,
    ) -> Self {
        Self {
            catalog,
            gateway,
            ledger,
            rng: StdRng::from_entropy(),
            simulator,
            ai_enabled: false,
            current: None,
            completed: Vec::new(),
            typing: false,
            status: GatewayStatus::Idle,
            last_error: None,
        }
    }

    /// Deterministic trigger/canned-line selection for tests and replays.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn set_ai_enabled(&mut self, enabled: bool) {
        self.ai_enabled = enabled;
    }

    pub fn ai_enabled(&self) -> bool {
        self.ai_enabled
    }

    pub fn toggle_ai(&mut self) -> bool {
        self.ai_enabled = !self.ai_enabled;
        self.ai_enabled
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn ledger(&self) -> &TokenLedger {
        &self.ledger
    }

    pub fn current_session(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn completed_sessions(&self) -> &[Session] {
        &self.completed
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    pub fn gateway_status(&self) -> GatewayStatus {
        self.status
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Start a session against a resolved scenario and persona. The first
    /// message is the scenario opening line, spoken by the guest. Session
    /// token counters reset here.
    pub fn start_session(
        &mut self,
        scenario_id: &str,
        persona_id: &str,
    ) -> Result<&Session, RolePlayError> {
        if self.current.is_some() {
            return Err(RolePlayError::SessionActive);
        }
        let opening_line = self.catalog.scenario(scenario_id)?.opening_line.clone();
        self.catalog.persona(persona_id)?;

        self.ledger.reset_session();
        self.status = GatewayStatus::Idle;
        self.last_error = None;
        self.current = Some(Session::new(scenario_id, persona_id, &opening_line));

        debug!(scenario_id, persona_id, "session started");
        Ok(self.current.as_ref().expect("session just created"))
    }

    /// Append one agent message and produce exactly one guest reply.
    /// Rejected while a previous reply is still in flight: replies must
    /// strictly follow the message that provoked them.
    pub async fn send(&mut self, text: &str) -> Result<String, RolePlayError> {
        if self.current.is_none() {
            return Err(RolePlayError::NoActiveSession);
        }
        if self.typing {
            return Err(RolePlayError::ReplyInProgress);
        }

        self.typing = true;
        let result = self.reply_to(text).await;
        self.typing = false;
        result
    }

    async fn reply_to(&mut self, text: &str) -> Result<String, RolePlayError> {
        {
            let session = self.current.as_mut().ok_or(RolePlayError::NoActiveSession)?;
            session.push(Message::agent(text));
        }

        if self.ai_enabled {
            let request = self.build_request()?;
            match self.gateway.complete(&request).await {
                Ok(response) => {
                    self.ledger
                        .add_usage(response.usage, Some(request.scenario.clone()));
                    let session =
                        self.current.as_mut().ok_or(RolePlayError::NoActiveSession)?;
                    session.last_usage = Some(response.usage);
                    session.push(Message::guest_with_usage(&response.content, response.usage));
                    self.status = GatewayStatus::Success;
                    self.last_error = None;
                    return Ok(response.content);
                }
                Err(err) => {
                    warn!(error = %err, "gateway failed, falling back to simulation");
                    self.status = GatewayStatus::Error;
                    self.last_error = Some(err.to_string());
                }
            }
        }

        let reply = self.simulate_reply(text).await?;
        let session = self.current.as_mut().ok_or(RolePlayError::NoActiveSession)?;
        session.push(Message::guest(&reply));
        if self.ai_enabled {
            // The substituted reply is on the record; surface that state.
            self.status = GatewayStatus::Fallback;
        }
        Ok(reply)
    }

    /// Seal the active session: stamp the end time, score the conversation,
    /// and move it to the completed list. No further sends are possible.
    pub fn end_session(&mut self) -> Result<&Session, RolePlayError> {
        let mut session = self.current.take().ok_or(RolePlayError::NoActiveSession)?;
        session.ended_at = Some(chrono::Utc::now());
        let feedback = score_session(&session.messages);
        session.score = Some(feedback.total_score);
        session.feedback = Some(feedback);
        self.completed.push(session);
        Ok(self.completed.last().expect("session just pushed"))
    }

    fn build_request(&self) -> Result<ChatRequest, RolePlayError> {
        let session = self.current.as_ref().ok_or(RolePlayError::NoActiveSession)?;
        let scenario = self.catalog.scenario(&session.scenario_id)?;

        let messages = session
            .messages
            .iter()
            .map(|m| ChatMessage {
                role: match m.role {
                    MessageRole::Guest => ChatRole::Assistant,
                    MessageRole::Agent => ChatRole::User,
                },
                content: m.content.clone(),
            })
            .collect();

        Ok(ChatRequest {
            messages,
            persona: session.persona_id.clone(),
            scenario: scenario.title.clone(),
        })
    }

    /// Local reply simulation: artificial latency, then either an unused
    /// scenario trigger line (early in the session, when the agent reply was
    /// not good) or a canned line from the persona's quality bucket.
    async fn simulate_reply(&mut self, text: &str) -> Result<String, RolePlayError> {
        let delay = if self.simulator.max_delay_ms > self.simulator.min_delay_ms {
            self.rng
                .gen_range(self.simulator.min_delay_ms..=self.simulator.max_delay_ms)
        } else {
            self.simulator.min_delay_ms
        };
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        let quality = classify(text);

        let (scenario_id, persona_id, message_count, used_triggers) = {
            let session = self.current.as_ref().ok_or(RolePlayError::NoActiveSession)?;
            (
                session.scenario_id.clone(),
                session.persona_id.clone(),
                session.message_count(),
                session.used_triggers.clone(),
            )
        };

        if message_count < self.simulator.trigger_message_ceiling && quality != ReplyQuality::Good
        {
            let scenario = self.catalog.scenario(&scenario_id)?;
            let unused: Vec<usize> = (0..scenario.trigger_lines.len())
                .filter(|i| !used_triggers.contains(i))
                .collect();
            if !unused.is_empty() && self.rng.gen_bool(self.simulator.trigger_probability) {
                let idx = unused[self.rng.gen_range(0..unused.len())];
                let line = scenario.trigger_lines[idx].clone();
                if let Some(session) = self.current.as_mut() {
                    session.used_triggers.push(idx);
                }
                debug!(trigger = idx, "injecting scenario trigger line");
                return Ok(line);
            }
        }

        let bank = self.catalog.reply_bank(&persona_id);
        let lines = bank.lines(quality);
        let idx = self.rng.gen_range(0..lines.len());
        Ok(lines[idx].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulatorConfig;
    use crate::core::error::GatewayError;
    use crate::core::gateway::{ChatResponse, Gateway};
    use crate::core::message::GatewayUsage;
    use async_trait::async_trait;

    struct StubGateway {
        result: Result<ChatResponse, GatewayError>,
    }

    impl StubGateway {
        fn success(content: &str, total_tokens: u64) -> Self {
            Self {
                result: Ok(ChatResponse {
                    content: content.into(),
                    usage: GatewayUsage {
                        prompt_tokens: total_tokens / 2,
                        completion_tokens: total_tokens - total_tokens / 2,
                        total_tokens,
                        estimated_cost: 0.0002,
                    },
                }),
            }
        }

        fn server_error() -> Self {
            Self {
                result: Err(GatewayError::Api {
                    status: 500,
                    message: "internal error".into(),
                }),
            }
        }

        fn error_payload() -> Self {
            Self {
                result: Err(GatewayError::Application("API key not configured".into())),
            }
        }
    }

    #[async_trait]
    impl Gateway for StubGateway {
        async fn complete(&self, _request: &ChatRequest) -> Result<ChatResponse, GatewayError> {
            self.result.clone()
        }
    }

    fn orchestrator(gateway: StubGateway) -> Orchestrator {
        Orchestrator::new(
            Catalog::builtin(),
            Arc::new(gateway),
            TokenLedger::default(),
            SimulatorConfig::immediate(),
        )
        .with_rng_seed(7)
    }

    #[test]
    fn test_start_session_seeds_opening_line() {
        let mut orch = orchestrator(StubGateway::server_error());
        let session = orch
            .start_session("S1_price_objection", "value_seeker")
            .unwrap();

        assert_eq!(session.messages.len(), 1);
        assert_eq!(session.messages[0].role, MessageRole::Guest);
        let opening = orch
            .catalog()
            .scenario("S1_price_objection")
            .unwrap()
            .opening_line
            .clone();
        assert_eq!(orch.current_session().unwrap().messages[0].content, opening);
    }

    #[test]
    fn test_toggle_ai() {
        let mut orch = orchestrator(StubGateway::server_error());
        assert!(!orch.ai_enabled());
        assert!(orch.toggle_ai());
        assert!(!orch.toggle_ai());
    }

    #[test]
    fn test_start_session_rejects_unknown_ids() {
        let mut orch = orchestrator(StubGateway::server_error());
        assert!(matches!(
            orch.start_session("nope", "value_seeker"),
            Err(RolePlayError::Catalog(_))
        ));
        assert!(matches!(
            orch.start_session("S1_price_objection", "nope"),
            Err(RolePlayError::Catalog(_))
        ));
        assert!(orch.current_session().is_none());
    }

    #[test]
    fn test_start_session_rejects_second_session() {
        let mut orch = orchestrator(StubGateway::server_error());
        orch.start_session("S1_price_objection", "value_seeker")
            .unwrap();
        assert!(matches!(
            orch.start_session("S2_cabin_upgrade", "value_seeker"),
            Err(RolePlayError::SessionActive)
        ));
    }

    #[tokio::test]
    async fn test_send_appends_agent_then_guest() {
        let mut orch = orchestrator(StubGateway::server_error());
        orch.start_session("S1_price_objection", "value_seeker")
            .unwrap();

        let reply = orch.send("Could you tell me what matters most for this trip?").await;
        assert!(reply.is_ok());

        let session = orch.current_session().unwrap();
        assert_eq!(session.messages.len(), 3);
        assert_eq!(session.messages[1].role, MessageRole::Agent);
        assert_eq!(session.messages[2].role, MessageRole::Guest);
        assert_eq!(session.messages[2].content, reply.unwrap());
    }

    #[tokio::test]
    async fn test_send_without_session_fails() {
        let mut orch = orchestrator(StubGateway::server_error());
        assert!(matches!(
            orch.send("hello").await,
            Err(RolePlayError::NoActiveSession)
        ));
    }

    #[tokio::test]
    async fn test_gateway_success_records_usage() {
        let mut orch = orchestrator(StubGateway::success("Well, convince me then.", 150));
        orch.set_ai_enabled(true);
        orch.start_session("S1_price_objection", "value_seeker")
            .unwrap();

        let reply = orch.send("I understand, let me explain the value.").await.unwrap();
        assert_eq!(reply, "Well, convince me then.");
        assert_eq!(orch.gateway_status(), GatewayStatus::Success);
        assert_eq!(orch.ledger().session_tokens, 150);
        assert_eq!(orch.ledger().total_tokens_used, 150);

        let session = orch.current_session().unwrap();
        assert_eq!(session.last_usage.unwrap().total_tokens, 150);
        assert!(session.messages[2].usage.is_some());
    }

    #[tokio::test]
    async fn test_http_error_falls_back_to_persona_lines() {
        let mut orch = orchestrator(StubGateway::server_error());
        orch.set_ai_enabled(true);
        orch.start_session("S1_price_objection", "value_seeker")
            .unwrap();

        // Fill the session past the trigger ceiling so the reply must come
        // from the persona's reply bank.
        for _ in 0..4 {
            let session = orch.current.as_mut().unwrap();
            session.push(Message::agent("padding"));
            session.push(Message::guest("padding"));
        }

        let reply = orch.send("idk").await.unwrap();
        assert_eq!(orch.gateway_status(), GatewayStatus::Fallback);
        assert!(orch.last_error().unwrap().contains("500"));

        let bank = orch.catalog().reply_bank("value_seeker");
        assert!(bank.confused.contains(&reply));
    }

    #[tokio::test]
    async fn test_error_payload_falls_back_too() {
        let mut orch = orchestrator(StubGateway::error_payload());
        orch.set_ai_enabled(true);
        orch.start_session("C2_wifi_complaint", "dissatisfied_customer")
            .unwrap();

        let reply = orch.send("We will fix it.").await;
        assert!(reply.is_ok());
        assert_eq!(orch.gateway_status(), GatewayStatus::Fallback);
        assert!(orch.last_error().unwrap().contains("API key not configured"));
    }

    #[tokio::test]
    async fn test_ai_disabled_keeps_status_idle() {
        let mut orch = orchestrator(StubGateway::server_error());
        orch.start_session("S1_price_objection", "value_seeker")
            .unwrap();

        orch.send("short reply").await.unwrap();
        assert_eq!(orch.gateway_status(), GatewayStatus::Idle);
        assert!(orch.last_error().is_none());
    }

    #[tokio::test]
    async fn test_trigger_lines_come_from_scenario_early_in_session() {
        // Seeded RNG plus a certain trigger probability makes the injected
        // line deterministic: it must be one of the scenario trigger lines.
        let mut orch = orchestrator(StubGateway::server_error());
        orch.simulator.trigger_probability = 1.0;
        orch.start_session("S1_price_objection", "value_seeker")
            .unwrap();

        let triggers = orch
            .catalog()
            .scenario("S1_price_objection")
            .unwrap()
            .trigger_lines
            .clone();

        let first = orch.send("no").await.unwrap();
        assert!(triggers.contains(&first));

        let second = orch.send("no").await.unwrap();
        assert!(triggers.contains(&second));
        assert_ne!(first, second, "each trigger line fires at most once");
    }

    #[tokio::test]
    async fn test_good_reply_never_triggers_escalation() {
        let mut orch = orchestrator(StubGateway::server_error());
        orch.simulator.trigger_probability = 1.0;
        orch.start_session("S1_price_objection", "value_seeker")
            .unwrap();

        let text = "I understand your concern — let me show you the concrete value breakdown \
                    and offer a complimentary upgrade option.";
        let reply = orch.send(text).await.unwrap();
        let bank = orch.catalog().reply_bank("value_seeker");
        assert!(bank.good.contains(&reply));
    }

    #[tokio::test]
    async fn test_uncurated_persona_uses_default_bank() {
        let mut orch = orchestrator(StubGateway::server_error());
        orch.simulator.trigger_probability = 0.0;
        orch.start_session("V1_dietary_requirements", "anxious_planner")
            .unwrap();

        let reply = orch.send("the kitchen handles it").await.unwrap();
        let default_bank = orch.catalog().reply_bank("curious_explorer");
        assert!(default_bank.weak.contains(&reply));
    }

    #[tokio::test]
    async fn test_end_session_seals_and_scores() {
        let mut orch = orchestrator(StubGateway::server_error());
        orch.start_session("S1_price_objection", "value_seeker")
            .unwrap();
        orch.send("idk").await.unwrap();

        let session = orch.end_session().unwrap();
        assert!(session.is_ended());
        let feedback = session.feedback.as_ref().unwrap();
        assert!(feedback.total_score <= 15, "total {}", feedback.total_score);
        assert_eq!(session.score, Some(feedback.total_score));

        assert!(orch.current_session().is_none());
        assert_eq!(orch.completed_sessions().len(), 1);
        assert!(matches!(
            orch.end_session(),
            Err(RolePlayError::NoActiveSession)
        ));
    }

    #[tokio::test]
    async fn test_send_after_end_is_rejected() {
        let mut orch = orchestrator(StubGateway::server_error());
        orch.start_session("S1_price_objection", "value_seeker")
            .unwrap();
        orch.end_session().unwrap();
        assert!(matches!(
            orch.send("too late").await,
            Err(RolePlayError::NoActiveSession)
        ));
    }

    #[tokio::test]
    async fn test_typing_flag_clears_after_reply() {
        let mut orch = orchestrator(StubGateway::server_error());
        orch.start_session("S1_price_objection", "value_seeker")
            .unwrap();
        assert!(!orch.is_typing());
        orch.send("anything at all").await.unwrap();
        assert!(!orch.is_typing());
    }

    #[tokio::test]
    async fn test_start_resets_session_token_counters() {
        let mut orch = orchestrator(StubGateway::success("Noted.", 90));
        orch.set_ai_enabled(true);
        orch.start_session("S1_price_objection", "value_seeker")
            .unwrap();
        orch.send("I can offer an option.").await.unwrap();
        orch.end_session().unwrap();
        assert_eq!(orch.ledger().session_tokens, 90);

        orch.start_session("S2_cabin_upgrade", "value_seeker")
            .unwrap();
        assert_eq!(orch.ledger().session_tokens, 0);
        assert_eq!(orch.ledger().total_tokens_used, 90);
    }
}
