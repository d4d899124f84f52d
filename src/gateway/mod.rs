use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::core::error::GatewayError;
use crate::core::gateway::{ChatRequest, ChatResponse, Gateway};

/// HTTP client for the role-play gateway. One POST per reply, bounded
/// timeout, no retries: any failure must degrade into the local fallback on
/// the same send, so a retry loop would only delay the substituted reply.
pub struct HttpGateway {
    client: Client,
    endpoint: String,
}

impl HttpGateway {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Http(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, GatewayError> {
        debug!(endpoint = %self.endpoint, persona = %request.persona, "gateway request");

        let resp = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| GatewayError::Http(e.to_string()))?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(GatewayError::Api { status, message });
        }

        // A 2xx body may still carry an application-level error payload.
        let payload: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| GatewayError::Http(e.to_string()))?;

        if let Some(err) = payload.get("error").and_then(|e| e.as_str()) {
            return Err(GatewayError::Application(err.to_string()));
        }

        serde_json::from_value(payload)
            .map_err(|e| GatewayError::Http(format!("malformed gateway payload: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_construction() {
        let gw = HttpGateway::new("http://127.0.0.1:3000/api/chat", Duration::from_secs(30))
            .unwrap();
        assert_eq!(gw.endpoint(), "http://127.0.0.1:3000/api/chat");
    }
}
