use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::error::{CatalogIntelligenceError, Result};
use crate::models::{ChatRequest, ChatResponse};
use crate::provider::ResolvedProvider;

#[async_trait]
pub trait Transport: Send + Sync {
    async fn chat(&self, provider: &ResolvedProvider, req: &ChatRequest) -> Result<ChatResponse>;
}

/// Models known to honor the `response_format: json_object` hint. Everything
/// else relies on prompt instructions alone.
pub fn json_response_format(model: &str) -> Option<serde_json::Value> {
    let model = model.to_ascii_lowercase();
    if model.contains("gpt") || model.contains("llama") {
        Some(serde_json::json!({"type": "json_object"}))
    } else {
        None
    }
}

/// One HTTP POST to the resolved provider's chat-completions endpoint.
///
/// No automatic retries: a failed call surfaces immediately and the caller
/// decides whether to re-invoke. The per-call timeout bounds slow providers;
/// dropping the returned future aborts the in-flight request.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            CatalogIntelligenceError::Internal(format!("failed to build HTTP client: {e}"))
        })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn chat(&self, provider: &ResolvedProvider, req: &ChatRequest) -> Result<ChatResponse> {
        tracing::info!(
            provider = ?provider.kind,
            model = %req.model,
            "sending chat completion request"
        );

        let response = self
            .client
            .post(&provider.base_url)
            .header("Authorization", format!("Bearer {}", provider.api_key))
            .header("Content-Type", "application/json")
            .json(req)
            .send()
            .await
            .map_err(|e| {
                // DNS failure, timeout, connection reset - same category as an
                // HTTP error so callers need not distinguish.
                CatalogIntelligenceError::transport(None, format!("request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(CatalogIntelligenceError::transport(
                Some(status.as_u16()),
                format!("provider returned an error: {body}"),
            ));
        }

        response.json().await.map_err(|e| {
            CatalogIntelligenceError::transport(
                Some(status.as_u16()),
                format!("failed to decode provider response: {e}"),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::ChatMessage;
    use crate::provider;

    #[test]
    fn json_mode_is_whitelisted_by_model_substring() {
        assert!(json_response_format("gpt-4o-mini").is_some());
        assert!(json_response_format("llama-3.3-70b-versatile").is_some());
        assert!(json_response_format("Meta-Llama-3-8B").is_some());
        assert!(json_response_format("grok-2-latest").is_none());
    }

    // Exercises the live Groq endpoint; only runs when a key is available.
    #[tokio::test]
    async fn chat_against_live_provider_if_configured() {
        let Ok(api_key) = std::env::var("GROQ_API_KEY") else {
            return;
        };
        let mut llm = Config::default().llm;
        llm.groq_api_key = api_key;
        let resolved = provider::resolve(&llm).expect("key present");
        let transport = HttpTransport::new(Duration::from_secs(15)).expect("client builds");
        let req = ChatRequest {
            model: resolved.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: "What is the capital of France?".to_string(),
            }],
            temperature: 0.0,
            max_tokens: 50,
            response_format: None,
        };
        let res = transport.chat(&resolved, &req).await;
        assert!(res.is_ok());
    }
}
