//! Remote completion proxy service
//!
//! A stateless HTTP endpoint that accepts a new user message plus prior
//! turns, injects the fixed persona prompt, forwards the assembled
//! conversation to the external completion provider, and returns the
//! generated reply. Provider error bodies are logged but never relayed
//! to the caller; clients only ever see a summarized error string.

use crate::config::ProviderConfig;
use crate::error::{ConverseError, Result};
use crate::persona::SYSTEM_PROMPT;
use crate::proxy::wire::{ProxyRequest, ProxyResponse, WireMessage};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;

/// Request body sent to the completion provider
#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    max_tokens: u32,
    temperature: f32,
}

/// Response body from the completion provider
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Shared state for the proxy service
pub struct ProxyState {
    client: Client,
    config: ProviderConfig,
}

impl ProxyState {
    /// Create proxy state from provider configuration
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent("converse/0.3.0")
            .build()
            .map_err(|e| {
                ConverseError::Provider(format!("Failed to create HTTP client: {}", e))
            })?;

        tracing::info!(
            "Initialized completion proxy: api_base={}, model={}",
            config.api_base,
            config.model
        );

        Ok(Self { client, config })
    }

    /// Forward an assembled conversation to the completion provider
    ///
    /// Errors returned here carry only summarized, caller-safe text; the
    /// provider detail is logged before summarizing.
    async fn forward(&self, request: &ProxyRequest) -> Result<String> {
        let api_key = std::env::var(&self.config.api_key_env).map_err(|_| {
            ConverseError::Provider(format!(
                "API key not configured (set {})",
                self.config.api_key_env
            ))
        })?;

        let body = CompletionRequest {
            model: self.config.model.clone(),
            messages: assemble_messages(request),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let url = format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to reach completion provider: {}", e);
                ConverseError::Provider("Failed to reach completion provider".to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::error!("Completion provider error {}: {}", status, detail);
            return Err(ConverseError::Provider(format!(
                "Completion provider returned status {}",
                status
            ))
            .into());
        }

        let completion: CompletionResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse completion provider response: {}", e);
            ConverseError::Provider("Invalid completion provider response".to_string())
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                tracing::error!("Completion provider returned no content");
                ConverseError::Provider("Completion provider returned no content".to_string())
                    .into()
            })
    }
}

/// Build the ordered provider conversation: system prompt, then prior
/// turns, then the new user message as the final turn
fn assemble_messages(request: &ProxyRequest) -> Vec<WireMessage> {
    let mut messages = Vec::with_capacity(request.messages.len() + 2);
    messages.push(WireMessage::system(SYSTEM_PROMPT));
    messages.extend(request.messages.iter().cloned());
    messages.push(WireMessage::new("user", request.message.clone()));
    messages
}

/// Build the proxy router
///
/// `POST /chat` performs the exchange; preflight `OPTIONS` requests are
/// answered by the permissive CORS layer.
pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route("/chat", post(handle_chat))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

async fn handle_chat(
    State(state): State<Arc<ProxyState>>,
    Json(request): Json<ProxyRequest>,
) -> (StatusCode, Json<ProxyResponse>) {
    tracing::info!(
        "Received chat request ({} prior turns)",
        request.messages.len()
    );

    match state.forward(&request).await {
        Ok(reply) => (StatusCode::OK, Json(ProxyResponse::ok(reply))),
        Err(e) => {
            tracing::error!("Chat request failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ProxyResponse::err(e.to_string())),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_messages_order() {
        let request = ProxyRequest {
            message: "newest".to_string(),
            messages: vec![
                WireMessage::new("user", "first"),
                WireMessage::new("assistant", "second"),
            ],
        };

        let messages = assemble_messages(&request);
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[0].content, SYSTEM_PROMPT);
        assert_eq!(messages[1].content, "first");
        assert_eq!(messages[2].content, "second");
        assert_eq!(messages[3].role, "user");
        assert_eq!(messages[3].content, "newest");
    }

    #[test]
    fn test_assemble_messages_empty_history() {
        let request = ProxyRequest {
            message: "Hi".to_string(),
            messages: Vec::new(),
        };

        let messages = assemble_messages(&request);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[1].content, "Hi");
    }
}
