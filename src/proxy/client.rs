//! Completion proxy client
//!
//! Defines the [`CompletionClient`] trait the session manager depends on,
//! along with the HTTP implementation that talks to a running proxy.

use crate::error::{ConverseError, Result};
use crate::proxy::wire::{ProxyRequest, ProxyResponse, WireMessage};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Client seam for the remote completion proxy
///
/// The session manager drives its request/response cycle through this
/// trait so tests can substitute a scripted backend.
///
/// # Examples
///
/// ```no_run
/// use converse::proxy::{CompletionClient, HttpProxyClient};
/// use converse::proxy::wire::WireMessage;
///
/// # async fn example() -> converse::error::Result<()> {
/// let client = HttpProxyClient::new("http://127.0.0.1:8787/chat")?;
/// let history: Vec<WireMessage> = Vec::new();
/// let reply = client.complete("Hello!", &history).await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Submits a new user message plus prior turns, returning the
    /// generated reply text
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success proxy
    /// response, or a malformed payload. The session manager recovers
    /// all of these into a generic user-facing notice.
    async fn complete(&self, message: &str, history: &[WireMessage]) -> Result<String>;
}

/// HTTP client for a running completion proxy
pub struct HttpProxyClient {
    client: Client,
    url: String,
}

impl HttpProxyClient {
    /// Create a new proxy client
    ///
    /// # Arguments
    ///
    /// * `url` - Full URL of the proxy chat endpoint
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent("converse/0.3.0")
            .build()
            .map_err(|e| ConverseError::Proxy(format!("Failed to create HTTP client: {}", e)))?;

        let url = url.into();
        tracing::debug!("Initialized proxy client for {}", url);

        Ok(Self { client, url })
    }

    /// The proxy endpoint this client talks to
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CompletionClient for HttpProxyClient {
    async fn complete(&self, message: &str, history: &[WireMessage]) -> Result<String> {
        let request = ProxyRequest {
            message: message.to_string(),
            messages: history.to_vec(),
        };

        tracing::debug!(
            "Sending message to proxy ({} prior turns)",
            request.messages.len()
        );

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Proxy request failed: {}", e);
                ConverseError::Proxy(format!("Request failed: {}", e))
            })?;

        let status = response.status();
        let body: ProxyResponse = response.json().await.map_err(|e| {
            tracing::warn!("Malformed proxy response: {}", e);
            ConverseError::Proxy(format!("Malformed response: {}", e))
        })?;

        if !status.is_success() || !body.success {
            let detail = body.error.unwrap_or_else(|| format!("status {}", status));
            tracing::warn!("Proxy returned failure: {}", detail);
            return Err(ConverseError::Proxy(detail).into());
        }

        body.response.ok_or_else(|| {
            tracing::warn!("Proxy success response missing reply text");
            ConverseError::Proxy("Response missing reply text".to_string()).into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_complete_returns_reply_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(body_partial_json(json!({"message": "Hi"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": true, "response": "Hello!"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpProxyClient::new(format!("{}/chat", server.uri())).unwrap();
        let reply = client.complete("Hi", &[]).await.unwrap();
        assert_eq!(reply, "Hello!");
    }

    #[tokio::test]
    async fn test_complete_sends_history_in_order() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(body_partial_json(json!({
                "messages": [
                    {"role": "user", "content": "first"},
                    {"role": "assistant", "content": "second"}
                ]
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": true, "response": "ok"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let history = vec![
            WireMessage::new("user", "first"),
            WireMessage::new("assistant", "second"),
        ];
        let client = HttpProxyClient::new(format!("{}/chat", server.uri())).unwrap();
        client.complete("third", &history).await.unwrap();
    }

    #[tokio::test]
    async fn test_complete_rejects_failure_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(json!({"success": false, "error": "boom"})),
            )
            .mount(&server)
            .await;

        let client = HttpProxyClient::new(format!("{}/chat", server.uri())).unwrap();
        let err = client.complete("Hi", &[]).await.unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn test_complete_rejects_success_flag_false_on_200() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": false, "error": "not today"})),
            )
            .mount(&server)
            .await;

        let client = HttpProxyClient::new(format!("{}/chat", server.uri())).unwrap();
        assert!(client.complete("Hi", &[]).await.is_err());
    }

    #[tokio::test]
    async fn test_complete_rejects_malformed_payload() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = HttpProxyClient::new(format!("{}/chat", server.uri())).unwrap();
        assert!(client.complete("Hi", &[]).await.is_err());
    }

    #[tokio::test]
    async fn test_complete_rejects_missing_reply_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .mount(&server)
            .await;

        let client = HttpProxyClient::new(format!("{}/chat", server.uri())).unwrap();
        assert!(client.complete("Hi", &[]).await.is_err());
    }
}
