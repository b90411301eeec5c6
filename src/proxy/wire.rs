//! Wire types shared by the proxy client and server

use serde::{Deserialize, Serialize};

/// One prior turn as sent to the completion proxy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    /// `"user"`, `"assistant"`, or `"system"` (the latter only on the
    /// provider side of the proxy)
    pub role: String,
    pub content: String,
}

impl WireMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    /// System-instruction turn, used when the proxy assembles the
    /// provider request
    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }
}

/// Request body accepted by the proxy
///
/// `message` is the new user turn; `messages` is the prior history in
/// original order, welcome turn excluded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyRequest {
    pub message: String,
    #[serde(default)]
    pub messages: Vec<WireMessage>,
}

/// Response body returned by the proxy
///
/// Success carries `response`; failure carries a summarized `error`
/// string and a non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProxyResponse {
    pub fn ok(response: impl Into<String>) -> Self {
        Self {
            success: true,
            response: Some(response.into()),
            error: None,
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            response: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_request_serialization_shape() {
        let request = ProxyRequest {
            message: "Hi".to_string(),
            messages: vec![WireMessage::new("user", "earlier")],
        };
        let json = serde_json::to_value(&request).expect("serialize failed");
        assert_eq!(json["message"], "Hi");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "earlier");
    }

    #[test]
    fn test_proxy_request_messages_default_to_empty() {
        let request: ProxyRequest =
            serde_json::from_str(r#"{"message": "Hi"}"#).expect("deserialize failed");
        assert!(request.messages.is_empty());
    }

    #[test]
    fn test_proxy_response_success_omits_error() {
        let json = serde_json::to_value(ProxyResponse::ok("Hello!")).expect("serialize failed");
        assert_eq!(json["success"], true);
        assert_eq!(json["response"], "Hello!");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_proxy_response_failure_omits_response() {
        let json = serde_json::to_value(ProxyResponse::err("boom")).expect("serialize failed");
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "boom");
        assert!(json.get("response").is_none());
    }

    #[test]
    fn test_wire_message_system_constructor() {
        let msg = WireMessage::system("instructions");
        assert_eq!(msg.role, "system");
        assert_eq!(msg.content, "instructions");
    }
}
