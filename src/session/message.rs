//! Message types and the role encodings used at the two wire boundaries
//!
//! A [`Message`] is the in-memory turn held by a session. The same turn
//! has two external shapes: `{role: "user"|"assistant"}` toward the
//! completion proxy and `{isUser: bool}` toward the store. Both mappings
//! live on [`Role`] so no other module re-derives them.

use crate::error::{ConverseError, Result};
use crate::persona::WELCOME_ID;
use crate::proxy::wire::WireMessage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Character budget for a derived conversation title.
pub const TITLE_MAX_CHARS: usize = 50;

/// Sender of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// A turn typed by the user
    User,
    /// A turn produced by the assistant (including the welcome banner)
    Assistant,
}

impl Role {
    /// Role string used at the completion-proxy boundary.
    ///
    /// # Examples
    ///
    /// ```
    /// use converse::session::Role;
    ///
    /// assert_eq!(Role::User.as_wire(), "user");
    /// assert_eq!(Role::Assistant.as_wire(), "assistant");
    /// ```
    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Boolean encoding used at the persistence boundary.
    pub fn is_user(&self) -> bool {
        matches!(self, Self::User)
    }

    /// Inverse of [`Role::is_user`].
    ///
    /// # Examples
    ///
    /// ```
    /// use converse::session::Role;
    ///
    /// assert_eq!(Role::from_is_user(true), Role::User);
    /// assert_eq!(Role::from_is_user(false), Role::Assistant);
    /// ```
    pub fn from_is_user(is_user: bool) -> Self {
        if is_user {
            Self::User
        } else {
            Self::Assistant
        }
    }
}

/// A single turn in the active conversation
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Unique within a session; `"welcome"` is reserved for the banner
    pub id: String,
    /// Text body, may span multiple lines
    pub content: String,
    /// Sender of the turn
    pub role: Role,
    /// Set at creation, immutable afterwards
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Creates a user turn with a fresh id
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            role: Role::User,
            created_at: Utc::now(),
        }
    }

    /// Creates an assistant turn with a fresh id
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            role: Role::Assistant,
            created_at: Utc::now(),
        }
    }

    /// Creates the synthetic welcome turn
    pub fn welcome() -> Self {
        Self {
            id: WELCOME_ID.to_string(),
            content: crate::persona::WELCOME_MESSAGE.to_string(),
            role: Role::Assistant,
            created_at: Utc::now(),
        }
    }

    /// True for the reserved welcome turn, which is never sent to the
    /// proxy and never persisted
    pub fn is_welcome(&self) -> bool {
        self.id == WELCOME_ID
    }

    /// Shape of this turn at the completion-proxy boundary
    pub fn to_wire(&self) -> WireMessage {
        WireMessage {
            role: self.role.as_wire().to_string(),
            content: self.content.clone(),
        }
    }
}

/// Persisted shape of a turn
///
/// The role is encoded as `isUser` here, distinct from the role string
/// used toward the proxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: String,
    pub content: String,
    #[serde(rename = "isUser")]
    pub is_user: bool,
    /// RFC-3339 timestamp string
    pub timestamp: String,
}

impl StoredMessage {
    /// Converts an in-memory turn to its persisted shape
    pub fn from_message(message: &Message) -> Self {
        Self {
            id: message.id.clone(),
            content: message.content.clone(),
            is_user: message.role.is_user(),
            timestamp: message.created_at.to_rfc3339(),
        }
    }

    /// Rehydrates an in-memory turn from its persisted shape
    ///
    /// # Errors
    ///
    /// Returns `ConverseError::Storage` if the timestamp is not valid
    /// RFC-3339.
    pub fn into_message(self) -> Result<Message> {
        let created_at = DateTime::parse_from_rfc3339(&self.timestamp)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                ConverseError::Storage(format!("Invalid message timestamp '{}': {}", self.timestamp, e))
            })?;

        Ok(Message {
            id: self.id,
            content: self.content,
            role: Role::from_is_user(self.is_user),
            created_at,
        })
    }
}

/// Derives a conversation title from the first user message
///
/// Text of at most [`TITLE_MAX_CHARS`] characters is used verbatim;
/// longer text is cut to the budget with an ellipsis marker appended.
///
/// # Examples
///
/// ```
/// use converse::session::derive_title;
///
/// assert_eq!(derive_title("Hi"), "Hi");
/// let long = "x".repeat(60);
/// assert_eq!(derive_title(&long), format!("{}...", "x".repeat(50)));
/// ```
pub fn derive_title(text: &str) -> String {
    if text.chars().count() > TITLE_MAX_CHARS {
        let truncated: String = text.chars().take(TITLE_MAX_CHARS).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}
