//! Record types returned by the conversation store

use crate::session::StoredMessage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A fully loaded conversation record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChat {
    /// Assigned by the store on create
    pub id: String,
    /// Owning identity; conversations are scoped per owner
    pub owner_id: String,
    /// Derived from the first user message unless overridden
    pub title: String,
    /// Persisted turns in insertion order, welcome turn excluded
    pub messages: Vec<StoredMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing row for the browsing surface
///
/// Carries the message count instead of the full message list.
#[derive(Debug, Clone)]
pub struct ChatSummary {
    pub id: String,
    pub title: String,
    pub message_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
