//! Conversation session management
//!
//! This module implements the core session manager: it owns the ordered
//! message list for the active conversation, drives the request/response
//! cycle against the completion proxy, and synchronizes the list with the
//! conversation store.

use crate::error::Result;
use crate::proxy::wire::WireMessage;
use crate::proxy::CompletionClient;
use crate::storage::{ChatStore, StoredChat};

pub mod message;
pub use message::{derive_title, Message, Role, StoredMessage, TITLE_MAX_CHARS};

/// Number of non-welcome messages that triggers an auto-save after a
/// successful exchange.
pub const AUTOSAVE_THRESHOLD: usize = 2;

/// Result of a [`ChatSession::send_message`] call
///
/// Every failure mode is recovered into an outcome; the caller decides
/// how to present it and never sees raw error detail.
#[derive(Debug, PartialEq)]
pub enum SendOutcome {
    /// Whitespace-only input; state untouched, no request issued
    Ignored,
    /// A request is already outstanding; state untouched
    Busy,
    /// The assistant replied and was appended to the list
    Replied {
        reply: Message,
        /// What the post-exchange auto-save did
        save: SaveReport,
    },
    /// The exchange failed; the user turn is retained, detail is logged
    Failed,
}

/// What a persist attempt did
#[derive(Debug, Clone, PartialEq)]
pub enum SaveReport {
    /// Nothing to save: no owner, or no non-welcome messages, or below
    /// the auto-save threshold
    Skipped,
    /// A new conversation was created and the session bound to its id
    Created(String),
    /// The bound conversation was updated
    Updated,
    /// An auto-save failed; in-memory state is unaffected
    Failed,
}

/// Manages the active conversation for one user
///
/// The session starts with the synthetic welcome turn, appends a user
/// turn per submission, exchanges the history with the completion proxy,
/// and persists the transcript once the auto-save threshold is crossed.
/// All mutations happen sequentially on the caller's thread of control;
/// the proxy call is the only suspension point.
pub struct ChatSession {
    messages: Vec<Message>,
    chat_id: Option<String>,
    loading: bool,
    saving: bool,
    owner: Option<String>,
    client: Box<dyn CompletionClient>,
    store: ChatStore,
}

impl ChatSession {
    /// Create a session bound to a proxy client and a store
    ///
    /// Conversations are persisted under `owner`; with no owner the
    /// session still chats but never persists.
    pub fn new(client: Box<dyn CompletionClient>, store: ChatStore, owner: Option<String>) -> Self {
        Self {
            messages: vec![Message::welcome()],
            chat_id: None,
            loading: false,
            saving: false,
            owner,
            client,
            store,
        }
    }

    /// Submit a user message and exchange it with the completion proxy
    ///
    /// The user turn is appended immediately so it renders before the
    /// reply arrives, and stays in the list even if the exchange fails.
    /// While a request is outstanding the loading flag is authoritative:
    /// a second call returns [`SendOutcome::Busy`] without touching
    /// state.
    pub async fn send_message(&mut self, text: &str) -> SendOutcome {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return SendOutcome::Ignored;
        }
        if self.loading {
            tracing::debug!("Rejecting send: a request is already outstanding");
            return SendOutcome::Busy;
        }

        // History is the list as it stood before this turn, welcome
        // excluded; the new text rides in the request's message field.
        let history: Vec<WireMessage> = self
            .messages
            .iter()
            .filter(|m| !m.is_welcome())
            .map(Message::to_wire)
            .collect();

        self.messages.push(Message::user(trimmed));
        self.loading = true;

        let result = self.client.complete(trimmed, &history).await;
        self.loading = false;

        match result {
            Ok(reply_text) => {
                let reply = Message::assistant(reply_text);
                self.messages.push(reply.clone());

                let save = if self.non_welcome_count() >= AUTOSAVE_THRESHOLD {
                    match self.persist(None) {
                        Ok(report) => report,
                        Err(e) => {
                            tracing::warn!("Auto-save failed: {}", e);
                            SaveReport::Failed
                        }
                    }
                } else {
                    SaveReport::Skipped
                };

                SendOutcome::Replied { reply, save }
            }
            Err(e) => {
                tracing::warn!("Exchange failed: {}", e);
                SendOutcome::Failed
            }
        }
    }

    /// Persist the current transcript
    ///
    /// No-op when the session has no owner or only the welcome turn.
    /// Bound sessions update their record; unbound sessions create one
    /// and bind to the assigned id. A failed persist leaves the
    /// in-memory list untouched so the user may retry.
    pub fn persist(&mut self, title: Option<&str>) -> Result<SaveReport> {
        let Some(owner) = self.owner.clone() else {
            tracing::debug!("Skipping persist: no owner");
            return Ok(SaveReport::Skipped);
        };

        let stored: Vec<StoredMessage> = self
            .messages
            .iter()
            .filter(|m| !m.is_welcome())
            .map(StoredMessage::from_message)
            .collect();

        if stored.is_empty() {
            return Ok(SaveReport::Skipped);
        }

        let title = match title {
            Some(t) => t.to_string(),
            None => {
                let source = self
                    .messages
                    .iter()
                    .find(|m| !m.is_welcome() && m.role == Role::User)
                    .or_else(|| self.messages.iter().find(|m| !m.is_welcome()))
                    .map(|m| m.content.as_str())
                    .unwrap_or_default();
                derive_title(source)
            }
        };

        self.saving = true;
        let result = match &self.chat_id {
            Some(id) => self
                .store
                .update(id, &title, &stored)
                .map(|_| SaveReport::Updated),
            None => self
                .store
                .create(&owner, &title, &stored)
                .map(SaveReport::Created),
        };
        self.saving = false;

        match result {
            Ok(SaveReport::Created(id)) => {
                self.chat_id = Some(id.clone());
                tracing::info!("Saved new conversation {}", id);
                Ok(SaveReport::Created(id))
            }
            Ok(report) => {
                tracing::debug!("Saved conversation update");
                Ok(report)
            }
            Err(e) => Err(e),
        }
    }

    /// Replace the active list with a persisted conversation
    ///
    /// The list becomes the welcome turn followed by the rehydrated
    /// messages, and the session binds to the conversation's id. Any
    /// unsaved in-progress conversation is discarded.
    pub fn load_conversation(&mut self, chat: &StoredChat) -> Result<()> {
        let mut messages = Vec::with_capacity(chat.messages.len() + 1);
        messages.push(Message::welcome());
        for stored in &chat.messages {
            messages.push(stored.clone().into_message()?);
        }

        self.messages = messages;
        self.chat_id = Some(chat.id.clone());
        tracing::info!(
            "Loaded conversation {} ({} turns)",
            chat.id,
            chat.messages.len()
        );
        Ok(())
    }

    /// Reset to a fresh session, discarding any unsaved messages
    pub fn start_new_chat(&mut self) {
        self.messages = vec![Message::welcome()];
        self.chat_id = None;
        tracing::debug!("Started new chat");
    }

    /// Invalidation callback from the browsing surface
    ///
    /// After a conversation is deleted from the store, the session clears
    /// its binding if it pointed at the deleted record, so a later
    /// persist creates a fresh conversation instead of updating a
    /// nonexistent one.
    pub fn notify_deleted(&mut self, id: &str) {
        if self.chat_id.as_deref() == Some(id) {
            tracing::debug!("Clearing binding to deleted conversation {}", id);
            self.chat_id = None;
        }
    }

    /// All turns in display order, welcome turn first
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Id of the bound conversation, if any
    pub fn chat_id(&self) -> Option<&str> {
        self.chat_id.as_deref()
    }

    /// True while a proxy exchange is outstanding
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// True while a persist is in progress
    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Owning identity for persistence, if any
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// Store handle, shared with the browsing surface
    pub fn store(&self) -> &ChatStore {
        &self.store
    }

    /// Number of turns excluding the welcome banner
    pub fn non_welcome_count(&self) -> usize {
        self.messages.iter().filter(|m| !m.is_welcome()).count()
    }
}
