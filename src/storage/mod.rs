use crate::error::{ConverseError, Result};
use crate::session::StoredMessage;
use anyhow::Context;
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;
use uuid::Uuid;

pub mod types;
pub use types::{ChatSummary, StoredChat};

/// Storage backend for conversation history
pub struct ChatStore {
    db_path: PathBuf,
}

impl ChatStore {
    /// Create a new storage instance
    ///
    /// Initializes the database file in the user's data directory.
    pub fn new() -> Result<Self> {
        // Allow override of the history DB path via environment variable.
        // This makes it easy to point the binary at a test DB or alternate
        // file without changing the user's application data dir.
        if let Ok(override_path) = std::env::var("CONVERSE_HISTORY_DB") {
            return Self::new_with_path(override_path);
        }

        let proj_dirs = ProjectDirs::from("com", "converse-cli", "converse")
            .ok_or_else(|| ConverseError::Storage("Could not determine data directory".into()))?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)
            .context("Failed to create data directory")
            .map_err(|e| ConverseError::Storage(e.to_string()))?;

        let db_path = data_dir.join("history.db");
        let storage = Self { db_path };

        storage.init()?;

        Ok(storage)
    }

    /// Create a new storage instance that uses the specified database path.
    ///
    /// This is primarily useful for tests where the default application
    /// data directory is not desirable (for example, using a temporary
    /// directory).
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        // Ensure parent directory exists so opening the DB file succeeds.
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for database")
                .map_err(|e| ConverseError::Storage(e.to_string()))?;
        }

        let storage = Self { db_path };
        storage.init()?;
        Ok(storage)
    }

    /// Initialize the database schema
    fn init(&self) -> Result<()> {
        let conn = self.open()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS chats (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                title TEXT NOT NULL,
                messages JSON NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create tables")
        .map_err(|e| ConverseError::Storage(e.to_string()))?;

        Ok(())
    }

    fn open(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .context("Failed to open database")
            .map_err(|e| ConverseError::Storage(e.to_string()).into())
    }

    /// Create a new conversation and return its assigned id
    ///
    /// The id is generated here; callers bind their session to it on
    /// success.
    pub fn create(
        &self,
        owner_id: &str,
        title: &str,
        messages: &[StoredMessage],
    ) -> Result<String> {
        let conn = self.open()?;

        let id = Uuid::new_v4().to_string();
        let messages_json = serde_json::to_string(messages)
            .context("Failed to serialize messages")
            .map_err(|e| ConverseError::Storage(e.to_string()))?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO chats (id, user_id, title, messages, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)",
            params![id, owner_id, title, messages_json, now, now],
        )
        .context("Failed to insert conversation")
        .map_err(|e| ConverseError::Storage(e.to_string()))?;

        tracing::debug!("Created conversation {} for owner {}", id, owner_id);
        Ok(id)
    }

    /// Update an existing conversation's title and messages
    ///
    /// Refreshes `updated_at` and preserves `created_at`. Updating an id
    /// that does not exist is a storage error, not a silent no-op.
    pub fn update(&self, id: &str, title: &str, messages: &[StoredMessage]) -> Result<()> {
        let conn = self.open()?;

        let messages_json = serde_json::to_string(messages)
            .context("Failed to serialize messages")
            .map_err(|e| ConverseError::Storage(e.to_string()))?;
        let now = Utc::now().to_rfc3339();

        let affected = conn
            .execute(
                "UPDATE chats SET title = ?, messages = ?, updated_at = ? WHERE id = ?",
                params![title, messages_json, now, id],
            )
            .context("Failed to update conversation")
            .map_err(|e| ConverseError::Storage(e.to_string()))?;

        if affected == 0 {
            return Err(
                ConverseError::Storage(format!("No conversation with id {}", id)).into(),
            );
        }

        tracing::debug!("Updated conversation {}", id);
        Ok(())
    }

    /// Load a conversation by ID (supports full UUID or 8-char prefix)
    pub fn load(&self, id: &str) -> Result<Option<StoredChat>> {
        let conn = self.open()?;

        let (query, search_param) = if id.len() == 36 {
            (
                "SELECT id, user_id, title, messages, created_at, updated_at
                FROM chats WHERE id = ?",
                id.to_string(),
            )
        } else {
            (
                "SELECT id, user_id, title, messages, created_at, updated_at
                FROM chats WHERE id LIKE ?",
                format!("{}%", id),
            )
        };

        let row = conn
            .query_row(query, params![search_param], |row| {
                let id: String = row.get(0)?;
                let owner_id: String = row.get(1)?;
                let title: String = row.get(2)?;
                let messages_json: String = row.get(3)?;
                let created_at: String = row.get(4)?;
                let updated_at: String = row.get(5)?;
                Ok((id, owner_id, title, messages_json, created_at, updated_at))
            })
            .optional()
            .context("Failed to query conversation")
            .map_err(|e| ConverseError::Storage(e.to_string()))?;

        match row {
            Some((id, owner_id, title, messages_json, created_at, updated_at)) => {
                let messages: Vec<StoredMessage> = serde_json::from_str(&messages_json)
                    .context("Failed to deserialize messages")
                    .map_err(|e| ConverseError::Storage(e.to_string()))?;

                Ok(Some(StoredChat {
                    id,
                    owner_id,
                    title,
                    messages,
                    created_at: parse_timestamp(&created_at),
                    updated_at: parse_timestamp(&updated_at),
                }))
            }
            None => Ok(None),
        }
    }

    /// List all conversations belonging to an owner, most recently
    /// updated first
    pub fn list_by_owner(&self, owner_id: &str) -> Result<Vec<ChatSummary>> {
        let conn = self.open()?;

        let mut stmt = conn
            .prepare(
                "SELECT id, title, messages, created_at, updated_at
                FROM chats
                WHERE user_id = ?
                ORDER BY updated_at DESC",
            )
            .context("Failed to prepare statement")
            .map_err(|e| ConverseError::Storage(e.to_string()))?;

        let rows = stmt
            .query_map(params![owner_id], |row| {
                let id: String = row.get(0)?;
                let title: String = row.get(1)?;
                let messages_json: String = row.get(2)?;
                let created_at_str: String = row.get(3)?;
                let updated_at_str: String = row.get(4)?;

                // Count from the JSON array rather than deserializing the
                // full message structs.
                let message_count =
                    if let Ok(val) = serde_json::from_str::<serde_json::Value>(&messages_json) {
                        val.as_array().map(|a| a.len()).unwrap_or(0)
                    } else {
                        0
                    };

                Ok(ChatSummary {
                    id,
                    title,
                    message_count,
                    created_at: parse_timestamp(&created_at_str),
                    updated_at: parse_timestamp(&updated_at_str),
                })
            })
            .context("Failed to query conversations")
            .map_err(|e| ConverseError::Storage(e.to_string()))?;

        let mut summaries = Vec::new();
        for s in rows.flatten() {
            summaries.push(s);
        }

        Ok(summaries)
    }

    /// Delete a conversation (supports full UUID or 8-char prefix)
    ///
    /// Deleting an id that does not exist is not an error.
    pub fn delete(&self, id: &str) -> Result<()> {
        let conn = self.open()?;

        let (query, param) = if id.len() == 36 {
            ("DELETE FROM chats WHERE id = ?", id.to_string())
        } else {
            ("DELETE FROM chats WHERE id LIKE ?", format!("{}%", id))
        };

        conn.execute(query, params![param])
            .context("Failed to delete conversation")
            .map_err(|e| ConverseError::Storage(e.to_string()))?;

        tracing::debug!("Deleted conversation {}", id);
        Ok(())
    }
}

/// Parse a stored RFC-3339 timestamp, falling back to now on corrupt data
fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Message;
    use serial_test::serial;
    use std::env;
    use std::thread::sleep;
    use std::time::Duration;
    use tempfile::tempdir;

    /// Helper: create a temporary storage instance backed by a temp
    /// directory.
    ///
    /// Returns both the `ChatStore` and the `TempDir` so the caller keeps
    /// ownership of the directory (preventing it from being removed).
    fn create_test_store() -> (ChatStore, tempfile::TempDir) {
        let dir = tempdir().expect("failed to create tempdir");
        let db_path = dir.path().join("history.db");
        let store = ChatStore::new_with_path(db_path).expect("failed to create store");
        (store, dir)
    }

    fn stored(content: &str, is_user: bool) -> StoredMessage {
        let message = if is_user {
            Message::user(content)
        } else {
            Message::assistant(content)
        };
        StoredMessage::from_message(&message)
    }

    #[test]
    fn test_init_creates_table() {
        let (store, _dir) = create_test_store();
        let conn = Connection::open(&store.db_path).expect("open connection");
        let count: i64 = conn
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type='table' AND name='chats'",
                [],
                |r| r.get(0),
            )
            .expect("query row");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_create_assigns_id_and_persists() {
        let (store, _dir) = create_test_store();
        let messages = vec![stored("Hi", true), stored("Hello!", false)];

        let id = store.create("alice", "Hi", &messages).expect("create failed");
        assert_eq!(id.len(), 36);

        let loaded = store.load(&id).expect("load failed").expect("chat missing");
        assert_eq!(loaded.id, id);
        assert_eq!(loaded.owner_id, "alice");
        assert_eq!(loaded.title, "Hi");
        assert_eq!(loaded.messages.len(), 2);
        assert!(loaded.messages[0].is_user);
        assert!(!loaded.messages[1].is_user);
    }

    #[test]
    fn test_update_refreshes_updated_at_and_preserves_created_at() {
        let (store, _dir) = create_test_store();
        let id = store
            .create("alice", "Original", &[stored("first", true)])
            .expect("create failed");

        let before = store.load(&id).expect("load failed").unwrap();

        sleep(Duration::from_millis(10));

        store
            .update(&id, "Updated", &[stored("first", true), stored("reply", false)])
            .expect("update failed");

        let after = store.load(&id).expect("load failed").unwrap();
        assert_eq!(after.title, "Updated");
        assert_eq!(after.messages.len(), 2);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at > before.updated_at);
    }

    #[test]
    fn test_update_missing_id_is_an_error() {
        let (store, _dir) = create_test_store();
        let result = store.update("no-such-id", "Title", &[stored("x", true)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_returns_none_for_missing_id() {
        let (store, _dir) = create_test_store();
        let res = store.load("non-existent-id").expect("load failed");
        assert!(res.is_none());
    }

    #[test]
    fn test_list_by_owner_ordered_by_updated_at() {
        let (store, _dir) = create_test_store();

        let id1 = store
            .create("alice", "A", &[stored("a", true)])
            .expect("create 1 failed");

        sleep(Duration::from_millis(10));

        let id2 = store
            .create("alice", "B", &[stored("b", true)])
            .expect("create 2 failed");

        let chats = store.list_by_owner("alice").expect("list failed");
        assert_eq!(chats.len(), 2);
        // Most recently updated first
        assert_eq!(chats[0].id, id2);
        assert_eq!(chats[1].id, id1);
    }

    #[test]
    fn test_list_by_owner_scopes_to_owner() {
        let (store, _dir) = create_test_store();

        store
            .create("alice", "Alice's chat", &[stored("a", true)])
            .expect("create failed");
        store
            .create("bob", "Bob's chat", &[stored("b", true)])
            .expect("create failed");

        let chats = store.list_by_owner("alice").expect("list failed");
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0].title, "Alice's chat");
    }

    #[test]
    fn test_list_by_owner_empty_for_new_db() {
        let (store, _dir) = create_test_store();
        let chats = store.list_by_owner("nobody").expect("list failed");
        assert!(chats.is_empty());
    }

    #[test]
    fn test_summary_carries_message_count() {
        let (store, _dir) = create_test_store();
        let messages = vec![stored("a", true), stored("b", false), stored("c", true)];
        store
            .create("alice", "Count test", &messages)
            .expect("create failed");

        let chats = store.list_by_owner("alice").expect("list failed");
        assert_eq!(chats[0].message_count, 3);
    }

    #[test]
    fn test_delete_removes_record() {
        let (store, _dir) = create_test_store();
        let id = store
            .create("alice", "To delete", &[stored("x", true)])
            .expect("create failed");

        store.delete(&id).expect("delete failed");
        assert!(store.load(&id).expect("load failed").is_none());

        let chats = store.list_by_owner("alice").expect("list failed");
        assert!(chats.is_empty());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let (store, _dir) = create_test_store();
        let id = store
            .create("alice", "To delete", &[stored("x", true)])
            .expect("create failed");

        store.delete(&id).expect("first delete failed");
        store.delete(&id).expect("second delete failed");
    }

    #[test]
    fn test_load_and_delete_by_8char_prefix() {
        let (store, _dir) = create_test_store();
        let id = store
            .create("alice", "Prefix test", &[stored("x", true)])
            .expect("create failed");
        let prefix = &id[..8];

        let loaded = store.load(prefix).expect("load by prefix failed");
        assert!(loaded.is_some());
        assert_eq!(loaded.unwrap().id, id);

        store.delete(prefix).expect("delete by prefix failed");
        assert!(store.load(&id).expect("load failed").is_none());
    }

    #[test]
    fn test_messages_round_trip_through_store() {
        let (store, _dir) = create_test_store();
        let original = vec![stored("Hi", true), stored("Hello!", false)];

        let id = store.create("alice", "Hi", &original).expect("create failed");
        let loaded = store.load(&id).expect("load failed").unwrap();

        assert_eq!(loaded.messages, original);
    }

    #[test]
    #[serial]
    fn test_new_respects_env_override() {
        // Use nested path to ensure parent directory creation is exercised.
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let db_path = dir.path().join("nested").join("history.db");
        env::set_var("CONVERSE_HISTORY_DB", db_path.to_string_lossy().to_string());

        let store = ChatStore::new().expect("new failed with env override");
        assert_eq!(store.db_path, db_path);

        // Parent directory should have been created by new_with_path
        assert!(db_path.parent().unwrap().exists());

        env::remove_var("CONVERSE_HISTORY_DB");
    }
}
