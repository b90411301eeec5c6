//! Converse - conversational AI chat library
//!
//! This library provides the core functionality for the Converse chat
//! CLI: the conversation session manager, the completion proxy (client
//! and service), conversation persistence, and configuration.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: Core session manager, message types, and role encodings
//! - `proxy`: Completion proxy wire contract, HTTP client, and axum service
//! - `storage`: Conversation persistence over SQLite
//! - `persona`: Fixed assistant persona and user-facing notices
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use converse::config::Config;
//! use converse::proxy::HttpProxyClient;
//! use converse::session::ChatSession;
//! use converse::storage::ChatStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml")?;
//!     config.validate()?;
//!
//!     let client = HttpProxyClient::new(&config.proxy.url)?;
//!     let store = ChatStore::new()?;
//!     let mut session = ChatSession::new(Box::new(client), store, Some("alice".into()));
//!
//!     session.send_message("Hello!").await;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod persona;
pub mod proxy;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use error::{ConverseError, Result};
pub use proxy::{CompletionClient, HttpProxyClient};
pub use session::{ChatSession, Message, Role, SaveReport, SendOutcome};
pub use storage::ChatStore;
