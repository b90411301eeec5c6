//! Command-line interface definition for Converse
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for chatting, serving the completion proxy, and
//! browsing conversation history.

use clap::{Parser, Subcommand};

/// Converse - conversational AI chat CLI
///
/// Chat with a completion provider through a local proxy, persist
/// transcripts, and browse past conversations.
#[derive(Parser, Debug, Clone)]
#[command(name = "converse")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the conversation history database path
    #[arg(long)]
    pub storage_path: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Converse
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Override the proxy endpoint from config
        #[arg(long)]
        proxy_url: Option<String>,

        /// Override the owning identity used for saved conversations
        #[arg(long)]
        owner: Option<String>,

        /// Resume a saved conversation (full id or 8-char prefix)
        #[arg(short, long)]
        resume: Option<String>,
    },

    /// Run the completion proxy service
    Serve {
        /// Override the bind address from config
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Browse saved conversations
    History {
        /// History subcommand
        #[command(subcommand)]
        command: HistoryCommand,
    },
}

/// History subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum HistoryCommand {
    /// List saved conversations, most recently updated first
    List {
        /// Only show conversations whose title contains this text
        #[arg(short, long)]
        search: Option<String>,

        /// Override the owning identity
        #[arg(long)]
        owner: Option<String>,
    },

    /// Print a saved conversation transcript
    Show {
        /// Conversation id (full id or 8-char prefix)
        id: String,
    },

    /// Delete a saved conversation
    Delete {
        /// Conversation id (full id or 8-char prefix)
        id: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
