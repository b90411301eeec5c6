/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes three top-level command modules:

- `chat`    — Interactive chat session
- `serve`   — Run the completion proxy service
- `history` — Browse saved conversations

These handlers are intentionally small and use the library components:
the session manager, the proxy, and the store.
*/

use crate::config::Config;
use crate::error::{ConverseError, Result};
use crate::persona;
use crate::proxy::HttpProxyClient;
use crate::session::{ChatSession, SaveReport, SendOutcome};
use crate::storage::ChatStore;

// History browsing commands
pub mod history;

// Special commands parser for the chat REPL
pub mod special;

// Chat command handler
pub mod chat {
    //! Interactive chat session handler.
    //!
    //! Instantiates the proxy client and the store, creates a
    //! `ChatSession`, and runs a readline loop that submits user input to
    //! the session manager.

    use super::*;
    use crate::commands::special::{parse_special_command, print_help, SpecialCommand};
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start an interactive chat session
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `proxy_url` - Optional override for the proxy endpoint
    /// * `owner` - Optional override for the owning identity
    /// * `resume` - Optional conversation id to resume
    pub async fn run_chat(
        config: Config,
        proxy_url: Option<String>,
        owner: Option<String>,
        resume: Option<String>,
    ) -> Result<()> {
        tracing::info!("Starting interactive chat session");

        let url = proxy_url.unwrap_or_else(|| config.proxy.url.clone());
        let owner = config.resolve_owner(owner);
        if owner.is_none() {
            tracing::warn!("No owner resolved; conversations will not be saved");
            println!(
                "{}",
                "No owner configured - this conversation will not be saved.".yellow()
            );
        }

        let client = HttpProxyClient::new(&url)?;
        let store = ChatStore::new()?;
        let mut session = ChatSession::new(Box::new(client), store, owner.clone());

        if let Some(id) = resume {
            match session.store().load(&id)? {
                Some(chat) => session.load_conversation(&chat)?,
                None => println!("{}", format!("No conversation matching '{}'", id).yellow()),
            }
        }

        print_transcript(&session);
        println!("{}", "Type /help for commands.".dimmed());

        let mut rl = DefaultEditor::new()?;

        loop {
            match rl.readline(">> ") {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(trimmed)?;

                    match parse_special_command(trimmed) {
                        Ok(SpecialCommand::NewChat) => {
                            session.start_new_chat();
                            print_transcript(&session);
                            continue;
                        }
                        Ok(SpecialCommand::Save(title)) => {
                            handle_save(&mut session, title.as_deref());
                            continue;
                        }
                        Ok(SpecialCommand::List) => {
                            handle_list(&session, owner.as_deref());
                            continue;
                        }
                        Ok(SpecialCommand::Load(id)) => {
                            handle_load(&mut session, &id);
                            continue;
                        }
                        Ok(SpecialCommand::Delete(id)) => {
                            handle_delete(&mut session, &id);
                            continue;
                        }
                        Ok(SpecialCommand::Help) => {
                            print_help();
                            continue;
                        }
                        Ok(SpecialCommand::Exit) => break,
                        Ok(SpecialCommand::None) => {}
                        Err(e) => {
                            println!("{}", e.to_string().yellow());
                            continue;
                        }
                    }

                    match session.send_message(trimmed).await {
                        SendOutcome::Replied { reply, save } => {
                            history::print_message(&reply);
                            match save {
                                SaveReport::Created(id) => {
                                    println!("{}", format!("Saved as {}", &id[..8]).dimmed());
                                }
                                SaveReport::Failed => {
                                    println!("{}", persona::SAVE_FAILED_NOTICE.yellow());
                                }
                                SaveReport::Updated | SaveReport::Skipped => {}
                            }
                        }
                        SendOutcome::Failed => {
                            println!("{}", persona::SEND_FAILED_NOTICE.red());
                        }
                        SendOutcome::Busy => {
                            println!("{}", "Still waiting on the previous message.".yellow());
                        }
                        SendOutcome::Ignored => {}
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }

    /// Print the whole active transcript, welcome turn included
    fn print_transcript(session: &ChatSession) {
        println!();
        for message in session.messages() {
            history::print_message(message);
        }
    }

    fn handle_save(session: &mut ChatSession, title: Option<&str>) {
        match session.persist(title) {
            Ok(SaveReport::Skipped) => {
                println!("{}", "Nothing to save yet.".yellow());
            }
            Ok(_) => println!("{}", persona::CHAT_SAVED_NOTICE.green()),
            Err(e) => {
                tracing::error!("Manual save failed: {}", e);
                println!("{}", persona::SAVE_FAILED_NOTICE.red());
            }
        }
    }

    fn handle_list(session: &ChatSession, owner: Option<&str>) {
        let Some(owner) = owner else {
            println!("{}", "No owner configured; nothing is saved.".yellow());
            return;
        };

        match session.store().list_by_owner(owner) {
            Ok(chats) if chats.is_empty() => {
                println!("{}", "No saved chats yet".yellow());
            }
            Ok(chats) => history::print_chat_table(&chats),
            Err(e) => {
                tracing::error!("Listing conversations failed: {}", e);
                println!("{}", persona::LOAD_FAILED_NOTICE.red());
            }
        }
    }

    fn handle_load(session: &mut ChatSession, id: &str) {
        let chat = match session.store().load(id) {
            Ok(chat) => chat,
            Err(e) => {
                tracing::error!("Loading conversation failed: {}", e);
                println!("{}", persona::LOAD_FAILED_NOTICE.red());
                return;
            }
        };

        match chat {
            Some(chat) => match session.load_conversation(&chat) {
                Ok(()) => print_transcript(session),
                Err(e) => {
                    tracing::error!("Loading conversation failed: {}", e);
                    println!("{}", persona::LOAD_FAILED_NOTICE.red());
                }
            },
            None => println!("{}", format!("No conversation matching '{}'", id).yellow()),
        }
    }

    fn handle_delete(session: &mut ChatSession, id: &str) {
        // Resolve a prefix to the full id first so the session binding
        // can be invalidated precisely.
        let full_id = match session.store().load(id) {
            Ok(Some(chat)) => chat.id,
            Ok(None) => {
                println!("{}", format!("No conversation matching '{}'", id).yellow());
                return;
            }
            Err(e) => {
                tracing::error!("Deleting conversation failed: {}", e);
                println!("{}", persona::DELETE_FAILED_NOTICE.red());
                return;
            }
        };

        match session.store().delete(&full_id) {
            Ok(()) => {
                session.notify_deleted(&full_id);
                println!("{}", persona::CHAT_DELETED_NOTICE.green());
            }
            Err(e) => {
                tracing::error!("Deleting conversation failed: {}", e);
                println!("{}", persona::DELETE_FAILED_NOTICE.red());
            }
        }
    }
}

// Serve command handler
pub mod serve {
    //! Completion proxy service handler.

    use super::*;
    use crate::proxy::{router, ProxyState};
    use std::net::SocketAddr;

    /// Run the completion proxy service until interrupted
    pub async fn run_serve(config: Config, bind: Option<String>) -> Result<()> {
        let bind = bind.unwrap_or_else(|| config.server.bind.clone());
        let addr: SocketAddr = bind
            .parse()
            .map_err(|e| ConverseError::Config(format!("Invalid bind address: {}", e)))?;

        let state = ProxyState::new(config.provider.clone())?;
        let app = router(state);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Completion proxy listening on {}", addr);

        axum::serve(listener, app).await?;
        Ok(())
    }
}
