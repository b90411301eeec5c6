use crate::cli::HistoryCommand;
use crate::config::Config;
use crate::error::Result;
use crate::persona;
use crate::session::{Message, Role, StoredMessage};
use crate::storage::{ChatStore, ChatSummary};
use colored::Colorize;
use prettytable::{format, Table};

/// Handle history commands
pub fn handle_history(config: &Config, command: HistoryCommand) -> Result<()> {
    let store = ChatStore::new()?;

    match command {
        HistoryCommand::List { search, owner } => {
            let Some(owner) = config.resolve_owner(owner) else {
                println!("{}", "No owner configured; nothing is saved.".yellow());
                return Ok(());
            };

            let chats = match store.list_by_owner(&owner) {
                Ok(chats) => chats,
                Err(e) => {
                    tracing::error!("Listing conversations failed: {}", e);
                    println!("{}", persona::LOAD_FAILED_NOTICE.red());
                    return Ok(());
                }
            };

            let chats: Vec<ChatSummary> = match &search {
                Some(term) => {
                    let needle = term.to_lowercase();
                    chats
                        .into_iter()
                        .filter(|c| c.title.to_lowercase().contains(&needle))
                        .collect()
                }
                None => chats,
            };

            if chats.is_empty() {
                let notice = if search.is_some() {
                    "No chats found"
                } else {
                    "No saved chats yet"
                };
                println!("{}", notice.yellow());
                return Ok(());
            }

            print_chat_table(&chats);
            println!(
                "Use {} to resume a conversation.",
                "converse chat --resume <ID>".cyan()
            );
            println!();
        }
        HistoryCommand::Show { id } => match store.load(&id)? {
            Some(chat) => {
                println!("\n{} ({})", chat.title.bold(), chat.id.cyan());
                println!(
                    "Updated {}\n",
                    chat.updated_at.format("%Y-%m-%d %H:%M").to_string().dimmed()
                );
                for stored in chat.messages {
                    print_stored_message(&stored)?;
                }
            }
            None => println!("{}", format!("No conversation matching '{}'", id).yellow()),
        },
        HistoryCommand::Delete { id } => {
            if let Err(e) = store.delete(&id) {
                tracing::error!("Deleting conversation failed: {}", e);
                println!("{}", persona::DELETE_FAILED_NOTICE.red());
                return Ok(());
            }
            println!("{}", persona::CHAT_DELETED_NOTICE.green());
        }
    }

    Ok(())
}

/// Print a listing table of saved conversations
pub fn print_chat_table(chats: &[ChatSummary]) {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "ID".bold(),
        "Title".bold(),
        "Messages".bold(),
        "Last Updated".bold()
    ]);

    for chat in chats {
        let id_short = &chat.id[..8.min(chat.id.len())];
        let title = if chat.title.chars().count() > 40 {
            let cut: String = chat.title.chars().take(37).collect();
            format!("{}...", cut)
        } else {
            chat.title.clone()
        };
        let updated = chat.updated_at.format("%Y-%m-%d %H:%M").to_string();

        table.add_row(prettytable::row![
            id_short.cyan(),
            title,
            chat.message_count,
            updated
        ]);
    }

    println!("\nSaved conversations:");
    table.printstd();
    println!();
}

/// Print one persisted turn in transcript form
fn print_stored_message(stored: &StoredMessage) -> Result<()> {
    let message = stored.clone().into_message()?;
    print_message(&message);
    Ok(())
}

/// Print one turn in transcript form
pub fn print_message(message: &Message) {
    let label = match message.role {
        Role::User => "you".cyan().bold(),
        Role::Assistant => "assistant".green().bold(),
    };
    let stamp = message.created_at.format("%H:%M").to_string();
    println!("{} {}", label, stamp.dimmed());
    println!("{}\n", message.content);
}
