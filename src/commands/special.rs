//! Special commands parser for interactive chat sessions
//!
//! Special commands let the user manage the session without sending a
//! message to the assistant: start a new chat, save, list, load, or
//! delete saved conversations, and exit. Commands are prefixed with `/`
//! and are case-insensitive; arguments keep their original case.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
///
/// These commands modify the session state or provide information,
/// rather than being sent to the assistant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Start a fresh conversation, discarding unsaved messages
    NewChat,

    /// Save the current conversation, optionally under an explicit title
    Save(Option<String>),

    /// List saved conversations
    List,

    /// Load a saved conversation by id or 8-char prefix
    Load(String),

    /// Delete a saved conversation by id or 8-char prefix
    Delete(String),

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command; the input is a message for the assistant
    None,
}

/// Parse a user input string into a special command
///
/// # Examples
///
/// ```
/// use converse::commands::special::{parse_special_command, SpecialCommand};
///
/// let cmd = parse_special_command("/new").unwrap();
/// assert_eq!(cmd, SpecialCommand::NewChat);
///
/// let cmd = parse_special_command("/save My chat title").unwrap();
/// assert_eq!(cmd, SpecialCommand::Save(Some("My chat title".to_string())));
///
/// let cmd = parse_special_command("hello there").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// // Invalid command returns error
/// assert!(parse_special_command("/frobnicate").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    // If input doesn't start with "/", it's not a command (except exit/quit)
    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    match lower.as_str() {
        "/new" => Ok(SpecialCommand::NewChat),

        "/save" => Ok(SpecialCommand::Save(None)),

        "/list" => Ok(SpecialCommand::List),

        "/load" => Err(CommandError::MissingArgument {
            command: "/load".to_string(),
            usage: "/load <id>".to_string(),
        }),

        "/delete" => Err(CommandError::MissingArgument {
            command: "/delete".to_string(),
            usage: "/delete <id>".to_string(),
        }),

        "/help" | "/?" => Ok(SpecialCommand::Help),

        "exit" | "quit" | "/exit" | "/quit" => Ok(SpecialCommand::Exit),

        _ if lower.starts_with("/save ") => {
            // Title keeps the user's casing
            let title = trimmed[6..].trim();
            if title.is_empty() {
                Ok(SpecialCommand::Save(None))
            } else {
                Ok(SpecialCommand::Save(Some(title.to_string())))
            }
        }

        _ if lower.starts_with("/load ") => {
            let id = trimmed[6..].trim();
            if id.is_empty() {
                Err(CommandError::MissingArgument {
                    command: "/load".to_string(),
                    usage: "/load <id>".to_string(),
                })
            } else {
                Ok(SpecialCommand::Load(id.to_string()))
            }
        }

        _ if lower.starts_with("/delete ") => {
            let id = trimmed[8..].trim();
            if id.is_empty() {
                Err(CommandError::MissingArgument {
                    command: "/delete".to_string(),
                    usage: "/delete <id>".to_string(),
                })
            } else {
                Ok(SpecialCommand::Delete(id.to_string()))
            }
        }

        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

/// Print help for the interactive session
pub fn print_help() {
    println!("\nAvailable commands:");
    println!("  /new              Start a fresh conversation (unsaved messages are discarded)");
    println!("  /save [title]     Save the conversation, optionally with an explicit title");
    println!("  /list             List saved conversations");
    println!("  /load <id>        Load a saved conversation (full id or 8-char prefix)");
    println!("  /delete <id>      Delete a saved conversation");
    println!("  /help             Show this help");
    println!("  /exit             Leave the session (also: exit, quit)");
    println!("\nAnything else is sent to the assistant.\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_new() {
        assert_eq!(
            parse_special_command("/new").unwrap(),
            SpecialCommand::NewChat
        );
        assert_eq!(
            parse_special_command("/NEW").unwrap(),
            SpecialCommand::NewChat
        );
    }

    #[test]
    fn test_parse_save_without_title() {
        assert_eq!(
            parse_special_command("/save").unwrap(),
            SpecialCommand::Save(None)
        );
        assert_eq!(
            parse_special_command("/save   ").unwrap(),
            SpecialCommand::Save(None)
        );
    }

    #[test]
    fn test_parse_save_with_title_preserves_case() {
        assert_eq!(
            parse_special_command("/save Debugging Session").unwrap(),
            SpecialCommand::Save(Some("Debugging Session".to_string()))
        );
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_special_command("/list").unwrap(), SpecialCommand::List);
    }

    #[test]
    fn test_parse_load_with_id() {
        assert_eq!(
            parse_special_command("/load abcdef12").unwrap(),
            SpecialCommand::Load("abcdef12".to_string())
        );
    }

    #[test]
    fn test_parse_load_without_id_is_error() {
        assert!(matches!(
            parse_special_command("/load"),
            Err(CommandError::MissingArgument { .. })
        ));
    }

    #[test]
    fn test_parse_delete_with_id() {
        assert_eq!(
            parse_special_command("/delete abcdef12").unwrap(),
            SpecialCommand::Delete("abcdef12".to_string())
        );
    }

    #[test]
    fn test_parse_delete_without_id_is_error() {
        assert!(matches!(
            parse_special_command("/delete"),
            Err(CommandError::MissingArgument { .. })
        ));
    }

    #[test]
    fn test_parse_help_aliases() {
        assert_eq!(parse_special_command("/help").unwrap(), SpecialCommand::Help);
        assert_eq!(parse_special_command("/?").unwrap(), SpecialCommand::Help);
    }

    #[test]
    fn test_parse_exit_aliases() {
        for input in ["exit", "quit", "/exit", "/quit", "EXIT"] {
            assert_eq!(
                parse_special_command(input).unwrap(),
                SpecialCommand::Exit,
                "input: {}",
                input
            );
        }
    }

    #[test]
    fn test_regular_message_is_not_a_command() {
        assert_eq!(
            parse_special_command("how do I test this?").unwrap(),
            SpecialCommand::None
        );
    }

    #[test]
    fn test_unknown_slash_command_is_error() {
        assert!(matches!(
            parse_special_command("/frobnicate"),
            Err(CommandError::UnknownCommand(_))
        ));
    }
}
