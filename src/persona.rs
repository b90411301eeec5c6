//! Fixed assistant persona and user-facing notice strings
//!
//! The welcome banner shown at session start and the system prompt the
//! proxy prepends to every provider request describe the same persona.
//! Edit them together.

/// Reserved identifier for the synthetic welcome message.
///
/// A message carrying this id is shown at session start, never sent to
/// the proxy, and never persisted.
pub const WELCOME_ID: &str = "welcome";

/// Introductory assistant turn shown when a session starts.
pub const WELCOME_MESSAGE: &str = "Hello! I'm Converse, your software development assistant. I can help you with:\n\n\
• Application architecture and API design\n\
• Debugging and code review\n\
• Build tooling and dependency management\n\
• Testing strategies\n\
• Performance analysis and optimization\n\n\
What would you like to work on today?";

/// System instruction the proxy prepends to every provider request.
pub const SYSTEM_PROMPT: &str = "You are Converse, a software development assistant focused on practical, \
working solutions. You are not a general-purpose chatbot - you help developers design, write, debug, and \
test software.

Your expertise includes:
- Application architecture and API design
- Debugging and code review
- Build tooling and dependency management
- Testing strategies and test design
- Performance analysis and optimization

Always provide:
- Clear, working code examples
- Concrete reasoning for recommendations
- Trade-offs where they matter

Be concise but thorough.";

/// Generic notice shown when a proxy exchange fails. The underlying
/// error detail goes to the log, never to the user.
pub const SEND_FAILED_NOTICE: &str = "Failed to send message. Please try again.";

/// Generic notice shown when persisting a conversation fails.
pub const SAVE_FAILED_NOTICE: &str = "Failed to save chat";

/// Generic notice shown when listing saved conversations fails.
pub const LOAD_FAILED_NOTICE: &str = "Failed to load saved chats";

/// Generic notice shown when deleting a conversation fails.
pub const DELETE_FAILED_NOTICE: &str = "Failed to delete chat";

/// Confirmation shown after a successful manual save.
pub const CHAT_SAVED_NOTICE: &str = "Chat saved successfully!";

/// Confirmation shown after a successful delete.
pub const CHAT_DELETED_NOTICE: &str = "Chat deleted successfully";
