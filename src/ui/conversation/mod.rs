//! Conversation UI components for the chat screen

pub mod commands;
pub mod composer;
pub mod history;
pub mod manager;

pub use commands::{parse_slash_command, ParsedCommand, SlashCommand};
pub use composer::{Composer, ComposerResult};
pub use history::HistoryView;
pub use manager::{ConversationAction, ConversationManager};
